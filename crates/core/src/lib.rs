//! `warden-core`: foundation building blocks shared by every Warden crate.
//!
//! This crate contains **pure** primitives (no infrastructure concerns).

pub mod error;
pub mod id;

pub use error::{DomainError, DomainResult};
pub use id::{PrincipalId, SessionId};
