//! Password strength policy and temporary-password generation.
//!
//! Evaluation is pure and deterministic: the same input always yields the same
//! violations, in rule order. The same function backs the advisory
//! `/password/check` endpoint and the authoritative check made before any
//! credential change.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Minimum length the policy will ever accept, regardless of configuration.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Length of generated temporary passwords (raised to the policy minimum if larger).
pub const TEMPORARY_PASSWORD_LENGTH: usize = 16;

const UPPER: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ";
const LOWER: &[u8] = b"abcdefghijkmnopqrstuvwxyz";
const DIGITS: &[u8] = b"23456789";
const SYMBOLS: &[u8] = b"!@#$%^&*-_=+?";

/// Passwords rejected outright, compared case-insensitively.
const COMMON_PASSWORDS: &[&str] = &[
    "password",
    "password1",
    "password123",
    "password1!",
    "p@ssw0rd",
    "passw0rd!",
    "12345678",
    "123456789",
    "1234567890",
    "qwerty123",
    "qwerty123!",
    "qwertyuiop",
    "iloveyou",
    "letmein1",
    "letmein!",
    "welcome1",
    "welcome1!",
    "welcome123",
    "admin123",
    "admin123!",
    "changeme",
    "changeme1!",
    "abcd1234",
    "trustno1",
    "football1",
    "sunshine1",
];

/// A single strength rule. Declaration order is evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PasswordRule {
    MinLength,
    Uppercase,
    Lowercase,
    Digit,
    Symbol,
    NotCommon,
}

impl PasswordRule {
    pub const ALL: [PasswordRule; 6] = [
        PasswordRule::MinLength,
        PasswordRule::Uppercase,
        PasswordRule::Lowercase,
        PasswordRule::Digit,
        PasswordRule::Symbol,
        PasswordRule::NotCommon,
    ];
}

/// Outcome of a strength check. Not persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyResult {
    pub valid: bool,
    pub summary_message: String,
    pub violations: Vec<String>,
}

/// Password strength policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordPolicy {
    min_length: usize,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: MIN_PASSWORD_LENGTH,
        }
    }
}

impl PasswordPolicy {
    /// Policy with a custom minimum length, clamped to [`MIN_PASSWORD_LENGTH`].
    pub fn with_min_length(min_length: usize) -> Self {
        Self {
            min_length: min_length.max(MIN_PASSWORD_LENGTH),
        }
    }

    pub fn min_length(&self) -> usize {
        self.min_length
    }

    /// Violation message for `rule` under this policy.
    pub fn message(&self, rule: PasswordRule) -> String {
        match rule {
            PasswordRule::MinLength => {
                format!("Password must be at least {} characters long", self.min_length)
            }
            PasswordRule::Uppercase => "Password must contain at least one uppercase letter".into(),
            PasswordRule::Lowercase => "Password must contain at least one lowercase letter".into(),
            PasswordRule::Digit => "Password must contain at least one number".into(),
            PasswordRule::Symbol => "Password must contain at least one special character".into(),
            PasswordRule::NotCommon => "Password is too common".into(),
        }
    }

    fn passes(&self, rule: PasswordRule, password: &str) -> bool {
        match rule {
            PasswordRule::MinLength => password.chars().count() >= self.min_length,
            PasswordRule::Uppercase => password.chars().any(char::is_uppercase),
            PasswordRule::Lowercase => password.chars().any(char::is_lowercase),
            PasswordRule::Digit => password.chars().any(|c| c.is_ascii_digit()),
            PasswordRule::Symbol => password.chars().any(is_symbol),
            PasswordRule::NotCommon => {
                let lowered = password.to_lowercase();
                !COMMON_PASSWORDS.contains(&lowered.as_str())
            }
        }
    }

    /// Check `password` against every rule, in [`PasswordRule::ALL`] order.
    pub fn evaluate(&self, password: &str) -> PolicyResult {
        let violations: Vec<String> = PasswordRule::ALL
            .into_iter()
            .filter(|rule| !self.passes(*rule, password))
            .map(|rule| self.message(rule))
            .collect();

        let valid = violations.is_empty();
        PolicyResult {
            valid,
            summary_message: if valid {
                "Password meets all requirements".to_string()
            } else {
                "Password does not meet requirements".to_string()
            },
            violations,
        }
    }

    /// Generate a temporary password that passes this policy.
    pub fn generate(&self) -> String {
        self.generate_with(&mut rand::thread_rng())
    }

    pub fn generate_with<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        let len = TEMPORARY_PASSWORD_LENGTH.max(self.min_length);
        loop {
            let candidate = build_candidate(rng, len);
            if self.evaluate(&candidate).valid {
                return candidate;
            }
        }
    }
}

fn is_symbol(c: char) -> bool {
    !c.is_alphanumeric() && !c.is_whitespace()
}

// One character from each class, the rest from the union, then shuffled.
fn build_candidate<R: Rng + ?Sized>(rng: &mut R, len: usize) -> String {
    let classes = [UPPER, LOWER, DIGITS, SYMBOLS];
    let mut bytes: Vec<u8> = classes
        .iter()
        .map(|class| class[rng.gen_range(0..class.len())])
        .collect();

    let all: Vec<u8> = classes.concat();
    while bytes.len() < len {
        bytes.push(all[rng.gen_range(0..all.len())]);
    }
    bytes.shuffle(rng);

    bytes.into_iter().map(char::from).collect()
}

/// Evaluate against the default policy.
pub fn evaluate(password: &str) -> PolicyResult {
    PasswordPolicy::default().evaluate(password)
}

/// Generate a temporary password that passes the default policy.
pub fn generate_temporary_password() -> String {
    PasswordPolicy::default().generate()
}
