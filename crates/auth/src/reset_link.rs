//! Reset-token extraction from the link a user followed.
//!
//! Identity providers hand the reset token back either in the URL fragment
//! (`…#access_token=…&type=recovery`) or in the query string (`…?token=…`).

const TOKEN_KEYS: [&str; 3] = ["access_token", "token", "code"];

/// Pull the reset token out of a return URL.
///
/// The fragment wins over the query string. Returns `None` when neither carries a
/// non-empty token.
pub fn extract_reset_token(url: &str) -> Option<String> {
    let (before_fragment, fragment) = match url.split_once('#') {
        Some((head, frag)) => (head, Some(frag)),
        None => (url, None),
    };
    let query = before_fragment.split_once('?').map(|(_, q)| q);

    fragment
        .and_then(find_token)
        .or_else(|| query.and_then(find_token))
}

fn find_token(params: &str) -> Option<String> {
    let pairs: Vec<(&str, &str)> = params
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .collect();

    TOKEN_KEYS.iter().find_map(|key| {
        pairs
            .iter()
            .find(|(k, v)| k == key && !v.is_empty())
            .and_then(|(_, v)| urlencoding::decode(v).ok())
            .map(|v| v.into_owned())
    })
}
