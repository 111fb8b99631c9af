//! Utility functions and helpers.

pub mod http;

use url::Url;

use crate::error::{AppError, Result};

/// Build the member profile page URL for a numeric member id.
pub fn member_page_url(base_url: &str, member_id: u64) -> Result<String> {
    let url = Url::parse(base_url)?.join(&format!("member.php?u={member_id}"))?;
    Ok(url.to_string())
}

/// Build the find-user search URL for a numeric member id.
pub fn search_page_url(base_url: &str, member_id: u64) -> Result<String> {
    let url = Url::parse(base_url)?.join(&format!("search.php?do=finduser&u={member_id}"))?;
    Ok(url.to_string())
}

/// Extract the numeric member id from a profile page URL.
///
/// The id is the value of the `u` query parameter. Anything else (missing
/// parameter, non-numeric value) is rejected rather than guessed at.
pub fn member_id_from_url(url: &str) -> Result<u64> {
    let parsed = Url::parse(url)?;
    parsed
        .query_pairs()
        .find(|(key, _)| key == "u")
        .and_then(|(_, value)| value.parse().ok())
        .ok_or_else(|| AppError::validation(format!("no numeric member id in URL: {url}")))
}

/// Resolve a URL string against a base URL string.
pub fn resolve(base_url: &str, href: &str) -> Option<String> {
    Url::parse(base_url)
        .ok()
        .and_then(|base| base.join(href).ok())
        .map(|u| u.to_string())
}

/// Parse an integer out of page text, tolerating thousands separators.
pub fn parse_grouped_int(text: &str) -> Option<i64> {
    text.trim().replace(',', "").parse().ok()
}
