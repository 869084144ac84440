//! Text normalisation shared by query values and HTTP headers.

use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// Collapse every run of whitespace (spaces, tabs, line breaks) to a single
/// space and strip leading and trailing whitespace.
///
/// ```rust
/// use pleiades_search_web::normtext;
///
/// assert_eq!(normtext("\n    \tBanana       \tsplit\t\t \t"), "Banana split");
/// ```
#[must_use]
pub fn normtext(text: &str) -> String {
    WHITESPACE_RUN.replace_all(text.trim(), " ").into_owned()
}
