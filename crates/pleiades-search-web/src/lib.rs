//! Transport and text collaborators for `pleiades-search`.
//!
//! This crate keeps everything that touches the outside world away from the
//! query compiler: a small blocking HTTP client bound to a single network
//! location ([`Web`], behind the default `http` feature) and the whitespace
//! normaliser ([`normtext`]) shared by the query accumulator and the
//! User-Agent handling.
//!
//! `Web` is a polite client. It follows the site's robots.txt, waits out
//! its crawl delay and can keep responses in memory for a configured time.

#[cfg(feature = "http")]
mod cache;
#[cfg(feature = "http")]
mod robots;
pub mod text;
#[cfg(feature = "http")]
pub mod web;

mod error {
    use thiserror::Error;

    #[derive(Error, Debug)]
    pub enum WebError {
        #[cfg(feature = "http")]
        #[error("HTTP error: {0}")]
        Http(#[from] reqwest::Error),
        #[error("IO error: {0}")]
        Io(#[from] std::io::Error),
        #[error("Invalid URI '{uri}': {reason}")]
        InvalidUri { uri: String, reason: String },
        #[error("Invalid header value '{value}': {reason}")]
        InvalidHeader { value: String, reason: String },
        #[error("Refusing to fetch '{uri}': client is bound to '{expected}'")]
        ForeignHost { uri: String, expected: String },
        #[error("robots.txt disallows fetching '{uri}'")]
        DisallowedByRobots { uri: String },
    }

    pub type Result<T> = std::result::Result<T, WebError>;
}

pub use error::{Result, WebError};
pub use text::normtext;
#[cfg(feature = "http")]
pub use cache::{ResponseCache, cache_lifetime};
#[cfg(feature = "http")]
pub use robots::{RobotsPolicy, robots_agent};
#[cfg(feature = "http")]
pub use web::{DEFAULT_USER_AGENT, Web, WebOptions};
