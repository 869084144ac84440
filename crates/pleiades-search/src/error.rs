use thiserror::Error;

#[derive(Error, Debug)]
pub enum PleiadesError {
    #[error("Query error: {0}")]
    QueryError(#[from] crate::query::QueryError),
    #[error("Feed error: {0}")]
    FeedError(#[from] crate::feed::FeedError),
    #[error("Fetch error: {0}")]
    FetchError(#[from] crate::core::FetchError),
    #[error("Web error: {0}")]
    Web(#[from] pleiades_search_web::WebError),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Init Logging error: {0}")]
    InitLoggingError(#[from] tracing_subscriber::filter::ParseError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, PleiadesError>;
