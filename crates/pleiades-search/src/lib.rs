//! Pleiades Search - query the Pleiades gazetteer of ancient places
//!
//! This library compiles validated, strongly typed queries into the wire
//! parameters understood by the Pleiades `search_rss` endpoint, and turns the
//! RSS response into structured hit records.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use pleiades_search::{Operator, Query, SearchConfig, SearchInterface};
//!
//! let config = SearchConfig::builder()
//!     .user_agent("MyGazetteerBot/1.0 (+https://example.org/bot)")
//!     .build();
//! let search = SearchInterface::with_default_web(config)?;
//!
//! let mut query = Query::new();
//! query.set_parameter("text", ["Zucchabar", "Miliana"], Some(Operator::And))?;
//!
//! let results = search.search(&query)?;
//! for hit in &results.hits {
//!     println!("{} {}: {}", hit.id, hit.title, hit.uri);
//! }
//! # Ok::<(), pleiades_search::error::PleiadesError>(())
//! ```
//!
//! # Fields
//!
//! | field | value | wire parameter |
//! |---|---|---|
//! | `bbox` | [`BoundingBox`] | `lowerLeft`, `upperRight`, `predicate`, `location_precision:list` |
//! | `description` | string or list | `Description` |
//! | `feature_type` | string or list | `getFeatureType` (repeated) |
//! | `tag` | string or list | `Subject:list` (repeated) |
//! | `text` | string or list | `SearchableText` |
//! | `title` | string | `Title` |
//!
//! Every search is restricted to published places
//! (`portal_type:list=Place`, `review_state:list=published`).
use once_cell::sync::OnceCell;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

mod config;
mod core;
pub mod error;
mod feed;
mod query;
mod results;
mod wire;

pub use crate::core::{Fetch, FetchError, SearchInterface};

pub use config::{DEFAULT_HOST, DEFAULT_SEARCH_PATH, SearchConfig, SearchConfigBuilder};
pub use feed::{FeedEntry, FeedError, parse_feed};
pub use pleiades_search_web as web;
pub use pleiades_search_web::normtext;
pub use query::{
    BBOX_EPSILON, BoundingBox, DEFAULT_WEB_PARAMETERS, Field, FieldRule, ListBehavior, Operator,
    OperatorSideEffect, ParamValue, Preprocessor, Query, QueryError, QueryParameter, ValueShape,
    default_web_parameters, list_supported_fields, rule_for, translate,
};
pub use results::{HitRecord, SearchResults, normalize_hits};
pub use wire::{MergePolicy, WireParameterSet, WireValue, encode_params};

static LOGGER_INIT: OnceCell<()> = OnceCell::new();

/// Initialize logging for the Pleiades search library.
///
/// Installs a `tracing` subscriber writing to stderr. `RUST_LOG` takes
/// precedence over `level` when set. Safe to call more than once; only the
/// first call installs the subscriber.
///
/// # Examples
///
/// ```rust
/// use pleiades_search::init_logging;
/// use tracing::Level;
///
/// init_logging(Level::INFO)?;
/// # Ok::<(), pleiades_search::error::PleiadesError>(())
/// ```
pub fn init_logging(level: impl Into<LevelFilter>) -> Result<&'static (), error::PleiadesError> {
    LOGGER_INIT.get_or_try_init(|| {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(level.into().to_string()))?
            .add_directive("hyper_util=warn".parse()?)
            .add_directive("reqwest=warn".parse()?);

        tracing_subscriber::fmt::fmt()
            .with_env_filter(filter)
            .with_span_events(FmtSpan::CLOSE)
            .with_writer(std::io::stderr)
            .init();
        Ok(())
    })
}
