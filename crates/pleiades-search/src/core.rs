//! The search interface tying query compilation, transport and result
//! normalisation together.
//!
//! [`SearchInterface`] never talks to the network itself: it hands the
//! compiled URI to a [`Fetch`] implementation and normalises whatever feed
//! comes back. With the default `http` feature,
//! [`SearchInterface::with_default_web`] wires in a polite blocking client.
//!
//! ```rust
//! use pleiades_search::{FetchError, Query, SearchConfig, SearchInterface};
//!
//! let feed = r#"<rss><channel><item>
//!     <title>Zucchabar</title>
//!     <link>https://pleiades.stoa.org/places/295374</link>
//!     <description>An ancient city of Mauretania Caesariensis.</description>
//! </item></channel></rss>"#;
//! let fetch = |_uri: &str| Ok::<_, FetchError>(feed.to_string());
//!
//! let search = SearchInterface::new(fetch, SearchConfig::default());
//! let mut query = Query::new();
//! query.set_parameter("title", "Zucchabar", None)?;
//!
//! let results = search.search(&query)?;
//! assert_eq!(results.hits[0].id, "295374");
//! # Ok::<(), pleiades_search::error::PleiadesError>(())
//! ```

use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::{
    config::SearchConfig,
    error::PleiadesError,
    feed::parse_feed,
    query::Query,
    results::{SearchResults, normalize_hits},
};

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Web error: {0}")]
    Web(#[from] pleiades_search_web::WebError),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Retrieves the body of a search response.
///
/// Implementations own connection handling and retries. The default web
/// client also honours robots.txt and can cache responses.
pub trait Fetch {
    fn fetch(&self, uri: &str) -> Result<String, FetchError>;
}

impl<F> Fetch for F
where
    F: Fn(&str) -> Result<String, FetchError>,
{
    fn fetch(&self, uri: &str) -> Result<String, FetchError> {
        self(uri)
    }
}

#[cfg(feature = "http")]
impl Fetch for pleiades_search_web::Web {
    fn fetch(&self, uri: &str) -> Result<String, FetchError> {
        Ok(self.get(uri)?)
    }
}

/// Runs compiled queries against the Pleiades `search_rss` endpoint.
#[derive(Debug)]
pub struct SearchInterface<F> {
    fetcher: F,
    config: SearchConfig,
}

impl<F: Fetch> SearchInterface<F> {
    pub fn new(fetcher: F, config: SearchConfig) -> Self {
        Self { fetcher, config }
    }

    #[must_use]
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    #[must_use]
    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// The URI a search for `query` would request.
    pub fn search_uri(&self, query: &Query) -> Result<String, PleiadesError> {
        let params = query.parameters_for_web()?;
        Ok(self.config.endpoint_uri(&params.to_query_string()))
    }

    /// Search Pleiades for `query`.
    #[instrument(name = "Search Pleiades", skip_all, level = "info")]
    pub fn search(&self, query: &Query) -> Result<SearchResults, PleiadesError> {
        let params = query.parameters_for_web()?;
        debug!(?params, "Compiled query parameters");
        self.search_rss(&params.to_query_string())
    }

    /// Request the RSS search endpoint with an already encoded query string.
    #[instrument(name = "Search RSS", skip(self), level = "debug")]
    pub fn search_rss(&self, encoded_params: &str) -> Result<SearchResults, PleiadesError> {
        let uri = self.config.endpoint_uri(encoded_params);
        debug!(uri = %uri, "Requesting search feed");

        let t_fetch = std::time::Instant::now();
        let body = self.fetcher.fetch(&uri)?;
        let hits = normalize_hits(parse_feed(&body)?);

        info!(
            hits = hits.len(),
            elapsed_seconds = ?t_fetch.elapsed(),
            "Search complete"
        );
        Ok(SearchResults { query: uri, hits })
    }
}

#[cfg(feature = "http")]
impl SearchInterface<pleiades_search_web::Web> {
    /// Build a search interface backed by a blocking HTTP client for
    /// `config.host`.
    pub fn with_default_web(config: SearchConfig) -> Result<Self, PleiadesError> {
        let options = pleiades_search_web::WebOptions {
            user_agent: config.user_agent.clone(),
            accept: config.accept.clone(),
            timeout: config.timeout,
            respect_robots_txt: config.respect_robots_txt,
            cache_control: config.cache_control,
            expire_after: config.expire_after,
        };
        let web = pleiades_search_web::Web::new(&config.host, options)?;
        Ok(Self::new(web, config))
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::{config::SearchConfigBuilder, query::Operator};

    const ONE_HIT: &str = r"<rss><channel><item>
        <title>Zucchabar</title>
        <link>https://pleiades.stoa.org/places/295374</link>
        <description>Zucchabar was an ancient city.</description>
    </item></channel></rss>";

    #[test]
    fn test_search_rss_builds_uri() {
        let fetch = |_: &str| Ok::<_, FetchError>(ONE_HIT.to_string());
        let search = SearchInterface::new(fetch, SearchConfig::default());

        let params = "Title=Zucchabar&portal_type%3Alist=Place&review_state%3Alist=published";
        let results = search.search_rss(params).unwrap();
        assert_eq!(
            results.query,
            format!("https://pleiades.stoa.org/search_rss?{params}")
        );
        assert_eq!(results.len(), 1);
        assert_eq!(results.hits[0].id, "295374");
    }

    #[test]
    fn test_search_passes_compiled_uri_to_fetcher() {
        let requested = RefCell::new(Vec::new());
        let fetch = |uri: &str| {
            requested.borrow_mut().push(uri.to_string());
            Ok::<_, FetchError>(ONE_HIT.to_string())
        };
        let search = SearchInterface::new(fetch, SearchConfig::default());

        let mut query = Query::new();
        query
            .set_parameter("feature_type", ["settlement", "fort"], Some(Operator::And))
            .unwrap();
        let results = search.search(&query).unwrap();

        let requested = requested.borrow();
        assert_eq!(requested.len(), 1);
        assert_eq!(requested[0], results.query);
        assert_eq!(
            requested[0],
            "https://pleiades.stoa.org/search_rss?\
             getFeatureType=settlement&getFeatureType=fort\
             &get_usage%3Aignore_empty=operator%3Aand\
             &portal_type%3Alist=Place&review_state%3Alist=published"
        );
    }

    #[test]
    fn test_search_uri_uses_configured_host() {
        let fetch = |_: &str| Ok::<_, FetchError>(String::new());
        let config = SearchConfigBuilder::new()
            .scheme("http")
            .host("localhost:8080")
            .build();
        let search = SearchInterface::new(fetch, config);
        let uri = search.search_uri(&Query::new()).unwrap();
        assert_eq!(
            uri,
            "http://localhost:8080/search_rss?\
             portal_type%3Alist=Place&review_state%3Alist=published"
        );
    }

    #[test]
    fn test_fetch_errors_propagate() {
        let fetch =
            |_: &str| Err::<String, _>(FetchError::Other(anyhow::anyhow!("offline")));
        let search = SearchInterface::new(fetch, SearchConfig::default());
        let result = search.search(&Query::new());
        assert!(matches!(result, Err(PleiadesError::FetchError(_))));
    }

    #[test]
    fn test_malformed_feed_propagates() {
        let fetch = |_: &str| Ok::<_, FetchError>("<rss><item></rss>".to_string());
        let search = SearchInterface::new(fetch, SearchConfig::default());
        let result = search.search(&Query::new());
        assert!(matches!(result, Err(PleiadesError::FeedError(_))));
    }

    #[cfg(feature = "http")]
    #[test]
    fn test_with_default_web() {
        let config = SearchConfigBuilder::new()
            .user_agent("CosmicBurritoBot/7.3 (+http://nowhere.com/cosmicburritobot)")
            .build();
        let search = SearchInterface::with_default_web(config).unwrap();
        assert_eq!(search.fetcher().netloc(), "pleiades.stoa.org");
        assert_eq!(
            search.fetcher().user_agent(),
            "CosmicBurritoBot/7.3 (+http://nowhere.com/cosmicburritobot)"
        );
        assert!(search.fetcher().respect_robots_txt());
        assert!(search.fetcher().expire_after().is_none());
    }

    #[cfg(feature = "http")]
    #[test]
    fn test_with_default_web_forwards_transport_options() {
        let config = SearchConfigBuilder::new()
            .respect_robots_txt(false)
            .cache_control(false)
            .expire_after(std::time::Duration::from_secs(600))
            .build();
        let search = SearchInterface::with_default_web(config).unwrap();
        assert!(!search.fetcher().respect_robots_txt());
        assert!(!search.fetcher().cache_control());
        assert_eq!(
            search.fetcher().expire_after(),
            Some(std::time::Duration::from_secs(600))
        );
    }
}
