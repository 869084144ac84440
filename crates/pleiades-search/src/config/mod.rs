use std::time::Duration;

use crate::error::PleiadesError;

pub const DEFAULT_HOST: &str = "pleiades.stoa.org";
pub const DEFAULT_SEARCH_PATH: &str = "/search_rss";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Where and how searches are sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchConfig {
    pub scheme: String,
    /// Network location (`host` or `host:port`)
    pub host: String,
    pub path: String,
    pub user_agent: Option<String>,
    pub accept: Option<String>,
    pub timeout: Option<Duration>,
    /// Follow the site's robots.txt, including its crawl delay
    pub respect_robots_txt: bool,
    /// Let `Cache-Control` response headers override `expire_after`
    pub cache_control: bool,
    /// Cache responses in memory this long; `None` disables caching
    pub expire_after: Option<Duration>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            scheme: "https".to_string(),
            host: DEFAULT_HOST.to_string(),
            path: DEFAULT_SEARCH_PATH.to_string(),
            user_agent: None,
            accept: None,
            timeout: Some(DEFAULT_TIMEOUT),
            respect_robots_txt: true,
            cache_control: true,
            expire_after: None,
        }
    }
}

impl SearchConfig {
    #[must_use]
    pub fn builder() -> SearchConfigBuilder {
        SearchConfigBuilder::new()
    }

    /// The endpoint URI without a query string.
    #[must_use]
    pub fn endpoint(&self) -> String {
        format!("{}://{}{}", self.scheme, self.host, self.path)
    }

    /// The endpoint URI with `query` appended, or bare when `query` is empty.
    #[must_use]
    pub fn endpoint_uri(&self, query: &str) -> String {
        if query.is_empty() {
            self.endpoint()
        } else {
            format!("{}?{query}", self.endpoint())
        }
    }
}

/// Builder for [`SearchConfig`]
#[derive(Debug, Clone, Default)]
pub struct SearchConfigBuilder {
    config: SearchConfig,
}

impl SearchConfigBuilder {
    /// Start from the public Pleiades endpoint
    pub fn new() -> Self {
        Self {
            config: SearchConfig::default(),
        }
    }

    pub fn scheme(mut self, scheme: impl Into<String>) -> Self {
        self.config.scheme = scheme.into();
        self
    }

    /// Point at another Pleiades deployment, e.g. a local mirror
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.config.path = path.into();
        self
    }

    /// Identify your application to the service
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = Some(user_agent.into());
        self
    }

    pub fn accept(mut self, accept: impl Into<String>) -> Self {
        self.config.accept = Some(accept.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = Some(timeout);
        self
    }

    /// Disable the request timeout
    pub fn no_timeout(mut self) -> Self {
        self.config.timeout = None;
        self
    }

    /// Whether to honour robots.txt (on by default)
    pub fn respect_robots_txt(mut self, respect: bool) -> Self {
        self.config.respect_robots_txt = respect;
        self
    }

    pub fn cache_control(mut self, cache_control: bool) -> Self {
        self.config.cache_control = cache_control;
        self
    }

    /// Cache responses in memory for `expire_after`
    pub fn expire_after(mut self, expire_after: Duration) -> Self {
        self.config.expire_after = Some(expire_after);
        self
    }

    /// Build the final configuration without validation
    pub fn build(self) -> SearchConfig {
        self.config
    }

    /// Build the final configuration, rejecting unusable endpoints
    pub fn try_build(self) -> Result<SearchConfig, PleiadesError> {
        let config = self.config;
        if config.host.trim().is_empty() {
            return Err(PleiadesError::ConfigError(
                "Search host must not be empty".to_string(),
            ));
        }
        if !matches!(config.scheme.as_str(), "http" | "https") {
            return Err(PleiadesError::ConfigError(format!(
                "Unsupported scheme '{}', expected http or https",
                config.scheme
            )));
        }
        if !config.path.starts_with('/') {
            return Err(PleiadesError::ConfigError(format!(
                "Search path must start with '/', got '{}'",
                config.path
            )));
        }
        Ok(config)
    }
}
