use std::{
    sync::{Mutex, PoisonError},
    time::{Duration, Instant},
};

use once_cell::sync::OnceCell;
use reqwest::{
    Client, Url,
    header::{ACCEPT, CACHE_CONTROL, HeaderMap, HeaderValue, USER_AGENT},
};
use tokio::runtime::Runtime;
use tracing::{debug, info, instrument, warn};

use crate::{
    Result, WebError,
    cache::{ResponseCache, cache_lifetime},
    robots::{RobotsPolicy, robots_agent},
    text::normtext,
};

pub const DEFAULT_USER_AGENT: &str = concat!(
    "pleiades-search/",
    env!("CARGO_PKG_VERSION"),
    " (+https://github.com/isawnyu/pleiades_search_api)"
);

/// Options for building a [`Web`] client.
#[derive(Debug, Clone)]
pub struct WebOptions {
    /// User-Agent header. Blank values fall back to [`DEFAULT_USER_AGENT`].
    pub user_agent: Option<String>,
    /// Optional `Accept` header sent with every request
    pub accept: Option<String>,
    /// Per-request timeout
    pub timeout: Option<Duration>,
    /// Check the site's robots.txt before fetching and honour its crawl delay
    pub respect_robots_txt: bool,
    /// Let `Cache-Control` response headers shorten or forbid caching
    pub cache_control: bool,
    /// Keep responses in memory this long. `None` disables the cache.
    pub expire_after: Option<Duration>,
}

impl Default for WebOptions {
    fn default() -> Self {
        Self {
            user_agent: None,
            accept: None,
            timeout: None,
            respect_robots_txt: true,
            cache_control: true,
            expire_after: None,
        }
    }
}

/// Blocking HTTP client bound to a single network location.
///
/// Requests are driven by a private single-threaded tokio runtime, so
/// [`Web::get`] must not be called from inside another async runtime.
/// robots.txt is fetched once, on the first request.
#[derive(Debug)]
pub struct Web {
    netloc: String,
    user_agent: String,
    respect_robots_txt: bool,
    cache_control: bool,
    client: Client,
    runtime: Runtime,
    robots: OnceCell<RobotsPolicy>,
    cache: Option<ResponseCache>,
    last_request: Mutex<Option<Instant>>,
}

impl Web {
    #[instrument(name = "Create Web client", skip(options), level = "debug")]
    pub fn new(netloc: &str, options: WebOptions) -> Result<Self> {
        let user_agent = resolve_user_agent(options.user_agent.as_deref());

        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, header_value(&user_agent)?);
        if let Some(accept) = options.accept.as_deref() {
            headers.insert(ACCEPT, header_value(accept)?);
        }

        let mut builder = Client::builder().default_headers(headers);
        if let Some(timeout) = options.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        Ok(Self {
            netloc: netloc.to_string(),
            user_agent,
            respect_robots_txt: options.respect_robots_txt,
            cache_control: options.cache_control,
            client,
            runtime,
            robots: OnceCell::new(),
            cache: options.expire_after.map(ResponseCache::new),
            last_request: Mutex::new(None),
        })
    }

    #[must_use]
    pub fn netloc(&self) -> &str {
        &self.netloc
    }

    #[must_use]
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    #[must_use]
    pub const fn respect_robots_txt(&self) -> bool {
        self.respect_robots_txt
    }

    #[must_use]
    pub const fn cache_control(&self) -> bool {
        self.cache_control
    }

    /// How long responses are cached, or `None` when caching is off.
    #[must_use]
    pub fn expire_after(&self) -> Option<Duration> {
        self.cache.as_ref().map(ResponseCache::expire_after)
    }

    /// Fetch `uri` and return the response body as text.
    ///
    /// The URI must point at this client's network location. Fresh cached
    /// responses are returned without a request. Otherwise robots.txt is
    /// consulted (when enabled) and its crawl delay observed. Non-success
    /// status codes are reported as errors.
    #[instrument(name = "HTTP GET", skip(self), level = "info")]
    pub fn get(&self, uri: &str) -> Result<String> {
        self.check_netloc(uri)?;

        if let Some(body) = self.cache.as_ref().and_then(|cache| cache.get(uri)) {
            debug!("Serving response from cache");
            return Ok(body);
        }

        if self.respect_robots_txt {
            let robots = self.robots(uri)?;
            if !robots.allowed(uri) {
                return Err(WebError::DisallowedByRobots {
                    uri: uri.to_string(),
                });
            }
            self.wait_for_crawl_delay(robots.crawl_delay());
        }

        let (body, cache_header) = self.runtime.block_on(async {
            let response = self.client.get(uri).send().await?.error_for_status()?;
            info!(status = %response.status(), "Response received");
            let cache_header = response
                .headers()
                .get(CACHE_CONTROL)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string);
            let body = response.text().await?;
            debug!(bytes = body.len(), "Response body read");
            Ok::<_, WebError>((body, cache_header))
        })?;
        self.mark_request();

        if let Some(cache) = &self.cache {
            let header = cache_header.as_deref().filter(|_| self.cache_control);
            if let Some(lifetime) = cache_lifetime(header, cache.expire_after()) {
                cache.insert(uri, body.clone(), lifetime);
            }
        }
        Ok(body)
    }

    fn robots(&self, uri: &str) -> Result<&RobotsPolicy> {
        self.robots.get_or_try_init(|| self.fetch_robots(uri))
    }

    #[instrument(name = "Fetch robots.txt", skip(self), level = "debug")]
    fn fetch_robots(&self, uri: &str) -> Result<RobotsPolicy> {
        let robots_uri = robots_url(uri)?;
        let (status, body) = self.runtime.block_on(async {
            let response = self.client.get(robots_uri.as_str()).send().await?;
            let status = response.status().as_u16();
            let body = response.bytes().await?;
            Ok::<_, WebError>((status, body))
        })?;
        self.mark_request();
        info!(robots_uri = %robots_uri, status, "robots.txt retrieved");

        Ok(RobotsPolicy::from_response(
            robots_agent(&self.user_agent),
            status,
            &body,
        ))
    }

    fn wait_for_crawl_delay(&self, delay: Option<Duration>) {
        let Some(delay) = delay else {
            return;
        };
        let last = *self
            .last_request
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(wait) = last.and_then(|at| delay.checked_sub(at.elapsed())) {
            debug!(wait_seconds = ?wait, "Honouring robots.txt crawl delay");
            std::thread::sleep(wait);
        }
    }

    fn mark_request(&self) {
        *self
            .last_request
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(Instant::now());
    }

    fn check_netloc(&self, uri: &str) -> Result<()> {
        let parsed = parse_uri(uri)?;
        let host = parsed.host_str().unwrap_or_default();
        let netloc = parsed
            .port()
            .map_or_else(|| host.to_string(), |port| format!("{host}:{port}"));
        if netloc == self.netloc {
            Ok(())
        } else {
            Err(WebError::ForeignHost {
                uri: uri.to_string(),
                expected: self.netloc.clone(),
            })
        }
    }
}

fn parse_uri(uri: &str) -> Result<Url> {
    Url::parse(uri).map_err(|e| WebError::InvalidUri {
        uri: uri.to_string(),
        reason: e.to_string(),
    })
}

/// The robots.txt location for the site serving `uri`.
fn robots_url(uri: &str) -> Result<Url> {
    parse_uri(uri)?
        .join("/robots.txt")
        .map_err(|e| WebError::InvalidUri {
            uri: uri.to_string(),
            reason: e.to_string(),
        })
}

fn resolve_user_agent(requested: Option<&str>) -> String {
    let user_agent = requested.map(normtext).unwrap_or_default();
    if user_agent.is_empty() || user_agent == DEFAULT_USER_AGENT {
        warn!(
            user_agent = DEFAULT_USER_AGENT,
            "Using default HTTP User-Agent. \
             We strongly prefer you define your own unique user-agent string."
        );
        DEFAULT_USER_AGENT.to_string()
    } else {
        user_agent
    }
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value).map_err(|e| WebError::InvalidHeader {
        value: value.to_string(),
        reason: e.to_string(),
    })
}
