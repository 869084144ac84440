//! In-memory response cache keyed by request URI.

use std::{
    collections::HashMap,
    sync::{Mutex, PoisonError},
    time::{Duration, Instant},
};

#[derive(Debug)]
struct CachedBody {
    body: String,
    expires: Instant,
}

#[derive(Debug)]
pub struct ResponseCache {
    expire_after: Duration,
    entries: Mutex<HashMap<String, CachedBody>>,
}

impl ResponseCache {
    #[must_use]
    pub fn new(expire_after: Duration) -> Self {
        Self {
            expire_after,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Lifetime used when the response does not set its own.
    #[must_use]
    pub const fn expire_after(&self) -> Duration {
        self.expire_after
    }

    /// The cached body for `uri`, if it has not expired. Expired entries are
    /// evicted.
    pub fn get(&self, uri: &str) -> Option<String> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        match entries.get(uri) {
            Some(cached) if cached.expires > Instant::now() => Some(cached.body.clone()),
            Some(_) => {
                entries.remove(uri);
                None
            }
            None => None,
        }
    }

    pub fn insert(&self, uri: &str, body: String, lifetime: Duration) {
        let cached = CachedBody {
            body,
            expires: Instant::now() + lifetime,
        };
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(uri.to_string(), cached);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// How long a response may be cached, given its `Cache-Control` header.
///
/// `no-store` and `no-cache` forbid caching, `max-age` replaces `default`,
/// and a missing header keeps `default`. `None` means do not cache.
#[must_use]
pub fn cache_lifetime(cache_control: Option<&str>, default: Duration) -> Option<Duration> {
    let Some(header) = cache_control else {
        return Some(default);
    };
    let mut lifetime = default;
    for directive in header.split(',').map(str::trim) {
        let directive = directive.to_ascii_lowercase();
        if directive == "no-store" || directive == "no-cache" {
            return None;
        }
        if let Some(seconds) = directive.strip_prefix("max-age=") {
            if let Ok(seconds) = seconds.trim_matches('"').parse::<u64>() {
                lifetime = Duration::from_secs(seconds);
            }
        }
    }
    (!lifetime.is_zero()).then_some(lifetime)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY: Duration = Duration::from_secs(86_400);
    const URI: &str = "https://pleiades.stoa.org/search_rss";

    #[test]
    fn test_cache_hit() {
        let cache = ResponseCache::new(DAY);
        assert!(cache.is_empty());
        cache.insert(URI, "<rss/>".to_string(), DAY);
        assert_eq!(cache.get(URI).as_deref(), Some("<rss/>"));
        assert!(cache.get("https://pleiades.stoa.org/other").is_none());
    }

    #[test]
    fn test_expired_entries_are_evicted() {
        let cache = ResponseCache::new(DAY);
        cache.insert(URI, "<rss/>".to_string(), Duration::ZERO);
        assert!(cache.get(URI).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_cache_lifetime() {
        assert_eq!(cache_lifetime(None, DAY), Some(DAY));
        assert_eq!(cache_lifetime(Some("public"), DAY), Some(DAY));
        assert_eq!(
            cache_lifetime(Some("public, max-age=60"), DAY),
            Some(Duration::from_secs(60))
        );
        assert_eq!(cache_lifetime(Some("max-age=0"), DAY), None);
        assert_eq!(cache_lifetime(Some("No-Store"), DAY), None);
        assert_eq!(cache_lifetime(Some("private, no-cache"), DAY), None);
    }
}
