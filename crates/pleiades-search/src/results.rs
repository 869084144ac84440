use crate::feed::FeedEntry;

/// One search hit, taken from a feed entry.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HitRecord {
    /// Last path segment of the place URI (the Pleiades place ID)
    pub id: String,
    pub uri: String,
    pub title: String,
    pub summary: String,
}

impl From<FeedEntry> for HitRecord {
    fn from(entry: FeedEntry) -> Self {
        let id = entry
            .link
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .to_string();
        Self {
            id,
            uri: entry.link,
            title: entry.title,
            summary: entry.description,
        }
    }
}

/// The outcome of one search: the request URI and its hits in service order.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchResults {
    pub query: String,
    pub hits: Vec<HitRecord>,
}

impl SearchResults {
    #[must_use]
    pub fn len(&self) -> usize {
        self.hits.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.hits.iter().map(|hit| hit.id.as_str())
    }
}

/// Turn feed entries into hit records, keeping their order.
pub fn normalize_hits(entries: impl IntoIterator<Item = FeedEntry>) -> Vec<HitRecord> {
    entries.into_iter().map(HitRecord::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(link: &str, title: &str) -> FeedEntry {
        FeedEntry {
            link: link.to_string(),
            title: title.to_string(),
            description: format!("About {title}"),
        }
    }

    #[test]
    fn test_hit_from_entry() {
        let hit = HitRecord::from(entry("https://pleiades.stoa.org/places/295374", "Zucchabar"));
        assert_eq!(hit.id, "295374");
        assert_eq!(hit.uri, "https://pleiades.stoa.org/places/295374");
        assert_eq!(hit.title, "Zucchabar");
        assert_eq!(hit.summary, "About Zucchabar");
    }

    #[test]
    fn test_order_is_preserved() {
        let hits = normalize_hits(vec![
            entry("https://pleiades.stoa.org/places/896643025", "Luxmanda"),
            entry("https://pleiades.stoa.org/places/295374", "Zucchabar"),
            entry("https://pleiades.stoa.org/places/295374", "Zucchabar"),
        ]);
        let ids: Vec<_> = hits.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(ids, vec!["896643025", "295374", "295374"]);
    }

    #[test]
    fn test_link_without_slash() {
        let hit = HitRecord::from(entry("295374", "Zucchabar"));
        assert_eq!(hit.id, "295374");
    }

    #[test]
    fn test_trailing_slash_gives_empty_id() {
        let hit = HitRecord::from(entry("https://pleiades.stoa.org/places/295374/", "Zucchabar"));
        assert_eq!(hit.id, "");
    }
}
