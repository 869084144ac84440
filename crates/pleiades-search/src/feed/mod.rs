//! Syndication feed parsing.
//!
//! Pleiades answers `search_rss` with an RSS 1.0 (RDF) document. The parser
//! also understands RSS 2.0 items and Atom entries, and reduces each of them
//! to the link, title and description the result normaliser needs.

pub use error::{FeedError, Result};

use quick_xml::{
    Reader,
    events::{BytesStart, Event},
};
use tracing::{debug, instrument};

/// One item of a syndication feed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedEntry {
    pub link: String,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntryField {
    Link,
    Title,
    Description,
}

impl EntryField {
    fn from_local_name(name: &[u8]) -> Option<Self> {
        match name {
            b"link" => Some(Self::Link),
            b"title" => Some(Self::Title),
            b"description" | b"summary" | b"content" => Some(Self::Description),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
struct EntryBuilder {
    link: Option<String>,
    title: Option<String>,
    description: Option<String>,
}

impl EntryBuilder {
    fn is_set(&self, field: EntryField) -> bool {
        match field {
            EntryField::Link => self.link.is_some(),
            EntryField::Title => self.title.is_some(),
            EntryField::Description => self.description.is_some(),
        }
    }

    /// Fill `field` with `text` unless it already holds a value. Empty text
    /// never fills a field.
    fn set(&mut self, field: EntryField, text: String) {
        let slot = match field {
            EntryField::Link => &mut self.link,
            EntryField::Title => &mut self.title,
            EntryField::Description => &mut self.description,
        };
        if slot.is_none() && !text.is_empty() {
            *slot = Some(text);
        }
    }

    fn build(self) -> Option<FeedEntry> {
        let link = self.link.filter(|link| !link.is_empty())?;
        Some(FeedEntry {
            link,
            title: self.title.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
        })
    }
}

fn is_entry_element(name: &[u8]) -> bool {
    matches!(name, b"item" | b"entry")
}

/// An Atom `<link>` element: the target lives in `href`, never in the text.
struct AtomLink {
    href: String,
    alternate: bool,
}

/// Read the Atom attributes of a `<link>` element, or `None` when it has no
/// `href` (an RSS link whose target is its text).
fn atom_link(element: &BytesStart<'_>) -> Result<Option<AtomLink>> {
    let mut href = None;
    let mut alternate = true;
    for attr in element.attributes().flatten() {
        match attr.key.local_name().as_ref() {
            b"href" => href = Some(attr.unescape_value()?.into_owned()),
            b"rel" => alternate = attr.value.as_ref() == b"alternate",
            _ => {}
        }
    }
    Ok(href.map(|href| AtomLink { href, alternate }))
}

/// Parse a feed document into its entries, in document order.
///
/// Entries without a link are skipped.
#[instrument(name = "Parse feed", skip_all, level = "debug")]
pub fn parse_feed(text: &str) -> Result<Vec<FeedEntry>> {
    let mut reader = Reader::from_str(text);
    let mut entries = Vec::new();

    let mut current: Option<EntryBuilder> = None;
    let mut field: Option<EntryField> = None;
    let mut buffer = String::new();

    loop {
        match reader.read_event()? {
            Event::Start(ref e) => {
                let name = e.local_name();
                if is_entry_element(name.as_ref()) {
                    current = Some(EntryBuilder::default());
                } else if let Some(entry) = current.as_mut() {
                    if field.is_some() {
                        continue;
                    }
                    match EntryField::from_local_name(name.as_ref()) {
                        Some(EntryField::Link) => match atom_link(e)? {
                            Some(link) if link.alternate => {
                                entry.set(EntryField::Link, link.href);
                            }
                            Some(_) => {}
                            None => field = Some(EntryField::Link),
                        },
                        Some(kind) if !entry.is_set(kind) => field = Some(kind),
                        _ => {}
                    }
                    buffer.clear();
                }
            }
            Event::Empty(ref e) => {
                if let Some(entry) = current.as_mut() {
                    if e.local_name().as_ref() == b"link" {
                        if let Some(link) = atom_link(e)?.filter(|link| link.alternate) {
                            entry.set(EntryField::Link, link.href);
                        }
                    }
                }
            }
            Event::Text(ref e) => {
                if field.is_some() {
                    buffer.push_str(&e.unescape()?);
                }
            }
            Event::CData(ref e) => {
                if field.is_some() {
                    buffer.push_str(&String::from_utf8_lossy(e));
                }
            }
            Event::End(ref e) => {
                let name = e.local_name();
                if is_entry_element(name.as_ref()) {
                    if let Some(entry) = current.take() {
                        match entry.build() {
                            Some(entry) => entries.push(entry),
                            None => debug!("Skipping feed entry without a link"),
                        }
                    }
                    field = None;
                } else if let (Some(entry), Some(kind)) = (current.as_mut(), field) {
                    if EntryField::from_local_name(name.as_ref()) == Some(kind) {
                        entry.set(kind, buffer.trim().to_string());
                        field = None;
                        buffer.clear();
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    debug!(entries = entries.len(), "Feed parsed");
    Ok(entries)
}

mod error {
    use thiserror::Error;

    #[derive(Error, Debug)]
    pub enum FeedError {
        #[error("XML error: {0}")]
        Xml(#[from] quick_xml::Error),
    }

    pub type Result<T> = std::result::Result<T, FeedError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    const RSS1: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
         xmlns:dc="http://purl.org/dc/elements/1.1/"
         xmlns="http://purl.org/rss/1.0/">
  <channel rdf:about="https://pleiades.stoa.org/search_rss">
    <title>Pleiades</title>
    <link>https://pleiades.stoa.org</link>
    <description>Search results</description>
    <items>
      <rdf:Seq>
        <rdf:li rdf:resource="https://pleiades.stoa.org/places/295374"/>
      </rdf:Seq>
    </items>
  </channel>
  <item rdf:about="https://pleiades.stoa.org/places/295374">
    <title>Zucchabar</title>
    <link>https://pleiades.stoa.org/places/295374</link>
    <description>Zucchabar was an ancient city &amp; colony.</description>
    <dc:subject>roman</dc:subject>
  </item>
  <item rdf:about="https://pleiades.stoa.org/places/315048">
    <title>Miliana</title>
    <link>https://pleiades.stoa.org/places/315048</link>
    <description><![CDATA[A <b>modern</b> town.]]></description>
  </item>
</rdf:RDF>"#;

    #[test]
    fn test_parse_rss1() {
        let entries = parse_feed(RSS1).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].link, "https://pleiades.stoa.org/places/295374");
        assert_eq!(entries[0].title, "Zucchabar");
        assert_eq!(
            entries[0].description,
            "Zucchabar was an ancient city & colony."
        );
        assert_eq!(entries[1].title, "Miliana");
        assert_eq!(entries[1].description, "A <b>modern</b> town.");
    }

    #[test]
    fn test_channel_metadata_is_not_an_entry() {
        let entries = parse_feed(RSS1).unwrap();
        assert!(entries.iter().all(|e| e.title != "Pleiades"));
    }

    #[test]
    fn test_parse_rss2() {
        let feed = r#"<rss version="2.0"><channel><title>t</title>
            <item><title>Lepcis Magna</title><link>https://pleiades.stoa.org/places/344448</link>
            <description>Coastal city.</description></item>
            </channel></rss>"#;
        let entries = parse_feed(feed).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].link, "https://pleiades.stoa.org/places/344448");
        assert_eq!(entries[0].description, "Coastal city.");
    }

    #[test]
    fn test_parse_atom() {
        let feed = r#"<feed xmlns="http://www.w3.org/2005/Atom">
            <title>Pleiades</title>
            <entry>
              <title>Luxmanda</title>
              <link rel="self" href="https://pleiades.stoa.org/places/896643025/atom"/>
              <link href="https://pleiades.stoa.org/places/896643025"/>
              <summary>Pastoral Neolithic site.</summary>
              <content>Longer text.</content>
            </entry>
        </feed>"#;
        let entries = parse_feed(feed).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].link, "https://pleiades.stoa.org/places/896643025");
        assert_eq!(entries[0].title, "Luxmanda");
        assert_eq!(entries[0].description, "Pastoral Neolithic site.");
    }

    #[test]
    fn test_parse_atom_with_closed_link_elements() {
        let feed = r#"<feed xmlns="http://www.w3.org/2005/Atom">
            <entry>
              <title>Luxmanda</title>
              <link rel="self" href="https://pleiades.stoa.org/places/896643025/atom"></link>
              <link rel="alternate" href="https://pleiades.stoa.org/places/896643025"></link>
              <summary>Pastoral Neolithic site.</summary>
            </entry>
        </feed>"#;
        let entries = parse_feed(feed).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].link, "https://pleiades.stoa.org/places/896643025");
        assert_eq!(entries[0].title, "Luxmanda");
    }

    #[test]
    fn test_link_href_wins_over_link_text() {
        let feed = r#"<feed xmlns="http://www.w3.org/2005/Atom">
            <entry>
              <title>Luxmanda</title>
              <link href="https://pleiades.stoa.org/places/896643025">Luxmanda page</link>
            </entry>
        </feed>"#;
        let entries = parse_feed(feed).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].link, "https://pleiades.stoa.org/places/896643025");
    }

    #[test]
    fn test_empty_link_does_not_hide_later_link() {
        let feed = r"<rss><channel><item>
            <title>Zucchabar</title>
            <link></link>
            <link>https://pleiades.stoa.org/places/295374</link>
            </item></channel></rss>";
        let entries = parse_feed(feed).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].link, "https://pleiades.stoa.org/places/295374");
    }

    #[test]
    fn test_entry_without_link_is_skipped() {
        let feed = r"<rss><channel>
            <item><title>No link</title></item>
            <item><title>Linked</title><link>https://pleiades.stoa.org/places/1</link></item>
            </channel></rss>";
        let entries = parse_feed(feed).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].title, "Linked");
        assert_eq!(entries[0].description, "");
    }

    #[test]
    fn test_empty_feed() {
        let entries = parse_feed(r"<rss><channel><title>x</title></channel></rss>").unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn test_malformed_feed() {
        let result = parse_feed("<rss><channel><item><title>x</item></channel></rss>");
        assert!(matches!(result, Err(FeedError::Xml(_))));
    }
}
