//! Wire parameters and their query-string encoding.

use std::collections::{BTreeMap, BTreeSet, btree_map};

use itertools::Itertools;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

use crate::query::Field;

/// A single wire-level parameter value.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireValue {
    /// Encoded as an empty value (`key=`).
    Null,
    Single(String),
    Multi(Vec<String>),
}

impl WireValue {
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Single(value) => Some(value),
            Self::Null | Self::Multi(_) => None,
        }
    }
}

impl From<&str> for WireValue {
    fn from(value: &str) -> Self {
        Self::Single(value.to_string())
    }
}

impl From<String> for WireValue {
    fn from(value: String) -> Self {
        Self::Single(value)
    }
}

impl From<Vec<String>> for WireValue {
    fn from(values: Vec<String>) -> Self {
        Self::Multi(values)
    }
}

impl<T: Into<WireValue>> From<Option<T>> for WireValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// Precedence applied when two parameter sets share a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergePolicy {
    /// The incoming value replaces the existing one.
    Overwrite,
    /// The existing value is kept and the incoming one dropped.
    KeepExisting,
}

/// A flat mapping of wire keys to values, ordered by key.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WireParameterSet(BTreeMap<String, WireValue>);

impl WireParameterSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<WireValue>,
    ) -> Option<WireValue> {
        self.0.insert(key.into(), value.into())
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&WireValue> {
        self.0.get(key)
    }

    /// The value under `key` if it is a single string.
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(WireValue::as_str)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &WireValue)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Merge `other` into `self`, resolving shared keys with `policy`.
    ///
    /// Returns the keys that were present on both sides.
    pub fn merge(&mut self, other: Self, policy: MergePolicy) -> Vec<String> {
        let mut collisions = Vec::new();
        for (key, value) in other.0 {
            match self.0.entry(key) {
                btree_map::Entry::Vacant(slot) => {
                    slot.insert(value);
                }
                btree_map::Entry::Occupied(mut slot) => {
                    collisions.push(slot.key().clone());
                    if policy == MergePolicy::Overwrite {
                        slot.insert(value);
                    }
                }
            }
        }
        collisions
    }

    /// Encode as a query string, in key order.
    #[must_use]
    pub fn to_query_string(&self) -> String {
        encode_params(self.iter())
    }
}

impl<K: Into<String>, V: Into<WireValue>> FromIterator<(K, V)> for WireParameterSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

impl IntoIterator for WireParameterSet {
    type Item = (String, WireValue);
    type IntoIter = btree_map::IntoIter<String, WireValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Bytes escaped in a query component: everything but ASCII letters, digits
/// and `-._~`. Spaces are kept here and turned into `+` afterwards.
const QUERY_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~')
    .remove(b' ');

/// Percent-encode one key or value, with spaces as `+`.
fn quote_plus(text: &str) -> String {
    utf8_percent_encode(text, QUERY_COMPONENT)
        .to_string()
        .replace(' ', "+")
}

fn encode_pair(key: &str, value: &str) -> String {
    format!("{}={}", quote_plus(key), quote_plus(value))
}

/// Encode wire parameters as `application/x-www-form-urlencoded` text.
///
/// Pairs are emitted in the order given. Lists under a repeated-parameter key
/// (see [`Field::repeated_wire_keys`]) repeat the key once per item; any other
/// list is comma-joined under its key with a `:list` suffix.
///
/// ```rust
/// use pleiades_search::{WireValue, encode_params};
///
/// let where_ = WireValue::from("Burrito Bunker");
/// assert_eq!(encode_params([("where", &where_)]), "where=Burrito+Bunker");
/// ```
pub fn encode_params<'a, I>(params: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a WireValue)>,
{
    let repeated: BTreeSet<&str> = Field::repeated_wire_keys().collect();
    let mut pairs = Vec::new();

    for (key, value) in params {
        match value {
            WireValue::Null => pairs.push(encode_pair(key, "")),
            WireValue::Single(text) => pairs.push(encode_pair(key, text)),
            WireValue::Multi(items) if repeated.contains(key) => {
                pairs.extend(items.iter().map(|item| encode_pair(key, item)));
            }
            WireValue::Multi(items) => {
                pairs.push(encode_pair(&format!("{key}:list"), &items.iter().join(",")));
            }
        }
    }
    pairs.join("&")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single(value: &str) -> WireValue {
        WireValue::from(value)
    }

    fn multi(values: &[&str]) -> WireValue {
        WireValue::Multi(values.iter().map(ToString::to_string).collect())
    }

    #[test]
    fn test_encode_str() {
        let foo = single("bar");
        let raw = single("cooked");
        let where_ = single("Burrito Bunker");
        let when = single("A long, long time ago");

        assert_eq!(encode_params([("foo", &foo)]), "foo=bar");
        assert_eq!(
            encode_params([("foo", &foo), ("raw", &raw)]),
            "foo=bar&raw=cooked"
        );
        assert_eq!(
            encode_params([("foo", &foo), ("raw", &raw), ("where", &where_)]),
            "foo=bar&raw=cooked&where=Burrito+Bunker"
        );
        assert_eq!(
            encode_params([
                ("foo", &foo),
                ("raw", &raw),
                ("where", &where_),
                ("when", &when)
            ]),
            "foo=bar&raw=cooked&where=Burrito+Bunker&when=A+long%2C+long+time+ago"
        );
    }

    #[test]
    fn test_encode_reserved_characters() {
        // `*` is escaped and `~` left bare
        let wildcard = single("Roma* ~x");
        assert_eq!(
            encode_params([("SearchableText", &wildcard)]),
            "SearchableText=Roma%2A+~x"
        );

        let mixed = single("a+b&c=d/e?f'g(h)!");
        assert_eq!(
            encode_params([("q", &mixed)]),
            "q=a%2Bb%26c%3Dd%2Fe%3Ff%27g%28h%29%21"
        );

        let unreserved = single("Lepcis_Magna-1.0~");
        assert_eq!(
            encode_params([("q", &unreserved)]),
            "q=Lepcis_Magna-1.0~"
        );
    }

    #[test]
    fn test_encode_non_ascii_as_utf8() {
        let greek = single("Ἀθῆναι");
        assert_eq!(
            encode_params([("Title", &greek)]),
            "Title=%E1%BC%88%CE%B8%E1%BF%86%CE%BD%CE%B1%CE%B9"
        );
    }

    #[test]
    fn test_encode_null_is_empty() {
        assert_eq!(encode_params([("Title", &WireValue::Null)]), "Title=");
        assert_eq!(WireValue::from(None::<&str>), WireValue::Null);
    }

    #[test]
    fn test_encode_keys_are_escaped() {
        let place = single("Place");
        assert_eq!(
            encode_params([("portal_type:list", &place)]),
            "portal_type%3Alist=Place"
        );
    }

    #[test]
    fn test_encode_repeated_parameters() {
        let types = multi(&["settlement", "fort"]);
        assert_eq!(
            encode_params([("getFeatureType", &types)]),
            "getFeatureType=settlement&getFeatureType=fort"
        );

        let tags = multi(&["roman", "punic war"]);
        assert_eq!(
            encode_params([("Subject:list", &tags)]),
            "Subject%3Alist=roman&Subject%3Alist=punic+war"
        );
    }

    #[test]
    fn test_encode_ad_hoc_list() {
        let periods = multi(&["roman", "late-antique"]);
        assert_eq!(
            encode_params([("period", &periods)]),
            "period%3Alist=roman%2Clate-antique"
        );
    }

    #[test]
    fn test_query_string_follows_key_order() {
        let params: WireParameterSet = [
            ("review_state:list", "published"),
            ("Title", "Zucchabar"),
            ("portal_type:list", "Place"),
        ]
        .into_iter()
        .collect();
        assert_eq!(
            params.to_query_string(),
            "Title=Zucchabar&portal_type%3Alist=Place&review_state%3Alist=published"
        );
    }

    #[test]
    fn test_merge_overwrite() {
        let mut base: WireParameterSet = [("a", "1"), ("b", "2")].into_iter().collect();
        let other: WireParameterSet = [("b", "3"), ("c", "4")].into_iter().collect();
        let collisions = base.merge(other, MergePolicy::Overwrite);
        assert_eq!(collisions, vec!["b".to_string()]);
        assert_eq!(base.get_str("b"), Some("3"));
        assert_eq!(base.get_str("c"), Some("4"));
    }

    #[test]
    fn test_merge_keep_existing() {
        let mut base: WireParameterSet = [("a", "1"), ("b", "2")].into_iter().collect();
        let other: WireParameterSet = [("b", "3")].into_iter().collect();
        let collisions = base.merge(other, MergePolicy::KeepExisting);
        assert_eq!(collisions, vec!["b".to_string()]);
        assert_eq!(base.get_str("b"), Some("2"));
        assert_eq!(base.len(), 2);
    }
}
