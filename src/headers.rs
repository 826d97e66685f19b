//! Ordered header set
//!
//! Header names compare case-insensitively; insertion order is kept so the
//! fingerprint goes out on the wire in the order it was generated.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use crate::error::{Error, Result};

/// Ordered, case-insensitive mapping of header name to value
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderSet {
    entries: Vec<(String, String)>,
}

impl HeaderSet {
    /// Create an empty header set
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a header, replacing an existing value in place.
    /// Returns the previous value if there was one.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let name = name.into();
        let value = value.into();
        match self.position(&name) {
            Some(i) => Some(std::mem::replace(&mut self.entries[i].1, value)),
            None => {
                self.entries.push((name, value));
                None
            }
        }
    }

    /// Get a header value by name
    pub fn get(&self, name: &str) -> Option<&str> {
        self.position(name).map(|i| self.entries[i].1.as_str())
    }

    /// Check whether a header is present
    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Remove a header, returning its value
    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.position(name).map(|i| self.entries.remove(i).1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(name, value)` pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Overlay `overrides` on top of this set.
    ///
    /// One level of precedence: keys in `overrides` win, everything else keeps
    /// its value and position. New keys are appended in the override's order.
    pub fn merged(&self, overrides: &HeaderSet) -> HeaderSet {
        let mut out = self.clone();
        for (name, value) in overrides.iter() {
            out.insert(name, value);
        }
        out
    }

    /// Convert into a `HeaderMap` for the transport engine
    pub fn to_header_map(&self) -> Result<HeaderMap> {
        let mut map = HeaderMap::with_capacity(self.entries.len());
        for (name, value) in &self.entries {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| Error::InvalidRequest(format!("header name '{}': {}", name, e)))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| Error::InvalidRequest(format!("header value for '{}': {}", name, e)))?;
            map.insert(name, value);
        }
        Ok(map)
    }

    /// Build a header set from an engine `HeaderMap`, skipping non-UTF-8 values
    pub fn from_header_map(map: &HeaderMap) -> Self {
        let mut set = HeaderSet::new();
        for (name, value) in map {
            if let Ok(v) = value.to_str() {
                set.insert(name.as_str(), v);
            }
        }
        set
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|(k, _)| k.eq_ignore_ascii_case(name))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for HeaderSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut set = HeaderSet::new();
        for (k, v) in iter {
            set.insert(k, v);
        }
        set
    }
}

impl<K: Into<String>, V: Into<String>> Extend<(K, V)> for HeaderSet {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_overrides_win() {
        let base: HeaderSet = [("A", "1"), ("B", "2")].into_iter().collect();
        let overrides: HeaderSet = [("B", "3"), ("C", "4")].into_iter().collect();

        let merged = base.merged(&overrides);
        let pairs: Vec<_> = merged.iter().collect();
        assert_eq!(pairs, vec![("A", "1"), ("B", "3"), ("C", "4")]);

        // base is untouched
        assert_eq!(base.get("B"), Some("2"));
    }

    #[test]
    fn test_case_insensitive_replace_keeps_position() {
        let mut set = HeaderSet::new();
        set.insert("User-Agent", "a");
        set.insert("Accept", "*/*");
        assert_eq!(set.insert("user-agent", "b"), Some("a".to_string()));

        assert_eq!(set.len(), 2);
        assert_eq!(set.iter().next(), Some(("User-Agent", "b")));
        assert_eq!(set.get("USER-AGENT"), Some("b"));
    }

    #[test]
    fn test_remove() {
        let mut set: HeaderSet = [("X-One", "1")].into_iter().collect();
        assert_eq!(set.remove("x-one"), Some("1".to_string()));
        assert!(set.is_empty());
        assert!(set.remove("x-one").is_none());
    }

    #[test]
    fn test_header_map_roundtrip_rejects_invalid_name() {
        let good: HeaderSet = [("Accept", "application/json")].into_iter().collect();
        let map = good.to_header_map().unwrap();
        assert_eq!(map.get("accept").unwrap(), "application/json");
        assert_eq!(HeaderSet::from_header_map(&map).get("Accept"), Some("application/json"));

        let bad: HeaderSet = [("Bad Header", "x")].into_iter().collect();
        assert!(matches!(bad.to_header_map(), Err(Error::InvalidRequest(_))));
    }
}
