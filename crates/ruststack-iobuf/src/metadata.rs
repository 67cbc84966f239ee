//! User-defined `x-amz-meta-*` key/value pairs.
//!
//! A [`MetadataList`] is attached to every [`IoBuf`](crate::IoBuf). Before a
//! request it holds the pairs that become `x-amz-meta-<key>` headers; after a
//! request it holds the pairs decoded from the response headers.
//!
//! Keys are unique. A new key is pushed to the front, so iteration yields the
//! most recently inserted key first. Updating an existing key keeps its
//! position. Iteration order is deterministic, which matters because the
//! signer serializes entries in iteration order.

/// Key-unique list of metadata pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataList {
    entries: Vec<(String, String)>,
}

impl MetadataList {
    /// Create an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key` to `value`, replacing any existing value for `key`.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            entry.1 = value;
        } else {
            self.entries.insert(0, (key, value));
        }
    }

    /// Look up the value stored for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Remove `key`, returning its value if it was present.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        let pos = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(pos).1)
    }

    /// Remove every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the list has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(key, value)` pairs, most recently inserted key first.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MetadataList {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut list = Self::new();
        for (k, v) in iter {
            list.set(k, v);
        }
        list
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_keep_single_entry_when_key_is_set_twice() {
        let mut list = MetadataList::new();
        list.set("color", "red");
        list.set("color", "blue");
        assert_eq!(list.len(), 1);
        assert_eq!(list.get("color"), Some("blue"));
    }

    #[test]
    fn test_should_push_new_keys_to_front() {
        let mut list = MetadataList::new();
        list.set("a", "1");
        list.set("b", "2");
        list.set("c", "3");
        let keys: Vec<&str> = list.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["c", "b", "a"]);
    }

    #[test]
    fn test_should_keep_position_when_updating_existing_key() {
        let mut list = MetadataList::new();
        list.set("a", "1");
        list.set("b", "2");
        list.set("a", "9");
        let pairs: Vec<(&str, &str)> = list.iter().collect();
        assert_eq!(pairs, vec![("b", "2"), ("a", "9")]);
    }

    #[test]
    fn test_should_remove_single_key() {
        let mut list: MetadataList = [("a", "1"), ("b", "2")].into_iter().collect();
        assert_eq!(list.remove("a"), Some("1".to_owned()));
        assert_eq!(list.remove("a"), None);
        assert_eq!(list.len(), 1);
        assert_eq!(list.get("b"), Some("2"));
    }

    #[test]
    fn test_should_clear_all_entries() {
        let mut list: MetadataList = [("a", "1")].into_iter().collect();
        list.clear();
        assert!(list.is_empty());
        assert_eq!(list.get("a"), None);
    }
}
