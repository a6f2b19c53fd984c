//! In-memory store of the sources embedded in a CDF file

use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::common::{Error, Result};
use crate::dap::SourceEntry;

/// Keyed store of virtual source documents
///
/// Cloning yields another handle to the same store, so the sequencer can
/// write while a [`ContentProvider`](super::ContentProvider) keeps serving
/// reads for the rest of the session. Keys iterate in path order.
#[derive(Debug, Clone, Default)]
pub struct SourceRepository {
    inner: Arc<RwLock<BTreeMap<String, String>>>,
}

impl SourceRepository {
    /// Create an empty repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole contents with `entries`
    ///
    /// The new map is built before the swap, so readers see either the old
    /// set or the new one. Later duplicates of a path win.
    pub fn replace_all<I>(&self, entries: I)
    where
        I: IntoIterator<Item = SourceEntry>,
    {
        let fresh: BTreeMap<String, String> = entries
            .into_iter()
            .map(|SourceEntry { path, contents }| (path, contents))
            .collect();

        let mut map = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        *map = fresh;
    }

    /// Contents stored under exactly `path`
    pub fn get(&self, path: &str) -> Result<String> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(path)
            .cloned()
            .ok_or_else(|| Error::not_found(path))
    }

    /// Snapshot of the current key set
    pub fn keys(&self) -> Vec<String> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }

    /// Snapshot of every entry
    pub fn entries(&self) -> Vec<SourceEntry> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(path, contents)| SourceEntry {
                path: path.clone(),
                contents: contents.clone(),
            })
            .collect()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.inner.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(path: &str, contents: &str) -> SourceEntry {
        SourceEntry {
            path: path.into(),
            contents: contents.into(),
        }
    }

    #[test]
    fn test_starts_empty() {
        let repo = SourceRepository::new();
        assert!(repo.is_empty());
        assert!(repo.keys().is_empty());
        assert!(matches!(repo.get("cdf://a"), Err(Error::NotFound(p)) if p == "cdf://a"));
    }

    #[test]
    fn test_replace_then_get() {
        let repo = SourceRepository::new();
        repo.replace_all(vec![entry("cdf://a", "A"), entry("cdf://b", "B")]);

        assert_eq!(repo.get("cdf://a").unwrap(), "A");
        assert_eq!(repo.get("cdf://b").unwrap(), "B");
        assert_eq!(repo.keys(), vec!["cdf://a", "cdf://b"]);
    }

    #[test]
    fn test_key_set_follows_last_replacement() {
        let repo = SourceRepository::new();
        repo.replace_all(vec![entry("x.rs", "1"), entry("y.rs", "2")]);
        repo.replace_all(vec![entry("y.rs", "3"), entry("z.rs", "4")]);
        repo.replace_all(vec![entry("z.rs", "5")]);

        assert_eq!(repo.keys(), vec!["z.rs"]);
        assert_eq!(repo.get("z.rs").unwrap(), "5");
        assert!(!repo.contains("x.rs"));
        assert!(!repo.contains("y.rs"));
    }

    #[test]
    fn test_replace_is_idempotent() {
        let repo = SourceRepository::new();
        let sources = vec![entry("a", "A"), entry("b", "B")];
        repo.replace_all(sources.clone());
        let first = repo.entries();
        repo.replace_all(sources);
        assert_eq!(repo.entries(), first);
    }

    #[test]
    fn test_replace_with_empty_clears() {
        let repo = SourceRepository::new();
        repo.replace_all(vec![entry("a", "A")]);
        repo.replace_all(Vec::new());
        assert!(repo.is_empty());
    }

    #[test]
    fn test_clones_share_state() {
        let repo = SourceRepository::new();
        let reader = repo.clone();
        repo.replace_all(vec![entry("a", "A")]);
        assert_eq!(reader.get("a").unwrap(), "A");
    }

    #[test]
    fn test_keys_is_a_snapshot() {
        let repo = SourceRepository::new();
        repo.replace_all(vec![entry("a", "A")]);
        let keys = repo.keys();
        repo.replace_all(vec![entry("b", "B")]);
        assert_eq!(keys, vec!["a"]);
    }
}
