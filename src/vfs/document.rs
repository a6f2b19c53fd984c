//! Virtual document identifiers and the read-only content provider

use std::fmt;

use crate::common::{Error, Result};

use super::SourceRepository;

/// URI scheme under which backend sources are exposed
pub const SCHEME: &str = "cdf";

/// Identifier of a virtual document
///
/// Every backend path lives under [`SCHEME`], whatever it looks like; the
/// path is kept verbatim so lookups hit the exact repository key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentUri {
    source_path: String,
}

impl DocumentUri {
    /// Map a backend source path to a document identifier
    pub fn from_source_path(path: &str) -> Self {
        Self {
            source_path: path.to_string(),
        }
    }

    pub fn scheme(&self) -> &str {
        SCHEME
    }

    /// Repository key this document was created from
    pub fn source_path(&self) -> &str {
        &self.source_path
    }

    /// The path already reads as a `cdf:` identifier
    fn has_own_prefix(&self) -> bool {
        self.source_path
            .get(..SCHEME.len() + 1)
            .is_some_and(|p| p.eq_ignore_ascii_case(&format!("{}:", SCHEME)))
    }
}

impl fmt::Display for DocumentUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.has_own_prefix() {
            write!(f, "{}", self.source_path)
        } else {
            write!(f, "{}:{}", SCHEME, self.source_path)
        }
    }
}

/// Read-only text provider for one URI scheme
///
/// Serves documents lazily and repeatedly from the repository it was
/// registered with; nothing is ever written to disk.
#[derive(Debug, Clone)]
pub struct ContentProvider {
    scheme: String,
    repository: SourceRepository,
}

impl ContentProvider {
    /// Register a provider for `scheme` backed by `repository`
    pub fn register(scheme: &str, repository: SourceRepository) -> Self {
        tracing::debug!(scheme, "Registered virtual document provider");
        Self {
            scheme: scheme.to_string(),
            repository,
        }
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Whether this provider serves documents with the given identifier
    pub fn handles(&self, uri: &DocumentUri) -> bool {
        uri.scheme().eq_ignore_ascii_case(&self.scheme)
    }

    /// Current text of a virtual document
    pub fn provide_text_document_content(&self, uri: &DocumentUri) -> Result<String> {
        if !self.handles(uri) {
            return Err(Error::not_found(uri.to_string()));
        }
        self.repository.get(uri.source_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dap::SourceEntry;

    #[test]
    fn test_uri_keeps_cdf_prefix() {
        let uri = DocumentUri::from_source_path("cdf://a");
        assert_eq!(uri.scheme(), "cdf");
        assert_eq!(uri.source_path(), "cdf://a");
        assert_eq!(uri.to_string(), "cdf://a");
    }

    #[test]
    fn test_uri_for_plain_path() {
        let uri = DocumentUri::from_source_path("/home/dev/circuit/src/gadget.rs");
        assert_eq!(uri.scheme(), SCHEME);
        assert_eq!(uri.to_string(), "cdf:/home/dev/circuit/src/gadget.rs");

        let uri = DocumentUri::from_source_path("C:\\circuit\\lib.rs");
        assert_eq!(uri.scheme(), SCHEME);
    }

    #[test]
    fn test_colon_paths_stay_under_cdf() {
        for path in ["gadgets.rs:12", "src.rs:main", "file:///a.rs", "c"] {
            let uri = DocumentUri::from_source_path(path);
            assert_eq!(uri.scheme(), SCHEME);
            assert_eq!(uri.source_path(), path);
            assert_eq!(uri.to_string(), format!("cdf:{}", path));
        }
    }

    #[test]
    fn test_provider_reads_live_repository() {
        let repo = SourceRepository::new();
        let provider = ContentProvider::register(SCHEME, repo.clone());
        let uri = DocumentUri::from_source_path("cdf://a");

        assert!(matches!(
            provider.provide_text_document_content(&uri),
            Err(Error::NotFound(_))
        ));

        repo.replace_all(vec![SourceEntry {
            path: "cdf://a".into(),
            contents: "A".into(),
        }]);
        assert_eq!(provider.provide_text_document_content(&uri).unwrap(), "A");
        // re-rendering asks again and must still succeed
        assert_eq!(provider.provide_text_document_content(&uri).unwrap(), "A");
    }

    #[test]
    fn test_provider_serves_every_key() {
        let repo = SourceRepository::new();
        repo.replace_all(vec![
            SourceEntry {
                path: "file:///a.rs".into(),
                contents: "A".into(),
            },
            SourceEntry {
                path: "gadgets.rs:12".into(),
                contents: "G".into(),
            },
        ]);
        let provider = ContentProvider::register(SCHEME, repo.clone());

        for key in repo.keys() {
            let uri = DocumentUri::from_source_path(&key);
            assert!(provider.handles(&uri));
            assert_eq!(
                provider.provide_text_document_content(&uri).unwrap(),
                repo.get(&key).unwrap()
            );
        }
    }

    #[test]
    fn test_provider_for_other_scheme_declines() {
        let repo = SourceRepository::new();
        repo.replace_all(vec![SourceEntry {
            path: "a.rs".into(),
            contents: "A".into(),
        }]);
        let provider = ContentProvider::register("untitled", repo);
        let uri = DocumentUri::from_source_path("a.rs");
        assert!(!provider.handles(&uri));
        assert!(provider.provide_text_document_content(&uri).is_err());
    }
}
