//! Virtual source documents
//!
//! Sources embedded in a CDF file live only in memory. The repository holds
//! them; the content provider serves them to the document surface.

mod document;
mod repository;

pub use document::{ContentProvider, DocumentUri, SCHEME};
pub use repository::SourceRepository;
