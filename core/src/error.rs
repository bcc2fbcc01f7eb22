use thiserror::Error;

use crate::index::DocId;

pub type Result<T> = std::result::Result<T, SearchError>;

#[derive(Debug, Error)]
pub enum SearchError {
    /// Missing or empty required content or query.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Document id absent from the store.
    #[error("document {0} not found")]
    NotFound(DocId),

    /// An internal invariant was violated, e.g. a posting referencing a
    /// document with no length entry. A full rebuild repairs the index.
    #[error("index inconsistency: {0}")]
    IndexInconsistency(String),

    /// Document store or cache access failure.
    #[error("dependency failure: {0}")]
    Dependency(String),
}
