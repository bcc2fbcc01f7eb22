pub mod cache;
pub mod engine;
pub mod error;
pub mod highlight;
pub mod index;
pub mod store;
pub mod tokenizer;

pub use engine::{RankedResult, RebuildReport, RebuildScope, SearchEngine, SearchOutcome};
pub use error::{Result, SearchError};
pub use index::{DocId, InvertedIndex, Posting};
pub use store::{Document, DocumentStore, MemoryStore};
