use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::error::{Result, SearchError};
use crate::index::DocId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocId,
    pub title: String,
    pub content: String,
    pub created_at: String,
}

/// The store that owns document identity and raw text. The engine only ever
/// reads immutable snapshots and never writes documents itself.
pub trait DocumentStore: Send + Sync {
    fn get(&self, id: DocId) -> Result<Document>;
    fn get_all(&self) -> Result<Vec<Document>>;
    fn count(&self) -> Result<usize>;
    fn create(&self, title: &str, content: &str) -> Result<Document>;
}

/// In-memory store; the index is rebuilt from it rather than persisted.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<StoreInner>,
}

#[derive(Default)]
struct StoreInner {
    docs: BTreeMap<DocId, Document>,
    next_id: DocId,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DocumentStore for MemoryStore {
    fn get(&self, id: DocId) -> Result<Document> {
        self.inner
            .read()
            .docs
            .get(&id)
            .cloned()
            .ok_or(SearchError::NotFound(id))
    }

    fn get_all(&self) -> Result<Vec<Document>> {
        Ok(self.inner.read().docs.values().cloned().collect())
    }

    fn count(&self) -> Result<usize> {
        Ok(self.inner.read().docs.len())
    }

    fn create(&self, title: &str, content: &str) -> Result<Document> {
        let mut inner = self.inner.write();
        inner.next_id += 1;
        let id = inner.next_id;
        let title = if title.trim().is_empty() { "Untitled" } else { title };
        let created_at = OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .map_err(|err| SearchError::Dependency(format!("timestamp formatting failed: {err}")))?;
        let doc = Document {
            id,
            title: title.to_string(),
            content: content.to_string(),
            created_at,
        };
        inner.docs.insert(id, doc.clone());
        Ok(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_assigns_increasing_ids() {
        let store = MemoryStore::new();
        let a = store.create("first", "text a").unwrap();
        let b = store.create("second", "text b").unwrap();
        assert!(b.id > a.id);
        assert_eq!(store.count().unwrap(), 2);
        assert!(!a.created_at.is_empty());
    }

    #[test]
    fn get_returns_not_found_for_missing_ids() {
        let store = MemoryStore::new();
        let err = store.get(42).unwrap_err();
        assert!(matches!(err, SearchError::NotFound(42)));
    }

    #[test]
    fn blank_titles_default_to_untitled() {
        let store = MemoryStore::new();
        let doc = store.create("  ", "body").unwrap();
        assert_eq!(doc.title, "Untitled");
    }

    #[test]
    fn get_all_returns_documents_in_id_order() {
        let store = MemoryStore::new();
        store.create("a", "one").unwrap();
        store.create("b", "two").unwrap();
        let all = store.get_all().unwrap();
        assert_eq!(all.len(), 2);
        assert!(all[0].id < all[1].id);
    }
}
