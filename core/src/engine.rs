use parking_lot::{Mutex, RwLock, RwLockReadGuard};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use crate::cache::ResultCache;
use crate::error::{Result, SearchError};
use crate::highlight::highlight;
use crate::index::{DocId, InvertedIndex};
use crate::store::DocumentStore;
use crate::tokenizer::normalize;

/// How long ranked results stay cached before expiring on their own.
pub const RESULT_CACHE_TTL: Duration = Duration::from_secs(300);

/// Context on either side of the highlighted match, in bytes.
pub const HIGHLIGHT_WINDOW: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RebuildScope {
    AllDocuments,
    OneDocument(DocId),
}

#[derive(Debug, Default, Clone, Serialize)]
pub struct RebuildReport {
    pub processed: usize,
    pub failed: Vec<DocId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedResult {
    pub id: DocId,
    pub title: String,
    pub score: f64,
    pub matched_terms: Vec<String>,
    pub snippet: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchOutcome {
    pub query_terms: Vec<String>,
    pub results: Vec<RankedResult>,
}

/// Owns the inverted index, the result cache, and a handle to the document
/// store. Searches share a read lock; rebuilds are serialized by a
/// dedicated mutex and publish their changes through a brief write lock, so
/// a search observes either the pre- or post-rebuild index, never a mix.
pub struct SearchEngine<S> {
    store: Arc<S>,
    index: RwLock<InvertedIndex>,
    cache: ResultCache,
    rebuild_lock: Mutex<()>,
}

impl<S: DocumentStore> SearchEngine<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            index: RwLock::new(InvertedIndex::new()),
            cache: ResultCache::new(RESULT_CACHE_TTL),
            rebuild_lock: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Read access to the live index, shared with concurrent searches.
    pub fn index(&self) -> RwLockReadGuard<'_, InvertedIndex> {
        self.index.read()
    }

    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    /// Rebuild the index for the given scope, then recompute tf-idf for
    /// every posting against the current full document set and invalidate
    /// the result cache. Concurrent rebuild requests queue here.
    pub fn rebuild(&self, scope: RebuildScope) -> Result<RebuildReport> {
        let _serialized = self.rebuild_lock.lock();
        let report = match scope {
            RebuildScope::AllDocuments => self.rebuild_all()?,
            RebuildScope::OneDocument(id) => self.rebuild_one(id)?,
        };
        // The swap above is already visible to readers; stale entries from
        // before the rebuild must not outlive it.
        self.cache.invalidate_all();
        Ok(report)
    }

    fn rebuild_all(&self) -> Result<RebuildReport> {
        // Fetch each document individually so one failing read only drops
        // that document's contribution instead of aborting the rebuild.
        let ids: Vec<DocId> = self.store.get_all()?.into_iter().map(|d| d.id).collect();
        let total_docs = self.store.count()?;

        let mut fresh = InvertedIndex::new();
        let mut report = RebuildReport::default();
        for id in ids {
            match self.store.get(id) {
                Ok(doc) => {
                    let (term_counts, length) = derive_entries(&doc.content);
                    fresh.insert_document(doc.id, &term_counts, length);
                    report.processed += 1;
                }
                Err(err) => {
                    tracing::warn!(doc_id = id, %err, "skipping document during rebuild");
                    report.failed.push(id);
                }
            }
        }
        fresh.recompute_weights(total_docs)?;

        let num_terms = fresh.term_count();
        *self.index.write() = fresh;
        tracing::info!(num_docs = report.processed, num_terms, "index rebuilt");
        Ok(report)
    }

    fn rebuild_one(&self, doc_id: DocId) -> Result<RebuildReport> {
        // Fetch before touching the index: a missing document must leave
        // the index exactly as it was.
        let doc = self.store.get(doc_id)?;
        let total_docs = self.store.count()?;
        let (term_counts, length) = derive_entries(&doc.content);

        let mut index = self.index.write();
        index.remove_document(doc_id);
        index.insert_document(doc_id, &term_counts, length);
        index.recompute_weights(total_docs)?;
        drop(index);

        tracing::debug!(doc_id, length, "document reindexed");
        Ok(RebuildReport { processed: 1, failed: Vec::new() })
    }

    /// Rank documents against a free-text query, best first. Ties in score
    /// break toward the lower document id so ordering is deterministic.
    pub fn search(&self, query: &str, limit: usize) -> Result<SearchOutcome> {
        let query_terms = normalize(query);
        if query_terms.is_empty() || limit == 0 {
            return Ok(SearchOutcome { query_terms, results: Vec::new() });
        }

        let signature = query_terms.join(" ");
        if let Some(results) = self.cache.get(&signature, limit) {
            return Ok(SearchOutcome { query_terms, results });
        }

        let index = self.index.read();

        // Sum posting weights per document. Query terms are deliberately
        // not deduplicated: a repeated term contributes twice.
        let mut scores: HashMap<DocId, f64> = HashMap::new();
        for term in &query_terms {
            if let Some(postings) = index.postings(term) {
                for posting in postings {
                    *scores.entry(posting.doc_id).or_insert(0.0) += posting.weight;
                }
            }
        }

        let mut ranked: Vec<(DocId, f64)> = scores.into_iter().collect();
        ranked.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });
        ranked.truncate(limit);

        let mut results = Vec::with_capacity(ranked.len());
        for (doc_id, score) in ranked {
            let doc = self.store.get(doc_id).map_err(|err| match err {
                SearchError::NotFound(id) => SearchError::IndexInconsistency(format!(
                    "ranked document {id} is missing from the store"
                )),
                other => other,
            })?;
            let matched_terms = matched_terms(&index, &query_terms, doc_id);
            let snippet = highlight(&doc.content, &query_terms, HIGHLIGHT_WINDOW);
            results.push(RankedResult {
                id: doc_id,
                title: doc.title,
                score: round3(score),
                matched_terms,
                snippet,
            });
        }
        // Write back while still holding the read lock: a rebuild cannot
        // take the write lock until this guard drops, so its invalidation
        // is ordered after this put and stale results never outlive it.
        self.cache.put(signature, limit, results.clone());
        drop(index);

        Ok(SearchOutcome { query_terms, results })
    }
}

fn derive_entries(content: &str) -> (HashMap<String, u32>, usize) {
    let tokens = normalize(content);
    let length = tokens.len();
    let mut term_counts: HashMap<String, u32> = HashMap::new();
    for token in tokens {
        *term_counts.entry(token).or_insert(0) += 1;
    }
    (term_counts, length)
}

/// Query terms with a posting in `doc_id`, deduplicated in first-occurrence
/// order.
fn matched_terms(index: &InvertedIndex, query_terms: &[String], doc_id: DocId) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut matched = Vec::new();
    for term in query_terms {
        if seen.insert(term.as_str()) && index.has_posting(term, doc_id) {
            matched.push(term.clone());
        }
    }
    matched
}

fn round3(score: f64) -> f64 {
    (score * 1000.0).round() / 1000.0
}
