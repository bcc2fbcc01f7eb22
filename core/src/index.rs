use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{Result, SearchError};

pub type DocId = u64;

/// One (term, document) entry. At most one posting exists per pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Posting {
    pub doc_id: DocId,
    pub frequency: u32,
    pub weight: f64,
}

/// Term-keyed postings plus per-document token counts. Posting lists are
/// kept sorted by ascending doc id. Mutated only by the rebuild path; the
/// ranking path reads it behind a lock.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct InvertedIndex {
    postings: HashMap<String, Vec<Posting>>,
    doc_lengths: HashMap<DocId, usize>,
}

impl InvertedIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn postings(&self, term: &str) -> Option<&[Posting]> {
        self.postings.get(term).map(Vec::as_slice)
    }

    /// Number of distinct documents holding `term`.
    pub fn document_frequency(&self, term: &str) -> usize {
        self.postings.get(term).map_or(0, Vec::len)
    }

    pub fn doc_length(&self, doc_id: DocId) -> Option<usize> {
        self.doc_lengths.get(&doc_id).copied()
    }

    pub fn term_count(&self) -> usize {
        self.postings.len()
    }

    pub fn doc_count(&self) -> usize {
        self.doc_lengths.len()
    }

    pub fn has_posting(&self, term: &str, doc_id: DocId) -> bool {
        self.postings
            .get(term)
            .map_or(false, |plist| plist.binary_search_by_key(&doc_id, |p| p.doc_id).is_ok())
    }

    /// Drop every posting and the length entry for one document.
    pub(crate) fn remove_document(&mut self, doc_id: DocId) {
        self.postings.retain(|_, plist| {
            if let Ok(i) = plist.binary_search_by_key(&doc_id, |p| p.doc_id) {
                plist.remove(i);
            }
            !plist.is_empty()
        });
        self.doc_lengths.remove(&doc_id);
    }

    /// Insert freshly derived postings for one document. Weights start at
    /// zero; `recompute_weights` fills them in once all scopes are applied.
    pub(crate) fn insert_document(
        &mut self,
        doc_id: DocId,
        term_counts: &HashMap<String, u32>,
        length: usize,
    ) {
        self.doc_lengths.insert(doc_id, length);
        for (term, &frequency) in term_counts {
            let plist = self.postings.entry(term.clone()).or_default();
            let posting = Posting { doc_id, frequency, weight: 0.0 };
            match plist.binary_search_by_key(&doc_id, |p| p.doc_id) {
                Ok(i) => plist[i] = posting,
                Err(i) => plist.insert(i, posting),
            }
        }
    }

    /// Recompute tf-idf for every posting of every term against the current
    /// full document set. idf = ln(total / (df + 1)); a total of zero makes
    /// every weight zero rather than dividing by anything. Negative idf is
    /// legitimate (near-ubiquitous terms) and is not clamped.
    pub(crate) fn recompute_weights(&mut self, total_docs: usize) -> Result<()> {
        for (term, plist) in self.postings.iter_mut() {
            let df = plist.len();
            let idf = if total_docs == 0 {
                0.0
            } else {
                (total_docs as f64 / (df as f64 + 1.0)).ln()
            };
            for posting in plist.iter_mut() {
                let length = self.doc_lengths.get(&posting.doc_id).copied().ok_or_else(|| {
                    SearchError::IndexInconsistency(format!(
                        "posting for term '{term}' references document {} with no length entry",
                        posting.doc_id
                    ))
                })?;
                let tf = f64::from(posting.frequency) / length.max(1) as f64;
                posting.weight = tf * idf;
            }
        }
        Ok(())
    }
}
