//! Domain types shared by the sparse, dense and hybrid engines.

use serde::{Deserialize, Serialize};

pub type DocId = String;

/// An ingested document.
///
/// `id` is an opaque token assigned at ingestion, stable across re-ingestion
/// of an identical batch; callers should not parse it. `text` is the payload
/// handed in by the caller, unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocId,
    pub text: String,
}

impl Document {
    pub fn new(id: impl Into<DocId>, text: impl Into<String>) -> Self {
        Self { id: id.into(), text: text.into() }
    }
}

/// Indicates which ranking produced a hit.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum SourceKind {
    Sparse,
    Dense,
}

/// One entry of a ranked list.
///
/// `ordinal` is the document's position in its ingestion batch. `score` is
/// engine-specific (BM25 or cosine similarity) but higher is always better.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RankedHit {
    pub ordinal: usize,
    pub score: f32,
    pub source: SourceKind,
}

/// Orders hits by descending score, ties by ascending ordinal (insertion order).
pub fn sort_hits(hits: &mut [RankedHit]) {
    hits.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.ordinal.cmp(&b.ordinal)));
}
