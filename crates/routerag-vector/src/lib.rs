//! In-memory dense index: one vector per document of an ingestion batch,
//! ranked against a query vector by cosine similarity.

use anyhow::{bail, Result};
use tracing::debug;

use routerag_core::types::{sort_hits, RankedHit, SourceKind};

pub struct DenseIndex {
    vectors: Vec<Vec<f32>>,
    norms: Vec<f32>,
    dim: usize,
}

impl DenseIndex {
    /// Builds the index for a batch of `doc_count` documents.
    ///
    /// Fails unless there is exactly one vector per document and every vector
    /// has the same non-zero dimensionality and only finite components.
    pub fn build(doc_count: usize, vectors: Vec<Vec<f32>>) -> Result<Self> {
        if vectors.len() != doc_count {
            bail!("embedding returned {} vectors for {} documents", vectors.len(), doc_count);
        }
        let dim = vectors.first().map_or(0, Vec::len);
        if doc_count > 0 && dim == 0 { bail!("embedding returned empty vectors"); }
        if let Some((i, v)) = vectors.iter().enumerate().find(|(_, v)| v.len() != dim) {
            bail!("vector {} has dimension {} but the batch uses {}", i, v.len(), dim);
        }
        if let Some(i) = vectors.iter().position(|v| !all_finite(v)) {
            bail!("vector {} has non-finite components", i);
        }
        let norms = vectors.iter().map(|v| norm(v)).collect();
        debug!(docs = doc_count, dim, "dense index built");
        Ok(Self { vectors, norms, dim })
    }

    pub fn len(&self) -> usize { self.vectors.len() }

    pub fn is_empty(&self) -> bool { self.vectors.is_empty() }

    /// Dimensionality shared by every entry; 0 for an empty index.
    pub fn dim(&self) -> usize { self.dim }

    /// Ranks every document by cosine similarity to `query_vec`, best first,
    /// ties by insertion order.
    pub fn rank(&self, query_vec: &[f32], depth: Option<usize>) -> Result<Vec<RankedHit>> {
        if self.is_empty() { return Ok(Vec::new()); }
        if query_vec.len() != self.dim {
            bail!("query vector has dimension {} but the index uses {}", query_vec.len(), self.dim);
        }
        if !all_finite(query_vec) { bail!("query vector has non-finite components"); }
        let q_norm = norm(query_vec);
        let mut hits: Vec<RankedHit> = self
            .vectors
            .iter()
            .zip(&self.norms)
            .enumerate()
            .map(|(ordinal, (v, v_norm))| RankedHit {
                ordinal,
                score: cosine(query_vec, q_norm, v, *v_norm),
                source: SourceKind::Dense,
            })
            .collect();
        sort_hits(&mut hits);
        if let Some(depth) = depth { hits.truncate(depth); }
        Ok(hits)
    }
}

fn all_finite(v: &[f32]) -> bool { v.iter().all(|x| x.is_finite()) }

fn norm(v: &[f32]) -> f32 { v.iter().map(|x| x * x).sum::<f32>().sqrt() }

fn cosine(a: &[f32], a_norm: f32, b: &[f32], b_norm: f32) -> f32 {
    if a_norm <= f32::EPSILON || b_norm <= f32::EPSILON { return 0.0; }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    dot / (a_norm * b_norm)
}
