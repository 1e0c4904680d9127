use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use routerag_core::config::RetrievalSettings;
use routerag_core::deadline::bounded;
use routerag_core::traits::{EmbeddingModel, Retriever};
use routerag_core::types::{Document, RankedHit, SourceKind};
use routerag_core::{Error, Result};
use routerag_text::SparseIndex;
use routerag_vector::DenseIndex;

use crate::fusion::{weighted_rrf, WeightedList};

/// A fused search result with the ranks that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredDocument {
    pub document: Document,
    pub score: f64,
    pub sparse_rank: Option<usize>,
    pub dense_rank: Option<usize>,
}

/// Everything built from one ingestion batch. Immutable once published.
struct Snapshot {
    generation: u64,
    documents: Vec<Document>,
    sparse: SparseIndex,
    dense: DenseIndex,
}

/// Owns the sparse/dense index pair and answers fused queries.
///
/// Each ingest builds a fresh pair off to the side and swaps it in whole, so
/// a search always runs against a single batch. A failed ingest leaves the
/// previous pair live.
pub struct RetrievalEngine {
    embedder: Arc<dyn EmbeddingModel>,
    settings: RetrievalSettings,
    embedding_timeout: Option<Duration>,
    current: RwLock<Option<Arc<Snapshot>>>,
    ingest_gate: Mutex<()>,
    generation: AtomicU64,
}

impl RetrievalEngine {
    pub fn new(embedder: Arc<dyn EmbeddingModel>, settings: RetrievalSettings) -> Result<Self> {
        settings.validate()?;
        Ok(Self {
            embedder,
            settings,
            embedding_timeout: None,
            current: RwLock::new(None),
            ingest_gate: Mutex::new(()),
            generation: AtomicU64::new(0),
        })
    }

    /// Bounds every embedding call made by this engine.
    pub fn with_embedding_timeout(mut self, limit: Option<Duration>) -> Self {
        self.embedding_timeout = limit;
        self
    }

    pub fn settings(&self) -> &RetrievalSettings { &self.settings }

    /// Number of successful ingests so far; 0 before the first.
    pub fn generation(&self) -> u64 { self.generation.load(Ordering::Acquire) }

    /// Size of the live batch.
    pub fn document_count(&self) -> usize {
        self.snapshot().map_or(0, |s| s.documents.len())
    }

    /// Replaces the live document set with `documents`.
    ///
    /// The whole batch goes to the embedding model in one call. On any failure
    /// the engine keeps serving the previous batch and returns
    /// [`Error::Ingestion`].
    pub async fn ingest(&self, documents: Vec<String>) -> Result<()> {
        let _gate = self.ingest_gate.lock().await;
        let generation = self.generation.load(Ordering::Acquire) + 1;
        let count = documents.len();

        let vectors = if documents.is_empty() {
            Vec::new()
        } else {
            bounded("embed_documents", self.embedding_timeout, self.embedder.embed_documents(&documents))
                .await
                .map_err(|e| Error::Ingestion(e.to_string()))?
        };
        let dense = DenseIndex::build(count, vectors).map_err(|e| Error::Ingestion(e.to_string()))?;
        let sparse = SparseIndex::build(documents.as_slice()).map_err(|e| Error::Ingestion(e.to_string()))?;

        let dim = dense.dim();
        let documents = documents
            .into_iter()
            .enumerate()
            .map(|(ordinal, text)| Document::new(ordinal.to_string(), text))
            .collect();
        let snapshot = Arc::new(Snapshot { generation, documents, sparse, dense });

        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Some(snapshot);
        self.generation.store(generation, Ordering::Release);
        info!(generation, documents = count, dim, "ingested batch");
        Ok(())
    }

    /// Fused results for `query`, best first, at most `top_k`.
    ///
    /// Returns an empty list before the first ingest, for `top_k == 0`, and
    /// when a ranking cannot be computed (logged). Query embedding failures
    /// propagate.
    pub async fn search_scored(&self, query: &str, top_k: usize) -> Result<Vec<ScoredDocument>> {
        if top_k == 0 { return Ok(Vec::new()); }
        let Some(snapshot) = self.snapshot() else {
            debug!("search before first ingest");
            return Ok(Vec::new());
        };
        if snapshot.documents.is_empty() { return Ok(Vec::new()); }

        let depth = self.settings.candidate_depth;
        let sparse_hits = if self.settings.sparse_weight > 0.0 {
            match snapshot.sparse.rank(query, depth) {
                Ok(hits) => hits,
                Err(e) => {
                    warn!(generation = snapshot.generation, error = %e, "sparse ranking failed");
                    return Ok(Vec::new());
                }
            }
        } else {
            Vec::new()
        };
        let dense_hits = if self.settings.dense_weight > 0.0 {
            let query_vec =
                bounded("embed_query", self.embedding_timeout, self.embedder.embed_query(query)).await?;
            match snapshot.dense.rank(&query_vec, depth) {
                Ok(hits) => hits,
                Err(e) => {
                    warn!(generation = snapshot.generation, error = %e, "dense ranking failed");
                    return Ok(Vec::new());
                }
            }
        } else {
            Vec::new()
        };

        Ok(self.fuse(&snapshot, &sparse_hits, &dense_hits, top_k))
    }

    fn fuse(
        &self,
        snapshot: &Snapshot,
        sparse_hits: &[RankedHit],
        dense_hits: &[RankedHit],
        top_k: usize,
    ) -> Vec<ScoredDocument> {
        let lists = [
            WeightedList { weight: self.settings.sparse_weight, hits: sparse_hits },
            WeightedList { weight: self.settings.dense_weight, hits: dense_hits },
        ];
        let fused = weighted_rrf(&lists, self.settings.rrf_c);
        debug!(
            generation = snapshot.generation,
            sparse = sparse_hits.len(),
            dense = dense_hits.len(),
            fused = fused.len(),
            "fused rankings"
        );
        fused
            .into_iter()
            .take(top_k)
            .filter_map(|hit| {
                let document = snapshot.documents.get(hit.ordinal)?.clone();
                Some(ScoredDocument {
                    document,
                    score: hit.score,
                    sparse_rank: hit.rank_in(SourceKind::Sparse),
                    dense_rank: hit.rank_in(SourceKind::Dense),
                })
            })
            .collect()
    }

    fn snapshot(&self) -> Option<Arc<Snapshot>> {
        self.current.read().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

#[async_trait]
impl Retriever for RetrievalEngine {
    async fn search(&self, query: &str, top_k: usize) -> Result<Vec<Document>> {
        let scored = self.search_scored(query, top_k).await?;
        Ok(scored.into_iter().map(|s| s.document).collect())
    }
}
