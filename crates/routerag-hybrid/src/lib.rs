//! Hybrid retrieval: BM25 and dense rankings over the same ingestion batch,
//! combined with weighted reciprocal rank fusion.

pub mod engine;
pub mod fusion;

pub use engine::{RetrievalEngine, ScoredDocument};
pub use fusion::{weighted_rrf, FusedHit, WeightedList};
