//! routerag-text
//!
//! BM25 sparse index over one ingestion batch, held in a RAM-backed Tantivy
//! index. Documents are tokenized with a lowercasing, stop-word filtering
//! analyzer; runs of CJK text without separators form single terms.

pub mod tantivy_utils;
pub mod sparse;

pub use sparse::SparseIndex;
