//! Offline embedding model for the retrieval engine.
//!
//! [`HashingEmbedder`] projects text features into a fixed number of buckets
//! with xxHash and L2-normalizes the result. It needs no model files, is
//! deterministic across runs and keeps lexically similar texts close, which is
//! what development, tests and the CLI need from a dense index.

use std::hash::{Hash, Hasher};

use async_trait::async_trait;
use twox_hash::XxHash64;

use routerag_core::error::{Error, Result};
use routerag_core::traits::EmbeddingModel;

pub mod features;
pub mod pool;

pub use pool::l2_normalize;

pub struct HashingEmbedder { dim: usize }

impl HashingEmbedder {
    pub fn new(dim: usize) -> Result<Self> {
        if dim == 0 { return Err(Error::Configuration("embedding dimension must be > 0".into())); }
        Ok(Self { dim })
    }

    pub fn dim(&self) -> usize { self.dim }

    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut v = vec![0f32; self.dim];
        for (i, token) in features::features(text).iter().enumerate() {
            let mut hasher = XxHash64::with_seed(0);
            token.hash(&mut hasher);
            let h = hasher.finish();
            let idx = (h % self.dim as u64) as usize;
            let val = (((h >> 32) as u32) as f32) / (u32::MAX as f32);
            v[idx] += 0.5 + val * 0.5 + (i as f32 % 3.0) * 0.01;
        }
        l2_normalize(&mut v);
        v
    }
}

#[async_trait]
impl EmbeddingModel for HashingEmbedder {
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_text(t)).collect())
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.embed_text(text))
    }
}
