use routerag_core::traits::EmbeddingModel;
use routerag_core::Error;
use routerag_embed::{l2_normalize, HashingEmbedder};

fn cosine(a: &[f32], b: &[f32]) -> f32 { a.iter().zip(b).map(|(x, y)| x * y).sum() }

#[tokio::test]
async fn shapes_and_determinism() {
    let embedder = HashingEmbedder::new(128).expect("embedder");
    let texts = vec!["hello world".to_string(), "hello world".to_string()];
    let embs = embedder.embed_documents(&texts).await.expect("embed_documents");
    assert_eq!(embs.len(), 2);
    let v1 = &embs[0];
    let v2 = &embs[1];

    assert_eq!(v1.len(), 128, "embedding dim is 128");

    let norm: f32 = v1.iter().map(|x| x * x).sum::<f32>().sqrt();
    assert!((norm - 1.0).abs() <= 1e-3, "vector is L2-normalized (norm={norm})");

    for (a, b) in v1.iter().zip(v2.iter()) { assert!((a - b).abs() <= 1e-6); }

    let q = embedder.embed_query("hello world").await.expect("embed_query");
    assert_eq!(&q, v1, "queries and documents share one projection");
}

#[tokio::test]
async fn overlapping_texts_are_closer() {
    let embedder = HashingEmbedder::new(256).expect("embedder");
    let q = embedder.embed_query("混合搜索 准确性").await.unwrap();
    let near = embedder.embed_query("混合搜索结合了稀疏和密集索引，以提高检索准确性。").await.unwrap();
    let far = embedder.embed_query("LangGraph是一个强大的工具，用于构建复杂的Agent流程。").await.unwrap();
    assert!(cosine(&q, &near) > cosine(&q, &far));
}

#[test]
fn empty_text_embeds_to_zero_vector() {
    let embedder = HashingEmbedder::new(8).expect("embedder");
    assert!(embedder.embed_text("  ").iter().all(|x| *x == 0.0));
}

#[test]
fn zero_dimension_is_rejected() {
    assert!(matches!(HashingEmbedder::new(0), Err(Error::Configuration(_))));
}

#[test]
fn l2_normalize_basic() {
    let mut v = [3.0f32, 4.0];
    l2_normalize(&mut v);
    assert!((v[0] - 0.6).abs() < 1e-6 && (v[1] - 0.8).abs() < 1e-6);
    let mut zero = [0.0f32; 3];
    l2_normalize(&mut zero);
    assert_eq!(zero, [0.0; 3]);
}
