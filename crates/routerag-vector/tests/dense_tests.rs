use routerag_core::types::SourceKind;
use routerag_vector::DenseIndex;

fn axes() -> Vec<Vec<f32>> {
    vec![vec![1.0, 0.0, 0.0], vec![0.0, 1.0, 0.0], vec![0.7, 0.7, 0.0]]
}

#[test]
fn ranks_every_document_by_cosine() {
    let index = DenseIndex::build(3, axes()).expect("build");
    assert_eq!(index.dim(), 3);
    let hits = index.rank(&[1.0, 0.1, 0.0], None).expect("rank");
    let ordinals: Vec<usize> = hits.iter().map(|h| h.ordinal).collect();
    assert_eq!(ordinals, vec![0, 2, 1]);
    assert!(hits.iter().all(|h| h.source == SourceKind::Dense));
    assert!(hits[0].score > hits[1].score && hits[1].score > hits[2].score);
}

#[test]
fn magnitude_does_not_matter() {
    let index = DenseIndex::build(2, vec![vec![10.0, 0.0], vec![0.0, 0.1]]).expect("build");
    let hits = index.rank(&[0.0, 5.0], None).expect("rank");
    assert_eq!(hits[0].ordinal, 1);
    assert!((hits[0].score - 1.0).abs() < 1e-6);
}

#[test]
fn ties_keep_insertion_order_and_depth_truncates() {
    let index = DenseIndex::build(3, vec![vec![1.0, 0.0]; 3]).expect("build");
    let hits = index.rank(&[1.0, 0.0], Some(2)).expect("rank");
    assert_eq!(hits.iter().map(|h| h.ordinal).collect::<Vec<_>>(), vec![0, 1]);
}

#[test]
fn count_mismatch_is_rejected() {
    let err = DenseIndex::build(4, axes()).err().expect("mismatch");
    assert!(err.to_string().contains("3 vectors for 4 documents"));
}

#[test]
fn mixed_dimensions_are_rejected() {
    assert!(DenseIndex::build(2, vec![vec![1.0, 0.0], vec![1.0]]).is_err());
}

#[test]
fn query_dimension_mismatch_is_an_error() {
    let index = DenseIndex::build(3, axes()).expect("build");
    assert!(index.rank(&[1.0, 0.0], None).is_err());
}

#[test]
fn empty_index_returns_nothing() {
    let index = DenseIndex::build(0, Vec::new()).expect("build");
    assert!(index.is_empty());
    assert!(index.rank(&[1.0, 2.0], None).expect("rank").is_empty());
}

#[test]
fn non_finite_vectors_are_rejected() {
    let vectors: Vec<Vec<f32>> = (0..200).map(|i| if i % 3 == 0 { vec![f32::NAN, 0.5] } else { vec![0.3, 0.7] }).collect();
    let err = DenseIndex::build(200, vectors).err().expect("nan vectors");
    assert!(err.to_string().contains("vector 0 has non-finite components"), "{err}");
    assert!(DenseIndex::build(1, vec![vec![f32::INFINITY, 1.0]]).is_err());
}

#[test]
fn non_finite_query_is_an_error() {
    let index = DenseIndex::build(3, axes()).expect("build");
    assert!(index.rank(&[f32::NAN, 1.0, 0.0], None).is_err());
}
