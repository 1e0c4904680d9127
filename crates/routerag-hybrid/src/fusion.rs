//! Weighted Reciprocal Rank Fusion.
//!
//! For each document appearing in any list:
//!   score(d) = Σ w_i / (c + rank_i(d))
//! where rank_i(d) is the 1-based position in list i. Documents absent from a
//! list get no term from it and lists with weight 0 are skipped, so weights
//! (1, 0) reproduce the first list's order exactly.

use std::collections::HashMap;

use routerag_core::types::{RankedHit, SourceKind};

/// One ranked list with its fusion weight.
#[derive(Debug, Clone, Copy)]
pub struct WeightedList<'a> {
    pub weight: f64,
    pub hits: &'a [RankedHit],
}

#[derive(Debug, Clone, PartialEq)]
pub struct FusedHit {
    pub ordinal: usize,
    pub score: f64,
    /// Sum of the 1-based ranks over the lists the document appears in.
    pub rank_sum: usize,
    /// `(source, rank)` for every list that contributed.
    pub provenance: Vec<(SourceKind, usize)>,
}

impl FusedHit {
    pub fn rank_in(&self, source: SourceKind) -> Option<usize> {
        self.provenance.iter().find(|(s, _)| *s == source).map(|(_, r)| *r)
    }
}

/// Fuses `lists` with smoothing constant `c`.
///
/// Sorted by fused score descending, then lower rank sum, then insertion
/// order (ordinal).
pub fn weighted_rrf(lists: &[WeightedList<'_>], c: f64) -> Vec<FusedHit> {
    let mut by_ordinal: HashMap<usize, FusedHit> = HashMap::new();

    for list in lists.iter().filter(|l| l.weight > 0.0) {
        for (idx, hit) in list.hits.iter().enumerate() {
            let rank = idx + 1;
            let acc = by_ordinal.entry(hit.ordinal).or_insert_with(|| FusedHit {
                ordinal: hit.ordinal,
                score: 0.0,
                rank_sum: 0,
                provenance: Vec::new(),
            });
            acc.score += list.weight / (c + rank as f64);
            acc.rank_sum += rank;
            acc.provenance.push((hit.source, rank));
        }
    }

    let mut fused: Vec<FusedHit> = by_ordinal.into_values().collect();
    fused.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.rank_sum.cmp(&b.rank_sum))
            .then_with(|| a.ordinal.cmp(&b.ordinal))
    });
    fused
}
