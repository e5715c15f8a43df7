//! Color aggregator.
//!
//! Runs once, single-threaded, after the ingestion phase: collapses the
//! sealed [`KmerTable`](crate::table::KmerTable) into a
//! canonical-color → `(pos_count, neg_count)` map, then scores each entry
//! with a caller-supplied weight function.

use std::collections::HashMap;

use crate::color::ColorRepr;
use crate::kmer::KmerRepr;
use crate::table::KmerTable;

/// Occurrence counts for a canonical color: how many distinct k-mers mapped
/// to the color itself (`pos_count`) versus to its complement (`neg_count`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColorCounts {
    pub pos_count: u32,
    pub neg_count: u32,
}

/// A scored, not-yet-ranked split candidate.
#[derive(Debug, Clone)]
pub struct SplitCandidate<C> {
    pub color: C,
    pub weight: f64,
}

/// Result of running the aggregator: the candidates worth ranking, plus a
/// count of entries discarded along the way (for logging/diagnostics).
#[derive(Debug, Default)]
pub struct AggregateOutcome<C> {
    pub candidates: Vec<SplitCandidate<C>>,
    /// Entries whose weight function produced a non-finite or non-positive
    /// result; these are discarded with a logged count rather than treated
    /// as a hard error.
    pub discarded_weights: u64,
}

/// Collapses `table` into a canonical-color count map and scores every
/// entry with `weight_fn`, skipping trivial colors and non-positive or
/// non-finite weights.
pub fn aggregate<K, C>(
    table: &KmerTable<K, C>,
    weight_fn: impl Fn(u32, u32) -> f64,
) -> AggregateOutcome<C>
where
    K: KmerRepr,
    C: ColorRepr,
{
    let n = table.genome_count();
    let mut cw: HashMap<C, ColorCounts> = HashMap::new();

    table.for_each(|_kmer, color| {
        if color.is_trivial(n) {
            return;
        }
        let canonical = color.canonical(n);
        let entry = cw.entry(canonical.clone()).or_default();
        if canonical == *color {
            entry.pos_count += 1;
        } else {
            entry.neg_count += 1;
        }
    });

    let mut outcome = AggregateOutcome::default();
    for (color, counts) in cw {
        if counts.pos_count + counts.neg_count == 0 {
            continue;
        }
        let w = weight_fn(counts.pos_count, counts.neg_count);
        if !w.is_finite() || w <= 0.0 {
            outcome.discarded_weights += 1;
            tracing::debug!(weight = w, "discarding split with non-positive or non-finite weight");
            continue;
        }
        if color.is_trivial(n) {
            continue;
        }
        outcome.candidates.push(SplitCandidate { color, weight: w });
    }
    outcome
}
