//! Compatibility filter.
//!
//! Both greedy filters scan already-ranked splits in descending-weight
//! order and keep a running "kept" set; they are deliberately
//! order-dependent, a single-threaded post-ranking sweep.

use crate::color::ColorRepr;
use crate::rank::RankedSplit;

/// Which compatibility constraint to enforce on the ranked split list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompatibilityMode {
    /// No filtering: every ranked split is retained.
    #[default]
    None,
    /// Strict pairwise ("1-tree") compatibility.
    Tree1,
    /// Weak ("2-tree") compatibility.
    Tree2,
}

/// Tests whether colors `a` and `b` (each representing a genome bipartition
/// under `n` total genomes) are pairwise compatible: at least one of the
/// four intersections of `{A, Ā} x {B, B̄}` is empty.
pub fn compatible<C: ColorRepr>(a: &C, b: &C, n: usize) -> bool {
    let a_comp = a.complement(n);
    let b_comp = b.complement(n);
    a.intersection(b).popcount() == 0
        || a.intersection(&b_comp).popcount() == 0
        || a_comp.intersection(b).popcount() == 0
        || a_comp.intersection(&b_comp).popcount() == 0
}

/// Applies the requested compatibility mode to `ranked` (assumed already in
/// descending-weight order, e.g. from
/// [`SplitList::into_sorted_vec`](crate::rank::SplitList::into_sorted_vec)).
pub fn apply_filter<C: ColorRepr>(
    ranked: Vec<RankedSplit<C>>,
    mode: CompatibilityMode,
    n: usize,
) -> Vec<RankedSplit<C>> {
    match mode {
        CompatibilityMode::None => ranked,
        CompatibilityMode::Tree1 => filter_tree1(ranked, n),
        CompatibilityMode::Tree2 => filter_tree2(ranked, n),
    }
}

/// Strict ("1-tree") filter: keep a split iff it is pairwise compatible
/// with every split already kept.
pub fn filter_tree1<C: ColorRepr>(ranked: Vec<RankedSplit<C>>, n: usize) -> Vec<RankedSplit<C>> {
    let mut kept: Vec<RankedSplit<C>> = Vec::new();
    for candidate in ranked {
        if kept.iter().all(|k| compatible(&k.color, &candidate.color, n)) {
            kept.push(candidate);
        }
    }
    kept
}

/// Weak ("2-tree") filter: a candidate `c` is rejected against already-kept
/// `a, b` only when all three pairs are strictly incompatible *and* all
/// three raw (non-complemented) pairwise intersections are non-empty —
/// a genuine 3-way conflict rather than a simple pairwise one. A candidate
/// compatible with at most one other kept split, or whose conflicts never
/// line up into such a triple, is admitted.
pub fn filter_tree2<C: ColorRepr>(ranked: Vec<RankedSplit<C>>, n: usize) -> Vec<RankedSplit<C>> {
    let mut kept: Vec<RankedSplit<C>> = Vec::new();
    for candidate in ranked {
        if !forms_forbidden_triple(&kept, &candidate.color, n) {
            kept.push(candidate);
        }
    }
    kept
}

fn forms_forbidden_triple<C: ColorRepr>(kept: &[RankedSplit<C>], c: &C, n: usize) -> bool {
    for i in 0..kept.len() {
        for j in (i + 1)..kept.len() {
            let a = &kept[i].color;
            let b = &kept[j].color;
            let all_incompatible =
                !compatible(a, b, n) && !compatible(a, c, n) && !compatible(b, c, n);
            if !all_incompatible {
                continue;
            }
            let raw_intersections_nonempty = a.intersection(b).popcount() > 0
                && a.intersection(c).popcount() > 0
                && b.intersection(c).popcount() > 0;
            if raw_intersections_nonempty {
                return true;
            }
        }
    }
    false
}
