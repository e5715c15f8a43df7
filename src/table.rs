//! Concurrent k-mer → color table.
//!
//! Modeled on `suchapalaver-krust`'s [`dashmap`]-backed `KmerMap`
//! (`src/run.rs`, `src/dashmaps.rs`): a sharded concurrent map gives atomic
//! per-key updates without a hand-rolled spinlock.

use std::hash::BuildHasherDefault;

use dashmap::DashMap;
use rustc_hash::FxHasher;

use crate::color::ColorRepr;
use crate::kmer::KmerRepr;

type Fx = BuildHasherDefault<FxHasher>;

/// Concurrent mapping from canonical k-mer to the set of genomes it was
/// observed in.
///
/// `insert` is safe to call from many threads at once during ingestion;
/// once ingestion stops the table is simply no longer mutated, and
/// iteration may proceed without further locking concerns.
pub struct KmerTable<K: KmerRepr, C: ColorRepr> {
    map: DashMap<K, C, Fx>,
    genome_count: usize,
}

impl<K: KmerRepr, C: ColorRepr> KmerTable<K, C> {
    /// Creates an empty table for `genome_count` genomes.
    pub fn new(genome_count: usize) -> Self {
        Self {
            map: DashMap::with_hasher(Fx::default()),
            genome_count,
        }
    }

    /// ORs bit `genome` into the color for `kmer`, creating the entry if
    /// absent. Commutative and associative: the final table does not
    /// depend on insertion order or thread scheduling.
    pub fn insert(&self, kmer: K, genome: usize) {
        debug_assert!(genome < self.genome_count);
        self.map
            .entry(kmer)
            .and_modify(|c| c.set(genome))
            .or_insert_with(|| {
                let mut c = C::empty(self.genome_count);
                c.set(genome);
                c
            });
    }

    /// Number of distinct canonical k-mers recorded.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// True iff no k-mers have been recorded.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// The genome count this table was built for.
    pub fn genome_count(&self) -> usize {
        self.genome_count
    }

    /// Iterates every `(k-mer, color)` pair in the table. Safe to call
    /// concurrently with other readers once ingestion has stopped.
    pub fn for_each(&self, mut f: impl FnMut(&K, &C)) {
        for entry in self.map.iter() {
            f(entry.key(), entry.value());
        }
    }
}
