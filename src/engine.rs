//! The splits engine: owns the k-mer table, color counts, and ranked split
//! list across their lifecycle.
//!
//! Ingestion populates a k-mer table; sealing collapses it into
//! color-weight candidates and a bounded ranked split list; filtering then
//! trims that list down to a compatible subset. These three phases are
//! modeled as a type-state chain rather than a single struct with mutable
//! phase flags: an `Engine` can only ingest, a `ScoredSplits` can only be
//! filtered, and a `FilteredSplits` can only be emitted. Misuse (e.g.
//! calling `add_kmers` after sealing) is a compile error rather than a
//! runtime one.

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};

use crate::aggregate::aggregate;
use crate::color::ColorRepr;
use crate::emit::output_splits;
use crate::error::{ConfigError, EngineError, InputError};
use crate::filter::{apply_filter, CompatibilityMode};
use crate::ingest::{ingest_iupac, ingest_plain, IngestStats};
use crate::kmer::KmerRepr;
use crate::progress::ProgressTracker;
use crate::rank::{RankedSplit, SplitList};
use crate::table::KmerTable;

/// Validated, immutable run configuration.
#[derive(Debug, Clone, Copy)]
pub struct EngineConfig {
    k: usize,
    genome_count: usize,
    top_size: usize,
}

impl EngineConfig {
    /// Validates `k`, `genome_count`, and `top_size` (`T`) for the chosen
    /// k-mer representation `K`.
    ///
    /// # Errors
    /// Returns [`ConfigError`] if any value is zero, or if `k` exceeds what
    /// `K` can represent.
    pub fn new<K: KmerRepr>(k: usize, genome_count: usize, top_size: usize) -> Result<Self, ConfigError> {
        if top_size == 0 {
            return Err(ConfigError::TopSizeZero);
        }
        if k == 0 {
            return Err(ConfigError::KmerLengthZero);
        }
        if genome_count == 0 {
            return Err(ConfigError::GenomeCountZero);
        }
        if k > K::MAX_K {
            return Err(ConfigError::KmerLengthTooLarge { k, max: K::MAX_K });
        }
        Ok(Self {
            k,
            genome_count,
            top_size,
        })
    }

    #[must_use]
    pub fn k(&self) -> usize {
        self.k
    }

    #[must_use]
    pub fn genome_count(&self) -> usize {
        self.genome_count
    }

    #[must_use]
    pub fn top_size(&self) -> usize {
        self.top_size
    }
}

/// Summary of a completed or cancelled run, returned by [`Engine::seal`]
/// and carried through to the end of the pipeline.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunSummary {
    pub sequences_seen: u64,
    pub kmers_inserted: u64,
    pub windows_skipped: u64,
    pub splits_discarded: u64,
    pub splits_emitted: u64,
}

/// Ingestion-phase engine: owns the k-mer table, accepts
/// `add_kmers`/`add_kmers_iupac` calls, and can be cooperatively cancelled.
pub struct Engine<K: KmerRepr, C: ColorRepr> {
    config: EngineConfig,
    table: KmerTable<K, C>,
    cancelled: AtomicBool,
    progress: ProgressTracker,
    windows_skipped: std::sync::atomic::AtomicU64,
}

impl<K: KmerRepr, C: ColorRepr> Engine<K, C> {
    /// Starts a new run.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self {
            table: KmerTable::new(config.genome_count),
            config,
            cancelled: AtomicBool::new(false),
            progress: ProgressTracker::new(),
            windows_skipped: std::sync::atomic::AtomicU64::new(0),
        }
    }

    /// Requests cooperative cancellation; in-flight and future ingestion
    /// calls become no-ops returning [`EngineError::Cancelled`].
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn progress(&self) -> crate::progress::Progress {
        self.progress.snapshot()
    }

    /// Ingests a plain (non-ambiguous) sequence.
    ///
    /// # Errors
    /// Returns [`InputError::GenomeIndexOutOfRange`] if `genome` is out of
    /// range, or [`EngineError::Cancelled`] if the run was cancelled.
    pub fn add_kmers(&self, sequence: &[u8], genome: usize) -> Result<(), EngineError> {
        self.check_genome(genome)?;
        if self.is_cancelled() {
            return Err(EngineError::Cancelled);
        }
        let stats = ingest_plain(&self.table, sequence, self.config.k, genome);
        self.record(stats);
        Ok(())
    }

    /// Ingests a sequence with IUPAC ambiguity expansion.
    ///
    /// # Errors
    /// Same as [`Engine::add_kmers`].
    pub fn add_kmers_iupac(
        &self,
        sequence: &[u8],
        genome: usize,
        max_iupac: usize,
    ) -> Result<(), EngineError> {
        self.check_genome(genome)?;
        if self.is_cancelled() {
            return Err(EngineError::Cancelled);
        }
        let stats = ingest_iupac(&self.table, sequence, self.config.k, genome, max_iupac);
        self.record(stats);
        Ok(())
    }

    fn check_genome(&self, genome: usize) -> Result<(), EngineError> {
        if genome >= self.config.genome_count {
            return Err(InputError::GenomeIndexOutOfRange {
                index: genome,
                genome_count: self.config.genome_count,
            }
            .into());
        }
        Ok(())
    }

    fn record(&self, stats: IngestStats) {
        self.progress.record_sequence(stats.kmers_inserted);
        self.windows_skipped
            .fetch_add(stats.windows_skipped, Ordering::Relaxed);
    }

    /// Seals the k-mer table and crosses the phase barrier: aggregates into
    /// color-weight candidates, scores with `weight_fn`, and builds the
    /// bounded top-`T` split list. Consumes the engine; no further
    /// ingestion is possible.
    ///
    /// # Errors
    /// Returns [`EngineError::Cancelled`] if the run was cancelled before
    /// sealing; KT is discarded and no splits are produced.
    pub fn seal(
        self,
        weight_fn: impl Fn(u32, u32) -> f64,
    ) -> Result<(ScoredSplits<C>, RunSummary), EngineError> {
        if self.is_cancelled() {
            return Err(EngineError::Cancelled);
        }

        let progress = self.progress.snapshot();
        let windows_skipped = self.windows_skipped.load(Ordering::Relaxed);
        let outcome = aggregate(&self.table, weight_fn);

        let mut candidates = outcome.candidates;
        // Deterministic insertion order into the ranked list,
        // independent of the hash-map iteration order `aggregate` draws
        // from.
        candidates.sort_by(|a, b| a.color.cmp(&b.color));

        let mut split_list = SplitList::new(self.config.top_size);
        for candidate in candidates {
            split_list.insert(candidate.weight, candidate.color);
        }

        let summary = RunSummary {
            sequences_seen: progress.sequences_processed,
            kmers_inserted: progress.kmers_inserted,
            windows_skipped,
            splits_discarded: outcome.discarded_weights,
            splits_emitted: 0,
        };

        Ok((
            ScoredSplits {
                genome_count: self.config.genome_count,
                ranked: split_list.into_sorted_vec(),
            },
            summary,
        ))
    }
}

/// Post-barrier, pre-filter phase: holds the bounded, ranked split list.
pub struct ScoredSplits<C: ColorRepr> {
    genome_count: usize,
    ranked: Vec<RankedSplit<C>>,
}

impl<C: ColorRepr> ScoredSplits<C> {
    /// Applies a compatibility filter, consuming this phase.
    #[must_use]
    pub fn filter(self, mode: CompatibilityMode) -> FilteredSplits<C> {
        let kept = apply_filter(self.ranked, mode, self.genome_count);
        FilteredSplits {
            genome_count: self.genome_count,
            kept,
        }
    }
}

/// Final, emit-ready phase.
pub struct FilteredSplits<C: ColorRepr> {
    genome_count: usize,
    kept: Vec<RankedSplit<C>>,
}

impl<C: ColorRepr> FilteredSplits<C> {
    /// Number of splits retained after filtering.
    #[must_use]
    pub fn len(&self) -> usize {
        self.kept.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.kept.is_empty()
    }

    /// Writes the retained splits.
    ///
    /// # Errors
    /// Propagates I/O errors from `writer`.
    pub fn output_splits(&self, writer: &mut impl Write, names: &[String]) -> io::Result<()> {
        debug_assert_eq!(names.len(), self.genome_count);
        output_splits(writer, &self.kept, names)
    }
}
