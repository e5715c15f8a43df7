//! Error types for the splits engine.
//!
//! Configuration errors halt the engine, per-sequence input errors are
//! reported and the offending sequence is skipped, and cancellation unwinds
//! without emitting output.

use thiserror::Error;

/// Errors raised while constructing or configuring an [`crate::engine::Engine`].
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// `top_size` (the split top-list bound `T`) was zero.
    #[error("top list size must be greater than zero")]
    TopSizeZero,

    /// `k` was zero.
    #[error("k-mer length must be greater than zero")]
    KmerLengthZero,

    /// `k` exceeded what the chosen k-mer representation can hold.
    #[error("k-mer length {k} exceeds the maximum of {max} supported bases")]
    KmerLengthTooLarge {
        /// The requested k-mer length.
        k: usize,
        /// The maximum length the representation supports.
        max: usize,
    },

    /// `genome_count` (`N`) was zero.
    #[error("genome count must be greater than zero")]
    GenomeCountZero,
}

/// Errors raised while ingesting a single sequence.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum InputError {
    /// A genome index was `>= genome_count`.
    #[error("genome index {index} is out of range for {genome_count} genomes")]
    GenomeIndexOutOfRange {
        /// The offending index.
        index: usize,
        /// The configured genome count (`N`).
        genome_count: usize,
    },
}

/// Top-level error type for engine operations.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum EngineError {
    /// A configuration error; halts the engine.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// An input error for a single ingestion call; the caller should skip
    /// the offending sequence and continue.
    #[error("invalid input: {0}")]
    Input(#[from] InputError),

    /// Cooperative cancellation was observed.
    #[error("operation cancelled")]
    Cancelled,
}
