//! # sans-rs
//!
//! An alignment-free, k-mer-based phylogenetic split computer (SANS-style):
//! for every distinct k-mer observed across a collection of input genomes,
//! records the set of genomes containing it (its *color*), scores each
//! resulting bipartition, ranks the top-`T` splits by weight, and
//! optionally filters them down to a tree- or network-compatible subset.
//!
//! ```text
//! sequences -> [ingest]  -> KT (k-mer -> color)
//!                        -> [aggregate] -> CW (color -> pos/neg counts)
//!                        -> [rank]      -> SL (bounded top-T splits)
//!                        -> [filter]    -> compatible subset
//!                        -> [emit]      -> TSV split list
//! ```
//!
//! The library is organized as one module per pipeline stage; [`engine`]
//! wires them together behind a small type-state API so that, for example,
//! ingestion calls cannot compile after the run has been sealed.

pub mod aggregate;
pub mod color;
pub mod emit;
pub mod engine;
pub mod error;
pub mod filter;
pub mod ingest;
pub mod iupac;
pub mod kmer;
pub mod progress;
pub mod rank;
pub mod table;
pub mod weight;

pub use color::{ColorRepr, PackedColor, WideColor};
pub use engine::{Engine, EngineConfig, FilteredSplits, RunSummary, ScoredSplits};
pub use error::{ConfigError, EngineError, InputError};
pub use filter::CompatibilityMode;
pub use kmer::{KmerRepr, PackedKmer, WideKmer};
