#![allow(clippy::expect_used)]

//! Command-line front end for the splits engine.
//!
//! Reads one or more FASTA files (one per genome), ingests them in
//! parallel, scores and ranks splits, optionally filters for
//! tree-compatibility, and writes the result as TSV to stdout.

use std::path::PathBuf;
use std::process;

use bio::io::fasta::Reader;
use clap::{Parser, ValueEnum};
use colored::Colorize;
use rayon::prelude::*;
use sans_rs::color::{PackedColor, WideColor};
use sans_rs::filter::CompatibilityMode;
use sans_rs::kmer::{PackedKmer, WideKmer};
use sans_rs::weight::{arithmetic_mean, geometric_mean};
use sans_rs::{Engine, EngineConfig};
use tracing_subscriber::EnvFilter;

/// Computes phylogenetic splits from a set of FASTA genomes using an
/// alignment-free, k-mer-based method.
#[derive(Parser, Debug)]
#[command(name = "sans-rs")]
#[command(version, author, about, long_about = None)]
struct Args {
    /// K-mer length (1-32 uses a packed representation; larger values use
    /// an arbitrary-width one).
    #[arg(short = 'k', long, default_value_t = 31)]
    k: usize,

    /// One FASTA file per genome; the genome's name is its filename stem.
    #[arg(required = true)]
    genomes: Vec<PathBuf>,

    /// Number of top-weighted splits to retain.
    #[arg(short = 'T', long = "top", default_value_t = 1000)]
    top_size: usize,

    /// Weight function combining per-split positive/negative occurrence
    /// counts into a score.
    #[arg(long, value_enum, default_value = "mean")]
    weight: WeightFn,

    /// Compatibility filter applied to the ranked split list.
    #[arg(long, value_enum, default_value = "none")]
    filter: FilterMode,

    /// Maximum IUPAC ambiguity-code expansion set size per window; when
    /// unset, sequences containing ambiguity codes are ingested in plain
    /// mode (non-ACGT bytes reset the window).
    #[arg(long)]
    max_iupac: Option<usize>,

    /// Suppress informational output on stderr.
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum WeightFn {
    Mean,
    Geometric,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FilterMode {
    None,
    Tree1,
    Tree2,
}

impl From<FilterMode> for CompatibilityMode {
    fn from(mode: FilterMode) -> Self {
        match mode {
            FilterMode::None => CompatibilityMode::None,
            FilterMode::Tree1 => CompatibilityMode::Tree1,
            FilterMode::Tree2 => CompatibilityMode::Tree2,
        }
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
}

fn genome_name(path: &std::path::Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Reads every FASTA record from `path` and concatenates their sequences
/// into one byte buffer (a multi-record FASTA file is treated as a single
/// genome, matching the "one genome per input" external interface).
fn read_genome(path: &std::path::Path) -> Result<bytes::Bytes, Box<dyn std::error::Error>> {
    let reader = Reader::from_file(path)?;
    let mut buf = Vec::new();
    for record in reader.records() {
        let record = record?;
        buf.extend_from_slice(record.seq());
    }
    Ok(bytes::Bytes::from(buf))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    #[test]
    fn genome_name_uses_file_stem() {
        let path = std::path::Path::new("/data/genomes/ecoli.fasta");
        assert_eq!(genome_name(path), "ecoli");
    }

    #[test]
    fn read_genome_concatenates_multi_record_files() {
        let mut file = tempfile::Builder::new()
            .suffix(".fasta")
            .tempfile()
            .unwrap();
        writeln!(file, ">seq1\nACGT\n>seq2\nTTAA").unwrap();
        file.flush().unwrap();

        let seq = read_genome(file.path()).unwrap();
        assert_eq!(seq.as_ref(), b"ACGTTTAA");
    }

    #[test]
    fn read_genome_rejects_missing_file() {
        let missing = std::path::Path::new("/nonexistent/path/genome.fasta");
        assert!(read_genome(missing).is_err());
    }
}

fn main() {
    init_tracing();
    let args = Args::parse();

    if let Err(e) = run(&args) {
        eprintln!("{} {}", "error:".red().bold(), e);
        process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let genome_count = args.genomes.len();
    if !args.quiet {
        eprintln!(
            "{} {} {} {} genomes",
            "sans-rs".bold(),
            format!("k={}", args.k).blue(),
            format!("top={}", args.top_size).blue(),
            genome_count
        );
    }

    let names: Vec<String> = args.genomes.iter().map(|p| genome_name(p)).collect();
    let sequences: Vec<bytes::Bytes> = args
        .genomes
        .par_iter()
        .map(|p| read_genome(p))
        .collect::<Result<Vec<_>, _>>()?;

    let weight_fn = match args.weight {
        WeightFn::Mean => arithmetic_mean,
        WeightFn::Geometric => geometric_mean,
    };
    let filter_mode: CompatibilityMode = args.filter.into();

    if genome_count <= 64 {
        run_with_reprs::<PackedKmer, PackedColor>(
            args, &names, &sequences, genome_count, weight_fn, filter_mode,
        )
    } else {
        run_with_reprs::<WideKmer, WideColor>(
            args, &names, &sequences, genome_count, weight_fn, filter_mode,
        )
    }
}

#[allow(clippy::too_many_arguments)]
fn run_with_reprs<K, C>(
    args: &Args,
    names: &[String],
    sequences: &[bytes::Bytes],
    genome_count: usize,
    weight_fn: impl Fn(u32, u32) -> f64,
    filter_mode: CompatibilityMode,
) -> Result<(), Box<dyn std::error::Error>>
where
    K: sans_rs::KmerRepr,
    C: sans_rs::ColorRepr,
{
    let config = EngineConfig::new::<K>(args.k, genome_count, args.top_size)?;
    let engine: Engine<K, C> = Engine::new(config);

    if let Some(max_iupac) = args.max_iupac {
        sequences
            .par_iter()
            .enumerate()
            .try_for_each(|(genome, seq)| engine.add_kmers_iupac(seq, genome, max_iupac))?;
    } else {
        sequences
            .par_iter()
            .enumerate()
            .try_for_each(|(genome, seq)| engine.add_kmers(seq, genome))?;
    }

    let (scored, summary) = engine.seal(weight_fn)?;
    if !args.quiet {
        eprintln!(
            "{} {} kmers, {} splits discarded",
            "ingested".bold(),
            summary.kmers_inserted,
            summary.splits_discarded
        );
    }

    let filtered = scored.filter(filter_mode);
    let stdout = std::io::stdout();
    let mut writer = std::io::BufWriter::new(stdout.lock());
    filtered.output_splits(&mut writer, names)?;
    Ok(())
}
