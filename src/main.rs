use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::time::Instant;

use sweepgap::gap_candidates::GapParams;
use sweepgap::gap_finder::{run_pipeline, GapFinderConfig};
use sweepgap::paf::load_alignments;
use sweepgap::reciprocal_best::SelectionConfig;

/// Parse a number that may have metric suffix (k/K=1000, m/M=1e6, g/G=1e9)
fn parse_metric_number(s: &str) -> Result<i64, String> {
    if s.is_empty() {
        return Err("Empty string".to_string());
    }

    let (num_part, suffix) = match s.char_indices().last() {
        Some((pos, c)) if c.is_ascii_alphabetic() => (&s[..pos], Some(c)),
        _ => (s, None),
    };

    let base: f64 = num_part
        .parse()
        .map_err(|e| format!("Invalid number: {e}"))?;

    let multiplier = match suffix {
        Some('k') | Some('K') => 1000.0,
        Some('m') | Some('M') => 1_000_000.0,
        Some('g') | Some('G') => 1_000_000_000.0,
        Some(c) => {
            return Err(format!(
                "Unknown suffix '{c}'. Use k/K (1000), m/M (1e6), or g/G (1e9)"
            ))
        }
        None => 1.0,
    };

    let result = (base * multiplier).round();

    if result < 0.0 {
        return Err(format!("Value {result} must not be negative"));
    }
    if result > i64::MAX as f64 {
        return Err(format!("Value {result} too large"));
    }

    Ok(result as i64)
}

fn parse_fraction(s: &str) -> Result<f64, String> {
    let value: f64 = s.parse().map_err(|e| format!("Invalid number: {e}"))?;
    if !(0.0..=1.0).contains(&value) {
        return Err(format!("Value {value} must be within [0, 1]"));
    }
    Ok(value)
}

/// SweepGap - find poorly anchored gaps between collinear alignments
///
/// Reads PAF alignments, optionally keeps only reciprocal best alignments, and
/// writes minimal query/target boxes around each gap for targeted re-alignment
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Input PAF files (plain, .gz or .bgz; '-' for stdin)
    #[clap(value_name = "PAF", required = true, num_args = 1..)]
    inputs: Vec<String>,

    /// Minimum gap size to fill in
    #[clap(short = 'l', long = "min-gap", default_value = "100", value_parser = parse_metric_number)]
    min_gap: i64,

    /// Maximum gap size to fill in
    #[clap(short = 'm', long = "max-gap", default_value = "1M", value_parser = parse_metric_number)]
    max_gap: i64,

    /// Maximum flanking alignment sequence included on each side of a gap
    #[clap(short = 'e', long = "max-flank", default_value = "1k", value_parser = parse_metric_number)]
    max_flank: i64,

    /// Use all alignments instead of reciprocal best alignments
    #[clap(short = 'a', long = "all")]
    all: bool,

    /// Maximum overlap fraction for reciprocal best alignments
    #[clap(short = 'f', long = "max-overlap", default_value = "0.5", value_parser = parse_fraction)]
    max_overlap: f64,

    /// Number of threads
    #[clap(short = 't', long = "threads", default_value = "1")]
    threads: usize,

    /// Output file ('-' for stdout)
    #[clap(short = 'o', long = "output", default_value = "-")]
    output: String,

    /// Verbosity level (0 = warnings only, 1 = info, 2 = debug)
    #[clap(short = 'v', long = "verbose", default_value = "1")]
    verbose: u8,
}

fn open_output(path: &str) -> Result<Box<dyn Write + Send>> {
    if path == "-" {
        Ok(Box::new(BufWriter::new(io::stdout())))
    } else {
        let file = File::create(path)
            .with_context(|| format!("failed to write the output to file '{path}'"))?;
        Ok(Box::new(BufWriter::new(file)))
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let start = Instant::now();

    env_logger::Builder::new()
        .filter_level(match args.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            _ => log::LevelFilter::Debug,
        })
        .format_module_path(false)
        .init();

    let config = GapFinderConfig {
        params: GapParams {
            min_gap: args.min_gap,
            max_gap: args.max_gap,
            max_flank: args.max_flank,
        },
        selection: (!args.all).then_some(SelectionConfig {
            max_overlap_fraction: args.max_overlap,
        }),
        threads: args.threads,
    };
    config.validate()?;

    let (mut store, _) = load_alignments(&args.inputs)?;
    let output = open_output(&args.output)?;
    run_pipeline(&mut store, &config, output).context("failed to analyse the PAF input")?;

    info!("Version: {}", env!("CARGO_PKG_VERSION"));
    info!("CMD: {}", std::env::args().collect::<Vec<_>>().join(" "));
    info!("Real time: {:.3} sec", start.elapsed().as_secs_f64());

    Ok(())
}
