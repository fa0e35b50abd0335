use crate::alignment::AlignmentStore;
use crate::sequence_index::SequenceIndex;
use anyhow::{bail, Context, Result};
use flate2::read::MultiGzDecoder;
use log::{info, warn};
use noodles::bgzf;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use std::str::FromStr;

const PROGRESS_INTERVAL: usize = 1_000_000;

/// Open a PAF input, `-` meaning stdin; `.bgz` is read as BGZF and `.gz` as
/// (multi-member) gzip
pub fn open_paf_input<P: AsRef<Path>>(path: P) -> Result<Box<dyn BufRead>> {
    let path = path.as_ref();
    if path.as_os_str() == "-" {
        return Ok(Box::new(BufReader::new(io::stdin())));
    }

    let file = File::open(path)
        .with_context(|| format!("cannot open paf file to read: {}", path.display()))?;

    match path.extension().and_then(|ext| ext.to_str()) {
        Some("bgz") => Ok(Box::new(BufReader::new(bgzf::io::reader::Reader::new(file)))),
        Some("gz") => Ok(Box::new(BufReader::new(MultiGzDecoder::new(file)))),
        _ => Ok(Box::new(BufReader::new(file))),
    }
}

/// One PAF line; fields past the 11th are kept verbatim in `aux`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PafRecord {
    pub query_name: String,
    pub query_len: u64,
    pub query_start: u64,
    pub query_end: u64,
    pub strand: char,
    pub target_name: String,
    pub target_len: u64,
    pub target_start: u64,
    pub target_end: u64,
    pub matches: u32,
    pub block_len: u32,
    pub aux: Option<String>,
}

impl PafRecord {
    /// Check that both intervals are non-empty and lie within their sequences
    pub fn check_coordinates(&self) -> Result<()> {
        if self.query_start >= self.query_end || self.query_end > self.query_len {
            bail!(
                "query interval [{}, {}) invalid for {} of length {}",
                self.query_start,
                self.query_end,
                self.query_name,
                self.query_len
            );
        }
        if self.target_start >= self.target_end || self.target_end > self.target_len {
            bail!(
                "target interval [{}, {}) invalid for {} of length {}",
                self.target_start,
                self.target_end,
                self.target_name,
                self.target_len
            );
        }
        Ok(())
    }
}

fn parse_field<T: FromStr>(fields: &[&str], idx: usize, what: &str) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    fields[idx]
        .parse()
        .with_context(|| format!("invalid {what}: '{}'", fields[idx]))
}

impl FromStr for PafRecord {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> Result<Self> {
        let fields: Vec<&str> = line.trim_end_matches(['\r', '\n']).splitn(12, '\t').collect();

        if fields.len() < 11 {
            bail!(
                "PAF line has {} fields, at least 11 required",
                fields.len()
            );
        }

        let strand = match fields[4] {
            "+" => '+',
            "-" => '-',
            other => bail!("invalid strand: '{other}'"),
        };

        Ok(PafRecord {
            query_name: fields[0].to_string(),
            query_len: parse_field(&fields, 1, "query length")?,
            query_start: parse_field(&fields, 2, "query start")?,
            query_end: parse_field(&fields, 3, "query end")?,
            strand,
            target_name: fields[5].to_string(),
            target_len: parse_field(&fields, 6, "target length")?,
            target_start: parse_field(&fields, 7, "target start")?,
            target_end: parse_field(&fields, 8, "target end")?,
            matches: parse_field(&fields, 9, "match count")?,
            block_len: parse_field(&fields, 10, "block length")?,
            aux: fields.get(11).map(|s| s.to_string()),
        })
    }
}

/// Counters for one or more loaded inputs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadStats {
    pub records: usize,
    pub malformed: usize,
    pub out_of_range: usize,
    /// Aligned bases over all loaded records, per genome
    pub query_bases: u64,
    pub target_bases: u64,
}

fn warn_length_mismatch(index: &SequenceIndex, name: &str, len: u64, source: &str, line_no: usize) {
    if let Some(known) = index.get(name).and_then(|id| index.len_of(id)) {
        if known != len {
            warn!(
                "{source}:{line_no}: sequence {name} declared with length {len}, keeping earlier length {known}"
            );
        }
    }
}

/// Read every record of `reader` into `store`.
///
/// Malformed lines and records with impossible coordinates are skipped with a
/// warning; I/O errors abort.
pub fn read_alignments<R: BufRead>(
    mut reader: R,
    source: &str,
    store: &mut AlignmentStore,
    stats: &mut LoadStats,
) -> Result<()> {
    let mut buf = Vec::new();
    let mut line_no = 0;
    loop {
        buf.clear();
        let n = reader
            .read_until(b'\n', &mut buf)
            .with_context(|| format!("failed to read {source}"))?;
        if n == 0 {
            break;
        }
        line_no += 1;

        let line = match std::str::from_utf8(&buf) {
            Ok(line) => line.trim_end_matches(['\r', '\n']),
            Err(e) => {
                warn!("{source}:{line_no}: skipping malformed record: {e}");
                stats.malformed += 1;
                continue;
            }
        };
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }

        let rec: PafRecord = match line.parse() {
            Ok(rec) => rec,
            Err(e) => {
                warn!("{source}:{line_no}: skipping malformed record: {e:#}");
                stats.malformed += 1;
                continue;
            }
        };
        if let Err(e) = rec.check_coordinates() {
            warn!("{source}:{line_no}: skipping record: {e}");
            stats.out_of_range += 1;
            continue;
        }
        if rec.matches == 0 {
            warn!("{source}:{line_no}: skipping record with zero matching bases");
            stats.malformed += 1;
            continue;
        }

        warn_length_mismatch(&store.queries, &rec.query_name, rec.query_len, source, line_no);
        warn_length_mismatch(&store.targets, &rec.target_name, rec.target_len, source, line_no);

        let idx = store.add(
            (&rec.query_name, rec.query_len),
            (&rec.target_name, rec.target_len),
            (rec.query_start as i64, rec.query_end as i64),
            (rec.target_start as i64, rec.target_end as i64),
            rec.matches,
        );
        let aln = &store.alignments[idx];
        stats.query_bases += aln.query_len() as u64;
        stats.target_bases += aln.target_len() as u64;
        stats.records += 1;
        if stats.records % PROGRESS_INTERVAL == 0 {
            info!("Read {} paf records", stats.records);
        }
    }
    Ok(())
}

/// Load all PAF files into a fresh store
pub fn load_alignments<P: AsRef<Path>>(paths: &[P]) -> Result<(AlignmentStore, LoadStats)> {
    let mut store = AlignmentStore::new();
    let mut stats = LoadStats::default();
    for path in paths {
        let path = path.as_ref();
        let reader = open_paf_input(path)?;
        read_alignments(reader, &path.display().to_string(), &mut store, &mut stats)?;
    }
    info!("Read {} paf records", stats.records);
    info!(
        "Query genome: {} sequences, {} bp, {} bp aligned",
        store.queries.len(),
        store.queries.total_length(),
        stats.query_bases
    );
    info!(
        "Target genome: {} sequences, {} bp, {} bp aligned",
        store.targets.len(),
        store.targets.total_length(),
        stats.target_bases
    );
    if stats.malformed + stats.out_of_range > 0 {
        warn!(
            "Skipped {} malformed and {} out-of-range records",
            stats.malformed, stats.out_of_range
        );
    }
    Ok((store, stats))
}
