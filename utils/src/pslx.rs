//! BLAT psl/pslx alignment records
//!
//! Columns (0 based):
//!  0 matches, 1 mismatches, 2 repeat matches, 3 N count, 4 query gap count,
//!  5 query gap bases, 6 target gap count, 7 target gap bases, 8 strand,
//!  9 query name, 10 query size, 11 query start, 12 query end,
//!  13 target name, 14 target size, 15 target start, 16 target end,
//!  17 block count, 18 block sizes, 19 query starts, 20 target starts,
//!  21-22 (pslx only) query and target block sequences
//!
//! Coordinates are 0 based, half open.

use std::{io::BufRead, path::Path};

use anyhow::Context;
use compress_io::compress::CompressIo;

use crate::{coverage::fraction, parse_field};

const PSL_COLUMNS: usize = 21;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PslRecord {
    pub matches: u32,
    pub mismatches: u32,
    pub rep_matches: u32,
    pub n_count: u32,
    pub q_gap_count: u32,
    pub q_gap_bases: u32,
    pub t_gap_count: u32,
    pub t_gap_bases: u32,
    pub strand: String,
    pub q_name: String,
    pub q_size: usize,
    pub q_start: usize,
    pub q_end: usize,
    pub t_name: String,
    pub t_size: usize,
    pub t_start: usize,
    pub t_end: usize,
    pub block_sizes: Vec<usize>,
    pub q_starts: Vec<usize>,
    pub t_starts: Vec<usize>,
}

fn parse_list(s: &str, name: &str) -> anyhow::Result<Vec<usize>> {
    s.split(',')
        .filter(|x| !x.is_empty())
        .map(|x| parse_field(x, name))
        .collect()
}

fn parse_range(s1: &str, s2: &str, name: &str) -> anyhow::Result<(usize, usize)> {
    let a = parse_field(s1, name)?;
    let b = parse_field(s2, name)?;
    if b >= a {
        Ok((a, b))
    } else {
        Err(anyhow!("Range error for {} - {} > {}", name, a, b))
    }
}

impl PslRecord {
    pub fn parse_fields(fields: &[&str]) -> anyhow::Result<Self> {
        if fields.len() < PSL_COLUMNS {
            return Err(anyhow!(
                "Expected at least {} columns, found {}",
                PSL_COLUMNS,
                fields.len()
            ));
        }
        let (q_start, q_end) = parse_range(fields[11], fields[12], "query coordinates")?;
        let (t_start, t_end) = parse_range(fields[15], fields[16], "target coordinates")?;
        let block_count: usize = parse_field(fields[17], "block count")?;
        let block_sizes = parse_list(fields[18], "block sizes")?;
        let q_starts = parse_list(fields[19], "query starts")?;
        let t_starts = parse_list(fields[20], "target starts")?;
        if block_sizes.len() != block_count
            || q_starts.len() != block_count
            || t_starts.len() != block_count
        {
            return Err(anyhow!(
                "Block lists do not match block count {}",
                block_count
            ));
        }

        Ok(Self {
            matches: parse_field(fields[0], "matches")?,
            mismatches: parse_field(fields[1], "mismatches")?,
            rep_matches: parse_field(fields[2], "repeat matches")?,
            n_count: parse_field(fields[3], "N count")?,
            q_gap_count: parse_field(fields[4], "query gap count")?,
            q_gap_bases: parse_field(fields[5], "query gap bases")?,
            t_gap_count: parse_field(fields[6], "target gap count")?,
            t_gap_bases: parse_field(fields[7], "target gap bases")?,
            strand: fields[8].to_owned(),
            q_name: fields[9].to_owned(),
            q_size: parse_field(fields[10], "query size")?,
            q_start,
            q_end,
            t_name: fields[13].to_owned(),
            t_size: parse_field(fields[14], "target size")?,
            t_start,
            t_end,
            block_sizes,
            q_starts,
            t_starts,
        })
    }

    pub fn parse_line(line: &str) -> anyhow::Result<Self> {
        let fields: Vec<_> = line.split_whitespace().collect();
        Self::parse_fields(&fields)
    }

    /// Fraction of query sequence covered by the alignment
    pub fn query_coverage(&self) -> f64 {
        fraction(self.q_start, self.q_end, self.q_size)
    }

    /// Fraction of target sequence covered by the alignment
    pub fn target_coverage(&self) -> f64 {
        fraction(self.t_start, self.t_end, self.t_size)
    }

    /// Aligned blocks on the target as half open (start, end) pairs
    pub fn target_blocks(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.t_starts
            .iter()
            .zip(self.block_sizes.iter())
            .map(|(s, l)| (*s, s + l))
    }
}

/// Sequential psl/pslx reader
///
/// An optional psLayout header (terminated by a line of dashes) is skipped, as are
/// comment lines starting with '#' and blank lines.
pub struct PslReader<R> {
    rdr: R,
    buf: String,
    line: usize,
}

impl<R: BufRead> PslReader<R> {
    pub fn new(rdr: R) -> Self {
        Self {
            rdr,
            buf: String::new(),
            line: 0,
        }
    }

    fn read_line(&mut self) -> anyhow::Result<bool> {
        self.buf.clear();
        let n = self
            .rdr
            .read_line(&mut self.buf)
            .with_context(|| format!("Error after reading {} lines", self.line))?;
        if n > 0 {
            self.line += 1;
        }
        Ok(n > 0)
    }

    fn skip_header(&mut self) -> anyhow::Result<()> {
        trace!("Skipping psLayout header");
        while self.read_line()? {
            if self.buf.starts_with('-') {
                return Ok(());
            }
        }
        Err(anyhow!("End of file reached while reading psl header"))
    }

    pub fn read_next(&mut self) -> anyhow::Result<Option<PslRecord>> {
        while self.read_line()? {
            let l = self.buf.trim();
            if l.is_empty() || l.starts_with('#') {
                continue;
            }
            if self.line == 1 && l.starts_with("psLayout") {
                self.skip_header()?;
                continue;
            }
            return PslRecord::parse_line(l)
                .with_context(|| format!("line {}: Error parsing psl record", self.line))
                .map(Some);
        }
        Ok(None)
    }
}

impl<R: BufRead> Iterator for PslReader<R> {
    type Item = anyhow::Result<PslRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_next().transpose()
    }
}

/// Open a (possibly compressed) psl file for reading
pub fn open_psl<P: AsRef<Path>>(fname: P) -> anyhow::Result<PslReader<impl BufRead>> {
    let fname = fname.as_ref();
    debug!("Opening psl file {}", fname.display());
    let rdr = CompressIo::new()
        .path(fname)
        .bufreader()
        .with_context(|| format!("Error opening psl file {}", fname.display()))?;
    Ok(PslReader::new(rdr))
}
