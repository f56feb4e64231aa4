use std::{
    io::{self, BufRead, Write},
    path::Path,
};

use anyhow::Context;
use compress_io::compress::CompressIo;
use indexmap::IndexMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FastaRecord {
    pub header: String,
    pub seq: String,
}

/// Sequential FASTA reader
///
/// The header is everything after '>' up to the end of the line (trailing white space removed).
/// Sequence lines are concatenated with all white space (including '\r') removed.
pub struct FastaReader<R> {
    rdr: R,
    buf: String,
    next_header: Option<String>,
    started: bool,
    line: usize,
}

impl<R: BufRead> FastaReader<R> {
    pub fn new(rdr: R) -> Self {
        Self {
            rdr,
            buf: String::new(),
            next_header: None,
            started: false,
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

    // Find the first header, skipping leading blank lines
    fn start(&mut self) -> anyhow::Result<()> {
        self.started = true;
        while self.read_line()? {
            let l = self.buf.trim_end();
            if l.is_empty() {
                continue;
            }
            return match l.strip_prefix('>') {
                Some(h) => {
                    self.next_header = Some(h.to_owned());
                    Ok(())
                }
                None => Err(anyhow!(
                    "line {}: Records in FASTA should begin with '>'",
                    self.line
                )),
            };
        }
        Ok(())
    }

    pub fn read_next(&mut self) -> anyhow::Result<Option<FastaRecord>> {
        if !self.started {
            self.start()?
        }
        let header = match self.next_header.take() {
            Some(h) => h,
            None => return Ok(None),
        };
        let mut seq = String::new();
        while self.read_line()? {
            if let Some(h) = self.buf.strip_prefix('>') {
                self.next_header = Some(h.trim_end().to_owned());
                break;
            }
            seq.extend(self.buf.chars().filter(|c| !c.is_whitespace()));
        }
        Ok(Some(FastaRecord { header, seq }))
    }
}

impl<R: BufRead> Iterator for FastaReader<R> {
    type Item = anyhow::Result<FastaRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_next().transpose()
    }
}

pub fn write_fasta_record<W: Write + ?Sized>(w: &mut W, header: &str, seq: &str) -> io::Result<()> {
    writeln!(w, ">{}\n{}", header, seq)
}

/// SeqTable
///
/// Mapping from FASTA header to sequence in file order.  Where a header is repeated
/// the first sequence is kept.
#[derive(Debug, Default, Clone)]
pub struct SeqTable {
    map: IndexMap<String, String>,
}

impl SeqTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn read<R: BufRead>(rdr: R) -> anyhow::Result<Self> {
        let mut map = IndexMap::new();
        for rec in FastaReader::new(rdr) {
            let rec = rec?;
            if map.contains_key(&rec.header) {
                trace!("Ignoring duplicate sequence for {}", rec.header)
            } else {
                map.insert(rec.header, rec.seq);
            }
        }
        Ok(Self { map })
    }

    pub fn from_file<P: AsRef<Path>>(fname: P) -> anyhow::Result<Self> {
        let fname = fname.as_ref();
        debug!("Reading in sequences from {}", fname.display());
        let rdr = CompressIo::new()
            .path(fname)
            .bufreader()
            .with_context(|| format!("Error opening FASTA file {}", fname.display()))?;
        let tab = Self::read(rdr)
            .with_context(|| format!("Error reading sequences from {}", fname.display()))?;
        debug!("Read {} sequences from {}", tab.len(), fname.display());
        Ok(tab)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn contains(&self, header: &str) -> bool {
        self.map.contains_key(header)
    }

    pub fn get(&self, header: &str) -> Option<&str> {
        self.map.get(header).map(|s| s.as_str())
    }

    /// Look up sequence, treating a missing entry as an error
    pub fn require(&self, header: &str) -> anyhow::Result<&str> {
        self.get(header)
            .ok_or_else(|| anyhow!("No sequence found for {}", header))
    }

    pub fn insert(&mut self, header: String, seq: String) -> Option<String> {
        self.map.insert(header, seq)
    }

    pub fn remove(&mut self, header: &str) -> Option<String> {
        self.map.shift_remove(header)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.map.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn write<W: Write + ?Sized>(&self, w: &mut W) -> io::Result<()> {
        for (h, s) in self.iter() {
            write_fasta_record(w, h, s)?
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_records() {
        let input = "\n>seq1 desc \nACG T\r\nTT\n>seq2\n>seq3\nGG\n";
        let v: Vec<_> = FastaReader::new(input.as_bytes())
            .collect::<anyhow::Result<_>>()
            .unwrap();
        assert_eq!(v.len(), 3);
        assert_eq!(v[0].header, "seq1 desc");
        assert_eq!(v[0].seq, "ACGTTT");
        assert_eq!(v[1].seq, "");
        assert_eq!(v[2].header, "seq3");
        assert_eq!(v[2].seq, "GG");
    }

    #[test]
    fn test_empty_input() {
        let mut rdr = FastaReader::new("".as_bytes());
        assert!(rdr.read_next().unwrap().is_none());
    }

    #[test]
    fn test_missing_header_is_error() {
        let mut rdr = FastaReader::new("ACGT\n>s\nA\n".as_bytes());
        assert!(rdr.read_next().is_err());
    }

    #[test]
    fn test_seq_table() {
        let input = ">a\nAC\n>b\nGT\n>a\nTT\n";
        let mut tab = SeqTable::read(input.as_bytes()).unwrap();
        assert_eq!(tab.len(), 2);
        assert_eq!(tab.get("a"), Some("AC"));
        assert!(tab.require("c").is_err());
        tab.insert("c".to_owned(), "A".to_owned());
        tab.remove("a");
        let mut out = Vec::new();
        tab.write(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), ">b\nGT\n>c\nA\n");
    }
}
