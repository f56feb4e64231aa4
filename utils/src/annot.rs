use std::{
    io::{self, BufRead, Write},
    path::Path,
};

use anyhow::Context;
use compress_io::compress::CompressIo;
use indexmap::IndexMap;

use crate::get_next_csv_line;

/// Literal used for missing values in annotation tables.  Normalized to an empty string on input
pub const NULL_VALUE: &str = "NA";

/// Number of leading annotation fields (class, mechanism, group) used for voting
pub const N_CORE_FIELDS: usize = 3;

/// A single line from an annotation table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotRecord {
    pub header: String,
    pub fields: Vec<String>,
}

/// Options for reading annotation tables
///
/// skip_header - discard the first line of the file
/// max_fields - only keep the first n annotation fields of each line
///
#[derive(Debug, Clone, Copy, Default)]
pub struct ReadOpts {
    skip_header: bool,
    max_fields: Option<usize>,
}

impl ReadOpts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn skip_header(mut self, x: bool) -> Self {
        self.skip_header = x;
        self
    }

    pub fn max_fields(mut self, n: usize) -> Self {
        self.max_fields = Some(n);
        self
    }
}

fn normalize(s: &str) -> String {
    if s == NULL_VALUE {
        String::new()
    } else {
        s.to_owned()
    }
}

/// Count the empty (unknown) fields in an annotation
pub fn count_empty<S: AsRef<str>>(fields: &[S]) -> usize {
    fields.iter().filter(|s| s.as_ref().is_empty()).count()
}

/// Extend an annotation with empty fields so that it has at least n fields
pub fn pad_fields(fields: &mut Vec<String>, n: usize) {
    if fields.len() < n {
        fields.resize(n, String::new())
    }
}

/// Write header and fields as a comma separated line
pub fn write_annot_line<W: Write + ?Sized, S: AsRef<str>>(
    w: &mut W,
    header: &str,
    fields: &[S],
) -> io::Result<()> {
    write!(w, "{},", header)?;
    for (i, f) in fields.iter().enumerate() {
        if i > 0 {
            w.write_all(b",")?;
        }
        w.write_all(f.as_ref().as_bytes())?;
    }
    writeln!(w)
}

/// Read all records from an annotation table, keeping duplicates and file order.
/// Lines with an empty first column are skipped
pub fn read_annot_records<R: BufRead>(
    rdr: &mut R,
    opts: &ReadOpts,
) -> anyhow::Result<Vec<AnnotRecord>> {
    let mut buf = String::new();
    let mut line = 0;
    let mut v = Vec::new();

    while let Some(fields) = get_next_csv_line(rdr, &mut buf)
        .with_context(|| format!("Error after reading {} lines", line))?
    {
        line += 1;
        if line == 1 && opts.skip_header {
            continue;
        }
        if fields[0].is_empty() {
            continue;
        }
        let rest = &fields[1..];
        let rest = match opts.max_fields {
            Some(n) if n < rest.len() => &rest[..n],
            _ => rest,
        };
        v.push(AnnotRecord {
            header: fields[0].to_owned(),
            fields: rest.iter().map(|s| normalize(s)).collect(),
        })
    }
    Ok(v)
}

/// AnnotTable
///
/// Mapping from sequence header to annotation fields.  Iteration follows insertion order,
/// and removal keeps the order of the remaining entries.
#[derive(Debug, Default, Clone)]
pub struct AnnotTable {
    map: IndexMap<String, Vec<String>>,
}

impl AnnotTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build table from records.  Where a header occurs more than once the first entry is kept
    pub fn from_records(recs: Vec<AnnotRecord>) -> Self {
        let mut map = IndexMap::with_capacity(recs.len());
        let mut dup = 0;
        for r in recs {
            if map.contains_key(&r.header) {
                trace!("Ignoring duplicate annotation for {}", r.header);
                dup += 1;
            } else {
                map.insert(r.header, r.fields);
            }
        }
        if dup > 0 {
            debug!("{} duplicate annotation lines ignored", dup)
        }
        Self { map }
    }

    pub fn read<R: BufRead>(rdr: &mut R, opts: &ReadOpts) -> anyhow::Result<Self> {
        read_annot_records(rdr, opts).map(Self::from_records)
    }

    pub fn from_file<P: AsRef<Path>>(fname: P, opts: &ReadOpts) -> anyhow::Result<Self> {
        let fname = fname.as_ref();
        debug!("Reading in annotations from {}", fname.display());
        let mut rdr = CompressIo::new()
            .path(fname)
            .bufreader()
            .with_context(|| format!("Error opening annotation file {}", fname.display()))?;
        let tab = Self::read(&mut rdr, opts)
            .with_context(|| format!("Error reading annotations from {}", fname.display()))?;
        debug!("Read {} annotations from {}", tab.len(), fname.display());
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

    pub fn get(&self, header: &str) -> Option<&[String]> {
        self.map.get(header).map(|v| v.as_slice())
    }

    /// Look up annotation, treating a missing entry as an error
    pub fn require(&self, header: &str) -> anyhow::Result<&[String]> {
        self.get(header)
            .ok_or_else(|| anyhow!("No annotation found for {}", header))
    }

    pub fn insert(&mut self, header: String, fields: Vec<String>) -> Option<Vec<String>> {
        self.map.insert(header, fields)
    }

    pub fn remove(&mut self, header: &str) -> Option<Vec<String>> {
        self.map.shift_remove(header)
    }

    /// Remove and return annotation, treating a missing entry as an error
    pub fn take(&mut self, header: &str) -> anyhow::Result<Vec<String>> {
        self.remove(header)
            .ok_or_else(|| anyhow!("No annotation found for {}", header))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.map.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn write<W: Write + ?Sized>(&self, w: &mut W) -> io::Result<()> {
        for (h, f) in self.iter() {
            write_annot_line(w, h, f)?
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_na_normalized() {
        let tab = AnnotTable::read(&mut "geneX,NA,mechY,groupZ\n".as_bytes(), &ReadOpts::new())
            .unwrap();
        assert_eq!(tab.get("geneX").unwrap(), &["", "mechY", "groupZ"]);
    }

    #[test]
    fn test_skip_header_and_truncate_fields() {
        let input = "header,class,mechanism,group,extra\ng1,a,b,c,d\n,x,y\ng2,e\n";
        let opts = ReadOpts::new().skip_header(true).max_fields(3);
        let recs = read_annot_records(&mut input.as_bytes(), &opts).unwrap();
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].fields, vec!["a", "b", "c"]);
        assert_eq!(recs[1].header, "g2");
        assert_eq!(recs[1].fields, vec!["e"]);
    }

    #[test]
    fn test_first_duplicate_wins_and_order_kept() {
        let input = "b,1\na,2\nb,3\nc,4\n";
        let mut tab = AnnotTable::read(&mut input.as_bytes(), &ReadOpts::new()).unwrap();
        assert_eq!(tab.len(), 3);
        assert_eq!(tab.get("b").unwrap(), &["1"]);
        tab.remove("a");
        let keys: Vec<_> = tab.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["b", "c"]);
    }

    #[test]
    fn test_require_missing_is_error() {
        let tab = AnnotTable::new();
        let e = tab.require("nope").unwrap_err();
        assert!(e.to_string().contains("nope"));
    }

    #[test]
    fn test_write_and_helpers() {
        let mut tab = AnnotTable::new();
        tab.insert("g1".to_owned(), vec!["a".to_owned(), String::new()]);
        let mut f = vec!["x".to_owned()];
        pad_fields(&mut f, 3);
        assert_eq!(count_empty(&f), 2);
        tab.insert("g2".to_owned(), f);
        let mut out = Vec::new();
        tab.write(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "g1,a,\ng2,x,,\n");
    }
}
