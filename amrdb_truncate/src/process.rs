use std::{
    collections::HashSet,
    io::{BufRead, Write},
    path::Path,
};

use anyhow::Context;
use compress_io::compress::CompressIo;

use utils::{
    annot::{AnnotTable, ReadOpts},
    coverage::CoverageGate,
    fasta::SeqTable,
    pslx::{open_psl, PslRecord},
};

use crate::config::Config;

pub fn read_singletons<R: BufRead>(rdr: R) -> anyhow::Result<HashSet<String>> {
    let mut h = HashSet::new();
    for l in rdr.lines() {
        let l = l?;
        let l = l.trim();
        if !l.is_empty() {
            h.insert(l.to_owned());
        }
    }
    Ok(h)
}

/// Database tables being rewritten
pub struct Database {
    pub annot: AnnotTable,
    pub seqs: SeqTable,
}

/// For each alignment passing the coverage gate, add a copy of the singleton (query) or
/// target sequence cut down to the aligned region, carrying over the annotation of the
/// source sequence.  Sequences that were used as a source are removed at the end.
///
/// Returns the number of truncated sequences added
pub fn truncate_sequences<I>(
    alignments: I,
    singletons: &HashSet<String>,
    db: &mut Database,
    gate: CoverageGate,
) -> anyhow::Result<usize>
where
    I: IntoIterator<Item = anyhow::Result<PslRecord>>,
{
    let mut count = 1;
    let mut used = HashSet::new();
    for rec in alignments {
        let rec = rec?;
        if !gate.admits(&rec) {
            continue;
        }
        let (header, a, b) = if singletons.contains(&rec.q_name) {
            (&rec.q_name, rec.q_start, rec.q_end)
        } else {
            (&rec.t_name, rec.t_start, rec.t_end)
        };
        let seq = db.seqs.require(header)?;
        let sub = seq
            .get(a..b)
            .ok_or_else(|| {
                anyhow!(
                    "Region {}-{} lies outside sequence {} (length {})",
                    a,
                    b,
                    header,
                    seq.len()
                )
            })?
            .to_owned();
        let fields = db.annot.require(header)?.to_vec();

        let mut new_header = format!("{}|singleton_truncated|{}", header, count);
        if db.seqs.contains(&new_header) {
            new_header = format!("{}|{}", new_header, count)
        }
        trace!("Adding {} ({} bp)", new_header, sub.len());
        db.annot.insert(new_header.clone(), fields);
        db.seqs.insert(new_header, sub);
        used.insert(header.to_owned());
        count += 1;
    }

    debug!("Removing {} source sequences", used.len());
    for h in used.iter() {
        db.seqs.remove(h);
        db.annot.remove(h);
    }
    Ok(count - 1)
}

fn write_output<F, P>(p: P, f: F) -> anyhow::Result<()>
where
    P: AsRef<Path>,
    F: FnOnce(&mut dyn Write) -> std::io::Result<()>,
{
    let p = p.as_ref();
    let mut wrt = CompressIo::new()
        .path(p)
        .bufwriter()
        .with_context(|| format!("Failed to open output file {}", p.display()))?;
    f(&mut wrt).with_context(|| format!("Error writing to {}", p.display()))
}

pub fn process_sequences(cfg: &Config) -> anyhow::Result<()> {
    debug!("Starting processing");
    let mut db = Database {
        annot: AnnotTable::from_file(cfg.annotations(), &ReadOpts::new())?,
        seqs: SeqTable::from_file(cfg.sequences())?,
    };

    let singletons = {
        let rdr = CompressIo::new()
            .path(cfg.singletons())
            .bufreader()
            .with_context(|| {
                format!(
                    "Error opening singleton file {}",
                    cfg.singletons().display()
                )
            })?;
        read_singletons(rdr).with_context(|| {
            format!(
                "Error reading singletons from {}",
                cfg.singletons().display()
            )
        })?
    };
    debug!("{} singleton headers", singletons.len());

    let n = truncate_sequences(open_psl(cfg.pslx())?, &singletons, &mut db, cfg.gate())
        .with_context(|| format!("Error processing alignments from {}", cfg.pslx().display()))?;
    info!("{} truncated sequences added", n);

    write_output(cfg.annot_output(), |w| db.annot.write(w))?;
    write_output(cfg.seq_output(), |w| db.seqs.write(w))
}

#[cfg(test)]
mod tests {
    use super::*;
    use utils::pslx::PslReader;

    fn psl(q: (&str, usize, usize, usize), t: (&str, usize, usize, usize)) -> String {
        let l = q.3 - q.2;
        format!(
            "{l}\t0\t0\t0\t0\t0\t0\t0\t+\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t1\t{l},\t{},\t{},\n",
            q.0, q.1, q.2, q.3, t.0, t.1, t.2, t.3, q.2, t.2
        )
    }

    fn db() -> Database {
        Database {
            annot: AnnotTable::read(
                &mut "s1,c1,m1,g1\ndb1,c2,m2,g2\ndb2,c3,m3,g3\n".as_bytes(),
                &ReadOpts::new(),
            )
            .unwrap(),
            seqs: SeqTable::read(">s1\nAAAACCCCGG\n>db1\nTTTTGGGGAACC\n>db2\nACGT\n".as_bytes())
                .unwrap(),
        }
    }

    #[test]
    fn test_read_singletons() {
        let h = read_singletons("s1\n\n  s2 \n".as_bytes()).unwrap();
        assert_eq!(h.len(), 2);
        assert!(h.contains("s2"));
    }

    #[test]
    fn test_truncate_singleton_and_target() {
        let singletons = read_singletons("s1\n".as_bytes()).unwrap();
        let mut db = db();
        // singleton is the query: cut the query
        let a = psl(("s1", 10, 2, 8), ("db2", 4, 0, 4));
        // non-singleton query: cut the target
        let b = psl(("db2", 4, 0, 4), ("db1", 12, 4, 8));
        let input = format!("{}{}", a, b);
        let n = truncate_sequences(
            PslReader::new(input.as_bytes()),
            &singletons,
            &mut db,
            CoverageGate::default(),
        )
        .unwrap();
        assert_eq!(n, 2);

        let seqs: Vec<_> = db.seqs.iter().collect();
        assert_eq!(
            seqs,
            vec![
                ("db2", "ACGT"),
                ("s1|singleton_truncated|1", "AACCCC"),
                ("db1|singleton_truncated|2", "GGGG"),
            ]
        );
        assert_eq!(
            db.annot.get("db1|singleton_truncated|2").unwrap(),
            &["c2", "m2", "g2"]
        );
        assert!(db.annot.get("s1").is_none());
    }

    #[test]
    fn test_low_coverage_skipped() {
        let singletons = HashSet::new();
        let mut db = db();
        let a = psl(("db2", 100, 0, 4), ("db1", 12, 4, 8));
        let n = truncate_sequences(
            PslReader::new(a.as_bytes()),
            &singletons,
            &mut db,
            CoverageGate::default(),
        )
        .unwrap();
        assert_eq!(n, 0);
        assert_eq!(db.seqs.len(), 3);
    }

    #[test]
    fn test_missing_sequence_and_bad_region_are_fatal() {
        let singletons = HashSet::new();
        let a = psl(("db2", 4, 0, 4), ("nope", 12, 4, 8));
        assert!(truncate_sequences(
            PslReader::new(a.as_bytes()),
            &singletons,
            &mut db(),
            CoverageGate::default()
        )
        .is_err());
        let a = psl(("db2", 4, 0, 4), ("db1", 40, 4, 30));
        assert!(truncate_sequences(
            PslReader::new(a.as_bytes()),
            &singletons,
            &mut db(),
            CoverageGate::default()
        )
        .is_err());
    }
}
