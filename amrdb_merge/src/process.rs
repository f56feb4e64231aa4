use std::{io::Write, path::Path};

use anyhow::Context;
use compress_io::compress::CompressIo;

use utils::{
    annot::{pad_fields, read_annot_records, write_annot_line, AnnotRecord, AnnotTable, ReadOpts},
    fasta::{write_fasta_record, SeqTable},
    merge::{choose_annotation, Preference},
};

use crate::config::Config;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Stats {
    pub candidates: usize,
    pub existing_kept: usize,
}

/// For each candidate (in input order) write its sequence and an annotation padded to
/// `n_fields` fields.  Where the header already has an annotation, the candidate only
/// replaces it if it has fewer empty fields.
pub fn merge_candidates<W: Write, V: Write>(
    candidates: Vec<AnnotRecord>,
    existing: &AnnotTable,
    seqs: &SeqTable,
    n_fields: usize,
    seq_out: &mut W,
    annot_out: &mut V,
) -> anyhow::Result<Stats> {
    let mut stats = Stats::default();
    for AnnotRecord { header, mut fields } in candidates {
        stats.candidates += 1;
        pad_fields(&mut fields, n_fields);
        let seq = seqs.require(&header)?;
        let chosen = match existing.get(&header) {
            Some(old) => {
                let mut old = old.to_vec();
                pad_fields(&mut old, n_fields);
                let mut cands = vec![fields, old];
                match choose_annotation(&cands, Preference::Last).chosen {
                    Some(1) => {
                        stats.existing_kept += 1;
                        cands.swap_remove(1)
                    }
                    _ => cands.swap_remove(0),
                }
            }
            None => fields,
        };
        write_fasta_record(seq_out, &header, seq)?;
        write_annot_line(annot_out, &header, &chosen)?;
    }
    Ok(stats)
}

pub fn process_candidates(cfg: &Config) -> anyhow::Result<()> {
    debug!("Starting processing");
    let existing = AnnotTable::from_file(cfg.existing(), &ReadOpts::new())?;
    let seqs = SeqTable::from_file(cfg.sequences())?;
    let candidates = {
        let mut rdr = CompressIo::new()
            .path(cfg.candidates())
            .bufreader()
            .with_context(|| {
                format!(
                    "Error opening candidate file {}",
                    cfg.candidates().display()
                )
            })?;
        read_annot_records(&mut rdr, &ReadOpts::new()).with_context(|| {
            format!(
                "Error reading candidates from {}",
                cfg.candidates().display()
            )
        })?
    };

    let open = |p: &Path| {
        CompressIo::new()
            .path(p)
            .bufwriter()
            .with_context(|| format!("Failed to open output file {}", p.display()))
    };
    let mut seq_out = open(cfg.seq_output())?;
    let mut annot_out = open(cfg.annot_output())?;

    let stats = merge_candidates(
        candidates,
        &existing,
        &seqs,
        cfg.n_fields(),
        &mut seq_out,
        &mut annot_out,
    )?;
    info!(
        "{} candidates written; existing annotation kept for {}",
        stats.candidates, stats.existing_kept
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const CANDIDATES: &str = "g1,Drugs,Aminoglycosides,AAC6
g2,Drugs,Betalactams
g3,Metals,NA,CUP,x,y,z
";

    fn run(candidates: &str, seqs: &str) -> anyhow::Result<(String, String, Stats)> {
        let existing = AnnotTable::read(
            &mut "g1,Drugs,,,,,\ng2,Drugs,Betalactams,TEM,,,\n".as_bytes(),
            &ReadOpts::new(),
        )?;
        let seqs = SeqTable::read(seqs.as_bytes())?;
        let candidates = read_annot_records(&mut candidates.as_bytes(), &ReadOpts::new())?;
        let mut seq_out = Vec::new();
        let mut annot_out = Vec::new();
        let stats = merge_candidates(candidates, &existing, &seqs, 6, &mut seq_out, &mut annot_out)?;
        Ok((
            String::from_utf8(seq_out)?,
            String::from_utf8(annot_out)?,
            stats,
        ))
    }

    #[test]
    fn test_merge() {
        let (seqs, annot, stats) =
            run(CANDIDATES, ">g1\nAAA\n>g2\nCCC\n>g3\nGGG\n>g4\nTTT\n").unwrap();
        assert_eq!(seqs, ">g1\nAAA\n>g2\nCCC\n>g3\nGGG\n");
        assert_eq!(
            annot,
            "g1,Drugs,Aminoglycosides,AAC6,,,
g2,Drugs,Betalactams,TEM,,,
g3,Metals,,CUP,x,y,z
"
        );
        assert_eq!(
            stats,
            Stats {
                candidates: 3,
                existing_kept: 1
            }
        );
    }

    #[test]
    fn test_equally_complete_keeps_existing() {
        let (_, annot, stats) = run("g2,Drugs,Betalactams,CTX\n", ">g2\nCCC\n").unwrap();
        assert_eq!(annot, "g2,Drugs,Betalactams,TEM,,,\n");
        assert_eq!(stats.existing_kept, 1);
    }

    #[test]
    fn test_missing_sequence_is_fatal() {
        assert!(run(CANDIDATES, ">g1\nAAA\n").is_err());
    }
}
