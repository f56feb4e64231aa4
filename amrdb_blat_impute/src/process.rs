use std::io::Write;

use anyhow::Context;
use compress_io::compress::CompressIo;
use indexmap::IndexMap;

use utils::{
    annot::{write_annot_line, AnnotTable, ReadOpts, N_CORE_FIELDS},
    merge::Tally,
    pslx::{open_psl, PslRecord},
};

use crate::config::Config;

struct Hit {
    coverage: f64,
    query: String,
    target: String,
}

/// Queries are grouped on the part of the name before the first '|'
fn query_key(q: &str) -> &str {
    q.split('|').next().unwrap_or(q)
}

/// For each query, collect the hits with the highest query coverage and vote on the
/// annotations of their targets.  The most frequent annotation is written together with
/// the name of the first hit for the query.
///
/// Returns the number of queries annotated
pub fn impute_from_blat<I, W>(
    alignments: I,
    annot: &AnnotTable,
    max_gap_bases: u32,
    out: &mut W,
) -> anyhow::Result<usize>
where
    I: IntoIterator<Item = anyhow::Result<PslRecord>>,
    W: Write,
{
    let mut hits: IndexMap<String, Vec<Hit>> = IndexMap::new();
    let mut skipped = 0;
    for rec in alignments {
        let rec = rec?;
        if rec.q_gap_bases > max_gap_bases || rec.t_gap_bases > max_gap_bases {
            skipped += 1;
            continue;
        }
        hits.entry(query_key(&rec.q_name).to_owned())
            .or_default()
            .push(Hit {
                coverage: rec.query_coverage(),
                query: rec.q_name,
                target: rec.t_name,
            })
    }
    debug!(
        "{} queries with hits; {} gapped alignments skipped",
        hits.len(),
        skipped
    );

    for (key, v) in hits.iter() {
        let best = v.iter().map(|h| h.coverage).fold(f64::MIN, f64::max);
        let mut tally = Tally::new();
        for h in v.iter().filter(|h| h.coverage == best) {
            let fields = annot
                .require(&h.target)
                .with_context(|| format!("Error processing hits for {}", key))?;
            let n = fields.len().min(N_CORE_FIELDS);
            tally.add(&fields[..n])
        }
        if let Some(a) = tally.most_frequent() {
            write_annot_line(out, &v[0].query, *a)?
        }
    }
    Ok(hits.len())
}

pub fn process_alignments(cfg: &Config) -> anyhow::Result<()> {
    debug!("Starting processing");
    let annot = AnnotTable::from_file(cfg.annotations(), &ReadOpts::new())?;
    let mut wrt = CompressIo::new()
        .opt_path(cfg.output_file())
        .bufwriter()
        .with_context(|| "Failed to open output file")?;
    let n = impute_from_blat(
        open_psl(cfg.pslx())?,
        &annot,
        cfg.max_gap_bases(),
        &mut wrt,
    )
    .with_context(|| format!("Error processing alignments from {}", cfg.pslx().display()))?;
    info!("Annotations imputed for {} queries", n);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use utils::pslx::PslReader;

    fn psl(q: &str, q_size: usize, q_end: usize, t: &str, gap_bases: u32) -> String {
        format!(
            "{q_end}\t0\t0\t0\t1\t{gap_bases}\t0\t0\t+\t{q}\t{q_size}\t0\t{q_end}\t{t}\t2000\t0\t{q_end}\t1\t{q_end},\t0,\t0,\n"
        )
    }

    const ANNOT: &str = "db1,Drugs,Aminoglycosides,AAC3,extra
db2,Drugs,Aminoglycosides,AAC6
db3,Drugs,Betalactams,TEM
db4,Metals,Copper,CUP
";

    fn run(pslx: &str) -> anyhow::Result<String> {
        let annot = AnnotTable::read(&mut ANNOT.as_bytes(), &ReadOpts::new()).unwrap();
        let mut out = Vec::new();
        impute_from_blat(PslReader::new(pslx.as_bytes()), &annot, 100, &mut out)?;
        Ok(String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_best_coverage_votes() {
        let input = [
            psl("q1|a", 1000, 900, "db4", 0),
            psl("q1|b", 1000, 1000, "db3", 0),
            psl("q1|c", 1000, 1000, "db3", 0),
            psl("q1|d", 1000, 1000, "db1", 0),
            psl("q2", 500, 400, "db2", 0),
        ]
        .concat();
        assert_eq!(
            run(&input).unwrap(),
            "q1|a,Drugs,Betalactams,TEM\nq2,Drugs,Aminoglycosides,AAC6\n"
        );
    }

    #[test]
    fn test_tied_vote_is_deterministic() {
        let input = [
            psl("q1", 1000, 1000, "db1", 0),
            psl("q1", 1000, 1000, "db2", 0),
        ]
        .concat();
        // Equal counts: the greatest annotation wins
        assert_eq!(run(&input).unwrap(), "q1,Drugs,Aminoglycosides,AAC6\n");
    }

    #[test]
    fn test_gapped_alignments_skipped() {
        let input = [
            psl("q1", 1000, 1000, "db1", 500),
            psl("q1", 1000, 500, "db4", 0),
        ]
        .concat();
        assert_eq!(run(&input).unwrap(), "q1,Metals,Copper,CUP\n");
    }

    #[test]
    fn test_missing_target_annotation_is_fatal() {
        assert!(run(&psl("q1", 1000, 1000, "db9", 0)).is_err());
    }
}
