use std::io::Write;

use anyhow::Context;
use compress_io::compress::CompressIo;

use utils::{
    annot::{AnnotTable, ReadOpts},
    gff::GenomeFeatures,
    overlap::aligned_bases,
    pslx::{open_psl, PslRecord},
};

use crate::config::Config;

const HEADER: &str = "query\ttarget\tstrand\tquery size\tquery start\tquery end\tmismatches\tquery gaps\ttarget gaps\tfeature\toverlap start\toverlap end\toverlap length\taligned bases\tfeature coverage\tannotation";

/// Write one line for each feature overlapped by each alignment.
/// Returns the number of alignments read and the number of lines written
pub fn write_overlaps<I, W>(
    alignments: I,
    features: &GenomeFeatures,
    annot: &AnnotTable,
    wrt: &mut W,
) -> anyhow::Result<(usize, usize)>
where
    I: IntoIterator<Item = anyhow::Result<PslRecord>>,
    W: Write,
{
    writeln!(wrt, "{}", HEADER)?;
    let mut n_aln = 0;
    let mut n_out = 0;
    for rec in alignments {
        let rec = rec?;
        n_aln += 1;
        let fields = annot.require(&rec.q_name)?;
        let idx = features
            .resolve(&rec.t_name)
            .with_context(|| format!("Error processing alignment of {}", rec.q_name))?;
        let ovs = idx.overlaps(rec.t_start, rec.t_end);
        if ovs.is_empty() {
            trace!(
                "No features overlap {} at {}:{}-{}",
                rec.q_name,
                rec.t_name,
                rec.t_start,
                rec.t_end
            );
        }
        for ov in ovs {
            write!(
                wrt,
                "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{:.4}",
                rec.q_name,
                rec.t_name,
                rec.strand,
                rec.q_size,
                rec.q_start,
                rec.q_end,
                rec.mismatches,
                rec.q_gap_count,
                rec.t_gap_count,
                ov.feature.id,
                ov.start,
                ov.end,
                ov.len(),
                aligned_bases(rec.target_blocks(), ov.start, ov.end),
                ov.feature_coverage(),
            )?;
            for f in fields {
                write!(wrt, "\t{}", f)?
            }
            writeln!(wrt)?;
            n_out += 1;
        }
    }
    Ok((n_aln, n_out))
}

pub fn process_alignments(cfg: &Config) -> anyhow::Result<()> {
    debug!("Starting processing");
    let features = GenomeFeatures::from_file(cfg.gff(), cfg.filter())?;
    info!(
        "Read {} features on {} reference sequences",
        features.n_features(),
        features.refs().len()
    );
    let annot = AnnotTable::from_file(cfg.annotations(), &ReadOpts::new())?;
    let rdr = open_psl(cfg.pslx())?;

    let mut wrt = CompressIo::new()
        .opt_path(cfg.output_file())
        .bufwriter()
        .with_context(|| "Failed to open output file")?;

    let (n_aln, n_out) = write_overlaps(rdr, &features, &annot, &mut wrt)
        .with_context(|| format!("Error reading alignments from {}", cfg.pslx().display()))?;
    info!(
        "Processed {} alignments; {} feature overlaps written",
        n_aln, n_out
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use utils::{gff::GffFilter, pslx::PslReader};

    const GFF: &str = "chr\tena\tgene\t101\t200\t.\t+\t.\tID=geneA\nchr\tena\tgene\t251\t500\t.\t+\t.\tID=geneB\n";

    fn psl(q: &str, t: &str, t_start: usize, t_end: usize) -> String {
        let l = t_end - t_start;
        format!(
            "{l}\t0\t0\t0\t0\t0\t0\t0\t+\t{q}\t{l}\t0\t{l}\t{t}\t1000\t{t_start}\t{t_end}\t1\t{l},\t0,\t{t_start},\n"
        )
    }

    fn run(pslx: &str, annot: &str) -> anyhow::Result<String> {
        let features =
            GenomeFeatures::read(&mut GFF.as_bytes(), &GffFilter::default()).unwrap();
        let annot = AnnotTable::read(&mut annot.as_bytes(), &ReadOpts::new()).unwrap();
        let mut out = Vec::new();
        write_overlaps(PslReader::new(pslx.as_bytes()), &features, &annot, &mut out)?;
        Ok(String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_overlap_report() {
        let out = run(&psl("amr1", "chr", 150, 400), "amr1,Drugs,NA,GroupX\n").unwrap();
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], HEADER);
        assert_eq!(
            lines[1],
            "amr1\tchr\t+\t250\t0\t250\t0\t0\t0\tID=geneA\t150\t200\t50\t50\t0.5000\tDrugs\t\tGroupX"
        );
        assert!(lines[2].contains("\tID=geneB\t250\t400\t150\t150\t0.6000\t"));
    }

    #[test]
    fn test_missing_annotation_is_fatal() {
        assert!(run(&psl("amr2", "chr", 150, 400), "amr1,a,b,c\n").is_err());
    }

    #[test]
    fn test_single_reference_fallback() {
        let out = run(&psl("amr1", "other_name", 120, 130), "amr1,a,b,c\n").unwrap();
        assert_eq!(out.lines().count(), 2);
    }
}
