use std::io::{self, BufRead, Write};

use anyhow::Context;
use compress_io::compress::CompressIo;
use indexmap::{IndexMap, IndexSet};

use utils::{
    annot::{read_annot_records, write_annot_line, ReadOpts},
    merge::{choose_annotation, Preference},
};

use crate::config::Config;

/// Annotation field (group) that is normalized to upper case
pub const GROUP_FIELD: usize = 2;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Stats {
    pub headers: usize,
    pub duplicated: usize,
    pub ties: usize,
    pub unresolved: usize,
}

fn write_report<V: Write>(report: &mut V, header: &str, values: &[&Vec<String>]) -> io::Result<()> {
    write!(report, "{}", header)?;
    for v in values {
        write!(report, "\t{}", v.join(","))?
    }
    writeln!(report)
}

/// Remove duplicated headers from an annotation table.
///
/// The header line is copied to the output.  Where a sequence header occurs more than once,
/// identical entries are collapsed; otherwise the entry with fewest empty fields is kept,
/// with ties (written to `report`) resolved according to `prefer`.  If `report_only` is set
/// duplicated entries are written to `report` and left out of the output.
pub fn clean_annotations<R: BufRead, W: Write, V: Write>(
    rdr: &mut R,
    out: &mut W,
    report: &mut V,
    report_only: bool,
    prefer: Preference,
) -> anyhow::Result<Stats> {
    let mut buf = String::new();
    if rdr.read_line(&mut buf)? > 0 && !buf.trim().is_empty() {
        writeln!(out, "{}", buf.trim_end())?
    }

    let mut h: IndexMap<String, Vec<Vec<String>>> = IndexMap::new();
    for mut rec in read_annot_records(rdr, &ReadOpts::new())? {
        if let Some(s) = rec.fields.get_mut(GROUP_FIELD) {
            *s = s.to_uppercase()
        }
        h.entry(rec.header).or_default().push(rec.fields)
    }

    let mut stats = Stats {
        headers: h.len(),
        ..Default::default()
    };
    for (header, values) in h {
        if values.len() == 1 {
            write_annot_line(out, &header, &values[0])?;
            continue;
        }
        stats.duplicated += 1;
        if report_only {
            write_report(report, &header, &values.iter().collect::<Vec<_>>())?;
            continue;
        }
        // Distinct entries, keeping first occurrence order
        let values: Vec<_> = values
            .into_iter()
            .collect::<IndexSet<_>>()
            .into_iter()
            .collect();
        if values.iter().all(|v| *v == values[0]) {
            write_annot_line(out, &header, &values[0])?;
            continue;
        }
        let choice = choose_annotation(&values, prefer);
        if choice.is_tie() {
            stats.ties += 1;
            let tied: Vec<_> = choice.tied.iter().map(|i| &values[*i]).collect();
            write_report(report, &header, &tied)?;
        }
        match choice.chosen {
            Some(i) => write_annot_line(out, &header, &values[i])?,
            None => {
                debug!("Leaving {} unresolved", header);
                stats.unresolved += 1
            }
        }
    }
    Ok(stats)
}

pub fn process_annotations(cfg: &Config) -> anyhow::Result<()> {
    debug!("Starting processing");
    let mut rdr = CompressIo::new()
        .path(cfg.input_file())
        .bufreader()
        .with_context(|| format!("Error opening input file {}", cfg.input_file().display()))?;
    let mut wrt = CompressIo::new()
        .path(cfg.output_file())
        .bufwriter()
        .with_context(|| format!("Failed to open output file {}", cfg.output_file().display()))?;
    let stdout = io::stdout();
    let mut report = stdout.lock();

    let stats = clean_annotations(
        &mut rdr,
        &mut wrt,
        &mut report,
        cfg.report_only(),
        cfg.prefer(),
    )
    .with_context(|| format!("Error processing {}", cfg.input_file().display()))?;

    info!(
        "{} headers, {} duplicated",
        stats.headers, stats.duplicated
    );
    if stats.ties > 0 {
        warn!(
            "{} duplicated headers with equally complete entries ({} left unresolved)",
            stats.ties, stats.unresolved
        )
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const INPUT: &str = "header,class,mechanism,group
g1,Drugs,m1,grpa
g2,Drugs,m2,grpB
g2,Drugs,m2,GRPB
g3,Drugs,,grpC
g3,Drugs,m3,grpC
g4,Drugs,mA,
g4,Drugs,,gB
g4,NA,NA,NA
";

    fn run(input: &str, report_only: bool, prefer: Preference) -> (String, String, Stats) {
        let mut out = Vec::new();
        let mut report = Vec::new();
        let stats = clean_annotations(
            &mut input.as_bytes(),
            &mut out,
            &mut report,
            report_only,
            prefer,
        )
        .unwrap();
        (
            String::from_utf8(out).unwrap(),
            String::from_utf8(report).unwrap(),
            stats,
        )
    }

    #[test]
    fn test_clean() {
        let (out, report, stats) = run(INPUT, false, Preference::Last);
        assert_eq!(
            out,
            "header,class,mechanism,group
g1,Drugs,m1,GRPA
g2,Drugs,m2,GRPB
g3,Drugs,m3,GRPC
g4,Drugs,,GB
"
        );
        assert_eq!(report, "g4\tDrugs,mA,\tDrugs,,GB\n");
        assert_eq!(stats.duplicated, 3);
        assert_eq!(stats.ties, 1);
    }

    #[test]
    fn test_prefer_first_and_none() {
        let (out, _, _) = run(INPUT, false, Preference::First);
        assert!(out.ends_with("g4,Drugs,mA,\n"));
        let (out, report, stats) = run(INPUT, false, Preference::None);
        assert!(!out.contains("g4"));
        assert!(report.starts_with("g4\t"));
        assert_eq!(stats.unresolved, 1);
    }

    #[test]
    fn test_report_only() {
        let (out, report, _) = run(INPUT, true, Preference::Last);
        assert_eq!(out, "header,class,mechanism,group\ng1,Drugs,m1,GRPA\n");
        assert_eq!(report.lines().count(), 3);
        assert!(report.starts_with("g2\tDrugs,m2,GRPB\tDrugs,m2,GRPB\n"));
    }

    #[test]
    fn test_non_adjacent_duplicates_collapsed() {
        let input = "header,class,mechanism,group
g,Drugs,mA,
g,Drugs,,GB
g,Drugs,mA,
";
        let (out, report, stats) = run(input, false, Preference::Last);
        assert_eq!(out, "header,class,mechanism,group\ng,Drugs,,GB\n");
        assert_eq!(report, "g\tDrugs,mA,\tDrugs,,GB\n");
        assert_eq!(stats.ties, 1);
    }

    #[test]
    fn test_second_pass_is_noop() {
        let (once, _, _) = run(INPUT, false, Preference::Last);
        let (twice, report, stats) = run(&once, false, Preference::Last);
        assert_eq!(once, twice);
        assert!(report.is_empty());
        assert_eq!(stats.duplicated, 0);
    }
}
