use std::io::{self, BufRead, Write};

use anyhow::Context;
use compress_io::compress::CompressIo;
use regex::Regex;

use utils::{
    annot::{write_annot_line, AnnotTable, ReadOpts},
    merge::impute_majority,
};

use crate::config::Config;

/// Read cd-hit cluster file.  Returns a vector of clusters, each a vector of member headers.
///
/// A line starting with '>' starts a new cluster.  Member lines look like
/// `0	1200nt, >header... *` and the header is the text between '>' and the first '...'
pub fn read_clusters<R: BufRead>(rdr: &mut R) -> anyhow::Result<Vec<Vec<String>>> {
    let reg = Regex::new(r">(.+?)\.{3}")?;
    let mut buf = String::new();
    let mut line = 0;
    let mut clusters: Vec<Vec<String>> = Vec::new();

    loop {
        buf.clear();
        if rdr
            .read_line(&mut buf)
            .with_context(|| format!("Error after reading {} lines", line))?
            == 0
        {
            break;
        }
        line += 1;
        let l = buf.trim();
        if l.is_empty() {
            continue;
        }
        if l.starts_with('>') {
            clusters.push(Vec::new());
        } else {
            let c = reg
                .captures(l)
                .ok_or_else(|| anyhow!("line {}: Could not find member header", line))?;
            let cl = clusters
                .last_mut()
                .ok_or_else(|| anyhow!("line {}: Member line before first cluster", line))?;
            cl.push(c[1].to_owned())
        }
    }
    clusters.retain(|c| !c.is_empty());
    Ok(clusters)
}

/// Counts collected while imputing
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Stats {
    pub clusters: usize,
    pub singletons: usize,
    pub conflicts: usize,
    pub unclustered: usize,
}

/// Write annotations for each cluster, imputing missing fields by majority vote within
/// multi-member clusters.  Annotations for sequences not in any cluster are written last.
///
/// If `verbose` is set, clusters are separated by blank lines and voting conflicts are
/// written to `report`
pub fn impute_clusters<W: Write, V: Write>(
    clusters: &[Vec<String>],
    mut annot: AnnotTable,
    n_fields: usize,
    verbose: bool,
    out: &mut W,
    report: &mut V,
) -> anyhow::Result<Stats> {
    let mut stats = Stats::default();
    for cl in clusters.iter() {
        stats.clusters += 1;
        let mut members = Vec::with_capacity(cl.len());
        for h in cl.iter() {
            members.push(
                annot
                    .take(h)
                    .with_context(|| format!("Error processing cluster {}", stats.clusters))?,
            )
        }
        if cl.len() == 1 {
            stats.singletons += 1
        } else {
            let conflicts = impute_majority(&mut members, n_fields);
            stats.conflicts += conflicts.len();
            if verbose {
                for c in conflicts.iter() {
                    writeln!(
                        report,
                        "{}\t{}\t{}",
                        cl.join(","),
                        c.field + 1,
                        c.values.join(",")
                    )?
                }
            }
        }
        for (h, m) in cl.iter().zip(members.iter()) {
            write_annot_line(out, h, m)?
        }
        if verbose {
            writeln!(out)?
        }
    }
    stats.unclustered = annot.len();
    annot.write(out)?;
    Ok(stats)
}

pub fn process_clusters(cfg: &Config) -> anyhow::Result<()> {
    debug!("Starting processing");
    let annot = AnnotTable::from_file(cfg.annotations(), &ReadOpts::new())?;

    let clusters = {
        let mut rdr = CompressIo::new()
            .path(cfg.clusters())
            .bufreader()
            .with_context(|| format!("Error opening cluster file {}", cfg.clusters().display()))?;
        read_clusters(&mut rdr).with_context(|| {
            format!(
                "Error reading clusters from {}",
                cfg.clusters().display()
            )
        })?
    };
    debug!("Read {} clusters", clusters.len());

    let mut wrt = CompressIo::new()
        .path(cfg.output_file())
        .bufwriter()
        .with_context(|| format!("Failed to open output file {}", cfg.output_file().display()))?;
    let stdout = io::stdout();
    let mut report = stdout.lock();

    let stats = impute_clusters(
        &clusters,
        annot,
        cfg.n_fields(),
        cfg.verbose(),
        &mut wrt,
        &mut report,
    )?;
    info!(
        "{} clusters ({} singletons); {} unresolved fields; {} unclustered annotations",
        stats.clusters, stats.singletons, stats.conflicts, stats.unclustered
    );
    Ok(())
}
