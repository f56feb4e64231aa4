use std::io::{BufRead, Write};

use anyhow::Context;
use compress_io::compress::CompressIo;

use utils::{
    annot::{pad_fields, AnnotTable, ReadOpts, N_CORE_FIELDS},
    get_next_line,
};

use crate::config::Config;

/// Columns of a uc record copied to the output: type, cluster, size, identity, query label
const UC_COLUMNS: [usize; 5] = [0, 1, 2, 3, 8];

/// Column holding the query label
const LABEL_COLUMN: usize = 8;

/// Write selected columns of each uc record followed by the annotation of the query.
/// Returns number of records written
pub fn annotate_clusters<R: BufRead, W: Write>(
    rdr: &mut R,
    annot: &AnnotTable,
    out: &mut W,
) -> anyhow::Result<usize> {
    let mut buf = String::new();
    let mut line = 0;
    let mut n = 0;

    while let Some(fields) =
        get_next_line(rdr, &mut buf).with_context(|| format!("Error after reading {} lines", line))?
    {
        line += 1;
        if fields[0].is_empty() {
            continue;
        }
        if fields.len() <= LABEL_COLUMN {
            return Err(anyhow!(
                "line {}: Too few columns ({}) in uc record",
                line,
                fields.len()
            ));
        }
        let mut a: Vec<String> = annot
            .require(fields[LABEL_COLUMN])
            .with_context(|| format!("line {}", line))?
            .iter()
            .take(N_CORE_FIELDS)
            .cloned()
            .collect();
        pad_fields(&mut a, N_CORE_FIELDS);
        let v: Vec<&str> = UC_COLUMNS
            .iter()
            .map(|i| fields[*i])
            .chain(a.iter().map(|s| s.as_str()))
            .collect();
        writeln!(out, "{}", v.join("\t"))?;
        n += 1;
    }
    Ok(n)
}

pub fn process_clusters(cfg: &Config) -> anyhow::Result<()> {
    debug!("Starting processing");
    let annot = AnnotTable::from_file(
        cfg.annotations(),
        &ReadOpts::new().max_fields(N_CORE_FIELDS),
    )?;
    let mut rdr = CompressIo::new()
        .path(cfg.uc_file())
        .bufreader()
        .with_context(|| format!("Error opening uc file {}", cfg.uc_file().display()))?;
    let mut wrt = CompressIo::new()
        .opt_path(cfg.output_file())
        .bufwriter()
        .with_context(|| "Failed to open output file")?;
    let n = annotate_clusters(&mut rdr, &annot, &mut wrt)
        .with_context(|| format!("Error processing {}", cfg.uc_file().display()))?;
    info!("{} records annotated", n);
    Ok(())
}
