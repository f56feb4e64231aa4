use std::{
    collections::HashMap,
    io::{BufRead, Write},
    path::Path,
};

use anyhow::Context;
use compress_io::compress::CompressIo;

use utils::{
    annot::{pad_fields, write_annot_line},
    get_next_line,
};

use crate::config::Config;

/// Class guesses that do not give a usable annotation
const UNRESOLVED: [&str; 2] = ["NaN", "NRes"];

/// Annotation fields written for each candidate (class followed by empty fields)
const OUTPUT_FIELDS: usize = 4;

/// Read mapping from sequence title to class.  Input lines are `class<TAB>title`;
/// where a title is repeated the first class is kept
pub fn read_class_table<R: BufRead>(rdr: &mut R) -> anyhow::Result<HashMap<String, String>> {
    let mut buf = String::new();
    let mut line = 0;
    let mut h = HashMap::new();

    while let Some(fields) =
        get_next_line(rdr, &mut buf).with_context(|| format!("Error after reading {} lines", line))?
    {
        line += 1;
        if fields[0].is_empty() {
            continue;
        }
        if fields.len() < 2 {
            return Err(anyhow!("line {}: Expected class and title", line));
        }
        h.entry(fields[1].to_owned())
            .or_insert_with(|| fields[0].to_owned());
    }
    Ok(h)
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Stats {
    pub guessed: usize,
    pub leftover: usize,
}

/// Look up the class for the title (column 2) of each annotated query.  Queries with a
/// usable class are written as candidate annotations; the others are copied to `leftover`.
/// A title missing from the class table is an error
pub fn guess_classes<R: BufRead, W: Write, V: Write>(
    rdr: &mut R,
    classes: &HashMap<String, String>,
    out: &mut W,
    leftover: &mut V,
) -> anyhow::Result<Stats> {
    let mut buf = String::new();
    let mut line = 0;
    let mut stats = Stats::default();

    while let Some(fields) =
        get_next_line(rdr, &mut buf).with_context(|| format!("Error after reading {} lines", line))?
    {
        line += 1;
        if fields[0].is_empty() {
            continue;
        }
        if fields.len() < 2 {
            return Err(anyhow!("line {}: Expected query and title", line));
        }
        let class = classes
            .get(fields[1])
            .ok_or_else(|| anyhow!("line {}: No class found for title {}", line, fields[1]))?;
        if UNRESOLVED.contains(&class.as_str()) {
            writeln!(leftover, "{}", fields.join("\t"))?;
            stats.leftover += 1;
        } else {
            let mut a = vec![class.to_owned()];
            pad_fields(&mut a, OUTPUT_FIELDS);
            write_annot_line(out, fields[0], &a)?;
            stats.guessed += 1;
        }
    }
    Ok(stats)
}

fn open_output(p: &Path) -> anyhow::Result<impl Write> {
    CompressIo::new()
        .path(p)
        .bufwriter()
        .with_context(|| format!("Failed to open output file {}", p.display()))
}

pub fn process_guesses(cfg: &Config) -> anyhow::Result<()> {
    debug!("Starting processing");
    let classes = {
        let mut rdr = CompressIo::new()
            .path(cfg.class_table())
            .bufreader()
            .with_context(|| {
                format!(
                    "Error opening class file {}",
                    cfg.class_table().display()
                )
            })?;
        read_class_table(&mut rdr).with_context(|| {
            format!(
                "Error reading classes from {}",
                cfg.class_table().display()
            )
        })?
    };
    debug!("Read {} title classes", classes.len());

    let mut rdr = CompressIo::new()
        .path(cfg.annotated())
        .bufreader()
        .with_context(|| format!("Error opening input file {}", cfg.annotated().display()))?;
    let mut out = open_output(cfg.output_file())?;
    let mut leftover = open_output(cfg.leftover_file())?;

    let stats = guess_classes(&mut rdr, &classes, &mut out, &mut leftover)
        .with_context(|| format!("Error processing {}", cfg.annotated().display()))?;
    info!(
        "{} queries with a class guess, {} left over",
        stats.guessed, stats.leftover
    );
    Ok(())
}
