use std::{
    collections::{HashMap, HashSet},
    io::{self, BufRead, Write},
};

use anyhow::Context;
use compress_io::compress::CompressIo;
use indexmap::IndexMap;
use regex::Regex;

use utils::{get_next_line, merge::Tally, parse_field};

use crate::config::Config;

const PROGRESS_INTERVAL: usize = 200000;
const NULL_ORIGIN: &str = "NA";

/// Subject key: (gene identifier, accession)
pub type Key = (String, String);

/// Subjects hit by DIAMOND.  Accepted subjects record the first query that hit them
#[derive(Debug, Default)]
pub struct DiamondHits {
    accepted: IndexMap<Key, String>,
    rejected: HashSet<Key>,
}

impl DiamondHits {
    pub fn n_accepted(&self) -> usize {
        self.accepted.len()
    }

    pub fn n_rejected(&self) -> usize {
        self.rejected.len()
    }

    // A subject rejected by any hit is not used even if another hit accepted it
    fn is_usable(&self, k: &Key) -> bool {
        self.accepted.contains_key(k) && !self.rejected.contains(k)
    }
}

/// Read DIAMOND blastx tabular output (query, subject, percent identity, ...).
///
/// Subject ids look like `gi|<gene id>|ref|<accession>|`.  Hits with identity of at least
/// `min_identity` are accepted
pub fn read_diamond<R: BufRead>(rdr: &mut R, min_identity: f64) -> anyhow::Result<DiamondHits> {
    let mut buf = String::new();
    let mut line = 0;
    let mut hits = DiamondHits::default();

    while let Some(fields) =
        get_next_line(rdr, &mut buf).with_context(|| format!("Error after reading {} lines", line))?
    {
        line += 1;
        if fields[0].is_empty() || fields[0].starts_with('#') {
            continue;
        }
        if fields.len() < 3 {
            return Err(anyhow!("line {}: Too few columns", line));
        }
        let subject: Vec<_> = fields[1].split('|').collect();
        if subject.len() < 4 {
            return Err(anyhow!(
                "line {}: Could not parse subject id {}",
                line,
                fields[1]
            ));
        }
        let key = (subject[1].to_owned(), subject[3].to_owned());
        let identity: f64 = parse_field(fields[2], "percent identity")
            .with_context(|| format!("line {}", line))?;
        if identity >= min_identity {
            hits.accepted
                .entry(key)
                .or_insert_with(|| fields[0].to_owned());
        } else {
            hits.rejected.insert(key);
        }
    }
    Ok(hits)
}

/// Read blastdbcmd output, collecting the sequence titles for each usable subject.
///
/// Fields are separated either by tabs or by the two character sequence `\t`.
/// Field 1 is the accession, field 2 the gene identifier and field 5 the title
pub fn read_titles<R: BufRead>(
    rdr: &mut R,
    hits: &DiamondHits,
) -> anyhow::Result<HashMap<Key, Tally<String>>> {
    let mut buf = String::new();
    let mut line = 0;
    let mut titles: HashMap<Key, Tally<String>> = HashMap::new();

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
        if line % PROGRESS_INTERVAL == 0 {
            info!("{} lines processed", line)
        }
        let l = buf.trim_end();
        if l.is_empty() || l.starts_with('#') {
            continue;
        }
        let fields: Vec<_> = if l.contains("\\t") {
            l.split("\\t").collect()
        } else {
            l.split('\t').collect()
        };
        if fields.len() < 6 {
            return Err(anyhow!("line {}: Too few fields in blastdbcmd record", line));
        }
        let key = (fields[2].to_owned(), fields[1].to_owned());
        if hits.is_usable(&key) {
            titles.entry(key).or_default().add(fields[5].to_owned())
        }
    }
    info!("{} lines processed", line);
    Ok(titles)
}

/// Choose a title for a subject and split off the source organism
pub struct TitlePicker {
    unknown: Regex,
    origin: Regex,
}

impl TitlePicker {
    pub fn new() -> anyhow::Result<Self> {
        Ok(Self {
            unknown: Regex::new("unknown")?,
            origin: Regex::new(r"^(.*?)\s*\[(.*)\]$")?,
        })
    }

    /// Returns the most frequent title not containing `unknown` with any trailing
    /// `[organism]` split off, and the organism (`NA` if not present)
    pub fn pick(&self, titles: &Tally<String>) -> Option<(String, String)> {
        let t = titles.most_frequent_by(|s| !self.unknown.is_match(s))?;
        Some(match self.origin.captures(t) {
            Some(c) => (c[1].to_owned(), c[2].to_owned()),
            None => (t.to_owned(), NULL_ORIGIN.to_owned()),
        })
    }
}

#[derive(Debug, Default)]
pub struct QueryAnnot {
    keys: Tally<String>,
    titles: Tally<String>,
    origins: Tally<String>,
}

/// Collect the chosen titles and origins of each query's subjects.
///
/// Returns the annotated queries in order of their first accepted hit, and the sorted
/// list of queries with accepted hits for which no title could be chosen
pub fn summarize(
    hits: &DiamondHits,
    titles: &HashMap<Key, Tally<String>>,
    picker: &TitlePicker,
) -> (IndexMap<String, QueryAnnot>, Vec<String>) {
    let mut annotated: IndexMap<String, QueryAnnot> = IndexMap::new();
    for (key, query) in hits.accepted.iter() {
        if let Some((title, origin)) = titles.get(key).and_then(|t| picker.pick(t)) {
            let qa = annotated.entry(query.to_owned()).or_default();
            qa.keys.add(format!("{}|{}", key.0, key.1));
            qa.titles.add(title);
            qa.origins.add(origin);
        }
    }
    let mut unannotated: Vec<String> = hits
        .accepted
        .values()
        .filter(|q| !annotated.contains_key(q.as_str()))
        .cloned()
        .collect();
    unannotated.sort();
    unannotated.dedup();
    (annotated, unannotated)
}

fn join(t: &Tally<String>, sep: &str) -> String {
    t.values().map(|s| s.as_str()).collect::<Vec<_>>().join(sep)
}

/// Output columns: query, best title, best origin, all titles, all subject keys
pub fn write_annotations<W: Write>(
    out: &mut W,
    annotated: &IndexMap<String, QueryAnnot>,
) -> io::Result<()> {
    for (query, qa) in annotated.iter() {
        writeln!(
            out,
            "{}\t{}\t{}\t{}\t{}",
            query,
            qa.titles.most_frequent().map(|s| s.as_str()).unwrap_or(""),
            qa.origins.most_frequent().map(|s| s.as_str()).unwrap_or(""),
            join(&qa.titles, "|"),
            join(&qa.keys, ";")
        )?
    }
    Ok(())
}

pub fn process_hits(cfg: &Config) -> anyhow::Result<()> {
    debug!("Starting processing");
    let hits = {
        let mut rdr = CompressIo::new()
            .path(cfg.diamond())
            .bufreader()
            .with_context(|| format!("Error opening DIAMOND file {}", cfg.diamond().display()))?;
        read_diamond(&mut rdr, cfg.min_identity())
            .with_context(|| format!("Error reading hits from {}", cfg.diamond().display()))?
    };
    info!(
        "{} accepted and {} rejected subjects from DIAMOND hits",
        hits.n_accepted(),
        hits.n_rejected()
    );

    let titles = {
        let mut rdr = CompressIo::new()
            .path(cfg.blastdbcmd())
            .bufreader()
            .with_context(|| {
                format!(
                    "Error opening blastdbcmd file {}",
                    cfg.blastdbcmd().display()
                )
            })?;
        read_titles(&mut rdr, &hits)
            .with_context(|| format!("Error reading titles from {}", cfg.blastdbcmd().display()))?
    };

    let picker = TitlePicker::new()?;
    let (annotated, unannotated) = summarize(&hits, &titles, &picker);

    let mut wrt = CompressIo::new()
        .path(cfg.unannotated())
        .bufwriter()
        .with_context(|| format!("Failed to open output file {}", cfg.unannotated().display()))?;
    for q in unannotated.iter() {
        writeln!(wrt, "{}", q)?
    }

    let mut wrt = CompressIo::new()
        .opt_path(cfg.output_file())
        .bufwriter()
        .with_context(|| "Failed to open output file")?;
    write_annotations(&mut wrt, &annotated)?;
    info!(
        "{} queries annotated, {} unannotated",
        annotated.len(),
        unannotated.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const DIAMOND: &str = "# DIAMOND v2
q1\tgi|111|ref|WP_1.1|\t95.0\t100
q1\tgi|222|ref|WP_2.1|\t80.0\t100
q2\tgi|111|ref|WP_1.1|\t99.0\t100
q1\tgi|666|ref|WP_6.1|\t88.0\t100
q2\tgi|333|ref|WP_3.1|\t50.0\t100
q4\tgi|555|ref|WP_5.1|\t90.0\t100
q3\tgi|444|ref|WP_4.1|\t90.0\t100
q4\tgi|555|ref|WP_5.1|\t40.0\t100
";

    const BLASTDBCMD: &str = r"SEQ\tWP_1.1\t111\t1\tid\tbeta-lactamase TEM-1 [Escherichia coli]\t286
SEQ	WP_1.1	111	1	id	hypothetical unknown protein	286
SEQ	WP_1.1	111	1	id	hypothetical unknown protein	286
SEQ	WP_6.1	666	1	id	beta-lactamase TEM-1 [Escherichia coli]	286
SEQ	WP_2.1	222	1	id	AAC(6') acetyltransferase [Klebsiella]	150
SEQ	WP_3.1	333	1	id	CTX-M [Salmonella]	150
SEQ	WP_4.1	444	1	id	unknown function	100
SEQ	WP_5.1	555	1	id	CupA [Yersinia]	100
";

    fn run() -> (String, Vec<String>) {
        let hits = read_diamond(&mut DIAMOND.as_bytes(), 70.0).unwrap();
        let titles = read_titles(&mut BLASTDBCMD.as_bytes(), &hits).unwrap();
        let picker = TitlePicker::new().unwrap();
        let (annotated, unannotated) = summarize(&hits, &titles, &picker);
        let mut out = Vec::new();
        write_annotations(&mut out, &annotated).unwrap();
        (String::from_utf8(out).unwrap(), unannotated)
    }

    #[test]
    fn test_read_diamond() {
        let hits = read_diamond(&mut DIAMOND.as_bytes(), 70.0).unwrap();
        assert_eq!(hits.n_accepted(), 5);
        assert_eq!(hits.n_rejected(), 2);
        // First query to hit a subject keeps it
        let k = ("111".to_owned(), "WP_1.1".to_owned());
        assert_eq!(hits.accepted.get(&k).map(|s| s.as_str()), Some("q1"));
        assert!(!hits.is_usable(&("555".to_owned(), "WP_5.1".to_owned())));
    }

    #[test]
    fn test_bad_diamond_lines() {
        assert!(read_diamond(&mut "q1\tgi|1|ref|A|\tx\n".as_bytes(), 70.0).is_err());
        assert!(read_diamond(&mut "q1\tA\t99.0\n".as_bytes(), 70.0).is_err());
    }

    #[test]
    fn test_pick_title() {
        let picker = TitlePicker::new().unwrap();
        let t: Tally<String> = ["protein X [Org sp.]", "unknown", "unknown"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(
            picker.pick(&t),
            Some(("protein X".to_owned(), "Org sp.".to_owned()))
        );
        let t: Tally<String> = std::iter::once("protein Y".to_owned()).collect();
        assert_eq!(
            picker.pick(&t),
            Some(("protein Y".to_owned(), "NA".to_owned()))
        );
        let t: Tally<String> = std::iter::once("unknown protein".to_owned()).collect();
        assert_eq!(picker.pick(&t), None);
    }

    #[test]
    fn test_impute() {
        let (out, unannotated) = run();
        assert_eq!(
            out,
            "q1\tbeta-lactamase TEM-1\tEscherichia coli\tAAC(6') acetyltransferase|beta-lactamase TEM-1\t111|WP_1.1;222|WP_2.1;666|WP_6.1\n"
        );
        assert_eq!(unannotated, vec!["q3", "q4"]);
    }
}
