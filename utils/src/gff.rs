use std::{collections::HashMap, io::BufRead, path::Path};

use anyhow::Context;
use compress_io::compress::CompressIo;

use crate::{
    get_next_line,
    overlap::{Feature, FeatureIndex},
    parse_field,
};

pub const DEFAULT_SOURCE: &str = "ena";
pub const DEFAULT_FEATURE_TYPE: &str = "gene";

/// Which GFF3 rows are kept: column 2 must match `source` and column 3 `feature_type`
#[derive(Debug, Clone)]
pub struct GffFilter {
    source: String,
    feature_type: String,
}

impl Default for GffFilter {
    fn default() -> Self {
        Self::new(DEFAULT_SOURCE, DEFAULT_FEATURE_TYPE)
    }
}

impl GffFilter {
    pub fn new<S: Into<String>, T: Into<String>>(source: S, feature_type: T) -> Self {
        Self {
            source: source.into(),
            feature_type: feature_type.into(),
        }
    }

    fn keep(&self, fields: &[&str]) -> bool {
        fields[1] == self.source && fields[2] == self.feature_type
    }
}

/// GenomeFeatures
///
/// One FeatureIndex per reference sequence of a GFF3 file.  Feature ids are the raw
/// attribute strings (column 9).  GFF coordinates (1 based, inclusive) are converted
/// to the 0 based, half open convention used by BLAT.
#[derive(Debug, Default)]
pub struct GenomeFeatures {
    refs: Vec<FeatureIndex>,
    ref_hash: HashMap<String, usize>,
}

impl GenomeFeatures {
    pub fn read<R: BufRead>(rdr: &mut R, filter: &GffFilter) -> anyhow::Result<Self> {
        let mut buf = String::new();
        let mut line = 0;
        let mut names = Vec::new();
        let mut feats: HashMap<String, Vec<Feature>> = HashMap::new();

        while let Some(fields) = get_next_line(rdr, &mut buf)
            .with_context(|| format!("Error after reading {} lines", line))?
        {
            line += 1;
            // Embedded sequences follow the annotation
            if fields[0].starts_with("##FASTA") || fields[0].starts_with('>') {
                debug!("Sequence section found at line {}", line);
                break;
            }
            if fields[0].is_empty() || fields[0].starts_with('#') {
                continue;
            }
            if fields.len() < 9 {
                return Err(anyhow!(
                    "line {}: Expected 9 columns, found {}",
                    line,
                    fields.len()
                ));
            }
            if !filter.keep(&fields) {
                continue;
            }
            let start: usize = parse_field(fields[3], "start")
                .with_context(|| format!("line {}: Error reading feature", line))?;
            let end: usize = parse_field(fields[4], "end")
                .with_context(|| format!("line {}: Error reading feature", line))?;
            if start == 0 || end < start {
                return Err(anyhow!(
                    "line {}: Invalid feature coordinates {}-{}",
                    line,
                    start,
                    end
                ));
            }
            let v = feats.entry(fields[0].to_owned()).or_insert_with(|| {
                trace!("Adding reference sequence {}", fields[0]);
                names.push(fields[0].to_owned());
                Vec::new()
            });
            v.push(Feature::new(fields[8], start - 1, end));
        }

        let mut gf = Self::default();
        for name in names {
            let v = feats.remove(&name).unwrap_or_default();
            debug!("{} features found for {}", v.len(), name);
            gf.ref_hash.insert(name.clone(), gf.refs.len());
            gf.refs.push(FeatureIndex::new(name, v));
        }
        Ok(gf)
    }

    pub fn from_file<P: AsRef<Path>>(fname: P, filter: &GffFilter) -> anyhow::Result<Self> {
        let fname = fname.as_ref();
        debug!("Reading in features from {}", fname.display());
        let mut rdr = CompressIo::new()
            .path(fname)
            .bufreader()
            .with_context(|| format!("Error opening GFF file {}", fname.display()))?;
        Self::read(&mut rdr, filter)
            .with_context(|| format!("Error reading features from {}", fname.display()))
    }

    pub fn refs(&self) -> &[FeatureIndex] {
        &self.refs
    }

    pub fn n_features(&self) -> usize {
        self.refs.iter().map(|r| r.len()).sum()
    }

    /// Find the feature index for an alignment target.
    ///
    /// Exact name match is required unless there is only one reference sequence,
    /// in which case that is used whatever the target name.
    pub fn resolve(&self, target: &str) -> anyhow::Result<&FeatureIndex> {
        if let Some(i) = self.ref_hash.get(target) {
            Ok(&self.refs[*i])
        } else if self.refs.len() == 1 {
            trace!(
                "Target {} not found; using sole reference {}",
                target,
                self.refs[0].name()
            );
            Ok(&self.refs[0])
        } else {
            Err(anyhow!(
                "Target sequence {} not found among {} reference sequences in feature table",
                target,
                self.refs.len()
            ))
        }
    }
}
