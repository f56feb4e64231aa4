use std::path::{Path, PathBuf};

/// Config
///
/// pslx - BLAT alignments of query sequences against database sequences
/// annotations - database annotation table
/// output_file - imputed annotations (stdout if not set)
/// max_gap_bases - alignments with more query or target gap bases are ignored
///
pub struct Config {
    pslx: PathBuf,
    annotations: PathBuf,
    output_file: Option<PathBuf>,
    max_gap_bases: u32,
}

impl Config {
    pub fn new(pslx: PathBuf, annotations: PathBuf, output_file: Option<PathBuf>) -> Self {
        Self {
            pslx,
            annotations,
            output_file,
            max_gap_bases: 100,
        }
    }

    pub fn set_max_gap_bases(&mut self, x: u32) {
        self.max_gap_bases = x
    }

    pub fn pslx(&self) -> &Path {
        &self.pslx
    }

    pub fn annotations(&self) -> &Path {
        &self.annotations
    }

    pub fn output_file(&self) -> Option<&Path> {
        self.output_file.as_deref()
    }

    pub fn max_gap_bases(&self) -> u32 {
        self.max_gap_bases
    }
}
