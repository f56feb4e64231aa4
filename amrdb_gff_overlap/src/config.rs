use std::path::{Path, PathBuf};

use utils::gff::GffFilter;

/// Config
///
/// pslx - BLAT alignments of database genes against a reference genome
/// annotations - database annotation table
/// gff - GFF3 annotation of the reference genome
/// filter - source and feature type of GFF rows to use
/// output_file - report file (stdout if not set)
///
pub struct Config {
    pslx: PathBuf,
    annotations: PathBuf,
    gff: PathBuf,
    filter: GffFilter,
    output_file: Option<PathBuf>,
}

impl Config {
    pub fn new(
        pslx: PathBuf,
        annotations: PathBuf,
        gff: PathBuf,
        filter: GffFilter,
        output_file: Option<PathBuf>,
    ) -> Self {
        Self {
            pslx,
            annotations,
            gff,
            filter,
            output_file,
        }
    }

    pub fn pslx(&self) -> &Path {
        &self.pslx
    }

    pub fn annotations(&self) -> &Path {
        &self.annotations
    }

    pub fn gff(&self) -> &Path {
        &self.gff
    }

    pub fn filter(&self) -> &GffFilter {
        &self.filter
    }

    pub fn output_file(&self) -> Option<&Path> {
        self.output_file.as_deref()
    }
}
