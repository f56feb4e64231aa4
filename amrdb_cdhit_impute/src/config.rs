use std::path::{Path, PathBuf};

use utils::annot::N_CORE_FIELDS;

/// Config
///
/// clusters - cd-hit cluster file (.clstr)
/// annotations - database annotation table
/// output_file - imputed annotation table
/// n_fields - number of leading annotation fields to impute
/// verbose - separate clusters in the output and report voting conflicts on stdout
///
pub struct Config {
    clusters: PathBuf,
    annotations: PathBuf,
    output_file: PathBuf,
    n_fields: usize,
    verbose: bool,
}

impl Config {
    pub fn new(clusters: PathBuf, annotations: PathBuf, output_file: PathBuf) -> Self {
        Self {
            clusters,
            annotations,
            output_file,
            n_fields: N_CORE_FIELDS,
            verbose: false,
        }
    }

    pub fn set_n_fields(&mut self, n: usize) {
        self.n_fields = n
    }

    pub fn set_verbose(&mut self) {
        self.verbose = true
    }

    pub fn clusters(&self) -> &Path {
        &self.clusters
    }

    pub fn annotations(&self) -> &Path {
        &self.annotations
    }

    pub fn output_file(&self) -> &Path {
        &self.output_file
    }

    pub fn n_fields(&self) -> usize {
        self.n_fields
    }

    pub fn verbose(&self) -> bool {
        self.verbose
    }
}
