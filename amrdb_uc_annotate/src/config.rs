use std::path::{Path, PathBuf};

pub struct Config {
    uc_file: PathBuf,
    annotations: PathBuf,
    output_file: Option<PathBuf>,
}

impl Config {
    pub fn new(uc_file: PathBuf, annotations: PathBuf, output_file: Option<PathBuf>) -> Self {
        Self {
            uc_file,
            annotations,
            output_file,
        }
    }

    pub fn uc_file(&self) -> &Path {
        &self.uc_file
    }

    pub fn annotations(&self) -> &Path {
        &self.annotations
    }

    pub fn output_file(&self) -> Option<&Path> {
        self.output_file.as_deref()
    }
}
