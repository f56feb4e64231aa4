use std::path::{Path, PathBuf};

pub const DEFAULT_MIN_IDENTITY: f64 = 70.0;

/// Config
///
/// diamond - DIAMOND blastx tabular output
/// blastdbcmd - blastdbcmd output for the subjects hit
/// unannotated - output file for queries where no annotation could be found
/// output_file - imputed annotations (stdout if not set)
/// min_identity - hits with lower percent identity are rejected
///
pub struct Config {
    diamond: PathBuf,
    blastdbcmd: PathBuf,
    unannotated: PathBuf,
    output_file: Option<PathBuf>,
    min_identity: f64,
}

impl Config {
    pub fn new(
        diamond: PathBuf,
        blastdbcmd: PathBuf,
        unannotated: PathBuf,
        output_file: Option<PathBuf>,
    ) -> Self {
        Self {
            diamond,
            blastdbcmd,
            unannotated,
            output_file,
            min_identity: DEFAULT_MIN_IDENTITY,
        }
    }

    pub fn set_min_identity(&mut self, x: f64) {
        self.min_identity = x
    }

    pub fn diamond(&self) -> &Path {
        &self.diamond
    }

    pub fn blastdbcmd(&self) -> &Path {
        &self.blastdbcmd
    }

    pub fn unannotated(&self) -> &Path {
        &self.unannotated
    }

    pub fn output_file(&self) -> Option<&Path> {
        self.output_file.as_deref()
    }

    pub fn min_identity(&self) -> f64 {
        self.min_identity
    }
}
