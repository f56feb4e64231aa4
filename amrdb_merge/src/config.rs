use std::path::{Path, PathBuf};

pub const DEFAULT_N_FIELDS: usize = 6;

pub struct Config {
    candidates: PathBuf,
    sequences: PathBuf,
    existing: PathBuf,
    seq_output: PathBuf,
    annot_output: PathBuf,
    n_fields: usize,
}

impl Config {
    pub fn new(
        candidates: PathBuf,
        sequences: PathBuf,
        existing: PathBuf,
        seq_output: PathBuf,
        annot_output: PathBuf,
    ) -> Self {
        Self {
            candidates,
            sequences,
            existing,
            seq_output,
            annot_output,
            n_fields: DEFAULT_N_FIELDS,
        }
    }

    pub fn set_n_fields(&mut self, n: usize) {
        self.n_fields = n
    }

    pub fn candidates(&self) -> &Path {
        &self.candidates
    }

    pub fn sequences(&self) -> &Path {
        &self.sequences
    }

    pub fn existing(&self) -> &Path {
        &self.existing
    }

    pub fn seq_output(&self) -> &Path {
        &self.seq_output
    }

    pub fn annot_output(&self) -> &Path {
        &self.annot_output
    }

    pub fn n_fields(&self) -> usize {
        self.n_fields
    }
}
