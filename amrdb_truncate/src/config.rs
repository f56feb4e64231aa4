use std::path::{Path, PathBuf};

use utils::coverage::CoverageGate;

/// Config
///
/// pslx - BLAT alignments between database sequences
/// annotations - database annotation table
/// sequences - database sequences (FASTA)
/// singletons - list of singleton sequence headers
/// annot_output - output annotation table
/// seq_output - output sequences (FASTA)
/// gate - minimum query or target coverage for an alignment to be used
///
pub struct Config {
    pslx: PathBuf,
    annotations: PathBuf,
    sequences: PathBuf,
    singletons: PathBuf,
    annot_output: PathBuf,
    seq_output: PathBuf,
    gate: CoverageGate,
}

impl Config {
    pub fn new(
        pslx: PathBuf,
        annotations: PathBuf,
        sequences: PathBuf,
        singletons: PathBuf,
        annot_output: PathBuf,
        seq_output: PathBuf,
    ) -> Self {
        Self {
            pslx,
            annotations,
            sequences,
            singletons,
            annot_output,
            seq_output,
            gate: CoverageGate::default(),
        }
    }

    pub fn set_min_coverage(&mut self, x: f64) {
        self.gate = CoverageGate::new(x)
    }

    pub fn pslx(&self) -> &Path {
        &self.pslx
    }

    pub fn annotations(&self) -> &Path {
        &self.annotations
    }

    pub fn sequences(&self) -> &Path {
        &self.sequences
    }

    pub fn singletons(&self) -> &Path {
        &self.singletons
    }

    pub fn annot_output(&self) -> &Path {
        &self.annot_output
    }

    pub fn seq_output(&self) -> &Path {
        &self.seq_output
    }

    pub fn gate(&self) -> CoverageGate {
        self.gate
    }
}
