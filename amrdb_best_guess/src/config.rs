use std::path::{Path, PathBuf};

/// Config
///
/// class_table - tab separated (class, title) pairs
/// annotated - per query annotations from DIAMOND hits (query, title, ...)
/// output_file - candidate annotations (CSV)
/// leftover_file - queries whose title has no usable class
///
pub struct Config {
    class_table: PathBuf,
    annotated: PathBuf,
    output_file: PathBuf,
    leftover_file: PathBuf,
}

impl Config {
    pub fn new(
        class_table: PathBuf,
        annotated: PathBuf,
        output_file: PathBuf,
        leftover_file: PathBuf,
    ) -> Self {
        Self {
            class_table,
            annotated,
            output_file,
            leftover_file,
        }
    }

    pub fn class_table(&self) -> &Path {
        &self.class_table
    }

    pub fn annotated(&self) -> &Path {
        &self.annotated
    }

    pub fn output_file(&self) -> &Path {
        &self.output_file
    }

    pub fn leftover_file(&self) -> &Path {
        &self.leftover_file
    }
}
