use std::path::{Path, PathBuf};

use utils::merge::Preference;

pub struct Config {
    input_file: PathBuf,
    output_file: PathBuf,
    report_only: bool,
    prefer: Preference,
}

impl Config {
    pub fn new(input_file: PathBuf, output_file: PathBuf, prefer: Preference) -> Self {
        Self {
            input_file,
            output_file,
            report_only: false,
            prefer,
        }
    }

    pub fn set_report_only(&mut self) {
        self.report_only = true
    }

    pub fn input_file(&self) -> &Path {
        &self.input_file
    }

    pub fn output_file(&self) -> &Path {
        &self.output_file
    }

    pub fn report_only(&self) -> bool {
        self.report_only
    }

    pub fn prefer(&self) -> Preference {
        self.prefer
    }
}
