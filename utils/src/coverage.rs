use crate::pslx::PslRecord;

pub const DEFAULT_MIN_COVERAGE: f64 = 0.5;

/// Fraction of a sequence of length `len` spanned by [start, end).  Zero for an empty sequence
pub fn fraction(start: usize, end: usize, len: usize) -> f64 {
    if len == 0 {
        0.0
    } else {
        (end.saturating_sub(start) as f64) / (len as f64)
    }
}

/// CoverageGate
///
/// An alignment is accepted as annotation evidence if either the query or the target
/// coverage reaches the minimum fraction
#[derive(Debug, Clone, Copy)]
pub struct CoverageGate {
    min_fraction: f64,
}

impl Default for CoverageGate {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_COVERAGE)
    }
}

impl CoverageGate {
    pub fn new(min_fraction: f64) -> Self {
        Self { min_fraction }
    }

    pub fn min_fraction(&self) -> f64 {
        self.min_fraction
    }

    pub fn admits_fractions(&self, qcov: f64, tcov: f64) -> bool {
        qcov >= self.min_fraction || tcov >= self.min_fraction
    }

    pub fn admits(&self, rec: &PslRecord) -> bool {
        self.admits_fractions(rec.query_coverage(), rec.target_coverage())
    }
}
