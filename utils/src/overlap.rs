use crate::coverage::fraction;

/// Genome feature with 0 based, half open coordinates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feature {
    pub id: String,
    pub start: usize,
    pub end: usize,
}

impl Feature {
    pub fn new<S: Into<String>>(id: S, start: usize, end: usize) -> Self {
        Self {
            id: id.into(),
            start,
            end,
        }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Intersection of an alignment span with a feature, clipped to the feature boundaries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Overlap<'a> {
    pub feature: &'a Feature,
    pub start: usize,
    pub end: usize,
}

impl<'a> Overlap<'a> {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Fraction of the feature covered by the overlap
    pub fn feature_coverage(&self) -> f64 {
        fraction(self.start, self.end, self.feature.len())
    }
}

/// Number of aligned bases from `blocks` lying within [start, end)
pub fn aligned_bases<I: IntoIterator<Item = (usize, usize)>>(
    blocks: I,
    start: usize,
    end: usize,
) -> usize {
    blocks
        .into_iter()
        .map(|(a, b)| b.min(end).saturating_sub(a.max(start)))
        .sum()
}

/// FeatureIndex
///
/// Features from one reference sequence, sorted on start coordinate.
/// max_end[i] holds the largest end coordinate of features[0..=i] so that
/// earlier features extending past a query position can be found by binary search.
#[derive(Debug, Clone)]
pub struct FeatureIndex {
    name: String,
    features: Vec<Feature>,
    max_end: Vec<usize>,
}

impl FeatureIndex {
    pub fn new<S: Into<String>>(name: S, mut features: Vec<Feature>) -> Self {
        let name = name.into();
        if features.windows(2).any(|w| w[1].start < w[0].start) {
            warn!(
                "Features for {} are not sorted by start coordinate; sorting",
                name
            );
            features.sort_by_key(|f| f.start);
        }
        let mut m = 0;
        let max_end = features
            .iter()
            .map(|f| {
                m = m.max(f.end);
                m
            })
            .collect();
        Self {
            name,
            features,
            max_end,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    // Index of the feature starting at `start` or its closest predecessor, moved
    // left past any earlier feature that still extends beyond `start`
    fn lower_bound(&self, start: usize) -> usize {
        let pred = self
            .features
            .partition_point(|f| f.start <= start)
            .saturating_sub(1);
        let first_reaching = self.max_end.partition_point(|e| *e <= start);
        pred.min(first_reaching)
    }

    // Index of the last feature starting before `end`
    fn upper_bound(&self, end: usize) -> usize {
        self.features
            .partition_point(|f| f.start < end)
            .saturating_sub(1)
    }

    /// Return all features intersecting [start, end) with the clipped overlap coordinates
    pub fn overlaps(&self, start: usize, end: usize) -> Vec<Overlap<'_>> {
        if self.is_empty() || start >= end {
            return Vec::new();
        }
        let lo = self.lower_bound(start);
        let hi = self.upper_bound(end);
        if lo > hi {
            return Vec::new();
        }
        self.features[lo..=hi]
            .iter()
            .filter_map(|f| {
                let ov = Overlap {
                    feature: f,
                    start: start.max(f.start),
                    end: end.min(f.end),
                };
                if ov.start < ov.end {
                    Some(ov)
                } else {
                    None
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(v: &[Overlap]) -> Vec<(String, usize, usize, usize)> {
        v.iter()
            .map(|o| (o.feature.id.clone(), o.start, o.end, o.len()))
            .collect()
    }

    fn brute_force(features: &[Feature], start: usize, end: usize) -> Vec<(String, usize, usize, usize)> {
        features
            .iter()
            .filter_map(|f| {
                let (a, b) = (start.max(f.start), end.min(f.end));
                if a < b {
                    Some((f.id.clone(), a, b, b - a))
                } else {
                    None
                }
            })
            .collect()
    }

    #[test]
    fn test_two_gene_example() {
        let idx = FeatureIndex::new(
            "chr",
            vec![Feature::new("geneA", 100, 200), Feature::new("geneB", 250, 500)],
        );
        let ov = idx.overlaps(150, 400);
        assert_eq!(
            summary(&ov),
            vec![
                ("geneA".to_owned(), 150, 200, 50),
                ("geneB".to_owned(), 250, 400, 150)
            ]
        );
        assert!((ov[0].feature_coverage() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_outside_range_is_empty() {
        let idx = FeatureIndex::new(
            "chr",
            vec![Feature::new("geneA", 100, 200), Feature::new("geneB", 250, 500)],
        );
        assert!(idx.overlaps(0, 100).is_empty());
        assert!(idx.overlaps(500, 800).is_empty());
        assert!(idx.overlaps(200, 250).is_empty());
        assert!(idx.overlaps(300, 300).is_empty());
    }

    #[test]
    fn test_empty_index() {
        let idx = FeatureIndex::new("chr", Vec::new());
        assert!(idx.overlaps(0, 100).is_empty());
    }

    #[test]
    fn test_overlapping_and_nested_features() {
        let idx = FeatureIndex::new(
            "chr",
            vec![
                Feature::new("outer", 0, 1000),
                Feature::new("a", 100, 205),
                Feature::new("b", 200, 300),
                Feature::new("c", 600, 700),
            ],
        );
        let ov = idx.overlaps(202, 250);
        let ids: Vec<_> = ov.iter().map(|o| o.feature.id.as_str()).collect();
        assert_eq!(ids, vec!["outer", "a", "b"]);
        let ov = idx.overlaps(400, 450);
        assert_eq!(summary(&ov), vec![("outer".to_owned(), 400, 450, 50)]);
    }

    #[test]
    fn test_unsorted_input_is_sorted() {
        let idx = FeatureIndex::new(
            "chr",
            vec![Feature::new("b", 250, 500), Feature::new("a", 100, 200)],
        );
        assert_eq!(idx.features()[0].id, "a");
        assert_eq!(idx.overlaps(150, 400).len(), 2);
    }

    #[test]
    fn test_matches_brute_force() {
        let features = vec![
            Feature::new("f1", 10, 30),
            Feature::new("f2", 20, 25),
            Feature::new("f3", 28, 60),
            Feature::new("f4", 40, 45),
            Feature::new("f5", 70, 90),
            Feature::new("f6", 70, 75),
        ];
        let idx = FeatureIndex::new("chr", features.clone());
        for start in 0..100 {
            for end in start..101 {
                let ov = idx.overlaps(start, end);
                assert!(ov.iter().all(|o| o.start < o.end));
                assert_eq!(
                    summary(&ov),
                    brute_force(&features, start, end),
                    "span {}-{}",
                    start,
                    end
                );
            }
        }
    }

    // Minimal LCG for deterministic layouts
    struct Lcg(u64);

    impl Lcg {
        fn next(&mut self, n: usize) -> usize {
            self.0 = self
                .0
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            ((self.0 >> 33) as usize) % n
        }
    }

    #[test]
    fn test_random_layouts_match_brute_force() {
        let mut rng = Lcg(42);
        for _ in 0..200 {
            let n = 1 + rng.next(12);
            let mut features: Vec<_> = (0..n)
                .map(|i| {
                    let s = rng.next(200);
                    Feature::new(format!("f{}", i), s, s + 1 + rng.next(60))
                })
                .collect();
            features.sort_by_key(|f| f.start);
            let idx = FeatureIndex::new("chr", features.clone());
            for _ in 0..50 {
                let start = rng.next(280);
                let end = start + rng.next(80);
                assert_eq!(
                    summary(&idx.overlaps(start, end)),
                    brute_force(&features, start, end),
                    "span {}-{}",
                    start,
                    end
                );
            }
        }
    }

    #[test]
    fn test_repeated_lookup_is_stable() {
        let idx = FeatureIndex::new(
            "chr",
            vec![Feature::new("geneA", 100, 200), Feature::new("geneB", 250, 500)],
        );
        assert_eq!(summary(&idx.overlaps(150, 400)), summary(&idx.overlaps(150, 400)));
    }

    #[test]
    fn test_aligned_bases() {
        let blocks = vec![(100, 150), (180, 260)];
        assert_eq!(aligned_bases(blocks.iter().copied(), 120, 200), 50);
        assert_eq!(aligned_bases(blocks.iter().copied(), 300, 400), 0);
    }
}
