use std::{collections::BTreeMap, collections::BTreeSet, fmt, str::FromStr};

use crate::annot::count_empty;

/// A field where cluster members carry more than one distinct non-empty value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    pub field: usize,
    pub values: Vec<String>,
}

/// Majority-vote imputation within a cluster.
///
/// For each of the first `n_fields` fields independently, if exactly one distinct non-empty
/// value is present across the members it is copied to the members missing it.  Where
/// several distinct values are present the field is left alone and a Conflict is returned.
/// Clusters with fewer than two members are not changed.
pub fn impute_majority(members: &mut [Vec<String>], n_fields: usize) -> Vec<Conflict> {
    let mut conflicts = Vec::new();
    if members.len() < 2 {
        return conflicts;
    }
    for i in 0..n_fields {
        let vals: BTreeSet<&str> = members
            .iter()
            .filter_map(|m| m.get(i).map(|s| s.as_str()))
            .filter(|s| !s.is_empty())
            .collect();
        match vals.len() {
            0 => (),
            1 => {
                let v = vals.iter().next().map(|s| s.to_string()).unwrap_or_default();
                for m in members.iter_mut() {
                    if m.len() <= i {
                        m.resize(i + 1, String::new())
                    }
                    if m[i].is_empty() {
                        m[i] = v.clone()
                    }
                }
            }
            _ => conflicts.push(Conflict {
                field: i,
                values: vals.iter().map(|s| s.to_string()).collect(),
            }),
        }
    }
    conflicts
}

/// How to break a tie between equally complete candidate annotations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preference {
    First,
    Last,
    None,
}

impl FromStr for Preference {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "first" => Ok(Preference::First),
            "last" => Ok(Preference::Last),
            "none" => Ok(Preference::None),
            _ => Err("no match"),
        }
    }
}

impl fmt::Display for Preference {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            Preference::First => "first",
            Preference::Last => "last",
            Preference::None => "none",
        };
        write!(f, "{}", s)
    }
}

/// Outcome of choosing between candidate annotations
///
/// chosen - index of the winning candidate, None if the tie was left unresolved
/// tied - indices of all candidates with the fewest empty fields (length > 1 for a tie)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub chosen: Option<usize>,
    pub tied: Vec<usize>,
}

impl Choice {
    pub fn is_tie(&self) -> bool {
        self.tied.len() > 1
    }
}

/// Choose the candidate with the fewest empty fields, using `pref` to break ties.
/// Candidate order is the preference order.
pub fn choose_annotation<S: AsRef<str>>(candidates: &[Vec<S>], pref: Preference) -> Choice {
    let empties: Vec<usize> = candidates.iter().map(|c| count_empty(c)).collect();
    let tied: Vec<usize> = match empties.iter().min() {
        Some(l) => empties
            .iter()
            .enumerate()
            .filter(|(_, e)| *e == l)
            .map(|(i, _)| i)
            .collect(),
        None => Vec::new(),
    };
    let chosen = if tied.len() == 1 {
        tied.first().copied()
    } else {
        match pref {
            Preference::First => tied.first().copied(),
            Preference::Last => tied.last().copied(),
            Preference::None => None,
        }
    };
    Choice { chosen, tied }
}

/// Tally
///
/// Occurrence counts for a set of values.  The most frequent value is the one with
/// the highest count; ties go to the greatest value in the ordering of T.
#[derive(Debug, Clone)]
pub struct Tally<T: Ord> {
    counts: BTreeMap<T, usize>,
}

impl<T: Ord> Default for Tally<T> {
    fn default() -> Self {
        Self {
            counts: BTreeMap::new(),
        }
    }
}

impl<T: Ord> Tally<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, x: T) {
        *self.counts.entry(x).or_insert(0) += 1
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn count(&self, x: &T) -> usize {
        self.counts.get(x).copied().unwrap_or(0)
    }

    /// Values in ascending order
    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.counts.keys()
    }

    pub fn most_frequent(&self) -> Option<&T> {
        self.most_frequent_by(|_| true)
    }

    /// Most frequent value among those accepted by `f`
    pub fn most_frequent_by<F: Fn(&T) -> bool>(&self, f: F) -> Option<&T> {
        // BTreeMap iterates in ascending order so max_by_key returns the greatest value on ties
        self.counts
            .iter()
            .filter(|(k, _)| f(k))
            .max_by_key(|(_, c)| **c)
            .map(|(k, _)| k)
    }
}

impl<T: Ord> FromIterator<T> for Tally<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut t = Self::new();
        for x in iter {
            t.add(x)
        }
        t
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn to_vecs(v: &[&[&str]]) -> Vec<Vec<String>> {
        v.iter()
            .map(|m| m.iter().map(|s| s.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_unanimous_value_propagates() {
        let mut m = to_vecs(&[&["A", "m", ""], &["", "", ""], &["", "m", "g"]]);
        let c = impute_majority(&mut m, 3);
        assert!(c.is_empty());
        assert_eq!(m, to_vecs(&[&["A", "m", "g"], &["A", "m", "g"], &["A", "m", "g"]]));
    }

    #[test]
    fn test_conflict_not_overwritten() {
        let mut m = to_vecs(&[&["A", "x"], &["B", ""], &["", ""]]);
        let c = impute_majority(&mut m, 2);
        assert_eq!(
            c,
            vec![Conflict {
                field: 0,
                values: vec!["A".to_owned(), "B".to_owned()]
            }]
        );
        assert_eq!(m[2][0], "");
        assert_eq!(m[2][1], "x");
    }

    #[test]
    fn test_fields_beyond_limit_untouched() {
        let mut m = to_vecs(&[&["A", "B", "C", "D"], &["", "", "", ""]]);
        impute_majority(&mut m, 3);
        assert_eq!(m[1], vec!["A", "B", "C", ""]);
    }

    #[test]
    fn test_short_member_is_padded() {
        let mut m = to_vecs(&[&["A", "B"], &[]]);
        impute_majority(&mut m, 3);
        assert_eq!(m[1], vec!["A", "B"]);
    }

    #[test]
    fn test_singleton_unchanged() {
        let mut m = to_vecs(&[&["A", ""]]);
        impute_majority(&mut m, 2);
        assert_eq!(m, to_vecs(&[&["A", ""]]));
    }

    #[test]
    fn test_imputation_is_idempotent() {
        let mut m = to_vecs(&[&["A", "", "g"], &["", "x", ""], &["", "y", ""]]);
        impute_majority(&mut m, 3);
        let once = m.clone();
        impute_majority(&mut m, 3);
        assert_eq!(m, once);
    }

    #[test]
    fn test_choose_fewest_empty() {
        let c = to_vecs(&[&["a", "", ""], &["a", "b", ""], &["", "", ""]]);
        let ch = choose_annotation(&c, Preference::None);
        assert_eq!(ch.chosen, Some(1));
        assert!(!ch.is_tie());
    }

    #[test]
    fn test_choose_tie_break() {
        let c = to_vecs(&[&["a", ""], &["", "b"], &["", ""]]);
        assert_eq!(choose_annotation(&c, Preference::First).chosen, Some(0));
        assert_eq!(choose_annotation(&c, Preference::Last).chosen, Some(1));
        let ch = choose_annotation(&c, Preference::None);
        assert_eq!(ch.chosen, None);
        assert_eq!(ch.tied, vec![0, 1]);
        assert!(ch.is_tie());
    }

    #[test]
    fn test_choose_empty_candidates() {
        let c: Vec<Vec<String>> = Vec::new();
        assert_eq!(choose_annotation(&c, Preference::Last).chosen, None);
    }

    #[test]
    fn test_preference_from_str() {
        assert_eq!("LAST".parse::<Preference>().unwrap(), Preference::Last);
        assert!("middle".parse::<Preference>().is_err());
    }

    #[test]
    fn test_tally() {
        let t: Tally<&str> = ["b", "a", "b", "c", "c"].into_iter().collect();
        // b and c both occur twice; c is greater
        assert_eq!(t.most_frequent(), Some(&"c"));
        assert_eq!(t.count(&"b"), 2);
        assert_eq!(t.most_frequent_by(|x| *x != "c"), Some(&"b"));
        assert_eq!(t.values().copied().collect::<Vec<_>>(), vec!["a", "b", "c"]);
        assert!(Tally::<String>::new().most_frequent().is_none());
    }
}
