//! Species-name resolution against the reference dex.
//!
//! [`NameMatcher`] is the narrow capability the pipeline depends on.
//! [`CloseMatcher`] implements it with a precomputed lowercase index and the
//! Ratcliff/Obershelp ratio from [`similarity`].

pub mod similarity;

use std::collections::BTreeMap;
use tracing::warn;

use crate::parser::NameTable;

/// Resolves a free-text label to a canonical key, or `None` when nothing is
/// close enough.
pub trait NameMatcher {
    fn best_match(&self, label: &str) -> Option<&str>;
}

/// Minimum similarity a candidate needs to be accepted.
pub const DEFAULT_CUTOFF: f64 = 0.6;

/// Fuzzy matcher over a fixed candidate set.
///
/// The best-scoring candidate at or above the cutoff wins; equal scores go to
/// the lexicographically largest normalized key.
#[derive(Debug, Clone)]
pub struct CloseMatcher {
    /// `(normalized, original)`, sorted by normalized key.
    index: Vec<(String, String)>,
    cutoff: f64,
}

impl CloseMatcher {
    pub fn new<I, S>(candidates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::with_cutoff(candidates, DEFAULT_CUTOFF)
    }

    pub fn with_cutoff<I, S>(candidates: I, cutoff: f64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut index: Vec<(String, String)> = candidates
            .into_iter()
            .map(|c| (normalize(c.as_ref()), c.as_ref().to_string()))
            .collect();
        index.sort();
        index.dedup_by(|a, b| a.0 == b.0);
        Self { index, cutoff }
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

impl NameMatcher for CloseMatcher {
    fn best_match(&self, label: &str) -> Option<&str> {
        let target = normalize(label);
        let target_len = target.chars().count();
        let mut best: Option<(f64, &str)> = None;

        for (key, original) in &self.index {
            let bound = similarity::length_bound(target_len, key.chars().count());
            if bound < self.cutoff || best.is_some_and(|(top, _)| bound < top) {
                continue;
            }
            // Candidate first; the ratio is not symmetric.
            let score = similarity::ratio(key, &target);
            if score < self.cutoff {
                continue;
            }
            // The index is sorted, so `>=` leaves the largest key on equal scores.
            if best.is_none_or(|(top, _)| score >= top) {
                best = Some((score, original.as_str()));
            }
        }

        best.map(|(_, original)| original)
    }
}

fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}

/// Lowercase ASCII alphanumerics only, the form format codes are written in.
fn compact(s: &str) -> String {
    s.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Maps each format code to the closest human-readable format name.
///
/// Codes with no acceptable match are left out.
pub fn resolve_display_names<S: AsRef<str>>(codes: &[S], names: &[S]) -> NameTable {
    let by_compact: BTreeMap<String, &str> = names
        .iter()
        .map(|n| (compact(n.as_ref()), n.as_ref()))
        .collect();
    let matcher = CloseMatcher::new(by_compact.keys());

    let mut table = NameTable::new();
    for code in codes {
        let code = code.as_ref();
        let Some(name) = matcher.best_match(code).and_then(|k| by_compact.get(k)) else {
            warn!(format = code, "Unable to find format name");
            continue;
        };
        if compact(name) != code {
            warn!(format = code, name = *name, "Possible incorrect format name");
        }
        table.insert(code.to_string(), name.to_string());
    }
    table
}
