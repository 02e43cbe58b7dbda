pub(crate) mod fuzzy;
pub mod geo;
pub mod time;

pub use geo::*;
pub use time::*;

use rayon::prelude::*;
use std::cmp::Ordering;

const MIN_SEARCH_SCORE: f64 = 0.4;

pub trait Identifiable {
    fn name(&self) -> &str;
    fn normalized_name(&self) -> &str;
}

/// Lowercases and collapses whitespace so lookups ignore case and spacing.
pub fn normalize(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Fuzzy search over a haystack of named entities, best match first.
pub fn search<'a, T>(needle: &str, haystack: &'a [T]) -> Vec<&'a T>
where
    T: Send + Sync + Identifiable,
{
    let normalized_needle = normalize(needle);
    let mut results: Vec<(&T, f64)> = haystack
        .par_iter()
        .filter_map(|hay| {
            let score = fuzzy::score(&normalized_needle, hay.normalized_name());
            if score >= MIN_SEARCH_SCORE {
                Some((hay, score))
            } else {
                None
            }
        })
        .collect();

    results.par_sort_by(|(_, a): &(_, f64), (_, b): &(_, f64)| {
        b.partial_cmp(a).unwrap_or(Ordering::Equal)
    });
    results.into_iter().map(|(entity, _)| entity).collect()
}

#[test]
fn normalize_collapses_case_and_spacing() {
    assert_eq!(normalize("  Heidelberg   Hbf "), "heidelberg hbf");
    assert_eq!(normalize("BISMARCKPLATZ"), "bismarckplatz");
}
