use std::cmp;

/// Levenshtein edit distance over chars, two rows at a time.
pub(crate) fn distance(a: &str, b: &str) -> usize {
    if a == b {
        return 0;
    }
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0usize; b.len() + 1];
    for (i, ac) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, bc) in b.iter().enumerate() {
            let sub_cost = usize::from(ac != bc);
            current[j + 1] = cmp::min(
                cmp::min(previous[j + 1] + 1, current[j] + 1),
                previous[j] + sub_cost,
            );
        }
        std::mem::swap(&mut previous, &mut current);
    }
    previous[b.len()]
}

/// Similarity in `0.0..=1.0` between a lowercase needle and a normalized name.
///
/// A name that starts with the needle scores at least 0.9 so that
/// "bismarck" ranks "Bismarckplatz" above unrelated short names.
pub(crate) fn score(needle: &str, hay: &str) -> f64 {
    if needle.is_empty() || hay.is_empty() {
        return 0.0;
    }
    if needle == hay {
        return 1.0;
    }
    let longest = cmp::max(needle.chars().count(), hay.chars().count()) as f64;
    let similarity = 1.0 - distance(needle, hay) as f64 / longest;
    if hay.starts_with(needle) {
        similarity.max(0.9)
    } else if hay.contains(needle) {
        similarity.max(0.6)
    } else {
        similarity
    }
}

#[test]
fn fuzzy_empty_vs_empty() {
    assert_eq!(distance("", ""), 0);
}

#[test]
fn fuzzy_empty_vs_nonempty() {
    assert_eq!(distance("", "abc"), 3);
    assert_eq!(distance("abc", ""), 3);
}

#[test]
fn fuzzy_substitution() {
    assert_eq!(distance("cat", "cut"), 1);
}

#[test]
fn fuzzy_insertion_and_deletion() {
    assert_eq!(distance("cat", "cart"), 1);
    assert_eq!(distance("cart", "cat"), 1);
}

#[test]
fn fuzzy_umlauts_count_as_one_char() {
    assert_eq!(distance("römerkreis", "romerkreis"), 1);
    assert_eq!(distance("straße", "strasse"), 2);
}

#[test]
fn fuzzy_longer_sequence() {
    assert_eq!(distance("intention", "execution"), 5);
}

#[test]
fn score_prefers_prefix_matches() {
    let prefix = score("bismarck", "bismarckplatz");
    let typo = score("bismarck", "bergheim");
    assert!(prefix >= 0.9);
    assert!(typo < prefix);
}

#[test]
fn score_exact_and_empty() {
    assert_eq!(score("neuenheim", "neuenheim"), 1.0);
    assert_eq!(score("", "neuenheim"), 0.0);
}
