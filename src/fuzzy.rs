//! Fuzzy search over titles and artists.
//!
//! Similarity is the Ratcliff/Obershelp "gestalt" ratio: find the longest
//! common block, recurse on what is left on either side, and report
//! `2 * matched / (len(a) + len(b))`. Cheap enough for a personal catalog,
//! forgiving of typos and word order slips.

use crate::song::Song;
use log::{debug, trace};
use std::collections::{HashMap, HashSet};

/// Minimum ratio a title or artist needs to count as a match.
pub const DEFAULT_CUTOFF: f64 = 0.55;

/// Tuning for [`fuzzy_search_with`].
#[derive(Debug, Clone, Copy)]
pub struct FuzzyOptions {
    pub cutoff: f64,
    /// Upper bound on matches kept per pool (titles, artists).
    pub max_matches: usize,
}

impl Default for FuzzyOptions {
    fn default() -> Self {
        Self {
            cutoff: DEFAULT_CUTOFF,
            max_matches: 3,
        }
    }
}

/// Fuzzy match `query` against titles and artists in `catalog`.
///
/// Title matches come first, then artist matches, each most-similar-first.
/// A song matched on both appears once, at its title position. No match is
/// an empty result, not an error.
///
/// When several songs share a title (or artist), the last one in catalog
/// order represents that name.
#[must_use]
pub fn fuzzy_search(query: &str, catalog: &[Song], cutoff: f64) -> Vec<Song> {
    let options = FuzzyOptions {
        cutoff,
        ..FuzzyOptions::default()
    };
    fuzzy_search_with(query, catalog, &options)
}

#[must_use]
pub fn fuzzy_search_with(query: &str, catalog: &[Song], options: &FuzzyOptions) -> Vec<Song> {
    let titles = name_pool(catalog, |song| song.title.as_str());
    let artists = name_pool(catalog, |song| song.artist.as_str());

    let mut seen = HashSet::new();
    let results: Vec<Song> = close_matches(query, &titles, options)
        .into_iter()
        .chain(close_matches(query, &artists, options))
        .filter(|song| seen.insert(song.id))
        .cloned()
        .collect();

    debug!("Fuzzy search for `{query}' matched {} songs", results.len());
    results
}

/// Distinct names mapped to one representative song. Later songs overwrite
/// earlier ones.
fn name_pool<'a>(catalog: &'a [Song], name: impl Fn(&'a Song) -> &'a str) -> HashMap<&'a str, &'a Song> {
    catalog.iter().map(|song| (name(song), song)).collect()
}

/// Names scoring at least `cutoff`, best first. Equal scores order by name,
/// descending.
fn close_matches<'a>(
    query: &str,
    pool: &HashMap<&'a str, &'a Song>,
    options: &FuzzyOptions,
) -> Vec<&'a Song> {
    let mut scored: Vec<(f64, &str, &Song)> = pool
        .iter()
        .map(|(name, song)| (ratio(name, query), *name, *song))
        .filter(|(score, _, _)| *score >= options.cutoff)
        .collect();

    scored.sort_by(|a, b| {
        b.0.partial_cmp(&a.0)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| b.1.cmp(a.1))
    });
    scored.truncate(options.max_matches);

    for (score, name, _) in &scored {
        trace!("`{name}' scored {score:.3} against `{query}'");
    }

    scored.into_iter().map(|(_, _, song)| song).collect()
}

/// Similarity of `a` and `b` in `[0, 1]`.
///
/// Two empty strings are identical (1.0). Not strictly symmetric: the
/// longest-block search prefers blocks early in `a`.
#[must_use]
pub fn ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }

    #[allow(clippy::cast_precision_loss)]
    let score = 2.0 * matching_characters(&a, &b) as f64 / total as f64;
    score
}

/// Sum of the sizes of all matching blocks.
fn matching_characters(a: &[char], b: &[char]) -> usize {
    let mut positions: HashMap<char, Vec<usize>> = HashMap::new();
    for (j, c) in b.iter().enumerate() {
        positions.entry(*c).or_default().push(j);
    }

    let mut matched = 0;
    let mut pending = vec![(0, a.len(), 0, b.len())];
    while let Some((alo, ahi, blo, bhi)) = pending.pop() {
        let (i, j, size) = longest_match(a, &positions, alo, ahi, blo, bhi);
        if size == 0 {
            continue;
        }
        matched += size;
        if alo < i && blo < j {
            pending.push((alo, i, blo, j));
        }
        if i + size < ahi && j + size < bhi {
            pending.push((i + size, ahi, j + size, bhi));
        }
    }
    matched
}

/// Longest block `a[i..i+size] == b[j..j+size]` inside the given bounds.
/// Ties go to the smallest `i`, then the smallest `j`.
fn longest_match(
    a: &[char],
    positions: &HashMap<char, Vec<usize>>,
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let (mut best_i, mut best_j, mut best_size) = (alo, blo, 0);
    // Length of the match ending at a[i-1], b[j], keyed by j.
    let mut run_lengths: HashMap<usize, usize> = HashMap::new();

    for (i, c) in a.iter().enumerate().take(ahi).skip(alo) {
        let mut next_runs = HashMap::new();
        if let Some(js) = positions.get(c) {
            for &j in js {
                if j < blo {
                    continue;
                }
                if j >= bhi {
                    break;
                }
                let previous = if j == 0 { 0 } else { run_lengths.get(&(j - 1)).copied().unwrap_or(0) };
                let size = previous + 1;
                next_runs.insert(j, size);
                if size > best_size {
                    best_i = i + 1 - size;
                    best_j = j + 1 - size;
                    best_size = size;
                }
            }
        }
        run_lengths = next_runs;
    }

    (best_i, best_j, best_size)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Vec<Song> {
        vec![
            Song::new(1, "Blinding Lights", "The Weeknd", "Pop", 200),
            Song::new(2, "Save Your Tears", "The Weeknd", "Pop", 215),
            Song::new(3, "Murder In My Mind", "Kordhell", "Phonk", 145),
            Song::new(4, "Close Eyes", "DVRST", "Phonk", 133),
            Song::new(5, "Weekend", "Mac Miller", "Retro", 180),
        ]
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!((actual - expected).abs() < 1e-9, "expected {expected}, got {actual}");
    }

    #[test]
    fn test_ratio_known_values() {
        assert_close(ratio("abcd", "bcde"), 0.75);
        assert_close(ratio("apple", "appel"), 0.8);
        assert_close(ratio("ape", "appel"), 0.75);
        assert_close(ratio("peach", "appel"), 0.4);
        assert_close(ratio("same", "same"), 1.0);
        assert_close(ratio("", ""), 1.0);
        assert_close(ratio("abc", ""), 0.0);
        assert_close(ratio("abc", "xyz"), 0.0);
    }

    #[test]
    fn test_ratio_counts_blocks_on_both_sides() {
        // "qabxcd" vs "abycdf": blocks "ab" and "cd".
        assert_close(ratio("qabxcd", "abycdf"), 8.0 / 12.0);
    }

    #[test]
    fn test_close_matches_ordering_and_limit() {
        let songs: Vec<Song> = ["ape", "apple", "peach", "puppy"]
            .iter()
            .zip(1..)
            .map(|(title, id)| Song::new(id, title, "Nobody", "Pop", 100))
            .collect();
        let options = FuzzyOptions { cutoff: 0.6, max_matches: 3 };
        let found: Vec<String> = fuzzy_search_with("appel", &songs, &options)
            .into_iter()
            .map(|s| s.title)
            .collect();
        assert_eq!(found, vec!["apple", "ape"]);
    }

    #[test]
    fn test_typo_in_title() {
        let results = fuzzy_search("Blindng Lights", &catalog(), DEFAULT_CUTOFF);
        assert_eq!(results.first().map(|s| s.id), Some(1));
    }

    #[test]
    fn test_artist_match_returns_representative_song() {
        let results = fuzzy_search("The Weekend", &catalog(), DEFAULT_CUTOFF);
        let ids: Vec<u32> = results.iter().map(|s| s.id).collect();
        // Title "Weekend" scores 0.778, artist "The Weeknd" scores 0.952; the
        // last Weeknd song represents the artist.
        assert_eq!(ids, vec![5, 2]);
    }

    #[test]
    fn test_deduplicates_title_and_artist_hits() {
        let songs = vec![Song::new(1, "Lune", "Lune", "Indie", 200)];
        let results = fuzzy_search("Lune", &songs, DEFAULT_CUTOFF);
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn test_no_match_is_empty() {
        assert!(fuzzy_search("zzzzzzzz", &catalog(), DEFAULT_CUTOFF).is_empty());
        assert!(fuzzy_search("anything", &[], DEFAULT_CUTOFF).is_empty());
    }

    #[test]
    fn test_every_result_clears_cutoff() {
        let songs = catalog();
        for cutoff in [0.0, 0.3, 0.55, 0.8, 1.0] {
            let options = FuzzyOptions { cutoff, max_matches: usize::MAX };
            let results = fuzzy_search_with("Close", &songs, &options);
            let mut ids = HashSet::new();
            for song in &results {
                assert!(ids.insert(song.id), "Results must be unique by id");
                let best = ratio(&song.title, "Close").max(ratio(&song.artist, "Close"));
                assert!(best >= cutoff, "{} scored {best} below {cutoff}", song.title);
            }
        }
    }
}
