//! Song scoring algorithms for music recommendations.
//!
//! Two scorers live here:
//!
//! - [`similarity`] compares two songs by genre, artist and length.
//! - [`ai_score`] rates a song against a listener's history: how often they
//!   play its genre and artist, how close it is to their usual song length,
//!   and whether they just heard it.
//!
//! Both are pure. Where a choice between equally good songs has to be made,
//! the caller supplies the random source.

use crate::song::{HistoryEntry, Song};
use log::{debug, trace};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashMap;

/// Number of songs [`similar_songs`] returns unless told otherwise.
pub const DEFAULT_TOP_N: usize = 5;

/// Weights for the history-driven scorer.
#[derive(Debug, Clone)]
pub struct ScoringContext {
    /// Points per play of the song's genre.
    pub genre_weight: f64,
    /// Points per play of the song's artist.
    pub artist_weight: f64,
    /// Bonus for matching the average play length exactly.
    pub duration_bonus: f64,
    /// Seconds of difference that cost one bonus point.
    pub duration_scale: f64,
    /// Subtracted from the song that was played last.
    pub repeat_penalty: f64,
    /// Fewer plays than this and there is no recommendation.
    pub min_history: usize,
}

impl Default for ScoringContext {
    fn default() -> Self {
        Self {
            genre_weight: 5.0,
            artist_weight: 3.0,
            duration_bonus: 2.0,
            duration_scale: 50.0,
            repeat_penalty: 5.0,
            min_history: 5,
        }
    }
}

/// What a listener's history says about their taste.
#[derive(Debug, Clone, PartialEq)]
pub struct ListeningProfile {
    pub genre_freq: HashMap<String, u32>,
    pub artist_freq: HashMap<String, u32>,
    /// Mean length of everything played, in seconds.
    pub avg_duration: f64,
}

impl ListeningProfile {
    /// Count genres and artists over the whole history. `None` when there is
    /// no history to average.
    #[must_use]
    pub fn from_history(history: &[HistoryEntry]) -> Option<Self> {
        if history.is_empty() {
            return None;
        }

        let mut genre_freq = HashMap::new();
        let mut artist_freq = HashMap::new();
        let mut total_duration = 0.0;
        for entry in history {
            *genre_freq.entry(entry.genre.clone()).or_insert(0) += 1;
            *artist_freq.entry(entry.artist.clone()).or_insert(0) += 1;
            total_duration += f64::from(entry.duration);
        }

        #[allow(clippy::cast_precision_loss)]
        let avg_duration = total_duration / history.len() as f64;

        Some(Self {
            genre_freq,
            artist_freq,
            avg_duration,
        })
    }
}

/// How alike two songs are, in `[0, 1]`.
///
/// ```text
/// 0.5 same genre + 0.3 same artist + max(0, 0.2 - |Δduration| / 300)
/// ```
///
/// The length term is gone once the songs differ by a minute. Symmetric.
///
/// ```
/// use musit::algorithm::similarity;
/// use musit::song::Song;
///
/// let a = Song::new(1, "One", "A", "Phonk", 180);
/// let b = Song::new(2, "Two", "A", "Phonk", 180);
/// assert_eq!(similarity(&a, &b), 1.0);
/// ```
#[must_use]
pub fn similarity(a: &Song, b: &Song) -> f64 {
    let mut score = 0.0;

    if a.genre == b.genre {
        score += 0.5;
    }
    if a.artist == b.artist {
        score += 0.3;
    }

    let diff = f64::from(a.duration.abs_diff(b.duration));
    score + (0.2 - diff / 300.0).max(0.0)
}

/// The `top_n` songs most similar to `target`, best first.
///
/// `target` itself is skipped by id. Equal scores keep catalog order. There
/// is no minimum score, so a small catalog returns everything it has.
#[must_use]
pub fn similar_songs(target: &Song, catalog: &[Song], top_n: usize) -> Vec<Song> {
    let mut scored: Vec<(f64, &Song)> = catalog
        .iter()
        .filter(|song| song.id != target.id)
        .map(|song| (similarity(target, song), song))
        .collect();

    // `sort_by` is stable.
    scored.sort_by(|(a, _), (b, _)| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));

    scored
        .into_iter()
        .take(top_n)
        .map(|(_, song)| song.clone())
        .collect()
}

/// History-driven score of `song` with the default weights.
///
/// ```text
/// 5 * plays of its genre
///   + 3 * plays of its artist
///   + max(0, 2 - |duration - average| / 50)
///   - 5 if it is the song played last
/// ```
#[must_use]
pub fn ai_score(song: &Song, history: &[HistoryEntry], profile: &ListeningProfile) -> f64 {
    ai_score_with(song, history, profile, &ScoringContext::default())
}

#[must_use]
pub fn ai_score_with(
    song: &Song,
    history: &[HistoryEntry],
    profile: &ListeningProfile,
    context: &ScoringContext,
) -> f64 {
    let genre_plays = profile.genre_freq.get(&song.genre).copied().unwrap_or(0);
    let artist_plays = profile.artist_freq.get(&song.artist).copied().unwrap_or(0);
    let duration_gap = (f64::from(song.duration) - profile.avg_duration).abs();

    let mut score = context.genre_weight * f64::from(genre_plays)
        + context.artist_weight * f64::from(artist_plays)
        + (context.duration_bonus - duration_gap / context.duration_scale).max(0.0);

    // Don't suggest what just finished playing.
    if history.last().is_some_and(|last| last.song_id == song.id) {
        score -= context.repeat_penalty;
    }

    trace!("Calculated `{score}' score for `{}'.", song.title);
    score
}

/// Best-scoring song for this listener, or `None` with fewer than five plays.
///
/// Every song tied at the top score is a candidate and one is picked at
/// random, so ties don't always resolve to the same song.
pub fn recommend_ai<R: Rng + ?Sized>(catalog: &[Song], history: &[HistoryEntry], rng: &mut R) -> Option<Song> {
    recommend_ai_with(catalog, history, &ScoringContext::default(), rng)
}

#[allow(clippy::float_cmp)]
pub fn recommend_ai_with<R: Rng + ?Sized>(
    catalog: &[Song],
    history: &[HistoryEntry],
    context: &ScoringContext,
    rng: &mut R,
) -> Option<Song> {
    if history.len() < context.min_history {
        debug!(
            "Not enough history for a recommendation ({} of {} plays)",
            history.len(),
            context.min_history
        );
        return None;
    }
    let profile = ListeningProfile::from_history(history)?;

    let scored: Vec<(f64, &Song)> = catalog
        .iter()
        .map(|song| (ai_score_with(song, history, &profile, context), song))
        .collect();

    let best = scored
        .iter()
        .map(|(score, _)| *score)
        .fold(f64::NEG_INFINITY, f64::max);
    let candidates: Vec<&Song> = scored
        .iter()
        .filter(|(score, _)| *score == best)
        .map(|(_, song)| *song)
        .collect();

    debug!("{} candidates tied at score {best:.3}", candidates.len());
    candidates.choose(rng).map(|song| (*song).clone())
}
