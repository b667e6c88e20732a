//! Next-song prediction.
//!
//! Two signals pick what plays after the current song: the songs most
//! similar to the one played last, and the history-driven recommendation.
//! How they are combined is a [`BlendMode`].
//!
//! Whatever happens, a non-empty catalog always yields a song. Missing
//! history or a last-played song that has since left the catalog falls back
//! to a uniformly random pick.

use crate::algorithm::{self, ScoringContext, DEFAULT_TOP_N};
use crate::song::{find_song, HistoryEntry, Song};
use log::{debug, warn};
use rand::seq::SliceRandom;
use rand::Rng;
use std::fmt;
use std::str::FromStr;

/// How the similar songs and the history-driven pick are combined.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum BlendMode {
    /// Put every similar song and the recommendation (if any) in one pool and
    /// choose uniformly from it. With five similar songs the recommendation
    /// wins one time in six.
    #[default]
    Pooled,
    /// Choose the similar side with probability `similar_share`, otherwise
    /// the recommendation. A side with nothing to offer defers to the other.
    Weighted { similar_share: f64 },
}

impl BlendMode {
    /// A true 60/40 split between similar songs and the recommendation.
    pub const SIXTY_FORTY: BlendMode = BlendMode::Weighted { similar_share: 0.6 };

    /// Weighted blend with `similar_share` in `[0, 1]`. NaN is rejected.
    pub fn weighted(similar_share: f64) -> anyhow::Result<Self> {
        if !(0.0..=1.0).contains(&similar_share) {
            anyhow::bail!("Blend share must be between 0 and 1, got {similar_share}");
        }
        Ok(BlendMode::Weighted { similar_share })
    }
}

impl fmt::Display for BlendMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlendMode::Pooled => f.write_str("pooled"),
            BlendMode::Weighted { similar_share } => write!(f, "weighted({similar_share})"),
        }
    }
}

impl FromStr for BlendMode {
    type Err = anyhow::Error;

    /// `pooled`, `weighted` (60/40) or `weighted:<share>`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pooled" => Ok(BlendMode::Pooled),
            "weighted" => Ok(BlendMode::SIXTY_FORTY),
            other => {
                let share = other
                    .strip_prefix("weighted:")
                    .ok_or_else(|| anyhow::anyhow!("Unknown blend mode: {s}. Use 'pooled' or 'weighted[:share]'"))?;
                let similar_share: f64 = share
                    .parse()
                    .map_err(|_| anyhow::anyhow!("Blend share must be a number, got `{share}'"))?;
                BlendMode::weighted(similar_share)
            }
        }
    }
}

/// Predict the next song with the pooled blend.
///
/// `None` only when the catalog is empty.
pub fn predict_next<R: Rng + ?Sized>(catalog: &[Song], history: &[HistoryEntry], rng: &mut R) -> Option<Song> {
    predict_next_with(catalog, history, BlendMode::Pooled, rng)
}

pub fn predict_next_with<R: Rng + ?Sized>(
    catalog: &[Song],
    history: &[HistoryEntry],
    mode: BlendMode,
    rng: &mut R,
) -> Option<Song> {
    let Some(last) = history.last() else {
        debug!("No history yet, picking a random song");
        return random_pick(catalog, rng);
    };

    let Some(last_song) = find_song(catalog, last.song_id) else {
        debug!("Last played song {} is no longer in the catalog, picking a random song", last.song_id);
        return random_pick(catalog, rng);
    };

    let similar = algorithm::similar_songs(last_song, catalog, DEFAULT_TOP_N);
    let recommended = algorithm::recommend_ai_with(catalog, history, &ScoringContext::default(), rng);
    debug!(
        "Blending {} similar songs with {} recommendation ({mode})",
        similar.len(),
        if recommended.is_some() { "a" } else { "no" }
    );

    let pick = match mode {
        BlendMode::Pooled => pooled(similar, recommended, rng),
        BlendMode::Weighted { similar_share } if similar_share.is_nan() => {
            warn!("Blend share is NaN, pooling instead");
            pooled(similar, recommended, rng)
        }
        BlendMode::Weighted { similar_share } => weighted(similar, recommended, similar_share, rng),
    };

    pick.or_else(|| {
        debug!("Nothing to blend, picking a random song");
        random_pick(catalog, rng)
    })
}

fn pooled<R: Rng + ?Sized>(mut similar: Vec<Song>, recommended: Option<Song>, rng: &mut R) -> Option<Song> {
    similar.extend(recommended);
    similar.choose(rng).cloned()
}

fn weighted<R: Rng + ?Sized>(
    similar: Vec<Song>,
    recommended: Option<Song>,
    similar_share: f64,
    rng: &mut R,
) -> Option<Song> {
    match recommended {
        Some(song) if similar.is_empty() => Some(song),
        Some(song) => {
            if rng.gen_bool(similar_share.clamp(0.0, 1.0)) {
                similar.choose(rng).cloned()
            } else {
                Some(song)
            }
        }
        None => similar.choose(rng).cloned(),
    }
}

fn random_pick<R: Rng + ?Sized>(catalog: &[Song], rng: &mut R) -> Option<Song> {
    catalog.choose(rng).cloned()
}
