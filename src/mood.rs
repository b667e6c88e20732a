//! Mood-based recommendations.
//!
//! A mood is a coarse emotional category mapped to a fixed genre allow-list.
//! Nothing is learned here; the table is the whole model.

use crate::song::Song;
use log::debug;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mood {
    Sad,
    Chill,
    Hype,
    Energetic,
    Love,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown mood `{0}' (expected one of: Sad, Chill, Hype, Energetic, Love)")]
pub struct UnknownMood(pub String);

impl Mood {
    pub const ALL: [Mood; 5] = [Mood::Sad, Mood::Chill, Mood::Hype, Mood::Energetic, Mood::Love];

    /// Genres that fit this mood, in table order.
    #[must_use]
    pub const fn genres(self) -> &'static [&'static str] {
        match self {
            Mood::Sad => &["Indie", "Retro"],
            Mood::Chill => &["Indie", "Pop", "International"],
            Mood::Hype => &["Phonk", "Pop"],
            Mood::Energetic => &["Phonk", "International"],
            Mood::Love => &["Pop", "Indie"],
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Mood::Sad => "Sad",
            Mood::Chill => "Chill",
            Mood::Hype => "Hype",
            Mood::Energetic => "Energetic",
            Mood::Love => "Love",
        }
    }

    #[must_use]
    pub fn allows(self, genre: &str) -> bool {
        self.genres().contains(&genre)
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Accepts any casing and surrounding whitespace: `" ENERGETIC "` is
/// `Mood::Energetic`. Synonyms are not resolved here, see [`normalize_mood`].
impl FromStr for Mood {
    type Err = UnknownMood;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let canonical = capitalize(s);
        Mood::ALL
            .into_iter()
            .find(|mood| mood.name() == canonical)
            .ok_or(UnknownMood(canonical))
    }
}

/// First letter upper case, the rest lower case, surrounding whitespace
/// dropped.
#[must_use]
pub fn capitalize(s: &str) -> String {
    let mut chars = s.trim().chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

lazy_static::lazy_static! {
    /// Everyday words people type for each mood.
    static ref MOOD_SYNONYMS: HashMap<&'static str, Mood> = HashMap::from([
        ("sad", Mood::Sad),
        ("depressed", Mood::Sad),
        ("down", Mood::Sad),
        ("chill", Mood::Chill),
        ("relaxed", Mood::Chill),
        ("calm", Mood::Chill),
        ("hype", Mood::Hype),
        ("party", Mood::Hype),
        ("energetic", Mood::Energetic),
        ("workout", Mood::Energetic),
        ("love", Mood::Love),
        ("romantic", Mood::Love),
    ]);
}

/// Resolve user input to a canonical mood name.
///
/// Known synonyms map to their mood (`"party"` -> `"Hype"`). Anything else
/// comes back capitalized, so unknown words still flow into
/// [`recommend_by_mood`] and produce an empty result there.
#[must_use]
pub fn normalize_mood(input: &str) -> String {
    let key = input.trim().to_lowercase();
    MOOD_SYNONYMS
        .get(key.as_str())
        .map_or_else(|| capitalize(&key), |mood| mood.name().to_string())
}

/// Songs whose genre fits `mood`, in catalog order.
///
/// `mood` is case-normalized first. An unknown mood yields nothing.
#[must_use]
pub fn recommend_by_mood(mood: &str, catalog: &[Song]) -> Vec<Song> {
    let Ok(mood) = mood.parse::<Mood>() else {
        debug!("No genre table for mood `{}'", mood.trim());
        return Vec::new();
    };

    let songs: Vec<Song> = catalog
        .iter()
        .filter(|song| mood.allows(&song.genre))
        .cloned()
        .collect();
    debug!("Mood {mood} matched {} of {} songs", songs.len(), catalog.len());
    songs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Vec<Song> {
        vec![
            Song::new(1, "Murder In My Mind", "Kordhell", "Phonk", 145),
            Song::new(2, "Gasolina", "Daddy Yankee", "International", 192),
            Song::new(3, "Blinding Lights", "The Weeknd", "Pop", 200),
            Song::new(4, "Take On Me", "a-ha", "Retro", 225),
            Song::new(5, "Electric Feel", "MGMT", "Indie", 229),
            Song::new(6, "Clair de Lune", "Debussy", "Classical", 300),
        ]
    }

    fn ids(songs: &[Song]) -> Vec<u32> {
        songs.iter().map(|s| s.id).collect()
    }

    #[test]
    fn test_mixed_case_and_whitespace_normalize() {
        assert_eq!("ENERGETIC ".parse::<Mood>(), Ok(Mood::Energetic));
        assert_eq!("  chill".parse::<Mood>(), Ok(Mood::Chill));
        assert_eq!(capitalize("hYPE"), "Hype");
        assert_eq!(capitalize("   "), "");
    }

    #[test]
    fn test_energetic_filters_to_its_genres() {
        let songs = recommend_by_mood("ENERGETIC ", &catalog());
        assert_eq!(ids(&songs), vec![1, 2]);
        assert!(songs.iter().all(|s| s.genre == "Phonk" || s.genre == "International"));
    }

    #[test]
    fn test_results_keep_catalog_order() {
        assert_eq!(ids(&recommend_by_mood("chill", &catalog())), vec![2, 3, 5]);
        assert_eq!(ids(&recommend_by_mood("sad", &catalog())), vec![4, 5]);
        assert_eq!(ids(&recommend_by_mood("Love", &catalog())), vec![3, 5]);
    }

    #[test]
    fn test_every_result_is_in_genre_set() {
        let songs = catalog();
        for mood in Mood::ALL {
            for song in recommend_by_mood(mood.name(), &songs) {
                assert!(mood.genres().contains(&song.genre.as_str()));
            }
        }
    }

    #[test]
    fn test_unknown_mood_is_empty() {
        assert!(recommend_by_mood("angry", &catalog()).is_empty());
        assert!(recommend_by_mood("", &catalog()).is_empty());
        assert_eq!("angry".parse::<Mood>(), Err(UnknownMood("Angry".to_string())));
    }

    #[test]
    fn test_normalize_mood_synonyms() {
        assert_eq!(normalize_mood("Party"), "Hype");
        assert_eq!(normalize_mood(" workout "), "Energetic");
        assert_eq!(normalize_mood("romantic"), "Love");
        assert_eq!(normalize_mood("calm"), "Chill");
        assert_eq!(normalize_mood("gloomy"), "Gloomy");
    }
}
