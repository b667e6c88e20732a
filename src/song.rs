//! Song and listening-history records.
//!
//! These are the only shapes the recommendation engine sees. Field names on
//! disk follow the data files written by earlier releases (`MusicID`,
//! `Title`, …), serde takes care of the mapping.

use chrono::{DateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};
use std::fmt;

/// How a song is stored in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Song {
    /// Stable identity. Unique across the catalog, title and artist are not.
    #[serde(rename = "MusicID")]
    pub id: u32,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Artist")]
    pub artist: String,
    /// One of a small, open set (`Pop`, `Indie`, `Phonk`, …).
    #[serde(rename = "Genre")]
    pub genre: String,
    /// Length in seconds.
    #[serde(rename = "Duration")]
    pub duration: u32,
}

impl Song {
    #[must_use]
    pub fn new(id: u32, title: &str, artist: &str, genre: &str, duration: u32) -> Self {
        Self {
            id,
            title: title.to_string(),
            artist: artist.to_string(),
            genre: genre.to_string(),
            duration,
        }
    }
}

/// `Title - Artist [Genre] 3:05`
impl fmt::Display for Song {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {} [{}] {}",
            self.title,
            self.artist,
            self.genre,
            format_time(u64::from(self.duration))
        )
    }
}

/// One play of one song by one user.
///
/// Title, artist, genre and duration are copied from the catalog when the
/// play is logged and are never re-joined against it. A history entry keeps
/// describing what was played even after the song is edited or removed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(rename = "id")]
    pub song_id: u32,
    pub title: String,
    pub artist: String,
    pub genre: String,
    pub duration: u32,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub timestamp: DateTime<Utc>,
    pub user: String,
}

impl HistoryEntry {
    /// Snapshot `song` as played by `user` at `timestamp`.
    #[must_use]
    pub fn from_song(song: &Song, user: &str, timestamp: DateTime<Utc>) -> Self {
        Self {
            song_id: song.id,
            title: song.title.clone(),
            artist: song.artist.clone(),
            genre: song.genre.clone(),
            duration: song.duration,
            timestamp,
            user: user.to_string(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredTimestamp {
    EpochSeconds(f64),
    Rfc3339(String),
}

/// Read a timestamp written either as RFC 3339 text or, as older data files
/// do, as fractional seconds since the Unix epoch.
pub fn deserialize_timestamp<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
    match StoredTimestamp::deserialize(deserializer)? {
        StoredTimestamp::EpochSeconds(seconds) => {
            if !seconds.is_finite() {
                return Err(de::Error::custom(format!("timestamp {seconds} is out of range")));
            }
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let (whole, nanos) = (seconds.floor() as i64, ((seconds - seconds.floor()) * 1e9).round() as u32);
            DateTime::from_timestamp(whole, nanos.min(999_999_999))
                .ok_or_else(|| de::Error::custom(format!("timestamp {seconds} is out of range")))
        }
        StoredTimestamp::Rfc3339(text) => DateTime::parse_from_rfc3339(&text)
            .map(|time| time.with_timezone(&Utc))
            .map_err(de::Error::custom),
    }
}

/// Catalog orderings offered by `musit list`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum SortKey {
    Title,
    Artist,
    Duration,
}

/// Stable sort, so songs with equal keys keep catalog order.
pub fn sort_songs(songs: &mut [Song], key: SortKey) {
    match key {
        SortKey::Title => songs.sort_by(|a, b| a.title.cmp(&b.title)),
        SortKey::Artist => songs.sort_by(|a, b| a.artist.cmp(&b.artist)),
        SortKey::Duration => songs.sort_by_key(|song| song.duration),
    }
}

#[must_use]
pub fn find_song(catalog: &[Song], id: u32) -> Option<&Song> {
    catalog.iter().find(|song| song.id == id)
}

/// Case-insensitive, whole-title lookup. First match wins.
#[must_use]
pub fn find_song_by_title<'a>(catalog: &'a [Song], title: &str) -> Option<&'a Song> {
    let title = title.to_lowercase();
    catalog.iter().find(|song| song.title.to_lowercase() == title)
}

/// 180 -> `3:00`
#[must_use]
pub fn format_time(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}
