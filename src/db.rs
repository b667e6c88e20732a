//! JSON file storage.
//!
//! Every collection lives in its own file under the data directory and is
//! read and written whole:
//!
//! - `songs.json`: the catalog, an array of songs
//! - `users.json`: accounts keyed by user name
//! - `history.json`: plays keyed by user name, oldest first
//! - `playlists.json`: playlists keyed by user name, then playlist name
//!
//! Records are validated by serde on the way in; nothing past this module has
//! to deal with loosely-typed data. One process, one writer: there is no
//! locking.

use crate::playlist::Playlists;
use crate::song::{HistoryEntry, Song};
use crate::users::UserRecord;
use anyhow::{bail, Context, Result};
use chrono::Utc;
use log::{debug, info, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

pub const SONG_FILE: &str = "songs.json";
pub const USER_FILE: &str = "users.json";
pub const HISTORY_FILE: &str = "history.json";
pub const PLAYLIST_FILE: &str = "playlists.json";

/// Plays of every user.
pub type HistoryBook = BTreeMap<String, Vec<HistoryEntry>>;
/// Accounts by user name.
pub type UserBook = BTreeMap<String, UserRecord>;
/// Playlists of every user.
pub type PlaylistBook = BTreeMap<String, Playlists>;

/// Handle on the data directory.
#[derive(Debug, Clone)]
pub struct Store {
    root: PathBuf,
}

impl Store {
    /// Open the store at `data_dir`, creating the directory and any missing
    /// data file with an empty collection.
    pub fn open(data_dir: &Path) -> Result<Self> {
        fs::create_dir_all(data_dir)
            .with_context(|| format!("Failed to create data directory at {}", data_dir.display()))?;

        let store = Self {
            root: data_dir.to_path_buf(),
        };
        store.ensure_file(SONG_FILE, &Vec::<Song>::new())?;
        store.ensure_file(USER_FILE, &UserBook::new())?;
        store.ensure_file(HISTORY_FILE, &HistoryBook::new())?;
        store.ensure_file(PLAYLIST_FILE, &PlaylistBook::new())?;
        Ok(store)
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path(&self, file: &str) -> PathBuf {
        self.root.join(file)
    }

    fn ensure_file<T: Serialize>(&self, file: &str, empty: &T) -> Result<()> {
        let path = self.path(file);
        if !path.exists() {
            debug!("Creating {}", path.display());
            save_json(&path, empty)?;
        }
        Ok(())
    }

    // SONGS

    /// The whole catalog, in file order.
    pub fn load_songs(&self) -> Result<Vec<Song>> {
        let songs: Vec<Song> = load_json(&self.path(SONG_FILE))?;

        let mut ids = HashSet::new();
        for song in &songs {
            if !ids.insert(song.id) {
                warn!("Duplicate song id {} in {SONG_FILE}", song.id);
            }
        }
        Ok(songs)
    }

    pub fn save_songs(&self, songs: &[Song]) -> Result<()> {
        save_json(&self.path(SONG_FILE), &songs)
    }

    /// Append `song` to the catalog. Ids must stay unique.
    pub fn add_song(&self, song: Song) -> Result<()> {
        let mut songs = self.load_songs()?;
        if songs.iter().any(|existing| existing.id == song.id) {
            bail!("A song with id {} already exists", song.id);
        }
        info!("Adding song {} to the catalog", song.id);
        songs.push(song);
        self.save_songs(&songs)
    }

    /// Remove a song from the catalog. History keeps its copy of the song.
    pub fn remove_song(&self, id: u32) -> Result<Song> {
        let mut songs = self.load_songs()?;
        let Some(position) = songs.iter().position(|song| song.id == id) else {
            bail!("Song {id} not found");
        };
        let removed = songs.remove(position);
        info!("Removed song {id} from the catalog");
        self.save_songs(&songs)?;
        Ok(removed)
    }

    // USERS

    pub fn load_users(&self) -> Result<UserBook> {
        load_json(&self.path(USER_FILE))
    }

    pub fn save_users(&self, users: &UserBook) -> Result<()> {
        save_json(&self.path(USER_FILE), users)
    }

    // HISTORY

    pub fn load_history(&self) -> Result<HistoryBook> {
        load_json(&self.path(HISTORY_FILE))
    }

    pub fn save_history(&self, history: &HistoryBook) -> Result<()> {
        save_json(&self.path(HISTORY_FILE), history)
    }

    /// Plays of `user`, oldest first. Empty for a user who never played
    /// anything.
    pub fn user_history(&self, user: &str) -> Result<Vec<HistoryEntry>> {
        Ok(self.load_history()?.remove(user).unwrap_or_default())
    }

    /// Record that `user` played `song` just now.
    pub fn log_play(&self, user: &str, song: &Song) -> Result<HistoryEntry> {
        let entry = HistoryEntry::from_song(song, user, Utc::now());
        let mut history = self.load_history()?;
        history.entry(user.to_string()).or_default().push(entry.clone());
        self.save_history(&history)?;
        info!("Logged play of song {} for {user}", song.id);
        Ok(entry)
    }

    /// Forget every play of `user`. Returns how many were dropped.
    pub fn clear_history(&self, user: &str) -> Result<usize> {
        let mut history = self.load_history()?;
        let cleared = history.insert(user.to_string(), Vec::new()).map_or(0, |old| old.len());
        self.save_history(&history)?;
        info!("Cleared {cleared} plays from the history of {user}");
        Ok(cleared)
    }

    // PLAYLISTS

    pub fn load_playlists(&self) -> Result<PlaylistBook> {
        load_json(&self.path(PLAYLIST_FILE))
    }

    pub fn save_playlists(&self, playlists: &PlaylistBook) -> Result<()> {
        save_json(&self.path(PLAYLIST_FILE), playlists)
    }

    pub fn user_playlists(&self, user: &str) -> Result<Playlists> {
        Ok(self.load_playlists()?.remove(user).unwrap_or_default())
    }

    pub fn save_user_playlists(&self, user: &str, playlists: Playlists) -> Result<()> {
        let mut book = self.load_playlists()?;
        book.insert(user.to_string(), playlists);
        self.save_playlists(&book)
    }
}

fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Malformed data in {}", path.display()))
}

fn save_json<T: Serialize + ?Sized>(path: &Path, data: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(data)
        .with_context(|| format!("Failed to serialize data for {}", path.display()))?;
    fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn open_temp_store() -> (TempDir, Store) {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = Store::open(&temp_dir.path().join("data")).expect("Failed to open store");
        (temp_dir, store)
    }

    #[test]
    fn test_open_creates_empty_collections() {
        let (_temp_dir, store) = open_temp_store();

        for file in [SONG_FILE, USER_FILE, HISTORY_FILE, PLAYLIST_FILE] {
            assert!(store.root().join(file).exists(), "{file} should exist");
        }
        assert!(store.load_songs().unwrap().is_empty());
        assert!(store.load_users().unwrap().is_empty());
        assert!(store.load_history().unwrap().is_empty());
        assert!(store.load_playlists().unwrap().is_empty());
    }

    #[test]
    fn test_open_keeps_existing_data() {
        let (_temp_dir, store) = open_temp_store();
        store.add_song(Song::new(1, "Gasolina", "Daddy Yankee", "International", 192)).unwrap();

        let reopened = Store::open(store.root()).unwrap();
        assert_eq!(reopened.load_songs().unwrap().len(), 1);
    }

    #[test]
    fn test_add_and_remove_song() {
        let (_temp_dir, store) = open_temp_store();
        store.add_song(Song::new(1, "One", "A", "Pop", 100)).unwrap();
        store.add_song(Song::new(2, "Two", "B", "Indie", 200)).unwrap();

        assert!(store.add_song(Song::new(1, "Again", "C", "Pop", 100)).is_err());

        let removed = store.remove_song(1).unwrap();
        assert_eq!(removed.title, "One");
        assert!(store.remove_song(1).is_err());
        assert_eq!(store.load_songs().unwrap(), vec![Song::new(2, "Two", "B", "Indie", 200)]);
    }

    #[test]
    fn test_log_play_appends_per_user() {
        let (_temp_dir, store) = open_temp_store();
        let one = Song::new(1, "One", "A", "Pop", 100);
        let two = Song::new(2, "Two", "B", "Indie", 200);

        store.log_play("alice", &one).unwrap();
        store.log_play("alice", &two).unwrap();
        store.log_play("bob", &two).unwrap();

        let alice = store.user_history("alice").unwrap();
        assert_eq!(alice.iter().map(|e| e.song_id).collect::<Vec<_>>(), vec![1, 2]);
        assert!(alice[0].timestamp <= alice[1].timestamp);
        assert_eq!(store.user_history("bob").unwrap().len(), 1);
        assert!(store.user_history("carol").unwrap().is_empty());
    }

    #[test]
    fn test_history_survives_song_removal() {
        let (_temp_dir, store) = open_temp_store();
        let song = Song::new(1, "One", "A", "Pop", 100);
        store.add_song(song.clone()).unwrap();
        store.log_play("alice", &song).unwrap();
        store.remove_song(1).unwrap();

        let history = store.user_history("alice").unwrap();
        assert_eq!(history[0].title, "One");
    }

    #[test]
    fn test_clear_history_only_touches_one_user() {
        let (_temp_dir, store) = open_temp_store();
        let song = Song::new(1, "One", "A", "Pop", 100);
        store.log_play("alice", &song).unwrap();
        store.log_play("alice", &song).unwrap();
        store.log_play("bob", &song).unwrap();

        assert_eq!(store.clear_history("alice").unwrap(), 2);
        assert!(store.user_history("alice").unwrap().is_empty());
        assert_eq!(store.user_history("bob").unwrap().len(), 1);
        assert_eq!(store.clear_history("nobody").unwrap(), 0);
    }

    #[test]
    fn test_malformed_file_reports_path() {
        let (_temp_dir, store) = open_temp_store();
        fs::write(store.root().join(SONG_FILE), r#"[{"MusicID": "one"}]"#).unwrap();

        let error = store.load_songs().unwrap_err();
        assert!(format!("{error:#}").contains(SONG_FILE));
    }

    #[test]
    fn test_reads_legacy_song_file() {
        let (_temp_dir, store) = open_temp_store();
        fs::write(
            store.root().join(SONG_FILE),
            r#"[
                {"MusicID": 1, "Title": "Murder In My Mind", "Artist": "Kordhell", "Genre": "Phonk", "Duration": 145},
                {"MusicID": 2, "Title": "Take On Me", "Artist": "a-ha", "Genre": "Retro", "Duration": 225}
            ]"#,
        )
        .unwrap();

        let songs = store.load_songs().unwrap();
        assert_eq!(songs.len(), 2);
        assert_eq!(songs[1].artist, "a-ha");
    }

    #[test]
    fn test_reads_legacy_user_and_history_files() {
        let (_temp_dir, store) = open_temp_store();
        fs::write(
            store.root().join(USER_FILE),
            r#"{"admin": {"password": "240be518fabd2724ddb6f04eeb1da5967448d7e831c08c8fa822809f74c720a9",
                          "is_admin": true, "created": 1731000000.25, "preferences": {}}}"#,
        )
        .unwrap();
        fs::write(
            store.root().join(HISTORY_FILE),
            r#"{"admin": [{"id": 1, "title": "Take On Me", "artist": "a-ha", "genre": "Retro",
                           "duration": 225, "timestamp": 1731000123, "user": "admin"}]}"#,
        )
        .unwrap();

        let users = store.load_users().unwrap();
        assert!(users["admin"].is_admin);
        assert_eq!(users["admin"].created.timestamp(), 1_731_000_000);

        let history = store.user_history("admin").unwrap();
        assert_eq!(history[0].timestamp.timestamp(), 1_731_000_123);

        // New plays land next to the legacy ones and the file stays readable.
        store.log_play("admin", &Song::new(2, "Two", "B", "Indie", 200)).unwrap();
        assert_eq!(store.user_history("admin").unwrap().len(), 2);
        assert_eq!(store.load_users().unwrap().len(), 1);
    }
}
