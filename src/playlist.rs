//! Per-user playlists and the system `Favorites` playlist.
//!
//! The operations here work on one user's [`Playlists`] in memory. Loading
//! and saving them is up to the caller (see [`crate::db::Store`]).

use crate::song::{find_song, Song};
use std::collections::BTreeMap;
use thiserror::Error;

/// Playlist name mapped to song ids, in the order they were added.
pub type Playlists = BTreeMap<String, Vec<u32>>;

/// Name of the playlist [`add_favorite`] and [`remove_favorite`] manage.
pub const FAVORITES: &str = "Favorites";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlaylistError {
    #[error("Playlist '{0}' not found.")]
    NotFound(String),
    #[error("Playlist '{0}' already exists.")]
    AlreadyExists(String),
    #[error("Song {song} is already in '{playlist}'.")]
    SongAlreadyPresent { playlist: String, song: u32 },
    #[error("Song {song} is not in '{playlist}'.")]
    SongNotPresent { playlist: String, song: u32 },
    #[error("Cannot delete system playlist 'Favorites'.")]
    Protected,
    #[error("Song {0} is already in favorites.")]
    AlreadyFavorite(u32),
    #[error("Song {0} is not in favorites.")]
    NotFavorite(u32),
}

pub fn create_playlist(playlists: &mut Playlists, name: &str) -> Result<(), PlaylistError> {
    if playlists.contains_key(name) {
        return Err(PlaylistError::AlreadyExists(name.to_string()));
    }
    playlists.insert(name.to_string(), Vec::new());
    Ok(())
}

/// Delete a playlist. `Favorites` can't be deleted, in any casing.
pub fn delete_playlist(playlists: &mut Playlists, name: &str) -> Result<Vec<u32>, PlaylistError> {
    if !playlists.contains_key(name) {
        return Err(PlaylistError::NotFound(name.to_string()));
    }
    if name.eq_ignore_ascii_case(FAVORITES) {
        return Err(PlaylistError::Protected);
    }
    playlists.remove(name).ok_or_else(|| PlaylistError::NotFound(name.to_string()))
}

pub fn rename_playlist(playlists: &mut Playlists, old: &str, new: &str) -> Result<(), PlaylistError> {
    if !playlists.contains_key(old) {
        return Err(PlaylistError::NotFound(old.to_string()));
    }
    if playlists.contains_key(new) {
        return Err(PlaylistError::AlreadyExists(new.to_string()));
    }
    if let Some(songs) = playlists.remove(old) {
        playlists.insert(new.to_string(), songs);
    }
    Ok(())
}

pub fn add_to_playlist(playlists: &mut Playlists, name: &str, song_id: u32) -> Result<(), PlaylistError> {
    let songs = playlists
        .get_mut(name)
        .ok_or_else(|| PlaylistError::NotFound(name.to_string()))?;
    if songs.contains(&song_id) {
        return Err(PlaylistError::SongAlreadyPresent {
            playlist: name.to_string(),
            song: song_id,
        });
    }
    songs.push(song_id);
    Ok(())
}

pub fn remove_from_playlist(playlists: &mut Playlists, name: &str, song_id: u32) -> Result<(), PlaylistError> {
    let songs = playlists
        .get_mut(name)
        .ok_or_else(|| PlaylistError::NotFound(name.to_string()))?;
    let Some(position) = songs.iter().position(|id| *id == song_id) else {
        return Err(PlaylistError::SongNotPresent {
            playlist: name.to_string(),
            song: song_id,
        });
    };
    songs.remove(position);
    Ok(())
}

/// Add to `Favorites`, creating it on first use.
pub fn add_favorite(playlists: &mut Playlists, song_id: u32) -> Result<(), PlaylistError> {
    let favorites = playlists.entry(FAVORITES.to_string()).or_default();
    if favorites.contains(&song_id) {
        return Err(PlaylistError::AlreadyFavorite(song_id));
    }
    favorites.push(song_id);
    Ok(())
}

pub fn remove_favorite(playlists: &mut Playlists, song_id: u32) -> Result<(), PlaylistError> {
    let favorites = playlists
        .get_mut(FAVORITES)
        .ok_or(PlaylistError::NotFavorite(song_id))?;
    let Some(position) = favorites.iter().position(|id| *id == song_id) else {
        return Err(PlaylistError::NotFavorite(song_id));
    };
    favorites.remove(position);
    Ok(())
}

/// Favorite song ids, empty when the user has none yet.
#[must_use]
pub fn favorites(playlists: &Playlists) -> &[u32] {
    playlists.get(FAVORITES).map(Vec::as_slice).unwrap_or_default()
}

/// Resolve playlist ids against the catalog. `None` marks a song that has
/// left the catalog since it was added.
#[must_use]
pub fn resolve<'a>(ids: &[u32], catalog: &'a [Song]) -> Vec<(u32, Option<&'a Song>)> {
    ids.iter().map(|id| (*id, find_song(catalog, *id))).collect()
}
