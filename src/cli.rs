//! # Command-Line Interface Module
//!
//! Clap definitions for the `musit` command, and the plain-text tables it
//! prints songs, history and playlists with.
//!
//! Commands that touch a user's history or playlists need credentials,
//! passed as `--user`/`--password` or through `MUSIT_USER`/`MUSIT_PASSWORD`.
//!
//! ## Examples
//!
//! ```bash
//! musit register alice hunter2
//! export MUSIT_USER=alice MUSIT_PASSWORD=hunter2
//! musit search fuzzy "blindng lights"
//! musit play 3
//! musit next --play
//! ```

use crate::fuzzy::DEFAULT_CUTOFF;
use crate::playlist::{self, Playlists};
use crate::queue::BlendMode;
use crate::song::{format_time, HistoryEntry, Song, SortKey};
use chrono::Local;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Shell types supported for completion generation
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    /// Bash shell
    Bash,
    /// Zsh shell
    Zsh,
    /// Fish shell
    Fish,
    /// PowerShell
    PowerShell,
    /// Elvish shell
    Elvish,
}

/// Main application arguments structure.
#[derive(Parser, Debug)]
#[command(name = "musit")]
#[command(about = "Musit: terminal music library with offline recommendations, playlists & listening history")]
#[command(version)]
pub struct Args {
    /// Directory holding the JSON data files
    #[arg(long, global = true, env = "MUSIT_DATA_DIR", value_hint = clap::ValueHint::DirPath)]
    pub data_dir: Option<PathBuf>,

    /// User to act as
    #[arg(short, long, global = true, env = "MUSIT_USER")]
    pub user: Option<String>,

    /// Password of that user
    #[arg(long, global = true, env = "MUSIT_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Enumeration of all available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the data directory and the default administrator
    Init,

    /// Create a new account
    Register {
        name: String,
        #[arg(value_name = "PASSWORD")]
        initial_password: String,
    },

    /// Change your password
    Passwd {
        old: String,
        new: String,
    },

    /// Show your account details
    Whoami,

    /// Read or write a preference of your account
    Pref {
        #[command(subcommand)]
        action: PrefAction,
    },

    /// Add or remove catalog songs (administrators only)
    Song {
        #[command(subcommand)]
        action: SongAction,
    },

    /// List every song in the catalog
    List {
        /// Order to list songs in (catalog order if omitted)
        #[arg(long, value_enum)]
        sort: Option<SortKey>,
    },

    /// Look songs up by id, title, artist, genre or fuzzy text
    Search {
        #[command(subcommand)]
        by: SearchBy,
    },

    /// Play a song (logs it to your history)
    Play {
        id: u32,
    },

    /// Recommend a song from your listening history
    ///
    /// Needs at least five plays. Genres and artists you play often score
    /// highest, as do songs close to your usual song length.
    Recommend {
        /// Play the recommendation right away
        #[arg(long)]
        play: bool,
    },

    /// Songs that fit a mood (sad, chill, hype, energetic, love)
    Mood {
        mood: String,

        /// Show at most this many songs
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },

    /// Songs similar to the one you played last
    Similar {
        #[arg(long, default_value_t = crate::algorithm::DEFAULT_TOP_N)]
        top_n: usize,
    },

    /// Predict the next song from what you played last
    Next {
        /// `pooled`, `weighted` (60/40) or `weighted:<share of similar songs>`
        #[arg(long, default_value = "pooled")]
        blend: BlendMode,

        /// Play the prediction right away
        #[arg(long)]
        play: bool,
    },

    /// Show your listening history
    History {
        /// Forget every play instead
        #[arg(long)]
        clear: bool,
    },

    /// Manage your playlists
    Playlist {
        #[command(subcommand)]
        action: PlaylistAction,
    },

    /// Manage your favorites
    Fav {
        #[command(subcommand)]
        action: FavAction,
    },

    /// Generate shell completions
    ///
    /// Usage: musit completion bash > ~/.local/share/bash-completion/completions/musit
    Completion {
        /// Shell to generate completions for
        shell: Shell,
    },

    /// List song titles and artists for completion (hidden command)
    #[command(hide = true)]
    CompleteSongs,
}

#[derive(Subcommand, Debug)]
pub enum PrefAction {
    Set { key: String, value: String },
    Get { key: String },
}

#[derive(Subcommand, Debug)]
pub enum SongAction {
    Add {
        id: u32,
        title: String,
        artist: String,
        genre: String,
        /// Length in seconds
        #[arg(value_parser = clap::value_parser!(u32).range(1..))]
        duration: u32,
    },
    Remove {
        id: u32,
    },
}

#[derive(Subcommand, Debug)]
pub enum SearchBy {
    Id {
        id: u32,
    },
    /// Whole title, any casing
    Title {
        title: String,
    },
    /// Part of the artist name, any casing
    Artist {
        artist: String,
    },
    /// Part of the genre, any casing
    Genre {
        genre: String,
    },
    /// Approximate match on titles and artists
    Fuzzy {
        query: String,

        /// Minimum similarity, 0 to 1
        #[arg(long, default_value_t = DEFAULT_CUTOFF)]
        cutoff: f64,
    },
}

#[derive(Subcommand, Debug)]
pub enum PlaylistAction {
    List,
    Show { name: String },
    Create { name: String },
    Delete { name: String },
    Rename { old: String, new: String },
    Add { name: String, id: u32 },
    Remove { name: String, id: u32 },
}

#[derive(Subcommand, Debug)]
pub enum FavAction {
    List,
    Add { id: u32 },
    Remove { id: u32 },
}

/// Cut to `width` characters and pad to exactly `width`.
fn column(text: &str, width: usize) -> String {
    let cut: String = text.chars().take(width).collect();
    format!("{cut:width$}")
}

const SONG_HEADER: &str = " ID │ Title                        │ Artist               │ Genre        │  Dur";
const HISTORY_HEADER: &str = " ID │ Title                        │ Artist               │ Genre        │ When";
const RULE: &str = "────┼──────────────────────────────┼──────────────────────┼──────────────┼──────";

/// Song table, or a notice when there is nothing to show.
#[must_use]
pub fn song_table(songs: &[Song]) -> String {
    if songs.is_empty() {
        return "No songs found.\n".to_string();
    }

    let mut out = format!("{SONG_HEADER}\n{RULE}\n");
    for song in songs {
        out.push_str(&format!(
            "{:>3} │ {} │ {} │ {} │ {:>5}\n",
            song.id,
            column(&song.title, 28),
            column(&song.artist, 20),
            column(&song.genre, 12),
            format_time(u64::from(song.duration))
        ));
    }
    out
}

#[must_use]
pub fn history_table(entries: &[HistoryEntry]) -> String {
    if entries.is_empty() {
        return "You have not listened to any songs yet.\n".to_string();
    }

    let mut out = format!("{HISTORY_HEADER}\n{RULE}\n");
    for entry in entries {
        let when = entry.timestamp.with_timezone(&Local).format("%d-%b %H:%M");
        out.push_str(&format!(
            "{:>3} │ {} │ {} │ {} │ {when}\n",
            entry.song_id,
            column(&entry.title, 28),
            column(&entry.artist, 20),
            column(&entry.genre, 12),
        ));
    }
    out
}

/// One block per playlist: name, size, then its songs.
#[must_use]
pub fn playlists_report(playlists: &Playlists, catalog: &[Song]) -> String {
    if playlists.is_empty() {
        return "You have no playlists yet.\n".to_string();
    }

    let mut out = String::new();
    for (name, ids) in playlists {
        out.push_str(&format!("\n{}  ({} songs)\n", name.to_uppercase(), ids.len()));
        out.push_str(&"-".repeat(40));
        out.push('\n');
        out.push_str(&playlist_lines(ids, catalog));
    }
    out
}

/// Songs of one playlist, ids that left the catalog marked as unknown.
#[must_use]
pub fn playlist_lines(ids: &[u32], catalog: &[Song]) -> String {
    if ids.is_empty() {
        return "  [Empty playlist]\n".to_string();
    }

    playlist::resolve(ids, catalog)
        .into_iter()
        .map(|(id, song)| match song {
            Some(song) => format!("  {id}. {} - {}\n", song.title, song.artist),
            None => format!("  {id} (Unknown song)\n"),
        })
        .collect()
}
