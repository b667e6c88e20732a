//! # Musit
//!
//! Terminal music library that keeps a listening history per user and
//! suggests what to play next, fully offline.
//!
//! ## Recommendation Engine
//!
//! - [`fuzzy`] - Approximate title/artist search
//! - [`mood`] - Mood to genre classification
//! - [`algorithm`] - Song similarity and history-weighted recommendations
//! - [`queue`] - Next-song prediction
//!
//! Engine functions are pure over a catalog slice and a history slice, and
//! take randomness as a `rand::Rng` so callers can seed it.
//!
//! ### Supporting Modules
//!
//! - [`song`] - Song and history records, lookups, formatting
//! - [`db`] - JSON file storage
//! - [`users`] - Accounts and sessions
//! - [`playlist`] - Playlists and favorites
//! - [`config`] - Data directory management
//! - [`cli`] - Command-line definitions and tables
//! - [`completion`] - Shell completion generation
//!
//! ## Quick Start Example
//!
//! ```
//! use musit::song::{HistoryEntry, Song};
//! use musit::{algorithm, queue};
//! use chrono::Utc;
//! use rand::SeedableRng;
//!
//! let catalog = vec![
//!     Song::new(1, "Blinding Lights", "The Weeknd", "Pop", 200),
//!     Song::new(2, "Save Your Tears", "The Weeknd", "Pop", 215),
//!     Song::new(3, "Levitating", "Dua Lipa", "Pop", 203),
//! ];
//! let history: Vec<HistoryEntry> = catalog
//!     .iter()
//!     .cycle()
//!     .take(5)
//!     .map(|song| HistoryEntry::from_song(song, "alice", Utc::now()))
//!     .collect();
//!
//! let mut rng = rand::rngs::StdRng::seed_from_u64(7);
//! assert!(algorithm::recommend_ai(&catalog, &history, &mut rng).is_some());
//! assert!(queue::predict_next(&catalog, &history, &mut rng).is_some());
//! ```

pub mod algorithm;
pub mod cli;
pub mod completion;
pub mod config;
pub mod db;
pub mod fuzzy;
pub mod mood;
pub mod playlist;
pub mod queue;
pub mod song;
pub mod users;
