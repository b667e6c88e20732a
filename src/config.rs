//! # Configuration Module
//!
//! Locates the data directory Musit keeps its JSON files in.
//!
//! ## Data Storage
//!
//! By default data lives in the platform-standard data directory:
//! - Linux: `~/.local/share/musit/`
//! - macOS: `~/Library/Application Support/musit/`
//! - Windows: `%APPDATA%\musit\`
//!
//! `--data-dir` (or `MUSIT_DATA_DIR`) overrides it, which is also how tests
//! point Musit at a temporary directory.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Returns the platform-appropriate data directory for Musit, creating it if
/// needed.
///
/// # Errors
///
/// This function will return an error if:
/// - The system data directory cannot be determined
/// - The musit subdirectory cannot be created due to permissions
///
/// # Examples
///
/// ```no_run
/// use musit::config::get_data_dir;
///
/// let data_dir = get_data_dir()?;
/// println!("Data location: {}", data_dir.display());
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn get_data_dir() -> Result<PathBuf> {
    let data_dir = dirs::data_dir().ok_or_else(|| {
        anyhow::anyhow!(
            "Could not determine system data directory. Use --data-dir or MUSIT_DATA_DIR to choose one."
        )
    })?;

    let musit_dir = data_dir.join("musit");
    fs::create_dir_all(&musit_dir).with_context(|| {
        format!(
            "Failed to create Musit data directory at {}. Please check file permissions.",
            musit_dir.display()
        )
    })?;

    Ok(musit_dir)
}

/// Configuration for runtime behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Directory holding `songs.json`, `users.json`, `history.json` and
    /// `playlists.json`
    pub data_dir: PathBuf,
}

impl RuntimeConfig {
    /// Use `data_dir` when given, the platform data directory otherwise.
    pub fn resolve(data_dir: Option<PathBuf>) -> Result<Self> {
        match data_dir {
            Some(data_dir) => Ok(Self::with_data_dir(data_dir)),
            None => Ok(Self {
                data_dir: get_data_dir()?,
            }),
        }
    }

    /// Create configuration with explicit data directory
    #[must_use]
    pub fn with_data_dir(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }
}
