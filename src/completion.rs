//! # Shell Completion Module
//!
//! Completion scripts for the `musit` command, plus the list of titles and
//! artists a completion script can offer for `search fuzzy`.
//!
//! ## Usage
//!
//! ```bash
//! # Generate bash completions
//! musit completion bash > ~/.local/share/bash-completion/completions/musit
//!
//! # Generate zsh completions
//! musit completion zsh > ~/.config/zsh/completions/_musit
//! ```

use crate::cli::Shell;
use crate::song::Song;
use clap::Command;
use clap_complete::{generate, Generator, Shell as CompletionShell};
use std::io;

/// Generate shell completions for the given shell
pub fn generate_completions<G: Generator>(gen: G, cmd: &mut Command) {
    generate(gen, cmd, cmd.get_name().to_string(), &mut io::stdout());
}

#[must_use]
pub fn shell_to_completion_shell(shell: Shell) -> CompletionShell {
    match shell {
        Shell::Bash => CompletionShell::Bash,
        Shell::Zsh => CompletionShell::Zsh,
        Shell::Fish => CompletionShell::Fish,
        Shell::PowerShell => CompletionShell::PowerShell,
        Shell::Elvish => CompletionShell::Elvish,
    }
}

/// Titles and artists, sorted, each once.
#[must_use]
pub fn song_completions(catalog: &[Song]) -> Vec<String> {
    let mut completions: Vec<String> = catalog
        .iter()
        .flat_map(|song| [song.title.clone(), song.artist.clone()])
        .filter(|name| !name.is_empty())
        .collect();

    // Sort for consistent output
    completions.sort();
    completions.dedup();
    completions
}
