//! # Musit - Terminal Music Library
//!
//! Command-line front end over the catalog, the per-user history and
//! playlists, and the recommendation engine.
//!
//! ## Usage
//!
//! ```bash
//! # Create the data files and the default administrator
//! musit init
//!
//! # Add a song as the administrator
//! musit --user admin --password admin123 song add 1 "Blinding Lights" "The Weeknd" Pop 200
//!
//! # Listen and ask for suggestions
//! musit --user alice --password pw play 1
//! musit --user alice --password pw recommend
//! musit --user alice --password pw next --blend weighted
//! ```

use anyhow::{anyhow, Result};
use clap::{CommandFactory, Parser};
use log::{debug, info};
use musit::cli::{self, Command, FavAction, PlaylistAction, PrefAction, SearchBy, SongAction};
use musit::config::RuntimeConfig;
use musit::db::Store;
use musit::song::{find_song, find_song_by_title, format_time, sort_songs, Song};
use musit::users::{self, Session};
use musit::{algorithm, completion, fuzzy, mood, playlist, queue};
use rand::thread_rng;

/// Main entry point for Musit.
///
/// Logging is controlled via `RUST_LOG`:
/// - `RUST_LOG=debug musit next` - Engine decisions
/// - `RUST_LOG=musit::algorithm=trace musit recommend` - Per-song scores
fn main() -> Result<()> {
    env_logger::init();

    let args = cli::Args::parse();

    // Completion output must not depend on a data directory.
    if let Command::Completion { shell } = args.command {
        let mut cmd = cli::Args::command();
        completion::generate_completions(completion::shell_to_completion_shell(shell), &mut cmd);
        return Ok(());
    }

    let config = RuntimeConfig::resolve(args.data_dir.clone())?;
    debug!("Using data directory {}", config.data_dir.display());
    let store = Store::open(&config.data_dir)?;
    if users::ensure_admin_exists(&store)? {
        println!("Default administrator created ({}).", users::DEFAULT_ADMIN.0);
    }

    run(&store, &args)
}

/// Log in with the global credentials.
fn session(store: &Store, args: &cli::Args) -> Result<Session> {
    let (Some(user), Some(password)) = (args.user.as_deref(), args.password.as_deref()) else {
        return Err(anyhow!(
            "This command needs an account. Pass --user and --password (or set MUSIT_USER and MUSIT_PASSWORD)."
        ));
    };
    Ok(users::login(store, user, password)?)
}

fn catalog_song(catalog: &[Song], id: u32) -> Result<&Song> {
    find_song(catalog, id).ok_or_else(|| anyhow!("No song with ID {id}."))
}

fn play(store: &Store, session: &Session, song: &Song) -> Result<()> {
    store.log_play(session.user(), song)?;
    println!("Now playing: {song}");
    Ok(())
}

#[allow(clippy::too_many_lines)]
fn run(store: &Store, args: &cli::Args) -> Result<()> {
    match &args.command {
        Command::Init => {
            println!("Data directory ready at {}", store.root().display());
        }
        Command::Register { name, initial_password } => {
            users::create_account(store, name, initial_password)?;
            println!("Account '{name}' created.");
        }
        Command::Passwd { old, new } => {
            let session = session(store, args)?;
            users::change_password(store, &session, old, new)?;
            println!("Password changed.");
        }
        Command::Whoami => {
            let session = session(store, args)?;
            let record = users::user_info(store, &session)?;
            println!("User:     {}", session.user());
            println!("Created:  {}", record.created.format("%Y-%m-%d %H:%M"));
            println!("Admin:    {}", if record.is_admin { "yes" } else { "no" });
            for (key, value) in &record.preferences {
                println!("  {key} = {value}");
            }
        }
        Command::Pref { action } => {
            let session = session(store, args)?;
            match action {
                PrefAction::Set { key, value } => {
                    users::set_preference(store, &session, key, value)?;
                    println!("{key} = {value}");
                }
                PrefAction::Get { key } => match users::get_preference(store, &session, key)? {
                    Some(value) => println!("{key} = {value}"),
                    None => println!("{key} is not set."),
                },
            }
        }
        Command::Song { action } => {
            let session = session(store, args)?;
            users::require_admin(&session)?;
            match action {
                SongAction::Add { id, title, artist, genre, duration } => {
                    let song = Song::new(*id, title, artist, genre, *duration);
                    store.add_song(song.clone())?;
                    println!("Added: {song}");
                }
                SongAction::Remove { id } => {
                    let song = store.remove_song(*id)?;
                    println!("Removed: {song}");
                }
            }
        }
        Command::List { sort } => {
            let mut catalog = store.load_songs()?;
            if let Some(key) = sort {
                sort_songs(&mut catalog, *key);
            }
            print!("{}", cli::song_table(&catalog));
        }
        Command::Search { by } => {
            let catalog = store.load_songs()?;
            let found: Vec<Song> = match by {
                SearchBy::Id { id } => find_song(&catalog, *id).into_iter().cloned().collect(),
                SearchBy::Title { title } => find_song_by_title(&catalog, title).into_iter().cloned().collect(),
                SearchBy::Artist { artist } => {
                    let needle = artist.to_lowercase();
                    catalog
                        .iter()
                        .filter(|song| song.artist.to_lowercase().contains(&needle))
                        .cloned()
                        .collect()
                }
                SearchBy::Genre { genre } => {
                    let needle = genre.to_lowercase();
                    catalog
                        .iter()
                        .filter(|song| song.genre.to_lowercase().contains(&needle))
                        .cloned()
                        .collect()
                }
                SearchBy::Fuzzy { query, cutoff } => fuzzy::fuzzy_search(query, &catalog, *cutoff),
            };
            print!("{}", cli::song_table(&found));
        }
        Command::Play { id } => {
            let session = session(store, args)?;
            let catalog = store.load_songs()?;
            play(store, &session, catalog_song(&catalog, *id)?)?;
        }
        Command::Recommend { play: play_it } => {
            let session = session(store, args)?;
            let catalog = store.load_songs()?;
            let history = store.user_history(session.user())?;
            match algorithm::recommend_ai(&catalog, &history, &mut thread_rng()) {
                Some(song) => {
                    println!("Recommended for you: {song}");
                    if *play_it {
                        play(store, &session, &song)?;
                    }
                }
                None => println!("Listen to at least 5 songs first."),
            }
        }
        Command::Mood { mood: wanted, limit } => {
            let catalog = store.load_songs()?;
            let canonical = mood::normalize_mood(wanted);
            let mut songs = mood::recommend_by_mood(&canonical, &catalog);
            if songs.is_empty() {
                println!("No songs match this mood.");
            } else {
                songs.truncate(*limit);
                println!("Mood: {canonical}");
                print!("{}", cli::song_table(&songs));
            }
        }
        Command::Similar { top_n } => {
            let session = session(store, args)?;
            let catalog = store.load_songs()?;
            let history = store.user_history(session.user())?;
            let Some(last) = history.last() else {
                println!("Play a song first.");
                return Ok(());
            };
            let Some(target) = find_song(&catalog, last.song_id) else {
                println!("'{}' is no longer in the catalog.", last.title);
                return Ok(());
            };
            println!("Similar to {target}:");
            print!("{}", cli::song_table(&algorithm::similar_songs(target, &catalog, *top_n)));
        }
        Command::Next { blend, play: play_it } => {
            let session = session(store, args)?;
            let catalog = store.load_songs()?;
            let history = store.user_history(session.user())?;
            info!("Predicting next song for {} with {blend} blend", session.user());
            match queue::predict_next_with(&catalog, &history, *blend, &mut thread_rng()) {
                Some(song) => {
                    println!("Up next: {song}");
                    if *play_it {
                        play(store, &session, &song)?;
                    }
                }
                None => println!("The catalog is empty."),
            }
        }
        Command::History { clear } => {
            let session = session(store, args)?;
            if *clear {
                let cleared = store.clear_history(session.user())?;
                println!("Cleared {cleared} plays.");
            } else {
                let history = store.user_history(session.user())?;
                print!("{}", cli::history_table(&history));
                let total: u64 = history.iter().map(|entry| u64::from(entry.duration)).sum();
                if !history.is_empty() {
                    println!("{} plays, {} listened.", history.len(), format_time(total));
                }
            }
        }
        Command::Playlist { action } => {
            let session = session(store, args)?;
            let catalog = store.load_songs()?;
            let mut playlists = store.user_playlists(session.user())?;
            match action {
                PlaylistAction::List => {
                    print!("{}", cli::playlists_report(&playlists, &catalog));
                    return Ok(());
                }
                PlaylistAction::Show { name } => {
                    let ids = playlists
                        .get(name)
                        .ok_or_else(|| playlist::PlaylistError::NotFound(name.clone()))?;
                    println!("{}", name.to_uppercase());
                    print!("{}", cli::playlist_lines(ids, &catalog));
                    return Ok(());
                }
                PlaylistAction::Create { name } => {
                    playlist::create_playlist(&mut playlists, name)?;
                    println!("Playlist '{name}' created.");
                }
                PlaylistAction::Delete { name } => {
                    let songs = playlist::delete_playlist(&mut playlists, name)?;
                    println!("Playlist '{name}' deleted ({} songs).", songs.len());
                }
                PlaylistAction::Rename { old, new } => {
                    playlist::rename_playlist(&mut playlists, old, new)?;
                    println!("Playlist '{old}' renamed to '{new}'.");
                }
                PlaylistAction::Add { name, id } => {
                    let song = catalog_song(&catalog, *id)?;
                    playlist::add_to_playlist(&mut playlists, name, *id)?;
                    println!("Added {song} to '{name}'.");
                }
                PlaylistAction::Remove { name, id } => {
                    playlist::remove_from_playlist(&mut playlists, name, *id)?;
                    println!("Removed song {id} from '{name}'.");
                }
            }
            store.save_user_playlists(session.user(), playlists)?;
        }
        Command::Fav { action } => {
            let session = session(store, args)?;
            let catalog = store.load_songs()?;
            let mut playlists = store.user_playlists(session.user())?;
            match action {
                FavAction::List => {
                    let favorites = playlist::favorites(&playlists);
                    if favorites.is_empty() {
                        println!("No favorites yet.");
                    } else {
                        print!("{}", cli::playlist_lines(favorites, &catalog));
                    }
                    return Ok(());
                }
                FavAction::Add { id } => {
                    let song = catalog_song(&catalog, *id)?;
                    playlist::add_favorite(&mut playlists, *id)?;
                    println!("Added {song} to favorites.");
                }
                FavAction::Remove { id } => {
                    playlist::remove_favorite(&mut playlists, *id)?;
                    println!("Removed song {id} from favorites.");
                }
            }
            store.save_user_playlists(session.user(), playlists)?;
        }
        Command::CompleteSongs => {
            for name in completion::song_completions(&store.load_songs()?) {
                println!("{name}");
            }
        }
        Command::Completion { .. } => {}
    }

    Ok(())
}
