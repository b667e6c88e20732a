//! User accounts.
//!
//! Passwords are stored as SHA-256 hex digests. A successful [`login`] yields
//! a [`Session`], which every per-user operation takes explicitly; there is
//! no "current user" anywhere else.

use crate::db::Store;
use chrono::{DateTime, Utc};
use log::info;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use thiserror::Error;

/// Name and password of the account [`ensure_admin_exists`] creates.
pub const DEFAULT_ADMIN: (&str, &str) = ("admin", "admin123");

/// How an account is stored in `users.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    /// SHA-256 of the password, lower-case hex.
    pub password: String,
    #[serde(deserialize_with = "crate::song::deserialize_timestamp")]
    pub created: DateTime<Utc>,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub preferences: BTreeMap<String, String>,
}

/// The authenticated user of one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    user: String,
    is_admin: bool,
}

impl Session {
    #[must_use]
    pub fn user(&self) -> &str {
        &self.user
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.is_admin
    }
}

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("Username '{0}' already exists.")]
    UserExists(String),
    #[error("User '{0}' not found.")]
    UnknownUser(String),
    #[error("Incorrect password.")]
    WrongPassword,
    #[error("'{0}' is not an administrator.")]
    NotAdmin(String),
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

#[must_use]
pub fn encode_password(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

pub fn create_account(store: &Store, name: &str, password: &str) -> Result<(), AccountError> {
    let mut users = store.load_users()?;
    if users.contains_key(name) {
        return Err(AccountError::UserExists(name.to_string()));
    }

    users.insert(
        name.to_string(),
        UserRecord {
            password: encode_password(password),
            created: Utc::now(),
            is_admin: false,
            preferences: BTreeMap::new(),
        },
    );
    store.save_users(&users)?;
    info!("Created account {name}");
    Ok(())
}

pub fn login(store: &Store, name: &str, password: &str) -> Result<Session, AccountError> {
    let users = store.load_users()?;
    let record = users
        .get(name)
        .ok_or_else(|| AccountError::UnknownUser(name.to_string()))?;
    if record.password != encode_password(password) {
        return Err(AccountError::WrongPassword);
    }

    Ok(Session {
        user: name.to_string(),
        is_admin: record.is_admin,
    })
}

/// Create the default administrator unless an `admin` account exists.
/// Returns whether it was created.
pub fn ensure_admin_exists(store: &Store) -> anyhow::Result<bool> {
    let mut users = store.load_users()?;
    let (name, password) = DEFAULT_ADMIN;
    if users.contains_key(name) {
        return Ok(false);
    }

    users.insert(
        name.to_string(),
        UserRecord {
            password: encode_password(password),
            created: Utc::now(),
            is_admin: true,
            preferences: BTreeMap::new(),
        },
    );
    store.save_users(&users)?;
    info!("Created default administrator account");
    Ok(true)
}

pub fn is_admin(store: &Store, name: &str) -> anyhow::Result<bool> {
    Ok(store.load_users()?.get(name).is_some_and(|user| user.is_admin))
}

/// Fails unless `session` is an administrator.
pub fn require_admin(session: &Session) -> Result<(), AccountError> {
    if session.is_admin {
        Ok(())
    } else {
        Err(AccountError::NotAdmin(session.user.clone()))
    }
}

pub fn change_password(store: &Store, session: &Session, old: &str, new: &str) -> Result<(), AccountError> {
    let mut users = store.load_users()?;
    let record = users
        .get_mut(&session.user)
        .ok_or_else(|| AccountError::UnknownUser(session.user.clone()))?;
    if record.password != encode_password(old) {
        return Err(AccountError::WrongPassword);
    }

    record.password = encode_password(new);
    store.save_users(&users)?;
    info!("Changed password of {}", session.user);
    Ok(())
}

pub fn user_info(store: &Store, session: &Session) -> Result<UserRecord, AccountError> {
    store
        .load_users()?
        .remove(&session.user)
        .ok_or_else(|| AccountError::UnknownUser(session.user.clone()))
}

pub fn set_preference(store: &Store, session: &Session, key: &str, value: &str) -> Result<(), AccountError> {
    let mut users = store.load_users()?;
    let record = users
        .get_mut(&session.user)
        .ok_or_else(|| AccountError::UnknownUser(session.user.clone()))?;
    record.preferences.insert(key.to_string(), value.to_string());
    store.save_users(&users)?;
    Ok(())
}

pub fn get_preference(store: &Store, session: &Session, key: &str) -> anyhow::Result<Option<String>> {
    Ok(store
        .load_users()?
        .get(&session.user)
        .and_then(|user| user.preferences.get(key).cloned()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn open_temp_store() -> (TempDir, Store) {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = Store::open(temp_dir.path()).expect("Failed to open store");
        (temp_dir, store)
    }

    #[test]
    fn test_encode_password_is_sha256_hex() {
        assert_eq!(
            encode_password("admin123"),
            "240be518fabd2724ddb6f04eeb1da5967448d7e831c08c8fa822809f74c720a9"
        );
        assert_eq!(encode_password("x").len(), 64);
    }

    #[test]
    fn test_create_and_login() {
        let (_temp_dir, store) = open_temp_store();
        create_account(&store, "alice", "hunter2").unwrap();
        assert!(matches!(
            create_account(&store, "alice", "other"),
            Err(AccountError::UserExists(name)) if name == "alice"
        ));

        let session = login(&store, "alice", "hunter2").unwrap();
        assert_eq!(session.user(), "alice");
        assert!(!session.is_admin());

        assert!(matches!(login(&store, "alice", "wrong"), Err(AccountError::WrongPassword)));
        assert!(matches!(login(&store, "bob", "hunter2"), Err(AccountError::UnknownUser(_))));
    }

    #[test]
    fn test_password_is_not_stored_in_clear() {
        let (_temp_dir, store) = open_temp_store();
        create_account(&store, "alice", "hunter2").unwrap();
        let users = store.load_users().unwrap();
        assert_eq!(users["alice"].password, encode_password("hunter2"));
    }

    #[test]
    fn test_default_admin() {
        let (_temp_dir, store) = open_temp_store();
        assert!(ensure_admin_exists(&store).unwrap());
        assert!(!ensure_admin_exists(&store).unwrap());

        let (name, password) = DEFAULT_ADMIN;
        let session = login(&store, name, password).unwrap();
        assert!(session.is_admin());
        assert!(require_admin(&session).is_ok());
        assert!(is_admin(&store, name).unwrap());
        assert!(!is_admin(&store, "ghost").unwrap());
    }

    #[test]
    fn test_regular_user_is_not_admin() {
        let (_temp_dir, store) = open_temp_store();
        create_account(&store, "alice", "pw").unwrap();
        let session = login(&store, "alice", "pw").unwrap();
        assert!(matches!(require_admin(&session), Err(AccountError::NotAdmin(_))));
    }

    #[test]
    fn test_change_password() {
        let (_temp_dir, store) = open_temp_store();
        create_account(&store, "alice", "old").unwrap();
        let session = login(&store, "alice", "old").unwrap();

        assert!(matches!(
            change_password(&store, &session, "nope", "new"),
            Err(AccountError::WrongPassword)
        ));
        change_password(&store, &session, "old", "new").unwrap();

        assert!(login(&store, "alice", "old").is_err());
        assert!(login(&store, "alice", "new").is_ok());
    }

    #[test]
    fn test_preferences() {
        let (_temp_dir, store) = open_temp_store();
        create_account(&store, "alice", "pw").unwrap();
        let session = login(&store, "alice", "pw").unwrap();

        assert_eq!(get_preference(&store, &session, "mood").unwrap(), None);
        set_preference(&store, &session, "mood", "Chill").unwrap();
        assert_eq!(get_preference(&store, &session, "mood").unwrap(), Some("Chill".to_string()));
        assert_eq!(user_info(&store, &session).unwrap().preferences.len(), 1);
    }
}
