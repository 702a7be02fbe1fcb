//! Append-only journal storage.
//!
//! The journal is a single sequential file of one-line records:
//!
//! ```text
//! +<timestamp_ms>:<username>:<password_hash>:<role1,role2>:<0|1>:<json options>
//! -<timestamp_ms>:<username>
//! ```
//!
//! `+` is a full-snapshot upsert, `-` a tombstone. Replay applies records
//! in file order; the last record for a username wins, so a tombstone
//! suppresses every earlier upsert and a later upsert resurrects the
//! record. Timestamps are audit-only and never affect replay ordering.
//!
//! There is no compaction: file size grows with total mutation count, not
//! with live-record count. Colon and comma delimiters are not escaped, so
//! usernames and role names must not contain them (accepted limitation of
//! the format).

use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;

use parking_lot::Mutex;
use sha2::{Digest, Sha256};

use gatehouse_auth::{RoleSet, Storage, User};
use gatehouse_core::StorageError;

#[derive(Default)]
struct Projection {
    users: HashMap<String, User>,
    password_hashes: HashMap<String, String>,
}

/// Durable, crash-recoverable `Storage` backed by an append-only journal.
///
/// One mutex covers both the file append and the projection update, so all
/// storage access is serialized process-wide. The file is not safe to
/// share across processes without external coordination.
///
/// Passwords are stored as a hex SHA-256 digest of `password + salt` with
/// one static salt for the whole store. That scheme is deliberately simple
/// and is not a security bar to match; swap the private digest helper for
/// anything stronger without touching the record format.
pub struct JournalStore {
    path: PathBuf,
    salt: String,
    state: Mutex<Projection>,
}

impl JournalStore {
    /// Open the journal at `path`, creating it if absent, and replay every
    /// record to rebuild the in-memory projection.
    ///
    /// A record with an unrecognized marker or a truncated field layout is
    /// a fatal error: the file cannot be trusted past that point.
    pub fn open(path: impl Into<PathBuf>, salt: impl Into<String>) -> Result<Self, StorageError> {
        let store = Self {
            path: path.into(),
            salt: salt.into(),
            state: Mutex::new(Projection::default()),
        };

        let file = store.open_file()?;
        let mut state = store.state.lock();
        let mut records = 0usize;
        for line in BufReader::new(file).lines() {
            let line = line.map_err(|e| StorageError::io(&store.path, e))?;
            Self::replay(&line, &mut state)?;
            records += 1;
        }
        tracing::debug!(
            path = %store.path.display(),
            records,
            users = state.users.len(),
            "journal replayed"
        );
        drop(state);

        Ok(store)
    }

    fn open_file(&self) -> Result<File, StorageError> {
        OpenOptions::new()
            .read(true)
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| StorageError::io(&self.path, e))
    }

    fn replay(line: &str, state: &mut Projection) -> Result<(), StorageError> {
        if let Some(rest) = line.strip_prefix('+') {
            // Split count protects embedded colons in the trailing JSON
            // field only.
            let mut parts = rest.splitn(6, ':');
            let (Some(_ts), Some(username), Some(hash), Some(roles), Some(flag), Some(options)) = (
                parts.next(),
                parts.next(),
                parts.next(),
                parts.next(),
                parts.next(),
                parts.next(),
            ) else {
                return Err(StorageError::corrupt(line));
            };

            let options: HashMap<String, String> = serde_json::from_str(options)
                .map_err(|e| StorageError::encoding(format!("bad options for {username}: {e}")))?;

            let role_set = RoleSet::new();
            role_set.load_from(roles);

            state.users.insert(
                username.to_string(),
                User {
                    username: username.to_string(),
                    roles: role_set,
                    blacklisted: flag == "1",
                    options,
                },
            );
            state
                .password_hashes
                .insert(username.to_string(), hash.to_string());
            Ok(())
        } else if let Some(rest) = line.strip_prefix('-') {
            let mut parts = rest.splitn(2, ':');
            let (Some(_ts), Some(username)) = (parts.next(), parts.next()) else {
                return Err(StorageError::corrupt(line));
            };
            state.users.remove(username);
            state.password_hashes.remove(username);
            Ok(())
        } else {
            Err(StorageError::corrupt(line))
        }
    }

    /// Append one record; the projection is only touched after the write
    /// succeeds, so a failed append never partially applies.
    fn append(&self, record: &str) -> Result<(), StorageError> {
        let mut file = self.open_file()?;
        file.write_all(record.as_bytes())
            .map_err(|e| StorageError::io(&self.path, e))
    }

    fn upsert_record(user: &User, hash: &str) -> Result<String, StorageError> {
        let options = serde_json::to_string(&user.options)
            .map_err(|e| StorageError::encoding(format!("options for {}: {e}", user.username)))?;
        Ok(format!(
            "+{}:{}:{}:{}:{}:{}\n",
            chrono::Utc::now().timestamp_millis(),
            user.username,
            hash,
            user.roles,
            u8::from(user.blacklisted),
            options,
        ))
    }

    fn digest(&self, password: &str) -> String {
        format!(
            "{:x}",
            Sha256::digest(format!("{password}{}", self.salt).as_bytes())
        )
    }
}

impl Storage for JournalStore {
    fn save(&self, user: &User) -> Result<(), StorageError> {
        let mut state = self.state.lock();
        let hash = state
            .password_hashes
            .get(&user.username)
            .cloned()
            .unwrap_or_default();

        self.append(&Self::upsert_record(user, &hash)?)?;
        state.users.insert(user.username.clone(), user.clone());
        Ok(())
    }

    fn load(&self, username: &str) -> Result<Option<User>, StorageError> {
        Ok(self.state.lock().users.get(username).cloned())
    }

    fn delete(&self, username: &str) -> Result<(), StorageError> {
        let mut state = self.state.lock();

        self.append(&format!(
            "-{}:{}\n",
            chrono::Utc::now().timestamp_millis(),
            username
        ))?;
        state.users.remove(username);
        state.password_hashes.remove(username);
        Ok(())
    }

    fn set_password(&self, username: &str, password: &str) -> Result<(), StorageError> {
        let mut state = self.state.lock();
        let Some(user) = state.users.get(username) else {
            return Ok(());
        };

        let hash = self.digest(password);
        self.append(&Self::upsert_record(user, &hash)?)?;
        state.password_hashes.insert(username.to_string(), hash);
        Ok(())
    }

    fn validate_password(&self, username: &str, password: &str) -> Result<bool, StorageError> {
        let state = self.state.lock();
        if !state.users.contains_key(username) {
            return Ok(false);
        }
        Ok(state
            .password_hashes
            .get(username)
            .is_some_and(|h| *h == self.digest(password)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn journal_path(dir: &tempfile::TempDir) -> PathBuf {
        dir.path().join("users.journal")
    }

    #[test]
    fn open_creates_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = journal_path(&dir);
        JournalStore::open(&path, "salt").unwrap();
        assert!(path.exists());
    }

    #[test]
    fn save_set_password_then_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = journal_path(&dir);

        let store = JournalStore::open(&path, "salt").unwrap();
        let user = User::new("test");
        user.roles.add(["test_role"]);
        store.save(&user).unwrap();

        // No password yet.
        assert!(!store.validate_password("test", "test").unwrap());
        store.set_password("test", "test").unwrap();
        assert!(store.validate_password("test", "test").unwrap());
        drop(store);

        let reopened = JournalStore::open(&path, "salt").unwrap();
        let loaded = reopened.load("test").unwrap().unwrap();
        assert_eq!(loaded.username, "test");
        assert!(!loaded.blacklisted);
        assert_eq!(loaded.roles.list(), vec!["test_role"]);
        assert!(reopened.validate_password("test", "test").unwrap());
        assert!(!reopened.validate_password("test", "wrong").unwrap());
    }

    #[test]
    fn tombstone_suppresses_earlier_upserts_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = journal_path(&dir);

        let store = JournalStore::open(&path, "salt").unwrap();
        let user = User::new("test");
        user.roles.add(["test"]);
        store.save(&user).unwrap();
        store.set_password("test", "test").unwrap();
        store.delete("test").unwrap();
        drop(store);

        let reopened = JournalStore::open(&path, "salt").unwrap();
        assert!(reopened.load("test").unwrap().is_none());
        assert!(!reopened.validate_password("test", "test").unwrap());
    }

    #[test]
    fn upsert_after_tombstone_resurrects_the_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = journal_path(&dir);

        let store = JournalStore::open(&path, "salt").unwrap();
        store.save(&User::new("test")).unwrap();
        store.delete("test").unwrap();
        store.save(&User::new("test")).unwrap();
        drop(store);

        let reopened = JournalStore::open(&path, "salt").unwrap();
        assert!(reopened.load("test").unwrap().is_some());
    }

    #[test]
    fn options_and_blacklist_flag_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = journal_path(&dir);

        let store = JournalStore::open(&path, "salt").unwrap();
        let mut user = User::new("test");
        user.blacklisted = true;
        user.options.insert("locale".into(), "en:GB".into());
        store.save(&user).unwrap();
        drop(store);

        let reopened = JournalStore::open(&path, "salt").unwrap();
        let loaded = reopened.load("test").unwrap().unwrap();
        assert!(loaded.blacklisted);
        // Embedded colons are only legal inside the trailing JSON field.
        assert_eq!(loaded.options.get("locale").unwrap(), "en:GB");
    }

    #[test]
    fn save_preserves_existing_password_hash() {
        let dir = tempfile::tempdir().unwrap();
        let path = journal_path(&dir);

        let store = JournalStore::open(&path, "salt").unwrap();
        store.save(&User::new("test")).unwrap();
        store.set_password("test", "pw").unwrap();

        let mut user = store.load("test").unwrap().unwrap();
        user.blacklisted = true;
        store.save(&user).unwrap();
        drop(store);

        let reopened = JournalStore::open(&path, "salt").unwrap();
        assert!(reopened.validate_password("test", "pw").unwrap());
    }

    #[test]
    fn set_password_for_unknown_user_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let store = JournalStore::open(journal_path(&dir), "salt").unwrap();
        store.set_password("ghost", "pw").unwrap();
        assert!(!store.validate_password("ghost", "pw").unwrap());
    }

    #[test]
    fn different_salt_rejects_old_passwords() {
        let dir = tempfile::tempdir().unwrap();
        let path = journal_path(&dir);

        let store = JournalStore::open(&path, "salt-a").unwrap();
        store.save(&User::new("test")).unwrap();
        store.set_password("test", "pw").unwrap();
        drop(store);

        let reopened = JournalStore::open(&path, "salt-b").unwrap();
        assert!(!reopened.validate_password("test", "pw").unwrap());
    }

    #[test]
    fn malformed_marker_is_fatal_at_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = journal_path(&dir);
        std::fs::write(&path, "?1700000000000:test\n").unwrap();

        assert!(matches!(
            JournalStore::open(&path, "salt"),
            Err(StorageError::Corrupt { .. })
        ));
    }

    #[test]
    fn truncated_upsert_is_fatal_at_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = journal_path(&dir);
        std::fs::write(&path, "+1700000000000:test:hash\n").unwrap();

        assert!(matches!(
            JournalStore::open(&path, "salt"),
            Err(StorageError::Corrupt { .. })
        ));
    }
}
