//! File-backed secret store
//!
//! Keeps a flat JSON object of key → secret on disk. All writes use atomic
//! temp-file + rename so a crash mid-write never leaves a torn file, and the
//! file is restricted to 0600. A Mutex serializes writers; the in-memory map
//! mirrors the file so reads never touch the disk, and it only changes once
//! the new contents are on disk.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

use crate::SecretStore;
use crate::error::{Error, Result};

/// Secret store persisted to a single JSON file.
pub struct FileStore {
    path: PathBuf,
    state: Mutex<HashMap<String, String>>,
}

impl FileStore {
    /// Open the store at `path`.
    ///
    /// If the file doesn't exist it is created as `{}` so later opens skip the
    /// cold-start path.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let state = if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .map_err(|e| Error::Io(format!("reading secret file: {e}")))?;
            let entries: HashMap<String, String> = serde_json::from_str(&contents)
                .map_err(|e| Error::Parse(format!("parsing secret file: {e}")))?;
            info!(path = %path.display(), keys = entries.len(), "loaded secret store");
            entries
        } else {
            info!(path = %path.display(), "secret file not found, starting with empty store");
            let entries = HashMap::new();
            write_atomic(&path, &entries)?;
            entries
        };

        Ok(Self {
            path,
            state: Mutex::new(state),
        })
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SecretStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.state.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut state = self.state.lock();
        let mut next = state.clone();
        next.insert(key.to_owned(), value.to_owned());
        write_atomic(&self.path, &next)?;
        *state = next;
        debug!(key, "stored secret");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut state = self.state.lock();
        if !state.contains_key(key) {
            return Ok(());
        }
        let mut next = state.clone();
        next.remove(key);
        write_atomic(&self.path, &next)?;
        *state = next;
        debug!(key, "removed secret");
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let mut state = self.state.lock();
        if state.is_empty() {
            return Ok(());
        }
        write_atomic(&self.path, &HashMap::new())?;
        state.clear();
        debug!(path = %self.path.display(), "cleared secret store");
        Ok(())
    }
}

/// Write the map to `path` atomically with owner-only permissions.
fn write_atomic(path: &Path, data: &HashMap<String, String>) -> Result<()> {
    let json = serde_json::to_string_pretty(data)
        .map_err(|e| Error::Parse(format!("serializing secrets: {e}")))?;

    let dir = path
        .parent()
        .ok_or_else(|| Error::Io("secret path has no parent directory".into()))?;

    let file_name = path
        .file_name()
        .ok_or_else(|| Error::Io("secret path has no file name".into()))?
        .to_string_lossy();
    // Unique per write: several stores may share a directory.
    let tmp_path = dir.join(format!(".{file_name}.{}.tmp", Uuid::new_v4().simple()));

    let result = persist(&tmp_path, path, json.as_bytes());
    if result.is_err() {
        let _ = std::fs::remove_file(&tmp_path);
    }
    result?;

    debug!(path = %path.display(), "persisted secrets");
    Ok(())
}

fn persist(tmp_path: &Path, path: &Path, contents: &[u8]) -> Result<()> {
    std::fs::write(tmp_path, contents)
        .map_err(|e| Error::Io(format!("writing temp secret file: {e}")))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(tmp_path, perms)
            .map_err(|e| Error::Io(format!("setting secret file permissions: {e}")))?;
    }

    std::fs::rename(tmp_path, path)
        .map_err(|e| Error::Io(format!("renaming temp secret file: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ID_TOKEN, REFRESH_TOKEN};

    #[test]
    fn values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("secrets.json");

        let store = FileStore::open(&path).unwrap();
        store.set(ID_TOKEN, "id_1").unwrap();
        store.set(REFRESH_TOKEN, "rt_1").unwrap();

        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.get(ID_TOKEN).unwrap().as_deref(), Some("id_1"));
        assert_eq!(reopened.get(REFRESH_TOKEN).unwrap().as_deref(), Some("rt_1"));
    }

    #[test]
    fn cold_start_creates_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("secrets.json");

        assert!(!path.exists());
        let store = FileStore::open(&path).unwrap();
        assert!(store.get(ID_TOKEN).unwrap().is_none());
        assert!(path.exists());

        let contents = std::fs::read_to_string(&path).unwrap();
        let parsed: HashMap<String, String> = serde_json::from_str(&contents).unwrap();
        assert!(parsed.is_empty());
    }

    #[test]
    fn corrupt_file_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("secrets.json");
        std::fs::write(&path, "not json").unwrap();

        let result = FileStore::open(&path);
        assert!(matches!(result, Err(Error::Parse(_))));
    }

    #[test]
    fn clear_wipes_file_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("secrets.json");

        let store = FileStore::open(&path).unwrap();
        store.set(ID_TOKEN, "id_1").unwrap();
        store.set(REFRESH_TOKEN, "rt_1").unwrap();
        store.clear().unwrap();
        store.clear().unwrap();

        let reopened = FileStore::open(&path).unwrap();
        assert!(reopened.get(ID_TOKEN).unwrap().is_none());
        assert!(reopened.get(REFRESH_TOKEN).unwrap().is_none());
    }

    #[test]
    fn remove_only_touches_one_key() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path().join("secrets.json")).unwrap();
        store.set(ID_TOKEN, "id_1").unwrap();
        store.set(REFRESH_TOKEN, "rt_1").unwrap();

        store.remove(ID_TOKEN).unwrap();
        assert!(store.get(ID_TOKEN).unwrap().is_none());
        assert_eq!(store.get(REFRESH_TOKEN).unwrap().as_deref(), Some("rt_1"));
    }

    #[cfg(unix)]
    #[test]
    fn file_permissions_are_0600() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("secrets.json");

        let store = FileStore::open(&path).unwrap();
        store.set(ID_TOKEN, "id_1").unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600, "secret file must be 0600, got {mode:o}");
    }

    #[test]
    fn stores_sharing_a_directory_keep_their_own_secrets() {
        let dir = tempfile::tempdir().unwrap();
        let alice_path = dir.path().join("alice.json");
        let bob_path = dir.path().join("bob.json");
        let alice = FileStore::open(&alice_path).unwrap();
        let bob = FileStore::open(&bob_path).unwrap();

        for round in 0..200 {
            std::thread::scope(|s| {
                let a = s.spawn(|| alice.set(ID_TOKEN, &format!("alice_{round}")));
                let b = s.spawn(|| bob.set(ID_TOKEN, &format!("bob_{round}")));
                a.join().unwrap().unwrap();
                b.join().unwrap().unwrap();
            });

            let on_disk = std::fs::read_to_string(&alice_path).unwrap();
            assert!(!on_disk.contains("bob_"), "round {round}: {on_disk}");
            assert!(on_disk.contains(&format!("alice_{round}")), "round {round}: {on_disk}");
        }

        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .filter(|name| name.to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty(), "temp files left: {leftovers:?}");
    }

    #[test]
    fn failed_write_leaves_memory_matching_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("secrets.json");
        let backup = dir.path().join("secrets.json.bak");

        let store = FileStore::open(&path).unwrap();
        store.set(ID_TOKEN, "id_1").unwrap();
        store.set(REFRESH_TOKEN, "rt_1").unwrap();

        // A non-empty directory at the target path makes the rename fail.
        std::fs::rename(&path, &backup).unwrap();
        std::fs::create_dir(&path).unwrap();
        std::fs::write(path.join("blocker"), "x").unwrap();

        assert!(matches!(store.clear(), Err(Error::Io(_))));
        assert!(matches!(store.set(ID_TOKEN, "id_2"), Err(Error::Io(_))));
        assert!(matches!(store.remove(REFRESH_TOKEN), Err(Error::Io(_))));
        assert_eq!(store.get(ID_TOKEN).unwrap().as_deref(), Some("id_1"));
        assert_eq!(store.get(REFRESH_TOKEN).unwrap().as_deref(), Some("rt_1"));

        std::fs::remove_dir_all(&path).unwrap();
        std::fs::rename(&backup, &path).unwrap();
        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.get(ID_TOKEN).unwrap(), store.get(ID_TOKEN).unwrap());
        assert_eq!(
            reopened.get(REFRESH_TOKEN).unwrap(),
            store.get(REFRESH_TOKEN).unwrap()
        );
    }
}
