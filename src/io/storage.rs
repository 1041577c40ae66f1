use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::warn;

/// Error type for storage writes
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage is not available")]
    Unavailable,
    #[error("invalid storage key '{0}': use letters, digits, '-' or '_'")]
    InvalidKey(String),
    #[error("could not write {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("could not serialize value: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// String key-value storage.
///
/// Reads never fail: anything unreadable is reported as "no stored value".
pub trait Storage {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
    fn is_available(&self) -> bool;
}

fn validate_key(key: &str) -> Result<(), StorageError> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}

// ---------------------------------------------------------------------------
// In-memory
// ---------------------------------------------------------------------------

/// Storage kept in memory. [`MemoryStorage::unavailable`] rejects every write.
#[derive(Debug)]
pub struct MemoryStorage {
    entries: RefCell<HashMap<String, String>>,
    available: bool,
}

impl Default for MemoryStorage {
    fn default() -> Self {
        MemoryStorage::new()
    }
}

impl MemoryStorage {
    pub fn new() -> Self {
        MemoryStorage {
            entries: RefCell::new(HashMap::new()),
            available: true,
        }
    }

    pub fn unavailable() -> Self {
        MemoryStorage {
            entries: RefCell::new(HashMap::new()),
            available: false,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        if !self.available {
            return None;
        }
        self.entries.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if !self.available {
            return Err(StorageError::Unavailable);
        }
        validate_key(key)?;
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        if !self.available {
            return Err(StorageError::Unavailable);
        }
        self.entries.borrow_mut().remove(key);
        Ok(())
    }

    fn is_available(&self) -> bool {
        self.available
    }
}

// ---------------------------------------------------------------------------
// File-backed
// ---------------------------------------------------------------------------

/// One `<key>.json` file per key inside a data directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Use `dir`, creating it if needed. A directory that cannot be created
    /// leaves the storage unavailable rather than failing.
    pub fn open(dir: &Path) -> Self {
        if let Err(e) = fs::create_dir_all(dir) {
            warn!(dir = %dir.display(), error = %e, "storage directory unavailable");
        }
        FileStorage {
            dir: dir.to_path_buf(),
        }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

/// Write `content` to `path` atomically using a temp file + rename.
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        validate_key(key).ok()?;
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(content) => Some(content),
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "could not read stored value");
                None
            }
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        validate_key(key)?;
        if !self.is_available() {
            return Err(StorageError::Unavailable);
        }
        let path = self.path_for(key);
        atomic_write(&path, value.as_bytes()).map_err(|source| StorageError::Io { path, source })
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        validate_key(key)?;
        let path = self.path_for(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StorageError::Io { path, source }),
        }
    }

    fn is_available(&self) -> bool {
        self.dir.is_dir()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn memory_round_trip() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get("k"), None);
        storage.set("k", "v").unwrap();
        assert_eq!(storage.get("k").as_deref(), Some("v"));
        storage.remove("k").unwrap();
        assert_eq!(storage.get("k"), None);
        assert!(storage.is_empty());
    }

    #[test]
    fn unavailable_memory_rejects_writes() {
        let storage = MemoryStorage::unavailable();
        assert!(!storage.is_available());
        assert!(matches!(storage.set("k", "v"), Err(StorageError::Unavailable)));
        assert_eq!(storage.get("k"), None);
    }

    #[test]
    fn keys_are_validated() {
        let storage = MemoryStorage::new();
        assert!(matches!(
            storage.set("../escape", "v"),
            Err(StorageError::InvalidKey(_))
        ));
        assert!(storage.set("taskboard-tasks_v2", "v").is_ok());
    }

    #[test]
    fn file_storage_writes_one_file_per_key() {
        let tmp = TempDir::new().unwrap();
        let storage = FileStorage::open(&tmp.path().join("data"));
        assert!(storage.is_available());

        storage.set("taskboard-tasks", "[]").unwrap();
        assert_eq!(
            fs::read_to_string(tmp.path().join("data/taskboard-tasks.json")).unwrap(),
            "[]"
        );
        assert_eq!(storage.get("taskboard-tasks").as_deref(), Some("[]"));

        storage.set("taskboard-tasks", "[1]").unwrap();
        assert_eq!(storage.get("taskboard-tasks").as_deref(), Some("[1]"));
    }

    #[test]
    fn file_storage_missing_and_removed_keys() {
        let tmp = TempDir::new().unwrap();
        let storage = FileStorage::open(tmp.path());
        assert_eq!(storage.get("absent"), None);
        storage.remove("absent").unwrap();

        storage.set("present", "x").unwrap();
        storage.remove("present").unwrap();
        assert_eq!(storage.get("present"), None);
        assert!(storage.get("../etc/passwd").is_none());
    }

    #[test]
    fn file_storage_under_a_file_is_unavailable() {
        let tmp = TempDir::new().unwrap();
        let blocker = tmp.path().join("blocker");
        fs::write(&blocker, "not a dir").unwrap();
        let storage = FileStorage::open(&blocker.join("data"));
        assert!(!storage.is_available());
        assert!(storage.set("k", "v").is_err());
    }
}
