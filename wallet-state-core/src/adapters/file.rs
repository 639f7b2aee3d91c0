//! JSON file storage adapter
//!
//! All keys live in one JSON object on disk:
//! ```json
//! { "app_theme": "dark", "app_wallets": "[...]" }
//! ```
//! Writers take an advisory lock on a sibling `.lock` file and replace the
//! data file atomically, so a crash mid-write never leaves a torn file.

use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use fs2::FileExt;
use tempfile::NamedTempFile;

use crate::domain::result::{Error, Result};
use crate::ports::Storage;

type Entries = BTreeMap<String, String>;

/// Storage backed by a single JSON file
#[derive(Debug)]
pub struct JsonFileStorage {
    path: PathBuf,
    lock_path: PathBuf,
}

impl JsonFileStorage {
    /// Use `path` as the data file, creating its parent directory if needed.
    /// The file itself is created on first write.
    pub fn new(path: &Path) -> Result<Self> {
        if let Some(parent) = non_empty_parent(path) {
            fs::create_dir_all(parent)?;
        }

        let mut lock_name = path.file_name().unwrap_or_default().to_os_string();
        lock_name.push(".lock");

        Ok(Self {
            path: path.to_path_buf(),
            lock_path: path.with_file_name(lock_name),
        })
    }

    /// Path of the data file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open_lock_file(&self) -> Result<File> {
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&self.lock_path)?;
        Ok(file)
    }

    fn read_entries(&self) -> Result<Entries> {
        if !self.path.exists() {
            return Ok(Entries::new());
        }
        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(Entries::new());
        }
        Ok(serde_json::from_str(&content)?)
    }

    fn write_entries(&self, entries: &Entries) -> Result<()> {
        let dir = non_empty_parent(&self.path).unwrap_or_else(|| Path::new("."));
        let content = serde_json::to_string_pretty(entries)?;

        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(content.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }

    /// Read-modify-write under the exclusive lock.
    ///
    /// A data file that is not valid JSON is replaced rather than blocking
    /// every future write. Any other read failure aborts the write and leaves
    /// the file untouched.
    fn modify(&self, f: impl FnOnce(&mut Entries)) -> Result<()> {
        let lock = self.open_lock_file()?;
        FileExt::lock_exclusive(&lock)?;

        let result = (|| {
            let mut entries = match self.read_entries() {
                Ok(entries) => entries,
                Err(Error::Json(e)) => {
                    eprintln!(
                        "[wallet-state] Replacing unreadable state file {:?}: {}",
                        self.path, e
                    );
                    Entries::new()
                }
                Err(e) => return Err(e),
            };
            f(&mut entries);
            self.write_entries(&entries)
        })();

        FileExt::unlock(&lock)?;
        result
    }
}

fn non_empty_parent(path: &Path) -> Option<&Path> {
    path.parent().filter(|p| !p.as_os_str().is_empty())
}

impl Storage for JsonFileStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let lock = self.open_lock_file()?;
        FileExt::lock_shared(&lock)?;
        let entries = self.read_entries();
        FileExt::unlock(&lock)?;

        Ok(entries?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.modify(|entries| {
            entries.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> Result<()> {
        if !self.path.exists() {
            return Ok(());
        }
        self.modify(|entries| {
            entries.remove(key);
        })
    }
}
