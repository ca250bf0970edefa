// src/store.rs
use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use atomic_write_file::AtomicWriteFile;
use serde::{Serialize, de::DeserializeOwned};

use crate::card::CatalogEntry;
use crate::config::{consts::BACKUP_SUFFIX, options::{SetDef, StoreOptions}};
use crate::error::StoreError;

/// Load/save hooks the merge pipeline runs against.
/// `save` must leave a copy of the previous content before replacing it.
pub trait CatalogStore {
    fn load(&self, set_key: &str) -> Result<Vec<CatalogEntry>, StoreError>;
    fn save(&self, set_key: &str, entries: &[CatalogEntry]) -> Result<(), StoreError>;
}

/// One pretty-printed JSON array per set, all in one directory.
pub struct JsonStore {
    dir: PathBuf,
    sets: Vec<SetDef>,
}

impl JsonStore {
    pub fn new(dir: impl Into<PathBuf>, sets: Vec<SetDef>) -> Self {
        Self { dir: dir.into(), sets }
    }

    pub fn from_options(opts: &StoreOptions) -> Self {
        Self::new(opts.data_dir.clone(), opts.sets.clone())
    }

    pub fn path_for(&self, set_key: &str) -> Result<PathBuf, StoreError> {
        self.sets
            .iter()
            .find(|s| s.key == set_key)
            .map(|s| self.dir.join(&s.file))
            .ok_or_else(|| StoreError::UnknownSet(set_key.to_string()))
    }
}

impl CatalogStore for JsonStore {
    fn load(&self, set_key: &str) -> Result<Vec<CatalogEntry>, StoreError> {
        let path = self.path_for(set_key)?;
        let entries: Vec<CatalogEntry> = read_json(&path)?;
        logf!("Store: Loaded {} entries from {}", entries.len(), path.display());
        Ok(entries)
    }

    fn save(&self, set_key: &str, entries: &[CatalogEntry]) -> Result<(), StoreError> {
        let path = self.path_for(set_key)?;
        write_json_with_backup(&path, &entries)?;
        logf!("Store: Saved {} entries → {}", entries.len(), path.display());
        Ok(())
    }
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, StoreError> {
    let text = match fs::read_to_string(path) {
        Ok(t) => t,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(StoreError::Missing(path.to_path_buf()));
        }
        Err(e) => return Err(StoreError::io(path, e)),
    };
    serde_json::from_str(&text).map_err(|e| StoreError::json(path, e))
}

/// Back up `path` (if present), then replace it with `value` as pretty JSON.
/// Returns the backup path when one was made.
pub fn write_json_with_backup<T: Serialize + ?Sized>(
    path: &Path,
    value: &T,
) -> Result<Option<PathBuf>, StoreError> {
    let mut guard = BackupGuard::acquire(path)?;
    guard.write_json(value)?;
    guard.commit()
}

/// `riftbound_origins.json` → `riftbound_origins_backup.json`
pub fn backup_path(path: &Path) -> PathBuf {
    let stem = path.file_stem().map(|s| s.to_string_lossy()).unwrap_or_default();
    let ext = path.extension().map(|s| s.to_string_lossy()).unwrap_or("json".into());
    path.with_file_name(format!("{stem}{BACKUP_SUFFIX}.{ext}"))
}

/// Scoped write intent on one file.
///
/// `acquire` copies the current content to the backup path and opens a
/// staging file next to the target. Nothing touches the target until
/// `commit`, which renames the staging file over it. Dropping the guard
/// without committing discards the staging file; the backup stays.
pub struct BackupGuard {
    target: PathBuf,
    backup: Option<PathBuf>,
    staged: AtomicWriteFile,
}

impl BackupGuard {
    pub fn acquire(target: &Path) -> Result<Self, StoreError> {
        ensure_parent(target)?;

        let backup = if target.is_file() {
            let bak = backup_path(target);
            fs::copy(target, &bak).map_err(|e| StoreError::io(&bak, e))?;
            logd!("Store: Backup {} → {}", target.display(), bak.display());
            Some(bak)
        } else {
            None
        };

        let staged = AtomicWriteFile::open(target).map_err(|e| StoreError::io(target, e))?;
        Ok(Self { target: target.to_path_buf(), backup, staged })
    }

    pub fn backup(&self) -> Option<&Path> {
        self.backup.as_deref()
    }

    pub fn write_json<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), StoreError> {
        serde_json::to_writer_pretty(&mut self.staged, value)
            .map_err(|e| StoreError::json(&self.target, e))?;
        self.staged
            .write_all(b"\n")
            .and_then(|_| self.staged.flush())
            .map_err(|e| StoreError::io(&self.target, e))
    }

    pub fn commit(self) -> Result<Option<PathBuf>, StoreError> {
        let Self { target, backup, staged } = self;
        staged.commit().map_err(|e| StoreError::io(&target, e))?;
        Ok(backup)
    }
}

fn ensure_parent(path: &Path) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
        }
    }
    Ok(())
}
