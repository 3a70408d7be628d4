use std::{
    fs, io,
    io::Write,
    path::{Path, PathBuf},
    time::{SystemTime, UNIX_EPOCH},
};

use directories::ProjectDirs;
use log::{debug, info, warn};
use tempfile::NamedTempFile;

use super::profile::Profile;
use crate::core::errors::StoreError;

pub const STORE_FILE_NAME: &str = "connections.json";

/// The whole profile list, kept as one JSON array in one file.
#[derive(Debug, Clone)]
pub struct ProfileStore {
    path: PathBuf,
}

impl ProfileStore {
    /// `~/.config/objprobe/connections.json` on Linux, `%APPDATA%\objprobe\config\connections.json` on Windows, etc.
    ///
    /// Unlike [`ProfileStore::save_all`] this does not touch the filesystem.
    pub fn new() -> Result<Self, StoreError> {
        let proj = ProjectDirs::from("", "", "objprobe").ok_or(StoreError::NoConfigDir)?;
        Ok(Self::in_dir(proj.config_dir()))
    }

    /// A store file named `connections.json` inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::at(dir.as_ref().join(STORE_FILE_NAME))
    }

    /// A store at an explicit file path.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn dir(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }

    /// Returns `None` if nothing was ever saved (or the file holds `null`).
    pub fn read_all(&self) -> Result<Option<Vec<Profile>>, StoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No store at {:?}", self.path);
                return Ok(None);
            }
            Err(e) => return Err(StoreError::io(&self.path, e)),
        };
        serde_json::from_str(&content).map_err(|source| StoreError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    /// Same as [`ProfileStore::read_all`] with "absent" flattened to an empty list.
    pub fn list(&self) -> Result<Vec<Profile>, StoreError> {
        Ok(self.read_all()?.unwrap_or_default())
    }

    pub fn has_any(&self) -> Result<bool, StoreError> {
        Ok(self.read_all()?.is_some_and(|profiles| !profiles.is_empty()))
    }

    /// Creates the containing directory if it is missing.
    /// Returns `true` when it had to be created.
    pub fn ensure_dir(&self) -> Result<bool, StoreError> {
        let dir = self.dir();
        if dir.is_dir() {
            return Ok(false);
        }
        info!("Creating store directory {:?}", dir);
        fs::create_dir_all(dir).map_err(|e| StoreError::io(dir, e))?;
        Ok(true)
    }

    /// Replace the stored list with `profiles`.
    ///
    /// The JSON is written to a temporary file next to the store and renamed
    /// over it, so the store is either the old or the new snapshot.
    pub fn save_all(&self, profiles: &[Profile]) -> Result<(), StoreError> {
        self.ensure_dir()?;
        let dir = self.dir();

        let mut tmp = NamedTempFile::new_in(dir).map_err(|e| StoreError::io(dir, e))?;
        serde_json::to_writer_pretty(tmp.as_file_mut(), profiles)
            .map_err(|e| StoreError::io(tmp.path(), e.into()))?;
        tmp.as_file_mut()
            .flush()
            .and_then(|()| tmp.as_file().sync_all())
            .map_err(|e| StoreError::io(tmp.path(), e))?;
        tmp.persist(&self.path)
            .map_err(|e| StoreError::io(&self.path, e.error))?;

        info!("Saved {} connection(s) to {:?}", profiles.len(), self.path);
        Ok(())
    }

    /// Moves a (corrupt) store file out of the way so a fresh one can be started.
    /// Returns the new location, or `None` if there was no file. An earlier
    /// quarantined file is never overwritten.
    pub fn quarantine(&self) -> Result<Option<PathBuf>, StoreError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        let base = format!(".corrupt-{stamp}");
        let mut target = self.sibling(&base);
        let mut n = 0u32;
        while target.exists() {
            n += 1;
            target = self.sibling(&format!("{base}-{n}"));
        }

        fs::rename(&self.path, &target).map_err(|e| StoreError::io(&self.path, e))?;
        warn!("Moved corrupt store {:?} to {:?}", self.path, target);
        Ok(Some(target))
    }

    /// The store path with `suffix` appended to the file name.
    fn sibling(&self, suffix: &str) -> PathBuf {
        let mut name = self.path.clone().into_os_string();
        name.push(suffix);
        PathBuf::from(name)
    }
}
