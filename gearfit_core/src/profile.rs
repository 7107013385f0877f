//! User profile persistence with file locking.
//!
//! The profile stores the raw equipment sources of the local user. A missing
//! or unreadable profile is never fatal: callers get `None` and carry on with
//! an empty set of sources.

use crate::{resolve, CanonicalEquipmentSet, Error, RawEquipmentSources, Result, UserProfile};
use chrono::Utc;
use fs2::FileExt;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use uuid::Uuid;

impl UserProfile {
    /// A new profile with fresh id
    pub fn new(sources: RawEquipmentSources) -> Self {
        Self {
            id: Uuid::new_v4(),
            updated_at: Utc::now(),
            sources,
        }
    }

    /// Canonical equipment, recomputed from the current sources on every call
    pub fn canonical_equipment(&self) -> CanonicalEquipmentSet {
        resolve(&self.sources)
    }

    /// Replace the sources and bump `updated_at`
    pub fn update_sources<F>(&mut self, f: F)
    where
        F: FnOnce(&mut RawEquipmentSources),
    {
        f(&mut self.sources);
        self.updated_at = Utc::now();
    }

    /// Load a profile from a file with shared locking
    ///
    /// Returns None if the file doesn't exist.
    /// If the file is unreadable or corrupted, logs a warning and returns None.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            tracing::debug!("No profile found at {:?}", path);
            return Ok(None);
        }

        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) => {
                tracing::warn!("Unable to open profile {:?}: {}. Ignoring it.", path, e);
                return Ok(None);
            }
        };

        if let Err(e) = file.lock_shared() {
            tracing::warn!("Unable to lock profile {:?}: {}. Ignoring it.", path, e);
            return Ok(None);
        }

        let mut contents = String::new();
        let mut reader = std::io::BufReader::new(&file);
        if let Err(e) = reader.read_to_string(&mut contents) {
            let _ = file.unlock();
            tracing::warn!("Failed to read profile {:?}: {}. Ignoring it.", path, e);
            return Ok(None);
        }

        file.unlock()?;

        match serde_json::from_str::<UserProfile>(&contents) {
            Ok(profile) => {
                tracing::debug!("Loaded profile {} from {:?}", profile.id, path);
                Ok(Some(profile))
            }
            Err(e) => {
                tracing::warn!("Failed to parse profile {:?}: {}. Ignoring it.", path, e);
                Ok(None)
            }
        }
    }

    /// Save the profile with exclusive locking
    ///
    /// Writes to a temp file in the same directory, syncs it, then renames it
    /// over the original.
    pub fn save(&self, path: &Path) -> Result<()> {
        let parent = path
            .parent()
            .ok_or_else(|| Error::Profile(format!("path {:?} has no parent directory", path)))?;
        std::fs::create_dir_all(parent)?;

        let temp = NamedTempFile::new_in(parent)?;
        temp.as_file().lock_exclusive()?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            let contents = serde_json::to_string_pretty(self)?;
            writer.write_all(contents.as_bytes())?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;

        temp.persist(path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Saved profile {} to {:?}", self.id, path);
        Ok(())
    }
}
