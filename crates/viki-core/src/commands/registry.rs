use crate::{
    CoreError, CoreResult,
    commands::{ActionTarget, CommandStore, Resolution, TriggerPhrase, resolve},
};

use std::{
    panic::Location,
    path::{Path, PathBuf},
    sync::{RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use error_location::ErrorLocation;
use tracing::{error, info, instrument};

/// The single authoritative command store.
///
/// Mutations come from the UI side, reads from worker threads. The store is
/// loaded once in [`CommandRegistry::open`] and never re-read from disk;
/// every mutation writes the primary file and the mirror through.
pub struct CommandRegistry {
    store: RwLock<CommandStore>,
    primary_path: PathBuf,
    export_path: PathBuf,
}

impl CommandRegistry {
    /// Load the store from `primary_path`, tolerating a corrupt file.
    #[instrument]
    pub fn open(primary_path: &Path, export_path: &Path) -> Self {
        let store = CommandStore::load(primary_path);
        Self::with_store(store, primary_path, export_path)
    }

    /// Wrap an already loaded store.
    pub fn with_store(store: CommandStore, primary_path: &Path, export_path: &Path) -> Self {
        Self {
            store: RwLock::new(store),
            primary_path: primary_path.to_path_buf(),
            export_path: export_path.to_path_buf(),
        }
    }

    /// Resolve a query against the current store contents.
    pub fn resolve(&self, query: &str) -> Resolution {
        resolve(&self.read(), query)
    }

    /// Copy of the current store.
    pub fn snapshot(&self) -> CommandStore {
        self.read().clone()
    }

    /// Add a command, overwriting the target stored under the same key.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn add(&self, trigger: &str, target: &str) -> CoreResult<()> {
        let trigger = TriggerPhrase::new(trigger)?;
        let target = ActionTarget::parse(target.trim());

        let mut store = self.write();
        let appended = store.upsert(trigger.clone(), target);
        self.persist(&store)?;

        info!(trigger = %trigger, appended, "Command saved");
        Ok(())
    }

    /// Change the target of an existing trigger.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn update(&self, trigger: &str, target: &str) -> CoreResult<()> {
        let trigger = TriggerPhrase::new(trigger)?;
        let target = ActionTarget::parse(target.trim());

        let mut store = self.write();
        if !store.retarget(trigger.as_str(), target) {
            return Err(CoreError::CommandNotFound {
                trigger: trigger.to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }
        self.persist(&store)?;

        info!(trigger = %trigger, "Command updated");
        Ok(())
    }

    /// Remove a trigger.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn delete(&self, trigger: &str) -> CoreResult<()> {
        let mut store = self.write();
        if store.remove(trigger).is_none() {
            return Err(CoreError::CommandNotFound {
                trigger: trigger.trim().to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }
        self.persist(&store)?;

        info!(trigger = %trigger.trim(), "Command deleted");
        Ok(())
    }

    /// Path of the JSON primary file.
    pub fn primary_path(&self) -> &Path {
        &self.primary_path
    }

    /// Path of the plain-text mirror.
    pub fn export_path(&self) -> &Path {
        &self.export_path
    }

    // Called with the write guard held so concurrent edits serialize on disk.
    #[track_caller]
    fn persist(&self, store: &CommandStore) -> CoreResult<()> {
        store.save_all(&self.primary_path).inspect_err(|e| {
            error!(error = %e, "Failed to save command store");
        })?;
        store.write_export(&self.export_path).inspect_err(|e| {
            error!(error = %e, "Failed to write command export");
        })
    }

    fn read(&self) -> RwLockReadGuard<'_, CommandStore> {
        self.store.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, CommandStore> {
        self.store.write().unwrap_or_else(|e| e.into_inner())
    }
}
