//! Persisted trigger phrase to action target mapping.
//!
//! The primary file is a pretty-printed JSON object whose key order is the
//! insertion order of the store. Every mutation rewrites it whole, together
//! with a plain-text mirror (`<trigger> : <target>` per line). Writes replace
//! the file in place; a torn write is recovered by [`CommandStore::load`]
//! falling back to an empty store.

use crate::{CoreError, CoreResult, commands::ActionTarget};

use std::{fmt, fs, panic::Location, path::Path};

use error_location::ErrorLocation;
use serde_json::{Map, Value};
use tracing::{debug, info, instrument, warn};

/// Trigger phrase as stored (trimmed, original case kept).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerPhrase(String);

impl TriggerPhrase {
    /// Build a trigger from user input, rejecting blank phrases.
    #[track_caller]
    pub fn new(raw: &str) -> CoreResult<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(CoreError::EmptyTrigger {
                location: ErrorLocation::from(Location::caller()),
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    /// The key exactly as it is written to disk.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lower-cased, trimmed form used for matching.
    pub fn normalized(&self) -> String {
        normalize(&self.0)
    }
}

impl fmt::Display for TriggerPhrase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lower-case and trim, the single normalization shared by triggers and queries.
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Ordered mapping of trigger phrase to action target.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandStore {
    entries: Vec<(TriggerPhrase, ActionTarget)>,
}

impl CommandStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&TriggerPhrase, &ActionTarget)> {
        self.entries.iter().map(|(t, a)| (t, a))
    }

    /// Target bound to a trigger.
    ///
    /// The exact stored key wins; otherwise the earliest entry whose
    /// normalized trigger matches.
    pub fn get(&self, trigger: &str) -> Option<&ActionTarget> {
        self.position(trigger).map(|i| &self.entries[i].1)
    }

    /// Insert or overwrite the entry stored under exactly this key.
    ///
    /// Keys differing only in case are distinct entries. An existing key
    /// keeps its position. Returns `true` when a new entry was appended.
    pub fn upsert(&mut self, trigger: TriggerPhrase, target: ActionTarget) -> bool {
        match self.entries.iter_mut().find(|(t, _)| *t == trigger) {
            Some(entry) => {
                entry.1 = target;
                false
            }
            None => {
                self.entries.push((trigger, target));
                true
            }
        }
    }

    /// Point the entry found by [`get`](Self::get) at a new target, keeping
    /// its stored key and position.
    ///
    /// Returns `false` when no entry matched.
    pub fn retarget(&mut self, trigger: &str, target: ActionTarget) -> bool {
        match self.position(trigger) {
            Some(i) => {
                self.entries[i].1 = target;
                true
            }
            None => false,
        }
    }

    /// Remove the entry found by [`get`](Self::get).
    ///
    /// Returns the removed target, `None` when nothing matched.
    pub fn remove(&mut self, trigger: &str) -> Option<ActionTarget> {
        self.position(trigger).map(|i| self.entries.remove(i).1)
    }

    fn position(&self, trigger: &str) -> Option<usize> {
        let exact = trigger.trim();
        self.entries
            .iter()
            .position(|(t, _)| t.as_str() == exact)
            .or_else(|| {
                let wanted = normalize(trigger);
                self.entries.iter().position(|(t, _)| t.normalized() == wanted)
            })
    }

    /// Read the primary file.
    ///
    /// A missing file is an empty store. Malformed content is `CorruptStore`.
    #[track_caller]
    #[instrument]
    pub fn read(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            debug!(path = ?path, "No command file, starting empty");
            return Ok(Self::new());
        }

        let contents = fs::read_to_string(path)?;

        let object: Map<String, Value> =
            serde_json::from_str(&contents).map_err(|e| CoreError::CorruptStore {
                reason: e.to_string(),
                location: ErrorLocation::from(Location::caller()),
            })?;

        let mut store = Self::new();
        for (key, value) in object {
            let Value::String(raw_target) = value else {
                return Err(CoreError::CorruptStore {
                    reason: format!("target for '{}' is not a string", key),
                    location: ErrorLocation::from(Location::caller()),
                });
            };

            // Blank keys cannot be matched or edited; skip rather than fail.
            let Ok(trigger) = TriggerPhrase::new(&key) else {
                warn!("Skipping blank trigger in command file");
                continue;
            };

            store.upsert(trigger, ActionTarget::parse(&raw_target));
        }

        Ok(store)
    }

    /// Read the primary file, downgrading any failure to an empty store.
    #[instrument]
    pub fn load(path: &Path) -> Self {
        match Self::read(path) {
            Ok(store) => {
                info!(path = ?path, entries = store.len(), "Command store loaded");
                store
            }
            Err(e) => {
                warn!(path = ?path, error = %e, "Command store unreadable, using empty store");
                Self::new()
            }
        }
    }

    /// Rewrite the primary file with the whole store.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn save_all(&self, path: &Path) -> CoreResult<()> {
        let object: Map<String, Value> = self
            .entries
            .iter()
            .map(|(t, a)| (t.as_str().to_string(), Value::String(a.encode())))
            .collect();

        let contents =
            serde_json::to_string_pretty(&object).map_err(|e| CoreError::Serialization {
                reason: e.to_string(),
                location: ErrorLocation::from(Location::caller()),
            })?;

        ensure_parent(path)?;
        fs::write(path, contents)?;

        debug!(path = ?path, entries = self.entries.len(), "Command store saved");

        Ok(())
    }

    /// Human-readable mirror, one `<trigger> : <target>` line per entry.
    pub fn export(&self) -> String {
        self.entries
            .iter()
            .map(|(t, a)| format!("{} : {}\n", t, a))
            .collect()
    }

    /// Rewrite the mirror file.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn write_export(&self, path: &Path) -> CoreResult<()> {
        ensure_parent(path)?;
        fs::write(path, self.export())?;
        debug!(path = ?path, "Command export written");
        Ok(())
    }
}

#[track_caller]
fn ensure_parent(path: &Path) -> CoreResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}
