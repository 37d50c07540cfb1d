//! Persistence for settings, the last selected mode and session history.
//!
//! Everything is stored as JSON documents under three keys in a
//! [`KeyValueStore`]. Reads never fail: missing or corrupt documents fall
//! back to defaults. Writes log and swallow errors so a full or broken store
//! never interrupts a session.

mod memory;
mod sqlite;
mod transfer;

use std::rc::Rc;

use serde::de::DeserializeOwned;
use tracing::{debug, error, warn};

use crate::error::StoreResult;
use crate::history::{TrainingHistory, FALLBACK_SESSIONS, MAX_SESSIONS};
use crate::mode::GameMode;
use crate::session::TrainingSession;
use crate::settings::GameSettings;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use transfer::{export_file_name, ExportDocument, ImportSummary};

pub const SETTINGS_KEY: &str = "reticle-settings";
pub const HISTORY_KEY: &str = "reticle-history";
pub const LAST_MODE_KEY: &str = "reticle-last-mode";

/// String key/value backend
pub trait KeyValueStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> StoreResult<()>;
}

pub trait SettingsStore {
    fn load(&self) -> GameSettings;
    fn save(&self, settings: &GameSettings);
    fn load_last_mode(&self) -> Option<GameMode>;
    fn save_last_mode(&self, mode: GameMode);
}

pub trait HistoryStore {
    fn load_all(&self) -> TrainingHistory;
    fn append(&self, session: &TrainingSession);
    fn clear(&self);
    fn replace(&self, history: &TrainingHistory);
}

/// Typed view over a [`KeyValueStore`].
///
/// Clones share the same backend, so one handle can serve as the engine's
/// settings store and another as its history store.
#[derive(Clone)]
pub struct Storage {
    kv: Rc<dyn KeyValueStore>,
}

impl Storage {
    pub fn new<S: KeyValueStore + 'static>(kv: S) -> Self {
        Self { kv: Rc::new(kv) }
    }

    pub fn in_memory() -> Self {
        Self::new(MemoryStore::new())
    }

    /// Open the on-disk database, falling back to memory when it cannot be used.
    pub fn open_default() -> Self {
        match SqliteStore::open_default() {
            Ok(db) => Self::new(db),
            Err(e) => {
                warn!("storage unavailable, history will not persist: {e}");
                Self::in_memory()
            }
        }
    }

    fn read<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        match self.kv.get(key) {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(value) => value,
                Err(e) => {
                    warn!(key, "discarding unreadable document: {e}");
                    T::default()
                }
            },
            Ok(None) => T::default(),
            Err(e) => {
                warn!(key, "read failed: {e}");
                T::default()
            }
        }
    }

    fn write_json<T: serde::Serialize>(&self, key: &str, value: &T) -> StoreResult<()> {
        let raw = serde_json::to_string(value)?;
        self.kv.set(key, &raw)
    }

    /// Keep the newest [`MAX_SESSIONS`]; if that is refused, retry with
    /// [`FALLBACK_SESSIONS`] before giving up.
    fn write_history(&self, history: &TrainingHistory) {
        let mut full = history.trimmed(MAX_SESSIONS);
        full.recompute_totals();
        let err = match self.write_json(HISTORY_KEY, &full) {
            Ok(()) => return,
            Err(e) => e,
        };
        warn!(
            sessions = full.sessions.len(),
            capacity = err.is_capacity(),
            "history write failed, retrying with {FALLBACK_SESSIONS} sessions: {err}"
        );

        let mut reduced = history.trimmed(FALLBACK_SESSIONS);
        reduced.recompute_totals();
        if let Err(e) = self.write_json(HISTORY_KEY, &reduced) {
            error!("history could not be saved: {e}");
        }
    }

    /// Pretty JSON snapshot of settings and history
    pub fn export_json(&self, now: chrono::DateTime<chrono::Utc>) -> StoreResult<String> {
        let doc = ExportDocument {
            export_date: now.to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
            settings: SettingsStore::load(self),
            history: self.load_all(),
        };
        Ok(serde_json::to_string_pretty(&doc)?)
    }

    /// Apply an exported document. Nothing is written unless the whole
    /// document parses.
    pub fn import_json(&self, raw: &str) -> StoreResult<ImportSummary> {
        let doc = transfer::parse_import(raw)?;
        let summary = ImportSummary {
            settings_imported: doc.settings.is_some(),
            sessions_imported: doc.history.as_ref().map_or(0, |h| h.sessions.len()),
        };

        if let Some(settings) = doc.settings {
            self.write_json(SETTINGS_KEY, &settings.sanitized())?;
        }
        if let Some(history) = doc.history {
            self.write_history(&history);
        }
        debug!(?summary, "import applied");
        Ok(summary)
    }

    /// One CSV row per stored session
    pub fn export_csv<W: std::io::Write>(&self, writer: W) -> StoreResult<()> {
        transfer::write_csv(&self.load_all(), writer)
    }
}

impl SettingsStore for Storage {
    fn load(&self) -> GameSettings {
        self.read::<GameSettings>(SETTINGS_KEY).sanitized()
    }

    fn save(&self, settings: &GameSettings) {
        if let Err(e) = self.write_json(SETTINGS_KEY, settings) {
            warn!("settings could not be saved: {e}");
        }
    }

    fn load_last_mode(&self) -> Option<GameMode> {
        self.read::<Option<GameMode>>(LAST_MODE_KEY)
    }

    fn save_last_mode(&self, mode: GameMode) {
        if let Err(e) = self.write_json(LAST_MODE_KEY, &mode) {
            warn!("last mode could not be saved: {e}");
        }
    }
}

impl HistoryStore for Storage {
    fn load_all(&self) -> TrainingHistory {
        self.read(HISTORY_KEY)
    }

    fn append(&self, session: &TrainingSession) {
        let mut history = self.load_all();
        history.push(session.clone());
        self.write_history(&history);
    }

    fn clear(&self) {
        if let Err(e) = self.write_json(HISTORY_KEY, &TrainingHistory::default()) {
            warn!("history could not be cleared: {e}");
        }
    }

    fn replace(&self, history: &TrainingHistory) {
        self.write_history(history);
    }
}
