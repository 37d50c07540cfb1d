use serde::{Deserialize, Serialize};

use crate::mode::GameMode;
use crate::settings::GameSettings;
use crate::stats::GameStats;

#[derive(Debug, Clone, Default)]
pub struct SessionConfig {
    /// Ends the session automatically once elapsed time reaches this
    pub session_length_ms: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, strum_macros::Display)]
pub enum SessionState {
    #[default]
    Idle,
    Playing,
    Paused,
    Finished,
}

/// Record of one completed session, written once at session end
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingSession {
    pub id: String,
    pub mode: GameMode,
    pub start_time: u64,
    pub end_time: u64,
    pub duration: u64,
    pub stats: GameStats,
    pub settings: GameSettings,
}
