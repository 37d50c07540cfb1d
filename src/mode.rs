use serde::{Deserialize, Serialize};

/// Training mode selected before a session starts
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    Reaction,
    #[default]
    Flick,
    Tracking,
    #[serde(rename = "gridshot")]
    #[strum(to_string = "GridShot")]
    GridShot,
    #[serde(rename = "headshot")]
    #[strum(to_string = "HeadshotLine")]
    HeadshotLine,
}

/// Static per-mode tuning
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModeConfig {
    pub name: &'static str,
    pub description: &'static str,
    pub target_count: usize,
    pub target_lifetime_ms: u64,
    pub spawn_interval_ms: u64,
    pub moving_targets: bool,
}

const REACTION: ModeConfig = ModeConfig {
    name: "Reaction",
    description: "Test your reaction speed",
    target_count: 1,
    target_lifetime_ms: 3000,
    spawn_interval_ms: 1500,
    moving_targets: false,
};

const FLICK: ModeConfig = ModeConfig {
    name: "Flick Shot",
    description: "Quick target acquisition",
    target_count: 1,
    target_lifetime_ms: 2000,
    spawn_interval_ms: 0,
    moving_targets: false,
};

const TRACKING: ModeConfig = ModeConfig {
    name: "Tracking",
    description: "Follow moving targets",
    target_count: 1,
    target_lifetime_ms: 5000,
    spawn_interval_ms: 100,
    moving_targets: true,
};

const GRID_SHOT: ModeConfig = ModeConfig {
    name: "Grid Shot",
    description: "Multiple target switching",
    target_count: 3,
    target_lifetime_ms: 5000,
    spawn_interval_ms: 300,
    moving_targets: false,
};

const HEADSHOT_LINE: ModeConfig = ModeConfig {
    name: "Headshot Line",
    description: "Practice crosshair placement",
    target_count: 1,
    target_lifetime_ms: 2500,
    spawn_interval_ms: 0,
    moving_targets: false,
};

impl GameMode {
    /// Selection order, also used for the 1-5 hotkeys
    pub const ALL: [GameMode; 5] = [
        GameMode::Reaction,
        GameMode::Flick,
        GameMode::Tracking,
        GameMode::GridShot,
        GameMode::HeadshotLine,
    ];

    pub fn config(&self) -> &'static ModeConfig {
        match self {
            GameMode::Reaction => &REACTION,
            GameMode::Flick => &FLICK,
            GameMode::Tracking => &TRACKING,
            GameMode::GridShot => &GRID_SHOT,
            GameMode::HeadshotLine => &HEADSHOT_LINE,
        }
    }

    /// 1-based hotkey index
    pub fn from_hotkey(n: u32) -> Option<GameMode> {
        n.checked_sub(1)
            .and_then(|i| GameMode::ALL.get(i as usize))
            .copied()
    }

    pub fn key(&self) -> &'static str {
        match self {
            GameMode::Reaction => "reaction",
            GameMode::Flick => "flick",
            GameMode::Tracking => "tracking",
            GameMode::GridShot => "gridshot",
            GameMode::HeadshotLine => "headshot",
        }
    }
}
