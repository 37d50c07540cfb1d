//! Scoring fold over hit, miss and timeout events.
//!
//! `GameStats` is treated as an immutable snapshot: every `record_*` call
//! returns a new value and leaves the input untouched.

use serde::{Deserialize, Serialize};

use crate::util::{as_samples, average};

/// Reaction times at or below this earn the full hit bonus.
pub const FAST_REACTION_MS: u64 = 200;
pub const MAX_HIT_BONUS: f64 = 100.0;
/// Points lost per millisecond over [`FAST_REACTION_MS`].
pub const HIT_DECAY_PER_MS: f64 = 0.5;
pub const MISS_PENALTY: u64 = 25;
pub const TIMEOUT_PENALTY: u64 = 10;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStats {
    pub hits: u32,
    pub misses: u32,
    pub total_shots: u32,
    pub accuracy: f64,
    pub average_reaction_time: u64,
    pub reaction_times: Vec<u64>,
    pub score: u64,
}

/// Accuracy as a percentage with one decimal place.
pub fn accuracy(hits: u32, total_shots: u32) -> f64 {
    if total_shots == 0 {
        return 0.0;
    }
    (hits as f64 / total_shots as f64 * 1000.0).round() / 10.0
}

/// Bonus for a single hit: full marks up to 200ms, then linear decay to zero.
pub fn hit_bonus(reaction_time_ms: u64) -> u64 {
    let late_ms = reaction_time_ms.saturating_sub(FAST_REACTION_MS) as f64;
    (MAX_HIT_BONUS - late_ms * HIT_DECAY_PER_MS).max(0.0).round() as u64
}

impl GameStats {
    pub fn initial() -> Self {
        Self::default()
    }

    pub fn record_hit(&self, reaction_time_ms: u64) -> Self {
        let mut reaction_times = self.reaction_times.clone();
        reaction_times.push(reaction_time_ms);
        let hits = self.hits + 1;
        let total_shots = self.total_shots + 1;

        Self {
            hits,
            misses: self.misses,
            total_shots,
            accuracy: accuracy(hits, total_shots),
            average_reaction_time: average(&as_samples(&reaction_times)) as u64,
            reaction_times,
            score: self.score + hit_bonus(reaction_time_ms),
        }
    }

    pub fn record_miss(&self) -> Self {
        let total_shots = self.total_shots + 1;

        Self {
            misses: self.misses + 1,
            total_shots,
            accuracy: accuracy(self.hits, total_shots),
            score: self.score.saturating_sub(MISS_PENALTY),
            ..self.clone()
        }
    }

    /// A target expiring unclicked counts as a miss but not as a shot.
    pub fn record_timeout(&self) -> Self {
        Self {
            misses: self.misses + 1,
            score: self.score.saturating_sub(TIMEOUT_PENALTY),
            ..self.clone()
        }
    }

    pub fn rating(&self) -> Rating {
        Rating::from_stats(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Rating {
    S,
    A,
    B,
    C,
    D,
    F,
}

impl Rating {
    /// Blend of accuracy (60%) and reaction speed (40%).
    ///
    /// Reaction scores 100 at 200ms and reaches 0 at 500ms.
    pub fn combined_score(accuracy: f64, average_reaction_ms: f64) -> f64 {
        let reaction_score = (100.0 - (average_reaction_ms - 200.0) / 3.0).clamp(0.0, 100.0);
        accuracy * 0.6 + reaction_score * 0.4
    }

    pub fn from_score(combined: f64) -> Self {
        if combined >= 90.0 {
            Rating::S
        } else if combined >= 80.0 {
            Rating::A
        } else if combined >= 70.0 {
            Rating::B
        } else if combined >= 60.0 {
            Rating::C
        } else if combined >= 50.0 {
            Rating::D
        } else {
            Rating::F
        }
    }

    pub fn from_stats(stats: &GameStats) -> Self {
        Rating::from_score(Rating::combined_score(
            stats.accuracy,
            stats.average_reaction_time as f64,
        ))
    }

    pub fn description(&self) -> &'static str {
        match self {
            Rating::S => "Outstanding",
            Rating::A => "Excellent",
            Rating::B => "Good",
            Rating::C => "Average",
            Rating::D => "Below Average",
            Rating::F => "Needs Practice",
        }
    }
}
