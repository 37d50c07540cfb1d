use serde::{Deserialize, Serialize};

pub const MIN_DPI: u32 = 100;
pub const MIN_SENSITIVITY: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, strum_macros::Display)]
#[serde(rename_all = "lowercase")]
pub enum TargetSize {
    Small,
    #[default]
    Medium,
    Large,
}

impl TargetSize {
    /// Base radius in pixels
    pub fn radius_px(&self) -> f64 {
        match self {
            TargetSize::Small => 15.0,
            TargetSize::Medium => 25.0,
            TargetSize::Large => 40.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, strum_macros::Display)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DifficultyMultipliers {
    pub lifetime: f64,
    pub speed: f64,
    pub size: f64,
}

impl Difficulty {
    pub fn multipliers(&self) -> DifficultyMultipliers {
        match self {
            Difficulty::Easy => DifficultyMultipliers {
                lifetime: 1.5,
                speed: 0.7,
                size: 1.3,
            },
            Difficulty::Medium => DifficultyMultipliers {
                lifetime: 1.0,
                speed: 1.0,
                size: 1.0,
            },
            Difficulty::Hard => DifficultyMultipliers {
                lifetime: 0.7,
                speed: 1.4,
                size: 0.8,
            },
        }
    }
}

/// User-owned settings, persisted as camelCase JSON.
///
/// Missing fields fall back to [`GameSettings::default`] when deserializing,
/// so older or partial documents still load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GameSettings {
    pub dpi: u32,
    pub valorant_sens: f64,
    pub sound_enabled: bool,
    pub target_size: TargetSize,
    pub difficulty: Difficulty,
    pub show_stats: bool,
    pub crosshair_color: String,
    pub crosshair_size: u32,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            dpi: 800,
            valorant_sens: 0.35,
            sound_enabled: false,
            target_size: TargetSize::Medium,
            difficulty: Difficulty::Medium,
            show_stats: true,
            crosshair_color: "#ffffff".to_string(),
            crosshair_size: 4,
        }
    }
}

impl GameSettings {
    pub fn sensitivity(&self) -> f64 {
        self.valorant_sens
    }

    pub fn edpi(&self) -> f64 {
        crate::sensitivity::effective_dpi(self.dpi as f64, self.valorant_sens)
    }

    /// Apply a DPI typed by the user; unparseable input keeps the current value.
    pub fn apply_dpi_input(&mut self, raw: &str) {
        if let Ok(dpi) = raw.trim().parse::<f64>() {
            if dpi.is_finite() {
                self.dpi = (dpi.round().max(MIN_DPI as f64)).min(u32::MAX as f64) as u32;
            }
        }
    }

    /// Apply a sensitivity typed by the user; unparseable input keeps the current value.
    pub fn apply_sensitivity_input(&mut self, raw: &str) {
        if let Ok(sens) = raw.trim().parse::<f64>() {
            if sens.is_finite() {
                self.valorant_sens = sens.max(MIN_SENSITIVITY);
            }
        }
    }

    /// Bring values loaded from storage back inside the accepted ranges.
    pub fn sanitized(mut self) -> Self {
        self.dpi = self.dpi.max(MIN_DPI);
        if !self.valorant_sens.is_finite() {
            self.valorant_sens = GameSettings::default().valorant_sens;
        }
        self.valorant_sens = self.valorant_sens.max(MIN_SENSITIVITY);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let s = GameSettings::default();
        assert_eq!(s.dpi, 800);
        assert_eq!(s.valorant_sens, 0.35);
        assert_eq!(s.edpi(), 280.0);
        assert!(!s.sound_enabled);
        assert!(s.show_stats);
    }

    #[test]
    fn test_partial_json_merges_defaults() {
        let s: GameSettings = serde_json::from_str(r#"{"dpi": 1600, "difficulty": "hard"}"#).unwrap();
        assert_eq!(s.dpi, 1600);
        assert_eq!(s.difficulty, Difficulty::Hard);
        assert_eq!(s.valorant_sens, 0.35);
        assert_eq!(s.target_size, TargetSize::Medium);
        assert_eq!(s.crosshair_color, "#ffffff");
    }

    #[test]
    fn test_json_uses_camel_case() {
        let json = serde_json::to_value(GameSettings::default()).unwrap();
        assert_eq!(json["valorantSens"], 0.35);
        assert_eq!(json["targetSize"], "medium");
        assert_eq!(json["showStats"], true);
        assert_eq!(json["crosshairSize"], 4);
    }

    #[test]
    fn test_dpi_input() {
        let mut s = GameSettings::default();
        s.apply_dpi_input("1600");
        assert_eq!(s.dpi, 1600);
        s.apply_dpi_input("abc");
        assert_eq!(s.dpi, 1600);
        s.apply_dpi_input("20");
        assert_eq!(s.dpi, MIN_DPI);
        s.apply_dpi_input("");
        assert_eq!(s.dpi, MIN_DPI);
    }

    #[test]
    fn test_sensitivity_input() {
        let mut s = GameSettings::default();
        s.apply_sensitivity_input("0.5");
        assert_eq!(s.valorant_sens, 0.5);
        s.apply_sensitivity_input("fast");
        assert_eq!(s.valorant_sens, 0.5);
        s.apply_sensitivity_input("0");
        assert_eq!(s.valorant_sens, MIN_SENSITIVITY);
        s.apply_sensitivity_input("NaN");
        assert_eq!(s.valorant_sens, MIN_SENSITIVITY);
    }

    #[test]
    fn test_sanitized() {
        let s = GameSettings {
            dpi: 5,
            valorant_sens: -1.0,
            ..GameSettings::default()
        }
        .sanitized();
        assert_eq!(s.dpi, MIN_DPI);
        assert_eq!(s.valorant_sens, MIN_SENSITIVITY);
    }

    #[test]
    fn test_difficulty_multipliers() {
        assert_eq!(Difficulty::Easy.multipliers().size, 1.3);
        assert_eq!(Difficulty::Hard.multipliers().lifetime, 0.7);
        assert_eq!(Difficulty::Medium.multipliers().speed, 1.0);
    }
}
