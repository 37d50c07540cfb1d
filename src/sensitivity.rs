//! Conversions between mouse hardware settings and on-screen motion.
//!
//! The reference game rotates 0.07 degrees per mouse count with a fixed
//! 103 degree horizontal field of view, which gives the constant used for
//! cm/360: `914.4 / 0.07 = 13062.86`.

use std::fmt;

/// Degrees of yaw per mouse count in the reference game.
pub const REFERENCE_YAW: f64 = 0.07;

/// Horizontal field of view of the reference game, in degrees.
pub const REFERENCE_FOV: f64 = 103.0;

/// `cm/360 * eDPI` for the reference yaw.
pub const CM_360_CONSTANT: f64 = 13062.86;

/// Competitive eDPI band used for sensitivity recommendations.
pub const RECOMMENDED_EDPI: (f64, f64) = (200.0, 400.0);

/// eDPI treated as "one pixel per count" by [`simple_sensitivity`].
const AVERAGE_PRO_EDPI: f64 = 280.0;

/// Yaw values for converting sensitivities from other games.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum GameYaw {
    Valorant,
    #[strum(to_string = "CS2")]
    Cs2,
    Apex,
    Overwatch,
    Fortnite,
}

impl GameYaw {
    pub const ALL: [GameYaw; 5] = [
        GameYaw::Valorant,
        GameYaw::Cs2,
        GameYaw::Apex,
        GameYaw::Overwatch,
        GameYaw::Fortnite,
    ];

    pub fn degrees_per_count(&self) -> f64 {
        match self {
            GameYaw::Valorant => REFERENCE_YAW,
            GameYaw::Cs2 | GameYaw::Apex => 0.022,
            GameYaw::Overwatch => 0.0066,
            GameYaw::Fortnite => 0.5555,
        }
    }
}

/// eDPI = DPI × in-game sensitivity
pub fn effective_dpi(dpi: f64, sensitivity: f64) -> f64 {
    dpi * sensitivity
}

/// Physical mouse travel for a full turn. Infinite when eDPI is zero.
pub fn cm_per_360(dpi: f64, sensitivity: f64) -> f64 {
    let edpi = effective_dpi(dpi, sensitivity);
    if edpi == 0.0 {
        return f64::INFINITY;
    }
    CM_360_CONSTANT / edpi
}

pub fn in_per_360(dpi: f64, sensitivity: f64) -> f64 {
    cm_per_360(dpi, sensitivity) / 2.54
}

/// Multiplier turning raw device counts into on-screen pixels.
///
/// Degrees per count from the sensitivity times pixels per degree from the
/// viewport. The result goes stale whenever the viewport width or the
/// sensitivity changes, so callers must recompute it on either.
pub fn web_sensitivity_factor(sensitivity: f64, viewport_width: f64, fov: f64) -> f64 {
    let degrees_per_count = sensitivity * REFERENCE_YAW;
    let pixels_per_degree = viewport_width / fov;
    degrees_per_count * pixels_per_degree
}

/// eDPI-normalised factor: roughly one pixel per count at the average pro eDPI.
pub fn simple_sensitivity(dpi: f64, sensitivity: f64, base_multiplier: f64) -> f64 {
    effective_dpi(dpi, sensitivity) / AVERAGE_PRO_EDPI * base_multiplier
}

/// Sensitivity bounds that land the given DPI inside the competitive eDPI band.
pub fn recommended_range(dpi: f64) -> (f64, f64) {
    let (min_edpi, max_edpi) = RECOMMENDED_EDPI;
    (round3(min_edpi / dpi), round3(max_edpi / dpi))
}

/// Convert a sensitivity from another game into the reference game's units.
pub fn convert_sensitivity(source_sensitivity: f64, source_yaw: f64) -> f64 {
    source_sensitivity * source_yaw / REFERENCE_YAW
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensitivityClass {
    VeryLow,
    Low,
    MediumLow,
    Medium,
    MediumHigh,
    High,
}

impl SensitivityClass {
    /// Buckets are half-open: a value equal to a boundary belongs to the upper class.
    pub fn from_edpi(edpi: f64) -> Self {
        if edpi < 200.0 {
            SensitivityClass::VeryLow
        } else if edpi < 300.0 {
            SensitivityClass::Low
        } else if edpi < 400.0 {
            SensitivityClass::MediumLow
        } else if edpi < 600.0 {
            SensitivityClass::Medium
        } else if edpi < 800.0 {
            SensitivityClass::MediumHigh
        } else {
            SensitivityClass::High
        }
    }
}

impl fmt::Display for SensitivityClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SensitivityClass::VeryLow => "Very Low",
            SensitivityClass::Low => "Low (Pro Level)",
            SensitivityClass::MediumLow => "Medium-Low",
            SensitivityClass::Medium => "Medium",
            SensitivityClass::MediumHigh => "Medium-High",
            SensitivityClass::High => "High",
        };
        f.write_str(label)
    }
}

pub fn format_edpi(dpi: f64, sensitivity: f64) -> String {
    format!("{:.1}", effective_dpi(dpi, sensitivity))
}

pub fn format_cm360(dpi: f64, sensitivity: f64) -> String {
    let cm = cm_per_360(dpi, sensitivity);
    if cm.is_infinite() {
        return "∞".to_string();
    }
    format!("{cm:.2} cm")
}
