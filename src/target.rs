//! Target generation and per-frame motion.

use std::f64::consts::TAU;

use crate::mode::GameMode;
use crate::random::RandomSource;
use crate::settings::GameSettings;

/// Extra margin kept between a spawned target's edge and the viewport edge
pub const SPAWN_MARGIN_PX: f64 = 50.0;
/// Base speed of moving targets, before the difficulty multiplier
pub const BASE_SPEED_PX_PER_SEC: f64 = 100.0;
/// Headshot-line targets sit at this fraction of the viewport height
pub const HEADSHOT_LINE_RATIO: f64 = 0.3;
/// Total vertical jitter around the headshot line
pub const HEADSHOT_JITTER_PX: f64 = 40.0;
/// How long a hit target stays visible before it is removed
pub const HIT_EXIT_MS: u64 = 150;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> (f64, f64) {
        (self.width / 2.0, self.height / 2.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Velocity {
    pub vx: f64,
    pub vy: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Kinematics {
    Static,
    Moving(Velocity),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Target {
    pub id: u64,
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub created_at: u64,
    pub kinematics: Kinematics,
    pub hit_at: Option<u64>,
}

impl Target {
    pub fn is_hit(&self) -> bool {
        self.hit_at.is_some()
    }

    pub fn is_moving(&self) -> bool {
        matches!(self.kinematics, Kinematics::Moving(_))
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        let dx = x - self.x;
        let dy = y - self.y;
        (dx * dx + dy * dy).sqrt() <= self.radius
    }

    pub fn age_ms(&self, now: u64) -> u64 {
        now.saturating_sub(self.created_at)
    }

    /// Integrate one step and bounce off the viewport walls.
    ///
    /// Each axis is handled on its own: crossing `radius` or
    /// `dimension - radius` flips that axis's velocity and clamps the
    /// position onto the wall.
    pub fn advance(&mut self, dt_secs: f64, viewport: &Viewport) {
        let Kinematics::Moving(mut v) = self.kinematics else {
            return;
        };

        let (x, vx) = bounce_axis(self.x + v.vx * dt_secs, v.vx, self.radius, viewport.width);
        let (y, vy) = bounce_axis(self.y + v.vy * dt_secs, v.vy, self.radius, viewport.height);
        self.x = x;
        self.y = y;
        v.vx = vx;
        v.vy = vy;
        self.kinematics = Kinematics::Moving(v);
    }
}

fn bounce_axis(pos: f64, vel: f64, radius: f64, extent: f64) -> (f64, f64) {
    let max = extent - radius;
    if pos < radius || pos > max {
        (pos.max(radius).min(max), -vel)
    } else {
        (pos, vel)
    }
}

pub fn target_radius(settings: &GameSettings) -> f64 {
    (settings.target_size.radius_px() * settings.difficulty.multipliers().size).round()
}

pub fn target_lifetime_ms(mode: GameMode, settings: &GameSettings) -> u64 {
    let base = mode.config().target_lifetime_ms as f64;
    (base * settings.difficulty.multipliers().lifetime).round() as u64
}

pub fn target_speed(settings: &GameSettings) -> f64 {
    BASE_SPEED_PX_PER_SEC * settings.difficulty.multipliers().speed
}

/// Uniform spawn point inside the padded viewport.
///
/// Headshot-line mode keeps x uniform but pins y to a narrow band around
/// 30% of the height.
pub fn spawn_position(
    radius: f64,
    viewport: &Viewport,
    mode: GameMode,
    rng: &mut dyn RandomSource,
) -> (f64, f64) {
    let padding = radius + SPAWN_MARGIN_PX;
    let x = padding + rng.next_unit() * (viewport.width - padding * 2.0);

    let y = if mode == GameMode::HeadshotLine {
        let line = viewport.height * HEADSHOT_LINE_RATIO;
        line + (rng.next_unit() - 0.5) * HEADSHOT_JITTER_PX
    } else {
        padding + rng.next_unit() * (viewport.height - padding * 2.0)
    };

    (x, y)
}

pub fn initial_velocity(speed: f64, rng: &mut dyn RandomSource) -> Velocity {
    let angle = rng.next_unit() * TAU;
    Velocity {
        vx: angle.cos() * speed,
        vy: angle.sin() * speed,
    }
}

/// Build a fresh target for the mode. Position is drawn before velocity.
pub fn spawn_target(
    id: u64,
    mode: GameMode,
    settings: &GameSettings,
    viewport: &Viewport,
    now: u64,
    rng: &mut dyn RandomSource,
) -> Target {
    let radius = target_radius(settings);
    let (x, y) = spawn_position(radius, viewport, mode, rng);
    let kinematics = if mode.config().moving_targets {
        Kinematics::Moving(initial_velocity(target_speed(settings), rng))
    } else {
        Kinematics::Static
    };

    Target {
        id,
        x,
        y,
        radius,
        created_at: now,
        kinematics,
        hit_at: None,
    }
}
