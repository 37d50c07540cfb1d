//! Session state machine.
//!
//! `SessionEngine` owns everything that changes during a session: lifecycle
//! state, crosshair, live targets, running stats and pending delayed actions.
//! Time, randomness and persistence come in through the constructor so the
//! whole engine can be driven deterministically.

use tracing::{debug, info};

use crate::clock::Clock;
use crate::error::EngineError;
use crate::mode::GameMode;
use crate::random::{random_id, RandomSource};
use crate::scheduler::{Action, Scheduler};
use crate::sensitivity::{web_sensitivity_factor, REFERENCE_FOV};
use crate::session::{SessionConfig, SessionState, TrainingSession};
use crate::settings::GameSettings;
use crate::stats::GameStats;
use crate::storage::{HistoryStore, SettingsStore};
use crate::target::{spawn_target, target_lifetime_ms, Target, Viewport, HIT_EXIT_MS};

/// Longest frame step fed into target motion, in seconds
pub const MAX_FRAME_SECS: f64 = 1.0 / 30.0;

const SESSION_ID_LEN: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShotOutcome {
    Hit { target_id: u64, reaction_ms: u64 },
    Miss,
    /// Click arrived outside a running session or before the viewport is known
    Ignored,
}

pub struct SessionEngine {
    state: SessionState,
    mode: GameMode,
    settings: GameSettings,
    config: SessionConfig,

    viewport: Option<Viewport>,
    sensitivity_factor: f64,
    /// Offset from the viewport centre
    crosshair: (f64, f64),

    targets: Vec<Target>,
    next_target_id: u64,
    stats: GameStats,

    start_time: Option<u64>,
    elapsed_ms: u64,
    paused_at: Option<u64>,

    scheduler: Scheduler,
    epoch: u64,
    last_session: Option<TrainingSession>,

    settings_store: Box<dyn SettingsStore>,
    history_store: Box<dyn HistoryStore>,
    clock: Box<dyn Clock>,
    rng: Box<dyn RandomSource>,
}

impl SessionEngine {
    /// Build an idle engine, loading settings and the last used mode.
    pub fn new(
        settings_store: impl SettingsStore + 'static,
        history_store: impl HistoryStore + 'static,
        clock: impl Clock + 'static,
        rng: impl RandomSource + 'static,
    ) -> Self {
        let settings = settings_store.load().sanitized();
        let mode = settings_store.load_last_mode().unwrap_or_default();

        Self {
            state: SessionState::Idle,
            mode,
            settings,
            config: SessionConfig::default(),
            viewport: None,
            sensitivity_factor: 1.0,
            crosshair: (0.0, 0.0),
            targets: Vec::new(),
            next_target_id: 1,
            stats: GameStats::initial(),
            start_time: None,
            elapsed_ms: 0,
            paused_at: None,
            scheduler: Scheduler::new(),
            epoch: 0,
            last_session: None,
            settings_store: Box::new(settings_store),
            history_store: Box::new(history_store),
            clock: Box::new(clock),
            rng: Box::new(rng),
        }
    }

    pub fn with_config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn settings(&self) -> &GameSettings {
        &self.settings
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    pub fn stats(&self) -> &GameStats {
        &self.stats
    }

    pub fn crosshair(&self) -> (f64, f64) {
        self.crosshair
    }

    /// Crosshair in viewport coordinates, if the viewport is known
    pub fn crosshair_position(&self) -> Option<(f64, f64)> {
        self.viewport.map(|vp| {
            let (cx, cy) = vp.center();
            (cx + self.crosshair.0, cy + self.crosshair.1)
        })
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }

    /// Time left when a session length is configured
    pub fn remaining_ms(&self) -> Option<u64> {
        self.config
            .session_length_ms
            .map(|limit| limit.saturating_sub(self.elapsed_ms))
    }

    pub fn viewport(&self) -> Option<Viewport> {
        self.viewport
    }

    pub fn sensitivity_factor(&self) -> f64 {
        self.sensitivity_factor
    }

    /// Record written by the most recent `end_session`
    pub fn last_session(&self) -> Option<&TrainingSession> {
        self.last_session.as_ref()
    }

    pub fn history(&self) -> crate::history::TrainingHistory {
        self.history_store.load_all()
    }

    fn illegal(&self, op: &'static str) -> EngineError {
        EngineError::IllegalTransition {
            op,
            state: self.state,
        }
    }

    fn session_active(&self) -> bool {
        matches!(self.state, SessionState::Playing | SessionState::Paused)
    }

    pub fn set_mode(&mut self, mode: GameMode) -> Result<(), EngineError> {
        if self.session_active() {
            return Err(self.illegal("change mode"));
        }
        self.mode = mode;
        self.settings_store.save_last_mode(mode);
        debug!(%mode, "mode selected");
        Ok(())
    }

    /// Replace the settings. Targets already on screen keep their size.
    pub fn update_settings(&mut self, settings: GameSettings) {
        self.settings = settings.sanitized();
        self.settings_store.save(&self.settings);
        self.refresh_sensitivity();
    }

    /// A viewport without a finite positive size counts as unknown.
    pub fn set_viewport(&mut self, viewport: Option<Viewport>) {
        let viewport = viewport.filter(|vp| {
            vp.width.is_finite() && vp.height.is_finite() && vp.width > 0.0 && vp.height > 0.0
        });
        self.viewport = viewport;
        self.refresh_sensitivity();
        if let Some(vp) = viewport {
            self.crosshair = clamp_to(vp, self.crosshair);
        }
    }

    fn refresh_sensitivity(&mut self) {
        if let Some(vp) = self.viewport {
            self.sensitivity_factor =
                web_sensitivity_factor(self.settings.sensitivity(), vp.width, REFERENCE_FOV);
        }
    }

    pub fn start(&mut self) -> Result<(), EngineError> {
        if self.session_active() {
            return Err(self.illegal("start"));
        }

        let now = self.clock.now_ms();
        self.epoch += 1;
        self.scheduler.clear();
        self.targets.clear();
        self.stats = GameStats::initial();
        self.start_time = Some(now);
        self.elapsed_ms = 0;
        self.paused_at = None;
        self.crosshair = (0.0, 0.0);
        self.last_session = None;
        self.state = SessionState::Playing;

        let config = self.mode.config();
        for slot in 0..config.target_count as u64 {
            self.scheduler
                .schedule(now + config.spawn_interval_ms * slot, self.epoch, Action::Spawn);
        }
        info!(mode = %self.mode, epoch = self.epoch, "session started");

        self.run_due(now);
        Ok(())
    }

    /// Advance one frame: fire due actions, then age, move and expire targets.
    pub fn tick(&mut self, dt_secs: f64) {
        if self.state != SessionState::Playing {
            return;
        }
        let dt = if dt_secs.is_finite() {
            dt_secs.clamp(0.0, MAX_FRAME_SECS)
        } else {
            0.0
        };
        let now = self.clock.now_ms();
        self.run_due(now);
        self.update_targets(dt, now);
    }

    /// Refresh the elapsed timer; ends the session when its length is reached.
    pub fn update_elapsed(&mut self) -> Option<TrainingSession> {
        if self.state != SessionState::Playing {
            return None;
        }
        let start = self.start_time?;
        self.elapsed_ms = self.clock.now_ms().saturating_sub(start);

        match self.config.session_length_ms {
            Some(limit) if self.elapsed_ms >= limit => self.end_session().ok(),
            _ => None,
        }
    }

    pub fn pointer_delta(&mut self, dx: f64, dy: f64) {
        if self.state != SessionState::Playing {
            return;
        }
        let Some(vp) = self.viewport else {
            return;
        };
        let moved = (
            self.crosshair.0 + dx * self.sensitivity_factor,
            self.crosshair.1 + dy * self.sensitivity_factor,
        );
        self.crosshair = clamp_to(vp, moved);
    }

    pub fn click(&mut self) -> ShotOutcome {
        if self.state != SessionState::Playing {
            return ShotOutcome::Ignored;
        }
        let Some((x, y)) = self.crosshair_position() else {
            return ShotOutcome::Ignored;
        };
        let now = self.clock.now_ms();

        let Some(target) = self
            .targets
            .iter_mut()
            .find(|t| !t.is_hit() && t.contains(x, y))
        else {
            self.stats = self.stats.record_miss();
            return ShotOutcome::Miss;
        };

        let reaction_ms = target.age_ms(now);
        let target_id = target.id;
        target.hit_at = Some(now);
        self.stats = self.stats.record_hit(reaction_ms);
        self.scheduler.schedule(
            now + HIT_EXIT_MS,
            self.epoch,
            Action::RemoveHit { target_id },
        );
        debug!(target_id, reaction_ms, "target hit");

        ShotOutcome::Hit {
            target_id,
            reaction_ms,
        }
    }

    pub fn pause(&mut self) -> Result<(), EngineError> {
        if self.state != SessionState::Playing {
            return Err(self.illegal("pause"));
        }
        self.paused_at = Some(self.clock.now_ms());
        self.state = SessionState::Paused;
        debug!("session paused");
        Ok(())
    }

    /// Resume and shift every session timestamp past the pause.
    pub fn resume(&mut self) -> Result<(), EngineError> {
        if self.state != SessionState::Paused {
            return Err(self.illegal("resume"));
        }
        let now = self.clock.now_ms();
        let paused_for = self
            .paused_at
            .take()
            .map_or(0, |at| now.saturating_sub(at));

        if let Some(start) = self.start_time.as_mut() {
            *start += paused_for;
        }
        for t in &mut self.targets {
            t.created_at += paused_for;
            if let Some(hit_at) = t.hit_at.as_mut() {
                *hit_at += paused_for;
            }
        }
        self.scheduler.shift(paused_for);
        self.state = SessionState::Playing;
        debug!(paused_for, "session resumed");
        Ok(())
    }

    /// Close the running session and hand its record to the history store.
    pub fn end_session(&mut self) -> Result<TrainingSession, EngineError> {
        if self.state != SessionState::Playing {
            return Err(self.illegal("end"));
        }
        let now = self.clock.now_ms();
        let start_time = self.start_time.unwrap_or(now);
        let duration = now.saturating_sub(start_time);

        let session = TrainingSession {
            id: random_id(self.rng.as_mut(), SESSION_ID_LEN),
            mode: self.mode,
            start_time,
            end_time: now,
            duration,
            stats: self.stats.clone(),
            settings: self.settings.clone(),
        };
        self.history_store.append(&session);

        self.epoch += 1;
        self.scheduler.clear();
        self.targets.clear();
        self.elapsed_ms = duration;
        self.state = SessionState::Finished;
        self.last_session = Some(session.clone());
        info!(
            id = %session.id,
            hits = session.stats.hits,
            accuracy = session.stats.accuracy,
            score = session.stats.score,
            "session finished"
        );
        Ok(session)
    }

    /// Back to Idle. Settings and history are kept.
    pub fn reset(&mut self) {
        self.epoch += 1;
        self.scheduler.clear();
        self.targets.clear();
        self.stats = GameStats::initial();
        self.start_time = None;
        self.elapsed_ms = 0;
        self.paused_at = None;
        self.crosshair = (0.0, 0.0);
        self.last_session = None;
        self.state = SessionState::Idle;
    }

    fn run_due(&mut self, now: u64) {
        while let Some(entry) = self.scheduler.pop_due(now) {
            if entry.epoch != self.epoch || self.state != SessionState::Playing {
                continue;
            }
            match entry.action {
                Action::Spawn => {
                    if self.active_count() < self.mode.config().target_count {
                        self.add_target(now);
                    }
                }
                Action::RemoveHit { target_id } => self.remove_hit(target_id, now),
            }
        }
    }

    fn active_count(&self) -> usize {
        self.targets.iter().filter(|t| !t.is_hit()).count()
    }

    fn add_target(&mut self, now: u64) {
        let Some(vp) = self.viewport else {
            return;
        };
        let id = self.next_target_id;
        self.next_target_id += 1;
        let target = spawn_target(id, self.mode, &self.settings, &vp, now, self.rng.as_mut());
        debug!(id, x = target.x, y = target.y, "target spawned");
        self.targets.push(target);
    }

    fn remove_hit(&mut self, target_id: u64, now: u64) {
        self.targets.retain(|t| t.id != target_id);
        let config = self.mode.config();
        let missing = config.target_count.saturating_sub(self.targets.len()) as u64;
        for slot in 0..missing {
            self.scheduler
                .schedule(now + config.spawn_interval_ms * slot, self.epoch, Action::Spawn);
        }
    }

    fn update_targets(&mut self, dt: f64, now: u64) {
        let lifetime = target_lifetime_ms(self.mode, &self.settings);
        let viewport = self.viewport;

        let mut expired = 0;
        self.targets.retain_mut(|t| {
            if t.is_hit() {
                return true;
            }
            if t.age_ms(now) > lifetime {
                expired += 1;
                return false;
            }
            if let Some(vp) = viewport.as_ref() {
                t.advance(dt, vp);
            }
            true
        });

        for _ in 0..expired {
            self.stats = self.stats.record_timeout();
            if self.state == SessionState::Playing
                && self.targets.len() < self.mode.config().target_count
            {
                self.add_target(now);
            }
        }
        if expired > 0 {
            debug!(expired, "targets timed out");
        }
    }
}

fn clamp_to(vp: Viewport, (x, y): (f64, f64)) -> (f64, f64) {
    let (half_w, half_h) = (vp.width / 2.0, vp.height / 2.0);
    (x.clamp(-half_w, half_w), y.clamp(-half_h, half_h))
}
