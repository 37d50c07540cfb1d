//! Terminal input to engine commands.
//!
//! Terminals report absolute mouse cells rather than device counts, so
//! motion is turned into synthetic counts per cell moved. The counts then
//! go through the engine's sensitivity factor like real mouse input.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEventKind};

use crate::engine::{SessionEngine, ShotOutcome};
use crate::error::EngineError;
use crate::mode::GameMode;
use crate::runtime::AppEvent;
use crate::session::{SessionState, TrainingSession};
use crate::target::Viewport;

/// Virtual pixels covered by one terminal column
pub const PIXELS_PER_COLUMN: f64 = 10.0;
/// Virtual pixels covered by one terminal row
pub const PIXELS_PER_ROW: f64 = 20.0;
/// Synthetic counts for one column of mouse travel
pub const COUNTS_PER_COLUMN: f64 = 40.0;
/// Synthetic counts for one row of mouse travel
pub const COUNTS_PER_ROW: f64 = 80.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    PointerDelta(f64, f64),
    Click,
    Start,
    End,
    TogglePause,
    SelectMode(GameMode),
    Reset,
    Quit,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Applied {
    Nothing,
    Shot(ShotOutcome),
    Ended(TrainingSession),
    Rejected(EngineError),
    Quit,
}

/// Play area in virtual pixels for a canvas of `cols` x `rows` cells
pub fn viewport_for(cols: u16, rows: u16) -> Option<Viewport> {
    if cols == 0 || rows == 0 {
        return None;
    }
    Some(Viewport::new(
        cols as f64 * PIXELS_PER_COLUMN,
        rows as f64 * PIXELS_PER_ROW,
    ))
}

#[derive(Debug, Default)]
pub struct InputMapper {
    last_cell: Option<(u16, u16)>,
}

impl InputMapper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn translate(&mut self, event: &AppEvent, state: SessionState) -> Option<Command> {
        match event {
            AppEvent::Key(key) => self.translate_key(key, state),
            AppEvent::Mouse(mouse) => {
                let cell = (mouse.column, mouse.row);
                let prev = self.last_cell.replace(cell);
                match mouse.kind {
                    MouseEventKind::Moved | MouseEventKind::Drag(_) => {
                        let (pc, pr) = prev?;
                        let dc = cell.0 as f64 - pc as f64;
                        let dr = cell.1 as f64 - pr as f64;
                        if dc == 0.0 && dr == 0.0 {
                            return None;
                        }
                        Some(Command::PointerDelta(dc * COUNTS_PER_COLUMN, dr * COUNTS_PER_ROW))
                    }
                    MouseEventKind::Down(MouseButton::Left) => Some(Command::Click),
                    _ => None,
                }
            }
            AppEvent::Resize(..) | AppEvent::Tick => None,
        }
    }

    fn translate_key(&mut self, key: &KeyEvent, state: SessionState) -> Option<Command> {
        if key.kind == KeyEventKind::Release {
            return None;
        }
        let in_session = matches!(state, SessionState::Playing | SessionState::Paused);
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(Command::Quit)
            }
            KeyCode::Esc if in_session => Some(Command::End),
            KeyCode::Esc => Some(Command::Quit),
            KeyCode::Char('q') if !in_session => Some(Command::Quit),
            KeyCode::Char(' ') if state == SessionState::Playing => Some(Command::Click),
            KeyCode::Enter | KeyCode::Char(' ') if !in_session => Some(Command::Start),
            KeyCode::Char('p') if in_session => Some(Command::TogglePause),
            KeyCode::Char('r') => Some(Command::Reset),
            KeyCode::Char(c) if !in_session => c
                .to_digit(10)
                .and_then(GameMode::from_hotkey)
                .map(Command::SelectMode),
            _ => None,
        }
    }
}

/// Run one command against the engine.
pub fn apply(engine: &mut SessionEngine, command: Command) -> Applied {
    let result = match command {
        Command::PointerDelta(dx, dy) => {
            engine.pointer_delta(dx, dy);
            Ok(Applied::Nothing)
        }
        Command::Click => match engine.click() {
            ShotOutcome::Ignored => Ok(Applied::Nothing),
            outcome => Ok(Applied::Shot(outcome)),
        },
        Command::Start => engine.start().map(|_| Applied::Nothing),
        Command::End => {
            if engine.state() == SessionState::Paused {
                if let Err(e) = engine.resume() {
                    return Applied::Rejected(e);
                }
            }
            engine.end_session().map(Applied::Ended)
        }
        Command::TogglePause => {
            let toggled = match engine.state() {
                SessionState::Paused => engine.resume(),
                _ => engine.pause(),
            };
            toggled.map(|_| Applied::Nothing)
        }
        Command::SelectMode(mode) => engine.set_mode(mode).map(|_| Applied::Nothing),
        Command::Reset => {
            engine.reset();
            Ok(Applied::Nothing)
        }
        Command::Quit => Ok(Applied::Quit),
    };
    result.unwrap_or_else(Applied::Rejected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::MouseEvent;

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> AppEvent {
        AppEvent::Mouse(MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    fn key(code: KeyCode) -> AppEvent {
        AppEvent::Key(KeyEvent::from(code))
    }

    #[test]
    fn first_motion_only_anchors() {
        let mut m = InputMapper::new();
        let playing = SessionState::Playing;
        assert_eq!(m.translate(&mouse(MouseEventKind::Moved, 10, 10), playing), None);
        assert_eq!(
            m.translate(&mouse(MouseEventKind::Moved, 12, 9), playing),
            Some(Command::PointerDelta(80.0, -80.0))
        );
        assert_eq!(m.translate(&mouse(MouseEventKind::Moved, 12, 9), playing), None);
    }

    #[test]
    fn left_click_shoots() {
        let mut m = InputMapper::new();
        let ev = mouse(MouseEventKind::Down(MouseButton::Left), 3, 3);
        assert_eq!(m.translate(&ev, SessionState::Playing), Some(Command::Click));
        let ev = mouse(MouseEventKind::Down(MouseButton::Right), 3, 3);
        assert_eq!(m.translate(&ev, SessionState::Playing), None);
    }

    #[test]
    fn keys_depend_on_state() {
        let mut m = InputMapper::new();
        assert_eq!(m.translate(&key(KeyCode::Esc), SessionState::Playing), Some(Command::End));
        assert_eq!(m.translate(&key(KeyCode::Esc), SessionState::Idle), Some(Command::Quit));
        assert_eq!(m.translate(&key(KeyCode::Enter), SessionState::Finished), Some(Command::Start));
        assert_eq!(
            m.translate(&key(KeyCode::Char('4')), SessionState::Idle),
            Some(Command::SelectMode(GameMode::GridShot))
        );
        assert_eq!(m.translate(&key(KeyCode::Char('4')), SessionState::Playing), None);
        assert_eq!(m.translate(&key(KeyCode::Char('9')), SessionState::Idle), None);
        assert_eq!(
            m.translate(&key(KeyCode::Char('p')), SessionState::Paused),
            Some(Command::TogglePause)
        );
        assert_eq!(m.translate(&key(KeyCode::Char('q')), SessionState::Playing), None);
    }

    #[test]
    fn viewport_scales_cells() {
        assert_eq!(viewport_for(100, 40), Some(Viewport::new(1000.0, 800.0)));
        assert_eq!(viewport_for(0, 40), None);
    }
}
