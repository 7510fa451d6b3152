/// Keyboard input → player actions.
///
/// Every roll is one discrete request, so only Press and Repeat events
/// count; Release is ignored. A request that arrives while a roll is
/// still animating is dropped by the controller, never buffered here.
///
///   ←/→/↑/↓, A/D/W/S   →  Roll
///   R                  →  Restart level
///   N                  →  Skip to next level
///   Esc / Q / Ctrl+C   →  Quit

use std::time::Duration;

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use blockroll::domain::block::Direction;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Action {
    Roll(Direction),
    Restart,
    Skip,
    Quit,
}

/// Map a single key event to an action, if it has one.
pub fn action_for(key: &KeyEvent) -> Option<Action> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') | KeyCode::Char('C') => Some(Action::Quit),
            _ => None,
        };
    }
    let action = match key.code {
        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => Action::Roll(Direction::Left),
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => Action::Roll(Direction::Right),
        KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('W') => Action::Roll(Direction::Up),
        KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('S') => Action::Roll(Direction::Down),
        KeyCode::Char('r') | KeyCode::Char('R') => Action::Restart,
        KeyCode::Char('n') | KeyCode::Char('N') => Action::Skip,
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => Action::Quit,
        _ => return None,
    };
    Some(action)
}

pub struct InputState {
    actions: Vec<Action>,
}

impl InputState {
    pub fn new() -> Self {
        InputState { actions: Vec::with_capacity(8) }
    }

    /// Drain all pending terminal events without blocking.
    /// Call this once per frame, before the controller is driven.
    pub fn drain_events(&mut self) -> &[Action] {
        self.actions.clear();
        while poll(Duration::ZERO).unwrap_or(false) {
            if let Ok(Event::Key(key)) = event::read() {
                if let Some(action) = action_for(&key) {
                    self.actions.push(action);
                }
            }
        }
        &self.actions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn arrows_and_wasd_roll() {
        assert_eq!(action_for(&press(KeyCode::Left)), Some(Action::Roll(Direction::Left)));
        assert_eq!(action_for(&press(KeyCode::Char('w'))), Some(Action::Roll(Direction::Up)));
        assert_eq!(action_for(&press(KeyCode::Char('S'))), Some(Action::Roll(Direction::Down)));
    }

    #[test]
    fn release_is_ignored() {
        let mut key = press(KeyCode::Right);
        key.kind = KeyEventKind::Release;
        assert_eq!(action_for(&key), None);
    }

    #[test]
    fn ctrl_c_quits_but_plain_c_does_nothing() {
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(action_for(&ctrl_c), Some(Action::Quit));
        assert_eq!(action_for(&press(KeyCode::Char('c'))), None);
    }

    #[test]
    fn meta_keys() {
        assert_eq!(action_for(&press(KeyCode::Char('r'))), Some(Action::Restart));
        assert_eq!(action_for(&press(KeyCode::Char('N'))), Some(Action::Skip));
        assert_eq!(action_for(&press(KeyCode::Esc)), Some(Action::Quit));
    }
}
