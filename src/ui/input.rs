/// Input collector.
///
/// Typing needs every key press in arrival order, so instead of tracking
/// held keys this drains the terminal queue into an ordered list of
/// presses once per frame.
///
/// Release events (sent by terminals with keyboard enhancement) are
/// dropped. Auto-repeat is dropped too: holding a key must not type it
/// twice.

use std::time::Duration;

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

pub struct InputState {
    /// Key presses collected during the most recent drain, in order.
    pub presses: Vec<KeyEvent>,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            presses: Vec::with_capacity(8),
        }
    }

    /// Drain all pending terminal events without blocking.
    /// Call this once per frame, before the app tick.
    pub fn drain_events(&mut self) {
        self.presses.clear();

        while poll(Duration::ZERO).unwrap_or(false) {
            if let Ok(Event::Key(key)) = event::read() {
                if key.kind == KeyEventKind::Press {
                    self.presses.push(key);
                }
            }
        }
    }

    /// Check if any press this frame is Ctrl+C.
    pub fn ctrl_c_pressed(&self) -> bool {
        self.presses.iter().any(is_ctrl_c)
    }
}

pub fn is_ctrl_c(k: &KeyEvent) -> bool {
    k.modifiers.contains(KeyModifiers::CONTROL)
        && (k.code == KeyCode::Char('c') || k.code == KeyCode::Char('C'))
}

/// The character a press types into the matcher, if any. Chords with
/// Ctrl or Alt and non-printable keys type nothing.
pub fn typed_char(k: &KeyEvent) -> Option<char> {
    if k.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) {
        return None;
    }
    match k.code {
        KeyCode::Char(c) if !c.is_control() && c != ' ' => Some(c),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn printable_keys_type() {
        assert_eq!(typed_char(&key(KeyCode::Char('a'), KeyModifiers::NONE)), Some('a'));
        assert_eq!(typed_char(&key(KeyCode::Char('A'), KeyModifiers::SHIFT)), Some('A'));
        assert_eq!(typed_char(&key(KeyCode::Char('-'), KeyModifiers::NONE)), Some('-'));
    }

    #[test]
    fn chords_and_specials_do_not_type() {
        assert_eq!(typed_char(&key(KeyCode::Char('c'), KeyModifiers::CONTROL)), None);
        assert_eq!(typed_char(&key(KeyCode::Char('x'), KeyModifiers::ALT)), None);
        assert_eq!(typed_char(&key(KeyCode::Char(' '), KeyModifiers::NONE)), None);
        assert_eq!(typed_char(&key(KeyCode::Enter, KeyModifiers::NONE)), None);
        assert_eq!(typed_char(&key(KeyCode::F(3), KeyModifiers::NONE)), None);
    }

    #[test]
    fn ctrl_c_detected() {
        let mut input = InputState::new();
        input.presses.push(key(KeyCode::Char('m'), KeyModifiers::NONE));
        assert!(!input.ctrl_c_pressed());
        input.presses.push(key(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(input.ctrl_c_pressed());
    }
}
