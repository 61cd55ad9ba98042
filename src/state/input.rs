//! Input Module - crossterm events in, crate events out.
//!
//! Key codes become DOM-style key names so handlers can match on "Escape"
//! the same way regardless of terminal. Resizes update the viewport and count
//! as a scroll (overlays reposition, visibility is re-checked).
//!
//! # Example
//!
//! ```ignore
//! use spark_notify::state::{input, tick};
//!
//! loop {
//!     let event = crossterm::event::read()?;
//!     input::route_event(event.into());
//!     tick::run_until_idle();
//! }
//! ```

use crossterm::event::{
    Event as CrosstermEvent, KeyCode, KeyEvent as CrosstermKeyEvent, KeyEventKind,
    KeyModifiers, MouseButton as CrosstermMouseButton, MouseEvent as CrosstermMouseEvent,
    MouseEventKind,
};

use super::keyboard::{KeyState, KeyboardEvent, Modifiers};
use super::mouse::{MouseAction, MouseButton, MouseEvent};
use super::scroll;
use crate::engine::set_terminal_size;

/// An event the notification system reacts to.
#[derive(Debug, Clone)]
pub enum InputEvent {
    Mouse(MouseEvent),
    Key(KeyboardEvent),
    /// New terminal width and height.
    Resize(u16, u16),
    /// Anything else (focus gained/lost, paste).
    None,
}

impl From<CrosstermEvent> for InputEvent {
    fn from(event: CrosstermEvent) -> Self {
        match event {
            CrosstermEvent::Mouse(mouse) => InputEvent::Mouse(convert_mouse_event(mouse)),
            CrosstermEvent::Key(key) => InputEvent::Key(convert_key_event(key)),
            CrosstermEvent::Resize(width, height) => InputEvent::Resize(width, height),
            _ => InputEvent::None,
        }
    }
}

// =============================================================================
// CONVERSION
// =============================================================================

pub fn convert_mouse_event(event: CrosstermMouseEvent) -> MouseEvent {
    let button = |b: CrosstermMouseButton| match b {
        CrosstermMouseButton::Left => MouseButton::Left,
        CrosstermMouseButton::Right => MouseButton::Right,
        CrosstermMouseButton::Middle => MouseButton::Middle,
    };
    let (action, button) = match event.kind {
        MouseEventKind::Down(b) => (MouseAction::Down, button(b)),
        MouseEventKind::Up(b) => (MouseAction::Up, button(b)),
        MouseEventKind::Drag(b) => (MouseAction::Drag, button(b)),
        MouseEventKind::Moved => (MouseAction::Move, MouseButton::None),
        _ => (MouseAction::Scroll, MouseButton::None),
    };

    MouseEvent {
        modifiers: convert_modifiers(event.modifiers),
        ..MouseEvent::new(action, button, event.column, event.row)
    }
}

/// DOM name of a key code. Unnamed keys map to the empty string.
fn key_name(code: KeyCode) -> String {
    let name = match code {
        KeyCode::Char(c) => return c.to_string(),
        KeyCode::F(n) => return format!("F{n}"),
        KeyCode::Esc => "Escape",
        KeyCode::Enter => "Enter",
        KeyCode::Tab | KeyCode::BackTab => "Tab",
        KeyCode::Backspace => "Backspace",
        KeyCode::Delete => "Delete",
        KeyCode::Home => "Home",
        KeyCode::End => "End",
        KeyCode::PageUp => "PageUp",
        KeyCode::PageDown => "PageDown",
        KeyCode::Up => "ArrowUp",
        KeyCode::Down => "ArrowDown",
        KeyCode::Left => "ArrowLeft",
        KeyCode::Right => "ArrowRight",
        _ => "",
    };
    name.to_string()
}

pub fn convert_key_event(event: CrosstermKeyEvent) -> KeyboardEvent {
    let mut modifiers = convert_modifiers(event.modifiers);
    if event.code == KeyCode::BackTab {
        modifiers.shift = true;
    }

    KeyboardEvent {
        key: key_name(event.code),
        modifiers,
        state: match event.kind {
            KeyEventKind::Press => KeyState::Press,
            KeyEventKind::Repeat => KeyState::Repeat,
            KeyEventKind::Release => KeyState::Release,
        },
    }
}

fn convert_modifiers(mods: KeyModifiers) -> Modifiers {
    Modifiers {
        ctrl: mods.contains(KeyModifiers::CONTROL),
        alt: mods.contains(KeyModifiers::ALT),
        shift: mods.contains(KeyModifiers::SHIFT),
        meta: mods.intersects(KeyModifiers::META | KeyModifiers::SUPER),
    }
}

// =============================================================================
// EVENT ROUTING
// =============================================================================

/// Route an event to the appropriate handler.
/// Returns true if a click handler consumed the event. Key-ups are never consumed.
pub fn route_event(event: InputEvent) -> bool {
    match event {
        InputEvent::Mouse(mouse) => super::mouse::dispatch(mouse),
        InputEvent::Key(key) => {
            super::keyboard::dispatch(key);
            false
        }
        InputEvent::Resize(w, h) => {
            set_terminal_size(w, h);
            scroll::notify_scroll();
            false
        }
        InputEvent::None => false,
    }
}

// =============================================================================
// TESTS
// =============================================================================
