//! Keyboard Module - Application-wide key-up handlers.
//!
//! Events arrive from the input module; this module never reads stdin.
//! Key-ups are broadcast to every handler and never consumed.
//!
//! Most terminals only report presses. Unless the host enables release
//! reporting with [`set_release_reporting`], a key-up is synthesized right
//! after every press.
//!
//! # Example
//!
//! ```ignore
//! use spark_notify::state::keyboard;
//!
//! let cleanup = keyboard::on_key_up(|event| {
//!     if event.is_escape() {
//!         close_popover();
//!     }
//! });
//! ```

use std::cell::{Cell, RefCell};
use std::rc::Rc;

// =============================================================================
// TYPES
// =============================================================================

/// Modifier keys held during an event.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub meta: bool,
}

/// Whether a key went down, auto-repeated or came up.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum KeyState {
    #[default]
    Press,
    Repeat,
    Release,
}

/// A key event. Named keys use their DOM names: "Escape", "Enter", "ArrowUp".
#[derive(Clone, Debug, PartialEq)]
pub struct KeyboardEvent {
    pub key: String,
    pub modifiers: Modifiers,
    pub state: KeyState,
}

impl KeyboardEvent {
    /// A press of `key` with no modifiers.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            modifiers: Modifiers::default(),
            state: KeyState::Press,
        }
    }

    /// A release of `key`.
    pub fn release(key: impl Into<String>) -> Self {
        Self {
            state: KeyState::Release,
            ..Self::new(key)
        }
    }

    pub fn is_escape(&self) -> bool {
        self.key == "Escape"
    }

    /// The same key, as a release.
    fn to_release(&self) -> Self {
        Self {
            state: KeyState::Release,
            ..self.clone()
        }
    }
}

type KeyUpHandler = Rc<dyn Fn(&KeyboardEvent)>;

// =============================================================================
// STATE
// =============================================================================

#[derive(Default)]
struct KeyUpRegistry {
    handlers: Vec<(usize, KeyUpHandler)>,
    next_id: usize,
}

thread_local! {
    static REGISTRY: RefCell<KeyUpRegistry> = RefCell::new(KeyUpRegistry::default());
    static RELEASE_REPORTING: Cell<bool> = const { Cell::new(false) };
}

/// Whether the terminal reports key releases itself.
pub fn release_reporting() -> bool {
    RELEASE_REPORTING.with(|r| r.get())
}

/// Set when the host enables crossterm's event-type reporting.
pub fn set_release_reporting(enabled: bool) {
    RELEASE_REPORTING.with(|r| r.set(enabled));
}

// =============================================================================
// DISPATCH
// =============================================================================

/// Dispatch a keyboard event.
///
/// Releases reach the key-up handlers. Presses reach them as a synthesized
/// release unless the terminal reports releases. Repeats are ignored.
pub fn dispatch(event: KeyboardEvent) {
    match event.state {
        KeyState::Press if !release_reporting() => broadcast(&event.to_release()),
        KeyState::Release => broadcast(&event),
        _ => {}
    }
}

fn broadcast(event: &KeyboardEvent) {
    // Handlers may unsubscribe themselves or others while running.
    let handlers: Vec<KeyUpHandler> = REGISTRY.with(|reg| {
        reg.borrow().handlers.iter().map(|(_, h)| h.clone()).collect()
    });
    for handler in handlers {
        handler(event);
    }
}

// =============================================================================
// PUBLIC API
// =============================================================================

/// Subscribe to key releases anywhere in the application.
/// Returns cleanup function.
pub fn on_key_up<F>(handler: F) -> impl FnOnce()
where
    F: Fn(&KeyboardEvent) + 'static,
{
    let id = REGISTRY.with(|reg| {
        let mut reg = reg.borrow_mut();
        let id = reg.next_id;
        reg.next_id += 1;
        reg.handlers.push((id, Rc::new(handler)));
        id
    });

    move || {
        REGISTRY.with(|reg| {
            reg.borrow_mut()
                .handlers
                .retain(|(handler_id, _)| *handler_id != id);
        });
    }
}

/// Number of registered key-up handlers.
pub fn key_up_handler_count() -> usize {
    REGISTRY.with(|reg| reg.borrow().handlers.len())
}

/// Reset keyboard state (for testing)
pub fn reset_keyboard_state() {
    REGISTRY.with(|reg| *reg.borrow_mut() = KeyUpRegistry::default());
    set_release_reporting(false);
}

// =============================================================================
// TESTS
// =============================================================================
