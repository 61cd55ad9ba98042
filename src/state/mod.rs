//! State Module - Runtime state systems the overlay relies on.
//!
//! - **Focus** - Focused element signal, snapshots for restoration
//! - **Keyboard** - Event types, press and key-up handler registries
//! - **Mouse** - Hit testing, click handlers
//! - **Scroll** - Scroll/viewport change listeners
//! - **Visibility** - Intersection observation against the viewport
//! - **Tick** - Next-tick deferral queue
//! - **Input** - crossterm conversion and routing

pub mod focus;
pub mod input;
pub mod keyboard;
pub mod mouse;
pub mod scroll;
pub mod tick;
pub mod visibility;

/// Reset every state system (for testing).
pub fn reset_all_state() {
    focus::reset_focus_state();
    keyboard::reset_keyboard_state();
    mouse::reset_mouse_state();
    scroll::reset_scroll_state();
    tick::reset_tick_queue();
    visibility::reset_visibility_state();
}
