//! Terminal viewport state.

use spark_signals::{signal, Signal};

use crate::types::Rect;

/// Viewport used before the host reports a terminal size.
pub const DEFAULT_VIEWPORT: Rect = Rect::new(0, 0, 80, 24);

thread_local! {
    static VIEWPORT: Signal<Rect> = signal(DEFAULT_VIEWPORT);
}

/// Current viewport rect. Reactive when read from an effect.
pub fn viewport() -> Rect {
    VIEWPORT.with(|s| s.get())
}

/// Record the terminal size.
pub fn set_terminal_size(width: u16, height: u16) {
    VIEWPORT.with(|s| s.set(Rect::new(0, 0, width as i32, height as i32)));
}

/// Reset viewport state (for testing).
pub fn reset_viewport() {
    VIEWPORT.with(|s| s.set(DEFAULT_VIEWPORT));
}
