//! Focus System - Which element has keyboard focus.
//!
//! - `focused_index` signal (currently focused element)
//! - `focus(i)` / `blur()`
//! - `active_element()` snapshot that can be restored later
//!
//! # Example
//!
//! ```ignore
//! use spark_notify::state::focus;
//!
//! let previous = focus::active_element();
//! focus::focus(button);
//! // ... later
//! if let Some(previous) = previous {
//!     previous.restore();
//! }
//! ```

use spark_signals::{signal, Signal};

use crate::engine::{get_id, is_allocated, is_focusable};

// =============================================================================
// FOCUSED INDEX SIGNAL
// =============================================================================

thread_local! {
    static FOCUSED_INDEX: Signal<i32> = signal(-1);
}

/// Get the currently focused element index (-1 if none)
pub fn get_focused_index() -> i32 {
    FOCUSED_INDEX.with(|s| s.get())
}

/// Check if any element is focused
pub fn has_focus() -> bool {
    get_focused_index() >= 0
}

/// Check if specific element is focused
pub fn is_focused(index: usize) -> bool {
    get_focused_index() == index as i32
}

// =============================================================================
// FOCUSED ELEMENT SNAPSHOT
// =============================================================================

/// A focused element captured at some point in time.
///
/// The ID guards against the index being recycled for a different element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FocusedElement {
    pub index: usize,
    pub id: Option<String>,
}

impl FocusedElement {
    /// Whether this element still exists and accepts focus.
    pub fn can_focus(&self) -> bool {
        is_allocated(self.index) && get_id(self.index) == self.id && is_focusable(self.index)
    }

    /// Move focus back to this element. Returns false if it can no longer be focused.
    pub fn restore(&self) -> bool {
        self.can_focus() && focus(self.index)
    }
}

/// Snapshot of the currently focused element.
pub fn active_element() -> Option<FocusedElement> {
    let current = get_focused_index();
    if current < 0 {
        return None;
    }
    let index = current as usize;
    Some(FocusedElement {
        index,
        id: get_id(index),
    })
}

// =============================================================================
// FOCUS OPERATIONS
// =============================================================================

/// Focus a specific element by index
pub fn focus(index: usize) -> bool {
    if is_allocated(index) && is_focusable(index) {
        if get_focused_index() != index as i32 {
            FOCUSED_INDEX.with(|s| s.set(index as i32));
        }
        return true;
    }
    false
}

/// Clear focus (no element focused)
pub fn blur() {
    if has_focus() {
        FOCUSED_INDEX.with(|s| s.set(-1));
    }
}

// =============================================================================
// RESET (for testing)
// =============================================================================

/// Reset all focus state (for testing)
pub fn reset_focus_state() {
    FOCUSED_INDEX.with(|s| s.set(-1));
}

// =============================================================================
// TESTS
// =============================================================================
