//! Mouse Module - Click hit-testing and per-element click handlers
//!
//! # API
//!
//! - `hit_test(x, y)` - Topmost element at a position
//! - `on_click(index, fn)` - Click handler for an element
//! - `dispatch(event)` - Dispatch a mouse event
//!
//! Clicks bubble from the element under the cursor through its parents until
//! a handler consumes the event.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use super::keyboard::Modifiers;
use crate::engine::{
    allocation_order, effective_z_index, get_allocated_indices, get_parent, get_rect,
};

// =============================================================================
// TYPES
// =============================================================================

/// Mouse action type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseAction {
    Down,
    Up,
    Move,
    Drag,
    Scroll,
}

/// Mouse button
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
    #[default]
    None,
}

/// Mouse event
#[derive(Debug, Clone, PartialEq)]
pub struct MouseEvent {
    pub action: MouseAction,
    pub button: MouseButton,
    /// Column (0-indexed)
    pub x: u16,
    /// Row (0-indexed)
    pub y: u16,
    pub modifiers: Modifiers,
    /// Element at this position (filled by dispatch)
    pub component_index: Option<usize>,
}

impl MouseEvent {
    pub fn new(action: MouseAction, button: MouseButton, x: u16, y: u16) -> Self {
        Self {
            action,
            button,
            x,
            y,
            modifiers: Modifiers::default(),
            component_index: None,
        }
    }

    /// Left button press at a position
    pub fn click(x: u16, y: u16) -> Self {
        Self::new(MouseAction::Down, MouseButton::Left, x, y)
    }
}

/// Click handler. Return true to stop bubbling.
pub type ClickHandler = Rc<dyn Fn(&MouseEvent) -> bool>;

// =============================================================================
// HANDLER REGISTRY
// =============================================================================

#[derive(Default)]
struct ClickRegistry {
    handlers: HashMap<usize, Vec<(usize, ClickHandler)>>,
    next_id: usize,
}

thread_local! {
    static REGISTRY: RefCell<ClickRegistry> = RefCell::new(ClickRegistry::default());
}

/// Register a click handler for an element.
/// Returns cleanup function.
pub fn on_click<F>(index: usize, handler: F) -> impl FnOnce()
where
    F: Fn(&MouseEvent) -> bool + 'static,
{
    let id = REGISTRY.with(|reg| {
        let mut reg = reg.borrow_mut();
        let id = reg.next_id;
        reg.next_id += 1;
        reg.handlers
            .entry(index)
            .or_default()
            .push((id, Rc::new(handler)));
        id
    });

    move || {
        REGISTRY.with(|reg| {
            let mut reg = reg.borrow_mut();
            if let Some(handlers) = reg.handlers.get_mut(&index) {
                handlers.retain(|(handler_id, _)| *handler_id != id);
                if handlers.is_empty() {
                    reg.handlers.remove(&index);
                }
            }
        });
    }
}

// =============================================================================
// HIT TESTING
// =============================================================================

/// Topmost element containing the point.
///
/// Higher effective z-index wins; among equals, the later allocation wins.
pub fn hit_test(x: i32, y: i32) -> Option<usize> {
    get_allocated_indices()
        .into_iter()
        .filter(|&i| get_rect(i).is_some_and(|r| r.contains(x, y)))
        .max_by_key(|&i| (effective_z_index(i), allocation_order(i)))
}

// =============================================================================
// DISPATCH
// =============================================================================

/// Dispatch a mouse event. Returns true if a click handler consumed it.
///
/// Only left-button presses are clicks.
pub fn dispatch(mut event: MouseEvent) -> bool {
    let target = hit_test(event.x as i32, event.y as i32);
    event.component_index = target;

    if event.action != MouseAction::Down || event.button != MouseButton::Left {
        return false;
    }

    let mut current = target;
    while let Some(index) = current {
        let handlers: Vec<ClickHandler> = REGISTRY.with(|reg| {
            reg.borrow()
                .handlers
                .get(&index)
                .map(|hs| hs.iter().map(|(_, h)| h.clone()).collect())
                .unwrap_or_default()
        });
        for handler in handlers {
            if handler(&event) {
                return true;
            }
        }
        current = get_parent(index);
    }
    false
}

/// Reset mouse state (for testing)
pub fn reset_mouse_state() {
    REGISTRY.with(|reg| *reg.borrow_mut() = ClickRegistry::default());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{allocate_element, release_element, reset_registry, with_parent, ElementProps};
    use crate::types::Rect;
    use std::cell::Cell;

    fn setup() {
        reset_registry();
        reset_mouse_state();
    }

    fn element(rect: Rect, z_index: i32) -> usize {
        allocate_element(ElementProps {
            rect,
            z_index,
            ..Default::default()
        })
    }

    #[test]
    fn test_hit_test_prefers_higher_z() {
        setup();

        let base = element(Rect::new(0, 0, 10, 10), 0);
        let layer = element(Rect::new(2, 2, 4, 4), 1000);
        let later = element(Rect::new(0, 0, 10, 10), 0);

        assert_eq!(hit_test(3, 3), Some(layer));
        assert_eq!(hit_test(8, 8), Some(later));
        assert_ne!(hit_test(8, 8), Some(base));
        assert_eq!(hit_test(50, 50), None);
    }

    #[test]
    fn test_hit_test_tie_goes_to_newest_on_recycled_index() {
        setup();

        let old = element(Rect::new(0, 0, 10, 10), 0);
        let newer = element(Rect::new(0, 0, 10, 10), 0);
        release_element(old);
        let newest = element(Rect::new(0, 0, 10, 10), 0);

        assert_eq!(newest, old);
        assert!(newest < newer);
        assert_eq!(hit_test(5, 5), Some(newest));
    }

    #[test]
    fn test_click_bubbles_to_parent() {
        setup();

        let clicks = Rc::new(Cell::new(0));
        let clicks_clone = clicks.clone();

        let parent = element(Rect::new(0, 0, 10, 1), 0);
        let _child = with_parent(parent, || element(Rect::new(0, 0, 2, 1), 0));

        let _cleanup = on_click(parent, move |_| {
            clicks_clone.set(clicks_clone.get() + 1);
            true
        });

        assert!(dispatch(MouseEvent::click(1, 0)));
        assert_eq!(clicks.get(), 1);

        // Release and right button are not clicks
        assert!(!dispatch(MouseEvent::new(MouseAction::Up, MouseButton::Left, 1, 0)));
        assert!(!dispatch(MouseEvent::new(MouseAction::Down, MouseButton::Right, 1, 0)));
        assert_eq!(clicks.get(), 1);
    }

    #[test]
    fn test_click_cleanup() {
        setup();

        let clicks = Rc::new(Cell::new(0));
        let clicks_clone = clicks.clone();

        let target = element(Rect::new(0, 0, 4, 1), 0);
        let cleanup = on_click(target, move |_| {
            clicks_clone.set(clicks_clone.get() + 1);
            true
        });

        dispatch(MouseEvent::click(0, 0));
        cleanup();
        dispatch(MouseEvent::click(0, 0));
        assert_eq!(clicks.get(), 1);
    }
}
