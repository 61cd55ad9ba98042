//! Scroll Module - Scroll and viewport change notifications.
//!
//! The host calls [`notify_scroll`] after content moves (scrolling, layout,
//! resize). Listeners run first so overlays can follow their anchors, then
//! intersection observations are re-checked.

use std::cell::RefCell;
use std::rc::Rc;

use super::visibility;

type ScrollListener = Rc<dyn Fn()>;

#[derive(Default)]
struct ScrollRegistry {
    listeners: Vec<(usize, ScrollListener)>,
    next_id: usize,
}

thread_local! {
    static REGISTRY: RefCell<ScrollRegistry> = RefCell::new(ScrollRegistry::default());
}

/// Subscribe to scroll notifications.
/// Returns cleanup function.
pub fn on_scroll<F>(listener: F) -> impl FnOnce()
where
    F: Fn() + 'static,
{
    let id = REGISTRY.with(|reg| {
        let mut reg = reg.borrow_mut();
        let id = reg.next_id;
        reg.next_id += 1;
        reg.listeners.push((id, Rc::new(listener)));
        id
    });

    move || {
        REGISTRY.with(|reg| {
            reg.borrow_mut().listeners.retain(|(listener_id, _)| *listener_id != id);
        });
    }
}

/// Notify that content scrolled or the viewport changed.
pub fn notify_scroll() {
    let listeners: Vec<ScrollListener> = REGISTRY.with(|reg| {
        reg.borrow().listeners.iter().map(|(_, l)| l.clone()).collect()
    });
    for listener in listeners {
        listener();
    }
    visibility::check_intersections();
}

pub fn scroll_listener_count() -> usize {
    REGISTRY.with(|reg| reg.borrow().listeners.len())
}

/// Reset scroll state (for testing)
pub fn reset_scroll_state() {
    REGISTRY.with(|reg| *reg.borrow_mut() = ScrollRegistry::default());
}
