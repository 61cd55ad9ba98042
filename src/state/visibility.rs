//! Visibility Module - Intersection observation against the viewport.
//!
//! An observation reports whether an element's rect intersects the viewport.
//! Callbacks fire on the first check after observing and on every transition
//! afterwards. Checks run on the tick after `observe`, and whenever the host
//! calls [`check_intersections`] (scroll and resize notifications do).

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use super::tick;
use crate::engine::{get_rect, viewport};

/// Result of one intersection check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntersectionEntry {
    pub index: usize,
    pub is_intersecting: bool,
}

type IntersectionCallback = Rc<dyn Fn(&IntersectionEntry)>;

struct Observation {
    element: usize,
    last: Option<bool>,
    callback: IntersectionCallback,
}

#[derive(Default)]
struct ObserverRegistry {
    observations: BTreeMap<usize, Observation>,
    next_id: usize,
}

thread_local! {
    static REGISTRY: RefCell<ObserverRegistry> = RefCell::new(ObserverRegistry::default());
}

/// Handle for one observation. Dropping it disconnects.
#[derive(Debug)]
pub struct VisibilityObserver {
    id: usize,
}

impl VisibilityObserver {
    /// Stop observing.
    pub fn disconnect(self) {}
}

impl Drop for VisibilityObserver {
    fn drop(&mut self) {
        REGISTRY.with(|reg| {
            reg.borrow_mut().observations.remove(&self.id);
        });
    }
}

/// Start observing `element`.
pub fn observe<F>(element: usize, callback: F) -> VisibilityObserver
where
    F: Fn(&IntersectionEntry) + 'static,
{
    let id = REGISTRY.with(|reg| {
        let mut reg = reg.borrow_mut();
        let id = reg.next_id;
        reg.next_id += 1;
        reg.observations.insert(
            id,
            Observation {
                element,
                last: None,
                callback: Rc::new(callback),
            },
        );
        id
    });

    tick::defer(check_intersections);
    VisibilityObserver { id }
}

/// Whether an element currently intersects the viewport.
///
/// Zero-area elements intersect when their origin is inside the viewport.
pub fn is_intersecting(element: usize) -> bool {
    let Some(rect) = get_rect(element) else {
        return false;
    };
    let viewport = viewport();
    if rect.width == 0 || rect.height == 0 {
        viewport.contains(rect.x, rect.y)
    } else {
        rect.intersect(&viewport).is_some()
    }
}

/// Re-check every observation and fire callbacks for changes.
pub fn check_intersections() {
    let fired: Vec<(IntersectionCallback, IntersectionEntry)> = REGISTRY.with(|reg| {
        let mut reg = reg.borrow_mut();
        let mut fired = Vec::new();
        for observation in reg.observations.values_mut() {
            let now = is_intersecting(observation.element);
            if observation.last != Some(now) {
                observation.last = Some(now);
                fired.push((
                    observation.callback.clone(),
                    IntersectionEntry {
                        index: observation.element,
                        is_intersecting: now,
                    },
                ));
            }
        }
        fired
    });

    for (callback, entry) in fired {
        callback(&entry);
    }
}

/// Number of live observations.
pub fn observer_count() -> usize {
    REGISTRY.with(|reg| reg.borrow().observations.len())
}

/// Reset visibility state (for testing)
pub fn reset_visibility_state() {
    REGISTRY.with(|reg| *reg.borrow_mut() = ObserverRegistry::default());
}
