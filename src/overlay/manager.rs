//! Overlay Manager - the overlay session coordinating one open notification.
//!
//! The manager is created once at application start and handed to every
//! anchor and bubble that needs it. Clones share the same session.
//!
//! It is the only owner of:
//! - the open state (`Signal<bool>`, replays its latest value to subscribers)
//! - the registered anchor element
//! - the focus memento captured when a notification takes focus
//! - the live [`OverlayLayer`]
//!
//! Invariant: the open state is true iff a layer exists, and at most one
//! layer exists.
//!
//! # Lifecycle
//!
//! ```text
//! CLOSED --show()--> OPEN --hide() / destroy() / navigated()--> CLOSED
//! ```
//!
//! # Example
//!
//! ```ignore
//! let manager = OverlayManager::new();
//! manager.register_anchor(anchor);
//!
//! let pending = manager.show(anchor, template);
//! tick::run_tick();
//! let manager = futures::executor::block_on(pending)?;
//! ```

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use futures::channel::oneshot;
use futures::future::{self, FutureExt, LocalBoxFuture};
use spark_signals::{effect, signal, Signal};
use tracing::{debug, trace, warn};

use super::layer::{OverlayLayer, OVERLAY_Z_INDEX};
use super::position::{AppliedPosition, ConnectedPosition, FlexibleConnectedStrategy, DEFAULT_POSITIONS};
use crate::engine::{allocate_root_element, get_rect, is_allocated, set_rect, viewport, with_parent, ElementProps};
use crate::error::ShowError;
use crate::notification::{NotificationTemplate, TemplateContext};
use crate::state::focus::{self, FocusedElement};
use crate::state::{scroll, tick};
use crate::types::{Cleanup, PositionUpdate, Rect, Size};

/// Resolves with the manager once the overlay has settled, or fails
/// immediately when preconditions are not met.
pub type ShowFuture = LocalBoxFuture<'static, Result<OverlayManager, ShowError>>;

struct ManagerState {
    anchor: Option<usize>,
    positions: Vec<ConnectedPosition>,
    layer: Option<OverlayLayer>,
    focus_memento: Option<FocusedElement>,
    next_layer_id: usize,
}

/// Shared overlay session. Cheap to clone.
#[derive(Clone)]
pub struct OverlayManager {
    inner: Rc<RefCell<ManagerState>>,
    open: Signal<bool>,
}

/// Non-owning handle, used by listeners the manager registers elsewhere.
#[derive(Clone)]
pub struct WeakOverlayManager {
    inner: Weak<RefCell<ManagerState>>,
    open: Signal<bool>,
}

impl WeakOverlayManager {
    pub fn upgrade(&self) -> Option<OverlayManager> {
        self.inner.upgrade().map(|inner| OverlayManager {
            inner,
            open: self.open.clone(),
        })
    }
}

impl Default for OverlayManager {
    fn default() -> Self {
        Self::new()
    }
}

impl OverlayManager {
    /// Session with the default four-position table.
    pub fn new() -> Self {
        Self::with_positions(DEFAULT_POSITIONS.to_vec())
    }

    pub fn with_positions(positions: Vec<ConnectedPosition>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(ManagerState {
                anchor: None,
                positions,
                layer: None,
                focus_memento: None,
                next_layer_id: 0,
            })),
            open: signal(false),
        }
    }

    pub fn downgrade(&self) -> WeakOverlayManager {
        WeakOverlayManager {
            inner: Rc::downgrade(&self.inner),
            open: self.open.clone(),
        }
    }

    /// Replace the position table. Applies from the next `show`.
    pub fn set_positions(&self, positions: Vec<ConnectedPosition>) {
        self.inner.borrow_mut().positions = positions;
    }

    pub fn positions(&self) -> Vec<ConnectedPosition> {
        self.inner.borrow().positions.clone()
    }

    // =========================================================================
    // Anchor
    // =========================================================================

    /// Register the element notifications attach to. Last registration wins.
    pub fn register_anchor(&self, element: usize) {
        let previous = self.inner.borrow_mut().anchor.replace(element);
        if let Some(previous) = previous.filter(|&p| p != element) {
            debug!(previous, element, "notification anchor replaced");
        }
    }

    /// Forget the anchor if `element` is still the registered one.
    pub fn release_anchor(&self, element: usize) {
        let mut state = self.inner.borrow_mut();
        if state.anchor == Some(element) {
            state.anchor = None;
        }
    }

    pub fn anchor(&self) -> Option<usize> {
        self.inner.borrow().anchor
    }

    /// Current rect of the registered anchor.
    pub fn anchor_rect(&self) -> Option<Rect> {
        self.anchor().and_then(get_rect)
    }

    // =========================================================================
    // Open state
    // =========================================================================

    pub fn is_open(&self) -> bool {
        self.open.get()
    }

    /// The open-state signal.
    pub fn open_state(&self) -> Signal<bool> {
        self.open.clone()
    }

    /// Call `f` with the current open state now and on every change.
    /// Returns the unsubscribe function.
    pub fn subscribe_open<F>(&self, f: F) -> impl FnOnce() + use<F>
    where
        F: Fn(bool) + 'static,
    {
        let open = self.open.clone();
        effect(move || f(open.get()))
    }

    // =========================================================================
    // Show / hide
    // =========================================================================

    /// Open a notification rendering `template` for `insertion_point`.
    ///
    /// Fails without touching any state if no anchor is registered, the
    /// insertion point is not allocated, or the position table is empty.
    /// Otherwise the overlay is built, attached and positioned synchronously
    /// and the returned future resolves on the next tick.
    pub fn show(&self, insertion_point: usize, template: NotificationTemplate) -> ShowFuture {
        if let Err(err) = self.check_show(insertion_point) {
            warn!(insertion_point, error = %err, "notification show rejected");
            return future::ready(Err(err)).boxed_local();
        }

        // One overlay at a time
        if let Some(previous) = self.take_layer() {
            debug!(layer = previous.element, "replacing open notification overlay");
            previous.dispose();
        }

        let (layer_id, layer_element) = {
            let mut state = self.inner.borrow_mut();
            let id = state.next_layer_id;
            state.next_layer_id += 1;

            let element = allocate_root_element(ElementProps {
                z_index: OVERLAY_Z_INDEX,
                ..Default::default()
            });
            let mut layer = OverlayLayer::new(
                id,
                element,
                FlexibleConnectedStrategy::new(state.positions.clone()),
            );

            let weak = self.downgrade();
            layer.set_scroll_cleanup(Box::new(scroll::on_scroll(move || {
                if let Some(manager) = weak.upgrade() {
                    manager.reposition();
                }
            })));

            state.layer = Some(layer);
            (id, element)
        };

        let context = TemplateContext {
            manager: self.clone(),
            layer: layer_element,
            insertion_point,
        };
        let content = with_parent(layer_element, || template.render(&context));

        // The template may have closed the overlay while rendering.
        let attached = {
            let mut state = self.inner.borrow_mut();
            match state.layer.as_mut() {
                Some(layer) if layer.id == layer_id => {
                    layer.set_content_cleanup(content);
                    true
                }
                _ => false,
            }
        };
        if !attached {
            return future::ready(Err(ShowError::Abandoned)).boxed_local();
        }

        self.open.set(true);
        self.reposition();
        debug!(layer = layer_element, insertion_point, "notification shown");

        let (tx, rx) = oneshot::channel();
        let manager = self.clone();
        tick::defer(move || {
            let _ = tx.send(manager);
        });
        rx.map(|result| result.map_err(|_| ShowError::Abandoned))
            .boxed_local()
    }

    fn check_show(&self, insertion_point: usize) -> Result<(), ShowError> {
        let state = self.inner.borrow();
        if state.anchor.is_none() {
            return Err(ShowError::NoAnchor);
        }
        if !is_allocated(insertion_point) {
            return Err(ShowError::MissingInsertionPoint(insertion_point));
        }
        if state.positions.is_empty() {
            return Err(ShowError::NoPositions);
        }
        Ok(())
    }

    /// Close the open notification and give focus back to whatever had it
    /// before. No-op when closed.
    pub fn hide(&self) {
        let Some(layer) = self.take_layer() else {
            return;
        };
        let element = layer.element;

        self.open.set(false);
        layer.dispose();

        let memento = self.inner.borrow_mut().focus_memento.take();
        if let Some(memento) = memento {
            if memento.can_focus() {
                memento.restore();
            } else {
                trace!(index = memento.index, "focus memento no longer focusable");
            }
        }
        debug!(layer = element, "notification hidden");
    }

    /// Teardown: dispose any open overlay without restoring focus.
    pub fn destroy(&self) {
        self.inner.borrow_mut().focus_memento = None;
        if let Some(layer) = self.take_layer() {
            self.open.set(false);
            layer.dispose();
            debug!("notification overlay destroyed");
        }
    }

    /// The host navigated away: overlays do not survive navigation.
    pub fn navigated(&self) {
        if self.is_open() {
            debug!("disposing notification overlay on navigation");
        }
        self.destroy();
    }

    fn take_layer(&self) -> Option<OverlayLayer> {
        self.inner.borrow_mut().layer.take()
    }

    // =========================================================================
    // Focus
    // =========================================================================

    /// Remember the focused element, then focus `element` on the next tick
    /// (it may not be attached yet).
    pub fn set_focus_on(&self, element: usize) {
        self.inner.borrow_mut().focus_memento = focus::active_element();
        tick::defer(move || {
            if !focus::focus(element) {
                trace!(element, "deferred focus target not focusable");
            }
        });
    }

    pub fn focus_memento(&self) -> Option<FocusedElement> {
        self.inner.borrow().focus_memento.clone()
    }

    // =========================================================================
    // Positioning
    // =========================================================================

    /// Subscribe to position updates of the open overlay.
    ///
    /// Updates arrive in the order they are produced. The subscription ends
    /// when the overlay closes. When closed this is a no-op.
    pub fn on_position_change<F>(&self, handler: F) -> Cleanup
    where
        F: Fn(&PositionUpdate) + 'static,
    {
        let mut state = self.inner.borrow_mut();
        let Some(layer) = state.layer.as_mut() else {
            return Box::new(|| {});
        };
        let layer_id = layer.id;
        let subscriber = layer.subscribe(Rc::new(handler));

        let inner = Rc::downgrade(&self.inner);
        Box::new(move || {
            let Some(inner) = inner.upgrade() else {
                return;
            };
            let mut state = inner.borrow_mut();
            if let Some(layer) = state.layer.as_mut().filter(|l| l.id == layer_id) {
                layer.unsubscribe(subscriber);
            }
        })
    }

    /// Number of position subscribers on the open overlay.
    pub fn position_subscriber_count(&self) -> usize {
        self.inner
            .borrow()
            .layer
            .as_ref()
            .map(|layer| layer.subscriber_count())
            .unwrap_or(0)
    }

    /// Set the overlay content size and re-apply the position.
    pub fn resize_overlay(&self, size: Size) {
        let resized = match self.inner.borrow_mut().layer.as_mut() {
            Some(layer) => {
                layer.size = size;
                true
            }
            None => false,
        };
        if resized {
            self.reposition();
        }
    }

    /// Re-apply the position strategy against the anchor's current rect and
    /// publish the result.
    pub fn reposition(&self) {
        let (update, handlers) = {
            let mut guard = self.inner.borrow_mut();
            let state = &mut *guard;
            let Some(layer) = state.layer.as_mut() else {
                return;
            };
            let Some(anchor) = state.anchor.and_then(get_rect) else {
                trace!("reposition skipped: anchor has no rect");
                return;
            };
            let Some(applied) = layer.strategy.apply(anchor, layer.size, viewport()) else {
                return;
            };
            set_rect(layer.element, applied.rect);
            (applied.position.to_update(), layer.handlers())
        };

        trace!(?update, "overlay position applied");
        for handler in handlers {
            handler(&update);
        }
    }

    /// Rect of the open overlay.
    pub fn overlay_rect(&self) -> Option<Rect> {
        let element = self.inner.borrow().layer.as_ref().map(|l| l.element)?;
        get_rect(element)
    }

    /// Root element of the open overlay.
    pub fn overlay_element(&self) -> Option<usize> {
        self.inner.borrow().layer.as_ref().map(|l| l.element)
    }

    /// The last position applied to the open overlay.
    pub fn last_position(&self) -> Option<AppliedPosition> {
        self.inner
            .borrow()
            .layer
            .as_ref()
            .and_then(|l| l.strategy.last_applied())
    }
}
