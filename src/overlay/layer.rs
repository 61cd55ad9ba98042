//! Overlay layer - the live floating layer of an open notification.
//!
//! A layer owns:
//! - a root element stacked above normal content
//! - the position strategy that places it next to the anchor
//! - the position-change subscribers (dropped with the layer)
//! - the cleanup of the attached template content
//! - its reposition-on-scroll listener

use std::rc::Rc;

use super::position::FlexibleConnectedStrategy;
use crate::engine::release_element;
use crate::types::{Cleanup, PositionUpdate, Size};

/// Stacking order of overlay layers.
pub const OVERLAY_Z_INDEX: i32 = 1000;

pub(crate) type PositionHandler = Rc<dyn Fn(&PositionUpdate)>;

pub(crate) struct OverlayLayer {
    /// Distinguishes this layer from earlier ones in stale cleanups.
    pub(crate) id: usize,
    pub(crate) element: usize,
    pub(crate) strategy: FlexibleConnectedStrategy,
    pub(crate) size: Size,
    subscribers: Vec<(usize, PositionHandler)>,
    next_subscriber: usize,
    content_cleanup: Option<Cleanup>,
    scroll_cleanup: Option<Cleanup>,
}

impl OverlayLayer {
    pub(crate) fn new(id: usize, element: usize, strategy: FlexibleConnectedStrategy) -> Self {
        Self {
            id,
            element,
            strategy,
            size: Size::default(),
            subscribers: Vec::new(),
            next_subscriber: 0,
            content_cleanup: None,
            scroll_cleanup: None,
        }
    }

    pub(crate) fn subscribe(&mut self, handler: PositionHandler) -> usize {
        let id = self.next_subscriber;
        self.next_subscriber += 1;
        self.subscribers.push((id, handler));
        id
    }

    pub(crate) fn unsubscribe(&mut self, id: usize) {
        self.subscribers.retain(|(subscriber_id, _)| *subscriber_id != id);
    }

    pub(crate) fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Handlers in subscription order, cloned so they run without a borrow.
    pub(crate) fn handlers(&self) -> Vec<PositionHandler> {
        self.subscribers.iter().map(|(_, h)| h.clone()).collect()
    }

    pub(crate) fn set_content_cleanup(&mut self, cleanup: Cleanup) {
        self.content_cleanup = Some(cleanup);
    }

    pub(crate) fn set_scroll_cleanup(&mut self, cleanup: Cleanup) {
        self.scroll_cleanup = Some(cleanup);
    }

    /// Detach content, stop listening and release the layer element.
    pub(crate) fn dispose(mut self) {
        self.subscribers.clear();
        if let Some(cleanup) = self.scroll_cleanup.take() {
            cleanup();
        }
        if let Some(cleanup) = self.content_cleanup.take() {
            cleanup();
        }
        release_element(self.element);
    }
}
