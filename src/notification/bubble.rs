//! Notification bubble - the floating content of an open notification.
//!
//! Structure:
//! ```text
//! layer (overlay root)
//! └── container   rect = overlay rect
//!     └── close   focusable, top-right cell, dismisses on click
//! ```
//!
//! The bubble follows the overlay's position stream and points its arrow at
//! the anchor: half the anchor width plus half the placement offset, measured
//! from the start edge when the overlay sits at the start side and from the
//! end edge otherwise.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use spark_signals::{signal, Signal};
use tracing::{debug, trace};

use crate::engine::{allocate_element, set_rect, with_parent, ElementProps};
use crate::overlay::OverlayManager;
use crate::state::mouse;
use crate::types::{
    Cleanup, HorizontalSide, PointerStyle, PositionUpdate, Rect, SideChange, Size, VerticalSide,
};

/// Bubble configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct BubbleProps {
    pub title: String,
    /// Element to focus once the bubble is attached. Defaults to the close button.
    pub default_focus: Option<usize>,
    pub size: Size,
}

impl BubbleProps {
    /// Props sized to fit `title` inside a bordered box.
    pub fn new(title: impl Into<String>) -> Self {
        let title = title.into();
        let width = (title.chars().count() as i32 + 4).max(12);
        Self {
            title,
            default_focus: None,
            size: Size::new(width, 3),
        }
    }

    pub fn with_size(mut self, size: Size) -> Self {
        self.size = size;
        self
    }

    pub fn with_default_focus(mut self, element: usize) -> Self {
        self.default_focus = Some(element);
        self
    }
}

struct BubbleInner {
    manager: OverlayManager,
    props: BubbleProps,
    container: usize,
    close_button: usize,
    pointer: Signal<PointerStyle>,
    revision: Signal<u64>,
    sides: Cell<(Option<VerticalSide>, Option<HorizontalSide>)>,
    cleanups: RefCell<Vec<Cleanup>>,
}

/// Handle to a rendered bubble. Clones share the same bubble.
#[derive(Clone)]
pub struct NotificationBubble {
    inner: Rc<BubbleInner>,
}

impl NotificationBubble {
    /// Build the bubble's elements under the current parent context.
    pub fn new(manager: OverlayManager, props: BubbleProps) -> Self {
        let container = allocate_element(ElementProps {
            rect: Rect::from_size(0, 0, props.size),
            ..Default::default()
        });
        let close_button = with_parent(container, || {
            allocate_element(ElementProps {
                rect: Rect::new(props.size.width - 1, 0, 1, 1),
                focusable: true,
                ..Default::default()
            })
        });

        let inner = Rc::new(BubbleInner {
            manager,
            props,
            container,
            close_button,
            pointer: signal(PointerStyle::Unset),
            revision: signal(0),
            sides: Cell::new((None, None)),
            cleanups: RefCell::new(Vec::new()),
        });

        let weak = Rc::downgrade(&inner);
        let stop_click = mouse::on_click(close_button, move |_| {
            if let Some(inner) = weak.upgrade() {
                inner.manager.hide();
            }
            true
        });
        inner.cleanups.borrow_mut().push(Box::new(stop_click));

        Self { inner }
    }

    fn from_weak(weak: &Weak<BubbleInner>) -> Option<Self> {
        weak.upgrade().map(|inner| Self { inner })
    }

    pub fn title(&self) -> &str {
        &self.inner.props.title
    }

    pub fn container(&self) -> usize {
        self.inner.container
    }

    pub fn close_button(&self) -> usize {
        self.inner.close_button
    }

    /// Current inline style of the pointer.
    pub fn pointer_style(&self) -> PointerStyle {
        self.inner.pointer.get()
    }

    /// Incremented each time the bubble needs a re-render.
    pub fn render_revision(&self) -> u64 {
        self.inner.revision.get()
    }

    /// Sides of the last position update seen.
    pub fn anchor_sides(&self) -> (Option<VerticalSide>, Option<HorizontalSide>) {
        self.inner.sides.get()
    }

    /// Close the notification.
    pub fn dismiss(&self) {
        self.inner.manager.hide();
    }

    /// Recompute the pointer for a new placement.
    pub fn update_anchor_position(&self, update: &PositionUpdate) {
        let inner = &self.inner;

        // Unreachable while an anchor is registered and laid out.
        let style = match inner.manager.anchor_rect() {
            Some(anchor) if anchor.width > 0 => {
                let offset = anchor.width as f32 / 2.0 + update.horizontal_offset.abs() / 2.0;
                match update.horizontal_side {
                    HorizontalSide::Start => PointerStyle::Left(offset),
                    HorizontalSide::End => PointerStyle::Right(offset),
                }
            }
            _ => PointerStyle::Hidden,
        };
        inner.pointer.set(style);

        let change = SideChange::between(inner.sides.get(), update);
        if !change.is_empty() {
            inner
                .sides
                .set((Some(update.vertical_side), Some(update.horizontal_side)));
            inner.revision.set(inner.revision.get() + 1);
            trace!(?change, %style, "bubble sides changed");
        }

        self.layout();
    }

    /// Move the bubble's elements onto the overlay rect.
    fn layout(&self) {
        let Some(rect) = self.inner.manager.overlay_rect() else {
            return;
        };
        set_rect(self.inner.container, rect);
        set_rect(
            self.inner.close_button,
            Rect::new(rect.right() - 1, rect.y, 1, 1),
        );
    }

    /// Request initial focus, follow the position stream and size the overlay.
    pub fn on_after_init(&self) {
        let inner = &self.inner;
        inner
            .manager
            .set_focus_on(inner.props.default_focus.unwrap_or(inner.close_button));

        let weak = Rc::downgrade(inner);
        let stop_positions = inner.manager.on_position_change(move |update| {
            if let Some(bubble) = Self::from_weak(&weak) {
                bubble.update_anchor_position(update);
            }
        });
        inner.cleanups.borrow_mut().push(stop_positions);

        inner.manager.resize_overlay(inner.props.size);
        debug!(container = inner.container, title = %inner.props.title, "bubble attached");
    }

    /// Release every subscription. Safe to call more than once.
    pub fn on_destroy(&self) {
        let cleanups: Vec<Cleanup> = self.inner.cleanups.borrow_mut().drain(..).collect();
        for cleanup in cleanups {
            cleanup();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{is_allocated, reset_registry, reset_viewport};
    use crate::notification::NotificationTemplate;
    use crate::state::{focus, reset_all_state, tick};
    use crate::types::Cleanup;

    fn setup() {
        reset_registry();
        reset_viewport();
        reset_all_state();
    }

    fn manager_with_anchor(width: i32) -> OverlayManager {
        let manager = OverlayManager::new();
        let anchor = allocate_element(ElementProps {
            rect: Rect::new(30, 5, width, 1),
            focusable: true,
            ..Default::default()
        });
        manager.register_anchor(anchor);
        manager
    }

    fn update(horizontal_side: HorizontalSide, offset: f32) -> PositionUpdate {
        PositionUpdate {
            vertical_side: VerticalSide::Top,
            horizontal_side,
            horizontal_offset: offset,
        }
    }

    #[test]
    fn test_pointer_start_side() {
        setup();
        let bubble = NotificationBubble::new(manager_with_anchor(8), BubbleProps::new("Hi"));

        bubble.update_anchor_position(&update(HorizontalSide::Start, 98.0));
        assert_eq!(bubble.pointer_style(), PointerStyle::Left(53.0));
        assert_eq!(
            bubble.pointer_style().property(),
            Some(("left", "53px".to_string()))
        );
    }

    #[test]
    fn test_pointer_end_side() {
        setup();
        let bubble = NotificationBubble::new(manager_with_anchor(8), BubbleProps::new("Hi"));

        bubble.update_anchor_position(&update(HorizontalSide::End, -20.0));
        assert_eq!(bubble.pointer_style(), PointerStyle::Right(14.0));
        assert_eq!(bubble.pointer_style().to_string(), "right: 14px");
    }

    #[test]
    fn test_pointer_hidden_without_anchor() {
        setup();
        let bubble = NotificationBubble::new(OverlayManager::new(), BubbleProps::new("Hi"));

        bubble.update_anchor_position(&update(HorizontalSide::Start, 18.0));
        assert_eq!(bubble.pointer_style(), PointerStyle::Hidden);
        assert_eq!(
            bubble.pointer_style().property(),
            Some(("display", "none".to_string()))
        );
    }

    #[test]
    fn test_rerender_only_on_side_change() {
        setup();
        let bubble = NotificationBubble::new(manager_with_anchor(8), BubbleProps::new("Hi"));
        assert_eq!(bubble.render_revision(), 0);

        bubble.update_anchor_position(&update(HorizontalSide::Start, 18.0));
        assert_eq!(bubble.render_revision(), 1);

        // Offset-only change: pointer moves, no re-render
        bubble.update_anchor_position(&update(HorizontalSide::Start, 30.0));
        assert_eq!(bubble.render_revision(), 1);
        assert_eq!(bubble.pointer_style(), PointerStyle::Left(19.0));

        bubble.update_anchor_position(&update(HorizontalSide::End, 18.0));
        assert_eq!(bubble.render_revision(), 2);

        let mut flipped = update(HorizontalSide::End, 18.0);
        flipped.vertical_side = VerticalSide::Bottom;
        bubble.update_anchor_position(&flipped);
        assert_eq!(bubble.render_revision(), 3);
        assert_eq!(
            bubble.anchor_sides(),
            (Some(VerticalSide::Bottom), Some(HorizontalSide::End))
        );
    }

    #[test]
    fn test_bubble_template_follows_overlay() {
        setup();
        let manager = manager_with_anchor(8);
        let anchor = manager.anchor().unwrap();
        focus::focus(anchor);

        let rendered: Rc<RefCell<Option<NotificationBubble>>> = Rc::new(RefCell::new(None));
        let rendered_clone = rendered.clone();
        let template = NotificationTemplate::new(move |ctx| -> Cleanup {
            let bubble = NotificationBubble::new(
                ctx.manager.clone(),
                BubbleProps::new("Saved").with_size(Size::new(20, 4)),
            );
            bubble.on_after_init();
            *rendered_clone.borrow_mut() = Some(bubble.clone());
            Box::new(move || bubble.on_destroy())
        });

        let _pending = manager.show(anchor, template);
        let bubble = rendered.borrow().clone().unwrap();

        // Start-below placement: start side, offset 18
        assert_eq!(bubble.pointer_style(), PointerStyle::Left(13.0));
        assert_eq!(bubble.render_revision(), 1);
        assert_eq!(manager.overlay_rect(), Some(Rect::new(12, 6, 20, 4)));
        assert_eq!(crate::engine::get_rect(bubble.close_button()), Some(Rect::new(31, 6, 1, 1)));

        // Close button takes focus on the next tick
        assert!(focus::is_focused(anchor));
        tick::run_tick();
        assert!(focus::is_focused(bubble.close_button()));

        // Clicking close dismisses and restores focus
        mouse::dispatch(mouse::MouseEvent::click(31, 6));
        assert!(!manager.is_open());
        assert!(!is_allocated(bubble.container()));
        assert!(focus::is_focused(anchor));
    }

    #[test]
    fn test_default_focus_override() {
        setup();
        let manager = manager_with_anchor(8);
        let anchor = manager.anchor().unwrap();
        let target = allocate_element(ElementProps {
            focusable: true,
            ..Default::default()
        });

        let template =
            NotificationTemplate::bubble(BubbleProps::new("Saved").with_default_focus(target));
        let _pending = manager.show(anchor, template);
        tick::run_tick();
        assert!(focus::is_focused(target));
    }

    #[test]
    fn test_dismiss_hides() {
        setup();
        let manager = manager_with_anchor(8);
        let anchor = manager.anchor().unwrap();
        let _pending = manager.show(anchor, NotificationTemplate::bubble(BubbleProps::new("x")));
        assert!(manager.is_open());

        let bubble = NotificationBubble::new(manager.clone(), BubbleProps::new("y"));
        bubble.dismiss();
        assert!(!manager.is_open());
    }

    #[test]
    fn test_destroy_releases_subscriptions() {
        setup();
        let manager = manager_with_anchor(8);
        let anchor = manager.anchor().unwrap();
        let _pending = manager.show(anchor, NotificationTemplate::new(|_| Box::new(|| {})));

        let bubble = NotificationBubble::new(manager.clone(), BubbleProps::new("Hi"));
        bubble.on_after_init();
        assert_eq!(manager.position_subscriber_count(), 1);

        bubble.on_destroy();
        bubble.on_destroy();
        assert_eq!(manager.position_subscriber_count(), 0);
    }
}
