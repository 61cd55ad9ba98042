//! Notification anchor - the trigger element a notification attaches to.
//!
//! The anchor wires host input to the overlay session:
//! - click on the anchor element toggles the notification
//! - Escape released anywhere closes it
//! - the optional visibility dot leaving the viewport closes it
//!
//! It keeps no state of its own beyond a cached open flag, the template and
//! the subscriptions it has to release on destroy.
//!
//! # Lifecycle
//!
//! ```ignore
//! let anchor = NotificationAnchor::new(manager.clone(), AnchorProps::new(button).with_dot(dot));
//! anchor.set_bubble_template();
//! anchor.on_init();
//! anchor.on_after_init();
//! // ...
//! anchor.on_destroy();
//! ```

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use futures::FutureExt;
use tracing::{debug, warn};

use super::bubble::BubbleProps;
use super::template::NotificationTemplate;
use crate::config::NotificationConfig;
use crate::overlay::OverlayManager;
use crate::state::keyboard::{self, KeyboardEvent};
use crate::state::mouse;
use crate::state::visibility::{self, IntersectionEntry, VisibilityObserver};
use crate::types::Cleanup;

/// Anchor configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct AnchorProps {
    /// The trigger element.
    pub element: usize,
    /// Where the notification content is requested for.
    pub insertion_point: usize,
    /// Element whose viewport visibility keeps the notification alive.
    pub dot: Option<usize>,
    pub config: NotificationConfig,
}

impl AnchorProps {
    /// Props for `element`, which is also the insertion point.
    pub fn new(element: usize) -> Self {
        Self {
            element,
            insertion_point: element,
            dot: None,
            config: NotificationConfig::default(),
        }
    }

    pub fn with_insertion_point(mut self, insertion_point: usize) -> Self {
        self.insertion_point = insertion_point;
        self
    }

    pub fn with_dot(mut self, dot: usize) -> Self {
        self.dot = Some(dot);
        self
    }

    pub fn with_config(mut self, config: NotificationConfig) -> Self {
        self.config = config;
        self
    }
}

struct AnchorInner {
    manager: OverlayManager,
    props: AnchorProps,
    template: RefCell<Option<NotificationTemplate>>,
    is_open: Cell<bool>,
    observer: RefCell<Option<VisibilityObserver>>,
    cleanups: RefCell<Vec<Cleanup>>,
}

/// Handle to an anchor component. Clones share the same anchor.
#[derive(Clone)]
pub struct NotificationAnchor {
    inner: Rc<AnchorInner>,
}

impl NotificationAnchor {
    pub fn new(manager: OverlayManager, props: AnchorProps) -> Self {
        Self {
            inner: Rc::new(AnchorInner {
                manager,
                props,
                template: RefCell::new(None),
                is_open: Cell::new(false),
                observer: RefCell::new(None),
                cleanups: RefCell::new(Vec::new()),
            }),
        }
    }

    fn from_weak(weak: &Weak<AnchorInner>) -> Option<Self> {
        weak.upgrade().map(|inner| Self { inner })
    }

    pub fn element(&self) -> usize {
        self.inner.props.element
    }

    pub fn config(&self) -> &NotificationConfig {
        &self.inner.props.config
    }

    /// Register the content rendered when the notification opens.
    pub fn set_template(&self, template: NotificationTemplate) {
        *self.inner.template.borrow_mut() = Some(template);
    }

    /// Register the default bubble, titled from the anchor's config.
    pub fn set_bubble_template(&self) {
        let props = BubbleProps::new(self.config().title.clone());
        self.set_template(NotificationTemplate::bubble(props));
    }

    /// The cached open flag.
    pub fn is_open(&self) -> bool {
        self.inner.is_open.get()
    }

    /// Whether a visibility observation is live.
    pub fn is_observing(&self) -> bool {
        self.inner.observer.borrow().is_some()
    }

    // =========================================================================
    // Handlers
    // =========================================================================

    /// Toggle the notification.
    pub fn on_click(&self) {
        if self.is_open() {
            self.inner.manager.hide();
        } else {
            self.request_show();
        }
    }

    /// Close on Escape while open.
    pub fn on_key_up(&self, event: &KeyboardEvent) {
        if self.is_open() && event.is_escape() {
            self.inner.manager.hide();
        }
    }

    fn on_visibility(&self, entry: &IntersectionEntry) {
        if !entry.is_intersecting && self.is_open() {
            debug!(dot = entry.index, "anchor left the viewport, closing notification");
            self.inner.manager.hide();
        }
    }

    fn request_show(&self) {
        let Some(template) = self.inner.template.borrow().clone() else {
            debug!(element = self.element(), "no notification template registered");
            return;
        };
        let pending = self.inner.manager.show(self.inner.props.insertion_point, template);
        // Rejections are ready immediately; success settles on a later tick.
        if let Some(Err(err)) = pending.now_or_never() {
            debug!(element = self.element(), error = %err, "anchor show request failed");
        }
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Cache the open state and attach the click and key-up listeners.
    pub fn on_init(&self) {
        let weak = Rc::downgrade(&self.inner);
        let stop_open = self.inner.manager.subscribe_open({
            let weak = weak.clone();
            move |open| {
                if let Some(inner) = weak.upgrade() {
                    inner.is_open.set(open);
                }
            }
        });

        let stop_keys = keyboard::on_key_up({
            let weak = weak.clone();
            move |event| {
                if let Some(anchor) = Self::from_weak(&weak) {
                    anchor.on_key_up(event);
                }
            }
        });

        let stop_click = mouse::on_click(self.element(), move |_| {
            match Self::from_weak(&weak) {
                Some(anchor) => {
                    anchor.on_click();
                    true
                }
                None => false,
            }
        });

        let mut cleanups = self.inner.cleanups.borrow_mut();
        cleanups.push(Box::new(stop_open));
        cleanups.push(Box::new(stop_keys));
        cleanups.push(Box::new(stop_click));
    }

    /// Register as the active anchor, watch the dot and auto-show if configured.
    pub fn on_after_init(&self) {
        self.inner.manager.register_anchor(self.element());

        if let Some(dot) = self.inner.props.dot {
            let weak = Rc::downgrade(&self.inner);
            let observer = visibility::observe(dot, move |entry| {
                if let Some(anchor) = Self::from_weak(&weak) {
                    anchor.on_visibility(entry);
                }
            });
            *self.inner.observer.borrow_mut() = Some(observer);
        }

        if self.inner.props.config.auto_show_notification_after_init {
            if self.inner.template.borrow().is_none() {
                warn!(element = self.element(), "auto-show requested without a template");
            } else {
                self.request_show();
            }
        }
    }

    /// Close any open notification and release every subscription.
    pub fn on_destroy(&self) {
        if self.is_open() {
            self.inner.manager.hide();
        }
        if let Some(observer) = self.inner.observer.borrow_mut().take() {
            observer.disconnect();
        }
        let cleanups: Vec<Cleanup> = self.inner.cleanups.borrow_mut().drain(..).collect();
        for cleanup in cleanups {
            cleanup();
        }
        self.inner.manager.release_anchor(self.element());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{
        allocate_element, reset_registry, reset_viewport, set_rect, ElementProps,
    };
    use crate::state::{reset_all_state, scroll, tick};
    use crate::types::Rect;

    fn setup() {
        reset_registry();
        reset_viewport();
        reset_all_state();
    }

    /// Counts show and hide transitions (the initial replay is not counted).
    struct Transitions {
        shows: Rc<Cell<usize>>,
        hides: Rc<Cell<usize>>,
        _stop: Box<dyn FnOnce()>,
    }

    impl Transitions {
        fn watch(manager: &OverlayManager) -> Self {
            let shows = Rc::new(Cell::new(0));
            let hides = Rc::new(Cell::new(0));
            let previous = Rc::new(Cell::new(None::<bool>));
            let (s, h, p) = (shows.clone(), hides.clone(), previous.clone());
            let stop = manager.subscribe_open(move |open| {
                match (p.get(), open) {
                    (Some(false), true) => s.set(s.get() + 1),
                    (Some(true), false) => h.set(h.get() + 1),
                    _ => {}
                }
                p.set(Some(open));
            });
            Self {
                shows,
                hides,
                _stop: Box::new(stop),
            }
        }

        fn shows(&self) -> usize {
            self.shows.get()
        }

        fn hides(&self) -> usize {
            self.hides.get()
        }
    }

    fn button() -> usize {
        allocate_element(ElementProps {
            rect: Rect::new(30, 5, 8, 1),
            focusable: true,
            ..Default::default()
        })
    }

    fn dot() -> usize {
        allocate_element(ElementProps {
            rect: Rect::new(37, 5, 1, 1),
            ..Default::default()
        })
    }

    fn mounted(manager: &OverlayManager, props: AnchorProps) -> NotificationAnchor {
        let anchor = NotificationAnchor::new(manager.clone(), props);
        anchor.set_template(NotificationTemplate::bubble(BubbleProps::new("New")));
        anchor.on_init();
        anchor.on_after_init();
        anchor
    }

    #[test]
    fn test_after_init_registers_anchor() {
        setup();
        let manager = OverlayManager::new();
        let element = button();
        let anchor = mounted(&manager, AnchorProps::new(element));

        assert_eq!(manager.anchor(), Some(element));
        assert!(!anchor.is_open());
        assert!(!anchor.is_observing());
    }

    #[test]
    fn test_escape_closes_only_when_open() {
        setup();
        let manager = OverlayManager::new();
        let anchor = mounted(&manager, AnchorProps::new(button()));
        let transitions = Transitions::watch(&manager);

        // Closed: no-op
        keyboard::dispatch(KeyboardEvent::new("Escape"));
        assert_eq!(transitions.hides(), 0);

        anchor.on_click();
        assert!(anchor.is_open());

        // Other keys leave it open
        keyboard::dispatch(KeyboardEvent::new("a"));
        keyboard::dispatch(KeyboardEvent::new("Enter"));
        assert_eq!(transitions.hides(), 0);

        keyboard::dispatch(KeyboardEvent::new("Escape"));
        assert_eq!(transitions.hides(), 1);
        assert!(!anchor.is_open());
    }

    #[test]
    fn test_escape_press_without_release_is_ignored() {
        setup();
        keyboard::set_release_reporting(true);
        let manager = OverlayManager::new();
        let anchor = mounted(&manager, AnchorProps::new(button()));
        anchor.on_click();

        keyboard::dispatch(KeyboardEvent::new("Escape"));
        assert!(manager.is_open());

        keyboard::dispatch(KeyboardEvent::release("Escape"));
        assert!(!manager.is_open());
    }

    #[test]
    fn test_click_toggles() {
        setup();
        let manager = OverlayManager::new();
        let anchor = mounted(&manager, AnchorProps::new(button()));
        let transitions = Transitions::watch(&manager);

        assert!(mouse::dispatch(mouse::MouseEvent::click(31, 5)));
        assert_eq!(transitions.shows(), 1);
        assert!(anchor.is_open());

        assert!(mouse::dispatch(mouse::MouseEvent::click(31, 5)));
        assert_eq!(transitions.hides(), 1);
        assert_eq!(transitions.shows(), 1);
        assert!(!anchor.is_open());
    }

    #[test]
    fn test_click_without_template_is_noop() {
        setup();
        let manager = OverlayManager::new();
        let anchor = NotificationAnchor::new(manager.clone(), AnchorProps::new(button()));
        anchor.on_init();
        anchor.on_after_init();

        anchor.on_click();
        assert!(!manager.is_open());
    }

    #[test]
    fn test_cached_state_follows_external_changes() {
        setup();
        let manager = OverlayManager::new();
        let element = button();
        let anchor = mounted(&manager, AnchorProps::new(element));

        let _pending = manager.show(element, NotificationTemplate::new(|_| Box::new(|| {})));
        assert!(anchor.is_open());

        anchor.on_key_up(&KeyboardEvent::release("Escape"));
        assert!(!manager.is_open());
        assert!(!anchor.is_open());
    }

    #[test]
    fn test_dot_leaving_viewport_hides_once() {
        setup();
        let manager = OverlayManager::new();
        let dot = dot();
        let anchor = mounted(&manager, AnchorProps::new(button()).with_dot(dot));
        let transitions = Transitions::watch(&manager);
        assert!(anchor.is_observing());

        // First check: visible, nothing happens
        tick::run_until_idle();
        anchor.on_click();
        assert!(manager.is_open());

        set_rect(dot, Rect::new(37, 40, 1, 1));
        scroll::notify_scroll();
        assert_eq!(transitions.hides(), 1);
        assert!(!manager.is_open());

        scroll::notify_scroll();
        assert_eq!(transitions.hides(), 1);
    }

    #[test]
    fn test_dot_leaving_viewport_while_closed_is_noop() {
        setup();
        let manager = OverlayManager::new();
        let dot = dot();
        let _anchor = mounted(&manager, AnchorProps::new(button()).with_dot(dot));
        let transitions = Transitions::watch(&manager);
        tick::run_until_idle();

        set_rect(dot, Rect::new(37, 40, 1, 1));
        scroll::notify_scroll();
        assert_eq!(transitions.hides(), 0);
    }

    #[test]
    fn test_destroy_while_open() {
        setup();
        let manager = OverlayManager::new();
        let element = button();
        let anchor = mounted(&manager, AnchorProps::new(element).with_dot(dot()));
        let transitions = Transitions::watch(&manager);
        anchor.on_click();

        assert_eq!(visibility::observer_count(), 1);
        assert_eq!(keyboard::key_up_handler_count(), 1);

        anchor.on_destroy();
        assert_eq!(transitions.hides(), 1);
        assert_eq!(visibility::observer_count(), 0);
        assert_eq!(keyboard::key_up_handler_count(), 0);
        assert!(!anchor.is_observing());
        assert_eq!(manager.anchor(), None);

        // Listeners are gone
        assert!(!mouse::dispatch(mouse::MouseEvent::click(31, 5)));
        assert!(!manager.is_open());
    }

    #[test]
    fn test_destroy_while_closed() {
        setup();
        let manager = OverlayManager::new();
        let anchor = mounted(&manager, AnchorProps::new(button()).with_dot(dot()));
        let transitions = Transitions::watch(&manager);

        anchor.on_destroy();
        anchor.on_destroy();
        assert_eq!(transitions.hides(), 0);
        assert_eq!(visibility::observer_count(), 0);
    }

    #[test]
    fn test_destroy_keeps_newer_anchor() {
        setup();
        let manager = OverlayManager::new();
        let first = mounted(&manager, AnchorProps::new(button()));
        let second_element = button();
        let _second = mounted(&manager, AnchorProps::new(second_element));

        first.on_destroy();
        assert_eq!(manager.anchor(), Some(second_element));
    }

    #[test]
    fn test_auto_show() {
        setup();
        let manager = OverlayManager::new();
        let config = NotificationConfig::new("New").auto_show(true);
        let anchor = mounted(&manager, AnchorProps::new(button()).with_config(config));

        assert!(manager.is_open());
        assert!(anchor.is_open());
    }

    #[test]
    fn test_bubble_template_uses_config_title() {
        setup();
        let manager = OverlayManager::new();
        let config = NotificationConfig::new("Saved searches");
        let anchor =
            NotificationAnchor::new(manager.clone(), AnchorProps::new(button()).with_config(config));
        anchor.set_bubble_template();
        anchor.on_init();
        anchor.on_after_init();

        anchor.on_click();
        // Title plus border and padding
        let overlay = manager.overlay_rect().expect("overlay open");
        assert_eq!(overlay.width, "Saved searches".len() as i32 + 4);
    }

    #[test]
    fn test_auto_show_without_template_stays_closed() {
        setup();
        let manager = OverlayManager::new();
        let config = NotificationConfig::new("New").auto_show(true);
        let anchor =
            NotificationAnchor::new(manager.clone(), AnchorProps::new(button()).with_config(config));
        anchor.on_init();
        anchor.on_after_init();

        assert!(!manager.is_open());
    }
}
