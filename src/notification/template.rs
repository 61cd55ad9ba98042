//! Notification template - what the overlay renders into its layer.
//!
//! A template is a render closure. It runs once per `show`, inside the
//! layer's parent context, so every element it allocates becomes part of the
//! overlay. The returned cleanup runs when the overlay is disposed.

use std::fmt;
use std::rc::Rc;

use super::bubble::{BubbleProps, NotificationBubble};
use crate::overlay::OverlayManager;
use crate::types::Cleanup;

/// Everything a template needs to render.
#[derive(Clone)]
pub struct TemplateContext {
    /// The session that opened the overlay.
    pub manager: OverlayManager,
    /// Root element of the overlay layer (the current parent while rendering).
    pub layer: usize,
    /// The element the notification was requested for.
    pub insertion_point: usize,
}

/// Cheap-to-clone render function.
#[derive(Clone)]
pub struct NotificationTemplate(Rc<dyn Fn(&TemplateContext) -> Cleanup>);

impl fmt::Debug for NotificationTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("NotificationTemplate")
    }
}

impl NotificationTemplate {
    pub fn new<F>(render: F) -> Self
    where
        F: Fn(&TemplateContext) -> Cleanup + 'static,
    {
        Self(Rc::new(render))
    }

    /// A template rendering a standard [`NotificationBubble`].
    ///
    /// The bubble is initialized right after it is built and destroyed with
    /// the overlay.
    pub fn bubble(props: BubbleProps) -> Self {
        Self::new(move |ctx| {
            let bubble = NotificationBubble::new(ctx.manager.clone(), props.clone());
            bubble.on_after_init();
            Box::new(move || bubble.on_destroy())
        })
    }

    pub fn render(&self, ctx: &TemplateContext) -> Cleanup {
        (self.0)(ctx)
    }
}
