//! Notification components.
//!
//! - [`NotificationAnchor`] - trigger wiring (click, Escape, visibility dot)
//! - [`NotificationBubble`] - floating content with a pointer toward the anchor
//! - [`NotificationTemplate`] - what an overlay renders when it opens

mod anchor;
mod bubble;
mod template;

pub use anchor::{AnchorProps, NotificationAnchor};
pub use bubble::{BubbleProps, NotificationBubble};
pub use template::{NotificationTemplate, TemplateContext};
