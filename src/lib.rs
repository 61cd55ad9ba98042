//! # spark-notify
//!
//! Anchored notifications for terminal UIs.
//!
//! Built on [spark-signals](https://github.com/RLabs-Inc/spark-signals) for the
//! open-state stream.
//!
//! ## Architecture
//!
//! Elements are indices into a registry, not objects. A notification is an
//! overlay layer (a root element stacked above everything else) positioned
//! next to an anchor element:
//!
//! ```text
//! click / Escape / dot visibility
//!        │
//!        ▼
//! NotificationAnchor ──show/hide──▶ OverlayManager ──PositionUpdate──▶ NotificationBubble
//!                                        │                                   │
//!                                        └── open state, focus memento       └── pointer style
//! ```
//!
//! Deferred work (focus moves, resolving `show`) goes through the next-tick
//! queue in [`state::tick`]; the host drains it after each event.
//!
//! ## Modules
//!
//! - [`types`] - Geometry, position updates, pointer style
//! - [`engine`] - Element registry and viewport
//! - [`state`] - Focus, keyboard, mouse, scroll, visibility, tick, input
//! - [`overlay`] - Positioning strategy and the overlay session
//! - [`notification`] - Anchor, bubble and template components
//! - [`config`] - Component configuration

pub mod config;
pub mod engine;
pub mod error;
pub mod notification;
pub mod overlay;
pub mod state;
pub mod types;

pub use types::*;

pub use config::NotificationConfig;
pub use error::{ConfigError, ShowError};

pub use engine::{
    allocate_element, allocate_root_element, get_rect, is_allocated, release_element,
    reset_registry, set_rect, set_terminal_size, viewport, with_parent, ElementProps,
};

pub use overlay::{
    ConnectedPosition, FlexibleConnectedStrategy, OverlayManager, ShowFuture, DEFAULT_POSITIONS,
};

pub use notification::{
    AnchorProps, BubbleProps, NotificationAnchor, NotificationBubble, NotificationTemplate,
    TemplateContext,
};

pub use state::{
    focus::{active_element, blur, focus, is_focused, FocusedElement},
    input::{route_event, InputEvent},
    keyboard::{KeyboardEvent, KeyState, Modifiers},
    mouse::{MouseEvent, MouseButton, MouseAction},
    reset_all_state,
    tick::{defer, run_tick, run_until_idle},
};
