//! Overlay - the floating layer that hosts an open notification.
//!
//! - **Position** - Connected positions and the flexible (flipping) strategy
//! - **Layer** - The live layer: root element, subscribers, cleanups
//! - **Manager** - The overlay session: open state, anchor, focus memento

mod layer;
mod manager;
pub mod position;

pub use layer::OVERLAY_Z_INDEX;
pub use manager::{OverlayManager, ShowFuture, WeakOverlayManager};
pub use position::{
    AppliedPosition, ConnectedPosition, FlexibleConnectedStrategy, DEFAULT_OFFSET,
    DEFAULT_POSITIONS,
};
