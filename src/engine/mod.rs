//! Engine - Element registry and viewport.
//!
//! Elements are NOT objects. They are indices into the registry:
//!
//! ```text
//! Index 0: anchor   (parent=None, rect=(4,10,8,1), focusable)
//! Index 1: dot      (parent=0,    rect=(8,10,1,1))
//! Index 2: layer    (parent=None, z=1000, rect computed by the overlay)
//! ```
//!
//! Indices are recycled; the element ID distinguishes a recycled index from
//! the element that used to live there.

mod registry;
mod viewport;

pub use registry::*;
pub use viewport::*;
