//! Core types shared by the overlay engine and the notification components.
//!
//! Coordinates are terminal cells. They are signed because content scrolled
//! above or left of the viewport has negative coordinates.

use std::fmt;

// =============================================================================
// Cleanup
// =============================================================================

/// Cleanup function returned by components and subscriptions.
///
/// Call this to unmount the component or drop the subscription.
pub type Cleanup = Box<dyn FnOnce()>;

// =============================================================================
// Geometry
// =============================================================================

/// Width and height in cells.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

/// Axis-aligned rectangle in cells.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    /// Create a new rect.
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    /// Rect at `(x, y)` with the given size.
    pub const fn from_size(x: i32, y: i32, size: Size) -> Self {
        Self::new(x, y, size.width, size.height)
    }

    #[inline]
    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    #[inline]
    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Check if a point is inside this rect.
    #[inline]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Check if `other` lies entirely within this rect.
    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Compute intersection of two rects.
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let x1 = self.x.max(other.x);
        let y1 = self.y.max(other.y);
        let x2 = self.right().min(other.right());
        let y2 = self.bottom().min(other.bottom());

        if x2 > x1 && y2 > y1 {
            Some(Rect::new(x1, y1, x2 - x1, y2 - y1))
        } else {
            None
        }
    }

    /// Area of the part of this rect that is inside `bounds`.
    pub fn visible_area(&self, bounds: &Rect) -> i64 {
        self.intersect(bounds)
            .map(|r| r.width as i64 * r.height as i64)
            .unwrap_or(0)
    }
}

// =============================================================================
// Placement sides
// =============================================================================

/// Vertical edge of the overlay that touches the anchor.
///
/// `Top` means the overlay's top edge is attached (the overlay sits below the
/// anchor); `Bottom` means it sits above.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VerticalSide {
    Top,
    Bottom,
}

/// Horizontal edge the overlay is aligned on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HorizontalSide {
    Start,
    End,
}

/// Anchor-relative placement published whenever the overlay is positioned.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionUpdate {
    pub vertical_side: VerticalSide,
    pub horizontal_side: HorizontalSide,
    pub horizontal_offset: f32,
}

bitflags::bitflags! {
    /// Which placement sides differ between two position updates.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct SideChange: u8 {
        const NONE = 0;
        const VERTICAL = 1 << 0;
        const HORIZONTAL = 1 << 1;
    }
}

impl SideChange {
    /// Compare the sides last seen against a fresh update.
    pub fn between(
        previous: (Option<VerticalSide>, Option<HorizontalSide>),
        update: &PositionUpdate,
    ) -> Self {
        let mut change = SideChange::NONE;
        if previous.0 != Some(update.vertical_side) {
            change |= SideChange::VERTICAL;
        }
        if previous.1 != Some(update.horizontal_side) {
            change |= SideChange::HORIZONTAL;
        }
        change
    }
}

// =============================================================================
// Pointer style
// =============================================================================

/// Inline style of the bubble's pointer (the little arrow toward the anchor).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum PointerStyle {
    /// No position has been published yet.
    #[default]
    Unset,
    /// Offset from the start (left) edge.
    Left(f32),
    /// Offset from the end (right) edge.
    Right(f32),
    /// Pointer hidden.
    Hidden,
}

impl PointerStyle {
    /// The single style property this pointer style assigns, if any.
    pub fn property(&self) -> Option<(&'static str, String)> {
        match self {
            PointerStyle::Unset => None,
            PointerStyle::Left(px) => Some(("left", format!("{px}px"))),
            PointerStyle::Right(px) => Some(("right", format!("{px}px"))),
            PointerStyle::Hidden => Some(("display", "none".to_string())),
        }
    }
}

impl fmt::Display for PointerStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.property() {
            Some((name, value)) => write!(f, "{name}: {value}"),
            None => Ok(()),
        }
    }
}
