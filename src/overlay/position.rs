//! Connected positioning - place an overlay next to an anchor rect.
//!
//! A [`ConnectedPosition`] pairs a point on the anchor (the origin) with a
//! point on the overlay. The [`FlexibleConnectedStrategy`] tries its
//! positions in order and uses the first one whose overlay rect fits in the
//! viewport, which flips the overlay above the anchor when there is no room
//! below it.

use crate::types::{HorizontalSide, PositionUpdate, Rect, Size, VerticalSide};

/// Horizontal distance between the overlay edge and the anchor edge.
pub const DEFAULT_OFFSET: i32 = 18;

/// One candidate placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectedPosition {
    pub origin_x: HorizontalSide,
    pub origin_y: VerticalSide,
    pub overlay_x: HorizontalSide,
    pub overlay_y: VerticalSide,
    pub offset_x: i32,
    pub offset_y: i32,
}

impl ConnectedPosition {
    pub const fn new(
        origin: (HorizontalSide, VerticalSide),
        overlay: (HorizontalSide, VerticalSide),
        offset_x: i32,
    ) -> Self {
        Self {
            origin_x: origin.0,
            origin_y: origin.1,
            overlay_x: overlay.0,
            overlay_y: overlay.1,
            offset_x,
            offset_y: 0,
        }
    }

    /// Where an overlay of `size` lands for this position.
    pub fn overlay_rect(&self, anchor: Rect, size: Size) -> Rect {
        let origin_x = match self.origin_x {
            HorizontalSide::Start => anchor.x,
            HorizontalSide::End => anchor.right(),
        };
        let origin_y = match self.origin_y {
            VerticalSide::Top => anchor.y,
            VerticalSide::Bottom => anchor.bottom(),
        };
        let x = match self.overlay_x {
            HorizontalSide::Start => origin_x,
            HorizontalSide::End => origin_x - size.width,
        };
        let y = match self.overlay_y {
            VerticalSide::Top => origin_y,
            VerticalSide::Bottom => origin_y - size.height,
        };
        Rect::from_size(x + self.offset_x, y + self.offset_y, size)
    }

    /// The simplified update published to the notification bubble.
    pub fn to_update(&self) -> PositionUpdate {
        PositionUpdate {
            vertical_side: self.overlay_y,
            horizontal_side: self.overlay_x,
            horizontal_offset: self.offset_x as f32,
        }
    }
}

use HorizontalSide::{End, Start};
use VerticalSide::{Bottom, Top};

/// Start-below, end-below, start-above, end-above.
pub const DEFAULT_POSITIONS: [ConnectedPosition; 4] = [
    ConnectedPosition::new((Start, Bottom), (Start, Top), -DEFAULT_OFFSET),
    ConnectedPosition::new((End, Bottom), (End, Top), DEFAULT_OFFSET),
    ConnectedPosition::new((Start, Top), (Start, Bottom), -DEFAULT_OFFSET),
    ConnectedPosition::new((End, Top), (End, Bottom), DEFAULT_OFFSET),
];

/// Result of applying a strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppliedPosition {
    pub rect: Rect,
    pub position: ConnectedPosition,
    /// False when no position fit and the most visible one was used.
    pub fits: bool,
}

/// Ordered fallback positioning with automatic flipping.
#[derive(Debug, Clone)]
pub struct FlexibleConnectedStrategy {
    positions: Vec<ConnectedPosition>,
    last: Option<AppliedPosition>,
}

impl FlexibleConnectedStrategy {
    pub fn new(positions: Vec<ConnectedPosition>) -> Self {
        Self {
            positions,
            last: None,
        }
    }

    pub fn positions(&self) -> &[ConnectedPosition] {
        &self.positions
    }

    /// The most recently applied position.
    pub fn last_applied(&self) -> Option<AppliedPosition> {
        self.last
    }

    /// Pick a position for an overlay of `size` next to `anchor`.
    ///
    /// The first position that fits entirely inside `viewport` wins. If none
    /// fits, the one with the largest visible area is used (earliest on ties).
    /// Returns None only when there are no positions.
    pub fn apply(&mut self, anchor: Rect, size: Size, viewport: Rect) -> Option<AppliedPosition> {
        let mut best: Option<(i64, AppliedPosition)> = None;

        for position in &self.positions {
            let rect = position.overlay_rect(anchor, size);
            if viewport.contains_rect(&rect) {
                let applied = AppliedPosition {
                    rect,
                    position: *position,
                    fits: true,
                };
                self.last = Some(applied);
                return Some(applied);
            }

            let area = rect.visible_area(&viewport);
            if best.is_none_or(|(best_area, _)| area > best_area) {
                best = Some((
                    area,
                    AppliedPosition {
                        rect,
                        position: *position,
                        fits: false,
                    },
                ));
            }
        }

        let applied = best.map(|(_, applied)| applied);
        if applied.is_some() {
            self.last = applied;
        }
        applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWPORT: Rect = Rect::new(0, 0, 80, 24);

    #[test]
    fn test_overlay_rect_below_start() {
        let anchor = Rect::new(30, 5, 8, 1);
        let rect = DEFAULT_POSITIONS[0].overlay_rect(anchor, Size::new(20, 4));
        assert_eq!(rect, Rect::new(12, 6, 20, 4));
    }

    #[test]
    fn test_overlay_rect_above_end() {
        let anchor = Rect::new(30, 10, 8, 1);
        let rect = DEFAULT_POSITIONS[3].overlay_rect(anchor, Size::new(20, 4));
        // End edge at 38, shifted 18 right, bottom edge on the anchor's top
        assert_eq!(rect, Rect::new(36, 6, 20, 4));
    }

    #[test]
    fn test_first_fitting_position_wins() {
        let mut strategy = FlexibleConnectedStrategy::new(DEFAULT_POSITIONS.to_vec());
        let applied = strategy
            .apply(Rect::new(30, 5, 8, 1), Size::new(20, 4), VIEWPORT)
            .unwrap();

        assert!(applied.fits);
        assert_eq!(applied.position, DEFAULT_POSITIONS[0]);
        assert_eq!(strategy.last_applied(), Some(applied));
    }

    #[test]
    fn test_flip_to_end_near_left_edge() {
        let mut strategy = FlexibleConnectedStrategy::new(DEFAULT_POSITIONS.to_vec());
        // Start alignment would put the overlay at x = -16
        let applied = strategy
            .apply(Rect::new(2, 5, 8, 1), Size::new(20, 4), VIEWPORT)
            .unwrap();

        assert_eq!(applied.position, DEFAULT_POSITIONS[1]);
        assert_eq!(applied.rect, Rect::new(8, 6, 20, 4));
    }

    #[test]
    fn test_flip_above_near_bottom() {
        let mut strategy = FlexibleConnectedStrategy::new(DEFAULT_POSITIONS.to_vec());
        let applied = strategy
            .apply(Rect::new(30, 22, 8, 1), Size::new(20, 4), VIEWPORT)
            .unwrap();

        assert_eq!(applied.position, DEFAULT_POSITIONS[2]);
        assert_eq!(applied.position.to_update().vertical_side, VerticalSide::Bottom);
    }

    #[test]
    fn test_fallback_to_most_visible() {
        let mut strategy = FlexibleConnectedStrategy::new(DEFAULT_POSITIONS.to_vec());
        // Too tall to fit anywhere; more room below than above
        let applied = strategy
            .apply(Rect::new(30, 4, 8, 1), Size::new(20, 30), VIEWPORT)
            .unwrap();

        assert!(!applied.fits);
        assert_eq!(applied.position, DEFAULT_POSITIONS[0]);
    }

    #[test]
    fn test_no_positions() {
        let mut strategy = FlexibleConnectedStrategy::new(Vec::new());
        assert_eq!(strategy.apply(Rect::new(0, 0, 1, 1), Size::new(1, 1), VIEWPORT), None);
    }

    #[test]
    fn test_to_update() {
        let update = DEFAULT_POSITIONS[1].to_update();
        assert_eq!(update.horizontal_side, HorizontalSide::End);
        assert_eq!(update.vertical_side, VerticalSide::Top);
        assert_eq!(update.horizontal_offset, 18.0);
    }
}
