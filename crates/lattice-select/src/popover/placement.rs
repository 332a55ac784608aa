//! Floating panel placement relative to its anchor.

use serde::{Deserialize, Serialize};

use crate::geometry::{Point, Rect, Size};

/// Where the panel sits relative to the trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Placement {
    /// Centered below the anchor.
    Below,
    /// Centered above the anchor.
    Above,
    /// To the left, vertically centered.
    Left,
    /// To the right, vertically centered.
    Right,
    /// Below, left edges aligned.
    #[default]
    BelowAlignLeft,
    /// Below, right edges aligned.
    BelowAlignRight,
    /// Above, left edges aligned.
    AboveAlignLeft,
    /// Above, right edges aligned.
    AboveAlignRight,
}

impl Placement {
    fn is_below(self) -> bool {
        matches!(
            self,
            Placement::Below | Placement::BelowAlignLeft | Placement::BelowAlignRight
        )
    }

    fn is_above(self) -> bool {
        matches!(
            self,
            Placement::Above | Placement::AboveAlignLeft | Placement::AboveAlignRight
        )
    }
}

/// Placement parameters for a floating panel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FloatingOptions {
    pub placement: Placement,
    /// Gap between anchor and panel along the placement axis.
    pub gutter: f32,
    /// Move to the opposite side when the panel would leave the viewport.
    pub flip: bool,
    /// Clamp into the viewport after flipping.
    pub shift: bool,
}

impl Default for FloatingOptions {
    fn default() -> Self {
        Self {
            placement: Placement::default(),
            gutter: 0.0,
            flip: true,
            shift: true,
        }
    }
}

impl FloatingOptions {
    /// Create options for `placement` with the default gutter and flip/shift.
    pub fn new(placement: Placement) -> Self {
        Self {
            placement,
            ..Self::default()
        }
    }

    /// Set the gutter.
    pub fn with_gutter(mut self, gutter: f32) -> Self {
        self.gutter = gutter;
        self
    }

    /// Enable or disable flipping.
    pub fn with_flip(mut self, flip: bool) -> Self {
        self.flip = flip;
        self
    }

    /// Enable or disable shifting.
    pub fn with_shift(mut self, shift: bool) -> Self {
        self.shift = shift;
        self
    }

    /// Compute the panel rectangle.
    ///
    /// `viewport` enables the flip and shift passes.
    pub fn compute(&self, anchor: Rect, panel: Size, viewport: Option<Rect>) -> Rect {
        let mut pos = self.initial_position(self.placement, anchor, panel);
        if let Some(bounds) = viewport {
            pos = self.flip_and_shift(pos, anchor, panel, bounds);
        }
        Rect::new(pos.x, pos.y, panel.width, panel.height)
    }

    fn initial_position(&self, placement: Placement, anchor: Rect, panel: Size) -> Point {
        let center_x = anchor.left() + anchor.width() / 2.0;
        let center_y = anchor.top() + anchor.height() / 2.0;
        let below = anchor.bottom() + self.gutter;
        let above = anchor.top() - self.gutter - panel.height;

        match placement {
            Placement::Below => Point::new(center_x - panel.width / 2.0, below),
            Placement::Above => Point::new(center_x - panel.width / 2.0, above),
            Placement::Left => Point::new(
                anchor.left() - self.gutter - panel.width,
                center_y - panel.height / 2.0,
            ),
            Placement::Right => Point::new(
                anchor.right() + self.gutter,
                center_y - panel.height / 2.0,
            ),
            Placement::BelowAlignLeft => Point::new(anchor.left(), below),
            Placement::BelowAlignRight => Point::new(anchor.right() - panel.width, below),
            Placement::AboveAlignLeft => Point::new(anchor.left(), above),
            Placement::AboveAlignRight => Point::new(anchor.right() - panel.width, above),
        }
    }

    fn flip_and_shift(&self, pos: Point, anchor: Rect, panel: Size, bounds: Rect) -> Point {
        let mut result = pos;
        let panel_rect = Rect::new(pos.x, pos.y, panel.width, panel.height);

        if self.flip {
            let placement = self.placement;
            if placement.is_below() && panel_rect.bottom() > bounds.bottom() {
                result.y = anchor.top() - self.gutter - panel.height;
            } else if placement.is_above() && panel_rect.top() < bounds.top() {
                result.y = anchor.bottom() + self.gutter;
            } else if placement == Placement::Left && panel_rect.left() < bounds.left() {
                result.x = anchor.right() + self.gutter;
            } else if placement == Placement::Right && panel_rect.right() > bounds.right() {
                result.x = anchor.left() - self.gutter - panel.width;
            }
        }

        if self.shift {
            if result.x < bounds.left() {
                result.x = bounds.left();
            } else if result.x + panel.width > bounds.right() {
                result.x = bounds.right() - panel.width;
            }

            if result.y < bounds.top() {
                result.y = bounds.top();
            } else if result.y + panel.height > bounds.bottom() {
                result.y = bounds.bottom() - panel.height;
            }
        }

        result
    }
}
