//! Axis-aligned screen rectangles.
//!
//! Rectangles are exclusive on their right and bottom edges, matching the
//! blit and fill conventions of the rendering toolkit: a rectangle covers
//! pixels `left..right` by `top..bottom`.

/// Rectangle with exclusive right/bottom edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Build a rectangle from its top-left corner and dimensions.
    pub fn from_size(left: i32, top: i32, width: i32, height: i32) -> Self {
        Self {
            left,
            top,
            right: left + width,
            bottom: top + height,
        }
    }

    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }

    /// A rectangle is empty when it covers no pixels.
    pub fn is_empty(&self) -> bool {
        self.right <= self.left || self.bottom <= self.top
    }

    /// Intersection of two rectangles. May be empty.
    pub fn intersect(&self, other: &Rect) -> Rect {
        Rect {
            left: self.left.max(other.left),
            top: self.top.max(other.top),
            right: self.right.min(other.right),
            bottom: self.bottom.min(other.bottom),
        }
    }

    /// True when `other` lies entirely within `self`.
    pub fn contains(&self, other: &Rect) -> bool {
        other.left >= self.left
            && other.top >= self.top
            && other.right <= self.right
            && other.bottom <= self.bottom
    }

    /// Shift the rectangle by the given offsets.
    pub fn translate(&self, dx: i32, dy: i32) -> Rect {
        Rect {
            left: self.left + dx,
            top: self.top + dy,
            right: self.right + dx,
            bottom: self.bottom + dy,
        }
    }

    /// Clamp the rectangle to a `[0,width] x [0,height]` surface.
    ///
    /// The result always satisfies `left <= right` and `top <= bottom`.
    pub fn clip_to_surface(&self, width: u32, height: u32) -> Rect {
        let w = width as i32;
        let h = height as i32;
        let left = self.left.clamp(0, w);
        let top = self.top.clamp(0, h);
        Rect {
            left,
            top,
            right: self.right.clamp(left, w),
            bottom: self.bottom.clamp(top, h),
        }
    }
}
