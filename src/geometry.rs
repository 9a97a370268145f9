use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// A point in canvas-local pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Integer rectangle in canvas-local pixels.
///
/// `y` grows downward, so a well-formed rect has `left <= right` and
/// `top <= bottom`. `right` and `bottom` are exclusive for hit-testing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub const fn from_origin_size(left: i32, top: i32, width: i32, height: i32) -> Self {
        Self {
            left,
            top,
            right: left + width,
            bottom: top + height,
        }
    }

    pub const fn width(&self) -> i32 {
        self.right - self.left
    }

    pub const fn height(&self) -> i32 {
        self.bottom - self.top
    }

    pub const fn origin(&self) -> Point {
        Point::new(self.left, self.top)
    }

    pub fn is_empty(&self) -> bool {
        self.width() <= 0 || self.height() <= 0
    }

    pub fn translate(&mut self, dx: i32, dy: i32) {
        self.left += dx;
        self.right += dx;
        self.top += dy;
        self.bottom += dy;
    }

    #[must_use]
    pub fn translated(mut self, dx: i32, dy: i32) -> Self {
        self.translate(dx, dy);
        self
    }

    /// Moves the rect so its top-left corner sits at `(left, top)`.
    #[must_use]
    pub fn with_origin(self, left: i32, top: i32) -> Self {
        Self::from_origin_size(left, top, self.width(), self.height())
    }

    /// Keeps the top-left corner and replaces the size.
    #[must_use]
    pub fn with_size(self, width: i32, height: i32) -> Self {
        Self::from_origin_size(self.left, self.top, width, height)
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.left && point.x < self.right && point.y >= self.top && point.y < self.bottom
    }

    pub fn overlaps(&self, other: &Rect) -> bool {
        self.left < other.right
            && other.left < self.right
            && self.top < other.bottom
            && other.top < self.bottom
    }

    #[must_use]
    pub fn union(self, other: Rect) -> Self {
        Self {
            left: self.left.min(other.left),
            top: self.top.min(other.top),
            right: self.right.max(other.right),
            bottom: self.bottom.max(other.bottom),
        }
    }

    /// Grows the rect by `amount` on every side (shrinks when negative).
    #[must_use]
    pub fn stretch(self, amount: i32) -> Self {
        Self {
            left: self.left - amount,
            top: self.top - amount,
            right: self.right + amount,
            bottom: self.bottom + amount,
        }
    }

    /// Centers a rect of this size inside `outer`.
    #[must_use]
    pub fn centered_in(self, outer: Rect) -> Self {
        let left = outer.left + (outer.width() - self.width()) / 2;
        let top = outer.top + (outer.height() - self.height()) / 2;
        self.with_origin(left, top)
    }

    /// Offset that brings this rect inside `constraint`.
    ///
    /// With `allow_partial`, only `keep_onscreen` pixels horizontally and the
    /// title strip at the top need to remain inside; otherwise the rect is
    /// moved fully inside, keeping its top-left corner visible when it is
    /// larger than the constraint.
    pub fn offset_into(&self, constraint: &Rect, allow_partial: bool, keep_onscreen: i32) -> Point {
        let mut dx = 0;
        let mut dy = 0;
        if allow_partial {
            if self.right - keep_onscreen < constraint.left {
                dx = constraint.left - (self.right - keep_onscreen);
            } else if self.left + keep_onscreen > constraint.right {
                dx = constraint.right - (self.left + keep_onscreen);
            }
            if self.top < constraint.top {
                dy = constraint.top - self.top;
            } else if self.top + keep_onscreen > constraint.bottom {
                dy = constraint.bottom - (self.top + keep_onscreen);
            }
        } else {
            if self.left < constraint.left {
                dx = constraint.left - self.left;
            } else if self.right > constraint.right {
                dx = constraint.right - self.right;
                dx += (self.width() - constraint.width()).max(0);
            }
            if self.top < constraint.top {
                dy = constraint.top - self.top;
            } else if self.bottom > constraint.bottom {
                dy = constraint.bottom - self.bottom;
                dy += (self.height() - constraint.height()).max(0);
            }
        }
        Point::new(dx, dy)
    }
}

bitflags! {
    /// Which parent edges a floater keeps its distance to when the canvas is
    /// resized.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Follows: u8 {
        const LEFT = 1 << 0;
        const RIGHT = 1 << 1;
        const TOP = 1 << 2;
        const BOTTOM = 1 << 3;
    }
}

impl Follows {
    /// Moves `rect` to honor these flags after the parent changed size from
    /// `old` to `new`. Following both edges on an axis stretches the rect.
    pub fn apply(self, rect: Rect, old: (i32, i32), new: (i32, i32)) -> Rect {
        let dw = new.0 - old.0;
        let dh = new.1 - old.1;
        let mut out = rect;
        match (self.contains(Follows::LEFT), self.contains(Follows::RIGHT)) {
            (true, true) => out.right += dw,
            (false, true) => out.translate(dw, 0),
            _ => {}
        }
        match (self.contains(Follows::TOP), self.contains(Follows::BOTTOM)) {
            (true, true) => out.bottom += dh,
            (false, true) => out.translate(0, dh),
            _ => {}
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_and_origin() {
        let r = Rect::from_origin_size(10, 20, 30, 40);
        assert_eq!(r.width(), 30);
        assert_eq!(r.height(), 40);
        assert_eq!(r.origin(), Point::new(10, 20));
        assert_eq!(r, Rect::new(10, 20, 40, 60));
    }

    #[test]
    fn contains_is_half_open() {
        let r = Rect::new(0, 0, 10, 10);
        assert!(r.contains(Point::new(0, 0)));
        assert!(r.contains(Point::new(9, 9)));
        assert!(!r.contains(Point::new(10, 5)));
        assert!(!r.contains(Point::new(5, 10)));
    }

    #[test]
    fn overlap_excludes_touching_edges() {
        let a = Rect::new(0, 0, 10, 10);
        assert!(a.overlaps(&Rect::new(5, 5, 15, 15)));
        assert!(!a.overlaps(&Rect::new(10, 0, 20, 10)));
    }

    #[test]
    fn centered_in_outer() {
        let r = Rect::from_origin_size(0, 0, 20, 10).centered_in(Rect::new(0, 0, 100, 50));
        assert_eq!(r, Rect::new(40, 20, 60, 30));
    }

    #[test]
    fn offset_into_full_keeps_top_left_when_too_big() {
        let screen = Rect::new(0, 0, 100, 100);
        let big = Rect::new(50, 50, 250, 250);
        let off = big.offset_into(&screen, false, 16);
        assert_eq!(off, Point::new(-50, -50));
    }

    #[test]
    fn offset_into_partial_keeps_a_strip_visible() {
        let screen = Rect::new(0, 0, 100, 100);
        let r = Rect::new(-80, 10, -20, 50);
        let off = r.offset_into(&screen, true, 16);
        assert_eq!(off, Point::new(36, 0));
        let below = Rect::new(10, 95, 50, 130);
        assert_eq!(below.offset_into(&screen, true, 16), Point::new(0, -11));
    }

    #[test]
    fn follows_right_translates_and_both_stretches() {
        let r = Rect::new(70, 10, 90, 20);
        let moved = Follows::RIGHT.apply(r, (100, 50), (120, 50));
        assert_eq!(moved, Rect::new(90, 10, 110, 20));
        let stretched = (Follows::LEFT | Follows::RIGHT).apply(r, (100, 50), (120, 50));
        assert_eq!(stretched, Rect::new(70, 10, 110, 20));
        let down = (Follows::LEFT | Follows::BOTTOM).apply(r, (100, 50), (100, 70));
        assert_eq!(down, Rect::new(70, 30, 90, 40));
    }
}
