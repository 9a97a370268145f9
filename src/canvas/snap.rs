//! Edge snapping against the usable rect and sibling floaters.

use crate::floater::handles::Side;
use crate::floater::FloaterId;
use crate::geometry::{Point, Rect};

use super::WindowCanvas;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SnapType {
    Parent,
    Siblings,
    #[default]
    ParentAndSiblings,
}

impl SnapType {
    fn parent(self) -> bool {
        matches!(self, SnapType::Parent | SnapType::ParentAndSiblings)
    }

    fn siblings(self) -> bool {
        matches!(self, SnapType::Siblings | SnapType::ParentAndSiblings)
    }
}

/// What a snapped edge ended up against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapTarget {
    Parent,
    Floater(FloaterId),
}

/// Nearest accepted candidate on one axis.
struct AxisSnap {
    offset: i32,
    threshold: i32,
    target: Option<SnapTarget>,
}

impl AxisSnap {
    fn new(threshold: i32) -> Self {
        Self {
            offset: 0,
            threshold,
            target: None,
        }
    }

    /// Offers snapping `edge` onto `to`. Sibling edges only pull while the
    /// pointer moves toward them, so `approach` carries that direction.
    fn offer(&mut self, edge: i32, to: i32, approach: Option<i32>, target: SnapTarget) {
        let diff = edge - to;
        if diff.abs() > self.threshold {
            return;
        }
        if let Some(dir) = approach
            && i64::from(diff) * i64::from(dir) > 0
        {
            return;
        }
        self.offset = to - edge;
        self.threshold = diff.abs();
        self.target = Some(target);
    }
}

fn ranges_overlap(a0: i32, a1: i32, b0: i32, b1: i32) -> bool {
    a0 < b1 && b0 < a1
}

fn ranges_touch(a0: i32, a1: i32, b0: i32, b1: i32) -> bool {
    a0 == b1 || a1 == b0
}

/// Sibling targets win over the parent when both axes snapped.
pub(super) fn combine(x: Option<SnapTarget>, y: Option<SnapTarget>) -> Option<SnapTarget> {
    match (x, y) {
        (Some(SnapTarget::Floater(id)), _) | (_, Some(SnapTarget::Floater(id))) => {
            Some(SnapTarget::Floater(id))
        }
        (None, None) => None,
        _ => Some(SnapTarget::Parent),
    }
}

impl WindowCanvas {
    /// Whether `id` may snap to `other`. A floater never snaps back onto a
    /// dependent that is itself snapped to it.
    fn can_snap_to(&self, id: FloaterId, other: FloaterId) -> bool {
        if other == id || self.live_host(other).is_some() {
            return false;
        }
        let Some(floater) = self.floaters.get(other) else {
            return false;
        };
        if !floater.visible {
            return false;
        }
        !(floater.dependee == Some(id) && floater.snap_target == Some(id))
    }

    fn snap_sibling_ids(&self, id: FloaterId) -> Vec<(FloaterId, Rect)> {
        self.z_order
            .iter()
            .filter(|other| self.can_snap_to(id, **other))
            .filter_map(|other| self.floaters.get(*other).map(|f| (*other, f.rect)))
            .collect()
    }

    /// Snaps a whole rect being moved in direction `dir`. Only the leading
    /// edges on each axis are considered.
    pub fn find_snap_rect(
        &self,
        id: FloaterId,
        candidate: Rect,
        dir: Point,
        snap_type: SnapType,
        threshold: i32,
        padding: i32,
    ) -> (Rect, Option<SnapTarget>) {
        let mut x = AxisSnap::new(threshold);
        let mut y = AxisSnap::new(threshold);
        let c = candidate;

        if snap_type.parent() {
            let parent = self.usable_rect();
            if dir.x <= 0 {
                x.offer(c.left, parent.left, None, SnapTarget::Parent);
            }
            if dir.x >= 0 {
                x.offer(c.right, parent.right, None, SnapTarget::Parent);
            }
            if dir.y <= 0 {
                y.offer(c.top, parent.top, None, SnapTarget::Parent);
            }
            if dir.y >= 0 {
                y.offer(c.bottom, parent.bottom, None, SnapTarget::Parent);
            }
        }

        if snap_type.siblings() {
            for (other, s) in self.snap_sibling_ids(id) {
                let target = SnapTarget::Floater(other);
                let dx = Some(dir.x);
                let dy = Some(dir.y);
                if ranges_overlap(c.top, c.bottom, s.top, s.bottom) {
                    if dir.x <= 0 {
                        x.offer(c.left, s.right + padding, dx, target);
                    }
                    if dir.x >= 0 {
                        x.offer(c.right, s.left - padding, dx, target);
                    }
                }
                if ranges_touch(c.top, c.bottom, s.top, s.bottom) {
                    if dir.x <= 0 {
                        x.offer(c.left, s.left, dx, target);
                    }
                    if dir.x >= 0 {
                        x.offer(c.right, s.right, dx, target);
                    }
                }
                if ranges_overlap(c.left, c.right, s.left, s.right) {
                    if dir.y <= 0 {
                        y.offer(c.top, s.bottom + padding, dy, target);
                    }
                    if dir.y >= 0 {
                        y.offer(c.bottom, s.top - padding, dy, target);
                    }
                }
                if ranges_touch(c.left, c.right, s.left, s.right) {
                    if dir.y <= 0 {
                        y.offer(c.top, s.top, dy, target);
                    }
                    if dir.y >= 0 {
                        y.offer(c.bottom, s.bottom, dy, target);
                    }
                }
            }
        }

        let snapped = candidate.translated(x.offset, y.offset);
        let target = combine(x.target, y.target);
        if target.is_some() {
            tracing::trace!(floater = ?id, ?snapped, ?target, "snapped rect");
        }
        (snapped, target)
    }

    /// Snaps the single edge `side` of a rect being resized. Returns the new
    /// edge coordinate.
    pub fn find_snap_edge(
        &self,
        id: FloaterId,
        candidate: Rect,
        side: Side,
        dir: Point,
        snap_type: SnapType,
        threshold: i32,
        padding: i32,
    ) -> (i32, Option<SnapTarget>) {
        let c = candidate;
        let mut axis = AxisSnap::new(threshold);
        let (edge, dir) = match side {
            Side::Left => (c.left, dir.x),
            Side::Right => (c.right, dir.x),
            Side::Top => (c.top, dir.y),
            Side::Bottom => (c.bottom, dir.y),
        };

        if snap_type.parent() {
            let parent = self.usable_rect();
            let to = match side {
                Side::Left => parent.left,
                Side::Right => parent.right,
                Side::Top => parent.top,
                Side::Bottom => parent.bottom,
            };
            axis.offer(edge, to, None, SnapTarget::Parent);
        }

        if snap_type.siblings() {
            for (other, s) in self.snap_sibling_ids(id) {
                let target = SnapTarget::Floater(other);
                let approach = Some(dir);
                let (overlap, touch) = match side {
                    Side::Left | Side::Right => (
                        ranges_overlap(c.top, c.bottom, s.top, s.bottom),
                        ranges_touch(c.top, c.bottom, s.top, s.bottom),
                    ),
                    Side::Top | Side::Bottom => (
                        ranges_overlap(c.left, c.right, s.left, s.right),
                        ranges_touch(c.left, c.right, s.left, s.right),
                    ),
                };
                let (facing, same) = match side {
                    Side::Left => (s.right + padding, s.left),
                    Side::Right => (s.left - padding, s.right),
                    Side::Top => (s.bottom + padding, s.top),
                    Side::Bottom => (s.top - padding, s.bottom),
                };
                if overlap {
                    axis.offer(edge, facing, approach, target);
                }
                if touch {
                    axis.offer(edge, same, approach, target);
                }
            }
        }

        (edge + axis.offset, axis.target)
    }

    /// Records what a floater snapped to. Only sibling snaps are kept.
    pub fn set_snapped_to(&mut self, id: FloaterId, target: Option<SnapTarget>) {
        if let Some(floater) = self.floaters.get_mut(id) {
            floater.snap_target = match target {
                Some(SnapTarget::Floater(other)) => Some(other),
                _ => None,
            };
        }
    }

    /// Rects floaters can currently snap to besides the usable rect.
    pub fn snap_candidates(&self, id: FloaterId) -> Vec<Rect> {
        self.snap_sibling_ids(id).into_iter().map(|(_, rect)| rect).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;

    #[test]
    fn parent_edge_snaps_from_either_side() {
        let mut canvas = canvas();
        let w = open_at(&mut canvas, "w", Rect::new(400, 100, 600, 300));
        let (rect, target) = canvas.find_snap_rect(
            w,
            Rect::new(605, 100, 805, 300),
            Point::new(205, 0),
            SnapType::ParentAndSiblings,
            5,
            0,
        );
        assert_eq!(rect, Rect::new(600, 100, 800, 300));
        assert_eq!(target, Some(SnapTarget::Parent));

        let (rect, _) = canvas.find_snap_rect(
            w,
            Rect::new(596, 100, 796, 300),
            Point::new(3, 0),
            SnapType::Parent,
            5,
            0,
        );
        assert_eq!(rect.right, 800);
    }

    #[test]
    fn siblings_snap_only_while_approaching() {
        let mut canvas = canvas();
        let s = open_at(&mut canvas, "s", Rect::new(100, 100, 300, 300));
        let w = open_at(&mut canvas, "w", Rect::new(310, 150, 410, 250));

        let (rect, target) = canvas.find_snap_rect(
            w,
            Rect::new(303, 150, 403, 250),
            Point::new(-7, 0),
            SnapType::Siblings,
            5,
            0,
        );
        assert_eq!(rect, Rect::new(300, 150, 400, 250));
        assert_eq!(target, Some(SnapTarget::Floater(s)));

        // Moving away from the sibling leaves the rect alone.
        let (rect, target) = canvas.find_snap_rect(
            w,
            Rect::new(303, 150, 403, 250),
            Point::new(2, 0),
            SnapType::Siblings,
            5,
            0,
        );
        assert_eq!(rect, Rect::new(303, 150, 403, 250));
        assert_eq!(target, None);
    }

    #[test]
    fn touching_siblings_align_shared_edges() {
        let mut canvas = canvas();
        let s = open_at(&mut canvas, "s", Rect::new(100, 100, 300, 300));
        let w = open_at(&mut canvas, "w", Rect::new(200, 300, 400, 400));
        let (rect, target) = canvas.find_snap_rect(
            w,
            Rect::new(103, 300, 303, 400),
            Point::new(-4, 0),
            SnapType::Siblings,
            5,
            0,
        );
        assert_eq!(rect, Rect::new(100, 300, 300, 400));
        assert_eq!(target, Some(SnapTarget::Floater(s)));
    }

    #[test]
    fn nearer_candidate_wins() {
        let mut canvas = canvas();
        let near = open_at(&mut canvas, "near", Rect::new(100, 100, 298, 300));
        let _far = open_at(&mut canvas, "far", Rect::new(100, 300, 296, 500));
        let w = open_at(&mut canvas, "w", Rect::new(350, 250, 450, 350));
        let (rect, target) = canvas.find_snap_rect(
            w,
            Rect::new(299, 250, 399, 350),
            Point::new(-51, 0),
            SnapType::Siblings,
            5,
            0,
        );
        assert_eq!(rect.left, 298);
        assert_eq!(target, Some(SnapTarget::Floater(near)));
    }

    #[test]
    fn never_snaps_onto_own_snapped_dependent() {
        let mut canvas = canvas();
        let base = open_at(&mut canvas, "base", Rect::new(100, 100, 300, 300));
        let dep = open_at(&mut canvas, "dep", Rect::new(300, 100, 400, 200));
        canvas.add_dependent_floater(base, dep, false);
        canvas.set_snapped_to(dep, Some(SnapTarget::Floater(base)));
        let (rect, target) = canvas.find_snap_rect(
            base,
            Rect::new(103, 100, 303, 300),
            Point::new(3, 0),
            SnapType::Siblings,
            5,
            0,
        );
        assert_eq!(rect, Rect::new(103, 100, 303, 300));
        assert_eq!(target, None);
        assert!(canvas.snap_candidates(base).is_empty());
    }

    #[test]
    fn edge_snap_moves_only_that_edge() {
        let mut canvas = canvas();
        let s = open_at(&mut canvas, "s", Rect::new(500, 100, 700, 300));
        let w = open_at(&mut canvas, "w", Rect::new(100, 150, 400, 250));
        let (edge, target) = canvas.find_snap_edge(
            w,
            Rect::new(100, 150, 497, 250),
            Side::Right,
            Point::new(4, 0),
            SnapType::ParentAndSiblings,
            5,
            0,
        );
        assert_eq!(edge, 500);
        assert_eq!(target, Some(SnapTarget::Floater(s)));

        let (edge, target) = canvas.find_snap_edge(
            w,
            Rect::new(100, 3, 400, 250),
            Side::Top,
            Point::new(0, -4),
            SnapType::ParentAndSiblings,
            5,
            0,
        );
        assert_eq!(edge, 0);
        assert_eq!(target, Some(SnapTarget::Parent));
    }
}
