//! Where floaters go: cascade placement for new floaters, the minimized
//! tile grid, keeping floaters on screen and following canvas resizes.

use crate::constants::NEIGHBOR_SEARCH_ATTEMPTS;
use crate::floater::FloaterId;
use crate::geometry::{Follows, Point, Rect};

use super::WindowCanvas;

/// Next cascade slot. Each new floater lands one step down and to the
/// right of the previous one; a column that runs out of room starts a new
/// one a step further right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CascadeCursor {
    next_left: i32,
    next_top: i32,
    column: i32,
}

impl WindowCanvas {
    fn cascade_area(&self) -> Rect {
        self.usable_rect().stretch(-self.config.cascade_inset)
    }

    pub fn reset_starting_floater_position(&mut self) {
        let area = self.cascade_area();
        self.cascade = CascadeCursor {
            next_left: area.left,
            next_top: area.top,
            column: 0,
        };
    }

    /// Origin for a new floater of the given size. Deterministic for a given
    /// sequence of calls.
    pub fn new_floater_position(&mut self, width: i32, height: i32) -> Point {
        let area = self.cascade_area();
        let step = self.config.cascade_step;
        let fits = |c: &CascadeCursor| {
            c.next_left + width <= area.right && c.next_top + height <= area.bottom
        };
        if !fits(&self.cascade) {
            self.cascade.column += 1;
            self.cascade.next_left = area.left + step * self.cascade.column;
            self.cascade.next_top = area.top;
            if !fits(&self.cascade) {
                self.reset_starting_floater_position();
            }
        }
        let origin = Point::new(self.cascade.next_left, self.cascade.next_top);
        self.cascade.next_left += step;
        self.cascade.next_top += step;
        origin
    }

    /// First free cell of the minimized tile grid, filled left to right
    /// along the bottom of the usable rect and then upward.
    pub fn minimize_position(&self) -> Point {
        let area = self.usable_rect();
        let (width, height) = (self.config.minimized_width, self.config.minimized_height());
        let fallback = Point::new(area.left, area.bottom - height);
        if width <= 0 || height <= 0 {
            return fallback;
        }
        let columns = (area.width() / width).max(1);
        let rows = (area.height() / height).max(1);
        for row in 0..rows {
            let top = area.bottom - (row + 1) * height;
            for column in 0..columns {
                let cell = Rect::from_origin_size(area.left + column * width, top, width, height);
                let taken = self
                    .z_order
                    .iter()
                    .filter_map(|id| self.floaters.get(*id))
                    .any(|f| f.minimized && cell.contains(f.rect.origin()));
                if !taken {
                    return cell.origin();
                }
            }
        }
        fallback
    }

    pub fn minimized_tile_count(&self) -> usize {
        self.z_order
            .iter()
            .filter(|id| self.floaters.get(**id).is_some_and(|f| f.minimized))
            .count()
    }

    /// Brings a floater back inside the usable rect, shrinking resizable
    /// floaters that are larger than it (never below their minimum size).
    ///
    /// With `allow_partial` the floater may hang outside as long as its
    /// title strip and `keep_onscreen` pixels stay reachable. A floater
    /// that had to move loses its snap target.
    pub fn adjust_to_fit_screen(&mut self, id: FloaterId, allow_partial: bool) {
        if self.live_host(id).is_some() {
            return;
        }
        let Some(floater) = self.floaters.get(id) else {
            return;
        };
        let screen = self.usable_rect();
        let current = floater.rect;
        let mut rect = current;

        if floater.is_resizable() && !floater.minimized {
            let (min_width, min_height) = floater.min_size();
            let width = current.width().min(screen.width()).max(min_width);
            let height = current.height().min(screen.height()).max(min_height);
            if width != current.width() || height != current.height() {
                let follows = floater.follows;
                rect = current.with_size(width, height);
                if follows.contains(Follows::RIGHT) && !follows.contains(Follows::LEFT) {
                    rect.translate(current.width() - width, 0);
                }
                if follows.contains(Follows::BOTTOM) && !follows.contains(Follows::TOP) {
                    rect.translate(0, current.height() - height);
                }
            }
        }

        let offset = rect.offset_into(&screen, allow_partial, self.config.keep_onscreen);
        rect.translate(offset.x, offset.y);
        if rect == current {
            return;
        }
        let moved = rect.origin() != current.origin();
        self.set_floater_rect(id, rect);
        if moved && let Some(floater) = self.floaters.get_mut(id) {
            floater.snap_target = None;
        }
        tracing::trace!(floater = ?id, ?rect, "adjusted to fit screen");
    }

    /// Spot next to `base` for `neighbor`, trying right, left, below and
    /// above in that order. Visible dependents already hugging `base` count
    /// as part of it.
    pub fn find_neighboring_position(&self, base: FloaterId, neighbor: FloaterId) -> Rect {
        let (Some(base_floater), Some(neighbor_floater)) =
            (self.floaters.get(base), self.floaters.get(neighbor))
        else {
            return Rect::default();
        };
        let current = neighbor_floater.rect;
        let (width, height) = (current.width(), current.height());

        let mut base_rect = base_floater.rect;
        let search_area = base_rect.stretch(self.config.neighbor_search_margin);
        for sibling in self.live_dependents(base) {
            if sibling == neighbor {
                continue;
            }
            if let Some(s) = self.floaters.get(sibling)
                && s.visible
                && search_area.overlaps(&s.rect)
            {
                base_rect = base_rect.union(s.rect);
            }
        }

        let screen = self.usable_rect();
        let mut left_margin = (base_rect.left - screen.left).max(0);
        let mut right_margin = (screen.right - base_rect.right).max(0);
        let mut top_margin = (base_rect.top - screen.top).max(0);
        let mut bottom_margin = (screen.bottom - base_rect.bottom).max(0);
        let step = self.config.neighbor_search_step;

        for _ in 0..NEIGHBOR_SEARCH_ATTEMPTS {
            if right_margin > width {
                return current.with_origin(base_rect.right, base_rect.top);
            } else if left_margin > width {
                return current.with_origin(base_rect.left - width, base_rect.top);
            } else if bottom_margin > height {
                return current.with_origin(base_rect.left, base_rect.bottom);
            } else if top_margin > height {
                return current.with_origin(base_rect.left, base_rect.top - height);
            }
            left_margin += step;
            right_margin += step;
            top_margin += step;
            bottom_margin += step;
        }
        current
    }

    /// Resizes the canvas. Each free-floating floater follows the nearer
    /// horizontal edge (and, with `adjust_vertical`, the nearer vertical
    /// one). Dependents at any depth copy the root of their chain.
    /// Minimized tiles stick to the bottom-left.
    pub fn reshape_canvas(&mut self, width: i32, height: i32, adjust_vertical: bool) {
        let old = self.rect;
        let ids = self.z_order.clone();
        for id in &ids {
            let Some(floater) = self.floaters.get(*id) else {
                continue;
            };
            if floater.minimized {
                let follows = Follows::LEFT | Follows::BOTTOM;
                if let Some(f) = self.floaters.get_mut(*id) {
                    f.follows = follows;
                }
                continue;
            }
            let root = self.root_dependee(*id);
            if root != *id && self.in_canvas(root) {
                continue;
            }
            let r = floater.rect;
            let mut follows = if (r.left - old.left).abs() < (old.right - r.right).abs() {
                Follows::LEFT
            } else {
                Follows::RIGHT
            };
            follows |= if !adjust_vertical || (r.top - old.top).abs() < (old.bottom - r.bottom).abs() {
                Follows::TOP
            } else {
                Follows::BOTTOM
            };
            for member in std::iter::once(*id).chain(self.dependency_subtree(*id)) {
                if let Some(f) = self.floaters.get_mut(member)
                    && (member == *id || !f.minimized)
                {
                    f.follows = follows;
                }
            }
        }

        let old_size = (old.width(), old.height());
        let new_size = (width, height);
        for id in ids {
            let Some(floater) = self.floaters.get(id) else {
                continue;
            };
            let rect = floater.follows.apply(floater.rect, old_size, new_size);
            if rect != floater.rect {
                self.set_floater_rect(id, rect);
            }
        }

        self.rect = Rect::from_origin_size(old.left, old.top, width, height);
        if let Some(snap) = self.snap_rect {
            self.snap_rect = Some(Follows::all().apply(snap, old_size, new_size));
        }
        tracing::debug!(width, height, "canvas reshaped");
    }

    pub fn restore_all(&mut self) {
        for id in self.z_order.clone() {
            self.set_minimized(id, false);
        }
    }

    /// Moves every minimized tile, e.g. when a toolbar takes space at the
    /// bottom of the canvas.
    pub fn shift_minimized(&mut self, dx: i32, dy: i32) {
        for id in self.z_order.clone() {
            if let Some(floater) = self.floaters.get(id)
                && floater.minimized
            {
                let rect = floater.rect.translated(dx, dy);
                self.set_floater_rect(id, rect);
            }
        }
    }

    /// Per-frame fit: open floaters may hang partly off screen, tiles may not.
    pub(crate) fn refresh(&mut self) {
        for id in self.z_order.clone() {
            let Some(floater) = self.floaters.get(id) else {
                continue;
            };
            if floater.visible {
                let partial = !floater.minimized;
                self.adjust_to_fit_screen(id, partial);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::config::FloaterConfig;
    use crate::floater::FloaterParams;

    #[test]
    fn cascade_is_deterministic_and_starts_new_columns() {
        let mut canvas = canvas();
        let first: Vec<Point> = (0..3).map(|_| canvas.new_floater_position(300, 200)).collect();
        assert_eq!(
            first,
            vec![Point::new(16, 16), Point::new(41, 41), Point::new(66, 66)]
        );

        canvas.reset_starting_floater_position();
        let all: Vec<Point> = (0..16).map(|_| canvas.new_floater_position(300, 200)).collect();
        assert_eq!(all[14], Point::new(16 + 14 * 25, 16 + 14 * 25));
        assert_eq!(all[15], Point::new(41, 16));

        let mut again = super::super::WindowCanvas::new(FloaterConfig::default(), 800, 600);
        let replay: Vec<Point> = (0..16).map(|_| again.new_floater_position(300, 200)).collect();
        assert_eq!(all, replay);
    }

    #[test]
    fn cascade_resets_when_a_new_column_does_not_fit() {
        let mut canvas = super::super::WindowCanvas::new(FloaterConfig::default(), 350, 260);
        assert_eq!(canvas.new_floater_position(300, 200), Point::new(16, 16));
        assert_eq!(canvas.new_floater_position(300, 200), Point::new(16, 16));
    }

    #[test]
    fn floaters_without_rect_are_cascaded_at_default_size() {
        let mut canvas = canvas();
        let a = canvas.create_floater(FloaterParams::new("a"));
        let b = canvas.create_floater(FloaterParams::new("b"));
        canvas.open_floater(a);
        canvas.open_floater(b);
        assert_eq!(canvas.floater(a).unwrap().rect(), Rect::from_origin_size(16, 16, 300, 200));
        assert_eq!(canvas.floater(b).unwrap().rect(), Rect::from_origin_size(41, 41, 300, 200));
    }

    #[test]
    fn minimized_tiles_fill_the_bottom_row() {
        let mut canvas = canvas();
        let a = open_at(&mut canvas, "a", Rect::from_origin_size(10, 10, 100, 80));
        let b = open_at(&mut canvas, "b", Rect::from_origin_size(200, 10, 100, 80));
        let c = open_at(&mut canvas, "c", Rect::from_origin_size(400, 10, 100, 80));
        canvas.set_minimized(a, true);
        canvas.set_minimized(b, true);
        assert_eq!(canvas.floater(b).unwrap().rect().origin(), Point::new(160, 582));
        canvas.set_minimized(a, false);
        canvas.set_minimized(c, true);
        assert_eq!(canvas.floater(c).unwrap().rect().origin(), Point::new(0, 582));
        assert_eq!(canvas.minimized_tile_count(), 2);
    }

    #[test]
    fn fit_screen_moves_and_shrinks() {
        let mut canvas = canvas();
        let a = open_at(&mut canvas, "a", Rect::from_origin_size(10, 10, 300, 200));
        canvas.set_floater_rect(a, Rect::from_origin_size(700, 500, 300, 200));
        canvas.adjust_to_fit_screen(a, false);
        assert_eq!(canvas.floater(a).unwrap().rect(), Rect::from_origin_size(500, 400, 300, 200));

        canvas.set_floater_rect(a, Rect::from_origin_size(-50, -50, 1000, 800));
        canvas.adjust_to_fit_screen(a, false);
        assert_eq!(canvas.floater(a).unwrap().rect(), Rect::from_origin_size(0, 0, 800, 600));
    }

    #[test]
    fn fit_screen_respects_min_size_and_partial_mode() {
        let mut canvas = canvas();
        let id = canvas.create_floater(
            FloaterParams::new("big")
                .with_rect(Rect::from_origin_size(0, 0, 100, 100))
                .with_min_size(900, 100),
        );
        canvas.open_floater(id);
        let rect = canvas.floater(id).unwrap().rect();
        assert_eq!(rect.width(), 900);
        assert_eq!(rect.left, 0);

        let a = open_at(&mut canvas, "a", Rect::from_origin_size(10, 10, 100, 80));
        canvas.set_floater_rect(a, Rect::from_origin_size(790, 100, 100, 80));
        canvas.adjust_to_fit_screen(a, true);
        assert_eq!(canvas.floater(a).unwrap().rect().left, 784);
    }

    #[test]
    fn neighbor_search_prefers_right_then_left() {
        let mut canvas = canvas();
        let base = open_at(&mut canvas, "base", Rect::new(100, 100, 300, 300));
        let dep = open_at(&mut canvas, "dep", Rect::from_origin_size(500, 500, 100, 100));
        assert_eq!(
            canvas.find_neighboring_position(base, dep),
            Rect::new(300, 100, 400, 200)
        );

        canvas.set_floater_rect(base, Rect::new(600, 100, 790, 300));
        assert_eq!(
            canvas.find_neighboring_position(base, dep),
            Rect::new(500, 100, 600, 200)
        );
    }

    #[test]
    fn neighbor_search_skips_past_adjacent_dependents() {
        let mut canvas = canvas();
        let base = open_at(&mut canvas, "base", Rect::new(100, 100, 300, 300));
        let first = open_at(&mut canvas, "first", Rect::from_origin_size(0, 400, 100, 100));
        let second = open_at(&mut canvas, "second", Rect::from_origin_size(0, 400, 100, 100));
        assert!(canvas.add_dependent_floater(base, first, true));
        assert_eq!(canvas.floater(first).unwrap().rect(), Rect::new(300, 100, 400, 200));
        assert!(canvas.add_dependent_floater(base, second, true));
        assert_eq!(canvas.floater(second).unwrap().rect(), Rect::new(400, 100, 500, 200));
    }

    #[test]
    fn canvas_resize_keeps_nearest_edges() {
        let mut canvas = canvas();
        let left = open_at(&mut canvas, "left", Rect::from_origin_size(10, 10, 100, 80));
        let right = open_at(&mut canvas, "right", Rect::from_origin_size(690, 500, 100, 80));
        let tile = open_at(&mut canvas, "tile", Rect::from_origin_size(300, 200, 100, 80));
        canvas.set_minimized(tile, true);

        canvas.reshape_canvas(900, 700, true);
        assert_eq!(canvas.floater(left).unwrap().rect(), Rect::from_origin_size(10, 10, 100, 80));
        assert_eq!(canvas.floater(right).unwrap().rect(), Rect::from_origin_size(790, 600, 100, 80));
        assert_eq!(canvas.floater(tile).unwrap().rect().origin(), Point::new(0, 682));

        canvas.reshape_canvas(800, 600, false);
        assert_eq!(canvas.floater(right).unwrap().rect(), Rect::from_origin_size(690, 600, 100, 80));
    }

    #[test]
    fn canvas_resize_moves_a_dependency_chain_with_its_root() {
        let mut canvas = canvas();
        let root = open_at(&mut canvas, "root", Rect::from_origin_size(600, 10, 100, 80));
        let middle = open_at(&mut canvas, "middle", Rect::from_origin_size(10, 150, 100, 80));
        let leaf = open_at(&mut canvas, "leaf", Rect::from_origin_size(10, 300, 100, 80));
        assert!(canvas.add_dependent_floater(root, middle, false));
        assert!(canvas.add_dependent_floater(middle, leaf, false));
        assert_eq!(canvas.dependency_subtree(root), vec![middle, leaf]);
        assert_eq!(canvas.root_dependee(leaf), root);

        // The root sits nearer the right edge; the left-hugging chain
        // members follow it anyway.
        canvas.reshape_canvas(1000, 600, false);
        for id in [root, middle, leaf] {
            assert_eq!(
                canvas.floater(id).unwrap().follows,
                Follows::RIGHT | Follows::TOP
            );
        }
        assert_eq!(canvas.floater(root).unwrap().rect(), Rect::from_origin_size(800, 10, 100, 80));
        assert_eq!(canvas.floater(middle).unwrap().rect(), Rect::from_origin_size(210, 150, 100, 80));
        assert_eq!(canvas.floater(leaf).unwrap().rect(), Rect::from_origin_size(210, 300, 100, 80));
    }

    #[test]
    fn shift_and_restore_all() {
        let mut canvas = canvas();
        let a = open_at(&mut canvas, "a", Rect::from_origin_size(10, 10, 100, 80));
        let b = open_at(&mut canvas, "b", Rect::from_origin_size(200, 10, 100, 80));
        canvas.set_minimized(a, true);
        canvas.shift_minimized(0, -20);
        assert_eq!(canvas.floater(a).unwrap().rect().origin(), Point::new(0, 562));
        assert_eq!(canvas.floater(b).unwrap().rect().origin(), Point::new(200, 10));
        canvas.restore_all();
        assert_eq!(canvas.floater(a).unwrap().rect(), Rect::from_origin_size(10, 10, 100, 80));
    }
}
