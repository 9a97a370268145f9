//! Pointer-driven moves and resizes through the title bar, the edge bars
//! and the corner handles.

use crate::floater::handles::{
    edge_position, resize_edge, with_edge_at, Corner, HandleKind, MouseDirection, Side,
};
use crate::floater::{ChildKind, FloaterId, ViewId};
use crate::geometry::Point;

use super::snap::{combine, SnapType};
use super::WindowCanvas;

/// An active drag. The handle view holds the mouse capture for as long as
/// the session lives; losing the capture ends it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragSession {
    pub(crate) floater: FloaterId,
    pub(crate) handle: HandleKind,
    pub(crate) view: ViewId,
    start_pointer: Point,
    last_screen: Point,
    direction: MouseDirection,
}

impl DragSession {
    pub fn floater(&self) -> FloaterId {
        self.floater
    }

    pub fn handle(&self) -> HandleKind {
        self.handle
    }
}

impl WindowCanvas {
    /// Starts dragging `handle` of a floater. Refused when the floater lacks
    /// the capability for it.
    pub fn begin_drag(&mut self, id: FloaterId, handle: HandleKind, pointer: Point) -> bool {
        let Some(floater) = self.floaters.get(id) else {
            return false;
        };
        let hosted = self.live_host(id).is_some();
        let allowed = match handle {
            HandleKind::Title if hosted => floater.can_tear_off(),
            HandleKind::Title => floater.can_drag() || floater.docked,
            HandleKind::Bar(_) | HandleKind::Corner(_) => {
                !hosted && !floater.minimized && floater.is_resizable()
            }
        };
        if !allowed {
            return false;
        }
        let view = ViewId::Child(id, handle.child_kind());
        self.arbiter.set_mouse_capture(Some(view));
        self.process_arbiter_events();
        self.drag = Some(DragSession {
            floater: id,
            handle,
            view,
            start_pointer: pointer,
            last_screen: pointer,
            direction: MouseDirection::new(pointer),
        });
        tracing::trace!(floater = ?id, ?handle, x = pointer.x, y = pointer.y, "drag started");
        true
    }

    /// Feeds a pointer move into the active drag. Returns whether a drag
    /// consumed it.
    pub fn drag_to(&mut self, pointer: Point) -> bool {
        self.process_arbiter_events();
        let Some(mut session) = self.drag else {
            return false;
        };
        if self.arbiter.mouse_capture() != Some(session.view) || !self.contains(session.floater) {
            self.drag = None;
            return false;
        }
        let dir = session.direction.update(pointer);
        let delta = Point::new(
            pointer.x - session.last_screen.x,
            pointer.y - session.last_screen.y,
        );
        match session.handle {
            HandleKind::Title => self.drag_title(&mut session, pointer, dir, delta),
            HandleKind::Bar(side) => self.drag_bar(&mut session, side, dir, delta),
            HandleKind::Corner(corner) => self.drag_corner(&mut session, corner, dir, delta),
        }
        if self.drag.is_some_and(|d| d.floater == session.floater) {
            self.drag = Some(session);
        }
        true
    }

    /// Ends the drag and releases its capture.
    pub fn end_drag(&mut self) {
        let Some(session) = self.drag.take() else {
            return;
        };
        self.arbiter.release_mouse_capture(session.view);
        if let Some(host) = self.live_host(session.floater)
            && let Some(tabs) = self.floaters.get_mut(host).and_then(|h| h.tabbed_host_mut())
        {
            tabs.autoscroll_mut().stop();
        }
        self.process_arbiter_events();
        tracing::trace!(floater = ?session.floater, "drag ended");
    }

    fn drag_title(&mut self, session: &mut DragSession, pointer: Point, dir: Point, delta: Point) {
        let id = session.floater;
        let threshold = self.config.undock_threshold;
        let excursion = (pointer.y - session.start_pointer.y).abs();

        if let Some(host) = self.live_host(id) {
            if excursion <= threshold {
                self.update_tab_autoscroll(host, pointer);
                return;
            }
            let Some(rect) = self.floaters.get(id).map(|f| f.rect) else {
                return;
            };
            let grab_x = (session.start_pointer.x - rect.left).clamp(0, (rect.width() - 1).max(0));
            let grab_y = self.config.header_height / 2;
            self.tear_off(id);
            if let Some(torn) = self.floaters.get(id).map(|f| f.rect) {
                self.reshape_floater(id, torn.with_origin(pointer.x - grab_x, pointer.y - grab_y), true);
                self.adjust_to_fit_screen(id, true);
            }
            session.view = ViewId::Child(id, ChildKind::DragHandle);
            session.last_screen = pointer;
            self.arbiter.set_mouse_capture(Some(session.view));
            self.process_arbiter_events();
            self.drag = Some(*session);
            tracing::debug!(floater = ?id, host = ?host, "floater torn off by drag");
            return;
        }

        if self.floaters.get(id).is_some_and(|f| f.docked) {
            if excursion <= threshold {
                return;
            }
            if let Some(floater) = self.floaters.get_mut(id) {
                floater.docked = false;
            }
            tracing::debug!(floater = ?id, "floater undocked by drag");
        }

        let Some(old) = self.floaters.get(id).map(|f| f.rect) else {
            return;
        };
        let candidate = old.translated(delta.x, delta.y);
        let (snapped, target) = self.find_snap_rect(
            id,
            candidate,
            dir,
            SnapType::ParentAndSiblings,
            self.config.snap_margin,
            0,
        );
        self.set_snapped_to(id, target);
        self.reshape_floater(id, snapped, true);
        if let Some(new) = self.floaters.get(id).map(|f| f.rect) {
            session.last_screen.x += new.left - old.left;
            session.last_screen.y += new.top - old.top;
        }
    }

    fn drag_bar(&mut self, session: &mut DragSession, side: Side, dir: Point, delta: Point) {
        let id = session.floater;
        let Some((old, min)) = self.floaters.get(id).map(|f| (f.rect, f.min_size())) else {
            return;
        };
        let amount = match side {
            Side::Left | Side::Right => delta.x,
            Side::Top | Side::Bottom => delta.y,
        };
        let candidate = resize_edge(old, side, amount, min);
        let (edge, target) = self.find_snap_edge(
            id,
            candidate,
            side,
            dir,
            SnapType::ParentAndSiblings,
            self.config.snap_margin,
            0,
        );
        let snapped = with_edge_at(candidate, side, edge, min);
        self.set_snapped_to(id, target);
        self.reshape_floater(id, snapped, true);

        let Some(new) = self.floaters.get(id).map(|f| f.rect) else {
            return;
        };
        let moved = edge_position(&new, side) - edge_position(&old, side);
        match side {
            Side::Left | Side::Right => session.last_screen.x += moved,
            Side::Top | Side::Bottom => session.last_screen.y += moved,
        }
    }

    fn drag_corner(&mut self, session: &mut DragSession, corner: Corner, dir: Point, delta: Point) {
        let id = session.floater;
        let Some((old, min)) = self.floaters.get(id).map(|f| (f.rect, f.min_size())) else {
            return;
        };
        let (horizontal, vertical) = (corner.horizontal(), corner.vertical());
        let mut candidate = resize_edge(old, horizontal, delta.x, min);
        candidate = resize_edge(candidate, vertical, delta.y, min);

        let margin = self.config.snap_margin;
        let snap = SnapType::ParentAndSiblings;
        let (x_edge, x_target) = self.find_snap_edge(id, candidate, horizontal, dir, snap, margin, 0);
        candidate = with_edge_at(candidate, horizontal, x_edge, min);
        let (y_edge, y_target) = self.find_snap_edge(id, candidate, vertical, dir, snap, margin, 0);
        candidate = with_edge_at(candidate, vertical, y_edge, min);

        self.set_snapped_to(id, combine(x_target, y_target));
        self.reshape_floater(id, candidate, true);

        let Some(new) = self.floaters.get(id).map(|f| f.rect) else {
            return;
        };
        session.last_screen.x += edge_position(&new, horizontal) - edge_position(&old, horizontal);
        session.last_screen.y += edge_position(&new, vertical) - edge_position(&old, vertical);
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::floater::FloaterParams;
    use crate::geometry::Rect;

    #[test]
    fn overhanging_window_is_pulled_on_screen_when_opened() {
        let mut canvas = canvas();
        let w = open_at(&mut canvas, "w", Rect::new(100, 500, 300, 700));
        assert_eq!(canvas.floater(w).unwrap().rect(), Rect::new(100, 400, 300, 600));

        // Nothing within snapping range once it moves 205px right.
        assert!(canvas.begin_drag(w, HandleKind::Title, Point::new(200, 405)));
        canvas.drag_to(Point::new(405, 405));
        assert_eq!(canvas.floater(w).unwrap().rect(), Rect::new(305, 400, 505, 600));
        canvas.end_drag();
    }

    // A window opened at (100,500,300,700) on this 800x600 canvas overhangs
    // the bottom edge, so opening pulls it up before any drag, and a left
    // edge snapped to x=800 would leave it wholly off screen. The snap is
    // checked instead with an on-screen window whose right edge meets x=800
    // after the same 205px drag.
    #[test]
    fn title_drag_snaps_to_canvas_edge() {
        let mut canvas = canvas();
        let w = open_at(&mut canvas, "w", Rect::new(400, 100, 600, 300));
        assert!(canvas.begin_drag(w, HandleKind::Title, Point::new(500, 105)));
        assert_eq!(canvas.mouse_capture(), Some(ViewId::Child(w, ChildKind::DragHandle)));

        assert!(canvas.drag_to(Point::new(705, 105)));
        assert_eq!(canvas.floater(w).unwrap().rect(), Rect::new(600, 100, 800, 300));
        assert_eq!(canvas.floater(w).unwrap().snap_target(), None);

        // The pointer keeps driving the window past the snap.
        canvas.drag_to(Point::new(715, 105));
        assert_eq!(canvas.floater(w).unwrap().rect(), Rect::new(615, 100, 815, 300));

        canvas.end_drag();
        assert_eq!(canvas.mouse_capture(), None);
        assert!(canvas.drag_session().is_none());
    }

    #[test]
    fn title_drag_records_sibling_snap_target() {
        let mut canvas = canvas();
        let s = open_at(&mut canvas, "s", Rect::new(100, 100, 300, 300));
        let w = open_at(&mut canvas, "w", Rect::new(350, 150, 450, 250));
        canvas.begin_drag(w, HandleKind::Title, Point::new(400, 155));
        canvas.drag_to(Point::new(353, 155));
        assert_eq!(canvas.floater(w).unwrap().rect(), Rect::new(300, 150, 400, 250));
        assert_eq!(canvas.floater(w).unwrap().snap_target(), Some(s));
    }

    #[test]
    fn edge_bar_respects_minimum_size() {
        let mut canvas = canvas();
        let id = canvas.create_floater(
            FloaterParams::new("w")
                .with_rect(Rect::new(100, 100, 400, 300))
                .with_min_size(100, 50),
        );
        canvas.open_floater(id);
        assert!(canvas.begin_drag(id, HandleKind::Bar(Side::Right), Point::new(399, 200)));
        canvas.drag_to(Point::new(100, 200));
        assert_eq!(canvas.floater(id).unwrap().rect(), Rect::new(100, 100, 200, 300));
        canvas.end_drag();
    }

    #[test]
    fn corner_drag_moves_two_edges() {
        let mut canvas = canvas();
        let id = open_at(&mut canvas, "w", Rect::new(100, 100, 400, 300));
        assert!(canvas.begin_drag(id, HandleKind::Corner(Corner::LeftTop), Point::new(101, 101)));
        canvas.drag_to(Point::new(81, 131));
        assert_eq!(canvas.floater(id).unwrap().rect(), Rect::new(80, 130, 400, 300));
    }

    #[test]
    fn fixed_size_floaters_refuse_resize() {
        let mut canvas = canvas();
        let id = open_fixed(&mut canvas, "w", Rect::new(100, 100, 400, 300));
        assert!(!canvas.begin_drag(id, HandleKind::Bar(Side::Left), Point::new(100, 200)));
        assert_eq!(canvas.mouse_capture(), None);
    }

    #[test]
    fn losing_capture_cancels_the_drag() {
        let mut canvas = canvas();
        let w = open_at(&mut canvas, "w", Rect::new(100, 100, 300, 300));
        canvas.begin_drag(w, HandleKind::Title, Point::new(150, 105));
        canvas.set_mouse_capture(Some(ViewId::Canvas));
        assert!(!canvas.drag_to(Point::new(200, 105)));
        assert!(canvas.drag_session().is_none());
        assert_eq!(canvas.floater(w).unwrap().rect(), Rect::new(100, 100, 300, 300));
    }

    #[test]
    fn docked_floater_undocks_past_threshold() {
        let mut canvas = canvas();
        let w = open_at(&mut canvas, "w", Rect::new(100, 100, 300, 300));
        canvas.set_can_dock(w, true);
        canvas.set_docked(w, true);
        canvas.begin_drag(w, HandleKind::Title, Point::new(150, 105));
        canvas.drag_to(Point::new(190, 110));
        assert_eq!(canvas.floater(w).unwrap().rect(), Rect::new(100, 100, 300, 300));
        canvas.drag_to(Point::new(190, 135));
        assert!(!canvas.floater(w).unwrap().is_docked());
        assert_eq!(canvas.floater(w).unwrap().rect(), Rect::new(140, 130, 340, 330));
    }
}
