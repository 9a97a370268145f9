use crate::geometry::{Point, Rect};

use super::ChildKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Side {
    Left,
    Top,
    Right,
    Bottom,
}

impl Side {
    pub const ALL: [Side; 4] = [Side::Left, Side::Top, Side::Right, Side::Bottom];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Corner {
    LeftTop,
    RightTop,
    LeftBottom,
    RightBottom,
}

impl Corner {
    pub const ALL: [Corner; 4] = [
        Corner::LeftTop,
        Corner::RightTop,
        Corner::LeftBottom,
        Corner::RightBottom,
    ];

    pub fn horizontal(self) -> Side {
        match self {
            Corner::LeftTop | Corner::LeftBottom => Side::Left,
            Corner::RightTop | Corner::RightBottom => Side::Right,
        }
    }

    pub fn vertical(self) -> Side {
        match self {
            Corner::LeftTop | Corner::RightTop => Side::Top,
            Corner::LeftBottom | Corner::RightBottom => Side::Bottom,
        }
    }
}

/// The chrome piece a drag started on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandleKind {
    Title,
    Bar(Side),
    Corner(Corner),
}

impl HandleKind {
    pub fn from_child(kind: ChildKind) -> Option<Self> {
        match kind {
            ChildKind::DragHandle => Some(HandleKind::Title),
            ChildKind::ResizeBar(side) => Some(HandleKind::Bar(side)),
            ChildKind::ResizeHandle(corner) => Some(HandleKind::Corner(corner)),
            _ => None,
        }
    }

    pub fn child_kind(self) -> ChildKind {
        match self {
            HandleKind::Title => ChildKind::DragHandle,
            HandleKind::Bar(side) => ChildKind::ResizeBar(side),
            HandleKind::Corner(corner) => ChildKind::ResizeHandle(corner),
        }
    }
}

/// Pointer direction with hysteresis: an axis the pointer did not move on
/// keeps its previous direction, so snapping keeps following the user's
/// intent after the mouse comes to rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseDirection {
    last_pointer: Point,
    last_dir: Point,
}

impl MouseDirection {
    pub fn new(start: Point) -> Self {
        Self {
            last_pointer: start,
            last_dir: Point::default(),
        }
    }

    pub fn update(&mut self, pointer: Point) -> Point {
        let dir = Point::new(
            if pointer.x == self.last_pointer.x {
                self.last_dir.x
            } else {
                pointer.x - self.last_pointer.x
            },
            if pointer.y == self.last_pointer.y {
                self.last_dir.y
            } else {
                pointer.y - self.last_pointer.y
            },
        );
        self.last_dir = dir;
        self.last_pointer = pointer;
        dir
    }

    pub fn direction(&self) -> Point {
        self.last_dir
    }
}

/// Moves one edge of `rect` by `delta` along its axis, clamping the
/// resulting size to `min`. The opposite edge never moves.
pub fn resize_edge(rect: Rect, side: Side, delta: i32, min: (i32, i32)) -> Rect {
    let (min_w, min_h) = min;
    let mut out = rect;
    match side {
        Side::Left => {
            let width = (rect.width() - delta).max(min_w);
            out.left = rect.right - width;
        }
        Side::Right => {
            let width = (rect.width() + delta).max(min_w);
            out.right = rect.left + width;
        }
        Side::Top => {
            let height = (rect.height() - delta).max(min_h);
            out.top = rect.bottom - height;
        }
        Side::Bottom => {
            let height = (rect.height() + delta).max(min_h);
            out.bottom = rect.top + height;
        }
    }
    out
}

/// Moves the two edges meeting at `corner`.
pub fn resize_corner(rect: Rect, corner: Corner, delta: Point, min: (i32, i32)) -> Rect {
    let out = resize_edge(rect, corner.horizontal(), delta.x, min);
    resize_edge(out, corner.vertical(), delta.y, min)
}

/// Where the moving edge of a bar resize currently sits.
pub fn edge_position(rect: &Rect, side: Side) -> i32 {
    match side {
        Side::Left => rect.left,
        Side::Top => rect.top,
        Side::Right => rect.right,
        Side::Bottom => rect.bottom,
    }
}

/// Replaces one edge coordinate, keeping the opposite edge and honoring the
/// minimum size.
pub fn with_edge_at(rect: Rect, side: Side, position: i32, min: (i32, i32)) -> Rect {
    let delta = position - edge_position(&rect, side);
    resize_edge(rect, side, delta, min)
}

/// Local rects of the resize bars for a floater of the given size.
pub fn bar_rect(side: Side, width: i32, height: i32, thickness: i32) -> Rect {
    match side {
        Side::Left => Rect::new(0, 0, thickness, height),
        Side::Top => Rect::new(0, 0, width, thickness),
        Side::Right => Rect::new(width - thickness, 0, width, height),
        Side::Bottom => Rect::new(0, height - thickness, width, height),
    }
}

/// Local rects of the corner handles for a floater of the given size.
pub fn corner_rect(corner: Corner, width: i32, height: i32, size: i32) -> Rect {
    match corner {
        Corner::LeftTop => Rect::new(0, 0, size, size),
        Corner::RightTop => Rect::new(width - size, 0, width, size),
        Corner::LeftBottom => Rect::new(0, height - size, size, height),
        Corner::RightBottom => Rect::new(width - size, height - size, width, height),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_keeps_last_motion_on_idle_axis() {
        let mut dir = MouseDirection::new(Point::new(10, 10));
        assert_eq!(dir.update(Point::new(14, 10)), Point::new(4, 0));
        assert_eq!(dir.update(Point::new(14, 8)), Point::new(4, -2));
        assert_eq!(dir.update(Point::new(14, 8)), Point::new(4, -2));
        assert_eq!(dir.update(Point::new(12, 8)), Point::new(-2, -2));
    }

    #[test]
    fn left_edge_resize_keeps_right_edge() {
        let rect = Rect::new(100, 100, 300, 200);
        let out = resize_edge(rect, Side::Left, 30, (50, 20));
        assert_eq!(out, Rect::new(130, 100, 300, 200));
        let clamped = resize_edge(rect, Side::Left, 190, (50, 20));
        assert_eq!(clamped, Rect::new(250, 100, 300, 200));
    }

    #[test]
    fn bottom_edge_clamps_to_min_height() {
        let rect = Rect::new(0, 0, 100, 100);
        let out = resize_edge(rect, Side::Bottom, -95, (10, 20));
        assert_eq!(out, Rect::new(0, 0, 100, 20));
    }

    #[test]
    fn corner_moves_both_edges() {
        let rect = Rect::new(100, 100, 300, 200);
        let out = resize_corner(rect, Corner::LeftTop, Point::new(-10, -20), (50, 20));
        assert_eq!(out, Rect::new(90, 80, 300, 200));
        let out = resize_corner(rect, Corner::RightBottom, Point::new(5, 7), (50, 20));
        assert_eq!(out, Rect::new(100, 100, 305, 207));
    }

    #[test]
    fn with_edge_at_targets_absolute_position() {
        let rect = Rect::new(100, 100, 300, 200);
        assert_eq!(
            with_edge_at(rect, Side::Right, 320, (10, 10)),
            Rect::new(100, 100, 320, 200)
        );
        assert_eq!(
            with_edge_at(rect, Side::Top, 90, (10, 10)),
            Rect::new(100, 90, 300, 200)
        );
    }

    #[test]
    fn handle_kind_maps_to_child_and_back() {
        for kind in [
            HandleKind::Title,
            HandleKind::Bar(Side::Right),
            HandleKind::Corner(Corner::LeftBottom),
        ] {
            assert_eq!(HandleKind::from_child(kind.child_kind()), Some(kind));
        }
    }
}
