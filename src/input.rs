//! Pointer events as the canvas sees them, and their translation from
//! crossterm mouse events.

use std::time::{Duration, Instant};

use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};

use crate::constants::DOUBLE_CLICK_MILLIS;
use crate::geometry::Point;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    Down,
    Up,
    Drag,
    Moved,
    ScrollUp,
    ScrollDown,
}

/// A primary-button pointer event in canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerEvent {
    pub kind: PointerKind,
    pub position: Point,
    /// Set on the second `Down` of a double-click.
    pub double_click: bool,
}

impl PointerEvent {
    pub fn new(kind: PointerKind, x: i32, y: i32) -> Self {
        Self {
            kind,
            position: Point::new(x, y),
            double_click: false,
        }
    }

    pub fn down(x: i32, y: i32) -> Self {
        Self::new(PointerKind::Down, x, y)
    }

    pub fn drag(x: i32, y: i32) -> Self {
        Self::new(PointerKind::Drag, x, y)
    }

    pub fn up(x: i32, y: i32) -> Self {
        Self::new(PointerKind::Up, x, y)
    }

    pub fn with_double_click(mut self) -> Self {
        self.double_click = true;
        self
    }
}

/// Translates a crossterm mouse event, one cell per canvas unit. Buttons
/// other than the left one are ignored.
pub fn pointer_from_mouse(event: &MouseEvent) -> Option<PointerEvent> {
    let kind = match event.kind {
        MouseEventKind::Down(MouseButton::Left) => PointerKind::Down,
        MouseEventKind::Up(MouseButton::Left) => PointerKind::Up,
        MouseEventKind::Drag(MouseButton::Left) => PointerKind::Drag,
        MouseEventKind::Moved => PointerKind::Moved,
        MouseEventKind::ScrollUp => PointerKind::ScrollUp,
        MouseEventKind::ScrollDown => PointerKind::ScrollDown,
        _ => return None,
    };
    Some(PointerEvent::new(
        kind,
        i32::from(event.column),
        i32::from(event.row),
    ))
}

/// Marks a `Down` as a double-click when it lands on the same spot as the
/// previous one within the click window.
#[derive(Debug, Clone)]
pub struct ClickTracker {
    window: Duration,
    last_down: Option<(Point, Instant)>,
}

impl Default for ClickTracker {
    fn default() -> Self {
        Self::new(Duration::from_millis(DOUBLE_CLICK_MILLIS))
    }
}

impl ClickTracker {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_down: None,
        }
    }

    pub fn observe(&mut self, mut event: PointerEvent, now: Instant) -> PointerEvent {
        if event.kind != PointerKind::Down {
            return event;
        }
        match self.last_down {
            Some((position, at))
                if position == event.position && now.duration_since(at) <= self.window =>
            {
                event.double_click = true;
                // A third click starts a new pair.
                self.last_down = None;
            }
            _ => self.last_down = Some((event.position, now)),
        }
        event
    }
}
