//! UiFrame: a thin wrapper around `ratatui::Frame` that clamps drawing to the
//! visible area.
//!
//! Floaters live in signed canvas coordinates and are allowed to hang off
//! any edge of the terminal, so every draw call goes through here and is
//! clipped against the buffer before it touches a cell.
use ratatui::Frame;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::widgets::Widget;

use crate::geometry;

pub struct UiFrame<'a> {
    area: Rect,
    buffer: &'a mut Buffer,
}

impl<'a> UiFrame<'a> {
    pub fn new(frame: &'a mut Frame<'_>) -> Self {
        let area = frame.area();
        let buffer = frame.buffer_mut();
        Self { area, buffer }
    }

    pub fn from_parts(area: Rect, buffer: &'a mut Buffer) -> Self {
        Self { area, buffer }
    }

    pub fn area(&self) -> Rect {
        self.area
    }

    pub fn buffer_mut(&mut self) -> &mut Buffer {
        self.buffer
    }

    fn clip_rect(&self, rect: Rect) -> Option<Rect> {
        let clipped = rect.intersection(self.area);
        if clipped.width == 0 || clipped.height == 0 {
            None
        } else {
            Some(clipped)
        }
    }

    /// The visible cells of a canvas rect, or `None` when it is entirely
    /// off screen.
    pub fn cells_of(&self, rect: geometry::Rect) -> Option<Rect> {
        clip_signed(rect, self.area)
    }

    pub fn render_widget<W>(&mut self, widget: W, area: Rect)
    where
        W: Widget,
    {
        if let Some(clipped) = self.clip_rect(area) {
            widget.render(clipped, self.buffer);
        }
    }

    /// Paints every visible cell of `rect` blank with `style`.
    pub fn fill(&mut self, rect: geometry::Rect, style: Style) {
        let Some(cells) = self.cells_of(rect) else {
            return;
        };
        for y in cells.y..cells.y.saturating_add(cells.height) {
            for x in cells.x..cells.x.saturating_add(cells.width) {
                if let Some(cell) = self.buffer.cell_mut((x, y)) {
                    cell.reset();
                    cell.set_symbol(" ");
                    cell.set_style(style);
                }
            }
        }
    }

    /// Overlays `style` on visible cells without touching their symbols.
    pub fn tint(&mut self, rect: geometry::Rect, style: Style) {
        let Some(cells) = self.cells_of(rect) else {
            return;
        };
        self.buffer.set_style(cells, style);
    }

    /// Writes a single glyph at a signed position, dropping it when off
    /// screen.
    pub fn set_symbol(&mut self, x: i32, y: i32, symbol: &str, style: Style) {
        if !self.contains_cell(x, y) {
            return;
        }
        if let Some(cell) = self.buffer.cell_mut((x as u16, y as u16)) {
            cell.set_symbol(symbol);
            cell.set_style(style);
        }
    }

    /// Writes `text` starting at a signed position, at most `max_width`
    /// cells wide. Characters left of the screen are skipped, not shifted.
    pub fn set_string(&mut self, x: i32, y: i32, text: &str, max_width: i32, style: Style) {
        let text = truncate_to_width(text, max_width.max(0) as usize);
        for (offset, ch) in text.chars().enumerate() {
            let mut tmp = [0u8; 4];
            self.set_symbol(x + offset as i32, y, ch.encode_utf8(&mut tmp), style);
        }
    }

    fn contains_cell(&self, x: i32, y: i32) -> bool {
        let left = i32::from(self.area.x);
        let top = i32::from(self.area.y);
        x >= left
            && y >= top
            && x < left + i32::from(self.area.width)
            && y < top + i32::from(self.area.height)
    }
}

/// Intersects a signed canvas rect with a cell area.
pub fn clip_signed(rect: geometry::Rect, area: Rect) -> Option<Rect> {
    let left = rect.left.max(i32::from(area.x));
    let top = rect.top.max(i32::from(area.y));
    let right = rect.right.min(i32::from(area.x) + i32::from(area.width));
    let bottom = rect.bottom.min(i32::from(area.y) + i32::from(area.height));
    if right <= left || bottom <= top {
        return None;
    }
    Some(Rect {
        x: left as u16,
        y: top as u16,
        width: (right - left) as u16,
        height: (bottom - top) as u16,
    })
}

pub fn truncate_to_width(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_string();
    }
    value.chars().take(width).collect()
}
