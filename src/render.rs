//! Paints a [`DrawList`] into a ratatui buffer, one cell per canvas unit.
//!
//! Items arrive back to front and are painted in that order, so later
//! floaters simply overwrite whatever they cover.

use std::fmt;

use ratatui::layout::Rect as CellRect;
use ratatui::style::Style;

use crate::canvas::{DrawItem, DrawList, TabLabel};
use crate::floater::FloaterId;
use crate::geometry::Rect;
use crate::theme;
use crate::ui::UiFrame;

/// Fills the content views of a floater.
pub trait ContentPainter {
    fn paint(&mut self, frame: &mut UiFrame<'_>, floater: FloaterId, slot: u16, area: CellRect);
}

/// Paints nothing; floaters show an empty body.
impl ContentPainter for () {
    fn paint(&mut self, _: &mut UiFrame<'_>, _: FloaterId, _: u16, _: CellRect) {}
}

/// Draws the chrome of a single floater.
pub trait FloaterDecorator: fmt::Debug {
    fn render_floater(&self, frame: &mut UiFrame<'_>, item: &DrawItem);
    fn render_tabs(&self, frame: &mut UiFrame<'_>, strip: Rect, tabs: &[TabLabel]);
}

#[derive(Debug, Default)]
pub struct OpenStepDecorator;

impl OpenStepDecorator {
    fn header_style(item: &DrawItem) -> Style {
        if item.modal {
            theme::header_modal()
        } else if item.focused {
            theme::header_focused()
        } else if item.foreground {
            theme::header_foreground()
        } else {
            theme::header_normal()
        }
    }

    fn render_header(&self, frame: &mut UiFrame<'_>, item: &DrawItem) {
        let rect = item.rect;
        let header_style = Self::header_style(item);
        frame.fill(Rect::new(rect.left, rect.top, rect.right, rect.top + 1), header_style);

        // The title is centred in the space left of the leftmost button.
        let title_right = item
            .buttons
            .iter()
            .map(|(_, r)| r.left)
            .min()
            .unwrap_or(rect.right)
            .min(rect.right);
        let available = title_right - rect.left - 2;
        if available > 0 {
            let len = (item.title.chars().count() as i32).min(available);
            let start = rect.left + 1 + (available - len) / 2;
            frame.set_string(start, rect.top, &item.title, available, header_style);
        }

        let button_style = header_style.patch(theme::button());
        for (button, r) in &item.buttons {
            let mut tmp = [0u8; 4];
            frame.set_symbol(r.left, r.top, button.glyph().encode_utf8(&mut tmp), button_style);
        }
    }

    fn render_border(&self, frame: &mut UiFrame<'_>, item: &DrawItem) {
        let rect = item.rect;
        if rect.height() < 2 || rect.width() < 2 {
            return;
        }
        let style = if item.focused {
            theme::border_focused()
        } else {
            theme::border()
        };
        let right = rect.right - 1;
        let bottom = rect.bottom - 1;
        for y in rect.top + 1..bottom {
            frame.set_symbol(rect.left, y, "│", style);
            frame.set_symbol(right, y, "│", style);
        }
        for x in rect.left + 1..right {
            frame.set_symbol(x, bottom, "─", style);
        }
        frame.set_symbol(rect.left, bottom, "└", style);
        frame.set_symbol(right, bottom, "┘", style);
    }
}

impl FloaterDecorator for OpenStepDecorator {
    fn render_floater(&self, frame: &mut UiFrame<'_>, item: &DrawItem) {
        let rect = item.rect;
        if item.minimized {
            self.render_header(frame, item);
            return;
        }
        frame.fill(rect, theme::body());
        self.render_header(frame, item);
        if !item.hosted {
            self.render_border(frame, item);
        }
        if let Some(strip) = item.tab_strip {
            self.render_tabs(frame, strip, &item.tabs);
        }
    }

    fn render_tabs(&self, frame: &mut UiFrame<'_>, strip: Rect, tabs: &[TabLabel]) {
        frame.fill(strip, theme::tab_strip());
        for tab in tabs {
            // Tabs scrolled out of the strip are not drawn.
            let left = tab.rect.left.max(strip.left);
            let right = tab.rect.right.min(strip.right);
            if right <= left {
                continue;
            }
            let style = if tab.active {
                theme::tab_active()
            } else {
                theme::tab_inactive()
            };
            let visible = Rect::new(left, strip.top, right - 1, strip.bottom);
            frame.fill(visible, style);
            let skip = (left - tab.rect.left - 1).max(0) as usize;
            let label: String = tab.title.chars().skip(skip).collect();
            let start = if skip == 0 { tab.rect.left + 1 } else { left };
            frame.set_string(start, strip.top, &label, right - 1 - start, style);
        }
    }
}

/// Paints a whole frame: every floater back to front, with the backdrop
/// behind the modal dialog when one is active.
pub fn render_canvas(
    frame: &mut UiFrame<'_>,
    list: &DrawList,
    decorator: &dyn FloaterDecorator,
    painter: &mut dyn ContentPainter,
) {
    let area = frame.area();
    let whole = Rect::from_origin_size(
        i32::from(area.x),
        i32::from(area.y),
        i32::from(area.width),
        i32::from(area.height),
    );
    for item in &list.items {
        if item.modal && list.modal_active {
            frame.tint(whole, theme::modal_backdrop());
        }
        decorator.render_floater(frame, item);
        if item.minimized {
            continue;
        }
        for (slot, rect) in &item.content {
            if let Some(cells) = frame.cells_of(*rect) {
                painter.paint(frame, item.id, *slot, cells);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::WindowCanvas;
    use crate::config::FloaterConfig;
    use crate::floater::{ChromeButton, FloaterParams};
    use ratatui::buffer::Buffer;
    use ratatui::widgets::Paragraph;

    fn render(list: &DrawList, width: u16, height: u16, painter: &mut dyn ContentPainter) -> Buffer {
        let area = CellRect::new(0, 0, width, height);
        let mut buffer = Buffer::empty(area);
        let mut frame = UiFrame::from_parts(area, &mut buffer);
        render_canvas(&mut frame, list, &OpenStepDecorator, painter);
        buffer
    }

    fn row(buffer: &Buffer, y: u16) -> String {
        (0..buffer.area.width)
            .map(|x| buffer.cell((x, y)).map(|c| c.symbol().to_string()).unwrap_or_default())
            .collect()
    }

    struct Fill(&'static str);

    impl ContentPainter for Fill {
        fn paint(&mut self, frame: &mut UiFrame<'_>, _: FloaterId, _: u16, area: CellRect) {
            frame.render_widget(Paragraph::new(self.0), area);
        }
    }

    #[test]
    fn window_gets_header_buttons_and_border() {
        let mut canvas = WindowCanvas::new(FloaterConfig::terminal(), 40, 12);
        let id = canvas.create_floater(
            FloaterParams::new("Notes").with_rect(Rect::from_origin_size(2, 1, 20, 6)),
        );
        canvas.open_floater(id);
        canvas.add_content_view(id, 0, Rect::new(1, 1, 19, 5));
        let list = canvas.draw_tick();
        let buffer = render(&list, 40, 12, &mut Fill("hello"));

        assert!(row(&buffer, 1).contains("Notes"));
        let close = list.item(id).unwrap().buttons.iter().find(|(b, _)| *b == ChromeButton::Close).unwrap().1;
        let glyph = ChromeButton::Close.glyph().to_string();
        assert_eq!(buffer.cell((close.left as u16, close.top as u16)).unwrap().symbol(), glyph);
        assert_eq!(buffer.cell((2, 6)).unwrap().symbol(), "└");
        assert!(row(&buffer, 2).contains("hello"));
    }

    #[test]
    fn later_items_cover_earlier_ones() {
        let mut canvas = WindowCanvas::new(FloaterConfig::terminal(), 40, 12);
        let back = canvas.create_floater(
            FloaterParams::new("Back").with_rect(Rect::from_origin_size(0, 0, 20, 6)),
        );
        canvas.open_floater(back);
        let front = canvas.create_floater(
            FloaterParams::new("Front").with_rect(Rect::from_origin_size(0, 0, 20, 6)),
        );
        canvas.open_floater(front);
        let list = canvas.draw_tick();
        let buffer = render(&list, 40, 12, &mut ());
        assert!(row(&buffer, 0).contains("Front"));
        assert!(!row(&buffer, 0).contains("Back"));
    }

    #[test]
    fn offscreen_floaters_do_not_panic() {
        let mut canvas = WindowCanvas::new(FloaterConfig::terminal(), 20, 6);
        let id = canvas.create_floater(
            FloaterParams::new("Edge").with_rect(Rect::from_origin_size(-5, -2, 12, 5)),
        );
        canvas.open_floater(id);
        let mut list = canvas.draw_tick();
        list.items[0].rect = Rect::from_origin_size(-5, -2, 12, 5);
        let buffer = render(&list, 20, 6, &mut ());
        assert_eq!(buffer.cell((0, 2)).unwrap().symbol(), "─");
    }

    #[test]
    fn tabs_label_and_highlight_the_active_one() {
        let strip = Rect::new(0, 1, 30, 2);
        let tabs = vec![
            TabLabel {
                id: FloaterId::default(),
                title: "one".into(),
                rect: Rect::new(0, 1, 12, 2),
                active: false,
            },
            TabLabel {
                id: FloaterId::default(),
                title: "two".into(),
                rect: Rect::new(12, 1, 24, 2),
                active: true,
            },
        ];
        let area = CellRect::new(0, 0, 30, 3);
        let mut buffer = Buffer::empty(area);
        let mut frame = UiFrame::from_parts(area, &mut buffer);
        OpenStepDecorator.render_tabs(&mut frame, strip, &tabs);
        let text = row(&buffer, 1);
        assert!(text.contains("one"));
        assert!(text.contains("two"));
        assert_eq!(buffer.cell((13, 1)).unwrap().bg, theme::tab_active().bg.unwrap());
        assert_eq!(buffer.cell((1, 1)).unwrap().bg, theme::tab_inactive().bg.unwrap());
    }
}
