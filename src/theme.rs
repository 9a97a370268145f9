use ratatui::style::{Color, Modifier, Style};

// Centralized theme colors, kept as small helpers so the renderer never
// hard-codes a color.

pub fn desktop_bg() -> Color {
    Color::Reset
}

// Window chrome
pub fn header_focused() -> Style {
    Style::default()
        .bg(Color::Blue)
        .fg(Color::White)
        .add_modifier(Modifier::BOLD)
}

/// Header of a window in the focused window's dependency group.
pub fn header_foreground() -> Style {
    Style::default().bg(Color::Indexed(24)).fg(Color::White)
}

pub fn header_normal() -> Style {
    Style::default().bg(Color::DarkGray).fg(Color::White)
}

pub fn header_modal() -> Style {
    Style::default()
        .bg(Color::Magenta)
        .fg(Color::White)
        .add_modifier(Modifier::BOLD)
}

pub fn border() -> Style {
    Style::default().fg(Color::DarkGray)
}

pub fn border_focused() -> Style {
    Style::default().fg(Color::Gray)
}

pub fn body() -> Style {
    Style::default().bg(Color::Black).fg(Color::Gray)
}

pub fn button() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

// Tab strip
pub fn tab_strip() -> Style {
    Style::default().bg(Color::Black).fg(Color::DarkGray)
}

pub fn tab_active() -> Style {
    Style::default()
        .bg(Color::Gray)
        .fg(Color::Black)
        .add_modifier(Modifier::BOLD)
}

pub fn tab_inactive() -> Style {
    Style::default().bg(Color::DarkGray).fg(Color::White)
}

/// Dims everything behind a modal dialog.
pub fn modal_backdrop() -> Style {
    Style::default()
        .fg(Color::DarkGray)
        .add_modifier(Modifier::DIM)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn focused_header_stands_out_from_normal() {
        assert_ne!(header_focused().bg, header_normal().bg);
        assert_ne!(header_modal().bg, header_focused().bg);
        assert_ne!(tab_active().bg, tab_inactive().bg);
    }
}
