use crate::config::FloaterConfig;
use crate::geometry::Rect;

use super::handles::{bar_rect, corner_rect};
use super::{ChildKind, ChromeButton, Floater};

/// Lays out the chrome children for the floater's current size.
pub(crate) fn layout(floater: &mut Floater, config: &FloaterConfig) {
    let width = floater.rect.width();
    let height = floater.rect.height();
    let header = config.header_height.min(height.max(0));
    let button_size = floater.button_size;
    let enabled = floater.buttons_enabled;

    let mut slot = 0;
    for child in floater.children.iter_mut() {
        child.rect = match child.kind {
            ChildKind::DragHandle => Rect::new(0, 0, width, header),
            ChildKind::ResizeBar(side) => {
                bar_rect(side, width, height, config.resize_bar_thickness)
            }
            ChildKind::ResizeHandle(corner) => {
                corner_rect(corner, width, height, config.resize_corner_size)
            }
            ChildKind::Button(_) | ChildKind::Content(_) => continue,
        };
    }

    // Buttons stack right-to-left in their declared order; disabled ones
    // take no room.
    for button in ChromeButton::ALL {
        let rect = if enabled.contains(button.flag()) {
            let right = width - 1 - slot * (button_size + 1);
            let top = ((header - button_size) / 2).max(0);
            slot += 1;
            Rect::new(right - button_size, top, right, top + button_size)
        } else {
            Rect::default()
        };
        if let Some(child) = floater.child_mut(ChildKind::Button(button)) {
            child.rect = rect;
        }
    }
}

/// Hides everything except the title strip while minimized, remembering
/// which children were already hidden so restoring does not reveal them.
pub(crate) fn hide_for_minimize(floater: &mut Floater) {
    floater.hidden_before_minimize = floater
        .children
        .iter()
        .filter(|c| !c.visible)
        .map(|c| c.kind)
        .collect();
    for child in floater.children.iter_mut() {
        let keep = matches!(child.kind, ChildKind::DragHandle | ChildKind::Button(_));
        if !keep {
            child.visible = false;
        }
    }
}

pub(crate) fn show_after_restore(floater: &mut Floater) {
    let hidden = std::mem::take(&mut floater.hidden_before_minimize);
    for child in floater.children.iter_mut() {
        if child.kind.is_resize_control() || matches!(child.kind, ChildKind::Button(_)) {
            continue;
        }
        child.visible = !hidden.contains(&child.kind);
    }
}
