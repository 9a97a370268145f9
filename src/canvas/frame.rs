//! The per-frame tick: lazy cleanup, modal upkeep, foreground highlighting,
//! auto-scroll and the back-to-front draw list handed to the renderer.

use crate::floater::{ChildKind, ChromeButton, Floater, FloaterId};
use crate::geometry::Rect;

use super::WindowCanvas;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabLabel {
    pub id: FloaterId,
    pub title: String,
    pub rect: Rect,
    pub active: bool,
}

/// One floater to paint, in canvas coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawItem {
    pub id: FloaterId,
    pub rect: Rect,
    pub title: String,
    pub foreground: bool,
    pub focused: bool,
    pub minimized: bool,
    pub modal: bool,
    /// Painted inside its host's content area rather than as a window.
    pub hosted: bool,
    pub buttons: Vec<(ChromeButton, Rect)>,
    pub content: Vec<(u16, Rect)>,
    pub tab_strip: Option<Rect>,
    pub tabs: Vec<TabLabel>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DrawList {
    /// Back to front.
    pub items: Vec<DrawItem>,
    pub modal_active: bool,
    pub focused: Option<FloaterId>,
}

impl DrawList {
    pub fn item(&self, id: FloaterId) -> Option<&DrawItem> {
        self.items.iter().find(|item| item.id == id)
    }
}

impl WindowCanvas {
    /// Advances one frame and returns what to paint.
    pub fn draw_tick(&mut self) -> DrawList {
        self.process_arbiter_events();
        self.prune_stale_handles();
        self.refresh();
        self.enforce_modal();
        self.sync_floater_tab_order();
        self.highlight_focused_floater();
        self.tick_autoscroll();
        self.process_arbiter_events();
        self.build_draw_list()
    }

    /// Drops references to floaters that no longer exist.
    fn prune_stale_handles(&mut self) {
        let floaters = &self.floaters;
        self.z_order.retain(|id| floaters.contains_key(*id));
        self.modal.prune(|id| floaters.contains_key(id));

        // Collect under shared borrows, then clear.
        let mut stale: Vec<(FloaterId, FloaterId)> = Vec::new();
        for (owner, floater) in &self.floaters {
            let handles = floater
                .dependents
                .iter()
                .copied()
                .chain(floater.dependee)
                .chain(floater.snap_target)
                .chain(floater.tabbed_host().into_iter().flat_map(|t| t.tabs().iter().copied()));
            stale.extend(
                handles
                    .filter(|h| !self.floaters.contains_key(*h))
                    .map(|h| (owner, h)),
            );
        }

        for (owner, dead) in stale {
            let Some(floater) = self.floaters.get_mut(owner) else {
                continue;
            };
            floater.dependents.retain(|d| *d != dead);
            if floater.dependee == Some(dead) {
                floater.dependee = None;
            }
            if floater.snap_target == Some(dead) {
                floater.snap_target = None;
            }
            if let Some(tabs) = floater.tabbed_host_mut() {
                tabs.prune(|t| t != dead);
            }
        }
    }

    /// Keeps the modal dialog frontmost, otherwise the focused floater,
    /// unless focus is being cycled.
    fn sync_floater_tab_order(&mut self) {
        if let Some(front) = self.modal.front() {
            if self.in_canvas(front) && self.z_order.first() != Some(&front) {
                self.send_to_front(front);
            }
            return;
        }
        if self.cycle_mode {
            return;
        }
        if let Some(id) = self.focused_canvas_floater()
            && self.in_canvas(id)
            && self.z_order.first() != Some(&id)
        {
            self.bring_to_front(id, false);
        }
    }

    /// Marks the focused floater's dependency group as foreground.
    fn highlight_focused_floater(&mut self) {
        let group: Vec<FloaterId> = match self.focused_canvas_floater() {
            Some(id) => {
                let root = self.dependee_of(id).unwrap_or(id);
                let mut group = self.live_dependents(root);
                group.push(root);
                group
            }
            None => Vec::new(),
        };
        let hosts: Vec<(FloaterId, Option<FloaterId>)> = self
            .floaters
            .keys()
            .map(|id| (id, self.live_host(id)))
            .collect();
        for (id, host) in hosts {
            let foreground = group.contains(&host.unwrap_or(id));
            if let Some(floater) = self.floaters.get_mut(id) {
                floater.foreground = foreground;
            }
        }
    }

    fn build_draw_list(&self) -> DrawList {
        let focused = self.focused_floater();
        let focused_canvas = self.focused_canvas_floater();
        let modal_front = self.modal.front();

        let mut order: Vec<FloaterId> = self
            .z_order
            .iter()
            .rev()
            .copied()
            .filter(|id| self.floaters.get(*id).is_some_and(|f| f.visible))
            .collect();
        let mut raise_last = |id: Option<FloaterId>| {
            if let Some(id) = id
                && let Some(index) = order.iter().position(|f| *f == id)
            {
                let id = order.remove(index);
                order.push(id);
            }
        };
        if self.cycle_mode {
            raise_last(focused_canvas);
        }
        raise_last(modal_front);

        let mut items = Vec::with_capacity(order.len());
        for id in order {
            let Some(floater) = self.floaters.get(id) else {
                continue;
            };
            items.push(self.draw_item(id, floater, false, focused));
            if let Some(active) = floater.tabbed_host().and_then(|t| t.active())
                && let Some(hosted) = self.floaters.get(active).filter(|f| f.visible)
            {
                items.push(self.draw_item(active, hosted, true, focused));
            }
        }

        DrawList {
            items,
            modal_active: modal_front.is_some(),
            focused,
        }
    }

    fn draw_item(
        &self,
        id: FloaterId,
        floater: &Floater,
        hosted: bool,
        focused: Option<FloaterId>,
    ) -> DrawItem {
        let mut buttons = Vec::new();
        let mut content = Vec::new();
        for child in floater.children.iter().filter(|c| c.visible && c.enabled) {
            let rect = child.rect.translated(floater.rect.left, floater.rect.top);
            match child.kind {
                ChildKind::Button(button) => buttons.push((button, rect)),
                ChildKind::Content(slot) => content.push((slot, rect)),
                _ => {}
            }
        }
        let active = floater.tabbed_host().and_then(|t| t.active());
        let tabs = self
            .tab_rects(id)
            .into_iter()
            .map(|(tab, rect)| TabLabel {
                id: tab,
                title: self
                    .floaters
                    .get(tab)
                    .map(|f| f.short_title.clone().unwrap_or_else(|| f.title.clone()))
                    .unwrap_or_default(),
                rect,
                active: active == Some(tab),
            })
            .collect();

        DrawItem {
            id,
            rect: floater.rect,
            title: floater.display_title().to_string(),
            foreground: floater.foreground,
            focused: focused == Some(id),
            minimized: floater.minimized,
            modal: floater.is_modal_dialog() && self.modal.contains(id),
            hosted,
            buttons,
            content,
            tab_strip: self.tab_strip_rect(id),
            tabs,
        }
    }
}
