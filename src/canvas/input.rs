//! Pointer and keyboard routing: hit-testing in z-order, the modal and
//! popup gates, chrome button clicks and keyboard window cycling.

use crate::floater::handles::HandleKind;
use crate::floater::{ChildKind, ChromeButton, Floater, FloaterId, ViewId};
use crate::geometry::{Point, Rect};
use crate::input::{PointerEvent, PointerKind};

use super::{CloseOutcome, WindowCanvas};

/// What lies under a canvas point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    /// A floater, and the child under the point when there is one.
    Floater(FloaterId, Option<ChildKind>),
    Tab { host: FloaterId, tab: FloaterId },
}

/// Keyboard-driven window management.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowCommand {
    CycleNext,
    CyclePrev,
    EndCycle,
    CloseFocused,
    ToggleMinimizeFocused,
    TearOffFocused,
    NextTab,
    PrevTab,
}

impl WindowCanvas {
    /// Frontmost target under `point`. While a dialog is modal only the
    /// dialog can be hit.
    pub fn hit_test(&self, point: Point) -> Option<HitTarget> {
        if let Some(front) = self.modal.front() {
            return self
                .floaters
                .get(front)
                .filter(|f| f.visible && f.rect.contains(point))
                .map(|f| HitTarget::Floater(front, f.child_at(point)));
        }
        let id = self.z_order.iter().copied().find(|id| {
            self.floaters
                .get(*id)
                .is_some_and(|f| f.visible && f.rect.contains(point))
        })?;
        let floater = self.floaters.get(id)?;
        if let Some(tabs) = floater.tabbed_host() {
            if let Some(strip) = self.tab_strip_rect(id)
                && strip.contains(point)
                && let Some((tab, _)) = self
                    .tab_rects(id)
                    .into_iter()
                    .find(|(_, r)| r.contains(point))
            {
                return Some(HitTarget::Tab { host: id, tab });
            }
            if let Some(active) = tabs.active()
                && let Some(hosted) = self.floaters.get(active)
                && hosted.visible
                && hosted.rect.contains(point)
            {
                return Some(HitTarget::Floater(active, hosted.child_at(point)));
            }
        }
        Some(HitTarget::Floater(id, floater.child_at(point)))
    }

    /// Canvas rect a view occupies, if it still exists.
    pub fn view_rect(&self, view: ViewId) -> Option<Rect> {
        match view {
            ViewId::Canvas => Some(self.rect),
            ViewId::Floater(id) => self.floaters.get(id).map(Floater::rect),
            ViewId::Child(id, kind) => self.floaters.get(id)?.child_screen_rect(kind),
        }
    }

    /// Routes a pointer event. Returns `true` when the canvas consumed it;
    /// unconsumed events fall through to whatever is behind the floaters.
    pub fn handle_pointer(&mut self, event: PointerEvent) -> bool {
        let point = event.position;
        if self.drag.is_some() {
            match event.kind {
                PointerKind::Drag | PointerKind::Moved => {
                    if self.drag_to(point) {
                        return true;
                    }
                }
                PointerKind::Up => {
                    self.end_drag();
                    return true;
                }
                _ => return true,
            }
        }

        if let Some(front) = self.modal.front() {
            let inside = self
                .floaters
                .get(front)
                .is_some_and(|f| f.visible && f.rect.contains(point));
            if !inside {
                tracing::trace!(x = point.x, y = point.y, "pointer swallowed by modal");
                return true;
            }
        } else if event.kind == PointerKind::Down
            && let Some(top) = self.arbiter.top_view()
            && !self.view_rect(top).is_some_and(|r| r.contains(point))
        {
            tracing::debug!(view = ?top, "popup dismissed by outside click");
            self.arbiter.release_top_view(top);
            self.process_arbiter_events();
        }

        match event.kind {
            PointerKind::Down => self.pointer_down(event),
            PointerKind::Up | PointerKind::Drag | PointerKind::Moved => {
                self.hit_test(point).is_some()
            }
            PointerKind::ScrollUp | PointerKind::ScrollDown => {
                match self.hit_test(point) {
                    Some(HitTarget::Tab { host, .. }) => {
                        self.cycle_tab(host, event.kind == PointerKind::ScrollDown);
                        true
                    }
                    Some(_) => true,
                    None => false,
                }
            }
        }
    }

    fn pointer_down(&mut self, event: PointerEvent) -> bool {
        if self.cycle_mode {
            self.end_cycle();
        }
        let point = event.position;
        let Some(target) = self.hit_test(point) else {
            if self.focused_floater().is_some() {
                self.clear_keyboard_focus();
                self.process_arbiter_events();
            }
            return false;
        };

        match target {
            HitTarget::Tab { host, tab } => {
                self.select_tab(host, tab);
            }
            HitTarget::Floater(id, child) => {
                self.set_floater_focus(id, true);
                match child {
                    Some(ChildKind::Button(button)) => self.click_button(id, button),
                    Some(ChildKind::DragHandle)
                        if event.double_click
                            && self.floaters.get(id).is_some_and(|f| f.minimized) =>
                    {
                        self.set_minimized(id, false);
                        self.set_floater_focus(id, true);
                    }
                    Some(ChildKind::Content(slot)) => {
                        self.set_keyboard_focus(Some(ViewId::Child(id, ChildKind::Content(slot))), None);
                    }
                    Some(kind) => {
                        if let Some(handle) = HandleKind::from_child(kind) {
                            self.begin_drag(id, handle, point);
                        }
                    }
                    None => {}
                }
            }
        }
        self.process_arbiter_events();
        true
    }

    /// Performs what a title-bar button does.
    pub fn click_button(&mut self, id: FloaterId, button: ChromeButton) {
        let enabled = self
            .floaters
            .get(id)
            .is_some_and(|f| f.buttons_enabled.contains(button.flag()));
        if !enabled {
            return;
        }
        tracing::debug!(floater = ?id, ?button, "chrome button");
        match button {
            ChromeButton::Close => {
                self.close_floater(id);
            }
            ChromeButton::Minimize => self.set_minimized(id, true),
            ChromeButton::Restore => {
                self.set_minimized(id, false);
                self.set_floater_focus(id, true);
            }
            ChromeButton::TearOff => self.tear_off(id),
            ChromeButton::Edit => self.run_on_edit(id),
        }
    }

    pub fn apply_command(&mut self, command: WindowCommand) -> bool {
        match command {
            WindowCommand::CycleNext => self.cycle_focus(true),
            WindowCommand::CyclePrev => self.cycle_focus(false),
            WindowCommand::EndCycle => {
                let was_cycling = self.cycle_mode;
                self.end_cycle();
                was_cycling
            }
            WindowCommand::CloseFocused => self.close_focused_floater().is_some(),
            WindowCommand::ToggleMinimizeFocused => {
                let Some(id) = self.focused_canvas_floater() else {
                    return false;
                };
                let minimized = self.floaters.get(id).is_some_and(|f| f.minimized);
                self.set_minimized(id, !minimized);
                if minimized {
                    self.set_floater_focus(id, true);
                }
                true
            }
            WindowCommand::TearOffFocused => {
                let Some(id) = self.focused_floater() else {
                    return false;
                };
                self.tear_off(id);
                true
            }
            WindowCommand::NextTab | WindowCommand::PrevTab => {
                let Some(focused) = self.focused_floater() else {
                    return false;
                };
                let host = self.live_host(focused).unwrap_or(focused);
                if !self.floaters.get(host).is_some_and(Floater::is_host) {
                    return false;
                }
                self.cycle_tab(host, command == WindowCommand::NextTab);
                true
            }
        }
    }

    /// Moves focus to the next (or previous) visible canvas floater without
    /// reordering them. The order is fixed when cycling ends.
    pub fn cycle_focus(&mut self, forward: bool) -> bool {
        if !self.modal.is_empty() {
            return false;
        }
        let ring: Vec<FloaterId> = self
            .z_order
            .iter()
            .copied()
            .filter(|id| self.floaters.get(*id).is_some_and(|f| f.visible))
            .collect();
        if ring.is_empty() {
            return false;
        }
        self.cycle_mode = true;
        let len = ring.len();
        let next = match self
            .focused_canvas_floater()
            .and_then(|f| ring.iter().position(|id| *id == f))
        {
            Some(index) if forward => ring[(index + 1) % len],
            Some(index) => ring[(index + len - 1) % len],
            None => ring[0],
        };
        self.set_floater_focus(next, true);
        tracing::trace!(floater = ?next, "cycle focus");
        true
    }

    /// Leaves cycle mode, raising the floater that ended up focused.
    pub fn end_cycle(&mut self) {
        if !self.cycle_mode {
            return;
        }
        self.cycle_mode = false;
        if let Some(id) = self.focused_canvas_floater() {
            self.bring_to_front(id, false);
        }
    }

    /// Focuses the frontmost visible, non-minimized floater.
    pub fn focus_front_floater(&mut self) {
        let front = self.z_order.iter().copied().find(|id| {
            self.floaters
                .get(*id)
                .is_some_and(|f| f.visible && !f.minimized)
        });
        if let Some(id) = front {
            self.set_floater_focus(id, true);
        }
    }

    /// Closes the focused floater, or the nearest host or dependee above it
    /// that can be closed.
    pub fn close_focused_floater(&mut self) -> Option<CloseOutcome> {
        let mut candidate = self.focused_floater();
        for _ in 0..crate::constants::MAX_VIEW_DEPTH {
            let id = candidate?;
            if self.floaters.get(id).is_some_and(|f| f.can_close()) {
                let outcome = self.close_floater(id);
                if outcome != CloseOutcome::Refused {
                    self.focus_front_floater();
                }
                return Some(outcome);
            }
            candidate = self.live_host(id).or_else(|| self.dependee_of(id));
        }
        None
    }

    /// View that should receive the next key press: a popup or modal gate
    /// first, then the keyboard focus holder.
    pub fn route_key(&self) -> Option<ViewId> {
        self.arbiter
            .top_view()
            .filter(|v| self.view_alive(*v))
            .filter(|v| {
                self.arbiter
                    .keyboard_focus()
                    .is_none_or(|focus| v.floater() != focus.floater())
            })
            .or_else(|| self.arbiter.keyboard_focus())
    }
}
