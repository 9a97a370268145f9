use crate::constants::MAX_VIEW_DEPTH;
use crate::floater::{
    chrome, Capabilities, Floater, FloaterHooks, FloaterId, FloaterKind, FloaterParams,
    ModalDialog, ViewId,
};
use crate::geometry::Rect;
use crate::host::{InsertionPoint, TabbedHost};

use super::WindowCanvas;

/// Result of [`WindowCanvas::close_floater`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseOutcome {
    /// The floater was destroyed; its handle no longer resolves.
    Closed,
    /// A single-instance floater was hidden and can be reopened.
    Hidden,
    /// A can-close guard (its own or one of its tabs') said no.
    Refused,
    /// The handle was already stale.
    Missing,
}

impl WindowCanvas {
    pub fn create_floater(&mut self, params: FloaterParams) -> FloaterId {
        self.insert_floater(params, FloaterKind::Plain)
    }

    /// Creates a tabbed host. With `auto_resize` the host shrinks and grows
    /// to fit its largest tab.
    pub fn create_host(&mut self, params: FloaterParams, auto_resize: bool) -> FloaterId {
        self.insert_floater(params, FloaterKind::Host(TabbedHost::new(auto_resize)))
    }

    /// Creates a dialog for [`WindowCanvas::start_modal`]. Dialogs open
    /// centered and cannot be minimized, torn off or docked.
    pub fn create_modal_dialog(&mut self, mut params: FloaterParams) -> FloaterId {
        params.open_centered = true;
        params.capabilities -= Capabilities::MINIMIZE | Capabilities::TEAR_OFF | Capabilities::DOCK;
        self.insert_floater(params, FloaterKind::Modal(ModalDialog::default()))
    }

    fn insert_floater(&mut self, mut params: FloaterParams, kind: FloaterKind) -> FloaterId {
        if let Some(key) = params.persist_key.as_deref()
            && let Some(saved) = self.store.as_deref().and_then(|s| s.get_rect(key))
        {
            params.rect = Some(self.persisted_rect(&params, saved));
        }
        let floater = Floater::new(params, kind, &self.config);
        let title = floater.title().to_string();
        let id = self.floaters.insert(floater);
        tracing::debug!(floater = ?id, %title, "floater created");
        id
    }

    /// Resizable floaters take the saved rect, others only its origin.
    fn persisted_rect(&self, params: &FloaterParams, saved: Rect) -> Rect {
        if params.capabilities.contains(Capabilities::RESIZE) {
            saved.with_size(
                saved.width().max(params.min_width),
                saved.height().max(params.min_height),
            )
        } else {
            params
                .rect
                .unwrap_or_else(|| {
                    Rect::from_origin_size(0, 0, self.config.default_width, self.config.default_height)
                })
                .with_origin(saved.left, saved.top)
        }
    }

    pub fn set_hooks(&mut self, id: FloaterId, hooks: FloaterHooks) {
        if let Some(floater) = self.floaters.get_mut(id) {
            floater.set_hooks(hooks);
        }
    }

    /// Shows a floater: in its host when it has one (or prefers one),
    /// otherwise at the front of the canvas.
    pub fn open_floater(&mut self, id: FloaterId) {
        let Some(floater) = self.floaters.get(id) else {
            return;
        };
        let auto_focus = floater.auto_focus;
        if floater.host.is_none()
            && let Some(preferred) = floater.preferred_host
            && self.floaters.get(preferred).is_some_and(Floater::is_host)
        {
            self.add_hosted(preferred, id, true, InsertionPoint::End);
        }

        if let Some(host) = self.live_host(id) {
            self.open_floater(host);
            self.show_hosted(host, id);
            if auto_focus {
                self.set_floater_focus(id, true);
            }
            tracing::debug!(floater = ?id, host = ?host, "floater opened in host");
            return;
        }

        self.set_minimized(id, false);
        if !self.in_canvas(id) {
            self.z_order.insert(0, id);
        }

        let (has_rect, centered) = match self.floaters.get(id) {
            Some(f) => (f.has_rect, f.open_centered),
            None => return,
        };
        if !has_rect {
            let (width, height) = (self.config.default_width, self.config.default_height);
            let origin = self.new_floater_position(width, height);
            self.set_floater_rect(id, Rect::from_origin_size(origin.x, origin.y, width, height));
        }
        if centered {
            self.center_floater(id);
        }
        if let Some(floater) = self.floaters.get_mut(id) {
            floater.has_rect = true;
            floater.visible = true;
        }
        self.adjust_to_fit_screen(id, false);
        self.bring_to_front(id, auto_focus);

        for dependent in self.live_dependents(id) {
            if !self.in_canvas(dependent) {
                continue;
            }
            self.set_visible(dependent, true);
            self.adjust_to_fit_screen(dependent, false);
        }
        tracing::debug!(floater = ?id, rect = ?self.floaters.get(id).map(Floater::rect), "floater opened");
    }

    /// Closes a floater and everything that depends on it.
    pub fn close_floater(&mut self, id: FloaterId) -> CloseOutcome {
        let Some(floater) = self.floaters.get(id) else {
            return CloseOutcome::Missing;
        };
        let is_host = floater.is_host();

        self.set_minimized(id, false);
        if is_host && !self.close_all_hosted(id) {
            tracing::debug!(floater = ?id, "host close refused by a tab");
            return CloseOutcome::Refused;
        }
        if !self.run_can_close(id) {
            tracing::debug!(floater = ?id, "close refused");
            return CloseOutcome::Refused;
        }

        if let Some(host) = self.live_host(id) {
            self.remove_hosted(host, id);
        }
        if self.modal.contains(id) {
            self.stop_modal(id);
        }

        let dependents = self.live_dependents(id);
        if let Some(floater) = self.floaters.get_mut(id) {
            floater.dependents.retain(|d| dependents.contains(d));
        }
        for dependent in dependents {
            self.close_floater(dependent);
        }

        self.arbiter
            .clear_last_focus_for_group(ViewId::Floater(id));
        let had_focus = self.has_focus(id);
        self.release_focus(id);

        let dependee = self.dependee_of(id);
        if had_focus
            && let Some(dependee) = dependee
            && self.floaters.get(dependee).is_some_and(|f| f.visible)
        {
            self.set_floater_focus(dependee, true);
        }
        if let Some(dependee) = dependee
            && let Some(d) = self.floaters.get_mut(dependee)
        {
            d.remove_dependent(id);
        }

        self.run_on_close(id);
        self.store_rect(id);

        let single_instance = self.floaters.get(id).is_some_and(|f| f.single_instance);
        if single_instance {
            if let Some(floater) = self.floaters.get_mut(id) {
                floater.visible = false;
                floater.dependee = None;
                floater.snap_target = None;
                floater.saved_visibility.clear();
            }
            tracing::debug!(floater = ?id, "single-instance floater hidden");
            CloseOutcome::Hidden
        } else {
            self.destroy_floater(id);
            tracing::debug!(floater = ?id, "floater closed");
            CloseOutcome::Closed
        }
    }

    fn run_can_close(&mut self, id: FloaterId) -> bool {
        let Some(mut guard) = self
            .floaters
            .get_mut(id)
            .and_then(|f| f.hooks.can_close.take())
        else {
            return true;
        };
        let allowed = guard(id);
        if let Some(floater) = self.floaters.get_mut(id) {
            floater.hooks.can_close = Some(guard);
        }
        allowed
    }

    fn run_on_close(&mut self, id: FloaterId) {
        let Some(mut hook) = self.floaters.get_mut(id).and_then(|f| f.hooks.on_close.take()) else {
            return;
        };
        hook(id);
        if let Some(floater) = self.floaters.get_mut(id) {
            floater.hooks.on_close = Some(hook);
        }
    }

    pub(crate) fn run_on_edit(&mut self, id: FloaterId) {
        let Some(mut hook) = self.floaters.get_mut(id).and_then(|f| f.hooks.on_edit.take()) else {
            return;
        };
        hook(id);
        if let Some(floater) = self.floaters.get_mut(id) {
            floater.hooks.on_edit = Some(hook);
        }
    }

    fn destroy_floater(&mut self, id: FloaterId) {
        self.z_order.retain(|f| *f != id);
        self.modal.remove(id);
        if self.drag.as_ref().is_some_and(|d| d.floater == id) {
            self.drag = None;
        }
        self.arbiter.forget_views(|v| v.floater() == Some(id));
        let Some(floater) = self.floaters.remove(id) else {
            return;
        };
        if let Some(host) = floater.tabbed_host() {
            for tab in host.tabs() {
                if let Some(orphan) = self.floaters.get_mut(*tab) {
                    orphan.host = None;
                    orphan.visible = false;
                }
            }
        }
        for other in self.floaters.values_mut() {
            if other.snap_target == Some(id) {
                other.snap_target = None;
            }
        }
        self.process_arbiter_events();
    }

    /// Closes every visible, closeable floater on the canvas.
    pub fn close_all_floaters(&mut self) {
        let ids = self.z_order.clone();
        for id in ids {
            if self
                .floaters
                .get(id)
                .is_some_and(|f| f.visible && f.can_close())
            {
                self.close_floater(id);
            }
        }
    }

    pub fn all_floaters_closed(&self) -> bool {
        !self.z_order.iter().any(|id| {
            self.floaters
                .get(*id)
                .is_some_and(|f| f.visible && f.can_close())
        })
    }

    /// Shows or hides every canvas-level floater not in `skip`, remembering
    /// each one's visibility for [`pop_visible_all`](Self::pop_visible_all).
    /// Pushes nest.
    pub fn push_visible_all(&mut self, visible: bool, skip: &[FloaterId]) {
        for id in self.z_order.clone() {
            if skip.contains(&id) {
                continue;
            }
            let Some(floater) = self.floaters.get_mut(id) else {
                continue;
            };
            floater.saved_visibility.push(floater.visible);
            self.set_visible(id, visible);
        }
    }

    /// Undoes the latest [`push_visible_all`](Self::push_visible_all) for
    /// every floater not in `skip`. A floater closed since the push has no
    /// saved state left and stays as it is.
    pub fn pop_visible_all(&mut self, skip: &[FloaterId]) {
        for id in self.z_order.clone() {
            if skip.contains(&id) {
                continue;
            }
            if let Some(visible) = self
                .floaters
                .get_mut(id)
                .and_then(|f| f.saved_visibility.pop())
            {
                self.set_visible(id, visible);
            }
        }
    }

    /// Minimizes to a tile along the bottom of the usable rect, or restores.
    ///
    /// Hosted floaters and floaters without the minimize capability are left
    /// alone when asked to minimize.
    pub fn set_minimized(&mut self, id: FloaterId, minimize: bool) {
        let Some(floater) = self.floaters.get(id) else {
            return;
        };
        if floater.minimized == minimize
            || (minimize && !floater.can_minimize())
            || self.live_host(id).is_some()
        {
            return;
        }
        if minimize {
            self.minimize(id);
        } else {
            self.restore(id);
        }
    }

    fn minimize(&mut self, id: FloaterId) {
        let remembered = self
            .floaters
            .get(id)
            .filter(|f| f.dragged_while_minimized)
            .map(|f| f.minimized_origin);
        let origin = remembered.unwrap_or_else(|| self.minimize_position());
        if let Some(floater) = self.floaters.get_mut(id) {
            floater.expanded_rect = floater.rect;
            chrome::hide_for_minimize(floater);
            floater.minimized = true;
            floater.sync_buttons_with_capabilities();
            floater.enable_resize_ctrls(false);
        }
        let (width, height) = (self.config.minimized_width, self.config.minimized_height());
        self.set_floater_rect(id, Rect::from_origin_size(origin.x, origin.y, width, height));

        for dependent in self.live_dependents(id) {
            if self.floaters.get(dependent).is_some_and(Floater::can_minimize) {
                self.set_minimized(dependent, true);
            } else {
                self.set_visible(dependent, false);
            }
        }
        self.release_focus(id);
        tracing::debug!(floater = ?id, x = origin.x, y = origin.y, "floater minimized");
    }

    fn restore(&mut self, id: FloaterId) {
        let Some(floater) = self.floaters.get_mut(id) else {
            return;
        };
        floater.minimized = false;
        chrome::show_after_restore(floater);
        floater.sync_buttons_with_capabilities();
        floater.enable_resize_ctrls(floater.is_resizable());
        let expanded = floater.expanded_rect;
        self.set_floater_rect(id, expanded);

        for dependent in self.live_dependents(id) {
            self.set_minimized(dependent, false);
            if self.in_canvas(dependent) {
                self.set_visible(dependent, true);
            }
        }
        tracing::debug!(floater = ?id, "floater restored");
    }

    /// Sets the rect and lays out chrome without touching anything else.
    pub(crate) fn set_floater_rect(&mut self, id: FloaterId, rect: Rect) {
        let config = &self.config;
        let Some(floater) = self.floaters.get_mut(id) else {
            return;
        };
        floater.rect = rect;
        if !floater.minimized {
            floater.expanded_rect = rect;
        }
        chrome::layout(floater, config);
        let is_host = floater.is_host();
        if is_host {
            self.layout_hosted(id, false);
        }
    }

    /// The one way floaters move or resize once they are open. Dependents
    /// snapped to the floater follow along.
    pub fn reshape_floater(&mut self, id: FloaterId, rect: Rect, by_user: bool) {
        let Some(floater) = self.floaters.get_mut(id) else {
            return;
        };
        let old = floater.rect;
        if old == rect {
            return;
        }
        if floater.minimized && by_user && old.origin() != rect.origin() {
            floater.dragged_while_minimized = true;
            floater.minimized_origin = rect.origin();
        }
        let resized = old.width() != rect.width() || old.height() != rect.height();
        let resize_tabs = by_user && resized && floater.is_host();

        self.set_floater_rect(id, rect);
        self.move_snapped_dependents(id, old, rect);
        if resize_tabs {
            self.layout_hosted(id, true);
        }
        if by_user {
            self.store_rect(id);
        }
    }

    fn move_snapped_dependents(&mut self, id: FloaterId, old: Rect, new: Rect) {
        let (dw, dh) = (new.width() - old.width(), new.height() - old.height());
        let (tx, ty) = (new.left - old.left, new.top - old.top);
        if dw == 0 && dh == 0 && tx == 0 && ty == 0 {
            return;
        }
        for dependent in self.live_dependents(id) {
            let Some(dep) = self.floaters.get(dependent) else {
                continue;
            };
            if dep.snap_target != Some(id) {
                continue;
            }
            let r = dep.rect;
            let mut dx = tx;
            let mut dy = ty;
            // Dependents hugging the right or bottom edge ride along with it.
            if r.left - old.left >= old.width() || r.right == old.right {
                dx += dw;
            }
            if r.top - old.top >= old.height() || r.bottom == old.bottom {
                dy += dh;
            }
            self.reshape_floater(dependent, r.translated(dx, dy), false);
        }
    }

    pub(crate) fn set_host(&mut self, id: FloaterId, host: Option<FloaterId>) {
        let config = &self.config;
        let Some(floater) = self.floaters.get_mut(id) else {
            return;
        };
        floater.host = host;
        if host.is_some() {
            floater.last_host = host;
            floater.torn_off = false;
        }
        floater.button_size = config.scaled_button_size(host.is_some());
        floater.focus_root = host.is_none();
        floater.sync_buttons_with_capabilities();
        chrome::layout(floater, config);
    }

    /// Makes `dependent` follow `base`: it closes, minimizes and raises with
    /// it. With `reposition` it is placed next to `base` and snapped to it.
    pub fn add_dependent_floater(
        &mut self,
        base: FloaterId,
        dependent: FloaterId,
        reposition: bool,
    ) -> bool {
        if base == dependent || !self.contains(base) || !self.contains(dependent) {
            return false;
        }
        let mut cursor = Some(base);
        for _ in 0..MAX_VIEW_DEPTH {
            match cursor {
                Some(current) if current == dependent => {
                    tracing::debug!(base = ?base, dependent = ?dependent, "dependency cycle refused");
                    return false;
                }
                Some(current) => cursor = self.dependee_of(current),
                None => break,
            }
        }

        if self.dependee_of(dependent).is_some_and(|d| d != base) {
            self.remove_dependent_floater(dependent);
        }
        if let Some(b) = self.floaters.get_mut(base) {
            b.add_dependent(dependent);
        }
        if let Some(d) = self.floaters.get_mut(dependent) {
            d.dependee = Some(base);
        }

        if reposition {
            let rect = self.find_neighboring_position(base, dependent);
            self.set_floater_rect(dependent, rect);
            if let Some(d) = self.floaters.get_mut(dependent) {
                d.has_rect = true;
                d.snap_target = Some(base);
            }
        }
        self.adjust_to_fit_screen(dependent, false);
        if self.frontmost() == Some(dependent) {
            self.bring_to_front(dependent, false);
        }
        true
    }

    pub fn remove_dependent_floater(&mut self, dependent: FloaterId) {
        let Some(base) = self.floaters.get(dependent).and_then(|f| f.dependee) else {
            return;
        };
        if let Some(b) = self.floaters.get_mut(base) {
            b.remove_dependent(dependent);
        }
        if let Some(d) = self.floaters.get_mut(dependent) {
            d.dependee = None;
            if d.snap_target == Some(base) {
                d.snap_target = None;
            }
        }
    }

    fn set_capability_flag(&mut self, id: FloaterId, capability: Capabilities, enabled: bool) {
        let hosted = self.live_host(id);
        if let Some(host) = hosted
            && capability.intersects(Capabilities::HOST_STRIPPED)
            && let Some(snapshot) = self
                .floaters
                .get_mut(host)
                .and_then(Floater::tabbed_host_mut)
                .and_then(|h| h.snapshot_mut(id))
        {
            // Stripped while hosted; applied again when the floater leaves.
            snapshot.capabilities.set(capability, enabled);
            return;
        }
        if let Some(floater) = self.floaters.get_mut(id) {
            floater.set_capability(capability, enabled);
        }
    }

    pub fn set_can_minimize(&mut self, id: FloaterId, enabled: bool) {
        if !enabled {
            self.set_minimized(id, false);
        }
        self.set_capability_flag(id, Capabilities::MINIMIZE, enabled);
    }

    pub fn set_can_close(&mut self, id: FloaterId, enabled: bool) {
        self.set_capability_flag(id, Capabilities::CLOSE, enabled);
    }

    pub fn set_can_resize(&mut self, id: FloaterId, enabled: bool) {
        self.set_capability_flag(id, Capabilities::RESIZE, enabled);
    }

    pub fn set_can_drag(&mut self, id: FloaterId, enabled: bool) {
        self.set_capability_flag(id, Capabilities::DRAG, enabled);
    }

    pub fn set_can_tear_off(&mut self, id: FloaterId, enabled: bool) {
        self.set_capability_flag(id, Capabilities::TEAR_OFF, enabled);
    }

    pub fn set_can_dock(&mut self, id: FloaterId, enabled: bool) {
        if !enabled {
            self.set_docked(id, false);
        }
        self.set_capability_flag(id, Capabilities::DOCK, enabled);
    }

    /// Docked floaters stay put under a title drag until it pulls them past
    /// the undock threshold.
    pub fn set_docked(&mut self, id: FloaterId, docked: bool) {
        if let Some(floater) = self.floaters.get_mut(id)
            && (!docked || floater.capabilities.contains(Capabilities::DOCK))
        {
            floater.docked = docked;
        }
    }

    pub fn set_resize_limits(&mut self, id: FloaterId, min_width: i32, min_height: i32) {
        let Some(floater) = self.floaters.get_mut(id) else {
            return;
        };
        floater.min_width = min_width.max(0);
        floater.min_height = min_height.max(0);
        if floater.minimized || !floater.is_resizable() {
            return;
        }
        let rect = floater.rect;
        let grown = rect.with_size(
            rect.width().max(floater.min_width),
            rect.height().max(floater.min_height),
        );
        if grown != rect {
            self.reshape_floater(id, grown, false);
        }
    }

    pub fn center_floater(&mut self, id: FloaterId) {
        let Some(floater) = self.floaters.get(id) else {
            return;
        };
        let centered = floater.rect.centered_in(self.usable_rect());
        self.reshape_floater(id, centered, false);
    }

    pub fn set_title(&mut self, id: FloaterId, title: impl Into<String>) {
        if let Some(floater) = self.floaters.get_mut(id) {
            floater.title = title.into();
        }
    }

    pub fn set_short_title(&mut self, id: FloaterId, short_title: Option<String>) {
        if let Some(floater) = self.floaters.get_mut(id) {
            floater.short_title = short_title;
        }
    }

    pub fn set_edit_button(&mut self, id: FloaterId, enabled: bool) {
        let config = &self.config;
        if let Some(floater) = self.floaters.get_mut(id) {
            floater.set_edit_button(enabled);
            chrome::layout(floater, config);
        }
    }

    pub(crate) fn set_visible(&mut self, id: FloaterId, visible: bool) {
        let Some(floater) = self.floaters.get_mut(id) else {
            return;
        };
        floater.visible = visible;
        if !visible {
            self.release_focus(id);
        }
    }

    /// Writes the floater's expanded rect to the store under its persist
    /// key. Hosted floaters keep their last free-floating rect.
    pub(crate) fn store_rect(&mut self, id: FloaterId) {
        if self.live_host(id).is_some() {
            return;
        }
        let Some(floater) = self.floaters.get(id) else {
            return;
        };
        let Some(key) = floater.persist_key.as_deref() else {
            return;
        };
        let rect = if floater.minimized {
            floater.expanded_rect
        } else {
            floater.rect
        };
        if let Some(store) = self.store.as_deref_mut() {
            store.set_rect(key, rect);
        }
    }
}
