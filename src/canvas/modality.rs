//! Modal dialogs on top of the canvas. Only the front dialog of the stack is
//! shown; it holds mouse capture, the top-view gate and a focus lock.

use crate::floater::{FloaterId, FloaterKind, ViewId};

use super::{CanvasTree, WindowCanvas};

impl WindowCanvas {
    /// Makes `id` the interactive modal dialog. The previous front dialog is
    /// hidden until this one stops.
    pub fn start_modal(&mut self, id: FloaterId) -> bool {
        if !self.floaters.get(id).is_some_and(|f| f.is_modal_dialog()) {
            return false;
        }
        if self.modal.front() == Some(id) {
            self.assert_modal_holds(id);
            return true;
        }

        if !self.modal.contains(id) {
            let tree = CanvasTree::new(&self.floaters);
            let previous = self
                .arbiter
                .keyboard_focus()
                .filter(|v| !crate::focus::view_is_within(&tree, *v, ViewId::Floater(id)));
            if let Some(FloaterKind::Modal(dialog)) = self.floaters.get_mut(id).map(|f| &mut f.kind) {
                dialog.previous_focus = previous;
            }
        }

        self.arbiter.unlock_focus();
        if let Some(displaced) = self.modal.push_front(id) {
            self.set_visible(displaced, false);
            tracing::debug!(dialog = ?displaced, "modal dialog suspended");
        }
        self.show_dialog(id);
        self.assert_modal_holds(id);
        self.process_arbiter_events();
        tracing::debug!(dialog = ?id, depth = self.modal.len(), "modal started");
        true
    }

    /// Takes `id` off the modal stack. The next dialog, if any, is shown and
    /// takes over; otherwise focus goes back to where it was before the
    /// first dialog started.
    pub fn stop_modal(&mut self, id: FloaterId) -> bool {
        if !self.modal.contains(id) {
            return false;
        }
        self.release_focus(id);
        self.modal.remove(id);

        let previous = match self.floaters.get(id).map(|f| &f.kind) {
            Some(FloaterKind::Modal(dialog)) => dialog.previous_focus,
            _ => None,
        };

        if let Some(front) = self.modal.front() {
            self.show_dialog(front);
            self.assert_modal_holds(front);
        } else {
            self.arbiter.unlock_focus();
            if let Some(view) = previous.filter(|v| self.view_alive(*v)) {
                self.set_keyboard_focus(Some(view), None);
            }
        }
        self.process_arbiter_events();
        tracing::debug!(dialog = ?id, depth = self.modal.len(), "modal stopped");
        true
    }

    /// Displays a stacked dialog, opening it the first time.
    fn show_dialog(&mut self, id: FloaterId) {
        let opened = self
            .floaters
            .get(id)
            .is_some_and(|f| f.has_rect && self.in_canvas(id));
        if opened {
            self.set_minimized(id, false);
            if let Some(floater) = self.floaters.get_mut(id) {
                floater.visible = true;
            }
            self.bring_to_front(id, false);
        } else {
            self.open_floater(id);
        }
    }

    /// Gives the dialog capture, the top-view gate and locked keyboard focus,
    /// each only if it does not already hold it somewhere inside.
    pub(crate) fn assert_modal_holds(&mut self, id: FloaterId) {
        let root = ViewId::Floater(id);
        let tree = CanvasTree::new(&self.floaters);
        let has_capture = self.arbiter.child_has_mouse_capture(&tree, root);
        let is_top = self.arbiter.child_is_top_view(&tree, root);
        let has_focus = self.arbiter.child_has_keyboard_focus(&tree, root);
        let locked = self.arbiter.focus_lock() == Some(root);

        if !has_capture {
            self.arbiter.set_mouse_capture(Some(root));
        }
        if !is_top {
            self.arbiter.set_top_view(Some(root), None);
        }
        if !has_focus {
            let target = self.focus_target(id);
            self.arbiter.unlock_focus();
            let tree = CanvasTree::new(&self.floaters);
            self.arbiter.set_keyboard_focus(&tree, Some(target), None, false);
        }
        if !locked {
            self.arbiter.lock_focus(root);
        }
        if !(has_capture && is_top && has_focus) {
            tracing::trace!(dialog = ?id, has_capture, is_top, has_focus, "modal reasserted");
        }
    }

    /// Per-frame upkeep: drops dead dialogs and makes the front one reclaim
    /// anything that was taken from it.
    pub(crate) fn enforce_modal(&mut self) {
        let floaters = &self.floaters;
        self.modal.prune(|d| floaters.contains_key(d));
        let Some(front) = self.modal.front() else {
            return;
        };
        let suspended: Vec<FloaterId> = self.modal.dialogs().iter().skip(1).copied().collect();
        for dialog in suspended {
            if self.floaters.get(dialog).is_some_and(|f| f.visible) {
                self.set_visible(dialog, false);
            }
        }
        if !self.floaters.get(front).is_some_and(|f| f.visible) {
            self.show_dialog(front);
        }
        self.assert_modal_holds(front);
    }

    /// Whether input outside the front dialog is currently blocked.
    pub fn is_modal_active(&self) -> bool {
        !self.modal.is_empty()
    }
}
