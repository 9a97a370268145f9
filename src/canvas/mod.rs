//! The window canvas owns every floater, the z-order of the ones that are
//! not hosted in tabs, the focus arbiter and the modal stack.
//!
//! Floaters reference each other only through [`FloaterId`] handles, so a
//! destroyed floater simply stops resolving. The canvas is the only place
//! that mutates more than one floater at a time.

mod drag;
mod frame;
mod hosting;
mod input;
mod lifecycle;
mod modality;
mod placement;
mod snap;

use slotmap::SlotMap;

use crate::config::FloaterConfig;
use crate::constants::MAX_VIEW_DEPTH;
use crate::focus::{ArbiterEvent, FocusArbiter, LostCallback, Resource, ViewHierarchy};
use crate::floater::{ChildKind, Floater, FloaterId, ViewId};
use crate::geometry::Rect;
use crate::modal::ModalStack;
use crate::persist::RectStore;

pub use drag::DragSession;
pub use frame::{DrawItem, DrawList, TabLabel};
pub use input::{HitTarget, WindowCommand};
pub use lifecycle::CloseOutcome;
pub use placement::CascadeCursor;
pub use snap::{SnapTarget, SnapType};

/// Where a floater currently lives. Exactly one applies at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Membership {
    Detached,
    Canvas,
    Hosted(FloaterId),
}

/// Read-only view of the floater hierarchy handed to the arbiter.
pub struct CanvasTree<'a> {
    floaters: &'a SlotMap<FloaterId, Floater>,
}

impl<'a> CanvasTree<'a> {
    pub(crate) fn new(floaters: &'a SlotMap<FloaterId, Floater>) -> Self {
        Self { floaters }
    }
}

impl ViewHierarchy<ViewId> for CanvasTree<'_> {
    fn parent_of(&self, view: ViewId) -> Option<ViewId> {
        match view {
            ViewId::Canvas => None,
            ViewId::Floater(id) => {
                let floater = self.floaters.get(id)?;
                Some(
                    floater
                        .host
                        .filter(|h| self.floaters.contains_key(*h))
                        .map_or(ViewId::Canvas, ViewId::Floater),
                )
            }
            ViewId::Child(id, _) => self
                .floaters
                .contains_key(id)
                .then_some(ViewId::Floater(id)),
        }
    }

    fn is_focus_root(&self, view: ViewId) -> bool {
        match view {
            ViewId::Floater(id) => self.floaters.get(id).is_some_and(|f| f.focus_root),
            _ => false,
        }
    }
}

/// Events from the arbiter kept for external observers.
const MAX_PENDING_FOCUS_EVENTS: usize = 256;

pub struct WindowCanvas {
    config: FloaterConfig,
    rect: Rect,
    snap_rect: Option<Rect>,
    floaters: SlotMap<FloaterId, Floater>,
    /// Un-hosted floaters, front first.
    z_order: Vec<FloaterId>,
    arbiter: FocusArbiter<ViewId>,
    modal: ModalStack,
    cascade: CascadeCursor,
    cycle_mode: bool,
    drag: Option<DragSession>,
    store: Option<Box<dyn RectStore>>,
    focus_events: Vec<ArbiterEvent<ViewId>>,
}

impl std::fmt::Debug for WindowCanvas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WindowCanvas")
            .field("rect", &self.rect)
            .field("snap_rect", &self.snap_rect)
            .field("floaters", &self.floaters.len())
            .field("z_order", &self.z_order)
            .field("arbiter", &self.arbiter)
            .field("modal", &self.modal)
            .field("cycle_mode", &self.cycle_mode)
            .field("drag", &self.drag)
            .field("store", &self.store.is_some())
            .finish()
    }
}

impl WindowCanvas {
    pub fn new(config: FloaterConfig, width: i32, height: i32) -> Self {
        let mut canvas = Self {
            config,
            rect: Rect::from_origin_size(0, 0, width, height),
            snap_rect: None,
            floaters: SlotMap::with_key(),
            z_order: Vec::new(),
            arbiter: FocusArbiter::new(),
            modal: ModalStack::new(),
            cascade: CascadeCursor::default(),
            cycle_mode: false,
            drag: None,
            store: None,
            focus_events: Vec::new(),
        };
        canvas.reset_starting_floater_position();
        canvas
    }

    pub fn with_rect_store(mut self, store: Box<dyn RectStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn rect_store_mut(&mut self) -> Option<&mut (dyn RectStore + 'static)> {
        self.store.as_deref_mut()
    }

    pub fn config(&self) -> &FloaterConfig {
        &self.config
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    /// The area floaters are kept inside and snap to. Defaults to the whole
    /// canvas.
    pub fn usable_rect(&self) -> Rect {
        self.snap_rect.unwrap_or(self.rect)
    }

    pub fn set_usable_rect(&mut self, rect: Option<Rect>) {
        self.snap_rect = rect;
    }

    pub fn floater(&self, id: FloaterId) -> Option<&Floater> {
        self.floaters.get(id)
    }

    pub fn contains(&self, id: FloaterId) -> bool {
        self.floaters.contains_key(id)
    }

    pub fn floater_count(&self) -> usize {
        self.floaters.len()
    }

    pub fn floater_ids(&self) -> impl Iterator<Item = FloaterId> + '_ {
        self.floaters.keys()
    }

    pub fn z_order(&self) -> &[FloaterId] {
        &self.z_order
    }

    pub fn z_index(&self, id: FloaterId) -> Option<usize> {
        self.z_order.iter().position(|f| *f == id)
    }

    pub fn frontmost(&self) -> Option<FloaterId> {
        self.z_order
            .iter()
            .copied()
            .find(|id| self.floaters.get(*id).is_some_and(|f| f.visible))
    }

    pub fn backmost(&self) -> Option<FloaterId> {
        self.z_order
            .iter()
            .rev()
            .copied()
            .find(|id| self.floaters.get(*id).is_some_and(|f| f.visible))
    }

    pub fn membership(&self, id: FloaterId) -> Membership {
        if let Some(host) = self.live_host(id) {
            Membership::Hosted(host)
        } else if self.z_order.contains(&id) {
            Membership::Canvas
        } else {
            Membership::Detached
        }
    }

    pub fn arbiter(&self) -> &FocusArbiter<ViewId> {
        &self.arbiter
    }

    pub fn modal_stack(&self) -> &ModalStack {
        &self.modal
    }

    pub fn is_cycle_mode(&self) -> bool {
        self.cycle_mode
    }

    pub fn drag_session(&self) -> Option<&DragSession> {
        self.drag.as_ref()
    }

    pub fn keyboard_focus(&self) -> Option<ViewId> {
        self.arbiter.keyboard_focus()
    }

    pub fn mouse_capture(&self) -> Option<ViewId> {
        self.arbiter.mouse_capture()
    }

    pub fn top_view(&self) -> Option<ViewId> {
        self.arbiter.top_view()
    }

    /// Hands keyboard focus to an arbitrary view, typically a content child.
    /// Refused while a focus lock excludes it.
    pub fn set_keyboard_focus(
        &mut self,
        view: Option<ViewId>,
        on_lost: Option<LostCallback<ViewId>>,
    ) -> bool {
        let tree = CanvasTree::new(&self.floaters);
        self.arbiter.set_keyboard_focus(&tree, view, on_lost, false)
    }

    /// Installs a non-modal popup that receives keys first and is dismissed
    /// by a click outside it.
    pub fn set_top_view(&mut self, view: Option<ViewId>, on_lost: Option<LostCallback<ViewId>>) {
        self.arbiter.set_top_view(view, on_lost);
    }

    pub fn set_mouse_capture(&mut self, view: Option<ViewId>) {
        self.arbiter.set_mouse_capture(view);
    }

    pub fn drain_focus_events(&mut self) -> Vec<ArbiterEvent<ViewId>> {
        self.process_arbiter_events();
        std::mem::take(&mut self.focus_events)
    }

    /// Whether `id` or anything inside it holds keyboard focus.
    pub fn has_focus(&self, id: FloaterId) -> bool {
        let tree = CanvasTree::new(&self.floaters);
        self.arbiter
            .child_has_keyboard_focus(&tree, ViewId::Floater(id))
    }

    /// Floater owning the keyboard focus, if any.
    pub fn focused_floater(&self) -> Option<FloaterId> {
        self.arbiter
            .keyboard_focus()
            .and_then(ViewId::floater)
            .filter(|id| self.floaters.contains_key(*id))
    }

    /// The canvas-level floater owning focus: the focused floater itself or
    /// the host it lives in.
    pub(crate) fn focused_canvas_floater(&self) -> Option<FloaterId> {
        let id = self.focused_floater()?;
        Some(self.live_host(id).unwrap_or(id))
    }

    pub(crate) fn live_host(&self, id: FloaterId) -> Option<FloaterId> {
        self.floaters
            .get(id)?
            .host
            .filter(|h| self.floaters.get(*h).is_some_and(Floater::is_host))
    }

    pub(crate) fn dependee_of(&self, id: FloaterId) -> Option<FloaterId> {
        self.floaters
            .get(id)?
            .dependee
            .filter(|d| self.floaters.contains_key(*d))
    }

    pub fn is_dependent(&self, id: FloaterId) -> bool {
        self.dependee_of(id).is_some()
    }

    pub fn live_dependents(&self, id: FloaterId) -> Vec<FloaterId> {
        self.floaters.get(id).map_or_else(Vec::new, |f| {
            f.dependents
                .iter()
                .copied()
                .filter(|d| self.floaters.contains_key(*d))
                .collect()
        })
    }

    /// Top of the dependee chain above `id`, or `id` when it has none.
    pub(crate) fn root_dependee(&self, id: FloaterId) -> FloaterId {
        let mut root = id;
        for _ in 0..MAX_VIEW_DEPTH {
            match self.dependee_of(root) {
                Some(dependee) => root = dependee,
                None => break,
            }
        }
        root
    }

    /// Live dependents of `id` and of theirs, level by level.
    pub(crate) fn dependency_subtree(&self, id: FloaterId) -> Vec<FloaterId> {
        let mut members = Vec::new();
        let mut level = self.live_dependents(id);
        for _ in 0..MAX_VIEW_DEPTH {
            if level.is_empty() {
                break;
            }
            let next: Vec<FloaterId> = level.iter().flat_map(|d| self.live_dependents(*d)).collect();
            members.append(&mut level);
            level = next;
        }
        members
    }

    /// Whether `view` still resolves to something visible and enabled.
    pub fn view_alive(&self, view: ViewId) -> bool {
        match view {
            ViewId::Canvas => true,
            ViewId::Floater(id) => self.floaters.get(id).is_some_and(|f| f.visible),
            ViewId::Child(id, kind) => self.floaters.get(id).is_some_and(|f| {
                f.visible && f.child(kind).is_some_and(|c| c.visible && c.enabled)
            }),
        }
    }

    pub(crate) fn in_canvas(&self, id: FloaterId) -> bool {
        self.z_order.contains(&id)
    }

    fn send_to_front(&mut self, id: FloaterId) {
        if let Some(index) = self.z_index(id) {
            self.z_order.remove(index);
            self.z_order.insert(0, id);
        }
    }

    /// Raises a floater, keeping its dependency group together.
    ///
    /// A dependent first raises its dependee's other dependents and the
    /// dependee itself; the floater's own dependents come next and the
    /// floater ends up frontmost. Hosted floaters are shown in their host
    /// instead.
    pub fn bring_to_front(&mut self, id: FloaterId, give_focus: bool) {
        if !self.floaters.contains_key(id) {
            return;
        }
        if let Some(host) = self.live_host(id) {
            self.show_hosted(host, id);
            if give_focus && !self.has_focus(id) {
                self.set_floater_focus(id, true);
            }
            return;
        }
        if !self.in_canvas(id) {
            return;
        }

        if let Some(dependee) = self.dependee_of(id)
            && self.in_canvas(dependee)
        {
            let mut group = self.live_dependents(dependee);
            group.push(dependee);
            for member in group {
                self.send_to_front(member);
                if !self.is_dependent(member) {
                    self.set_minimized(member, false);
                }
            }
        }
        for dependent in self.live_dependents(id) {
            self.send_to_front(dependent);
        }
        self.send_to_front(id);
        self.set_minimized(id, false);

        if give_focus && !self.has_focus(id) {
            self.set_floater_focus(id, true);
            if !self.has_focus(id) {
                self.clear_keyboard_focus();
            }
        }
    }

    /// Gives focus to a floater (its last focused descendant when there is
    /// one) or takes it away.
    pub fn set_floater_focus(&mut self, id: FloaterId, focus: bool) {
        if !self.floaters.contains_key(id) {
            return;
        }
        if !focus {
            if self.has_focus(id) {
                self.clear_keyboard_focus();
            }
            return;
        }
        if self.modal.front().is_some_and(|front| front != id) {
            return;
        }
        if let Some(host) = self.live_host(id) {
            self.show_hosted(host, id);
            if !self.cycle_mode && self.z_order.first() != Some(&host) {
                self.bring_to_front(host, false);
            }
        } else if !self.cycle_mode && self.in_canvas(id) && self.z_order.first() != Some(&id) {
            self.bring_to_front(id, false);
        }
        if !self.floaters.get(id).is_some_and(|f| f.visible) || self.has_focus(id) {
            return;
        }
        let target = self.focus_target(id);
        let tree = CanvasTree::new(&self.floaters);
        self.arbiter.set_keyboard_focus(&tree, Some(target), None, false);
    }

    /// Where focus lands when a floater is focused as a whole.
    pub(crate) fn focus_target(&self, id: FloaterId) -> ViewId {
        if let Some(last) = self.arbiter.last_focus_for_group(ViewId::Floater(id))
            && self.view_alive(last)
        {
            return last;
        }
        self.floaters
            .get(id)
            .filter(|f| !f.minimized)
            .and_then(|f| {
                f.children
                    .iter()
                    .find(|c| c.kind.is_content() && c.visible && c.enabled)
                    .map(|c| ViewId::Child(id, c.kind))
            })
            .unwrap_or(ViewId::Floater(id))
    }

    pub(crate) fn clear_keyboard_focus(&mut self) {
        let tree = CanvasTree::new(&self.floaters);
        self.arbiter.set_keyboard_focus(&tree, None, None, false);
    }

    /// Drops keyboard focus, mouse capture and the top-view gate if the
    /// floater or one of its children holds them.
    pub fn release_focus(&mut self, id: FloaterId) {
        let tree = CanvasTree::new(&self.floaters);
        self.arbiter.release_within(&tree, ViewId::Floater(id));
    }

    /// Moves arbiter notifications into the observer queue and ends a drag
    /// whose capture was taken away.
    pub(crate) fn process_arbiter_events(&mut self) {
        for event in self.arbiter.drain_events() {
            if let ArbiterEvent::Lost(Resource::MouseCapture, view) = event
                && self.drag.as_ref().is_some_and(|d| d.view == view)
            {
                tracing::trace!(?view, "drag cancelled by capture loss");
                self.drag = None;
            }
            self.focus_events.push(event);
        }
        if self.focus_events.len() > MAX_PENDING_FOCUS_EVENTS {
            let excess = self.focus_events.len() - MAX_PENDING_FOCUS_EVENTS;
            self.focus_events.drain(..excess);
        }
    }

    /// Registers (or moves) a content child at a floater-local rect.
    pub fn add_content_view(&mut self, id: FloaterId, slot: u16, rect: Rect) {
        if let Some(floater) = self.floaters.get_mut(id) {
            floater.upsert_content(slot, rect);
        }
    }

    pub fn content_view(id: FloaterId, slot: u16) -> ViewId {
        ViewId::Child(id, ChildKind::Content(slot))
    }

    /// Flushes persisted rects. Call before shutdown.
    pub fn shutdown(&mut self) -> Result<(), crate::error::StoreError> {
        let ids: Vec<FloaterId> = self.floaters.keys().collect();
        for id in ids {
            self.store_rect(id);
        }
        self.drag = None;
        self.arbiter.reset();
        match self.store.as_deref_mut() {
            Some(store) => store.flush(),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::floater::{Capabilities, FloaterParams};

    pub fn canvas() -> WindowCanvas {
        WindowCanvas::new(FloaterConfig::default(), 800, 600)
    }

    pub fn open_at(canvas: &mut WindowCanvas, title: &str, rect: Rect) -> FloaterId {
        let id = canvas.create_floater(FloaterParams::new(title).with_rect(rect));
        canvas.open_floater(id);
        id
    }

    pub fn open_fixed(canvas: &mut WindowCanvas, title: &str, rect: Rect) -> FloaterId {
        let id = canvas.create_floater(
            FloaterParams::new(title)
                .with_rect(rect)
                .with_capabilities(Capabilities::CLOSE | Capabilities::DRAG),
        );
        canvas.open_floater(id);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::floater::FloaterParams;

    #[test]
    fn open_puts_floater_in_front_with_focus() {
        let mut canvas = canvas();
        let a = open_at(&mut canvas, "a", Rect::from_origin_size(10, 10, 100, 80));
        let b = open_at(&mut canvas, "b", Rect::from_origin_size(50, 50, 100, 80));
        assert_eq!(canvas.z_order(), &[b, a]);
        assert_eq!(canvas.focused_floater(), Some(b));
        assert_eq!(canvas.frontmost(), Some(b));
        assert_eq!(canvas.backmost(), Some(a));
        canvas.bring_to_front(a, true);
        assert_eq!(canvas.z_order(), &[a, b]);
        assert!(canvas.has_focus(a));
    }

    #[test]
    fn bring_to_front_keeps_dependency_group_together() {
        let mut canvas = canvas();
        let base = open_at(&mut canvas, "base", Rect::from_origin_size(10, 10, 100, 80));
        let dep = open_at(&mut canvas, "dep", Rect::from_origin_size(110, 10, 100, 80));
        let other = open_at(&mut canvas, "other", Rect::from_origin_size(300, 300, 100, 80));
        canvas.add_dependent_floater(base, dep, false);
        canvas.bring_to_front(other, false);

        canvas.bring_to_front(dep, false);
        assert_eq!(canvas.z_order(), &[dep, base, other]);

        canvas.bring_to_front(other, false);
        canvas.bring_to_front(base, false);
        assert_eq!(canvas.z_order(), &[base, dep, other]);
    }

    #[test]
    fn membership_is_exclusive() {
        let mut canvas = canvas();
        let host = canvas.create_host(FloaterParams::new("host"), true);
        canvas.open_floater(host);
        let loose = canvas.create_floater(FloaterParams::new("loose"));
        assert_eq!(canvas.membership(loose), Membership::Detached);
        canvas.open_floater(loose);
        assert_eq!(canvas.membership(loose), Membership::Canvas);
        canvas.add_hosted(host, loose, true, crate::host::InsertionPoint::End);
        assert_eq!(canvas.membership(loose), Membership::Hosted(host));
        assert!(!canvas.z_order().contains(&loose));
    }

    #[test]
    fn focus_returns_to_last_focused_content() {
        let mut canvas = canvas();
        let a = open_at(&mut canvas, "a", Rect::from_origin_size(10, 10, 100, 80));
        canvas.add_content_view(a, 0, Rect::new(2, 20, 50, 70));
        canvas.add_content_view(a, 1, Rect::new(50, 20, 98, 70));
        let second = WindowCanvas::content_view(a, 1);
        assert!(canvas.set_keyboard_focus(Some(second), None));
        let b = open_at(&mut canvas, "b", Rect::from_origin_size(200, 10, 100, 80));
        assert_eq!(canvas.focused_floater(), Some(b));
        canvas.set_floater_focus(a, true);
        assert_eq!(canvas.keyboard_focus(), Some(second));
    }

    #[test]
    fn stale_handles_resolve_to_nothing() {
        let mut canvas = canvas();
        let a = open_at(&mut canvas, "a", Rect::from_origin_size(10, 10, 100, 80));
        assert_eq!(canvas.close_floater(a), CloseOutcome::Closed);
        assert!(canvas.floater(a).is_none());
        canvas.bring_to_front(a, true);
        canvas.set_minimized(a, true);
        assert_eq!(canvas.close_floater(a), CloseOutcome::Missing);
        assert_eq!(canvas.membership(a), Membership::Detached);
    }
}
