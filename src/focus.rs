//! Arbitration of the three exclusive input resources: mouse capture,
//! keyboard focus and the top-view gate.
//!
//! The arbiter is generic over the view identifier so it can be exercised on
//! its own; the canvas instantiates it with [`crate::floater::ViewId`] and
//! supplies the hierarchy through [`ViewHierarchy`].

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::hash::Hash;

use crate::constants::MAX_VIEW_DEPTH;

/// Invoked with the view that just lost a resource, before the new holder is
/// installed.
pub type LostCallback<V> = Box<dyn FnOnce(V)>;

/// Parent/child traversal the arbiter needs for subtree queries.
pub trait ViewHierarchy<V> {
    fn parent_of(&self, view: V) -> Option<V>;

    /// Focus roots remember their last focused descendant.
    fn is_focus_root(&self, _view: V) -> bool {
        false
    }
}

/// Whether `view` is `ancestor` or one of its descendants.
pub fn view_is_within<V, T>(tree: &T, view: V, ancestor: V) -> bool
where
    V: Copy + Eq,
    T: ViewHierarchy<V> + ?Sized,
{
    let mut current = Some(view);
    for _ in 0..MAX_VIEW_DEPTH {
        let Some(v) = current else {
            return false;
        };
        if v == ancestor {
            return true;
        }
        current = tree.parent_of(v);
    }
    false
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    MouseCapture,
    KeyboardFocus,
    TopView,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArbiterEvent<V> {
    Lost(Resource, V),
    Gained(Resource, V),
}

struct Holder<V> {
    view: V,
    on_lost: Option<LostCallback<V>>,
}

impl<V: Copy> Holder<V> {
    fn new(view: V, on_lost: Option<LostCallback<V>>) -> Self {
        Self { view, on_lost }
    }

    fn notify_lost(self) {
        if let Some(callback) = self.on_lost {
            callback(self.view);
        }
    }
}

pub struct FocusArbiter<V> {
    mouse_capture: Option<Holder<V>>,
    keyboard_focus: Option<Holder<V>>,
    top_view: Option<Holder<V>>,
    focus_lock: Option<V>,
    last_focus: HashMap<V, V>,
    events: VecDeque<ArbiterEvent<V>>,
}

impl<V> Default for FocusArbiter<V> {
    fn default() -> Self {
        Self {
            mouse_capture: None,
            keyboard_focus: None,
            top_view: None,
            focus_lock: None,
            last_focus: HashMap::new(),
            events: VecDeque::new(),
        }
    }
}

impl<V: fmt::Debug> fmt::Debug for FocusArbiter<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FocusArbiter")
            .field("mouse_capture", &self.mouse_capture.as_ref().map(|h| &h.view))
            .field(
                "keyboard_focus",
                &self.keyboard_focus.as_ref().map(|h| &h.view),
            )
            .field("top_view", &self.top_view.as_ref().map(|h| &h.view))
            .field("focus_lock", &self.focus_lock)
            .field("last_focus", &self.last_focus)
            .finish()
    }
}

impl<V> FocusArbiter<V>
where
    V: Copy + Eq + Hash + fmt::Debug,
{
    pub fn new() -> Self {
        Self::default()
    }

    fn slot_mut(&mut self, resource: Resource) -> &mut Option<Holder<V>> {
        match resource {
            Resource::MouseCapture => &mut self.mouse_capture,
            Resource::KeyboardFocus => &mut self.keyboard_focus,
            Resource::TopView => &mut self.top_view,
        }
    }

    fn holder(&self, resource: Resource) -> Option<V> {
        let slot = match resource {
            Resource::MouseCapture => &self.mouse_capture,
            Resource::KeyboardFocus => &self.keyboard_focus,
            Resource::TopView => &self.top_view,
        };
        slot.as_ref().map(|h| h.view)
    }

    /// Swaps the holder of `resource`. Returns `false` when `view` already
    /// held it, in which case nothing is notified.
    fn replace(
        &mut self,
        resource: Resource,
        view: Option<V>,
        on_lost: Option<LostCallback<V>>,
    ) -> bool {
        if self.holder(resource) == view {
            return false;
        }
        if let Some(previous) = self.slot_mut(resource).take() {
            let lost = previous.view;
            previous.notify_lost();
            self.events.push_back(ArbiterEvent::Lost(resource, lost));
            tracing::trace!(?resource, view = ?lost, "arbiter resource lost");
        }
        if let Some(v) = view {
            *self.slot_mut(resource) = Some(Holder::new(v, on_lost));
            self.events.push_back(ArbiterEvent::Gained(resource, v));
            tracing::trace!(?resource, view = ?v, "arbiter resource gained");
        }
        true
    }

    pub fn mouse_capture(&self) -> Option<V> {
        self.holder(Resource::MouseCapture)
    }

    pub fn keyboard_focus(&self) -> Option<V> {
        self.holder(Resource::KeyboardFocus)
    }

    pub fn top_view(&self) -> Option<V> {
        self.holder(Resource::TopView)
    }

    pub fn focus_lock(&self) -> Option<V> {
        self.focus_lock
    }

    pub fn set_mouse_capture(&mut self, view: Option<V>) {
        self.replace(Resource::MouseCapture, view, None);
    }

    /// Moves keyboard focus to `view` (or clears it).
    ///
    /// While a lock is engaged, focus may only move within the locked
    /// subtree; anything else is refused and `false` is returned. With
    /// `lock` set, the lock is re-rooted at `view`.
    pub fn set_keyboard_focus<T>(
        &mut self,
        tree: &T,
        view: Option<V>,
        on_lost: Option<LostCallback<V>>,
        lock: bool,
    ) -> bool
    where
        T: ViewHierarchy<V> + ?Sized,
    {
        if let Some(locked) = self.focus_lock {
            let allowed = view.is_some_and(|v| view_is_within(tree, v, locked));
            if !allowed {
                tracing::debug!(?view, ?locked, "keyboard focus refused by lock");
                return false;
            }
        }
        self.replace(Resource::KeyboardFocus, view, on_lost);
        if let Some(v) = view {
            self.remember_focus(tree, v);
            if lock {
                self.focus_lock = Some(v);
            }
        }
        true
    }

    pub fn set_top_view(&mut self, view: Option<V>, on_lost: Option<LostCallback<V>>) {
        self.replace(Resource::TopView, view, on_lost);
    }

    /// Restricts focus changes to the subtree rooted at `root`.
    pub fn lock_focus(&mut self, root: V) {
        self.focus_lock = Some(root);
    }

    pub fn unlock_focus(&mut self) {
        self.focus_lock = None;
    }

    pub fn release_mouse_capture(&mut self, view: V) {
        if self.mouse_capture() == Some(view) {
            self.replace(Resource::MouseCapture, None, None);
        }
    }

    pub fn release_keyboard_focus(&mut self, view: V) {
        if self.keyboard_focus() == Some(view) {
            self.replace(Resource::KeyboardFocus, None, None);
        }
        if self.focus_lock == Some(view) {
            self.focus_lock = None;
        }
    }

    pub fn release_top_view(&mut self, view: V) {
        if self.top_view() == Some(view) {
            self.replace(Resource::TopView, None, None);
        }
    }

    /// Releases every resource held by `root` or its descendants, including a
    /// focus lock rooted inside it.
    pub fn release_within<T>(&mut self, tree: &T, root: V)
    where
        T: ViewHierarchy<V> + ?Sized,
    {
        for resource in [
            Resource::MouseCapture,
            Resource::KeyboardFocus,
            Resource::TopView,
        ] {
            if self
                .holder(resource)
                .is_some_and(|v| view_is_within(tree, v, root))
            {
                self.replace(resource, None, None);
            }
        }
        if self
            .focus_lock
            .is_some_and(|v| view_is_within(tree, v, root))
        {
            self.focus_lock = None;
        }
    }

    pub fn child_has_mouse_capture<T>(&self, tree: &T, root: V) -> bool
    where
        T: ViewHierarchy<V> + ?Sized,
    {
        self.mouse_capture()
            .is_some_and(|v| view_is_within(tree, v, root))
    }

    pub fn child_has_keyboard_focus<T>(&self, tree: &T, root: V) -> bool
    where
        T: ViewHierarchy<V> + ?Sized,
    {
        self.keyboard_focus()
            .is_some_and(|v| view_is_within(tree, v, root))
    }

    pub fn child_is_top_view<T>(&self, tree: &T, root: V) -> bool
    where
        T: ViewHierarchy<V> + ?Sized,
    {
        self.top_view().is_some_and(|v| view_is_within(tree, v, root))
    }

    fn remember_focus<T>(&mut self, tree: &T, view: V)
    where
        T: ViewHierarchy<V> + ?Sized,
    {
        let mut current = tree.parent_of(view);
        for _ in 0..MAX_VIEW_DEPTH {
            let Some(ancestor) = current else {
                break;
            };
            if tree.is_focus_root(ancestor) {
                self.last_focus.insert(ancestor, view);
            }
            current = tree.parent_of(ancestor);
        }
    }

    pub fn last_focus_for_group(&self, root: V) -> Option<V> {
        self.last_focus.get(&root).copied()
    }

    pub fn clear_last_focus_for_group(&mut self, root: V) {
        self.last_focus.remove(&root);
    }

    /// Drops every trace of views matching `dead`. Held resources are
    /// released without running their lost-callbacks, since the holder no
    /// longer exists to react.
    pub fn forget_views(&mut self, mut dead: impl FnMut(V) -> bool) {
        self.last_focus
            .retain(|root, focused| !dead(*root) && !dead(*focused));
        for resource in [
            Resource::MouseCapture,
            Resource::KeyboardFocus,
            Resource::TopView,
        ] {
            if let Some(v) = self.holder(resource)
                && dead(v)
            {
                *self.slot_mut(resource) = None;
                self.events.push_back(ArbiterEvent::Lost(resource, v));
            }
        }
        if self.focus_lock.is_some_and(&mut dead) {
            self.focus_lock = None;
        }
    }

    /// Releases everything, notifying current holders. Used at shutdown.
    pub fn reset(&mut self) {
        for resource in [
            Resource::MouseCapture,
            Resource::KeyboardFocus,
            Resource::TopView,
        ] {
            self.replace(resource, None, None);
        }
        self.focus_lock = None;
        self.last_focus.clear();
    }

    pub fn drain_events(&mut self) -> Vec<ArbiterEvent<V>> {
        self.events.drain(..).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// 1 is a focus root with children 10 and 11; 2 is a focus root with
    /// child 20. 0 is the common parent.
    struct Tree;

    impl ViewHierarchy<u32> for Tree {
        fn parent_of(&self, view: u32) -> Option<u32> {
            match view {
                0 => None,
                1 | 2 => Some(0),
                10 | 11 => Some(1),
                20 => Some(2),
                _ => None,
            }
        }

        fn is_focus_root(&self, view: u32) -> bool {
            matches!(view, 1 | 2)
        }
    }

    #[test]
    fn lost_callback_runs_before_new_holder_is_installed() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut arbiter = FocusArbiter::new();
        let first_log = log.clone();
        arbiter.set_keyboard_focus(
            &Tree,
            Some(10),
            Some(Box::new(move |v| first_log.borrow_mut().push(format!("lost {v}")))),
            false,
        );
        arbiter.set_keyboard_focus(&Tree, Some(20), None, false);
        assert_eq!(*log.borrow(), vec!["lost 10".to_string()]);
        let events = arbiter.drain_events();
        assert_eq!(
            events,
            vec![
                ArbiterEvent::Gained(Resource::KeyboardFocus, 10),
                ArbiterEvent::Lost(Resource::KeyboardFocus, 10),
                ArbiterEvent::Gained(Resource::KeyboardFocus, 20),
            ]
        );
    }

    #[test]
    fn reassigning_the_holder_is_a_no_op() {
        let mut arbiter = FocusArbiter::new();
        arbiter.set_mouse_capture(Some(10));
        arbiter.drain_events();
        arbiter.set_mouse_capture(Some(10));
        assert!(arbiter.drain_events().is_empty());
    }

    #[test]
    fn each_resource_has_a_single_holder() {
        let mut arbiter = FocusArbiter::new();
        arbiter.set_mouse_capture(Some(10));
        arbiter.set_mouse_capture(Some(11));
        arbiter.set_top_view(Some(1), None);
        arbiter.set_top_view(Some(2), None);
        assert_eq!(arbiter.mouse_capture(), Some(11));
        assert_eq!(arbiter.top_view(), Some(2));
    }

    #[test]
    fn lock_confines_focus_to_subtree() {
        let mut arbiter = FocusArbiter::new();
        assert!(arbiter.set_keyboard_focus(&Tree, Some(10), None, false));
        arbiter.lock_focus(1);
        assert!(!arbiter.set_keyboard_focus(&Tree, Some(20), None, false));
        assert_eq!(arbiter.keyboard_focus(), Some(10));
        assert!(arbiter.set_keyboard_focus(&Tree, Some(11), None, false));
        arbiter.unlock_focus();
        assert!(arbiter.set_keyboard_focus(&Tree, Some(20), None, false));
    }

    #[test]
    fn releases_are_idempotent() {
        let mut arbiter = FocusArbiter::new();
        arbiter.set_mouse_capture(Some(10));
        arbiter.release_mouse_capture(11);
        assert_eq!(arbiter.mouse_capture(), Some(10));
        arbiter.release_mouse_capture(10);
        arbiter.release_mouse_capture(10);
        assert_eq!(arbiter.mouse_capture(), None);
        let lost = arbiter
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, ArbiterEvent::Lost(..)))
            .count();
        assert_eq!(lost, 1);
    }

    #[test]
    fn subtree_queries_and_last_focus_memory() {
        let mut arbiter = FocusArbiter::new();
        arbiter.set_keyboard_focus(&Tree, Some(11), None, false);
        assert!(arbiter.child_has_keyboard_focus(&Tree, 1));
        assert!(arbiter.child_has_keyboard_focus(&Tree, 0));
        assert!(!arbiter.child_has_keyboard_focus(&Tree, 2));
        arbiter.set_keyboard_focus(&Tree, Some(20), None, false);
        assert_eq!(arbiter.last_focus_for_group(1), Some(11));
        assert_eq!(arbiter.last_focus_for_group(2), Some(20));
        arbiter.clear_last_focus_for_group(1);
        assert_eq!(arbiter.last_focus_for_group(1), None);
    }

    #[test]
    fn forget_views_drops_holders_without_callbacks() {
        let fired = Rc::new(RefCell::new(false));
        let flag = fired.clone();
        let mut arbiter = FocusArbiter::new();
        arbiter.set_keyboard_focus(
            &Tree,
            Some(10),
            Some(Box::new(move |_| *flag.borrow_mut() = true)),
            false,
        );
        arbiter.forget_views(|v| v == 10);
        assert_eq!(arbiter.keyboard_focus(), None);
        assert_eq!(arbiter.last_focus_for_group(1), None);
        assert!(!*fired.borrow());
    }

    #[test]
    fn release_within_clears_subtree_holders() {
        let mut arbiter = FocusArbiter::new();
        arbiter.set_keyboard_focus(&Tree, Some(10), None, true);
        arbiter.set_mouse_capture(Some(11));
        arbiter.set_top_view(Some(2), None);
        arbiter.release_within(&Tree, 1);
        assert_eq!(arbiter.keyboard_focus(), None);
        assert_eq!(arbiter.mouse_capture(), None);
        assert_eq!(arbiter.focus_lock(), None);
        assert_eq!(arbiter.top_view(), Some(2));
    }
}
