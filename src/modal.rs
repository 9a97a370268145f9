use crate::floater::FloaterId;

/// Stack of modal dialogs, front first. Only the front dialog is shown and
/// holds input; the ones below it are hidden until it stops.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModalStack {
    dialogs: Vec<FloaterId>,
}

impl ModalStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn front(&self) -> Option<FloaterId> {
        self.dialogs.first().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.dialogs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.dialogs.len()
    }

    pub fn contains(&self, id: FloaterId) -> bool {
        self.dialogs.contains(&id)
    }

    pub fn dialogs(&self) -> &[FloaterId] {
        &self.dialogs
    }

    /// Puts `id` at the front, moving it there if it was already stacked.
    /// Returns the dialog it displaced from the front, if any.
    pub(crate) fn push_front(&mut self, id: FloaterId) -> Option<FloaterId> {
        let displaced = self.front().filter(|front| *front != id);
        self.dialogs.retain(|d| *d != id);
        self.dialogs.insert(0, id);
        displaced
    }

    pub(crate) fn remove(&mut self, id: FloaterId) -> bool {
        let before = self.dialogs.len();
        self.dialogs.retain(|d| *d != id);
        before != self.dialogs.len()
    }

    pub(crate) fn prune(&mut self, alive: impl Fn(FloaterId) -> bool) {
        self.dialogs.retain(|d| alive(*d));
    }
}
