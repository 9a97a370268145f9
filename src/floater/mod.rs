//! The floating window itself: geometry, capabilities, chrome children and
//! the weak links to its host, dependee and dependents.
//!
//! Floaters never act on their own; every operation that involves other
//! windows or focus goes through [`crate::canvas::WindowCanvas`].

pub mod chrome;
pub mod handles;

use std::fmt;

use bitflags::bitflags;

use crate::config::FloaterConfig;
use crate::geometry::{Follows, Point, Rect};
use crate::host::TabbedHost;
use handles::{Corner, Side};

slotmap::new_key_type! {
    /// Generational handle to a floater. Resolves to nothing once the
    /// floater has been destroyed.
    pub struct FloaterId;
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Capabilities: u8 {
        const RESIZE = 1 << 0;
        const MINIMIZE = 1 << 1;
        const CLOSE = 1 << 2;
        const DRAG = 1 << 3;
        const TEAR_OFF = 1 << 4;
        const DOCK = 1 << 5;
    }
}

impl Capabilities {
    /// Capabilities a hosted floater gives up while it lives in a tab.
    pub const HOST_STRIPPED: Capabilities = Capabilities::RESIZE
        .union(Capabilities::MINIMIZE)
        .union(Capabilities::DRAG);
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ChromeButtons: u8 {
        const CLOSE = 1 << 0;
        const MINIMIZE = 1 << 1;
        const RESTORE = 1 << 2;
        const TEAR_OFF = 1 << 3;
        const EDIT = 1 << 4;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ChromeButton {
    Close,
    Restore,
    Minimize,
    TearOff,
    Edit,
}

impl ChromeButton {
    /// Right-to-left order along the title bar.
    pub const ALL: [ChromeButton; 5] = [
        ChromeButton::Close,
        ChromeButton::Restore,
        ChromeButton::Minimize,
        ChromeButton::TearOff,
        ChromeButton::Edit,
    ];

    pub fn flag(self) -> ChromeButtons {
        match self {
            ChromeButton::Close => ChromeButtons::CLOSE,
            ChromeButton::Restore => ChromeButtons::RESTORE,
            ChromeButton::Minimize => ChromeButtons::MINIMIZE,
            ChromeButton::TearOff => ChromeButtons::TEAR_OFF,
            ChromeButton::Edit => ChromeButtons::EDIT,
        }
    }

    pub fn glyph(self) -> char {
        match self {
            ChromeButton::Close => 'x',
            ChromeButton::Restore => '^',
            ChromeButton::Minimize => '_',
            ChromeButton::TearOff => '>',
            ChromeButton::Edit => '*',
        }
    }
}

/// A child view of a floater. Chrome children are created with the floater;
/// content children are registered by whoever fills the floater.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ChildKind {
    DragHandle,
    ResizeBar(Side),
    ResizeHandle(Corner),
    Button(ChromeButton),
    Content(u16),
}

impl ChildKind {
    pub fn is_resize_control(self) -> bool {
        matches!(self, ChildKind::ResizeBar(_) | ChildKind::ResizeHandle(_))
    }

    pub fn is_content(self) -> bool {
        matches!(self, ChildKind::Content(_))
    }
}

/// Identifies anything that can hold an arbiter resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ViewId {
    Canvas,
    Floater(FloaterId),
    Child(FloaterId, ChildKind),
}

impl ViewId {
    pub fn floater(self) -> Option<FloaterId> {
        match self {
            ViewId::Canvas => None,
            ViewId::Floater(id) | ViewId::Child(id, _) => Some(id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildView {
    pub kind: ChildKind,
    /// Floater-local rect.
    pub rect: Rect,
    pub visible: bool,
    pub enabled: bool,
}

impl ChildView {
    fn new(kind: ChildKind) -> Self {
        Self {
            kind,
            rect: Rect::default(),
            visible: true,
            enabled: true,
        }
    }
}

/// Per-dialog state of a modal floater.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModalDialog {
    /// Keyboard focus holder when this dialog started; restored when it stops.
    pub previous_focus: Option<ViewId>,
}

#[derive(Debug, Default)]
pub enum FloaterKind {
    #[default]
    Plain,
    Host(TabbedHost),
    Modal(ModalDialog),
}

pub type CanCloseGuard = Box<dyn FnMut(FloaterId) -> bool>;
pub type FloaterHook = Box<dyn FnMut(FloaterId)>;

#[derive(Default)]
pub struct FloaterHooks {
    pub can_close: Option<CanCloseGuard>,
    pub on_close: Option<FloaterHook>,
    pub on_edit: Option<FloaterHook>,
}

impl fmt::Debug for FloaterHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FloaterHooks")
            .field("can_close", &self.can_close.is_some())
            .field("on_close", &self.on_close.is_some())
            .field("on_edit", &self.on_edit.is_some())
            .finish()
    }
}

/// Construction parameters for [`crate::canvas::WindowCanvas::create_floater`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FloaterParams {
    pub title: String,
    pub short_title: Option<String>,
    pub rect: Option<Rect>,
    pub min_width: i32,
    pub min_height: i32,
    pub capabilities: Capabilities,
    pub auto_focus: bool,
    pub single_instance: bool,
    pub open_centered: bool,
    pub persist_key: Option<String>,
    pub preferred_host: Option<FloaterId>,
}

impl FloaterParams {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            short_title: None,
            rect: None,
            min_width: 0,
            min_height: 0,
            capabilities: Capabilities::RESIZE
                | Capabilities::MINIMIZE
                | Capabilities::CLOSE
                | Capabilities::DRAG,
            auto_focus: true,
            single_instance: false,
            open_centered: false,
            persist_key: None,
            preferred_host: None,
        }
    }

    pub fn with_rect(mut self, rect: Rect) -> Self {
        self.rect = Some(rect);
        self
    }

    pub fn with_min_size(mut self, width: i32, height: i32) -> Self {
        self.min_width = width;
        self.min_height = height;
        self
    }

    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn with_short_title(mut self, short: impl Into<String>) -> Self {
        self.short_title = Some(short.into());
        self
    }

    pub fn with_persist_key(mut self, key: impl Into<String>) -> Self {
        self.persist_key = Some(key.into());
        self
    }

    pub fn with_preferred_host(mut self, host: FloaterId) -> Self {
        self.preferred_host = Some(host);
        self
    }

    pub fn auto_focus(mut self, auto_focus: bool) -> Self {
        self.auto_focus = auto_focus;
        self
    }

    pub fn single_instance(mut self, single_instance: bool) -> Self {
        self.single_instance = single_instance;
        self
    }

    pub fn open_centered(mut self, centered: bool) -> Self {
        self.open_centered = centered;
        self
    }
}

#[derive(Debug)]
pub struct Floater {
    pub(crate) title: String,
    pub(crate) short_title: Option<String>,
    pub(crate) rect: Rect,
    pub(crate) has_rect: bool,
    pub(crate) min_width: i32,
    pub(crate) min_height: i32,
    pub(crate) visible: bool,
    pub(crate) minimized: bool,
    pub(crate) expanded_rect: Rect,
    pub(crate) dragged_while_minimized: bool,
    pub(crate) minimized_origin: Point,
    pub(crate) capabilities: Capabilities,
    pub(crate) buttons_enabled: ChromeButtons,
    pub(crate) button_size: i32,
    pub(crate) foreground: bool,
    pub(crate) focus_root: bool,
    pub(crate) host: Option<FloaterId>,
    pub(crate) last_host: Option<FloaterId>,
    pub(crate) preferred_host: Option<FloaterId>,
    pub(crate) torn_off: bool,
    pub(crate) docked: bool,
    pub(crate) dependents: Vec<FloaterId>,
    pub(crate) dependee: Option<FloaterId>,
    pub(crate) snap_target: Option<FloaterId>,
    pub(crate) auto_focus: bool,
    pub(crate) single_instance: bool,
    pub(crate) open_centered: bool,
    pub(crate) follows: Follows,
    pub(crate) children: Vec<ChildView>,
    pub(crate) hidden_before_minimize: Vec<ChildKind>,
    /// Visibility saved by each canvas-wide push, innermost last.
    pub(crate) saved_visibility: Vec<bool>,
    pub(crate) persist_key: Option<String>,
    pub(crate) kind: FloaterKind,
    pub(crate) hooks: FloaterHooks,
}

impl Floater {
    pub(crate) fn new(params: FloaterParams, kind: FloaterKind, config: &FloaterConfig) -> Self {
        let mut children = vec![ChildView::new(ChildKind::DragHandle)];
        children.extend(Side::ALL.map(|s| ChildView::new(ChildKind::ResizeBar(s))));
        children.extend(Corner::ALL.map(|c| ChildView::new(ChildKind::ResizeHandle(c))));
        children.extend(ChromeButton::ALL.map(|b| ChildView::new(ChildKind::Button(b))));

        let rect = params.rect.unwrap_or_default();
        let mut floater = Self {
            title: params.title,
            short_title: params.short_title,
            rect,
            has_rect: params.rect.is_some(),
            min_width: params.min_width.max(0),
            min_height: params.min_height.max(0),
            visible: false,
            minimized: false,
            expanded_rect: rect,
            dragged_while_minimized: false,
            minimized_origin: Point::default(),
            capabilities: params.capabilities,
            buttons_enabled: ChromeButtons::empty(),
            button_size: config.scaled_button_size(false),
            foreground: false,
            focus_root: true,
            host: None,
            last_host: None,
            preferred_host: params.preferred_host,
            torn_off: false,
            docked: false,
            dependents: Vec::new(),
            dependee: None,
            snap_target: None,
            auto_focus: params.auto_focus,
            single_instance: params.single_instance,
            open_centered: params.open_centered,
            follows: Follows::LEFT | Follows::TOP,
            children,
            hidden_before_minimize: Vec::new(),
            saved_visibility: Vec::new(),
            persist_key: params.persist_key,
            kind,
            hooks: FloaterHooks::default(),
        };
        floater.sync_buttons_with_capabilities();
        floater.enable_resize_ctrls(floater.is_resizable());
        chrome::layout(&mut floater, config);
        floater
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Title shown on the title bar: the short title while minimized.
    pub fn display_title(&self) -> &str {
        match (&self.short_title, self.minimized) {
            (Some(short), true) => short,
            _ => &self.title,
        }
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn expanded_rect(&self) -> Rect {
        self.expanded_rect
    }

    pub fn min_size(&self) -> (i32, i32) {
        (self.min_width, self.min_height)
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_minimized(&self) -> bool {
        self.minimized
    }

    pub fn is_foreground(&self) -> bool {
        self.foreground
    }

    pub fn is_focus_root(&self) -> bool {
        self.focus_root
    }

    pub fn is_torn_off(&self) -> bool {
        self.torn_off
    }

    pub fn is_docked(&self) -> bool {
        self.docked
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    pub fn is_resizable(&self) -> bool {
        self.capabilities.contains(Capabilities::RESIZE)
    }

    pub fn can_minimize(&self) -> bool {
        self.capabilities.contains(Capabilities::MINIMIZE)
    }

    pub fn can_close(&self) -> bool {
        self.capabilities.contains(Capabilities::CLOSE)
    }

    pub fn can_drag(&self) -> bool {
        self.capabilities.contains(Capabilities::DRAG)
    }

    pub fn can_tear_off(&self) -> bool {
        self.capabilities.contains(Capabilities::TEAR_OFF)
    }

    pub fn buttons_enabled(&self) -> ChromeButtons {
        self.buttons_enabled
    }

    pub fn button_size(&self) -> i32 {
        self.button_size
    }

    /// Raw host link. Use the canvas to resolve liveness.
    pub fn host(&self) -> Option<FloaterId> {
        self.host
    }

    pub fn last_host(&self) -> Option<FloaterId> {
        self.last_host
    }

    pub fn dependents(&self) -> &[FloaterId] {
        &self.dependents
    }

    pub fn dependee(&self) -> Option<FloaterId> {
        self.dependee
    }

    pub fn snap_target(&self) -> Option<FloaterId> {
        self.snap_target
    }

    pub fn follows(&self) -> Follows {
        self.follows
    }

    pub fn persist_key(&self) -> Option<&str> {
        self.persist_key.as_deref()
    }

    pub fn kind(&self) -> &FloaterKind {
        &self.kind
    }

    pub fn is_host(&self) -> bool {
        matches!(self.kind, FloaterKind::Host(_))
    }

    pub fn tabbed_host(&self) -> Option<&TabbedHost> {
        match &self.kind {
            FloaterKind::Host(host) => Some(host),
            _ => None,
        }
    }

    pub(crate) fn tabbed_host_mut(&mut self) -> Option<&mut TabbedHost> {
        match &mut self.kind {
            FloaterKind::Host(host) => Some(host),
            _ => None,
        }
    }

    pub fn is_modal_dialog(&self) -> bool {
        matches!(self.kind, FloaterKind::Modal(_))
    }

    pub fn children(&self) -> &[ChildView] {
        &self.children
    }

    pub fn child(&self, kind: ChildKind) -> Option<&ChildView> {
        self.children.iter().find(|c| c.kind == kind)
    }

    pub(crate) fn child_mut(&mut self, kind: ChildKind) -> Option<&mut ChildView> {
        self.children.iter_mut().find(|c| c.kind == kind)
    }

    pub(crate) fn set_child_visible(&mut self, kind: ChildKind, visible: bool) {
        if let Some(child) = self.child_mut(kind) {
            child.visible = visible;
        }
    }

    /// Child rect in canvas coordinates.
    pub fn child_screen_rect(&self, kind: ChildKind) -> Option<Rect> {
        self.child(kind)
            .map(|c| c.rect.translated(self.rect.left, self.rect.top))
    }

    pub(crate) fn set_hooks(&mut self, hooks: FloaterHooks) {
        self.hooks = hooks;
    }

    pub(crate) fn set_capability(&mut self, capability: Capabilities, enabled: bool) {
        self.capabilities.set(capability, enabled);
        self.sync_buttons_with_capabilities();
        if capability.contains(Capabilities::RESIZE) {
            self.enable_resize_ctrls(enabled && !self.minimized);
        }
    }

    /// Keeps the enabled chrome buttons consistent with the capability flags
    /// and the minimized state.
    pub(crate) fn sync_buttons_with_capabilities(&mut self) {
        let caps = self.capabilities;
        let mut buttons = self.buttons_enabled & ChromeButtons::EDIT;
        buttons.set(ChromeButtons::CLOSE, caps.contains(Capabilities::CLOSE));
        buttons.set(
            ChromeButtons::MINIMIZE,
            caps.contains(Capabilities::MINIMIZE) && !self.minimized,
        );
        buttons.set(ChromeButtons::RESTORE, self.minimized);
        buttons.set(
            ChromeButtons::TEAR_OFF,
            caps.contains(Capabilities::TEAR_OFF) && (self.host.is_some() || self.torn_off),
        );
        self.buttons_enabled = buttons;
        for button in ChromeButton::ALL {
            let enabled = buttons.contains(button.flag());
            if let Some(child) = self.child_mut(ChildKind::Button(button)) {
                child.enabled = enabled;
                child.visible = enabled;
            }
        }
    }

    pub(crate) fn set_edit_button(&mut self, enabled: bool) {
        self.buttons_enabled.set(ChromeButtons::EDIT, enabled);
        self.sync_buttons_with_capabilities();
    }

    pub(crate) fn enable_resize_ctrls(&mut self, enable: bool) {
        for child in self.children.iter_mut().filter(|c| c.kind.is_resize_control()) {
            child.enabled = enable;
            child.visible = enable;
        }
    }

    /// Adds or replaces a content child at a floater-local rect.
    pub(crate) fn upsert_content(&mut self, slot: u16, rect: Rect) {
        let kind = ChildKind::Content(slot);
        match self.child_mut(kind) {
            Some(child) => child.rect = rect,
            None => {
                let mut child = ChildView::new(kind);
                child.rect = rect;
                child.visible = !self.minimized;
                self.children.push(child);
            }
        }
    }

    /// Topmost child under a canvas point. Children later in the list win,
    /// so chrome is checked in its priority order first.
    pub fn child_at(&self, point: Point) -> Option<ChildKind> {
        let local = Point::new(point.x - self.rect.left, point.y - self.rect.top);
        let priority = |kind: ChildKind| match kind {
            ChildKind::Button(_) => 0,
            ChildKind::ResizeHandle(_) => 1,
            ChildKind::ResizeBar(_) => 2,
            ChildKind::DragHandle => 3,
            ChildKind::Content(_) => 4,
        };
        self.children
            .iter()
            .filter(|c| c.visible && c.enabled && c.rect.contains(local))
            .min_by_key(|c| priority(c.kind))
            .map(|c| c.kind)
    }

    pub(crate) fn add_dependent(&mut self, dependent: FloaterId) -> bool {
        if self.dependents.contains(&dependent) {
            return false;
        }
        self.dependents.push(dependent);
        true
    }

    pub(crate) fn remove_dependent(&mut self, dependent: FloaterId) -> bool {
        let before = self.dependents.len();
        self.dependents.retain(|d| *d != dependent);
        before != self.dependents.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn floater(caps: Capabilities) -> Floater {
        Floater::new(
            FloaterParams::new("Inventory")
                .with_rect(Rect::from_origin_size(10, 10, 200, 120))
                .with_capabilities(caps),
            FloaterKind::Plain,
            &FloaterConfig::default(),
        )
    }

    #[test]
    fn buttons_follow_capabilities() {
        let f = floater(Capabilities::CLOSE);
        assert_eq!(f.buttons_enabled(), ChromeButtons::CLOSE);
        assert!(!f.child(ChildKind::ResizeBar(Side::Left)).unwrap().enabled);

        let mut f = floater(Capabilities::CLOSE | Capabilities::MINIMIZE);
        assert!(f.buttons_enabled().contains(ChromeButtons::MINIMIZE));
        f.set_capability(Capabilities::MINIMIZE, false);
        assert!(!f.buttons_enabled().contains(ChromeButtons::MINIMIZE));
    }

    #[test]
    fn tear_off_button_needs_a_host() {
        let mut f = floater(Capabilities::CLOSE | Capabilities::TEAR_OFF);
        assert!(!f.buttons_enabled().contains(ChromeButtons::TEAR_OFF));
        f.host = Some(FloaterId::default());
        f.sync_buttons_with_capabilities();
        assert!(f.buttons_enabled().contains(ChromeButtons::TEAR_OFF));
    }

    #[test]
    fn short_title_only_when_minimized() {
        let mut f = Floater::new(
            FloaterParams::new("Inventory").with_short_title("Inv"),
            FloaterKind::Plain,
            &FloaterConfig::default(),
        );
        assert_eq!(f.display_title(), "Inventory");
        f.minimized = true;
        assert_eq!(f.display_title(), "Inv");
    }

    #[test]
    fn hit_test_prefers_buttons_over_title() {
        let f = floater(Capabilities::all());
        let close = f.child_screen_rect(ChildKind::Button(ChromeButton::Close)).unwrap();
        assert_eq!(
            f.child_at(Point::new(close.left, close.top + 1)),
            Some(ChildKind::Button(ChromeButton::Close))
        );
        assert_eq!(
            f.child_at(Point::new(60, 14)),
            Some(ChildKind::DragHandle)
        );
        assert_eq!(
            f.child_at(Point::new(10, 129)),
            Some(ChildKind::ResizeHandle(Corner::LeftBottom))
        );
    }

    #[test]
    fn dependents_are_a_set() {
        let mut f = floater(Capabilities::CLOSE);
        let id = FloaterId::default();
        assert!(f.add_dependent(id));
        assert!(!f.add_dependent(id));
        assert!(f.remove_dependent(id));
        assert!(f.dependents().is_empty());
    }
}
