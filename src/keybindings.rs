use std::collections::HashMap;
use std::fmt;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::canvas::WindowCommand;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Quit,
    OpenHelp,
    CloseHelp,
    NewWindow,
    CycleNextWindow,
    CyclePrevWindow,
    CloseWindow,
    ToggleMinimize,
    TearOff,
    NextTab,
    PrevTab,
    RestoreAll,
    // Confirm dialog
    ConfirmAccept,
    ConfirmCancel,
}

impl Action {
    /// The canvas command an action maps to, if it is a window-management
    /// action rather than an application one.
    pub fn command(self) -> Option<WindowCommand> {
        match self {
            Action::CycleNextWindow => Some(WindowCommand::CycleNext),
            Action::CyclePrevWindow => Some(WindowCommand::CyclePrev),
            Action::CloseWindow => Some(WindowCommand::CloseFocused),
            Action::ToggleMinimize => Some(WindowCommand::ToggleMinimizeFocused),
            Action::TearOff => Some(WindowCommand::TearOffFocused),
            Action::NextTab => Some(WindowCommand::NextTab),
            Action::PrevTab => Some(WindowCommand::PrevTab),
            _ => None,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Action::Quit => "Quit",
            Action::OpenHelp => "Open help",
            Action::CloseHelp => "Close help",
            Action::NewWindow => "New window",
            Action::CycleNextWindow => "Cycle next window",
            Action::CyclePrevWindow => "Cycle previous window",
            Action::CloseWindow => "Close focused window",
            Action::ToggleMinimize => "Minimize / restore focused window",
            Action::TearOff => "Tear off / re-dock tab",
            Action::NextTab => "Next tab",
            Action::PrevTab => "Previous tab",
            Action::RestoreAll => "Restore all windows",
            Action::ConfirmAccept => "Confirm accept",
            Action::ConfirmCancel => "Confirm cancel",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyCombo {
    pub code: KeyCode,
    pub mods: KeyModifiers,
}

impl KeyCombo {
    pub fn new(code: KeyCode, mods: KeyModifiers) -> Self {
        Self { code, mods }
    }

    pub fn plain(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::NONE)
    }

    pub fn matches(&self, key: &KeyEvent) -> bool {
        key.code == self.code && key.modifiers == self.mods
    }

    pub fn display(&self) -> String {
        let mut parts = Vec::new();
        if self.mods.contains(KeyModifiers::CONTROL) {
            parts.push("Ctrl".to_string());
        }
        if self.mods.contains(KeyModifiers::SHIFT) {
            parts.push("Shift".to_string());
        }
        if self.mods.contains(KeyModifiers::ALT) {
            parts.push("Alt".to_string());
        }
        let code = match self.code {
            KeyCode::Char(c) => c.to_ascii_uppercase().to_string(),
            KeyCode::Esc => "Esc".to_string(),
            KeyCode::Enter => "Enter".to_string(),
            KeyCode::Tab => "Tab".to_string(),
            KeyCode::BackTab => "Shift+Tab".to_string(),
            KeyCode::Left => "Left".to_string(),
            KeyCode::Right => "Right".to_string(),
            KeyCode::Up => "Up".to_string(),
            KeyCode::Down => "Down".to_string(),
            KeyCode::F(n) => format!("F{}", n),
            _ => format!("{:?}", self.code),
        };
        parts.push(code);
        parts.join("+")
    }
}

impl fmt::Display for KeyCombo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}

#[derive(Debug, Clone)]
pub struct KeyBindings {
    map: HashMap<Action, Vec<KeyCombo>>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        use Action::*;
        let ctrl = KeyModifiers::CONTROL;
        let mut kb = Self::new();
        kb.add(Quit, KeyCombo::new(KeyCode::Char('q'), ctrl));
        kb.add(OpenHelp, KeyCombo::plain(KeyCode::F(1)));
        kb.add(CloseHelp, KeyCombo::plain(KeyCode::Esc));
        kb.add(NewWindow, KeyCombo::new(KeyCode::Char('n'), ctrl));
        kb.add(CycleNextWindow, KeyCombo::plain(KeyCode::Tab));
        kb.add(CyclePrevWindow, KeyCombo::plain(KeyCode::BackTab));
        kb.add(CloseWindow, KeyCombo::new(KeyCode::Char('w'), ctrl));
        kb.add(ToggleMinimize, KeyCombo::new(KeyCode::Char('e'), ctrl));
        kb.add(TearOff, KeyCombo::new(KeyCode::Char('t'), ctrl));
        kb.add(NextTab, KeyCombo::plain(KeyCode::Char(']')));
        kb.add(PrevTab, KeyCombo::plain(KeyCode::Char('[')));
        kb.add(RestoreAll, KeyCombo::new(KeyCode::Char('r'), ctrl));
        kb.add(ConfirmAccept, KeyCombo::plain(KeyCode::Char('y')));
        kb.add(ConfirmAccept, KeyCombo::plain(KeyCode::Enter));
        kb.add(ConfirmCancel, KeyCombo::plain(KeyCode::Char('n')));
        kb.add(ConfirmCancel, KeyCombo::plain(KeyCode::Esc));
        kb
    }
}

impl KeyBindings {
    pub fn new() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    pub fn add(&mut self, action: Action, combo: KeyCombo) {
        self.map.entry(action).or_default().push(combo);
    }

    pub fn matches(&self, action: Action, key: &KeyEvent) -> bool {
        self.map
            .get(&action)
            .is_some_and(|combos| combos.iter().any(|c| c.matches(key)))
    }

    /// First action among `candidates` bound to `key`. Several actions can
    /// share a key (Esc closes help and cancels a confirm), so callers name
    /// the ones that apply in their context.
    pub fn action_for(&self, key: &KeyEvent, candidates: &[Action]) -> Option<Action> {
        candidates.iter().copied().find(|a| self.matches(*a, key))
    }

    pub fn combos_for(&self, action: Action) -> &[KeyCombo] {
        self.map.get(&action).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Human-readable key list, e.g. `"Tab"` or `"Y, Enter"`.
    pub fn combos_display(&self, action: Action) -> String {
        self.combos_for(action)
            .iter()
            .map(KeyCombo::display)
            .collect::<Vec<_>>()
            .join(", ")
    }
}
