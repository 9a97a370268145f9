//! The demo application: a handful of floaters, a tabbed host, a dependent
//! inspector, the help dialog and a quit confirmation, wired to a terminal
//! through the input and output drivers.

use std::collections::HashMap;
use std::io;
use std::time::{Duration, Instant};

use crossterm::event::{Event, KeyEvent, KeyEventKind};
use ratatui::layout::Rect as CellRect;
use ratatui::widgets::{Paragraph, Wrap};

use crate::canvas::{DrawList, WindowCanvas, WindowCommand};
use crate::config::FloaterConfig;
use crate::drivers::{InputDriver, OutputDriver};
use crate::event_loop::{ControlFlow, EventLoop};
use crate::floater::{Capabilities, FloaterId, FloaterParams};
use crate::geometry::Rect;
use crate::host::InsertionPoint;
use crate::input::{ClickTracker, pointer_from_mouse};
use crate::keybindings::{Action, KeyBindings};
use crate::persist::RectStore;
use crate::render::{ContentPainter, OpenStepDecorator, render_canvas};
use crate::theme;
use crate::ui::UiFrame;

include!(concat!(env!("OUT_DIR"), "/generated_help.rs"));

/// Actions that apply while no dialog is up, in priority order.
const DESKTOP_ACTIONS: [Action; 11] = [
    Action::Quit,
    Action::OpenHelp,
    Action::NewWindow,
    Action::CycleNextWindow,
    Action::CyclePrevWindow,
    Action::CloseWindow,
    Action::ToggleMinimize,
    Action::TearOff,
    Action::NextTab,
    Action::PrevTab,
    Action::RestoreAll,
];

pub struct DemoOptions {
    pub config: FloaterConfig,
    /// Plain windows opened at startup.
    pub windows: usize,
    pub store: Option<Box<dyn RectStore>>,
}

impl Default for DemoOptions {
    fn default() -> Self {
        Self {
            config: FloaterConfig::terminal(),
            windows: 3,
            store: None,
        }
    }
}

pub struct DemoApp {
    canvas: WindowCanvas,
    bindings: KeyBindings,
    clicks: ClickTracker,
    bodies: HashMap<FloaterId, String>,
    host: FloaterId,
    inspector: Option<FloaterId>,
    help: Option<FloaterId>,
    quit_confirm: Option<FloaterId>,
    spawned: usize,
    quit: bool,
}

impl DemoApp {
    pub fn new(options: DemoOptions, width: u16, height: u16) -> Self {
        let mut canvas =
            WindowCanvas::new(options.config, i32::from(width), i32::from(height));
        if let Some(store) = options.store {
            canvas = canvas.with_rect_store(store);
        }
        let config = canvas.config().clone();
        let host_width = config.tab_width * 2 + 2 * config.host_border;
        let host_height = config.default_height
            + config.header_height
            + config.tab_height
            + config.host_border;
        let host = canvas.create_host(
            FloaterParams::new("Tabs")
                .with_rect(Rect::from_origin_size(
                    (i32::from(width) - host_width - config.cascade_inset).max(0),
                    config.cascade_inset,
                    host_width,
                    host_height,
                ))
                .with_persist_key("tabs")
                .with_capabilities(Capabilities::RESIZE | Capabilities::MINIMIZE | Capabilities::DRAG),
            true,
        );

        let mut app = Self {
            canvas,
            bindings: KeyBindings::default(),
            clicks: ClickTracker::default(),
            bodies: HashMap::new(),
            host,
            inspector: None,
            help: None,
            quit_confirm: None,
            spawned: 0,
            quit: false,
        };

        for _ in 0..options.windows {
            app.spawn_window();
        }
        app.open_tabs();
        app.open_inspector();
        app
    }

    pub fn canvas(&self) -> &WindowCanvas {
        &self.canvas
    }

    pub fn canvas_mut(&mut self) -> &mut WindowCanvas {
        &mut self.canvas
    }

    pub fn host(&self) -> FloaterId {
        self.host
    }

    pub fn inspector(&self) -> Option<FloaterId> {
        self.inspector
    }

    pub fn help(&self) -> Option<FloaterId> {
        self.help
    }

    pub fn quit_confirm(&self) -> Option<FloaterId> {
        self.quit_confirm
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    /// Opens a new cascaded window.
    pub fn spawn_window(&mut self) -> FloaterId {
        self.spawned += 1;
        let n = self.spawned;
        let id = self.canvas.create_floater(
            FloaterParams::new(format!("Window {n}"))
                .with_short_title(format!("W{n}"))
                .with_persist_key(format!("window-{n}"))
                .with_min_size(12, 4),
        );
        self.bodies.insert(
            id,
            format!("Window {n}\n\nDrag the title bar. Edges snap to the screen and to other windows."),
        );
        self.canvas.open_floater(id);
        id
    }

    fn open_tabs(&mut self) {
        let tabs = [
            ("Log", "Events scroll by here."),
            ("Palette", "Pick a color."),
            ("Outline", "Sections of the current document."),
        ];
        let config = self.canvas.config().clone();
        for (title, body) in tabs {
            let id = self.canvas.create_floater(
                FloaterParams::new(title)
                    .with_rect(Rect::from_origin_size(0, 0, config.tab_width * 2, config.default_height))
                    .with_capabilities(Capabilities::all() - Capabilities::DOCK)
                    .with_preferred_host(self.host)
                    .auto_focus(false),
            );
            self.bodies.insert(id, format!("{title}\n\n{body}"));
            self.canvas.add_hosted(self.host, id, false, InsertionPoint::End);
        }
        if let Some(first) = self
            .canvas
            .floater(self.host)
            .and_then(|f| f.tabbed_host())
            .and_then(|t| t.tabs().first().copied())
        {
            self.canvas.open_floater(self.host);
            self.canvas.select_tab(self.host, first);
        }
    }

    fn open_inspector(&mut self) {
        let Some(base) = self.canvas.z_order().last().copied() else {
            return;
        };
        let id = self.canvas.create_floater(
            FloaterParams::new("Inspector")
                .with_rect(Rect::from_origin_size(0, 0, 24, 8))
                .with_capabilities(Capabilities::CLOSE | Capabilities::DRAG)
                .auto_focus(false),
        );
        self.bodies.insert(id, "Follows its window: closes, minimizes and raises with it.".to_string());
        self.canvas.open_floater(id);
        self.canvas.add_dependent_floater(base, id, true);
        self.inspector = Some(id);
    }

    pub fn open_help(&mut self) {
        if self.help.is_some_and(|id| self.canvas.contains(id)) {
            return;
        }
        let (width, height) = {
            let canvas = self.canvas.rect();
            let lines = EMBEDDED_HELP.line_count as i32 + 3;
            ((canvas.width() - 4).clamp(20, 72), (canvas.height() - 2).clamp(6, lines))
        };
        let id = self.canvas.create_modal_dialog(
            FloaterParams::new("Help")
                .with_rect(Rect::from_origin_size(0, 0, width, height))
                .with_capabilities(Capabilities::CLOSE | Capabilities::DRAG),
        );
        self.bodies.insert(id, EMBEDDED_HELP.content.to_string());
        self.canvas.start_modal(id);
        self.help = Some(id);
    }

    pub fn close_help(&mut self) {
        if let Some(id) = self.help.take() {
            self.canvas.close_floater(id);
            self.bodies.remove(&id);
        }
    }

    /// Asks before quitting. The question stacks above the help dialog when
    /// that is open.
    pub fn open_quit_confirm(&mut self) {
        if self.quit_confirm.is_some_and(|id| self.canvas.contains(id)) {
            return;
        }
        let id = self.canvas.create_modal_dialog(
            FloaterParams::new("Quit?")
                .with_rect(Rect::from_origin_size(0, 0, 30, 5))
                .with_capabilities(Capabilities::CLOSE),
        );
        self.bodies.insert(id, "Quit floater-demo?  [y]es / [n]o".to_string());
        self.canvas.start_modal(id);
        self.quit_confirm = Some(id);
    }

    fn close_quit_confirm(&mut self) {
        if let Some(id) = self.quit_confirm.take() {
            self.canvas.close_floater(id);
            self.bodies.remove(&id);
        }
    }

    pub fn handle_event(&mut self, event: &Event) {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(key),
            Event::Mouse(mouse) => {
                if let Some(pointer) = pointer_from_mouse(mouse) {
                    let pointer = self.clicks.observe(pointer, Instant::now());
                    self.canvas.handle_pointer(pointer);
                }
            }
            Event::Resize(width, height) => {
                self.canvas
                    .reshape_canvas(i32::from(*width), i32::from(*height), true);
            }
            _ => {}
        }
    }

    fn handle_key(&mut self, key: &KeyEvent) {
        if self.quit_confirm.is_some() {
            match self
                .bindings
                .action_for(key, &[Action::ConfirmAccept, Action::ConfirmCancel])
            {
                Some(Action::ConfirmAccept) => self.quit = true,
                Some(Action::ConfirmCancel) => self.close_quit_confirm(),
                _ => {}
            }
            return;
        }
        if self.help.is_some() {
            match self
                .bindings
                .action_for(key, &[Action::Quit, Action::CloseHelp])
            {
                Some(Action::Quit) => self.open_quit_confirm(),
                Some(Action::CloseHelp) => self.close_help(),
                _ => {}
            }
            return;
        }

        let action = self.bindings.action_for(key, &DESKTOP_ACTIONS);
        // Terminals report no modifier release, so any other key ends a
        // window cycle.
        if !matches!(
            action,
            Some(Action::CycleNextWindow | Action::CyclePrevWindow)
        ) {
            self.canvas.apply_command(WindowCommand::EndCycle);
        }
        let Some(action) = action else {
            return;
        };
        tracing::trace!(%action, "key action");
        match action {
            Action::Quit => self.open_quit_confirm(),
            Action::OpenHelp => self.open_help(),
            Action::NewWindow => {
                self.spawn_window();
            }
            Action::RestoreAll => self.canvas.restore_all(),
            other => {
                if let Some(command) = other.command() {
                    self.canvas.apply_command(command);
                }
            }
        }
    }

    /// Advances one frame: forgets closed floaters, keeps content views
    /// sized to their windows and returns what to draw.
    pub fn tick(&mut self) -> DrawList {
        let canvas = &self.canvas;
        self.bodies.retain(|id, _| canvas.contains(*id));
        self.help = self.help.filter(|id| canvas.contains(*id));
        self.quit_confirm = self.quit_confirm.filter(|id| canvas.contains(*id));
        self.inspector = self.inspector.filter(|id| canvas.contains(*id));

        let header = self.canvas.config().header_height;
        let ids: Vec<FloaterId> = self.bodies.keys().copied().collect();
        for id in ids {
            let Some(floater) = self.canvas.floater(id) else {
                continue;
            };
            let rect = floater.rect();
            let inset = if floater.host().is_some() { 0 } else { 1 };
            let body = Rect::new(
                inset,
                header,
                rect.width() - inset,
                rect.height() - inset,
            );
            if floater.child(crate::floater::ChildKind::Content(0)).map(|c| c.rect) != Some(body) {
                self.canvas.add_content_view(id, 0, body);
            }
        }
        self.canvas.draw_tick()
    }

    pub fn render(&self, frame: &mut UiFrame<'_>, list: &DrawList) {
        let mut painter = BodyText {
            bodies: &self.bodies,
        };
        frame.fill(
            self.canvas.rect(),
            ratatui::style::Style::default().bg(theme::desktop_bg()),
        );
        render_canvas(frame, list, &OpenStepDecorator, &mut painter);
    }

    /// Writes persisted positions back to the store.
    pub fn shutdown(&mut self) -> io::Result<()> {
        self.canvas.shutdown().map_err(io::Error::other)
    }
}

struct BodyText<'a> {
    bodies: &'a HashMap<FloaterId, String>,
}

impl ContentPainter for BodyText<'_> {
    fn paint(&mut self, frame: &mut UiFrame<'_>, floater: FloaterId, _slot: u16, area: CellRect) {
        let Some(text) = self.bodies.get(&floater) else {
            return;
        };
        frame.render_widget(
            Paragraph::new(text.as_str())
                .wrap(Wrap { trim: false })
                .style(theme::body()),
            area,
        );
    }
}

/// Runs the demo until the user quits or the input source runs dry.
pub fn run<I, O>(
    app: &mut DemoApp,
    input: I,
    output: &mut O,
    poll_interval: Duration,
) -> io::Result<()>
where
    I: InputDriver,
    O: OutputDriver,
{
    output.enter()?;
    let result = run_loop(app, input, output, poll_interval);
    let saved = app.shutdown();
    output.exit()?;
    result?;
    saved
}

fn run_loop<I, O>(
    app: &mut DemoApp,
    input: I,
    output: &mut O,
    poll_interval: Duration,
) -> io::Result<()>
where
    I: InputDriver,
    O: OutputDriver,
{
    let mut event_loop = EventLoop::new(input, poll_interval);
    event_loop.driver().set_mouse_capture(true)?;
    event_loop.run(|_, event| {
        match event {
            None => {
                let list = app.tick();
                output.draw(|mut frame| app.render(&mut frame, &list))?;
            }
            Some(event) => app.handle_event(&event),
        }
        Ok(if app.should_quit() {
            ControlFlow::Quit
        } else {
            ControlFlow::Continue
        })
    })
}
