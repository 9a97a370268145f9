use std::collections::VecDeque;
use std::io::{self, Stdout};
use std::time::Duration;

use crossterm::event::{DisableMouseCapture, EnableMouseCapture, Event};
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{execute, terminal};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use super::keyboard::KeyboardNormalizer;
use super::{InputDriver, OutputDriver};
use crate::ui::UiFrame;

/// Reads crossterm events from the real terminal, normalized and coalesced.
pub struct ConsoleInputDriver {
    normalizer: KeyboardNormalizer,
    event_queue: VecDeque<Event>,
}

impl Default for ConsoleInputDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleInputDriver {
    pub fn new() -> Self {
        Self {
            normalizer: KeyboardNormalizer::new(),
            event_queue: VecDeque::new(),
        }
    }

    fn read_internal(&mut self) -> io::Result<Event> {
        loop {
            let evt = crossterm::event::read()?;
            if let Some(normalized) = self.normalizer.normalize(evt) {
                return Ok(normalized);
            }
        }
    }

    /// Pulls everything the terminal has already buffered into the queue,
    /// merging consecutive drag reports into the latest one.
    fn fill_queue(&mut self) -> io::Result<()> {
        while crossterm::event::poll(Duration::ZERO)? {
            let evt = self.read_internal()?;
            push_coalesced(&mut self.event_queue, evt);
        }
        Ok(())
    }
}

/// Replaces a queued drag with a newer one; the canvas only needs the
/// pointer's latest position.
fn push_coalesced(queue: &mut VecDeque<Event>, evt: Event) {
    if let Event::Mouse(next) = &evt
        && let Some(Event::Mouse(last)) = queue.back_mut()
        && matches!(next.kind, crossterm::event::MouseEventKind::Drag(_))
        && last.kind == next.kind
    {
        *last = *next;
        return;
    }
    queue.push_back(evt);
}

impl InputDriver for ConsoleInputDriver {
    fn poll(&mut self, timeout: Duration) -> io::Result<bool> {
        if !self.event_queue.is_empty() {
            return Ok(true);
        }
        crossterm::event::poll(timeout)
    }

    fn read(&mut self) -> io::Result<Event> {
        if self.event_queue.is_empty() {
            let evt = self.read_internal()?;
            self.event_queue.push_back(evt);
            self.fill_queue()?;
        }
        match self.event_queue.pop_front() {
            Some(evt) => Ok(evt),
            None => self.read_internal(),
        }
    }

    fn set_mouse_capture(&mut self, enabled: bool) -> io::Result<()> {
        if enabled {
            execute!(io::stdout(), EnableMouseCapture)
        } else {
            execute!(io::stdout(), DisableMouseCapture)
        }
    }
}

pub struct ConsoleOutputDriver {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    entered: bool,
}

impl ConsoleOutputDriver {
    pub fn new() -> io::Result<Self> {
        let stdout = io::stdout();
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        Ok(Self {
            terminal,
            entered: false,
        })
    }
}

impl OutputDriver for ConsoleOutputDriver {
    type Backend = CrosstermBackend<Stdout>;

    fn enter(&mut self) -> io::Result<()> {
        if self.entered {
            return Ok(());
        }
        execute!(
            self.terminal.backend_mut(),
            EnterAlternateScreen,
            EnableMouseCapture
        )?;
        terminal::enable_raw_mode()?;
        self.terminal.hide_cursor()?;
        self.entered = true;
        Ok(())
    }

    fn exit(&mut self) -> io::Result<()> {
        if !self.entered {
            return Ok(());
        }
        terminal::disable_raw_mode()?;
        execute!(
            self.terminal.backend_mut(),
            DisableMouseCapture,
            LeaveAlternateScreen
        )?;
        self.terminal.show_cursor()?;
        self.entered = false;
        Ok(())
    }

    fn size(&self) -> io::Result<(u16, u16)> {
        let size = self.terminal.size()?;
        Ok((size.width, size.height))
    }

    fn draw<F>(&mut self, f: F) -> io::Result<()>
    where
        F: FnOnce(UiFrame<'_>),
    {
        self.terminal
            .draw(move |frame| {
                let wrapper = UiFrame::new(frame);
                f(wrapper);
            })
            .map(|_| ())
            .map_err(|err| io::Error::other(err.to_string()))
    }
}

impl Drop for ConsoleOutputDriver {
    fn drop(&mut self) {
        let _ = self.exit();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> Event {
        Event::Mouse(MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    #[test]
    fn poll_and_read_from_queue() {
        let mut d = ConsoleInputDriver::new();
        d.event_queue.push_back(Event::Key(KeyEvent::new(
            KeyCode::Char('z'),
            KeyModifiers::NONE,
        )));
        assert!(d.poll(Duration::from_millis(0)).unwrap());
        let ev = d.read().unwrap();
        if let Event::Key(k) = ev {
            assert_eq!(k.code, KeyCode::Char('z'));
        } else {
            panic!("expected key");
        }
    }

    #[test]
    fn consecutive_drags_are_coalesced() {
        let drag = MouseEventKind::Drag(MouseButton::Left);
        let mut queue = VecDeque::new();
        push_coalesced(&mut queue, mouse(MouseEventKind::Down(MouseButton::Left), 1, 1));
        push_coalesced(&mut queue, mouse(drag, 2, 1));
        push_coalesced(&mut queue, mouse(drag, 3, 1));
        push_coalesced(&mut queue, mouse(drag, 4, 2));
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.back(), Some(&mouse(drag, 4, 2)));
    }

    #[test]
    fn downs_and_ups_are_never_merged() {
        let down = MouseEventKind::Down(MouseButton::Left);
        let up = MouseEventKind::Up(MouseButton::Left);
        let mut queue = VecDeque::new();
        push_coalesced(&mut queue, mouse(down, 1, 1));
        push_coalesced(&mut queue, mouse(up, 1, 1));
        push_coalesced(&mut queue, mouse(down, 1, 1));
        assert_eq!(queue.len(), 3);
    }
}
