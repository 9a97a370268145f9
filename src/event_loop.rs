use std::io;
use std::time::Duration;

use crossterm::event::Event;

use crate::drivers::InputDriver;

/// Upper bound on events handled between two ticks, so a flood of mouse
/// drag reports cannot starve redraws.
pub const MAX_EVENTS_PER_TICK: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlFlow {
    Continue,
    Quit,
}

/// Drives the demo front end: one tick per iteration, then every input event
/// that is already queued.
///
/// The handler sees `None` for a tick (draw the canvas, advance auto-scroll)
/// and `Some(event)` for input. Bursts are drained with a zero timeout so a
/// drag never lags behind the pointer by more than one frame.
pub struct EventLoop<D> {
    driver: D,
    poll_interval: Duration,
}

impl<D: InputDriver> EventLoop<D> {
    pub fn new(driver: D, poll_interval: Duration) -> Self {
        Self {
            driver,
            poll_interval,
        }
    }

    pub fn driver(&mut self) -> &mut D {
        &mut self.driver
    }

    pub fn run<F>(&mut self, mut handler: F) -> io::Result<()>
    where
        F: FnMut(&mut D, Option<Event>) -> io::Result<ControlFlow>,
    {
        loop {
            if handler(&mut self.driver, None)? == ControlFlow::Quit {
                break;
            }
            if self.driver.is_exhausted() {
                break;
            }

            if self.driver.poll(self.poll_interval)? {
                let mut handled = 0;
                loop {
                    let event = self.driver.read()?;
                    if handler(&mut self.driver, Some(event))? == ControlFlow::Quit {
                        return Ok(());
                    }
                    handled += 1;
                    if handled >= MAX_EVENTS_PER_TICK || !self.driver.poll(Duration::ZERO)? {
                        break;
                    }
                }
            }
        }
        Ok(())
    }
}
