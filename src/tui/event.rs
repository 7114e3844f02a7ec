use crossterm::event::{self, Event, KeyEvent, KeyEventKind};
use std::time::Duration;

use crate::app::Result;
use crate::tracker::LifecycleSignal;

pub enum AppEvent {
    Key(KeyEvent),
    /// Terminal focus changed; the reading screen's lifecycle source.
    Focus(LifecycleSignal),
    Tick,
}

pub struct EventHandler {
    tick_rate: Duration,
}

impl EventHandler {
    pub fn new(tick_rate: Duration) -> Self {
        Self { tick_rate }
    }

    pub fn next(&self) -> Result<AppEvent> {
        if event::poll(self.tick_rate)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    return Ok(AppEvent::Key(key));
                }
                Event::FocusGained => return Ok(AppEvent::Focus(LifecycleSignal::Active)),
                Event::FocusLost => return Ok(AppEvent::Focus(LifecycleSignal::Inactive)),
                _ => {}
            }
        }
        Ok(AppEvent::Tick)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    SetGoal,
    OpenBook,
    TogglePause,
    Refresh,
    None,
}
