use crossterm::event::{self, Event, KeyEvent, KeyEventKind};
use std::time::Duration;

use crate::app::Result;
use crate::sources::AppState;

pub enum AppEvent {
    Key(KeyEvent),
    /// The terminal gained or lost focus.
    Focus(AppState),
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
                Event::FocusGained => return Ok(AppEvent::Focus(AppState::Active)),
                Event::FocusLost => return Ok(AppEvent::Focus(AppState::Background)),
                _ => {}
            }
        }
        Ok(AppEvent::Tick)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    MoveUp,
    MoveDown,
    NextPane,
    PrevPane,
    ToggleSource,
    NextPage,
    PrevPage,
    RefreshSource,
    ReloadCatalog,
    ClearSelections,
    OpenHeadline,
    ShareHeadline,
    OpenContact,
    OpenSubscribe,
    None,
}
