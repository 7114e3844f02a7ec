use crate::domain::{BookRef, StatsSnapshot};
use crate::tracker::{AppState, TrackerStatus};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    /// Typing a new goal; holds the text entered so far.
    Goal(String),
}

pub struct TuiApp {
    pub book: BookRef,
    pub snapshot: Option<StatsSnapshot>,
    pub tracker: Option<TrackerStatus>,
    pub input_mode: InputMode,
    /// Paused by the user, independent of terminal focus.
    pub paused: bool,
    pub focused: bool,
    pub should_quit: bool,
    pub status_message: Option<String>,
    /// Tracker write count the snapshot was loaded after.
    pub seen_writes: u64,
}

impl TuiApp {
    pub fn new(book: BookRef) -> Self {
        Self {
            book,
            snapshot: None,
            tracker: None,
            input_mode: InputMode::Normal,
            paused: false,
            focused: true,
            should_quit: false,
            status_message: None,
            seen_writes: 0,
        }
    }

    pub fn set_status(&mut self, msg: String) {
        self.status_message = Some(msg);
    }

    /// Whether reading time should currently accumulate.
    pub fn wants_active(&self) -> bool {
        self.focused && !self.paused
    }

    pub fn is_reading(&self) -> bool {
        self.tracker
            .as_ref()
            .is_some_and(|t| t.state == AppState::Active)
    }

    pub fn start_goal_input(&mut self) {
        self.input_mode = InputMode::Goal(String::new());
    }

    pub fn push_goal_char(&mut self, c: char) {
        if let InputMode::Goal(ref mut buf) = self.input_mode {
            // Room for any valid goal plus a sign, enough to show a rejection.
            if buf.len() < 8 {
                buf.push(c);
            }
        }
    }

    pub fn pop_goal_char(&mut self) {
        if let InputMode::Goal(ref mut buf) = self.input_mode {
            buf.pop();
        }
    }

    /// Leave goal input, returning what was typed.
    pub fn take_goal_input(&mut self) -> Option<String> {
        match std::mem::replace(&mut self.input_mode, InputMode::Normal) {
            InputMode::Goal(buf) => Some(buf),
            InputMode::Normal => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app() -> TuiApp {
        TuiApp::new(BookRef::new("https://example.com/kitab.pdf", "Kitab"))
    }

    #[test]
    fn test_wants_active() {
        let mut app = app();
        assert!(app.wants_active());
        app.paused = true;
        assert!(!app.wants_active());
        app.paused = false;
        app.focused = false;
        assert!(!app.wants_active());
    }

    #[test]
    fn test_goal_input_flow() {
        let mut app = app();
        app.push_goal_char('1');
        assert_eq!(app.input_mode, InputMode::Normal);

        app.start_goal_input();
        app.push_goal_char('1');
        app.push_goal_char('5');
        app.push_goal_char('x');
        app.pop_goal_char();
        assert_eq!(app.take_goal_input(), Some("15".to_string()));
        assert_eq!(app.input_mode, InputMode::Normal);
        assert_eq!(app.take_goal_input(), None);
    }

    #[test]
    fn test_goal_input_is_bounded() {
        let mut app = app();
        app.start_goal_input();
        for _ in 0..20 {
            app.push_goal_char('9');
        }
        assert_eq!(app.take_goal_input().unwrap().len(), 8);
    }
}
