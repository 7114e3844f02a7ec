pub mod app;
pub mod event;
pub mod layout;

use std::io::{self, Stdout};
use std::sync::Arc;

use crossterm::{
    event::{DisableFocusChange, EnableFocusChange, KeyCode, KeyEvent},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::warn;

use crate::app::{AppContext, KitabakError, Result};
use crate::config::Config;
use crate::domain::{BookRef, UserId};
use crate::tracker::{spawn_tracker, LifecycleSignal, TrackerHandle};

use self::app::{InputMode, TuiApp};
use self::event::{Action, AppEvent, EventHandler};

type Tui = Terminal<CrosstermBackend<Stdout>>;

/// Run a tracked reading session for `book` until the user quits.
pub async fn run(ctx: Arc<AppContext>, config: Arc<Config>, book: BookRef) -> Result<()> {
    let user = ctx.identity.require()?;
    let detector = ctx.tracker.detector(user.clone(), Some(book.clone()));
    let tracker = spawn_tracker(detector, ctx.identity.subscribe());

    let mut terminal = setup_terminal()?;
    let result = run_app(&mut terminal, &ctx, &config, &tracker, &user, book).await;

    // Store the final session before giving the terminal back.
    tracker.shutdown().await;
    restore_terminal(&mut terminal)?;
    result
}

fn setup_terminal() -> Result<Tui> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableFocusChange)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Tui) -> Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableFocusChange,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;
    Ok(())
}

async fn run_app(
    terminal: &mut Tui,
    ctx: &AppContext,
    config: &Config,
    tracker: &TrackerHandle,
    user: &UserId,
    book: BookRef,
) -> Result<()> {
    let mut tui_app = TuiApp::new(book);
    let event_handler = EventHandler::new(config.reading.tick_rate());

    load_snapshot(&mut tui_app, ctx, user).await;
    sync_tracker(&tui_app, tracker).await;

    loop {
        let status = tracker.status();
        if status.completed_writes != tui_app.seen_writes {
            tui_app.seen_writes = status.completed_writes;
            load_snapshot(&mut tui_app, ctx, user).await;
        }
        tui_app.tracker = Some(status);

        if !tracker.is_running() {
            tui_app.set_status("Signed out; reading session ended".to_string());
        }

        let now = ctx.tracker.clock().now();
        terminal.draw(|frame| layout::render(frame, &tui_app, &config.colors, now))?;

        match event_handler.next()? {
            AppEvent::Key(key) => {
                if matches!(tui_app.input_mode, InputMode::Goal(_)) {
                    handle_goal_key(&mut tui_app, ctx, user, key).await;
                    continue;
                }

                match config.keybindings.get_action(&key) {
                    Action::Quit => {
                        tui_app.should_quit = true;
                    }
                    Action::SetGoal => {
                        tui_app.start_goal_input();
                    }
                    Action::OpenBook => {
                        if let Err(e) = open::that(&tui_app.book.url) {
                            tui_app.set_status(format!("Failed to open book: {}", e));
                        }
                    }
                    Action::TogglePause => {
                        tui_app.paused = !tui_app.paused;
                        sync_tracker(&tui_app, tracker).await;
                        let msg = if tui_app.paused {
                            "Paused"
                        } else {
                            "Resumed"
                        };
                        tui_app.set_status(msg.to_string());
                    }
                    Action::Refresh => {
                        tui_app.status_message = None;
                        load_snapshot(&mut tui_app, ctx, user).await;
                    }
                    Action::None => {}
                }
            }
            AppEvent::Focus(signal) => {
                tui_app.focused = signal == LifecycleSignal::Active;
                sync_tracker(&tui_app, tracker).await;
                if tui_app.focused {
                    load_snapshot(&mut tui_app, ctx, user).await;
                }
            }
            AppEvent::Tick => {}
        }

        if tui_app.should_quit {
            break;
        }
    }

    Ok(())
}

async fn handle_goal_key(tui_app: &mut TuiApp, ctx: &AppContext, user: &UserId, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => {
            let input = tui_app.take_goal_input().unwrap_or_default();
            match ctx.tracker.adjust_goal(user, &input).await {
                Ok(minutes) => {
                    tui_app.set_status(format!("Daily goal set to {} minutes", minutes));
                    load_snapshot(tui_app, ctx, user).await;
                }
                Err(KitabakError::InvalidGoal(msg)) => tui_app.set_status(msg),
                Err(e) => tui_app.set_status(format!("Could not save goal: {}", e)),
            }
        }
        KeyCode::Esc => {
            tui_app.take_goal_input();
            tui_app.set_status("Goal unchanged".to_string());
        }
        KeyCode::Backspace => tui_app.pop_goal_char(),
        KeyCode::Char(c) => tui_app.push_goal_char(c),
        _ => {}
    }
}

/// Tell the tracker whether time should accumulate right now.
async fn sync_tracker(tui_app: &TuiApp, tracker: &TrackerHandle) {
    let signal = if tui_app.wants_active() {
        LifecycleSignal::Active
    } else {
        LifecycleSignal::Inactive
    };
    tracker.signal(signal).await;
}

async fn load_snapshot(tui_app: &mut TuiApp, ctx: &AppContext, user: &UserId) {
    match ctx.tracker.snapshot(user).await {
        Ok(snapshot) => tui_app.snapshot = Some(snapshot),
        Err(e) => {
            warn!("Failed to load reading stats: {}", e);
            tui_app.set_status(format!("Failed to load reading stats: {}", e));
        }
    }
}
