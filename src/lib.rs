//! # Kitabak
//!
//! Tracks how long a reader spends reading each day and how close they are
//! to a daily goal.
//!
//! ## Architecture
//!
//! ```text
//! Focus events → TransitionDetector → SessionClock → RolloverPolicy → Store → UI
//! ```
//!
//! - [`tracker`]: session timing, rollover at day boundaries, write coalescing
//! - [`store`]: SQLite persistence of per-user stats
//! - [`tui`]: Reading screen with a goal gauge, built with ratatui
//!
//! ## Quick Start
//!
//! ```bash
//! # Read a book, tracking time while the terminal has focus
//! kitabak read ~/books/kitab.epub
//!
//! # Today's progress
//! kitabak stats
//!
//! # Change the daily goal
//! kitabak goal 20
//!
//! # Reopen the last book
//! kitabak resume --open
//! ```

/// Application context, identity and error handling.
///
/// The [`AppContext`](app::AppContext) struct wires together the store,
/// the tracker and the signed-in identity.
pub mod app;

/// Command-line interface using clap.
///
/// - `stats [--json]` - Today's progress
/// - `goal <minutes>` - Set the daily goal
/// - `resume [--open]` - Last opened book
/// - `record <seconds>` - Record an externally measured session
/// - `read <book>` - Tracked reading screen
pub mod cli;

/// Configuration management.
///
/// Loads from `~/.config/kitabak/config.toml`, supporting:
/// - Reading defaults (user, goal, database path)
/// - Custom colors (named or hex)
/// - Custom keybindings
pub mod config;

/// Core domain models.
///
/// - [`ReadingStats`](domain::ReadingStats): The persisted per-user record
/// - [`StatsSnapshot`](domain::StatsSnapshot): What screens render
/// - [`BookRef`](domain::BookRef): Resumable reading material
pub mod domain;

/// Persistence layer.
///
/// - [`StatsStore`](store::StatsStore): Trait with get/set/merge operations
/// - [`SqliteStore`](store::sqlite::SqliteStore): SQLite implementation
pub mod store;

/// Reading-session tracking.
///
/// - [`TransitionDetector`](tracker::TransitionDetector): Foreground/background edges
/// - [`RolloverPolicy`](tracker::RolloverPolicy): Daily reset on write and read
/// - [`spawn_tracker`](tracker::spawn_tracker): Background task owning a detector
pub mod tracker;

/// Terminal user interface.
///
/// Keybindings: g sets the goal, o opens the book, p pauses, r refreshes,
/// q quits. Losing terminal focus pauses tracking.
pub mod tui;
