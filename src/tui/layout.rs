use chrono::{DateTime, Local};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Wrap},
    Frame,
};

use crate::config::ColorConfig;
use crate::domain::format_duration;
use crate::tui::app::{InputMode, TuiApp};

pub fn render(frame: &mut Frame, app: &TuiApp, colors: &ColorConfig, now: DateTime<Local>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // Book
            Constraint::Length(3), // Progress gauge
            Constraint::Min(4),    // Details
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    render_book(frame, app, chunks[0], colors);
    render_progress(frame, app, chunks[1], colors, now);
    render_details(frame, app, chunks[2], colors, now);
    render_status_bar(frame, app, chunks[3], colors);
}

fn render_book(frame: &mut Frame, app: &TuiApp, area: Rect, colors: &ColorConfig) {
    let lines = vec![
        Line::from(Span::styled(
            app.book.display_title().to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(app.book.url.clone()),
    ];

    let block = Block::default()
        .title(" Reading ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(colors.border));

    let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

fn render_progress(
    frame: &mut Frame,
    app: &TuiApp,
    area: Rect,
    colors: &ColorConfig,
    now: DateTime<Local>,
) {
    let block = Block::default()
        .title(" Today's goal ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(colors.border));

    let Some(snapshot) = &app.snapshot else {
        frame.render_widget(Paragraph::new("Loading...").block(block), area);
        return;
    };

    let unsaved = app
        .tracker
        .as_ref()
        .map(|t| t.unsaved_secs(now))
        .unwrap_or(0);
    let total = snapshot.today_reading_time_secs.saturating_add(unsaved);
    let ratio = snapshot.percent_with(unsaved);

    let color = if ratio >= 1.0 {
        colors.gauge_complete
    } else if app.is_reading() {
        colors.gauge
    } else {
        colors.paused
    };

    let label = format!(
        "{} / {} min ({:.0}%)",
        format_duration(total),
        snapshot.goal_minutes,
        ratio * 100.0
    );

    let gauge = Gauge::default()
        .block(block)
        .gauge_style(Style::default().fg(color))
        .ratio(ratio)
        .label(label);

    frame.render_widget(gauge, area);
}

fn render_details(
    frame: &mut Frame,
    app: &TuiApp,
    area: Rect,
    colors: &ColorConfig,
    now: DateTime<Local>,
) {
    let mut lines = Vec::new();

    if let Some(snapshot) = &app.snapshot {
        lines.push(Line::from(format!("Day: {}", snapshot.day)));
    }

    let session = match &app.tracker {
        Some(t) if app.is_reading() => match t.session_started_at {
            Some(start) => format!(
                "Session: reading since {} ({})",
                start.format("%H:%M"),
                format_duration(t.unsaved_secs(now))
            ),
            None => "Session: reading".to_string(),
        },
        _ if app.paused => "Session: paused".to_string(),
        _ if !app.focused => "Session: away".to_string(),
        _ => "Session: starting...".to_string(),
    };
    lines.push(Line::from(session));

    if app.snapshot.as_ref().is_some_and(|s| s.goal_reached()) {
        lines.push(Line::from(Span::styled(
            "Goal reached for today!",
            Style::default()
                .fg(colors.gauge_complete)
                .add_modifier(Modifier::BOLD),
        )));
    }

    if let InputMode::Goal(ref buf) = app.input_mode {
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::raw("New daily goal (minutes): "),
            Span::styled(format!("{}_", buf), Style::default().add_modifier(Modifier::BOLD)),
        ]));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(colors.border));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_status_bar(frame: &mut Frame, app: &TuiApp, area: Rect, colors: &ColorConfig) {
    let status = if matches!(app.input_mode, InputMode::Goal(_)) {
        "Enter:Save  Esc:Cancel".to_string()
    } else if let Some(ref msg) = app.status_message {
        msg.clone()
    } else {
        "g:Goal  o:Open book  p:Pause  r:Refresh  q:Quit".to_string()
    };

    let paragraph =
        Paragraph::new(status).style(Style::default().fg(colors.status_fg).bg(colors.status_bg));

    frame.render_widget(paragraph, area);
}
