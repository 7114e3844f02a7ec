use std::sync::Arc;

use crate::app::{AppContext, Result};
use crate::config::Config;
use crate::domain::{format_duration, BookRef, StatsSnapshot};
use crate::tracker::RolloverOutcome;

pub async fn show_stats(ctx: &AppContext, json: bool) -> Result<()> {
    let user = ctx.identity.require()?;
    let snapshot = ctx.tracker.snapshot(&user).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        println!("{}", format_stats(&snapshot));
    }
    Ok(())
}

pub async fn set_goal(ctx: &AppContext, input: &str) -> Result<()> {
    let user = ctx.identity.require()?;
    let minutes = ctx.tracker.adjust_goal(&user, input).await?;
    println!("Daily goal set to {} minutes", minutes);
    Ok(())
}

pub async fn resume(ctx: &AppContext, open_it: bool) -> Result<Option<BookRef>> {
    let user = ctx.identity.require()?;

    let Some(book) = ctx.tracker.resume_last_book(&user).await? else {
        println!("No book to resume");
        return Ok(None);
    };

    println!("{}\n  {}", book.display_title(), book.url);
    if open_it {
        open::that(&book.url)?;
    }
    Ok(Some(book))
}

pub async fn record(
    ctx: &AppContext,
    seconds: u64,
    book: Option<&str>,
    title: Option<&str>,
) -> Result<()> {
    let user = ctx.identity.require()?;
    let book = book.map(|b| BookRef::parse(b, title)).transpose()?;

    let outcome = ctx
        .tracker
        .record_session(&user, seconds, book.as_ref())
        .await?;
    println!("{}", describe_outcome(outcome.as_ref()));
    Ok(())
}

pub async fn read(
    ctx: Arc<AppContext>,
    config: Arc<Config>,
    location: &str,
    title: Option<&str>,
    no_open: bool,
) -> Result<()> {
    let book = BookRef::parse(location, title)?;

    if config.reading.open_book && !no_open {
        open::that(&book.url)?;
    }

    crate::tui::run(ctx, config, book).await
}

pub fn format_stats(snapshot: &StatsSnapshot) -> String {
    let mut out = format!(
        "{}\n  Read: {} of {} min ({:.0}%)",
        snapshot.day,
        format_duration(snapshot.today_reading_time_secs),
        snapshot.goal_minutes,
        snapshot.percent_complete * 100.0
    );
    if snapshot.goal_reached() {
        out.push_str("\n  Goal reached");
    }
    if let Some(book) = &snapshot.last_opened_book {
        out.push_str(&format!("\n  Last book: {}", book.display_title()));
    }
    out
}

fn describe_outcome(outcome: Option<&RolloverOutcome>) -> String {
    match outcome {
        None => "Nothing to record".to_string(),
        Some(RolloverOutcome::Created { seconds }) => {
            format!("Started today's log with {}", format_duration(*seconds))
        }
        Some(RolloverOutcome::Accumulated { added }) => {
            format!("Added {} to today", format_duration(*added))
        }
        Some(RolloverOutcome::RolledOver {
            previous_day,
            discarded,
            seconds,
        }) => format!(
            "New day: {} from {} cleared, recorded {}",
            format_duration(*discarded),
            previous_day,
            format_duration(*seconds)
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::KitabakError;
    use crate::domain::UserId;
    use crate::store::StatsStore;

    fn ctx() -> AppContext {
        AppContext::in_memory(UserId::new("reader"), 5).unwrap()
    }

    #[tokio::test]
    async fn test_record_then_stats() {
        let ctx = ctx();
        record(&ctx, 150, Some("https://example.com/Deep%20Work.epub"), None)
            .await
            .unwrap();

        let user = UserId::new("reader");
        let snapshot = ctx.tracker.snapshot(&user).await.unwrap();
        assert_eq!(snapshot.today_reading_time_secs, 150);
        assert_eq!(snapshot.percent_complete, 0.5);
        assert_eq!(
            snapshot.last_opened_book.as_ref().map(|b| b.title.as_str()),
            Some("Deep Work")
        );
    }

    #[tokio::test]
    async fn test_set_goal_rejects_invalid_input() {
        let ctx = ctx();
        let err = set_goal(&ctx, "0").await.unwrap_err();
        assert!(matches!(err, KitabakError::InvalidGoal(_)));

        set_goal(&ctx, "30").await.unwrap();
        let stats = ctx.store.get(&UserId::new("reader")).await.unwrap().unwrap();
        assert_eq!(stats.reading_goal_minutes, 30);
    }

    #[tokio::test]
    async fn test_resume_without_history() {
        let ctx = ctx();
        assert_eq!(resume(&ctx, false).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_resume_returns_last_book() {
        let ctx = ctx();
        record(&ctx, 10, Some("https://example.com/a.pdf"), Some("Kitab A"))
            .await
            .unwrap();

        let book = resume(&ctx, false).await.unwrap().unwrap();
        assert_eq!(book.url, "https://example.com/a.pdf");
        assert_eq!(book.title, "Kitab A");
    }

    #[tokio::test]
    async fn test_commands_require_sign_in() {
        let ctx = ctx();
        ctx.identity.sign_out();
        let err = show_stats(&ctx, false).await.unwrap_err();
        assert!(matches!(err, KitabakError::NotSignedIn));
    }

    #[tokio::test]
    async fn test_format_stats() {
        let ctx = ctx();
        record(&ctx, 300, None, None).await.unwrap();
        let snapshot = ctx.tracker.snapshot(&UserId::new("reader")).await.unwrap();

        let text = format_stats(&snapshot);
        assert!(text.contains("5m 00s of 5 min (100%)"));
        assert!(text.contains("Goal reached"));
        assert!(!text.contains("Last book"));
    }

    #[test]
    fn test_describe_nothing_recorded() {
        assert_eq!(describe_outcome(None), "Nothing to record");
    }
}
