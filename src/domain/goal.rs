use crate::app::{KitabakError, Result};

pub const DEFAULT_GOAL_MINUTES: u32 = 5;

/// A daily goal longer than a day cannot be met.
pub const MAX_GOAL_MINUTES: u32 = 24 * 60;

/// Fraction of the daily goal covered by `seconds`, clamped to `[0, 1]`.
///
/// A goal of zero means "no goal" and always yields 0.
pub fn percent_complete(seconds: u64, goal_minutes: u32) -> f64 {
    if goal_minutes == 0 {
        return 0.0;
    }
    let goal_secs = u64::from(goal_minutes) * 60;
    (seconds as f64 / goal_secs as f64).clamp(0.0, 1.0)
}

/// Validate user-entered goal text.
pub fn parse_goal(input: &str) -> Result<u32> {
    let input = input.trim();
    if input.is_empty() {
        return Err(KitabakError::InvalidGoal(
            "Please enter a number of minutes".to_string(),
        ));
    }

    let minutes: i64 = input.parse().map_err(|_| {
        KitabakError::InvalidGoal(format!("'{}' is not a whole number of minutes", input))
    })?;

    if minutes <= 0 {
        return Err(KitabakError::InvalidGoal(
            "Goal must be greater than zero".to_string(),
        ));
    }

    match u32::try_from(minutes) {
        Ok(m) if m <= MAX_GOAL_MINUTES => Ok(m),
        _ => Err(KitabakError::InvalidGoal(format!(
            "Goal cannot exceed {} minutes",
            MAX_GOAL_MINUTES
        ))),
    }
}

/// Format seconds for display: "45s", "12m 05s", "1h 02m".
pub fn format_duration(secs: u64) -> String {
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;

    if hours > 0 {
        format!("{}h {:02}m", hours, minutes)
    } else if minutes > 0 {
        format!("{}m {:02}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_complete_partial() {
        assert!((percent_complete(150, 5) - 0.5).abs() < f64::EPSILON);
        assert_eq!(percent_complete(0, 5), 0.0);
    }

    #[test]
    fn test_percent_complete_clamps_to_one() {
        assert_eq!(percent_complete(10_000, 5), 1.0);
        assert_eq!(percent_complete(u64::MAX, 1), 1.0);
    }

    #[test]
    fn test_percent_complete_zero_goal() {
        assert_eq!(percent_complete(0, 0), 0.0);
        assert_eq!(percent_complete(600, 0), 0.0);
    }

    #[test]
    fn test_percent_complete_always_in_range() {
        for secs in [0, 1, 59, 60, 299, 300, 301, 86_400] {
            for goal in [0, 1, 5, 30, MAX_GOAL_MINUTES] {
                let p = percent_complete(secs, goal);
                assert!((0.0..=1.0).contains(&p), "{} / {} -> {}", secs, goal, p);
            }
        }
    }

    #[test]
    fn test_parse_goal_accepts_positive_integer() {
        assert_eq!(parse_goal("10").unwrap(), 10);
        assert_eq!(parse_goal(" 25 ").unwrap(), 25);
    }

    #[test]
    fn test_parse_goal_rejects_invalid_input() {
        for input in ["0", "-5", "abc", "", "   ", "2.5", "99999999999"] {
            assert!(
                matches!(parse_goal(input), Err(KitabakError::InvalidGoal(_))),
                "accepted {:?}",
                input
            );
        }
    }

    #[test]
    fn test_parse_goal_upper_bound() {
        assert_eq!(parse_goal("1440").unwrap(), MAX_GOAL_MINUTES);
        assert!(parse_goal("1441").is_err());
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0), "0s");
        assert_eq!(format_duration(45), "45s");
        assert_eq!(format_duration(125), "2m 05s");
        assert_eq!(format_duration(3720), "1h 02m");
    }
}
