use chrono::{Duration, NaiveDate};

use crate::constants::DAYS_PER_WEEK;
use crate::curriculum::parse_date;
use crate::error::CoreError;

/// Week number of `as_of` in a curriculum starting on `start`.
///
/// `floor((as_of - start) / 7) + 1`, clamped to `[1, duration_weeks]`.
/// Dates before the start count as week 1.
#[must_use]
pub fn current_week(start: NaiveDate, duration_weeks: u32, as_of: NaiveDate) -> u32 {
    let elapsed_days = as_of.signed_duration_since(start).num_days().max(0);
    let week = elapsed_days / DAYS_PER_WEEK + 1;
    let last_week = i64::from(duration_weeks.max(1));
    u32::try_from(week.min(last_week)).unwrap_or(1)
}

/// [`current_week`] for a stored `YYYY-MM-DD` start date.
///
/// # Errors
/// Returns `CoreError::InvalidDateFormat` when `start` does not parse; callers
/// must ask for a corrected date instead of defaulting.
pub fn current_week_from_str(
    start: &str,
    duration_weeks: u32,
    as_of: NaiveDate,
) -> Result<u32, CoreError> {
    Ok(current_week(parse_date(start)?, duration_weeks, as_of))
}

/// Due date of a week's work: `start + week * 7 days`.
///
/// # Errors
/// Returns `CoreError::InvalidInput` when the date falls outside the calendar range.
pub fn due_date(start: NaiveDate, week: u32) -> Result<NaiveDate, CoreError> {
    Duration::try_days(i64::from(week) * DAYS_PER_WEEK)
        .and_then(|offset| start.checked_add_signed(offset))
        .ok_or_else(|| CoreError::InvalidInput(format!("week {week} is too far from {start}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn start_day_is_week_one() {
        assert_eq!(current_week(date("2024-01-01"), 4, date("2024-01-01")), 1);
    }

    #[test]
    fn fourteen_days_is_week_three() {
        assert_eq!(current_week(date("2024-01-01"), 4, date("2024-01-15")), 3);
    }

    #[test]
    fn increments_exactly_at_seven_day_boundaries() {
        let start = date("2024-03-10");
        assert_eq!(current_week(start, 10, start + Duration::days(6)), 1);
        assert_eq!(current_week(start, 10, start + Duration::days(7)), 2);
        assert_eq!(current_week(start, 10, start + Duration::days(13)), 2);
        assert_eq!(current_week(start, 10, start + Duration::days(14)), 3);
    }

    #[test]
    fn clamps_to_duration() {
        assert_eq!(current_week(date("2024-01-01"), 4, date("2025-01-01")), 4);
    }

    #[test]
    fn before_start_is_week_one() {
        assert_eq!(current_week(date("2024-01-15"), 4, date("2024-01-01")), 1);
    }

    #[test]
    fn stays_in_range_and_never_decreases() {
        let start = date("2024-01-01");
        for duration in 1..=6_u32 {
            let mut previous = 1;
            for offset in 0..80 {
                let week = current_week(start, duration, start + Duration::days(offset));
                assert!((1..=duration).contains(&week), "week {week} out of 1..={duration}");
                assert!(week >= previous, "week went backwards at offset {offset}");
                previous = week;
            }
        }
    }

    #[test]
    fn invalid_start_date_is_reported() {
        let err = current_week_from_str("01-01-2024", 4, date("2024-01-15")).unwrap_err();
        assert_eq!(err, CoreError::InvalidDateFormat { value: "01-01-2024".to_owned() });
    }

    #[test]
    fn due_date_is_week_multiples_of_seven() {
        assert_eq!(due_date(date("2024-01-01"), 1), Ok(date("2024-01-08")));
        assert_eq!(due_date(date("2024-01-01"), 3), Ok(date("2024-01-22")));
    }

    #[test]
    fn due_date_past_calendar_end_is_an_error() {
        assert!(matches!(due_date(date("2024-01-01"), 20_000_000), Err(CoreError::InvalidInput(_))));
        assert!(due_date(date("2024-01-01"), u32::MAX).is_err());
    }
}
