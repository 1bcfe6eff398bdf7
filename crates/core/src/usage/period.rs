use std::str::FromStr;

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::TimeWindow;
use crate::curriculum::parse_date;
use crate::error::CoreError;

/// Predefined reporting period for command metrics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricsPeriod {
    Last7Days,
    Last30Days,
    #[default]
    All,
    /// From local midnight of the given date until now; open start when no date is given.
    Custom(Option<NaiveDate>),
}

impl MetricsPeriod {
    /// Build a period from the `period` choice and the optional custom start date.
    ///
    /// # Errors
    /// Returns `CoreError::InvalidInput` for an unknown period and
    /// `CoreError::InvalidDateFormat` for a custom date that does not parse.
    pub fn parse(period: Option<&str>, start_date: Option<&str>) -> Result<Self, CoreError> {
        let Some(period) = period.map(str::trim).filter(|p| !p.is_empty()) else {
            return Ok(Self::All);
        };
        match period.parse::<PeriodChoice>()? {
            PeriodChoice::Last7Days => Ok(Self::Last7Days),
            PeriodChoice::Last30Days => Ok(Self::Last30Days),
            PeriodChoice::All => Ok(Self::All),
            PeriodChoice::Custom => {
                let start = start_date
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(parse_date)
                    .transpose()?;
                Ok(Self::Custom(start))
            }
        }
    }

    /// Inclusive window ending at `now`, except for `All` which is unbounded.
    ///
    /// A custom start date is midnight in the reference timezone `offset`.
    #[must_use]
    pub fn window(&self, now: DateTime<Utc>, offset: FixedOffset) -> TimeWindow {
        match self {
            Self::Last7Days => TimeWindow::new(Some(now - Duration::days(7)), Some(now)),
            Self::Last30Days => TimeWindow::new(Some(now - Duration::days(30)), Some(now)),
            Self::All => TimeWindow::all(),
            Self::Custom(start) => TimeWindow::new(
                start
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
                    .and_then(|dt| dt.and_local_timezone(offset).single())
                    .map(|dt| dt.with_timezone(&Utc)),
                Some(now),
            ),
        }
    }
}

enum PeriodChoice {
    Last7Days,
    Last30Days,
    All,
    Custom,
}

impl FromStr for PeriodChoice {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "last_7_days" => Ok(Self::Last7Days),
            "last_30_days" => Ok(Self::Last30Days),
            "all" => Ok(Self::All),
            "custom" => Ok(Self::Custom),
            other => Err(CoreError::InvalidInput(format!(
                "unknown period '{other}', expected last_7_days, last_30_days, all or custom"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 30, 12, 0, 0).unwrap()
    }

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    #[test]
    fn missing_period_is_all_time() {
        assert_eq!(MetricsPeriod::parse(None, None), Ok(MetricsPeriod::All));
        assert_eq!(MetricsPeriod::All.window(now(), utc()), TimeWindow::all());
    }

    #[test]
    fn last_seven_days_ends_now() {
        let window = MetricsPeriod::parse(Some("last_7_days"), None).unwrap().window(now(), utc());
        assert_eq!(window.start, Some(now() - Duration::days(7)));
        assert_eq!(window.end, Some(now()));
    }

    #[test]
    fn custom_start_is_utc_midnight() {
        let period = MetricsPeriod::parse(Some("custom"), Some("2024-06-01")).unwrap();
        let window = period.window(now(), utc());
        assert_eq!(window.start, Some(Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()));
        assert_eq!(window.end, Some(now()));
    }

    #[test]
    fn custom_start_is_local_midnight_of_reference_offset() {
        let period = MetricsPeriod::parse(Some("custom"), Some("2024-06-01")).unwrap();
        let east = period.window(now(), FixedOffset::east_opt(2 * 3600).unwrap());
        assert_eq!(east.start, Some(Utc.with_ymd_and_hms(2024, 5, 31, 22, 0, 0).unwrap()));
        let west = period.window(now(), FixedOffset::west_opt(5 * 3600).unwrap());
        assert_eq!(west.start, Some(Utc.with_ymd_and_hms(2024, 6, 1, 5, 0, 0).unwrap()));
    }

    #[test]
    fn custom_without_date_has_open_start() {
        let window = MetricsPeriod::parse(Some("custom"), None).unwrap().window(now(), utc());
        assert_eq!(window.start, None);
        assert_eq!(window.end, Some(now()));
    }

    #[test]
    fn invalid_custom_date_is_validation_error() {
        let err = MetricsPeriod::parse(Some("custom"), Some("June 1st")).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn unknown_period_rejected() {
        assert!(MetricsPeriod::parse(Some("yesterday"), None).is_err());
    }
}
