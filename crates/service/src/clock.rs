use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};

/// Deployment-wide reference timezone used to decide what "today" is.
#[derive(Debug, Clone, Copy)]
pub struct ReferenceClock {
    offset: FixedOffset,
}

impl ReferenceClock {
    /// Clock at `minutes` east of UTC. Out-of-range offsets fall back to UTC.
    #[must_use]
    pub fn from_offset_minutes(minutes: i32) -> Self {
        let offset = minutes.checked_mul(60).and_then(FixedOffset::east_opt).unwrap_or_else(|| {
            tracing::warn!(minutes, "UTC offset out of range, using UTC");
            utc_offset()
        });
        Self { offset }
    }

    #[must_use]
    pub fn utc() -> Self {
        Self { offset: utc_offset() }
    }

    /// Offset of the reference timezone from UTC.
    #[must_use]
    pub const fn offset(&self) -> FixedOffset {
        self.offset
    }

    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    #[must_use]
    pub fn today(&self) -> NaiveDate {
        self.date_of(Utc::now())
    }

    /// Calendar date of `at` in the reference timezone.
    #[must_use]
    pub fn date_of(&self, at: DateTime<Utc>) -> NaiveDate {
        at.with_timezone(&self.offset).date_naive()
    }
}

impl Default for ReferenceClock {
    fn default() -> Self {
        Self::utc()
    }
}

fn utc_offset() -> FixedOffset {
    Utc.fix()
}
