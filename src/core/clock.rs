use chrono::{DateTime, FixedOffset, NaiveDate, Utc};

/// Source of "now" in the outlet's fixed time zone.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<FixedOffset>;

    /// Local calendar day of `now()`.
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// Real-time clock projected into a fixed UTC offset.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    offset: FixedOffset,
}

impl SystemClock {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Utc::now().with_timezone(&self.offset)
    }
}

/// Clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    instant: DateTime<FixedOffset>,
}

impl FixedClock {
    pub fn new(instant: DateTime<FixedOffset>) -> Self {
        Self { instant }
    }

    /// Parses an RFC 3339 timestamp such as `2024-03-01T09:30:00+01:00`.
    pub fn at(rfc3339: &str) -> Result<Self, chrono::ParseError> {
        DateTime::parse_from_rfc3339(rfc3339).map(Self::new)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        self.instant
    }
}

/// Record id derived from the local timestamp with microsecond precision.
pub fn mint_id(prefix: &str, now: DateTime<FixedOffset>) -> String {
    format!("{}_{}", prefix, now.format("%Y%m%d%H%M%S%6f"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn today_follows_the_local_offset() {
        // 23:30 UTC is already the next day at UTC+1.
        let clock = FixedClock::new(
            DateTime::parse_from_rfc3339("2024-03-01T23:30:00Z")
                .unwrap()
                .with_timezone(&FixedOffset::east_opt(3600).unwrap()),
        );
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2024, 3, 2).unwrap());
    }

    #[test]
    fn minted_ids_carry_microseconds() {
        let now = DateTime::parse_from_rfc3339("2024-03-01T09:30:00.123456+01:00").unwrap();
        assert_eq!(mint_id("tx", now), "tx_20240301093000123456");
    }
}
