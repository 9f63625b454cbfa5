use chrono::{DateTime, FixedOffset, Offset, Utc};

/// Renders comment timestamps. Times are always shown in the site owner's
/// zone, never the viewer's.
#[derive(Debug, Clone)]
pub struct DisplayClock {
    offset: FixedOffset,
    label: Option<String>,
}

impl DisplayClock {
    pub fn new(offset: FixedOffset, label: Option<String>) -> Self {
        Self { offset, label }
    }

    pub fn from_minutes(minutes: i32, label: Option<String>) -> Self {
        let offset = FixedOffset::east_opt(minutes.saturating_mul(60))
            .unwrap_or_else(|| Utc.fix());
        Self::new(offset, label)
    }

    pub fn utc() -> Self {
        Self::from_minutes(0, Some("UTC".to_string()))
    }

    /// e.g. `March 1, 2024`
    pub fn long_date(&self, ts: &DateTime<Utc>) -> String {
        ts.with_timezone(&self.offset).format("%B %-d, %Y").to_string()
    }

    /// e.g. `2:05 PM EST`
    pub fn time_12h(&self, ts: &DateTime<Utc>) -> String {
        let time = ts.with_timezone(&self.offset).format("%-I:%M %p").to_string();
        match &self.label {
            Some(label) => format!("{} {}", time, label),
            None => time,
        }
    }
}

impl Default for DisplayClock {
    fn default() -> Self {
        Self::utc()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn formats_in_fixed_zone() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 1, 3, 5, 0).unwrap();
        let clock = DisplayClock::from_minutes(-5 * 60, Some("EST".into()));
        assert_eq!(clock.long_date(&ts), "February 29, 2024");
        assert_eq!(clock.time_12h(&ts), "10:05 PM EST");
    }

    #[test]
    fn utc_default() {
        let ts = Utc.with_ymd_and_hms(2024, 12, 25, 12, 0, 0).unwrap();
        let clock = DisplayClock::default();
        assert_eq!(clock.long_date(&ts), "December 25, 2024");
        assert_eq!(clock.time_12h(&ts), "12:00 PM UTC");
    }

    #[test]
    fn out_of_range_offset_is_utc() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let clock = DisplayClock::from_minutes(100_000, None);
        assert_eq!(clock.time_12h(&ts), "12:00 AM");
    }
}
