//! Timestamp utilities
//!
//! All stamps use local wall-clock time, matching what an operator sees on
//! their own clock when comparing ledger entries with output files.

use chrono::{DateTime, Local};

/// Format of the session tag used in output names and ledger entries
pub const SESSION_TAG_FORMAT: &str = "%y%m%d%H%M%S";

/// Format of the `codedDate` field
pub const CODED_DATE_FORMAT: &str = "%Y-%m-%d";

/// Format of the `codedTime` field
pub const CODED_TIME_FORMAT: &str = "%H:%M:%S";

/// Get current local timestamp
pub fn now() -> DateTime<Local> {
    Local::now()
}

/// Session tag for a given instant, e.g. `200309141502`
pub fn session_tag(at: &DateTime<Local>) -> String {
    at.format(SESSION_TAG_FORMAT).to_string()
}

/// `(codedDate, codedTime)` pair for a given instant
pub fn coded_date_time(at: &DateTime<Local>) -> (String, String) {
    (
        at.format(CODED_DATE_FORMAT).to_string(),
        at.format(CODED_TIME_FORMAT).to_string(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed() -> DateTime<Local> {
        Local.with_ymd_and_hms(2020, 3, 9, 14, 15, 2).unwrap()
    }

    #[test]
    fn test_session_tag_is_twelve_digits() {
        let tag = session_tag(&fixed());
        assert_eq!(tag, "200309141502");
        assert!(tag.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_coded_date_time_split() {
        let (date, time) = coded_date_time(&fixed());
        assert_eq!(date, "2020-03-09");
        assert_eq!(time, "14:15:02");
    }

    #[test]
    fn test_now_returns_recent_timestamp() {
        let timestamp = now();
        // Should be a reasonable timestamp (after year 2000, before 2100)
        assert!(timestamp.timestamp() > 946_684_800);
        assert!(timestamp.timestamp() < 4_102_444_800);
    }
}
