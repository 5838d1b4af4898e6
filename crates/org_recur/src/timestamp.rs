use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::{RecurError, Result};

const WEEKDAY_ABBREVIATIONS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

const DATE_ONLY_LEN: usize = 14;
const DATE_TIME_LEN: usize = 20;

const YEAR: Range<usize> = 0..4;
const MONTH: Range<usize> = 5..7;
const DAY: Range<usize> = 8..10;
const HOUR: Range<usize> = 15..17;
const MINUTE: Range<usize> = 18..20;

/// A timestamp in the `YYYY-MM-DD DOW[ HH:MM]` grammar.
///
/// `has_time` records whether the `HH:MM` segment was present. The weekday is never stored;
/// it is recomputed from `date` when rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrgDate {
    pub date: NaiveDateTime,
    pub has_time: bool,
}

impl OrgDate {
    pub fn new(date: NaiveDateTime, has_time: bool) -> Self {
        Self { date, has_time }
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            date: date.and_time(NaiveTime::MIN),
            has_time: false,
        }
    }

    /// Parses by fixed offsets. The weekday text is skipped without validation.
    pub fn parse(input: &str) -> Result<Self> {
        let text = input.trim();
        let invalid = || RecurError::InvalidFormat(input.to_string());

        let has_time = match text.len() {
            DATE_ONLY_LEN => false,
            DATE_TIME_LEN => true,
            _ => return Err(invalid()),
        };

        let year = numeric_field(text, YEAR).ok_or_else(invalid)?;
        let month = numeric_field(text, MONTH).ok_or_else(invalid)?;
        let day = numeric_field(text, DAY).ok_or_else(invalid)?;
        let date = NaiveDate::from_ymd_opt(year as i32, month, day).ok_or_else(invalid)?;

        let time = if has_time {
            let hour = numeric_field(text, HOUR).ok_or_else(invalid)?;
            let minute = numeric_field(text, MINUTE).ok_or_else(invalid)?;
            NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(invalid)?
        } else {
            NaiveTime::MIN
        };

        Ok(Self {
            date: date.and_time(time),
            has_time,
        })
    }

    /// Whether rendering includes `HH:MM`. A non-zero time of day always forces it.
    pub fn shows_time(&self) -> bool {
        self.has_time || self.date.hour() != 0 || self.date.minute() != 0
    }

    /// The same calendar day at midnight, keeping the `has_time` flag.
    pub fn at_midnight(self) -> Self {
        Self {
            date: self.date.date().and_time(NaiveTime::MIN),
            has_time: self.has_time,
        }
    }

    pub fn weekday_abbreviation(&self) -> &'static str {
        WEEKDAY_ABBREVIATIONS[self.date.weekday().num_days_from_monday() as usize]
    }
}

impl fmt::Display for OrgDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{:02}-{:02} {}",
            self.date.year(),
            self.date.month(),
            self.date.day(),
            self.weekday_abbreviation()
        )?;
        if self.shows_time() {
            write!(f, " {:02}:{:02}", self.date.hour(), self.date.minute())?;
        }
        Ok(())
    }
}

impl FromStr for OrgDate {
    type Err = RecurError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

fn numeric_field(text: &str, range: Range<usize>) -> Option<u32> {
    let field = text.get(range)?;
    if !field.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    field.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn parses_date_without_time() {
        let parsed = OrgDate::parse("2021-09-09 Thu").unwrap();
        assert_eq!(parsed.date, at(2021, 9, 9, 0, 0));
        assert!(!parsed.has_time);
    }

    #[test]
    fn parses_date_with_time() {
        let parsed = OrgDate::parse("2021-09-09 Thu 10:05").unwrap();
        assert_eq!(parsed.date, at(2021, 9, 9, 10, 5));
        assert!(parsed.has_time);
    }

    #[test]
    fn ignores_weekday_text_and_surrounding_whitespace() {
        let parsed = OrgDate::parse("  2021-09-09 Xyz ").unwrap();
        assert_eq!(parsed.date, at(2021, 9, 9, 0, 0));
        assert_eq!(parsed.to_string(), "2021-09-09 Thu");
    }

    #[test]
    fn rejects_wrong_length() {
        for input in ["2021-09-09", "2021-09-09 Thu 10", "2021-09-09 Thu 10:00:00", ""] {
            assert!(
                matches!(OrgDate::parse(input), Err(RecurError::InvalidFormat(_))),
                "{input:?} should be rejected"
            );
        }
    }

    #[test]
    fn rejects_out_of_range_fields() {
        assert!(matches!(
            OrgDate::parse("2021-13-09 Thu"),
            Err(RecurError::InvalidFormat(_))
        ));
        assert!(matches!(
            OrgDate::parse("2021-02-30 Tue"),
            Err(RecurError::InvalidFormat(_))
        ));
        assert!(matches!(
            OrgDate::parse("2021-09-09 Thu 24:00"),
            Err(RecurError::InvalidFormat(_))
        ));
        assert!(matches!(
            OrgDate::parse("2021-0a-09 Thu"),
            Err(RecurError::InvalidFormat(_))
        ));
    }

    #[test]
    fn non_ascii_input_is_rejected_without_panicking() {
        assert!(OrgDate::parse("2021-09-0é Thu").is_err());
    }

    #[test]
    fn renders_recomputed_weekday_and_padding() {
        let date = OrgDate::new(at(2021, 1, 3, 7, 5), true);
        assert_eq!(date.to_string(), "2021-01-03 Sun 07:05");
        let date = OrgDate::from_date(NaiveDate::from_ymd_opt(2021, 9, 10).unwrap());
        assert_eq!(date.to_string(), "2021-09-10 Fri");
    }

    #[test]
    fn non_zero_time_forces_time_segment() {
        let date = OrgDate::new(at(2021, 9, 9, 0, 30), false);
        assert_eq!(date.to_string(), "2021-09-09 Thu 00:30");
    }

    #[test]
    fn midnight_with_time_flag_keeps_time_segment() {
        let date = OrgDate::new(at(2021, 9, 9, 0, 0), true);
        assert_eq!(date.to_string(), "2021-09-09 Thu 00:00");
    }

    #[test]
    fn round_trips_consistent_values() {
        for text in ["2020-02-29 Sat", "1999-12-31 Fri 23:59", "2021-09-09 Thu 00:00"] {
            let parsed: OrgDate = text.parse().unwrap();
            assert_eq!(parsed.to_string(), text);
            assert_eq!(OrgDate::parse(&parsed.to_string()).unwrap(), parsed);
        }
    }
}
