use std::fmt;
use std::str::FromStr;

use chrono::{Days, Duration, Months, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::{RecurError, Result};
use crate::scan::{is_digit, is_word, Cursor};

pub const REPEAT_FROM_COMPLETION: &str = ".+";
pub const REPEAT_FROM_CYCLE: &str = "++";

const MAX_MARKERS: usize = 2;

/// How the next occurrence is derived when a repeating task is completed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IntervalMode {
    /// `.+`: step from the completion date.
    FromCompletion,
    /// `++`: step the original date until it is no longer in the past.
    FromCycle,
    /// Any other marker sequence, kept verbatim and never advanced here.
    Other(String),
}

impl IntervalMode {
    fn from_markers(markers: &str) -> Self {
        match markers {
            REPEAT_FROM_COMPLETION => Self::FromCompletion,
            REPEAT_FROM_CYCLE => Self::FromCycle,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn marker(&self) -> &str {
        match self {
            Self::FromCompletion => REPEAT_FROM_COMPLETION,
            Self::FromCycle => REPEAT_FROM_CYCLE,
            Self::Other(markers) => markers,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IntervalUnit {
    Hour,
    Day,
    Week,
    Month,
    Year,
}

impl IntervalUnit {
    pub fn from_char(unit: char) -> Result<Self> {
        match unit {
            'h' => Ok(Self::Hour),
            'd' => Ok(Self::Day),
            'w' => Ok(Self::Week),
            'm' => Ok(Self::Month),
            'y' => Ok(Self::Year),
            other => Err(RecurError::InvalidIntervalUnit(other)),
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Self::Hour => 'h',
            Self::Day => 'd',
            Self::Week => 'w',
            Self::Month => 'm',
            Self::Year => 'y',
        }
    }
}

/// A parsed repeat specifier such as `.+1d` or `++2w`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Interval {
    pub mode: IntervalMode,
    pub amount: u32,
    pub unit: IntervalUnit,
}

impl Interval {
    /// Parses `<markers><digits><unit>` where markers are one or two of `.` and `+`.
    ///
    /// The unit is the single word character after the digits; when the text ends in digits
    /// the last digit is taken as the unit and rejected as unknown.
    pub fn parse(text: &str) -> Result<Self> {
        let invalid = || RecurError::InvalidInterval(text.to_string());
        let mut cursor = Cursor::new(text);

        let markers = cursor.take_while_max(MAX_MARKERS, |b| b == b'.' || b == b'+');
        if markers.is_empty() {
            return Err(invalid());
        }

        let mut digits = cursor.take_while(is_digit);
        if digits.is_empty() {
            return Err(invalid());
        }

        let unit = match cursor.peek() {
            Some(byte) if is_word(byte) => {
                cursor.eat(byte);
                byte as char
            }
            None if digits.len() > 1 => {
                let (amount, unit) = digits.split_at(digits.len() - 1);
                digits = amount;
                unit.as_bytes()[0] as char
            }
            _ => return Err(invalid()),
        };
        if !cursor.is_eof() {
            return Err(invalid());
        }

        let unit = IntervalUnit::from_char(unit)?;
        let amount = digits.parse::<u32>().map_err(|_| invalid())?;
        Ok(Self {
            mode: IntervalMode::from_markers(markers),
            amount,
            unit,
        })
    }

    /// Steps `date` forward by one interval using calendar arithmetic.
    ///
    /// Month and year steps clamp to the last day of the target month.
    pub fn apply(&self, date: NaiveDateTime) -> Result<NaiveDateTime> {
        let amount = self.amount;
        let stepped = match self.unit {
            IntervalUnit::Hour => date.checked_add_signed(Duration::hours(i64::from(amount))),
            IntervalUnit::Day => date.checked_add_days(Days::new(u64::from(amount))),
            IntervalUnit::Week => date.checked_add_days(Days::new(u64::from(amount) * 7)),
            IntervalUnit::Month => date.checked_add_months(Months::new(amount)),
            IntervalUnit::Year => amount
                .checked_mul(12)
                .and_then(|months| date.checked_add_months(Months::new(months))),
        };
        stepped.ok_or(RecurError::DateOutOfRange)
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.mode.marker(), self.amount, self.unit.as_char())
    }
}

impl FromStr for Interval {
    type Err = RecurError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
