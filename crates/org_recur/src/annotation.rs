use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::scan::{is_digit, is_word, Cursor};
use crate::timestamp::OrgDate;

pub const SCHEDULED_PREFIX: &str = "\nSCHEDULED: <";
pub const LOGBOOK_START: &str = "\n:LOGBOOK:\n";
pub const LOGBOOK_END: &str = "\n:END:";
const STATE_CHANGE_PREFIX: &str = "* State \"DONE\" from \"";

/// The single `SCHEDULED: <date interval>` line of a repeating task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledAnnotation {
    pub scheduled: OrgDate,
    /// Raw repeat specifier, e.g. `.+1d`. Parsed later so edits can be compared textually.
    pub interval: String,
    /// Byte range of the annotation in the text it was read from, leading newline included.
    pub span: Range<usize>,
}

/// A syntactic match of the annotation grammar, before the date is validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ScheduledMatch<'a> {
    pub span: Range<usize>,
    pub date: &'a str,
    pub interval: Option<&'a str>,
}

pub(crate) fn scheduled_matches(text: &str) -> Vec<ScheduledMatch<'_>> {
    text.match_indices(SCHEDULED_PREFIX)
        .filter_map(|(start, _)| match_scheduled_at(text, start))
        .collect()
}

fn match_scheduled_at(text: &str, start: usize) -> Option<ScheduledMatch<'_>> {
    let mut cursor = Cursor::at(text, start + SCHEDULED_PREFIX.len());

    let date_start = cursor.pos();
    scan_date(&mut cursor)?;
    let mut ahead = cursor.clone();
    if scan_time(&mut ahead).is_some() {
        cursor = ahead;
    }
    let date = cursor.slice_from(date_start);

    let mut interval = None;
    let mut ahead = cursor.clone();
    if ahead.eat(b' ') {
        let interval_start = ahead.pos();
        if scan_interval(&mut ahead).is_some() {
            interval = Some(ahead.slice_from(interval_start));
            cursor = ahead;
        }
    }

    if !cursor.eat(b'>') {
        return None;
    }
    Some(ScheduledMatch {
        span: start..cursor.pos(),
        date,
        interval,
    })
}

/// `YYYY-MM-DD DOW`
fn scan_date(cursor: &mut Cursor<'_>) -> Option<()> {
    cursor.take_exact(4, is_digit)?;
    cursor.eat(b'-').then_some(())?;
    cursor.take_exact(2, is_digit)?;
    cursor.eat(b'-').then_some(())?;
    cursor.take_exact(2, is_digit)?;
    cursor.eat(b' ').then_some(())?;
    cursor.take_exact(3, is_word)?;
    Some(())
}

/// ` HH:MM`
fn scan_time(cursor: &mut Cursor<'_>) -> Option<()> {
    cursor.eat(b' ').then_some(())?;
    cursor.take_exact(2, is_digit)?;
    cursor.eat(b':').then_some(())?;
    cursor.take_exact(2, is_digit)?;
    Some(())
}

/// A repeat specifier directly followed by the closing `>`, which is left unconsumed.
fn scan_interval(cursor: &mut Cursor<'_>) -> Option<()> {
    let markers = cursor.take_while_max(2, |b| b == b'.' || b == b'+');
    if markers.is_empty() {
        return None;
    }
    let digits = cursor.take_while(is_digit);
    if digits.is_empty() {
        return None;
    }
    match (cursor.peek(), cursor.peek_at(1)) {
        (Some(unit), Some(b'>')) if is_word(unit) => {
            cursor.eat(unit);
            Some(())
        }
        // The final digit doubles as the unit letter.
        (Some(b'>'), _) if digits.len() > 1 => Some(()),
        _ => None,
    }
}

/// Reads the scheduling annotation of a repeating task.
///
/// Returns `Ok(None)` when the text has zero or several annotations, or when the single
/// annotation carries no repeat specifier.
pub fn scheduled_date_interval(text: &str) -> Result<Option<ScheduledAnnotation>> {
    let mut matches = scheduled_matches(text);
    if matches.len() != 1 {
        tracing::debug!(count = matches.len(), "expected exactly one scheduled annotation");
        return Ok(None);
    }
    let found = matches.remove(0);
    let Some(interval) = found.interval else {
        tracing::debug!("scheduled annotation has no interval");
        return Ok(None);
    };
    Ok(Some(ScheduledAnnotation {
        scheduled: OrgDate::parse(found.date)?,
        interval: interval.to_string(),
        span: found.span,
    }))
}

/// Lines of the trailing `:LOGBOOK:` drawer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Logbook<'a> {
    entries: Vec<&'a str>,
}

impl<'a> Logbook<'a> {
    /// The drawer must close the text. A drawer whose markers share their newline has no
    /// lines; a single blank line inside it counts as one entry.
    pub fn parse(text: &'a str) -> Option<Self> {
        if !text.ends_with(LOGBOOK_END) {
            return None;
        }
        let start = text.rfind(LOGBOOK_START)? + LOGBOOK_START.len();
        let end = text.len() - LOGBOOK_END.len();
        if start > end {
            return None;
        }
        Some(Self {
            entries: text[start..end].split('\n').collect(),
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[&'a str] {
        &self.entries
    }

    pub fn last_entry(&self) -> Option<&'a str> {
        self.entries.last().copied()
    }
}

/// Completion timestamp of a `* State "DONE" from "TODO" [YYYY-MM-DD DOW HH:MM]` line.
///
/// Lines without that shape yield `Ok(None)`; a well-shaped stamp with an impossible date is
/// an error.
pub fn state_change_date(entry: &str) -> Result<Option<OrgDate>> {
    let stamp = entry
        .match_indices(STATE_CHANGE_PREFIX)
        .find_map(|(start, _)| match_state_change_at(entry, start + STATE_CHANGE_PREFIX.len()));
    stamp.map(OrgDate::parse).transpose()
}

fn match_state_change_at(entry: &str, pos: usize) -> Option<&str> {
    let mut cursor = Cursor::at(entry, pos);
    if cursor.take_while(is_word).is_empty() || !cursor.eat_str("\" [") {
        return None;
    }
    let stamp_start = cursor.pos();
    scan_date(&mut cursor)?;
    scan_time(&mut cursor)?;
    let stamp = cursor.slice_from(stamp_start);
    cursor.eat(b']').then_some(stamp)
}
