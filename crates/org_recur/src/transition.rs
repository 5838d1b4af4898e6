//! Decides whether a change batch is a genuine completion of a repeating task.
//!
//! A completion is a single replace of the block content, in one transaction, that leaves the
//! scheduling annotation alone and appends a recent `DONE` state change to the logbook.
//! Anything else (edits, undos, no-op writes, late history edits) is skipped.

use chrono::NaiveDateTime;

use crate::annotation::{scheduled_date_interval, state_change_date, Logbook, ScheduledAnnotation};
use crate::block::{ChangeBatch, TaskBlock};
use crate::config::EngineConfig;
use crate::error::Result;
use crate::interval::{Interval, IntervalMode};
use crate::timestamp::OrgDate;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    NotRepeating,
    NotScheduled,
    UnsupportedDialect(String),
    MissingContent,
    ContentRecordCount(usize),
    NotSingleReplace,
    NotCurrentContent,
    UnchangedContent,
    CrossTransaction,
    PreviousNotText,
    NoPreviousAnnotation,
    NoCurrentAnnotation,
    IntervalEdited,
    NoPreviousLogbook,
    NoCurrentLogbook,
    LogbookNotGrown { previous: usize, current: usize },
    NotStateChange,
    StaleCompletion { completed_at: NaiveDateTime },
}

/// A completion that qualifies for rescheduling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    /// Annotation as it appears in the current content.
    pub annotation: ScheduledAnnotation,
    pub interval: Interval,
    pub completed_at: OrgDate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Completed(Completion),
    /// The repeat specifier was edited and its mode changed along with it.
    ModeChanged { from: IntervalMode, to: IntervalMode },
    Skipped(SkipReason),
}

macro_rules! skip_unless {
    ($cond:expr, $reason:expr) => {
        if !$cond {
            return Ok(Transition::Skipped($reason));
        }
    };
}

pub fn detect(
    block: &TaskBlock,
    batch: &ChangeBatch,
    now: NaiveDateTime,
    config: &EngineConfig,
) -> Result<Transition> {
    skip_unless!(block.repeated, SkipReason::NotRepeating);
    skip_unless!(block.scheduled.is_some(), SkipReason::NotScheduled);
    skip_unless!(
        block.format == config.dialect,
        SkipReason::UnsupportedDialect(block.format.clone())
    );
    let Some(current) = block.content() else {
        return Ok(Transition::Skipped(SkipReason::MissingContent));
    };

    let records = batch.content_records(block.id);
    let [retracted, asserted] = records.as_slice() else {
        return Ok(Transition::Skipped(SkipReason::ContentRecordCount(
            records.len(),
        )));
    };
    skip_unless!(
        !retracted.added && asserted.added,
        SkipReason::NotSingleReplace
    );
    skip_unless!(
        asserted.text() == Some(current),
        SkipReason::NotCurrentContent
    );
    skip_unless!(
        retracted.text() != Some(current),
        SkipReason::UnchangedContent
    );
    skip_unless!(retracted.tx == asserted.tx, SkipReason::CrossTransaction);
    let Some(previous) = retracted.text() else {
        return Ok(Transition::Skipped(SkipReason::PreviousNotText));
    };

    let Some(previous_annotation) = scheduled_date_interval(previous)? else {
        return Ok(Transition::Skipped(SkipReason::NoPreviousAnnotation));
    };
    let Some(annotation) = scheduled_date_interval(current)? else {
        return Ok(Transition::Skipped(SkipReason::NoCurrentAnnotation));
    };

    if annotation.interval != previous_annotation.interval {
        let from = Interval::parse(&previous_annotation.interval)?.mode;
        let to = Interval::parse(&annotation.interval)?.mode;
        if from != to {
            return Ok(Transition::ModeChanged { from, to });
        }
        return Ok(Transition::Skipped(SkipReason::IntervalEdited));
    }
    let interval = Interval::parse(&annotation.interval)?;

    let Some(previous_logbook) = Logbook::parse(previous) else {
        return Ok(Transition::Skipped(SkipReason::NoPreviousLogbook));
    };
    let Some(logbook) = Logbook::parse(current) else {
        return Ok(Transition::Skipped(SkipReason::NoCurrentLogbook));
    };
    skip_unless!(
        logbook.len() > previous_logbook.len(),
        SkipReason::LogbookNotGrown {
            previous: previous_logbook.len(),
            current: logbook.len(),
        }
    );

    let last_entry = logbook.last_entry().unwrap_or_default();
    let Some(completed_at) = state_change_date(last_entry)? else {
        return Ok(Transition::Skipped(SkipReason::NotStateChange));
    };
    skip_unless!(
        now - completed_at.date <= config.completion_margin(),
        SkipReason::StaleCompletion {
            completed_at: completed_at.date,
        }
    );

    Ok(Transition::Completed(Completion {
        annotation,
        interval,
        completed_at,
    }))
}
