use crate::annotation::{ScheduledAnnotation, SCHEDULED_PREFIX};
use crate::timestamp::OrgDate;

pub fn render_annotation(date: &OrgDate, interval: &str) -> String {
    format!("{SCHEDULED_PREFIX}{date} {interval}>")
}

/// Replaces `annotation`, read from `text`, with one for `date` and the same interval.
///
/// Returns `None` when the span does not fit `text` or the result would be unchanged.
pub fn rewrite_scheduled(
    text: &str,
    annotation: &ScheduledAnnotation,
    date: &OrgDate,
) -> Option<String> {
    let head = text.get(..annotation.span.start)?;
    let tail = text.get(annotation.span.end..)?;
    let rewritten = format!(
        "{head}{}{tail}",
        render_annotation(date, &annotation.interval)
    );
    (rewritten != text).then_some(rewritten)
}
