use crate::error::Result;
use crate::interval::{Interval, IntervalMode};
use crate::timestamp::OrgDate;

/// Computes the next scheduled date after a completion at `completed_at`.
///
/// Returns `Ok(None)` for interval modes that are not rescheduled here. The result keeps
/// the `has_time` flag of the original schedule.
pub fn next_scheduled(
    scheduled: OrgDate,
    interval: &Interval,
    completed_at: OrgDate,
    max_cycle_iterations: u32,
) -> Result<Option<OrgDate>> {
    let next = match &interval.mode {
        IntervalMode::FromCompletion => {
            let base = if scheduled.has_time {
                completed_at
            } else {
                completed_at.at_midnight()
            };
            interval.apply(base.date)?
        }
        IntervalMode::FromCycle => {
            catch_up(scheduled, interval, completed_at, max_cycle_iterations)?
        }
        IntervalMode::Other(marker) => {
            tracing::debug!(%marker, "interval mode is not rescheduled");
            return Ok(None);
        }
    };
    Ok(Some(OrgDate::new(next, scheduled.has_time)))
}

/// Steps the original date until it is no longer before the completion, or the cap is hit.
fn catch_up(
    scheduled: OrgDate,
    interval: &Interval,
    completed_at: OrgDate,
    max_iterations: u32,
) -> Result<chrono::NaiveDateTime> {
    let mut next = scheduled.date;
    let mut steps = 0;
    while next < completed_at.date {
        if steps >= max_iterations {
            tracing::warn!(%interval, steps, "cycle catch-up hit the iteration cap");
            break;
        }
        next = interval.apply(next)?;
        steps += 1;
    }
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    fn date_only(y: i32, m: u32, d: u32) -> OrgDate {
        OrgDate::new(at(y, m, d, 0, 0), false)
    }

    fn interval(text: &str) -> Interval {
        Interval::parse(text).unwrap()
    }

    #[test]
    fn from_completion_drops_time_when_schedule_has_none() {
        let completed = OrgDate::new(at(2021, 9, 9, 10, 0), true);
        let next = next_scheduled(date_only(2021, 9, 1), &interval(".+1d"), completed, 1000)
            .unwrap()
            .unwrap();
        assert_eq!(next, date_only(2021, 9, 10));
        assert_eq!(next.to_string(), "2021-09-10 Fri");
    }

    #[test]
    fn from_completion_keeps_completion_time_when_schedule_has_time() {
        let scheduled = OrgDate::new(at(2021, 9, 1, 8, 0), true);
        let completed = OrgDate::new(at(2021, 9, 9, 10, 15), true);
        let next = next_scheduled(scheduled, &interval(".+2d"), completed, 1000)
            .unwrap()
            .unwrap();
        assert_eq!(next, OrgDate::new(at(2021, 9, 11, 10, 15), true));
    }

    #[test]
    fn from_cycle_steps_original_date_past_completion() {
        let completed = OrgDate::new(at(2021, 9, 20, 0, 0), false);
        let next = next_scheduled(date_only(2021, 9, 1), &interval("++1w"), completed, 1000)
            .unwrap()
            .unwrap();
        assert_eq!(next, date_only(2021, 9, 22));
        assert_eq!(next.to_string(), "2021-09-22 Wed");
    }

    #[test]
    fn from_cycle_lands_exactly_on_completion() {
        let completed = OrgDate::new(at(2021, 9, 15, 0, 0), true);
        let next = next_scheduled(date_only(2021, 9, 1), &interval("++1w"), completed, 1000)
            .unwrap()
            .unwrap();
        assert_eq!(next, date_only(2021, 9, 15));
    }

    #[test]
    fn from_cycle_leaves_future_schedule_alone() {
        let completed = OrgDate::new(at(2021, 9, 9, 10, 0), true);
        let next = next_scheduled(date_only(2021, 10, 1), &interval("++1m"), completed, 1000)
            .unwrap()
            .unwrap();
        assert_eq!(next, date_only(2021, 10, 1));
    }

    #[test]
    fn from_cycle_result_is_smallest_reachable_step() {
        let start = date_only(2021, 1, 1);
        let completed = OrgDate::new(at(2021, 3, 17, 9, 30), true);
        let step = interval("++3d");
        let next = next_scheduled(start, &step, completed, 1000)
            .unwrap()
            .unwrap();
        assert!(next.date >= completed.date);
        let previous = next.date - chrono::Duration::days(3);
        assert!(previous < completed.date);
        assert_eq!((next.date - start.date).num_days() % 3, 0);
    }

    #[test]
    fn zero_interval_stops_at_iteration_cap() {
        let completed = OrgDate::new(at(2021, 9, 20, 0, 0), false);
        let next = next_scheduled(date_only(2021, 9, 1), &interval("++0d"), completed, 1000)
            .unwrap()
            .unwrap();
        assert_eq!(next, date_only(2021, 9, 1));
    }

    #[test]
    fn iteration_cap_returns_last_reached_date() {
        let completed = OrgDate::new(at(2021, 12, 31, 0, 0), false);
        let next = next_scheduled(date_only(2021, 1, 1), &interval("++1d"), completed, 10)
            .unwrap()
            .unwrap();
        assert_eq!(next, date_only(2021, 1, 11));
    }

    #[test]
    fn plain_shift_mode_is_not_rescheduled() {
        let completed = OrgDate::new(at(2021, 9, 9, 10, 0), true);
        assert_eq!(
            next_scheduled(date_only(2021, 9, 1), &interval("+1d"), completed, 1000).unwrap(),
            None
        );
    }
}
