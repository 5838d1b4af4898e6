use chrono::NaiveDateTime;
use tracing::{debug, error, info, instrument, warn};

use crate::block::{ChangeBatch, TaskBlock};
use crate::config::EngineConfig;
use crate::error::Result;
use crate::host::{Host, HostAction};
use crate::recurrence::next_scheduled;
use crate::rewrite::rewrite_scheduled;
use crate::transition::{self, Transition};

pub const MODE_CHANGED_MESSAGE: &str = "Repeating task interval mode changed";
pub const UPDATED_MESSAGE: &str = "Repeating task successfully updated";

/// Reschedules repeating tasks when the host reports them as completed.
///
/// The engine holds no state between batches. `now` is naive local time, the same clock the
/// host uses when stamping logbook entries.
#[derive(Debug, Clone, Default)]
pub struct RepeatEngine {
    config: EngineConfig,
}

impl RepeatEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Host actions for one change batch, in the order they should be applied.
    ///
    /// Each block is handled on its own; a block that fails to parse is logged and skipped.
    #[instrument(skip_all, fields(blocks = batch.blocks.len(), records = batch.tx_data.len()))]
    pub fn process(&self, batch: &ChangeBatch, now: NaiveDateTime) -> Vec<HostAction> {
        let mut actions = Vec::new();
        for block in &batch.blocks {
            match self.process_block(block, batch, now) {
                Ok(block_actions) => actions.extend(block_actions),
                Err(err) => {
                    error!(uuid = %block.uuid, %err, "failed to reschedule repeating task");
                }
            }
        }
        actions
    }

    pub fn dispatch(&self, batch: &ChangeBatch, now: NaiveDateTime, host: &mut impl Host) {
        for action in self.process(batch, now) {
            host.apply(&action);
        }
    }

    fn process_block(
        &self,
        block: &TaskBlock,
        batch: &ChangeBatch,
        now: NaiveDateTime,
    ) -> Result<Vec<HostAction>> {
        let completion = match transition::detect(block, batch, now, &self.config)? {
            Transition::Completed(completion) => completion,
            Transition::ModeChanged { from, to } => {
                warn!(uuid = %block.uuid, from = from.marker(), to = to.marker(), "interval mode changed");
                return Ok(vec![HostAction::ShowMessage {
                    text: MODE_CHANGED_MESSAGE.to_string(),
                }]);
            }
            Transition::Skipped(reason) => {
                debug!(uuid = %block.uuid, ?reason, "not a completion");
                return Ok(Vec::new());
            }
        };

        let Some(next) = next_scheduled(
            completion.annotation.scheduled,
            &completion.interval,
            completion.completed_at,
            self.config.max_cycle_iterations,
        )?
        else {
            return Ok(Vec::new());
        };

        let current = block.content().unwrap_or_default();
        let Some(content) = rewrite_scheduled(current, &completion.annotation, &next) else {
            debug!(uuid = %block.uuid, %next, "schedule already up to date");
            return Ok(Vec::new());
        };

        info!(
            uuid = %block.uuid,
            completed_at = %completion.completed_at,
            %next,
            "rescheduled repeating task"
        );
        Ok(vec![
            HostAction::ShowMessage {
                text: UPDATED_MESSAGE.to_string(),
            },
            HostAction::UpdateBlock {
                uuid: block.uuid.clone(),
                content,
            },
        ])
    }
}
