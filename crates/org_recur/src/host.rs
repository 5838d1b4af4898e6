use serde::{Deserialize, Serialize};

/// Side effect requested from the host application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostAction {
    UpdateBlock { uuid: String, content: String },
    ShowMessage { text: String },
}

/// Write-back and notification surface of the host. Both calls are fire-and-forget.
pub trait Host {
    fn update_block(&mut self, uuid: &str, content: &str);
    fn show_message(&mut self, text: &str);

    fn apply(&mut self, action: &HostAction) {
        match action {
            HostAction::UpdateBlock { uuid, content } => self.update_block(uuid, content),
            HostAction::ShowMessage { text } => self.show_message(text),
        }
    }
}

/// Records every call, in order. Useful for replaying batches outside the host.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordingHost {
    pub actions: Vec<HostAction>,
}

impl Host for RecordingHost {
    fn update_block(&mut self, uuid: &str, content: &str) {
        self.actions.push(HostAction::UpdateBlock {
            uuid: uuid.to_string(),
            content: content.to_string(),
        });
    }

    fn show_message(&mut self, text: &str) {
        self.actions.push(HostAction::ShowMessage {
            text: text.to_string(),
        });
    }
}
