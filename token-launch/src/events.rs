//! Progress events emitted by the launch workflow

use serde::Serialize;
use std::fmt;
use tokio::sync::mpsc;
use tracing::{error, info};

/// The four stages of a launch, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    LoadIdentity,
    UploadAssets,
    CreateToken,
    BindMetadata,
}

impl Step {
    pub fn as_str(&self) -> &'static str {
        match self {
            Step::LoadIdentity => "load_identity",
            Step::UploadAssets => "upload_assets",
            Step::CreateToken => "create_token",
            Step::BindMetadata => "bind_metadata",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum WorkflowEvent {
    StepStarted { step: Step },
    StepCompleted { step: Step, detail: String },
    StepFailed { step: Step, error: String },
}

impl WorkflowEvent {
    pub fn step(&self) -> Step {
        match self {
            WorkflowEvent::StepStarted { step }
            | WorkflowEvent::StepCompleted { step, .. }
            | WorkflowEvent::StepFailed { step, .. } => *step,
        }
    }
}

/// Observer of workflow progress
pub trait EventSink: Send + Sync {
    fn emit(&self, event: &WorkflowEvent);
}

/// Logs every event through `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: &WorkflowEvent) {
        match event {
            WorkflowEvent::StepStarted { step } => info!(step = %step, "Step started"),
            WorkflowEvent::StepCompleted { step, detail } => {
                info!(step = %step, "Step completed: {}", detail)
            }
            WorkflowEvent::StepFailed { step, error } => {
                error!(step = %step, "Step failed: {}", error)
            }
        }
    }
}

/// Forwards events to an unbounded channel; a closed receiver is ignored
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<WorkflowEvent>,
}

impl ChannelSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<WorkflowEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl EventSink for ChannelSink {
    fn emit(&self, event: &WorkflowEvent) {
        let _ = self.tx.send(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serialization() {
        let event = WorkflowEvent::StepFailed {
            step: Step::CreateToken,
            error: "boom".to_string(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "step_failed");
        assert_eq!(json["step"], "create_token");
        assert_eq!(json["error"], "boom");
    }

    #[tokio::test]
    async fn test_channel_sink_forwards_in_order() {
        let (sink, mut rx) = ChannelSink::new();
        sink.emit(&WorkflowEvent::StepStarted { step: Step::LoadIdentity });
        sink.emit(&WorkflowEvent::StepCompleted {
            step: Step::LoadIdentity,
            detail: "ok".to_string(),
        });

        assert_eq!(rx.recv().await.unwrap().step(), Step::LoadIdentity);
        assert!(matches!(
            rx.recv().await.unwrap(),
            WorkflowEvent::StepCompleted { .. }
        ));
    }

    #[test]
    fn test_channel_sink_tolerates_dropped_receiver() {
        let (sink, rx) = ChannelSink::new();
        drop(rx);
        sink.emit(&WorkflowEvent::StepStarted { step: Step::BindMetadata });
    }
}
