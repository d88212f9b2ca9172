//! Mock hardware bridge for deterministic testing of the control core.
//!
//! [`MockChip`] implements the [`FmChip`] trait with scripted immediate
//! acks and optional automatic completions. This lets you test admission
//! control, completion waits, and event handling without real hardware.
//!
//! # Example
//!
//! ```
//! use fmtuner_core::{ChipStatus, CommandKind};
//! use fmtuner_test_harness::MockChip;
//!
//! let (chip, _events) = MockChip::new();
//! // Reject band reads at submission; auto-complete tune requests.
//! chip.ack(CommandKind::GetBand, ChipStatus::Failed);
//! chip.complete(CommandKind::Tune, ChipStatus::Success, 94_100);
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::mpsc;

use fmtuner_core::chip::{ChipCommand, ChipEvent, ChipStatus, CommandKind, FmChip};

#[derive(Debug)]
struct MockScript {
    /// Immediate ack per command kind; kinds not listed ack `Pending`.
    acks: HashMap<CommandKind, ChipStatus>,
    /// Automatic completion (status, value) sent right after a `Pending` ack.
    completions: HashMap<CommandKind, (ChipStatus, i64)>,
    /// Log of every submitted command, in order.
    submitted: Vec<ChipCommand>,
}

/// A mock [`FmChip`] for testing the control core without hardware.
///
/// Every submission is recorded. The immediate ack defaults to
/// [`ChipStatus::Pending`] and can be overridden per command kind with
/// [`ack()`](MockChip::ack). A completion scripted with
/// [`complete()`](MockChip::complete) is delivered on the event channel
/// as soon as the command is acked `Pending`; unscripted commands stay
/// pending until the test injects an event itself via
/// [`inject()`](MockChip::inject).
///
/// The mock is cheaply cloneable; clones share the same script and log.
#[derive(Debug, Clone)]
pub struct MockChip {
    script: Arc<Mutex<MockScript>>,
    event_tx: mpsc::UnboundedSender<ChipEvent>,
}

impl MockChip {
    /// Create a mock chip and the event receiver to hand to the control
    /// core builder.
    pub fn new() -> (MockChip, mpsc::UnboundedReceiver<ChipEvent>) {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let chip = MockChip {
            script: Arc::new(Mutex::new(MockScript {
                acks: HashMap::new(),
                completions: HashMap::new(),
                submitted: Vec::new(),
            })),
            event_tx,
        };
        (chip, event_rx)
    }

    /// Override the immediate ack for a command kind.
    pub fn ack(&self, kind: CommandKind, status: ChipStatus) {
        let mut script = self.script.lock().unwrap();
        script.acks.insert(kind, status);
    }

    /// Script an automatic completion for a command kind.
    ///
    /// The completion event is sent immediately after the command is
    /// acked `Pending`.
    pub fn complete(&self, kind: CommandKind, status: ChipStatus, value: i64) {
        let mut script = self.script.lock().unwrap();
        script.completions.insert(kind, (status, value));
    }

    /// Remove a scripted completion, leaving the kind pending forever.
    pub fn clear_completion(&self, kind: CommandKind) {
        let mut script = self.script.lock().unwrap();
        script.completions.remove(&kind);
    }

    /// Inject a chip event as if the driver had sent it unsolicited.
    pub fn inject(&self, event: ChipEvent) {
        let _ = self.event_tx.send(event);
    }

    /// All commands submitted so far, in order.
    pub fn submitted(&self) -> Vec<ChipCommand> {
        self.script.lock().unwrap().submitted.clone()
    }

    /// Number of commands submitted so far.
    pub fn submitted_count(&self) -> usize {
        self.script.lock().unwrap().submitted.len()
    }

    /// Number of submissions of one particular kind.
    pub fn submitted_count_of(&self, kind: CommandKind) -> usize {
        self.script
            .lock()
            .unwrap()
            .submitted
            .iter()
            .filter(|c| c.kind() == kind)
            .count()
    }
}

#[async_trait]
impl FmChip for MockChip {
    async fn submit(&self, cmd: ChipCommand) -> ChipStatus {
        let kind = cmd.kind();
        let (ack, completion) = {
            let mut script = self.script.lock().unwrap();
            script.submitted.push(cmd);
            let ack = script.acks.get(&kind).copied().unwrap_or(ChipStatus::Pending);
            (ack, script.completions.get(&kind).copied())
        };
        if ack == ChipStatus::Pending {
            if let Some((status, value)) = completion {
                let _ = self.event_tx.send(ChipEvent::CommandDone { status, kind, value });
            }
        }
        ack
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_chip_default_ack_is_pending() {
        let (chip, _events) = MockChip::new();
        let ack = chip.submit(ChipCommand::GetBand).await;
        assert_eq!(ack, ChipStatus::Pending);
        assert_eq!(chip.submitted_count(), 1);
    }

    #[tokio::test]
    async fn mock_chip_scripted_ack() {
        let (chip, _events) = MockChip::new();
        chip.ack(CommandKind::Enable, ChipStatus::Failed);
        let ack = chip.submit(ChipCommand::Enable).await;
        assert_eq!(ack, ChipStatus::Failed);
    }

    #[tokio::test]
    async fn mock_chip_auto_completion_delivered() {
        let (chip, mut events) = MockChip::new();
        chip.complete(CommandKind::GetRssi, ChipStatus::Success, 42);

        chip.submit(ChipCommand::GetRssi).await;

        match events.recv().await.unwrap() {
            ChipEvent::CommandDone { status, kind, value } => {
                assert_eq!(status, ChipStatus::Success);
                assert_eq!(kind, CommandKind::GetRssi);
                assert_eq!(value, 42);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn mock_chip_no_completion_when_ack_rejects() {
        let (chip, mut events) = MockChip::new();
        chip.ack(CommandKind::GetRssi, ChipStatus::Failed);
        chip.complete(CommandKind::GetRssi, ChipStatus::Success, 42);

        chip.submit(ChipCommand::GetRssi).await;
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn mock_chip_records_commands_in_order() {
        let (chip, _events) = MockChip::new();
        chip.submit(ChipCommand::Enable).await;
        chip.submit(ChipCommand::Tune {
            frequency_khz: 94_100,
        })
        .await;

        let submitted = chip.submitted();
        assert_eq!(submitted.len(), 2);
        assert_eq!(submitted[0], ChipCommand::Enable);
        assert_eq!(
            submitted[1],
            ChipCommand::Tune {
                frequency_khz: 94_100
            }
        );
        assert_eq!(chip.submitted_count_of(CommandKind::Tune), 1);
    }

    #[tokio::test]
    async fn mock_chip_inject_unsolicited_event() {
        let (chip, mut events) = MockChip::new();
        chip.inject(ChipEvent::PiCodeChanged {
            status: ChipStatus::Success,
            pi: 0xC201,
        });

        match events.recv().await.unwrap() {
            ChipEvent::PiCodeChanged { pi, .. } => assert_eq!(pi, 0xC201),
            other => panic!("unexpected event: {other:?}"),
        }
    }
}
