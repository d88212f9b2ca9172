//! The system-volume reconciler.
//!
//! The host platform owns the user-facing volume; the tuner chip has its
//! own 0..=70 hardware scale. External volume-change notifications are
//! folded onto the hardware with a linear rescale, one write in flight
//! at a time: a notification arriving while a write is pending is
//! dropped, and the next notification wins.

use tracing::{debug, warn};

use fmtuner_core::chip::{ChipCommand, ChipStatus};
use fmtuner_core::error::{Error, Result};
use fmtuner_core::types::{AudioStream, Caller, Capability, TunerState, HW_VOLUME_MAX};

use crate::receiver::FmReceiver;

impl FmReceiver {
    /// Fold an external volume-change notification onto the hardware
    /// volume.
    ///
    /// Ignored (successfully) unless the tuner is enabled and the
    /// notification is for the media stream. Dropped with a log line if
    /// a previous hardware write is still pending.
    pub async fn system_volume_changed(
        &self,
        caller: &Caller,
        stream: AudioStream,
        level: u32,
    ) -> Result<()> {
        self.require(caller, Capability::Admin, "system_volume_changed")?;
        if stream != AudioStream::Media {
            debug!(?stream, "ignoring volume change for non-media stream");
            return Ok(());
        }
        self.reconcile_volume(level).await
    }

    /// Force one reconciliation pass, typically right after enable to
    /// realign the hardware with the current external level.
    ///
    /// The pass still respects the single-flight rule.
    pub async fn restore_system_volume(&self, caller: &Caller, level: u32) -> Result<()> {
        self.require(caller, Capability::Admin, "restore_system_volume")?;
        debug!(level, "forcing volume reconciliation");
        self.reconcile_volume(level).await
    }

    async fn reconcile_volume(&self, level: u32) -> Result<()> {
        {
            let mut shared = self.inner.shared.lock().unwrap();
            if shared.state != TunerState::Enabled {
                debug!(state = %shared.state, "ignoring volume change; tuner not enabled");
                return Ok(());
            }
            if shared.volume_pending {
                warn!("previous volume write still pending; dropping notification");
                return Ok(());
            }
            shared.volume_pending = true;
        }

        let max = self.inner.system_volume_max;
        // Widened so a large configured external range cannot overflow.
        let hw_level = (u64::from(level.min(max)) * u64::from(HW_VOLUME_MAX) / u64::from(max)) as u32;
        debug!(level, hw_level, "reconciling system volume");

        let ack = self
            .inner
            .chip
            .submit(ChipCommand::SetVolume { level: hw_level })
            .await;
        if ack != ChipStatus::Pending {
            self.inner.shared.lock().unwrap().volume_pending = false;
            warn!(%ack, "volume write rejected at submission");
            return Err(Error::HardwareRejected(ack));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use fmtuner_core::chip::{ChipEvent, ChipStatus, CommandKind};
    use fmtuner_core::types::TunerState;

    use crate::builder::FmReceiverBuilder;
    use fmtuner_core::chip::ChipCommand;
    use fmtuner_core::types::{AudioStream, Caller};
    use fmtuner_test_harness::MockChip;

    use super::*;

    fn admin() -> Caller {
        Caller::admin("test")
    }

    async fn make_enabled() -> (FmReceiver, MockChip) {
        let (chip, events) = MockChip::new();
        let receiver = FmReceiverBuilder::new()
            .command_timeout(Duration::from_millis(50))
            .system_volume_max(15)
            .build(Arc::new(chip.clone()), events)
            .unwrap();
        chip.complete(CommandKind::Enable, ChipStatus::Success, 0);
        receiver.enable(&admin()).await.unwrap();
        for _ in 0..200 {
            if receiver.state() == TunerState::Enabled {
                break;
            }
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
        assert_eq!(receiver.state(), TunerState::Enabled);
        (receiver, chip)
    }

    #[tokio::test]
    async fn volume_rescales_external_max_to_hardware_max() {
        let (receiver, chip) = make_enabled().await;
        receiver
            .system_volume_changed(&admin(), AudioStream::Media, 15)
            .await
            .unwrap();
        assert!(chip
            .submitted()
            .contains(&ChipCommand::SetVolume { level: 70 }));
    }

    #[tokio::test]
    async fn volume_zero_maps_to_zero() {
        let (receiver, chip) = make_enabled().await;
        receiver
            .system_volume_changed(&admin(), AudioStream::Media, 0)
            .await
            .unwrap();
        assert!(chip
            .submitted()
            .contains(&ChipCommand::SetVolume { level: 0 }));
    }

    #[tokio::test]
    async fn volume_levels_above_max_are_clamped() {
        let (receiver, chip) = make_enabled().await;
        receiver
            .system_volume_changed(&admin(), AudioStream::Media, 99)
            .await
            .unwrap();
        assert!(chip
            .submitted()
            .contains(&ChipCommand::SetVolume { level: 70 }));
    }

    #[tokio::test]
    async fn volume_rescale_survives_huge_external_range() {
        let (chip, events) = MockChip::new();
        let receiver = FmReceiverBuilder::new()
            .command_timeout(Duration::from_millis(50))
            .system_volume_max(u32::MAX)
            .build(Arc::new(chip.clone()), events)
            .unwrap();
        chip.complete(CommandKind::Enable, ChipStatus::Success, 0);
        receiver.enable(&admin()).await.unwrap();
        for _ in 0..200 {
            if receiver.state() == TunerState::Enabled {
                break;
            }
            tokio::time::sleep(Duration::from_millis(1)).await;
        }

        receiver
            .system_volume_changed(&admin(), AudioStream::Media, u32::MAX)
            .await
            .unwrap();
        assert!(chip
            .submitted()
            .contains(&ChipCommand::SetVolume { level: 70 }));
    }

    #[tokio::test]
    async fn second_notification_dropped_while_write_pending() {
        let (receiver, chip) = make_enabled().await;
        // First write pends forever (no completion scripted).
        receiver
            .system_volume_changed(&admin(), AudioStream::Media, 10)
            .await
            .unwrap();
        receiver
            .system_volume_changed(&admin(), AudioStream::Media, 5)
            .await
            .unwrap();
        assert_eq!(chip.submitted_count_of(CommandKind::SetVolume), 1);
    }

    #[tokio::test]
    async fn completion_reopens_the_single_flight_gate() {
        let (receiver, chip) = make_enabled().await;
        receiver
            .system_volume_changed(&admin(), AudioStream::Media, 10)
            .await
            .unwrap();
        chip.inject(ChipEvent::CommandDone {
            status: ChipStatus::Success,
            kind: CommandKind::SetVolume,
            value: 0,
        });
        tokio::time::sleep(Duration::from_millis(10)).await;

        receiver
            .system_volume_changed(&admin(), AudioStream::Media, 5)
            .await
            .unwrap();
        assert_eq!(chip.submitted_count_of(CommandKind::SetVolume), 2);
    }

    #[tokio::test]
    async fn non_media_streams_are_ignored() {
        let (receiver, chip) = make_enabled().await;
        receiver
            .system_volume_changed(&admin(), AudioStream::Ring, 10)
            .await
            .unwrap();
        assert_eq!(chip.submitted_count_of(CommandKind::SetVolume), 0);
    }

    #[tokio::test]
    async fn volume_ignored_when_not_enabled() {
        let (chip, events) = MockChip::new();
        let receiver = FmReceiverBuilder::new()
            .build(Arc::new(chip.clone()), events)
            .unwrap();
        receiver
            .system_volume_changed(&admin(), AudioStream::Media, 10)
            .await
            .unwrap();
        assert_eq!(chip.submitted_count(), 0);
    }

    #[tokio::test]
    async fn restore_pass_respects_single_flight() {
        let (receiver, chip) = make_enabled().await;
        receiver
            .system_volume_changed(&admin(), AudioStream::Media, 10)
            .await
            .unwrap();
        // The forced pass is still dropped while the write pends.
        receiver
            .restore_system_volume(&admin(), 12)
            .await
            .unwrap();
        assert_eq!(chip.submitted_count_of(CommandKind::SetVolume), 1);
    }

    #[tokio::test]
    async fn rejected_write_clears_pending_flag() {
        let (receiver, chip) = make_enabled().await;
        chip.ack(CommandKind::SetVolume, ChipStatus::Failed);
        let err = receiver
            .system_volume_changed(&admin(), AudioStream::Media, 10)
            .await
            .unwrap_err();
        assert!(matches!(err, fmtuner_core::Error::HardwareRejected(_)));

        // The gate reopened; the next notification goes through.
        chip.ack(CommandKind::SetVolume, ChipStatus::Pending);
        receiver
            .system_volume_changed(&admin(), AudioStream::Media, 5)
            .await
            .unwrap();
        assert_eq!(chip.submitted_count_of(CommandKind::SetVolume), 2);
    }
}
