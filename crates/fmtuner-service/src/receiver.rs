//! The tuner dispatcher.
//!
//! [`FmReceiver`] is the single entry point for controlling the tuner.
//! Every operation checks the caller's capability, the lifecycle state,
//! and the busy flags before touching the hardware; bridged operations
//! then block on their completion slot for at most the configured
//! timeout. All frequencies are in kHz.

use std::sync::Mutex;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use fmtuner_core::chip::{ChipCommand, ChipStatus, CommandKind};
use fmtuner_core::error::{Error, Result};
use fmtuner_core::events::TunerEvent;
use fmtuner_core::types::{
    Band, Caller, Capability, ChannelSpacing, EmphasisFilter, MonoStereoMode, MuteMode,
    RdsAfSwitchMode, RdsSystem, RfDependentMute, ScanProgress, SeekDirection, StopScanOutcome,
    TunerState,
};

use crate::power;
use crate::state::Inner;

/// The tuner control core.
///
/// Construct through [`FmReceiverBuilder`](crate::FmReceiverBuilder).
/// Methods take `&self` and may be called concurrently; commands of the
/// same kind are serialized through their completion slot, and the three
/// busy flags keep tune, seek, and scan mutually exclusive.
pub struct FmReceiver {
    pub(crate) inner: std::sync::Arc<Inner>,
    pub(crate) pump: Mutex<Option<JoinHandle<()>>>,
}

impl FmReceiver {
    // -------------------------------------------------------------------
    // Admission helpers
    // -------------------------------------------------------------------

    pub(crate) fn require(
        &self,
        caller: &Caller,
        needed: Capability,
        op: &'static str,
    ) -> Result<()> {
        if caller.allows(needed) {
            Ok(())
        } else {
            warn!(caller = caller.name(), op, "capability check failed");
            Err(Error::PermissionDenied(format!(
                "{op} requires {needed} capability (caller {})",
                caller.name()
            )))
        }
    }

    /// Require `Enabled` and all three busy flags clear.
    fn admit_settings(&self) -> Result<()> {
        let shared = self.inner.shared.lock().unwrap();
        if shared.state != TunerState::Enabled {
            return Err(Error::NotEnabled(shared.state));
        }
        if shared.tuning {
            return Err(Error::Busy("tune in progress".into()));
        }
        if shared.seeking {
            return Err(Error::Busy("seek in progress".into()));
        }
        if shared.scanning {
            return Err(Error::Busy("scan in progress".into()));
        }
        Ok(())
    }

    fn check_enabled(&self) -> Result<()> {
        let shared = self.inner.shared.lock().unwrap();
        if shared.state != TunerState::Enabled {
            Err(Error::NotEnabled(shared.state))
        } else {
            Ok(())
        }
    }

    /// Issue a bridged command and wait for its completion token.
    async fn bridged(
        &self,
        caller: &Caller,
        needed: Capability,
        op: &'static str,
        cmd: ChipCommand,
    ) -> Result<ChipStatus> {
        self.require(caller, needed, op)?;
        self.admit_settings()?;

        let mut slot = self.inner.bridge.acquire(cmd.kind()).await?;
        debug!(op, "issuing command");
        let ack = self.inner.chip.submit(cmd).await;
        if ack != ChipStatus::Pending {
            warn!(op, %ack, "command rejected at submission");
            return Err(Error::HardwareRejected(ack));
        }
        slot.wait(self.inner.command_timeout).await
    }

    // -------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------

    /// Power the tuner up.
    ///
    /// Legal in `Disabled`, or while a power-down is still inside its
    /// delay window, in which case the scheduled power-down is cancelled
    /// and the hardware stays up. Releases a held wake lock before
    /// touching the chip; the transition to `Enabled` arrives with the
    /// chip completion and is broadcast as [`TunerEvent::Enabled`].
    pub async fn enable(&self, caller: &Caller) -> Result<()> {
        self.require(caller, Capability::Admin, "enable")?;
        let cancel_power_down = {
            let mut shared = self.inner.shared.lock().unwrap();
            if shared.state == TunerState::Enabled && shared.power_down_pending {
                shared.power_down_pending = false;
                true
            } else if shared.state != TunerState::Disabled {
                return Err(Error::NotEnabled(shared.state));
            } else {
                shared.power_down_pending = false;
                // The transitional state must be visible before the chip
                // can deliver the completion, or the pump drops it.
                shared.state = TunerState::Enabling;
                false
            }
        };

        if let Some(handle) = self.inner.power_down_task.lock().unwrap().take() {
            handle.abort();
            debug!("cancelled pending power-down");
        }
        if self.inner.wake_lock.is_held() {
            self.inner.wake_lock.release();
        }
        // A quick re-enable inside the delay window keeps the hardware up;
        // no chip round trip is needed.
        if cancel_power_down {
            return Ok(());
        }

        debug!("enabling tuner");
        let ack = self.inner.chip.submit(ChipCommand::Enable).await;
        if ack != ChipStatus::Pending {
            let mut shared = self.inner.shared.lock().unwrap();
            if shared.state == TunerState::Enabling {
                shared.state = TunerState::Disabled;
            }
            warn!(%ack, "enable rejected at submission");
            return Err(Error::HardwareRejected(ack));
        }
        Ok(())
    }

    /// Schedule the delayed power-down ending in `Disabled`.
    pub fn disable(&self, caller: &Caller) -> Result<()> {
        self.schedule_power_down(caller, "disable", TunerState::Disabled)
    }

    /// Schedule the delayed power-down ending in `Pause`.
    ///
    /// `Pause` is left only by an explicit [`resume()`](Self::resume).
    pub fn pause(&self, caller: &Caller) -> Result<()> {
        self.schedule_power_down(caller, "pause", TunerState::Pause)
    }

    fn schedule_power_down(
        &self,
        caller: &Caller,
        op: &'static str,
        target: TunerState,
    ) -> Result<()> {
        self.require(caller, Capability::Admin, op)?;
        {
            let mut shared = self.inner.shared.lock().unwrap();
            if shared.state != TunerState::Enabled {
                return Err(Error::NotEnabled(shared.state));
            }
            if shared.power_down_pending {
                return Err(Error::Busy("power-down already scheduled".into()));
            }
            shared.power_down_pending = true;
        }

        self.inner.wake_lock.acquire();
        debug!(op, delay_ms = self.inner.power_down_delay.as_millis() as u64, "power-down scheduled");
        let handle = power::spawn_power_down(self.inner.clone(), target);
        *self.inner.power_down_task.lock().unwrap() = Some(handle);
        Ok(())
    }

    /// Power the tuner back up from `Pause`.
    pub async fn resume(&self, caller: &Caller) -> Result<()> {
        self.require(caller, Capability::Admin, "resume")?;
        {
            let mut shared = self.inner.shared.lock().unwrap();
            if shared.state != TunerState::Pause {
                return Err(Error::NotEnabled(shared.state));
            }
            shared.state = TunerState::Resume;
        }

        debug!("resuming tuner");
        let ack = self.inner.chip.submit(ChipCommand::Enable).await;
        if ack != ChipStatus::Pending {
            let mut shared = self.inner.shared.lock().unwrap();
            if shared.state == TunerState::Resume {
                shared.state = TunerState::Pause;
            }
            warn!(%ack, "resume rejected at submission");
            return Err(Error::HardwareRejected(ack));
        }
        Ok(())
    }

    /// Stop background tasks and return the state machine to `Default`.
    pub fn destroy(&self, caller: &Caller) -> Result<()> {
        self.require(caller, Capability::Admin, "destroy")?;
        debug!("destroying control core");
        if let Some(handle) = self.inner.power_down_task.lock().unwrap().take() {
            handle.abort();
        }
        if let Some(handle) = self.pump.lock().unwrap().take() {
            handle.abort();
        }
        if self.inner.wake_lock.is_held() {
            self.inner.wake_lock.release();
        }
        self.inner.shared.lock().unwrap().state = TunerState::Default;
        Ok(())
    }

    /// Current lifecycle state.
    pub fn state(&self) -> TunerState {
        self.inner.shared.lock().unwrap().state
    }

    /// Whether the tuner is fully operational.
    pub fn is_enabled(&self) -> bool {
        self.state() == TunerState::Enabled
    }

    /// Subscribe to tuner events.
    pub fn subscribe(&self) -> broadcast::Receiver<TunerEvent> {
        self.event_tx().subscribe()
    }

    fn event_tx(&self) -> &broadcast::Sender<TunerEvent> {
        &self.inner.event_tx
    }

    // -------------------------------------------------------------------
    // Settings
    // -------------------------------------------------------------------

    /// Select the broadcast band.
    pub async fn set_band(&self, caller: &Caller, band: Band) -> Result<()> {
        self.bridged(caller, Capability::Admin, "set_band", ChipCommand::SetBand(band))
            .await?;
        let mut shared = self.inner.shared.lock().unwrap();
        shared.band = band;
        shared.cache.band = band;
        Ok(())
    }

    /// Read the current band.
    pub async fn get_band(&self, caller: &Caller) -> Result<Band> {
        self.bridged(caller, Capability::Read, "get_band", ChipCommand::GetBand)
            .await?;
        Ok(self.inner.shared.lock().unwrap().cache.band)
    }

    /// Force mono or allow stereo reception.
    pub async fn set_mono_stereo_mode(&self, caller: &Caller, mode: MonoStereoMode) -> Result<()> {
        self.bridged(
            caller,
            Capability::Admin,
            "set_mono_stereo_mode",
            ChipCommand::SetMonoStereoMode(mode),
        )
        .await?;
        self.inner.shared.lock().unwrap().cache.mono_stereo = mode;
        Ok(())
    }

    /// Read the mono/stereo mode.
    pub async fn get_mono_stereo_mode(&self, caller: &Caller) -> Result<MonoStereoMode> {
        self.bridged(
            caller,
            Capability::Read,
            "get_mono_stereo_mode",
            ChipCommand::GetMonoStereoMode,
        )
        .await?;
        Ok(self.inner.shared.lock().unwrap().cache.mono_stereo)
    }

    /// Set the mute behavior.
    pub async fn set_mute_mode(&self, caller: &Caller, mode: MuteMode) -> Result<()> {
        self.bridged(
            caller,
            Capability::Admin,
            "set_mute_mode",
            ChipCommand::SetMuteMode(mode),
        )
        .await?;
        self.inner.shared.lock().unwrap().cache.mute = mode;
        Ok(())
    }

    /// Read the mute behavior.
    pub async fn get_mute_mode(&self, caller: &Caller) -> Result<MuteMode> {
        self.bridged(
            caller,
            Capability::Read,
            "get_mute_mode",
            ChipCommand::GetMuteMode,
        )
        .await?;
        Ok(self.inner.shared.lock().unwrap().cache.mute)
    }

    /// Enable or disable RF-dependent muting.
    pub async fn set_rf_dependent_mute(
        &self,
        caller: &Caller,
        mode: RfDependentMute,
    ) -> Result<()> {
        self.bridged(
            caller,
            Capability::Admin,
            "set_rf_dependent_mute",
            ChipCommand::SetRfDependentMute(mode),
        )
        .await?;
        self.inner.shared.lock().unwrap().cache.rf_mute = mode;
        Ok(())
    }

    /// Read the RF-dependent mute setting.
    pub async fn get_rf_dependent_mute(&self, caller: &Caller) -> Result<RfDependentMute> {
        self.bridged(
            caller,
            Capability::Read,
            "get_rf_dependent_mute",
            ChipCommand::GetRfDependentMute,
        )
        .await?;
        Ok(self.inner.shared.lock().unwrap().cache.rf_mute)
    }

    /// Set the RSSI threshold used by seek and AF switching.
    pub async fn set_rssi_threshold(&self, caller: &Caller, threshold: i32) -> Result<()> {
        self.bridged(
            caller,
            Capability::Admin,
            "set_rssi_threshold",
            ChipCommand::SetRssiThreshold(threshold),
        )
        .await?;
        self.inner.shared.lock().unwrap().cache.rssi_threshold = threshold;
        Ok(())
    }

    /// Read the RSSI threshold.
    pub async fn get_rssi_threshold(&self, caller: &Caller) -> Result<i32> {
        self.bridged(
            caller,
            Capability::Read,
            "get_rssi_threshold",
            ChipCommand::GetRssiThreshold,
        )
        .await?;
        Ok(self.inner.shared.lock().unwrap().cache.rssi_threshold)
    }

    /// Read the current signal strength.
    pub async fn get_rssi(&self, caller: &Caller) -> Result<i32> {
        self.bridged(caller, Capability::Read, "get_rssi", ChipCommand::GetRssi)
            .await?;
        Ok(self.inner.shared.lock().unwrap().cache.rssi)
    }

    /// Select the de-emphasis filter.
    pub async fn set_de_emphasis_filter(
        &self,
        caller: &Caller,
        filter: EmphasisFilter,
    ) -> Result<()> {
        self.bridged(
            caller,
            Capability::Admin,
            "set_de_emphasis_filter",
            ChipCommand::SetDeEmphasisFilter(filter),
        )
        .await?;
        self.inner.shared.lock().unwrap().cache.emphasis = filter;
        Ok(())
    }

    /// Read the de-emphasis filter.
    pub async fn get_de_emphasis_filter(&self, caller: &Caller) -> Result<EmphasisFilter> {
        self.bridged(
            caller,
            Capability::Read,
            "get_de_emphasis_filter",
            ChipCommand::GetDeEmphasisFilter,
        )
        .await?;
        Ok(self.inner.shared.lock().unwrap().cache.emphasis)
    }

    /// Select the seek/scan channel spacing.
    pub async fn set_channel_spacing(&self, caller: &Caller, spacing: ChannelSpacing) -> Result<()> {
        self.bridged(
            caller,
            Capability::Admin,
            "set_channel_spacing",
            ChipCommand::SetChannelSpacing(spacing),
        )
        .await?;
        self.inner.shared.lock().unwrap().cache.spacing = spacing;
        Ok(())
    }

    /// Read the channel spacing.
    pub async fn get_channel_spacing(&self, caller: &Caller) -> Result<ChannelSpacing> {
        self.bridged(
            caller,
            Capability::Read,
            "get_channel_spacing",
            ChipCommand::GetChannelSpacing,
        )
        .await?;
        Ok(self.inner.shared.lock().unwrap().cache.spacing)
    }

    // -------------------------------------------------------------------
    // Tune, seek, scan
    // -------------------------------------------------------------------

    /// Tune to `frequency_khz`.
    ///
    /// The frequency must lie within the current band. Blocks until the
    /// tune completion arrives or the timeout elapses; the completion is
    /// also broadcast as [`TunerEvent::TuneComplete`].
    pub async fn tune(&self, caller: &Caller, frequency_khz: u32) -> Result<()> {
        self.require(caller, Capability::Admin, "tune")?;
        let mut slot = self.inner.bridge.acquire(CommandKind::Tune).await?;
        {
            let mut shared = self.inner.shared.lock().unwrap();
            if shared.state != TunerState::Enabled {
                return Err(Error::NotEnabled(shared.state));
            }
            if shared.tuning || shared.seeking || shared.scanning {
                return Err(Error::Busy("exclusive operation in progress".into()));
            }
            if !shared.band.contains(frequency_khz) {
                return Err(Error::InvalidArgument(format!(
                    "frequency {frequency_khz} kHz outside band {}",
                    shared.band
                )));
            }
            shared.tuning = true;
            // The frequency is recorded by the completion, not here; a
            // rejected submit must not leave a frequency that was never
            // tuned.
        }

        debug!(frequency_khz, "tuning");
        let ack = self
            .inner
            .chip
            .submit(ChipCommand::Tune { frequency_khz })
            .await;
        if ack != ChipStatus::Pending {
            self.inner.shared.lock().unwrap().tuning = false;
            warn!(%ack, "tune rejected at submission");
            return Err(Error::HardwareRejected(ack));
        }
        // A timeout here leaves the flag set; only the completion event
        // ever clears it.
        slot.wait(self.inner.command_timeout).await?;
        Ok(())
    }

    /// Read the tuned frequency, in kHz.
    pub async fn get_tuned_frequency(&self, caller: &Caller) -> Result<u32> {
        self.bridged(
            caller,
            Capability::Read,
            "get_tuned_frequency",
            ChipCommand::GetTunedFrequency,
        )
        .await?;
        Ok(self.inner.shared.lock().unwrap().cache.tuned_frequency_khz)
    }

    /// Seek to the next station in `direction`.
    pub async fn seek(&self, caller: &Caller, direction: SeekDirection) -> Result<()> {
        self.require(caller, Capability::Admin, "seek")?;
        let mut slot = self.inner.bridge.acquire(CommandKind::Seek).await?;
        {
            let mut shared = self.inner.shared.lock().unwrap();
            if shared.state != TunerState::Enabled {
                return Err(Error::NotEnabled(shared.state));
            }
            if shared.tuning || shared.seeking || shared.scanning {
                return Err(Error::Busy("exclusive operation in progress".into()));
            }
            shared.seeking = true;
        }

        debug!(?direction, "seeking");
        let ack = self.inner.chip.submit(ChipCommand::Seek { direction }).await;
        if ack != ChipStatus::Pending {
            self.inner.shared.lock().unwrap().seeking = false;
            warn!(%ack, "seek rejected at submission");
            return Err(Error::HardwareRejected(ack));
        }
        slot.wait(self.inner.command_timeout).await?;
        Ok(())
    }

    /// Abort a running seek.
    ///
    /// Legal while a seek is in flight; rejected while a tune or scan is.
    pub async fn stop_seek(&self, caller: &Caller) -> Result<()> {
        self.require(caller, Capability::Admin, "stop_seek")?;
        {
            let shared = self.inner.shared.lock().unwrap();
            if shared.state != TunerState::Enabled {
                return Err(Error::NotEnabled(shared.state));
            }
            if shared.tuning {
                return Err(Error::Busy("tune in progress".into()));
            }
            if shared.scanning {
                return Err(Error::Busy("scan in progress".into()));
            }
        }

        let mut slot = self.inner.bridge.acquire(CommandKind::StopSeek).await?;
        debug!("stopping seek");
        let ack = self.inner.chip.submit(ChipCommand::StopSeek).await;
        if ack != ChipStatus::Pending {
            warn!(%ack, "stop-seek rejected at submission");
            return Err(Error::HardwareRejected(ack));
        }
        slot.wait(self.inner.command_timeout).await?;
        Ok(())
    }

    /// Start a full-band scan.
    ///
    /// Fire-and-forget: returns as soon as the hardware accepts the
    /// scan. The result list arrives as [`TunerEvent::ScanDone`].
    pub async fn complete_scan(&self, caller: &Caller) -> Result<()> {
        self.require(caller, Capability::Admin, "complete_scan")?;
        {
            let mut shared = self.inner.shared.lock().unwrap();
            if shared.state != TunerState::Enabled {
                return Err(Error::NotEnabled(shared.state));
            }
            if shared.tuning || shared.seeking || shared.scanning {
                return Err(Error::Busy("exclusive operation in progress".into()));
            }
            shared.scanning = true;
        }

        // A token from a previous scan's natural end must not release
        // the next stop-scan caller.
        self.inner.bridge.drain(CommandKind::StopCompleteScan).await;

        debug!("starting full-band scan");
        let ack = self.inner.chip.submit(ChipCommand::CompleteScan).await;
        if ack != ChipStatus::Pending {
            self.inner.shared.lock().unwrap().scanning = false;
            warn!(%ack, "scan rejected at submission");
            return Err(Error::HardwareRejected(ack));
        }
        Ok(())
    }

    /// Abort a running full-band scan.
    ///
    /// Returns [`StopScanOutcome::NotInProgress`] without waiting when
    /// the hardware reports no scan is running; that is a distinct
    /// outcome, not an error.
    pub async fn stop_complete_scan(&self, caller: &Caller) -> Result<StopScanOutcome> {
        self.require(caller, Capability::Admin, "stop_complete_scan")?;
        {
            let shared = self.inner.shared.lock().unwrap();
            if shared.state != TunerState::Enabled {
                return Err(Error::NotEnabled(shared.state));
            }
            if shared.tuning {
                return Err(Error::Busy("tune in progress".into()));
            }
            if shared.seeking {
                return Err(Error::Busy("seek in progress".into()));
            }
        }

        let mut slot = self
            .inner
            .bridge
            .acquire(CommandKind::StopCompleteScan)
            .await?;
        debug!("stopping scan");
        let ack = self.inner.chip.submit(ChipCommand::StopCompleteScan).await;
        match ack {
            ChipStatus::ScanNotInProgress => {
                debug!("no scan in progress");
                Ok(StopScanOutcome::NotInProgress)
            }
            ChipStatus::Pending => {
                slot.wait(self.inner.command_timeout).await?;
                Ok(StopScanOutcome::Stopped)
            }
            other => {
                warn!(ack = %other, "stop-scan rejected at submission");
                Err(Error::HardwareRejected(other))
            }
        }
    }

    /// Query the frequency a running scan is currently examining.
    ///
    /// Allowed while a scan is in flight.
    pub async fn get_complete_scan_progress(&self, caller: &Caller) -> Result<ScanProgress> {
        self.require(caller, Capability::Read, "get_complete_scan_progress")?;
        {
            let shared = self.inner.shared.lock().unwrap();
            if shared.state != TunerState::Enabled {
                return Err(Error::NotEnabled(shared.state));
            }
            if shared.tuning {
                return Err(Error::Busy("tune in progress".into()));
            }
            if shared.seeking {
                return Err(Error::Busy("seek in progress".into()));
            }
        }

        let mut slot = self
            .inner
            .bridge
            .acquire(CommandKind::GetCompleteScanProgress)
            .await?;
        let ack = self
            .inner
            .chip
            .submit(ChipCommand::GetCompleteScanProgress)
            .await;
        match ack {
            ChipStatus::ScanNotInProgress => Ok(ScanProgress::NotInProgress),
            ChipStatus::Pending => {
                slot.wait(self.inner.command_timeout).await?;
                Ok(ScanProgress::AtFrequency(
                    self.inner.shared.lock().unwrap().cache.scan_progress_khz,
                ))
            }
            other => {
                warn!(ack = %other, "scan-progress query rejected at submission");
                Err(Error::HardwareRejected(other))
            }
        }
    }

    // -------------------------------------------------------------------
    // RDS
    // -------------------------------------------------------------------

    /// Turn RDS reception on.
    pub async fn enable_rds(&self, caller: &Caller) -> Result<()> {
        self.bridged(caller, Capability::Admin, "enable_rds", ChipCommand::EnableRds)
            .await?;
        Ok(())
    }

    /// Turn RDS reception off.
    pub async fn disable_rds(&self, caller: &Caller) -> Result<()> {
        self.bridged(
            caller,
            Capability::Admin,
            "disable_rds",
            ChipCommand::DisableRds,
        )
        .await?;
        Ok(())
    }

    /// Select the RDS decoding standard.
    pub async fn set_rds_system(&self, caller: &Caller, system: RdsSystem) -> Result<()> {
        self.bridged(
            caller,
            Capability::Admin,
            "set_rds_system",
            ChipCommand::SetRdsSystem(system),
        )
        .await?;
        self.inner.shared.lock().unwrap().cache.rds_system = system;
        Ok(())
    }

    /// Read the RDS decoding standard.
    pub async fn get_rds_system(&self, caller: &Caller) -> Result<RdsSystem> {
        self.bridged(
            caller,
            Capability::Read,
            "get_rds_system",
            ChipCommand::GetRdsSystem,
        )
        .await?;
        Ok(self.inner.shared.lock().unwrap().cache.rds_system)
    }

    /// Select which RDS group types the driver forwards.
    pub async fn set_rds_group_mask(&self, caller: &Caller, mask: u64) -> Result<()> {
        self.bridged(
            caller,
            Capability::Admin,
            "set_rds_group_mask",
            ChipCommand::SetRdsGroupMask { mask },
        )
        .await?;
        self.inner.shared.lock().unwrap().cache.rds_group_mask = mask;
        Ok(())
    }

    /// Read the RDS group mask.
    pub async fn get_rds_group_mask(&self, caller: &Caller) -> Result<u64> {
        self.bridged(
            caller,
            Capability::Read,
            "get_rds_group_mask",
            ChipCommand::GetRdsGroupMask,
        )
        .await?;
        Ok(self.inner.shared.lock().unwrap().cache.rds_group_mask)
    }

    /// Enable or disable automatic alternate-frequency switching.
    pub async fn set_rds_af_switch_mode(
        &self,
        caller: &Caller,
        mode: RdsAfSwitchMode,
    ) -> Result<()> {
        self.bridged(
            caller,
            Capability::Admin,
            "set_rds_af_switch_mode",
            ChipCommand::SetRdsAfSwitchMode(mode),
        )
        .await?;
        self.inner.shared.lock().unwrap().cache.rds_af_switch = mode;
        Ok(())
    }

    /// Read the AF switch mode.
    pub async fn get_rds_af_switch_mode(&self, caller: &Caller) -> Result<RdsAfSwitchMode> {
        self.bridged(
            caller,
            Capability::Read,
            "get_rds_af_switch_mode",
            ChipCommand::GetRdsAfSwitchMode,
        )
        .await?;
        Ok(self.inner.shared.lock().unwrap().cache.rds_af_switch)
    }

    // -------------------------------------------------------------------
    // Channel queries
    // -------------------------------------------------------------------

    /// Whether the tuned frequency carries a valid station.
    pub async fn is_valid_channel(&self, caller: &Caller) -> Result<bool> {
        self.bridged(
            caller,
            Capability::Read,
            "is_valid_channel",
            ChipCommand::IsValidChannel,
        )
        .await?;
        Ok(self.inner.shared.lock().unwrap().cache.valid_channel)
    }

    /// Read the firmware version.
    ///
    /// Not gated on the lifecycle state; the chip answers this whenever
    /// it is responsive.
    pub async fn get_fw_version(&self, caller: &Caller) -> Result<f64> {
        self.require(caller, Capability::Read, "get_fw_version")?;
        let mut slot = self.inner.bridge.acquire(CommandKind::GetFwVersion).await?;
        let ack = self.inner.chip.submit(ChipCommand::GetFwVersion).await;
        if ack != ChipStatus::Pending {
            warn!(%ack, "firmware version query rejected at submission");
            return Err(Error::HardwareRejected(ack));
        }
        slot.wait(self.inner.command_timeout).await?;
        Ok(self.inner.shared.lock().unwrap().cache.fw_version)
    }

    // -------------------------------------------------------------------
    // Audio routing
    // -------------------------------------------------------------------

    /// Redirect the audio output target. Fire-and-forget.
    pub async fn change_audio_target(
        &self,
        caller: &Caller,
        mask: u32,
        sample_frequency_hz: u32,
    ) -> Result<()> {
        self.require(caller, Capability::Admin, "change_audio_target")?;
        self.check_enabled()?;
        let ack = self
            .inner
            .chip
            .submit(ChipCommand::ChangeAudioTarget {
                mask,
                sample_frequency_hz,
            })
            .await;
        if ack != ChipStatus::Pending {
            warn!(%ack, "audio target change rejected at submission");
            return Err(Error::HardwareRejected(ack));
        }
        Ok(())
    }

    /// Reconfigure the digital audio output. Fire-and-forget.
    pub async fn change_digital_target_configuration(
        &self,
        caller: &Caller,
        sample_frequency_hz: u32,
    ) -> Result<()> {
        self.require(caller, Capability::Admin, "change_digital_target_configuration")?;
        self.check_enabled()?;
        let ack = self
            .inner
            .chip
            .submit(ChipCommand::ChangeDigitalTargetConfiguration { sample_frequency_hz })
            .await;
        if ack != ChipStatus::Pending {
            warn!(%ack, "digital target change rejected at submission");
            return Err(Error::HardwareRejected(ack));
        }
        Ok(())
    }

    /// Connect the tuner audio path.
    ///
    /// Hardware revisions without the routing capability ack
    /// `NotSupported`; contemporary clients expect that to read as
    /// success, so it does.
    pub async fn enable_audio_routing(&self, caller: &Caller) -> Result<()> {
        self.audio_routing(caller, "enable_audio_routing", ChipCommand::EnableAudioRouting)
            .await
    }

    /// Disconnect the tuner audio path. Same `NotSupported` contract as
    /// [`enable_audio_routing()`](Self::enable_audio_routing).
    pub async fn disable_audio_routing(&self, caller: &Caller) -> Result<()> {
        self.audio_routing(caller, "disable_audio_routing", ChipCommand::DisableAudioRouting)
            .await
    }

    async fn audio_routing(
        &self,
        caller: &Caller,
        op: &'static str,
        cmd: ChipCommand,
    ) -> Result<()> {
        self.require(caller, Capability::Admin, op)?;
        self.check_enabled()?;
        let ack = self.inner.chip.submit(cmd).await;
        match ack {
            ChipStatus::NotSupported => {
                debug!(op, "audio routing not present in this hardware revision; reporting success");
                Ok(())
            }
            ChipStatus::Pending | ChipStatus::Success => Ok(()),
            other => {
                warn!(op, ack = %other, "audio routing rejected at submission");
                Err(Error::HardwareRejected(other))
            }
        }
    }
}

impl Drop for FmReceiver {
    fn drop(&mut self) {
        if let Some(handle) = self.inner.power_down_task.lock().unwrap().take() {
            handle.abort();
        }
        if let Some(handle) = self.pump.lock().unwrap().take() {
            handle.abort();
        }
    }
}
