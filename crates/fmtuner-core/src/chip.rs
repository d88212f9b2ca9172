//! The hardware bridge: commands, statuses, and events crossing the
//! boundary between the control core and the tuner chip driver.
//!
//! The driver is modeled as an asynchronous command sink ([`FmChip`]) that
//! acknowledges every submission immediately with a [`ChipStatus`], plus a
//! stream of [`ChipEvent`]s delivering command completions and unsolicited
//! indications (RDS data, scan results) some time later. A well-behaved
//! driver acks a command it accepted with [`ChipStatus::Pending`] and
//! follows up with a matching [`ChipEvent::CommandDone`].

use std::fmt;

use async_trait::async_trait;

use crate::types::{
    Band, ChannelSpacing, EmphasisFilter, MonoStereoMode, MuteMode, RdsAfSwitchMode, RdsSystem,
    RfDependentMute, SeekDirection,
};

/// Status code used both as the immediate ack of a submission and as the
/// status of a later completion event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChipStatus {
    /// The command completed synchronously.
    Success,
    /// The command was accepted; a completion event will follow.
    Pending,
    /// The command failed.
    Failed,
    /// The capability is not present in this hardware or firmware revision.
    NotSupported,
    /// The driver context is missing (chip not initialized).
    ContextMissing,
    /// A scan-related command was issued while no scan is in progress.
    ScanNotInProgress,
    /// The driver rejected a command parameter.
    InvalidParameter,
}

impl fmt::Display for ChipStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ChipStatus::Success => "success",
            ChipStatus::Pending => "pending",
            ChipStatus::Failed => "failed",
            ChipStatus::NotSupported => "not supported",
            ChipStatus::ContextMissing => "context missing",
            ChipStatus::ScanNotInProgress => "scan not in progress",
            ChipStatus::InvalidParameter => "invalid parameter",
        };
        write!(f, "{s}")
    }
}

/// A command submitted to the tuner chip driver.
#[derive(Debug, Clone, PartialEq)]
pub enum ChipCommand {
    /// Power the tuner up.
    Enable,
    /// Power the tuner down.
    Disable,
    /// Select the broadcast band.
    SetBand(Band),
    /// Read the current band.
    GetBand,
    /// Force mono or allow stereo reception.
    SetMonoStereoMode(MonoStereoMode),
    /// Read the mono/stereo mode.
    GetMonoStereoMode,
    /// Set the mute behavior.
    SetMuteMode(MuteMode),
    /// Read the mute behavior.
    GetMuteMode,
    /// Enable or disable RF-dependent muting.
    SetRfDependentMute(RfDependentMute),
    /// Read the RF-dependent mute setting.
    GetRfDependentMute,
    /// Set the RSSI threshold used by seek and AF switching.
    SetRssiThreshold(i32),
    /// Read the RSSI threshold.
    GetRssiThreshold,
    /// Read the current signal strength.
    GetRssi,
    /// Select the de-emphasis filter.
    SetDeEmphasisFilter(EmphasisFilter),
    /// Read the de-emphasis filter.
    GetDeEmphasisFilter,
    /// Select the seek/scan channel spacing.
    SetChannelSpacing(ChannelSpacing),
    /// Read the channel spacing.
    GetChannelSpacing,
    /// Tune to a frequency, in kHz.
    Tune { frequency_khz: u32 },
    /// Read the tuned frequency.
    GetTunedFrequency,
    /// Seek to the next station in the given direction.
    Seek { direction: SeekDirection },
    /// Abort a running seek.
    StopSeek,
    /// Start a full-band scan.
    CompleteScan,
    /// Abort a running full-band scan.
    StopCompleteScan,
    /// Query the frequency a running scan is currently examining.
    GetCompleteScanProgress,
    /// Set the hardware volume (0..=70).
    SetVolume { level: u32 },
    /// Select the RDS decoding standard.
    SetRdsSystem(RdsSystem),
    /// Read the RDS decoding standard.
    GetRdsSystem,
    /// Turn RDS reception on.
    EnableRds,
    /// Turn RDS reception off.
    DisableRds,
    /// Select which RDS group types the driver forwards.
    SetRdsGroupMask { mask: u64 },
    /// Read the RDS group mask.
    GetRdsGroupMask,
    /// Enable or disable automatic alternate-frequency switching.
    SetRdsAfSwitchMode(RdsAfSwitchMode),
    /// Read the AF switch mode.
    GetRdsAfSwitchMode,
    /// Redirect the audio output target.
    ChangeAudioTarget { mask: u32, sample_frequency_hz: u32 },
    /// Reconfigure the digital audio output.
    ChangeDigitalTargetConfiguration { sample_frequency_hz: u32 },
    /// Connect the tuner audio path.
    EnableAudioRouting,
    /// Disconnect the tuner audio path.
    DisableAudioRouting,
    /// Ask whether the tuned frequency carries a valid station.
    IsValidChannel,
    /// Read the firmware version (raw value is version x 1000).
    GetFwVersion,
}

impl ChipCommand {
    /// The field-less kind of this command, used to route completions.
    pub fn kind(&self) -> CommandKind {
        match self {
            ChipCommand::Enable => CommandKind::Enable,
            ChipCommand::Disable => CommandKind::Disable,
            ChipCommand::SetBand(_) => CommandKind::SetBand,
            ChipCommand::GetBand => CommandKind::GetBand,
            ChipCommand::SetMonoStereoMode(_) => CommandKind::SetMonoStereoMode,
            ChipCommand::GetMonoStereoMode => CommandKind::GetMonoStereoMode,
            ChipCommand::SetMuteMode(_) => CommandKind::SetMuteMode,
            ChipCommand::GetMuteMode => CommandKind::GetMuteMode,
            ChipCommand::SetRfDependentMute(_) => CommandKind::SetRfDependentMute,
            ChipCommand::GetRfDependentMute => CommandKind::GetRfDependentMute,
            ChipCommand::SetRssiThreshold(_) => CommandKind::SetRssiThreshold,
            ChipCommand::GetRssiThreshold => CommandKind::GetRssiThreshold,
            ChipCommand::GetRssi => CommandKind::GetRssi,
            ChipCommand::SetDeEmphasisFilter(_) => CommandKind::SetDeEmphasisFilter,
            ChipCommand::GetDeEmphasisFilter => CommandKind::GetDeEmphasisFilter,
            ChipCommand::SetChannelSpacing(_) => CommandKind::SetChannelSpacing,
            ChipCommand::GetChannelSpacing => CommandKind::GetChannelSpacing,
            ChipCommand::Tune { .. } => CommandKind::Tune,
            ChipCommand::GetTunedFrequency => CommandKind::GetTunedFrequency,
            ChipCommand::Seek { .. } => CommandKind::Seek,
            ChipCommand::StopSeek => CommandKind::StopSeek,
            ChipCommand::CompleteScan => CommandKind::CompleteScan,
            ChipCommand::StopCompleteScan => CommandKind::StopCompleteScan,
            ChipCommand::GetCompleteScanProgress => CommandKind::GetCompleteScanProgress,
            ChipCommand::SetVolume { .. } => CommandKind::SetVolume,
            ChipCommand::SetRdsSystem(_) => CommandKind::SetRdsSystem,
            ChipCommand::GetRdsSystem => CommandKind::GetRdsSystem,
            ChipCommand::EnableRds => CommandKind::EnableRds,
            ChipCommand::DisableRds => CommandKind::DisableRds,
            ChipCommand::SetRdsGroupMask { .. } => CommandKind::SetRdsGroupMask,
            ChipCommand::GetRdsGroupMask => CommandKind::GetRdsGroupMask,
            ChipCommand::SetRdsAfSwitchMode(_) => CommandKind::SetRdsAfSwitchMode,
            ChipCommand::GetRdsAfSwitchMode => CommandKind::GetRdsAfSwitchMode,
            ChipCommand::ChangeAudioTarget { .. } => CommandKind::ChangeAudioTarget,
            ChipCommand::ChangeDigitalTargetConfiguration { .. } => {
                CommandKind::ChangeDigitalTargetConfiguration
            }
            ChipCommand::EnableAudioRouting => CommandKind::EnableAudioRouting,
            ChipCommand::DisableAudioRouting => CommandKind::DisableAudioRouting,
            ChipCommand::IsValidChannel => CommandKind::IsValidChannel,
            ChipCommand::GetFwVersion => CommandKind::GetFwVersion,
        }
    }
}

/// Field-less identifier of a [`ChipCommand`], used to pair completion
/// events with waiting callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum CommandKind {
    Enable,
    Disable,
    SetBand,
    GetBand,
    SetMonoStereoMode,
    GetMonoStereoMode,
    SetMuteMode,
    GetMuteMode,
    SetRfDependentMute,
    GetRfDependentMute,
    SetRssiThreshold,
    GetRssiThreshold,
    GetRssi,
    SetDeEmphasisFilter,
    GetDeEmphasisFilter,
    SetChannelSpacing,
    GetChannelSpacing,
    Tune,
    GetTunedFrequency,
    Seek,
    StopSeek,
    CompleteScan,
    StopCompleteScan,
    GetCompleteScanProgress,
    SetVolume,
    SetRdsSystem,
    GetRdsSystem,
    EnableRds,
    DisableRds,
    SetRdsGroupMask,
    GetRdsGroupMask,
    SetRdsAfSwitchMode,
    GetRdsAfSwitchMode,
    ChangeAudioTarget,
    ChangeDigitalTargetConfiguration,
    EnableAudioRouting,
    DisableAudioRouting,
    IsValidChannel,
    GetFwVersion,
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// An event delivered by the chip driver on its event channel.
#[derive(Debug, Clone)]
pub enum ChipEvent {
    /// A previously acked command finished.
    CommandDone {
        /// Completion status.
        status: ChipStatus,
        /// Which command kind completed.
        kind: CommandKind,
        /// Command-specific result value (frequency, raw setting code, ...).
        value: i64,
    },

    /// An RDS radio-text segment arrived.
    RadioText {
        /// Driver status for this indication.
        status: ChipStatus,
        /// Whether the display should be cleared before showing this text.
        reset_display: bool,
        /// Raw repertoire-encoded text bytes.
        text: Vec<u8>,
        /// Raw repertoire code the bytes are encoded in.
        repertoire: u8,
    },

    /// The RDS program-service name changed.
    PsChanged {
        /// Driver status for this indication.
        status: ChipStatus,
        /// Frequency the name belongs to, in kHz.
        frequency_khz: u32,
        /// Raw repertoire-encoded name bytes.
        name: Vec<u8>,
        /// Raw repertoire code the bytes are encoded in.
        repertoire: u8,
    },

    /// An RDS program-identification code was decoded.
    PiCodeChanged {
        /// Driver status for this indication.
        status: ChipStatus,
        /// The PI code.
        pi: u16,
    },

    /// The broadcast switched between mono and stereo.
    MonoStereoChanged {
        /// Driver status for this indication.
        status: ChipStatus,
        /// The new reception mode.
        mode: MonoStereoMode,
    },

    /// A full-band scan finished on its own.
    ScanDone {
        /// Driver status for the scan.
        status: ChipStatus,
        /// Frequencies of the stations found, in kHz.
        channels_khz: Vec<u32>,
    },

    /// The driver reported an asynchronous command failure.
    CommandError {
        /// The failure status.
        status: ChipStatus,
    },
}

/// The asynchronous bridge to the tuner chip driver.
///
/// `submit` returns the driver's immediate ack; accepted commands complete
/// later through the driver's [`ChipEvent`] channel. Implementations must
/// be cheap to call concurrently; the control core serializes commands of
/// the same kind but freely interleaves different kinds.
#[async_trait]
pub trait FmChip: Send + Sync {
    /// Submit a command and return the driver's immediate ack.
    async fn submit(&self, cmd: ChipCommand) -> ChipStatus;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_kind_pairs_with_command() {
        assert_eq!(
            ChipCommand::Tune {
                frequency_khz: 94_100
            }
            .kind(),
            CommandKind::Tune
        );
        assert_eq!(ChipCommand::GetBand.kind(), CommandKind::GetBand);
        assert_eq!(
            ChipCommand::SetBand(Band::Japan).kind(),
            CommandKind::SetBand
        );
        assert_eq!(
            ChipCommand::SetVolume { level: 35 }.kind(),
            CommandKind::SetVolume
        );
    }

    #[test]
    fn chip_status_display() {
        assert_eq!(ChipStatus::Pending.to_string(), "pending");
        assert_eq!(
            ChipStatus::ScanNotInProgress.to_string(),
            "scan not in progress"
        );
    }

    #[test]
    fn command_kind_display_is_debug_name() {
        assert_eq!(CommandKind::StopCompleteScan.to_string(), "StopCompleteScan");
    }
}
