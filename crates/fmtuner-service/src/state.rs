//! Shared mutable state of the control core.
//!
//! One coarse mutex guards the state machine, the busy flags, and the
//! pending-result cache. The lock is never held across an await point.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use fmtuner_core::chip::FmChip;
use fmtuner_core::events::TunerEvent;
use fmtuner_core::types::{
    Band, ChannelSpacing, EmphasisFilter, MonoStereoMode, MuteMode, RdsAfSwitchMode, RdsSystem,
    RfDependentMute, TunerState,
};

use crate::bridge::CompletionBridge;
use crate::power::WakeLock;

/// Cached result values, one per gettable property.
///
/// Written only by the event pump (before it posts the completion token)
/// and by successful setters; read by the dispatcher after a successful
/// completion wait.
#[derive(Debug, Clone)]
pub(crate) struct Cache {
    pub band: Band,
    pub mono_stereo: MonoStereoMode,
    pub mute: MuteMode,
    pub rf_mute: RfDependentMute,
    pub rssi_threshold: i32,
    pub rssi: i32,
    pub emphasis: EmphasisFilter,
    pub spacing: ChannelSpacing,
    pub rds_system: RdsSystem,
    pub rds_group_mask: u64,
    pub rds_af_switch: RdsAfSwitchMode,
    pub rds_enabled: bool,
    pub tuned_frequency_khz: u32,
    pub scan_progress_khz: u32,
    pub valid_channel: bool,
    pub fw_version: f64,
}

impl Cache {
    fn new(band: Band) -> Self {
        Cache {
            band,
            mono_stereo: MonoStereoMode::Stereo,
            mute: MuteMode::Unmute,
            rf_mute: RfDependentMute::Off,
            rssi_threshold: 0,
            rssi: 0,
            emphasis: EmphasisFilter::Usec50,
            spacing: ChannelSpacing::Khz100,
            rds_system: RdsSystem::Rds,
            rds_group_mask: 0,
            rds_af_switch: RdsAfSwitchMode::Off,
            rds_enabled: false,
            tuned_frequency_khz: band.first_khz(),
            scan_progress_khz: band.first_khz(),
            valid_channel: false,
            fw_version: 0.0,
        }
    }
}

/// State behind the coarse lock.
pub(crate) struct Shared {
    /// Lifecycle state.
    pub state: TunerState,
    /// Where the in-flight power-down lands: `Disabled` or `Pause`.
    pub disable_target: TunerState,
    /// A tune is in flight.
    pub tuning: bool,
    /// A seek is in flight.
    pub seeking: bool,
    /// A full-band scan is in flight.
    pub scanning: bool,
    /// A hardware volume write is in flight.
    pub volume_pending: bool,
    /// A power-down sequencer is sleeping out its delay window.
    pub power_down_pending: bool,
    /// Current band; tune requests are range-checked against it.
    pub band: Band,
    /// The most recently requested or reported frequency, in kHz.
    pub current_frequency_khz: u32,
    /// Last PI code broadcast, for de-duplication.
    pub last_pi: Option<u16>,
    /// Last mono/stereo mode broadcast, for de-duplication.
    pub last_mono_stereo: Option<MonoStereoMode>,
    pub cache: Cache,
}

impl Shared {
    pub(crate) fn new(band: Band) -> Self {
        Shared {
            state: TunerState::Disabled,
            disable_target: TunerState::Disabled,
            tuning: false,
            seeking: false,
            scanning: false,
            volume_pending: false,
            power_down_pending: false,
            band,
            current_frequency_khz: band.first_khz(),
            last_pi: None,
            last_mono_stereo: None,
            cache: Cache::new(band),
        }
    }
}

/// Everything the dispatcher, pump, and sequencer share.
pub(crate) struct Inner {
    pub chip: Arc<dyn FmChip>,
    pub shared: Mutex<Shared>,
    pub bridge: CompletionBridge,
    pub event_tx: broadcast::Sender<TunerEvent>,
    pub wake_lock: Arc<dyn WakeLock>,
    pub command_timeout: Duration,
    pub power_down_delay: Duration,
    pub system_volume_max: u32,
    pub power_down_task: Mutex<Option<JoinHandle<()>>>,
}

impl Inner {
    /// Broadcast an event, ignoring the no-subscribers case.
    pub(crate) fn emit(&self, event: TunerEvent) {
        let _ = self.event_tx.send(event);
    }
}
