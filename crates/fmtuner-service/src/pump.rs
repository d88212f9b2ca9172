//! The chip-event pump.
//!
//! A background task owns the driver's event channel. For command
//! completions it writes the pending-result cache, clears the matching
//! busy flag, drives state-machine transitions, and finally posts the
//! completion token that releases a blocked dispatcher caller. For
//! unsolicited indications it decodes and broadcasts [`TunerEvent`]s,
//! de-duplicating PI-code and mono/stereo changes.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use fmtuner_core::chip::{ChipEvent, ChipStatus, CommandKind};
use fmtuner_core::events::TunerEvent;
use fmtuner_core::rds::decode_text;
use fmtuner_core::types::{
    rssi_from_raw, Band, ChannelSpacing, EmphasisFilter, MonoStereoMode, MuteMode,
    RdsAfSwitchMode, RdsSystem, RfDependentMute, TunerState,
};

use crate::state::Inner;

/// Spawn the pump task. It exits when the driver drops its event sender.
pub(crate) fn spawn_event_pump(
    inner: Arc<Inner>,
    mut events: mpsc::UnboundedReceiver<ChipEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            on_chip_event(&inner, event);
        }
        debug!("chip event channel closed; pump exiting");
    })
}

fn on_chip_event(inner: &Inner, event: ChipEvent) {
    match event {
        ChipEvent::CommandDone {
            status,
            kind,
            value,
        } => on_command_done(inner, status, kind, value),

        ChipEvent::RadioText {
            status,
            reset_display,
            text,
            repertoire,
        } => {
            let text = decode_text(&text, repertoire);
            debug!(%text, "radio text");
            inner.emit(TunerEvent::RadioText {
                text,
                reset_display,
                status,
            });
        }

        ChipEvent::PsChanged {
            status,
            frequency_khz,
            name,
            repertoire,
        } => {
            let name = decode_text(&name, repertoire);
            debug!(frequency_khz, %name, "program service name");
            inner.emit(TunerEvent::PsChanged {
                frequency_khz,
                name,
                repertoire,
                status,
            });
        }

        ChipEvent::PiCodeChanged { status: _, pi } => {
            let changed = {
                let mut shared = inner.shared.lock().unwrap();
                if shared.last_pi == Some(pi) {
                    false
                } else {
                    shared.last_pi = Some(pi);
                    true
                }
            };
            if changed {
                debug!(pi, "PI code changed");
                inner.emit(TunerEvent::PiCodeChanged { pi });
            }
        }

        ChipEvent::MonoStereoChanged { status: _, mode } => {
            let changed = {
                let mut shared = inner.shared.lock().unwrap();
                if shared.last_mono_stereo == Some(mode) {
                    false
                } else {
                    shared.last_mono_stereo = Some(mode);
                    shared.cache.mono_stereo = mode;
                    true
                }
            };
            if changed {
                debug!(%mode, "mono/stereo changed");
                inner.emit(TunerEvent::MonoStereoChanged { mode });
            }
        }

        ChipEvent::ScanDone {
            status,
            channels_khz,
        } => {
            {
                let mut shared = inner.shared.lock().unwrap();
                shared.scanning = false;
            }
            debug!(%status, found = channels_khz.len(), "scan finished");
            inner.emit(TunerEvent::ScanDone {
                channels_khz,
                status,
            });
            // Release a stop-scan caller waiting while the scan finished
            // on its own.
            inner.bridge.post(CommandKind::StopCompleteScan, status);
        }

        ChipEvent::CommandError { status } => {
            warn!(%status, "asynchronous command error");
            inner.emit(TunerEvent::Error { status });
        }
    }
}

fn on_command_done(inner: &Inner, status: ChipStatus, kind: CommandKind, value: i64) {
    debug!(%kind, %status, value, "command completed");

    // Cache writes and flag clears happen under the lock, before the
    // token is posted; emits happen after the lock is released.
    let mut to_emit: Option<TunerEvent> = None;
    {
        let mut shared = inner.shared.lock().unwrap();
        match kind {
            CommandKind::Enable => {
                if matches!(shared.state, TunerState::Enabling | TunerState::Resume) {
                    shared.state = TunerState::Enabled;
                    to_emit = Some(TunerEvent::Enabled);
                } else {
                    warn!(state = %shared.state, "enable completion in unexpected state");
                }
            }
            CommandKind::Disable => {
                shared.state = shared.disable_target;
                to_emit = Some(TunerEvent::Disabled { status });
            }
            CommandKind::Tune => {
                shared.tuning = false;
                let frequency_khz = value as u32;
                shared.current_frequency_khz = frequency_khz;
                shared.cache.tuned_frequency_khz = frequency_khz;
                to_emit = Some(TunerEvent::TuneComplete {
                    frequency_khz,
                    status,
                });
            }
            CommandKind::Seek => {
                shared.seeking = false;
                let frequency_khz = value as u32;
                shared.current_frequency_khz = frequency_khz;
                shared.cache.tuned_frequency_khz = frequency_khz;
                to_emit = Some(TunerEvent::SeekComplete {
                    frequency_khz,
                    status,
                });
            }
            CommandKind::StopSeek => {
                to_emit = Some(TunerEvent::SeekComplete {
                    frequency_khz: shared.current_frequency_khz,
                    status,
                });
            }
            CommandKind::StopCompleteScan => {
                shared.scanning = false;
            }
            CommandKind::GetBand => match Band::from_raw(value) {
                Some(band) => {
                    shared.cache.band = band;
                    shared.band = band;
                }
                None => warn!(value, "driver reported unknown band code"),
            },
            CommandKind::GetMonoStereoMode => match MonoStereoMode::from_raw(value) {
                Some(mode) => shared.cache.mono_stereo = mode,
                None => warn!(value, "driver reported unknown mono/stereo code"),
            },
            CommandKind::GetMuteMode => match MuteMode::from_raw(value) {
                Some(mode) => shared.cache.mute = mode,
                None => warn!(value, "driver reported unknown mute code"),
            },
            CommandKind::GetRfDependentMute => match RfDependentMute::from_raw(value) {
                Some(mode) => shared.cache.rf_mute = mode,
                None => warn!(value, "driver reported unknown RF mute code"),
            },
            CommandKind::GetDeEmphasisFilter => match EmphasisFilter::from_raw(value) {
                Some(filter) => shared.cache.emphasis = filter,
                None => warn!(value, "driver reported unknown de-emphasis code"),
            },
            CommandKind::GetChannelSpacing => match ChannelSpacing::from_raw(value) {
                Some(spacing) => shared.cache.spacing = spacing,
                None => warn!(value, "driver reported unknown spacing code"),
            },
            CommandKind::GetRdsSystem => match RdsSystem::from_raw(value) {
                Some(system) => shared.cache.rds_system = system,
                None => warn!(value, "driver reported unknown RDS system code"),
            },
            CommandKind::GetRdsAfSwitchMode => match RdsAfSwitchMode::from_raw(value) {
                Some(mode) => shared.cache.rds_af_switch = mode,
                None => warn!(value, "driver reported unknown AF switch code"),
            },
            CommandKind::GetRssiThreshold => {
                shared.cache.rssi_threshold = value as i32;
            }
            CommandKind::GetRssi => {
                shared.cache.rssi = rssi_from_raw(value);
            }
            CommandKind::GetTunedFrequency => {
                let frequency_khz = value as u32;
                shared.cache.tuned_frequency_khz = frequency_khz;
                shared.current_frequency_khz = frequency_khz;
            }
            CommandKind::GetRdsGroupMask => {
                shared.cache.rds_group_mask = value as u64;
            }
            CommandKind::GetCompleteScanProgress => {
                shared.cache.scan_progress_khz = value as u32;
            }
            CommandKind::IsValidChannel => {
                shared.cache.valid_channel = value > 0;
            }
            CommandKind::GetFwVersion => {
                shared.cache.fw_version = value as f64 / 1000.0;
            }
            CommandKind::SetVolume => {
                shared.volume_pending = false;
            }
            CommandKind::EnableRds => {
                shared.cache.rds_enabled = true;
            }
            CommandKind::DisableRds => {
                shared.cache.rds_enabled = false;
            }
            // Plain setter and fire-and-forget completions carry no
            // result value; the token below is all they deliver.
            _ => {}
        }
    }

    if let Some(event) = to_emit {
        inner.emit(event);
    }
    inner.bridge.post(kind, status);
}
