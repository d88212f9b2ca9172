//! Startup settings application.
//!
//! Embedders persist the user's tuner settings outside the control core
//! and hand them back after each enable. Application is best-effort and
//! sequential: values already matching the cache are skipped, and an
//! individual failure is logged without aborting the rest.

use tracing::{debug, warn};

use fmtuner_core::error::Result;
use fmtuner_core::types::{
    Band, Caller, Capability, ChannelSpacing, EmphasisFilter, MonoStereoMode, MuteMode,
    RdsAfSwitchMode, RdsSystem,
};

use crate::receiver::FmReceiver;

/// Persisted tuner settings to apply after an enable.
///
/// `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct StartupSettings {
    /// Broadcast band.
    pub band: Option<Band>,
    /// Frequency to tune, in kHz.
    pub frequency_khz: Option<u32>,
    /// Mono/stereo reception mode.
    pub mono_stereo: Option<MonoStereoMode>,
    /// Mute behavior.
    pub mute: Option<MuteMode>,
    /// De-emphasis filter.
    pub emphasis: Option<EmphasisFilter>,
    /// Seek/scan channel spacing.
    pub spacing: Option<ChannelSpacing>,
    /// Whether RDS reception is on.
    pub rds_enabled: Option<bool>,
    /// RDS decoding standard.
    pub rds_system: Option<RdsSystem>,
    /// Alternate-frequency switching.
    pub rds_af_switch: Option<RdsAfSwitchMode>,
    /// RSSI threshold.
    pub rssi_threshold: Option<i32>,
}

macro_rules! apply_setting {
    ($self:ident, $caller:ident, $value:expr, $cached:expr, $setter:ident, $label:literal) => {
        if let Some(value) = $value {
            if $cached == value {
                debug!(concat!("startup ", $label, " already current; skipping"));
            } else if let Err(error) = $self.$setter($caller, value).await {
                warn!(%error, concat!("startup ", $label, " not applied"));
            }
        }
    };
}

impl FmReceiver {
    /// Apply persisted settings, one at a time, skipping values that
    /// already match the cache.
    ///
    /// Individual failures are logged and do not stop the pass.
    pub async fn apply_startup_settings(
        &self,
        caller: &Caller,
        settings: &StartupSettings,
    ) -> Result<()> {
        self.require(caller, Capability::Admin, "apply_startup_settings")?;
        debug!("applying startup settings");

        let cache = self.inner.shared.lock().unwrap().cache.clone();

        apply_setting!(self, caller, settings.band, cache.band, set_band, "band");
        apply_setting!(
            self,
            caller,
            settings.emphasis,
            cache.emphasis,
            set_de_emphasis_filter,
            "de-emphasis filter"
        );
        apply_setting!(
            self,
            caller,
            settings.spacing,
            cache.spacing,
            set_channel_spacing,
            "channel spacing"
        );
        apply_setting!(
            self,
            caller,
            settings.mono_stereo,
            cache.mono_stereo,
            set_mono_stereo_mode,
            "mono/stereo mode"
        );
        apply_setting!(
            self,
            caller,
            settings.mute,
            cache.mute,
            set_mute_mode,
            "mute mode"
        );
        apply_setting!(
            self,
            caller,
            settings.rssi_threshold,
            cache.rssi_threshold,
            set_rssi_threshold,
            "RSSI threshold"
        );
        apply_setting!(
            self,
            caller,
            settings.rds_system,
            cache.rds_system,
            set_rds_system,
            "RDS system"
        );
        apply_setting!(
            self,
            caller,
            settings.rds_af_switch,
            cache.rds_af_switch,
            set_rds_af_switch_mode,
            "AF switch mode"
        );

        if let Some(rds_enabled) = settings.rds_enabled {
            if cache.rds_enabled != rds_enabled {
                let result = if rds_enabled {
                    self.enable_rds(caller).await
                } else {
                    self.disable_rds(caller).await
                };
                if let Err(error) = result {
                    warn!(%error, "startup RDS state not applied");
                }
            }
        }

        apply_setting!(
            self,
            caller,
            settings.frequency_khz,
            cache.tuned_frequency_khz,
            tune,
            "frequency"
        );

        Ok(())
    }
}
