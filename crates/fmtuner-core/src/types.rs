//! Core types used throughout fmtuner.
//!
//! These types provide a typed abstraction layer over the raw integer
//! vocabulary of the tuner hardware driver. Every integer-to-enum
//! conversion at this boundary is a total mapping (`from_raw` returning
//! `Option`); an unrecognized raw value is reported to the caller, never
//! panicked on or silently defaulted.

use std::fmt;

/// Maximum hardware volume level accepted by the tuner chip.
pub const HW_VOLUME_MAX: u32 = 70;

/// Lifecycle state of the tuner.
///
/// The state machine:
///
/// ```text
/// Default --create--> Disabled --enable--> Enabling --done--> Enabled
/// Enabled --disable--> Disabling --done--> Disabled
/// Enabled --pause----> Disabling --done--> Pause
/// Pause ---resume----> Resume ------done--> Enabled
/// ```
///
/// `Pause` is terminal for the pause path; only an explicit resume leaves it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TunerState {
    /// Not yet created, or destroyed.
    Default,
    /// Created but powered down.
    Disabled,
    /// Power-up command issued, completion not yet observed.
    Enabling,
    /// Fully operational.
    Enabled,
    /// Power-down command issued, completion not yet observed.
    Disabling,
    /// Powered down by an explicit pause; resumable.
    Pause,
    /// Power-up from pause issued, completion not yet observed.
    Resume,
}

impl fmt::Display for TunerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TunerState::Default => "default",
            TunerState::Disabled => "disabled",
            TunerState::Enabling => "enabling",
            TunerState::Enabled => "enabled",
            TunerState::Disabling => "disabling",
            TunerState::Pause => "pause",
            TunerState::Resume => "resume",
        };
        write!(f, "{s}")
    }
}

/// FM broadcast band.
///
/// All frequencies in fmtuner are expressed in kHz.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Band {
    /// 87.5 - 108.0 MHz, used in Europe, the Americas, and most of the world.
    EuropeUs,
    /// 76.0 - 90.0 MHz, used in Japan.
    Japan,
}

impl Band {
    /// Lowest tunable frequency of this band, in kHz.
    pub fn first_khz(&self) -> u32 {
        match self {
            Band::EuropeUs => 87_500,
            Band::Japan => 76_000,
        }
    }

    /// Highest tunable frequency of this band, in kHz.
    pub fn last_khz(&self) -> u32 {
        match self {
            Band::EuropeUs => 108_000,
            Band::Japan => 90_000,
        }
    }

    /// Whether `freq_khz` lies within this band (bounds inclusive).
    pub fn contains(&self, freq_khz: u32) -> bool {
        freq_khz >= self.first_khz() && freq_khz <= self.last_khz()
    }

    /// Map a raw driver band code to a [`Band`].
    pub fn from_raw(raw: i64) -> Option<Band> {
        match raw {
            0 => Some(Band::EuropeUs),
            1 => Some(Band::Japan),
            _ => None,
        }
    }

    /// The raw driver code for this band.
    pub fn to_raw(&self) -> i64 {
        match self {
            Band::EuropeUs => 0,
            Band::Japan => 1,
        }
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Band::EuropeUs => write!(f, "Europe/US"),
            Band::Japan => write!(f, "Japan"),
        }
    }
}

/// Audio reception mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MonoStereoMode {
    /// Decode the stereo pilot when present.
    Stereo,
    /// Force monophonic reception.
    Mono,
}

impl MonoStereoMode {
    /// Map a raw driver mode code.
    pub fn from_raw(raw: i64) -> Option<MonoStereoMode> {
        match raw {
            0 => Some(MonoStereoMode::Stereo),
            1 => Some(MonoStereoMode::Mono),
            _ => None,
        }
    }
}

impl fmt::Display for MonoStereoMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MonoStereoMode::Stereo => write!(f, "stereo"),
            MonoStereoMode::Mono => write!(f, "mono"),
        }
    }
}

/// Audio mute behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MuteMode {
    /// Audio fully muted.
    Mute,
    /// Audio unmuted.
    Unmute,
    /// Audio attenuated rather than fully muted.
    AttenuateVoice,
}

impl MuteMode {
    /// Map a raw driver mute code.
    pub fn from_raw(raw: i64) -> Option<MuteMode> {
        match raw {
            0 => Some(MuteMode::Mute),
            1 => Some(MuteMode::Unmute),
            2 => Some(MuteMode::AttenuateVoice),
            _ => None,
        }
    }
}

/// Whether the tuner mutes automatically on weak RF signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RfDependentMute {
    /// RF-dependent muting off.
    Off,
    /// RF-dependent muting on.
    On,
}

impl RfDependentMute {
    /// Map a raw driver code.
    pub fn from_raw(raw: i64) -> Option<RfDependentMute> {
        match raw {
            0 => Some(RfDependentMute::Off),
            1 => Some(RfDependentMute::On),
            _ => None,
        }
    }
}

/// De-emphasis filter time constant.
///
/// Broadcast FM pre-emphasizes high frequencies; the receiver applies the
/// regional inverse filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EmphasisFilter {
    /// No de-emphasis.
    None,
    /// 50 microseconds (Europe, Japan).
    Usec50,
    /// 75 microseconds (Americas, South Korea).
    Usec75,
}

impl EmphasisFilter {
    /// Map a raw driver filter code.
    pub fn from_raw(raw: i64) -> Option<EmphasisFilter> {
        match raw {
            0 => Some(EmphasisFilter::None),
            1 => Some(EmphasisFilter::Usec50),
            2 => Some(EmphasisFilter::Usec75),
            _ => None,
        }
    }
}

/// Channel spacing used by seek and scan, expressed as multiples of 50 kHz.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelSpacing {
    /// 50 kHz steps.
    Khz50,
    /// 100 kHz steps.
    Khz100,
    /// 200 kHz steps.
    Khz200,
}

impl ChannelSpacing {
    /// Map a raw driver spacing code (in 50 kHz units).
    pub fn from_raw(raw: i64) -> Option<ChannelSpacing> {
        match raw {
            1 => Some(ChannelSpacing::Khz50),
            2 => Some(ChannelSpacing::Khz100),
            4 => Some(ChannelSpacing::Khz200),
            _ => None,
        }
    }

    /// The spacing in kHz.
    pub fn khz(&self) -> u32 {
        match self {
            ChannelSpacing::Khz50 => 50,
            ChannelSpacing::Khz100 => 100,
            ChannelSpacing::Khz200 => 200,
        }
    }
}

/// RDS decoding standard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RdsSystem {
    /// European RDS.
    Rds,
    /// North American RBDS.
    Rbds,
}

impl RdsSystem {
    /// Map a raw driver system code.
    pub fn from_raw(raw: i64) -> Option<RdsSystem> {
        match raw {
            0 => Some(RdsSystem::Rds),
            1 => Some(RdsSystem::Rbds),
            _ => None,
        }
    }
}

/// Automatic alternate-frequency switching on weak signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RdsAfSwitchMode {
    /// AF switching off.
    Off,
    /// AF switching on.
    On,
}

impl RdsAfSwitchMode {
    /// Map a raw driver code.
    pub fn from_raw(raw: i64) -> Option<RdsAfSwitchMode> {
        match raw {
            0 => Some(RdsAfSwitchMode::Off),
            1 => Some(RdsAfSwitchMode::On),
            _ => None,
        }
    }
}

/// Direction for a station seek.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeekDirection {
    /// Seek toward lower frequencies.
    Down,
    /// Seek toward higher frequencies.
    Up,
}

/// External audio stream class reported by volume-change notifications.
///
/// Only [`AudioStream::Media`] notifications are folded onto the tuner's
/// hardware volume; all other classes are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AudioStream {
    /// Media playback volume.
    Media,
    /// Voice call volume.
    Voice,
    /// Ringer volume.
    Ring,
    /// Alarm volume.
    Alarm,
}

/// Result of a stop-scan request.
///
/// Stopping a scan that already finished (or never started) is not an
/// error; the caller learns that distinctly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopScanOutcome {
    /// The running scan was stopped.
    Stopped,
    /// No scan was in progress.
    NotInProgress,
}

/// Progress report of a running band scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanProgress {
    /// The scan is currently examining this frequency, in kHz.
    AtFrequency(u32),
    /// No scan is in progress.
    NotInProgress,
}

/// Capability level carried by a [`Caller`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// May read tuner state and settings.
    Read,
    /// May mutate tuner state; implies [`Capability::Read`].
    Admin,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::Read => write!(f, "read"),
            Capability::Admin => write!(f, "admin"),
        }
    }
}

/// Identity and capability of the party invoking a tuner operation.
///
/// Every dispatcher operation takes an explicit `Caller`; permission
/// failures are ordinary [`Error::PermissionDenied`](crate::Error) values,
/// never panics.
#[derive(Debug, Clone)]
pub struct Caller {
    name: String,
    capability: Capability,
}

impl Caller {
    /// Create a caller with the given capability level.
    pub fn new(name: impl Into<String>, capability: Capability) -> Self {
        Caller {
            name: name.into(),
            capability,
        }
    }

    /// Shorthand for an admin-capable caller.
    pub fn admin(name: impl Into<String>) -> Self {
        Caller::new(name, Capability::Admin)
    }

    /// Shorthand for a read-only caller.
    pub fn read_only(name: impl Into<String>) -> Self {
        Caller::new(name, Capability::Read)
    }

    /// The caller's name, used in logs and permission errors.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The caller's capability level.
    pub fn capability(&self) -> Capability {
        self.capability
    }

    /// Whether this caller satisfies the `required` capability.
    pub fn allows(&self, required: Capability) -> bool {
        match (self.capability, required) {
            (Capability::Admin, _) => true,
            (Capability::Read, Capability::Read) => true,
            (Capability::Read, Capability::Admin) => false,
        }
    }
}

/// Convert the driver's unsigned 16-bit RSSI reading to a signed level.
///
/// Raw values outside the 16-bit range collapse to 0.
pub fn rssi_from_raw(raw: i64) -> i32 {
    if (0..=0xFFFF).contains(&raw) {
        raw as u16 as i16 as i32
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn band_bounds() {
        assert_eq!(Band::EuropeUs.first_khz(), 87_500);
        assert_eq!(Band::EuropeUs.last_khz(), 108_000);
        assert_eq!(Band::Japan.first_khz(), 76_000);
        assert_eq!(Band::Japan.last_khz(), 90_000);
    }

    #[test]
    fn band_contains_is_inclusive() {
        assert!(Band::EuropeUs.contains(87_500));
        assert!(Band::EuropeUs.contains(108_000));
        assert!(!Band::EuropeUs.contains(87_499));
        assert!(!Band::EuropeUs.contains(108_001));
        assert!(Band::Japan.contains(76_000));
        assert!(!Band::Japan.contains(108_000));
    }

    #[test]
    fn band_from_raw_total() {
        assert_eq!(Band::from_raw(0), Some(Band::EuropeUs));
        assert_eq!(Band::from_raw(1), Some(Band::Japan));
        assert_eq!(Band::from_raw(2), None);
        assert_eq!(Band::from_raw(-1), None);
    }

    #[test]
    fn channel_spacing_from_raw() {
        assert_eq!(ChannelSpacing::from_raw(1), Some(ChannelSpacing::Khz50));
        assert_eq!(ChannelSpacing::from_raw(2), Some(ChannelSpacing::Khz100));
        assert_eq!(ChannelSpacing::from_raw(4), Some(ChannelSpacing::Khz200));
        assert_eq!(ChannelSpacing::from_raw(3), None);
        assert_eq!(ChannelSpacing::Khz200.khz(), 200);
    }

    #[test]
    fn mode_mappings_reject_unknown_codes() {
        assert_eq!(MonoStereoMode::from_raw(7), None);
        assert_eq!(MuteMode::from_raw(3), None);
        assert_eq!(RfDependentMute::from_raw(2), None);
        assert_eq!(EmphasisFilter::from_raw(5), None);
        assert_eq!(RdsSystem::from_raw(2), None);
        assert_eq!(RdsAfSwitchMode::from_raw(-1), None);
    }

    #[test]
    fn caller_capability_lattice() {
        let admin = Caller::admin("svc");
        let reader = Caller::read_only("ui");
        assert!(admin.allows(Capability::Admin));
        assert!(admin.allows(Capability::Read));
        assert!(reader.allows(Capability::Read));
        assert!(!reader.allows(Capability::Admin));
    }

    #[test]
    fn rssi_conversion_sign_extends() {
        assert_eq!(rssi_from_raw(0), 0);
        assert_eq!(rssi_from_raw(127), 127);
        // 0xFFB0 is -80 as a 16-bit two's-complement value.
        assert_eq!(rssi_from_raw(0xFFB0), -80);
        assert_eq!(rssi_from_raw(0xFFFF), -1);
    }

    #[test]
    fn rssi_conversion_out_of_range_collapses_to_zero() {
        assert_eq!(rssi_from_raw(0x1_0000), 0);
        assert_eq!(rssi_from_raw(-1), 0);
        assert_eq!(rssi_from_raw(i64::MAX), 0);
    }

    #[test]
    fn tuner_state_display() {
        assert_eq!(TunerState::Enabled.to_string(), "enabled");
        assert_eq!(TunerState::Disabling.to_string(), "disabling");
    }
}
