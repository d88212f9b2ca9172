//! Asynchronous tuner event types.
//!
//! Events are emitted by the control core through a
//! [`tokio::sync::broadcast`] channel as hardware completions and RDS
//! indications arrive. UI layers subscribe to these events for real-time
//! updates without polling. Delivery is best-effort; slow consumers may
//! miss events under load.

use crate::chip::ChipStatus;
use crate::types::MonoStereoMode;

/// An event emitted by the control core when tuner state changes.
#[derive(Debug, Clone)]
pub enum TunerEvent {
    /// The tuner finished powering up and is now operational.
    Enabled,

    /// The tuner finished powering down.
    Disabled {
        /// Completion status of the power-down.
        status: ChipStatus,
    },

    /// A tune request completed.
    TuneComplete {
        /// The frequency now tuned, in kHz.
        frequency_khz: u32,
        /// Completion status.
        status: ChipStatus,
    },

    /// A seek (or seek abort) completed.
    SeekComplete {
        /// The frequency the seek landed on, in kHz.
        frequency_khz: u32,
        /// Completion status.
        status: ChipStatus,
    },

    /// Decoded RDS radio text arrived.
    RadioText {
        /// The decoded text.
        text: String,
        /// Whether the display should be cleared first.
        reset_display: bool,
        /// Driver status for the indication.
        status: ChipStatus,
    },

    /// The decoded RDS program-service name changed.
    PsChanged {
        /// Frequency the name belongs to, in kHz.
        frequency_khz: u32,
        /// The decoded station name.
        name: String,
        /// Raw repertoire selector the name was decoded with.
        repertoire: u8,
        /// Driver status for the indication.
        status: ChipStatus,
    },

    /// The RDS program-identification code changed.
    ///
    /// Emitted only when the code differs from the last one seen.
    PiCodeChanged {
        /// The new PI code.
        pi: u16,
    },

    /// The broadcast switched between mono and stereo.
    ///
    /// Emitted only when the mode differs from the last one seen.
    MonoStereoChanged {
        /// The new reception mode.
        mode: MonoStereoMode,
    },

    /// A full-band scan finished.
    ScanDone {
        /// Frequencies of the stations found, in kHz.
        channels_khz: Vec<u32>,
        /// Completion status of the scan.
        status: ChipStatus,
    },

    /// The driver reported an asynchronous failure.
    Error {
        /// The failure status.
        status: ChipStatus,
    },
}
