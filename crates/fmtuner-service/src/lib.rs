//! fmtuner-service: The tuner control core.
//!
//! Sits between client-facing layers and the asynchronous tuner chip
//! driver, turning the driver's submit-then-complete command model into a
//! safe blocking-with-timeout API. The core owns:
//!
//! - the tuner lifecycle state machine and busy-flag admission control
//! - the completion bridge pairing submitted commands with their
//!   completion events (one single-slot rendezvous per command kind)
//! - the chip-event pump updating the result cache and broadcasting
//!   [`TunerEvent`](fmtuner_core::TunerEvent)s
//! - the delayed power-down sequencer and its wake lock
//! - the system-volume reconciler
//!
//! Construct an [`FmReceiver`] through [`FmReceiverBuilder`], handing it
//! the hardware bridge and the driver's event channel.

mod bridge;
mod pump;
mod state;
mod volume;

pub mod builder;
pub mod power;
pub mod receiver;
pub mod settings;

pub use builder::FmReceiverBuilder;
pub use power::{FlagWakeLock, WakeLock};
pub use receiver::FmReceiver;
pub use settings::StartupSettings;
