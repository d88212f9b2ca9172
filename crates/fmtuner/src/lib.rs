//! # fmtuner -- Asynchronous FM Radio Tuner Control
//!
//! `fmtuner` is an asynchronous Rust library for driving an FM receiver
//! chip: power sequencing, tuning, seeking, band scanning, RDS decoding,
//! and audio routing. It is designed for media daemons and automotive
//! head units where the tuner hardware answers commands asynchronously
//! and the host must stay responsive.
//!
//! ## Quick Start
//!
//! Add `fmtuner` to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! fmtuner = "0.1"
//! tokio = { version = "1", features = ["full"] }
//! ```
//!
//! Bring the tuner up and tune a station:
//!
//! ```no_run
//! use std::sync::Arc;
//! use fmtuner::{Caller, FmChip, FmReceiverBuilder};
//! use fmtuner::chip::ChipEvent;
//! use tokio::sync::mpsc;
//!
//! # async fn example(chip: Arc<dyn FmChip>,
//! #                  chip_events: mpsc::UnboundedReceiver<ChipEvent>)
//! #                  -> fmtuner::Result<()> {
//! let receiver = FmReceiverBuilder::new().build(chip, chip_events)?;
//! let caller = Caller::admin("media-daemon");
//!
//! receiver.enable(&caller).await?;
//! receiver.tune(&caller, 94_100).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! The library is organized as a workspace of focused crates:
//!
//! | Crate                  | Purpose                                         |
//! |------------------------|-------------------------------------------------|
//! | `fmtuner-core`         | The [`FmChip`] trait, types, errors, RDS tables |
//! | `fmtuner-service`      | [`FmReceiver`], power sequencing, event pump    |
//! | `fmtuner-test-harness` | Scriptable mock chip for driver tests           |
//! | **`fmtuner`**          | This facade crate -- re-exports everything      |
//!
//! Hardware integrations implement the [`FmChip`] trait: one async
//! `submit` returning an immediate acknowledgement, with completions and
//! indications flowing back over a channel of
//! [`ChipEvent`](chip::ChipEvent)s. The [`FmReceiver`] pairs each
//! submitted command with its completion, so callers see plain async
//! methods.
//!
//! ## Event Subscription
//!
//! The receiver rebroadcasts tuner activity as [`TunerEvent`]s. Subscribe
//! to observe tune completions, RDS text, and scan results without
//! polling:
//!
//! ```no_run
//! use fmtuner::{FmReceiver, TunerEvent};
//! # async fn example(receiver: &FmReceiver) {
//! let mut events = receiver.subscribe();
//! loop {
//!     match events.recv().await {
//!         Ok(TunerEvent::PsChanged { frequency_khz, name, .. }) => {
//!             println!("{frequency_khz} kHz: {name}");
//!         }
//!         Ok(event) => println!("{event:?}"),
//!         Err(_) => break,
//!     }
//! }
//! # }
//! ```
//!
//! ## Power Model
//!
//! `disable()` and `pause()` do not cut power immediately: the receiver
//! holds a [`WakeLock`] and defers the hardware disable by a short
//! configurable delay, so a quick re-enable cancels the tear-down without
//! a firmware round trip. See [`FmReceiverBuilder::power_down_delay`].

pub use fmtuner_core::*;

pub use fmtuner_service::{
    FlagWakeLock, FmReceiver, FmReceiverBuilder, StartupSettings, WakeLock,
};
