//! fmtuner-core: Core types, errors, and trait definitions for fmtuner.
//!
//! This crate defines the hardware-agnostic vocabulary shared by the tuner
//! control service and its embedders. Applications depend on these types
//! without pulling in the control core itself.
//!
//! # Key types
//!
//! - [`FmChip`] -- the asynchronous bridge to the tuner hardware driver
//! - [`TunerEvent`] -- state change and RDS notifications
//! - [`TunerState`] -- the tuner lifecycle state machine
//! - [`Error`] / [`Result`] -- error handling

pub mod chip;
pub mod error;
pub mod events;
pub mod rds;
pub mod types;

// Re-export key types at crate root for ergonomic `use fmtuner_core::*`.
pub use chip::{ChipCommand, ChipEvent, ChipStatus, CommandKind, FmChip};
pub use error::{Error, Result};
pub use events::TunerEvent;
pub use rds::{decode_text, Repertoire, UNKNOWN_REPERTOIRE_PLACEHOLDER};
pub use types::*;
