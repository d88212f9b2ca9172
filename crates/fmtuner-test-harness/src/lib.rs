//! fmtuner-test-harness: Testing utilities for the fmtuner control core.
//!
//! Provides [`MockChip`], a scripted in-process implementation of the
//! [`FmChip`](fmtuner_core::FmChip) hardware bridge for deterministic
//! async tests without real tuner hardware.

pub mod mock_chip;

pub use mock_chip::MockChip;
