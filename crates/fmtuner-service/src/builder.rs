//! FmReceiverBuilder -- fluent builder for constructing [`FmReceiver`]
//! instances.
//!
//! Separates configuration from construction so that embedders can set
//! timeouts, the power-down delay, and the wake-lock implementation
//! before wiring up the hardware bridge.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use fmtuner_service::FmReceiverBuilder;
//!
//! # fn example(chip: Arc<dyn fmtuner_core::FmChip>,
//! #            events: tokio::sync::mpsc::UnboundedReceiver<fmtuner_core::ChipEvent>)
//! #            -> fmtuner_core::Result<()> {
//! let receiver = FmReceiverBuilder::new()
//!     .command_timeout(Duration::from_secs(4))
//!     .power_down_delay(Duration::from_millis(50))
//!     .build(chip, events)?;
//! # Ok(())
//! # }
//! ```

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::{broadcast, mpsc};

use fmtuner_core::chip::{ChipEvent, FmChip};
use fmtuner_core::error::{Error, Result};
use fmtuner_core::types::Band;

use crate::power::{FlagWakeLock, WakeLock};
use crate::pump;
use crate::receiver::FmReceiver;
use crate::state::{Inner, Shared};

/// Fluent builder for [`FmReceiver`].
///
/// All configuration has defaults matching the reference hardware: a 4 s
/// completion timeout, a 50 ms power-down delay, and an external volume
/// range of 0..=15.
pub struct FmReceiverBuilder {
    command_timeout: Duration,
    power_down_delay: Duration,
    system_volume_max: u32,
    event_capacity: usize,
    initial_band: Band,
    wake_lock: Option<Arc<dyn WakeLock>>,
}

impl FmReceiverBuilder {
    /// Create a builder with default configuration.
    pub fn new() -> Self {
        FmReceiverBuilder {
            command_timeout: Duration::from_secs(4),
            power_down_delay: Duration::from_millis(50),
            system_volume_max: 15,
            event_capacity: 32,
            initial_band: Band::EuropeUs,
            wake_lock: None,
        }
    }

    /// Set the bound on every blocking completion wait (default: 4 s).
    pub fn command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }

    /// Set the delay between a disable/pause request and the hardware
    /// power-down (default: 50 ms).
    pub fn power_down_delay(mut self, delay: Duration) -> Self {
        self.power_down_delay = delay;
        self
    }

    /// Set the maximum of the external system volume scale (default: 15).
    ///
    /// Volume notifications are rescaled linearly from `0..=max` onto the
    /// hardware's `0..=70` range.
    pub fn system_volume_max(mut self, max: u32) -> Self {
        self.system_volume_max = max;
        self
    }

    /// Set the tuner event broadcast capacity (default: 32).
    pub fn event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }

    /// Set the band the receiver starts in (default: Europe/US).
    pub fn initial_band(mut self, band: Band) -> Self {
        self.initial_band = band;
        self
    }

    /// Provide the wake-lock implementation held across power-down
    /// delay windows. Defaults to a [`FlagWakeLock`].
    pub fn wake_lock(mut self, lock: Arc<dyn WakeLock>) -> Self {
        self.wake_lock = Some(lock);
        self
    }

    /// Build an [`FmReceiver`] wired to the given hardware bridge and its
    /// event channel.
    ///
    /// The receiver starts in the `Disabled` state with its event pump
    /// running.
    pub fn build(
        self,
        chip: Arc<dyn FmChip>,
        chip_events: mpsc::UnboundedReceiver<ChipEvent>,
    ) -> Result<FmReceiver> {
        if self.system_volume_max == 0 {
            return Err(Error::InvalidArgument(
                "system_volume_max must be at least 1".into(),
            ));
        }
        if self.event_capacity == 0 {
            return Err(Error::InvalidArgument(
                "event_capacity must be at least 1".into(),
            ));
        }

        let (event_tx, _) = broadcast::channel(self.event_capacity);
        let wake_lock = self
            .wake_lock
            .unwrap_or_else(|| Arc::new(FlagWakeLock::new()));

        let inner = Arc::new(Inner {
            chip,
            shared: Mutex::new(Shared::new(self.initial_band)),
            bridge: crate::bridge::CompletionBridge::new(),
            event_tx,
            wake_lock,
            command_timeout: self.command_timeout,
            power_down_delay: self.power_down_delay,
            system_volume_max: self.system_volume_max,
            power_down_task: Mutex::new(None),
        });
        let pump = pump::spawn_event_pump(inner.clone(), chip_events);

        Ok(FmReceiver {
            inner,
            pump: Mutex::new(Some(pump)),
        })
    }
}

impl Default for FmReceiverBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fmtuner_core::types::TunerState;
    use fmtuner_test_harness::MockChip;

    #[tokio::test]
    async fn builder_defaults_produce_disabled_receiver() {
        let (chip, events) = MockChip::new();
        let receiver = FmReceiverBuilder::new()
            .build(Arc::new(chip), events)
            .unwrap();
        assert_eq!(receiver.state(), TunerState::Disabled);
        assert!(!receiver.is_enabled());
    }

    #[tokio::test]
    async fn builder_rejects_zero_volume_max() {
        let (chip, events) = MockChip::new();
        let result = FmReceiverBuilder::new()
            .system_volume_max(0)
            .build(Arc::new(chip), events);
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }

    #[tokio::test]
    async fn builder_rejects_zero_event_capacity() {
        let (chip, events) = MockChip::new();
        let result = FmReceiverBuilder::new()
            .event_capacity(0)
            .build(Arc::new(chip), events);
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }

    #[tokio::test]
    async fn builder_fluent_chain() {
        let (chip, events) = MockChip::new();
        let receiver = FmReceiverBuilder::new()
            .command_timeout(Duration::from_millis(100))
            .power_down_delay(Duration::from_millis(10))
            .system_volume_max(20)
            .event_capacity(64)
            .initial_band(Band::Japan)
            .wake_lock(Arc::new(FlagWakeLock::new()))
            .build(Arc::new(chip), events)
            .unwrap();
        assert_eq!(receiver.state(), TunerState::Disabled);
    }
}
