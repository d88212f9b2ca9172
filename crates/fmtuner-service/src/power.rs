//! Wake lock and the delayed power-down sequencer.
//!
//! Tearing the tuner down immediately on `disable()` loses audio
//! de-pop and firmware shutdown time, so the power-down is deferred by a
//! short delay. The wake lock keeps the host awake across that window;
//! it is released unconditionally when the window closes, whether or not
//! the power-down proceeds.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, warn};

use fmtuner_core::chip::{ChipCommand, ChipStatus};
use fmtuner_core::types::TunerState;

use crate::state::Inner;

/// Keeps the host awake while a power-down is pending.
///
/// Embedders map this onto their platform's wake-lock facility. The
/// default [`FlagWakeLock`] just tracks the held state, which is also
/// what tests assert against.
pub trait WakeLock: Send + Sync {
    /// Acquire the lock. Acquiring an already-held lock is a no-op.
    fn acquire(&self);
    /// Release the lock. Releasing an unheld lock is a no-op.
    fn release(&self);
    /// Whether the lock is currently held.
    fn is_held(&self) -> bool;
}

/// A [`WakeLock`] that only records whether it is held.
#[derive(Debug, Default)]
pub struct FlagWakeLock {
    held: AtomicBool,
}

impl FlagWakeLock {
    /// Create an unheld lock.
    pub fn new() -> Self {
        FlagWakeLock::default()
    }
}

impl WakeLock for FlagWakeLock {
    fn acquire(&self) {
        self.held.store(true, Ordering::SeqCst);
    }

    fn release(&self) {
        self.held.store(false, Ordering::SeqCst);
    }

    fn is_held(&self) -> bool {
        self.held.load(Ordering::SeqCst)
    }
}

/// Spawn the delayed power-down sequencer.
///
/// After the delay window the sequencer releases the wake lock, re-checks
/// that the power-down is still wanted and the tuner still enabled
/// (abandoning silently if not), enters `Disabling`, and submits the
/// hardware disable, rolling the state back if the chip rejects it.
/// `target` is the state the disable completion lands in:
/// [`TunerState::Disabled`] for a plain disable, [`TunerState::Pause`] for
/// a pause.
pub(crate) fn spawn_power_down(inner: Arc<Inner>, target: TunerState) -> JoinHandle<()> {
    tokio::spawn(async move {
        sleep(inner.power_down_delay).await;

        if inner.wake_lock.is_held() {
            inner.wake_lock.release();
        }

        // A re-enable inside the window clears the pending flag; that
        // cancellation wins even if it raced the sleep. The transitional
        // state and target are recorded before the submit so the pump can
        // route a completion that arrives immediately.
        let proceed = {
            let mut shared = inner.shared.lock().unwrap();
            let pending = shared.power_down_pending;
            shared.power_down_pending = false;
            if pending && shared.state == TunerState::Enabled {
                shared.state = TunerState::Disabling;
                shared.disable_target = target;
                true
            } else {
                false
            }
        };
        if !proceed {
            debug!(%target, "power-down abandoned");
            return;
        }

        debug!(%target, "power-down submitted");
        let ack = inner.chip.submit(ChipCommand::Disable).await;
        if ack != ChipStatus::Pending {
            let mut shared = inner.shared.lock().unwrap();
            if shared.state == TunerState::Disabling {
                shared.state = TunerState::Enabled;
            }
            warn!(%ack, "power-down rejected by hardware");
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_wake_lock_tracks_held_state() {
        let lock = FlagWakeLock::new();
        assert!(!lock.is_held());
        lock.acquire();
        assert!(lock.is_held());
        lock.acquire();
        assert!(lock.is_held());
        lock.release();
        assert!(!lock.is_held());
        lock.release();
        assert!(!lock.is_held());
    }
}
