//! The completion bridge: single-slot rendezvous between dispatcher
//! callers and chip completion events.
//!
//! Each command kind that blocks its caller owns one capacity-1 channel.
//! The calling side locks the slot (serializing callers of the same
//! kind), drains any stale token left over from an earlier timeout,
//! submits its command, and waits for the token with a bounded timeout.
//! The event pump posts tokens as completions arrive; a token posted
//! while nobody waits sits in the slot until the next caller drains it.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::sync::MutexGuard;
use tokio::time::timeout;
use tracing::{debug, warn};

use fmtuner_core::chip::{ChipStatus, CommandKind};
use fmtuner_core::error::{Error, Result};

/// Command kinds whose callers block on a completion token.
const BRIDGED_KINDS: &[CommandKind] = &[
    CommandKind::SetBand,
    CommandKind::GetBand,
    CommandKind::SetMonoStereoMode,
    CommandKind::GetMonoStereoMode,
    CommandKind::SetMuteMode,
    CommandKind::GetMuteMode,
    CommandKind::SetRfDependentMute,
    CommandKind::GetRfDependentMute,
    CommandKind::SetRssiThreshold,
    CommandKind::GetRssiThreshold,
    CommandKind::GetRssi,
    CommandKind::SetDeEmphasisFilter,
    CommandKind::GetDeEmphasisFilter,
    CommandKind::SetChannelSpacing,
    CommandKind::GetChannelSpacing,
    CommandKind::Tune,
    CommandKind::GetTunedFrequency,
    CommandKind::Seek,
    CommandKind::StopSeek,
    CommandKind::StopCompleteScan,
    CommandKind::GetCompleteScanProgress,
    CommandKind::SetRdsSystem,
    CommandKind::GetRdsSystem,
    CommandKind::EnableRds,
    CommandKind::DisableRds,
    CommandKind::SetRdsGroupMask,
    CommandKind::GetRdsGroupMask,
    CommandKind::SetRdsAfSwitchMode,
    CommandKind::GetRdsAfSwitchMode,
    CommandKind::IsValidChannel,
    CommandKind::GetFwVersion,
];

struct Slot {
    tx: mpsc::Sender<ChipStatus>,
    rx: tokio::sync::Mutex<mpsc::Receiver<ChipStatus>>,
}

/// One single-slot rendezvous per bridged command kind.
pub(crate) struct CompletionBridge {
    slots: HashMap<CommandKind, Slot>,
}

impl CompletionBridge {
    pub(crate) fn new() -> Self {
        let mut slots = HashMap::with_capacity(BRIDGED_KINDS.len());
        for &kind in BRIDGED_KINDS {
            let (tx, rx) = mpsc::channel(1);
            slots.insert(
                kind,
                Slot {
                    tx,
                    rx: tokio::sync::Mutex::new(rx),
                },
            );
        }
        CompletionBridge { slots }
    }

    /// Lock the slot for `kind` and discard any stale token.
    ///
    /// Holding the returned guard serializes all callers of the same
    /// command kind through the issue-then-wait protocol.
    pub(crate) async fn acquire(&self, kind: CommandKind) -> Result<SlotGuard<'_>> {
        let slot = self
            .slots
            .get(&kind)
            .ok_or_else(|| Error::InvalidArgument(format!("no completion slot for {kind}")))?;
        let mut rx = slot.rx.lock().await;
        while rx.try_recv().is_ok() {
            debug!(%kind, "discarded stale completion token");
        }
        Ok(SlotGuard { kind, rx })
    }

    /// Discard any stale token for `kind` without keeping the slot.
    pub(crate) async fn drain(&self, kind: CommandKind) {
        if let Some(slot) = self.slots.get(&kind) {
            let mut rx = slot.rx.lock().await;
            while rx.try_recv().is_ok() {
                debug!(%kind, "discarded stale completion token");
            }
        }
    }

    /// Post a completion token for `kind`.
    ///
    /// Kinds without a slot, and a slot already holding a token, are
    /// ignored; the pump calls this for every completion event.
    pub(crate) fn post(&self, kind: CommandKind, status: ChipStatus) {
        if let Some(slot) = self.slots.get(&kind) {
            let _ = slot.tx.try_send(status);
        }
    }
}

/// Exclusive access to one command kind's completion slot.
pub(crate) struct SlotGuard<'a> {
    kind: CommandKind,
    rx: MutexGuard<'a, mpsc::Receiver<ChipStatus>>,
}

impl SlotGuard<'_> {
    /// Wait for the completion token, up to `bound`.
    ///
    /// A timeout leaves the slot empty; if the completion arrives later
    /// its token is drained by the next caller.
    pub(crate) async fn wait(&mut self, bound: Duration) -> Result<ChipStatus> {
        match timeout(bound, self.rx.recv()).await {
            Ok(Some(status)) => Ok(status),
            Ok(None) => Err(Error::Closed),
            Err(_) => {
                warn!(kind = %self.kind, "timed out waiting for completion");
                Err(Error::Timeout)
            }
        }
    }
}
