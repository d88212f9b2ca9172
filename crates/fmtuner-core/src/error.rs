//! Error types for fmtuner.
//!
//! All fallible operations across the library return [`Result<T>`], which
//! uses [`Error`] as the error type. Admission failures, hardware
//! rejections, and completion timeouts are all captured here.

use crate::chip::ChipStatus;
use crate::types::TunerState;

/// The error type for all fmtuner operations.
///
/// Variants cover the full range of failure modes of the control core:
/// capability checks, state and busy-flag admission, argument validation,
/// immediate hardware rejection, and bounded completion waits.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The caller lacks the capability required for this operation.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// The operation is not permitted in the tuner's current state.
    #[error("operation not permitted in state {0}")]
    NotEnabled(TunerState),

    /// An exclusive operation is already in progress.
    #[error("busy: {0}")]
    Busy(String),

    /// An invalid argument was passed to a tuner operation.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The hardware driver rejected the command at submission.
    #[error("rejected by tuner hardware: {0}")]
    HardwareRejected(ChipStatus),

    /// Timed out waiting for a command completion from the hardware.
    ///
    /// The completion may still arrive later; in-progress flags are
    /// cleared only by the completion itself, never by this timeout.
    #[error("timeout waiting for tuner completion")]
    Timeout,

    /// The requested capability is not present in this hardware revision.
    #[error("not supported: {0}")]
    NotSupported(String),

    /// The control core has been destroyed or its event pump has exited.
    #[error("tuner control core is shut down")]
    Closed,
}

/// A convenience `Result` alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_permission_denied() {
        let e = Error::PermissionDenied("set_band requires admin".into());
        assert_eq!(e.to_string(), "permission denied: set_band requires admin");
    }

    #[test]
    fn error_display_not_enabled() {
        let e = Error::NotEnabled(TunerState::Disabled);
        assert_eq!(e.to_string(), "operation not permitted in state disabled");
    }

    #[test]
    fn error_display_busy() {
        let e = Error::Busy("seek in progress".into());
        assert_eq!(e.to_string(), "busy: seek in progress");
    }

    #[test]
    fn error_display_invalid_argument() {
        let e = Error::InvalidArgument("frequency out of band".into());
        assert_eq!(e.to_string(), "invalid argument: frequency out of band");
    }

    #[test]
    fn error_display_hardware_rejected() {
        let e = Error::HardwareRejected(ChipStatus::Failed);
        assert_eq!(e.to_string(), "rejected by tuner hardware: failed");
    }

    #[test]
    fn error_display_timeout() {
        let e = Error::Timeout;
        assert_eq!(e.to_string(), "timeout waiting for tuner completion");
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}
        assert_send::<Error>();
        assert_sync::<Error>();
    }

    #[test]
    fn error_implements_std_error() {
        fn assert_std_error<T: std::error::Error>() {}
        assert_std_error::<Error>();
    }

    #[test]
    fn result_alias_works() {
        let ok: Result<u32> = Ok(42);
        assert!(matches!(ok, Ok(42)));
        let err: Result<u32> = Err(Error::Timeout);
        assert!(err.is_err());
    }
}
