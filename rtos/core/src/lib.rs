#![no_std]
#![forbid(unsafe_code)]

//! # RTOS Core
//!
//! Types shared by every kernel object and by the scheduler: the error
//! taxonomy, object kind tags and lifecycle states, control-block ownership,
//! flag masks with their wait options, and wait timeouts.

use thiserror::Error;

pub mod flags;
pub mod object;
pub mod time;

pub use flags::*;
pub use object::*;
pub use time::*;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Result type used throughout the kernel objects
pub type OsResult<T> = Result<T, OsError>;

/// Errors reported by kernel object services.
///
/// Every error is returned synchronously to the immediate caller. None of them
/// leaves the object it refers to partially modified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum OsError {
    /// A blocking wait expired before its condition was met.
    #[error("operation timed out")]
    Timeout,
    /// Object inactive, condition not met without waiting, or object deleted
    /// while the caller was waiting.
    #[error("resource not available")]
    Resource,
    /// Malformed handle, out-of-range flags or an interrupt-context wait with
    /// a timeout.
    #[error("invalid parameter")]
    Parameter,
    /// No control block could be allocated.
    #[error("out of memory")]
    NoMemory,
    /// Service not callable from interrupt context.
    #[error("not allowed in interrupt context")]
    Isr,
    /// Caller-supplied control-block memory is misaligned or too small.
    #[error("invalid control block memory")]
    InvalidControlBlock,
    /// A blocking service was called without a running thread.
    #[error("kernel is not running")]
    KernelNotRunning,
}

impl OsError {
    /// Negative status code of this error.
    ///
    /// The first five follow the CMSIS status numbering (`osErrorTimeout` = -2
    /// ... `osErrorISR` = -6). The kernel-specific errors use the RTX
    /// event-recorder numbers (`osRtxErrorKernelNotRunning` = -8,
    /// `osRtxErrorInvalidControlBlock` = -9), so every error decodes back to
    /// itself.
    pub const fn status_code(self) -> i32 {
        match self {
            OsError::Timeout => -2,
            OsError::Resource => -3,
            OsError::Parameter => -4,
            OsError::NoMemory => -5,
            OsError::Isr => -6,
            OsError::KernelNotRunning => -8,
            OsError::InvalidControlBlock => -9,
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for OsError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            OsError::Timeout => defmt::write!(fmt, "Timeout"),
            OsError::Resource => defmt::write!(fmt, "Resource"),
            OsError::Parameter => defmt::write!(fmt, "Parameter"),
            OsError::NoMemory => defmt::write!(fmt, "NoMemory"),
            OsError::Isr => defmt::write!(fmt, "Isr"),
            OsError::InvalidControlBlock => defmt::write!(fmt, "InvalidControlBlock"),
            OsError::KernelNotRunning => defmt::write!(fmt, "KernelNotRunning"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_are_negative() {
        let all = [
            OsError::Timeout,
            OsError::Resource,
            OsError::Parameter,
            OsError::NoMemory,
            OsError::Isr,
            OsError::InvalidControlBlock,
            OsError::KernelNotRunning,
        ];
        for err in all {
            assert!(err.status_code() < 0, "{err:?}");
        }
        assert_eq!(OsError::Parameter.status_code(), -4);
        assert_eq!(OsError::Isr.status_code(), -6);
        assert_ne!(
            OsError::InvalidControlBlock.status_code(),
            OsError::KernelNotRunning.status_code()
        );
    }
}
