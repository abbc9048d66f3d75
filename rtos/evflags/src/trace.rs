//! Event recorder hooks.
//!
//! Every service reports its milestones as a [`Record`]. Records are purely
//! observational: a recorder cannot influence the operation that emitted it.
//! Objects are identified by the address of their control block.

use log::Level;
use rtos_core::{FlagsOptions, OsError, Timeout};

/// Log target used by [`LogRecorder`].
pub const LOG_TARGET: &str = "rtos::evflags";

/// Stable numeric identifiers of the records, for binary trace back-ends.
pub mod records {
    pub const ERROR: u8 = 0;
    pub const NEW: u8 = 1;
    pub const CREATED: u8 = 2;
    pub const GET_NAME: u8 = 3;
    pub const SET: u8 = 4;
    pub const SET_DONE: u8 = 5;
    pub const CLEAR: u8 = 6;
    pub const CLEAR_DONE: u8 = 7;
    pub const GET: u8 = 8;
    pub const WAIT: u8 = 9;
    pub const WAIT_PENDING: u8 = 10;
    pub const WAIT_TIMEOUT: u8 = 11;
    pub const WAIT_COMPLETED: u8 = 12;
    pub const WAIT_NOT_COMPLETED: u8 = 13;
    pub const DELETE: u8 = 14;
    pub const DESTROYED: u8 = 15;
}

/// One event-flags milestone.
///
/// `obj` is the control-block address, `0` when no object is involved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Record<'r> {
    Error { obj: usize, error: OsError },
    New { name: Option<&'r str> },
    Created { obj: usize, name: Option<&'r str> },
    GetName { obj: usize, name: Option<&'r str> },
    Set { obj: usize, flags: u32 },
    SetDone { obj: usize, flags: u32 },
    Clear { obj: usize, flags: u32 },
    ClearDone { obj: usize, flags: u32 },
    Get { obj: usize, flags: u32 },
    Wait { obj: usize, flags: u32, options: FlagsOptions, timeout: Timeout },
    WaitPending { obj: usize, flags: u32, options: FlagsOptions, timeout: Timeout },
    WaitTimeout { obj: usize },
    WaitCompleted { obj: usize, flags: u32, options: FlagsOptions, result: u32 },
    WaitNotCompleted { obj: usize, flags: u32, options: FlagsOptions },
    Delete { obj: usize },
    Destroyed { obj: usize },
}

impl Record<'_> {
    pub const fn id(&self) -> u8 {
        use records::*;
        match self {
            Record::Error { .. } => ERROR,
            Record::New { .. } => NEW,
            Record::Created { .. } => CREATED,
            Record::GetName { .. } => GET_NAME,
            Record::Set { .. } => SET,
            Record::SetDone { .. } => SET_DONE,
            Record::Clear { .. } => CLEAR,
            Record::ClearDone { .. } => CLEAR_DONE,
            Record::Get { .. } => GET,
            Record::Wait { .. } => WAIT,
            Record::WaitPending { .. } => WAIT_PENDING,
            Record::WaitTimeout { .. } => WAIT_TIMEOUT,
            Record::WaitCompleted { .. } => WAIT_COMPLETED,
            Record::WaitNotCompleted { .. } => WAIT_NOT_COMPLETED,
            Record::Delete { .. } => DELETE,
            Record::Destroyed { .. } => DESTROYED,
        }
    }

    /// Log level the record is reported at by [`LogRecorder`]
    pub const fn level(&self) -> Level {
        match self {
            Record::Error { .. } => Level::Warn,
            Record::Created { .. } | Record::Destroyed { .. } => Level::Debug,
            Record::WaitPending { .. }
            | Record::WaitTimeout { .. }
            | Record::WaitCompleted { .. }
            | Record::WaitNotCompleted { .. } => Level::Debug,
            _ => Level::Trace,
        }
    }
}

/// Receiver of event-flags records.
pub trait EventRecorder: Sync {
    fn record(&self, record: &Record<'_>);
}

/// Forwards records to the `log` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogRecorder;

impl EventRecorder for LogRecorder {
    fn record(&self, record: &Record<'_>) {
        log::log!(target: LOG_TARGET, record.level(), "[{}] {:?}", record.id(), record);
    }
}

/// Discards every record.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullRecorder;

impl EventRecorder for NullRecorder {
    fn record(&self, _record: &Record<'_>) {}
}
