//! Thread identity and state as seen by kernel wait objects.

use core::fmt;
use rtos_core::OsError;

/// Thread identifier, an index into the scheduler's thread arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ThreadId(pub u8);

impl ThreadId {
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ThreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

/// Thread priority. Higher values run first; `0` is not a valid priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ThreadPriority(pub u8);

impl ThreadPriority {
    pub const IDLE: Self = Self(1);
    pub const LOW: Self = Self(8);
    pub const NORMAL: Self = Self(24);
    pub const ABOVE_NORMAL: Self = Self(32);
    pub const HIGH: Self = Self(40);
    pub const REALTIME: Self = Self(48);

    pub const fn is_valid(self) -> bool {
        self.0 != 0
    }
}

/// What a blocked thread is waiting for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WaitReason {
    Delay,
    EventFlags,
    Semaphore,
    Mutex,
    MessageQueue,
}

/// Thread execution state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThreadState {
    /// Thread is ready to run.
    Ready,
    /// Thread is currently executing.
    Running,
    /// Thread is suspended until woken, deleted out from under or timed out.
    Blocked(WaitReason),
}

impl ThreadState {
    pub const fn is_blocked(self) -> bool {
        matches!(self, ThreadState::Blocked(_))
    }
}

/// Value delivered to a thread when its wait ends.
pub type WaitResult = Result<u32, OsError>;

#[cfg(feature = "defmt")]
impl defmt::Format for ThreadId {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "T{=u8}", self.0);
    }
}
