//! Head of an object's list of waiting threads.
//!
//! The links between waiting threads live in the scheduler's thread records,
//! so a thread can be unlinked in O(1) from whatever list it is on, for
//! example when its timeout expires. The object only stores the two ends.

use core::cell::Cell;
use core::fmt;
use critical_section::{CriticalSection, Mutex};

use crate::ThreadId;

/// First and last thread of a wait list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ListEnds {
    pub head: Option<ThreadId>,
    pub tail: Option<ThreadId>,
}

/// FIFO of threads blocked on one kernel object.
///
/// Only a [`Scheduler`](crate::Scheduler) implementation links and unlinks
/// threads; objects read the ends to walk the list.
pub struct WaitList {
    ends: Mutex<Cell<ListEnds>>,
}

impl WaitList {
    pub const fn new() -> Self {
        Self {
            ends: Mutex::new(Cell::new(ListEnds {
                head: None,
                tail: None,
            })),
        }
    }

    pub fn ends(&self, cs: CriticalSection<'_>) -> ListEnds {
        self.ends.borrow(cs).get()
    }

    pub fn set_ends(&self, cs: CriticalSection<'_>, ends: ListEnds) {
        self.ends.borrow(cs).set(ends);
    }

    /// First waiting thread
    pub fn head(&self) -> Option<ThreadId> {
        critical_section::with(|cs| self.ends(cs).head)
    }

    pub fn is_empty(&self) -> bool {
        self.head().is_none()
    }
}

impl Default for WaitList {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for WaitList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ends = critical_section::with(|cs| self.ends(cs));
        f.debug_struct("WaitList")
            .field("head", &ends.head)
            .field("tail", &ends.tail)
            .finish()
    }
}
