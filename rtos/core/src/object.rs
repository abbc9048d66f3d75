//! Kernel object identity, lifecycle state and control-block ownership

use core::fmt;

/// Kind tag stored at the start of every control block.
///
/// Services check the tag before touching an object so that a handle to
/// freed, foreign or never-initialized memory is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ObjectKind {
    /// Not a kernel object.
    Invalid = 0x00,
    Thread = 0xF1,
    Timer = 0xF2,
    EventFlags = 0xF3,
    Mutex = 0xF5,
    Semaphore = 0xF6,
    MemoryPool = 0xF7,
    MessageQueue = 0xFA,
}

impl ObjectKind {
    /// Decode a raw tag; unknown values map to [`ObjectKind::Invalid`].
    pub const fn from_raw(raw: u8) -> Self {
        match raw {
            0xF1 => ObjectKind::Thread,
            0xF2 => ObjectKind::Timer,
            0xF3 => ObjectKind::EventFlags,
            0xF5 => ObjectKind::Mutex,
            0xF6 => ObjectKind::Semaphore,
            0xF7 => ObjectKind::MemoryPool,
            0xFA => ObjectKind::MessageQueue,
            _ => ObjectKind::Invalid,
        }
    }

    /// Raw tag value
    pub const fn raw(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ObjectKind::Invalid => "invalid",
            ObjectKind::Thread => "thread",
            ObjectKind::Timer => "timer",
            ObjectKind::EventFlags => "event flags",
            ObjectKind::Mutex => "mutex",
            ObjectKind::Semaphore => "semaphore",
            ObjectKind::MemoryPool => "memory pool",
            ObjectKind::MessageQueue => "message queue",
        };
        f.write_str(name)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for ObjectKind {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "ObjectKind({=u8:#x})", self.raw());
    }
}

/// Lifecycle state of a kernel object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum ObjectState {
    /// Never created, or deleted. No service may operate on it.
    #[default]
    Inactive = 0,
    /// Between successful creation and deletion.
    Active = 1,
}

impl ObjectState {
    /// Decode a raw state; anything but `1` is inactive.
    pub const fn from_raw(raw: u8) -> Self {
        if raw == ObjectState::Active as u8 {
            ObjectState::Active
        } else {
            ObjectState::Inactive
        }
    }

    /// Check if the object may be operated on
    pub const fn is_active(self) -> bool {
        matches!(self, ObjectState::Active)
    }
}

/// Allocator a subsystem-owned control block came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockSource {
    /// Fixed-size block pool dedicated to the object kind.
    Pool,
    /// General-purpose heap.
    Heap,
}

/// Who owns the memory of a control block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Ownership {
    /// Supplied by the caller; the kernel never frees it.
    #[default]
    Borrowed,
    /// Allocated by the kernel and returned to `BlockSource` on deletion.
    Owned(BlockSource),
}

impl Ownership {
    /// Check if the kernel must free the block on deletion
    pub const fn is_owned(self) -> bool {
        matches!(self, Ownership::Owned(_))
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Ownership {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Ownership::Borrowed => defmt::write!(fmt, "Borrowed"),
            Ownership::Owned(BlockSource::Pool) => defmt::write!(fmt, "Owned(Pool)"),
            Ownership::Owned(BlockSource::Heap) => defmt::write!(fmt, "Owned(Heap)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_round_trips_known_tags() {
        for kind in [
            ObjectKind::Thread,
            ObjectKind::EventFlags,
            ObjectKind::Semaphore,
            ObjectKind::MessageQueue,
        ] {
            assert_eq!(ObjectKind::from_raw(kind.raw()), kind);
        }
        assert_eq!(ObjectKind::from_raw(0x42), ObjectKind::Invalid);
    }

    #[test]
    fn state_decoding() {
        assert!(ObjectState::from_raw(1).is_active());
        assert!(!ObjectState::from_raw(0).is_active());
        assert!(!ObjectState::from_raw(7).is_active());
    }
}
