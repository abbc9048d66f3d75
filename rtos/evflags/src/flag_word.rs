//! The 31-bit flag word and the three primitives that mutate it.
//!
//! Two interchangeable strategies are provided. [`MaskingWord`] runs every
//! read-modify-write inside a `critical-section`, which on single-core
//! Cortex-M masks interrupts and restores the previous PRIMASK state on exit.
//! [`ExclusiveWord`] uses lock-free atomics (LDREX/STREX retry loops on
//! Armv7-M) and never masks interrupts. [`FlagWord`] selects one at build
//! time through the `exclusive-access` feature.

use core::cell::Cell;
use critical_section::Mutex;
use portable_atomic::{AtomicU32, Ordering};
use rtos_core::{condition_met, FlagsOptions, FLAGS_MASK};

/// Indivisible operations on a flag word.
///
/// Bit 31 is never set by any operation.
pub trait FlagsPrimitive: Default + Sync {
    /// Name of the strategy, for diagnostics.
    const STRATEGY: &'static str;

    /// OR `flags` into the word and return the new value.
    fn set(&self, flags: u32) -> u32;

    /// Clear `flags` from the word and return the value before clearing.
    fn clear(&self, flags: u32) -> u32;

    /// Test the wait condition and, unless `NO_CLEAR` is given, clear the
    /// requested bits in the same indivisible step.
    ///
    /// Returns the word that satisfied the condition, `None` if it is not met.
    fn check(&self, flags: u32, options: FlagsOptions) -> Option<u32>;

    /// Snapshot of the word.
    fn load(&self) -> u32;

    /// Reset the word to zero.
    fn reset(&self);
}

/// Flag word protected by interrupt masking.
pub struct MaskingWord {
    word: Mutex<Cell<u32>>,
}

impl MaskingWord {
    pub const fn new() -> Self {
        Self {
            word: Mutex::new(Cell::new(0)),
        }
    }
}

impl Default for MaskingWord {
    fn default() -> Self {
        Self::new()
    }
}

impl FlagsPrimitive for MaskingWord {
    const STRATEGY: &'static str = "interrupt-masking";

    fn set(&self, flags: u32) -> u32 {
        critical_section::with(|cs| {
            let word = self.word.borrow(cs);
            let value = word.get() | (flags & FLAGS_MASK);
            word.set(value);
            value
        })
    }

    fn clear(&self, flags: u32) -> u32 {
        critical_section::with(|cs| {
            let word = self.word.borrow(cs);
            let prior = word.get();
            word.set(prior & !flags);
            prior
        })
    }

    fn check(&self, flags: u32, options: FlagsOptions) -> Option<u32> {
        if !options.auto_clear() {
            let value = self.load();
            return condition_met(value, flags, options).then_some(value);
        }
        critical_section::with(|cs| {
            let word = self.word.borrow(cs);
            let value = word.get();
            if !condition_met(value, flags, options) {
                return None;
            }
            word.set(value & !flags);
            Some(value)
        })
    }

    fn load(&self) -> u32 {
        critical_section::with(|cs| self.word.borrow(cs).get())
    }

    fn reset(&self) {
        critical_section::with(|cs| self.word.borrow(cs).set(0))
    }
}

/// Lock-free flag word.
pub struct ExclusiveWord {
    word: AtomicU32,
}

impl ExclusiveWord {
    pub const fn new() -> Self {
        Self {
            word: AtomicU32::new(0),
        }
    }
}

impl Default for ExclusiveWord {
    fn default() -> Self {
        Self::new()
    }
}

impl FlagsPrimitive for ExclusiveWord {
    const STRATEGY: &'static str = "exclusive-access";

    fn set(&self, flags: u32) -> u32 {
        let flags = flags & FLAGS_MASK;
        self.word.fetch_or(flags, Ordering::AcqRel) | flags
    }

    fn clear(&self, flags: u32) -> u32 {
        self.word.fetch_and(!flags, Ordering::AcqRel)
    }

    fn check(&self, flags: u32, options: FlagsOptions) -> Option<u32> {
        let mut value = self.word.load(Ordering::Acquire);
        if !options.auto_clear() {
            return condition_met(value, flags, options).then_some(value);
        }
        loop {
            if !condition_met(value, flags, options) {
                return None;
            }
            match self.word.compare_exchange_weak(
                value,
                value & !flags,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(prior) => return Some(prior),
                Err(actual) => value = actual,
            }
        }
    }

    fn load(&self) -> u32 {
        self.word.load(Ordering::Acquire)
    }

    fn reset(&self) {
        self.word.store(0, Ordering::Release);
    }
}

/// Flag word used by event-flags control blocks.
#[cfg(not(feature = "exclusive-access"))]
pub type FlagWord = MaskingWord;

/// Flag word used by event-flags control blocks.
#[cfg(feature = "exclusive-access")]
pub type FlagWord = ExclusiveWord;
