#![no_std]
#![allow(unsafe_code)] // The heap pool hands out references into boxed blocks

//! # RTOS Memory Management
//!
//! Control-block memory for kernel objects. A [`StaticPool`] holds a fixed
//! number of pre-built blocks of one object kind; a [`HeapPool`] grows on
//! demand and is used as the fallback when the pool is absent or exhausted.
//! Both sit behind [`BlockAllocator`] so services can take either.

extern crate alloc;

use rtos_core::OsError;
use thiserror::Error;

pub mod heap;
pub mod pools;

pub use heap::*;
pub use pools::*;

/// Allocator of fixed-size blocks of `T`.
///
/// Blocks are handed out already constructed. A block stays at the same
/// address for as long as the allocator lives, including after `free`.
pub trait BlockAllocator<T> {
    /// Take a free block, `None` if none is available.
    fn alloc(&self) -> Option<&T>;

    /// Return a block obtained from [`BlockAllocator::alloc`] on this allocator.
    fn free(&self, block: &T) -> Result<(), MemError>;

    /// Current usage statistics
    fn stats(&self) -> PoolStats;

    /// Size of one block in bytes
    fn block_size(&self) -> usize {
        core::mem::size_of::<T>()
    }
}

/// Allocator failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MemError {
    /// No free block and no room to grow.
    #[error("no free block available")]
    Exhausted,
    /// The block does not belong to this allocator.
    #[error("block does not belong to this allocator")]
    ForeignBlock,
    /// The block is already free.
    #[error("block freed twice")]
    DoubleFree,
}

impl From<MemError> for OsError {
    fn from(_: MemError) -> Self {
        OsError::NoMemory
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for MemError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            MemError::Exhausted => defmt::write!(fmt, "Exhausted"),
            MemError::ForeignBlock => defmt::write!(fmt, "ForeignBlock"),
            MemError::DoubleFree => defmt::write!(fmt, "DoubleFree"),
        }
    }
}

/// Pool statistics for debugging and monitoring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PoolStats {
    /// Blocks the allocator currently owns
    pub total_blocks: usize,
    pub free_blocks: usize,
    pub used_blocks: usize,
    /// Low-water mark of `free_blocks`
    pub min_free_blocks: usize,
    /// Allocation requests that could not be served
    pub failed_allocs: usize,
}

impl PoolStats {
    pub const fn new(total_blocks: usize) -> Self {
        Self {
            total_blocks,
            free_blocks: total_blocks,
            used_blocks: 0,
            min_free_blocks: total_blocks,
            failed_allocs: 0,
        }
    }

    pub fn on_alloc(&mut self) {
        self.used_blocks += 1;
        self.free_blocks = self.free_blocks.saturating_sub(1);
        if self.free_blocks < self.min_free_blocks {
            self.min_free_blocks = self.free_blocks;
        }
    }

    pub fn on_dealloc(&mut self) {
        if self.used_blocks > 0 {
            self.used_blocks -= 1;
            self.free_blocks += 1;
        }
    }

    /// A new block was added to a growable allocator
    pub fn on_grow(&mut self) {
        self.total_blocks += 1;
        self.free_blocks += 1;
    }

    pub fn on_failure(&mut self) {
        self.failed_allocs += 1;
    }

    /// Check if no block is free
    pub const fn is_exhausted(&self) -> bool {
        self.free_blocks == 0
    }

    /// Check if no block is in use
    pub const fn is_idle(&self) -> bool {
        self.used_blocks == 0
    }

    /// Utilization as a percentage (0-100)
    pub fn utilization(&self) -> u8 {
        if self.total_blocks == 0 {
            0
        } else {
            ((self.used_blocks * 100) / self.total_blocks) as u8
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for PoolStats {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(
            fmt,
            "PoolStats{{ total: {}, free: {}, used: {}, min_free: {}, failed: {} }}",
            self.total_blocks,
            self.free_blocks,
            self.used_blocks,
            self.min_free_blocks,
            self.failed_allocs
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_track_low_water_mark() {
        let mut stats = PoolStats::new(4);
        stats.on_alloc();
        stats.on_alloc();
        stats.on_dealloc();
        assert_eq!(stats.used_blocks, 1);
        assert_eq!(stats.free_blocks, 3);
        assert_eq!(stats.min_free_blocks, 2);
        assert_eq!(stats.utilization(), 25);
    }

    #[test]
    fn stats_grow() {
        let mut stats = PoolStats::new(0);
        assert!(stats.is_exhausted());
        stats.on_grow();
        stats.on_alloc();
        assert_eq!(stats.total_blocks, 1);
        assert!(stats.is_exhausted());
        assert!(!stats.is_idle());
    }

    #[test]
    fn mem_errors_become_no_memory() {
        assert_eq!(OsError::from(MemError::Exhausted), OsError::NoMemory);
        assert_eq!(OsError::from(MemError::DoubleFree), OsError::NoMemory);
    }
}
