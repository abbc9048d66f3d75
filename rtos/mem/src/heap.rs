use crate::{BlockAllocator, MemError, PoolStats};
use alloc::boxed::Box;
use alloc::vec::Vec;
use core::cell::RefCell;
use critical_section::Mutex;

struct Blocks<T> {
    boxed: Vec<Box<T>>,
    free: Vec<usize>,
}

/// A pool that grows from the global allocator.
///
/// Each block is boxed on first use and recycled after `free`; blocks are only
/// released when the pool itself is dropped. `limit` caps the number of blocks
/// the pool will ever own.
pub struct HeapPool<T> {
    blocks: Mutex<RefCell<Blocks<T>>>,
    stats: Mutex<RefCell<PoolStats>>,
    limit: usize,
}

impl<T> HeapPool<T> {
    /// Create a pool that never owns more than `limit` blocks
    pub const fn with_limit(limit: usize) -> Self {
        Self {
            blocks: Mutex::new(RefCell::new(Blocks {
                boxed: Vec::new(),
                free: Vec::new(),
            })),
            stats: Mutex::new(RefCell::new(PoolStats::new(0))),
            limit,
        }
    }

    /// Create an unbounded pool
    pub const fn new() -> Self {
        Self::with_limit(usize::MAX)
    }

    pub const fn limit(&self) -> usize {
        self.limit
    }
}

impl<T> Default for HeapPool<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Default> BlockAllocator<T> for HeapPool<T> {
    fn alloc(&self) -> Option<&T> {
        let block: *const T = critical_section::with(|cs| {
            let mut blocks = self.blocks.borrow_ref_mut(cs);
            let mut stats = self.stats.borrow_ref_mut(cs);
            let index = match blocks.free.pop() {
                Some(index) => index,
                None if blocks.boxed.len() < self.limit => {
                    blocks.boxed.push(Box::new(T::default()));
                    stats.on_grow();
                    blocks.boxed.len() - 1
                }
                None => {
                    stats.on_failure();
                    return core::ptr::null();
                }
            };
            stats.on_alloc();
            &*blocks.boxed[index] as *const T
        });
        // SAFETY: boxes are never removed or replaced while the pool lives, so
        // the pointee stays put even when the vector of boxes reallocates.
        // Blocks are only reachable through shared references.
        unsafe { block.as_ref() }
    }

    fn free(&self, block: &T) -> Result<(), MemError> {
        critical_section::with(|cs| {
            let mut blocks = self.blocks.borrow_ref_mut(cs);
            let index = blocks
                .boxed
                .iter()
                .position(|b| core::ptr::eq(&**b, block))
                .ok_or(MemError::ForeignBlock)?;
            if blocks.free.contains(&index) {
                return Err(MemError::DoubleFree);
            }
            blocks.free.push(index);
            self.stats.borrow_ref_mut(cs).on_dealloc();
            Ok(())
        })
    }

    fn stats(&self) -> PoolStats {
        critical_section::with(|cs| *self.stats.borrow_ref(cs))
    }
}
