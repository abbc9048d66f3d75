use crate::{BlockAllocator, MemError, PoolStats};
use core::cell::RefCell;
use critical_section::Mutex;

/// A static pool of `N` pre-built blocks.
///
/// Every block is constructed once, when the pool is built, and never moves.
/// Allocation hands out the lowest-numbered free block.
pub struct StaticPool<T, const N: usize> {
    blocks: [T; N],
    free: Mutex<RefCell<heapless::Vec<usize, N>>>,
    stats: Mutex<RefCell<PoolStats>>,
}

impl<T: Default, const N: usize> StaticPool<T, N> {
    pub fn new() -> Self {
        Self::from_fn(|_| T::default())
    }
}

impl<T: Default, const N: usize> Default for StaticPool<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const N: usize> StaticPool<T, N> {
    /// Build the pool from a per-index block constructor
    pub fn from_fn(build: impl FnMut(usize) -> T) -> Self {
        let mut free = heapless::Vec::new();
        for index in (0..N).rev() {
            // capacity is exactly N
            let _ = free.push(index);
        }
        Self {
            blocks: core::array::from_fn(build),
            free: Mutex::new(RefCell::new(free)),
            stats: Mutex::new(RefCell::new(PoolStats::new(N))),
        }
    }

    /// Number of blocks in the pool
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Index of `block` inside this pool, if it is one of ours
    pub fn index_of(&self, block: &T) -> Option<usize> {
        self.blocks.iter().position(|b| core::ptr::eq(b, block))
    }
}

impl<T, const N: usize> BlockAllocator<T> for StaticPool<T, N> {
    fn alloc(&self) -> Option<&T> {
        critical_section::with(|cs| {
            let mut stats = self.stats.borrow_ref_mut(cs);
            match self.free.borrow_ref_mut(cs).pop() {
                Some(index) => {
                    stats.on_alloc();
                    Some(&self.blocks[index])
                }
                None => {
                    stats.on_failure();
                    None
                }
            }
        })
    }

    fn free(&self, block: &T) -> Result<(), MemError> {
        let index = self.index_of(block).ok_or(MemError::ForeignBlock)?;
        critical_section::with(|cs| {
            let mut free = self.free.borrow_ref_mut(cs);
            if free.contains(&index) {
                return Err(MemError::DoubleFree);
            }
            free.push(index).map_err(|_| MemError::DoubleFree)?;
            self.stats.borrow_ref_mut(cs).on_dealloc();
            Ok(())
        })
    }

    fn stats(&self) -> PoolStats {
        critical_section::with(|cs| *self.stats.borrow_ref(cs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_until_exhausted() {
        let pool: StaticPool<u32, 2> = StaticPool::new();
        let a = pool.alloc().unwrap();
        let b = pool.alloc().unwrap();
        assert!(!core::ptr::eq(a, b));
        assert!(pool.alloc().is_none());
        assert_eq!(pool.stats().failed_allocs, 1);
        assert!(pool.stats().is_exhausted());
    }

    #[test]
    fn free_detects_double_free() {
        let pool: StaticPool<u32, 2> = StaticPool::new();
        let a = pool.alloc().unwrap();
        assert_eq!(pool.free(a), Ok(()));
        assert_eq!(pool.free(a), Err(MemError::DoubleFree));
    }

    #[test]
    fn free_rejects_foreign_block() {
        let pool: StaticPool<u32, 2> = StaticPool::new();
        let other = 7u32;
        assert_eq!(pool.free(&other), Err(MemError::ForeignBlock));
    }

    #[test]
    fn lowest_block_first() {
        let pool: StaticPool<u8, 3> = StaticPool::from_fn(|i| i as u8);
        assert_eq!(*pool.alloc().unwrap(), 0);
        assert_eq!(*pool.alloc().unwrap(), 1);
    }
}
