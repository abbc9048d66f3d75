//! Where control blocks come from and go back to.

use log::error;
use rtos_core::{BlockSource, OsError, OsResult, Ownership};

use crate::attr::CbMem;
use crate::cb::place;
use crate::config::EventFlagsConfig;
use crate::trace::LOG_TARGET;
use crate::EventFlagsCb;

/// Obtain an inactive control block: caller memory if given, otherwise the
/// pool, otherwise the heap.
pub(crate) fn obtain<'a>(
    mem: Option<CbMem<'a>>,
    config: &EventFlagsConfig<'a>,
) -> OsResult<(&'a EventFlagsCb<'a>, Ownership)> {
    match mem {
        Some(CbMem::Block(cb)) if cb.is_active() => Err(OsError::InvalidControlBlock),
        Some(CbMem::Block(cb)) => Ok((cb, Ownership::Borrowed)),
        Some(CbMem::Bytes(bytes)) => Ok((place(bytes)?, Ownership::Borrowed)),
        None => allocate(config),
    }
}

fn allocate<'a>(config: &EventFlagsConfig<'a>) -> OsResult<(&'a EventFlagsCb<'a>, Ownership)> {
    if let Some(cb) = config.pool.and_then(|pool| pool.alloc()) {
        return Ok((cb, Ownership::Owned(BlockSource::Pool)));
    }
    if let Some(cb) = config.heap.and_then(|heap| heap.alloc()) {
        return Ok((cb, Ownership::Owned(BlockSource::Heap)));
    }
    Err(OsError::NoMemory)
}

/// Return an owned control block to the allocator it came from.
pub(crate) fn release<'a>(cb: &'a EventFlagsCb<'a>, source: BlockSource, config: &EventFlagsConfig<'a>) {
    let allocator = match source {
        BlockSource::Pool => config.pool,
        BlockSource::Heap => config.heap,
    };
    match allocator.map(|allocator| allocator.free(cb)) {
        Some(Ok(())) => {}
        Some(Err(err)) => {
            error!(target: LOG_TARGET, "control block {:#x} not freed: {}", cb.address(), err)
        }
        None => error!(target: LOG_TARGET, "no {:?} allocator to free {:#x}", source, cb.address()),
    }
}
