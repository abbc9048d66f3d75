use rtos_mem::BlockAllocator;

use crate::trace::{EventRecorder, LogRecorder};
use crate::EventFlagsCb;

/// Allocator of subsystem-owned control blocks.
pub type CbAllocator<'a> = dyn BlockAllocator<EventFlagsCb<'a>> + 'a;

/// Runtime configuration of an event-flags service.
///
/// Objects created without caller memory come from `pool`, falling back to
/// `heap` when the pool is absent or exhausted. With neither, such creation
/// fails with [`OsError::NoMemory`](rtos_core::OsError::NoMemory).
#[derive(Clone, Copy)]
pub struct EventFlagsConfig<'a> {
    pub pool: Option<&'a CbAllocator<'a>>,
    pub heap: Option<&'a CbAllocator<'a>>,
    pub recorder: &'a dyn EventRecorder,
}

impl Default for EventFlagsConfig<'_> {
    fn default() -> Self {
        Self {
            pool: None,
            heap: None,
            recorder: &LogRecorder,
        }
    }
}

impl<'a> EventFlagsConfig<'a> {
    /// Creates a new configuration builder.
    pub fn builder() -> EventFlagsConfigBuilder<'a> {
        EventFlagsConfigBuilder::default()
    }
}

/// Builder for [`EventFlagsConfig`].
#[derive(Default)]
pub struct EventFlagsConfigBuilder<'a> {
    config: EventFlagsConfig<'a>,
}

impl<'a> EventFlagsConfigBuilder<'a> {
    /// Sets the dedicated control-block pool.
    pub fn pool(mut self, pool: &'a CbAllocator<'a>) -> Self {
        self.config.pool = Some(pool);
        self
    }

    /// Sets the general-purpose fallback allocator.
    pub fn heap(mut self, heap: &'a CbAllocator<'a>) -> Self {
        self.config.heap = Some(heap);
        self
    }

    /// Sets the recorder that receives event-flags records.
    pub fn recorder(mut self, recorder: &'a dyn EventRecorder) -> Self {
        self.config.recorder = recorder;
        self
    }

    pub fn build(self) -> EventFlagsConfig<'a> {
        self.config
    }
}
