//! Context-dispatching entry points.

use log::debug;
use rtos_core::{FlagsOptions, OsError, OsResult, Timeout};
use rtos_sched::Scheduler;

use crate::attr::EventFlagsAttr;
use crate::config::EventFlagsConfig;
use crate::context::{ExecutionContext, IsrContext, ThreadContext};
use crate::flag_word::{FlagWord, FlagsPrimitive};
use crate::trace::{Record, LOG_TARGET};
use crate::EventFlagsId;

/// Outcome of a wait that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// The condition held; carries the flags that satisfied it.
    Completed(u32),
    /// The caller was suspended. Its wait result is delivered by the
    /// scheduler when the wait ends.
    Blocked,
}

impl WaitOutcome {
    pub const fn completed(self) -> Option<u32> {
        match self {
            WaitOutcome::Completed(flags) => Some(flags),
            WaitOutcome::Blocked => None,
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for WaitOutcome {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            WaitOutcome::Completed(flags) => defmt::write!(fmt, "Completed({=u32:#x})", flags),
            WaitOutcome::Blocked => defmt::write!(fmt, "Blocked"),
        }
    }
}

/// Event-flags services bound to one scheduler and allocator configuration.
///
/// Every entry point records the call, infers the execution context and
/// forwards to [`ThreadContext`] or [`IsrContext`]. Services with no
/// interrupt-context form fail with [`OsError::Isr`] there.
pub struct EventFlagsService<'a, S> {
    sched: &'a S,
    config: EventFlagsConfig<'a>,
}

impl<'a, S> EventFlagsService<'a, S> {
    pub fn new(sched: &'a S, config: EventFlagsConfig<'a>) -> Self {
        debug!(target: LOG_TARGET, "event flags with {} primitives", FlagWord::STRATEGY);
        Self { sched, config }
    }

    pub fn scheduler(&self) -> &'a S {
        self.sched
    }

    pub fn config(&self) -> &EventFlagsConfig<'a> {
        &self.config
    }

    pub(crate) fn record(&self, record: Record<'_>) {
        self.config.recorder.record(&record);
    }
}

impl<'a, S: Scheduler<'a>> EventFlagsService<'a, S> {
    /// Capability for the caller's execution context.
    pub fn context(&self) -> ExecutionContext<'_, 'a, S> {
        if self.sched.in_isr() {
            ExecutionContext::Isr(IsrContext::new(self))
        } else {
            ExecutionContext::Thread(ThreadContext::new(self))
        }
    }

    /// Create an event-flags object. Not allowed in interrupt context.
    pub fn create(&self, attr: EventFlagsAttr<'a>) -> OsResult<EventFlagsId<'a>> {
        self.record(Record::New { name: attr.name });
        match self.context() {
            ExecutionContext::Thread(ctx) => ctx.create(attr),
            ExecutionContext::Isr(_) => self.isr_error(0),
        }
    }

    /// Name of an active object; always `None` in interrupt context.
    pub fn name(&self, id: EventFlagsId<'a>) -> Option<&'a str> {
        match self.context() {
            ExecutionContext::Thread(ctx) => ctx.name(id),
            ExecutionContext::Isr(_) => {
                self.record(Record::GetName { obj: id.cb().address(), name: None });
                None
            }
        }
    }

    pub fn set(&self, id: EventFlagsId<'a>, flags: u32) -> OsResult<u32> {
        self.record(Record::Set { obj: id.cb().address(), flags });
        match self.context() {
            ExecutionContext::Thread(ctx) => ctx.set(id, flags),
            ExecutionContext::Isr(ctx) => ctx.set(id, flags),
        }
    }

    pub fn clear(&self, id: EventFlagsId<'a>, flags: u32) -> OsResult<u32> {
        self.record(Record::Clear { obj: id.cb().address(), flags });
        match self.context() {
            ExecutionContext::Thread(ctx) => ctx.clear(id, flags),
            ExecutionContext::Isr(ctx) => ctx.clear(id, flags),
        }
    }

    pub fn get(&self, id: EventFlagsId<'a>) -> u32 {
        match self.context() {
            ExecutionContext::Thread(ctx) => ctx.get(id),
            ExecutionContext::Isr(ctx) => ctx.get(id),
        }
    }

    /// Wait for flags. In interrupt context only a zero timeout is accepted
    /// and the call never blocks.
    pub fn wait(
        &self,
        id: EventFlagsId<'a>,
        flags: u32,
        options: FlagsOptions,
        timeout: Timeout,
    ) -> OsResult<WaitOutcome> {
        let obj = id.cb().address();
        self.record(Record::Wait { obj, flags, options, timeout });
        match self.context() {
            ExecutionContext::Thread(ctx) => ctx.wait(id, flags, options, timeout),
            ExecutionContext::Isr(_) if !timeout.is_no_wait() => {
                let error = OsError::Parameter;
                self.record(Record::Error { obj, error });
                Err(error)
            }
            ExecutionContext::Isr(ctx) => ctx.try_wait(id, flags, options).map(WaitOutcome::Completed),
        }
    }

    /// Delete an object. Not allowed in interrupt context.
    pub fn delete(&self, id: EventFlagsId<'a>) -> OsResult<()> {
        let obj = id.cb().address();
        self.record(Record::Delete { obj });
        match self.context() {
            ExecutionContext::Thread(ctx) => ctx.delete(id),
            ExecutionContext::Isr(_) => self.isr_error(obj),
        }
    }

    fn isr_error<T>(&self, obj: usize) -> OsResult<T> {
        let error = OsError::Isr;
        self.record(Record::Error { obj, error });
        Err(error)
    }
}
