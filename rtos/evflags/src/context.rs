//! Thread-context and interrupt-context capabilities.
//!
//! The execution context is decided once per call by
//! [`EventFlagsService::context`]. Only [`ThreadContext`] can block; the
//! interrupt capability has a non-blocking [`IsrContext::try_wait`] and defers
//! wakeups to the scheduler's post-processing.

use rtos_core::{fits, FlagsOptions, FlagsWait, ObjectKind, OsError, OsResult, Ownership, Timeout};
use rtos_sched::{Scheduler, WaitReason};

use crate::attr::EventFlagsAttr;
use crate::bridge::wake_waiters;
use crate::flag_word::FlagsPrimitive;
use crate::lifecycle;
use crate::service::{EventFlagsService, WaitOutcome};
use crate::trace::Record;
use crate::{EventFlagsCb, EventFlagsId};

/// Capability for the current execution context.
pub enum ExecutionContext<'s, 'a, S> {
    Thread(ThreadContext<'s, 'a, S>),
    Isr(IsrContext<'s, 'a, S>),
}

/// Event-flags services callable from thread code.
pub struct ThreadContext<'s, 'a, S> {
    service: &'s EventFlagsService<'a, S>,
}

/// Event-flags services callable from interrupt handlers.
pub struct IsrContext<'s, 'a, S> {
    service: &'s EventFlagsService<'a, S>,
}

impl<'s, 'a, S> ThreadContext<'s, 'a, S> {
    pub(crate) fn new(service: &'s EventFlagsService<'a, S>) -> Self {
        Self { service }
    }
}

impl<'s, 'a, S> IsrContext<'s, 'a, S> {
    pub(crate) fn new(service: &'s EventFlagsService<'a, S>) -> Self {
        Self { service }
    }
}

/// Check the handle, the requested flags and the object state, recording
/// the failure if any.
fn validate<'a, S>(
    service: &EventFlagsService<'a, S>,
    id: EventFlagsId<'a>,
    flags: u32,
) -> OsResult<&'a EventFlagsCb<'a>> {
    let cb = id.cb();
    let result = if !id.is_valid() || !fits(flags) {
        Err(OsError::Parameter)
    } else if !cb.is_active() {
        Err(OsError::Resource)
    } else {
        Ok(cb)
    };
    if let Err(error) = result {
        service.record(Record::Error { obj: cb.address(), error });
    }
    result
}

fn clear<'a, S>(service: &EventFlagsService<'a, S>, id: EventFlagsId<'a>, flags: u32) -> OsResult<u32> {
    let cb = validate(service, id, flags)?;
    let prior = cb.word.clear(flags);
    service.record(Record::ClearDone { obj: cb.address(), flags: prior });
    Ok(prior)
}

fn get<'a, S>(service: &EventFlagsService<'a, S>, id: EventFlagsId<'a>) -> u32 {
    let cb = id.cb();
    let flags = if id.is_valid() && cb.is_active() {
        cb.word.load()
    } else {
        0
    };
    service.record(Record::Get { obj: cb.address(), flags });
    flags
}

fn check<'a, S>(
    service: &EventFlagsService<'a, S>,
    cb: &'a EventFlagsCb<'a>,
    flags: u32,
    options: FlagsOptions,
) -> Option<u32> {
    let satisfied = cb.word.check(flags, options)?;
    service.record(Record::WaitCompleted {
        obj: cb.address(),
        flags,
        options,
        result: satisfied,
    });
    Some(satisfied)
}

impl<'s, 'a, S: Scheduler<'a>> ThreadContext<'s, 'a, S> {
    fn sched(&self) -> &'a S {
        self.service.scheduler()
    }

    /// Create an event-flags object with all flags clear.
    pub fn create(&self, attr: EventFlagsAttr<'a>) -> OsResult<EventFlagsId<'a>> {
        self.sched().privileged(|| {
            let EventFlagsAttr { name, cb_mem } = attr;
            let config = self.service.config();
            let (cb, ownership) = lifecycle::obtain(cb_mem, config).inspect_err(|&error| {
                self.service.record(Record::Error { obj: 0, error });
            })?;
            cb.activate(name, ownership, config.recorder);
            self.sched().register_post_process(ObjectKind::EventFlags);
            self.service.record(Record::Created { obj: cb.address(), name });
            Ok(EventFlagsId::from_cb(cb))
        })
    }

    /// Name of an active object.
    pub fn name(&self, id: EventFlagsId<'a>) -> Option<&'a str> {
        self.sched().privileged(|| {
            let cb = id.cb();
            let name = if id.is_valid() && cb.is_active() {
                cb.name()
            } else {
                None
            };
            self.service.record(Record::GetName { obj: cb.address(), name });
            name
        })
    }

    /// Set flags and wake every waiter they satisfy.
    ///
    /// Returns the word after setting, or after the auto-clear of the last
    /// waiter woken.
    pub fn set(&self, id: EventFlagsId<'a>, flags: u32) -> OsResult<u32> {
        self.sched().privileged(|| {
            let cb = validate(self.service, id, flags)?;
            let word = cb.word.set(flags);
            let reported = wake_waiters(cb, self.sched(), word);
            self.sched().dispatch();
            self.service.record(Record::SetDone { obj: cb.address(), flags: reported });
            Ok(reported)
        })
    }

    /// Clear flags, returning the word before clearing.
    pub fn clear(&self, id: EventFlagsId<'a>, flags: u32) -> OsResult<u32> {
        self.sched().privileged(|| clear(self.service, id, flags))
    }

    /// Current flags, `0` for an invalid or inactive handle.
    pub fn get(&self, id: EventFlagsId<'a>) -> u32 {
        self.sched().privileged(|| get(self.service, id))
    }

    /// Wait until `flags` satisfy `options`.
    ///
    /// If the condition holds it completes at once. Otherwise, with a
    /// timeout, the running thread blocks and the call returns
    /// [`WaitOutcome::Blocked`]; the thread's wait result later carries the
    /// satisfying flags, [`OsError::Resource`] if the object is deleted, or
    /// [`OsError::Timeout`].
    pub fn wait(
        &self,
        id: EventFlagsId<'a>,
        flags: u32,
        options: FlagsOptions,
        timeout: Timeout,
    ) -> OsResult<WaitOutcome> {
        self.sched().privileged(|| {
            let sched = self.sched();
            let Some(thread) = sched.running_thread() else {
                let error = OsError::KernelNotRunning;
                self.service.record(Record::Error { obj: id.cb().address(), error });
                return Err(error);
            };
            let cb = validate(self.service, id, flags)?;
            let obj = cb.address();
            if let Some(satisfied) = check(self.service, cb, flags, options) {
                return Ok(WaitOutcome::Completed(satisfied));
            }
            if timeout.is_no_wait() {
                self.service.record(Record::WaitNotCompleted { obj, flags, options });
                return Err(OsError::Resource);
            }
            self.service.record(Record::WaitPending { obj, flags, options, timeout });
            sched.store_wait(thread, FlagsWait::new(flags, options));
            if sched.wait_enter(WaitReason::EventFlags, timeout) {
                sched.list_put(&cb.wait_list, thread);
                Ok(WaitOutcome::Blocked)
            } else {
                self.service.record(Record::WaitTimeout { obj });
                Err(OsError::Timeout)
            }
        })
    }

    /// Delete an object, waking every waiter with [`OsError::Resource`].
    pub fn delete(&self, id: EventFlagsId<'a>) -> OsResult<()> {
        self.sched().privileged(|| {
            let sched = self.sched();
            let cb = validate(self.service, id, 0)?;
            cb.deactivate();
            if !cb.wait_list.is_empty() {
                while let Some(thread) = sched.list_get(&cb.wait_list) {
                    sched.wait_exit(thread, Err(OsError::Resource), false);
                }
                sched.dispatch();
            }
            if let Ownership::Owned(source) = cb.ownership() {
                lifecycle::release(cb, source, self.service.config());
            }
            self.service.record(Record::Destroyed { obj: cb.address() });
            Ok(())
        })
    }
}

impl<'s, 'a, S: Scheduler<'a>> IsrContext<'s, 'a, S> {
    /// Set flags. Waiters are woken by post-processing after the interrupt
    /// returns.
    pub fn set(&self, id: EventFlagsId<'a>, flags: u32) -> OsResult<u32> {
        let cb = validate(self.service, id, flags)?;
        let word = cb.word.set(flags);
        self.service.scheduler().post_process(cb);
        self.service.record(Record::SetDone { obj: cb.address(), flags: word });
        Ok(word)
    }

    /// Clear flags, returning the word before clearing.
    pub fn clear(&self, id: EventFlagsId<'a>, flags: u32) -> OsResult<u32> {
        clear(self.service, id, flags)
    }

    /// Current flags, `0` for an invalid or inactive handle.
    pub fn get(&self, id: EventFlagsId<'a>) -> u32 {
        get(self.service, id)
    }

    /// Check the condition without blocking; [`OsError::Resource`] if unmet.
    pub fn try_wait(&self, id: EventFlagsId<'a>, flags: u32, options: FlagsOptions) -> OsResult<u32> {
        let cb = validate(self.service, id, flags)?;
        check(self.service, cb, flags, options).ok_or_else(|| {
            self.service.record(Record::WaitNotCompleted { obj: cb.address(), flags, options });
            OsError::Resource
        })
    }
}
