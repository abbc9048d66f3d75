//! The services a kernel wait object needs from the scheduler.

use rtos_core::{FlagsWait, ObjectKind, Timeout};

use crate::{ThreadId, WaitList, WaitReason, WaitResult};

/// Deferred work for an object mutated from interrupt context.
///
/// The scheduler calls [`PostProcess::post_process`] once for every queued
/// request, after the outermost interrupt has returned and before the next
/// dispatch, so thread lists are never touched inside a handler.
pub trait PostProcess<'a>: Sync {
    /// Kind of the object, used to route the request to a registered handler.
    fn kind(&self) -> ObjectKind;

    fn post_process(&'a self, sched: &dyn Scheduler<'a>);
}

/// Scheduler services used by kernel wait objects.
///
/// `'a` is the lifetime of the objects whose wait lists the scheduler links
/// threads into. All list services must be called with the thread lists
/// protected, which every implementation guarantees internally.
pub trait Scheduler<'a> {
    /// Thread currently executing, `None` before start or while idle.
    fn running_thread(&self) -> Option<ThreadId>;

    /// Check if the caller runs in interrupt context
    fn in_isr(&self) -> bool;

    /// Store the flags condition a thread is about to block on.
    fn store_wait(&self, thread: ThreadId, wait: FlagsWait);

    /// Condition stored with [`Scheduler::store_wait`].
    fn wait_of(&self, thread: ThreadId) -> FlagsWait;

    /// Block the running thread.
    ///
    /// Returns `false` without blocking if the scheduler cannot suspend the
    /// caller (not started, locked or in interrupt context). On `true` the
    /// caller is no longer running and must be linked into a wait list.
    fn wait_enter(&self, reason: WaitReason, timeout: Timeout) -> bool;

    /// End the wait of a blocked thread and make it ready.
    ///
    /// The thread must already be unlinked from its wait list. With
    /// `dispatch` set the scheduler may switch to it immediately.
    fn wait_exit(&self, thread: ThreadId, result: WaitResult, dispatch: bool);

    /// Append a thread to the tail of a wait list.
    fn list_put(&self, list: &'a WaitList, thread: ThreadId);

    /// Unlink and return the head of a wait list.
    fn list_get(&self, list: &'a WaitList) -> Option<ThreadId>;

    /// Unlink a thread from whatever wait list it is on.
    fn list_remove(&self, thread: ThreadId);

    fn list_first(&self, list: &'a WaitList) -> Option<ThreadId>;

    /// Thread linked after `thread` on the same wait list.
    fn list_next(&self, thread: ThreadId) -> Option<ThreadId>;

    /// Switch to the highest-priority ready thread if it should preempt.
    fn dispatch(&self);

    /// Enable deferred post-processing for objects of `kind`.
    fn register_post_process(&self, kind: ObjectKind);

    /// Queue deferred post-processing for `object`.
    fn post_process(&self, object: &'a dyn PostProcess<'a>);

    /// Run a thread-mode service call with kernel privileges.
    ///
    /// Targets with a supervisor call override this to trap into the kernel;
    /// the default calls straight through.
    fn privileged<R>(&self, call: impl FnOnce() -> R) -> R
    where
        Self: Sized,
    {
        call()
    }
}
