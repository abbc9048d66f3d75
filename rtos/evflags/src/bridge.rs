//! Turns "the flags now satisfy a waiter" into scheduler wakeups.

use rtos_core::ObjectKind;
use rtos_sched::{PostProcess, Scheduler};

use crate::flag_word::FlagsPrimitive;
use crate::trace::Record;
use crate::EventFlagsCb;

/// Wake every satisfied waiter, walking the wait list once in arrival order.
///
/// Each waiter's own condition is checked against the word as left by the
/// waiters before it, so an earlier auto-clear can starve a later waiter.
/// Woken threads are made ready without dispatching.
///
/// Returns `reported` adjusted by the last woken waiter: the satisfying word,
/// minus that waiter's flags if it auto-cleared them.
pub(crate) fn wake_waiters<'a, S>(cb: &'a EventFlagsCb<'a>, sched: &S, mut reported: u32) -> u32
where
    S: Scheduler<'a> + ?Sized,
{
    let mut cursor = sched.list_first(&cb.wait_list);
    while let Some(thread) = cursor {
        cursor = sched.list_next(thread);
        let wait = sched.wait_of(thread);
        let Some(satisfied) = cb.word.check(wait.flags, wait.options) else {
            continue;
        };
        reported = if wait.options.auto_clear() {
            satisfied & !wait.flags
        } else {
            satisfied
        };
        sched.list_remove(thread);
        sched.wait_exit(thread, Ok(satisfied), false);
        cb.record(Record::WaitCompleted {
            obj: cb.address(),
            flags: wait.flags,
            options: wait.options,
            result: satisfied,
        });
    }
    reported
}

impl<'a> PostProcess<'a> for EventFlagsCb<'a> {
    fn kind(&self) -> ObjectKind {
        ObjectKind::EventFlags
    }

    /// Deferred half of an interrupt-context set.
    fn post_process(&'a self, sched: &dyn Scheduler<'a>) {
        if !self.is_active() {
            return;
        }
        wake_waiters(self, sched, 0);
    }
}
