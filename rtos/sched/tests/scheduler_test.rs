//! Scheduler contract tests for rtos-sched

use rtos_core::{FlagsOptions, FlagsWait, ObjectKind, OsError, Timeout};
use rtos_sched::{
    PostProcess, Scheduler, SchedulerConfig, ThreadPriority, ThreadScheduler, ThreadState,
    WaitList, WaitReason,
};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Wakes every thread on its list when post-processed.
struct Broadcast {
    list: WaitList,
    runs: AtomicUsize,
}

impl<'a> PostProcess<'a> for Broadcast {
    fn kind(&self) -> ObjectKind {
        ObjectKind::Semaphore
    }

    fn post_process(&'a self, sched: &dyn Scheduler<'a>) {
        self.runs.fetch_add(1, Ordering::Relaxed);
        while let Some(thread) = sched.list_get(&self.list) {
            sched.wait_exit(thread, Ok(7), false);
        }
    }
}

#[test]
fn test_block_and_wake_through_post_processing() {
    let object = Broadcast {
        list: WaitList::new(),
        runs: AtomicUsize::new(0),
    };
    let sched = ThreadScheduler::new(SchedulerConfig::default());
    sched.register_post_process(ObjectKind::Semaphore);
    let waiter = sched.create_thread(ThreadPriority::HIGH).unwrap();
    let main = sched.create_thread(ThreadPriority::NORMAL).unwrap();
    sched.start();

    assert!(sched.wait_enter(WaitReason::Semaphore, Timeout::Forever));
    sched.list_put(&object.list, waiter);
    assert_eq!(sched.running(), Some(main));
    assert_eq!(
        sched.thread_state(waiter),
        Some(ThreadState::Blocked(WaitReason::Semaphore))
    );

    sched.isr_enter();
    sched.post_process(&object);
    assert_eq!(object.runs.load(Ordering::Relaxed), 0);
    sched.isr_exit();

    assert_eq!(object.runs.load(Ordering::Relaxed), 1);
    assert_eq!(sched.running(), Some(waiter));
    assert_eq!(sched.take_wait_result(waiter), Some(Ok(7)));
    assert_eq!(sched.take_wait_result(waiter), None);
}

#[test]
fn test_stored_wait_condition() {
    let sched = ThreadScheduler::new(SchedulerConfig::default());
    let thread = sched.create_thread(ThreadPriority::NORMAL).unwrap();
    let wait = FlagsWait::new(0b11, FlagsOptions::WAIT_ALL);
    sched.store_wait(thread, wait);
    assert_eq!(sched.wait_of(thread), wait);
}

#[test]
fn test_thread_limit() {
    let sched = ThreadScheduler::new(SchedulerConfig::builder().max_threads(1).build());
    sched.create_thread(ThreadPriority::NORMAL).unwrap();
    assert_eq!(
        sched.create_thread(ThreadPriority::NORMAL),
        Err(OsError::NoMemory)
    );
    assert_eq!(
        ThreadScheduler::new(SchedulerConfig::default()).create_thread(ThreadPriority(0)),
        Err(OsError::Parameter)
    );
}

#[test]
fn test_lock_defers_preemption() {
    let sched = ThreadScheduler::new(SchedulerConfig::default());
    let low = sched.create_thread(ThreadPriority::LOW).unwrap();
    sched.start();
    sched.lock();
    let high = sched.create_thread(ThreadPriority::HIGH).unwrap();
    assert_eq!(sched.running(), Some(low));
    sched.unlock();
    assert_eq!(sched.running(), Some(high));
}

#[test]
fn test_no_dispatch_inside_isr() {
    let list = WaitList::new();
    let sched = ThreadScheduler::new(SchedulerConfig::default());
    let waiter = sched.create_thread(ThreadPriority::HIGH).unwrap();
    let main = sched.create_thread(ThreadPriority::NORMAL).unwrap();
    sched.start();
    assert!(sched.wait_enter(WaitReason::EventFlags, Timeout::Forever));
    sched.list_put(&list, waiter);

    sched.isr_enter();
    assert!(sched.in_isr());
    let thread = sched.list_get(&list).unwrap();
    sched.wait_exit(thread, Err(OsError::Resource), true);
    assert_eq!(sched.running(), Some(main));
    sched.isr_exit();
    assert_eq!(sched.running(), Some(waiter));
    assert_eq!(sched.take_wait_result(waiter), Some(Err(OsError::Resource)));
}
