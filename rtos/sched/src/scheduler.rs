//! Host reference scheduler.
//!
//! A single-core priority scheduler that models thread states without
//! executing threads. Kernel object services are called "as" the running
//! thread; when that thread blocks the scheduler switches to the next ready
//! one, and the caller observes the switch through [`ThreadScheduler::running`].
//!
//! ## Scheduling Policy
//!
//! 1. The highest-priority ready thread runs
//! 2. Equal priorities run in the order they became ready
//! 3. A preempted thread resumes before its equal-priority peers
//! 4. Nothing is dispatched while locked or inside an interrupt

use alloc::collections::VecDeque;
use alloc::vec::Vec;
use core::cell::RefCell;
use core::cmp::Reverse;
use critical_section::{CriticalSection, Mutex};
use log::{debug, error, trace, warn};
use rtos_core::{FlagsWait, ObjectKind, OsError, OsResult, Timeout};

use crate::{
    PostProcess, Scheduler, SchedulerConfig, ThreadId, ThreadPriority, ThreadState, WaitList,
    WaitReason, WaitResult,
};

const LOG_TARGET: &str = "rtos::sched";

struct ThreadRecord<'a> {
    priority: ThreadPriority,
    state: ThreadState,
    /// Position among ready threads of equal priority.
    order: i64,
    wait: FlagsWait,
    result: Option<WaitResult>,
    /// Remaining ticks of a timed wait.
    delay: Option<u32>,
    list: Option<&'a WaitList>,
    prev: Option<ThreadId>,
    next: Option<ThreadId>,
}

impl ThreadRecord<'_> {
    fn new(priority: ThreadPriority) -> Self {
        Self {
            priority,
            state: ThreadState::Ready,
            order: 0,
            wait: FlagsWait::default(),
            result: None,
            delay: None,
            list: None,
            prev: None,
            next: None,
        }
    }
}

struct State<'a> {
    started: bool,
    lock_nesting: u8,
    isr_nesting: u8,
    running: Option<ThreadId>,
    threads: Vec<ThreadRecord<'a>>,
    back: i64,
    front: i64,
    ticks: u64,
    post_kinds: Vec<ObjectKind>,
    post_queue: VecDeque<&'a dyn PostProcess<'a>>,
    post_overflows: usize,
}

impl<'a> State<'a> {
    fn new(config: &SchedulerConfig) -> Self {
        Self {
            started: false,
            lock_nesting: 0,
            isr_nesting: 0,
            running: None,
            threads: Vec::with_capacity(config.max_threads),
            back: 1,
            front: 0,
            ticks: 0,
            post_kinds: Vec::new(),
            post_queue: VecDeque::with_capacity(config.post_queue_len),
            post_overflows: 0,
        }
    }

    fn record(&self, id: ThreadId) -> Option<&ThreadRecord<'a>> {
        self.threads.get(id.index())
    }

    fn record_mut(&mut self, id: ThreadId) -> Option<&mut ThreadRecord<'a>> {
        self.threads.get_mut(id.index())
    }

    fn make_ready(&mut self, id: ThreadId) {
        let order = self.back;
        if let Some(record) = self.record_mut(id) {
            record.state = ThreadState::Ready;
            record.order = order;
            self.back += 1;
        }
    }

    fn make_ready_front(&mut self, id: ThreadId) {
        let order = self.front;
        if let Some(record) = self.record_mut(id) {
            record.state = ThreadState::Ready;
            record.order = order;
            self.front -= 1;
        }
    }

    fn highest_ready(&self) -> Option<ThreadId> {
        self.threads
            .iter()
            .enumerate()
            .filter(|(_, t)| t.state == ThreadState::Ready)
            .min_by_key(|(_, t)| (Reverse(t.priority), t.order))
            .map(|(index, _)| ThreadId(index as u8))
    }

    fn run(&mut self, id: ThreadId) {
        if let Some(record) = self.record_mut(id) {
            record.state = ThreadState::Running;
        }
        self.running = Some(id);
    }

    fn can_dispatch(&self) -> bool {
        self.started && self.lock_nesting == 0 && self.isr_nesting == 0
    }

    fn dispatch(&mut self) {
        if !self.can_dispatch() {
            return;
        }
        let Some(next) = self.highest_ready() else {
            return;
        };
        let Some(next_prio) = self.record(next).map(|t| t.priority) else {
            return;
        };
        match self.running.and_then(|cur| self.record(cur).map(|t| (cur, t.priority))) {
            Some((_, prio)) if prio >= next_prio => {}
            Some((cur, _)) => {
                trace!(target: LOG_TARGET, "{} preempts {}", next, cur);
                self.make_ready_front(cur);
                self.run(next);
            }
            None => {
                trace!(target: LOG_TARGET, "switch to {}", next);
                self.run(next);
            }
        }
    }

    fn finish_wait(&mut self, id: ThreadId, result: WaitResult) {
        if let Some(record) = self.record_mut(id) {
            record.result = Some(result);
            record.delay = None;
        }
        self.make_ready(id);
    }

    fn append(&mut self, cs: CriticalSection<'_>, list: &'a WaitList, id: ThreadId) {
        let mut ends = list.ends(cs);
        let Some(record) = self.record_mut(id) else {
            return;
        };
        record.list = Some(list);
        record.prev = ends.tail;
        record.next = None;
        match ends.tail.and_then(|tail| self.record_mut(tail)) {
            Some(tail) => tail.next = Some(id),
            None => ends.head = Some(id),
        }
        ends.tail = Some(id);
        list.set_ends(cs, ends);
    }

    fn unlink(&mut self, cs: CriticalSection<'_>, id: ThreadId) {
        let Some(record) = self.record_mut(id) else {
            return;
        };
        let Some(list) = record.list.take() else {
            return;
        };
        let prev = record.prev.take();
        let next = record.next.take();
        let mut ends = list.ends(cs);
        match prev.and_then(|p| self.record_mut(p)) {
            Some(p) => p.next = next,
            None => ends.head = next,
        }
        match next.and_then(|n| self.record_mut(n)) {
            Some(n) => n.prev = prev,
            None => ends.tail = prev,
        }
        list.set_ends(cs, ends);
    }
}

/// Reference implementation of [`Scheduler`] for host builds and tests.
pub struct ThreadScheduler<'a> {
    config: SchedulerConfig,
    state: Mutex<RefCell<State<'a>>>,
}

impl<'a> ThreadScheduler<'a> {
    pub fn new(config: SchedulerConfig) -> Self {
        Self {
            state: Mutex::new(RefCell::new(State::new(&config))),
            config,
        }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    fn with_state<R>(&self, f: impl FnOnce(CriticalSection<'_>, &mut State<'a>) -> R) -> R {
        critical_section::with(|cs| f(cs, &mut self.state.borrow_ref_mut(cs)))
    }

    /// Creates a ready thread. It preempts the caller if started and higher
    /// priority.
    pub fn create_thread(&self, priority: ThreadPriority) -> OsResult<ThreadId> {
        if !priority.is_valid() {
            return Err(OsError::Parameter);
        }
        let max = self.config.max_threads;
        self.with_state(|_, st| {
            if st.threads.len() >= max {
                warn!(target: LOG_TARGET, "thread limit {} reached", max);
                return Err(OsError::NoMemory);
            }
            let id = ThreadId(st.threads.len() as u8);
            st.threads.push(ThreadRecord::new(priority));
            st.make_ready(id);
            debug!(target: LOG_TARGET, "created {} at priority {}", id, priority.0);
            st.dispatch();
            Ok(id)
        })
    }

    /// Starts scheduling; the highest-priority ready thread begins running.
    pub fn start(&self) {
        self.with_state(|_, st| {
            st.started = true;
            st.dispatch();
            debug!(target: LOG_TARGET, "started, running {:?}", st.running);
        })
    }

    pub fn is_started(&self) -> bool {
        self.with_state(|_, st| st.started)
    }

    /// Currently running thread
    pub fn running(&self) -> Option<ThreadId> {
        self.with_state(|_, st| st.running)
    }

    /// Locks the scheduler. Calls nest.
    pub fn lock(&self) {
        self.with_state(|_, st| st.lock_nesting = st.lock_nesting.saturating_add(1))
    }

    /// Unlocks the scheduler and dispatches once the outermost lock is released.
    pub fn unlock(&self) {
        self.with_state(|_, st| {
            st.lock_nesting = st.lock_nesting.saturating_sub(1);
            st.dispatch();
        })
    }

    pub fn is_locked(&self) -> bool {
        self.with_state(|_, st| st.lock_nesting > 0)
    }

    /// Advances time by one tick, expiring timed waits.
    ///
    /// An expired thread is unlinked from its wait list and woken with
    /// [`OsError::Timeout`].
    pub fn tick(&self) {
        self.with_state(|cs, st| {
            st.ticks += 1;
            let mut expired = Vec::new();
            for (index, record) in st.threads.iter_mut().enumerate() {
                match record.delay {
                    Some(remaining) if remaining > 1 => record.delay = Some(remaining - 1),
                    Some(_) => expired.push(ThreadId(index as u8)),
                    None => {}
                }
            }
            for id in expired {
                st.unlink(cs, id);
                st.finish_wait(id, Err(OsError::Timeout));
                trace!(target: LOG_TARGET, "{} wait timed out", id);
            }
            st.dispatch();
        })
    }

    pub fn ticks(&self) -> u64 {
        self.with_state(|_, st| st.ticks)
    }

    /// Enters interrupt context. Calls nest.
    pub fn isr_enter(&self) {
        self.with_state(|_, st| st.isr_nesting = st.isr_nesting.saturating_add(1))
    }

    /// Leaves interrupt context.
    ///
    /// Leaving the outermost interrupt runs every queued post-processing
    /// request in order, then dispatches.
    pub fn isr_exit(&self) {
        let outermost = self.with_state(|_, st| {
            st.isr_nesting = st.isr_nesting.saturating_sub(1);
            st.isr_nesting == 0
        });
        if !outermost {
            return;
        }
        while let Some(object) = self.next_post_process() {
            object.post_process(self);
        }
        self.with_state(|_, st| st.dispatch());
    }

    fn next_post_process(&self) -> Option<&'a dyn PostProcess<'a>> {
        self.with_state(|_, st| {
            while let Some(object) = st.post_queue.pop_front() {
                let kind = object.kind();
                if st.post_kinds.contains(&kind) {
                    return Some(object);
                }
                warn!(target: LOG_TARGET, "no post-processing registered for {}", kind);
            }
            None
        })
    }

    /// Requests still waiting for the outermost interrupt to return
    pub fn pending_post_processing(&self) -> usize {
        self.with_state(|_, st| st.post_queue.len())
    }

    /// Requests dropped because the post-processing queue was full
    pub fn post_overflows(&self) -> usize {
        self.with_state(|_, st| st.post_overflows)
    }

    pub fn thread_state(&self, thread: ThreadId) -> Option<ThreadState> {
        self.with_state(|_, st| st.record(thread).map(|t| t.state))
    }

    /// Result of the last completed wait of `thread`
    pub fn wait_result(&self, thread: ThreadId) -> Option<WaitResult> {
        self.with_state(|_, st| st.record(thread).and_then(|t| t.result))
    }

    /// Takes the result of the last completed wait of `thread`
    pub fn take_wait_result(&self, thread: ThreadId) -> Option<WaitResult> {
        self.with_state(|_, st| st.record_mut(thread).and_then(|t| t.result.take()))
    }

    /// Check if `thread` is linked into `list`
    pub fn is_waiting_on(&self, thread: ThreadId, list: &WaitList) -> bool {
        self.with_state(|_, st| {
            st.record(thread)
                .and_then(|t| t.list)
                .is_some_and(|l| core::ptr::eq(l, list))
        })
    }
}

impl<'a> Scheduler<'a> for ThreadScheduler<'a> {
    fn running_thread(&self) -> Option<ThreadId> {
        self.running()
    }

    fn in_isr(&self) -> bool {
        self.with_state(|_, st| st.isr_nesting > 0)
    }

    fn store_wait(&self, thread: ThreadId, wait: FlagsWait) {
        self.with_state(|_, st| {
            if let Some(record) = st.record_mut(thread) {
                record.wait = wait;
            }
        })
    }

    fn wait_of(&self, thread: ThreadId) -> FlagsWait {
        self.with_state(|_, st| st.record(thread).map(|t| t.wait).unwrap_or_default())
    }

    fn wait_enter(&self, reason: WaitReason, timeout: Timeout) -> bool {
        let delay = match timeout {
            Timeout::NoWait => return false,
            Timeout::Ticks(ticks) => Some(ticks.get()),
            Timeout::Forever => None,
        };
        self.with_state(|_, st| {
            if !st.can_dispatch() {
                return false;
            }
            let Some(current) = st.running.take() else {
                return false;
            };
            if let Some(record) = st.record_mut(current) {
                record.state = ThreadState::Blocked(reason);
                record.delay = delay;
                record.result = None;
            }
            trace!(target: LOG_TARGET, "{} blocked on {:?} for {}", current, reason, timeout);
            if let Some(next) = st.highest_ready() {
                st.run(next);
            }
            true
        })
    }

    fn wait_exit(&self, thread: ThreadId, result: WaitResult, dispatch: bool) {
        self.with_state(|_, st| {
            if !st.record(thread).is_some_and(|t| t.state.is_blocked()) {
                warn!(target: LOG_TARGET, "wait exit for {} which is not blocked", thread);
                return;
            }
            st.finish_wait(thread, result);
            trace!(target: LOG_TARGET, "{} woken with {:?}", thread, result);
            if dispatch {
                st.dispatch();
            }
        })
    }

    fn list_put(&self, list: &'a WaitList, thread: ThreadId) {
        self.with_state(|cs, st| {
            st.unlink(cs, thread);
            st.append(cs, list, thread);
        })
    }

    fn list_get(&self, list: &'a WaitList) -> Option<ThreadId> {
        self.with_state(|cs, st| {
            let head = list.ends(cs).head?;
            st.unlink(cs, head);
            Some(head)
        })
    }

    fn list_remove(&self, thread: ThreadId) {
        self.with_state(|cs, st| st.unlink(cs, thread))
    }

    fn list_first(&self, list: &'a WaitList) -> Option<ThreadId> {
        critical_section::with(|cs| list.ends(cs).head)
    }

    fn list_next(&self, thread: ThreadId) -> Option<ThreadId> {
        self.with_state(|_, st| st.record(thread).and_then(|t| t.next))
    }

    fn dispatch(&self) {
        self.with_state(|_, st| st.dispatch())
    }

    fn register_post_process(&self, kind: ObjectKind) {
        self.with_state(|_, st| {
            if !st.post_kinds.contains(&kind) {
                st.post_kinds.push(kind);
                debug!(target: LOG_TARGET, "post-processing enabled for {}", kind);
            }
        })
    }

    fn post_process(&self, object: &'a dyn PostProcess<'a>) {
        let capacity = self.config.post_queue_len;
        self.with_state(|_, st| {
            if st.post_queue.len() >= capacity {
                st.post_overflows += 1;
                error!(target: LOG_TARGET, "post-processing queue overflow ({} dropped)", st.post_overflows);
                return;
            }
            st.post_queue.push_back(object);
        })
    }
}
