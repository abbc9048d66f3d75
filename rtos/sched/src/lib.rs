#![no_std]
#![forbid(unsafe_code)]

//! # RTOS Scheduler Contract
//!
//! The narrow set of scheduler services that kernel wait objects are built
//! on: thread identity, blocking and waking, index-linked wait lists and
//! deferred post-processing of interrupt-originated mutations.
//!
//! [`ThreadScheduler`] is a host reference implementation used to run and
//! test wait objects off target.

extern crate alloc;

pub mod config;
pub mod contract;
pub mod scheduler;
pub mod thread;
pub mod wait_list;

pub use config::{SchedulerConfig, SchedulerConfigBuilder};
pub use contract::{PostProcess, Scheduler};
pub use scheduler::ThreadScheduler;
pub use thread::{ThreadId, ThreadPriority, ThreadState, WaitReason, WaitResult};
pub use wait_list::{ListEnds, WaitList};
