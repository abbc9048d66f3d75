#![no_std]
#![deny(unsafe_code)]

//! # RTOS Event Flags
//!
//! Groups of 31 binary flags that threads can block on until a chosen
//! combination is set. Flags can be set and cleared from thread code and from
//! interrupt handlers.
//!
//! Thread-context calls mutate the flag word and wake satisfied waiters on
//! the spot. Interrupt-context calls only mutate the word and queue the object
//! for post-processing; the scheduler wakes waiters after the interrupt
//! returns.
//!
//! ## Features
//!
//! - `exclusive-access`: lock-free flag word instead of interrupt masking
//! - `cortex-m`: single-core Cortex-M critical sections
//! - `defmt`: `defmt::Format` for the public types
//!
//! ## Example
//!
//! ```ignore
//! let sched = ThreadScheduler::new(SchedulerConfig::default());
//! let heap = HeapPool::new();
//! let flags = EventFlagsService::new(&sched, EventFlagsConfig::builder().heap(&heap).build());
//!
//! let id = flags.create(EventFlagsAttr::new().name("rx"))?;
//! flags.set(id, 0b01)?;
//! let outcome = flags.wait(id, 0b01, FlagsOptions::WAIT_ANY, Timeout::NoWait)?;
//! ```

pub mod attr;
mod bridge;
#[allow(unsafe_code)] // control-block placement in caller memory
pub mod cb;
pub mod config;
pub mod context;
pub mod flag_word;
mod lifecycle;
pub mod service;
pub mod trace;

pub use attr::{CbMem, EventFlagsAttr};
pub use cb::{EventFlagsCb, EventFlagsId, EventFlagsMem, EVENT_FLAGS_CB_SIZE};
pub use config::{CbAllocator, EventFlagsConfig, EventFlagsConfigBuilder};
pub use context::{ExecutionContext, IsrContext, ThreadContext};
pub use flag_word::{ExclusiveWord, FlagWord, FlagsPrimitive, MaskingWord};
pub use service::{EventFlagsService, WaitOutcome};
pub use trace::{EventRecorder, LogRecorder, NullRecorder, Record};

pub use rtos_core::{FlagsOptions, OsError, OsResult, Timeout};

// Links the PRIMASK-based critical-section implementation.
#[cfg(feature = "cortex-m")]
use cortex_m as _;
