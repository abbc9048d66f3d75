//! Event-flags control block and handle.

use core::cell::Cell;
use core::fmt;
use core::mem::{align_of, size_of, MaybeUninit};
use core::sync::atomic::{AtomicU8, Ordering};
use critical_section::Mutex;
use rtos_core::{ObjectKind, ObjectState, OsError, OsResult, Ownership};
use rtos_sched::WaitList;

use crate::flag_word::{FlagWord, FlagsPrimitive};
use crate::trace::{EventRecorder, Record};

/// State of one event-flags object.
///
/// The flag word is only changed through [`FlagsPrimitive`] and the wait
/// list only through the scheduler, so the block can be shared freely
/// between threads and interrupt handlers.
pub struct EventFlagsCb<'a> {
    kind: AtomicU8,
    state: AtomicU8,
    ownership: Mutex<Cell<Ownership>>,
    name: Mutex<Cell<Option<&'a str>>>,
    recorder: Mutex<Cell<Option<&'a dyn EventRecorder>>>,
    pub(crate) wait_list: WaitList,
    pub(crate) word: FlagWord,
}

/// Size in bytes of an [`EventFlagsCb`].
pub const EVENT_FLAGS_CB_SIZE: usize = size_of::<EventFlagsCb<'static>>();

const _: () = assert!(align_of::<EventFlagsCb<'static>>() <= align_of::<usize>());

impl<'a> EventFlagsCb<'a> {
    /// An inactive control block, suitable for a `static`.
    pub const fn new() -> Self {
        Self {
            kind: AtomicU8::new(ObjectKind::Invalid as u8),
            state: AtomicU8::new(ObjectState::Inactive as u8),
            ownership: Mutex::new(Cell::new(Ownership::Borrowed)),
            name: Mutex::new(Cell::new(None)),
            recorder: Mutex::new(Cell::new(None)),
            wait_list: WaitList::new(),
            word: FlagWord::new(),
        }
    }

    pub fn kind(&self) -> ObjectKind {
        ObjectKind::from_raw(self.kind.load(Ordering::Acquire))
    }

    pub fn state(&self) -> ObjectState {
        ObjectState::from_raw(self.state.load(Ordering::Acquire))
    }

    pub fn is_active(&self) -> bool {
        self.state().is_active()
    }

    pub fn ownership(&self) -> Ownership {
        critical_section::with(|cs| self.ownership.borrow(cs).get())
    }

    pub fn name(&self) -> Option<&'a str> {
        critical_section::with(|cs| self.name.borrow(cs).get())
    }

    /// Current flags, without validation
    pub fn flags(&self) -> u32 {
        self.word.load()
    }

    pub(crate) fn address(&self) -> usize {
        self as *const Self as usize
    }

    pub(crate) fn record(&self, record: Record<'_>) {
        let recorder = critical_section::with(|cs| self.recorder.borrow(cs).get());
        if let Some(recorder) = recorder {
            recorder.record(&record);
        }
    }

    /// Initialize as a fresh, active object with all flags clear.
    pub(crate) fn activate(
        &self,
        name: Option<&'a str>,
        ownership: Ownership,
        recorder: &'a dyn EventRecorder,
    ) {
        self.word.reset();
        critical_section::with(|cs| {
            self.ownership.borrow(cs).set(ownership);
            self.name.borrow(cs).set(name);
            self.recorder.borrow(cs).set(Some(recorder));
        });
        self.kind.store(ObjectKind::EventFlags.raw(), Ordering::Release);
        self.state.store(ObjectState::Active as u8, Ordering::Release);
    }

    pub(crate) fn deactivate(&self) {
        self.state.store(ObjectState::Inactive as u8, Ordering::Release);
    }
}

impl Default for EventFlagsCb<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EventFlagsCb<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventFlagsCb")
            .field("kind", &self.kind())
            .field("state", &self.state())
            .field("ownership", &self.ownership())
            .field("name", &self.name())
            .field("flags", &self.flags())
            .field("wait_list", &self.wait_list)
            .finish()
    }
}

/// Raw storage for one control block, aligned for [`EventFlagsCb`].
#[repr(C)]
pub struct EventFlagsMem {
    _align: [usize; 0],
    bytes: [MaybeUninit<u8>; EVENT_FLAGS_CB_SIZE],
}

impl EventFlagsMem {
    pub const fn new() -> Self {
        Self {
            _align: [],
            bytes: [MaybeUninit::uninit(); EVENT_FLAGS_CB_SIZE],
        }
    }

    pub fn as_uninit_bytes(&mut self) -> &mut [MaybeUninit<u8>] {
        &mut self.bytes
    }
}

impl Default for EventFlagsMem {
    fn default() -> Self {
        Self::new()
    }
}

/// Construct an inactive control block in caller-supplied bytes.
///
/// The memory must be aligned for [`EventFlagsCb`] and at least
/// [`EVENT_FLAGS_CB_SIZE`] bytes long.
pub(crate) fn place<'a>(mem: &'a mut [MaybeUninit<u8>]) -> OsResult<&'a EventFlagsCb<'a>> {
    let ptr = mem.as_mut_ptr().cast::<EventFlagsCb<'a>>();
    if mem.len() < EVENT_FLAGS_CB_SIZE || (ptr as usize) % align_of::<EventFlagsCb<'a>>() != 0 {
        return Err(OsError::InvalidControlBlock);
    }
    // SAFETY: the region is exclusively borrowed for 'a, large enough and
    // aligned for the control block, and is fully initialized before the
    // shared reference is handed out.
    unsafe {
        ptr.write(EventFlagsCb::new());
        Ok(&*ptr)
    }
}

/// Handle to an event-flags object.
///
/// A handle can be built from any control block; every service checks the
/// kind tag and state before acting on it.
#[derive(Clone, Copy)]
pub struct EventFlagsId<'a> {
    cb: &'a EventFlagsCb<'a>,
}

impl<'a> EventFlagsId<'a> {
    pub const fn from_cb(cb: &'a EventFlagsCb<'a>) -> Self {
        Self { cb }
    }

    pub const fn cb(&self) -> &'a EventFlagsCb<'a> {
        self.cb
    }

    /// Check if the handle refers to an event-flags control block
    pub fn is_valid(&self) -> bool {
        self.cb.kind() == ObjectKind::EventFlags
    }
}

impl PartialEq for EventFlagsId<'_> {
    fn eq(&self, other: &Self) -> bool {
        core::ptr::eq(self.cb, other.cb)
    }
}

impl Eq for EventFlagsId<'_> {}

impl fmt::Debug for EventFlagsId<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EventFlagsId({:#x})", self.cb.address())
    }
}
