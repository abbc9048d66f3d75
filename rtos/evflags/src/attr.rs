use core::mem::MaybeUninit;

use crate::EventFlagsCb;

/// Caller-supplied control-block memory.
pub enum CbMem<'a> {
    /// A control block the caller already owns, typically a `static`.
    /// It may be reused once the object living in it is deleted.
    Block(&'a EventFlagsCb<'a>),
    /// Raw bytes; must be aligned for and at least as large as a control block.
    Bytes(&'a mut [MaybeUninit<u8>]),
}

/// Creation attributes of an event-flags object.
#[derive(Default)]
pub struct EventFlagsAttr<'a> {
    pub name: Option<&'a str>,
    pub cb_mem: Option<CbMem<'a>>,
}

impl<'a> EventFlagsAttr<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the diagnostic name.
    pub fn name(mut self, name: &'a str) -> Self {
        self.name = Some(name);
        self
    }

    /// Places the object in a caller-owned control block.
    pub fn cb(mut self, cb: &'a EventFlagsCb<'a>) -> Self {
        self.cb_mem = Some(CbMem::Block(cb));
        self
    }

    /// Places the object in caller-owned raw memory.
    pub fn cb_mem(mut self, mem: &'a mut [MaybeUninit<u8>]) -> Self {
        self.cb_mem = Some(CbMem::Bytes(mem));
        self
    }
}
