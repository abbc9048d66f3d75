//! Wait timeouts

use core::fmt;
use core::num::NonZeroU32;

/// Raw tick count meaning "wait until the condition is met".
pub const WAIT_FOREVER: u32 = u32::MAX;

/// How long a blocking service may suspend its caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Timeout {
    /// Return immediately if the condition is not met.
    #[default]
    NoWait,
    /// Give up after the given number of kernel ticks.
    Ticks(NonZeroU32),
    /// Never give up.
    Forever,
}

impl Timeout {
    /// Decode a raw tick count: `0` is no-wait and [`WAIT_FOREVER`] is forever.
    pub const fn from_ticks(ticks: u32) -> Self {
        match ticks {
            WAIT_FOREVER => Timeout::Forever,
            _ => match NonZeroU32::new(ticks) {
                Some(n) => Timeout::Ticks(n),
                None => Timeout::NoWait,
            },
        }
    }

    /// Raw tick count
    pub const fn ticks(self) -> u32 {
        match self {
            Timeout::NoWait => 0,
            Timeout::Ticks(n) => n.get(),
            Timeout::Forever => WAIT_FOREVER,
        }
    }

    pub const fn is_no_wait(self) -> bool {
        matches!(self, Timeout::NoWait)
    }
}

impl From<u32> for Timeout {
    fn from(ticks: u32) -> Self {
        Self::from_ticks(ticks)
    }
}

impl fmt::Display for Timeout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Timeout::NoWait => f.write_str("no-wait"),
            Timeout::Ticks(n) => write!(f, "{}ticks", n),
            Timeout::Forever => f.write_str("forever"),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Timeout {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Timeout::NoWait => defmt::write!(fmt, "no-wait"),
            Timeout::Ticks(n) => defmt::write!(fmt, "{}ticks", n.get()),
            Timeout::Forever => defmt::write!(fmt, "forever"),
        }
    }
}
