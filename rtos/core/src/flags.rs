//! Flag masks, wait options and raw result encoding

use bitflags::bitflags;

use crate::OsError;

/// Number of usable flags in an event-flags word.
pub const FLAGS_LIMIT: u32 = 31;

/// Mask of the usable flag bits.
pub const FLAGS_MASK: u32 = (1 << FLAGS_LIMIT) - 1;

/// Bit reserved to distinguish raw error codes from flag values.
pub const ERROR_BIT: u32 = 1 << FLAGS_LIMIT;

bitflags! {
    /// Options of a flags wait.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct FlagsOptions: u32 {
        /// Every requested flag must be set. Without it any one suffices.
        const WAIT_ALL = 0x0000_0001;
        /// Leave the matched flags set after the wait completes.
        const NO_CLEAR = 0x0000_0002;
    }
}

impl FlagsOptions {
    /// Any requested flag satisfies the wait; matched flags are cleared.
    pub const WAIT_ANY: Self = Self::empty();

    pub const fn wait_all(self) -> bool {
        self.contains(Self::WAIT_ALL)
    }

    pub const fn auto_clear(self) -> bool {
        !self.contains(Self::NO_CLEAR)
    }
}

/// Condition a waiting thread stores while it is blocked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FlagsWait {
    pub flags: u32,
    pub options: FlagsOptions,
}

impl FlagsWait {
    pub const fn new(flags: u32, options: FlagsOptions) -> Self {
        Self { flags, options }
    }

    /// Check the condition against a word snapshot
    pub const fn is_met(&self, word: u32) -> bool {
        condition_met(word, self.flags, self.options)
    }
}

/// Check that `flags` only uses the 31 usable bits
pub const fn fits(flags: u32) -> bool {
    flags & ERROR_BIT == 0
}

/// Evaluate a wait condition.
///
/// Wait-all holds iff every requested bit is set. Wait-any holds iff at least
/// one is. An all-clear word never satisfies a wait, so an empty wait-all
/// request is met only while some flag is set.
pub const fn condition_met(word: u32, flags: u32, options: FlagsOptions) -> bool {
    if options.wait_all() {
        word != 0 && word & flags == flags
    } else {
        word & flags != 0
    }
}

/// Fold a flags result into one raw word.
///
/// Successful values are returned as-is; errors come back as the two's
/// complement of their status code, which always carries [`ERROR_BIT`].
pub const fn encode_result(result: Result<u32, OsError>) -> u32 {
    match result {
        Ok(flags) => flags & FLAGS_MASK,
        Err(err) => err.status_code() as u32,
    }
}

/// Recover a flags result from its raw encoding.
///
/// Unknown error codes decode as [`OsError::Resource`].
pub const fn decode_result(raw: u32) -> Result<u32, OsError> {
    if raw & ERROR_BIT == 0 {
        return Ok(raw);
    }
    match raw as i32 {
        -2 => Err(OsError::Timeout),
        -3 => Err(OsError::Resource),
        -4 => Err(OsError::Parameter),
        -5 => Err(OsError::NoMemory),
        -6 => Err(OsError::Isr),
        -8 => Err(OsError::KernelNotRunning),
        -9 => Err(OsError::InvalidControlBlock),
        _ => Err(OsError::Resource),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_covers_31_bits() {
        assert_eq!(FLAGS_MASK, 0x7FFF_FFFF);
        assert!(fits(FLAGS_MASK));
        assert!(!fits(ERROR_BIT));
        assert!(!fits(0xFFFF_FFFF));
    }

    #[test]
    fn wait_all_and_any() {
        let all = FlagsOptions::WAIT_ALL;
        assert!(condition_met(0b111, 0b101, all));
        assert!(!condition_met(0b001, 0b101, all));
        assert!(condition_met(0b001, 0b101, FlagsOptions::WAIT_ANY));
        assert!(!condition_met(0b010, 0b101, FlagsOptions::WAIT_ANY));
    }

    #[test]
    fn empty_request() {
        assert!(!condition_met(0, 0, FlagsOptions::WAIT_ALL));
        assert!(condition_met(0b100, 0, FlagsOptions::WAIT_ALL));
        assert!(!condition_met(FLAGS_MASK, 0, FlagsOptions::WAIT_ANY));
    }

    #[test]
    fn options_defaults_clear() {
        assert!(FlagsOptions::WAIT_ANY.auto_clear());
        assert!(!FlagsOptions::WAIT_ANY.wait_all());
        assert!(!(FlagsOptions::WAIT_ALL | FlagsOptions::NO_CLEAR).auto_clear());
    }

    #[test]
    fn errors_carry_the_reserved_bit() {
        let raw = encode_result(Err(OsError::Parameter));
        assert_eq!(raw, 0xFFFF_FFFC);
        assert_ne!(raw & ERROR_BIT, 0);
        assert_eq!(decode_result(raw), Err(OsError::Parameter));
        assert_eq!(decode_result(encode_result(Ok(0x55))), Ok(0x55));
    }
}
