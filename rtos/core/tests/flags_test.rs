//! Flag option and result-encoding tests for rtos-core
//! These run on the host but only exercise no_std code

use rtos_core::{
    condition_met, decode_result, encode_result, fits, FlagsOptions, FlagsWait, OsError,
    ERROR_BIT, FLAGS_MASK,
};

#[test]
fn test_wait_all_requires_every_bit() {
    let wait = FlagsWait::new(0b101, FlagsOptions::WAIT_ALL);
    assert!(!wait.is_met(0b001));
    assert!(!wait.is_met(0b100));
    assert!(wait.is_met(0b101));
    assert!(wait.is_met(0b111));
}

#[test]
fn test_wait_any_requires_one_bit() {
    let wait = FlagsWait::new(0b101, FlagsOptions::WAIT_ANY);
    assert!(wait.is_met(0b001));
    assert!(wait.is_met(0b100));
    assert!(!wait.is_met(0b010));
}

#[test]
fn test_condition_matches_definition_exhaustively_on_low_bits() {
    for word in 0u32..16 {
        for flags in 0u32..16 {
            assert_eq!(
                condition_met(word, flags, FlagsOptions::WAIT_ALL),
                word != 0 && word & flags == flags
            );
            assert_eq!(
                condition_met(word, flags, FlagsOptions::WAIT_ANY),
                word & flags != 0
            );
        }
    }
}

#[test]
fn test_reserved_bit_is_rejected() {
    assert!(fits(0));
    assert!(fits(FLAGS_MASK));
    assert!(!fits(FLAGS_MASK + 1));
}

#[test]
fn test_status_encoding() {
    for err in [
        OsError::Timeout,
        OsError::Resource,
        OsError::Parameter,
        OsError::NoMemory,
        OsError::Isr,
        OsError::InvalidControlBlock,
        OsError::KernelNotRunning,
    ] {
        let raw = encode_result(Err(err));
        assert_ne!(raw & ERROR_BIT, 0, "{err}");
        assert_eq!(decode_result(raw), Err(err));
    }
    assert_eq!(encode_result(Ok(0x1234)), 0x1234);
}

#[test]
fn test_empty_wait_all_needs_a_set_flag() {
    let wait = FlagsWait::new(0, FlagsOptions::WAIT_ALL);
    assert!(!wait.is_met(0));
    assert!(wait.is_met(0b1000));
}
