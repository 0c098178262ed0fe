use super::*;

const fn reason_of<const REASON: u8>() -> u8 {
    REASON
}

#[test]
fn test_dispatch_reaches_the_matching_leaf() {
    for reason in 0..=u8::MAX {
        assert_eq!(abort_dispatch!(reason_of; reason, 0u8; 7 6 5 4 3 2 1 0), reason);
    }
}

#[test]
fn test_abort_code_reads_top_byte() {
    for reason in [0u8, 1, 42, 0x80, u8::MAX] {
        let raw = (u32::from(reason) << 24) | ABORT_EXPLICIT;
        assert_eq!(abort_code(raw), reason);
        assert_eq!(TxStatus::from_raw(raw).code(), Some(reason));
    }
}
