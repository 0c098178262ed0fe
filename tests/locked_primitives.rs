#![cfg(target_arch = "x86_64")]

use core::sync::atomic::{
    AtomicI16, AtomicI32, AtomicI64, AtomicI8, AtomicIsize, AtomicU16, AtomicU32, AtomicU64,
    AtomicU8, AtomicUsize, Ordering,
};

use hwatomics::locked::{self, AtomicDoubleWord, WideCas};
use hwatomics::{has_feature, Feature};

fn assert_send_sync<T: Send + Sync>() {}

#[test]
fn compare_and_swap_u8_swaps_on_match() {
    let a = AtomicU8::new(0xFF);
    assert_eq!(locked::compare_and_swap_u8(&a, 0xFF, 42), 0xFF);
    assert_eq!(a.load(Ordering::SeqCst), 42);
}

#[test]
fn compare_and_swap_reports_current_value_on_mismatch() {
    let a = AtomicU16::new(7);
    assert_eq!(locked::compare_and_swap_u16(&a, 8, 9), 7);
    assert_eq!(a.load(Ordering::SeqCst), 7);

    let b = AtomicI32::new(-3);
    assert_eq!(locked::compare_and_swap_i32(&b, 3, 0), -3);
    assert_eq!(b.load(Ordering::SeqCst), -3);

    let c = AtomicU64::new(u64::MAX);
    assert_eq!(locked::compare_and_swap_u64(&c, u64::MAX, 1), u64::MAX);
    assert_eq!(c.load(Ordering::SeqCst), 1);

    let d = AtomicUsize::new(0);
    assert_eq!(locked::compare_and_swap_uintptr(&d, 0, 0x1000), 0);
    assert_eq!(locked::compare_and_swap_usize(&d, 0, 1), 0x1000);
    assert_eq!(d.load(Ordering::SeqCst), 0x1000);
}

#[test]
fn compare_and_swap_2x_swaps_pair_on_match() {
    let Ok(wide) = WideCas::detect() else {
        eprintln!("cmpxchg16b not supported; skipping");
        return;
    };
    let pair = AtomicDoubleWord::new(1, 2);
    assert_eq!(wide.compare_and_swap(&pair, (1, 2), (3, 4)), (1, 2));
    assert_eq!(pair.into_inner(), (3, 4));
}

#[test]
fn compare_and_swap_2x_leaves_pair_on_mismatch() {
    if !has_feature(Feature::WideCompareAndSwap) {
        return;
    }
    let pair = AtomicDoubleWord::new(1, 2);
    for expected in [(1, 3), (0, 2), (2, 1)] {
        // SAFETY: support checked above.
        let prior = unsafe { locked::compare_and_swap_2x_u64(&pair, expected.0, expected.1, 9, 9) };
        assert_eq!(prior, (1, 2));
    }
    assert_eq!(pair.lo().load(Ordering::SeqCst), 1);
    assert_eq!(pair.hi().load(Ordering::SeqCst), 2);

    let wide = WideCas::detect().unwrap();
    assert_eq!(wide.load(&pair), (1, 2));
}

#[test]
fn bitwise_operations() {
    let a = AtomicU64::new(15);
    locked::and_u64(&a, 170);
    assert_eq!(a.load(Ordering::SeqCst), 10);

    let b = AtomicU8::new(0b1010_0000);
    locked::or_u8(&b, 0b0000_0101);
    assert_eq!(b.load(Ordering::SeqCst), 0b1010_0101);

    let c = AtomicI16::new(0x0FF0);
    locked::xor_i16(&c, 0x00FF);
    assert_eq!(c.load(Ordering::SeqCst), 0x0F0F);

    let d = AtomicU32::new(0xDEAD_BEEF);
    locked::and_u32(&d, 0xFFFF_0000);
    assert_eq!(d.load(Ordering::SeqCst), 0xDEAD_0000);
}

#[test]
fn add_with_carry_chains_across_fields() {
    let a = AtomicU8::new(100);
    let b = AtomicU8::new(50);
    let carry = locked::add_with_carry_u8(&a, 156, false);
    assert!(carry);
    assert!(!locked::add_with_carry_u8(&b, 1, carry));
    assert_eq!(a.load(Ordering::SeqCst), 0);
    assert_eq!(b.load(Ordering::SeqCst), 52);
}

#[test]
fn add_with_carry_zero_operand_still_takes_carry() {
    let a = AtomicU8::new(100);
    let b = AtomicU8::new(50);
    let carry = locked::add_with_carry_u8(&a, 156, false);
    locked::add_with_carry_u8(&b, 0, carry);
    assert_eq!(b.load(Ordering::SeqCst), 51);

    // Carry out of the top of the operand.
    let c = AtomicU32::new(u32::MAX);
    assert!(locked::add_with_carry_u32(&c, 0, true));
    assert_eq!(c.load(Ordering::SeqCst), 0);
    assert!(!locked::add_with_carry_u32(&c, 0, false));
    assert_eq!(c.load(Ordering::SeqCst), 0);
}

#[test]
fn subtract_with_borrow_chains_across_fields() {
    let lo = AtomicU16::new(0);
    let hi = AtomicU16::new(10);
    let borrow = locked::subtract_with_borrow_u16(&lo, 1, false);
    assert!(borrow);
    assert!(!locked::subtract_with_borrow_u16(&hi, 0, borrow));
    assert_eq!(lo.load(Ordering::SeqCst), u16::MAX);
    assert_eq!(hi.load(Ordering::SeqCst), 9);

    let i = AtomicI64::new(0);
    assert!(!locked::subtract_with_borrow_i64(&i, 0, false));
    assert!(locked::subtract_with_borrow_i64(&i, 0, true));
    assert_eq!(i.load(Ordering::SeqCst), -1);
}

#[test]
fn carry_chain_adds_double_words() {
    // 128-bit addition over two 64-bit fields, low word first.
    let lo = AtomicU64::new(u64::MAX);
    let hi = AtomicU64::new(7);
    let carry = locked::add_with_carry_u64(&lo, 1, false);
    let overflow = locked::add_with_carry_u64(&hi, 0, carry);
    assert!(!overflow);
    assert_eq!(lo.load(Ordering::SeqCst), 0);
    assert_eq!(hi.load(Ordering::SeqCst), 8);
}

#[test]
fn flags_report_carry() {
    let x = AtomicU8::new(40);
    locked::add_u8(&x, 2);
    let no_overflow = locked::flags();
    locked::add_u8(&x, 255);
    let overflow = locked::flags();

    assert!(!no_overflow.carry());
    assert!(overflow.carry());
    assert_eq!(x.load(Ordering::SeqCst), 41);
}

#[test]
fn bit_test_operations_return_prior_bit() {
    let a = AtomicU32::new(0);
    assert!(!locked::bit_test_and_set_u32(&a, 5));
    assert_eq!(a.load(Ordering::SeqCst), 1 << 5);
    assert!(locked::bit_test_and_set_u32(&a, 5));
    assert_eq!(a.load(Ordering::SeqCst), 1 << 5);

    assert!(locked::bit_test_and_reset_u32(&a, 5));
    assert_eq!(a.load(Ordering::SeqCst), 0);
    assert!(!locked::bit_test_and_reset_u32(&a, 5));

    assert!(!locked::bit_test_and_complement_u32(&a, 31));
    assert_eq!(a.load(Ordering::SeqCst), 1 << 31);
    assert!(locked::bit_test_and_complement_u32(&a, 31));
    assert_eq!(a.load(Ordering::SeqCst), 0);

    let b = AtomicI64::new(-1);
    assert!(locked::bit_test_and_reset_i64(&b, 63));
    assert_eq!(b.load(Ordering::SeqCst), i64::MAX);

    let c = AtomicUsize::new(0);
    assert!(!locked::bit_test_and_set_uintptr(&c, 64 + 3));
    assert_eq!(c.load(Ordering::SeqCst), 1 << 3);
}

#[test]
fn check_zero_operations() {
    let a = AtomicI32::new(-1);
    assert!(locked::increment_and_check_zero_i32(&a));
    assert!(!locked::increment_and_check_zero_i32(&a));
    assert_eq!(a.load(Ordering::SeqCst), 1);

    let refs = AtomicUsize::new(2);
    assert!(!locked::decrement_and_check_zero_usize(&refs));
    assert!(locked::decrement_and_check_zero_usize(&refs));

    let b = AtomicU8::new(0xAB);
    assert!(!locked::xor_and_check_zero_u8(&b, 0x0B));
    assert_eq!(b.load(Ordering::SeqCst), 0xA0);
    assert!(locked::xor_and_check_zero_u8(&b, 0xA0));
    assert_eq!(b.load(Ordering::SeqCst), 0);
}

#[test]
fn unary_operations() {
    let a = AtomicI16::new(5);
    locked::negate_i16(&a);
    assert_eq!(a.load(Ordering::SeqCst), -5);

    let b = AtomicU8::new(0x0F);
    locked::not_u8(&b);
    assert_eq!(b.load(Ordering::SeqCst), 0xF0);

    let c = AtomicU64::new(u64::MAX);
    locked::increment_u64(&c);
    assert_eq!(c.load(Ordering::SeqCst), 0);
    locked::decrement_u64(&c);
    assert_eq!(c.load(Ordering::SeqCst), u64::MAX);

    let d = AtomicIsize::new(0);
    locked::decrement_isize(&d);
    locked::negate_isize(&d);
    assert_eq!(d.load(Ordering::SeqCst), 1);
}

#[test]
fn signed_and_unsigned_share_the_instruction() {
    let s = AtomicI8::new(127);
    locked::add_i8(&s, 1);
    assert_eq!(s.load(Ordering::SeqCst), -128);

    let u = AtomicU8::new(127);
    locked::add_u8(&u, 1);
    assert_eq!(u.load(Ordering::SeqCst), 128);
    assert_eq!(s.load(Ordering::SeqCst) as u8, u.load(Ordering::SeqCst));
}

#[test]
fn exchange_operations_return_prior_value() {
    let a = AtomicU32::new(10);
    assert_eq!(locked::add_and_swap_u32(&a, 5), 10);
    assert_eq!(a.load(Ordering::SeqCst), 15);

    let b = AtomicI64::new(-8);
    assert_eq!(locked::swap_i64(&b, 8), -8);
    assert_eq!(b.load(Ordering::SeqCst), 8);

    let p = AtomicUsize::new(0);
    assert_eq!(locked::swap_uintptr(&p, 0xDEAD_0000), 0);
    assert_eq!(locked::add_and_swap_uintptr(&p, 0xBEEF), 0xDEAD_0000);
    assert_eq!(p.load(Ordering::SeqCst), 0xDEAD_BEEF);
}

#[test]
fn tokens_and_pairs_are_send_sync() {
    assert_send_sync::<AtomicDoubleWord>();
    assert_send_sync::<WideCas>();
    assert_send_sync::<hwatomics::Rtm>();
    assert_send_sync::<hwatomics::Unsupported>();
}
