#![cfg(target_arch = "x86_64")]

use core::sync::atomic::{AtomicI16, AtomicI32, AtomicI64, AtomicU16, AtomicU32, AtomicU64, AtomicU8, Ordering};

use hwatomics::locked;
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Add(u32),
    Subtract(u32),
    And(u32),
    Or(u32),
    Xor(u32),
    Swap(u32),
    AddAndSwap(u32),
    CompareAndSwap(u32, u32),
    Increment,
    Decrement,
    Negate,
    Not,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        any::<u32>().prop_map(Op::Add),
        any::<u32>().prop_map(Op::Subtract),
        any::<u32>().prop_map(Op::And),
        any::<u32>().prop_map(Op::Or),
        any::<u32>().prop_map(Op::Xor),
        any::<u32>().prop_map(Op::Swap),
        any::<u32>().prop_map(Op::AddAndSwap),
        (any::<u32>(), any::<u32>()).prop_map(|(e, d)| Op::CompareAndSwap(e, d)),
        Just(Op::Increment),
        Just(Op::Decrement),
        Just(Op::Negate),
        Just(Op::Not),
    ]
}

proptest! {
    #[test]
    fn test_u32_sequence_matches_wrapping_model(
        start in any::<u32>(),
        ops in proptest::collection::vec(op(), 1..64),
    ) {
        let cell = AtomicU32::new(start);
        let mut model = start;

        for op in ops {
            match op {
                Op::Add(v) => {
                    locked::add_u32(&cell, v);
                    model = model.wrapping_add(v);
                }
                Op::Subtract(v) => {
                    locked::subtract_u32(&cell, v);
                    model = model.wrapping_sub(v);
                }
                Op::And(v) => {
                    locked::and_u32(&cell, v);
                    model &= v;
                }
                Op::Or(v) => {
                    locked::or_u32(&cell, v);
                    model |= v;
                }
                Op::Xor(v) => {
                    locked::xor_u32(&cell, v);
                    model ^= v;
                }
                Op::Swap(v) => {
                    prop_assert_eq!(locked::swap_u32(&cell, v), model);
                    model = v;
                }
                Op::AddAndSwap(v) => {
                    prop_assert_eq!(locked::add_and_swap_u32(&cell, v), model);
                    model = model.wrapping_add(v);
                }
                Op::CompareAndSwap(expected, desired) => {
                    // Half the time, compare against the live value.
                    let expected = if expected & 1 == 0 { model } else { expected };
                    prop_assert_eq!(locked::compare_and_swap_u32(&cell, expected, desired), model);
                    if expected == model {
                        model = desired;
                    }
                }
                Op::Increment => {
                    locked::increment_u32(&cell);
                    model = model.wrapping_add(1);
                }
                Op::Decrement => {
                    locked::decrement_u32(&cell);
                    model = model.wrapping_sub(1);
                }
                Op::Negate => {
                    locked::negate_u32(&cell);
                    model = model.wrapping_neg();
                }
                Op::Not => {
                    locked::not_u32(&cell);
                    model = !model;
                }
            }
            prop_assert_eq!(cell.load(Ordering::SeqCst), model);
        }
    }

    #[test]
    fn test_compare_and_swap_every_width(
        a in any::<u8>(), b in any::<u16>(), c in any::<u32>(), d in any::<u64>(),
        other in any::<u64>(),
    ) {
        #[allow(clippy::cast_possible_truncation)]
        let (a2, b2, c2) = (other as u8, other as u16, other as u32);

        let x8 = AtomicU8::new(a);
        prop_assert_eq!(locked::compare_and_swap_u8(&x8, a, a2), a);
        prop_assert_eq!(x8.load(Ordering::SeqCst), a2);

        let x16 = AtomicU16::new(b);
        prop_assert_eq!(locked::compare_and_swap_u16(&x16, b, b2), b);
        prop_assert_eq!(x16.load(Ordering::SeqCst), b2);

        let x32 = AtomicU32::new(c);
        prop_assert_eq!(locked::compare_and_swap_u32(&x32, c, c2), c);
        prop_assert_eq!(x32.load(Ordering::SeqCst), c2);

        let x64 = AtomicU64::new(d);
        prop_assert_eq!(locked::compare_and_swap_u64(&x64, d, other), d);
        prop_assert_eq!(x64.load(Ordering::SeqCst), other);

        // Mismatch leaves memory alone and reports what is there.
        let y = AtomicU64::new(d);
        let wrong = d.wrapping_add(1);
        prop_assert_eq!(locked::compare_and_swap_u64(&y, wrong, other), d);
        prop_assert_eq!(y.load(Ordering::SeqCst), d);
    }

    #[test]
    fn test_signed_arithmetic_wraps(a in any::<i16>(), b in any::<i16>(), c in any::<i64>(), d in any::<i64>()) {
        let x = AtomicI16::new(a);
        locked::add_i16(&x, b);
        prop_assert_eq!(x.load(Ordering::SeqCst), a.wrapping_add(b));
        locked::subtract_i16(&x, b);
        prop_assert_eq!(x.load(Ordering::SeqCst), a);

        let y = AtomicI64::new(c);
        prop_assert_eq!(locked::add_and_swap_i64(&y, d), c);
        prop_assert_eq!(y.load(Ordering::SeqCst), c.wrapping_add(d));

        let z = AtomicI32::new(i32::from(a));
        prop_assert_eq!(locked::xor_and_check_zero_i32(&z, i32::from(b)), a == b);
    }

    #[test]
    fn test_bit_ops_model(start in any::<u64>(), bit in any::<u32>()) {
        let cell = AtomicU64::new(start);
        let mask = 1u64 << (bit % 64);

        prop_assert_eq!(locked::bit_test_and_complement_u64(&cell, bit), start & mask != 0);
        prop_assert_eq!(cell.load(Ordering::SeqCst), start ^ mask);
        prop_assert_eq!(locked::bit_test_and_set_u64(&cell, bit), (start ^ mask) & mask != 0);
        prop_assert_eq!(cell.load(Ordering::SeqCst), start | mask);
        prop_assert!(locked::bit_test_and_reset_u64(&cell, bit));
        prop_assert_eq!(cell.load(Ordering::SeqCst), start & !mask);
    }

    #[test]
    fn test_carry_chain_matches_wide_arithmetic(a in any::<u128>(), b in any::<u128>()) {
        #[allow(clippy::cast_possible_truncation)]
        let split = |v: u128| (v as u64, (v >> 64) as u64);
        let (a_lo, a_hi) = split(a);
        let (b_lo, b_hi) = split(b);

        let lo = AtomicU64::new(a_lo);
        let hi = AtomicU64::new(a_hi);
        let carry = locked::add_with_carry_u64(&lo, b_lo, false);
        let overflow = locked::add_with_carry_u64(&hi, b_hi, carry);
        let sum = u128::from(lo.load(Ordering::SeqCst)) | (u128::from(hi.load(Ordering::SeqCst)) << 64);
        prop_assert_eq!(sum, a.wrapping_add(b));
        prop_assert_eq!(overflow, a.checked_add(b).is_none());

        let borrow = locked::subtract_with_borrow_u64(&lo, b_lo, false);
        let underflow = locked::subtract_with_borrow_u64(&hi, b_hi, borrow);
        let back = u128::from(lo.load(Ordering::SeqCst)) | (u128::from(hi.load(Ordering::SeqCst)) << 64);
        prop_assert_eq!(back, a);
        prop_assert_eq!(underflow, overflow);
    }
}
