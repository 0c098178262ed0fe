//! # `hwatomics` - Hardware-Locked Atomic Primitives
//!
//! Indivisible read-modify-write operations executed as single x86-64
//! instructions, for building lock-free data structures without software
//! locks.
//!
//! ## Surface
//!
//! - **Locked primitives** ([`locked`]): add, add-with-carry, and/or/xor,
//!   subtract, subtract-with-borrow, increment/decrement/negate/not, the
//!   zero-flag and carry-flag variants, compare-and-swap, exchange-and-add
//!   and swap, for every 8/16/32/64-bit signed and unsigned integer plus the
//!   native `isize`/`usize`/`uintptr` aliases. Each one is a safe function
//!   over the matching `core::sync::atomic` type (`add_u8`,
//!   `compare_and_swap_i64`, `swap_uintptr`, ...).
//! - **Double-width compare-and-swap**: `cmpxchg16b` over an
//!   [`AtomicDoubleWord`](locked::AtomicDoubleWord).
//! - **Restricted transactional memory** ([`rtm`]): `xbegin`, `xend`,
//!   `xtest` and `xabort`.
//! - **Catalog** ([`catalog`]): the table every primitive is generated from,
//!   queryable at runtime and serializable.
//! - **Capabilities** ([`capability`]): cached detection of `cmpxchg16b` and
//!   RTM, and tokens that prove it.
//!
//! ## Safety Model
//!
//! The single-word primitives operate on std atomics, which are always valid,
//! aligned and shared-mutable, so they are safe. Primitives that depend on an
//! optional processor feature are `unsafe` in raw form; the capability tokens
//! ([`WideCas`](locked::WideCas), [`Rtm`](rtm::Rtm)) wrap them safely.
//!
//! ## Example
//!
//! ```rust
//! # #[cfg(target_arch = "x86_64")]
//! # fn main() {
//! use std::sync::atomic::{AtomicU8, AtomicU64, Ordering};
//! use hwatomics::locked;
//!
//! let a = AtomicU8::new(0xFF);
//! assert_eq!(locked::compare_and_swap_u8(&a, 0xFF, 42), 0xFF);
//! assert_eq!(a.load(Ordering::SeqCst), 42);
//!
//! let b = AtomicU64::new(15);
//! locked::and_u64(&b, 170);
//! assert_eq!(b.load(Ordering::SeqCst), 10);
//! # }
//! # #[cfg(not(target_arch = "x86_64"))]
//! # fn main() {}
//! ```

#![warn(missing_docs, clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::inline_always)]

pub mod capability;
pub mod catalog;

#[cfg(target_arch = "x86_64")]
pub mod locked;
#[cfg(target_arch = "x86_64")]
pub mod rtm;

pub use capability::{has_feature, Capabilities, Feature, Unsupported};
pub use catalog::{Descriptor, Flavor, Manifest, Operation, Variant, Width, CATALOG};

#[cfg(target_arch = "x86_64")]
pub use locked::{AtomicDoubleWord, Flags, LockedBits, LockedInt, WideCas};
#[cfg(target_arch = "x86_64")]
pub use rtm::{Rtm, TxStatus};

// Compile-time layout assertions
#[cfg(target_arch = "x86_64")]
const _: () = {
    use core::mem;

    // `cmpxchg16b` requires a 16-byte aligned 16-byte operand.
    assert!(mem::size_of::<AtomicDoubleWord>() == 16);
    assert!(mem::align_of::<AtomicDoubleWord>() == 16);

    // Views over hardware words stay exactly the word.
    assert!(mem::size_of::<Flags>() == mem::size_of::<u64>());
    assert!(mem::size_of::<TxStatus>() == mem::size_of::<u32>());

    // Tokens are ZSTs.
    assert!(mem::size_of::<WideCas>() == 0);
    assert!(mem::size_of::<Rtm>() == 0);

    // The surface casts atomics to their value type.
    assert!(mem::size_of::<core::sync::atomic::AtomicUsize>() == mem::size_of::<locked::Uintptr>());
};

const _: () = {
    // Every catalog entry sits at its own discriminant.
    let mut i = 0;
    while i < CATALOG.len() {
        assert!(CATALOG[i].operation as usize == i);
        i += 1;
    }
};
