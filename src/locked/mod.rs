//! Locked read-modify-write primitives.
//!
//! Every primitive is a single `lock`-prefixed instruction (or `xchg`, which
//! locks implicitly) on one memory operand. Primitives whose result is a flag
//! read that flag with `setcc` inside the same `asm!` block, so no other
//! instruction can clobber it in between.
//!
//! Two forms are generated from the [catalog](crate::catalog):
//!
//! - [`LockedInt`] / [`LockedBits`]: generic, raw-pointer methods implemented
//!   for every integer type.
//! - `<method>_<type>` functions (`add_u8`, `compare_and_swap_i64`,
//!   `swap_uintptr`, ...) that take the matching std atomic and are safe.
//!
//! Ordering: a locked instruction is a full barrier on x86-64, so every
//! primitive here is sequentially consistent.

use num_traits::{PrimInt, WrappingAdd, WrappingSub};

use crate::catalog::{operation_table, Flavor, Signedness, Width};

#[macro_use]
mod codegen;

mod flags;
pub mod surface;
mod wide;

pub use flags::{flags, Flags};
pub use surface::*;
pub use wide::{compare_and_swap_2x_u64, AtomicDoubleWord, WideCas};

/// Address-sized unsigned integer; the value type of the `*_uintptr`
/// primitives.
pub type Uintptr = usize;

mod private {
    pub trait Sealed {}
}

operation_table!(declare_locked_traits {});

operation_table!(impl_locked {
    u8, core::sync::atomic::AtomicU8, Flavor::Sized(Width::W8, Signedness::Unsigned),
    "byte", reg_byte, "", "al", narrow
});
operation_table!(impl_locked {
    i8, core::sync::atomic::AtomicI8, Flavor::Sized(Width::W8, Signedness::Signed),
    "byte", reg_byte, "", "al", narrow
});
operation_table!(impl_locked {
    u16, core::sync::atomic::AtomicU16, Flavor::Sized(Width::W16, Signedness::Unsigned),
    "word", reg, ":x", "ax", wide
});
operation_table!(impl_locked {
    i16, core::sync::atomic::AtomicI16, Flavor::Sized(Width::W16, Signedness::Signed),
    "word", reg, ":x", "ax", wide
});
operation_table!(impl_locked {
    u32, core::sync::atomic::AtomicU32, Flavor::Sized(Width::W32, Signedness::Unsigned),
    "dword", reg, ":e", "eax", wide
});
operation_table!(impl_locked {
    i32, core::sync::atomic::AtomicI32, Flavor::Sized(Width::W32, Signedness::Signed),
    "dword", reg, ":e", "eax", wide
});
operation_table!(impl_locked {
    u64, core::sync::atomic::AtomicU64, Flavor::Sized(Width::W64, Signedness::Unsigned),
    "qword", reg, ":r", "rax", wide
});
operation_table!(impl_locked {
    i64, core::sync::atomic::AtomicI64, Flavor::Sized(Width::W64, Signedness::Signed),
    "qword", reg, ":r", "rax", wide
});
operation_table!(impl_locked {
    usize, core::sync::atomic::AtomicUsize, Flavor::Uint,
    "qword", reg, ":r", "rax", wide
});
operation_table!(impl_locked {
    isize, core::sync::atomic::AtomicIsize, Flavor::Int,
    "qword", reg, ":r", "rax", wide
});
