//! The flat primitive surface: one function per operation and integer type.
//!
//! Names follow `<method>_<type>`; `isize`/`usize`/`uintptr` are the native
//! width aliases. Each function executes exactly one locked instruction on the
//! given atomic.

use core::sync::atomic::{
    AtomicI16, AtomicI32, AtomicI64, AtomicI8, AtomicIsize, AtomicU16, AtomicU32, AtomicU64,
    AtomicU8, AtomicUsize,
};

use super::{LockedBits, LockedInt};
use crate::catalog::operation_table;

operation_table!(expand_surface { u8, AtomicU8, u8, narrow });
operation_table!(expand_surface { i8, AtomicI8, i8, narrow });
operation_table!(expand_surface { u16, AtomicU16, u16, wide });
operation_table!(expand_surface { i16, AtomicI16, i16, wide });
operation_table!(expand_surface { u32, AtomicU32, u32, wide });
operation_table!(expand_surface { i32, AtomicI32, i32, wide });
operation_table!(expand_surface { u64, AtomicU64, u64, wide });
operation_table!(expand_surface { i64, AtomicI64, i64, wide });
operation_table!(expand_surface { isize, AtomicIsize, isize, wide });
operation_table!(expand_surface { usize, AtomicUsize, usize, wide });
operation_table!(expand_surface { usize, AtomicUsize, uintptr, wide });

/// Every generated function name, including the double-width CAS.
#[cfg(test)]
pub(crate) fn names() -> Vec<&'static str> {
    let mut names = Vec::new();
    surface_u8(&mut names);
    surface_i8(&mut names);
    surface_u16(&mut names);
    surface_i16(&mut names);
    surface_u32(&mut names);
    surface_i32(&mut names);
    surface_u64(&mut names);
    surface_i64(&mut names);
    surface_isize(&mut names);
    surface_usize(&mut names);
    surface_uintptr(&mut names);
    names.push("compare_and_swap_2x_u64");
    names
}
