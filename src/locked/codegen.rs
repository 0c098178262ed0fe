//! Expansion of the operation table into traits, assembly and functions.
//!
//! Each consumer receives the table from
//! [`operation_table!`](crate::catalog::operation_table) and dispatches every
//! line on its shape. Shapes a consumer does not handle expand to nothing.

macro_rules! lock_prefix {
    (lock) => {
        "lock "
    };
    (nolock) => {
        ""
    };
}

/// Declares `LockedInt` (every width) and `LockedBits` (16/32/64 bits).
macro_rules! declare_locked_traits {
    ({} $($shape:ident $name:ident $method:ident $lock:ident $mnemonic:literal $doc:literal;)*) => {
        /// Locked read-modify-write instructions on integers of one width.
        ///
        /// Implemented for `u8`..`u64`, `i8`..`i64`, `usize` and `isize`.
        /// Signed and unsigned types of one width execute the same instruction.
        ///
        /// The methods take a raw pointer so they can be used on memory that
        /// is not an `Atomic*` (shared mappings, packed buffers). The
        /// `<method>_<type>` functions are the safe form.
        ///
        /// `add` and `not` share names with `core::ops`; call them as
        /// `<T as LockedInt>::add` in generic code.
        pub trait LockedInt:
            PrimInt + WrappingAdd + WrappingSub + Send + Sync + 'static + private::Sealed
        {
            /// The std atomic with the same in-memory representation.
            type Atomic: Send + Sync;

            /// The catalog flavor this type expands to.
            const FLAVOR: Flavor;

            $( locked_signature!($shape $method $doc); )*
        }

        /// Locked bit-test instructions; absent for 8-bit integers.
        pub trait LockedBits: LockedInt {
            $( bits_signature!($shape $method $doc); )*
        }
    };
}

macro_rules! locked_signature {
    (rmw $method:ident $doc:literal) => {
        #[doc = $doc]
        ///
        /// # Safety
        /// `dst` must be valid for reads and writes and aligned to the operand
        /// width, and every concurrent access to it must be atomic.
        unsafe fn $method(dst: *mut Self, operand: Self);
    };
    (rmw_cf $method:ident $doc:literal) => {
        #[doc = $doc]
        ///
        /// # Safety
        /// As for [`LockedInt::add`].
        unsafe fn $method(dst: *mut Self, operand: Self, carry: bool) -> bool;
    };
    (unary $method:ident $doc:literal) => {
        #[doc = $doc]
        ///
        /// # Safety
        /// As for [`LockedInt::add`].
        unsafe fn $method(dst: *mut Self);
    };
    (unary_zf $method:ident $doc:literal) => {
        #[doc = $doc]
        ///
        /// # Safety
        /// As for [`LockedInt::add`].
        unsafe fn $method(dst: *mut Self) -> bool;
    };
    (rmw_zf $method:ident $doc:literal) => {
        #[doc = $doc]
        ///
        /// # Safety
        /// As for [`LockedInt::add`].
        unsafe fn $method(dst: *mut Self, operand: Self) -> bool;
    };
    (cmpxchg $method:ident $doc:literal) => {
        #[doc = $doc]
        ///
        /// # Safety
        /// As for [`LockedInt::add`].
        unsafe fn $method(dst: *mut Self, expected: Self, desired: Self) -> Self;
    };
    (exchange $method:ident $doc:literal) => {
        #[doc = $doc]
        ///
        /// # Safety
        /// As for [`LockedInt::add`].
        unsafe fn $method(dst: *mut Self, operand: Self) -> Self;
    };
    ($other:ident $method:ident $doc:literal) => {};
}

macro_rules! bits_signature {
    (bit_cf $method:ident $doc:literal) => {
        #[doc = $doc]
        ///
        /// `bit` is taken modulo the operand width, so the instruction never
        /// touches memory outside `*dst`.
        ///
        /// # Safety
        /// As for [`LockedInt::add`].
        unsafe fn $method(dst: *mut Self, bit: u32) -> bool;
    };
    ($other:ident $method:ident $doc:literal) => {};
}

/// Implements `LockedInt` (and `LockedBits` for `wide` types) for one integer.
///
/// Context: type, atomic type, flavor, memory size keyword, register class,
/// register modifier, accumulator register, and `narrow`/`wide`.
macro_rules! impl_locked {
    (
        {
            $t:ty, $atomic:ty, $flavor:expr,
            $size:literal, $class:ident, $modifier:literal, $acc:tt, $bits:ident
        }
        $($shape:ident $name:ident $method:ident $lock:ident $mnemonic:literal $doc:literal;)*
    ) => {
        impl private::Sealed for $t {}

        impl LockedInt for $t {
            type Atomic = $atomic;

            const FLAVOR: Flavor = $flavor;

            $( locked_method!($shape $method $lock $mnemonic; $size, $class, $modifier, $acc); )*
        }

        impl_locked_bits!($bits, $t, $size, $class, $modifier; $( $shape $method $lock $mnemonic; )*);
    };
}

macro_rules! impl_locked_bits {
    (narrow, $($rest:tt)*) => {};
    (
        wide, $t:ty, $size:literal, $class:ident, $modifier:literal;
        $($shape:ident $method:ident $lock:ident $mnemonic:literal;)*
    ) => {
        impl LockedBits for $t {
            $( bits_method!($shape $method $lock $mnemonic; $size, $class, $modifier); )*
        }
    };
}

macro_rules! locked_method {
    (rmw $method:ident $lock:ident $mnemonic:literal;
        $size:literal, $class:ident, $modifier:literal, $acc:tt) => {
        #[inline(always)]
        unsafe fn $method(dst: *mut Self, operand: Self) {
            // SAFETY: the caller guarantees `dst` is valid and aligned.
            unsafe {
                ::core::arch::asm!(
                    concat!(
                        lock_prefix!($lock), $mnemonic, " ", $size,
                        " ptr [{dst}], {operand", $modifier, "}"
                    ),
                    dst = in(reg) dst,
                    operand = in($class) operand,
                    options(nostack),
                );
            }
        }
    };
    (rmw_cf $method:ident $lock:ident $mnemonic:literal;
        $size:literal, $class:ident, $modifier:literal, $acc:tt) => {
        #[inline(always)]
        unsafe fn $method(dst: *mut Self, operand: Self, carry: bool) -> bool {
            let carry_out: u8;
            // SAFETY: the caller guarantees `dst` is valid and aligned.
            unsafe {
                ::core::arch::asm!(
                    "bt {carry:e}, 0",
                    concat!(
                        lock_prefix!($lock), $mnemonic, " ", $size,
                        " ptr [{dst}], {operand", $modifier, "}"
                    ),
                    "setc {carry_out}",
                    dst = in(reg) dst,
                    operand = in($class) operand,
                    carry = in(reg) u32::from(carry),
                    carry_out = lateout(reg_byte) carry_out,
                    options(nostack),
                );
            }
            carry_out != 0
        }
    };
    (unary $method:ident $lock:ident $mnemonic:literal;
        $size:literal, $class:ident, $modifier:literal, $acc:tt) => {
        #[inline(always)]
        unsafe fn $method(dst: *mut Self) {
            // SAFETY: the caller guarantees `dst` is valid and aligned.
            unsafe {
                ::core::arch::asm!(
                    concat!(lock_prefix!($lock), $mnemonic, " ", $size, " ptr [{dst}]"),
                    dst = in(reg) dst,
                    options(nostack),
                );
            }
        }
    };
    (unary_zf $method:ident $lock:ident $mnemonic:literal;
        $size:literal, $class:ident, $modifier:literal, $acc:tt) => {
        #[inline(always)]
        unsafe fn $method(dst: *mut Self) -> bool {
            let zero: u8;
            // SAFETY: the caller guarantees `dst` is valid and aligned.
            unsafe {
                ::core::arch::asm!(
                    concat!(lock_prefix!($lock), $mnemonic, " ", $size, " ptr [{dst}]"),
                    "sete {zero}",
                    dst = in(reg) dst,
                    zero = lateout(reg_byte) zero,
                    options(nostack),
                );
            }
            zero != 0
        }
    };
    (rmw_zf $method:ident $lock:ident $mnemonic:literal;
        $size:literal, $class:ident, $modifier:literal, $acc:tt) => {
        #[inline(always)]
        unsafe fn $method(dst: *mut Self, operand: Self) -> bool {
            let zero: u8;
            // SAFETY: the caller guarantees `dst` is valid and aligned.
            unsafe {
                ::core::arch::asm!(
                    concat!(
                        lock_prefix!($lock), $mnemonic, " ", $size,
                        " ptr [{dst}], {operand", $modifier, "}"
                    ),
                    "sete {zero}",
                    dst = in(reg) dst,
                    operand = in($class) operand,
                    zero = lateout(reg_byte) zero,
                    options(nostack),
                );
            }
            zero != 0
        }
    };
    (cmpxchg $method:ident $lock:ident $mnemonic:literal;
        $size:literal, $class:ident, $modifier:literal, $acc:tt) => {
        #[inline(always)]
        unsafe fn $method(dst: *mut Self, expected: Self, desired: Self) -> Self {
            let mut prior = expected;
            // SAFETY: the caller guarantees `dst` is valid and aligned.
            unsafe {
                ::core::arch::asm!(
                    concat!(
                        lock_prefix!($lock), $mnemonic, " ", $size,
                        " ptr [{dst}], {desired", $modifier, "}"
                    ),
                    dst = in(reg) dst,
                    desired = in($class) desired,
                    inout($acc) prior,
                    options(nostack),
                );
            }
            prior
        }
    };
    (exchange $method:ident $lock:ident $mnemonic:literal;
        $size:literal, $class:ident, $modifier:literal, $acc:tt) => {
        #[inline(always)]
        unsafe fn $method(dst: *mut Self, operand: Self) -> Self {
            let mut value = operand;
            // SAFETY: the caller guarantees `dst` is valid and aligned.
            unsafe {
                ::core::arch::asm!(
                    concat!(
                        lock_prefix!($lock), $mnemonic, " ", $size,
                        " ptr [{dst}], {value", $modifier, "}"
                    ),
                    dst = in(reg) dst,
                    value = inout($class) value,
                    options(nostack),
                );
            }
            value
        }
    };
    ($other:ident $method:ident $lock:ident $mnemonic:literal;
        $size:literal, $class:ident, $modifier:literal, $acc:tt) => {};
}

macro_rules! bits_method {
    (bit_cf $method:ident $lock:ident $mnemonic:literal;
        $size:literal, $class:ident, $modifier:literal) => {
        #[inline(always)]
        #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
        unsafe fn $method(dst: *mut Self, bit: u32) -> bool {
            let bit = (bit % Self::BITS) as Self;
            let carry: u8;
            // SAFETY: the caller guarantees `dst` is valid and aligned, and the
            // offset is below the operand width.
            unsafe {
                ::core::arch::asm!(
                    concat!(
                        lock_prefix!($lock), $mnemonic, " ", $size,
                        " ptr [{dst}], {bit", $modifier, "}"
                    ),
                    "setc {carry}",
                    dst = in(reg) dst,
                    bit = in($class) bit,
                    carry = lateout(reg_byte) carry,
                    options(nostack),
                );
            }
            carry != 0
        }
    };
    ($other:ident $method:ident $lock:ident $mnemonic:literal;
        $size:literal, $class:ident, $modifier:literal) => {};
}

/// Emits the safe `<method>_<suffix>` functions for one flavor.
///
/// Context: value type, atomic type, identifier suffix, `narrow`/`wide`.
macro_rules! expand_surface {
    (
        { $t:ty, $atomic:ty, $suffix:ident, $bits:ident }
        $($shape:ident $name:ident $method:ident $lock:ident $mnemonic:literal $doc:literal;)*
    ) => {
        $( surface_fn!($shape $method $doc; $t, $atomic, $suffix, $bits); )*

        ::paste::paste! {
            #[cfg(test)]
            pub(crate) fn [<surface_ $suffix>](names: &mut Vec<&'static str>) {
                $( surface_name!(names; $shape $method; $suffix, $bits); )*
            }
        }
    };
}

macro_rules! surface_fn {
    (rmw $method:ident $doc:literal; $t:ty, $atomic:ty, $suffix:ident, $bits:ident) => {
        ::paste::paste! {
            #[doc = $doc]
            #[inline(always)]
            pub fn [<$method _ $suffix>](target: &$atomic, operand: $t) {
                // SAFETY: an atomic is valid, aligned and interior-mutable.
                unsafe { <$t as LockedInt>::$method(target as *const $atomic as *mut $t, operand) }
            }
        }
    };
    (rmw_cf $method:ident $doc:literal; $t:ty, $atomic:ty, $suffix:ident, $bits:ident) => {
        ::paste::paste! {
            #[doc = $doc]
            ///
            /// Chain multi-word arithmetic by passing each call's result as
            /// the next call's `carry`.
            #[inline(always)]
            pub fn [<$method _ $suffix>](target: &$atomic, operand: $t, carry: bool) -> bool {
                // SAFETY: an atomic is valid, aligned and interior-mutable.
                unsafe {
                    <$t as LockedInt>::$method(target as *const $atomic as *mut $t, operand, carry)
                }
            }
        }
    };
    (unary $method:ident $doc:literal; $t:ty, $atomic:ty, $suffix:ident, $bits:ident) => {
        ::paste::paste! {
            #[doc = $doc]
            #[inline(always)]
            pub fn [<$method _ $suffix>](target: &$atomic) {
                // SAFETY: an atomic is valid, aligned and interior-mutable.
                unsafe { <$t as LockedInt>::$method(target as *const $atomic as *mut $t) }
            }
        }
    };
    (unary_zf $method:ident $doc:literal; $t:ty, $atomic:ty, $suffix:ident, $bits:ident) => {
        ::paste::paste! {
            #[doc = $doc]
            #[inline(always)]
            pub fn [<$method _ $suffix>](target: &$atomic) -> bool {
                // SAFETY: an atomic is valid, aligned and interior-mutable.
                unsafe { <$t as LockedInt>::$method(target as *const $atomic as *mut $t) }
            }
        }
    };
    (rmw_zf $method:ident $doc:literal; $t:ty, $atomic:ty, $suffix:ident, $bits:ident) => {
        ::paste::paste! {
            #[doc = $doc]
            #[inline(always)]
            pub fn [<$method _ $suffix>](target: &$atomic, operand: $t) -> bool {
                // SAFETY: an atomic is valid, aligned and interior-mutable.
                unsafe { <$t as LockedInt>::$method(target as *const $atomic as *mut $t, operand) }
            }
        }
    };
    (bit_cf $method:ident $doc:literal; $t:ty, $atomic:ty, $suffix:ident, narrow) => {};
    (bit_cf $method:ident $doc:literal; $t:ty, $atomic:ty, $suffix:ident, wide) => {
        ::paste::paste! {
            #[doc = $doc]
            ///
            /// `bit` is taken modulo the operand width.
            #[inline(always)]
            pub fn [<$method _ $suffix>](target: &$atomic, bit: u32) -> bool {
                // SAFETY: an atomic is valid, aligned and interior-mutable.
                unsafe { <$t as LockedBits>::$method(target as *const $atomic as *mut $t, bit) }
            }
        }
    };
    (cmpxchg $method:ident $doc:literal; $t:ty, $atomic:ty, $suffix:ident, $bits:ident) => {
        ::paste::paste! {
            #[doc = $doc]
            ///
            /// The swap happened iff the returned value equals `expected`.
            #[inline(always)]
            pub fn [<$method _ $suffix>](target: &$atomic, expected: $t, desired: $t) -> $t {
                // SAFETY: an atomic is valid, aligned and interior-mutable.
                unsafe {
                    <$t as LockedInt>::$method(
                        target as *const $atomic as *mut $t,
                        expected,
                        desired,
                    )
                }
            }
        }
    };
    (exchange $method:ident $doc:literal; $t:ty, $atomic:ty, $suffix:ident, $bits:ident) => {
        ::paste::paste! {
            #[doc = $doc]
            #[inline(always)]
            pub fn [<$method _ $suffix>](target: &$atomic, operand: $t) -> $t {
                // SAFETY: an atomic is valid, aligned and interior-mutable.
                unsafe { <$t as LockedInt>::$method(target as *const $atomic as *mut $t, operand) }
            }
        }
    };
    (wide $method:ident $doc:literal; $t:ty, $atomic:ty, $suffix:ident, $bits:ident) => {};
}

macro_rules! surface_name {
    ($names:ident; bit_cf $method:ident; $suffix:ident, narrow) => {};
    ($names:ident; wide $method:ident; $suffix:ident, $bits:ident) => {};
    ($names:ident; $shape:ident $method:ident; $suffix:ident, $bits:ident) => {
        ::paste::paste! {
            $names.push(stringify!([<$method _ $suffix>]));
        }
    };
}
