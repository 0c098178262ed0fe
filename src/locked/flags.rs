//! Flag register introspection, for tests and diagnostics.

use core::arch::asm;
use core::fmt;

/// A snapshot of RFLAGS.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Flags(u64);

impl Flags {
    /// Carry flag bit.
    pub const CARRY: u64 = 1 << 0;
    /// Parity flag bit.
    pub const PARITY: u64 = 1 << 2;
    /// Zero flag bit.
    pub const ZERO: u64 = 1 << 6;
    /// Sign flag bit.
    pub const SIGN: u64 = 1 << 7;
    /// Overflow flag bit.
    pub const OVERFLOW: u64 = 1 << 11;

    /// Wraps a raw RFLAGS value.
    #[inline]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw RFLAGS value.
    #[inline]
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// Unsigned overflow / borrow out of the last arithmetic instruction.
    #[inline]
    pub const fn carry(self) -> bool {
        self.0 & Self::CARRY != 0
    }

    /// Even number of set bits in the low byte of the last result.
    #[inline]
    pub const fn parity(self) -> bool {
        self.0 & Self::PARITY != 0
    }

    /// The last result was zero.
    #[inline]
    pub const fn zero(self) -> bool {
        self.0 & Self::ZERO != 0
    }

    /// The last result was negative.
    #[inline]
    pub const fn sign(self) -> bool {
        self.0 & Self::SIGN != 0
    }

    /// Signed overflow out of the last arithmetic instruction.
    #[inline]
    pub const fn overflow(self) -> bool {
        self.0 & Self::OVERFLOW != 0
    }
}

impl fmt::Debug for Flags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Flags")
            .field("raw", &format_args!("{:#x}", self.0))
            .field("carry", &self.carry())
            .field("zero", &self.zero())
            .field("sign", &self.sign())
            .field("overflow", &self.overflow())
            .finish()
    }
}

/// Reads the flags left by the most recent flag-setting instruction on this
/// thread.
///
/// Only meaningful directly after a primitive: any flag-altering instruction
/// the compiler emits between the primitive and this call (a comparison, a
/// call prologue adjusting the stack) replaces the flags being inspected.
/// Nothing enforces this; it is a diagnostic aid, not a way to compose
/// operations.
#[inline(always)]
pub fn flags() -> Flags {
    let raw: u64;
    // SAFETY: `pushfq`/`pop` only touch the stack slot they allocate.
    unsafe {
        asm!("pushfq", "pop {raw}", raw = out(reg) raw, options(preserves_flags));
    }
    Flags(raw)
}
