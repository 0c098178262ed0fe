//! Double-width compare-and-swap (`lock cmpxchg16b`).

use core::arch::asm;
use core::fmt;
use core::sync::atomic::{AtomicU64, Ordering};

use crate::capability::{Capabilities, Feature, Unsupported};

/// Two adjacent native words updated as one 128-bit unit.
///
/// Aligned to 16 bytes, as `cmpxchg16b` requires. Typical uses are
/// pointer + tag and value + version pairs.
#[repr(C, align(16))]
#[derive(Default)]
pub struct AtomicDoubleWord {
    lo: AtomicU64,
    hi: AtomicU64,
}

impl AtomicDoubleWord {
    /// Creates a new pair.
    #[inline]
    pub const fn new(lo: u64, hi: u64) -> Self {
        Self {
            lo: AtomicU64::new(lo),
            hi: AtomicU64::new(hi),
        }
    }

    /// Consumes the pair and returns `(lo, hi)`.
    #[inline]
    pub fn into_inner(self) -> (u64, u64) {
        (self.lo.into_inner(), self.hi.into_inner())
    }

    /// Mutable access to both words; exclusive borrow needs no atomics.
    #[inline]
    pub fn get_mut(&mut self) -> (&mut u64, &mut u64) {
        (self.lo.get_mut(), self.hi.get_mut())
    }

    /// The low word alone. Single-word primitives may be used on it, but a
    /// 128-bit reader can then observe a half-updated pair.
    #[inline]
    pub fn lo(&self) -> &AtomicU64 {
        &self.lo
    }

    /// The high word alone; see [`AtomicDoubleWord::lo`].
    #[inline]
    pub fn hi(&self) -> &AtomicU64 {
        &self.hi
    }

    /// Reads both words atomically.
    ///
    /// Implemented as a compare-and-swap of `(0, 0)` against itself, so it
    /// needs write access to the cache line like any other locked operation.
    ///
    /// # Safety
    /// The processor must support [`Feature::WideCompareAndSwap`].
    #[inline(always)]
    pub unsafe fn load(&self) -> (u64, u64) {
        // SAFETY: forwarded to the caller.
        unsafe { compare_and_swap_2x_u64(self, 0, 0, 0, 0) }
    }

    #[inline(always)]
    fn as_mut_ptr(&self) -> *mut u64 {
        self as *const Self as *mut u64
    }
}

impl fmt::Debug for AtomicDoubleWord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Two independent loads; may mix halves of different updates.
        f.debug_struct("AtomicDoubleWord")
            .field("lo", &self.lo.load(Ordering::Relaxed))
            .field("hi", &self.hi.load(Ordering::Relaxed))
            .finish()
    }
}

/// Stores `(desired_lo, desired_hi)` if the pair equals
/// `(expected_lo, expected_hi)`. Returns the pair observed before the
/// operation; the swap happened iff it equals the expected pair.
///
/// # Safety
/// The processor must support [`Feature::WideCompareAndSwap`]; check with
/// [`has_feature`](crate::capability::has_feature) or go through [`WideCas`].
/// Without it the instruction faults and the process is terminated.
#[inline(always)]
pub unsafe fn compare_and_swap_2x_u64(
    target: &AtomicDoubleWord,
    expected_lo: u64,
    expected_hi: u64,
    desired_lo: u64,
    desired_hi: u64,
) -> (u64, u64) {
    let prior_lo: u64;
    let prior_hi: u64;
    // rbx is reserved by the compiler; swap the low desired word through it.
    // SAFETY: `target` is a 16-byte aligned, interior-mutable pair; hardware
    // support is the caller's obligation.
    unsafe {
        asm!(
            "xchg {desired_lo}, rbx",
            "lock cmpxchg16b xmmword ptr [{dst}]",
            "mov rbx, {desired_lo}",
            dst = in(reg) target.as_mut_ptr(),
            desired_lo = inout(reg) desired_lo => _,
            in("rcx") desired_hi,
            inout("rax") expected_lo => prior_lo,
            inout("rdx") expected_hi => prior_hi,
            options(nostack),
        );
    }
    (prior_lo, prior_hi)
}

/// Proof that the processor supports `cmpxchg16b`.
///
/// Obtainable only through [`WideCas::detect`]; its methods are the safe form
/// of the double-width primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WideCas {
    _private: (),
}

impl WideCas {
    /// Returns the token if the processor supports double-width CAS.
    ///
    /// # Errors
    /// [`Unsupported`] if it does not.
    pub fn detect() -> Result<Self, Unsupported> {
        Capabilities::get()
            .require(Feature::WideCompareAndSwap)
            .map(|()| Self { _private: () })
    }

    /// See [`compare_and_swap_2x_u64`].
    #[inline(always)]
    pub fn compare_and_swap(
        self,
        target: &AtomicDoubleWord,
        expected: (u64, u64),
        desired: (u64, u64),
    ) -> (u64, u64) {
        // SAFETY: the token proves hardware support.
        unsafe { compare_and_swap_2x_u64(target, expected.0, expected.1, desired.0, desired.1) }
    }

    /// See [`AtomicDoubleWord::load`].
    #[inline(always)]
    pub fn load(self, target: &AtomicDoubleWord) -> (u64, u64) {
        // SAFETY: the token proves hardware support.
        unsafe { target.load() }
    }
}
