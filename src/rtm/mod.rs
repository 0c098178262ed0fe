//! Restricted transactional memory.
//!
//! Thin wrappers over `xbegin`, `xend`, `xtest` and `xabort`. A transaction
//! either commits at [`end`] or aborts: the processor rolls back every write
//! made since [`begin`] and resumes as if `begin` had just returned, this time
//! with an abort status instead of [`XBEGIN_STARTED`].
//!
//! ```no_run
//! # #[cfg(target_arch = "x86_64")]
//! # fn main() {
//! use hwatomics::rtm::Rtm;
//!
//! if let Ok(rtm) = Rtm::detect() {
//!     let status = rtm.begin();
//!     if status.started() {
//!         // transactional region
//!         // SAFETY: a transaction was started just above.
//!         unsafe { rtm.end() };
//!     } else if let Some(code) = status.code() {
//!         println!("aborted with {code}");
//!     }
//! }
//! # }
//! # #[cfg(not(target_arch = "x86_64"))]
//! # fn main() {}
//! ```
//!
//! Aborts are ordinary outcomes: interrupts, cache pressure and conflicting
//! accesses from other processors can abort any transaction, so every
//! transactional region needs a non-transactional fallback path.

use core::arch::asm;

use crate::capability::{Capabilities, Feature, Unsupported};

mod status;

pub use status::{
    abort_code, TxStatus, ABORT_CAPACITY, ABORT_CONFLICT, ABORT_DEBUG, ABORT_EXPLICIT,
    ABORT_NESTED, ABORT_RETRY, XBEGIN_STARTED,
};

/// Starts a transaction.
///
/// Returns [`XBEGIN_STARTED`] once the transaction is live. If it later
/// aborts, control comes back out of this call a second time carrying the
/// abort status (see [`TxStatus`]).
///
/// # Safety
/// The processor must support [`Feature::TransactionalMemory`].
#[inline(always)]
pub unsafe fn begin() -> u32 {
    let status: u32;
    // SAFETY: hardware support is the caller's obligation. The fallback
    // address is the instruction right after `xbegin`, where `eax` holds
    // either the preloaded sentinel or the abort status.
    unsafe {
        asm!(
            "mov eax, -1",
            "xbegin 2f",
            "2:",
            out("eax") status,
            options(nostack),
        );
    }
    status
}

/// Commits the current transaction.
///
/// # Safety
/// The processor must support [`Feature::TransactionalMemory`] and a
/// transaction must be active ([`test`] returns `true`); otherwise `xend`
/// raises a general-protection fault.
#[inline(always)]
pub unsafe fn end() {
    // SAFETY: forwarded to the caller.
    unsafe {
        asm!("xend", options(nostack));
    }
}

/// Returns whether a transaction is executing.
///
/// # Safety
/// The processor must support [`Feature::TransactionalMemory`].
#[inline(always)]
pub unsafe fn test() -> bool {
    let inside: u8;
    // SAFETY: hardware support is the caller's obligation.
    unsafe {
        asm!(
            "xtest",
            "setnz {inside}",
            inside = lateout(reg_byte) inside,
            options(nostack),
        );
    }
    inside != 0
}

/// Aborts the current transaction with a compile-time reason.
///
/// [`begin`] then returns a status with [`ABORT_EXPLICIT`] set and `REASON`
/// in bits 31..24. Outside a transaction this does nothing.
///
/// # Safety
/// The processor must support [`Feature::TransactionalMemory`].
#[inline(always)]
pub unsafe fn abort_with<const REASON: u8>() {
    // SAFETY: hardware support is the caller's obligation.
    unsafe {
        asm!("xabort {reason}", reason = const REASON, options(nostack));
    }
}

// `xabort` only encodes an immediate. Walk the reason one bit at a time,
// most significant first, until a constant is reached, then call
// `$leaf::<CONST>()`.
macro_rules! abort_dispatch {
    ($leaf:ident; $reason:ident, $base:expr;) => {
        $leaf::<{ $base }>()
    };
    ($leaf:ident; $reason:ident, $base:expr; $bit:literal $($rest:literal)*) => {
        if $reason & (1 << $bit) == 0 {
            abort_dispatch!($leaf; $reason, $base; $($rest)*)
        } else {
            abort_dispatch!($leaf; $reason, $base | (1 << $bit); $($rest)*)
        }
    };
}

/// Aborts the current transaction with a runtime reason.
///
/// Equivalent to `abort_with::<reason>()`. Outside a transaction this does
/// nothing.
///
/// # Safety
/// The processor must support [`Feature::TransactionalMemory`].
#[inline]
pub unsafe fn abort(reason: u8) {
    // SAFETY: forwarded to the caller.
    unsafe { abort_dispatch!(abort_with; reason, 0u8; 7 6 5 4 3 2 1 0) }
}

/// Proof that the processor supports RTM.
///
/// Obtainable only through [`Rtm::detect`]; its methods are the safe form of
/// the raw entry points, except [`Rtm::end`], which still needs an active
/// transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rtm {
    _private: (),
}

impl Rtm {
    /// Returns the token if the processor supports RTM.
    ///
    /// # Errors
    /// [`Unsupported`] if it does not.
    pub fn detect() -> Result<Self, Unsupported> {
        Capabilities::get()
            .require(Feature::TransactionalMemory)
            .map(|()| Self { _private: () })
    }

    /// See [`begin`].
    #[inline(always)]
    pub fn begin(self) -> TxStatus {
        // SAFETY: the token proves hardware support.
        TxStatus::from_raw(unsafe { begin() })
    }

    /// See [`end`].
    ///
    /// # Safety
    /// A transaction must be active.
    #[inline(always)]
    pub unsafe fn end(self) {
        // SAFETY: the token proves hardware support; the caller guarantees
        // an active transaction.
        unsafe { end() }
    }

    /// See [`test`].
    #[inline(always)]
    pub fn test(self) -> bool {
        // SAFETY: the token proves hardware support.
        unsafe { test() }
    }

    /// See [`abort`].
    #[inline]
    pub fn abort(self, reason: u8) {
        // SAFETY: the token proves hardware support.
        unsafe { abort(reason) }
    }

    /// See [`abort_with`].
    #[inline(always)]
    pub fn abort_with<const REASON: u8>(self) {
        // SAFETY: the token proves hardware support.
        unsafe { abort_with::<REASON>() }
    }
}

#[cfg(test)]
mod tests;
