//! The status word returned by `xbegin`.

use core::fmt;

/// `xbegin` left this in `eax`: the transaction is live.
pub const XBEGIN_STARTED: u32 = !0;

/// Abort was caused by `xabort`; bits 31..24 hold its operand.
pub const ABORT_EXPLICIT: u32 = 1 << 0;
/// The transaction may succeed on retry.
pub const ABORT_RETRY: u32 = 1 << 1;
/// Another logical processor conflicted with a transactional access.
pub const ABORT_CONFLICT: u32 = 1 << 2;
/// An internal buffer overflowed.
pub const ABORT_CAPACITY: u32 = 1 << 3;
/// A debug breakpoint was hit.
pub const ABORT_DEBUG: u32 = 1 << 4;
/// The abort happened in a nested transaction.
pub const ABORT_NESTED: u32 = 1 << 5;

/// Extracts the `xabort` reason byte from an abort status.
///
/// Meaningful only when [`ABORT_EXPLICIT`] is set.
#[inline]
#[allow(clippy::cast_possible_truncation)]
pub const fn abort_code(status: u32) -> u8 {
    (status >> 24) as u8
}

/// A raw `xbegin` status with named accessors.
///
/// This is a view over the hardware bit layout, not a translation: the raw
/// word is always available through [`TxStatus::raw`] and converts back
/// losslessly.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct TxStatus(u32);

impl TxStatus {
    /// The transaction is live.
    pub const STARTED: TxStatus = TxStatus(XBEGIN_STARTED);

    /// Wraps a raw status word.
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// The raw status word.
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Whether the transaction started and is executing.
    #[inline]
    pub const fn started(self) -> bool {
        self.0 == XBEGIN_STARTED
    }

    /// Whether this is an abort caused by `xabort`.
    #[inline]
    pub const fn explicit(self) -> bool {
        !self.started() && self.0 & ABORT_EXPLICIT != 0
    }

    /// Whether the hardware suggests retrying.
    #[inline]
    pub const fn retry(self) -> bool {
        !self.started() && self.0 & ABORT_RETRY != 0
    }

    /// Whether the abort came from a memory conflict.
    #[inline]
    pub const fn conflict(self) -> bool {
        !self.started() && self.0 & ABORT_CONFLICT != 0
    }

    /// Whether the abort came from exceeding transactional capacity.
    #[inline]
    pub const fn capacity(self) -> bool {
        !self.started() && self.0 & ABORT_CAPACITY != 0
    }

    /// Whether the abort came from a debug breakpoint.
    #[inline]
    pub const fn debug(self) -> bool {
        !self.started() && self.0 & ABORT_DEBUG != 0
    }

    /// Whether the abort happened inside a nested transaction.
    #[inline]
    pub const fn nested(self) -> bool {
        !self.started() && self.0 & ABORT_NESTED != 0
    }

    /// The `xabort` reason, for explicit aborts.
    #[inline]
    pub const fn code(self) -> Option<u8> {
        if self.explicit() {
            Some(abort_code(self.0))
        } else {
            None
        }
    }
}

impl From<u32> for TxStatus {
    #[inline]
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

impl From<TxStatus> for u32 {
    #[inline]
    fn from(status: TxStatus) -> Self {
        status.0
    }
}

impl fmt::Debug for TxStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.started() {
            return f.write_str("TxStatus(STARTED)");
        }
        f.debug_struct("TxStatus")
            .field("raw", &format_args!("{:#010x}", self.0))
            .field("code", &self.code())
            .field("retry", &self.retry())
            .field("conflict", &self.conflict())
            .field("capacity", &self.capacity())
            .finish()
    }
}
