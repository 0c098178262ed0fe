//! Processor capability queries.
//!
//! Double-width compare-and-swap and the RTM instructions fault on processors
//! that lack them; nothing in this crate checks implicitly. Callers gate those
//! primitives with [`has_feature`], or obtain a capability token
//! ([`WideCas`](crate::locked::WideCas), [`Rtm`](crate::rtm::Rtm)) whose
//! existence proves the check was made.
//!
//! Detection runs once per process; the result is cached read-only.

use core::fmt;
use std::sync::OnceLock;

use serde::Serialize;

/// A hardware feature some primitives depend on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Feature {
    /// `cmpxchg16b`: atomic compare-and-swap of two adjacent native words.
    WideCompareAndSwap,
    /// Restricted transactional memory (`xbegin`/`xend`/`xtest`/`xabort`).
    TransactionalMemory,
}

impl Feature {
    /// Every feature.
    pub const ALL: [Feature; 2] = [Feature::WideCompareAndSwap, Feature::TransactionalMemory];

    /// The conventional CPUID feature name.
    pub const fn name(self) -> &'static str {
        match self {
            Feature::WideCompareAndSwap => "cmpxchg16b",
            Feature::TransactionalMemory => "rtm",
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The set of features present on this processor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Capabilities {
    wide_compare_and_swap: bool,
    transactional_memory: bool,
}

impl Capabilities {
    /// A set with no features.
    pub const NONE: Capabilities = Capabilities {
        wide_compare_and_swap: false,
        transactional_memory: false,
    };

    /// Returns the process-wide capabilities, detecting them on first use.
    pub fn get() -> &'static Capabilities {
        static CAPABILITIES: OnceLock<Capabilities> = OnceLock::new();
        CAPABILITIES.get_or_init(Capabilities::detect)
    }

    /// Queries the processor. Prefer [`Capabilities::get`], which caches.
    pub fn detect() -> Capabilities {
        let caps = probe();

        #[cfg(feature = "tracing")]
        tracing::debug!(
            cmpxchg16b = caps.wide_compare_and_swap,
            rtm = caps.transactional_memory,
            "detected processor capabilities"
        );

        caps
    }

    /// Returns whether `feature` is present.
    #[inline]
    pub const fn has(&self, feature: Feature) -> bool {
        match feature {
            Feature::WideCompareAndSwap => self.wide_compare_and_swap,
            Feature::TransactionalMemory => self.transactional_memory,
        }
    }

    /// Returns `Ok(())` if `feature` is present.
    ///
    /// # Errors
    /// [`Unsupported`] naming the missing feature.
    #[inline]
    pub const fn require(&self, feature: Feature) -> Result<(), Unsupported> {
        if self.has(feature) {
            Ok(())
        } else {
            Err(Unsupported { feature })
        }
    }
}

#[cfg(target_arch = "x86_64")]
fn probe() -> Capabilities {
    Capabilities {
        wide_compare_and_swap: std::arch::is_x86_feature_detected!("cmpxchg16b"),
        transactional_memory: rtm_supported(),
    }
}

#[cfg(not(target_arch = "x86_64"))]
fn probe() -> Capabilities {
    Capabilities::NONE
}

// CPUID.(EAX=7, ECX=0):EBX.RTM[bit 11]
#[cfg(target_arch = "x86_64")]
#[allow(unused_unsafe)]
fn rtm_supported() -> bool {
    use core::arch::x86_64::{__cpuid_count, __get_cpuid_max};

    // SAFETY: `cpuid` exists on every x86-64 processor.
    unsafe {
        let (max_leaf, _) = __get_cpuid_max(0);
        max_leaf >= 7 && (__cpuid_count(7, 0).ebx >> 11) & 1 != 0
    }
}

/// Returns whether the processor supports `feature`.
///
/// The first call detects; later calls read the cached result.
#[inline]
pub fn has_feature(feature: Feature) -> bool {
    Capabilities::get().has(feature)
}

/// The error returned when a capability token is requested on a processor
/// that lacks the feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Unsupported {
    feature: Feature,
}

impl Unsupported {
    /// The missing feature.
    #[inline]
    pub const fn feature(&self) -> Feature {
        self.feature
    }
}

impl fmt::Display for Unsupported {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "processor does not support `{}`", self.feature)
    }
}

impl std::error::Error for Unsupported {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detection_is_cached() {
        let first = Capabilities::get();
        let second = Capabilities::get();
        assert!(core::ptr::eq(first, second));
        assert_eq!(*first, Capabilities::detect());
        for feature in Feature::ALL {
            assert_eq!(has_feature(feature), first.has(feature));
        }
    }

    #[test]
    fn test_require_reports_missing_feature() {
        let caps = Capabilities::NONE;
        let err = caps.require(Feature::TransactionalMemory).unwrap_err();
        assert_eq!(err.feature(), Feature::TransactionalMemory);
        assert_eq!(err.to_string(), "processor does not support `rtm`");

        let caps = Capabilities {
            wide_compare_and_swap: true,
            transactional_memory: false,
        };
        assert!(caps.require(Feature::WideCompareAndSwap).is_ok());
    }

    #[cfg(target_arch = "x86_64")]
    #[test]
    fn test_cmpxchg16b_matches_std_detection() {
        assert_eq!(
            has_feature(Feature::WideCompareAndSwap),
            std::arch::is_x86_feature_detected!("cmpxchg16b")
        );
    }
}
