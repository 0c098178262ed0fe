//! Width/signedness expansion of the catalog.

use core::fmt;

use serde::Serialize;

use super::{Descriptor, Flavor, Operation, Signedness, Width, CATALOG};

/// One concrete primitive: an operation at one flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Variant {
    descriptor: &'static Descriptor,
    flavor: Flavor,
}

impl Variant {
    /// Returns the variant of `operation` at `flavor`, if the operation is
    /// defined there.
    pub fn new(operation: Operation, flavor: Flavor) -> Option<Self> {
        let descriptor = operation.descriptor();
        descriptor
            .flavors()
            .any(|f| f == flavor)
            .then_some(Self { descriptor, flavor })
    }

    /// The operation's descriptor.
    #[inline]
    pub fn descriptor(&self) -> &'static Descriptor {
        self.descriptor
    }

    /// The flavor.
    #[inline]
    pub fn flavor(&self) -> Flavor {
        self.flavor
    }

    /// Operand width.
    #[inline]
    pub fn width(&self) -> Width {
        self.flavor.width()
    }

    /// Numeric interpretation.
    #[inline]
    pub fn signedness(&self) -> Signedness {
        self.flavor.signedness()
    }

    /// The Rust function name, `<method>_<type>`.
    pub fn identifier(&self) -> String {
        format!("{}_{}", self.descriptor.method, self.flavor.rust_suffix())
    }

    /// The canonical name, `<Name><Width><Signedness>` (`AddUint8`), or
    /// `<Name><Alias>` (`SwapUintptr`) for the native aliases.
    pub fn canonical_name(&self) -> String {
        format!("{}{}", self.descriptor.name, self.flavor.canonical_suffix())
    }

    /// Serializable summary.
    pub fn entry(&self) -> VariantEntry {
        VariantEntry {
            identifier: self.identifier(),
            canonical_name: self.canonical_name(),
            operation: self.descriptor.operation,
            width: self.width(),
            signedness: self.signedness(),
            alias: self.flavor.is_alias(),
            operands: self.descriptor.operands,
            results: self.descriptor.results,
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.identifier())
    }
}

/// Every variant of every operation, in catalog order.
///
/// Within one operation the order is: for each width, signed then unsigned,
/// with the `Int`/`Uint`/`Uintptr` aliases following the native width.
pub fn variants() -> impl Iterator<Item = Variant> {
    CATALOG.iter().flat_map(|descriptor| {
        descriptor
            .flavors()
            .map(move |flavor| Variant { descriptor, flavor })
    })
}

/// A flattened, serializable view of one [`Variant`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariantEntry {
    /// Rust function name.
    pub identifier: String,
    /// Canonical name.
    pub canonical_name: String,
    /// The operation.
    pub operation: Operation,
    /// Operand width.
    pub width: Width,
    /// Numeric interpretation.
    pub signedness: Signedness,
    /// Whether this is a native-width alias.
    pub alias: bool,
    /// Operands besides the target.
    pub operands: u8,
    /// Values returned.
    pub results: u8,
}

/// The catalog together with its full expansion.
#[derive(Debug, Clone, Serialize)]
pub struct Manifest {
    /// Native machine width.
    pub native_width: Width,
    /// Width-independent descriptors.
    pub descriptors: &'static [Descriptor],
    /// Every expanded primitive.
    pub variants: Vec<VariantEntry>,
}

impl Manifest {
    /// Builds the manifest from [`CATALOG`].
    pub fn build() -> Self {
        Self {
            native_width: Width::NATIVE,
            descriptors: CATALOG,
            variants: variants().map(|v| v.entry()).collect(),
        }
    }

    /// Renders the manifest as pretty-printed JSON.
    ///
    /// # Errors
    /// Returns the serializer's error; the catalog types never produce one in
    /// practice.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
