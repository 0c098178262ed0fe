//! The instruction catalog.
//!
//! A width-independent description of every canonical atomic operation: its
//! operand and result arity, how its result is derived, which instruction
//! implements it, and which operand widths it is defined for.
//!
//! The catalog is the single source of truth for the primitive surface. The
//! same table that produces [`CATALOG`] is expanded (at compile time) into the
//! [`LockedInt`](crate::locked::LockedInt) implementations and the flat
//! `<method>_<type>` functions, so the data here and the callable surface can
//! never drift apart.

use core::fmt;

use serde::{Serialize, Serializer};

mod expand;
mod table;

pub(crate) use table::operation_table;

pub use expand::{variants, Manifest, Variant, VariantEntry};

/// Operand width in bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Width {
    /// 8-bit operands.
    W8,
    /// 16-bit operands.
    W16,
    /// 32-bit operands.
    W32,
    /// 64-bit operands.
    W64,
}

impl Width {
    /// All widths, narrowest first.
    pub const ALL: [Width; 4] = [Width::W8, Width::W16, Width::W32, Width::W64];

    /// The machine word width.
    #[cfg(target_pointer_width = "64")]
    pub const NATIVE: Width = Width::W64;
    /// The machine word width.
    #[cfg(not(target_pointer_width = "64"))]
    pub const NATIVE: Width = Width::W32;

    /// Number of bits.
    #[inline]
    pub const fn bits(self) -> u32 {
        match self {
            Width::W8 => 8,
            Width::W16 => 16,
            Width::W32 => 32,
            Width::W64 => 64,
        }
    }

    /// Number of bytes.
    #[inline]
    pub const fn bytes(self) -> usize {
        (self.bits() / 8) as usize
    }

    #[inline]
    const fn mask(self) -> u8 {
        1 << (self as u8)
    }
}

impl fmt::Display for Width {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.bits())
    }
}

impl Serialize for Width {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.bits())
    }
}

/// A set of [`Width`]s, packed into one byte.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct WidthSet(u8);

impl WidthSet {
    /// Every width.
    pub const ALL: WidthSet = WidthSet(0b1111);
    /// 16, 32 and 64 bits; bit-test instructions have no byte form.
    pub const WORDS: WidthSet = WidthSet(0b1110);
    /// Only the native width; used for the double-width pair.
    pub const NATIVE: WidthSet = WidthSet(Width::NATIVE.mask());

    /// Returns whether `width` is in the set.
    #[inline]
    pub const fn contains(self, width: Width) -> bool {
        self.0 & width.mask() != 0
    }

    /// Number of widths in the set.
    #[inline]
    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Returns whether the set is empty.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Iterates the widths in the set, narrowest first.
    pub fn iter(self) -> impl Iterator<Item = Width> {
        Width::ALL.into_iter().filter(move |w| self.contains(*w))
    }
}

impl fmt::Debug for WidthSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter().map(Width::bits)).finish()
    }
}

impl Serialize for WidthSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

/// Caller-facing numeric interpretation. Never changes the instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Signedness {
    /// Two's-complement signed.
    Signed,
    /// Unsigned.
    Unsigned,
}

/// The integer type a variant is generated for.
///
/// `Int`, `Uint` and `Uintptr` are the native-width aliases (`isize`, `usize`
/// and [`Uintptr`](crate::locked::Uintptr)); they execute exactly the same
/// instruction as the sized native-width variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Flavor {
    /// An explicitly sized integer.
    Sized(Width, Signedness),
    /// Platform-native signed integer.
    Int,
    /// Platform-native unsigned integer.
    Uint,
    /// Address-sized unsigned integer.
    Uintptr,
}

impl Flavor {
    /// Operand width.
    #[inline]
    pub const fn width(self) -> Width {
        match self {
            Flavor::Sized(width, _) => width,
            Flavor::Int | Flavor::Uint | Flavor::Uintptr => Width::NATIVE,
        }
    }

    /// Numeric interpretation.
    #[inline]
    pub const fn signedness(self) -> Signedness {
        match self {
            Flavor::Sized(_, signedness) => signedness,
            Flavor::Int => Signedness::Signed,
            Flavor::Uint | Flavor::Uintptr => Signedness::Unsigned,
        }
    }

    /// Whether this is one of the native-width aliases.
    #[inline]
    pub const fn is_alias(self) -> bool {
        !matches!(self, Flavor::Sized(..))
    }

    /// Suffix of the Rust surface identifier (`u8`, `i64`, `usize`, ...).
    pub const fn rust_suffix(self) -> &'static str {
        match self {
            Flavor::Sized(Width::W8, Signedness::Signed) => "i8",
            Flavor::Sized(Width::W8, Signedness::Unsigned) => "u8",
            Flavor::Sized(Width::W16, Signedness::Signed) => "i16",
            Flavor::Sized(Width::W16, Signedness::Unsigned) => "u16",
            Flavor::Sized(Width::W32, Signedness::Signed) => "i32",
            Flavor::Sized(Width::W32, Signedness::Unsigned) => "u32",
            Flavor::Sized(Width::W64, Signedness::Signed) => "i64",
            Flavor::Sized(Width::W64, Signedness::Unsigned) => "u64",
            Flavor::Int => "isize",
            Flavor::Uint => "usize",
            Flavor::Uintptr => "uintptr",
        }
    }

    /// Suffix of the canonical name (`Uint8`, `Int64`, `Uintptr`, ...).
    pub const fn canonical_suffix(self) -> &'static str {
        match self {
            Flavor::Sized(Width::W8, Signedness::Signed) => "Int8",
            Flavor::Sized(Width::W8, Signedness::Unsigned) => "Uint8",
            Flavor::Sized(Width::W16, Signedness::Signed) => "Int16",
            Flavor::Sized(Width::W16, Signedness::Unsigned) => "Uint16",
            Flavor::Sized(Width::W32, Signedness::Signed) => "Int32",
            Flavor::Sized(Width::W32, Signedness::Unsigned) => "Uint32",
            Flavor::Sized(Width::W64, Signedness::Signed) => "Int64",
            Flavor::Sized(Width::W64, Signedness::Unsigned) => "Uint64",
            Flavor::Int => "Int",
            Flavor::Uint => "Uint",
            Flavor::Uintptr => "Uintptr",
        }
    }
}

/// How an operation's result is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ResultKind {
    /// Nothing is returned; memory is updated in place.
    None,
    /// The raw register value left by the instruction (the prior memory value).
    Prior,
    /// `true` iff the zero flag is set after the instruction.
    ZeroFlag,
    /// `true` iff the carry flag is set after the instruction.
    CarryFlag,
}

impl ResultKind {
    /// Whether the result is a boolean read from a flag.
    #[inline]
    pub const fn is_flag(self) -> bool {
        matches!(self, ResultKind::ZeroFlag | ResultKind::CarryFlag)
    }
}

/// The call/return shape of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Shape {
    /// `op [mem], reg`.
    ReadModifyWrite,
    /// `bt carry, 0; op [mem], reg; setc`: carry in and out as values.
    ReadModifyWriteCarry,
    /// `op [mem]`.
    Unary,
    /// `op [mem]; sete`.
    UnaryZeroFlag,
    /// `op [mem], reg; sete`.
    ReadModifyWriteZeroFlag,
    /// `bt* [mem], reg; setc`.
    BitTestCarryFlag,
    /// `cmpxchg [mem], reg` with the comparand in the accumulator.
    CompareExchange,
    /// `cmpxchg16b [mem]` with pairs in `rdx:rax` and `rcx:rbx`.
    CompareExchangeDouble,
    /// `xadd`/`xchg [mem], reg`; the register receives the prior value.
    Exchange,
}

impl Shape {
    /// Caller-supplied operands besides the target.
    pub const fn operands(self) -> u8 {
        match self {
            Shape::Unary | Shape::UnaryZeroFlag => 0,
            Shape::ReadModifyWrite
            | Shape::ReadModifyWriteZeroFlag
            | Shape::BitTestCarryFlag
            | Shape::Exchange => 1,
            Shape::ReadModifyWriteCarry | Shape::CompareExchange => 2,
            Shape::CompareExchangeDouble => 4,
        }
    }

    /// Values returned.
    pub const fn results(self) -> u8 {
        match self {
            Shape::ReadModifyWrite | Shape::Unary => 0,
            Shape::ReadModifyWriteCarry
            | Shape::UnaryZeroFlag
            | Shape::ReadModifyWriteZeroFlag
            | Shape::BitTestCarryFlag
            | Shape::CompareExchange
            | Shape::Exchange => 1,
            Shape::CompareExchangeDouble => 2,
        }
    }

    /// How the result is produced.
    pub const fn result(self) -> ResultKind {
        match self {
            Shape::ReadModifyWrite | Shape::Unary => ResultKind::None,
            Shape::UnaryZeroFlag | Shape::ReadModifyWriteZeroFlag => ResultKind::ZeroFlag,
            Shape::ReadModifyWriteCarry | Shape::BitTestCarryFlag => ResultKind::CarryFlag,
            Shape::CompareExchange | Shape::CompareExchangeDouble | Shape::Exchange => {
                ResultKind::Prior
            }
        }
    }

    /// Widths the shape is defined for.
    pub const fn widths(self) -> WidthSet {
        match self {
            Shape::BitTestCarryFlag => WidthSet::WORDS,
            Shape::CompareExchangeDouble => WidthSet::NATIVE,
            _ => WidthSet::ALL,
        }
    }
}

/// One canonical operation, independent of width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Descriptor {
    /// The operation.
    pub operation: Operation,
    /// Canonical `CamelCase` name.
    pub name: &'static str,
    /// `snake_case` stem of the Rust identifiers.
    pub method: &'static str,
    /// x86 mnemonic.
    pub mnemonic: &'static str,
    /// Whether the instruction carries an explicit `lock` prefix.
    ///
    /// `xchg` with a memory operand is locked implicitly.
    pub locked: bool,
    /// Call/return shape.
    pub shape: Shape,
    /// Operands besides the target address.
    pub operands: u8,
    /// Values returned.
    pub results: u8,
    /// How the result is produced.
    pub result: ResultKind,
    /// Widths the operation is defined for.
    pub widths: WidthSet,
    /// One-line description.
    pub doc: &'static str,
}

impl Descriptor {
    /// Whether this is the double-width (paired native word) operation.
    #[inline]
    pub const fn is_double_width(&self) -> bool {
        matches!(self.shape, Shape::CompareExchangeDouble)
    }

    /// The flavors this operation is expanded into.
    pub fn flavors(&self) -> impl Iterator<Item = Flavor> + '_ {
        let double = self.is_double_width();
        let sized = self.widths.iter().filter(move |_| !double).flat_map(|w| {
            let aliases: &[Flavor] = if w == Width::NATIVE {
                &[Flavor::Int, Flavor::Uint, Flavor::Uintptr]
            } else {
                &[]
            };
            [
                Flavor::Sized(w, Signedness::Signed),
                Flavor::Sized(w, Signedness::Unsigned),
            ]
            .into_iter()
            .chain(aliases.iter().copied())
        });
        let pair = double.then_some(Flavor::Sized(Width::NATIVE, Signedness::Unsigned));
        sized.chain(pair)
    }
}

macro_rules! shape {
    (rmw) => { Shape::ReadModifyWrite };
    (rmw_cf) => { Shape::ReadModifyWriteCarry };
    (unary) => { Shape::Unary };
    (unary_zf) => { Shape::UnaryZeroFlag };
    (rmw_zf) => { Shape::ReadModifyWriteZeroFlag };
    (bit_cf) => { Shape::BitTestCarryFlag };
    (cmpxchg) => { Shape::CompareExchange };
    (wide) => { Shape::CompareExchangeDouble };
    (exchange) => { Shape::Exchange };
}

macro_rules! is_locked {
    (lock) => { true };
    (nolock) => { false };
}

macro_rules! build_catalog {
    ({} $($shape:ident $name:ident $method:ident $lock:ident $mnemonic:literal $doc:literal;)*) => {
        /// Canonical atomic operations.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
        pub enum Operation {
            $(
                #[doc = $doc]
                $name,
            )*
        }

        impl Operation {
            /// Every operation, in catalog order.
            pub const ALL: &'static [Operation] = &[$(Operation::$name),*];
        }

        /// Every canonical operation, in catalog order.
        ///
        /// `CATALOG[op as usize]` is the descriptor of `op`.
        pub const CATALOG: &[Descriptor] = &[
            $(
                Descriptor {
                    operation: Operation::$name,
                    name: stringify!($name),
                    method: stringify!($method),
                    mnemonic: $mnemonic,
                    locked: is_locked!($lock),
                    shape: shape!($shape),
                    operands: shape!($shape).operands(),
                    results: shape!($shape).results(),
                    result: shape!($shape).result(),
                    widths: shape!($shape).widths(),
                    doc: $doc,
                },
            )*
        ];
    };
}

operation_table!(build_catalog {});

impl Operation {
    /// The operation's descriptor.
    #[inline]
    pub fn descriptor(self) -> &'static Descriptor {
        &CATALOG[self as usize]
    }

    /// Canonical `CamelCase` name.
    #[inline]
    pub fn name(self) -> &'static str {
        self.descriptor().name
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Looks up a descriptor by canonical name.
pub fn lookup(name: &str) -> Option<&'static Descriptor> {
    CATALOG.iter().find(|d| d.name == name)
}
