//! Type-erased dynamic value carried across the bridge

mod display;
mod impls;

pub use impls::FromAny;

use std::fmt;
use std::str::FromStr;

use crate::error::BridgeError;
use crate::native::Retainer;
use crate::time::{RationalTime, TimeRange, TimeTransform};
use crate::tracked::{AnyDictionary, AnyVector};

/// A dynamic value holding one of a closed set of native payload types.
///
/// The tag is derived from the variant, so tag and payload can never
/// disagree.
#[derive(Clone, Default)]
pub enum Any {
    // ═══════════════════════════════════════════════════════════════════
    // Scalars
    // ═══════════════════════════════════════════════════════════════════
    /// No value
    #[default]
    None,

    /// Boolean
    Bool(bool),

    /// 32-bit signed integer
    Int(i32),

    /// 64-bit signed integer
    Int64(i64),

    /// 64-bit unsigned integer
    UInt64(u64),

    /// Double precision float
    Double(f64),

    /// UTF-8 string
    String(String),

    // ═══════════════════════════════════════════════════════════════════
    // Timing values
    // ═══════════════════════════════════════════════════════════════════
    /// A point in time
    RationalTime(RationalTime),

    /// A span of time
    TimeRange(TimeRange),

    /// A retiming
    TimeTransform(TimeTransform),

    // ═══════════════════════════════════════════════════════════════════
    // References and composites
    // ═══════════════════════════════════════════════════════════════════
    /// Owning reference to a native object (shared, never copied)
    Retainer(Retainer),

    /// String-keyed mutation-aware dictionary
    Dictionary(AnyDictionary),

    /// Mutation-aware sequence
    Vector(AnyVector),
}

/// Stable identity of an [`Any`] payload type.
///
/// Assigned at compile time, so two parts of a program always agree on a
/// tag no matter where the value was built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TypeTag {
    /// [`Any::None`]
    None,
    /// [`Any::Bool`]
    Bool,
    /// [`Any::Int`]
    Int,
    /// [`Any::Int64`]
    Int64,
    /// [`Any::UInt64`]
    UInt64,
    /// [`Any::Double`]
    Double,
    /// [`Any::String`]
    String,
    /// [`Any::RationalTime`]
    RationalTime,
    /// [`Any::TimeRange`]
    TimeRange,
    /// [`Any::TimeTransform`]
    TimeTransform,
    /// [`Any::Retainer`]
    Retainer,
    /// [`Any::Dictionary`]
    Dictionary,
    /// [`Any::Vector`]
    Vector,
}

impl TypeTag {
    /// Every tag, in declaration order.
    pub const ALL: [TypeTag; 13] = [
        TypeTag::None,
        TypeTag::Bool,
        TypeTag::Int,
        TypeTag::Int64,
        TypeTag::UInt64,
        TypeTag::Double,
        TypeTag::String,
        TypeTag::RationalTime,
        TypeTag::TimeRange,
        TypeTag::TimeTransform,
        TypeTag::Retainer,
        TypeTag::Dictionary,
        TypeTag::Vector,
    ];

    /// Canonical printable name of the payload type.
    pub const fn name(self) -> &'static str {
        match self {
            TypeTag::None => "none",
            TypeTag::Bool => "bool",
            TypeTag::Int => "i32",
            TypeTag::Int64 => "i64",
            TypeTag::UInt64 => "u64",
            TypeTag::Double => "f64",
            TypeTag::String => "String",
            TypeTag::RationalTime => "RationalTime",
            TypeTag::TimeRange => "TimeRange",
            TypeTag::TimeTransform => "TimeTransform",
            TypeTag::Retainer => "Retainer",
            TypeTag::Dictionary => "AnyDictionary",
            TypeTag::Vector => "AnyVector",
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TypeTag {
    type Err = BridgeError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        TypeTag::ALL
            .into_iter()
            .find(|tag| tag.name() == name)
            .ok_or_else(|| BridgeError::UnsupportedType {
                type_name: name.to_string(),
            })
    }
}

impl Any {
    /// The stable tag of this value's payload.
    pub fn tag(&self) -> TypeTag {
        match self {
            Any::None => TypeTag::None,
            Any::Bool(_) => TypeTag::Bool,
            Any::Int(_) => TypeTag::Int,
            Any::Int64(_) => TypeTag::Int64,
            Any::UInt64(_) => TypeTag::UInt64,
            Any::Double(_) => TypeTag::Double,
            Any::String(_) => TypeTag::String,
            Any::RationalTime(_) => TypeTag::RationalTime,
            Any::TimeRange(_) => TypeTag::TimeRange,
            Any::TimeTransform(_) => TypeTag::TimeTransform,
            Any::Retainer(_) => TypeTag::Retainer,
            Any::Dictionary(_) => TypeTag::Dictionary,
            Any::Vector(_) => TypeTag::Vector,
        }
    }
}
