//! Any trait implementations: constructors, predicates, extractors, From traits, PartialEq

use super::*;

// ═══════════════════════════════════════════════════════════════════
// Convenience Constructors
// ═══════════════════════════════════════════════════════════════════

impl Any {
    /// Create a string value
    pub fn string(s: impl Into<String>) -> Self {
        Any::String(s.into())
    }

    /// Create a dictionary value from key/value pairs
    pub fn dictionary<K: Into<String>, V: Into<Any>>(
        entries: impl IntoIterator<Item = (K, V)>,
    ) -> Self {
        Any::Dictionary(entries.into_iter().collect())
    }

    /// Create a vector value
    pub fn vector<V: Into<Any>>(items: impl IntoIterator<Item = V>) -> Self {
        Any::Vector(items.into_iter().collect())
    }

    // ═══════════════════════════════════════════════════════════════════
    // Type Predicates
    // ═══════════════════════════════════════════════════════════════════

    /// Check if value is absent
    pub fn is_none(&self) -> bool {
        matches!(self, Any::None)
    }

    /// Check if value is any integer width
    pub fn is_integer(&self) -> bool {
        matches!(self, Any::Int(_) | Any::Int64(_) | Any::UInt64(_))
    }

    /// Check if value is a composite container
    pub fn is_container(&self) -> bool {
        matches!(self, Any::Dictionary(_) | Any::Vector(_))
    }

    // ═══════════════════════════════════════════════════════════════════
    // Extractors (return Option for safe access)
    // ═══════════════════════════════════════════════════════════════════

    /// Extract boolean value
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Any::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Extract as i64 (widens i32, narrows u64 when it fits)
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Any::Int(n) => Some(i64::from(*n)),
            Any::Int64(n) => Some(*n),
            Any::UInt64(n) => i64::try_from(*n).ok(),
            _ => None,
        }
    }

    /// Extract as f64
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Any::Double(n) => Some(*n),
            _ => None,
        }
    }

    /// Extract string slice
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Any::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Extract dictionary
    pub fn as_dictionary(&self) -> Option<&AnyDictionary> {
        match self {
            Any::Dictionary(d) => Some(d),
            _ => None,
        }
    }

    /// Extract vector
    pub fn as_vector(&self) -> Option<&AnyVector> {
        match self {
            Any::Vector(v) => Some(v),
            _ => None,
        }
    }

    /// Extract native object reference
    pub fn as_retainer(&self) -> Option<&Retainer> {
        match self {
            Any::Retainer(r) => Some(r),
            _ => None,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════
// PartialEq Implementation
// ═══════════════════════════════════════════════════════════════════

impl PartialEq for Any {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Any::None, Any::None) => true,
            (Any::Bool(a), Any::Bool(b)) => a == b,

            // Integers compare only within the same width
            (Any::Int(a), Any::Int(b)) => a == b,
            (Any::Int64(a), Any::Int64(b)) => a == b,
            (Any::UInt64(a), Any::UInt64(b)) => a == b,

            (Any::Double(a), Any::Double(b)) => a == b,
            (Any::String(a), Any::String(b)) => a == b,

            (Any::RationalTime(a), Any::RationalTime(b)) => a == b,
            (Any::TimeRange(a), Any::TimeRange(b)) => a == b,
            (Any::TimeTransform(a), Any::TimeTransform(b)) => a == b,

            // Native objects by identity
            (Any::Retainer(a), Any::Retainer(b)) => a == b,

            (Any::Dictionary(a), Any::Dictionary(b)) => a == b,
            (Any::Vector(a), Any::Vector(b)) => a == b,

            _ => false,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════
// From Trait Implementations
// ═══════════════════════════════════════════════════════════════════

impl From<()> for Any {
    fn from(_: ()) -> Self {
        Any::None
    }
}

impl From<bool> for Any {
    fn from(b: bool) -> Self {
        Any::Bool(b)
    }
}

impl From<i32> for Any {
    fn from(n: i32) -> Self {
        Any::Int(n)
    }
}

impl From<i64> for Any {
    fn from(n: i64) -> Self {
        Any::Int64(n)
    }
}

impl From<u64> for Any {
    fn from(n: u64) -> Self {
        Any::UInt64(n)
    }
}

impl From<f64> for Any {
    fn from(n: f64) -> Self {
        Any::Double(n)
    }
}

impl From<String> for Any {
    fn from(s: String) -> Self {
        Any::String(s)
    }
}

impl From<&str> for Any {
    fn from(s: &str) -> Self {
        Any::string(s)
    }
}

impl From<RationalTime> for Any {
    fn from(t: RationalTime) -> Self {
        Any::RationalTime(t)
    }
}

impl From<TimeRange> for Any {
    fn from(r: TimeRange) -> Self {
        Any::TimeRange(r)
    }
}

impl From<TimeTransform> for Any {
    fn from(t: TimeTransform) -> Self {
        Any::TimeTransform(t)
    }
}

impl From<Retainer> for Any {
    fn from(r: Retainer) -> Self {
        Any::Retainer(r)
    }
}

impl From<AnyDictionary> for Any {
    fn from(d: AnyDictionary) -> Self {
        Any::Dictionary(d)
    }
}

impl From<AnyVector> for Any {
    fn from(v: AnyVector) -> Self {
        Any::Vector(v)
    }
}

impl<T: Into<Any>> From<Option<T>> for Any {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Any::None, Into::into)
    }
}

// ═══════════════════════════════════════════════════════════════════
// Typed extraction
// ═══════════════════════════════════════════════════════════════════

/// Extract a native type from an [`Any`] holding exactly that type.
///
/// Unlike the `as_*` extractors this never widens or narrows: an `i32`
/// stored as [`Any::Int`] is not readable as `i64`.
pub trait FromAny: Sized {
    /// The payload, if `value` is tagged with this type.
    fn from_any(value: &Any) -> Option<Self>;
}

macro_rules! impl_from_any {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl FromAny for $ty {
                fn from_any(value: &Any) -> Option<Self> {
                    match value {
                        Any::$variant(v) => Some(v.clone()),
                        _ => None,
                    }
                }
            }
        )*
    };
}

impl_from_any! {
    bool => Bool,
    i32 => Int,
    i64 => Int64,
    u64 => UInt64,
    f64 => Double,
    String => String,
    RationalTime => RationalTime,
    TimeRange => TimeRange,
    TimeTransform => TimeTransform,
    Retainer => Retainer,
    AnyDictionary => Dictionary,
    AnyVector => Vector,
}
