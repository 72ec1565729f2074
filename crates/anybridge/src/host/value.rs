//! Host-side object model
//!
//! The host runtime is dynamically typed and garbage collected: its values
//! are cheap `Rc` clones, integers are wider than any native width, and
//! several values satisfy more than one structural protocol (a bool is an
//! integer, a dict is iterable). Conversion into the native model relies on
//! those protocols, in a fixed order.

use std::fmt;
use std::rc::Rc;

use super::{AnyDictionaryProxy, AnyVectorProxy, ObjectHandle};
use crate::time::{RationalTime, TimeRange, TimeTransform};

/// A value living in the host runtime.
#[derive(Clone)]
pub enum HostValue {
    /// The host's null
    None,
    /// Boolean (also satisfies the integer protocol)
    Bool(bool),
    /// Arbitrary-width integer, wider than every native width
    Int(i128),
    /// Float
    Float(f64),
    /// String
    Str(Rc<str>),
    /// A point in time
    RationalTime(RationalTime),
    /// A span of time
    TimeRange(TimeRange),
    /// A retiming
    TimeTransform(TimeTransform),
    /// Mutable-by-replacement ordered list
    List(Rc<Vec<HostValue>>),
    /// Immutable ordered tuple
    Tuple(Rc<Vec<HostValue>>),
    /// Plain mapping with keys of any host type
    Dict(Rc<Vec<(HostValue, HostValue)>>),
    /// Proxy over a native dictionary
    AnyDictionary(Rc<AnyDictionaryProxy>),
    /// Proxy over a native vector
    AnyVector(Rc<AnyVectorProxy>),
    /// Wrapper around a native object
    Object(Rc<ObjectHandle>),
    /// Some other host object the bridge knows nothing about
    Foreign(Rc<str>),
}

impl HostValue {
    /// Create a string value
    pub fn str(s: &str) -> Self {
        HostValue::Str(Rc::from(s))
    }

    /// Create a list value
    pub fn list(items: impl IntoIterator<Item = HostValue>) -> Self {
        HostValue::List(Rc::new(items.into_iter().collect()))
    }

    /// Create a tuple value
    pub fn tuple(items: impl IntoIterator<Item = HostValue>) -> Self {
        HostValue::Tuple(Rc::new(items.into_iter().collect()))
    }

    /// Create a plain mapping
    pub fn dict(entries: impl IntoIterator<Item = (HostValue, HostValue)>) -> Self {
        HostValue::Dict(Rc::new(entries.into_iter().collect()))
    }

    /// Create an opaque host object of type `type_name`
    pub fn foreign(type_name: &str) -> Self {
        HostValue::Foreign(Rc::from(type_name))
    }

    /// Host-visible name of this value's runtime type.
    pub fn type_name(&self) -> &str {
        match self {
            HostValue::None => "NoneType",
            HostValue::Bool(_) => "bool",
            HostValue::Int(_) => "int",
            HostValue::Float(_) => "float",
            HostValue::Str(_) => "str",
            HostValue::RationalTime(_) => "RationalTime",
            HostValue::TimeRange(_) => "TimeRange",
            HostValue::TimeTransform(_) => "TimeTransform",
            HostValue::List(_) => "list",
            HostValue::Tuple(_) => "tuple",
            HostValue::Dict(_) => "dict",
            HostValue::AnyDictionary(_) => "AnyDictionary",
            HostValue::AnyVector(_) => "AnyVector",
            HostValue::Object(_) => "SerializableObject",
            HostValue::Foreign(name) => &name[..],
        }
    }

    // ═══════════════════════════════════════════════════════════════════
    // Structural protocols
    // ═══════════════════════════════════════════════════════════════════

    /// Check if value is the host's null
    pub fn is_none(&self) -> bool {
        matches!(self, HostValue::None)
    }

    /// Boolean payload
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            HostValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Integer protocol; booleans satisfy it too
    pub fn as_int(&self) -> Option<i128> {
        match self {
            HostValue::Int(n) => Some(*n),
            HostValue::Bool(b) => Some(i128::from(*b)),
            _ => None,
        }
    }

    /// Float payload
    pub fn as_float(&self) -> Option<f64> {
        match self {
            HostValue::Float(n) => Some(*n),
            _ => None,
        }
    }

    /// String payload
    pub fn as_str(&self) -> Option<&str> {
        match self {
            HostValue::Str(s) => Some(&s[..]),
            _ => None,
        }
    }

    /// Whether the value supports keyed lookup
    pub fn is_mapping(&self) -> bool {
        matches!(self, HostValue::Dict(_) | HostValue::AnyDictionary(_))
    }

    /// Whether the value can be iterated in order; mappings iterate their keys
    pub fn is_sequence(&self) -> bool {
        matches!(
            self,
            HostValue::List(_)
                | HostValue::Tuple(_)
                | HostValue::Dict(_)
                | HostValue::AnyDictionary(_)
                | HostValue::AnyVector(_)
        )
    }

    /// Entries of a plain mapping
    pub fn mapping_entries(&self) -> Option<&[(HostValue, HostValue)]> {
        match self {
            HostValue::Dict(entries) => Some(entries.as_slice()),
            _ => None,
        }
    }

    /// Elements of a plain sequence, in iteration order
    pub fn sequence_items(&self) -> Option<Vec<HostValue>> {
        match self {
            HostValue::List(items) | HostValue::Tuple(items) => Some(items.to_vec()),
            HostValue::Dict(entries) => Some(entries.iter().map(|(k, _)| k.clone()).collect()),
            _ => None,
        }
    }
}

impl PartialEq for HostValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (HostValue::None, HostValue::None) => true,
            (HostValue::Bool(a), HostValue::Bool(b)) => a == b,
            (HostValue::Int(a), HostValue::Int(b)) => a == b,
            (HostValue::Float(a), HostValue::Float(b)) => a == b,
            (HostValue::Str(a), HostValue::Str(b)) => a == b,
            (HostValue::RationalTime(a), HostValue::RationalTime(b)) => a == b,
            (HostValue::TimeRange(a), HostValue::TimeRange(b)) => a == b,
            (HostValue::TimeTransform(a), HostValue::TimeTransform(b)) => a == b,
            (HostValue::List(a), HostValue::List(b)) => a == b,
            (HostValue::Tuple(a), HostValue::Tuple(b)) => a == b,
            (HostValue::Dict(a), HostValue::Dict(b)) => a == b,

            // Host objects compare by identity
            (HostValue::AnyDictionary(a), HostValue::AnyDictionary(b)) => Rc::ptr_eq(a, b),
            (HostValue::AnyVector(a), HostValue::AnyVector(b)) => Rc::ptr_eq(a, b),
            (HostValue::Object(a), HostValue::Object(b)) => Rc::ptr_eq(a, b),
            (HostValue::Foreign(a), HostValue::Foreign(b)) => a == b,

            _ => false,
        }
    }
}

impl fmt::Debug for HostValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostValue::None => write!(f, "None"),
            HostValue::Bool(b) => write!(f, "{}", if *b { "True" } else { "False" }),
            HostValue::Int(n) => write!(f, "{}", n),
            HostValue::Float(n) => write!(f, "{:?}", n),
            HostValue::Str(s) => write!(f, "{:?}", s),
            HostValue::RationalTime(t) => write!(f, "{:?}", t),
            HostValue::TimeRange(r) => write!(f, "{:?}", r),
            HostValue::TimeTransform(t) => write!(f, "{:?}", t),
            HostValue::List(items) => f.debug_list().entries(items.iter()).finish(),
            HostValue::Tuple(items) => {
                let mut t = f.debug_tuple("");
                for item in items.iter() {
                    t.field(item);
                }
                t.finish()
            }
            HostValue::Dict(entries) => f
                .debug_map()
                .entries(entries.iter().map(|(k, v)| (k, v)))
                .finish(),
            HostValue::AnyDictionary(p) => write!(f, "<AnyDictionary rev {}>", p.revision()),
            HostValue::AnyVector(p) => write!(f, "<AnyVector rev {}>", p.revision()),
            HostValue::Object(o) => write!(f, "<{} object>", o.schema_name()),
            HostValue::Foreign(name) => write!(f, "<{} object>", name),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════
// From Trait Implementations
// ═══════════════════════════════════════════════════════════════════

impl From<bool> for HostValue {
    fn from(b: bool) -> Self {
        HostValue::Bool(b)
    }
}

impl From<i32> for HostValue {
    fn from(n: i32) -> Self {
        HostValue::Int(i128::from(n))
    }
}

impl From<i64> for HostValue {
    fn from(n: i64) -> Self {
        HostValue::Int(i128::from(n))
    }
}

impl From<u64> for HostValue {
    fn from(n: u64) -> Self {
        HostValue::Int(i128::from(n))
    }
}

impl From<i128> for HostValue {
    fn from(n: i128) -> Self {
        HostValue::Int(n)
    }
}

impl From<f64> for HostValue {
    fn from(n: f64) -> Self {
        HostValue::Float(n)
    }
}

impl From<&str> for HostValue {
    fn from(s: &str) -> Self {
        HostValue::str(s)
    }
}

impl From<String> for HostValue {
    fn from(s: String) -> Self {
        HostValue::Str(Rc::from(s))
    }
}
