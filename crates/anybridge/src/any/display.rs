//! Display and Debug implementations for Any

use std::fmt;

use super::*;

impl fmt::Debug for Any {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Any::None => write!(f, "None"),
            Any::Bool(b) => write!(f, "{}", b),
            Any::Int(n) => write!(f, "{}i32", n),
            Any::Int64(n) => write!(f, "{}", n),
            Any::UInt64(n) => write!(f, "{}u64", n),
            Any::Double(n) => write!(f, "{:?}", n),
            Any::String(s) => write!(f, "{:?}", s),

            Any::RationalTime(t) => write!(f, "RationalTime({}, {})", t.value, t.rate),
            Any::TimeRange(r) => write!(
                f,
                "TimeRange({}, {})",
                Any::RationalTime(r.start_time),
                Any::RationalTime(r.duration)
            ),
            Any::TimeTransform(t) => write!(
                f,
                "TimeTransform({}, {}, {})",
                Any::RationalTime(t.offset),
                t.scale,
                t.rate
            ),

            Any::Retainer(r) => write!(f, "<{} object>", r.schema_name()),

            Any::Dictionary(d) => d.read(|items| {
                write!(f, "{{")?;
                for (i, (k, v)) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{:?}: {:?}", k, v)?;
                }
                write!(f, "}}")
            }),

            Any::Vector(v) => v.read(|items| {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{:?}", item)?;
                }
                write!(f, "]")
            }),
        }
    }
}

impl fmt::Display for Any {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Any::String(s) => write!(f, "{}", s), // No quotes for Display
            _ => fmt::Debug::fmt(self, f),
        }
    }
}
