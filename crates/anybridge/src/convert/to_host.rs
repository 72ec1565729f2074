//! Builtin native→host converters

use super::ToHostFn;
use crate::any::{Any, TypeTag};
use crate::error::{type_name, BridgeError, Result};
use crate::host::{HostRuntime, HostValue};
use crate::tracked::{DictionaryItems, MutationStamp, VectorItems};

/// The builtin converter for `tag`.
pub(super) fn builtin(tag: TypeTag) -> ToHostFn {
    match tag {
        TypeTag::None => none_to_host,
        TypeTag::Bool => bool_to_host,
        TypeTag::Int | TypeTag::Int64 | TypeTag::UInt64 => int_to_host,
        TypeTag::Double => double_to_host,
        TypeTag::String => string_to_host,
        TypeTag::RationalTime | TypeTag::TimeRange | TypeTag::TimeTransform => time_to_host,
        TypeTag::Retainer => retainer_to_host,
        TypeTag::Dictionary => dictionary_to_host,
        TypeTag::Vector => vector_to_host,
    }
}

fn mismatch(expected: &str, value: &Any) -> BridgeError {
    BridgeError::TypeMismatch {
        expected: expected.to_string(),
        got: type_name(value).to_string(),
    }
}

fn none_to_host(_: &HostRuntime, value: &Any, _: bool) -> Result<HostValue> {
    match value {
        Any::None => Ok(HostValue::None),
        other => Err(mismatch("none", other)),
    }
}

fn bool_to_host(_: &HostRuntime, value: &Any, _: bool) -> Result<HostValue> {
    match value {
        Any::Bool(b) => Ok(HostValue::Bool(*b)),
        other => Err(mismatch("bool", other)),
    }
}

fn int_to_host(_: &HostRuntime, value: &Any, _: bool) -> Result<HostValue> {
    match value {
        Any::Int(n) => Ok(HostValue::Int(i128::from(*n))),
        Any::Int64(n) => Ok(HostValue::Int(i128::from(*n))),
        Any::UInt64(n) => Ok(HostValue::Int(i128::from(*n))),
        other => Err(mismatch("an integer", other)),
    }
}

fn double_to_host(_: &HostRuntime, value: &Any, _: bool) -> Result<HostValue> {
    match value {
        Any::Double(n) => Ok(HostValue::Float(*n)),
        other => Err(mismatch("f64", other)),
    }
}

fn string_to_host(_: &HostRuntime, value: &Any, _: bool) -> Result<HostValue> {
    match value {
        Any::String(s) => Ok(HostValue::str(s)),
        other => Err(mismatch("String", other)),
    }
}

fn time_to_host(_: &HostRuntime, value: &Any, _: bool) -> Result<HostValue> {
    match value {
        Any::RationalTime(t) => Ok(HostValue::RationalTime(*t)),
        Any::TimeRange(r) => Ok(HostValue::TimeRange(*r)),
        Any::TimeTransform(t) => Ok(HostValue::TimeTransform(*t)),
        other => Err(mismatch("a timing value", other)),
    }
}

/// Native objects are wrapped, never copied.
fn retainer_to_host(host: &HostRuntime, value: &Any, _: bool) -> Result<HostValue> {
    match value {
        Any::Retainer(retainer) => Ok(HostValue::Object(host.wrap_object(retainer))),
        other => Err(mismatch("Retainer", other)),
    }
}

/// Top-level dictionaries are moved into an owning proxy; nested ones are
/// observed in place so host writes land in the parent.
fn dictionary_to_host(host: &HostRuntime, value: &Any, is_top_level: bool) -> Result<HostValue> {
    let dict = match value {
        Any::Dictionary(dict) => dict,
        other => return Err(mismatch("AnyDictionary", other)),
    };
    let stamp = if is_top_level {
        let stamp = MutationStamp::<DictionaryItems>::owning();
        stamp.container()?.swap(dict);
        stamp
    } else {
        dict.get_or_create_mutation_stamp()
    };
    Ok(HostValue::AnyDictionary(host.dictionary_proxy(stamp)))
}

fn vector_to_host(host: &HostRuntime, value: &Any, is_top_level: bool) -> Result<HostValue> {
    let vector = match value {
        Any::Vector(vector) => vector,
        other => return Err(mismatch("AnyVector", other)),
    };
    let stamp = if is_top_level {
        let stamp = MutationStamp::<VectorItems>::owning();
        stamp.container()?.swap(vector);
        stamp
    } else {
        vector.get_or_create_mutation_stamp()
    };
    Ok(HostValue::AnyVector(host.vector_proxy(stamp)))
}
