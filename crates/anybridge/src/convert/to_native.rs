//! Host→native conversion
//!
//! A host value may satisfy several structural protocols at once (a bool is
//! an integer, a dict is iterable), so the checks run in a fixed order and
//! the first match wins:
//!
//! 1. null
//! 2. bool
//! 3. integer, narrowest fitting width first
//! 4. float
//! 5. string
//! 6. timing values
//! 7. wrapped native object
//! 8. dictionary proxy, unwrapped without re-converting entries
//! 9. plain mapping, before sequences
//! 10. vector proxy, unwrapped
//! 11. plain sequence
//! 12. anything else is unsupported

use indexmap::IndexMap;
use tracing::trace;

use crate::any::Any;
use crate::error::{type_name, BridgeError, Result};
use crate::host::{HostRuntime, HostValue};
use crate::tracked::{AnyDictionary, AnyVector, Tracked};

/// Convert a host value into its native form.
///
/// # Errors
///
/// - `KeyTypeError` if a mapping has a non-string key
/// - `IntegerOverflow` if an integer fits no native width
/// - `UnsupportedType` for host values with no native counterpart
/// - `DepthExceeded` if nesting goes past the configured limit
pub fn to_native(host: &HostRuntime, value: &HostValue) -> Result<Any> {
    convert(host, value, 0)
}

/// Convert a host value that must resolve to a dictionary.
///
/// The host's null becomes an empty dictionary.
///
/// # Errors
///
/// Returns `TypeMismatch` naming the resolved type when the value converts
/// to anything other than a dictionary.
pub fn to_any_dictionary(host: &HostRuntime, value: &HostValue) -> Result<AnyDictionary> {
    if value.is_none() {
        return Ok(AnyDictionary::default());
    }
    match to_native(host, value)? {
        Any::Dictionary(dict) => Ok(dict),
        other => Err(BridgeError::TypeMismatch {
            expected: "an AnyDictionary (i.e. metadata)".to_string(),
            got: type_name(&other).to_string(),
        }),
    }
}

fn convert(host: &HostRuntime, value: &HostValue, depth: usize) -> Result<Any> {
    let max = host.config().max_conversion_depth;
    if depth > max {
        return Err(BridgeError::DepthExceeded { max });
    }

    if value.is_none() {
        return Ok(Any::None);
    }
    if let Some(b) = value.as_bool() {
        return Ok(Any::Bool(b));
    }
    if let Some(n) = value.as_int() {
        return convert_int(n);
    }
    if let Some(n) = value.as_float() {
        return Ok(Any::Double(n));
    }
    if let Some(s) = value.as_str() {
        return Ok(Any::string(s));
    }

    match value {
        HostValue::RationalTime(t) => return Ok(Any::RationalTime(*t)),
        HostValue::TimeRange(r) => return Ok(Any::TimeRange(*r)),
        HostValue::TimeTransform(t) => return Ok(Any::TimeTransform(*t)),
        HostValue::Object(handle) => return Ok(Any::Retainer(handle.retainer().clone())),
        HostValue::AnyDictionary(proxy) => return Ok(Any::Dictionary(proxy.to_native()?)),
        _ => {}
    }

    if let Some(entries) = value.mapping_entries() {
        trace!(len = entries.len(), depth, "converting host mapping");
        let mut items = IndexMap::with_capacity(entries.len());
        for (key, item) in entries {
            let key = key.as_str().ok_or_else(|| BridgeError::KeyTypeError {
                type_name: key.type_name().to_string(),
            })?;
            items.insert(key.to_string(), convert(host, item, depth + 1)?);
        }
        return Ok(Any::Dictionary(Tracked::new(items)));
    }

    if let HostValue::AnyVector(proxy) = value {
        return Ok(Any::Vector(proxy.to_native()?));
    }

    if let Some(elements) = value.sequence_items() {
        trace!(len = elements.len(), depth, "converting host sequence");
        let items = elements
            .iter()
            .map(|item| convert(host, item, depth + 1))
            .collect::<Result<Vec<_>>>()?;
        return Ok(Any::Vector(AnyVector::new(items)));
    }

    Err(BridgeError::UnsupportedType {
        type_name: value.type_name().to_string(),
    })
}

/// Pick the narrowest integer width that holds `n`.
///
/// Every unsigned 32-bit value already fits the signed 64-bit probe, so
/// there is no separate u32 step.
fn convert_int(n: i128) -> Result<Any> {
    if let Ok(v) = i32::try_from(n) {
        return Ok(Any::Int(v));
    }
    if let Ok(v) = i64::try_from(n) {
        return Ok(Any::Int64(v));
    }
    if let Ok(v) = u64::try_from(n) {
        return Ok(Any::UInt64(v));
    }
    Err(BridgeError::IntegerOverflow { value: n })
}
