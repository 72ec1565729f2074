// Coverage tests for error messages and type names
use anybridge::error::type_name;
use anybridge::*;

// ═══════════════════════════════════════════════════════════════════════
// type_name Coverage - All Any Types
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_type_name_scalars() {
    assert_eq!(type_name(&Any::None), "none");
    assert_eq!(type_name(&Any::Bool(true)), "bool");
    assert_eq!(type_name(&Any::Int(0)), "i32");
    assert_eq!(type_name(&Any::Int64(0)), "i64");
    assert_eq!(type_name(&Any::UInt64(0)), "u64");
    assert_eq!(type_name(&Any::Double(0.0)), "f64");
    assert_eq!(type_name(&Any::string("")), "String");
}

#[test]
fn test_type_name_time() {
    assert_eq!(type_name(&Any::RationalTime(RationalTime::default())), "RationalTime");
    assert_eq!(type_name(&Any::TimeRange(TimeRange::default())), "TimeRange");
    assert_eq!(type_name(&Any::TimeTransform(TimeTransform::default())), "TimeTransform");
}

#[test]
fn test_type_name_composites() {
    assert_eq!(type_name(&Any::dictionary(Vec::<(&str, Any)>::new())), "AnyDictionary");
    assert_eq!(type_name(&Any::vector(Vec::<Any>::new())), "AnyVector");
    assert_eq!(
        type_name(&Any::Retainer(SerializableObject::create("Clip.2"))),
        "Retainer"
    );
}

// ═══════════════════════════════════════════════════════════════════════
// Display Coverage - All Error Variants
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_display_unsupported_type() {
    let err = BridgeError::UnsupportedType {
        type_name: "socket".to_string(),
    };
    assert_eq!(err.to_string(), "Unsupported value type: socket");
}

#[test]
fn test_display_integer_overflow() {
    let err = BridgeError::IntegerOverflow {
        value: i128::from(u64::MAX) + 1,
    };
    assert_eq!(
        err.to_string(),
        "Failed to convert host int 18446744073709551616 to a native integer"
    );
}

#[test]
fn test_display_container_errors() {
    assert_eq!(
        BridgeError::ContainerInvalidated.to_string(),
        "Underlying native container has been destroyed"
    );
    assert_eq!(
        BridgeError::MutatedDuringIteration.to_string(),
        "Container mutated during iteration"
    );
}

#[test]
fn test_display_lookup_errors() {
    let missing = BridgeError::KeyNotFound {
        key: "rate".to_string(),
    };
    assert_eq!(missing.to_string(), "Key not found: rate");

    let out_of_range = BridgeError::IndexOutOfRange { index: -4, len: 3 };
    assert_eq!(out_of_range.to_string(), "Index out of range: index -4, len 3");
}

#[test]
fn test_display_depth_exceeded() {
    let err = BridgeError::DepthExceeded { max: 1000 };
    assert_eq!(err.to_string(), "Conversion depth exceeded (max 1000)");
}

// ═══════════════════════════════════════════════════════════════════════
// Errors surfaced through the public API
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_host_type_names_in_errors() {
    let host = HostRuntime::new();
    let err = host
        .to_native(&HostValue::dict([(HostValue::Float(1.0), HostValue::None)]))
        .unwrap_err();
    assert_eq!(err.to_string(), "Keys must be of type string, not float");

    let err = host
        .to_native(&HostValue::dict([(HostValue::None, HostValue::None)]))
        .unwrap_err();
    assert_eq!(err.to_string(), "Keys must be of type string, not NoneType");
}

#[test]
fn test_parse_unknown_type_tag() {
    let err = "int64_t".parse::<TypeTag>().unwrap_err();
    assert_eq!(err.to_string(), "Unsupported value type: int64_t");
}

#[test]
fn test_errors_are_std_errors() {
    fn assert_error<E: std::error::Error + Send + Sync + 'static>() {}
    assert_error::<BridgeError>();
}
