//! Round trips through the host and the ordered host→native disambiguation

use anybridge::*;
use pretty_assertions::assert_eq;

fn round_trip(host: &HostRuntime, value: &Any) -> Result<Any> {
    let converted = host.to_host(value, true)?;
    host.to_native(&converted)
}

fn unwrap_dictionary(value: HostValue) -> std::rc::Rc<AnyDictionaryProxy> {
    match value {
        HostValue::AnyDictionary(proxy) => proxy,
        other => panic!("expected a dictionary proxy, got {:?}", other),
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Scalars
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_scalar_round_trips() -> anyhow::Result<()> {
    let host = HostRuntime::new();
    let values = [
        Any::None,
        Any::Bool(true),
        Any::Bool(false),
        Any::Int(0),
        Any::Int(i32::MIN),
        Any::Int(i32::MAX),
        Any::Int64(i64::MIN),
        Any::Int64(i64::MAX),
        Any::UInt64(u64::MAX),
        Any::Double(-0.5),
        Any::string(""),
        Any::string("shot_010"),
    ];
    for value in &values {
        assert_eq!(&round_trip(&host, value)?, value);
    }
    Ok(())
}

#[test]
fn test_narrow_values_come_back_narrow() -> anyhow::Result<()> {
    // Width is not part of the host's integer model
    let host = HostRuntime::new();
    assert_eq!(round_trip(&host, &Any::Int64(7))?, Any::Int(7));
    assert_eq!(round_trip(&host, &Any::UInt64(7))?, Any::Int(7));
    Ok(())
}

#[test]
fn test_timing_round_trips() -> anyhow::Result<()> {
    let host = HostRuntime::new();
    let start = RationalTime::new(86_400.0, 24.0);
    let values = [
        Any::RationalTime(start),
        Any::TimeRange(TimeRange::new(start, RationalTime::new(48.0, 24.0))),
        Any::TimeTransform(TimeTransform::new(start, 2.0, 48.0)),
    ];
    for value in &values {
        assert_eq!(&round_trip(&host, value)?, value);
    }
    Ok(())
}

#[test]
fn test_scalar_host_forms() -> anyhow::Result<()> {
    let host = HostRuntime::new();
    assert_eq!(host.to_host(&Any::None, true)?, HostValue::None);
    assert_eq!(host.to_host(&Any::UInt64(u64::MAX), true)?, HostValue::Int(u64::MAX as i128));
    assert_eq!(host.to_host(&Any::string("a"), true)?, HostValue::str("a"));
    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════
// Integer disambiguation
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_integer_widths() -> anyhow::Result<()> {
    let host = HostRuntime::new();
    let cases = [
        (i128::from(i32::MAX), Any::Int(i32::MAX)),
        (i128::from(i32::MIN), Any::Int(i32::MIN)),
        (i128::from(i32::MAX) + 1, Any::Int64(i64::from(i32::MAX) + 1)),
        (i128::from(i32::MIN) - 1, Any::Int64(i64::from(i32::MIN) - 1)),
        (i128::from(u32::MAX), Any::Int64(i64::from(u32::MAX))),
        (i128::from(i64::MAX), Any::Int64(i64::MAX)),
        (i128::from(i64::MAX) + 1, Any::UInt64(1 << 63)),
        (i128::from(u64::MAX), Any::UInt64(u64::MAX)),
    ];
    for (n, expected) in cases {
        assert_eq!(host.to_native(&HostValue::Int(n))?, expected, "for {}", n);
    }
    Ok(())
}

#[test]
fn test_integer_overflow() {
    let host = HostRuntime::new();
    for n in [i128::from(u64::MAX) + 1, i128::from(i64::MIN) - 1] {
        assert_eq!(
            host.to_native(&HostValue::Int(n)),
            Err(BridgeError::IntegerOverflow { value: n })
        );
    }
}

#[test]
fn test_bool_before_integer() -> anyhow::Result<()> {
    let host = HostRuntime::new();
    assert_eq!(host.to_native(&HostValue::Bool(false))?, Any::Bool(false));
    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════
// Composites
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_dictionary_round_trip() -> anyhow::Result<()> {
    let host = HostRuntime::new();
    let value = Any::dictionary([
        ("name", Any::string("shot_010")),
        ("rate", Any::Double(24.0)),
        ("tags", Any::vector(["hero", "vfx"])),
        ("nested", Any::dictionary([("depth", 2i32)])),
    ]);
    let expected = value.clone();

    assert_eq!(round_trip(&host, &value)?, expected);
    Ok(())
}

#[test]
fn test_host_mapping_converts_recursively() -> anyhow::Result<()> {
    let host = HostRuntime::new();
    let value = HostValue::dict([
        (HostValue::str("frames"), HostValue::Int(48)),
        (
            HostValue::str("children"),
            HostValue::list([HostValue::None, HostValue::tuple([HostValue::Float(1.5)])]),
        ),
    ]);

    let expected = Any::dictionary([
        ("frames", Any::Int(48)),
        (
            "children",
            Any::vector([Any::None, Any::vector([Any::Double(1.5)])]),
        ),
    ]);
    assert_eq!(host.to_native(&value)?, expected);
    Ok(())
}

#[test]
fn test_mapping_keys_keep_insertion_order() -> anyhow::Result<()> {
    let host = HostRuntime::new();
    let value = HostValue::dict(
        ["z", "a", "m"]
            .into_iter()
            .map(|k| (HostValue::str(k), HostValue::None)),
    );
    let dict = host.to_any_dictionary(&value)?;
    assert_eq!(dict.keys(), vec!["z", "a", "m"]);
    Ok(())
}

#[test]
fn test_non_string_key_is_rejected() {
    let host = HostRuntime::new();
    let value = HostValue::dict([
        (HostValue::str("ok"), HostValue::Int(1)),
        (HostValue::Int(2), HostValue::Int(2)),
    ]);

    let err = host.to_native(&value).unwrap_err();
    assert_eq!(
        err,
        BridgeError::KeyTypeError {
            type_name: "int".to_string()
        }
    );
    assert_eq!(err.to_string(), "Keys must be of type string, not int");
}

#[test]
fn test_proxy_unwraps_to_a_copy() -> anyhow::Result<()> {
    let host = HostRuntime::new();
    let proxy = unwrap_dictionary(host.to_host(&Any::dictionary([("a", 1i32)]), true)?);

    let copy = host.to_native(&HostValue::AnyDictionary(proxy.clone()))?;
    proxy.set_item(&host, "b", &HostValue::Int(2))?;

    assert_eq!(copy, Any::dictionary([("a", 1i32)]));
    assert_eq!(proxy.len()?, 2);
    Ok(())
}

#[test]
fn test_vector_proxy_unwraps() -> anyhow::Result<()> {
    let host = HostRuntime::new();
    let converted = host.to_host(&Any::vector([1i32, 2, 3]), true)?;
    assert_eq!(host.to_native(&converted)?, Any::vector([1i32, 2, 3]));
    Ok(())
}

#[test]
fn test_objects_round_trip_by_identity() -> anyhow::Result<()> {
    let host = HostRuntime::new();
    let clip = SerializableObject::create("Clip.2");
    let converted = host.to_host(&Any::Retainer(clip.clone()), true)?;

    let back = host.to_native(&converted)?;
    assert_eq!(back.as_retainer(), Some(&clip));
    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════
// to_any_dictionary
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_to_any_dictionary_from_none() -> anyhow::Result<()> {
    let host = HostRuntime::new();
    assert!(host.to_any_dictionary(&HostValue::None)?.is_empty());
    Ok(())
}

#[test]
fn test_to_any_dictionary_rejects_list() {
    let host = HostRuntime::new();
    let err = host
        .to_any_dictionary(&HostValue::list([HostValue::Int(1)]))
        .unwrap_err();
    assert_eq!(
        err,
        BridgeError::TypeMismatch {
            expected: "an AnyDictionary (i.e. metadata)".to_string(),
            got: "AnyVector".to_string(),
        }
    );
}

// ═══════════════════════════════════════════════════════════════════════
// Failures
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_foreign_value_is_unsupported() {
    let host = HostRuntime::new();
    let value = HostValue::list([HostValue::Int(1), HostValue::foreign("socket")]);
    assert_eq!(
        host.to_native(&value),
        Err(BridgeError::UnsupportedType {
            type_name: "socket".to_string()
        })
    );
}

#[test]
fn test_unregistered_native_type_is_unsupported() {
    let registry = ConversionRegistry::builder()
        .with_builtins()
        .unregister(TypeTag::Retainer)
        .build();
    let host = HostRuntime::with_registry(std::sync::Arc::new(registry));

    let clip = SerializableObject::create("Clip.2");
    let err = host.to_host(&Any::Retainer(clip), true).unwrap_err();
    assert_eq!(err.to_string(), "Unsupported value type: Retainer");
}

#[test]
fn test_depth_limit() {
    let host = HostRuntime::new().with_config(BridgeConfig::with_max_conversion_depth(3));

    let mut deep = HostValue::Int(1);
    for _ in 0..10 {
        deep = HostValue::list([deep]);
    }
    assert_eq!(
        host.to_native(&deep),
        Err(BridgeError::DepthExceeded { max: 3 })
    );

    let shallow = HostValue::list([HostValue::list([HostValue::Int(1)])]);
    assert!(host.to_native(&shallow).is_ok());
}
