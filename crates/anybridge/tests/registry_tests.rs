//! Conversion registry construction and shared use across threads

use std::sync::Arc;
use std::thread;

use anybridge::*;
use pretty_assertions::assert_eq;

#[test]
fn test_global_registry_initializes_once_across_threads() {
    let addresses: Vec<usize> = (0..8)
        .map(|_| thread::spawn(|| Arc::as_ptr(&ConversionRegistry::global()) as usize))
        .collect::<Vec<_>>()
        .into_iter()
        .map(|worker| worker.join().expect("worker panicked"))
        .collect();

    assert!(addresses.windows(2).all(|pair| pair[0] == pair[1]));
}

#[test]
fn test_concurrent_conversions_with_shared_registry() {
    let registry = Arc::new(ConversionRegistry::builtin());

    let workers: Vec<_> = (0..8i64)
        .map(|worker| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || -> Result<usize> {
                let host = HostRuntime::with_registry(registry);
                let mut converted = 0;
                for n in 0..500i64 {
                    let value = Any::dictionary([
                        ("worker", Any::Int64(worker)),
                        ("n", Any::Int64(n * 1_000_000_007)),
                        ("label", Any::string(format!("{}-{}", worker, n))),
                    ]);
                    let expected = value.clone();
                    let host_value = host.to_host(&value, true)?;
                    let back = host.to_native(&host_value)?;
                    assert_eq!(
                        back.as_dictionary().and_then(|d| d.get("label")),
                        expected.as_dictionary().and_then(|d| d.get("label"))
                    );
                    converted += 1;
                }
                Ok(converted)
            })
        })
        .collect();

    let total: usize = workers
        .into_iter()
        .map(|worker| worker.join().expect("worker panicked"))
        .collect::<Result<Vec<_>>>()
        .expect("conversion failed")
        .into_iter()
        .sum();
    assert_eq!(total, 8 * 500);
}

#[test]
fn test_custom_registry_override() {
    fn shout(_: &HostRuntime, value: &Any, _: bool) -> Result<HostValue> {
        let s = value.as_str().unwrap_or_default();
        Ok(HostValue::from(s.to_uppercase()))
    }

    let registry = ConversionRegistry::builder()
        .with_builtins()
        .register(TypeTag::String, shout)
        .build();
    let host = HostRuntime::with_registry(Arc::new(registry));

    assert_eq!(
        host.to_host(&Any::string("take two"), true),
        Ok(HostValue::str("TAKE TWO"))
    );
    assert_eq!(host.to_host(&Any::Int(2), true), Ok(HostValue::Int(2)));
}

#[test]
fn test_empty_registry_rejects_everything() {
    let host = HostRuntime::with_registry(Arc::new(ConversionRegistry::builder().build()));
    for value in [Any::None, Any::Bool(true), Any::Double(1.0)] {
        let name = value.tag().name();
        assert_eq!(
            host.to_host(&value, true),
            Err(BridgeError::UnsupportedType {
                type_name: name.to_string()
            })
        );
    }
}

#[test]
fn test_lookup_by_canonical_name() {
    let registry = ConversionRegistry::global();
    for tag in TypeTag::ALL {
        assert!(registry.converter_by_name(tag.name()).is_some(), "{}", tag);
    }
    assert!(registry.converter_by_name("std::string::String").is_none());
}

#[test]
fn test_trace_conversions_does_not_change_results() {
    let host = HostRuntime::new().with_config(BridgeConfig::new().tracing(true));
    assert!(host.config().trace_conversions);
    assert_eq!(host.to_host(&Any::Int(5), true), Ok(HostValue::Int(5)));
}
