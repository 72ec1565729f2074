//! Lifetime of host handles driven by native reference counts

use std::rc::Rc;

use anybridge::*;
use pretty_assertions::assert_eq;

#[test]
fn test_acquire_and_release_exactly_once() {
    let host = HostRuntime::new();
    let clip = SerializableObject::create("Clip.2");
    let object = clip.downgrade();

    // Count rises from 1 to 2: the handle's retainer joins native's
    let handle = host.wrap_object(&clip);
    let bridge = handle.keepalive().expect("monitor installed");
    assert_eq!(clip.current_ref_count(), 2);
    assert_eq!(bridge.state(), KeepaliveState::KeptAlive);
    assert_eq!(bridge.acquisitions(), 1);

    // Host lets go; native still holds the object, so the handle survives
    let weak_handle = Rc::downgrade(&handle);
    drop(handle);
    assert!(weak_handle.upgrade().is_some());

    // Count falls back to 1: released, which destroys handle and object
    drop(clip);
    assert_eq!(bridge.releases(), 1);
    assert_eq!(bridge.acquisitions(), 1);
    assert_eq!(bridge.state(), KeepaliveState::Unreferenced);
    assert!(weak_handle.upgrade().is_none());
    assert!(object.upgrade().is_none());
}

#[test]
fn test_extra_native_references_do_not_reacquire() {
    let host = HostRuntime::new();
    let clip = SerializableObject::create("Clip.2");
    let handle = host.wrap_object(&clip);
    let bridge = handle.keepalive().expect("monitor installed");

    let more: Vec<Retainer> = (0..3).map(|_| clip.clone()).collect();
    assert_eq!(clip.current_ref_count(), 5);
    drop(more);

    assert_eq!((bridge.acquisitions(), bridge.releases()), (1, 0));
}

#[test]
fn test_host_only_handle_lives_while_host_holds_it() {
    let host = HostRuntime::new();
    let value = Any::Retainer(SerializableObject::create("Track.1"));

    let converted = host.to_host(&value, true).expect("wrapped");
    let HostValue::Object(handle) = &converted else {
        panic!("expected an object handle");
    };
    let bridge = handle.keepalive().expect("monitor installed");
    let object = handle.retainer().downgrade();
    assert_eq!(bridge.state(), KeepaliveState::KeptAlive);

    // The native value goes away; only the handle's own retainer remains
    drop(value);
    assert_eq!(bridge.state(), KeepaliveState::Unreferenced);
    assert!(object.upgrade().is_some());

    drop(converted);
    assert!(object.upgrade().is_none());
    assert_eq!((bridge.acquisitions(), bridge.releases()), (1, 1));
}

#[test]
fn test_handle_identity_and_attributes_survive_host_release() {
    let host = HostRuntime::new();
    let clip = SerializableObject::create("Clip.2");

    let first = host.wrap_object(&clip);
    first.set_attr("label", HostValue::str("hero"));
    let address = Rc::as_ptr(&first);
    drop(first);

    let second = host.wrap_object(&clip);
    assert_eq!(Rc::as_ptr(&second), address);
    assert_eq!(second.get_attr("label"), Some(HostValue::str("hero")));
}

#[test]
fn test_release_after_destruction_is_a_no_op() {
    let host = HostRuntime::new();
    let clip = SerializableObject::create("Clip.2");
    let bridge = host.wrap_object(&clip).keepalive().expect("monitor installed");
    drop(clip);
    assert_eq!(bridge.releases(), 1);

    // Late notifications for an object that is already gone
    let guard = host.acquire();
    assert_eq!(bridge.on_ref_count_changed(&guard, 1), None);
    assert_eq!(bridge.on_ref_count_changed(&guard, 0), None);
    assert_eq!(bridge.on_ref_count_changed(&guard, 2), None);
    assert_eq!((bridge.acquisitions(), bridge.releases()), (1, 1));
}

#[test]
fn test_monitor_installed_without_apply_now() {
    let host = HostRuntime::new();
    let clip = SerializableObject::create("Clip.2");
    let handle = host.wrap_object(&clip);

    let bridge = install_external_keepalive_monitor(&host, &handle, false);
    assert_eq!(bridge.state(), KeepaliveState::Unreferenced);

    let extra = clip.clone();
    assert_eq!(bridge.state(), KeepaliveState::KeptAlive);
    drop(extra);
    assert_eq!(bridge.state(), KeepaliveState::KeptAlive);
    assert!(Rc::ptr_eq(&handle.keepalive().expect("installed"), &bridge));
}

#[test]
fn test_lock_is_released_after_notifications() {
    let host = HostRuntime::new();
    let clip = SerializableObject::create("Clip.2");
    let _handle = host.wrap_object(&clip);
    let extra = clip.clone();
    drop(extra);
    assert!(!host.lock().is_held());
}

#[test]
fn test_second_runtime_takes_over_the_keepalive() {
    let first = HostRuntime::new();
    let second = HostRuntime::new();
    let clip = SerializableObject::create("Clip.2");

    let a = first.wrap_object(&clip);
    let b = second.wrap_object(&clip);

    assert!(a.keepalive().is_none());
    let bridge = b.keepalive().expect("monitor installed");
    assert_eq!(bridge.state(), KeepaliveState::KeptAlive);
    assert_eq!(clip.current_ref_count(), 3);
    assert!(!Rc::ptr_eq(&a, &b));
}
