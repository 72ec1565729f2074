//! # Anybridge
//!
//! Marshaling and lifetime-safety layer between a strongly typed native data
//! model and a dynamically typed, garbage-collected host runtime.
//!
//! The host may hold long-lived handles into native memory; the native side
//! may copy, clear, swap or destroy the containers behind those handles at
//! any time. Anybridge keeps both sides honest.
//!
//! ## Architecture
//!
//! - **Dynamic value** ([`Any`]): closed, tagged carrier for every payload
//!   type that crosses the boundary
//! - **Mutation-aware containers** ([`AnyDictionary`], [`AnyVector`]): every
//!   invalidating operation bumps an out-of-band [`MutationStamp`]
//! - **Proxies** ([`AnyDictionaryProxy`], [`AnyVectorProxy`]): host objects
//!   that observe a container through its stamp and detect use after
//!   destruction
//! - **Conversion dispatch** ([`ConversionRegistry`], [`HostRuntime::to_native`]):
//!   table-driven native→host conversion and ordered host→native
//!   disambiguation
//! - **Keepalive** ([`KeepaliveBridge`]): turns a native object's reference
//!   count into a strong or weak hold on its host handle
//!
//! ## Example
//!
//! ```
//! use anybridge::{Any, HostRuntime, HostValue};
//!
//! let host = HostRuntime::new();
//! let metadata = Any::dictionary([("rate", 24i32)]);
//!
//! let HostValue::AnyDictionary(proxy) = host.to_host(&metadata, true).unwrap() else {
//!     unreachable!()
//! };
//! proxy.set_item(&host, "name", &HostValue::str("shot_010")).unwrap();
//! assert_eq!(proxy.len().unwrap(), 2);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod any;
pub mod context;
pub mod convert;
pub mod error;
pub mod host;
pub mod keepalive;
pub mod native;
pub mod time;
pub mod tracked;

// Re-export main types
pub use any::{Any, FromAny, TypeTag};
pub use context::BridgeConfig;
pub use convert::{ConversionRegistry, RegistryBuilder, ToHostFn};
pub use error::{BridgeError, Result};
pub use host::{
    AnyDictionaryProxy, AnyVectorProxy, HostGuard, HostLock, HostRuntime, HostValue, ObjectHandle,
};
pub use keepalive::{
    install_external_keepalive_monitor, KeepaliveBridge, KeepaliveMonitor, KeepaliveState,
    Transition,
};
pub use native::{RefCountListener, Retainer, SerializableObject};
pub use time::{RationalTime, TimeRange, TimeTransform};
pub use tracked::{AnyDictionary, AnyVector, MutationStamp, Tracked, INVALID_REVISION};

/// Anybridge version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
