//! Conversion dispatch between [`Any`] and [`HostValue`]
//!
//! Native→host conversion goes through a [`ConversionRegistry`], a table
//! from [`TypeTag`] to converter function built once and read-only after.
//! Host→native conversion is a fixed, ordered disambiguation over the host
//! value's structural protocols (see [`to_native`]).
//!
//! # Thread Safety
//!
//! The registry holds only `fn` pointers, so it is `Send + Sync` and one
//! instance can serve every host runtime in the process. The values being
//! converted are not `Send`; each runtime converts on its own thread.

mod to_host;
mod to_native;

pub use to_native::{to_any_dictionary, to_native};

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use tracing::{debug, trace};

use crate::any::{Any, TypeTag};
use crate::error::{BridgeError, Result};
use crate::host::{HostRuntime, HostValue};

/// A native→host converter.
///
/// `is_top_level` is true when the value is not owned by a parent
/// container, so composite storage may be moved into the host object.
pub type ToHostFn = fn(&HostRuntime, &Any, bool) -> Result<HostValue>;

static GLOBAL_REGISTRY: OnceLock<Arc<ConversionRegistry>> = OnceLock::new();

/// Table of native→host converters, keyed by payload tag.
#[derive(Clone)]
pub struct ConversionRegistry {
    to_host: HashMap<TypeTag, ToHostFn>,
}

impl ConversionRegistry {
    /// The process-wide registry with every builtin converter.
    ///
    /// Initialized on first use; concurrent first calls build it once.
    pub fn global() -> Arc<ConversionRegistry> {
        Arc::clone(GLOBAL_REGISTRY.get_or_init(|| Arc::new(Self::builtin())))
    }

    /// A fresh registry with every builtin converter.
    pub fn builtin() -> Self {
        Self::builder().with_builtins().build()
    }

    /// Start an empty registry.
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder {
            to_host: HashMap::new(),
        }
    }

    /// The converter for `tag`.
    pub fn converter(&self, tag: TypeTag) -> Option<ToHostFn> {
        self.to_host.get(&tag).copied()
    }

    /// The converter for a canonical type name such as `"i64"`.
    pub fn converter_by_name(&self, name: &str) -> Option<ToHostFn> {
        name.parse::<TypeTag>()
            .ok()
            .and_then(|tag| self.converter(tag))
    }

    /// Whether `tag` has a converter.
    pub fn contains(&self, tag: TypeTag) -> bool {
        self.to_host.contains_key(&tag)
    }

    /// Number of registered converters.
    pub fn len(&self) -> usize {
        self.to_host.len()
    }

    /// Whether no converter is registered.
    pub fn is_empty(&self) -> bool {
        self.to_host.is_empty()
    }

    /// Convert `value` for `host` through its registered converter.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedType` naming the value's type when no converter
    /// is registered for its tag, or whatever the converter returns.
    pub fn to_host(&self, host: &HostRuntime, value: &Any, is_top_level: bool) -> Result<HostValue> {
        let tag = value.tag();
        let convert = self
            .converter(tag)
            .ok_or_else(|| BridgeError::UnsupportedType {
                type_name: tag.name().to_string(),
            })?;
        if host.config().trace_conversions {
            trace!(type_name = tag.name(), is_top_level, "converting to host");
        }
        convert(host, value, is_top_level)
    }
}

impl std::fmt::Debug for ConversionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut tags: Vec<_> = self.to_host.keys().collect();
        tags.sort();
        f.debug_struct("ConversionRegistry")
            .field("to_host", &tags)
            .finish()
    }
}

/// Builder for a [`ConversionRegistry`].
///
/// Registration happens only here; a built registry never changes.
#[derive(Clone, Default)]
pub struct RegistryBuilder {
    to_host: HashMap<TypeTag, ToHostFn>,
}

impl RegistryBuilder {
    /// Register the converter for every builtin payload type.
    pub fn with_builtins(mut self) -> Self {
        for tag in TypeTag::ALL {
            self.to_host.insert(tag, to_host::builtin(tag));
        }
        self
    }

    /// Register `convert` for `tag`, replacing any earlier entry.
    pub fn register(mut self, tag: TypeTag, convert: ToHostFn) -> Self {
        self.to_host.insert(tag, convert);
        self
    }

    /// Remove the converter for `tag`.
    pub fn unregister(mut self, tag: TypeTag) -> Self {
        self.to_host.remove(&tag);
        self
    }

    /// Freeze the table.
    pub fn build(self) -> ConversionRegistry {
        debug!(count = self.to_host.len(), "built conversion registry");
        ConversionRegistry {
            to_host: self.to_host,
        }
    }
}
