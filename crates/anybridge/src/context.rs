//! Bridge configuration

/// Configuration for a host runtime's conversions.
///
/// Passed to [`HostRuntime::with_config`](crate::HostRuntime::with_config)
/// and consulted on every conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeConfig {
    /// Maximum nesting depth for host→native conversion
    pub max_conversion_depth: usize,

    /// Whether to emit a trace event for every native→host dispatch
    pub trace_conversions: bool,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            max_conversion_depth: 1000,
            trace_conversions: false,
        }
    }
}

impl BridgeConfig {
    /// Create a config with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a config with a custom conversion depth limit.
    pub fn with_max_conversion_depth(max_depth: usize) -> Self {
        Self {
            max_conversion_depth: max_depth,
            ..Default::default()
        }
    }

    /// Enable per-dispatch trace events (builder pattern).
    pub fn tracing(mut self, enabled: bool) -> Self {
        self.trace_conversions = enabled;
        self
    }
}
