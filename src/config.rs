//! Dimmer configuration.

use crate::engine::LerpMode;
use crate::error::ConfigError;

/// Identify reply used when none is configured.
pub const DEFAULT_IDENTIFIER: &str = "dimmer-core\n";

/// Static settings for a [`Dispatcher`](crate::Dispatcher).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DimmerConfig {
    /// Bytes written verbatim in reply to `Identify`.
    pub identifier: &'static str,

    /// End-value selection for interpolation.
    pub lerp_mode: LerpMode,

    /// Start with verbose diagnostics already on.
    pub debug: bool,
}

impl Default for DimmerConfig {
    fn default() -> Self {
        Self {
            identifier: DEFAULT_IDENTIFIER,
            lerp_mode: LerpMode::Indexed,
            debug: false,
        }
    }
}

impl DimmerConfig {
    /// Creates a new config builder.
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }
}

/// Builder for validated [`DimmerConfig`]s.
#[derive(Debug)]
pub struct ConfigBuilder {
    config: DimmerConfig,
}

impl ConfigBuilder {
    /// Starts from [`DimmerConfig::default`].
    pub fn new() -> Self {
        Self {
            config: DimmerConfig::default(),
        }
    }

    /// Sets the identify reply.
    pub fn identifier(mut self, identifier: &'static str) -> Self {
        self.config.identifier = identifier;
        self
    }

    /// Sets the interpolation mode.
    ///
    /// Default is `LerpMode::Indexed`.
    pub fn lerp_mode(mut self, mode: LerpMode) -> Self {
        self.config.lerp_mode = mode;
        self
    }

    /// Enables verbose diagnostics from boot.
    pub fn debug(mut self, enabled: bool) -> Self {
        self.config.debug = enabled;
        self
    }

    /// Builds and validates the config.
    ///
    /// # Errors
    /// * `EmptyIdentifier` - The identify reply is empty
    /// * `NonAsciiIdentifier` - The identify reply is not plain ASCII
    pub fn build(self) -> Result<DimmerConfig, ConfigError> {
        if self.config.identifier.is_empty() {
            return Err(ConfigError::EmptyIdentifier);
        }
        if !self.config.identifier.is_ascii() {
            return Err(ConfigError::NonAsciiIdentifier);
        }

        Ok(self.config)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
