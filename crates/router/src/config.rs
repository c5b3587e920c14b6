//! Router configuration: one detector config per strategy plus the routing
//! limits.
use detector::{DetectorConfig, DetectorConfigError};
use thiserror::Error;

/// Runtime configuration for a [`StrategyRouter`](crate::StrategyRouter).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouterConfig {
    /// Byte cap for content-derived keys. Texts longer than this never
    /// qualify for the same-content rule, which bounds the memory one
    /// hostile chat can pin in the detector and join tables.
    pub max_content_key_len: usize,
    /// Detector parameters for the same-actor rule.
    pub by_actor: DetectorConfig,
    /// Detector parameters for the same-content rule.
    pub by_content: DetectorConfig,
}

impl Default for RouterConfig {
    fn default() -> Self {
        RouterConfig {
            max_content_key_len: 256,
            by_actor: DetectorConfig::default(),
            by_content: DetectorConfig::default(),
        }
    }
}

/// Errors produced when validating a [`RouterConfig`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouterConfigError {
    #[error("max_content_key_len must be at least 1")]
    ZeroContentKeyLen,

    #[error("same-actor detector config invalid: {0}")]
    ByActor(#[source] DetectorConfigError),

    #[error("same-content detector config invalid: {0}")]
    ByContent(#[source] DetectorConfigError),
}

impl RouterConfig {
    pub fn validate(&self) -> Result<(), RouterConfigError> {
        if self.max_content_key_len == 0 {
            return Err(RouterConfigError::ZeroContentKeyLen);
        }
        self.by_actor.validate().map_err(RouterConfigError::ByActor)?;
        self.by_content
            .validate()
            .map_err(RouterConfigError::ByContent)?;
        Ok(())
    }
}
