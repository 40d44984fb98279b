//! # Resource Configuration
//!
//! Pool capacities are data, not code. They are read from TOML once at
//! startup and fixed for the lifetime of the managers.
//!
//! ```toml
//! max_emitters = 256
//! max_force_fields = 64
//! max_nodes = 4096
//! max_animation_clips = 1024
//! hide_on_destroy = false
//! ```
//!
//! Missing keys take their defaults. Unknown keys are rejected.

use std::path::Path;

use serde::Deserialize;

use crate::animation::MAX_ANIMATION_CLIPS;
use crate::emitter::MAX_EMITTERS;
use crate::force_field::MAX_FORCE_FIELDS;
use crate::node::MAX_NODES;
use crate::{ResourceError, ResourceResult};

/// Capacities and policies for every resource manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResourceConfig {
    /// Emitter pool and mirror capacity.
    pub max_emitters: u32,
    /// Force field pool and mirror capacity.
    pub max_force_fields: u32,
    /// Node pool capacity.
    pub max_nodes: u32,
    /// Animation clip pool capacity.
    pub max_animation_clips: u32,
    /// Rewrite destroyed slots as hidden/disabled on the GPU.
    pub hide_on_destroy: bool,
}

impl Default for ResourceConfig {
    fn default() -> Self {
        Self {
            max_emitters: MAX_EMITTERS,
            max_force_fields: MAX_FORCE_FIELDS,
            max_nodes: MAX_NODES,
            max_animation_clips: MAX_ANIMATION_CLIPS,
            hide_on_destroy: false,
        }
    }
}

impl ResourceConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` for malformed TOML, unknown keys or zero capacities.
    pub fn from_toml_str(source: &str) -> ResourceResult<Self> {
        let config: Self = toml::from_str(source)
            .map_err(|e| ResourceError::InvalidConfig(format!("Failed to parse resource config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// `Io` if the file cannot be read, otherwise as [`Self::from_toml_str`].
    pub fn load(path: impl AsRef<Path>) -> ResourceResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .map_err(|e| ResourceError::Io(format!("{}: {e}", path.display())))?;

        let config = Self::from_toml_str(&source)?;
        tracing::debug!(path = %path.display(), ?config, "resource config loaded");
        Ok(config)
    }

    /// Checks that every pool can hold at least one resource.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` naming the first zero capacity.
    pub fn validate(&self) -> ResourceResult<()> {
        let capacities = [
            ("max_emitters", self.max_emitters),
            ("max_force_fields", self.max_force_fields),
            ("max_nodes", self.max_nodes),
            ("max_animation_clips", self.max_animation_clips),
        ];

        match capacities.iter().find(|(_, value)| *value == 0) {
            Some((key, _)) => Err(ResourceError::InvalidConfig(format!("{key} must be at least 1"))),
            None => Ok(()),
        }
    }
}
