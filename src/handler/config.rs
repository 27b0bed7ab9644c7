use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use crate::handler::identity::PartitionIdentity;

/// Top-level Relay configuration, parsed from `relay.toml`.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RelayConfig {
    #[serde(default)]
    pub identity: IdentityConfig,
    #[serde(default)]
    pub dispatch: DispatchConfig,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct IdentityConfig {
    /// Deployment/environment identifier (the legacy sole identifier)
    pub platform_id: Option<String>,
    /// Business tenant/partition within the platform
    pub partition_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DispatchConfig {
    /// Named task queue invocations are tagged with (optional)
    pub task_queue: Option<String>,
    /// Operation name for chunk delivery to the connection bridge
    #[serde(default = "default_stream_operation")]
    pub stream_operation: String,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            task_queue: None,
            stream_operation: default_stream_operation(),
        }
    }
}

// ─── Defaults ────────────────────────────────────────────────────

fn default_stream_operation() -> String {
    super::STREAM_OPERATION.to_string()
}

// ─── Loading ─────────────────────────────────────────────────────

impl RelayConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Could not read config file: {}", path.display()))?;
        Self::from_str(&contents)
    }

    /// Parse configuration from a TOML string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(toml_str: &str) -> Result<Self> {
        let config: RelayConfig =
            toml::from_str(toml_str).with_context(|| "Failed to parse relay.toml")?;
        config.validate()?;
        Ok(config)
    }

    /// Validate semantic invariants that serde can't enforce.
    ///
    /// Identity misconfiguration (a partition with no platform, or a `#`
    /// inside an identifier) fails here, at load time, never at dispatch.
    pub fn validate(&self) -> Result<()> {
        self.partition_identity()
            .with_context(|| "Invalid [identity] configuration")?;
        anyhow::ensure!(
            !self.dispatch.stream_operation.trim().is_empty(),
            "dispatch.stream_operation must not be empty"
        );
        Ok(())
    }

    /// Build the immutable identity this configuration describes.
    pub fn partition_identity(&self) -> Result<PartitionIdentity> {
        PartitionIdentity::new(
            self.identity.platform_id.clone(),
            self.identity.partition_id.clone(),
        )
        .map_err(Into::into)
    }
}

// ─── Tests ───────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[identity]
platform_id = "aws-prod"
partition_id = "acme-corp"

[dispatch]
task_queue = "agent-tasks"
stream_operation = "send_data_to_websocket"
"#;

        let config = RelayConfig::from_str(toml).unwrap();
        assert_eq!(config.identity.platform_id.as_deref(), Some("aws-prod"));
        assert_eq!(config.identity.partition_id.as_deref(), Some("acme-corp"));
        assert_eq!(config.dispatch.task_queue.as_deref(), Some("agent-tasks"));
        assert_eq!(config.dispatch.stream_operation, "send_data_to_websocket");

        let identity = config.partition_identity().unwrap();
        assert_eq!(identity.routing_key().unwrap(), "aws-prod#acme-corp");
    }

    #[test]
    fn test_parse_minimal_config() {
        let toml = r#"
[identity]
platform_id = "aws-prod"
"#;

        let config = RelayConfig::from_str(toml).unwrap();
        assert_eq!(config.identity.platform_id.as_deref(), Some("aws-prod"));
        assert_eq!(config.identity.partition_id, None);
        // Defaults should be applied
        assert_eq!(config.dispatch.task_queue, None);
        assert_eq!(config.dispatch.stream_operation, super::super::STREAM_OPERATION);
    }

    #[test]
    fn test_empty_config_is_valid_but_unbound() {
        let config = RelayConfig::from_str("").unwrap();
        let identity = config.partition_identity().unwrap();
        assert_eq!(identity.routing_key(), None);
    }

    #[test]
    fn test_validate_partition_without_platform() {
        let toml = r#"
[identity]
partition_id = "acme-corp"
"#;
        let err = RelayConfig::from_str(toml).unwrap_err();
        assert!(format!("{err:#}").contains("acme-corp"));
    }

    #[test]
    fn test_validate_separator_in_identifier() {
        let toml = r#"
[identity]
platform_id = "aws#prod"
"#;
        assert!(RelayConfig::from_str(toml).is_err());
    }

    #[test]
    fn test_validate_empty_stream_operation() {
        let toml = r#"
[identity]
platform_id = "aws-prod"

[dispatch]
stream_operation = ""
"#;
        assert!(RelayConfig::from_str(toml).is_err());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("relay.toml");
        std::fs::write(&path, "[identity]\nplatform_id = \"aws-prod\"\n").unwrap();

        let config = RelayConfig::from_file(&path).unwrap();
        assert_eq!(config.identity.platform_id.as_deref(), Some("aws-prod"));

        assert!(RelayConfig::from_file(&dir.path().join("missing.toml")).is_err());
    }
}
