use serde::{Deserialize, Serialize};

/// Separator between the platform and partition segments of a routing key.
///
/// Disallowed inside either identifier so that the composite key stays
/// injective: no two distinct (platform, partition) pairs collide.
pub const KEY_SEPARATOR: char = '#';

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentityError {
    #[error("partition_id '{0}' is set but no platform_id is configured")]
    PartitionWithoutPlatform(String),
    #[error("identifier '{0}' contains the reserved '#' separator")]
    ReservedSeparator(String),
}

/// Routing identity bound to a handler for its whole life.
///
/// Composes a deployment/environment identifier (`platform_id`) with an
/// optional business tenant identifier (`partition_id`) into the routing key
/// every outbound invocation is targeted at. Legacy deployments set only
/// `platform_id` and get the single-identifier key unchanged.
///
/// Immutable after construction. Rebinding an identity means building a new
/// handler, never mutating one that may have dispatches in flight.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PartitionIdentity {
    platform_id: Option<String>,
    partition_id: Option<String>,
}

impl PartitionIdentity {
    /// Build an identity, rejecting the two misconfigurations that would
    /// otherwise surface as malformed routing keys at dispatch time: a
    /// partition with no platform, and a `#` inside either identifier.
    pub fn new(
        platform_id: Option<String>,
        partition_id: Option<String>,
    ) -> Result<Self, IdentityError> {
        let platform_id = platform_id.filter(|s| !s.is_empty());
        let partition_id = partition_id.filter(|s| !s.is_empty());

        if platform_id.is_none() {
            if let Some(partition) = partition_id {
                return Err(IdentityError::PartitionWithoutPlatform(partition));
            }
        }
        for id in [&platform_id, &partition_id].into_iter().flatten() {
            if id.contains(KEY_SEPARATOR) {
                return Err(IdentityError::ReservedSeparator(id.clone()));
            }
        }

        Ok(Self {
            platform_id,
            partition_id,
        })
    }

    /// An identity with no platform at all. Valid to hold, but no dispatch
    /// can resolve a target from it.
    pub fn unbound() -> Self {
        Self {
            platform_id: None,
            partition_id: None,
        }
    }

    pub fn platform_id(&self) -> Option<&str> {
        self.platform_id.as_deref()
    }

    pub fn partition_id(&self) -> Option<&str> {
        self.partition_id.as_deref()
    }

    /// Resolve the composite routing key, or `None` when no platform is set.
    ///
    /// Pure and idempotent: same identity, same key, every call.
    pub fn routing_key(&self) -> Option<String> {
        self.platform_id
            .as_deref()
            .map(|platform| resolve_routing_key(platform, self.partition_id.as_deref()))
    }
}

/// Compose a routing key from a platform identifier and an optional partition.
///
/// When the partition is unset or empty the platform identifier is returned
/// unchanged — callers that never configure a partition reproduce the legacy
/// single-identifier behavior exactly. Otherwise the key is
/// `"{platform}#{partition}"`.
pub fn resolve_routing_key(platform_id: &str, partition_id: Option<&str>) -> String {
    match partition_id {
        Some(partition) if !partition.is_empty() => {
            format!("{platform_id}{KEY_SEPARATOR}{partition}")
        }
        _ => platform_id.to_string(),
    }
}
