use serde::{Deserialize, Serialize};

/// Identifiers for the active unit of work.
///
/// Supplied by the orchestrator when a run starts and read-only from then on.
/// Every asynchronous persistence dispatch is tagged with these three values;
/// a handler with no `RunContext` bound has no active unit of work and skips
/// persistence dispatches entirely.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunContext {
    pub thread_id: String,
    pub run_id: String,
    pub updated_by: String,
}

impl RunContext {
    pub fn new(
        thread_id: impl Into<String>,
        run_id: impl Into<String>,
        updated_by: impl Into<String>,
    ) -> Self {
        Self {
            thread_id: thread_id.into(),
            run_id: run_id.into(),
            updated_by: updated_by.into(),
        }
    }

    /// Wire-format params every persistence invocation carries.
    ///
    /// Field names are the persistence contract (`thread_uuid`, `run_uuid`,
    /// `updated_by`) and must not drift from what downstream functions expect.
    pub fn augment_params(&self, params: &mut serde_json::Map<String, serde_json::Value>) {
        params.insert("thread_uuid".to_string(), self.thread_id.clone().into());
        params.insert("run_uuid".to_string(), self.run_id.clone().into());
        params.insert("updated_by".to_string(), self.updated_by.clone().into());
    }
}

/// Identity of a live bidirectional channel (e.g. a websocket).
///
/// Absence is the valid "not streaming" state, not an error: a handler
/// without a connection silently skips stream dispatches.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConnectionContext {
    pub connection_id: String,
}

impl ConnectionContext {
    pub fn new(connection_id: impl Into<String>) -> Self {
        Self {
            connection_id: connection_id.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_augment_params_wire_names() {
        let run = RunContext::new("t1", "r1", "u1");
        let mut params = serde_json::Map::new();
        params.insert("x".to_string(), json!(1));

        run.augment_params(&mut params);

        assert_eq!(params.get("x"), Some(&json!(1)));
        assert_eq!(params.get("thread_uuid"), Some(&json!("t1")));
        assert_eq!(params.get("run_uuid"), Some(&json!("r1")));
        assert_eq!(params.get("updated_by"), Some(&json!("u1")));
    }

    #[test]
    fn test_augment_overwrites_stale_run_fields() {
        let run = RunContext::new("t1", "r1", "u1");
        let mut params = serde_json::Map::new();
        params.insert("run_uuid".to_string(), json!("stale"));

        run.augment_params(&mut params);
        assert_eq!(params.get("run_uuid"), Some(&json!("r1")));
    }
}
