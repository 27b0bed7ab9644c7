//! The single choke point between handler capabilities and the transport.
//!
//! Every outbound call — persistence or streaming — flows through
//! [`OperationDispatcher::dispatch`], which validates the preconditions,
//! assembles the [`Invocation`], and submits it fire-and-forget. Nothing
//! else in the crate talks to the transport.

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::transport::{Invocation, InvocationMode, InvocationTransport, TransportError};

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("dispatch target is empty: no routing key resolved for this handler")]
    EmptyTarget,
    #[error("operation name is empty")]
    EmptyOperation,
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Whether a capability call produced a dispatch.
///
/// Missing run/connection context is a deliberate degrade-gracefully no-op,
/// not a failure; `Skipped` makes that visible to callers that care.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// One invocation was submitted to the transport.
    Dispatched,
    /// Nothing to do yet — no active run or no live connection.
    Skipped,
}

impl DispatchOutcome {
    pub fn is_dispatched(&self) -> bool {
        matches!(self, DispatchOutcome::Dispatched)
    }
}

/// Turns a named operation plus parameters into one outbound asynchronous
/// invocation carrying the resolved routing key and ordering metadata.
///
/// Performs no retry: a synchronous transport failure propagates to the
/// caller unmodified, and retry/backoff is the transport's concern. Calls
/// sharing an `ordering_key` are submitted in call order; across keys there
/// is no relative ordering.
#[derive(Clone)]
pub struct OperationDispatcher {
    transport: Arc<dyn InvocationTransport>,
}

impl OperationDispatcher {
    pub fn new(transport: Arc<dyn InvocationTransport>) -> Self {
        Self { transport }
    }

    #[instrument(skip(self, params), fields(target = %target, operation = %operation, ordering_key = %ordering_key))]
    pub async fn dispatch(
        &self,
        target: &str,
        operation: &str,
        params: serde_json::Map<String, serde_json::Value>,
        ordering_key: &str,
        queue: Option<&str>,
    ) -> Result<(), DispatchError> {
        if target.is_empty() {
            return Err(DispatchError::EmptyTarget);
        }
        if operation.is_empty() {
            return Err(DispatchError::EmptyOperation);
        }

        let invocation = Invocation {
            target: target.to_string(),
            operation: operation.to_string(),
            params,
            mode: InvocationMode::Event,
            ordering_key: ordering_key.to_string(),
            queue: queue.map(str::to_string),
        };

        self.transport.invoke(invocation).await?;
        debug!("Invocation submitted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::RecordingTransport;

    #[tokio::test]
    async fn test_empty_target_rejected_before_transport() {
        let transport = Arc::new(RecordingTransport::new());
        let dispatcher = OperationDispatcher::new(transport.clone());

        let err = dispatcher
            .dispatch("", "update_run", serde_json::Map::new(), "run-1", None)
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::EmptyTarget));
        assert_eq!(transport.count(), 0);
    }

    #[tokio::test]
    async fn test_empty_operation_rejected_before_transport() {
        let transport = Arc::new(RecordingTransport::new());
        let dispatcher = OperationDispatcher::new(transport.clone());

        let err = dispatcher
            .dispatch("aws-prod", "", serde_json::Map::new(), "run-1", None)
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::EmptyOperation));
        assert_eq!(transport.count(), 0);
    }

    #[tokio::test]
    async fn test_dispatch_carries_all_metadata() {
        let transport = Arc::new(RecordingTransport::new());
        let dispatcher = OperationDispatcher::new(transport.clone());

        let mut params = serde_json::Map::new();
        params.insert("x".to_string(), serde_json::json!(1));
        dispatcher
            .dispatch("aws-prod#acme-corp", "update_run", params, "run-1", Some("tasks"))
            .await
            .unwrap();

        let recorded = transport.recorded();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].target, "aws-prod#acme-corp");
        assert_eq!(recorded[0].operation, "update_run");
        assert_eq!(recorded[0].ordering_key, "run-1");
        assert_eq!(recorded[0].queue.as_deref(), Some("tasks"));
        assert_eq!(recorded[0].mode, InvocationMode::Event);
    }

    #[tokio::test]
    async fn test_transport_failure_propagates_unmodified() {
        let transport = Arc::new(RecordingTransport::new());
        transport.reject_with("malformed request");
        let dispatcher = OperationDispatcher::new(transport);

        let err = dispatcher
            .dispatch("aws-prod", "update_run", serde_json::Map::new(), "run-1", None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DispatchError::Transport(TransportError::Rejected(reason)) if reason == "malformed request"
        ));
    }
}
