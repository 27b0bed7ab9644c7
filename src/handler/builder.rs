use anyhow::Result;
use std::sync::Arc;

use crate::dispatch::OperationDispatcher;
use crate::handler::EventHandler;
use crate::handler::identity::PartitionIdentity;
use crate::handler::session::{ConnectionContext, RunContext};
use crate::transport::InvocationTransport;

/// Builder for constructing an `EventHandler` instance.
///
/// Identity and contexts are bound here, once, before any dispatch can
/// happen — there are no setters on the built handler, so there is no way
/// to mutate identity concurrently with in-flight dispatches.
pub struct HandlerBuilder {
    identity: PartitionIdentity,
    run: Option<RunContext>,
    connection: Option<ConnectionContext>,
    task_queue: Option<String>,
    stream_operation: String,
    transport: Option<Arc<dyn InvocationTransport>>,
}

impl HandlerBuilder {
    /// Create a new builder bound to the given partition identity.
    pub fn new(identity: PartitionIdentity) -> Self {
        Self {
            identity,
            run: None,
            connection: None,
            task_queue: None,
            stream_operation: super::STREAM_OPERATION.to_string(),
            transport: None,
        }
    }

    /// Bind the active unit of work. Without it, persistence dispatches
    /// are skipped.
    pub fn bind_run(mut self, run: RunContext) -> Self {
        self.run = Some(run);
        self
    }

    /// Bind a live connection. Without it, stream dispatches are skipped.
    pub fn bind_connection(mut self, connection: ConnectionContext) -> Self {
        self.connection = Some(connection);
        self
    }

    /// Select a named task queue at the transport (optional).
    pub fn task_queue(mut self, queue: impl Into<String>) -> Self {
        self.task_queue = Some(queue.into());
        self
    }

    /// Override the stream delivery operation name (for legacy deployments
    /// that still route chunks to a differently-named bridge function).
    pub fn stream_operation(mut self, operation: impl Into<String>) -> Self {
        self.stream_operation = operation.into();
        self
    }

    /// Set the invocation transport. Required.
    pub fn transport(mut self, transport: Arc<dyn InvocationTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Build the `EventHandler`.
    pub fn build(self) -> Result<EventHandler> {
        let transport = self
            .transport
            .ok_or_else(|| anyhow::anyhow!("HandlerBuilder requires a transport"))?;
        anyhow::ensure!(
            !self.stream_operation.is_empty(),
            "stream operation name must not be empty"
        );

        Ok(EventHandler {
            identity: self.identity,
            run: self.run,
            connection: self.connection,
            task_queue: self.task_queue,
            stream_operation: self.stream_operation,
            dispatcher: OperationDispatcher::new(transport),
        })
    }
}
