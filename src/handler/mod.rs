pub mod builder;
pub mod config;
pub mod identity;
pub mod session;
pub mod stream;

use tracing::{debug, instrument};

use crate::dispatch::{DispatchError, DispatchOutcome, OperationDispatcher};
use builder::HandlerBuilder;
use identity::PartitionIdentity;
use session::{ConnectionContext, RunContext};
use stream::{DataFormat, JsonDeltaBuffer, StreamChunk, StreamSequencer, ordering_key};

/// Default operation name for chunk delivery to the connection bridge.
pub const STREAM_OPERATION: &str = "send_data_to_stream";

/// The dispatch core provider adapters drive.
///
/// One handler serves one run/session: the orchestrator binds the partition
/// identity, the run context, and (when output is streamed) the connection
/// context at construction time, and the adapter then calls exactly two
/// capabilities — [`invoke_async_operation`](Self::invoke_async_operation)
/// and [`stream_chunk`](Self::stream_chunk). Both resolve the same routing
/// key, so persistence and streaming land in the same backing partition.
///
/// Concurrent runs get independent handlers; nothing here is shared mutable
/// state, which is why no capability call takes `&mut self`.
pub struct EventHandler {
    pub(crate) identity: PartitionIdentity,
    pub(crate) run: Option<RunContext>,
    pub(crate) connection: Option<ConnectionContext>,
    pub(crate) task_queue: Option<String>,
    pub(crate) stream_operation: String,
    pub(crate) dispatcher: OperationDispatcher,
}

impl EventHandler {
    /// Create a new builder bound to the given identity.
    pub fn builder(identity: PartitionIdentity) -> HandlerBuilder {
        HandlerBuilder::new(identity)
    }

    // ─── Read-only accessors (the whole adapter-visible surface) ──

    pub fn identity(&self) -> &PartitionIdentity {
        &self.identity
    }

    pub fn run(&self) -> Option<&RunContext> {
        self.run.as_ref()
    }

    pub fn connection(&self) -> Option<&ConnectionContext> {
        self.connection.as_ref()
    }

    pub fn task_queue(&self) -> Option<&str> {
        self.task_queue.as_deref()
    }

    /// A sequencer for this handler's stream, or `None` when the handler is
    /// not in a streaming state (no run or no connection bound).
    pub fn sequencer(&self, suffix: Option<&str>) -> Option<StreamSequencer> {
        let run = self.run.as_ref()?;
        let connection = self.connection.as_ref()?;
        Some(StreamSequencer::with_suffix(
            &connection.connection_id,
            &run.run_id,
            suffix,
        ))
    }

    // ─── Capability: persist state asynchronously ─────────────────

    /// Fire one asynchronous persistence operation for the active run.
    ///
    /// No-op (`Skipped`) when no run context is bound. Otherwise the params
    /// are augmented with the run identifiers, the routing key is resolved
    /// from the handler identity, and the invocation is submitted with
    /// `ordering_key = run_id` — so every persistence call of one run
    /// reaches the transport in call order.
    #[instrument(skip(self, params), fields(operation = %operation))]
    pub async fn invoke_async_operation(
        &self,
        operation: &str,
        mut params: serde_json::Map<String, serde_json::Value>,
    ) -> Result<DispatchOutcome, DispatchError> {
        let Some(run) = &self.run else {
            debug!("No active run, skipping async operation");
            return Ok(DispatchOutcome::Skipped);
        };

        run.augment_params(&mut params);
        let target = self.identity.routing_key().unwrap_or_default();

        self.dispatcher
            .dispatch(
                &target,
                operation,
                params,
                &run.run_id,
                self.task_queue.as_deref(),
            )
            .await?;
        Ok(DispatchOutcome::Dispatched)
    }

    // ─── Capability: stream a chunk to the live connection ────────

    /// Deliver one chunk of incremental output to the bound connection.
    ///
    /// No-op (`Skipped`) when there is no live connection or no active run.
    /// The chunk is serialized into the stream wire record and dispatched
    /// under the `{connection_id}-{run_id}[-{suffix}]` ordering key, so
    /// chunks with increasing `index` arrive in submit order. `is_final`
    /// marks the last chunk of a logical message and is advisory only.
    #[instrument(skip(self, delta), fields(index = index, format = ?format))]
    pub async fn stream_chunk(
        &self,
        index: u64,
        format: DataFormat,
        delta: &str,
        is_final: bool,
        suffix: Option<&str>,
    ) -> Result<DispatchOutcome, DispatchError> {
        let (Some(run), Some(connection)) = (&self.run, &self.connection) else {
            debug!("No live connection or active run, skipping stream chunk");
            return Ok(DispatchOutcome::Skipped);
        };

        let key = ordering_key(&connection.connection_id, &run.run_id, suffix);
        let chunk = StreamChunk {
            message_group_id: key.clone(),
            data_format: format,
            index,
            chunk_delta: delta.to_string(),
            is_message_end: is_final,
        };
        let data = serde_json::to_string(&chunk)
            .map_err(|e| crate::transport::TransportError::Rejected(e.to_string()))?;

        let mut params = serde_json::Map::new();
        params.insert(
            "connection_id".to_string(),
            connection.connection_id.clone().into(),
        );
        params.insert("data".to_string(), data.into());

        let target = self.identity.routing_key().unwrap_or_default();
        self.dispatcher
            .dispatch(
                &target,
                &self.stream_operation,
                params,
                &key,
                self.task_queue.as_deref(),
            )
            .await?;
        Ok(DispatchOutcome::Dispatched)
    }

    /// Stream a JSON delta through an accumulation buffer.
    ///
    /// Pushes the delta into `buffer` and dispatches a chunk only when the
    /// buffered text forms a streamable JSON prefix, pulling its index from
    /// `sequencer`. Returns `Skipped` while the buffer is holding text back.
    pub async fn stream_json_delta(
        &self,
        sequencer: &mut StreamSequencer,
        buffer: &mut JsonDeltaBuffer,
        delta: &str,
    ) -> Result<DispatchOutcome, DispatchError> {
        let Some(released) = buffer.push(delta) else {
            return Ok(DispatchOutcome::Skipped);
        };
        self.stream_chunk(
            sequencer.next_index(),
            DataFormat::Json,
            &released,
            false,
            None,
        )
        .await
    }
}
