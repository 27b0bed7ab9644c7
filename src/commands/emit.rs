use anyhow::{Context, Result};
use std::io::BufRead;
use std::path::PathBuf;
use std::sync::Arc;

use relay::handler::EventHandler;
use relay::handler::config::RelayConfig;
use relay::handler::session::{ConnectionContext, RunContext};
use relay::handler::stream::DataFormat;
use relay::transport::ChannelTransport;

pub struct EmitArgs {
    pub config: PathBuf,
    pub connection_id: Option<String>,
    pub run_id: Option<String>,
    pub thread_id: Option<String>,
    pub updated_by: String,
    pub format: String,
    pub group_suffix: Option<String>,
}

/// Stream stdin lines as chunks through a real handler over the in-memory
/// channel transport, printing every delivered invocation as NDJSON.
///
/// This is a development tool for inspecting exactly what a deployment's
/// transport would receive: targets, ordering keys, and chunk records.
pub async fn run_emit(args: EmitArgs) -> Result<()> {
    let config = RelayConfig::from_file(&args.config).with_context(|| "Failed to load config")?;
    let format: DataFormat = args.format.parse()?;

    let connection_id = args
        .connection_id
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    let run_id = args.run_id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    let thread_id = args
        .thread_id
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    tracing::info!(
        connection_id = %connection_id,
        run_id = %run_id,
        format = ?format,
        "Streaming stdin through handler"
    );

    let (transport, mut rx) = ChannelTransport::new();
    let mut builder = EventHandler::builder(config.partition_identity()?)
        .bind_run(RunContext::new(thread_id, run_id, args.updated_by))
        .bind_connection(ConnectionContext::new(connection_id))
        .transport(Arc::new(transport))
        .stream_operation(config.dispatch.stream_operation.clone());
    if let Some(queue) = config.dispatch.task_queue.clone() {
        builder = builder.task_queue(queue);
    }
    let handler = builder.build()?;

    // Drain delivered invocations to stdout as NDJSON. Ends when the
    // handler (and with it the channel sender) is dropped.
    let printer = tokio::spawn(async move {
        while let Some(invocation) = rx.recv().await {
            match serde_json::to_string(&invocation) {
                Ok(line) => println!("{}", line),
                Err(e) => tracing::warn!(error = %e, "Failed to encode invocation"),
            }
        }
    });

    let suffix = args.group_suffix.as_deref();
    let mut sequencer = handler
        .sequencer(suffix)
        .context("Handler has no stream binding")?;

    for line in std::io::stdin().lock().lines() {
        let line = line.context("Failed to read stdin")?;
        handler
            .stream_chunk(sequencer.next_index(), format, &line, false, suffix)
            .await?;
    }

    // End-of-message marker after stdin closes.
    handler
        .stream_chunk(sequencer.next_index(), format, "", true, suffix)
        .await?;

    drop(handler);
    printer.await.context("Printer task panicked")?;

    Ok(())
}
