use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::debug;

use super::{Invocation, InvocationTransport, TransportError};

/// In-memory transport over an unbounded mpsc channel.
///
/// Submission never blocks (fire-and-forget); the embedding process owns the
/// receiving half and drains it however it likes. A single queue preserves
/// total submit order, which is strictly stronger than the per-ordering-key
/// FIFO the contract requires.
pub struct ChannelTransport {
    tx: mpsc::UnboundedSender<Invocation>,
}

impl ChannelTransport {
    /// Create a transport and hand back the receiving half.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Invocation>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

#[async_trait]
impl InvocationTransport for ChannelTransport {
    async fn invoke(&self, invocation: Invocation) -> Result<(), TransportError> {
        debug!(
            target_key = %invocation.target,
            operation = %invocation.operation,
            ordering_key = %invocation.ordering_key,
            "Queueing invocation"
        );
        self.tx
            .send(invocation)
            .map_err(|_| TransportError::ChannelClosed)
    }
}
