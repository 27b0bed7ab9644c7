//! Invocation transport seam.
//!
//! This module contains:
//! - `Invocation`: one fire-and-forget unit handed to the transport
//! - `InvocationTransport` trait: the external delivery collaborator
//! - Implementations: in-memory channel, recording stub for tests
//!
//! The transport owns delivery, retry, and backoff. This core only promises
//! that invocations sharing an ordering key are *submitted* in call order;
//! a conforming transport preserves that order per key on the way out.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod channel;
pub mod mock;

pub use channel::ChannelTransport;
pub use mock::RecordingTransport;

/// Errors surfaced synchronously by a transport submission.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("invocation channel closed: receiver dropped")]
    ChannelClosed,
    #[error("transport rejected invocation: {0}")]
    Rejected(String),
}

/// How an invocation is executed. Only fire-and-forget exists in this core:
/// the caller never awaits a response payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum InvocationMode {
    #[default]
    Event,
}

/// One outbound asynchronous invocation.
///
/// `target` is the resolved routing key, `ordering_key` scopes the FIFO
/// guarantee, and `queue` optionally selects a named task queue at the
/// transport. Built only by the dispatcher; adapters never construct these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invocation {
    pub target: String,
    pub operation: String,
    pub params: serde_json::Map<String, serde_json::Value>,
    pub mode: InvocationMode,
    pub ordering_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub queue: Option<String>,
}

/// Interface to the external invocation service.
///
/// `invoke` submits one fire-and-forget invocation and returns as soon as the
/// transport has accepted it; there is no response channel. A synchronous
/// error (malformed request, closed connection) is the only failure this
/// core ever sees — anything later is the transport's problem.
#[async_trait]
pub trait InvocationTransport: Send + Sync {
    async fn invoke(&self, invocation: Invocation) -> Result<(), TransportError>;
}
