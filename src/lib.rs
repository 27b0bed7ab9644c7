//! Relay — partitioned dispatch core for LLM event handlers.
//!
//! Relay sits between provider adapters (the code that talks to a vendor LLM
//! SDK) and a partitioned invocation transport (a Lambda-like function
//! invocation service, a message bus, or an in-process channel). It owns the
//! three things that actually have invariants:
//!
//! 1. **Identity** — how a platform identifier and an optional business
//!    partition compose into a single routing key
//!    ([`handler::identity::PartitionIdentity`]).
//! 2. **Ordering** — how persistence operations for a run, and output chunks
//!    for a live connection, get FIFO ordering keys
//!    ([`handler::stream::StreamSequencer`]).
//! 3. **Dispatch** — the single choke point that turns a named operation plus
//!    parameters into one fire-and-forget invocation
//!    ([`dispatch::OperationDispatcher`]).
//!
//! Adapters hold an [`handler::EventHandler`] and call exactly two
//! capabilities: `invoke_async_operation` (persist state asynchronously) and
//! `stream_chunk` (deliver incremental output). They never see routing keys
//! or build invocations themselves, which is what lets the key scheme evolve
//! without touching adapter code.

pub mod dispatch;
pub mod handler;
pub mod transport;
