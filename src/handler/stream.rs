//! Stream sequencing and chunk encoding.
//!
//! Output streamed to a live connection is cut into indexed chunks. All
//! chunks that belong to one logical message share an ordering key
//! (`{connection_id}-{run_id}` plus an optional group suffix) and must be
//! reassembled by consumers in `index` order within that key.

use serde::{Deserialize, Serialize};

/// Encoding of the payload carried by a stream chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DataFormat {
    #[default]
    Text,
    Xml,
    Json,
}

impl std::str::FromStr for DataFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(DataFormat::Text),
            "xml" => Ok(DataFormat::Xml),
            "json" => Ok(DataFormat::Json),
            _ => anyhow::bail!("Unknown data format: {} (expected text, xml, or json)", s),
        }
    }
}

/// One unit of streamed output, in the wire shape delivered to the
/// connection-bridging function.
///
/// Field names are the stream contract; consumers match on them literally.
/// The group suffix participates in the ordering key only and is never part
/// of this record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamChunk {
    pub message_group_id: String,
    pub data_format: DataFormat,
    pub index: u64,
    pub chunk_delta: String,
    pub is_message_end: bool,
}

/// Compose the FIFO ordering key for a connection/run pair.
///
/// `"{connection_id}-{run_id}"`, extended to
/// `"{connection_id}-{run_id}-{suffix}"` when a group suffix splits one
/// connection into independent logical streams.
pub fn ordering_key(connection_id: &str, run_id: &str, suffix: Option<&str>) -> String {
    match suffix {
        Some(suffix) if !suffix.is_empty() => format!("{connection_id}-{run_id}-{suffix}"),
        _ => format!("{connection_id}-{run_id}"),
    }
}

/// Hands out densely increasing chunk indices for one ordering key.
///
/// Adapters create one sequencer per logical stream and feed its indices to
/// `stream_chunk`; the core itself never renumbers chunks.
#[derive(Debug, Clone)]
pub struct StreamSequencer {
    key: String,
    next: u64,
}

impl StreamSequencer {
    pub fn new(connection_id: &str, run_id: &str) -> Self {
        Self::with_suffix(connection_id, run_id, None)
    }

    pub fn with_suffix(connection_id: &str, run_id: &str, suffix: Option<&str>) -> Self {
        Self {
            key: ordering_key(connection_id, run_id, suffix),
            next: 0,
        }
    }

    pub fn ordering_key(&self) -> &str {
        &self.key
    }

    /// The index for the next chunk. Each call advances the counter.
    pub fn next_index(&mut self) -> u64 {
        let index = self.next;
        self.next += 1;
        index
    }
}

// ─── JSON Delta Accumulation ─────────────────────────────────────

/// Closing sequences probed when deciding whether a partial JSON document
/// could be completed. Covers the nesting depths seen in practice for
/// streamed tool arguments and structured output.
const CLOSING_CANDIDATES: [&str; 5] = ["}", "]", "}]", "}]}", "}}"];

/// Accumulates streamed JSON fragments and releases them only at points
/// where the document so far is well formed.
///
/// Providers emit JSON output in arbitrary slices; forwarding a slice that
/// cuts a token in half makes the partial document unparseable for
/// consumers that re-validate as they render. The buffer holds deltas back
/// until the validated prefix plus the pending text either parses as-is or
/// parses once one of the candidate closings is appended, then hands the
/// pending text back for streaming.
#[derive(Debug, Default)]
pub struct JsonDeltaBuffer {
    validated: String,
    pending: String,
}

impl JsonDeltaBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a delta. Returns the accumulated pending text when it is safe
    /// to stream, `None` while the document is still at an unparseable cut.
    pub fn push(&mut self, delta: &str) -> Option<String> {
        self.pending.push_str(delta);

        let combined = format!("{}{}", self.validated, self.pending);
        if !completes(&combined) {
            return None;
        }

        let released = std::mem::take(&mut self.pending);
        self.validated.push_str(&released);
        Some(released)
    }

    /// Any text still held back (e.g. at end of stream).
    pub fn pending(&self) -> &str {
        &self.pending
    }

    /// Drain whatever is still buffered, regardless of validity. Used for
    /// the final flush when the provider signals end of message.
    pub fn take_pending(&mut self) -> String {
        let released = std::mem::take(&mut self.pending);
        self.validated.push_str(&released);
        released
    }
}

/// True if `fragment` parses as JSON, either as-is or after appending one of
/// the candidate closing sequences.
fn completes(fragment: &str) -> bool {
    if serde_json::from_str::<serde_json::Value>(fragment).is_ok() {
        return true;
    }
    CLOSING_CANDIDATES.iter().any(|ending| {
        serde_json::from_str::<serde_json::Value>(&format!("{fragment}{ending}")).is_ok()
    })
}
