use std::sync::Mutex;

use async_trait::async_trait;

use super::{Invocation, InvocationTransport, TransportError};

/// Transport stub that records every invocation in submit order.
///
/// Used by the test suites to observe exactly what the dispatch core emits:
/// targets, ordering keys, params augmentation, and chunk order. Can be
/// armed to reject submissions for failure-propagation tests.
#[derive(Default)]
pub struct RecordingTransport {
    invocations: Mutex<Vec<Invocation>>,
    reject_with: Mutex<Option<String>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything recorded so far, in submit order.
    pub fn recorded(&self) -> Vec<Invocation> {
        self.invocations.lock().expect("recording mutex poisoned").clone()
    }

    pub fn count(&self) -> usize {
        self.invocations.lock().expect("recording mutex poisoned").len()
    }

    /// Reject all subsequent submissions with the given reason.
    pub fn reject_with(&self, reason: &str) {
        *self.reject_with.lock().expect("recording mutex poisoned") = Some(reason.to_string());
    }
}

#[async_trait]
impl InvocationTransport for RecordingTransport {
    async fn invoke(&self, invocation: Invocation) -> Result<(), TransportError> {
        if let Some(reason) = self
            .reject_with
            .lock()
            .expect("recording mutex poisoned")
            .clone()
        {
            return Err(TransportError::Rejected(reason));
        }
        self.invocations
            .lock()
            .expect("recording mutex poisoned")
            .push(invocation);
        Ok(())
    }
}
