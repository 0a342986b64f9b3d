use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};

use tokio::task::JoinHandle;

use crate::error::{PublishError, PublishFailure};
use crate::event::EventKind;

/// Lifecycle of a single publish call.
///
/// `Created → Serializing → Dispatched → Succeeded | Failed`. Both final
/// states are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishState {
    Created,
    Serializing,
    Dispatched,
    Succeeded,
    Failed,
}

impl PublishState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, PublishState::Succeeded | PublishState::Failed)
    }

    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => PublishState::Created,
            1 => PublishState::Serializing,
            2 => PublishState::Dispatched,
            3 => PublishState::Succeeded,
            _ => PublishState::Failed,
        }
    }
}

impl fmt::Display for PublishState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PublishState::Created => "created",
            PublishState::Serializing => "serializing",
            PublishState::Dispatched => "dispatched",
            PublishState::Succeeded => "succeeded",
            PublishState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Per-call state shared between the caller's handle and the send task.
#[derive(Debug, Clone)]
pub(crate) struct StateCell(Arc<AtomicU8>);

impl StateCell {
    pub(crate) fn new() -> Self {
        Self(Arc::new(AtomicU8::new(PublishState::Created as u8)))
    }

    pub(crate) fn get(&self) -> PublishState {
        PublishState::from_u8(self.0.load(Ordering::Acquire))
    }

    /// Move forward. Terminal states are never left.
    pub(crate) fn advance(&self, next: PublishState) {
        let _ = self
            .0
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                if PublishState::from_u8(current).is_terminal() {
                    None
                } else {
                    Some(next as u8)
                }
            });
    }
}

/// Successful publish: where the broker stored the event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishReceipt {
    pub topic: String,
    pub key: String,
    pub partition: i32,
    pub offset: i64,
}

enum Inner {
    Ready(Option<Result<PublishReceipt, PublishError>>),
    Dispatched(JoinHandle<Result<PublishReceipt, PublishError>>),
}

/// Outcome of a publish call that has already been handed to the broker.
///
/// Await it for the result. Dropping it does not cancel the send.
pub struct PublishHandle {
    topic: String,
    kind: EventKind,
    state: StateCell,
    inner: Inner,
}

impl PublishHandle {
    pub(crate) fn failed(topic: String, kind: EventKind, state: StateCell, err: PublishError) -> Self {
        state.advance(PublishState::Failed);
        Self {
            topic,
            kind,
            state,
            inner: Inner::Ready(Some(Err(err))),
        }
    }

    pub(crate) fn dispatched(
        topic: String,
        kind: EventKind,
        state: StateCell,
        join: JoinHandle<Result<PublishReceipt, PublishError>>,
    ) -> Self {
        Self {
            topic,
            kind,
            state,
            inner: Inner::Dispatched(join),
        }
    }

    /// Destination topic of this publish.
    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }

    pub fn state(&self) -> PublishState {
        self.state.get()
    }

    /// Whether the result is available without waiting.
    pub fn is_finished(&self) -> bool {
        match &self.inner {
            Inner::Ready(_) => true,
            Inner::Dispatched(join) => join.is_finished(),
        }
    }

    fn aborted(&self, reason: String) -> PublishError {
        PublishError::new(self.topic.clone(), self.kind.name(), PublishFailure::Aborted(reason))
    }
}

impl fmt::Debug for PublishHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PublishHandle")
            .field("topic", &self.topic)
            .field("kind", &self.kind.name())
            .field("state", &self.state())
            .finish()
    }
}

impl Future for PublishHandle {
    type Output = Result<PublishReceipt, PublishError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        match &mut this.inner {
            Inner::Ready(slot) => match slot.take() {
                Some(result) => Poll::Ready(result),
                None => Poll::Ready(Err(this.aborted("handle polled after completion".to_string()))),
            },
            Inner::Dispatched(join) => match Pin::new(join).poll(cx) {
                Poll::Pending => Poll::Pending,
                Poll::Ready(Ok(result)) => Poll::Ready(result),
                Poll::Ready(Err(join_err)) => {
                    this.state.advance(PublishState::Failed);
                    tracing::error!(topic = %this.topic, kind = %this.kind, error = %join_err, "publish task did not complete");
                    Poll::Ready(Err(this.aborted(join_err.to_string())))
                }
            },
        }
    }
}
