//! Typed change notifications for the presentation layer.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::trace;

/// A specific change observers can react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum LibraryEvent {
    /// An ingestion run finished. Sent once per run, never per file.
    LibraryChanged {
        /// Samples appended by the run.
        added: usize,
    },
    /// The active index changed; `None` means no selection.
    SelectionChanged(Option<usize>),
    /// The presentation layer should center this index.
    ScrollTo(usize),
    /// The visible page changed.
    PageChanged(usize),
}

/// Sending half of the event channel.
///
/// A sink created with [`EventSink::disconnected`] drops every event, which
/// keeps headless callers and tests free of channel plumbing.
#[derive(Debug, Clone, Default)]
pub struct EventSink {
    tx: Option<mpsc::UnboundedSender<LibraryEvent>>,
}

impl EventSink {
    /// Create a connected sink and its receiver.
    #[must_use]
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<LibraryEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx: Some(tx) }, rx)
    }

    /// A sink that discards events.
    #[must_use]
    pub const fn disconnected() -> Self {
        Self { tx: None }
    }

    /// Publish an event. A closed receiver is not an error.
    pub fn emit(&self, event: LibraryEvent) {
        trace!(?event, "emit");
        if let Some(tx) = &self.tx {
            let _ = tx.send(event);
        }
    }
}
