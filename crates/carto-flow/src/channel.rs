//! Forward progress events to another thread.

use carto_core::{ProgressEvent, ProgressSink};
use crossbeam_channel::{Receiver, Sender};

/// A [`ProgressSink`] that sends a copy of each event over a crossbeam
/// channel.
///
/// Used when the pass runs on a worker thread and a UI thread renders
/// progress. Events sent after the receiver is dropped are discarded.
#[derive(Clone, Debug)]
pub struct ChannelProgress {
    tx: Sender<ProgressEvent>,
}

impl ChannelProgress {
    /// Wrap an existing sender.
    pub fn new(tx: Sender<ProgressEvent>) -> Self {
        Self { tx }
    }

    /// Create a sink and the receiving end of an unbounded channel.
    pub fn unbounded() -> (Self, Receiver<ProgressEvent>) {
        let (tx, rx) = crossbeam_channel::unbounded();
        (Self { tx }, rx)
    }

    /// Create a sink over a bounded channel. A full channel blocks the
    /// integrator until the receiver catches up.
    pub fn bounded(capacity: usize) -> (Self, Receiver<ProgressEvent>) {
        let (tx, rx) = crossbeam_channel::bounded(capacity);
        (Self { tx }, rx)
    }
}

impl ProgressSink for ChannelProgress {
    fn report(&mut self, event: &ProgressEvent) {
        // A disconnected receiver means nobody is listening any more.
        let _ = self.tx.send(event.clone());
    }
}
