//! Event channel between the pipeline and whoever is listening.

use super::{Event, SmashEvent, SmashProgress};
use crossbeam_channel::{unbounded, Receiver, Sender};

/// Sending half, shared by the producer, the workers and the progress ticker.
///
/// Sends never block and never fail: once the receiver is gone, events are
/// dropped on the floor.
#[derive(Clone)]
pub struct EventSender {
    inner: Sender<Event>,
}

impl EventSender {
    pub fn send(&self, event: Event) {
        let _ = self.inner.send(event);
    }

    /// Emit a periodic progress update
    pub fn progress(&self, files_seen: u64, elapsed_ms: u64) {
        self.send(Event::Smash(SmashEvent::Progress(SmashProgress {
            files_seen,
            elapsed_ms,
        })));
    }
}

/// Receiving half, drained by a UI thread.
pub struct EventReceiver {
    inner: Receiver<Event>,
}

impl EventReceiver {
    /// Events in order, until every sender has been dropped
    pub fn iter(&self) -> impl Iterator<Item = Event> + '_ {
        self.inner.iter()
    }
}

pub struct EventChannel;

impl EventChannel {
    /// Unbounded, so a slow listener never stalls hashing
    #[allow(clippy::new_ret_no_self)]
    pub fn new() -> (EventSender, EventReceiver) {
        let (sender, receiver) = unbounded();
        (
            EventSender { inner: sender },
            EventReceiver { inner: receiver },
        )
    }
}

/// Sender for runs nobody listens to
pub fn null_sender() -> EventSender {
    let (sender, _receiver) = EventChannel::new();
    sender
}
