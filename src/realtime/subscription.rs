use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use uuid::Uuid;

use super::{Command, RowInserted};

/// Live handle for one channel's insert events. Cancelling (or dropping) it
/// stops delivery; cancelling twice, or after the service connection has
/// already died, is fine.
pub struct Subscription {
    pub(in crate::realtime) channel_id: Uuid,
    pub(in crate::realtime) recv: UnboundedReceiver<RowInserted>,
    pub(in crate::realtime) send: Option<UnboundedSender<Command>>,
}

impl Subscription {
    pub fn poll(&mut self) -> Option<RowInserted> {
        self.recv.try_recv().ok()
    }

    /// Resolves to `None` once the subscription is cancelled or the service
    /// connection is gone.
    pub async fn next_event(&mut self) -> Option<RowInserted> {
        self.recv.recv().await
    }

    pub fn cancel(&mut self) {
        if let Some(send) = self.send.take() {
            let _ = send.send(Command::Unsubscribe {
                channel_id: self.channel_id,
            });
        }
        self.recv.close();
        // events buffered before the cancel must not leak out of poll
        while self.recv.try_recv().is_ok() {}
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel();
    }
}
