use anyhow::Context as _;
use uuid::Uuid;

use crate::{
    resolver::Fut,
    store::{self, data::Message},
};

mod log;
pub use log::Log;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SendOutcome {
    Sent,
    /// The body was empty after trimming. Nothing was sent.
    EmptyBody,
}

/// Live message feed for one channel view.
///
/// Seeded by one bulk read, then kept current by insert notifications: each
/// notification's point lookup is handed in via [`handle_insert`] and folded
/// into the log by [`poll`] whenever it completes, in whatever order the
/// lookups finish. A sent message is never appended locally; it comes back
/// through the subscription like everyone else's.
///
/// [`handle_insert`]: Self::handle_insert
/// [`poll`]: Self::poll
pub struct Feed {
    channel_id: Uuid,
    user_id: Uuid,
    log: Log,
    pending: Vec<Fut<Option<Message>>>,
    live: bool,
}

impl Feed {
    pub fn create(channel_id: Uuid, user_id: Uuid) -> Self {
        Self {
            channel_id,
            user_id,
            log: Log::new(),
            pending: Vec::new(),
            live: true,
        }
    }

    /// Builds the feed from the channel's full history. The caller is
    /// expected to have passed the membership gate already.
    pub async fn initialize(
        store: &store::Client,
        channel_id: Uuid,
        user_id: Uuid,
    ) -> anyhow::Result<Self> {
        let history = store
            .channel_messages(channel_id)
            .wait()
            .await
            .context("history fetch was dropped")??;

        let mut feed = Self::create(channel_id, user_id);
        feed.populate(history);
        Ok(feed)
    }

    /// Replace the log wholesale with a fresh bulk read.
    pub fn populate(&mut self, messages: impl IntoIterator<Item = Message>) {
        self.log.populate(messages);
    }

    pub const fn channel_id(&self) -> Uuid {
        self.channel_id
    }

    /// Track the point lookup for a notified row. Ignored once detached.
    pub fn handle_insert(&mut self, lookup: Fut<Option<Message>>) {
        if !self.live {
            return;
        }
        self.pending.push(lookup);
    }

    /// Fold completed lookups into the log. Returns whether the log changed.
    pub fn poll(&mut self) -> bool {
        let mut changed = false;
        let (log, live) = (&mut self.log, self.live);

        self.pending.retain_mut(|lookup| {
            let Some(found) = lookup.try_resolve() else { return true };
            if live {
                if let Some(message) = found {
                    changed |= log.insert(message);
                }
            }
            false
        });

        changed
    }

    /// One insert, no local append. A whitespace-only body never reaches the
    /// network.
    pub async fn send(&self, store: &store::Client, body: &str) -> anyhow::Result<SendOutcome> {
        let body = body.trim();
        if body.is_empty() {
            return Ok(SendOutcome::EmptyBody);
        }

        store
            .insert_message(self.channel_id, self.user_id, body)
            .wait()
            .await
            .context("send was dropped")??;

        Ok(SendOutcome::Sent)
    }

    /// Teardown. No further log mutation happens after this returns; lookups
    /// still in flight are discarded when they complete. Callable repeatedly.
    pub fn detach(&mut self) {
        self.live = false;
        self.pending.clear();
    }

    pub fn is_own(&self, message: &Message) -> bool {
        message.author_id == self.user_id
    }

    pub fn messages(&self) -> impl Iterator<Item = &Message> + ExactSizeIterator {
        self.log.iter()
    }
}
