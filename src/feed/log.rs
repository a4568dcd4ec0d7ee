use crate::store::data::Message;

/// Ordered, duplicate-free message log for one channel view.
///
/// Entries stay sorted ascending by `created_at`; a tie lands after the
/// entries already holding that timestamp, so ties resolve by arrival order.
#[derive(Default)]
pub struct Log {
    inner: Vec<Message>,
}

impl Log {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one message in. A message whose id is already present is a
    /// duplicate delivery and is dropped. Returns whether the log changed.
    pub fn insert(&mut self, message: Message) -> bool {
        if self.inner.iter().any(|m| m.id == message.id) {
            return false;
        }

        let at = self
            .inner
            .partition_point(|m| m.created_at <= message.created_at);
        self.inner.insert(at, message);
        true
    }

    pub fn populate(&mut self, messages: impl IntoIterator<Item = Message>) {
        self.inner.clear();
        for message in messages {
            self.insert(message);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Message> + ExactSizeIterator {
        self.inner.iter()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
