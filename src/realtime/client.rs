use tokio::sync::mpsc::unbounded_channel;
use uuid::Uuid;

use super::{Command, Config, Subscription};

/// Connection to the change notification service. One spawned task owns the
/// socket; handles talk to it over a command channel.
#[derive(Clone)]
pub struct Client {
    send: tokio::sync::mpsc::UnboundedSender<Command>,
}

impl Client {
    pub fn create(config: Config) -> Self {
        let (send, recv) = unbounded_channel();
        tokio::spawn(super::run(config, recv));
        Self { send }
    }

    pub fn subscribe(&self, channel_id: Uuid) -> Subscription {
        let (sink, recv) = unbounded_channel();
        let _ = self.send.send(Command::Subscribe { channel_id, sink });
        Subscription {
            channel_id,
            recv,
            send: Some(self.send.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscription_ends_when_the_service_is_unreachable() {
        let client = Client::create(Config {
            addr: "127.0.0.1:1".to_string(),
        });

        let mut subscription = client.subscribe(Uuid::new_v4());
        assert_eq!(subscription.next_event().await, None);
    }

    #[tokio::test]
    async fn cancel_is_idempotent() {
        let client = Client::create(Config {
            addr: "127.0.0.1:1".to_string(),
        });

        let mut subscription = client.subscribe(Uuid::new_v4());
        subscription.cancel();
        subscription.cancel();
        assert_eq!(subscription.poll(), None);
    }

    #[tokio::test]
    async fn cancel_discards_buffered_events() {
        let channel_id = Uuid::new_v4();
        let (sink, recv) = unbounded_channel();
        let (send, _commands) = unbounded_channel();
        let mut subscription = Subscription {
            channel_id,
            recv,
            send: Some(send),
        };

        sink.send(crate::realtime::RowInserted {
            row_id: Uuid::new_v4(),
            channel_id,
        })
        .unwrap();

        subscription.cancel();
        assert_eq!(subscription.poll(), None);
        assert_eq!(subscription.next_event().await, None);
    }
}
