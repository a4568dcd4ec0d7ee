use anyhow::Context as _;
use uuid::Uuid;

use crate::{
    resolver::ResolverMap,
    store::{self, data::Channel, JoinOutcome},
};

pub const DEFAULT_CHANNELS: [&str; 3] = ["Open Chat", "Questions", "Study Hall"];

/// Names from [`DEFAULT_CHANNELS`] that don't exist yet.
pub fn missing_defaults(existing: &[Channel]) -> Vec<&'static str> {
    DEFAULT_CHANNELS
        .into_iter()
        .filter(|name| !existing.iter().any(|channel| channel.name == *name))
        .collect()
}

/// Seed the stock channels on first use. Safe to call on every startup.
pub async fn ensure_default_channels(store: &store::Client) -> anyhow::Result<()> {
    let existing = store
        .channels()
        .wait()
        .await
        .context("channel list fetch was dropped")??;

    for name in missing_defaults(&existing) {
        let description = format!("Channel for {}", name.to_lowercase());
        store
            .create_channel(name, &description)
            .wait()
            .await
            .context("channel insert was dropped")??;
    }

    Ok(())
}

pub async fn join(
    store: &store::Client,
    channel_id: Uuid,
    user_id: Uuid,
) -> anyhow::Result<JoinOutcome> {
    store
        .join_channel(channel_id, user_id)
        .wait()
        .await
        .context("membership insert was dropped")?
}

/// The membership gate. A channel view must not be constructed unless this
/// came back true.
pub async fn confirm_member(
    store: &store::Client,
    channel_id: Uuid,
    user_id: Uuid,
) -> anyhow::Result<bool> {
    store
        .membership(channel_id, user_id)
        .wait()
        .await
        .context("membership probe was dropped")?
}

/// Lazy id -> channel cache; a miss schedules one point lookup.
pub struct ChannelMap {
    map: ResolverMap<Uuid, Channel, Option<Channel>>,
    store: store::Client,
}

impl ChannelMap {
    pub fn create(store: store::Client) -> Self {
        Self {
            map: ResolverMap::new(),
            store,
        }
    }

    pub fn get(&mut self, id: Uuid) -> Option<&Channel> {
        self.map.get_or_update(&id, |&id| self.store.channel_by_id(id))
    }

    pub fn poll(&mut self) {
        self.map.poll(|entry, channel| {
            if let Some(channel) = channel {
                entry.set(channel.id, channel);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;

    fn channel(name: &str) -> Channel {
        Channel {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: None,
            created_at: datetime!(2024-01-01 00:00 UTC),
        }
    }

    #[test]
    fn missing_defaults_is_a_set_difference() {
        let existing = [channel("Questions"), channel("Jam Sessions")];
        assert_eq!(missing_defaults(&existing), ["Open Chat", "Study Hall"]);
    }

    #[test]
    fn nothing_missing_when_all_exist() {
        let existing = DEFAULT_CHANNELS.map(channel);
        assert!(missing_defaults(&existing).is_empty());
    }
}
