use uuid::Uuid;

/// A row landed in the messages table of a subscribed channel. Delivery is
/// at-least-once and carries no ordering guarantee.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RowInserted {
    pub row_id: Uuid,
    pub channel_id: Uuid,
}

#[derive(serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub(in crate::realtime) enum Frame {
    Subscribe {
        channel_id: Uuid,
        table: &'static str,
        event: &'static str,
    },
    Unsubscribe {
        channel_id: Uuid,
    },
}

#[derive(Debug, serde::Deserialize)]
pub(in crate::realtime) struct Notification {
    pub event: String,
    pub table: String,
    pub row_id: Uuid,
    pub channel_id: Uuid,
}

impl Notification {
    pub fn row_inserted(&self) -> Option<RowInserted> {
        (self.event == "insert" && self.table == "messages").then_some(RowInserted {
            row_id: self.row_id,
            channel_id: self.channel_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_insert_notification() {
        let line = r#"{
            "event": "insert",
            "table": "messages",
            "row_id": "6dfac943-22e5-4b4d-8b35-51119b5c7b07",
            "channel_id": "3f2a49a2-5ac5-4c47-a1ce-f3ad7bb46d5a"
        }"#;

        let notification = serde_json::from_str::<Notification>(line).unwrap();
        let event = notification.row_inserted().unwrap();
        assert_eq!(
            event.row_id,
            "6dfac943-22e5-4b4d-8b35-51119b5c7b07".parse::<Uuid>().unwrap()
        );
    }

    #[test]
    fn other_tables_are_ignored() {
        let line = r#"{
            "event": "insert",
            "table": "tasks",
            "row_id": "6dfac943-22e5-4b4d-8b35-51119b5c7b07",
            "channel_id": "3f2a49a2-5ac5-4c47-a1ce-f3ad7bb46d5a"
        }"#;

        let notification = serde_json::from_str::<Notification>(line).unwrap();
        assert!(notification.row_inserted().is_none());
    }
}
