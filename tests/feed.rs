use time::macros::datetime;
use uuid::Uuid;

use mentoria::{
    feed::{Feed, SendOutcome},
    resolver::Fut,
    store::{
        self,
        data::{Author, Message},
    },
};

fn message(at: time::OffsetDateTime, body: &str) -> Message {
    Message {
        id: Uuid::new_v4(),
        channel_id: Uuid::nil(),
        author_id: Uuid::new_v4(),
        body: body.to_string(),
        created_at: at,
        author: Some(Author {
            display_name: "ana".to_string(),
            avatar_url: None,
        }),
    }
}

fn bodies(feed: &Feed) -> Vec<String> {
    feed.messages().map(|m| m.body.clone()).collect()
}

fn drain(feed: &mut Feed) {
    // completion order is up to the runtime; spin until nothing is in flight
    for _ in 0..100 {
        feed.poll();
        std::thread::yield_now();
    }
}

#[tokio::test]
async fn late_notification_lands_between_fetched_messages() {
    let mut feed = Feed::create(Uuid::new_v4(), Uuid::new_v4());
    feed.populate([
        message(datetime!(2024-03-01 09:00 UTC), "a"),
        message(datetime!(2024-03-01 09:05 UTC), "b"),
    ]);

    feed.handle_insert(Fut::ready(Some(message(
        datetime!(2024-03-01 09:03 UTC),
        "c",
    ))));
    assert!(feed.poll());

    assert_eq!(bodies(&feed), ["a", "c", "b"]);
}

#[tokio::test]
async fn at_least_once_delivery_appends_once() {
    let mut feed = Feed::create(Uuid::new_v4(), Uuid::new_v4());
    let d = message(datetime!(2024-03-01 10:00 UTC), "d");

    feed.handle_insert(Fut::ready(Some(d.clone())));
    feed.handle_insert(Fut::ready(Some(d)));
    feed.poll();

    assert_eq!(bodies(&feed), ["d"]);
}

#[tokio::test]
async fn reapplying_an_event_changes_nothing() {
    let mut feed = Feed::create(Uuid::new_v4(), Uuid::new_v4());
    let d = message(datetime!(2024-03-01 10:00 UTC), "d");

    feed.handle_insert(Fut::ready(Some(d.clone())));
    feed.poll();
    let once = bodies(&feed);

    feed.handle_insert(Fut::ready(Some(d)));
    assert!(!feed.poll());
    assert_eq!(bodies(&feed), once);
}

#[tokio::test]
async fn lookups_resolving_out_of_order_still_sort() {
    let mut feed = Feed::create(Uuid::new_v4(), Uuid::new_v4());

    let early = message(datetime!(2024-03-01 08:00 UTC), "early");
    let late = message(datetime!(2024-03-01 08:30 UTC), "late");

    // the later message's lookup completes first
    let slow = Fut::spawn(async move {
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        Some(early)
    });
    feed.handle_insert(slow);
    feed.handle_insert(Fut::ready(Some(late)));

    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    drain(&mut feed);

    assert_eq!(bodies(&feed), ["early", "late"]);
}

#[tokio::test]
async fn failed_lookup_is_a_dropped_event() {
    let mut feed = Feed::create(Uuid::new_v4(), Uuid::new_v4());
    feed.populate([message(datetime!(2024-03-01 09:00 UTC), "a")]);

    feed.handle_insert(Fut::ready(None));
    feed.poll();

    assert_eq!(bodies(&feed), ["a"]);
}

// nothing listens here; every request comes back an error
fn unreachable_store() -> store::Client {
    store::Client::create(store::Config {
        base_url: "http://127.0.0.1:1/".parse().unwrap(),
        api_key: "test".to_string(),
    })
}

#[tokio::test]
async fn failed_initial_load_surfaces_and_leaves_no_feed() {
    let result = Feed::initialize(&unreachable_store(), Uuid::new_v4(), Uuid::new_v4()).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn failed_send_surfaces_and_appends_nothing() {
    let feed = Feed::create(Uuid::new_v4(), Uuid::new_v4());

    let result = feed.send(&unreachable_store(), "hello").await;
    assert!(result.is_err());
    assert_eq!(feed.messages().len(), 0);
}

#[tokio::test]
async fn whitespace_send_never_reaches_the_network() {
    let store = unreachable_store();

    let feed = Feed::create(Uuid::new_v4(), Uuid::new_v4());
    let outcome = feed.send(&store, "  ").await.unwrap();

    assert_eq!(outcome, SendOutcome::EmptyBody);
    assert_eq!(feed.messages().len(), 0);
}

#[tokio::test]
async fn detach_stops_all_log_mutation() {
    let mut feed = Feed::create(Uuid::new_v4(), Uuid::new_v4());
    feed.populate([message(datetime!(2024-03-01 09:00 UTC), "a")]);

    // in flight at teardown time
    feed.handle_insert(Fut::ready(Some(message(
        datetime!(2024-03-01 09:01 UTC),
        "stale",
    ))));
    feed.detach();
    feed.detach();

    // arrives after teardown
    feed.handle_insert(Fut::ready(Some(message(
        datetime!(2024-03-01 09:02 UTC),
        "later",
    ))));

    assert!(!feed.poll());
    assert_eq!(bodies(&feed), ["a"]);
}
