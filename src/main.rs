use std::collections::HashSet;
use std::time::Duration;

use anyhow::Context as _;
use tokio::io::AsyncBufReadExt as _;
use uuid::Uuid;

use mentoria::{
    agenda, directory,
    feed::{Feed, SendOutcome},
    realtime,
    store::{self, data, JoinOutcome},
    study,
};

struct View {
    feed: Feed,
    subscription: realtime::Subscription,
    printed: HashSet<Uuid>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    simple_env_load::load_env_from([".dev.env", ".secrets.env"]);

    fn get(key: &str) -> String {
        std::env::var(key).unwrap_or_else(|_| panic!("'{key}' must be set"))
    }

    let store = store::Client::create(store::Config {
        base_url: get("MENTORIA_STORE_URL")
            .parse()
            .expect("'MENTORIA_STORE_URL' must be a url ending in /"),
        api_key: get("MENTORIA_STORE_KEY"),
    });

    let realtime = realtime::Client::create(realtime::Config {
        addr: get("MENTORIA_REALTIME_ADDR"),
    });

    let user_id = get("MENTORIA_USER_ID")
        .parse::<Uuid>()
        .expect("'MENTORIA_USER_ID' must be a uuid");

    let profile = store
        .profile(user_id)
        .wait()
        .await
        .flatten()
        .context("no profile for this user; finish profile setup first")?;

    if let Err(err) = directory::ensure_default_channels(&store).await {
        eprintln!("cannot seed default channels: {err}");
    }

    eprintln!(
        "signed in as {name} ({role:?})",
        name = profile.display_name,
        role = profile.role
    );
    print_help();

    let mut channel_map = directory::ChannelMap::create(store.clone());
    let mut announce = <Option<Uuid>>::None;
    let mut listing = <Vec<data::Channel>>::new();
    let mut view = <Option<View>>::None;

    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
    let mut tick = tokio::time::interval(Duration::from_millis(100));

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Ok(Some(line)) = line else { break };
                let line = line.trim().to_string();
                if line.is_empty() {
                    continue;
                }

                if let Some(command) = line.strip_prefix('/') {
                    let mut parts = command.splitn(2, char::is_whitespace);
                    let (name, rest) = (parts.next().unwrap_or_default(), parts.next().unwrap_or_default().trim());
                    match name {
                        "quit" => break,
                        "help" => print_help(),
                        "channels" => match store.channels().wait().await.context("listing was dropped").and_then(|r| r) {
                            Ok(channels) => {
                                listing = channels;
                                for (index, channel) in listing.iter().enumerate() {
                                    println!("{index}. {name} - {desc}",
                                        name = channel.name,
                                        desc = channel.description.as_deref().unwrap_or("no description"));
                                }
                            }
                            Err(err) => eprintln!("cannot list channels: {err}"),
                        },
                        "join" => {
                            let found = listing.iter()
                                .find(|channel| channel.name.eq_ignore_ascii_case(rest))
                                .map(|channel| channel.id)
                                .or_else(|| rest.parse().ok());

                            match found {
                                Some(channel_id) => {
                                    if let Err(err) = switch_channel(&store, &realtime, &mut view, channel_id, user_id).await {
                                        eprintln!("cannot join: {err}");
                                    } else {
                                        let _ = announce.replace(channel_id);
                                        let _ = channel_map.get(channel_id);
                                    }
                                }
                                None => eprintln!("unknown channel '{rest}' (try /channels first)"),
                            }
                        }
                        "leave" => {
                            if let Some(mut view) = view.take() {
                                view.subscription.cancel();
                                view.feed.detach();
                                eprintln!("left the channel");
                            }
                        }
                        "agenda" => {
                            if let Err(err) = show_agenda(&store, user_id).await {
                                eprintln!("cannot load agenda: {err}");
                            }
                        }
                        "tasks" => {
                            if let Err(err) = show_tasks(&store, &profile).await {
                                eprintln!("cannot load tasks: {err}");
                            }
                        }
                        "task" => {
                            if rest.is_empty() {
                                eprintln!("add the video link: /task <url>");
                            } else {
                                let channel_id = view.as_ref().map(|view| view.feed.channel_id());
                                match store.submit_task(user_id, rest, channel_id).wait().await.context("submit was dropped").and_then(|r| r) {
                                    Ok(()) => println!("task submitted"),
                                    Err(err) => eprintln!("cannot submit task: {err}"),
                                }
                            }
                        }
                        "correct" => {
                            if let Err(err) = correct_task(&store, user_id, rest).await {
                                eprintln!("cannot correct task: {err}");
                            }
                        }
                        "study" => {
                            if let Err(err) = study_command(&store, user_id, rest).await {
                                eprintln!("cannot update study log: {err}");
                            }
                        }
                        _ => eprintln!("unknown command '/{name}'"),
                    }
                } else if let Some(view) = &view {
                    match view.feed.send(&store, &line).await {
                        Ok(SendOutcome::Sent) => {}
                        Ok(SendOutcome::EmptyBody) => eprintln!("nothing to send"),
                        Err(err) => eprintln!("cannot send (your message was not delivered): {err}"),
                    }
                } else {
                    eprintln!("join a channel first: /channels, then /join <name>");
                }
            }

            _ = tick.tick() => {}
        }

        if let Some(view) = &mut view {
            while let Some(event) = view.subscription.poll() {
                view.feed.handle_insert(store.message_by_id(event.row_id));
            }
            if view.feed.poll() {
                render_new(view);
            }
        }

        channel_map.poll();
        if let Some(channel_id) = announce {
            if let Some(channel) = channel_map.get(channel_id) {
                eprintln!(
                    "-- {name}: {desc}",
                    name = channel.name,
                    desc = channel.description.as_deref().unwrap_or("no description")
                );
                announce = None;
            }
        }
    }

    Ok(())
}

async fn switch_channel(
    store: &store::Client,
    realtime: &realtime::Client,
    view: &mut Option<View>,
    channel_id: Uuid,
    user_id: Uuid,
) -> anyhow::Result<()> {
    if let Some(mut old) = view.take() {
        old.subscription.cancel();
        old.feed.detach();
    }

    match directory::join(store, channel_id, user_id).await? {
        JoinOutcome::Joined => eprintln!("you joined the channel"),
        JoinOutcome::AlreadyMember => {}
    }

    // the gate must pass before the feed exists
    if !directory::confirm_member(store, channel_id, user_id).await? {
        anyhow::bail!("you are not a member of this channel");
    }

    let feed = Feed::initialize(store, channel_id, user_id).await?;
    let subscription = realtime.subscribe(channel_id);

    let mut new = View {
        feed,
        subscription,
        printed: HashSet::new(),
    };
    render_new(&mut new);
    let _ = view.insert(new);

    Ok(())
}

fn render_new(view: &mut View) {
    let time_format = time::macros::format_description!("[hour]:[minute]");

    for message in view.feed.messages() {
        if !view.printed.insert(message.id) {
            continue;
        }

        let when = message.created_at.format(time_format).unwrap_or_default();
        let who = if view.feed.is_own(message) {
            "you"
        } else {
            message.author_name()
        };
        println!("[{when}] {who}: {body}", body = message.body);
    }
}

async fn show_agenda(store: &store::Client, user_id: Uuid) -> anyhow::Result<()> {
    let meetings = store
        .meetings_after(user_id, time::OffsetDateTime::now_utc())
        .wait()
        .await
        .context("agenda fetch was dropped")??;

    if meetings.is_empty() {
        println!("no upcoming meetings");
        return Ok(());
    }

    let day_format = time::macros::format_description!("[year]-[month]-[day]");
    let time_format = time::macros::format_description!("[hour]:[minute]");

    for day in agenda::group_by_day(meetings) {
        println!("{}", day.day.format(day_format).unwrap_or_default());
        for meeting in &day.meetings {
            println!(
                "  {start} - {end}  with {who}",
                start = meeting.start_at.format(time_format).unwrap_or_default(),
                end = meeting.end_at.format(time_format).unwrap_or_default(),
                who = agenda::counterpart(meeting, user_id).unwrap_or("unknown"),
            );
        }
    }

    Ok(())
}

async fn show_tasks(store: &store::Client, profile: &data::Profile) -> anyhow::Result<()> {
    let tasks = store
        .tasks_for(profile)
        .wait()
        .await
        .context("task fetch was dropped")??;

    if tasks.is_empty() {
        println!("no tasks");
        return Ok(());
    }

    for task in &tasks {
        let status = match task.status {
            data::TaskStatus::Pending => "pending",
            data::TaskStatus::Corrected => "corrected",
        };
        let student = task
            .student
            .as_ref()
            .map(|person| person.display_name.as_str())
            .unwrap_or("unknown");
        println!("{id}  [{status}] {student}: {url}", id = task.id, url = task.video_url);
        if let Some(comment) = &task.mentor_comment {
            println!("    note: {comment}");
        }
    }

    Ok(())
}

async fn correct_task(store: &store::Client, user_id: Uuid, rest: &str) -> anyhow::Result<()> {
    let mut parts = rest.splitn(2, char::is_whitespace);
    let task_id = parts
        .next()
        .unwrap_or_default()
        .parse::<Uuid>()
        .context("usage: /correct <task-id> <comment>")?;

    let comment = parts.next().unwrap_or_default().trim();
    if comment.is_empty() {
        anyhow::bail!("a correction needs a comment");
    }

    store
        .correct_task(task_id, user_id, comment)
        .wait()
        .await
        .context("correction was dropped")??;

    println!("task corrected");
    Ok(())
}

async fn study_command(store: &store::Client, user_id: Uuid, rest: &str) -> anyhow::Result<()> {
    let today = time::OffsetDateTime::now_utc().date();

    if !rest.is_empty() {
        let kind = data::StudyKind::ALL
            .into_iter()
            .find(|kind| kind.label().eq_ignore_ascii_case(rest))
            .with_context(|| format!("unknown study kind '{rest}'"))?;

        let entries = store
            .study_entries_on(user_id, today)
            .wait()
            .await
            .context("study fetch was dropped")??;

        if study::completed_on(&entries, today).contains(&kind) {
            store
                .clear_study(user_id, kind, today)
                .wait()
                .await
                .context("study delete was dropped")??;
        } else {
            store
                .log_study(user_id, kind)
                .wait()
                .await
                .context("study insert was dropped")??;
        }
    }

    // always re-read; the store is the source of truth
    let entries = store
        .study_entries_on(user_id, today)
        .wait()
        .await
        .context("study fetch was dropped")??;
    let done = study::completed_on(&entries, today);

    for kind in data::StudyKind::ALL {
        let mark = if done.contains(&kind) { "x" } else { " " };
        println!("[{mark}] {label}", label = kind.label());
    }

    Ok(())
}

fn print_help() {
    eprintln!("commands:");
    eprintln!("  /channels              list channels");
    eprintln!("  /join <name|id>        join a channel and tail its feed");
    eprintln!("  /leave                 leave the active channel view");
    eprintln!("  /agenda                upcoming meetings, grouped by day");
    eprintln!("  /tasks                 list tasks");
    eprintln!("  /task <url>            submit a task video");
    eprintln!("  /correct <id> <note>   correct a task (mentors)");
    eprintln!("  /study [kind]          show or toggle today's study log");
    eprintln!("  /quit");
    eprintln!("anything else is sent to the active channel");
}
