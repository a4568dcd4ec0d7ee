use std::collections::HashMap;

use tokio::{
    io::{AsyncBufReadExt, AsyncWrite, AsyncWriteExt},
    sync::mpsc::{UnboundedReceiver, UnboundedSender},
};
use uuid::Uuid;

use crate::util::{select2, Either};

use events::{Frame, Notification};

#[derive(Clone)]
pub struct Config {
    pub addr: String,
}

pub(in crate::realtime) enum Command {
    Subscribe {
        channel_id: Uuid,
        sink: UnboundedSender<RowInserted>,
    },
    Unsubscribe {
        channel_id: Uuid,
    },
}

async fn run(config: Config, mut commands: UnboundedReceiver<Command>) {
    let mut sinks = <HashMap<Uuid, UnboundedSender<RowInserted>>>::new();

    let mut stream = match tokio::net::TcpStream::connect(&config.addr).await {
        Ok(stream) => stream,
        Err(err) => {
            eprintln!("cannot reach notification service: {err}");
            return;
        }
    };

    let (stream_read, mut stream_write) = stream.split();
    let mut reader = tokio::io::BufReader::new(stream_read).lines();

    loop {
        let mut command_fut = std::pin::pin!(commands.recv());
        let mut line_fut = std::pin::pin!(reader.next_line());

        match select2(&mut command_fut, &mut line_fut).await {
            Either::Left(Some(Command::Subscribe { channel_id, sink })) => {
                sinks.insert(channel_id, sink);
                let frame = Frame::Subscribe {
                    channel_id,
                    table: "messages",
                    event: "insert",
                };
                if let Err(err) = write_frame(&frame, &mut stream_write).await {
                    eprintln!("cannot write to notification service: {err}");
                    break;
                }
            }

            Either::Left(Some(Command::Unsubscribe { channel_id })) => {
                sinks.remove(&channel_id);
                let frame = Frame::Unsubscribe { channel_id };
                if let Err(err) = write_frame(&frame, &mut stream_write).await {
                    eprintln!("cannot write to notification service: {err}");
                    break;
                }
            }

            // every handle is gone
            Either::Left(None) => break,

            Either::Right(Ok(Some(line))) => {
                let notification = match serde_json::from_str::<Notification>(&line) {
                    Ok(notification) => notification,
                    Err(err) => {
                        eprintln!("cannot parse '{}': {err}", line.escape_debug());
                        continue;
                    }
                };

                let Some(event) = notification.row_inserted() else { continue };

                let gone = sinks
                    .get(&event.channel_id)
                    .is_some_and(|sink| sink.send(event).is_err());
                if gone {
                    sinks.remove(&event.channel_id);
                }
            }

            Either::Right(..) => {
                eprintln!("notification stream closed");
                break;
            }
        }
    }
}

async fn write_frame(
    frame: &Frame,
    w: &mut (impl AsyncWrite + Unpin + Send + Sync),
) -> anyhow::Result<()> {
    let mut line = serde_json::to_vec(frame)?;
    line.push(b'\n');
    w.write_all(&line).await?;
    w.flush().await?;
    Ok(())
}

mod events;
pub use events::RowInserted;

mod subscription;
pub use subscription::Subscription;

mod client;
pub use client::Client;
