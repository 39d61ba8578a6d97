extern crate ttt_arbiter;

use std::io::BufRead;

use clap::Parser;
use tokio::sync::mpsc::{unbounded_channel, UnboundedSender};
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::{debug, warn};

use ttt_arbiter::proto::arbiter_client::ArbiterClient;
use ttt_arbiter::proto::{self, server_event::Event, ClientEvent, ProtobufError};
use ttt_arbiter::settings::{initialize_logging, ClientSettings};

/// Forwards stdin lines as events. Runs on a plain thread so a pending read
/// does not hold up runtime shutdown.
fn spawn_input_reader(sender: UnboundedSender<ClientEvent>) {
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let event = match line {
                Ok(line) if matches!(line.trim(), "q" | "resign") => ClientEvent::resign(),
                Ok(line) => ClientEvent::turn_taken(line),
                Err(err) => {
                    warn!("failed to read input: {}", err);
                    if sender.send(ClientEvent::turn_error(err.to_string())).is_err() {
                        debug!("event stream closed");
                    }
                    return;
                }
            };
            if sender.send(event).is_err() {
                debug!("event stream closed");
                return;
            }
        }
    });
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let settings = ClientSettings::parse();
    initialize_logging(settings.log_level);

    let mut client = ArbiterClient::connect(settings.server.clone()).await?;
    let (sender, receiver) = unbounded_channel();
    let mut replies = client
        .play(UnboundedReceiverStream::new(receiver))
        .await?
        .into_inner();
    spawn_input_reader(sender);

    while let Some(reply) = replies.message().await? {
        match reply.event.ok_or(ProtobufError::missing("event"))? {
            Event::Reject(proto::Reject { reason }) => {
                println!("connection refused: {}", reason);
                break;
            }
            Event::GameStart(proto::GameStart { slot }) => {
                let slot = proto::decode_slot(slot)?;
                println!("game started, you are the {} ({})", slot, slot.mark());
            }
            Event::Turn(proto::Turn { prompt }) => match prompt {
                Some(prompt) => println!("{}", prompt),
                None => println!("your turn, enter a cell 1-9 or \"q\" to resign"),
            },
            Event::MoveRejected(proto::MoveRejected { reason }) => {
                println!("move rejected: {}", reason)
            }
            Event::BoardUpdate(proto::BoardUpdate { cells }) => {
                println!("{}", proto::decode_board(&cells)?)
            }
            Event::GameOver(proto::GameOver { outcome, .. }) => {
                println!("game over: {}", outcome);
                break;
            }
        }
    }

    Ok(())
}
