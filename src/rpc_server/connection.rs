use std::ops::Deref;
use std::pin::Pin;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio_stream::{Stream, StreamExt};
use tonic::Status;
use tracing::{debug, warn};

use super::worker::WorkerCommand;
use crate::core::registry::{ConnectionId, Endpoint, EndpointClosed};
use crate::core::session::{ClientEvent, Notification};
use crate::proto;

pub type ClientEventStream =
    Pin<Box<dyn Stream<Item = Result<proto::ClientEvent, Status>> + Send + 'static>>;

#[derive(Debug)]
/// Task that reads events from the input stream and sends them to the worker
struct RequestReader(JoinHandle<()>);

impl Deref for RequestReader {
    type Target = JoinHandle<()>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl RequestReader {
    pub fn new(
        id: ConnectionId,
        mut stream: ClientEventStream,
        command_sender: UnboundedSender<Option<WorkerCommand>>,
    ) -> Self {
        let reader_task = tokio::spawn(async move {
            while let Some(res) = stream.next().await {
                let event = match res {
                    Ok(event) => ClientEvent::from(event),
                    Err(status) => {
                        warn!(connection = id, %status, "failed to read from input stream");
                        break;
                    }
                };
                if let Err(err) = command_sender.send(Some(WorkerCommand::Event { id, event })) {
                    debug!(connection = id, "worker is gone: {}", err);
                    return;
                }
            }
            let disconnect = WorkerCommand::Event {
                id,
                event: ClientEvent::Disconnect,
            };
            if let Err(err) = command_sender.send(Some(disconnect)) {
                debug!(connection = id, "failed to report disconnect: {}", err);
            }
        });
        Self(reader_task)
    }
}

/// Server side of one `Play` stream. Dropping it ends the reply stream.
#[derive(Debug)]
pub struct Connection {
    id: ConnectionId,
    reader: RequestReader,
    reply_sender: UnboundedSender<Notification>,
}

impl Connection {
    pub fn new(
        id: ConnectionId,
        stream: ClientEventStream,
        command_sender: UnboundedSender<Option<WorkerCommand>>,
        reply_sender: UnboundedSender<Notification>,
    ) -> Self {
        Self {
            id,
            reader: RequestReader::new(id, stream, command_sender),
            reply_sender,
        }
    }
}

impl Endpoint for Connection {
    fn notify(&self, notification: Notification) -> Result<(), EndpointClosed> {
        self.reply_sender
            .send(notification)
            .map_err(|_| EndpointClosed)
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        debug!(connection = self.id, "closing connection");
        self.reader.abort();
    }
}
