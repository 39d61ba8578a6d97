use std::future::{Future, IntoFuture};

use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::connection::{ClientEventStream, Connection};
use crate::core::registry::{ConnectionId, SessionRegistry};
use crate::core::session::{ClientEvent, Notification};

pub enum WorkerCommand {
    /// New `Play` stream asking for a slot.
    Connect {
        id: ConnectionId,
        stream: ClientEventStream,
        reply_sender: UnboundedSender<Notification>,
    },
    Event {
        id: ConnectionId,
        event: ClientEvent,
    },
}

impl std::fmt::Debug for WorkerCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WorkerCommand::Connect { id, .. } => {
                f.debug_struct("Connect").field("id", id).finish()
            }
            WorkerCommand::Event { id, event } => f
                .debug_struct("Event")
                .field("id", id)
                .field("event", event)
                .finish(),
        }
    }
}

/// Single task that owns the [`SessionRegistry`], so events are handled one at a time.
pub struct Worker(JoinHandle<()>);

impl IntoFuture for Worker {
    type Output = <JoinHandle<()> as Future>::Output;
    type IntoFuture = JoinHandle<()>;

    fn into_future(self) -> Self::IntoFuture {
        self.0.into_future()
    }
}

impl Worker {
    pub fn new(
        command_sender: UnboundedSender<Option<WorkerCommand>>,
        mut command_receiver: UnboundedReceiver<Option<WorkerCommand>>,
        ct: CancellationToken,
    ) -> Self {
        let worker = tokio::spawn(async move {
            let mut registry = SessionRegistry::<Connection>::default();
            loop {
                let command = tokio::select! {
                    _ = ct.cancelled() => {
                        info!("worker: cancelled");
                        break;
                    }
                    command = command_receiver.recv() => command,
                };
                let Some(Some(command)) = command else {
                    info!("worker: no more commands");
                    break;
                };
                match command {
                    WorkerCommand::Connect {
                        id,
                        stream,
                        reply_sender,
                    } => {
                        // reader starts here so its events always follow the connect
                        let conn =
                            Connection::new(id, stream, command_sender.clone(), reply_sender);
                        match registry.connect(id, conn) {
                            Ok(assignment) => debug!(
                                connection = id,
                                slot = %assignment.slot,
                                mark = %assignment.mark,
                                "slot assigned"
                            ),
                            Err(rejection) => debug!(connection = id, %rejection, "slot refused"),
                        }
                    }
                    WorkerCommand::Event { id, event } => registry.handle(id, event),
                }
            }
        });
        Self(worker)
    }
}
