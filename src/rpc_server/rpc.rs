use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio_stream::Stream;
use tokio_util::sync::CancellationToken;
use tonic::{Request, Response, Status, Streaming};
use tracing::{debug, info, warn};

use super::error::RpcError;
use super::worker::{Worker, WorkerCommand};
use super::RpcResult;
use crate::core::registry::ConnectionId;
use crate::proto::{self, arbiter_server::Arbiter};

pub type RpcInnerResult<T> = Result<T, RpcError>;

#[derive(Debug)]
pub struct ArbiterImpl {
    next_connection: AtomicU64,
    command_sender: UnboundedSender<Option<WorkerCommand>>,
    command_receiver: Mutex<Option<UnboundedReceiver<Option<WorkerCommand>>>>,
}

impl Default for ArbiterImpl {
    fn default() -> Self {
        let (command_sender, command_receiver) = unbounded_channel();
        Self {
            next_connection: AtomicU64::new(1),
            command_sender,
            command_receiver: Mutex::new(Some(command_receiver)),
        }
    }
}

impl Drop for ArbiterImpl {
    fn drop(&mut self) {
        if self.command_sender.send(None).is_err() {
            debug!("worker is already stopped");
        }
    }
}

impl ArbiterImpl {
    /// Spawns the task that owns the game session. Can only be called once.
    pub fn start_worker(&self, ct: CancellationToken) -> RpcInnerResult<Worker> {
        let receiver = self
            .command_receiver
            .lock()
            .map_err(|err| RpcError::internal(err.to_string()))?
            .take()
            .ok_or(RpcError::WorkerAlreadyStarted)?;
        Ok(Worker::new(self.command_sender.clone(), receiver, ct))
    }

    fn next_connection_id(&self) -> ConnectionId {
        self.next_connection.fetch_add(1, Ordering::Relaxed)
    }

    fn connect(
        &self,
        stream: Streaming<proto::ClientEvent>,
    ) -> RpcInnerResult<<Self as Arbiter>::PlayStream> {
        let id = self.next_connection_id();
        let (reply_sender, mut reply_receiver) = unbounded_channel();
        self.command_sender
            .send(Some(WorkerCommand::Connect {
                id,
                stream: Box::pin(stream),
                reply_sender,
            }))
            .map_err(|err| {
                warn!(connection = id, "failed to reach worker: {}", err);
                RpcError::WorkerDown
            })?;
        info!(connection = id, "new connection");

        let reply_stream = async_stream::stream! {
            while let Some(notification) = reply_receiver.recv().await {
                yield Ok::<_, Status>(proto::ServerEvent::from(notification));
            }
            debug!(connection = id, "reply stream finished");
        };
        Ok(Box::pin(reply_stream))
    }
}

#[tonic::async_trait]
impl Arbiter for ArbiterImpl {
    type PlayStream = Pin<Box<dyn Stream<Item = Result<proto::ServerEvent, Status>> + Send>>;

    async fn play(
        &self,
        request: Request<Streaming<proto::ClientEvent>>,
    ) -> RpcResult<Self::PlayStream> {
        debug!(remote = ?request.remote_addr(), "got Play request");
        Ok(Response::new(self.connect(request.into_inner())?))
    }
}
