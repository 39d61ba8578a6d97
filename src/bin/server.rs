extern crate ttt_arbiter;

use clap::Parser;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use ttt_arbiter::proto::arbiter_server::ArbiterServer;
use ttt_arbiter::rpc_server::{self, ArbiterImpl};
use ttt_arbiter::settings::{initialize_logging, ServerSettings};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let settings = ServerSettings::parse();
    initialize_logging(settings.log_level);
    info!("listening for connections on {}", settings.addr);

    let ct = CancellationToken::new();
    let arbiter = ArbiterImpl::default();
    let worker = arbiter.start_worker(ct.clone())?;
    let server = tokio::spawn(
        tonic::transport::Server::builder()
            .add_service(rpc_server::spec_service()?)
            .add_service(ArbiterServer::new(arbiter))
            .serve_with_shutdown(settings.addr, async move {
                if let Err(err) = worker.await {
                    error!("worker join task failed: {}", err);
                };
            }),
    );

    if let Err(err) = signal::ctrl_c().await {
        error!("unable to listen for shutdown signal: {}", err);
    }
    info!("shutting down");
    ct.cancel();
    server.await??;

    Ok(())
}
