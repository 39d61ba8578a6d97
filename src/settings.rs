use std::net::SocketAddr;

use clap::Parser;
use tracing_subscriber::filter::{LevelFilter, Targets};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

pub const DEFAULT_SERVER_ADDRESS: &str = "[::1]:50051";
pub const DEFAULT_SERVER_URL: &str = "http://[::1]:50051";

#[derive(Debug, Parser)]
#[command(name = "ttt-server", about = "Hosts a single two-player tic-tac-toe game")]
pub struct ServerSettings {
    /// Address to listen on
    #[arg(short, long, env = "TTT_ADDR", default_value = DEFAULT_SERVER_ADDRESS)]
    pub addr: SocketAddr,

    /// A log level among "off", "error", "warn", "info", "debug", "trace"
    #[arg(short, long, env = "TTT_LOG_LEVEL", default_value = "info")]
    pub log_level: LevelFilter,
}

#[derive(Debug, Parser)]
#[command(name = "ttt-client", about = "Plays tic-tac-toe against another player")]
pub struct ClientSettings {
    /// Server to connect to
    #[arg(short, long, env = "TTT_SERVER_URL", default_value = DEFAULT_SERVER_URL)]
    pub server: String,

    /// A log level among "off", "error", "warn", "info", "debug", "trace"
    #[arg(short, long, env = "TTT_LOG_LEVEL", default_value = "warn")]
    pub log_level: LevelFilter,
}

pub fn initialize_logging(level: LevelFilter) {
    let format = tracing_subscriber::fmt::format()
        .with_target(false)
        .compact();

    let filter = Targets::new().with_default(level);

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().event_format(format))
        .with(filter)
        .init();
}
