pub mod core;
pub mod proto;
pub mod rpc_server;
pub mod settings;
