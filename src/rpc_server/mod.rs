mod connection;
mod error;
mod rpc;
mod worker;

use tonic::{Response, Status};
use tonic_reflection::server::{Builder, Error, ServerReflection, ServerReflectionServer};

use crate::proto::FILE_DESCRIPTOR_SET;

pub use connection::{ClientEventStream, Connection};
pub use error::RpcError;
pub use rpc::{ArbiterImpl, RpcInnerResult};
pub use worker::{Worker, WorkerCommand};

pub type RpcResult<T> = Result<Response<T>, Status>;

pub fn spec_service() -> Result<ServerReflectionServer<impl ServerReflection>, Error> {
    let spec = Builder::configure()
        .register_encoded_file_descriptor_set(FILE_DESCRIPTOR_SET)
        .build_v1()?;
    Ok(spec)
}
