use tonic::Status;

#[derive(thiserror::Error, Debug)]
pub enum RpcError {
    #[error("worker is not running")]
    WorkerDown,
    #[error("worker is already started")]
    WorkerAlreadyStarted,
    #[error("internal error: {reason}")]
    Internal { reason: String },
}

impl From<RpcError> for Status {
    fn from(value: RpcError) -> Self {
        match value {
            RpcError::WorkerDown => Status::unavailable(value.to_string()),
            RpcError::WorkerAlreadyStarted | RpcError::Internal { .. } => {
                Status::internal(value.to_string())
            }
        }
    }
}

impl RpcError {
    pub fn internal(reason: impl Into<String>) -> Self {
        Self::Internal {
            reason: reason.into(),
        }
    }
}
