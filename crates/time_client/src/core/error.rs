use crate::core::models::JsonRpcError;

/// Client-side failures while driving a tool server.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Failed to spawn server process: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("I/O error talking to server: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to encode request: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("Request {id} ({method}) timed out after {timeout_secs}s")]
    Timeout {
        id: u64,
        method: String,
        timeout_secs: u64,
    },
    #[error("Connection closed before response to request {id}")]
    ConnectionClosed { id: u64 },
    #[error("Server returned error {code}: {message}")]
    Rpc { code: i64, message: String },
    #[error("Malformed response payload: {0}")]
    MalformedResponse(String),
}

impl From<JsonRpcError> for ClientError {
    fn from(err: JsonRpcError) -> Self {
        Self::Rpc {
            code: err.code,
            message: err.message,
        }
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
