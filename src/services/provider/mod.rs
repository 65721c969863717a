use thiserror::Error;

use alloy::transports::RpcError;

pub mod evm;
pub use evm::*;

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Network configuration error: {0}")]
    NetworkConfiguration(String),
    #[error("Request timeout")]
    Timeout,
    #[error("JSON-RPC error (code {code}): {message}")]
    RpcErrorCode { code: i64, message: String },
    #[error("Transport error: {0}")]
    TransportError(String),
    #[error("Response decode error: {0}")]
    Decode(String),
    #[error("Other provider error: {0}")]
    Other(String),
}

// Generic implementation for all RpcError types
impl<E> From<RpcError<E>> for ProviderError
where
    E: std::fmt::Display + std::any::Any + 'static,
{
    fn from(err: RpcError<E>) -> Self {
        match err {
            RpcError::Transport(transport_err) => {
                // A reqwest timeout surfaces as a transport error; keep the
                // distinct Timeout variant for it
                if let Some(reqwest_err) =
                    (&transport_err as &dyn std::any::Any).downcast_ref::<reqwest::Error>()
                {
                    if reqwest_err.is_timeout() {
                        return ProviderError::Timeout;
                    }
                }

                ProviderError::TransportError(transport_err.to_string())
            }
            RpcError::ErrorResp(json_rpc_err) => ProviderError::RpcErrorCode {
                code: json_rpc_err.code,
                message: json_rpc_err.message.to_string(),
            },
            RpcError::DeserError { err, .. } => ProviderError::Decode(err.to_string()),
            _ => ProviderError::Other(format!("Other RPC error: {err}")),
        }
    }
}
