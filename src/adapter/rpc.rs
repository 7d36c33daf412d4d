//! # RPC Adapter
//!
//! Flat error envelope for message-based transports, where there is no
//! status code to carry and the failure travels back to the caller as a
//! single message.

use serde::Serialize;

use crate::pipe::PipeError;

/// Error envelope for message-based transports
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RpcError {
    pub message: String,
}

impl From<PipeError> for RpcError {
    fn from(err: PipeError) -> Self {
        Self {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_carries_formatted_error() {
        let rpc = RpcError::from(PipeError::BadRequest(
            "Request validation of body failed, because: \"x\" is required".to_string(),
        ));
        assert_eq!(
            rpc.message,
            "Request validation of body failed, because: \"x\" is required"
        );
    }
}
