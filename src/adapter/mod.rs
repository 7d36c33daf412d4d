//! # Transport Adapters
//!
//! Maps [`PipeError`](crate::pipe::PipeError) onto transport-level error
//! surfaces: an HTTP response body with a status code, and a flat message
//! envelope for secondary protocols.

pub mod http;
pub mod rpc;

pub use http::ErrorResponse;
pub use rpc::RpcError;
