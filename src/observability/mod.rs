//! Observability
//!
//! Structured JSON logging for the validation layer. The pipe reports
//! request validation failures, the derivation path reports schema
//! construction; both as one synchronous log line per event.

mod logger;

pub use logger::{Logger, Severity};
