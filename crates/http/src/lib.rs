//! HTTP transport for inline cell edits.
//!
//! `EditClient` performs one blocking persist call; `HttpTransport` runs
//! those calls on worker threads behind the engine's `Transport` trait.
//!
//! No GUI concepts. No retries. No async runtime.

mod client;
mod transport;

pub use client::{parse_response, EditClient};
pub use transport::HttpTransport;
