//! Transport layer
//!
//! Newline-delimited JSON-RPC over loopback TCP, behind the `Transport` and
//! `ServerTransport` traits.

pub mod tcp;
pub mod traits;

pub use tcp::{TcpClientTransport, TcpServerTransport, loopback};
pub use traits::*;
