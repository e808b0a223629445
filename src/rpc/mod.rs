//! Host RPC service and the client plugins use to reach it

pub mod capture;
pub mod client;
pub mod server;
pub mod service;

pub use capture::OutputCapture;
pub use client::CliRpcClient;
pub use server::RpcSession;
pub use service::{CliRpcService, CoreCommandRunner};
