//! CliRpcCmd protocol
//!
//! JSON-RPC message envelope, the method names of the host service and the
//! metadata payloads plugins report.

pub mod messages;
pub mod methods;
pub mod types;

pub use messages::*;
pub use methods::RPC_SERVICE_NAME;
pub use types::*;
