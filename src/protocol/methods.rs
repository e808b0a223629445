// ! CliRpcCmd method constants
// !
// ! Module contains the method names the host exposes to plugins. Names are
// ! part of the compatibility surface between independently built binaries.

/// Service name prefixed to every method
pub const RPC_SERVICE_NAME: &str = "CliRpcCmd";

// Metadata reporting (metadata-query mode only)
pub const SET_PLUGIN_METADATA: &str = "CliRpcCmd.SetPluginMetadata";

// Core command callbacks
pub const DISABLE_TERMINAL_OUTPUT: &str = "CliRpcCmd.DisableTerminalOutput";
pub const CALL_CORE_COMMAND: &str = "CliRpcCmd.CallCoreCommand";
pub const GET_OUTPUT_AND_RESET: &str = "CliRpcCmd.GetOutputAndReset";

// Protocol skew detection
pub const PROTOCOL_VERSION: &str = "CliRpcCmd.ProtocolVersion";
