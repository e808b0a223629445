// ! Plugin API definitions
// !
// ! Module defines the trait every plugin binary implements. The host never
// ! sees concrete plugin types; it only talks to them through the shim.

use async_trait::async_trait;

use crate::core::error::CliResult;
use crate::plugin::connection::CliConnection;
use crate::protocol::messages::PluginMetadata;

/// Core trait that all plugins must implement
#[async_trait]
pub trait Plugin: Send + Sync {
    /// Self-description reported to the host; must be free of side effects
    fn metadata(&self) -> PluginMetadata;

    /// Execute the command named by `args[0]`
    ///
    /// `connection` reaches back into the host to run core commands. An error
    /// is printed by the shim and turns into exit status 1.
    async fn run(&self, connection: &CliConnection, args: Vec<String>) -> CliResult<()>;
}
