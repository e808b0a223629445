//! Fixture plugin whose command and alias are used by the conflict tests

use cf_plugins::prelude::*;

struct AliasConflicts;

#[async_trait]
impl Plugin for AliasConflicts {
    fn metadata(&self) -> PluginMetadata {
        PluginMetadata::new("AliasConflicts").with_command(
            PluginCommand::new("conflict-cmd", "help text for conflict-cmd")
                .with_alias("conflict-alias"),
        )
    }

    async fn run(&self, _connection: &CliConnection, _args: Vec<String>) -> CliResult<()> {
        println!("You called conflict-cmd in alias_conflicts");
        Ok(())
    }
}

fn main() {
    cf_plugins::plugin::start(AliasConflicts)
}
