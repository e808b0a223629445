//! Fixture plugin shadowing a native short name

use cf_plugins::prelude::*;

struct TestWithPushShortName;

#[async_trait]
impl Plugin for TestWithPushShortName {
    fn metadata(&self) -> PluginMetadata {
        PluginMetadata::new("TestWithPushShortName")
            .with_command(PluginCommand::new("p", "plugin short name p"))
    }

    async fn run(&self, _connection: &CliConnection, _args: Vec<String>) -> CliResult<()> {
        println!("You called p within the plugin");
        Ok(())
    }
}

fn main() {
    cf_plugins::plugin::start(TestWithPushShortName)
}
