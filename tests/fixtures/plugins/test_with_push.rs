//! Fixture plugin shadowing a native command name

use cf_plugins::prelude::*;

struct TestWithPush;

#[async_trait]
impl Plugin for TestWithPush {
    fn metadata(&self) -> PluginMetadata {
        PluginMetadata::new("TestWithPush")
            .with_command(PluginCommand::new("push", "push text for test_with_push"))
    }

    async fn run(&self, _connection: &CliConnection, _args: Vec<String>) -> CliResult<()> {
        println!("You called push in test_with_push");
        Ok(())
    }
}

fn main() {
    cf_plugins::plugin::start(TestWithPush)
}
