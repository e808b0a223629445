//! Fixture plugin claiming the reserved help command

use cf_plugins::prelude::*;

struct TestWithHelp;

#[async_trait]
impl Plugin for TestWithHelp {
    fn metadata(&self) -> PluginMetadata {
        PluginMetadata::new("TestWithHelp")
            .with_command(PluginCommand::new("help", "help text for test_with_help"))
    }

    async fn run(&self, _connection: &CliConnection, _args: Vec<String>) -> CliResult<()> {
        println!("You called help in test_with_help");
        Ok(())
    }
}

fn main() {
    cf_plugins::plugin::start(TestWithHelp)
}
