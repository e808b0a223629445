//! Fixture plugin that conflicts with nothing

use cf_plugins::prelude::*;

struct Test2;

#[async_trait]
impl Plugin for Test2 {
    fn metadata(&self) -> PluginMetadata {
        PluginMetadata::new("Test2")
            .with_command(PluginCommand::new("test_2_cmd1", "help text for test_2_cmd1"))
            .with_command(PluginCommand::new("test_2_cmd2", "help text for test_2_cmd2"))
    }

    async fn run(&self, _connection: &CliConnection, args: Vec<String>) -> CliResult<()> {
        match args.first().map(String::as_str) {
            Some("test_2_cmd1") => println!("You called cmd1 in test_2"),
            Some("test_2_cmd2") => println!("You called cmd2 in test_2"),
            _ => {}
        }
        Ok(())
    }
}

fn main() {
    cf_plugins::plugin::start(Test2)
}
