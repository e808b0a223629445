//! Fixture plugin with two commands, the first with an alias

use cf_plugins::prelude::*;

struct Test1;

#[async_trait]
impl Plugin for Test1 {
    fn metadata(&self) -> PluginMetadata {
        PluginMetadata::new("Test1")
            .with_command(
                PluginCommand::new("test_1_cmd1", "help text for test_1_cmd1")
                    .with_alias("test_1_cmd1_alias"),
            )
            .with_command(PluginCommand::new("test_1_cmd2", "help text for test_1_cmd2"))
    }

    async fn run(&self, _connection: &CliConnection, args: Vec<String>) -> CliResult<()> {
        match args.first().map(String::as_str) {
            Some("test_1_cmd1") => println!("You called cmd1 in test_1"),
            Some("test_1_cmd2") => println!("You called cmd2 in test_1"),
            _ => {}
        }
        Ok(())
    }
}

fn main() {
    cf_plugins::plugin::start(Test1)
}
