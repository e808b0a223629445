//! Fixture plugin that runs host core commands through the RPC callback

use cf_plugins::prelude::*;

struct CoreCaller;

#[async_trait]
impl Plugin for CoreCaller {
    fn metadata(&self) -> PluginMetadata {
        PluginMetadata::new("CoreCaller")
            .with_command(PluginCommand::new("call-version", "prints the host version quietly"))
            .with_command(
                PluginCommand::new("call-plugins", "lists plugins through the host")
                    .with_alias("cp"),
            )
            .with_command(PluginCommand::new("call-missing", "uninstalls a plugin that is not there"))
    }

    async fn run(&self, connection: &CliConnection, args: Vec<String>) -> CliResult<()> {
        match args.first().map(String::as_str) {
            Some("call-version") => {
                let lines = connection
                    .cli_command_without_terminal_output(["version"])
                    .await?;
                println!("captured: {}", lines.join(" | "));
            }
            Some("call-plugins") => {
                let lines = connection.cli_command(["plugins"]).await?;
                println!("captured {} lines", lines.len());
            }
            Some("call-missing") => {
                match connection
                    .cli_command_without_terminal_output(["uninstall-plugin", "NotInstalled"])
                    .await
                {
                    Err(CliError::CoreCommandFailed { output }) => {
                        println!("core command failed: {}", output.join(" | "));
                    }
                    other => println!("unexpected: {other:?}"),
                }
            }
            _ => {}
        }
        Ok(())
    }
}

fn main() {
    cf_plugins::plugin::start(CoreCaller)
}
