// ! Command execution for `cf`
// !
// ! Module parses a command line, runs the matching built-in or dispatches to
// ! the plugin owning the command. `App::run` is the only place failures are
// ! printed and turned into an exit status.

use async_trait::async_trait;
use clap::{CommandFactory, Parser};
use std::sync::Arc;
use tracing::{debug, info};

use crate::cli::commands::{Cli, Commands};
use crate::cli::dispatch::run_plugin_command;
use crate::cli::table::CommandTable;
use crate::cli::ui::{TerminalUi, Ui};
use crate::config::CliConfig;
use crate::core::error::{CliError, CliResult};
use crate::core::logging::ErrorContext;
use crate::installer::{BinaryDownloader, HttpDownloader, PluginInstaller};
use crate::registry::{FilePluginConfiguration, PluginConfiguration};
use crate::rpc::capture::OutputCapture;
use crate::rpc::service::CoreCommandRunner;

const PROGRAM_NAME: &str = "cf";

/// The `cf` host application
#[derive(Clone)]
pub struct App {
    config: CliConfig,
    ui: Arc<TerminalUi>,
    registry: Arc<dyn PluginConfiguration>,
    commands: CommandTable,
    downloader: Arc<dyn BinaryDownloader>,
}

impl App {
    pub fn new(
        config: CliConfig,
        ui: Arc<TerminalUi>,
        registry: Arc<dyn PluginConfiguration>,
    ) -> Self {
        Self {
            config,
            ui,
            registry,
            commands: CommandTable::builtin(),
            downloader: Arc::new(HttpDownloader::new()),
        }
    }

    /// App printing to the terminal, with the registry under `config.plugin_dir`
    pub fn from_config(config: CliConfig) -> Self {
        let ui = Arc::new(TerminalUi::new(Arc::new(OutputCapture::new())));
        let registry = Arc::new(FilePluginConfiguration::new(&config.plugin_dir));
        Self::new(config, ui, registry)
    }

    /// Replace the built-in table used for conflict checks
    pub fn with_commands(mut self, commands: CommandTable) -> Self {
        self.commands = commands;
        self
    }

    pub fn with_downloader(mut self, downloader: Arc<dyn BinaryDownloader>) -> Self {
        self.downloader = downloader;
        self
    }

    pub fn config(&self) -> &CliConfig {
        &self.config
    }

    pub fn ui(&self) -> &Arc<TerminalUi> {
        &self.ui
    }

    pub fn registry(&self) -> &Arc<dyn PluginConfiguration> {
        &self.registry
    }

    /// Run `args` (without the program name) and return the exit status
    pub async fn run(&self, args: Vec<String>) -> i32 {
        match self.execute(args).await {
            Ok(()) => 0,
            Err(e) => {
                e.log_with_context(&ErrorContext::new("execute"));
                self.ui.failed(&e.to_string());
                1
            }
        }
    }

    /// Run `args` (without the program name), propagating failures
    pub async fn execute(&self, args: Vec<String>) -> CliResult<()> {
        match self.parse(args)? {
            Some(cli) => self.execute_parsed(cli).await,
            None => Ok(()),
        }
    }

    /// Parse `args`; `None` means clap already answered with help or version text
    fn parse(&self, args: Vec<String>) -> CliResult<Option<Cli>> {
        let argv = std::iter::once(PROGRAM_NAME.to_string()).chain(args);
        match Cli::try_parse_from(argv) {
            Ok(cli) => Ok(Some(cli)),
            Err(e) => {
                use clap::error::ErrorKind;
                match e.kind() {
                    ErrorKind::DisplayHelp
                    | ErrorKind::DisplayVersion
                    | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                        self.ui.say(e.to_string().trim_end());
                        Ok(None)
                    }
                    _ => Err(CliError::usage(e.to_string().trim_end())),
                }
            }
        }
    }

    async fn execute_parsed(&self, cli: Cli) -> CliResult<()> {
        let app = match &cli.plugin_home {
            Some(home) if *home != self.config.home_dir => self.rehomed(CliConfig::with_home(home)),
            _ => self.clone(),
        };

        match cli.command {
            None => {
                app.ui.say(Cli::command().render_help().to_string().trim_end());
                Ok(())
            }
            Some(Commands::InstallPlugin { target }) => app.install_plugin(&target).await,
            Some(Commands::Plugins) => app.list_plugins(),
            Some(Commands::UninstallPlugin { name }) => app.uninstall_plugin(&name),
            Some(Commands::Version) => {
                app.ui
                    .say(&format!("{PROGRAM_NAME} version {}", env!("CARGO_PKG_VERSION")));
                Ok(())
            }
            Some(Commands::External(args)) => run_plugin_command(&app, args).await,
        }
    }

    fn rehomed(&self, config: CliConfig) -> Self {
        debug!("Using plugin directory {}", config.plugin_dir.display());
        Self {
            registry: Arc::new(FilePluginConfiguration::new(&config.plugin_dir)),
            config,
            ..self.clone()
        }
    }

    async fn install_plugin(&self, target: &str) -> CliResult<()> {
        let ui: Arc<dyn Ui> = self.ui.clone();
        PluginInstaller::new(ui, self.registry.clone(), self.commands.clone())
            .with_downloader(self.downloader.clone())
            .install(target)
            .await
            .map(|_| ())
    }

    fn list_plugins(&self) -> CliResult<()> {
        self.ui.say("Listing Installed Plugins...");
        let plugins = self.registry.plugins()?;
        self.ui.ok();
        self.ui.say("");

        let mut rows = vec![[
            "plugin name".to_string(),
            "command name".to_string(),
            "alias".to_string(),
            "command help".to_string(),
        ]];
        for (name, entry) in &plugins {
            for command in &entry.commands {
                rows.push([
                    name.clone(),
                    command.name.clone(),
                    command.alias.clone(),
                    command.help_text.clone(),
                ]);
            }
        }

        let widths: Vec<usize> = (0..3)
            .map(|column| rows.iter().map(|row| row[column].len()).max().unwrap_or(0))
            .collect();
        for row in &rows {
            let line = format!(
                "{:<w0$}   {:<w1$}   {:<w2$}   {}",
                row[0],
                row[1],
                row[2],
                row[3],
                w0 = widths[0],
                w1 = widths[1],
                w2 = widths[2],
            );
            self.ui.say(line.trim_end());
        }
        Ok(())
    }

    fn uninstall_plugin(&self, name: &str) -> CliResult<()> {
        self.ui.say(&format!("Uninstalling plugin {name}..."));

        let entry = self
            .registry
            .remove_plugin(name)?
            .ok_or_else(|| CliError::registry(format!("Plugin name {name} does not exist")))?;

        match std::fs::remove_file(&entry.location) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("{} was already gone", entry.location.display());
            }
            Err(e) => return Err(e.into()),
        }

        info!("Uninstalled plugin {}", name);
        self.ui.ok();
        self.ui.say(&format!("Plugin {name} successfully uninstalled."));
        Ok(())
    }
}

#[async_trait]
impl CoreCommandRunner for App {
    /// Built-ins only: a nested plugin session would end the caller's capture
    async fn run_core_command(&self, args: Vec<String>) -> CliResult<()> {
        let result = match self.parse(args) {
            Ok(Some(Cli {
                command: Some(Commands::External(args)),
                ..
            })) => Err(CliError::usage(format!(
                "'{}' is a plugin command, not a core command",
                args.first().map(String::as_str).unwrap_or_default()
            ))),
            Ok(Some(cli)) => self.execute_parsed(cli).await,
            Ok(None) => Ok(()),
            Err(e) => Err(e),
        };
        result.inspect_err(|e| {
            self.ui.failed(&e.to_string());
        })
    }
}
