use cf_plugins::cli::App;
use cf_plugins::config::CliConfig;
use cf_plugins::core::logging::init_logging;

#[tokio::main]
async fn main() {
    let config = CliConfig::from_env();
    init_logging(&config.log_filter);

    let app = App::from_config(config);
    let code = app.run(std::env::args().skip(1).collect()).await;
    std::process::exit(code);
}
