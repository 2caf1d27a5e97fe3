use std::process::ExitCode;

use clap::Parser;
use tracing::error;

use domainfolio::cli::{Cli, Commands, ConfigCommands};
use domainfolio::config::{DEFAULT_CONFIG_PATH, get_config, init_config_from};
use domainfolio::runtime::modes;
use domainfolio::system::init_logging;

#[actix_web::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // 生成示例配置不需要加载配置和日志
    let command = match cli.command.unwrap_or(Commands::Serve) {
        Commands::Config {
            action: ConfigCommands::Generate { output },
        } => {
            return match modes::run_config_generate(output) {
                Ok(()) => ExitCode::SUCCESS,
                Err(e) => {
                    eprintln!("{:#}", e);
                    ExitCode::FAILURE
                }
            };
        }
        command => command,
    };

    init_config_from(cli.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH));
    let config = get_config();

    if let Err(e) = config.validate() {
        eprintln!("{}", e.format_colored());
        return ExitCode::FAILURE;
    }

    let _guard = match init_logging(&config.logging) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("{:#}", e);
            return ExitCode::FAILURE;
        }
    };

    let result = match command {
        Commands::Serve => modes::run_server(config).await,
        Commands::Dispatch { at, cadences } => modes::run_dispatch(config, at, cadences).await,
        Commands::Preview { user, cadence, at } => {
            modes::run_preview(config, user, cadence, at).await
        }
        Commands::Config { .. } => Ok(()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
