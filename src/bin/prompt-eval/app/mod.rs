mod commands;
mod evaluate;

use clap::Parser;

use crate::args::{CliArgs, Command};
use crate::config::load_config;
use crate::logging::init_logging;

pub async fn run() -> anyhow::Result<()> {
    let args = CliArgs::parse();
    let loaded = load_config(args.config.clone())?;
    let _logger = init_logging(&loaded.config.logging, &loaded.paths)?;

    match args.command {
        Command::Run(run_args) => evaluate::run_evaluation(&run_args, &loaded.config).await,
        Command::Providers => {
            commands::list_providers(&loaded);
            Ok(())
        }
        Command::Placeholders(placeholder_args) => commands::print_placeholders(&placeholder_args),
    }
}
