// file: src/main.rs
// version: 2.1.0
// guid: h8i9j0k1-l2m3-4567-8901-234567hijklm

//! vsftpd provisioner - Main entry point

use clap::Parser;
use std::process::ExitCode;
use tokio::signal;
use tracing::{error, warn};
use vsftpd_provisioner::{
    cli::{
        args::{Cli, Commands, InstallArgs},
        commands::*,
    },
    config::loader::ConfigLoader,
    logging::logger,
    Result,
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = logger::init_logger(cli.verbose, cli.quiet) {
        eprintln!("Failed to initialize logging: {}", e);
        return ExitCode::from(2);
    }

    let command_future = run(cli);

    // Set up signal handling for Ctrl+C
    let shutdown_signal = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        result = command_future => match result {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                error!("{}", e);
                ExitCode::from(e.exit_code())
            }
        },
        _ = shutdown_signal => {
            warn!("Interrupted by user; the host may be partially configured");
            // A credential prompt may still be blocked on stdin; returning would
            // make the runtime wait for it on shutdown
            std::process::exit(130);
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = ConfigLoader::new().load_or_default(cli.config.as_deref())?;
    let console = !cli.quiet;

    match cli.command.unwrap_or(Commands::Install(InstallArgs::default())) {
        Commands::Install(args) => install_command(config, args, console).await,
        Commands::CheckPrereqs => check_prerequisites_command(config, console).await,
        Commands::RenderConfig => render_config_command(config).await,
    }
}
