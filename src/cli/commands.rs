// file: src/cli/commands.rs
// version: 2.1.0
// guid: g7h8i9j0-k1l2-3456-7890-123456ghijkl

//! Command implementations for the CLI

use super::args::{InstallArgs, PASSWORD_ENV};
use crate::{
    config::ProvisionConfig,
    logging::InstallLog,
    provision::{
        preflight, server_config, CredentialSource, EnvCredentials, Sequencer, TerminalPrompt,
    },
    system::{HostProbe, LocalSystem, RecordingSystem, SystemMutator},
    Result,
};
use std::io::ErrorKind;
use tracing::{error, info};

/// Run the whole provisioning pipeline
pub async fn install_command(
    config: ProvisionConfig,
    args: InstallArgs,
    console: bool,
) -> Result<()> {
    let log = open_journal(&config, console)?;
    let probe = Box::new(HostProbe::new(&config.paths.os_release));
    let credentials: Box<dyn CredentialSource> = match &args.username {
        Some(username) => Box::new(EnvCredentials::new(username, PASSWORD_ENV)),
        None => Box::new(TerminalPrompt::new()),
    };

    if args.dry_run {
        info!("DRY RUN: commands and file writes are recorded, not executed");
        let mut sequencer = Sequencer::new(
            config,
            RecordingSystem::dry_run(),
            probe,
            credentials,
            log,
            true,
        );
        let result = run_sequencer(&mut sequencer, args.report.as_deref()).await;
        info!(
            "DRY RUN: {} commands and {} file operations recorded",
            sequencer.system().commands().len(),
            sequencer.system().file_operations().len()
        );
        result
    } else {
        let mut sequencer =
            Sequencer::new(config, LocalSystem::new(), probe, credentials, log, false);
        run_sequencer(&mut sequencer, args.report.as_deref()).await
    }
}

async fn run_sequencer<S: SystemMutator>(
    sequencer: &mut Sequencer<S>,
    report_path: Option<&str>,
) -> Result<()> {
    let result = sequencer.run().await;

    if let Some(path) = report_path {
        match sequencer.report().write_json(path) {
            Ok(()) => info!("Run report written to {}", path),
            Err(e) => error!("Failed to write run report to {}: {}", path, e),
        }
    }

    result
}

/// Check prerequisites without changing anything
pub async fn check_prerequisites_command(config: ProvisionConfig, console: bool) -> Result<()> {
    let mut log = open_journal(&config, console)?;
    let probe = HostProbe::new(&config.paths.os_release);

    match preflight::verify(&probe, &config, &mut log) {
        Ok(target) => {
            log.success(format!("All prerequisites met on {}", target))?;
            Ok(())
        }
        Err(e) => {
            log.error(format!("Prerequisite check failed: {}", e))?;
            Err(e)
        }
    }
}

/// Print the vsftpd configuration the install would write
pub async fn render_config_command(config: ProvisionConfig) -> Result<()> {
    print!("{}", server_config::render_vsftpd_config(&config));
    Ok(())
}

/// Unprivileged users usually cannot create the journal under /var/log; report
/// that as the missing-root precondition rather than a generic I/O error.
fn open_journal(config: &ProvisionConfig, console: bool) -> Result<InstallLog> {
    InstallLog::open(&config.paths.log_file, console).map_err(|e| match e {
        crate::error::ProvisionError::IoError(io) if io.kind() == ErrorKind::PermissionDenied => {
            crate::error::ProvisionError::precondition(format!(
                "Cannot write log file {}: this tool must be run as root",
                config.paths.log_file.display()
            ))
        }
        other => other,
    })
}
