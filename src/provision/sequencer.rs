// file: src/provision/sequencer.rs
// version: 1.1.0
// guid: 3864786c-da02-496a-aed6-9e8dc98c6dc8

//! Runs the provisioning phases in order and halts on the first failure

use super::credentials::CredentialSource;
use super::report::ProvisionReport;
use super::{
    accounts, certificate, fail2ban, firewall, packages, preflight, server_config, service,
    Phase, PhaseContext,
};
use crate::config::ProvisionConfig;
use crate::logging::InstallLog;
use crate::system::{SystemMutator, SystemProbe};
use crate::Result;
use tracing::{info_span, Instrument};

/// Provisioning pipeline over a mutator `S`
pub struct Sequencer<S: SystemMutator> {
    config: ProvisionConfig,
    system: S,
    probe: Box<dyn SystemProbe>,
    credentials: Box<dyn CredentialSource>,
    log: InstallLog,
    report: ProvisionReport,
}

impl<S: SystemMutator> Sequencer<S> {
    pub fn new(
        config: ProvisionConfig,
        system: S,
        probe: Box<dyn SystemProbe>,
        credentials: Box<dyn CredentialSource>,
        log: InstallLog,
        dry_run: bool,
    ) -> Self {
        Self {
            config,
            system,
            probe,
            credentials,
            log,
            report: ProvisionReport::new(dry_run),
        }
    }

    pub fn system(&self) -> &S {
        &self.system
    }

    pub fn log(&self) -> &InstallLog {
        &self.log
    }

    pub fn report(&self) -> &ProvisionReport {
        &self.report
    }

    /// Run every phase once, in order.
    ///
    /// The first failing phase is logged at ERROR, recorded in the report and
    /// returned as [`crate::ProvisionError::PhaseFailed`]; no later phase runs.
    pub async fn run(&mut self) -> Result<()> {
        let mode = if self.report.dry_run { " (dry run)" } else { "" };
        self.log.info(format!(
            "Starting vsftpd provisioning run {}{}",
            self.report.run_id, mode
        ))?;

        for phase in Phase::ALL {
            self.log.info(format!("{} started", phase))?;

            let span = info_span!("phase", number = phase.number(), name = phase.title());
            match self.execute(phase).instrument(span).await {
                Ok(summary) => {
                    self.report.complete(phase);
                    self.log.success(format!("{} completed: {}", phase, summary))?;
                }
                Err(e) => {
                    self.report.fail(phase, e.to_string());
                    self.report.finish();
                    // The phase error decides the exit status, not the journal
                    let mut logged = self.log.error(format!("{} failed: {}", phase, e));
                    if logged.is_ok() && !e.is_precondition() {
                        logged = self
                            .log
                            .error("Provisioning stopped; the host may be partially configured");
                    }
                    if let Err(log_err) = logged {
                        tracing::error!("Failed to write journal: {}", log_err);
                    }
                    return Err(crate::error::ProvisionError::PhaseFailed {
                        phase,
                        source: Box::new(e),
                    });
                }
            }
        }

        self.report.finish();
        self.log.success("vsftpd provisioning finished")?;
        Ok(())
    }

    async fn execute(&mut self, phase: Phase) -> Result<String> {
        let mut ctx = PhaseContext {
            system: &mut self.system,
            config: &self.config,
            log: &mut self.log,
            report: &mut self.report,
        };

        match phase {
            Phase::Prerequisites => {
                let target = preflight::verify(self.probe.as_ref(), ctx.config, ctx.log)?;
                let summary = format!(
                    "{} host with root privileges and enough free space",
                    target
                );
                ctx.report.target = Some(target);
                Ok(summary)
            }
            Phase::SystemPreparation => packages::prepare_system(&mut ctx).await,
            Phase::ServerPackages => packages::install_server_packages(&mut ctx).await,
            Phase::Certificate => certificate::generate_certificate(&mut ctx).await,
            Phase::ServerConfiguration => server_config::write_server_config(&mut ctx).await,
            Phase::IntrusionPrevention => fail2ban::configure_fail2ban(&mut ctx).await,
            Phase::Firewall => firewall::configure_firewall(&mut ctx).await,
            Phase::AccountCreation => {
                accounts::create_account(&mut ctx, self.credentials.as_mut()).await
            }
            Phase::ServiceActivation => service::activate_service(&mut ctx).await,
        }
    }
}
