// file: src/provision/mod.rs
// version: 1.0.0
// guid: 942d9db8-4e88-46c2-959b-eca3b978b9b7

//! Provisioning phases and the sequencer that runs them
//!
//! The nine phases run in a fixed order. Each returns a `Result`; the
//! [`Sequencer`] stops at the first failure and never runs a later phase.

pub mod accounts;
pub mod certificate;
pub mod credentials;
pub mod fail2ban;
pub mod firewall;
pub mod packages;
pub mod preflight;
pub mod report;
pub mod sequencer;
pub mod server_config;
pub mod service;

pub use credentials::{
    CredentialSource, Credentials, EnvCredentials, StaticCredentials, TerminalPrompt,
};
pub use report::ProvisionReport;
pub use sequencer::Sequencer;

use crate::config::ProvisionConfig;
use crate::logging::InstallLog;
use crate::system::SystemMutator;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One step of the provisioning pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    Prerequisites,
    SystemPreparation,
    ServerPackages,
    Certificate,
    ServerConfiguration,
    IntrusionPrevention,
    Firewall,
    AccountCreation,
    ServiceActivation,
}

impl Phase {
    /// Every phase in execution order
    pub const ALL: [Phase; 9] = [
        Phase::Prerequisites,
        Phase::SystemPreparation,
        Phase::ServerPackages,
        Phase::Certificate,
        Phase::ServerConfiguration,
        Phase::IntrusionPrevention,
        Phase::Firewall,
        Phase::AccountCreation,
        Phase::ServiceActivation,
    ];

    /// 1-based position in the pipeline
    pub fn number(&self) -> usize {
        match self {
            Phase::Prerequisites => 1,
            Phase::SystemPreparation => 2,
            Phase::ServerPackages => 3,
            Phase::Certificate => 4,
            Phase::ServerConfiguration => 5,
            Phase::IntrusionPrevention => 6,
            Phase::Firewall => 7,
            Phase::AccountCreation => 8,
            Phase::ServiceActivation => 9,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Phase::Prerequisites => "Prerequisite verification",
            Phase::SystemPreparation => "System preparation",
            Phase::ServerPackages => "Server package installation",
            Phase::Certificate => "Certificate generation",
            Phase::ServerConfiguration => "Server configuration",
            Phase::IntrusionPrevention => "Intrusion-prevention configuration",
            Phase::Firewall => "Firewall configuration",
            Phase::AccountCreation => "Account creation",
            Phase::ServiceActivation => "Service activation",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Phase {}/{}: {}", self.number(), Phase::ALL.len(), self.title())
    }
}

/// What a running phase may touch
pub struct PhaseContext<'a> {
    pub system: &'a mut dyn SystemMutator,
    pub config: &'a ProvisionConfig,
    pub log: &'a mut InstallLog,
    pub report: &'a mut ProvisionReport,
}
