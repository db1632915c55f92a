// file: src/lib.rs
// version: 3.0.0
// guid: d82472d1-7f0f-4eb4-b0a3-6e1547103eb4

//! # vsftpd provisioner
//!
//! Installs and hardens a vsftpd FTP server on Ubuntu: packages, PAM password
//! policy, a self-signed TLS certificate, the server configuration, a Fail2Ban
//! jail, UFW rules and a single FTP account.
//!
//! Provisioning runs as a fixed sequence of phases. Every external mutation goes
//! through [`system::SystemMutator`], every environment read through
//! [`system::SystemProbe`], and the first failing phase stops the run.

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod provision;
pub mod system;

pub use error::{ProvisionError, Result};

/// Version information for the utility
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
