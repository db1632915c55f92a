// file: src/cli/args.rs
// version: 2.0.0
// guid: f6g7h8i9-j0k1-2345-6789-012345fghijk

//! Command line argument definitions

use clap::{Args, Parser, Subcommand};

/// Environment variable holding the FTP password for non-interactive runs
pub const PASSWORD_ENV: &str = "VSFTPD_PROVISIONER_PASSWORD";

#[derive(Parser)]
#[command(name = "vsftpd-provisioner")]
#[command(about = "Install and harden a vsftpd FTP server on Ubuntu")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Defaults to `install` when omitted
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[arg(
        short,
        long,
        global = true,
        env = "VSFTPD_PROVISIONER_CONFIG",
        help = "YAML or TOML file overriding the built-in defaults"
    )]
    pub config: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the full provisioning pipeline (requires root)
    Install(InstallArgs),

    /// Only run the prerequisite checks
    CheckPrereqs,

    /// Print the vsftpd configuration that would be written
    RenderConfig,
}

#[derive(Args, Debug, Default, Clone)]
pub struct InstallArgs {
    #[arg(long, help = "Record commands and file writes without executing them")]
    pub dry_run: bool,

    #[arg(
        short,
        long,
        help = "FTP username; the password is then read from VSFTPD_PROVISIONER_PASSWORD instead of prompting"
    )]
    pub username: Option<String>,

    #[arg(long, help = "Write a JSON run report to this path")]
    pub report: Option<String>,
}
