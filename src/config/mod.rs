// file: src/config/mod.rs
// version: 2.0.0
// guid: a1b2c3d4-e5f6-7a8b-9c0d-1e2f3a4b5c6d

//! Configuration module for the vsftpd provisioner
//!
//! Every path, port, limit and policy the provisioning phases use lives here.
//! The defaults describe a stock Ubuntu host; a YAML or TOML file may override
//! any subset of them.

pub mod loader;
pub mod platform;

pub use platform::{InstallationTarget, SupportedPlatform};

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;
use validator::Validate;

/// Complete provisioning configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ProvisionConfig {
    /// Filesystem locations of every artifact the run reads or writes
    #[validate(nested)]
    pub paths: PathsConfig,
    /// Prerequisite thresholds and the supported platform list
    #[validate(nested)]
    pub preflight: PreflightConfig,
    /// Package sets installed during preparation and server installation
    #[validate(nested)]
    pub packages: PackagesConfig,
    /// vsftpd limits and TLS settings
    #[validate(nested)]
    pub server: ServerSettings,
    /// Ports opened in UFW
    #[validate(nested)]
    pub firewall: FirewallSettings,
    /// Fail2Ban jail parameters
    #[validate(nested)]
    pub fail2ban: JailSettings,
    /// Self-signed certificate parameters
    #[validate(nested)]
    pub certificate: CertificateSettings,
    /// PAM pwquality policy, also enforced on the FTP account password
    #[validate(nested)]
    pub password_policy: PasswordPolicy,
    /// FTP account defaults
    #[validate(nested)]
    pub account: AccountSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct PathsConfig {
    pub log_file: PathBuf,
    pub backup_dir: PathBuf,
    pub vsftpd_config: PathBuf,
    pub userlist_file: PathBuf,
    pub cert_file: PathBuf,
    pub key_file: PathBuf,
    pub fail2ban_jail: PathBuf,
    pub pam_password_file: PathBuf,
    pub os_release: PathBuf,
    pub home_root: PathBuf,
    pub secure_chroot_dir: PathBuf,
    pub xferlog_file: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            log_file: PathBuf::from("/var/log/vsftpd-provisioner.log"),
            backup_dir: PathBuf::from("/etc/vsftpd/backups"),
            vsftpd_config: PathBuf::from("/etc/vsftpd.conf"),
            userlist_file: PathBuf::from("/etc/vsftpd.userlist"),
            cert_file: PathBuf::from("/etc/ssl/certs/vsftpd.pem"),
            key_file: PathBuf::from("/etc/ssl/private/vsftpd.key"),
            fail2ban_jail: PathBuf::from("/etc/fail2ban/jail.d/vsftpd.conf"),
            pam_password_file: PathBuf::from("/etc/pam.d/common-password"),
            os_release: PathBuf::from("/etc/os-release"),
            home_root: PathBuf::from("/home"),
            secure_chroot_dir: PathBuf::from("/var/run/vsftpd/empty"),
            xferlog_file: PathBuf::from("/var/log/vsftpd.log"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct PreflightConfig {
    /// Minimum free space required on `free_space_path`, in MB
    #[validate(range(min = 1))]
    pub min_free_space_mb: u64,
    pub free_space_path: PathBuf,
    #[validate(length(min = 1))]
    pub supported_platforms: Vec<SupportedPlatform>,
}

impl Default for PreflightConfig {
    fn default() -> Self {
        Self {
            min_free_space_mb: 500,
            free_space_path: PathBuf::from("/"),
            supported_platforms: vec![SupportedPlatform::new(
                "ubuntu",
                &["22.04", "24.04"],
            )],
        }
    }
}

impl PreflightConfig {
    /// Check an OS identity against the allow-list
    pub fn supports(&self, target: &InstallationTarget) -> bool {
        self.supported_platforms.iter().any(|p| p.matches(target))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct PackagesConfig {
    pub baseline: Vec<String>,
    #[validate(length(min = 1))]
    pub server: Vec<String>,
    pub firewall: String,
}

impl Default for PackagesConfig {
    fn default() -> Self {
        Self {
            baseline: ["curl", "wget", "openssl", "ca-certificates"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            server: ["vsftpd", "fail2ban", "libpam-pwquality"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            firewall: "ufw".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ServerSettings {
    #[validate(range(min = 1))]
    pub max_clients: u32,
    #[validate(range(min = 1))]
    pub max_per_ip: u32,
    /// Seconds
    #[validate(range(min = 1))]
    pub idle_session_timeout: u32,
    /// Seconds
    #[validate(range(min = 1))]
    pub data_connection_timeout: u32,
    #[validate(range(min = 1024))]
    pub pasv_min_port: u16,
    #[validate(range(min = 1024))]
    pub pasv_max_port: u16,
    #[validate(length(min = 1))]
    pub ssl_ciphers: String,
    pub local_umask: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            max_clients: 50,
            max_per_ip: 5,
            idle_session_timeout: 300,
            data_connection_timeout: 120,
            pasv_min_port: 40000,
            pasv_max_port: 50000,
            ssl_ciphers: "HIGH".to_string(),
            local_umask: "022".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct FirewallSettings {
    #[validate(range(min = 1))]
    pub data_port: u16,
    #[validate(range(min = 1))]
    pub command_port: u16,
    #[validate(range(min = 1))]
    pub implicit_tls_port: u16,
    /// Keep SSH reachable once UFW is force-enabled
    pub allow_ssh: bool,
}

impl Default for FirewallSettings {
    fn default() -> Self {
        Self {
            data_port: 20,
            command_port: 21,
            implicit_tls_port: 990,
            allow_ssh: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct JailSettings {
    #[validate(range(min = 1))]
    pub max_retry: u32,
    /// Seconds
    #[validate(range(min = 1))]
    pub ban_time: u64,
    /// Seconds
    #[validate(range(min = 1))]
    pub find_time: u64,
}

impl Default for JailSettings {
    fn default() -> Self {
        Self {
            max_retry: 5,
            ban_time: 3600,
            find_time: 600,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct CertificateSettings {
    #[validate(range(min = 1))]
    pub validity_days: u32,
    #[validate(range(min = 2048))]
    pub key_bits: u32,
    #[validate(length(equal = 2))]
    pub country: String,
    pub state: String,
    pub locality: String,
    pub organization: String,
    pub organizational_unit: String,
    #[validate(length(min = 1))]
    pub common_name: String,
}

impl Default for CertificateSettings {
    fn default() -> Self {
        Self {
            validity_days: 365,
            key_bits: 2048,
            country: "US".to_string(),
            state: "State".to_string(),
            locality: "City".to_string(),
            organization: "Organization".to_string(),
            organizational_unit: "IT".to_string(),
            common_name: "localhost".to_string(),
        }
    }
}

impl CertificateSettings {
    /// Subject string in the form openssl's `-subj` expects
    pub fn subject(&self) -> String {
        format!(
            "/C={}/ST={}/L={}/O={}/OU={}/CN={}",
            self.country,
            self.state,
            self.locality,
            self.organization,
            self.organizational_unit,
            self.common_name
        )
    }
}

/// Password quality policy written to PAM and checked before account creation.
///
/// The `require_*` flags map onto pwquality credits of `-1` (at least one
/// character of the class).
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct PasswordPolicy {
    #[validate(range(min = 6, max = 128))]
    pub min_length: u32,
    #[validate(range(min = 1))]
    pub retry: u32,
    pub require_uppercase: bool,
    pub require_lowercase: bool,
    pub require_digit: bool,
    pub require_other: bool,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: 12,
            retry: 3,
            require_uppercase: true,
            require_lowercase: true,
            require_digit: true,
            require_other: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct AccountSettings {
    #[validate(length(min = 1))]
    pub shell: String,
    /// chmod mode applied to the new home directory
    #[validate(length(min = 3, max = 4))]
    pub home_mode: String,
}

impl Default for AccountSettings {
    fn default() -> Self {
        Self {
            shell: "/usr/sbin/nologin".to_string(),
            home_mode: "555".to_string(),
        }
    }
}

impl ProvisionConfig {
    /// Validate field ranges plus the checks that span several fields
    pub fn validate(&self) -> crate::Result<()> {
        Validate::validate(self)
            .map_err(|e| crate::error::ProvisionError::validation(e.to_string()))?;

        if self.server.pasv_min_port > self.server.pasv_max_port {
            return Err(crate::error::ProvisionError::validation(format!(
                "Passive port range is inverted: {} > {}",
                self.server.pasv_min_port, self.server.pasv_max_port
            )));
        }

        let fixed_ports = [
            self.firewall.data_port,
            self.firewall.command_port,
            self.firewall.implicit_tls_port,
        ];
        let unique: HashSet<u16> = fixed_ports.iter().copied().collect();
        if unique.len() != fixed_ports.len() {
            return Err(crate::error::ProvisionError::validation(
                "Data, command and implicit TLS ports must be distinct",
            ));
        }
        if let Some(port) = fixed_ports
            .iter()
            .find(|p| (self.server.pasv_min_port..=self.server.pasv_max_port).contains(*p))
        {
            return Err(crate::error::ProvisionError::validation(format!(
                "Port {} overlaps the passive port range",
                port
            )));
        }

        if u32::from_str_radix(&self.account.home_mode, 8).is_err() {
            return Err(crate::error::ProvisionError::validation(format!(
                "Home directory mode is not octal: {}",
                self.account.home_mode
            )));
        }

        Ok(())
    }
}
