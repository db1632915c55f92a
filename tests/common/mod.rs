// file: tests/common/mod.rs
// version: 1.0.0
// guid: 5d0e2b7a-91c4-4f3e-8a61-2c7f04b9d3e1

//! Shared fixtures for the integration tests

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use vsftpd_provisioner::{
    config::{InstallationTarget, ProvisionConfig},
    logging::InstallLog,
    provision::{Sequencer, StaticCredentials},
    system::{RecordingSystem, SystemProbe},
    Result,
};

pub const GOOD_PASSWORD: &str = "Str0ng!Passw0rd";

pub const STOCK_PAM_PASSWORD: &str = "\
password\t[success=1 default=ignore]\tpam_unix.so obscure yescrypt
password\trequisite\t\t\tpam_deny.so
password\trequired\t\t\tpam_permit.so
";

pub const STOCK_VSFTPD_CONF: &str = "listen=NO\nlisten_ipv6=YES\nanonymous_enable=NO\n";

/// Probe answering with fixed values
#[derive(Debug, Clone)]
pub struct FixedProbe {
    pub uid: u32,
    pub id: String,
    pub version_id: String,
    pub free_mb: u64,
}

impl FixedProbe {
    pub fn ubuntu(version_id: &str, free_mb: u64) -> Self {
        Self {
            uid: 0,
            id: "ubuntu".to_string(),
            version_id: version_id.to_string(),
            free_mb,
        }
    }
}

impl SystemProbe for FixedProbe {
    fn effective_uid(&self) -> u32 {
        self.uid
    }

    fn installation_target(&self) -> Result<InstallationTarget> {
        Ok(InstallationTarget::new(&self.id, &self.version_id))
    }

    fn free_space_mb(&self, _path: &Path) -> Result<u64> {
        Ok(self.free_mb)
    }
}

/// Configuration with every artifact path inside `root`
pub fn config_rooted_at(root: &Path) -> ProvisionConfig {
    let mut config = ProvisionConfig::default();
    let paths = &mut config.paths;
    paths.log_file = root.join("var/log/vsftpd-provisioner.log");
    paths.backup_dir = root.join("etc/vsftpd/backups");
    paths.vsftpd_config = root.join("etc/vsftpd.conf");
    paths.userlist_file = root.join("etc/vsftpd.userlist");
    paths.cert_file = root.join("etc/ssl/certs/vsftpd.pem");
    paths.key_file = root.join("etc/ssl/private/vsftpd.key");
    paths.fail2ban_jail = root.join("etc/fail2ban/jail.d/vsftpd.conf");
    paths.pam_password_file = root.join("etc/pam.d/common-password");
    paths.os_release = root.join("etc/os-release");
    paths.home_root = root.join("home");
    config
}

/// Lay down the files a freshly installed Ubuntu host already has
pub fn seed_host(root: &Path) {
    std::fs::create_dir_all(root.join("etc/pam.d")).unwrap();
    std::fs::write(root.join("etc/pam.d/common-password"), STOCK_PAM_PASSWORD).unwrap();
    std::fs::write(root.join("etc/vsftpd.conf"), STOCK_VSFTPD_CONF).unwrap();
}

pub fn sequencer(
    root: &Path,
    probe: FixedProbe,
    system: RecordingSystem,
    username: &str,
) -> Sequencer<RecordingSystem> {
    sequencer_with_config(config_rooted_at(root), probe, system, username)
}

pub fn sequencer_with_config(
    config: ProvisionConfig,
    probe: FixedProbe,
    system: RecordingSystem,
    username: &str,
) -> Sequencer<RecordingSystem> {
    let log = InstallLog::open(&config.paths.log_file, false).unwrap();
    Sequencer::new(
        config,
        system,
        Box::new(probe),
        Box::new(StaticCredentials::new(username, GOOD_PASSWORD)),
        log,
        false,
    )
}

/// Files directly inside `dir`, sorted
pub fn files_in(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = match std::fs::read_dir(dir) {
        Ok(entries) => entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_file())
            .collect(),
        Err(_) => Vec::new(),
    };
    files.sort();
    files
}
