// file: src/provision/server_config.rs
// version: 1.1.0
// guid: 27e8821e-5306-4ebb-ba7e-a60a8640c7d1

//! Phase 5: vsftpd configuration
//!
//! The file is replaced wholesale on every run; whatever was there before is
//! first copied into the backup directory under a timestamped name.

use super::PhaseContext;
use crate::config::ProvisionConfig;
use crate::system::SystemMutator;
use crate::Result;
use chrono::Local;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

/// Render the complete vsftpd.conf
pub fn render_vsftpd_config(config: &ProvisionConfig) -> String {
    let paths = &config.paths;
    let server = &config.server;

    format!(
        r#"# vsftpd configuration generated by vsftpd-provisioner
# Manual edits are overwritten on the next run; previous versions are kept in
# {backup_dir}

# Listener
listen=YES
listen_ipv6=NO
connect_from_port_20=YES

# Access
anonymous_enable=NO
local_enable=YES
write_enable=YES
local_umask={umask}
dirmessage_enable=YES
use_localtime=YES
pam_service_name=vsftpd

# Chroot isolation
chroot_local_user=YES
allow_writeable_chroot=YES
secure_chroot_dir={secure_chroot_dir}

# User allow-list
userlist_enable=YES
userlist_file={userlist_file}
userlist_deny=NO

# Limits
max_clients={max_clients}
max_per_ip={max_per_ip}
idle_session_timeout={idle_timeout}
data_connection_timeout={data_timeout}

# Passive mode
pasv_enable=YES
pasv_min_port={pasv_min}
pasv_max_port={pasv_max}

# TLS
ssl_enable=YES
rsa_cert_file={cert_file}
rsa_private_key_file={key_file}
allow_anon_ssl=NO
force_local_data_ssl=YES
force_local_logins_ssl=YES
ssl_tlsv1=YES
ssl_sslv2=NO
ssl_sslv3=NO
require_ssl_reuse=NO
ssl_ciphers={ciphers}

# Logging
xferlog_enable=YES
xferlog_std_format=NO
xferlog_file={xferlog_file}
log_ftp_protocol=YES
"#,
        backup_dir = paths.backup_dir.display(),
        umask = server.local_umask,
        secure_chroot_dir = paths.secure_chroot_dir.display(),
        userlist_file = paths.userlist_file.display(),
        max_clients = server.max_clients,
        max_per_ip = server.max_per_ip,
        idle_timeout = server.idle_session_timeout,
        data_timeout = server.data_connection_timeout,
        pasv_min = server.pasv_min_port,
        pasv_max = server.pasv_max_port,
        cert_file = paths.cert_file.display(),
        key_file = paths.key_file.display(),
        ciphers = server.ssl_ciphers,
        xferlog_file = paths.xferlog_file.display(),
    )
}

/// Pick an unused backup path: `<file name>.<YYYYmmdd_HHMMSS>`, with `.1`, `.2`, ...
/// appended when a backup from the same second already exists
pub async fn next_backup_path(
    system: &mut dyn SystemMutator,
    backup_dir: &Path,
    config_file: &Path,
) -> PathBuf {
    let name = config_file
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "vsftpd.conf".to_string());
    let base = format!("{}.{}", name, Local::now().format("%Y%m%d_%H%M%S"));

    let mut candidate = backup_dir.join(&base);
    let mut counter = 1;
    while system.path_exists(&candidate).await {
        candidate = backup_dir.join(format!("{}.{}", base, counter));
        counter += 1;
    }
    candidate
}

pub fn sha256_hex(content: &str) -> String {
    hex::encode(Sha256::digest(content.as_bytes()))
}

pub async fn write_server_config(ctx: &mut PhaseContext<'_>) -> Result<String> {
    let config = ctx.config;
    let target = &config.paths.vsftpd_config;

    if ctx.system.path_exists(target).await {
        let backup = next_backup_path(&mut *ctx.system, &config.paths.backup_dir, target).await;
        ctx.system.copy_file(target, &backup).await?;
        ctx.log.info(format!(
            "Backed up existing configuration to {}",
            backup.display()
        ))?;
        ctx.report.backup_path = Some(backup);
    }

    let rendered = render_vsftpd_config(config);
    ctx.system.write_file(target, &rendered).await?;
    ctx.report.config_sha256 = Some(sha256_hex(&rendered));

    Ok(format!("Wrote {}", target.display()))
}
