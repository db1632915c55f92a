// file: src/provision/fail2ban.rs
// version: 1.0.0
// guid: abd989f9-a3c8-406c-bff4-79335758c639

//! Phase 6: Fail2Ban jail for vsftpd

use super::PhaseContext;
use crate::config::{JailSettings, ProvisionConfig};
use crate::system::SystemCommand;
use crate::Result;

/// Render the jail.d drop-in watching the vsftpd log
pub fn render_jail(settings: &JailSettings, config: &ProvisionConfig) -> String {
    format!(
        r#"[vsftpd]
enabled  = true
port     = ftp,ftp-data,ftps,ftps-data,{pasv_min}:{pasv_max}
filter   = vsftpd
logpath  = {logpath}
maxretry = {max_retry}
bantime  = {ban_time}
findtime = {find_time}
"#,
        pasv_min = config.server.pasv_min_port,
        pasv_max = config.server.pasv_max_port,
        logpath = config.paths.xferlog_file.display(),
        max_retry = settings.max_retry,
        ban_time = settings.ban_time,
        find_time = settings.find_time,
    )
}

pub async fn configure_fail2ban(ctx: &mut PhaseContext<'_>) -> Result<String> {
    let config = ctx.config;
    let jail_file = &config.paths.fail2ban_jail;

    ctx.system
        .write_file(jail_file, &render_jail(&config.fail2ban, config))
        .await?;
    ctx.log
        .info(format!("Wrote Fail2Ban jail {}", jail_file.display()))?;

    ctx.system
        .run(&SystemCommand::systemctl("restart", "fail2ban"))
        .await?;

    Ok(format!(
        "Fail2Ban bans after {} failures for {} seconds",
        config.fail2ban.max_retry, config.fail2ban.ban_time
    ))
}
