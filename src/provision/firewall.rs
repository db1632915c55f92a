// file: src/provision/firewall.rs
// version: 1.0.0
// guid: 053c6aa6-4218-4f3c-a507-ff17dc622185

//! Phase 7: UFW rules for FTP, FTPS and the passive range

use super::packages::PackageManager;
use super::PhaseContext;
use crate::config::ProvisionConfig;
use crate::system::SystemCommand;
use crate::Result;

/// `ufw allow` targets, in the order they are applied
pub fn firewall_rules(config: &ProvisionConfig) -> Vec<String> {
    let fw = &config.firewall;
    let mut rules = Vec::new();
    if fw.allow_ssh {
        rules.push("OpenSSH".to_string());
    }
    rules.push(format!("{}/tcp", fw.data_port));
    rules.push(format!("{}/tcp", fw.command_port));
    rules.push(format!("{}/tcp", fw.implicit_tls_port));
    rules.push(format!(
        "{}:{}/tcp",
        config.server.pasv_min_port, config.server.pasv_max_port
    ));
    rules
}

pub async fn configure_firewall(ctx: &mut PhaseContext<'_>) -> Result<String> {
    let config = ctx.config;
    let ufw = config.packages.firewall.as_str();

    if !ctx.system.command_available(ufw).await {
        ctx.log.info(format!("{} not found, installing it", ufw))?;
        PackageManager::new(&mut *ctx.system)
            .install(&[ufw.to_string()])
            .await?;
    }

    let rules = firewall_rules(config);
    for rule in &rules {
        ctx.system
            .run(&SystemCommand::new(ufw).arg("allow").arg(rule.as_str()))
            .await?;
    }

    ctx.system
        .run(&SystemCommand::new(ufw).args(["--force", "enable"]))
        .await?;

    Ok(format!("Firewall enabled, allowed {}", rules.join(", ")))
}
