// file: src/provision/packages.rs
// version: 2.0.0
// guid: sshpkg01-2345-6789-abcd-ef0123456789

//! Phases 2 and 3: system preparation, server packages and PAM password policy

use super::PhaseContext;
use crate::config::PasswordPolicy;
use crate::system::{SystemCommand, SystemMutator};
use crate::Result;
use regex::{Captures, Regex};
use std::path::PathBuf;
use tracing::info;

/// Thin wrapper over apt-get
pub struct PackageManager<'a> {
    system: &'a mut dyn SystemMutator,
}

impl<'a> PackageManager<'a> {
    pub fn new(system: &'a mut dyn SystemMutator) -> Self {
        Self { system }
    }

    pub async fn update_index(&mut self) -> Result<()> {
        info!("Refreshing package index");
        self.system.run(&SystemCommand::apt_get().arg("update")).await?;
        Ok(())
    }

    pub async fn upgrade(&mut self) -> Result<()> {
        info!("Upgrading installed packages");
        self.system
            .run(&SystemCommand::apt_get().args(["upgrade", "-y"]))
            .await?;
        Ok(())
    }

    pub async fn install(&mut self, packages: &[String]) -> Result<()> {
        if packages.is_empty() {
            return Ok(());
        }
        info!("Installing packages: {}", packages.join(" "));
        self.system
            .run(
                &SystemCommand::apt_get()
                    .args(["install", "-y"])
                    .args(packages.iter().cloned()),
            )
            .await?;
        Ok(())
    }
}

/// Phase 2: create working directories, refresh and upgrade, install baseline tools
pub async fn prepare_system(ctx: &mut PhaseContext<'_>) -> Result<String> {
    let config = ctx.config;
    let paths = &config.paths;
    let mut dirs: Vec<PathBuf> = vec![paths.backup_dir.clone()];
    for file in [
        &paths.vsftpd_config,
        &paths.userlist_file,
        &paths.cert_file,
        &paths.key_file,
        &paths.fail2ban_jail,
    ] {
        if let Some(parent) = file.parent() {
            if !dirs.iter().any(|d| d == parent) {
                dirs.push(parent.to_path_buf());
            }
        }
    }
    for dir in &dirs {
        ctx.system.create_dir_all(dir).await?;
    }
    ctx.log.info(format!(
        "Ensured backup directory {} exists",
        paths.backup_dir.display()
    ))?;

    let mut packages = PackageManager::new(&mut *ctx.system);
    packages.update_index().await?;
    packages.upgrade().await?;
    packages.install(&config.packages.baseline).await?;

    Ok(format!(
        "System updated and baseline utilities installed ({})",
        config.packages.baseline.join(", ")
    ))
}

/// Phase 3: install vsftpd and companions, then tighten the PAM password policy
pub async fn install_server_packages(ctx: &mut PhaseContext<'_>) -> Result<String> {
    let config = ctx.config;
    PackageManager::new(&mut *ctx.system)
        .install(&config.packages.server)
        .await?;
    ctx.log
        .info(format!("Installed {}", config.packages.server.join(", ")))?;

    let pam_file = &config.paths.pam_password_file;
    let current = ctx.system.read_file(pam_file).await?.unwrap_or_default();
    let updated = apply_pwquality_policy(&current, &config.password_policy)?;
    ctx.system.write_file(pam_file, &updated).await?;
    ctx.log.warning(format!(
        "Password policy in {} now applies to every local account: {}",
        pam_file.display(),
        pwquality_options(&config.password_policy)
    ))?;

    Ok("vsftpd, Fail2Ban and pwquality installed; password policy applied".to_string())
}

/// Module arguments for pam_pwquality
pub fn pwquality_options(policy: &PasswordPolicy) -> String {
    let credit = |required: bool| if required { -1 } else { 0 };
    format!(
        "retry={} minlen={} ucredit={} lcredit={} dcredit={} ocredit={}",
        policy.retry,
        policy.min_length,
        credit(policy.require_uppercase),
        credit(policy.require_lowercase),
        credit(policy.require_digit),
        credit(policy.require_other)
    )
}

/// Rewrite the pam_pwquality line of a PAM password stack.
///
/// An existing line keeps its control field and gets the policy's options.
/// Without one, a `requisite` line is inserted ahead of pam_unix (or appended).
pub fn apply_pwquality_policy(content: &str, policy: &PasswordPolicy) -> Result<String> {
    let options = pwquality_options(policy);
    let existing = Regex::new(r"(?m)^([ \t]*password[ \t]+\S+[ \t]+pam_pwquality\.so)[^\n]*$")
        .map_err(|e| crate::error::ProvisionError::config(format!("Invalid regex pattern: {}", e)))?;

    if existing.is_match(content) {
        return Ok(existing
            .replace_all(content, |caps: &Captures| format!("{} {}", &caps[1], options))
            .into_owned());
    }

    let new_line = format!("password\trequisite\t\t\tpam_pwquality.so {}", options);
    let unix = Regex::new(r"^[ \t]*password[ \t]+.*pam_unix\.so")
        .map_err(|e| crate::error::ProvisionError::config(format!("Invalid regex pattern: {}", e)))?;

    let mut lines: Vec<String> = content.lines().map(str::to_string).collect();
    match lines.iter().position(|l| unix.is_match(l)) {
        Some(index) => lines.insert(index, new_line),
        None => lines.push(new_line),
    }
    let mut result = lines.join("\n");
    result.push('\n');
    Ok(result)
}
