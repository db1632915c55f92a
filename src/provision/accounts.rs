// file: src/provision/accounts.rs
// version: 1.1.0
// guid: 42fe1935-0615-468c-9b1b-1da6349d84b4

//! Phase 8: FTP account creation

use super::credentials::{CredentialSource, Credentials};
use super::PhaseContext;
use crate::config::PasswordPolicy;
use crate::system::SystemCommand;
use crate::Result;
use regex::Regex;

const RESERVED_USERNAMES: &[&str] = &["root", "ftp", "nobody", "daemon"];

/// Accept names `useradd` takes without `--badname`
pub fn validate_username(username: &str) -> Result<()> {
    if username.is_empty() {
        return Err(crate::error::ProvisionError::input("Username cannot be empty"));
    }

    let re = Regex::new(r"^[a-z_][a-z0-9_-]{0,31}$").map_err(|e| {
        crate::error::ProvisionError::config(format!("Invalid regex pattern: {}", e))
    })?;
    if !re.is_match(username) {
        return Err(crate::error::ProvisionError::input(format!(
            "Invalid username '{}': use up to 32 lowercase letters, digits, '_' or '-', starting with a letter or '_'",
            username
        )));
    }

    if RESERVED_USERNAMES.contains(&username) {
        return Err(crate::error::ProvisionError::input(format!(
            "Username '{}' is reserved",
            username
        )));
    }

    Ok(())
}

/// Check a password against the same policy written to PAM
pub fn validate_password(password: &str, policy: &PasswordPolicy) -> Result<()> {
    let mut problems = Vec::new();

    if password.chars().count() < policy.min_length as usize {
        problems.push(format!("at least {} characters", policy.min_length));
    }
    if policy.require_uppercase && !password.chars().any(|c| c.is_ascii_uppercase()) {
        problems.push("an uppercase letter".to_string());
    }
    if policy.require_lowercase && !password.chars().any(|c| c.is_ascii_lowercase()) {
        problems.push("a lowercase letter".to_string());
    }
    if policy.require_digit && !password.chars().any(|c| c.is_ascii_digit()) {
        problems.push("a digit".to_string());
    }
    if policy.require_other && !password.chars().any(|c| !c.is_ascii_alphanumeric()) {
        problems.push("a symbol".to_string());
    }
    // chpasswd reads `user:password` lines
    if password.contains('\n') || password.contains('\r') {
        problems.push("no line breaks".to_string());
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(crate::error::ProvisionError::input(format!(
            "Password must contain {}",
            problems.join(", ")
        )))
    }
}

pub fn validate_credentials(credentials: &Credentials, policy: &PasswordPolicy) -> Result<()> {
    validate_username(credentials.username())?;
    validate_password(credentials.password(), policy)
}

pub async fn create_account(
    ctx: &mut PhaseContext<'_>,
    source: &mut dyn CredentialSource,
) -> Result<String> {
    let config = ctx.config;
    let credentials = source.credentials().await?;
    validate_credentials(&credentials, &config.password_policy)?;
    let username = credentials.username();
    let home = config.paths.home_root.join(username);

    ctx.system
        .run(
            &SystemCommand::new("useradd")
                .args(["-m", "-d"])
                .arg(home.display().to_string())
                .arg("-s")
                .arg(config.account.shell.as_str())
                .arg(username),
        )
        .await?;
    ctx.system
        .run(
            &SystemCommand::new("chpasswd")
                .secret_stdin(format!("{}:{}\n", username, credentials.password())),
        )
        .await?;
    ctx.log.info(format!("Created system account {}", username))?;

    ctx.system
        .append_line(&config.paths.userlist_file, username)
        .await?;
    ctx.log.info(format!(
        "Added {} to {}",
        username,
        config.paths.userlist_file.display()
    ))?;

    ctx.system
        .run(
            &SystemCommand::new("chmod")
                .arg(config.account.home_mode.as_str())
                .arg(home.display().to_string()),
        )
        .await?;
    if !home_mode_writable(&config.account.home_mode) {
        ctx.log.warning(format!(
            "Home directory {} is mode {}: uploads into it will fail although write_enable=YES",
            home.display(),
            config.account.home_mode
        ))?;
    }

    ctx.report.username = Some(username.to_string());
    Ok(format!("FTP account {} created", username))
}

/// Whether the owner write bit is set in an octal mode string
fn home_mode_writable(mode: &str) -> bool {
    u32::from_str_radix(mode, 8)
        .map(|m| m & 0o200 != 0)
        .unwrap_or(false)
}
