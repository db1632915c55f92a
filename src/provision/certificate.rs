// file: src/provision/certificate.rs
// version: 1.0.0
// guid: faae5890-5e5e-4f19-bbd5-4990b5e145aa

//! Phase 4: self-signed TLS certificate

use super::PhaseContext;
use crate::config::CertificateSettings;
use crate::system::SystemCommand;
use crate::Result;
use std::path::Path;

/// `openssl req` invocation producing an unencrypted key and a self-signed certificate
pub fn openssl_command(settings: &CertificateSettings, key: &Path, cert: &Path) -> SystemCommand {
    SystemCommand::new("openssl")
        .args(["req", "-x509", "-nodes"])
        .arg("-days")
        .arg(settings.validity_days.to_string())
        .arg("-newkey")
        .arg(format!("rsa:{}", settings.key_bits))
        .arg("-keyout")
        .arg(key.display().to_string())
        .arg("-out")
        .arg(cert.display().to_string())
        .arg("-subj")
        .arg(settings.subject())
}

pub async fn generate_certificate(ctx: &mut PhaseContext<'_>) -> Result<String> {
    let config = ctx.config;
    let key = &config.paths.key_file;
    let cert = &config.paths.cert_file;

    ctx.system
        .run(&openssl_command(&config.certificate, key, cert))
        .await?;
    ctx.system
        .run(
            &SystemCommand::new("chmod")
                .arg("600")
                .arg(key.display().to_string()),
        )
        .await?;
    ctx.system
        .run(
            &SystemCommand::new("chmod")
                .arg("644")
                .arg(cert.display().to_string()),
        )
        .await?;

    ctx.log.info(format!(
        "Private key {} restricted to owner read/write",
        key.display()
    ))?;

    Ok(format!(
        "Self-signed certificate {} valid for {} days",
        cert.display(),
        config.certificate.validity_days
    ))
}
