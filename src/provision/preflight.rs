// file: src/provision/preflight.rs
// version: 1.0.0
// guid: 0ec68a8f-a44b-4b09-8367-4328afc342bb

//! Phase 1: prerequisite verification
//!
//! Reads the environment only. Nothing here writes anywhere except the journal.

use crate::config::{InstallationTarget, ProvisionConfig};
use crate::logging::InstallLog;
use crate::system::SystemProbe;
use crate::Result;

/// Check root privilege, supported platform and free space, in that order.
///
/// Returns the detected platform; the first failing check returns a
/// [`crate::ProvisionError::PreconditionError`].
pub fn verify(
    probe: &dyn SystemProbe,
    config: &ProvisionConfig,
    log: &mut InstallLog,
) -> Result<InstallationTarget> {
    let uid = probe.effective_uid();
    if uid != 0 {
        return Err(crate::error::ProvisionError::precondition(format!(
            "This tool must be run as root (effective uid {})",
            uid
        )));
    }
    log.info("Running with root privileges")?;

    let target = probe
        .installation_target()
        .map_err(|e| crate::error::ProvisionError::precondition(e.to_string()))?;
    if !config.preflight.supports(&target) {
        let supported: Vec<String> = config
            .preflight
            .supported_platforms
            .iter()
            .map(|p| format!("{} {}", p.id, p.versions.join("/")))
            .collect();
        return Err(crate::error::ProvisionError::precondition(format!(
            "Unsupported operating system {} (supported: {})",
            target,
            supported.join(", ")
        )));
    }
    log.info(format!("Detected supported operating system: {}", target))?;

    let path = &config.preflight.free_space_path;
    let available = probe
        .free_space_mb(path)
        .map_err(|e| crate::error::ProvisionError::precondition(e.to_string()))?;
    if available < config.preflight.min_free_space_mb {
        return Err(crate::error::ProvisionError::precondition(format!(
            "Insufficient disk space on {}: {} MB available, {} MB required",
            path.display(),
            available,
            config.preflight.min_free_space_mb
        )));
    }
    log.info(format!(
        "Free space on {}: {} MB (minimum {} MB)",
        path.display(),
        available,
        config.preflight.min_free_space_mb
    ))?;

    Ok(target)
}
