// file: src/system/probe.rs
// version: 1.0.0
// guid: 7141fb00-c23d-46b1-b5b5-5fc58a7d734d

//! Read-only inspection of the host: privilege, OS identity, free space

use crate::config::InstallationTarget;
use crate::Result;
use std::fs;
use std::path::{Path, PathBuf};
use sysinfo::Disks;
use tracing::debug;

/// Environment reads performed by the prerequisite checks
pub trait SystemProbe: Send + Sync {
    /// Effective user id of this process
    fn effective_uid(&self) -> u32;

    /// Distribution id and version of the running OS
    fn installation_target(&self) -> Result<InstallationTarget>;

    /// Free space in MB on the filesystem holding `path`
    fn free_space_mb(&self, path: &Path) -> Result<u64>;
}

/// Probe for the machine this process runs on
#[derive(Debug, Clone)]
pub struct HostProbe {
    os_release: PathBuf,
}

impl HostProbe {
    pub fn new(os_release: impl Into<PathBuf>) -> Self {
        Self {
            os_release: os_release.into(),
        }
    }
}

impl SystemProbe for HostProbe {
    fn effective_uid(&self) -> u32 {
        #[cfg(unix)]
        {
            unsafe { libc::geteuid() }
        }
        #[cfg(not(unix))]
        {
            u32::MAX
        }
    }

    fn installation_target(&self) -> Result<InstallationTarget> {
        let content = fs::read_to_string(&self.os_release).map_err(|e| {
            crate::error::ProvisionError::SystemError(format!(
                "Failed to read {}: {}",
                self.os_release.display(),
                e
            ))
        })?;
        parse_os_release(&content)
    }

    fn free_space_mb(&self, path: &Path) -> Result<u64> {
        let disks = Disks::new_with_refreshed_list();

        // Longest mount point containing the path is the filesystem that holds it
        let disk = disks
            .list()
            .iter()
            .filter(|d| path.starts_with(d.mount_point()))
            .max_by_key(|d| d.mount_point().components().count())
            .ok_or_else(|| {
                crate::error::ProvisionError::SystemError(format!(
                    "No mounted filesystem found for {}",
                    path.display()
                ))
            })?;

        debug!(
            "Filesystem for {} mounted at {} has {} bytes available",
            path.display(),
            disk.mount_point().display(),
            disk.available_space()
        );
        Ok(disk.available_space() / (1024 * 1024))
    }
}

/// Parse `ID` and `VERSION_ID` out of os-release content
pub fn parse_os_release(content: &str) -> Result<InstallationTarget> {
    let mut id = None;
    let mut version_id = None;

    for line in content.lines() {
        let line = line.trim();
        if line.starts_with('#') {
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            let value = value.trim().trim_matches('"').trim_matches('\'').to_string();
            match key.trim() {
                "ID" => id = Some(value),
                "VERSION_ID" => version_id = Some(value),
                _ => {}
            }
        }
    }

    match (id, version_id) {
        (Some(id), Some(version_id)) => Ok(InstallationTarget::new(id, version_id)),
        (None, _) => Err(crate::error::ProvisionError::SystemError(
            "os-release has no ID field".to_string(),
        )),
        (_, None) => Err(crate::error::ProvisionError::SystemError(
            "os-release has no VERSION_ID field".to_string(),
        )),
    }
}
