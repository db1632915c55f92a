// file: src/config/platform.rs
// version: 1.0.0
// guid: db80a116-c41e-431c-88c7-2e2352ebd236

//! Operating system identity and the supported platform allow-list

use serde::{Deserialize, Serialize};
use std::fmt;

/// OS identity of the host being provisioned, as read from os-release
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallationTarget {
    /// Distribution id (`ID=`), e.g. `ubuntu`
    pub id: String,
    /// Version string (`VERSION_ID=`), e.g. `22.04`
    pub version_id: String,
}

impl InstallationTarget {
    pub fn new(id: impl Into<String>, version_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            version_id: version_id.into(),
        }
    }
}

impl fmt::Display for InstallationTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.id, self.version_id)
    }
}

/// One distribution and the versions of it the provisioner accepts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportedPlatform {
    pub id: String,
    pub versions: Vec<String>,
}

impl SupportedPlatform {
    pub fn new(id: &str, versions: &[&str]) -> Self {
        Self {
            id: id.to_string(),
            versions: versions.iter().map(|v| v.to_string()).collect(),
        }
    }

    /// Distribution ids compare case-insensitively, versions exactly
    pub fn matches(&self, target: &InstallationTarget) -> bool {
        self.id.eq_ignore_ascii_case(&target.id)
            && self.versions.iter().any(|v| v == &target.version_id)
    }
}
