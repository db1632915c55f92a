// file: src/provision/report.rs
// version: 1.0.0
// guid: 93d69afd-ea82-478e-a357-354ef76cecfa

//! Machine-readable summary of a provisioning run

use super::Phase;
use crate::config::InstallationTarget;
use crate::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseFailure {
    pub phase: Phase,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvisionReport {
    pub run_id: Uuid,
    pub dry_run: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub target: Option<InstallationTarget>,
    pub completed_phases: Vec<Phase>,
    pub failure: Option<PhaseFailure>,
    /// Where the previous server configuration was copied, if one existed
    pub backup_path: Option<PathBuf>,
    /// SHA-256 of the server configuration written by this run
    pub config_sha256: Option<String>,
    pub username: Option<String>,
}

impl ProvisionReport {
    pub fn new(dry_run: bool) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            dry_run,
            started_at: Utc::now(),
            finished_at: None,
            target: None,
            completed_phases: Vec::new(),
            failure: None,
            backup_path: None,
            config_sha256: None,
            username: None,
        }
    }

    pub fn complete(&mut self, phase: Phase) {
        self.completed_phases.push(phase);
    }

    pub fn fail(&mut self, phase: Phase, reason: impl Into<String>) {
        self.failure = Some(PhaseFailure {
            phase,
            reason: reason.into(),
        });
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    pub fn succeeded(&self) -> bool {
        self.failure.is_none() && self.completed_phases.len() == Phase::ALL.len()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}
