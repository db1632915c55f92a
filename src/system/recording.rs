// file: src/system/recording.rs
// version: 1.0.0
// guid: 891ea74c-c61a-4779-b5ae-38a0c47ddc9f

//! A mutator that records commands instead of running them
//!
//! Backs `--dry-run` (nothing touches the host) and the test suites, which
//! let file operations land in a scratch directory while commands are only
//! recorded and optionally made to fail.

use super::command::{CommandOutput, SystemCommand};
use super::mutator::{host_fs, SystemMutator};
use crate::Result;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::info;

/// File operation seen by a [`RecordingSystem`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOperation {
    CreateDir(PathBuf),
    Write(PathBuf),
    Append { path: PathBuf, line: String },
    Copy { from: PathBuf, to: PathBuf },
}

#[derive(Debug, Clone)]
struct InjectedFailure {
    pattern: String,
    exit_code: i32,
    stderr: String,
}

#[derive(Debug)]
pub struct RecordingSystem {
    commands: Vec<SystemCommand>,
    file_operations: Vec<FileOperation>,
    failures: Vec<InjectedFailure>,
    missing_programs: HashSet<String>,
    apply_files: bool,
}

impl RecordingSystem {
    /// Record commands; file operations still happen on disk
    pub fn new() -> Self {
        Self {
            commands: Vec::new(),
            file_operations: Vec::new(),
            failures: Vec::new(),
            missing_programs: HashSet::new(),
            apply_files: true,
        }
    }

    /// Record everything and change nothing
    pub fn dry_run() -> Self {
        Self {
            apply_files: false,
            ..Self::new()
        }
    }

    /// Fail any command whose command line contains `pattern`
    pub fn fail_when(mut self, pattern: &str, exit_code: i32, stderr: &str) -> Self {
        self.failures.push(InjectedFailure {
            pattern: pattern.to_string(),
            exit_code,
            stderr: stderr.to_string(),
        });
        self
    }

    /// Report `program` as absent from PATH
    pub fn without_program(mut self, program: &str) -> Self {
        self.missing_programs.insert(program.to_string());
        self
    }

    pub fn commands(&self) -> &[SystemCommand] {
        &self.commands
    }

    pub fn command_lines(&self) -> Vec<String> {
        self.commands.iter().map(|c| c.command_line()).collect()
    }

    pub fn file_operations(&self) -> &[FileOperation] {
        &self.file_operations
    }

    /// True when nothing was run and no file was touched
    pub fn is_untouched(&self) -> bool {
        self.commands.is_empty() && self.file_operations.is_empty()
    }

    fn note(&mut self, operation: FileOperation) {
        if !self.apply_files {
            info!("[dry-run] {:?}", operation);
        }
        self.file_operations.push(operation);
    }
}

impl Default for RecordingSystem {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl SystemMutator for RecordingSystem {
    async fn run(&mut self, command: &SystemCommand) -> Result<CommandOutput> {
        if !self.apply_files {
            info!("[dry-run] would run: {}", command);
        }
        self.commands.push(command.clone());

        let line = command.command_line();
        if let Some(failure) = self.failures.iter().find(|f| line.contains(&f.pattern)) {
            return Err(crate::error::ProvisionError::ProcessError {
                command: line,
                exit_code: Some(failure.exit_code),
                stderr: failure.stderr.clone(),
            });
        }

        Ok(CommandOutput::default())
    }

    async fn command_available(&mut self, program: &str) -> bool {
        !self.missing_programs.contains(program)
    }

    async fn create_dir_all(&mut self, path: &Path) -> Result<()> {
        self.note(FileOperation::CreateDir(path.to_path_buf()));
        if self.apply_files {
            host_fs::create_dir_all(path).await?;
        }
        Ok(())
    }

    async fn write_file(&mut self, path: &Path, contents: &str) -> Result<()> {
        self.note(FileOperation::Write(path.to_path_buf()));
        if self.apply_files {
            host_fs::write_file(path, contents).await?;
        }
        Ok(())
    }

    async fn append_line(&mut self, path: &Path, line: &str) -> Result<()> {
        self.note(FileOperation::Append {
            path: path.to_path_buf(),
            line: line.to_string(),
        });
        if self.apply_files {
            host_fs::append_line(path, line).await?;
        }
        Ok(())
    }

    async fn copy_file(&mut self, from: &Path, to: &Path) -> Result<()> {
        self.note(FileOperation::Copy {
            from: from.to_path_buf(),
            to: to.to_path_buf(),
        });
        if self.apply_files {
            host_fs::copy_file(from, to).await?;
        }
        Ok(())
    }
}
