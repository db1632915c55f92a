// file: src/system/mutator.rs
// version: 1.0.0
// guid: ddb56508-5fa0-4b1d-b224-4fd552fe1b61

//! The capability through which provisioning changes the host

use super::command::{CommandOutput, SystemCommand};
use crate::Result;
use std::path::Path;

/// Everything a provisioning phase may do to the host.
///
/// Implementations must return an error for any command that exits non-zero.
/// The file operations default to the real filesystem.
#[async_trait::async_trait]
pub trait SystemMutator: Send {
    /// Run an external command to completion
    async fn run(&mut self, command: &SystemCommand) -> Result<CommandOutput>;

    /// Check whether a program is on PATH
    async fn command_available(&mut self, program: &str) -> bool {
        which::which(program).is_ok()
    }

    async fn create_dir_all(&mut self, path: &Path) -> Result<()> {
        host_fs::create_dir_all(path).await
    }

    /// Read a file, `None` when it does not exist
    async fn read_file(&mut self, path: &Path) -> Result<Option<String>> {
        host_fs::read_file(path).await
    }

    /// Replace a file's contents wholesale
    async fn write_file(&mut self, path: &Path, contents: &str) -> Result<()> {
        host_fs::write_file(path, contents).await
    }

    /// Append one line, creating the file if needed
    async fn append_line(&mut self, path: &Path, line: &str) -> Result<()> {
        host_fs::append_line(path, line).await
    }

    async fn copy_file(&mut self, from: &Path, to: &Path) -> Result<()> {
        host_fs::copy_file(from, to).await
    }

    async fn path_exists(&mut self, path: &Path) -> bool {
        tokio::fs::try_exists(path).await.unwrap_or(false)
    }
}

/// Real filesystem operations shared by the mutator implementations
pub(crate) mod host_fs {
    use crate::Result;
    use std::path::Path;
    use tokio::io::AsyncWriteExt;

    pub async fn create_dir_all(path: &Path) -> Result<()> {
        tokio::fs::create_dir_all(path).await?;
        Ok(())
    }

    pub async fn read_file(path: &Path) -> Result<Option<String>> {
        match tokio::fs::read_to_string(path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn write_file(path: &Path, contents: &str) -> Result<()> {
        tokio::fs::write(path, contents).await?;
        Ok(())
    }

    pub async fn append_line(path: &Path, line: &str) -> Result<()> {
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await?;
        file.write_all(format!("{}\n", line).as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }

    pub async fn copy_file(from: &Path, to: &Path) -> Result<()> {
        tokio::fs::copy(from, to).await?;
        Ok(())
    }
}
