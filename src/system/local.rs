// file: src/system/local.rs
// version: 2.0.0
// guid: local001-2345-6789-abcd-ef0123456789

//! Local command execution on the host being provisioned

use super::command::{CommandOutput, SystemCommand};
use super::mutator::SystemMutator;
use crate::Result;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, error};

/// Runs commands directly on this machine
#[derive(Debug, Default)]
pub struct LocalSystem;

impl LocalSystem {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl SystemMutator for LocalSystem {
    async fn run(&mut self, command: &SystemCommand) -> Result<CommandOutput> {
        debug!("Executing local command: {}", command);

        let mut child = Command::new(command.program())
            .args(command.arguments())
            .envs(
                command
                    .env_vars()
                    .iter()
                    .map(|(k, v)| (k.as_str(), v.as_str())),
            )
            .stdin(if command.stdin().is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| crate::error::ProvisionError::ProcessError {
                command: command.command_line(),
                exit_code: None,
                stderr: format!("Failed to execute command: {}", e),
            })?;

        if let (Some(input), Some(mut stdin)) = (command.stdin(), child.stdin.take()) {
            stdin.write_all(input.as_bytes()).await?;
            stdin.shutdown().await?;
        }

        let output = child.wait_with_output().await.map_err(|e| {
            crate::error::ProvisionError::ProcessError {
                command: command.command_line(),
                exit_code: None,
                stderr: format!("Failed to wait for command: {}", e),
            }
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        if !output.status.success() {
            let exit_code = output.status.code();
            error!("Command failed with exit code {:?}", exit_code);
            if !stdout.trim().is_empty() {
                error!("STDOUT: {}", stdout);
            }
            if !stderr.trim().is_empty() {
                error!("STDERR: {}", stderr);
            }

            return Err(crate::error::ProvisionError::ProcessError {
                command: command.command_line(),
                exit_code,
                stderr: if stderr.trim().is_empty() { stdout } else { stderr },
            });
        }

        debug!("Command executed successfully");
        Ok(CommandOutput {
            exit_code: output.status.code().unwrap_or(0),
            stdout,
            stderr,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_run_captures_stdout() {
        let mut system = LocalSystem::new();
        let output = system
            .run(&SystemCommand::new("echo").arg("hello"))
            .await
            .unwrap();

        assert_eq!(output.exit_code, 0);
        assert_eq!(output.stdout.trim(), "hello");
    }

    #[tokio::test]
    async fn test_run_reports_exit_code() {
        let mut system = LocalSystem::new();
        let result = system
            .run(&SystemCommand::new("sh").args(["-c", "echo nope >&2; exit 3"]))
            .await;

        match result {
            Err(crate::error::ProvisionError::ProcessError {
                exit_code, stderr, ..
            }) => {
                assert_eq!(exit_code, Some(3));
                assert_eq!(stderr.trim(), "nope");
            }
            other => panic!("expected process error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_run_missing_program() {
        let mut system = LocalSystem::new();
        let result = system
            .run(&SystemCommand::new("nonexistent-command-12345"))
            .await;

        assert!(matches!(
            result,
            Err(crate::error::ProvisionError::ProcessError { exit_code: None, .. })
        ));
    }

    #[tokio::test]
    async fn test_run_passes_stdin_and_env() {
        let mut system = LocalSystem::new();
        let output = system
            .run(
                &SystemCommand::new("sh")
                    .args(["-c", "read line; echo \"$PREFIX$line\""])
                    .env("PREFIX", "got:")
                    .secret_stdin("secret\n"),
            )
            .await
            .unwrap();

        assert_eq!(output.stdout.trim(), "got:secret");
    }

    #[tokio::test]
    async fn test_default_file_operations() -> Result<()> {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("a").join("b");
        let file = dir.join("list");
        let mut system = LocalSystem::new();

        system.create_dir_all(&dir).await?;
        assert_eq!(system.read_file(&file).await?, None);

        system.append_line(&file, "alice").await?;
        system.append_line(&file, "bob").await?;
        assert_eq!(system.read_file(&file).await?.as_deref(), Some("alice\nbob\n"));

        let copy = dir.join("list.bak");
        system.copy_file(&file, &copy).await?;
        assert!(system.path_exists(&copy).await);

        system.write_file(&file, "carol\n").await?;
        assert_eq!(system.read_file(&file).await?.as_deref(), Some("carol\n"));
        assert_eq!(system.read_file(&copy).await?.as_deref(), Some("alice\nbob\n"));
        Ok(())
    }
}
