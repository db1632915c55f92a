// file: src/provision/credentials.rs
// version: 1.1.0
// guid: 94485311-78c1-46f7-8588-f42987cd88d5

//! Where the FTP account's username and password come from

use crate::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use std::fmt;
use std::io::{self, BufRead, IsTerminal, Write};

/// Username and password for the account to create
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[async_trait::async_trait]
pub trait CredentialSource: Send {
    async fn credentials(&mut self) -> Result<Credentials>;
}

/// Credentials fixed up front (tests, embedding callers)
pub struct StaticCredentials {
    credentials: Option<Credentials>,
}

impl StaticCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            credentials: Some(Credentials::new(username, password)),
        }
    }
}

#[async_trait::async_trait]
impl CredentialSource for StaticCredentials {
    async fn credentials(&mut self) -> Result<Credentials> {
        self.credentials.take().ok_or_else(|| {
            crate::error::ProvisionError::input("Credentials were already consumed")
        })
    }
}

/// Username from the command line, password from an environment variable.
///
/// The variable is only read when account creation asks for it, so an unset
/// variable never masks a failed prerequisite.
pub struct EnvCredentials {
    username: String,
    var: String,
    lookup: fn(&str) -> Option<String>,
}

impl EnvCredentials {
    pub fn new(username: impl Into<String>, var: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            var: var.into(),
            lookup: |name| std::env::var(name).ok(),
        }
    }

    #[cfg(test)]
    fn with_lookup(mut self, lookup: fn(&str) -> Option<String>) -> Self {
        self.lookup = lookup;
        self
    }
}

#[async_trait::async_trait]
impl CredentialSource for EnvCredentials {
    async fn credentials(&mut self) -> Result<Credentials> {
        let password = (self.lookup)(&self.var).ok_or_else(|| {
            crate::error::ProvisionError::input(format!(
                "--username was given but {} is not set",
                self.var
            ))
        })?;
        Ok(Credentials::new(self.username.clone(), password))
    }
}

/// Interactive prompts on the controlling terminal; the password is not echoed
#[derive(Debug, Default)]
pub struct TerminalPrompt;

impl TerminalPrompt {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl CredentialSource for TerminalPrompt {
    async fn credentials(&mut self) -> Result<Credentials> {
        tokio::task::spawn_blocking(prompt_blocking)
            .await
            .map_err(|e| crate::error::ProvisionError::system(format!("Prompt task failed: {}", e)))?
    }
}

fn prompt_blocking() -> Result<Credentials> {
    print!("Enter FTP username: ");
    io::stdout().flush()?;
    let mut username = String::new();
    io::stdin().lock().read_line(&mut username)?;

    print!("Enter FTP password: ");
    io::stdout().flush()?;
    let password = if io::stdin().is_terminal() {
        read_hidden_line()?
    } else {
        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        line
    };
    println!();

    Ok(Credentials::new(
        username.trim_end_matches(['\r', '\n']).to_string(),
        password.trim_end_matches(['\r', '\n']).to_string(),
    ))
}

/// Restores cooked mode even when reading fails
struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

fn read_hidden_line() -> Result<String> {
    let _guard = RawModeGuard::enable()?;
    let mut line = String::new();

    loop {
        if let Event::Key(KeyEvent {
            code,
            modifiers,
            kind,
            ..
        }) = event::read()?
        {
            if kind == KeyEventKind::Release {
                continue;
            }
            match code {
                KeyCode::Enter => break,
                KeyCode::Backspace => {
                    line.pop();
                }
                KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                    return Err(crate::error::ProvisionError::input("Password entry cancelled"));
                }
                KeyCode::Char(c) => line.push(c),
                _ => {}
            }
        }
    }

    Ok(line)
}
