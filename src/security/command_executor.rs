//! CommandRunner: Type-safe external command execution with injection prevention
//!
//! # Security Features
//!
//! - **Whitelist-based validation**: Only pre-approved commands can execute
//! - **Injection prevention**: Uses `tokio::process::Command` which prevents shell injection
//! - **Argument sanitization**: Arguments passed as a slice, never interpolated into shell strings
//! - **Working directory validation**: Validates existence before execution
//!
//! # Example
//!
//! ```rust,no_run
//! use fork_republish::security::CommandRunner;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let runner = CommandRunner::new(std::env::temp_dir()).unwrap();
//! runner.run("git", &["--version"]).await.unwrap();
//! # }
//! ```

use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use thiserror::Error;
use tokio::process::Command;

/// Allowed commands whitelist for security.
///
/// Only these commands can be executed via CommandRunner. The republishing
/// pipeline needs exactly the version-control client, the package manager,
/// and the package runner for build tooling.
const ALLOWED_COMMANDS: &[&str] = &["git", "npm", "npx"];

/// Errors that can occur during command execution
#[derive(Error, Debug)]
pub enum CommandError {
    /// Command is not in the allowed whitelist
    #[error("Command '{0}' is not in the allowed whitelist")]
    CommandNotAllowed(String),

    /// Working directory does not exist or is not accessible
    #[error("Working directory does not exist: {0}")]
    InvalidWorkingDirectory(PathBuf),

    /// Command execution failed (e.g., binary not found, permission denied)
    #[error("Command execution failed: {0}")]
    ExecutionFailed(String),

    /// Command ran but exited with a nonzero status
    #[error("Command failed: {command_line} (exit status: {status})")]
    ExitFailure { command_line: String, status: String },
}

/// Safe command runner with security controls
///
/// Every command executes in a fixed working directory with:
/// - Whitelist validation
/// - Injection prevention through `tokio::process::Command`
/// - Fail-fast nonzero-exit handling, no retry
#[derive(Debug, Clone)]
pub struct CommandRunner {
    /// Working directory where commands will be executed
    working_dir: PathBuf,
}

impl CommandRunner {
    /// Create a new CommandRunner with working directory validation.
    ///
    /// # Errors
    ///
    /// Returns `CommandError::InvalidWorkingDirectory` if the directory does not exist.
    pub fn new<P: AsRef<Path>>(working_dir: P) -> Result<Self, CommandError> {
        let working_dir = working_dir.as_ref().to_path_buf();

        if !working_dir.exists() {
            return Err(CommandError::InvalidWorkingDirectory(working_dir));
        }

        Ok(Self { working_dir })
    }

    /// Execute a command, streaming its output to the parent process's
    /// standard streams.
    ///
    /// Blocks until the command finishes. A nonzero exit status is
    /// `CommandError::ExitFailure` carrying the full command line.
    ///
    /// # Arguments
    ///
    /// * `command` - The command to execute (must be in `ALLOWED_COMMANDS`)
    /// * `args` - Command arguments (safely passed without shell interpretation)
    pub async fn run(&self, command: &str, args: &[&str]) -> Result<(), CommandError> {
        let command_name = Self::resolve_command(command)?;
        let command_line = Self::format_command_line(command, args);

        let status = Command::new(&command_name)
            .args(args)
            .current_dir(&self.working_dir)
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|e| CommandError::ExecutionFailed(format!("{}: {}", command_line, e)))?;

        if !status.success() {
            return Err(CommandError::ExitFailure {
                command_line,
                status: status
                    .code()
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| "terminated by signal".to_string()),
            });
        }

        Ok(())
    }

    /// Execute a command with piped output, returning the captured result.
    ///
    /// Used where the caller needs to inspect stdout/stderr instead of
    /// streaming them (registry queries, auth configuration). The exit status
    /// is returned as-is; interpretation is up to the caller.
    pub async fn run_captured(&self, command: &str, args: &[&str]) -> Result<Output, CommandError> {
        let command_name = Self::resolve_command(command)?;
        let command_line = Self::format_command_line(command, args);

        Command::new(&command_name)
            .args(args)
            .current_dir(&self.working_dir)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| CommandError::ExecutionFailed(format!("{}: {}", command_line, e)))
    }

    /// Working directory commands execute in
    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    /// Whitelist-validate a command and resolve its platform binary name.
    fn resolve_command(command: &str) -> Result<String, CommandError> {
        if !ALLOWED_COMMANDS.contains(&command) {
            return Err(CommandError::CommandNotAllowed(command.to_string()));
        }

        // Windows-specific: npm and npx are .cmd files, not .exe
        #[cfg(target_os = "windows")]
        let command_name = if matches!(command, "npm" | "npx") {
            format!("{}.cmd", command)
        } else {
            command.to_string()
        };

        #[cfg(not(target_os = "windows"))]
        let command_name = command.to_string();

        Ok(command_name)
    }

    fn format_command_line(command: &str, args: &[&str]) -> String {
        if args.is_empty() {
            command.to_string()
        } else {
            format!("{} {}", command, args.join(" "))
        }
    }
}
