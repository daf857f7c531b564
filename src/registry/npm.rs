//! npm registry operations
//!
//! The registry is a black box reached through the npm CLI: existence checks
//! via `npm view`, authentication via `npm config set`, publishing via
//! `npm publish`. Post-publish verification probes the public registry JSON
//! endpoint directly.

use crate::core::error::RepublishError;
use crate::security::command_executor::{CommandError, CommandRunner};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::collections::HashMap;

/// Registry host used for authentication and verification
pub const NPM_REGISTRY_HOST: &str = "registry.npmjs.org";

/// Diagnostic marker npm emits for an unknown package or version.
///
/// Matching on CLI diagnostics is a fragile contract; the rule lives in
/// [`is_not_found_marker`] alone so it can be swapped when npm's wording
/// changes.
const NOT_FOUND_MARKER: &str = "E404";

/// Check whether a diagnostic stream signals "package/version not found"
pub fn is_not_found_marker(diagnostic: &str) -> bool {
    diagnostic.contains(NOT_FOUND_MARKER)
}

/// Registry package info returned by the public JSON endpoint
#[derive(Debug, Deserialize)]
struct NpmRegistryInfo {
    #[serde(default)]
    versions: HashMap<String, serde_json::Value>,
}

/// npm registry client driving the npm CLI
pub struct NpmRegistry {
    runner: CommandRunner,
}

impl NpmRegistry {
    pub fn new(runner: CommandRunner) -> Self {
        Self { runner }
    }

    /// Check whether `name@version` already exists on the registry.
    ///
    /// - exit 0 means the version exists;
    /// - a nonzero exit whose stderr carries the not-found marker means it
    ///   does not (a control-flow signal, not an error);
    /// - any other nonzero exit is an unexpected registry failure.
    pub async fn is_published(&self, name: &str, version: &str) -> Result<bool, RepublishError> {
        let spec = format!("{name}@{version}");

        let output = self
            .runner
            .run_captured("npm", &["view", &spec])
            .await
            .map_err(|e| RepublishError::RegistryQueryFailed {
                package: spec.clone(),
                message: e.to_string(),
            })?;

        if output.status.success() {
            return Ok(true);
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        if is_not_found_marker(&stderr) {
            return Ok(false);
        }

        Err(RepublishError::RegistryQueryFailed {
            package: spec,
            message: stderr.trim().to_string(),
        })
    }

    /// Configure registry authentication from the publish token.
    ///
    /// Output is captured, never streamed, so the token cannot reach the
    /// terminal; any diagnostic surfaced in an error has the token redacted.
    pub async fn configure_auth(&self, token: &SecretString) -> Result<(), RepublishError> {
        let assignment = format!(
            "//{}/:_authToken={}",
            NPM_REGISTRY_HOST,
            token.expose_secret()
        );

        let output = self
            .runner
            .run_captured("npm", &["config", "set", &assignment])
            .await
            .map_err(|e| auth_failure(e.to_string(), token))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(auth_failure(stderr, token));
        }

        Ok(())
    }

    /// Publish the package from the working directory
    pub async fn publish(&self, dry_run: bool) -> Result<(), RepublishError> {
        let mut args = vec!["publish"];
        if dry_run {
            args.push("--dry-run");
        }

        self.runner
            .run("npm", &args)
            .await
            .map_err(command_failure)
    }

    /// Verify that `name@version` is visible on the registry.
    ///
    /// Read-only probe of the public JSON endpoint; callers treat a negative
    /// or failed probe as a warning since publishing already succeeded.
    pub async fn verify(&self, name: &str, version: &str) -> anyhow::Result<bool> {
        let url = format!("https://{}/{}", NPM_REGISTRY_HOST, name);
        let client = reqwest::Client::new();
        let response = client.get(&url).send().await?;

        if !response.status().is_success() {
            anyhow::bail!(
                "パッケージ {} が npmjs.com で見つかりません（HTTP {}）",
                name,
                response.status()
            );
        }

        let info = response.json::<NpmRegistryInfo>().await?;
        Ok(info.versions.contains_key(version))
    }

    /// Public package page for the published fork
    pub fn package_url(name: &str) -> String {
        format!("https://www.npmjs.com/package/{name}")
    }
}

fn command_failure(error: CommandError) -> RepublishError {
    match error {
        CommandError::ExitFailure {
            command_line,
            status,
        } => RepublishError::CommandFailed {
            command: command_line,
            message: format!("exit status: {status}"),
        },
        other => RepublishError::CommandFailed {
            command: "npm".to_string(),
            message: other.to_string(),
        },
    }
}

fn auth_failure(message: String, token: &SecretString) -> RepublishError {
    RepublishError::CommandFailed {
        command: format!("npm config set //{}/:_authToken=***", NPM_REGISTRY_HOST),
        message: message.replace(token.expose_secret(), "***"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_marker_detected() {
        let stderr = "npm error code E404\nnpm error 404 Not Found - GET \
                      https://registry.npmjs.org/@smeijer%2fky - Not found";
        assert!(is_not_found_marker(stderr));
    }

    #[test]
    fn test_other_failures_are_not_not_found() {
        assert!(!is_not_found_marker("npm error code E401\nnpm error Unauthorized"));
        assert!(!is_not_found_marker("npm error network ETIMEDOUT"));
        assert!(!is_not_found_marker(""));
    }

    #[test]
    fn test_package_url() {
        assert_eq!(
            NpmRegistry::package_url("@smeijer/ky"),
            "https://www.npmjs.com/package/@smeijer/ky"
        );
    }

    #[test]
    fn test_auth_failure_redacts_token() {
        let token = SecretString::new("npm_supersecrettoken".to_string().into());
        let error = auth_failure("bad token: npm_supersecrettoken".to_string(), &token);

        let display = format!("{error}");
        assert!(!display.contains("npm_supersecrettoken"));
        assert!(display.contains("***"));
    }

    #[test]
    fn test_command_failure_keeps_command_line() {
        let error = command_failure(CommandError::ExitFailure {
            command_line: "npm publish".to_string(),
            status: "1".to_string(),
        });

        assert_eq!(error.code(), "COMMAND_FAILED");
        assert!(error.to_string().contains("npm publish"));
    }

    #[test]
    fn test_registry_info_deserialization() {
        let json = r#"{
            "name": "@smeijer/ky",
            "dist-tags": { "latest": "1.7.2" },
            "versions": { "1.7.1": {}, "1.7.2": {} }
        }"#;

        let info: NpmRegistryInfo = serde_json::from_str(json).unwrap();
        assert_eq!(info.versions.len(), 2);
        assert!(info.versions.contains_key("1.7.2"));
        assert!(!info.versions.contains_key("1.8.0"));
    }
}
