//! Secure token manager with memory-safe handling and masking capabilities
//!
//! Registry authentication reads the publish token from the environment at
//! publish time, using the `secrecy` crate to prevent accidental token
//! exposure in logs or memory dumps.

use crate::core::error::RepublishError;
use secrecy::SecretString;
use std::env;

/// Environment variable holding the npm publish token
pub const NPM_TOKEN_ENV: &str = "NPM_TOKEN";

/// Secure token manager for registry authentication
///
/// # Examples
///
/// ```
/// use fork_republish::security::TokenManager;
///
/// let manager = TokenManager::new();
/// if let Some(_token) = manager.get_token() {
///     println!("npm token found");
/// }
/// ```
#[derive(Debug)]
pub struct TokenManager {
    env_var: String,
}

impl Default for TokenManager {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenManager {
    /// Creates a new TokenManager reading the default `NPM_TOKEN` variable
    pub fn new() -> Self {
        Self {
            env_var: NPM_TOKEN_ENV.to_string(),
        }
    }

    /// Retrieves the publish token from the environment
    ///
    /// Returns `None` if the variable is not set or empty.
    pub fn get_token(&self) -> Option<SecretString> {
        let value = env::var(&self.env_var).ok()?;
        if value.is_empty() {
            return None;
        }
        Some(SecretString::new(value.into()))
    }

    /// Retrieves the publish token, failing with a typed error when absent
    pub fn require_token(&self) -> Result<SecretString, RepublishError> {
        self.get_token().ok_or_else(|| RepublishError::TokenMissing {
            env_var: self.env_var.clone(),
        })
    }

    /// Masks a token for safe logging
    ///
    /// Shows only the first 3 and last 3 characters for identification
    /// purposes. Tokens shorter than 10 characters are fully masked as "****".
    ///
    /// # Examples
    ///
    /// ```
    /// use fork_republish::security::TokenManager;
    ///
    /// let manager = TokenManager::new();
    /// assert_eq!(manager.mask_token("abcdef123456"), "abc...456");
    /// assert_eq!(manager.mask_token("short"), "****");
    /// ```
    pub fn mask_token(&self, token: &str) -> String {
        if token.len() < 10 {
            return "****".to_string();
        }
        format!("{}...{}", &token[..3], &token[token.len() - 3..])
    }
}
