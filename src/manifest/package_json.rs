//! Package descriptor rewriting
//!
//! The descriptor lifecycle is read-once, mutate-once, write-once: the
//! upstream `package.json` is deserialized, a fork descriptor is built from it
//! (preserving a fixed subset of upstream fields verbatim, replacing the
//! rest with fork identity values), validated, and serialized back.

use crate::core::config::ForkIdentity;
use crate::core::error::RepublishError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

/// Fields read from the upstream package.json
///
/// Pass-through fields are kept as raw JSON values so arbitrary upstream
/// shapes (string-or-array keywords, boolean-or-list sideEffects) survive
/// the rewrite untouched.
#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamManifest {
    pub version: String,
    #[serde(default)]
    pub description: Option<Value>,
    #[serde(rename = "sideEffects", default)]
    pub side_effects: Option<Value>,
    #[serde(default)]
    pub engines: Option<Value>,
    #[serde(default)]
    pub keywords: Option<Value>,
    #[serde(default)]
    pub dependencies: Option<Value>,
    #[serde(rename = "devDependencies", default)]
    pub dev_dependencies: Option<Value>,
    #[serde(rename = "peerDependencies", default)]
    pub peer_dependencies: Option<Value>,
}

impl UpstreamManifest {
    /// Load the upstream descriptor from disk
    pub async fn load<P: AsRef<Path>>(path: P) -> Result<Self, RepublishError> {
        let path = path.as_ref();
        let content =
            tokio::fs::read_to_string(path)
                .await
                .map_err(|e| RepublishError::ManifestReadFailed {
                    path: path.to_path_buf(),
                    source: e,
                })?;

        serde_json::from_str(&content).map_err(|e| RepublishError::ManifestParseFailed {
            message: e.to_string(),
        })
    }
}

/// Repository metadata written into the fork descriptor
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Repository {
    #[serde(rename = "type")]
    pub repo_type: String,
    pub url: String,
}

/// Author metadata written into the fork descriptor
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Author {
    pub name: String,
    pub email: String,
}

/// tshy build-tool configuration, fixed for the fork's `src/` layout
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TshyConfig {
    pub exports: TshyExports,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TshyExports {
    #[serde(rename = "./package.json")]
    pub package_json: String,
    #[serde(rename = ".")]
    pub root: String,
}

impl Default for TshyConfig {
    fn default() -> Self {
        Self {
            exports: TshyExports {
                package_json: "./package.json".to_string(),
                root: "./src/index.ts".to_string(),
            },
        }
    }
}

/// The rewritten package descriptor
///
/// Struct field order is the serialization order of the persisted file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ForkManifest {
    pub name: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<Value>,
    pub license: String,
    pub repository: Repository,
    pub funding: String,
    pub author: Author,
    #[serde(rename = "type")]
    pub module_type: String,
    #[serde(rename = "sideEffects", default, skip_serializing_if = "Option::is_none")]
    pub side_effects: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engines: Option<Value>,
    pub files: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependencies: Option<Value>,
    #[serde(rename = "devDependencies", default, skip_serializing_if = "Option::is_none")]
    pub dev_dependencies: Option<Value>,
    #[serde(rename = "peerDependencies", default, skip_serializing_if = "Option::is_none")]
    pub peer_dependencies: Option<Value>,
    pub tshy: TshyConfig,
}

impl ForkManifest {
    /// Build the fork descriptor from the upstream one.
    ///
    /// Version, description, dependency maps, engines, keywords and the
    /// sideEffects flag are carried over verbatim; everything else is set
    /// from the fork identity regardless of the upstream values.
    pub fn from_upstream(upstream: &UpstreamManifest, fork: &ForkIdentity) -> Self {
        Self {
            name: fork.name.clone(),
            version: upstream.version.clone(),
            description: upstream.description.clone(),
            license: fork.license.clone(),
            repository: Repository {
                repo_type: "git".to_string(),
                url: fork.repo_url.clone(),
            },
            funding: fork.funding_url.clone(),
            author: Author {
                name: fork.author_name.clone(),
                email: fork.author_email.clone(),
            },
            module_type: "module".to_string(),
            side_effects: upstream.side_effects.clone(),
            engines: upstream.engines.clone(),
            files: vec!["dist".to_string()],
            keywords: upstream.keywords.clone(),
            dependencies: upstream.dependencies.clone(),
            dev_dependencies: upstream.dev_dependencies.clone(),
            peer_dependencies: upstream.peer_dependencies.clone(),
            tshy: TshyConfig::default(),
        }
    }

    /// Validate the descriptor against npm naming rules and SemVer
    pub fn validate(&self) -> Result<(), RepublishError> {
        validate_package_name(&self.name)?;

        if semver::Version::parse(&self.version).is_err() {
            return Err(RepublishError::InvalidVersion {
                version: self.version.clone(),
            });
        }

        Ok(())
    }

    /// Persist the descriptor with two-space pretty JSON
    pub async fn write<P: AsRef<Path>>(&self, path: P) -> Result<(), RepublishError> {
        let path = path.as_ref();
        let content =
            serde_json::to_string_pretty(self).map_err(|e| RepublishError::ManifestParseFailed {
                message: e.to_string(),
            })?;

        tokio::fs::write(path, content)
            .await
            .map_err(|e| RepublishError::ManifestWriteFailed {
                path: path.to_path_buf(),
                source: e,
            })
    }
}

/// Validate a package name according to npm rules
/// https://docs.npmjs.com/cli/v9/configuring-npm/package-json#name
pub fn validate_package_name(name: &str) -> Result<(), RepublishError> {
    let invalid = |message: &str| RepublishError::InvalidPackageName {
        name: name.to_string(),
        message: message.to_string(),
    };

    // Length check (including scope)
    if name.len() > 214 {
        return Err(invalid("パッケージ名は214文字以内である必要があります"));
    }

    if name.is_empty() {
        return Err(invalid("パッケージ名が空です"));
    }

    // No uppercase letters
    if name.chars().any(|c| c.is_uppercase()) {
        return Err(invalid("パッケージ名に大文字を含めることはできません"));
    }

    // Extract name without scope
    let name_without_scope = if name.starts_with('@') {
        name.split('/').nth(1).unwrap_or(name)
    } else {
        name
    };

    // URL-safe characters only (lowercase, numbers, hyphens, underscores, dots)
    let valid_chars_regex = Regex::new(r"^[a-z0-9._-]+$").unwrap();
    if !valid_chars_regex.is_match(name_without_scope) {
        return Err(invalid(
            "パッケージ名は小文字英数字とハイフン、アンダースコア、ドットのみ使用可能です",
        ));
    }

    // Cannot start with . or _
    if name_without_scope.starts_with('.') || name_without_scope.starts_with('_') {
        return Err(invalid(
            "パッケージ名はドットまたはアンダースコアで始めることはできません",
        ));
    }

    // No non-URL-safe characters in the full (scoped) name
    let url_safe_regex = Regex::new(r"^[@a-z0-9._/-]+$").unwrap();
    if !url_safe_regex.is_match(name) {
        return Err(invalid("パッケージ名はURL安全な文字のみ使用可能です"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::ForkIdentity;
    use serde_json::json;
    use tempfile::TempDir;

    fn ky_like_upstream() -> UpstreamManifest {
        serde_json::from_value(json!({
            "name": "ky",
            "version": "1.7.2",
            "description": "Tiny and elegant HTTP client",
            "license": "MIT",
            "repository": "sindresorhus/ky",
            "sideEffects": false,
            "engines": { "node": ">=18" },
            "keywords": ["fetch", "request", "http"],
            "dependencies": {},
            "devDependencies": { "typescript": "^5.0.0", "tshy": "^3.0.0" },
            "scripts": { "test": "xo && ava" }
        }))
        .unwrap()
    }

    #[test]
    fn test_from_upstream_preserves_fields_verbatim() {
        let upstream = ky_like_upstream();
        let fork = ForkManifest::from_upstream(&upstream, &ForkIdentity::default());

        assert_eq!(fork.version, "1.7.2");
        assert_eq!(
            fork.description,
            Some(json!("Tiny and elegant HTTP client"))
        );
        assert_eq!(fork.side_effects, Some(json!(false)));
        assert_eq!(fork.engines, Some(json!({ "node": ">=18" })));
        assert_eq!(fork.keywords, Some(json!(["fetch", "request", "http"])));
        assert_eq!(fork.dependencies, Some(json!({})));
        assert_eq!(
            fork.dev_dependencies,
            Some(json!({ "typescript": "^5.0.0", "tshy": "^3.0.0" }))
        );
        assert_eq!(fork.peer_dependencies, None);
    }

    #[test]
    fn test_from_upstream_sets_fixed_fields() {
        let upstream = ky_like_upstream();
        let fork = ForkManifest::from_upstream(&upstream, &ForkIdentity::default());

        assert_eq!(fork.name, "@smeijer/ky");
        assert_eq!(fork.license, "MIT");
        assert_eq!(fork.repository.repo_type, "git");
        assert_eq!(fork.repository.url, "git+https://github.com/smeijer/ky.git");
        assert_eq!(fork.funding, "https://github.com/smeijer/ky?sponsor=1");
        assert_eq!(fork.author.name, "Stephan Meijer");
        assert_eq!(fork.author.email, "stephan.meijer@gmail.com");
        assert_eq!(fork.module_type, "module");
        assert_eq!(fork.files, vec!["dist"]);
        assert_eq!(fork.tshy.exports.root, "./src/index.ts");
        assert_eq!(fork.tshy.exports.package_json, "./package.json");
    }

    #[test]
    fn test_fixed_fields_override_upstream_values() {
        // Upstream license/repository must never leak into the fork
        let upstream: UpstreamManifest = serde_json::from_value(json!({
            "version": "2.0.0",
            "license": "Apache-2.0",
            "author": "Someone Else",
            "repository": { "type": "git", "url": "git+https://github.com/other/repo.git" }
        }))
        .unwrap();

        let fork = ForkManifest::from_upstream(&upstream, &ForkIdentity::default());
        assert_eq!(fork.license, "MIT");
        assert_eq!(fork.repository.url, "git+https://github.com/smeijer/ky.git");
        assert_eq!(fork.author.name, "Stephan Meijer");
    }

    #[test]
    fn test_serialization_shape() {
        let upstream = ky_like_upstream();
        let fork = ForkManifest::from_upstream(&upstream, &ForkIdentity::default());
        let json = serde_json::to_string_pretty(&fork).unwrap();

        assert!(json.contains("\"devDependencies\""));
        assert!(json.contains("\"sideEffects\": false"));
        assert!(json.contains("\"type\": \"module\""));
        assert!(json.contains("\"./package.json\": \"./package.json\""));
        // Absent upstream fields are omitted, not serialized as null
        assert!(!json.contains("peerDependencies"));
    }

    #[test]
    fn test_validate_accepts_default_fork() {
        let upstream = ky_like_upstream();
        let fork = ForkManifest::from_upstream(&upstream, &ForkIdentity::default());
        assert!(fork.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_version() {
        let upstream: UpstreamManifest =
            serde_json::from_value(json!({ "version": "not-a-version" })).unwrap();
        let fork = ForkManifest::from_upstream(&upstream, &ForkIdentity::default());

        let error = fork.validate().unwrap_err();
        assert_eq!(error.code(), "INVALID_VERSION");
    }

    #[test]
    fn test_validate_package_name_valid() {
        assert!(validate_package_name("my-package").is_ok());
        assert!(validate_package_name("@scope/my-package").is_ok());
    }

    #[test]
    fn test_validate_package_name_uppercase() {
        assert!(validate_package_name("MyPackage").is_err());
    }

    #[test]
    fn test_validate_package_name_too_long() {
        let long_name = "a".repeat(215);
        assert!(validate_package_name(&long_name).is_err());
    }

    #[test]
    fn test_validate_package_name_starts_with_dot() {
        assert!(validate_package_name(".my-package").is_err());
        assert!(validate_package_name("_my-package").is_err());
    }

    #[test]
    fn test_validate_package_name_invalid_chars() {
        assert!(validate_package_name("my package").is_err());
        assert!(validate_package_name("my!package").is_err());
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let result = UpstreamManifest::load(temp_dir.path().join("package.json")).await;
        assert!(matches!(
            result,
            Err(RepublishError::ManifestReadFailed { .. })
        ));
    }

    #[tokio::test]
    async fn test_load_invalid_json() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("package.json");
        std::fs::write(&path, "{ not json").unwrap();

        let result = UpstreamManifest::load(&path).await;
        assert!(matches!(
            result,
            Err(RepublishError::ManifestParseFailed { .. })
        ));
    }

    #[tokio::test]
    async fn test_write_then_reload_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("package.json");

        let upstream = ky_like_upstream();
        let fork = ForkManifest::from_upstream(&upstream, &ForkIdentity::default());
        fork.write(&path).await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let reloaded: ForkManifest = serde_json::from_str(&content).unwrap();
        assert_eq!(reloaded, fork);
    }
}
