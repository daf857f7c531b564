//! Configuration structures for fork-republish
//!
//! Every value the pipeline depends on is threaded through [`ForkConfig`]
//! explicitly, including the working directory. Defaults reproduce the fixed
//! republishing behavior; an optional `.republish.yml` can override them.

use crate::core::error::RepublishError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default configuration file name, looked up in the current directory
pub const CONFIG_FILE: &str = ".republish.yml";

/// Root configuration object
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ForkConfig {
    /// Disposable working directory, wiped at the start of each run
    #[serde(rename = "workDir")]
    pub work_dir: PathBuf,

    /// Upstream project being forked
    pub upstream: UpstreamConfig,

    /// Identity of the republished fork
    pub fork: ForkIdentity,
}

/// Upstream project settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Clone URL of the upstream repository
    #[serde(rename = "repoUrl")]
    pub repo_url: String,

    /// Human-facing project URL, linked from the fork notice
    #[serde(rename = "projectUrl")]
    pub project_url: String,

    /// Source directory to rename to `src` after cloning
    #[serde(rename = "sourceDir")]
    pub source_dir: String,

    /// README file name inside the upstream repository
    #[serde(rename = "readmeFile")]
    pub readme_file: String,

    /// Upstream-specific files deleted after cloning
    #[serde(rename = "removeFiles")]
    pub remove_files: Vec<String>,
}

/// Fork identity written into the rewritten package descriptor
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ForkIdentity {
    /// Published package name (scoped)
    pub name: String,

    /// Repository URL recorded in the descriptor (`git+https://...`)
    #[serde(rename = "repoUrl")]
    pub repo_url: String,

    /// Human-facing project URL, linked from the fork notice
    #[serde(rename = "projectUrl")]
    pub project_url: String,

    /// Funding URL
    #[serde(rename = "fundingUrl")]
    pub funding_url: String,

    /// Author name
    #[serde(rename = "authorName")]
    pub author_name: String,

    /// Author email
    #[serde(rename = "authorEmail")]
    pub author_email: String,

    /// License identifier
    pub license: String,
}

impl Default for ForkConfig {
    fn default() -> Self {
        Self {
            work_dir: PathBuf::from(".package"),
            upstream: UpstreamConfig::default(),
            fork: ForkIdentity::default(),
        }
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            repo_url: "https://github.com/sindresorhus/ky.git".to_string(),
            project_url: "https://github.com/sindresorhus/ky".to_string(),
            source_dir: "source".to_string(),
            readme_file: "readme.md".to_string(),
            remove_files: vec!["tsconfig.json".to_string()],
        }
    }
}

impl Default for ForkIdentity {
    fn default() -> Self {
        Self {
            name: "@smeijer/ky".to_string(),
            repo_url: "git+https://github.com/smeijer/ky.git".to_string(),
            project_url: "https://github.com/smeijer/ky".to_string(),
            funding_url: "https://github.com/smeijer/ky?sponsor=1".to_string(),
            author_name: "Stephan Meijer".to_string(),
            author_email: "stephan.meijer@gmail.com".to_string(),
            license: "MIT".to_string(),
        }
    }
}

impl ForkConfig {
    /// Load configuration from the given file, falling back to defaults when
    /// the file does not exist. A present-but-invalid file is an error.
    pub async fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, RepublishError> {
        let path = path.as_ref();

        match tokio::fs::read_to_string(path).await {
            Ok(content) => {
                serde_yaml::from_str(&content).map_err(|e| RepublishError::ConfigParseFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(RepublishError::ConfigReadFailed {
                path: path.to_path_buf(),
                source: e,
            }),
        }
    }

    /// Path to the package descriptor inside the working directory
    pub fn manifest_path(&self) -> PathBuf {
        self.work_dir.join("package.json")
    }

    /// Path to the README inside the working directory
    pub fn readme_path(&self) -> PathBuf {
        self.work_dir.join(&self.upstream.readme_file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = ForkConfig::default();
        assert_eq!(config.work_dir, PathBuf::from(".package"));
        assert_eq!(config.fork.name, "@smeijer/ky");
        assert_eq!(config.fork.license, "MIT");
        assert_eq!(config.upstream.source_dir, "source");
        assert_eq!(config.upstream.remove_files, vec!["tsconfig.json"]);
    }

    #[test]
    fn test_manifest_and_readme_paths() {
        let config = ForkConfig::default();
        assert_eq!(config.manifest_path(), PathBuf::from(".package/package.json"));
        assert_eq!(config.readme_path(), PathBuf::from(".package/readme.md"));
    }

    #[test]
    fn test_serialize_config() {
        let config = ForkConfig::default();
        let yaml = serde_yaml::to_string(&config).unwrap();
        assert!(yaml.contains("workDir: .package"));
        assert!(yaml.contains("authorName: Stephan Meijer"));
    }

    #[test]
    fn test_deserialize_partial_config() {
        let yaml = r#"
workDir: /tmp/republish
fork:
  name: "@acme/ky"
"#;
        let config: ForkConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.work_dir, PathBuf::from("/tmp/republish"));
        assert_eq!(config.fork.name, "@acme/ky");
        // Unspecified sections keep their defaults
        assert_eq!(config.fork.license, "MIT");
        assert_eq!(config.upstream.readme_file, "readme.md");
    }

    #[tokio::test]
    async fn test_load_or_default_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let config = ForkConfig::load_or_default(temp_dir.path().join(CONFIG_FILE))
            .await
            .unwrap();
        assert_eq!(config, ForkConfig::default());
    }

    #[tokio::test]
    async fn test_load_or_default_reads_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(CONFIG_FILE);
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "workDir: cloned").unwrap();

        let config = ForkConfig::load_or_default(&path).await.unwrap();
        assert_eq!(config.work_dir, PathBuf::from("cloned"));
    }

    #[tokio::test]
    async fn test_load_or_default_invalid_yaml() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(CONFIG_FILE);
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "workDir: [unclosed").unwrap();

        let result = ForkConfig::load_or_default(&path).await;
        assert!(result.is_err());
    }
}
