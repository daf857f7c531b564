//! Republisher - orchestrator for the fork republishing pipeline
//!
//! Runs the complete workflow as a strictly sequential pipeline:
//! - Clean-slate working directory and upstream clone
//! - Repository restructuring for the fork's build layout
//! - Package descriptor rewrite and validation
//! - Idempotent short-circuit when the version is already published
//! - README fork notice, install, build, type attestation, publish
//! - Post-publish verification and reporting

use crate::core::config::ForkConfig;
use crate::core::error::RepublishError;
use crate::manifest::package_json::{ForkManifest, UpstreamManifest};
use crate::manifest::readme::prepend_fork_notice;
use crate::registry::npm::NpmRegistry;
use crate::security::command_executor::{CommandError, CommandRunner};
use crate::security::token_manager::TokenManager;
use secrecy::ExposeSecret;
use std::time::Instant;

/// Run options passed from the CLI
#[derive(Debug, Clone, Default)]
pub struct RepublishOptions {
    /// Run the full pipeline but publish with `--dry-run` and skip auth
    pub dry_run: bool,
}

/// Report returned after a republish run
#[derive(Debug, Clone)]
pub struct RepublishReport {
    pub package_name: String,
    pub version: String,
    /// True when `npm publish` ran for real this run
    pub published: bool,
    /// True when the run short-circuited on an existing version
    pub already_published: bool,
    pub published_at: Option<chrono::DateTime<chrono::Utc>>,
    pub package_url: String,
    pub warnings: Vec<String>,
    pub duration: u64,
}

/// Fork republishing orchestrator
pub struct Republisher {
    config: ForkConfig,
    options: RepublishOptions,
}

impl Republisher {
    pub fn new(config: ForkConfig, options: RepublishOptions) -> Self {
        Self { config, options }
    }

    /// Run the republishing pipeline.
    ///
    /// Every step blocks until completion before the next one starts; the
    /// first failure aborts the run and leaves the working directory in
    /// place for inspection.
    pub async fn run(&self) -> anyhow::Result<RepublishReport> {
        let start_time = Instant::now();
        let mut warnings = Vec::new();

        // 1. Clean slate: the working directory is wiped every run
        println!("🧹 Preparing working directory: {}", self.config.work_dir.display());
        self.prepare_work_dir().await?;

        let runner = CommandRunner::new(&self.config.work_dir).map_err(command_failed)?;

        // 2. Clone upstream
        println!("📥 Cloning {}...", self.config.upstream.repo_url);
        runner
            .run("git", &["clone", &self.config.upstream.repo_url, "."])
            .await
            .map_err(command_failed)?;

        // 3. Restructure for the fork's build layout
        self.restructure().await?;

        // 4. Rewrite the package descriptor
        println!("📝 Rewriting package.json...");
        let upstream = UpstreamManifest::load(self.config.manifest_path()).await?;
        let fork = ForkManifest::from_upstream(&upstream, &self.config.fork);
        fork.validate()?;
        fork.write(self.config.manifest_path()).await?;

        let registry = NpmRegistry::new(runner.clone());
        let package_url = NpmRegistry::package_url(&fork.name);

        // 5. Idempotent short-circuit
        println!("🔍 Checking registry for {}@{}...", fork.name, fork.version);
        if registry.is_published(&fork.name, &fork.version).await? {
            println!("✅ {}@{} is already published", fork.name, fork.version);
            return Ok(RepublishReport {
                package_name: fork.name,
                version: fork.version,
                published: false,
                already_published: true,
                published_at: None,
                package_url,
                warnings,
                duration: start_time.elapsed().as_millis() as u64,
            });
        }

        // 6. Fork notice
        println!("📄 Prepending fork notice to {}...", self.config.upstream.readme_file);
        prepend_fork_notice(self.config.readme_path(), &self.config).await?;

        // 7. Install, build, type attestation, auth, publish
        println!("📦 Installing dependencies...");
        runner.run("npm", &["install"]).await.map_err(command_failed)?;

        println!("🔨 Building with tshy...");
        runner.run("npx", &["tshy"]).await.map_err(command_failed)?;

        println!("🔎 Checking published types (attw)...");
        runner.run("npx", &["attw", "-P"]).await.map_err(command_failed)?;

        if self.options.dry_run {
            println!("🧪 Dry-run: skipping authentication");
            println!("📤 Publishing (dry-run)...");
            registry.publish(true).await?;

            return Ok(RepublishReport {
                package_name: fork.name,
                version: fork.version,
                published: false,
                already_published: false,
                published_at: None,
                package_url,
                warnings,
                duration: start_time.elapsed().as_millis() as u64,
            });
        }

        let token_manager = TokenManager::new();
        let token = token_manager.require_token()?;
        println!(
            "🔑 Configuring registry auth (token: {})",
            token_manager.mask_token(token.expose_secret())
        );
        registry.configure_auth(&token).await?;

        println!("📤 Publishing...");
        registry.publish(false).await?;

        // 8. Verify (warning only; publishing already succeeded)
        println!("🔍 Verifying publication...");
        match registry.verify(&fork.name, &fork.version).await {
            Ok(true) => println!("  ✅ {}@{} is visible on the registry", fork.name, fork.version),
            Ok(false) => {
                warnings.push(format!(
                    "{}@{} not yet visible on the registry",
                    fork.name, fork.version
                ));
                println!("  ⚠️  Not yet visible (registry propagation can take a moment)");
            }
            Err(e) => {
                warnings.push(format!("Verification error: {e}"));
                println!("  ⚠️  Verification error (but publishing succeeded)");
            }
        }

        Ok(RepublishReport {
            package_name: fork.name,
            version: fork.version,
            published: true,
            already_published: false,
            published_at: Some(chrono::Utc::now()),
            package_url,
            warnings,
            duration: start_time.elapsed().as_millis() as u64,
        })
    }

    /// Recreate the working directory from scratch
    async fn prepare_work_dir(&self) -> Result<(), RepublishError> {
        let work_dir = &self.config.work_dir;

        match tokio::fs::remove_dir_all(work_dir).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(RepublishError::WorkspaceSetupFailed {
                    path: work_dir.clone(),
                    source: e,
                });
            }
        }

        tokio::fs::create_dir_all(work_dir)
            .await
            .map_err(|e| RepublishError::WorkspaceSetupFailed {
                path: work_dir.clone(),
                source: e,
            })
    }

    /// Rename the upstream source directory to `src` and delete
    /// upstream-specific files the fork build does not use.
    async fn restructure(&self) -> Result<(), RepublishError> {
        let work_dir = &self.config.work_dir;
        let from = work_dir.join(&self.config.upstream.source_dir);
        let to = work_dir.join("src");

        println!(
            "🔀 Renaming {} -> src, removing {}",
            self.config.upstream.source_dir,
            self.config.upstream.remove_files.join(", ")
        );

        tokio::fs::rename(&from, &to)
            .await
            .map_err(|e| RepublishError::WorkspaceSetupFailed {
                path: from.clone(),
                source: e,
            })?;

        for file in &self.config.upstream.remove_files {
            let path = work_dir.join(file);
            match tokio::fs::remove_file(&path).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    return Err(RepublishError::WorkspaceSetupFailed { path, source: e });
                }
            }
        }

        Ok(())
    }
}

fn command_failed(error: CommandError) -> RepublishError {
    match error {
        CommandError::ExitFailure {
            command_line,
            status,
        } => RepublishError::CommandFailed {
            command: command_line,
            message: format!("exit status: {status}"),
        },
        other => RepublishError::CommandFailed {
            command: other.to_string(),
            message: String::new(),
        },
    }
}
