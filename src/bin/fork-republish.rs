//! fork-republish CLI
//!
//! Republishes a forked npm package under the fork's name

use anyhow::Result;
use clap::Parser;
use fork_republish::{CONFIG_FILE, ForkConfig, RepublishError, RepublishOptions, Republisher};
use std::path::PathBuf;
use std::process;

/// Republish a forked npm package under a new name
#[derive(Parser)]
#[command(name = "fork-republish")]
#[command(version = "0.1.0")]
#[command(about = "Republish a forked npm package under a new name", long_about = None)]
struct Cli {
    /// Configuration file (defaults reproduce the fixed fork behavior)
    #[arg(short, long, default_value = CONFIG_FILE)]
    config: PathBuf,

    /// Override the working directory from the configuration
    #[arg(long)]
    work_dir: Option<PathBuf>,

    /// Run the full pipeline but publish with --dry-run and skip auth
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() {
    let result = run().await;

    match result {
        Ok(exit_code) => process::exit(exit_code),
        Err(e) => {
            eprintln!("\n❌ Error");
            eprintln!("{}", e);

            if let Some(republish_error) = e.downcast_ref::<RepublishError>() {
                eprintln!("  [{}]", republish_error.code());
                for action in republish_error.suggested_actions() {
                    eprintln!("  💡 {}", action);
                }
            }

            process::exit(1);
        }
    }
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();

    println!("\n📦 fork-republish\n");

    let mut config = ForkConfig::load_or_default(&cli.config).await?;
    if let Some(work_dir) = cli.work_dir {
        config.work_dir = work_dir;
    }

    let republisher = Republisher::new(
        config,
        RepublishOptions {
            dry_run: cli.dry_run,
        },
    );

    let report = republisher.run().await?;

    for warning in &report.warnings {
        eprintln!("⚠️  {}", warning);
    }

    if report.already_published {
        println!(
            "\n✅ Done, {}@{} is already published",
            report.package_name, report.version
        );
    } else if report.published {
        println!(
            "\n✅ Done, published {}@{}",
            report.package_name, report.version
        );
        println!("   {}", report.package_url);
    } else {
        println!(
            "\n✅ Dry-run completed for {}@{}",
            report.package_name, report.version
        );
    }

    Ok(0)
}
