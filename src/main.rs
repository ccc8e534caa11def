use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use colored::Colorize;
use forklift::Result;
use std::io;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "forklift")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "One-shot migration tools for forking a Java/Maven monorepo", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Copy Actions secrets to the forked repo (env: GH_PAT, OWNER, NEW_REPO)
    #[command(name = "copy-secrets")]
    CopySecrets,

    /// Rewrite project tokens in file contents, file names and directory names
    Rebrand {
        /// Directory to process
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,

        /// Replacement rule OLD=NEW (repeatable; overrides the built-in table)
        #[arg(short, long = "rule")]
        rules: Vec<String>,
    },

    /// Patch application-local.yaml for the forked environment
    #[command(name = "patch-config")]
    PatchConfig {
        /// Config file to patch (defaults to the post-restructure location)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Move top-level modules into the platform/apps/modules layout
    Restructure {
        /// Repo root (must contain pom.xml)
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,
    },

    /// Split business modules into api/biz pairs
    Split {
        /// Repo root (must contain pom.xml)
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,
    },

    /// Clean up aggregators and dependencies after a split
    #[command(name = "post-split-fix")]
    PostSplitFix {
        /// Repo root
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,
    },

    /// Re-enable commented-out modules and business-module dependencies
    Uncomment {
        /// Repo root
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,
    },

    /// Generate shell completions
    Completions {
        /// Shell type (bash, zsh, fish, powershell)
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn main() {
    let cli = Cli::parse();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("Failed to create tokio runtime");

    if let Err(e) = runtime.block_on(run_async(cli)) {
        eprintln!("{}", format!("Error: {}", e).red());
        std::process::exit(1);
    }
}

async fn run_async(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::CopySecrets => {
            forklift::cli::copy_secrets::run().await?;
        }

        Commands::Rebrand { dir, rules } => {
            forklift::cli::rebrand::run(&dir, &rules).await?;
        }

        Commands::PatchConfig { file } => {
            forklift::cli::patch_config::run(file.as_deref()).await?;
        }

        Commands::Restructure { dir } => {
            forklift::cli::restructure::run(&dir).await?;
        }

        Commands::Split { dir } => {
            forklift::cli::split::run(&dir).await?;
        }

        Commands::PostSplitFix { dir } => {
            forklift::cli::post_split::run(&dir).await?;
        }

        Commands::Uncomment { dir } => {
            forklift::cli::uncomment::run(&dir).await?;
        }

        Commands::Completions { shell } => {
            generate(shell, &mut Cli::command(), "forklift", &mut io::stdout());
        }
    }

    Ok(())
}
