// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Missing flags fall back to interactive prompts at gather time.

use clap::{Args, Parser, Subcommand};
use slipway::input::{DeployParams, TeardownParams};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "slipway")]
#[command(about = "Provision a host and deploy a containerized app behind nginx")]
#[command(version)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the full pipeline: sync, prepare, deploy, route, validate
    Deploy(DeployArgs),

    /// Tear down a previous deployment's remote resources
    Teardown(TeardownArgs),
}

#[derive(Args)]
pub struct DeployArgs {
    /// Repository URL
    #[arg(long)]
    pub repo: Option<String>,

    /// Access token embedded in the clone URL (prompted for if omitted)
    #[arg(long)]
    pub token: Option<String>,

    /// Branch to deploy (default: main)
    #[arg(long)]
    pub branch: Option<String>,

    /// Target host address
    #[arg(long)]
    pub host: Option<String>,

    /// SSH user on the target
    #[arg(long)]
    pub user: Option<String>,

    /// Private key path
    #[arg(long)]
    pub key: Option<PathBuf>,

    /// Port the application listens on
    #[arg(long)]
    pub port: Option<String>,
}

impl DeployArgs {
    pub fn into_params(self) -> DeployParams {
        DeployParams {
            repo: self.repo,
            token: self.token,
            branch: self.branch,
            host: self.host,
            user: self.user,
            key: self.key,
            port: self.port,
        }
    }
}

#[derive(Args)]
pub struct TeardownArgs {
    /// Repository URL identifying the release
    #[arg(long)]
    pub repo: Option<String>,

    /// Target host address
    #[arg(long)]
    pub host: Option<String>,

    /// SSH user on the target
    #[arg(long)]
    pub user: Option<String>,

    /// Private key path
    #[arg(long)]
    pub key: Option<PathBuf>,
}

impl TeardownArgs {
    pub fn into_params(self) -> TeardownParams {
        TeardownParams {
            repo: self.repo,
            host: self.host,
            user: self.user,
            key: self.key,
        }
    }
}
