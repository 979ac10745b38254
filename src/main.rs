// ABOUTME: Entry point for the slipway CLI application.
// ABOUTME: Parses arguments, opens the run log, and drives the pipeline or teardown.

mod cli;

use clap::Parser;
use cli::{Cli, Commands, DeployArgs, TeardownArgs};
use slipway::error::Result;
use slipway::input::{self, InputError, TerminalPrompt};
use slipway::logging::RunLog;
use slipway::pipeline::Rollout;
use slipway::transport::{Session, SessionConfig};
use slipway::types::ReleaseDescriptor;
use slipway::{cleanup, source};
use std::env;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing subscriber based on verbose flag
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    let cwd = env::current_dir().expect("Failed to get current directory");
    let log = match RunLog::create(&cwd) {
        Ok(log) => log,
        Err(e) => {
            eprintln!("Error: failed to create run log: {e}");
            std::process::exit(1);
        }
    };

    let result = run(cli, &log).await;

    // Single error boundary: the ERROR record is the last thing emitted,
    // and the exit code carries the failure class.
    if let Err(e) = result {
        let code = e.exit_code();
        log.error(&e.to_string(), code);
        std::process::exit(code);
    }
}

async fn run(cli: Cli, log: &RunLog) -> Result<()> {
    match cli.command {
        Commands::Deploy(args) => deploy(args, log).await,
        Commands::Teardown(args) => teardown(args, log).await,
    }
}

/// Checkouts are kept between runs so re-deploys fast-forward in place.
fn checkout_root() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(env::temp_dir)
        .join("slipway")
        .join("checkouts")
}

async fn deploy(args: DeployArgs, log: &RunLog) -> Result<()> {
    let mut prompt = TerminalPrompt;
    let input = input::gather_deploy(args.into_params(), &mut prompt)?;

    let release = ReleaseDescriptor::derive(&input.repo_url, &input.branch, &checkout_root())
        .map_err(InputError::from)?;

    let mode = source::obtain(&release, &input.credential, log).await?;
    log.info(&format!("release {} deploys as {}", release.name, mode));

    log.info(&format!(
        "connecting to {}@{}",
        input.target.user, input.target.host
    ));
    let session = Session::connect(SessionConfig::new(
        &input.target.host,
        &input.target.user,
        &input.target.key_path,
    ))
    .await?;

    let rollout = Rollout::new(input.target.clone(), release, mode);
    let rollout = rollout.prepare(&session, log).await?;
    let rollout = rollout.deploy(&session, log).await?;
    let rollout = rollout.route(&session, log).await?;
    let rollout = rollout.verify(&session, log).await?;

    log.success(&format!(
        "{} deployed: http://{}/",
        rollout.release().name,
        rollout.target().host
    ));

    session.disconnect().await?;
    Ok(())
}

async fn teardown(args: TeardownArgs, log: &RunLog) -> Result<()> {
    let mut prompt = TerminalPrompt;
    let input = input::gather_teardown(args.into_params(), &mut prompt)?;

    // The branch is irrelevant for teardown; only the derived name matters.
    let release = ReleaseDescriptor::derive(&input.repo_url, "main", &checkout_root())
        .map_err(InputError::from)?;

    log.info(&format!("connecting to {}@{}", input.user, input.host));
    let session =
        Session::connect(SessionConfig::new(&input.host, &input.user, &input.key_path)).await?;

    cleanup::run(&session, &release, input.user != "root", log).await?;

    session.disconnect().await?;
    Ok(())
}
