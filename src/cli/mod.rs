use std::{path::PathBuf, sync::Arc};

use anyhow::Result;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{info, level_filters::LevelFilter};

use crate::{
    config::{Config, Overrides, RunSettings},
    notify::DesktopNotifier,
    scheduler::{GoalScheduler, RunOutcome},
    shutdown::detect_shutdown,
    toggl::client::TogglClient,
    utils::{
        clock::DefaultClock,
        dir::{create_application_default_path, default_config_path},
        hours::Hours,
        logging::enable_logging,
        runtime::single_thread_runtime,
    },
};

#[derive(Parser, Debug)]
#[command(name = "toggoal", version, long_about = None)]
#[command(about = "Notifies you once your tracked Toggl time reaches a goal", long_about = None)]
pub struct Args {
    #[arg(
        short,
        long,
        help = "Goal in hours. 0 or no value uses the workspace defaultGoal"
    )]
    pub goal: Option<Hours>,
    #[arg(
        short,
        long,
        help = "Treat the goal as weekly and split it across the workdays so far"
    )]
    pub split: bool,
    #[arg(
        short,
        long,
        help = "Timeout in hours. Polling stops this much before the goal and repeats at this interval near it"
    )]
    pub timeout: Option<Hours>,
    #[arg(short, long, help = "Workspace defined in the configuration")]
    pub workspace: Option<String>,
    #[arg(
        short,
        long,
        help = "Configuration file. By default ./config.yml, then $XDG_CONFIG_HOME/toggoal/config.yml"
    )]
    pub config: Option<PathBuf>,
    #[arg(long, help = "Enable verbose logging to the console")]
    pub log: bool,
    #[arg(long = "log-filter")]
    pub log_filter: Option<LevelFilter>,
    #[arg(long = "log-console")]
    pub log_console: bool,
}

impl Args {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            goal: self.goal.map(|v| *v).filter(|v| *v > 0.),
            timeout: self.timeout.map(|v| *v),
            workspace: self.workspace.clone(),
            split: self.split,
        }
    }

    fn log_level(&self) -> Option<LevelFilter> {
        self.log_filter
            .or_else(|| self.log.then_some(LevelFilter::TRACE))
    }
}

pub fn run_cli() -> Result<RunOutcome> {
    let args = Args::parse();

    let app_dir = create_application_default_path()?;
    let logs_dir = enable_logging(&app_dir, args.log_level(), args.log || args.log_console)?;

    let config_path = args.config.clone().unwrap_or_else(default_config_path);
    let settings = Config::load(&config_path)?.resolve(args.overrides())?;
    info!(
        workspace = %settings.workspace_name,
        goal = settings.goal.target_hours,
        timeout = settings.goal.timeout_hours,
        split = settings.goal.split,
        logs = ?logs_dir,
        "Starting"
    );

    single_thread_runtime()?.block_on(async move { start_scheduler(settings).await })
}

/// Wires the Toggl client, desktop notifications and signal handling into a scheduler and runs it.
pub async fn start_scheduler(settings: RunSettings) -> Result<RunOutcome> {
    let shutdown_token = CancellationToken::new();
    let client = Arc::new(TogglClient::new(settings.toggl)?);

    let scheduler = GoalScheduler::new(
        settings.goal,
        settings.selector,
        client.clone(),
        client,
        Box::new(DesktopNotifier),
        Box::new(DefaultClock),
        shutdown_token.clone(),
    );

    tokio::spawn(detect_shutdown(shutdown_token.clone()));
    let outcome = scheduler.run().await;
    shutdown_token.cancel();
    outcome
}
