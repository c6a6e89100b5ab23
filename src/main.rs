use anyhow::Result;
use toggoal::cli::run_cli;
use tracing::{error, info};

fn main() -> Result<()> {
    let outcome = run_cli().inspect_err(|e| {
        error!("Error running toggoal {e:?}");
    })?;
    info!(?outcome, "Finished");
    Ok(())
}
