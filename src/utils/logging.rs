use std::{
    path::{Path, PathBuf},
    sync::LazyLock,
};

use anyhow::Result;
use tracing::level_filters::LevelFilter;
use tracing_appender::rolling::Rotation;
use tracing_subscriber::fmt::{format::FmtSpan, writer::MakeWriterExt};

pub const LOG_PREFIX: &str = "toggoal";
const LOGS_DIR: &str = "logs";

/// One file per day, a week's worth kept. A split goal run lasts the whole week.
const MAX_LOG_FILES: usize = 7;

/// Sets up logging into `<app_dir>/logs/toggoal.<date>`, optionally mirrored to stdout. Returns
/// the directory the log files go to.
pub fn enable_logging(
    app_dir: &Path,
    log_level: Option<LevelFilter>,
    show_std: bool,
) -> Result<PathBuf> {
    let logs_dir = create_logs_dir(app_dir)?;

    let appender = tracing_appender::rolling::Builder::new()
        .rotation(Rotation::DAILY)
        .max_log_files(MAX_LOG_FILES)
        .filename_prefix(LOG_PREFIX)
        .build(&logs_dir)?;

    let stdout = std::io::stdout.with_filter(move |_| show_std);

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(log_directive(
            log_level,
            std::env::var("RUST_LOG").ok(),
        )))
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(stdout.and(appender))
        .pretty()
        .init();
    Ok(logs_dir)
}

fn create_logs_dir(app_dir: &Path) -> Result<PathBuf> {
    let logs_dir = app_dir.join(LOGS_DIR);
    std::fs::create_dir_all(&logs_dir)?;
    Ok(logs_dir)
}

/// Filter for our own events. An explicit level wins over `RUST_LOG`, which wins over `info`.
/// The http stack only gets to report warnings.
fn log_directive(log_level: Option<LevelFilter>, env_level: Option<String>) -> String {
    let level = log_level
        .map(|v| v.to_string().to_lowercase())
        .or(env_level)
        .unwrap_or_else(|| "info".into());
    format!(
        "{}={level},reqwest=warn,hyper=warn",
        env!("CARGO_PKG_NAME").replace("-", "_"),
    )
}

pub static TEST_LOGGING: LazyLock<()> = LazyLock::new(|| {
    let _ = tracing_subscriber::fmt()
        .with_max_level(LevelFilter::TRACE)
        .with_test_writer()
        .pretty()
        .try_init();
});

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use tempfile::tempdir;
    use tracing::level_filters::LevelFilter;

    use super::{create_logs_dir, log_directive};

    #[test]
    fn test_directive_precedence() {
        assert_eq!(
            log_directive(Some(LevelFilter::DEBUG), Some("warn".into())),
            "toggoal=debug,reqwest=warn,hyper=warn"
        );
        assert_eq!(
            log_directive(None, Some("warn".into())),
            "toggoal=warn,reqwest=warn,hyper=warn"
        );
        assert_eq!(log_directive(None, None), "toggoal=info,reqwest=warn,hyper=warn");
    }

    #[test]
    fn test_logs_dir_under_app_dir() -> Result<()> {
        let dir = tempdir()?;
        let logs = create_logs_dir(dir.path())?;
        assert_eq!(logs, dir.path().join("logs"));
        assert!(logs.is_dir());
        // Existing directory is fine
        create_logs_dir(dir.path())?;
        Ok(())
    }
}
