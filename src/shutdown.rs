use std::{future::Future, io};

use tokio::select;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Detects signals sent to the process and turns them into a cancellation of `cancelation`, so a
/// scheduler sleeping for hours stops right away.
pub async fn detect_shutdown(cancelation: CancellationToken) {
    select! {
        _ = listen("ctrl-c", tokio::signal::ctrl_c()) => info!("Received ctrl-c"),
        _ = listen("SIGTERM", terminate()) => info!("Received SIGTERM"),
        _ = cancelation.cancelled() => return,
    };
    cancelation.cancel();
}

/// Resolves once `signal` fires. A signal that can't be listened for never resolves, so only the
/// remaining ones can stop the process.
async fn listen(name: &str, signal: impl Future<Output = io::Result<()>>) {
    if let Err(e) = signal.await {
        warn!("Failed to listen for {name} {e:?}");
        std::future::pending::<()>().await;
    }
}

#[cfg(unix)]
async fn terminate() -> io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    signal(SignalKind::terminate())?.recv().await;
    Ok(())
}

#[cfg(not(unix))]
async fn terminate() -> io::Result<()> {
    std::future::pending().await
}

#[cfg(test)]
mod tests {
    use std::{io, time::Duration};

    use tokio_util::sync::CancellationToken;

    use super::{detect_shutdown, listen};

    #[tokio::test]
    async fn test_failed_listener_never_resolves() {
        let result = tokio::time::timeout(
            Duration::from_millis(50),
            listen("test", async { Err(io::Error::other("unsupported")) }),
        )
        .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_signal_resolves_listener() {
        let result =
            tokio::time::timeout(Duration::from_millis(50), listen("test", async { Ok(()) })).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_stops_when_cancelled_elsewhere() {
        let token = CancellationToken::new();
        let handle = tokio::spawn(detect_shutdown(token.clone()));
        token.cancel();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("listener should stop")
            .unwrap();
    }
}
