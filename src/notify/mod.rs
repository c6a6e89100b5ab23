//! Notification delivery. The scheduler only needs [Notifier], [DesktopNotifier] shows the alert
//! through the desktop notification service.

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("send failed: {0}")]
    SendFailed(String),
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn alert(&self, title: &str, body: &str) -> Result<(), NotifyError>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct DesktopNotifier;

#[async_trait]
impl Notifier for DesktopNotifier {
    async fn alert(&self, title: &str, body: &str) -> Result<(), NotifyError> {
        let title = title.to_string();
        let body = body.to_string();
        // Showing a notification blocks on some platforms, keep it off the scheduler thread.
        tokio::task::spawn_blocking(move || {
            info!(%title, %body, "Sending desktop notification");
            notify_rust::Notification::new()
                .summary(&title)
                .body(&body)
                .icon("dialog-warning")
                .show()
                .map(|_| ())
                .map_err(|e| NotifyError::SendFailed(e.to_string()))
        })
        .await
        .map_err(|e| NotifyError::SendFailed(e.to_string()))?
    }
}
