//! Notification and response output for `datawire run`.

use async_trait::async_trait;
use datawire_lib::{NotificationIntent, Notifier, NotifyError};
use serde::Serialize;
use std::sync::Arc;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;

/// Shared JSON-lines writer.
///
/// Query responses and notifications share one stream, so every line is
/// written under a single lock.
#[derive(Clone)]
pub(crate) struct JsonLines {
    out: Arc<Mutex<Box<dyn AsyncWrite + Send + Unpin>>>,
}

impl std::fmt::Debug for JsonLines {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonLines").finish_non_exhaustive()
    }
}

impl JsonLines {
    pub(crate) fn new(out: impl AsyncWrite + Send + Unpin + 'static) -> Self {
        Self {
            out: Arc::new(Mutex::new(Box::new(out))),
        }
    }

    pub(crate) fn stdout() -> Self {
        Self::new(tokio::io::stdout())
    }

    /// Writes one value followed by a newline and flushes.
    pub(crate) async fn write<T: Serialize + ?Sized>(&self, value: &T) -> std::io::Result<()> {
        let mut line = serde_json::to_vec(value)?;
        line.push(b'\n');

        let mut out = self.out.lock().await;
        out.write_all(&line).await?;
        out.flush().await
    }
}

#[derive(Serialize)]
struct NotificationLine<'a> {
    notification: &'a NotificationIntent,
}

/// Notifier that prints intents as `{"notification": {...}}` lines.
#[derive(Debug, Clone)]
pub(crate) struct StdoutNotifier {
    lines: JsonLines,
}

impl StdoutNotifier {
    pub(crate) const fn new(lines: JsonLines) -> Self {
        Self { lines }
    }
}

#[async_trait]
impl Notifier for StdoutNotifier {
    async fn notify(&self, intent: &NotificationIntent) -> Result<(), NotifyError> {
        self.lines
            .write(&NotificationLine {
                notification: intent,
            })
            .await?;
        Ok(())
    }
}
