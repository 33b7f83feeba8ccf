use tokio::sync::mpsc;
use tracing::{error, info};

/// Turns Ctrl+C and SIGTERM into a single shutdown notification
pub struct ShutdownManager {
    rx: mpsc::Receiver<&'static str>,
}

impl ShutdownManager {
    /// Create a new ShutdownManager and setup signal handlers
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel(1);

        let ctrl_c_tx = tx.clone();
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    let _ = ctrl_c_tx.send("ctrl+c").await;
                }
                Err(err) => error!("error listening for ctrl+c: {}", err),
            }
        });

        #[cfg(unix)]
        tokio::spawn(async move {
            use tokio::signal::unix::{SignalKind, signal};

            match signal(SignalKind::terminate()) {
                Ok(mut term) => {
                    term.recv().await;
                    let _ = tx.send("SIGTERM").await;
                }
                Err(err) => error!("error installing SIGTERM handler: {}", err),
            }
        });

        ShutdownManager { rx }
    }

    /// Drive `future` until it completes or a shutdown signal arrives, in
    /// which case the future is dropped and `None` returned
    pub async fn run_until_shutdown<F, T>(mut self, future: F) -> Option<T>
    where
        F: std::future::Future<Output = T>,
    {
        tokio::select! {
            Some(signal) = self.rx.recv() => {
                info!(signal, "shutting down");
                None
            }
            result = future => Some(result),
        }
    }
}

impl Default for ShutdownManager {
    fn default() -> Self {
        Self::new()
    }
}
