use futures::future;
use tokio::select;
use tokio::signal;
use tokio::sync::watch;
use tracing::{info, warn};

/// Resolves once SIGINT or SIGTERM has been received.
pub(crate) struct Shutdown {
    rx: watch::Receiver<Option<&'static str>>,
}

impl Shutdown {
    pub(crate) fn new() -> Self {
        Self {
            rx: spawn_shutdown_listener(),
        }
    }

    pub(crate) async fn wait(mut self) {
        let signal = match self.rx.wait_for(|signal| signal.is_some()).await {
            Ok(signal) => *signal,
            Err(_) => None,
        };
        match signal {
            Some(signal) => info!("Shutting down after {}.", signal),
            None => {
                warn!("Shutdown listener stopped before any signal was received.");
                future::pending::<()>().await
            }
        }
    }
}

fn spawn_shutdown_listener() -> watch::Receiver<Option<&'static str>> {
    let (shutdown_tx, shutdown_rx) = watch::channel(None);

    tokio::spawn(async move {
        let mut sigterm = signal::unix::signal(signal::unix::SignalKind::terminate()).ok();

        let term_future = async {
            if let Some(ref mut sigterm) = sigterm {
                sigterm.recv().await;
                Some("SIGTERM")
            } else {
                future::pending::<Option<&'static str>>().await
            }
        };

        select! {
            res = signal::ctrl_c() => {
                if res.is_ok() {
                    info!("Received SIGINT.");
                    let _ = shutdown_tx.send(Some("SIGINT"));
                } else {
                    warn!("Failed to listen for SIGINT: {:?}", res.err());
                    future::pending::<()>().await;
                }
            }
            _ = term_future => {
                info!("Received SIGTERM.");
                let _ = shutdown_tx.send(Some("SIGTERM"));
            }
        }
        // Hold the sender until every receiver is gone.
        shutdown_tx.closed().await;
    });

    shutdown_rx
}
