// Copyright (c) 2026 Rust Relay Developers
// Distributed under the MIT software license

//! Invalidation Listener: background consumer of the invalidation
//! channel that reloads and swaps the projection.

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_stream::StreamExt;

use crate::error::RelayStateError;
use crate::loader;
use crate::state::RelayStateHandle;

const REFRESH_CHANNEL: &str = "relay_refresh";

/// Handle to a running [`RelayStateHandle::start_invalidation_listener`]
/// task.
///
/// State machine: `Created` -> (start) -> `Running` -> (message) ->
/// `Refreshing` -> `Running` (loop) -> (stream ends, or `shutdown`) ->
/// `Stopped`. There is exactly one listener per process; starting a
/// second one is undefined.
pub struct ListenerHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl ListenerHandle {
    /// Signal the listener to stop after its current refresh, if any.
    pub fn shutdown(&self) {
        let _ = self.shutdown.send(true);
    }

    /// Wait for the listener task to stop.
    pub async fn join(self) {
        let _ = self.task.await;
    }
}

impl RelayStateHandle {
    /// Start the invalidation listener.
    ///
    /// Subscribes to `relay_refresh`; on each message, reloads the
    /// projection and installs it. If `observer` is supplied, delivers
    /// `true` on a successful refresh or `false` on a failed one. Load
    /// failures are logged and do not tear the listener down; the next
    /// notification retries.
    pub async fn start_invalidation_listener(
        &self,
        observer: Option<mpsc::Sender<bool>>,
    ) -> Result<ListenerHandle, RelayStateError> {
        let mut messages = self.store.subscribe(REFRESH_CHANNEL).await?;
        let handle = self.clone();
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

        let task = tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;

                    _ = shutdown_rx.changed() => {
                        break;
                    }
                    message = messages.next() => {
                        if message.is_none() {
                            break;
                        }
                        refresh_and_notify(&handle, observer.as_ref()).await;
                    }
                }
            }
        });

        Ok(ListenerHandle {
            shutdown: shutdown_tx,
            task,
        })
    }
}

async fn refresh_and_notify(handle: &RelayStateHandle, observer: Option<&mpsc::Sender<bool>>) {
    match loader::load(handle.store.as_ref()).await {
        Ok(state) => {
            handle.install(state).await;
            if let Some(tx) = observer {
                let _ = tx.send(true).await;
            }
        }
        Err(e) => {
            tracing::error!("relay state refresh failed: {e}");
            if let Some(tx) = observer {
                let _ = tx.send(false).await;
            }
        }
    }
}
