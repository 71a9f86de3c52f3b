//! Configuration file watcher for hot reload.

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use crate::config::interaction::InteractionConfig;
use crate::config::loader::load_interaction_config;
use crate::provider::ProviderFactory;

/// A watcher that monitors the configuration file for changes.
pub struct ConfigWatcher {
    path: PathBuf,
    update_tx: mpsc::UnboundedSender<InteractionConfig>,
}

impl ConfigWatcher {
    /// Create a new ConfigWatcher.
    ///
    /// Returns the watcher and a receiver for reloaded interaction configs.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<InteractionConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        (
            Self {
                path: path.to_path_buf(),
                update_tx,
            },
            update_rx,
        )
    }

    /// Start watching the file in a background thread.
    ///
    /// The returned watcher must be kept alive for as long as reloads are wanted.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let tx = self.update_tx.clone();
        let path = self.path.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if event.kind.is_modify() || event.kind.is_create() {
                        tracing::info!("Config file change detected, reloading...");
                        match load_interaction_config(&path) {
                            Ok((_, interaction)) => {
                                let _ = tx.send(interaction);
                            }
                            Err(e) => {
                                tracing::error!(
                                    "Failed to reload config: {}. Keeping current configuration.",
                                    e
                                );
                            }
                        }
                    }
                }
                Err(e) => tracing::error!("Watch error: {:?}", e),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&self.path, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?self.path, "Config watcher started");
        Ok(watcher)
    }
}

/// Feed reloaded configurations into the factory until the channel closes.
///
/// Adapters created before a reload keep the configuration they were built with.
pub async fn apply_updates(
    factory: Arc<ProviderFactory>,
    mut updates: mpsc::UnboundedReceiver<InteractionConfig>,
) {
    while let Some(config) = updates.recv().await {
        tracing::info!(rpc_url = %config.rpc_url, "Applying reloaded interaction config");
        factory.set_config(config);
    }
}
