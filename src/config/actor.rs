//! Background polling of a configuration facade
//!
//! [`FacadePoller`] moves a [`ConfigFacade`] into a tokio task that checks
//! the watched files on a fixed period. Other tasks talk to it through
//! messages, so the facade itself is never shared.

use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use log::{debug, warn};

use crate::config::defaults::{POLLER_CHANNEL_SIZE, POLL_PERIOD};
use crate::config::error::{ConfigError, Result};
use crate::config::facade::ConfigFacade;

/// Poller message types
#[derive(Debug)]
pub enum PollerMessage {
    /// Check the watched files now
    Check {
        /// Reload even if nothing changed
        force: bool,
        /// Response channel
        response: oneshot::Sender<Result<()>>,
    },

    /// Stop polling and hand the facade back
    Shutdown,
}

/// Handle to a running poller task
#[derive(Debug)]
pub struct FacadePoller {
    sender: mpsc::Sender<PollerMessage>,
    handle: JoinHandle<ConfigFacade>,
}

impl FacadePoller {
    /// Start polling `facade` every `period`.
    ///
    /// A zero period falls back to the default poll period. Must be called
    /// from within a tokio runtime.
    pub fn spawn(facade: ConfigFacade, period: Duration) -> Self {
        let period = if period.is_zero() { POLL_PERIOD } else { period };
        let (sender, receiver) = mpsc::channel(POLLER_CHANNEL_SIZE);
        let handle = tokio::spawn(Self::run(facade, receiver, period));
        Self { sender, handle }
    }

    async fn run(
        mut facade: ConfigFacade,
        mut receiver: mpsc::Receiver<PollerMessage>,
        period: Duration,
    ) -> ConfigFacade {
        let mut ticker = time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately and the facade was just loaded
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = facade.reload_if_changed(false) {
                        warn!("Failed to reload configuration: {}", e);
                    }
                }
                msg = receiver.recv() => match msg {
                    Some(PollerMessage::Check { force, response }) => {
                        let _ = response.send(facade.reload_if_changed(force));
                    }
                    Some(PollerMessage::Shutdown) | None => {
                        debug!("Configuration poller shutting down");
                        break;
                    }
                },
            }
        }

        debug!("Configuration poller stopped");
        facade
    }

    /// Check the watched files now instead of waiting for the next tick
    pub async fn check_now(&self, force: bool) -> Result<()> {
        let (sender, receiver) = oneshot::channel();

        if let Err(e) = self.sender.send(PollerMessage::Check { force, response: sender }).await {
            warn!("Failed to send Check message: {}", e);
            return Err(ConfigError::Other(format!("Failed to send message: {}", e)));
        }

        match receiver.await {
            Ok(result) => result,
            Err(e) => {
                warn!("Failed to receive check result: {}", e);
                Err(ConfigError::Other(format!("Failed to receive response: {}", e)))
            }
        }
    }

    /// Stop the poller and return the facade it owned
    pub async fn shutdown(self) -> Result<ConfigFacade> {
        if let Err(e) = self.sender.send(PollerMessage::Shutdown).await {
            warn!("Failed to send Shutdown message: {}", e);
        }

        self.handle
            .await
            .map_err(|e| ConfigError::Other(format!("Configuration poller failed: {}", e)))
    }
}
