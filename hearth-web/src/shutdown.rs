//! Deferred shutdown scheduling
//!
//! Schedules a cancellable shutdown action after a fixed delay, decoupled
//! from the request/response cycle: the scheduling endpoint answers
//! immediately and the trigger fires from a timer task, feeding the
//! server's graceful-shutdown future.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::info;

/// Schedules and cancels the deferred process shutdown
#[derive(Clone)]
pub struct ShutdownController {
    delay: Duration,
    trigger: Arc<watch::Sender<bool>>,
    pending: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl ShutdownController {
    pub fn new(delay: Duration) -> Self {
        let (trigger, _) = watch::channel(false);
        Self {
            delay,
            trigger: Arc::new(trigger),
            pending: Arc::new(Mutex::new(None)),
        }
    }

    /// Schedule a shutdown after the configured delay
    ///
    /// Replaces any previously scheduled shutdown. Returns the delay so the
    /// caller can report it.
    pub fn schedule(&self) -> Duration {
        let mut pending = self.pending.lock().unwrap();
        if let Some(previous) = pending.take() {
            previous.abort();
        }

        let trigger = self.trigger.clone();
        let pending_slot = self.pending.clone();
        let delay = self.delay;
        *pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            info!("Shutdown delay elapsed, signaling graceful shutdown");
            let _ = trigger.send(true);
            pending_slot.lock().unwrap().take();
        }));

        info!("Shutdown scheduled in {:?}", self.delay);
        self.delay
    }

    /// Cancel a scheduled shutdown; returns whether one was pending
    pub fn cancel(&self) -> bool {
        let mut pending = self.pending.lock().unwrap();
        match pending.take() {
            Some(handle) => {
                handle.abort();
                info!("Scheduled shutdown cancelled");
                true
            }
            None => false,
        }
    }

    /// Resolves once a scheduled shutdown has fired
    pub async fn triggered(&self) {
        let mut receiver = self.trigger.subscribe();
        while !*receiver.borrow_and_update() {
            if receiver.changed().await.is_err() {
                break;
            }
        }
    }
}
