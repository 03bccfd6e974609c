//! Cancellation for probe batches
//!
//! A [`CancelSignal`] fires when either its deadline passes or its
//! [`CancelController`] is triggered (e.g. on SIGTERM/SIGINT). Every probe task
//! holds a clone, so one signal bounds the whole batch.

use tokio::sync::watch;
use tokio::time::{sleep_until, Instant};
use tracing::info;

/// Cancellation receiver shared by all probe tasks
///
/// Clones share the external trigger; each clone carries the same deadline
/// unless narrowed with [`CancelSignal::with_deadline`].
#[derive(Clone, Debug)]
pub struct CancelSignal {
    receiver: Option<watch::Receiver<bool>>,
    deadline: Option<Instant>,
}

impl CancelSignal {
    /// A signal with no external trigger and no deadline; never fires
    pub fn never() -> Self {
        Self {
            receiver: None,
            deadline: None,
        }
    }

    /// A signal that fires at `deadline`
    pub fn at(deadline: Instant) -> Self {
        Self::never().with_deadline(deadline)
    }

    /// Narrow the signal to also fire at `deadline` (the earlier deadline wins)
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(existing) => existing.min(deadline),
            None => deadline,
        });
        self
    }

    /// The deadline this signal fires at, if any
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Check if cancellation has happened (non-blocking)
    pub fn is_cancelled(&self) -> bool {
        let expired = self.deadline.is_some_and(|d| Instant::now() >= d);
        self.is_triggered() || expired
    }

    /// Check if the controller fired, ignoring the deadline
    pub fn is_triggered(&self) -> bool {
        self.receiver.as_ref().is_some_and(|r| *r.borrow())
    }

    /// Wait until the deadline passes or the controller fires
    pub async fn cancelled(&mut self) {
        let deadline = self.deadline;
        let expiry = async move {
            match deadline {
                Some(d) => sleep_until(d).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            _ = expiry => {}
            _ = wait_triggered(self.receiver.as_mut()) => {}
        }
    }
}

async fn wait_triggered(receiver: Option<&mut watch::Receiver<bool>>) {
    let Some(receiver) = receiver else {
        return std::future::pending().await;
    };

    while !*receiver.borrow() {
        if receiver.changed().await.is_err() {
            // Controller dropped, treat as cancelled
            break;
        }
    }
}

/// Trigger for an external abort
pub struct CancelController {
    sender: watch::Sender<bool>,
}

impl CancelController {
    /// Cancel all signals created from this controller
    pub fn cancel(&self) {
        let _ = self.sender.send(true);
        info!("Cancellation signal sent");
    }
}

/// Create a new cancellation pair
///
/// Returns (controller, signal) where:
/// - controller: Used to trigger an abort
/// - signal: Cloned and passed to every probe task
pub fn cancel_channel() -> (CancelController, CancelSignal) {
    let (sender, receiver) = watch::channel(false);
    (
        CancelController { sender },
        CancelSignal {
            receiver: Some(receiver),
            deadline: None,
        },
    )
}

/// Resolve with the name of the first termination signal delivered
///
/// Both handlers are installed before waiting; a registration failure is
/// returned at once.
#[cfg(unix)]
pub async fn wait_for_signal() -> std::io::Result<&'static str> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = signal(SignalKind::terminate())?;
    let mut interrupt = signal(SignalKind::interrupt())?;

    let name = tokio::select! {
        _ = terminate.recv() => "SIGTERM",
        _ = interrupt.recv() => "SIGINT",
    };
    Ok(name)
}

/// Resolve once Ctrl+C is delivered
#[cfg(not(unix))]
pub async fn wait_for_signal() -> std::io::Result<&'static str> {
    tokio::signal::ctrl_c().await?;
    Ok("CTRL_C")
}

#[cfg(test)]
#[path = "cancel_test.rs"]
mod tests;
