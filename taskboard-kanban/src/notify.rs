//! Change notification fan-out.
//!
//! After a mutation commits, every connected observer receives a single
//! payload-free signal telling it to re-fetch its board. The signal is a
//! latency optimization: observers that miss one still converge on their
//! next refresh, so sending never blocks and never fails the caller.

use tokio::sync::broadcast;

/// Event name observers receive for every committed change
pub const TASKS_CHANGED: &str = "task-updated";

/// Default number of signals buffered per observer before it lags
pub const DEFAULT_CAPACITY: usize = 256;

/// The payload-free "board changed" signal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardChanged;

/// Process-wide broadcaster handed to whoever commits mutations
#[derive(Debug, Clone)]
pub struct ChangeNotifier {
    sender: broadcast::Sender<BoardChanged>,
}

impl ChangeNotifier {
    /// Create a notifier buffering up to `capacity` signals per observer
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Signal every current observer; returns how many were reached.
    ///
    /// Having no observers is not an error.
    pub fn notify(&self) -> usize {
        match self.sender.send(BoardChanged) {
            Ok(reached) => {
                tracing::debug!(observers = reached, "broadcast {}", TASKS_CHANGED);
                reached
            }
            Err(_) => {
                tracing::trace!("no observers for {}", TASKS_CHANGED);
                0
            }
        }
    }

    /// Register a new observer
    pub fn subscribe(&self) -> ChangeSubscription {
        ChangeSubscription {
            receiver: self.sender.subscribe(),
        }
    }

    /// Number of connected observers
    pub fn observer_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for ChangeNotifier {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

/// One observer's view of the signal stream
#[derive(Debug)]
pub struct ChangeSubscription {
    receiver: broadcast::Receiver<BoardChanged>,
}

impl ChangeSubscription {
    /// Wait for the next change.
    ///
    /// An observer that fell behind gets a single signal standing in for
    /// everything it missed. Returns `None` once the notifier is gone.
    pub async fn changed(&mut self) -> Option<BoardChanged> {
        match self.receiver.recv().await {
            Ok(signal) => Some(signal),
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::debug!(skipped, "observer lagged, coalescing signals");
                self.receiver = self.receiver.resubscribe();
                Some(BoardChanged)
            }
            Err(broadcast::error::RecvError::Closed) => None,
        }
    }
}
