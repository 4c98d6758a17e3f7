use std::time::Duration;

use tokio::{sync::mpsc, task::JoinHandle};

pub const DEFAULT_SEARCH_DEBOUNCE: Duration = Duration::from_millis(500);

/// Delivers a value only after `delay` passes with no newer value pushed.
///
/// Each push cancels the pending timer, so a burst of keystrokes yields
/// exactly one settled value: the last one.
pub struct Debouncer<T> {
    delay: Duration,
    tx: mpsc::UnboundedSender<T>,
    rx: mpsc::UnboundedReceiver<T>,
    pending: Option<JoinHandle<()>>,
}

impl<T: Send + 'static> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            delay,
            tx,
            rx,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn push(&mut self, value: T) {
        self.cancel();
        let tx = self.tx.clone();
        let delay = self.delay;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(value);
        }));
    }

    /// Drop the pending value, if any.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Wait for the next settled value. Returns `None` when nothing is
    /// pending and nothing has settled.
    pub async fn settled(&mut self) -> Option<T> {
        if let Ok(value) = self.rx.try_recv() {
            return Some(value);
        }
        if !self.is_pending() {
            return None;
        }
        self.rx.recv().await
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn burst_yields_only_the_last_value() {
        let mut debouncer = Debouncer::new(DEFAULT_SEARCH_DEBOUNCE);
        for text in ["k", "ku", "kur", "kurs", "kursi"] {
            debouncer.push(text.to_string());
            tokio::time::advance(Duration::from_millis(100)).await;
        }

        assert_eq!(debouncer.settled().await.as_deref(), Some("kursi"));
        assert_eq!(debouncer.settled().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn values_separated_by_the_delay_both_settle() {
        let mut debouncer = Debouncer::new(Duration::from_millis(500));
        debouncer.push(1);
        assert_eq!(debouncer.settled().await, Some(1));
        debouncer.push(2);
        assert_eq!(debouncer.settled().await, Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_discards_pending_value() {
        let mut debouncer = Debouncer::new(Duration::from_millis(500));
        debouncer.push("meja");
        assert!(debouncer.is_pending());
        debouncer.cancel();
        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(debouncer.settled().await, None);
    }
}
