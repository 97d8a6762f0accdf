use std::future::Future;
use std::sync::Arc;

use log::debug;
use tokio::runtime::Handle;
use tokio::sync::mpsc;

/// Callback fired from the runtime whenever a result is ready, so an
/// immediate-mode UI can schedule a frame to pick it up.
pub type Repaint = Arc<dyn Fn() + Send + Sync>;

/// Monotonic generation counter. Only the latest issued generation is
/// current; a dead counter accepts nothing.
#[derive(Debug, Clone, Default)]
pub struct Generation {
    latest: u64,
    dead: bool,
}

impl Generation {
    pub fn advance(&mut self) -> u64 {
        self.latest += 1;
        self.latest
    }

    pub fn is_current(&self, generation: u64) -> bool {
        !self.dead && generation == self.latest
    }

    pub fn kill(&mut self) {
        self.dead = true;
    }

    pub fn is_dead(&self) -> bool {
        self.dead
    }

    pub fn latest(&self) -> u64 {
        self.latest
    }
}

/// Runs futures on the runtime and hands back only the result of the
/// newest one. Older completions are dropped on receipt, and after
/// [`Loader::teardown`] nothing is delivered at all. In-flight futures are
/// not aborted.
pub struct Loader<T> {
    handle: Handle,
    repaint: Option<Repaint>,
    generation: Generation,
    in_flight: bool,
    tx: mpsc::UnboundedSender<(u64, T)>,
    rx: mpsc::UnboundedReceiver<(u64, T)>,
}

impl<T: Send + 'static> Loader<T> {
    pub fn new(handle: Handle) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            handle,
            repaint: None,
            generation: Generation::default(),
            in_flight: false,
            tx,
            rx,
        }
    }

    pub fn with_repaint(mut self, repaint: Repaint) -> Self {
        self.repaint = Some(repaint);
        self
    }

    /// Spawns `future` tagged with a fresh generation, superseding any load
    /// still in flight. Returns the generation.
    pub fn issue<F>(&mut self, future: F) -> u64
    where
        F: Future<Output = T> + Send + 'static,
    {
        let generation = self.generation.advance();
        if self.generation.is_dead() {
            return generation;
        }
        self.in_flight = true;
        let tx = self.tx.clone();
        let repaint = self.repaint.clone();
        self.handle.spawn(async move {
            let value = future.await;
            if tx.send((generation, value)).is_err() {
                debug!("load {generation} finished after teardown, dropped");
                return;
            }
            if let Some(repaint) = repaint {
                repaint();
            }
        });
        generation
    }

    /// Non-blocking: drains finished loads and returns the current one if
    /// it has arrived.
    pub fn try_latest(&mut self) -> Option<T> {
        let mut fresh = None;
        while let Ok((generation, value)) = self.rx.try_recv() {
            if let Some(value) = self.accept(generation, value) {
                fresh = Some(value);
            }
        }
        fresh
    }

    /// Waits for the current load. Returns `None` once torn down.
    pub async fn next_current(&mut self) -> Option<T> {
        while let Some((generation, value)) = self.rx.recv().await {
            if let Some(value) = self.accept(generation, value) {
                return Some(value);
            }
        }
        None
    }

    fn accept(&mut self, generation: u64, value: T) -> Option<T> {
        if self.generation.is_current(generation) {
            self.in_flight = false;
            Some(value)
        } else {
            debug!(
                "discarding stale load {generation} (current {}, dead {})",
                self.generation.latest(),
                self.generation.is_dead()
            );
            None
        }
    }

    /// True while the current generation has not been delivered yet.
    pub fn is_loading(&self) -> bool {
        self.in_flight && !self.generation.is_dead()
    }

    pub fn teardown(&mut self) {
        if self.generation.is_dead() {
            return;
        }
        self.generation.kill();
        self.in_flight = false;
        self.rx.close();
    }
}

impl<T> Drop for Loader<T> {
    fn drop(&mut self) {
        self.generation.kill();
        self.rx.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::sync::oneshot;

    #[test]
    fn generation_tracks_latest() {
        let mut g = Generation::default();
        let first = g.advance();
        let second = g.advance();
        assert!(!g.is_current(first));
        assert!(g.is_current(second));
        g.kill();
        assert!(!g.is_current(second));
    }

    #[tokio::test]
    async fn out_of_order_completion_keeps_newest() {
        let mut loader = Loader::new(Handle::current());
        let (old_tx, old_rx) = oneshot::channel::<&'static str>();
        let (new_tx, new_rx) = oneshot::channel::<&'static str>();
        loader.issue(async move { old_rx.await.unwrap_or("dropped") });
        loader.issue(async move { new_rx.await.unwrap_or("dropped") });
        assert!(loader.is_loading());

        new_tx.send("new").unwrap();
        assert_eq!(loader.next_current().await, Some("new"));
        assert!(!loader.is_loading());

        old_tx.send("old").unwrap();
        let late = tokio::time::timeout(Duration::from_millis(100), loader.next_current()).await;
        assert!(late.is_err(), "stale result must not be delivered");
        assert_eq!(loader.try_latest(), None);
    }

    #[tokio::test]
    async fn older_result_arriving_first_is_skipped() {
        let mut loader = Loader::new(Handle::current());
        let (old_tx, old_rx) = oneshot::channel::<u32>();
        let (new_tx, new_rx) = oneshot::channel::<u32>();
        loader.issue(async move { old_rx.await.unwrap_or(0) });
        loader.issue(async move { new_rx.await.unwrap_or(0) });

        old_tx.send(1).unwrap();
        tokio::task::yield_now().await;
        new_tx.send(2).unwrap();
        assert_eq!(loader.next_current().await, Some(2));
    }

    #[tokio::test]
    async fn teardown_suppresses_pending_results() {
        let mut loader = Loader::new(Handle::current());
        let (tx, rx) = oneshot::channel::<u32>();
        loader.issue(async move { rx.await.unwrap_or(0) });
        loader.teardown();
        assert!(!loader.is_loading());
        tx.send(7).unwrap();
        tokio::task::yield_now().await;
        assert_eq!(loader.try_latest(), None);
        assert_eq!(loader.next_current().await, None);

        // issuing after teardown never spawns
        loader.issue(async { 9 });
        assert_eq!(loader.next_current().await, None);
    }

    #[tokio::test]
    async fn repaint_fires_per_delivery() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        let count = Arc::new(AtomicUsize::new(0));
        let counter = count.clone();
        let mut loader = Loader::new(Handle::current()).with_repaint(Arc::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }));
        loader.issue(async { 1 });
        assert_eq!(loader.next_current().await, Some(1));
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
