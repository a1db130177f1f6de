// Consumer interest signal
//
// Pollers only fetch while their consumer is observing them. The signal is
// injected by whoever hosts the poller (a UI view, a CLI session, a test).

use tokio::sync::watch;

/// Read side of the interest signal, consulted before every timer is armed
#[derive(Debug, Clone)]
pub struct Visibility {
    rx: watch::Receiver<bool>,
}

/// Write side of the interest signal
#[derive(Debug)]
pub struct VisibilityController {
    tx: watch::Sender<bool>,
}

impl Visibility {
    /// A signal that is permanently visible
    pub fn always() -> Self {
        let (_tx, rx) = watch::channel(true);
        Self { rx }
    }

    /// A controllable signal starting in the given state
    pub fn channel(visible: bool) -> (VisibilityController, Visibility) {
        let (tx, rx) = watch::channel(visible);
        (VisibilityController { tx }, Visibility { rx })
    }

    pub fn is_visible(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolve once the consumer is observing. Never resolves if the
    /// controller is gone while hidden.
    pub async fn visible(&mut self) {
        self.wait_for(true).await
    }

    /// Resolve once the consumer stops observing. Never resolves if the
    /// controller is gone while visible.
    pub async fn hidden(&mut self) {
        self.wait_for(false).await
    }

    async fn wait_for(&mut self, target: bool) {
        loop {
            if *self.rx.borrow_and_update() == target {
                return;
            }
            if self.rx.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }
}

impl Default for Visibility {
    fn default() -> Self {
        Self::always()
    }
}

impl VisibilityController {
    pub fn set_visible(&self, visible: bool) {
        self.tx.send_replace(visible);
    }

    pub fn is_visible(&self) -> bool {
        *self.tx.borrow()
    }
}
