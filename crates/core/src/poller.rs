//! Recurring status delivery.
//!
//! Once the client is ready, the current snapshot is re-posted to the
//! status webhook on a fixed interval so the external API sees liveness
//! without polling us. The poller only reads the snapshot; every mutation
//! belongs to the relay.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

use crate::notify::WebhookNotifier;
use crate::snapshot::SharedSnapshot;

/// Owns at most one recurring delivery task.
#[derive(Debug, Default)]
pub struct StatusPoller {
    handle: Option<JoinHandle<()>>,
}

impl StatusPoller {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts the recurring delivery, replacing any prior task.
    ///
    /// Restart is idempotent: the previous task is aborted first, so
    /// reconnect cycles never stack concurrent pollers.
    pub fn start(
        &mut self,
        snapshot: SharedSnapshot,
        notifier: Arc<WebhookNotifier>,
        interval: Duration,
    ) {
        self.stop();

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // interval fires immediately; the first delivery belongs to the
            // relay's own ready notification, so skip that tick.
            ticker.tick().await;

            loop {
                ticker.tick().await;
                let current = snapshot.read();
                notifier.notify_status(&current).await;
            }
        });

        debug!(target = "wa.relay", interval_ms = interval.as_millis() as u64, "status poller started");
        self.handle = Some(handle);
    }

    /// Aborts the delivery task if one is running.
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            debug!(target = "wa.relay", "status poller stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for StatusPoller {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use axum::Router;
    use axum::routing::post;

    use super::*;

    /// Loopback status endpoint that counts deliveries.
    async fn counting_server() -> (String, Arc<AtomicUsize>) {
        let counter = Arc::new(AtomicUsize::new(0));
        let hits = Arc::clone(&counter);
        let app = Router::new().route(
            "/webhook/status",
            post(move || {
                let hits = Arc::clone(&hits);
                async move {
                    hits.fetch_add(1, Ordering::SeqCst);
                    "ok"
                }
            }),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (base, counter)
    }

    fn notifier_for(base: &str) -> Arc<WebhookNotifier> {
        Arc::new(
            WebhookNotifier::new("default", Some(base), "/webhook/qr", "/webhook/status")
                .unwrap(),
        )
    }

    #[tokio::test]
    async fn delivers_on_interval_until_stopped() {
        let (base, counter) = counting_server().await;
        let mut poller = StatusPoller::new();

        poller.start(
            SharedSnapshot::new(),
            notifier_for(&base),
            Duration::from_millis(20),
        );
        assert!(poller.is_running());

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(counter.load(Ordering::SeqCst) >= 3);

        poller.stop();
        assert!(!poller.is_running());
        // Let any delivery already in flight land before sampling.
        tokio::time::sleep(Duration::from_millis(50)).await;
        let after_stop = counter.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(counter.load(Ordering::SeqCst), after_stop);
    }

    #[tokio::test]
    async fn restart_replaces_the_previous_task() {
        let (base, counter) = counting_server().await;
        let mut poller = StatusPoller::new();

        // A leaked first task at 10ms would rack up dozens of deliveries;
        // the hour-long replacement delivers nothing in this window.
        poller.start(
            SharedSnapshot::new(),
            notifier_for(&base),
            Duration::from_millis(10),
        );
        poller.start(
            SharedSnapshot::new(),
            notifier_for(&base),
            Duration::from_secs(3600),
        );

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert!(counter.load(Ordering::SeqCst) <= 1);
        assert!(poller.is_running());
    }
}
