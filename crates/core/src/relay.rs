//! The lifecycle state machine.
//!
//! Reacts to driver events, updates the connectivity snapshot, and drives
//! the session store, the webhook notifier, and the status poller. All
//! webhook deliveries are spawned and never awaited here: a slow external
//! endpoint must not stall authentication or message handling.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use warelay_protocol::{DriverCommand, DriverEvent};

use crate::notify::WebhookNotifier;
use crate::poller::StatusPoller;
use crate::snapshot::SharedSnapshot;
use crate::store::SessionSink;

pub struct LifecycleRelay {
    snapshot: SharedSnapshot,
    notifier: Arc<WebhookNotifier>,
    store: Option<Arc<dyn SessionSink>>,
    commands: mpsc::Sender<DriverCommand>,
    poller: StatusPoller,
    poll_interval: Duration,
}

impl LifecycleRelay {
    pub fn new(
        snapshot: SharedSnapshot,
        notifier: Arc<WebhookNotifier>,
        store: Option<Arc<dyn SessionSink>>,
        commands: mpsc::Sender<DriverCommand>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            snapshot,
            notifier,
            store,
            commands,
            poller: StatusPoller::new(),
            poll_interval,
        }
    }

    pub fn snapshot(&self) -> &SharedSnapshot {
        &self.snapshot
    }

    /// True while the recurring status delivery task is alive.
    pub fn poller_active(&self) -> bool {
        self.poller.is_running()
    }

    /// Consumes driver events until the channel closes.
    pub async fn run(mut self, mut events: mpsc::Receiver<DriverEvent>) {
        while let Some(event) = events.recv().await {
            self.handle_event(event).await;
        }
        debug!(target = "wa.relay", "driver event stream ended");
    }

    /// Applies one lifecycle event to the snapshot and its collaborators.
    pub async fn handle_event(&mut self, event: DriverEvent) {
        match event {
            DriverEvent::Qr { code } => {
                info!(target = "wa.relay", "QR challenge received");
                self.snapshot.update(|s| s.record_qr(code.clone()));

                let notifier = Arc::clone(&self.notifier);
                tokio::spawn(async move {
                    notifier.notify_qr(&code).await;
                });
            }

            DriverEvent::Authenticated { session } => {
                info!(target = "wa.relay", "authenticated");
                self.snapshot.update(|s| s.record_authenticated());

                // A lost write only costs the next restart its resume, so
                // failures are logged and the relay carries on.
                if let Some(store) = &self.store {
                    if let Err(err) = store.save(&session).await {
                        warn!(target = "wa.relay", error = %err, "failed to persist session");
                    }
                }
            }

            DriverEvent::Ready { info } => {
                info!(target = "wa.relay", phone = %info.phone_number, "client ready");
                self.snapshot.update(|s| s.record_ready(info));

                let notifier = Arc::clone(&self.notifier);
                let current = self.snapshot.read();
                tokio::spawn(async move {
                    notifier.notify_status(&current).await;
                });

                self.poller.start(
                    self.snapshot.clone(),
                    Arc::clone(&self.notifier),
                    self.poll_interval,
                );
            }

            DriverEvent::Disconnected { reason } => {
                warn!(
                    target = "wa.relay",
                    reason = reason.as_deref().unwrap_or("unknown"),
                    "client disconnected"
                );
                self.snapshot.update(|s| s.record_disconnected());
            }

            DriverEvent::Message { chat, body } => {
                if self.snapshot.read().is_ready() && body.eq_ignore_ascii_case("ping") {
                    debug!(target = "wa.relay", %chat, "ping received, replying");
                    let reply = DriverCommand::Reply {
                        chat,
                        body: "pong".to_string(),
                    };
                    if self.commands.send(reply).await.is_err() {
                        warn!(target = "wa.relay", "driver command channel closed");
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::Mutex;

    use serde_json::{Value, json};
    use warelay_protocol::ClientIdentity;

    use super::*;
    use crate::error::Result;

    struct RecordingSink {
        saved: Mutex<Vec<Value>>,
    }

    impl RecordingSink {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                saved: Mutex::new(Vec::new()),
            })
        }

        fn saved(&self) -> Vec<Value> {
            self.saved.lock().unwrap().clone()
        }
    }

    impl SessionSink for RecordingSink {
        fn save(&self, blob: &Value) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
            let blob = blob.clone();
            Box::pin(async move {
                self.saved.lock().unwrap().push(blob);
                Ok(())
            })
        }
    }

    fn identity() -> ClientIdentity {
        ClientIdentity {
            phone_number: "4915112345678".into(),
            pushname: "Ada".into(),
            platform: "android".into(),
            wid: "4915112345678@c.us".into(),
        }
    }

    fn relay_with_sink(
        sink: Option<Arc<dyn SessionSink>>,
    ) -> (LifecycleRelay, mpsc::Receiver<DriverCommand>) {
        let notifier = Arc::new(
            WebhookNotifier::new("default", None, "/webhook/qr", "/webhook/status").unwrap(),
        );
        let (tx, rx) = mpsc::channel(8);
        let relay = LifecycleRelay::new(
            SharedSnapshot::new(),
            notifier,
            sink,
            tx,
            Duration::from_secs(3600),
        );
        (relay, rx)
    }

    #[tokio::test]
    async fn authenticated_persists_blob_and_clears_challenge() {
        let sink = RecordingSink::new();
        let (mut relay, _rx) = relay_with_sink(Some(Arc::clone(&sink) as Arc<dyn SessionSink>));

        relay
            .handle_event(DriverEvent::Qr { code: "1@2,3==".into() })
            .await;
        relay
            .handle_event(DriverEvent::Authenticated {
                session: json!({"token": "abc"}),
            })
            .await;

        assert_eq!(sink.saved(), vec![json!({"token": "abc"})]);
        let snapshot = relay.snapshot().read();
        assert!(snapshot.qr().is_none());
        assert!(!snapshot.is_ready());
    }

    #[tokio::test]
    async fn resumed_authentication_leaves_snapshot_untouched() {
        // No preceding QR event: the blob is saved, nothing else moves
        // until `ready` fires.
        let sink = RecordingSink::new();
        let (mut relay, _rx) = relay_with_sink(Some(Arc::clone(&sink) as Arc<dyn SessionSink>));

        relay
            .handle_event(DriverEvent::Authenticated {
                session: json!({"token": "resumed"}),
            })
            .await;

        assert_eq!(sink.saved().len(), 1);
        let snapshot = relay.snapshot().read();
        assert!(snapshot.client_info().is_none());
        assert_eq!(snapshot.reconnect_attempts(), 0);
    }

    #[tokio::test]
    async fn repeated_saves_pass_the_same_blob_through() {
        let sink = RecordingSink::new();
        let (mut relay, _rx) = relay_with_sink(Some(Arc::clone(&sink) as Arc<dyn SessionSink>));

        let blob = json!({"token": "abc"});
        for _ in 0..2 {
            relay
                .handle_event(DriverEvent::Authenticated {
                    session: blob.clone(),
                })
                .await;
        }

        let saved = sink.saved();
        assert_eq!(saved.len(), 2);
        assert_eq!(saved[0], saved[1]);
    }

    #[tokio::test]
    async fn ping_while_ready_replies_pong() {
        let (mut relay, mut rx) = relay_with_sink(None);

        relay
            .handle_event(DriverEvent::Ready { info: identity() })
            .await;
        relay
            .handle_event(DriverEvent::Message {
                chat: "123@c.us".into(),
                body: "PING".into(),
            })
            .await;

        match rx.try_recv() {
            Ok(DriverCommand::Reply { chat, body }) => {
                assert_eq!(chat, "123@c.us");
                assert_eq!(body, "pong");
            }
            other => panic!("expected Reply command, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn near_miss_and_not_ready_pings_are_ignored() {
        let (mut relay, mut rx) = relay_with_sink(None);

        // Not ready yet.
        relay
            .handle_event(DriverEvent::Message {
                chat: "123@c.us".into(),
                body: "ping".into(),
            })
            .await;
        assert!(rx.try_recv().is_err());

        relay
            .handle_event(DriverEvent::Ready { info: identity() })
            .await;
        relay
            .handle_event(DriverEvent::Message {
                chat: "123@c.us".into(),
                body: "pingg".into(),
            })
            .await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn snapshot_invariant_holds_across_event_sequences() {
        let (mut relay, _rx) = relay_with_sink(None);

        let events = [
            DriverEvent::Qr { code: "1@2,3==".into() },
            DriverEvent::Authenticated { session: json!({}) },
            DriverEvent::Ready { info: identity() },
            DriverEvent::Disconnected { reason: None },
            DriverEvent::Qr { code: "4@5,6==".into() },
            DriverEvent::Ready { info: identity() },
        ];

        for event in events {
            relay.handle_event(event).await;
            let snapshot = relay.snapshot().read();
            assert!(
                !(snapshot.qr().is_some() && snapshot.is_ready()),
                "QR challenge and ready flag held at once"
            );
        }
    }

    #[tokio::test]
    async fn disconnect_counts_reconnect_cycles_until_ready() {
        let (mut relay, _rx) = relay_with_sink(None);

        relay
            .handle_event(DriverEvent::Ready { info: identity() })
            .await;
        relay
            .handle_event(DriverEvent::Disconnected { reason: Some("NAVIGATION".into()) })
            .await;
        relay
            .handle_event(DriverEvent::Disconnected { reason: None })
            .await;

        assert_eq!(relay.snapshot().read().reconnect_attempts(), 2);
        assert!(relay.snapshot().read().client_info().is_none());

        relay
            .handle_event(DriverEvent::Ready { info: identity() })
            .await;
        assert_eq!(relay.snapshot().read().reconnect_attempts(), 0);
    }

    #[tokio::test]
    async fn ready_starts_the_poller() {
        let (mut relay, _rx) = relay_with_sink(None);
        assert!(!relay.poller_active());

        relay
            .handle_event(DriverEvent::Ready { info: identity() })
            .await;
        assert!(relay.poller_active());
    }
}
