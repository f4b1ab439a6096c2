//! Bridge client orchestration
//!
//! Owns the transport slot, the outbound queue and the reconnection policy,
//! plus the timer tasks that tie them together: a one-second flush cycle and
//! one-shot reconnect timers. All scheduled work re-checks the running flag
//! before acting so nothing fires after `stop()`.

use crate::queue::{OutboundQueue, QUEUE_WARN_DEPTH};
use crate::reconnect::{ReconnectDecision, ReconnectPolicy, RetryState};
use crate::transport::{CONNECT_TIMEOUT, CloseReason, ConnectionEvent, Connector, Transport};
use bridge_core::{BridgeConfig, BridgeError, Result};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Period of the flush cycle
const FLUSH_INTERVAL: Duration = Duration::from_secs(1);
/// Maximum messages sent per flush invocation
const FLUSH_BATCH: usize = 10;

type OnConnected = Arc<dyn Fn() + Send + Sync>;

#[derive(Default)]
struct Tasks {
    flush: Option<JoinHandle<()>>,
    events: Option<JoinHandle<()>>,
    reconnect: Option<JoinHandle<()>>,
}

struct Inner {
    config: BridgeConfig,
    connector: Arc<dyn Connector>,
    queue: OutboundQueue,
    /// At most one open transport exists at any time
    conn: Mutex<Option<Box<dyn Transport>>>,
    policy: Mutex<ReconnectPolicy>,
    /// Gates all scheduled work; set by start, cleared by stop
    running: AtomicBool,
    /// Bumped per connect attempt; tags close events from that session
    session: AtomicU64,
    events_tx: Mutex<Option<mpsc::Sender<ConnectionEvent>>>,
    tasks: Mutex<Tasks>,
    on_connected: Mutex<Option<OnConnected>>,
}

/// Resilient streaming client bridging the game server to the web endpoint
///
/// Cheap to clone; all clones share one client instance.
#[derive(Clone)]
pub struct BridgeClient {
    inner: Arc<Inner>,
}

impl BridgeClient {
    pub fn new(config: BridgeConfig, connector: Arc<dyn Connector>) -> Self {
        let policy = ReconnectPolicy::new(
            config.auto_reconnect,
            config.max_reconnect_attempts,
            Duration::from_secs(config.reconnect_interval),
        );

        Self {
            inner: Arc::new(Inner {
                config,
                connector,
                queue: OutboundQueue::new(),
                conn: Mutex::new(None),
                policy: Mutex::new(policy),
                running: AtomicBool::new(false),
                session: AtomicU64::new(0),
                events_tx: Mutex::new(None),
                tasks: Mutex::new(Tasks::default()),
                on_connected: Mutex::new(None),
            }),
        }
    }

    /// Register a callback invoked after every successful connect
    pub async fn set_on_connected(&self, callback: impl Fn() + Send + Sync + 'static) {
        *self.inner.on_connected.lock().await = Some(Arc::new(callback));
    }

    /// Start the client: spawn the flush cycle and attempt one connect
    ///
    /// Idempotent; a second call while running is a warned no-op.
    pub async fn start(&self) {
        if self
            .inner
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            warn!("Client already running");
            return;
        }

        info!("Starting WebSocket client...");

        let (events_tx, events_rx) = mpsc::channel(32);
        *self.inner.events_tx.lock().await = Some(events_tx);

        {
            let mut tasks = self.inner.tasks.lock().await;
            tasks.events = Some(tokio::spawn(Self::event_loop(self.clone(), events_rx)));
            tasks.flush = Some(tokio::spawn(Self::flush_loop(self.clone())));
        }

        let _ = self.connect().await;
    }

    /// Stop the client: cancel schedules, close the transport, drop the queue
    ///
    /// Idempotent; safe even when nothing was ever scheduled.
    pub async fn stop(&self) {
        if self
            .inner
            .running
            .compare_exchange(true, false, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return;
        }

        info!("Stopping WebSocket client...");

        {
            let mut tasks = self.inner.tasks.lock().await;
            for handle in [
                tasks.flush.take(),
                tasks.events.take(),
                tasks.reconnect.take(),
            ]
            .into_iter()
            .flatten()
            {
                handle.abort();
            }
        }

        *self.inner.events_tx.lock().await = None;

        if let Some(mut transport) = self.inner.conn.lock().await.take() {
            transport.close().await;
        }

        let dropped = self.inner.queue.clear().await;
        if dropped > 0 {
            debug!("Discarded {} queued messages", dropped);
        }

        self.inner.policy.lock().await.reset();
        info!("WebSocket client stopped");
    }

    /// Queue a serialized message for the next flush cycle
    ///
    /// Dropped when no connection is open: queuing without a live path only
    /// grows backlog that would be cleared on stop anyway.
    pub async fn enqueue(&self, message: String) {
        if !self.is_connected().await {
            debug!("Not connected, dropping outbound message");
            return;
        }

        let depth = self.inner.queue.push(message).await;
        if depth > QUEUE_WARN_DEPTH {
            warn!("Message queue too long ({} messages)", depth);
        }
    }

    pub async fn is_connected(&self) -> bool {
        self.inner
            .conn
            .lock()
            .await
            .as_ref()
            .is_some_and(|t| t.is_open())
    }

    /// Current outbound queue depth
    pub async fn queue_depth(&self) -> usize {
        self.inner.queue.len().await
    }

    /// Reconnection policy state, for diagnostics
    pub async fn retry_state(&self) -> RetryState {
        self.inner.policy.lock().await.state()
    }

    /// Attempt one connect; refuses while a connection is already open
    ///
    /// Configuration errors (bad scheme) are logged severe and do not feed
    /// the retry path; connect failures do.
    pub async fn connect(&self) -> Result<()> {
        let Some(events_tx) = self.inner.events_tx.lock().await.clone() else {
            return Err(BridgeError::NotConnected);
        };

        let mut conn = self.inner.conn.lock().await;
        if conn.as_ref().is_some_and(|t| t.is_open()) {
            warn!("Already connected");
            return Ok(());
        }

        let url = self
            .inner
            .config
            .websocket
            .full_url(&self.inner.config.server_id);
        info!("Connecting to: {}", url);

        let session = self.inner.session.fetch_add(1, Ordering::SeqCst) + 1;

        match self
            .inner
            .connector
            .connect(&url, CONNECT_TIMEOUT, session, events_tx)
            .await
        {
            Ok(transport) => {
                *conn = Some(transport);
                drop(conn);

                info!("Connected");
                self.inner.policy.lock().await.on_connected();

                let callback = self.inner.on_connected.lock().await.clone();
                if let Some(callback) = callback {
                    callback();
                }
                Ok(())
            }
            Err(e) => {
                drop(conn);
                match &e {
                    BridgeError::Config(_) => error!("{}", e),
                    _ => {
                        warn!("Connection failed: {}", e);
                        self.schedule_reconnect().await;
                    }
                }
                Err(e)
            }
        }
    }

    /// Consult the policy after a failure and arm the retry timer if told to
    ///
    /// Returns a boxed future so its `Send` bound is resolvable despite the
    /// connect -> schedule_reconnect -> connect recursion.
    fn schedule_reconnect(
        &self,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = ()> + Send + '_>> {
        Box::pin(async move {
            if !self.inner.running.load(Ordering::SeqCst) {
                return;
            }

            let decision = self.inner.policy.lock().await.on_failure();
            match decision {
                ReconnectDecision::Disabled => {}
                ReconnectDecision::Exhausted => {
                    warn!("Max reconnect attempts reached");
                }
                ReconnectDecision::RetryAfter { attempt, delay } => {
                    let max = self.inner.config.max_reconnect_attempts;
                    if max <= 0 {
                        info!("Scheduling reconnect attempt {} (unlimited)", attempt);
                    } else {
                        info!("Scheduling reconnect attempt {}/{}", attempt, max);
                    }

                    let client = self.clone();
                    let handle = tokio::spawn(async move {
                        tokio::time::sleep(delay).await;
                        if client.inner.running.load(Ordering::SeqCst) {
                            let _ = client.connect().await;
                        }
                    });

                    let mut tasks = self.inner.tasks.lock().await;
                    if let Some(old) = tasks.reconnect.replace(handle) {
                        old.abort();
                    }
                }
            }
        })
    }

    async fn flush_loop(client: BridgeClient) {
        let mut ticker = tokio::time::interval(FLUSH_INTERVAL);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // the first tick completes immediately; flushing starts one period in
        ticker.tick().await;

        loop {
            ticker.tick().await;
            if !client.inner.running.load(Ordering::SeqCst) {
                break;
            }
            client.flush_once().await;
        }
    }

    /// Drain up to one batch and send it in FIFO order
    ///
    /// A failed send puts the failed message and the unsent remainder back
    /// at the queue head and aborts the batch, so retry order is preserved.
    async fn flush_once(&self) {
        let mut conn = self.inner.conn.lock().await;
        let Some(transport) = conn.as_mut() else {
            return;
        };
        if !transport.is_open() {
            return;
        }

        let batch = self.inner.queue.drain(FLUSH_BATCH).await;
        if batch.is_empty() {
            return;
        }

        let mut sent = 0;
        let mut iter = batch.into_iter();
        while let Some(message) = iter.next() {
            match transport.send(&message).await {
                Ok(()) => {
                    sent += 1;
                    let preview: String = message.chars().take(100).collect();
                    if self.inner.config.debug {
                        info!("Sent message: {}...", preview);
                    } else {
                        debug!("Sent message: {}...", preview);
                    }
                }
                Err(e) => {
                    warn!("Send failed: {}", e);
                    let mut unsent = vec![message];
                    unsent.extend(iter);
                    self.inner.queue.requeue_front(unsent).await;
                    break;
                }
            }
        }

        if sent > 0 {
            debug!(
                "Sent {} messages, queue remaining: {}",
                sent,
                self.inner.queue.len().await
            );
        }
    }

    async fn event_loop(client: BridgeClient, mut events_rx: mpsc::Receiver<ConnectionEvent>) {
        while let Some(event) = events_rx.recv().await {
            let ConnectionEvent::Closed { session, reason } = event;

            if session != client.inner.session.load(Ordering::SeqCst) {
                debug!("Ignoring close notification for stale session {}", session);
                continue;
            }

            match reason {
                CloseReason::Remote => warn!("Connection closed by server"),
                CloseReason::Local => info!("Connection closed by client"),
                CloseReason::Error => warn!("Connection lost"),
            }

            *client.inner.conn.lock().await = None;

            if reason != CloseReason::Local && client.inner.running.load(Ordering::SeqCst) {
                client.schedule_reconnect().await;
            }
        }
    }
}
