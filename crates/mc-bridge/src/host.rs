//! Host-side primitives
//!
//! The game server owns its state on one authoritative thread. Everything
//! the bridge reads from that state goes through [`MainThread`], a FIFO task
//! submission handle, so reads never race game-logic mutation.

use bridge_core::{BridgeError, PlayerInfo, Result};
use std::sync::mpsc;

type Job = Box<dyn FnOnce() + Send>;

/// Handle submitting work to the game-state-owning thread
///
/// Jobs run in submission order on whatever single thread drives the
/// matching [`MainThreadDriver`].
#[derive(Clone)]
pub struct MainThread {
    tx: mpsc::Sender<Job>,
}

/// Consumes submitted jobs; handed to the host's dedicated thread
pub struct MainThreadDriver {
    rx: mpsc::Receiver<Job>,
}

impl MainThread {
    /// Create an unstarted handle/driver pair; the host runs the driver on
    /// its own thread
    pub fn channel() -> (MainThread, MainThreadDriver) {
        let (tx, rx) = mpsc::channel();
        (MainThread { tx }, MainThreadDriver { rx })
    }

    /// Convenience: spawn a dedicated thread running the driver
    pub fn start() -> MainThread {
        let (handle, driver) = Self::channel();
        std::thread::spawn(move || driver.run());
        handle
    }

    /// Fire-and-forget submission
    pub fn submit(&self, job: impl FnOnce() + Send + 'static) -> Result<()> {
        self.tx
            .send(Box::new(job))
            .map_err(|_| BridgeError::Io("game main thread is gone".to_string()))
    }

    /// Run `f` on the game thread and await its result
    pub async fn call<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        let (tx, rx) = tokio::sync::oneshot::channel();
        self.submit(move || {
            let _ = tx.send(f());
        })?;
        rx.await
            .map_err(|_| BridgeError::Io("game main thread dropped the task".to_string()))
    }
}

impl MainThreadDriver {
    /// Execute jobs until every [`MainThread`] handle is dropped
    pub fn run(self) {
        while let Ok(job) = self.rx.recv() {
            job();
        }
    }
}

/// Snapshot of the game state the bridge reports on
#[derive(Debug, Clone)]
pub struct ServerStatus {
    /// Online players
    pub players: Vec<PlayerInfo>,
    /// Average milliseconds per tick, unrounded
    pub mspt: f64,
}

/// Supplies status snapshots; implementations are only invoked from jobs
/// running on the game main thread
pub trait StatusSource: Send + Sync + 'static {
    fn status(&self) -> ServerStatus;
}

/// Lifecycle and player notifications the host delivers to the bridge
pub trait HostEvents {
    fn on_server_started(&self);
    fn on_server_stopping(&self);
    fn on_player_join(&self);
    fn on_player_leave(&self);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use tokio_test::assert_ok;

    #[tokio::test]
    async fn test_jobs_run_in_submission_order() {
        let main = MainThread::start();
        let seen = Arc::new(Mutex::new(Vec::new()));

        for i in 0..100 {
            let seen = seen.clone();
            main.submit(move || seen.lock().unwrap().push(i)).unwrap();
        }

        // a call drains behind all submitted jobs
        main.call(|| ()).await.unwrap();
        assert_eq!(*seen.lock().unwrap(), (0..100).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_call_returns_result() {
        let main = MainThread::start();
        let answer = assert_ok!(main.call(|| 6 * 7).await);
        assert_eq!(answer, 42);
    }

    #[tokio::test]
    async fn test_submit_fails_after_driver_gone() {
        let (handle, driver) = MainThread::channel();
        drop(driver);

        assert!(handle.submit(|| ()).is_err());
        assert!(handle.call(|| 1).await.is_err());
    }
}
