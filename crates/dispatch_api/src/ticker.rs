//! Background thread that keeps the engine's periodic work running while no
//! client call is arriving: each beat locks the engine and advances its clock,
//! which drains due heartbeat sweeps and match retries.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crate::service::SharedDispatch;

pub struct Ticker {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl Ticker {
    pub fn spawn(dispatch: SharedDispatch, interval: Duration) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let flag = stop.clone();
        let handle = std::thread::spawn(move || {
            tracing::debug!(interval_ms = interval.as_millis() as u64, "ticker started");
            while !flag.load(Ordering::Relaxed) {
                dispatch.tick();
                std::thread::sleep(interval);
            }
            tracing::debug!("ticker stopped");
        });
        Self {
            stop,
            handle: Some(handle),
        }
    }

    /// Signals the thread and waits for it to finish. Dropping the ticker
    /// does the same.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.shutdown();
    }
}
