//! Lock-guarded network and a background tick loop.
//!
//! Every tick and every mutation take the same mutex, so an editor thread can
//! change topology while [`TickLoop`] runs without racing a tick.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, TrySendError, sync_channel};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::debug;

use crate::clock::TickClock;
use crate::error::{EngineError, EngineResult};
use crate::network::Network;
use crate::tick::TickReport;

/// Cheaply clonable handle to a network shared between threads.
#[derive(Debug, Clone, Default)]
pub struct SharedNetwork(Arc<Mutex<Network>>);

impl SharedNetwork {
    pub fn new(network: Network) -> Self {
        Self(Arc::new(Mutex::new(network)))
    }

    /// Run `f` with exclusive access; the lock is held only for the call.
    pub fn with<R>(&self, f: impl FnOnce(&mut Network) -> R) -> EngineResult<R> {
        let mut guard = self.0.lock().map_err(|_| EngineError::LockPoisoned)?;
        Ok(f(&mut guard))
    }

    /// Copy of the current network, e.g. for saving.
    pub fn snapshot(&self) -> EngineResult<Network> {
        self.with(|net| net.clone())
    }
}

/// Background thread ticking a [`SharedNetwork`] at a fixed interval.
///
/// Reports with events or errors are forwarded on [`TickLoop::reports`]. At
/// most [`TickLoop::REPORT_QUEUE`] reports wait unread; newer ones are dropped
/// until the receiver catches up.
pub struct TickLoop {
    pub reports: Receiver<TickReport>,
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<usize>>,
}

impl TickLoop {
    pub const REPORT_QUEUE: usize = 64;

    pub fn spawn(shared: SharedNetwork, interval: Duration) -> Self {
        let (tx, rx) = sync_channel(Self::REPORT_QUEUE);
        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);

        let handle = thread::spawn(move || {
            let mut clock = TickClock::start();
            let mut ticks = 0;
            let mut dropped = 0usize;
            while !flag.load(Ordering::Relaxed) {
                let ctx = clock.next();
                let Ok(report) = shared.with(|net| net.tick(&ctx)) else {
                    break;
                };
                ticks += 1;
                if !report.is_empty() {
                    match tx.try_send(report) {
                        Ok(()) => {}
                        Err(TrySendError::Full(_)) => dropped += 1,
                        Err(TrySendError::Disconnected(_)) => break,
                    }
                }
                thread::sleep(interval);
            }
            debug!(ticks, dropped, "tick loop stopped");
            ticks
        });

        Self {
            reports: rx,
            stop,
            handle: Some(handle),
        }
    }

    /// Stop the loop and wait for it; returns the number of ticks run.
    pub fn stop(mut self) -> usize {
        self.shutdown()
    }

    fn shutdown(&mut self) -> usize {
        self.stop.store(true, Ordering::Relaxed);
        self.handle
            .take()
            .and_then(|handle| handle.join().ok())
            .unwrap_or(0)
    }
}

impl Drop for TickLoop {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_gives_exclusive_access() {
        let shared = SharedNetwork::default();
        let id = shared.with(|net| net.add_node("Source", &[])).unwrap().unwrap();
        let count = shared.with(|net| net.len()).unwrap();
        assert_eq!(count, 1);
        assert!(shared.snapshot().unwrap().node(id).is_some());
    }

    #[test]
    fn unread_reports_stay_bounded() {
        let mut net = Network::new();
        let source = net.add_node("Source", &[]).unwrap();
        let printer = net.add_node("Printer", &[]).unwrap();
        net.connect(source, "OUT", printer, "IN").unwrap();

        let mut ticker = TickLoop::spawn(SharedNetwork::new(net), Duration::from_micros(10));
        thread::sleep(Duration::from_millis(300));
        let (_, idle) = sync_channel(0);
        let reports = std::mem::replace(&mut ticker.reports, idle);
        let ticks = ticker.stop();

        assert!(ticks > TickLoop::REPORT_QUEUE, "only {ticks} ticks ran");
        assert_eq!(reports.try_iter().count(), TickLoop::REPORT_QUEUE);
    }
}
