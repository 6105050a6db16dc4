use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::debug;

struct Ticker {
    stop: Sender<()>,
    thread: JoinHandle<()>,
}

/// Periodic refresh timer with an explicit start/stop lifecycle.
///
/// The timer thread only calls `tick`; the tick is expected to hand work back to the UI
/// thread (for example by sending on a channel). After `stop` returns no further tick
/// starts.
pub struct RefreshScheduler {
    period: Duration,
    ticker: Option<Ticker>,
}

impl RefreshScheduler {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            ticker: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.ticker.is_some()
    }

    /// Starts ticking every period. Does nothing if already running.
    pub fn start<F>(&mut self, mut tick: F)
    where
        F: FnMut() + Send + 'static,
    {
        if self.ticker.is_some() {
            return;
        }
        let (stop, stopped) = mpsc::channel::<()>();
        let period = self.period;
        let thread = thread::spawn(move || {
            loop {
                match stopped.recv_timeout(period) {
                    Err(RecvTimeoutError::Timeout) => tick(),
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            }
        });
        debug!("auto refresh started ({period:?})");
        self.ticker = Some(Ticker { stop, thread });
    }

    pub fn stop(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            let _ = ticker.stop.send(());
            let _ = ticker.thread.join();
            debug!("auto refresh stopped");
        }
    }
}

impl Drop for RefreshScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}
