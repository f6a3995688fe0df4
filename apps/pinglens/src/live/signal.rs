use anyhow::{Context, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::time::Duration;

#[derive(Default)]
struct StopInner {
    raised: AtomicBool,
    lock: Mutex<()>,
    wake: Condvar,
}

/// Cooperative stop request shared between the signal handler and the loop.
#[derive(Clone, Default)]
pub struct StopFlag {
    inner: Arc<StopInner>,
}

impl StopFlag {
    pub fn raise(&self) {
        self.inner.raised.store(true, Ordering::SeqCst);
        let _guard = self.inner.lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.inner.wake.notify_all();
    }

    pub fn is_raised(&self) -> bool {
        self.inner.raised.load(Ordering::SeqCst)
    }

    /// Blocks for at most `timeout`, returning early once the flag is raised.
    /// May also return early spuriously.
    pub fn wait_timeout(&self, timeout: Duration) {
        let guard = self.inner.lock.lock().unwrap_or_else(PoisonError::into_inner);
        if self.is_raised() {
            return;
        }
        let _ = self.inner.wake.wait_timeout(guard, timeout);
    }
}

/// Routes SIGINT to `flag`. The handler only raises the flag.
pub fn install_interrupt_handler(flag: &StopFlag) -> Result<()> {
    let flag = flag.clone();
    ctrlc::set_handler(move || flag.raise()).context("failed to install interrupt handler")
}
