use std::{
    ops::ControlFlow,
    sync::{Arc, Condvar, Mutex, PoisonError},
    time::{Duration, Instant},
};

/// Termination signal shared by the periodic loops.
#[derive(Debug, Clone, Default)]
pub struct Shutdown {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl Shutdown {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trigger(&self) {
        let (stopped, cvar) = &*self.inner;
        *stopped.lock().unwrap_or_else(PoisonError::into_inner) = true;
        cvar.notify_all();
    }

    pub fn is_triggered(&self) -> bool {
        *self.inner.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Sleeps for up to `timeout`, waking early on shutdown.
    /// Returns `true` if shutdown has been triggered.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let (stopped, cvar) = &*self.inner;
        let guard = stopped.lock().unwrap_or_else(PoisonError::into_inner);
        let (guard, _) = cvar
            .wait_timeout_while(guard, timeout, |stopped| !*stopped)
            .unwrap_or_else(PoisonError::into_inner);
        *guard
    }
}

/// Calls `tick` once per `period` until it breaks or shutdown fires.
///
/// Deadlines advance by whole periods from the start so slow ticks do not
/// drift the cadence. The first call happens one period after start.
pub fn run_every<F>(period: Duration, shutdown: &Shutdown, mut tick: F)
where
    F: FnMut() -> ControlFlow<()>,
{
    let mut deadline = Instant::now() + period;
    loop {
        let wait = deadline.saturating_duration_since(Instant::now());
        if shutdown.wait_timeout(wait) {
            return;
        }
        if tick().is_break() {
            return;
        }
        deadline += period;
        // Overran by more than a full period: resync instead of bursting.
        let now = Instant::now();
        if deadline + period < now {
            deadline = now + period;
        }
    }
}
