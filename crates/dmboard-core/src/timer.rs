//! Cancellable one-shot timer for auto-advance scheduling.
//!
//! The wait is a condvar sleep against a deadline, so cancellation
//! wakes the thread immediately instead of letting a stale callback
//! linger for the rest of its delay.

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

/// Handle to a scheduled one-shot callback.
pub struct OneShot {
    shared: Arc<Shared>,
}

struct Shared {
    cancelled: Mutex<bool>,
    wake: Condvar,
}

impl OneShot {
    /// Run `callback` on a background thread after `delay`, unless the
    /// returned handle is cancelled first.
    pub fn start<F>(delay: Duration, callback: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        let shared = Arc::new(Shared {
            cancelled: Mutex::new(false),
            wake: Condvar::new(),
        });

        let thread_shared = Arc::clone(&shared);
        std::thread::spawn(move || {
            let deadline = Instant::now() + delay;
            let mut cancelled = thread_shared.cancelled.lock();
            while !*cancelled && Instant::now() < deadline {
                thread_shared.wake.wait_until(&mut cancelled, deadline);
            }
            if *cancelled {
                return;
            }
            drop(cancelled);
            callback();
        });

        Self { shared }
    }

    /// Cancel the pending callback. Calling after it has fired is a
    /// safe no-op.
    pub fn cancel(&self) {
        *self.shared.cancelled.lock() = true;
        self.shared.wake.notify_all();
    }
}
