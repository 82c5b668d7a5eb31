use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::{Duration, Instant},
};

static SCOPES_MEASURED: AtomicU64 = AtomicU64::new(0);

/// Reports how long the enclosing scope took when dropped.
pub struct TimedScope {
    label:  &'static str,
    pinned: bool,
    start:  Instant,
}

impl TimedScope {
    pub fn new(label: &'static str, pinned: bool) -> Self {
        Self { label, pinned, start: Instant::now() }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Drop for TimedScope {
    fn drop(&mut self) {
        let elapsed = self.elapsed();
        SCOPES_MEASURED.fetch_add(1, Ordering::Relaxed);
        if self.pinned {
            log::debug!(target: "profiler", "{} took {:?}", self.label, elapsed);
        } else {
            log::trace!(target: "profiler", "{} took {:?}", self.label, elapsed);
        }
    }
}

/// Logs session summary when the session ends.
pub struct SessionGuard {
    name:  &'static str,
    start: Instant,
}

impl SessionGuard {
    pub fn new(name: &'static str) -> Self {
        log::info!(target: "profiler", "Profiling session \"{}\" started", name);
        Self { name, start: Instant::now() }
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        log::info!(
            target: "profiler",
            "Profiling session \"{}\" finished after {:?}, {} scopes measured",
            self.name,
            self.start.elapsed(),
            SCOPES_MEASURED.load(Ordering::Relaxed),
        );
    }
}
