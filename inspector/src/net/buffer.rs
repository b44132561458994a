use crate::net::dump::DumpSink;
use crate::net::flow;
use crate::net::flow::Flows;
use crate::net::storage::FrameStorage;
use dpi::dto::frame::{CapturedFrame, Direction, OwnedFrame};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

/// Thread-safe frame stores fed by the capture thread.
///
/// The recency buffer and the history store have their own locks, and the
/// dump sink has a third one. A lock is held only for a single container
/// mutation or copy.
pub struct CaptureBuffer {
    recent: Mutex<FrameStorage<CapturedFrame>>,
    history: Mutex<FrameStorage<CapturedFrame>>,
    history_enabled: AtomicBool,
    dump: Mutex<Option<DumpState>>,
}

struct DumpState {
    sink: Box<dyn DumpSink>,
    failure_reported: bool,
}

impl CaptureBuffer {
    pub fn new(recent_capacity: usize, history_capacity: usize, history_enabled: bool) -> Self {
        Self {
            recent: Mutex::new(FrameStorage::new(recent_capacity)),
            history: Mutex::new(FrameStorage::new(history_capacity)),
            history_enabled: AtomicBool::new(history_enabled),
            dump: Mutex::new(None),
        }
    }

    /// Stores a decoded frame. The raw frame goes to the dump sink first,
    /// if one is attached; a failed dump write never blocks storing.
    pub fn append(&self, frame: CapturedFrame, raw: &OwnedFrame) {
        self.write_dump(raw);

        if self.history_enabled.load(Ordering::Acquire) {
            lock(&self.history, "history").add(frame.clone());
        }
        lock(&self.recent, "recent").add(frame);
    }

    /// Copy of the recency buffer, oldest first.
    pub fn snapshot(&self) -> Vec<CapturedFrame> {
        lock(&self.recent, "recent").snapshot()
    }

    pub fn latest(&self) -> Option<CapturedFrame> {
        lock(&self.recent, "recent").last().cloned()
    }

    pub fn recent_count(&self) -> usize {
        lock(&self.recent, "recent").amount()
    }

    pub fn clear_recent(&self) {
        lock(&self.recent, "recent").clear();
    }

    /// Flows of one direction over the current recency buffer. Computed on
    /// every call from a snapshot, outside of the lock.
    pub fn group_by(&self, direction: Direction) -> Flows {
        let frames = self.snapshot();
        flow::group(&frames, direction)
    }

    pub fn history_count(&self) -> usize {
        lock(&self.history, "history").amount()
    }

    pub fn history_all(&self) -> Vec<CapturedFrame> {
        lock(&self.history, "history").snapshot()
    }

    pub fn clear_history(&self) {
        lock(&self.history, "history").clear();
    }

    pub fn is_history_enabled(&self) -> bool {
        self.history_enabled.load(Ordering::Acquire)
    }

    /// Disabling keeps what was already stored.
    pub fn set_history_enabled(&self, enabled: bool) {
        self.history_enabled.store(enabled, Ordering::Release);
    }

    /// Attaches a dump sink, replacing the previous one.
    pub fn start_dump(&self, sink: Box<dyn DumpSink>) {
        let previous = lock(&self.dump, "dump").replace(DumpState {
            sink,
            failure_reported: false,
        });
        if previous.is_some() {
            log::info!("Previous dump replaced.");
        }
    }

    /// Detaches the sink; dropping it closes the file.
    pub fn stop_dump(&self) -> bool {
        lock(&self.dump, "dump").take().is_some()
    }

    pub fn is_dumping(&self) -> bool {
        lock(&self.dump, "dump").is_some()
    }

    fn write_dump(&self, raw: &OwnedFrame) {
        let mut guard = lock(&self.dump, "dump");
        let Some(state) = guard.as_mut() else {
            return;
        };

        if let Err(err) = state.sink.write(raw) {
            if state.failure_reported {
                log::debug!("{} Record dropped.", err);
            } else {
                log::error!("{} Capture continues, failed records are dropped.", err);
                state.failure_reported = true;
            }
        }
    }
}

// Every store mutation is a single call, so a poisoned store is consistent
fn lock<'a, T>(mutex: &'a Mutex<T>, name: &str) -> MutexGuard<'a, T> {
    mutex.lock().unwrap_or_else(|poisoned| {
        log::warn!("Recovered poisoned {} lock.", name);
        poisoned.into_inner()
    })
}
