use crate::net::buffer::CaptureBuffer;
use crate::net::source::{FrameSource, SourceError};
use dpi::parser::FrameDecoder;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::thread::JoinHandle;
use thiserror::Error;

const THREAD_NAME: &str = "capture";

/// Owns the background capture thread.
///
/// The thread reads from its [`FrameSource`], decodes without holding any
/// lock and appends to the shared [`CaptureBuffer`]. Stopping raises the
/// shutdown flag, which the thread checks after every read, so teardown
/// takes at most one read timeout.
pub struct CaptureEngine {
    buffer: Arc<CaptureBuffer>,
    decoder: FrameDecoder,

    shutdown_flag: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl CaptureEngine {
    pub fn new(buffer: Arc<CaptureBuffer>, decoder: FrameDecoder) -> Self {
        Self {
            buffer,
            decoder,
            shutdown_flag: Arc::new(AtomicBool::new(false)),
            handle: None,
        }
    }

    pub fn start<S: FrameSource + 'static>(&mut self, source: S) -> Result<(), CaptureError> {
        if self.is_capturing() {
            return Err(CaptureError::AlreadyCapturing);
        }
        // Thread that ended on its own, e.g. after a source error
        self.join();

        self.shutdown_flag.store(false, Ordering::Release);

        let shutdown_flag = Arc::clone(&self.shutdown_flag);
        let buffer = Arc::clone(&self.buffer);
        let decoder = self.decoder.clone();
        let handle = thread::Builder::new()
            .name(THREAD_NAME.to_string())
            .spawn(move || capture_loop(source, &decoder, &buffer, &shutdown_flag))
            .map_err(CaptureError::ThreadSpawnError)?;

        self.handle = Some(handle);
        log::info!("Capture started.");

        Ok(())
    }

    /// Returns after the thread has finished; no frame is appended after
    /// that. `false` if nothing was running.
    pub fn stop(&mut self) -> bool {
        if self.handle.is_none() {
            return false;
        }

        self.shutdown_flag.store(true, Ordering::Release);
        self.join();
        log::info!("Capture stopped.");

        true
    }

    pub fn is_capturing(&self) -> bool {
        self.handle
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    pub fn buffer(&self) -> &Arc<CaptureBuffer> {
        &self.buffer
    }

    fn join(&mut self) {
        if let Some(handle) = self.handle.take()
            && let Err(err) = handle.join()
        {
            log::error!("Failed to join capture thread handle: {:?}", err);
        }
    }
}

impl Drop for CaptureEngine {
    fn drop(&mut self) {
        self.stop();
    }
}

fn capture_loop<S: FrameSource>(
    mut source: S, decoder: &FrameDecoder, buffer: &CaptureBuffer, shutdown_flag: &AtomicBool,
) {
    loop {
        if shutdown_flag.load(Ordering::Acquire) {
            log::debug!("Shutting down capture thread.");
            break;
        }

        match source.next_frame() {
            Ok(Some(raw)) => {
                let frame = decoder.process(&raw);
                buffer.append(frame, &raw);
            },
            Ok(None) => continue,
            Err(SourceError::Exhausted) => {
                log::info!("Frame source exhausted.");
                break;
            },
            Err(err) => {
                log::error!("{} Capture thread terminated.", err);
                break;
            },
        }
    }
}

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("Capture is already running.")]
    AlreadyCapturing,

    #[error("Failed to spawn capture thread.")]
    ThreadSpawnError(std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use dpi::craft;
    use dpi::craft::config::CraftConfig;
    use dpi::dto::frame::{FrameHeader, OwnedFrame};
    use std::collections::VecDeque;
    use std::time::{Duration, Instant};

    const WAIT_LIMIT: Duration = Duration::from_secs(5);
    const IDLE_READ: Duration = Duration::from_millis(1);

    /// Replays frames, then keeps timing out like an idle device.
    struct ScriptedSource {
        frames: VecDeque<OwnedFrame>,
        exhaust: bool,
    }

    impl ScriptedSource {
        fn new(count: i64, exhaust: bool) -> Self {
            let data = craft::craft(&CraftConfig::default()).unwrap();
            let frames = (0..count)
                .map(|id| OwnedFrame {
                    header: FrameHeader {
                        tv_usec: id,
                        caplen: data.len() as u32,
                        len: data.len() as u32,
                        ..Default::default()
                    },
                    data: data.clone(),
                })
                .collect();

            Self { frames, exhaust }
        }
    }

    impl FrameSource for ScriptedSource {
        fn next_frame(&mut self) -> Result<Option<OwnedFrame>, SourceError> {
            match self.frames.pop_front() {
                Some(frame) => Ok(Some(frame)),
                None if self.exhaust => Err(SourceError::Exhausted),
                None => {
                    thread::sleep(IDLE_READ);
                    Ok(None)
                },
            }
        }
    }

    fn engine(capacity: usize) -> CaptureEngine {
        CaptureEngine::new(
            Arc::new(CaptureBuffer::new(capacity, capacity, true)),
            FrameDecoder::default(),
        )
    }

    fn wait_for(engine: &CaptureEngine, count: usize) {
        let started = Instant::now();
        while engine.buffer().history_count() < count && started.elapsed() < WAIT_LIMIT {
            thread::sleep(IDLE_READ);
        }
    }

    #[test]
    fn test_frames_stored_in_delivery_order() {
        let mut engine = engine(100);
        engine.start(ScriptedSource::new(20, false)).unwrap();
        wait_for(&engine, 20);
        assert!(engine.stop());

        let ids: Vec<i64> = engine
            .buffer()
            .snapshot()
            .iter()
            .map(|frame| frame.header.tv_usec)
            .collect();
        assert_eq!(ids, (0..20).collect::<Vec<i64>>());
        assert_eq!(engine.buffer().snapshot()[0].transport_label(), "UDP");
    }

    #[test]
    fn test_second_start_fails() {
        let mut engine = engine(10);
        engine.start(ScriptedSource::new(0, false)).unwrap();

        let result = engine.start(ScriptedSource::new(5, false));
        assert!(matches!(result, Err(CaptureError::AlreadyCapturing)));
        assert!(engine.is_capturing());

        assert!(engine.stop());
        // The rejected source never ran
        assert_eq!(engine.buffer().history_count(), 0);
    }

    #[test]
    fn test_stop_joins_thread() {
        let mut engine = engine(10);
        engine.start(ScriptedSource::new(3, false)).unwrap();
        wait_for(&engine, 3);

        let started = Instant::now();
        assert!(engine.stop());
        assert!(started.elapsed() < Duration::from_secs(1));
        assert!(!engine.is_capturing());
        assert!(!engine.stop());
    }

    #[test]
    fn test_restart_after_stop() {
        let mut engine = engine(10);
        engine.start(ScriptedSource::new(2, false)).unwrap();
        wait_for(&engine, 2);
        engine.stop();

        engine.start(ScriptedSource::new(3, false)).unwrap();
        wait_for(&engine, 5);
        engine.stop();

        assert_eq!(engine.buffer().history_count(), 5);
    }

    #[test]
    fn test_exhausted_source_ends_thread() {
        let mut engine = engine(10);
        engine.start(ScriptedSource::new(4, true)).unwrap();

        let started = Instant::now();
        while engine.is_capturing() && started.elapsed() < WAIT_LIMIT {
            thread::sleep(IDLE_READ);
        }

        assert!(!engine.is_capturing());
        assert_eq!(engine.buffer().recent_count(), 4);
        // Finished thread does not block a new start
        assert!(engine.start(ScriptedSource::new(0, true)).is_ok());
    }
}
