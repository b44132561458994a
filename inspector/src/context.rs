use crate::capture::{CaptureEngine, CaptureError};
use crate::config::Config;
use crate::craft::ProfileError;
use crate::net::buffer::CaptureBuffer;
use crate::net::dump::{DumpError, PcapDump};
use crate::net::interface;
use crate::net::interface::InterfaceError;
use common::io::FileKind;
use dpi::craft::config::CraftConfig;
use dpi::parser::FrameDecoder;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

/// Composition root: the config, the shared capture buffer and the engine
/// feeding it. Consumers get handles from here instead of global state.
pub struct Context {
    pub config: Config,

    engine: CaptureEngine,
}

impl Context {
    pub fn new(config: Config) -> Self {
        let buffer = Arc::new(CaptureBuffer::new(
            config.recent_capacity,
            config.history_capacity,
            config.history_enabled,
        ));
        let engine = CaptureEngine::new(buffer, FrameDecoder::new(config.snapshot_length));

        Self { config, engine }
    }

    pub fn buffer(&self) -> Arc<CaptureBuffer> {
        Arc::clone(self.engine.buffer())
    }

    pub fn device(&self) -> Result<pcap::Device, InterfaceError> {
        interface::resolve(self.config.interface.as_deref())
    }

    /// Opens the device, attaches the dump file if configured and starts
    /// the capture thread.
    pub fn start_capture(&mut self) -> Result<(), ContextError> {
        if self.engine.is_capturing() {
            return Err(ContextError::Capture(CaptureError::AlreadyCapturing));
        }

        let device = self.device()?;
        let capture = interface::get_capture(device, self.read_timeout())?;

        if let Some(path) = self.dump_path()? {
            common::io::create_parent_directories(&path).map_err(ContextError::Storage)?;
            let dump = PcapDump::create(&path, capture.get_datalink())?;
            self.engine.buffer().start_dump(Box::new(dump));
            log::info!("Dumping frames to {}.", path.display());
        }

        if let Err(err) = self.engine.start(capture) {
            self.engine.buffer().stop_dump();
            return Err(err.into());
        }

        Ok(())
    }

    /// Joins the capture thread, then closes the dump file.
    pub fn stop_capture(&mut self) -> bool {
        let stopped = self.engine.stop();
        if self.engine.buffer().stop_dump() {
            log::info!("Dump file closed.");
        }

        stopped
    }

    pub fn is_capturing(&self) -> bool {
        self.engine.is_capturing()
    }

    pub fn send(&self, config: &CraftConfig, count: usize) -> Result<usize, ContextError> {
        // Checked before the device is opened
        dpi::craft::validate(config).map_err(ProfileError::Craft)?;

        let device = self.device()?;
        let mut capture = interface::get_capture(device, self.read_timeout())?;

        Ok(crate::craft::craft_and_send(config, &mut capture, count)?)
    }

    /// Relative dump files are kept in the per-user data directory.
    pub fn dump_path(&self) -> Result<Option<PathBuf>, ContextError> {
        self.config
            .dump_file
            .as_deref()
            .map(|path| common::io::resolve_storage_path(path, FileKind::Data))
            .transpose()
            .map_err(ContextError::Storage)
    }

    fn read_timeout(&self) -> i32 {
        i32::try_from(self.config.read_timeout_ms).unwrap_or(i32::MAX)
    }
}

#[derive(Debug, Error)]
pub enum ContextError {
    #[error("Interface error. {0}")]
    Interface(#[from] InterfaceError),

    #[error("Capture error. {0}")]
    Capture(#[from] CaptureError),

    #[error("Dump error. {0}")]
    Dump(#[from] DumpError),

    #[error("Storage error.")]
    Storage(std::io::Error),

    #[error("Craft error. {0}")]
    Profile(#[from] ProfileError),
}

impl ContextError {
    pub fn additional_info(&self) -> Option<String> {
        match self {
            ContextError::Interface(err) => err.additional_info(),
            ContextError::Profile(err) => err.additional_info(),
            ContextError::Storage(err) => Some(err.to_string()),
            _ => None,
        }
    }
}
