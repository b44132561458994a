use dpi::dto::frame::OwnedFrame;
use thiserror::Error;

/// Delivers captured frames to the capture thread.
///
/// `Ok(None)` means the read timed out without a frame; the caller checks
/// for shutdown and asks again.
pub trait FrameSource: Send {
    fn next_frame(&mut self) -> Result<Option<OwnedFrame>, SourceError>;
}

impl FrameSource for pcap::Capture<pcap::Active> {
    fn next_frame(&mut self) -> Result<Option<OwnedFrame>, SourceError> {
        match self.next_packet() {
            Ok(packet) => Ok(Some(OwnedFrame::from(packet))),
            Err(pcap::Error::TimeoutExpired) => Ok(None),
            Err(pcap::Error::NoMorePackets) => Err(SourceError::Exhausted),
            Err(err) => Err(SourceError::PcapError(err)),
        }
    }
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Pcap Library error: {0}")]
    PcapError(pcap::Error),

    #[error("No more frames to read.")]
    Exhausted,
}
