use thiserror::Error;

/// Injects fully built frames onto the wire.
pub trait FrameSender {
    fn send(&mut self, frame: &[u8]) -> Result<(), SendError>;
}

impl FrameSender for pcap::Capture<pcap::Active> {
    fn send(&mut self, frame: &[u8]) -> Result<(), SendError> {
        self.sendpacket(frame).map_err(SendError::PcapError)
    }
}

#[derive(Debug, Error)]
pub enum SendError {
    #[error("Failed to send frame: {0}")]
    PcapError(pcap::Error),
}
