use dpi::dto::frame::OwnedFrame;
use std::path::Path;
use thiserror::Error;

/// Append-only record sink for captured frames.
pub trait DumpSink: Send {
    fn write(&mut self, frame: &OwnedFrame) -> Result<(), DumpError>;
}

/// Pcap savefile. Every record is flushed right away, so a failing disk is
/// noticed on the frame that hit it.
pub struct PcapDump {
    file: pcap::Savefile,
}

impl PcapDump {
    pub fn create<P: AsRef<Path>>(path: P, link_type: pcap::Linktype) -> Result<Self, DumpError> {
        let file = pcap::Capture::dead(link_type)
            .map_err(DumpError::OpenError)?
            .savefile(path)
            .map_err(DumpError::OpenError)?;

        Ok(Self { file })
    }
}

impl DumpSink for PcapDump {
    fn write(&mut self, frame: &OwnedFrame) -> Result<(), DumpError> {
        let header = pcap::PacketHeader::from(&frame.header);
        self.file.write(&pcap::Packet::new(&header, &frame.data));
        self.file.flush().map_err(DumpError::WriteError)
    }
}

#[derive(Debug, Error)]
pub enum DumpError {
    #[error("Failed to open dump file: {0}")]
    OpenError(pcap::Error),

    #[error("Failed to write dump record: {0}")]
    WriteError(pcap::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use dpi::dto::frame::FrameHeader;

    #[test]
    fn test_records_keep_full_frame() {
        let path = std::env::temp_dir().join(format!("inspector-dump-{}.pcap", std::process::id()));
        let frame = OwnedFrame {
            header: FrameHeader {
                tv_sec: 1_700_000_000,
                tv_usec: 250,
                caplen: 100,
                len: 1500,
            },
            data: (0..100).collect(),
        };

        let mut dump = PcapDump::create(&path, pcap::Linktype::ETHERNET).unwrap();
        dump.write(&frame).unwrap();
        dump.write(&frame).unwrap();
        drop(dump);

        let mut capture = pcap::Capture::from_file(&path).unwrap();
        let packet = capture.next_packet().unwrap();
        assert_eq!(packet.data, frame.data.as_slice());
        assert_eq!(packet.header.caplen, 100);
        assert_eq!(packet.header.len, 1500);
        assert!(capture.next_packet().is_ok());
        assert!(matches!(
            capture.next_packet(),
            Err(pcap::Error::NoMorePackets)
        ));

        std::fs::remove_file(path).unwrap();
    }
}
