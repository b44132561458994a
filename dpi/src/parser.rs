use crate::dto::frame::{CapturedFrame, Direction, FrameHeader, OwnedFrame, TransportLayer};
use crate::protocols::ethernet::ether_type::EtherType;
use crate::protocols::ip::address;
use crate::protocols::ip::protocol::IpNextLevelProtocol;
use crate::protocols::{ethernet, icmpv4, ipv4, tcp, udp};

pub const DEFAULT_SNAPSHOT_LENGTH: usize = 64;

/// Turns raw captured bytes into a [`CapturedFrame`].
///
/// Decoding never fails. Each layer is guarded by a length check and a
/// frame that is truncated or of an unsupported type keeps the layers that
/// were decoded before the guard tripped.
#[derive(Clone, Debug)]
pub struct FrameDecoder {
    snapshot_length: usize,
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new(DEFAULT_SNAPSHOT_LENGTH)
    }
}

impl FrameDecoder {
    pub fn new(snapshot_length: usize) -> Self {
        Self { snapshot_length }
    }

    pub fn process(&self, frame: &OwnedFrame) -> CapturedFrame {
        self.decode(&frame.data, &frame.header)
    }

    pub fn decode(&self, bytes: &[u8], header: &FrameHeader) -> CapturedFrame {
        let snapshot_end = bytes.len().min(self.snapshot_length);
        let snapshot = bytes.get(..snapshot_end).unwrap_or_default().to_vec();

        let mut frame = CapturedFrame::new(header.clone(), snapshot);
        let depth = traversal(bytes, &mut frame);
        if depth != ProcessResult::Complete {
            log::trace!("Frame decoded partially: {:?}", depth);
        }

        frame
    }
}

fn traversal(bytes: &[u8], frame: &mut CapturedFrame) -> ProcessResult {
    if bytes.len() < ethernet::HEADER_LENGTH {
        return ProcessResult::Failed;
    }
    let (rest, ethernet) = match ethernet::parse(bytes) {
        Ok(value) => value,
        Err(_) => return ProcessResult::Failed,
    };
    let ether_type = ethernet.ether_type;
    frame.ethernet = Some(ethernet);

    if ether_type != EtherType::Ipv4 {
        return ProcessResult::Incomplete;
    }

    // Minimal header first, then the length announced by IHL
    if rest.len() < ipv4::MIN_HEADER_LENGTH {
        return ProcessResult::Incomplete;
    }
    match ipv4::header_length(rest) {
        Some(length) if (ipv4::MIN_HEADER_LENGTH..=ipv4::MAX_HEADER_LENGTH).contains(&length) => {
            if rest.len() < length {
                return ProcessResult::Incomplete;
            }
        },
        _ => return ProcessResult::Incomplete,
    }
    let (rest, ipv4) = match ipv4::parse(rest) {
        Ok(value) => value,
        Err(_) => return ProcessResult::Incomplete,
    };

    frame.direction = classify(&ipv4);
    let protocol = ipv4.protocol_inner;
    frame.ipv4 = Some(ipv4);

    // Port-carrying headers need their full fixed part
    let transport = match protocol {
        IpNextLevelProtocol::TCP if rest.len() >= tcp::HEADER_LENGTH => {
            tcp::parse(rest).ok().map(|(_, layer)| TransportLayer::Tcp(layer))
        },
        IpNextLevelProtocol::UDP if rest.len() >= udp::HEADER_LENGTH => {
            udp::parse(rest).ok().map(|(_, layer)| TransportLayer::Udp(layer))
        },
        IpNextLevelProtocol::ICMP if rest.len() >= icmpv4::HEADER_LENGTH => {
            icmpv4::parse(rest).ok().map(|(_, layer)| TransportLayer::Icmp(layer))
        },
        _ => None,
    };

    match transport {
        Some(layer) => {
            frame.transport = Some(layer);
            ProcessResult::Complete
        },
        None if matches!(protocol, IpNextLevelProtocol::Other(_)) => ProcessResult::Complete,
        None => ProcessResult::Incomplete,
    }
}

/// Inbound when a non-local source talks to a local destination,
/// everything else (local to local included) is outbound.
fn classify(header: &ipv4::IPv4) -> Direction {
    let source_local = address::is_local(&header.address_source);
    let destination_local = address::is_local(&header.address_destination);

    if !source_local && destination_local {
        Direction::Inbound
    } else {
        Direction::Outbound
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ProcessResult {
    // Every supported layer decoded
    Complete,

    // Some layers decoded, then a guard stopped the traversal
    Incomplete,

    // Nothing decoded
    Failed,
}

pub enum ParserError {
    ErrorVerify,
}

impl ParserError {
    pub fn to_nom<T>(&self, input: T) -> nom::Err<nom::error::Error<T>> {
        match self {
            Self::ErrorVerify => nom::Err::Error(nom::error::Error::new(
                input,
                nom::error::ErrorKind::Verify,
            )),
        }
    }
}
