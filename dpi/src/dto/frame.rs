use crate::protocols::ethernet::Ethernet;
use crate::protocols::ethernet::mac::MacAddress;
use crate::protocols::icmpv4::{self, ICMPv4};
use crate::protocols::ip::protocol::IpNextLevelProtocol;
use crate::protocols::ipv4::IPv4;
use crate::protocols::tcp::{self, TCP};
use crate::protocols::udp::{self, UDP};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;

/// Raw frame as delivered by the capture backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnedFrame {
    pub header: FrameHeader,
    pub data: Vec<u8>,
}

impl<'a> From<pcap::Packet<'a>> for OwnedFrame {
    fn from(packet: pcap::Packet<'a>) -> Self {
        OwnedFrame {
            header: FrameHeader::from(packet.header),
            data: packet.data.to_vec(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameHeader {
    pub tv_sec: i64,
    pub tv_usec: i64,
    pub caplen: u32,
    pub len: u32,
}

impl From<&pcap::PacketHeader> for FrameHeader {
    fn from(header: &pcap::PacketHeader) -> Self {
        #[cfg(target_family = "unix")]
        let result = Self {
            tv_sec: header.ts.tv_sec,
            tv_usec: header.ts.tv_usec,
            caplen: header.caplen,
            len: header.len,
        };

        #[cfg(target_os = "windows")]
        let result = Self {
            tv_sec: header.ts.tv_sec as i64,
            tv_usec: header.ts.tv_usec as i64,
            caplen: header.caplen,
            len: header.len,
        };

        result
    }
}

impl From<&FrameHeader> for pcap::PacketHeader {
    fn from(header: &FrameHeader) -> Self {
        #[cfg(target_family = "unix")]
        let result = Self {
            ts: libc::timeval {
                tv_sec: header.tv_sec,
                tv_usec: header.tv_usec,
            },
            caplen: header.caplen,
            len: header.len,
        };

        #[cfg(target_os = "windows")]
        let result = Self {
            ts: libc::timeval {
                tv_sec: header.tv_sec as i32,
                tv_usec: header.tv_usec as i32,
            },
            caplen: header.caplen,
            len: header.len,
        };

        result
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Inbound,
    #[default]
    Outbound,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub enum TransportLayer {
    Tcp(TCP),
    Udp(UDP),
    Icmp(ICMPv4),
}

impl TransportLayer {
    pub fn header_length(&self) -> usize {
        match self {
            Self::Tcp(_) => tcp::HEADER_LENGTH,
            Self::Udp(_) => udp::HEADER_LENGTH,
            Self::Icmp(_) => icmpv4::HEADER_LENGTH,
        }
    }

    pub fn protocol(&self) -> IpNextLevelProtocol {
        match self {
            Self::Tcp(_) => IpNextLevelProtocol::TCP,
            Self::Udp(_) => IpNextLevelProtocol::UDP,
            Self::Icmp(_) => IpNextLevelProtocol::ICMP,
        }
    }

    pub fn ports(&self) -> Option<(u16, u16)> {
        match self {
            Self::Tcp(header) => Some((header.port_source, header.port_destination)),
            Self::Udp(header) => Some((header.port_source, header.port_destination)),
            Self::Icmp(_) => None,
        }
    }

    pub fn write(&self, buffer: &mut Vec<u8>) {
        match self {
            Self::Tcp(header) => header.write(buffer),
            Self::Udp(header) => header.write(buffer),
            Self::Icmp(header) => header.write(buffer),
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buffer = Vec::with_capacity(self.header_length());
        self.write(&mut buffer);
        buffer
    }
}

/// One decoded frame.
///
/// Layers are filled from the outside in; a layer that could not be decoded
/// leaves itself and everything below it empty, the layers above stay.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct CapturedFrame {
    pub header: FrameHeader,
    /// First bytes of the frame kept for hex/ASCII display.
    pub snapshot: Vec<u8>,

    pub ethernet: Option<Ethernet>,
    pub ipv4: Option<IPv4>,
    pub transport: Option<TransportLayer>,

    pub direction: Direction,
}

impl CapturedFrame {
    pub fn new(header: FrameHeader, snapshot: Vec<u8>) -> Self {
        Self {
            header,
            snapshot,
            ..Default::default()
        }
    }

    pub fn captured_at(&self) -> Option<DateTime<Local>> {
        let nanoseconds = u32::try_from(self.header.tv_usec).ok()?.checked_mul(1000)?;
        DateTime::from_timestamp(self.header.tv_sec, nanoseconds)
            .map(|time| time.with_timezone(&Local))
    }

    pub fn wire_length(&self) -> u32 {
        self.header.len
    }

    pub fn ethernet_source(&self) -> Option<&MacAddress> {
        self.ethernet.as_ref().map(|layer| &layer.source_mac)
    }

    pub fn ethernet_destination(&self) -> Option<&MacAddress> {
        self.ethernet.as_ref().map(|layer| &layer.destination_mac)
    }

    /// "IPv4", "ARP", "Unknown"... or empty without an Ethernet layer.
    pub fn ether_type_label(&self) -> String {
        self.ethernet
            .as_ref()
            .map(|layer| layer.ether_type.to_string())
            .unwrap_or_default()
    }

    pub fn source_address(&self) -> Option<Ipv4Addr> {
        self.ipv4.as_ref().map(|layer| layer.address_source)
    }

    pub fn destination_address(&self) -> Option<Ipv4Addr> {
        self.ipv4.as_ref().map(|layer| layer.address_destination)
    }

    pub fn time_to_live(&self) -> u8 {
        self.ipv4
            .as_ref()
            .map(|layer| layer.time_to_live)
            .unwrap_or_default()
    }

    pub fn protocol(&self) -> Option<IpNextLevelProtocol> {
        self.ipv4.as_ref().map(|layer| layer.protocol_inner)
    }

    /// "TCP", "UDP", "ICMP", "Other" or empty without an IPv4 layer.
    pub fn transport_label(&self) -> String {
        self.protocol()
            .map(|protocol| protocol.to_string())
            .unwrap_or_default()
    }

    pub fn source_port(&self) -> u16 {
        self.ports().map(|(source, _)| source).unwrap_or_default()
    }

    pub fn destination_port(&self) -> u16 {
        self.ports()
            .map(|(_, destination)| destination)
            .unwrap_or_default()
    }

    pub fn is_inbound(&self) -> bool {
        self.direction == Direction::Inbound
    }

    fn ports(&self) -> Option<(u16, u16)> {
        self.transport.as_ref().and_then(TransportLayer::ports)
    }
}
