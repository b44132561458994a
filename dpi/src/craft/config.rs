use crate::craft::payload::Payload;
use crate::protocols::ip::protocol::IpNextLevelProtocol;
use crate::protocols::{icmpv4, tcp, udp};
use serde::{Deserialize, Serialize};

pub const DEFAULT_TEXT_PAYLOAD: &str = "Hello, Packet Inspector!";

/// Declarative description of one frame to build. Consumed by
/// [`crate::craft::build`], not retained.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CraftConfig {
    pub ethernet: EthernetFields,
    pub ipv4: Ipv4Fields,
    pub transport: TransportFields,
    pub payload: Payload,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EthernetFields {
    pub source_mac: String,
    pub destination_mac: String,
}

impl Default for EthernetFields {
    fn default() -> Self {
        Self {
            source_mac: "00:00:00:00:00:00".to_string(),
            destination_mac: "FF:FF:FF:FF:FF:FF".to_string(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Ipv4Fields {
    pub source: String,
    pub destination: String,
    pub time_to_live: u8,
    pub type_of_service: u8,
    pub identification: u16,
    pub dont_fragment: bool,
}

impl Default for Ipv4Fields {
    fn default() -> Self {
        Self {
            source: "127.0.0.1".to_string(),
            destination: "127.0.0.1".to_string(),
            time_to_live: 64,
            type_of_service: 0,
            identification: 0,
            dont_fragment: false,
        }
    }
}

/// Exactly one transport protocol is active per frame.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "protocol", rename_all = "lowercase")]
pub enum TransportFields {
    Tcp(TcpFields),
    Udp(UdpFields),
    Icmp(IcmpFields),
}

impl Default for TransportFields {
    fn default() -> Self {
        Self::Udp(UdpFields::default())
    }
}

impl TransportFields {
    pub fn protocol(&self) -> IpNextLevelProtocol {
        match self {
            Self::Tcp(_) => IpNextLevelProtocol::TCP,
            Self::Udp(_) => IpNextLevelProtocol::UDP,
            Self::Icmp(_) => IpNextLevelProtocol::ICMP,
        }
    }

    pub fn header_length(&self) -> usize {
        match self {
            Self::Tcp(_) => tcp::HEADER_LENGTH,
            Self::Udp(_) => udp::HEADER_LENGTH,
            Self::Icmp(_) => icmpv4::HEADER_LENGTH,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TcpFields {
    pub source_port: u16,
    pub destination_port: u16,
    pub sequence_number: u32,
    pub acknowledgement_number: u32,
    pub syn: bool,
    pub ack: bool,
    pub fin: bool,
    pub rst: bool,
    pub psh: bool,
    pub urg: bool,
    pub window_size: u16,
}

impl Default for TcpFields {
    fn default() -> Self {
        Self {
            source_port: 12345,
            destination_port: 54321,
            sequence_number: 0,
            acknowledgement_number: 0,
            syn: false,
            ack: false,
            fin: false,
            rst: false,
            psh: false,
            urg: false,
            window_size: 65535,
        }
    }
}

impl From<&TcpFields> for tcp::Flags {
    fn from(fields: &TcpFields) -> Self {
        Self {
            urgent: fields.urg,
            acknowledgment: fields.ack,
            push: fields.psh,
            reset: fields.rst,
            syn: fields.syn,
            fin: fields.fin,
            ..Default::default()
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct UdpFields {
    pub source_port: u16,
    pub destination_port: u16,
}

impl Default for UdpFields {
    fn default() -> Self {
        Self {
            source_port: 12345,
            destination_port: 54321,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct IcmpFields {
    pub message_type: u8,
    pub code: u8,
    pub identifier: u16,
    pub sequence: u16,
}

impl Default for IcmpFields {
    fn default() -> Self {
        Self {
            message_type: icmpv4::TYPE_ECHO_REQUEST,
            code: 0,
            identifier: 1,
            sequence: 1,
        }
    }
}
