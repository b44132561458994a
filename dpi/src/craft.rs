pub mod config;
pub mod payload;

use crate::checksum;
use crate::craft::config::{CraftConfig, TransportFields};
use crate::dto::frame::TransportLayer;
use crate::protocols::ethernet::ether_type::EtherType;
use crate::protocols::ethernet::mac::MacAddress;
use crate::protocols::ethernet::Ethernet;
use crate::protocols::icmpv4::ICMPv4;
use crate::protocols::ip::address;
use crate::protocols::ipv4::IPv4;
use crate::protocols::tcp::TCP;
use crate::protocols::udp::UDP;
use crate::protocols::{ethernet, ipv4, tcp};
use std::net::Ipv4Addr;
use thiserror::Error;

pub const MAX_IPV4_TOTAL_LENGTH: usize = u16::MAX as usize;

#[derive(Debug, Error, PartialEq)]
pub enum CraftError {
    #[error("Invalid source IP address.")]
    InvalidSourceIp,

    #[error("Invalid destination IP address.")]
    InvalidDestinationIp,

    #[error("Invalid source MAC address.")]
    InvalidSourceMac,

    #[error("Invalid destination MAC address.")]
    InvalidDestinationMac,

    #[error("Source and destination ports must be non-zero for TCP/UDP.")]
    ZeroPort,

    #[error("IPv4 packet of {0} bytes does not fit the 16-bit total length.")]
    PacketTooLarge(usize),
}

/// Checks the address strings and the port pair before anything is built.
pub fn validate(config: &CraftConfig) -> Result<(), CraftError> {
    if !address::is_valid_v4(&config.ipv4.source) {
        return Err(CraftError::InvalidSourceIp);
    }
    if !address::is_valid_v4(&config.ipv4.destination) {
        return Err(CraftError::InvalidDestinationIp);
    }
    if !ethernet::mac::is_valid(&config.ethernet.source_mac) {
        return Err(CraftError::InvalidSourceMac);
    }
    if !ethernet::mac::is_valid(&config.ethernet.destination_mac) {
        return Err(CraftError::InvalidDestinationMac);
    }

    let ports = match &config.transport {
        TransportFields::Tcp(fields) => Some((fields.source_port, fields.destination_port)),
        TransportFields::Udp(fields) => Some((fields.source_port, fields.destination_port)),
        TransportFields::Icmp(_) => None,
    };
    if let Some((source, destination)) = ports
        && (source == 0 || destination == 0)
    {
        return Err(CraftError::ZeroPort);
    }

    Ok(())
}

/// Validates and builds in one step.
pub fn craft(config: &CraftConfig) -> Result<Vec<u8>, CraftError> {
    validate(config)?;
    build(config)
}

/// Builds a complete Ethernet + IPv4 + transport frame with every checksum
/// filled in.
pub fn build(config: &CraftConfig) -> Result<Vec<u8>, CraftError> {
    let source_mac = MacAddress::try_from(config.ethernet.source_mac.as_str())
        .map_err(|_| CraftError::InvalidSourceMac)?;
    let destination_mac = MacAddress::try_from(config.ethernet.destination_mac.as_str())
        .map_err(|_| CraftError::InvalidDestinationMac)?;
    let source: Ipv4Addr = config
        .ipv4
        .source
        .parse()
        .map_err(|_| CraftError::InvalidSourceIp)?;
    let destination: Ipv4Addr = config
        .ipv4
        .destination
        .parse()
        .map_err(|_| CraftError::InvalidDestinationIp)?;

    let packet_length = (ipv4::MIN_HEADER_LENGTH + config.transport.header_length())
        .saturating_add(config.payload.len());
    let total_length =
        u16::try_from(packet_length).map_err(|_| CraftError::PacketTooLarge(packet_length))?;
    // Fits because the segment is a part of the packet
    let segment_length = total_length - ipv4::MIN_HEADER_LENGTH as u16;

    let payload = config.payload.generate();

    let ethernet = Ethernet {
        destination_mac,
        source_mac,
        ether_type: EtherType::Ipv4,
    };

    let mut ip = IPv4 {
        version: ipv4::VERSION,
        internet_header_length: ipv4::MIN_HEADER_LENGTH as u8,
        differentiated_services_code_point: config.ipv4.type_of_service >> 2,
        explicit_congestion_notification: config.ipv4.type_of_service & 0b11,
        total_length,
        identification: config.ipv4.identification,
        flags: if config.ipv4.dont_fragment {
            ipv4::FLAG_DONT_FRAGMENT
        } else {
            0
        },
        fragment_offset: 0,
        time_to_live: config.ipv4.time_to_live,
        protocol_inner: config.transport.protocol(),
        checksum: 0,
        address_source: source,
        address_destination: destination,
    };
    ip.checksum = checksum::internet(&ip.to_bytes());

    let mut transport = transport_header(&config.transport, segment_length);
    let mut segment = transport.to_bytes();
    segment.extend_from_slice(&payload);
    let transport_checksum = match transport {
        TransportLayer::Icmp(_) => checksum::internet(&segment),
        _ => checksum::transport(&source, &destination, transport.protocol(), &segment),
    };
    set_checksum(&mut transport, transport_checksum);

    let mut buffer = Vec::with_capacity(ethernet::HEADER_LENGTH + packet_length);
    ethernet.write(&mut buffer);
    ip.write(&mut buffer);
    transport.write(&mut buffer);
    buffer.extend_from_slice(&payload);

    Ok(buffer)
}

fn transport_header(fields: &TransportFields, segment_length: u16) -> TransportLayer {
    match fields {
        TransportFields::Tcp(fields) => TransportLayer::Tcp(TCP {
            port_source: fields.source_port,
            port_destination: fields.destination_port,
            sequence_number: fields.sequence_number,
            acknowledgement_number: fields.acknowledgement_number,
            data_offset: tcp::HEADER_LENGTH as u8,
            reserved: 0,
            flags: tcp::Flags::from(fields),
            window: fields.window_size,
            checksum: 0,
            urgent_pointer: 0,
        }),
        TransportFields::Udp(fields) => TransportLayer::Udp(UDP {
            port_source: fields.source_port,
            port_destination: fields.destination_port,
            length: segment_length,
            checksum: 0,
        }),
        TransportFields::Icmp(fields) => TransportLayer::Icmp(ICMPv4 {
            message_type: fields.message_type,
            code: fields.code,
            checksum: 0,
            identifier: fields.identifier,
            sequence: fields.sequence,
        }),
    }
}

fn set_checksum(transport: &mut TransportLayer, checksum: u16) {
    match transport {
        TransportLayer::Tcp(header) => header.checksum = checksum,
        TransportLayer::Udp(header) => header.checksum = checksum,
        TransportLayer::Icmp(header) => header.checksum = checksum,
    }
}
