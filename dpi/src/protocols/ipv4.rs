use crate::parser::ParserError;
use crate::protocols::ip::address;
use crate::protocols::ip::protocol::IpNextLevelProtocol;
use nom::IResult;
use nom::Parser;
use nom::bytes::take;
use nom::number::{be_u8, be_u16};
use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;

// IPv4 Protocol
// RFC 791: https://datatracker.ietf.org/doc/html/rfc791

pub const VERSION: u8 = 4;
pub const MIN_HEADER_LENGTH: usize = 20;
pub const MAX_HEADER_LENGTH: usize = 60;

/// "Don't fragment" bit of the 3-bit flags field.
pub const FLAG_DONT_FRAGMENT: u8 = 0b010;
const FRAGMENT_OFFSET_MASK: u16 = 0x1FFF;

/// Header length in bytes derived from the IHL nibble of the first byte.
pub fn header_length(bytes: &[u8]) -> Option<usize> {
    bytes.first().map(|byte| ((byte & 0x0F) as usize) * 4)
}

/// Parses the IPv4 header, skipping options. The returned rest starts at
/// the transport header.
pub fn parse(bytes: &[u8]) -> IResult<&[u8], IPv4> {
    // Version & IHL. 4 bits each
    let (rest, version_ihl) = be_u8().parse(bytes)?;
    let version = version_ihl >> 4;
    let internet_header_length = (version_ihl & 0x0F) * 4;
    if (internet_header_length as usize) < MIN_HEADER_LENGTH {
        return Err(ParserError::ErrorVerify.to_nom(bytes));
    }

    // DSCP (6 bits) & ECN (2 bits)
    let (rest, type_of_service) = be_u8().parse(rest)?;
    let (rest, total_length) = be_u16().parse(rest)?;
    let (rest, identification) = be_u16().parse(rest)?;

    // Flags (3 bits) & Fragment Offset (13 bits)
    let (rest, flags_fragment) = be_u16().parse(rest)?;

    let (rest, time_to_live) = be_u8().parse(rest)?;
    let (rest, protocol) = be_u8().parse(rest)?;
    let (rest, checksum) = be_u16().parse(rest)?;
    let (rest, address_source) = address::v4_parse(rest)?;
    let (rest, address_destination) = address::v4_parse(rest)?;

    // Options are not interpreted
    let options_length = internet_header_length as usize - MIN_HEADER_LENGTH;
    let (rest, _) = take(options_length).parse(rest)?;

    let protocol = IPv4 {
        version,
        internet_header_length,
        differentiated_services_code_point: type_of_service >> 2,
        explicit_congestion_notification: type_of_service & 0b11,
        total_length,
        identification,
        flags: (flags_fragment >> 13) as u8,
        fragment_offset: flags_fragment & FRAGMENT_OFFSET_MASK,
        time_to_live,
        protocol_inner: IpNextLevelProtocol::from(protocol),
        checksum,
        address_source,
        address_destination,
    };

    Ok((rest, protocol))
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct IPv4 {
    pub version: u8,
    pub internet_header_length: u8,
    pub differentiated_services_code_point: u8,
    pub explicit_congestion_notification: u8,
    pub total_length: u16,
    pub identification: u16,
    pub flags: u8,
    pub fragment_offset: u16,
    pub time_to_live: u8,
    pub protocol_inner: IpNextLevelProtocol,
    pub checksum: u16,
    pub address_source: Ipv4Addr,
    pub address_destination: Ipv4Addr,
}

impl IPv4 {
    pub fn type_of_service(&self) -> u8 {
        (self.differentiated_services_code_point << 2)
            | (self.explicit_congestion_notification & 0b11)
    }

    pub fn is_dont_fragment(&self) -> bool {
        self.flags & FLAG_DONT_FRAGMENT != 0
    }

    /// Writes the fixed 20-byte header. Options are never emitted, so
    /// IHL is always 5.
    pub fn write(&self, buffer: &mut Vec<u8>) {
        let ihl = (MIN_HEADER_LENGTH / 4) as u8;
        let flags_fragment =
            ((self.flags as u16) << 13) | (self.fragment_offset & FRAGMENT_OFFSET_MASK);

        buffer.push((self.version << 4) | ihl);
        buffer.push(self.type_of_service());
        buffer.extend_from_slice(&self.total_length.to_be_bytes());
        buffer.extend_from_slice(&self.identification.to_be_bytes());
        buffer.extend_from_slice(&flags_fragment.to_be_bytes());
        buffer.push(self.time_to_live);
        buffer.push(u8::from(self.protocol_inner));
        buffer.extend_from_slice(&self.checksum.to_be_bytes());
        buffer.extend_from_slice(&self.address_source.octets());
        buffer.extend_from_slice(&self.address_destination.octets());
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buffer = Vec::with_capacity(MIN_HEADER_LENGTH);
        self.write(&mut buffer);
        buffer
    }
}
