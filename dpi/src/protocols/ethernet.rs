use crate::protocols::ethernet::ether_type::EtherType;
use crate::protocols::ethernet::mac::MacAddress;
use nom::IResult;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// Ethernet II
// IEEE 802.3: destination (6) + source (6) + EtherType (2)

pub const HEADER_LENGTH: usize = 14;

pub fn parse(bytes: &[u8]) -> IResult<&[u8], Ethernet> {
    let (rest, destination_mac) = mac::parse(bytes)?;
    let (rest, source_mac) = mac::parse(rest)?;
    let (rest, ether_type) = ether_type::parse(rest)?;

    let protocol = Ethernet {
        destination_mac,
        source_mac,
        ether_type,
    };

    Ok((rest, protocol))
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Ethernet {
    pub destination_mac: MacAddress,
    pub source_mac: MacAddress,
    pub ether_type: EtherType,
}

impl Ethernet {
    pub fn write(&self, buffer: &mut Vec<u8>) {
        buffer.extend_from_slice(&self.destination_mac.0);
        buffer.extend_from_slice(&self.source_mac.0);
        buffer.extend_from_slice(&u16::from(self.ether_type).to_be_bytes());
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum EthernetError {
    #[error("MAC address must consist of 6 bytes.")]
    MacInvalidBytesLength,

    #[error("MAC address must consist of 6 colon-separated octets.")]
    MacInvalidOctetCount,

    #[error("MAC address octet must be two hexadecimal digits.")]
    MacInvalidOctet,
}

pub mod ether_type;
pub mod mac;
