//! Internet checksum (RFC 1071).
//!
//! The one's complement of the one's complement sum of all 16-bit words,
//! with an odd trailing byte padded by zero. IPv4 header, TCP, UDP and ICMP
//! checksums are all computed through [`Checksum`].

use crate::protocols::ip::protocol::IpNextLevelProtocol;
use std::net::Ipv4Addr;

pub const PSEUDO_HEADER_LENGTH: usize = 12;

#[derive(Clone, Debug, Default)]
pub struct Checksum {
    sum: u32,
    trailing: Option<u8>,
}

impl Checksum {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds bytes as big-endian 16-bit words. Consecutive calls behave as if
    /// the slices were concatenated.
    pub fn add_bytes(&mut self, bytes: &[u8]) -> &mut Self {
        let mut bytes = bytes;

        if let Some(high) = self.trailing.take() {
            match bytes.split_first() {
                Some((low, rest)) => {
                    self.add_word(u16::from_be_bytes([high, *low]));
                    bytes = rest;
                },
                None => {
                    self.trailing = Some(high);
                    return self;
                },
            }
        }

        let mut words = bytes.chunks_exact(2);
        for word in &mut words {
            self.add_word(u16::from_be_bytes([word[0], word[1]]));
        }
        if let [last] = words.remainder() {
            self.trailing = Some(*last);
        }

        self
    }

    pub fn add_word(&mut self, word: u16) -> &mut Self {
        self.sum += word as u32;
        // End-around carry
        self.sum = (self.sum & 0xFFFF) + (self.sum >> 16);
        self
    }

    pub fn finish(&self) -> u16 {
        let mut sum = self.sum;
        if let Some(high) = self.trailing {
            sum += (high as u32) << 8;
        }
        while sum >> 16 != 0 {
            sum = (sum & 0xFFFF) + (sum >> 16);
        }

        !(sum as u16)
    }
}

/// Checksum of a self-contained block: IPv4 header or ICMP message.
pub fn internet(bytes: &[u8]) -> u16 {
    Checksum::new().add_bytes(bytes).finish()
}

/// TCP/UDP pseudo-header: source, destination, zero, protocol, segment length.
pub fn pseudo_header(
    source: &Ipv4Addr, destination: &Ipv4Addr, protocol: IpNextLevelProtocol,
    segment_length: u16,
) -> [u8; PSEUDO_HEADER_LENGTH] {
    let mut header = [0u8; PSEUDO_HEADER_LENGTH];
    header[0..4].copy_from_slice(&source.octets());
    header[4..8].copy_from_slice(&destination.octets());
    header[9] = u8::from(protocol);
    header[10..12].copy_from_slice(&segment_length.to_be_bytes());
    header
}

/// TCP/UDP checksum over the pseudo-header followed by the whole segment
/// (header with zeroed checksum field + payload).
///
/// The segment length must fit in 16 bits; frames built by this crate are
/// bounded by the IPv4 total length.
pub fn transport(
    source: &Ipv4Addr, destination: &Ipv4Addr, protocol: IpNextLevelProtocol,
    segment: &[u8],
) -> u16 {
    let segment_length = u16::try_from(segment.len()).unwrap_or(u16::MAX);

    Checksum::new()
        .add_bytes(&pseudo_header(source, destination, protocol, segment_length))
        .add_bytes(segment)
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rfc1071_example() {
        let bytes = [0x00, 0x01, 0xF2, 0x03, 0xF4, 0xF5, 0xF6, 0xF7];
        assert_eq!(internet(&bytes), 0x220D);
    }

    #[test]
    fn test_captured_ipv4_header_verifies_to_zero() {
        let header = hex::decode("45000034941500003406110F480ED566C0A80383").unwrap();
        assert_eq!(internet(&header), 0);
    }

    #[test]
    fn test_odd_length_is_zero_padded() {
        assert_eq!(internet(&[0x01]), 0xFEFF);
        assert_eq!(internet(&[0xAB, 0xCD, 0x01]), internet(&[0xAB, 0xCD, 0x01, 0x00]));
    }

    #[test]
    fn test_split_input_matches_contiguous() {
        let bytes: Vec<u8> = (0u8..=200).collect();
        let contiguous = internet(&bytes);

        let split = Checksum::new()
            .add_bytes(&bytes[..3])
            .add_bytes(&bytes[3..4])
            .add_bytes(&[])
            .add_bytes(&bytes[4..101])
            .add_bytes(&bytes[101..])
            .finish();

        assert_eq!(split, contiguous);
    }

    #[test]
    fn test_carry_folding() {
        assert_eq!(internet(&[0xFF, 0xFF, 0xFF, 0xFF]), 0x0000);
        assert_eq!(internet(&[0xFF, 0xFF, 0x00, 0x01]), 0xFFFE);
    }

    #[test]
    fn test_pseudo_header_layout() {
        let header = pseudo_header(
            &Ipv4Addr::new(10, 0, 0, 1),
            &Ipv4Addr::new(10, 0, 0, 2),
            IpNextLevelProtocol::UDP,
            12,
        );

        assert_eq!(hex::encode_upper(header), "0A0000010A0000020011000C");
    }
}
