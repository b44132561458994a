use nom::IResult;
use nom::Parser;
use nom::number::be_u16;
use serde::{Deserialize, Serialize};

// UDP Protocol
// RFC 768: https://datatracker.ietf.org/doc/html/rfc768

pub const HEADER_LENGTH: usize = 8;

pub fn parse(bytes: &[u8]) -> IResult<&[u8], UDP> {
    // Source port. 2 bytes
    let (rest, port_source) = be_u16().parse(bytes)?;
    // Destination port. 2 bytes
    let (rest, port_destination) = be_u16().parse(rest)?;
    // Length. 2 bytes
    let (rest, length) = be_u16().parse(rest)?;
    // Checksum. 2 bytes
    let (rest, checksum) = be_u16().parse(rest)?;

    let payload = rest;
    let protocol = UDP {
        port_source,
        port_destination,
        length,
        checksum,
    };

    Ok((payload, protocol))
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct UDP {
    pub port_source: u16,
    pub port_destination: u16,
    pub length: u16,
    pub checksum: u16,
}

impl UDP {
    pub fn write(&self, buffer: &mut Vec<u8>) {
        buffer.extend_from_slice(&self.port_source.to_be_bytes());
        buffer.extend_from_slice(&self.port_destination.to_be_bytes());
        buffer.extend_from_slice(&self.length.to_be_bytes());
        buffer.extend_from_slice(&self.checksum.to_be_bytes());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_udp_parse() {
        let datagram = hex::decode("D54814EB001E208876F2").unwrap();
        let (rest, actual) = parse(&datagram).unwrap();

        let expected = UDP {
            port_source: 54600,
            port_destination: 5355,
            length: 30,
            checksum: 0x2088,
        };

        assert_eq!(actual, expected);
        assert_eq!(rest, &[0x76, 0xF2]);
    }

    #[test]
    fn test_udp_truncated() {
        let datagram = hex::decode("D54814EB001E20").unwrap();
        assert!(parse(&datagram).is_err());
    }
}
