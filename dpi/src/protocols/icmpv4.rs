use nom::IResult;
use nom::Parser;
use nom::number::{be_u8, be_u16};
use serde::{Deserialize, Serialize};

// ICMPv4 Protocol
// RFC 792: https://datatracker.ietf.org/doc/html/rfc792

pub const HEADER_LENGTH: usize = 8;

pub const TYPE_ECHO_REPLY: u8 = 0;
pub const TYPE_ECHO_REQUEST: u8 = 8;

/// Parses the 8-byte header. The last 4 bytes are read as identifier and
/// sequence, which is their meaning for echo messages.
pub fn parse(bytes: &[u8]) -> IResult<&[u8], ICMPv4> {
    // Message type. 1 byte
    let (rest, message_type) = be_u8().parse(bytes)?;

    // Code. 1 byte
    let (rest, code) = be_u8().parse(rest)?;

    // Checksum. 2 bytes
    let (rest, checksum) = be_u16().parse(rest)?;

    // Identifier & Sequence. 2 bytes each
    let (rest, identifier) = be_u16().parse(rest)?;
    let (rest, sequence) = be_u16().parse(rest)?;

    let protocol = ICMPv4 {
        message_type,
        code,
        checksum,
        identifier,
        sequence,
    };

    Ok((rest, protocol))
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ICMPv4 {
    pub message_type: u8,
    pub code: u8,
    pub checksum: u16,
    pub identifier: u16,
    pub sequence: u16,
}

impl ICMPv4 {
    pub fn write(&self, buffer: &mut Vec<u8>) {
        buffer.push(self.message_type);
        buffer.push(self.code);
        buffer.extend_from_slice(&self.checksum.to_be_bytes());
        buffer.extend_from_slice(&self.identifier.to_be_bytes());
        buffer.extend_from_slice(&self.sequence.to_be_bytes());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_icmpv4_echo_request() {
        let message = hex::decode("0800400800010F554142").unwrap();
        let (rest, actual) = parse(&message).unwrap();

        let expected = ICMPv4 {
            message_type: TYPE_ECHO_REQUEST,
            code: 0,
            checksum: 0x4008,
            identifier: 1,
            sequence: 0x0F55,
        };

        assert_eq!(actual, expected);
        assert_eq!(rest, &[0x41, 0x42]);
    }

    #[test]
    fn test_icmpv4_write_matches_parse() {
        let message = hex::decode("0000ABCD12345678").unwrap();
        let (_, header) = parse(&message).unwrap();

        let mut buffer = Vec::new();
        header.write(&mut buffer);

        assert_eq!(buffer, message);
    }
}
