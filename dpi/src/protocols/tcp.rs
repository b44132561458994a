use nom::number::{be_u8, be_u16, be_u32};
use nom::{IResult, Parser};
use serde::{Deserialize, Serialize};

// TCP Protocol
// RFC 9293: https://datatracker.ietf.org/doc/html/rfc9293

pub const HEADER_LENGTH: usize = 20;

pub const FLAG_FIN: u8 = 0x01;
pub const FLAG_SYN: u8 = 0x02;
pub const FLAG_RST: u8 = 0x04;
pub const FLAG_PSH: u8 = 0x08;
pub const FLAG_ACK: u8 = 0x10;
pub const FLAG_URG: u8 = 0x20;
pub const FLAG_ECE: u8 = 0x40;
pub const FLAG_CWR: u8 = 0x80;

/// Parses the fixed part of the header. Options are skipped as far as the
/// buffer allows, their content is not interpreted. A data offset below the
/// minimum is kept as read and nothing is skipped.
pub fn parse(bytes: &[u8]) -> IResult<&[u8], TCP> {
    // Source port. 2 bytes
    let (rest, port_source) = be_u16().parse(bytes)?;
    // Destination port. 2 bytes
    let (rest, port_destination) = be_u16().parse(rest)?;

    // Sequence number, 4 bytes
    let (rest, sequence_number) = be_u32().parse(rest)?;
    // Acknowledgement number, 4 bytes
    let (rest, acknowledgement_number) = be_u32().parse(rest)?;

    // Data Offset, Reserved. Both - 4 bits
    let (rest, offset_reserved) = be_u8().parse(rest)?;
    // Data Offset is stored in 32bit words.
    let data_offset = (offset_reserved >> 4) * 4;
    let reserved = offset_reserved & 0x0F;

    // Flags: 8 flags by 1 bit.
    let (rest, flags) = be_u8().parse(rest)?;

    // Window: 2 bytes.
    let (rest, window) = be_u16().parse(rest)?;
    // Checksum: 2 bytes.
    let (rest, checksum) = be_u16().parse(rest)?;
    // Urgent pointer: 2 bytes.
    let (rest, urgent_pointer) = be_u16().parse(rest)?;

    let options_length = (data_offset as usize).saturating_sub(HEADER_LENGTH);
    let payload = rest.get(options_length..).unwrap_or_default();

    let protocol = TCP {
        port_source,
        port_destination,
        sequence_number,
        acknowledgement_number,
        data_offset,
        reserved,
        flags: Flags::from(flags),
        window,
        checksum,
        urgent_pointer,
    };

    Ok((payload, protocol))
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TCP {
    pub port_source: u16,
    pub port_destination: u16,
    pub sequence_number: u32,
    pub acknowledgement_number: u32,
    pub data_offset: u8,
    pub reserved: u8,
    pub flags: Flags,
    pub window: u16,
    pub checksum: u16,
    pub urgent_pointer: u16,
}

impl TCP {
    /// Writes the header without options, so the data offset is always 5 words.
    pub fn write(&self, buffer: &mut Vec<u8>) {
        let data_offset_words = (HEADER_LENGTH / 4) as u8;

        buffer.extend_from_slice(&self.port_source.to_be_bytes());
        buffer.extend_from_slice(&self.port_destination.to_be_bytes());
        buffer.extend_from_slice(&self.sequence_number.to_be_bytes());
        buffer.extend_from_slice(&self.acknowledgement_number.to_be_bytes());
        buffer.push((data_offset_words << 4) | (self.reserved & 0x0F));
        buffer.push(u8::from(&self.flags));
        buffer.extend_from_slice(&self.window.to_be_bytes());
        buffer.extend_from_slice(&self.checksum.to_be_bytes());
        buffer.extend_from_slice(&self.urgent_pointer.to_be_bytes());
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Flags {
    pub congestion_window_reduced: bool,
    pub ecn_echo: bool,
    pub urgent: bool,
    pub acknowledgment: bool,
    pub push: bool,
    pub reset: bool,
    pub syn: bool,
    pub fin: bool,
}

impl From<u8> for Flags {
    fn from(value: u8) -> Self {
        Self {
            congestion_window_reduced: value & FLAG_CWR != 0,
            ecn_echo: value & FLAG_ECE != 0,
            urgent: value & FLAG_URG != 0,
            acknowledgment: value & FLAG_ACK != 0,
            push: value & FLAG_PSH != 0,
            reset: value & FLAG_RST != 0,
            syn: value & FLAG_SYN != 0,
            fin: value & FLAG_FIN != 0,
        }
    }
}

impl From<&Flags> for u8 {
    fn from(flags: &Flags) -> Self {
        [
            (flags.congestion_window_reduced, FLAG_CWR),
            (flags.ecn_echo, FLAG_ECE),
            (flags.urgent, FLAG_URG),
            (flags.acknowledgment, FLAG_ACK),
            (flags.push, FLAG_PSH),
            (flags.reset, FLAG_RST),
            (flags.syn, FLAG_SYN),
            (flags.fin, FLAG_FIN),
        ]
        .iter()
        .filter(|(enabled, _)| *enabled)
        .fold(0, |byte, (_, bit)| byte | bit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tcp_with_options() {
        let hex_actual = "00 50 DA 8E B2 61 2D 93 5D 1A BE A5 80 12 16 58 A0 94 00 00 02 04 05 96 01 01 04 02 01 03 03 06".replace(" ", "");
        let segment = hex::decode(hex_actual).unwrap();

        let (rest, actual) = parse(&segment).unwrap();

        let expected = TCP {
            port_source: 80,
            port_destination: 55950,
            sequence_number: 2992713107,
            acknowledgement_number: 0x5d1abea5,
            data_offset: 32,
            reserved: 0,
            flags: Flags {
                congestion_window_reduced: false,
                ecn_echo: false,
                urgent: false,
                acknowledgment: true,
                push: false,
                reset: false,
                syn: true,
                fin: false,
            },
            window: 5720,
            checksum: 0xa094,
            urgent_pointer: 0,
        };

        assert_eq!(actual, expected);
        assert!(rest.is_empty());
    }

    #[test]
    fn test_tcp_without_options() {
        let hex_actual = "01 BB CB B8 EE BA 28 1D 18 D9 BD 5F 50 18 00 D5 37 24 00 00 DE A9 06 7D".replace(" ", "");
        let segment = hex::decode(hex_actual).unwrap();

        let (rest, actual) = parse(&segment).unwrap();

        assert_eq!(actual.port_source, 443);
        assert_eq!(actual.port_destination, 52152);
        assert_eq!(actual.data_offset, 20);
        assert_eq!(actual.flags, Flags::from(FLAG_ACK | FLAG_PSH));
        assert_eq!(rest, &[0xDE, 0xA9, 0x06, 0x7D]);
    }

    #[test]
    fn test_tcp_truncated() {
        let segment = hex::decode("01BBCBB8EEBA281D18D9BD5F5018").unwrap();
        assert!(parse(&segment).is_err());
    }

    #[test]
    fn test_tcp_offset_below_minimum() {
        let segment = hex::decode("0050DA8EB2612D935D1ABEA5001216580000000001020304").unwrap();

        let (rest, actual) = parse(&segment).unwrap();

        assert_eq!(actual.port_source, 80);
        assert_eq!(actual.port_destination, 55950);
        assert_eq!(actual.data_offset, 0);
        assert_eq!(rest, &[0x01, 0x02, 0x03, 0x04]);
    }

    #[test]
    fn test_flags_byte() {
        let flags = Flags {
            syn: true,
            acknowledgment: true,
            ..Default::default()
        };
        assert_eq!(u8::from(&flags), 0x12);

        let all = Flags {
            urgent: true,
            acknowledgment: true,
            push: true,
            reset: true,
            syn: true,
            fin: true,
            ..Default::default()
        };
        assert_eq!(u8::from(&all), 0x3F);
        assert_eq!(Flags::from(0x3F), all);
    }

    #[test]
    fn test_tcp_write_matches_parse() {
        let segment = hex::decode("01BBCBB8EEBA281D18D9BD5F501800D537240000").unwrap();
        let (_, header) = parse(&segment).unwrap();

        let mut buffer = Vec::new();
        header.write(&mut buffer);

        assert_eq!(buffer, segment);
    }
}
