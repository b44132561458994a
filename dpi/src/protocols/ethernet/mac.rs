use crate::parser::ParserError;
use crate::protocols::ethernet::EthernetError;
use nom::IResult;
use nom::Parser;
use nom::bytes::take;
use serde::{Deserialize, Serialize};
use std::fmt::Formatter;

pub const LENGTH_BYTES: usize = 6;
pub const BROADCAST_MAC: [u8; LENGTH_BYTES] = [0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF];

#[derive(Clone, Debug, Eq, Hash, Serialize, Deserialize, PartialEq)]
pub struct MacAddress(pub [u8; LENGTH_BYTES]);

impl MacAddress {
    pub fn is_broadcast(&self) -> bool {
        self.0.eq(&BROADCAST_MAC)
    }

    pub fn is_multicast(&self) -> bool {
        if self.is_broadcast() {
            return false;
        }

        self.0[0] & 0b00000001 == 1
    }
}

impl From<[u8; LENGTH_BYTES]> for MacAddress {
    fn from(value: [u8; LENGTH_BYTES]) -> Self {
        Self(value)
    }
}

impl TryFrom<&[u8]> for MacAddress {
    type Error = EthernetError;

    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        let bytes = <[u8; LENGTH_BYTES]>::try_from(value)
            .map_err(|_| EthernetError::MacInvalidBytesLength)?;

        Ok(MacAddress(bytes))
    }
}

/// Accepts only the colon notation with two hex digits per octet,
/// e.g. `00:1A:2b:3C:4D:5E`.
impl TryFrom<&str> for MacAddress {
    type Error = EthernetError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let octets: Vec<&str> = value.split(':').collect();
        if octets.len() != LENGTH_BYTES {
            return Err(EthernetError::MacInvalidOctetCount);
        }

        let mut bytes = [0u8; LENGTH_BYTES];
        for (byte, octet) in bytes.iter_mut().zip(octets) {
            if octet.len() != 2 || !octet.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(EthernetError::MacInvalidOctet);
            }
            *byte = u8::from_str_radix(octet, 16)
                .map_err(|_| EthernetError::MacInvalidOctet)?;
        }

        Ok(Self(bytes))
    }
}

impl std::fmt::Display for MacAddress {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let string = format!(
            "{:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}",
            self.0[0], self.0[1], self.0[2], self.0[3], self.0[4], self.0[5]
        );

        write!(f, "{}", string)
    }
}

/// Six colon-separated two-digit hex octets.
pub fn is_valid(address: &str) -> bool {
    MacAddress::try_from(address).is_ok()
}

pub fn parse(input: &[u8]) -> IResult<&[u8], MacAddress> {
    let (input, mac_bytes) = take(LENGTH_BYTES).parse(input)?;
    let mac = match MacAddress::try_from(mac_bytes) {
        Ok(mac) => mac,
        Err(_) => return Err(ParserError::ErrorVerify.to_nom(input)),
    };

    Ok((input, mac))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_broadcast() {
        let mac = MacAddress([0xFF; LENGTH_BYTES]);
        assert_eq!(mac.is_broadcast(), true);
    }

    #[test]
    fn test_is_not_broadcast() {
        let mac = MacAddress::try_from("00:1A:2B:3C:4D:5E").unwrap();
        assert_eq!(mac.is_broadcast(), false);
    }

    #[test]
    fn test_is_multicast() {
        let mac = MacAddress::try_from("01:00:5e:02:02:04").unwrap();
        assert_eq!(mac.is_multicast(), true);
    }

    #[test]
    fn test_is_not_multicast() {
        let mac = MacAddress::try_from("00:1A:2B:3C:4D:5E").unwrap();
        assert_eq!(mac.is_multicast(), false);
    }

    #[test]
    fn test_display_is_upper_colon_hex() {
        let mac = MacAddress::try_from("0a:1b:2c:3d:4e:5f").unwrap();
        assert_eq!(mac.to_string(), "0A:1B:2C:3D:4E:5F");
    }

    #[test]
    fn test_rejects_other_notations() {
        assert_eq!(
            MacAddress::try_from("00-1A-2B-3C-4D-5E"),
            Err(EthernetError::MacInvalidOctetCount)
        );
        assert_eq!(
            MacAddress::try_from("00:1A:2B:3C:4D"),
            Err(EthernetError::MacInvalidOctetCount)
        );
        assert_eq!(
            MacAddress::try_from("0:1A:2B:3C:4D:5E"),
            Err(EthernetError::MacInvalidOctet)
        );
        assert_eq!(
            MacAddress::try_from("00:1A:2B:3C:4D:5G"),
            Err(EthernetError::MacInvalidOctet)
        );
        assert_eq!(
            MacAddress::try_from("+0:1A:2B:3C:4D:5E"),
            Err(EthernetError::MacInvalidOctet)
        );
    }

    #[test]
    fn test_is_valid() {
        assert!(is_valid("FF:FF:FF:FF:FF:FF"));
        assert!(!is_valid(""));
        assert!(!is_valid("FF:FF:FF:FF:FF:FF:FF"));
    }
}
