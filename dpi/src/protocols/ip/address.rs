use crate::parser::ParserError;
use nom::IResult;
use nom::Parser;
use nom::bytes::take;
use std::net::Ipv4Addr;

pub const V4_LENGTH_BYTES: usize = 4;

pub fn v4_parse(input: &[u8]) -> IResult<&[u8], Ipv4Addr> {
    let (input, address) = take(V4_LENGTH_BYTES).parse(input)?;

    let address = Ipv4Addr::from(
        <[u8; V4_LENGTH_BYTES]>::try_from(address)
            .map_err(|_| ParserError::ErrorVerify.to_nom(input))?,
    );

    Ok((input, address))
}

/// Syntactic dotted-decimal check, e.g. `192.168.0.1`.
pub fn is_valid_v4(address: &str) -> bool {
    address.parse::<Ipv4Addr>().is_ok()
}

/// Heuristic "local" range: loopback `127.0.0.0/8` and the private ranges
/// `10.0.0.0/8`, `172.16.0.0/12`, `192.168.0.0/16`.
///
/// Interface addresses are not consulted, so hosts with public addresses
/// are never considered local.
pub fn is_local(address: &Ipv4Addr) -> bool {
    address.is_loopback() || address.is_private()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_ranges() {
        assert!(is_local(&Ipv4Addr::new(127, 0, 0, 1)));
        assert!(is_local(&Ipv4Addr::new(127, 255, 0, 9)));
        assert!(is_local(&Ipv4Addr::new(10, 20, 30, 40)));
        assert!(is_local(&Ipv4Addr::new(192, 168, 3, 131)));
        assert!(is_local(&Ipv4Addr::new(172, 16, 0, 1)));
        assert!(is_local(&Ipv4Addr::new(172, 31, 255, 255)));
    }

    #[test]
    fn test_non_local_ranges() {
        assert!(!is_local(&Ipv4Addr::new(172, 15, 0, 1)));
        assert!(!is_local(&Ipv4Addr::new(172, 32, 0, 1)));
        assert!(!is_local(&Ipv4Addr::new(8, 8, 8, 8)));
        assert!(!is_local(&Ipv4Addr::new(224, 0, 0, 252)));
        assert!(!is_local(&Ipv4Addr::new(192, 169, 0, 1)));
    }

    #[test]
    fn test_is_valid_v4() {
        assert!(is_valid_v4("127.0.0.1"));
        assert!(is_valid_v4("255.255.255.255"));
        assert!(!is_valid_v4("256.0.0.1"));
        assert!(!is_valid_v4("1.2.3"));
        assert!(!is_valid_v4("1.2.3.4.5"));
        assert!(!is_valid_v4("localhost"));
        assert!(!is_valid_v4(""));
    }

    #[test]
    fn test_v4_parse() {
        let (rest, address) = v4_parse(&[192, 168, 3, 131, 0xAA]).unwrap();
        assert_eq!(address, Ipv4Addr::new(192, 168, 3, 131));
        assert_eq!(rest, &[0xAA]);
    }
}
