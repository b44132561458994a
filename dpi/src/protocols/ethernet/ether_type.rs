use nom::IResult;
use nom::Parser;
use nom::number::be_u16;
use num_enum::{FromPrimitive, IntoPrimitive};
use serde::{Deserialize, Serialize};
use strum_macros::Display;

#[derive(
    Clone, Copy, Debug, Display, Serialize, Deserialize, PartialEq, Eq, FromPrimitive, IntoPrimitive,
)]
#[repr(u16)]
pub enum EtherType {
    #[strum(to_string = "ARP")]
    Arp = 0x0806,
    #[strum(to_string = "ARP (Frame Relay)")]
    ArpFrameRelay = 0x0808,
    #[strum(to_string = "RARP")]
    ArpReverse = 0x8035,
    #[strum(to_string = "IPv4")]
    Ipv4 = 0x0800,
    #[strum(to_string = "IPv6")]
    Ipv6 = 0x86DD,
    #[strum(to_string = "LLDP")]
    Lldp = 0x88CC,
    #[strum(to_string = "VLAN")]
    Vlan = 0x8100,

    #[num_enum(catch_all)]
    #[strum(to_string = "Unknown")]
    Unknown(u16),
}

pub fn parse(input: &[u8]) -> IResult<&[u8], EtherType> {
    let (input, ether_type) = be_u16().parse(input)?;

    Ok((input, EtherType::from(ether_type)))
}
