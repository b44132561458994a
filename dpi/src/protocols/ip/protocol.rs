use num_enum::{FromPrimitive, IntoPrimitive};
use serde::{Deserialize, Serialize};
use strum_macros::Display;

// Assigned Internet Protocol Numbers
// https://www.iana.org/assignments/protocol-numbers/protocol-numbers.xhtml

#[derive(
    Clone, Copy, Debug, Display, Serialize, Deserialize, PartialEq, Eq, FromPrimitive, IntoPrimitive,
)]
#[repr(u8)]
pub enum IpNextLevelProtocol {
    ICMP = 1,
    TCP = 6,
    UDP = 17,

    #[num_enum(catch_all)]
    #[strum(to_string = "Other")]
    Other(u8),
}
