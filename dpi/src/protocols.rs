//! Header layouts understood by the decoder and the frame builder.
//!
//! Every module exposes a `parse` function with the `nom` signature
//! `fn(&[u8]) -> IResult<&[u8], Header>` and a `write` method appending the
//! header to a byte buffer in network byte order. Multi-byte fields are read
//! and written one by one at fixed offsets, never by overlaying structs.

pub mod ethernet;
pub mod icmpv4;
pub mod ip {
    pub mod address;
    pub mod protocol;
}
pub mod ipv4;
pub mod tcp;
pub mod udp;
