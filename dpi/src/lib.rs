// Library lints
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(unsafe_code)]

pub mod checksum;
pub mod craft;
pub mod display;
pub mod dto {
    pub mod frame;
}
pub mod parser;
pub mod protocols;
