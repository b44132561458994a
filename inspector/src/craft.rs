use crate::net::sender::{FrameSender, SendError};
use dpi::craft::config::CraftConfig;
use dpi::craft::CraftError;
use std::path::Path;
use thiserror::Error;

/// Reads a craft profile. Omitted sections and fields take the defaults
/// of [`CraftConfig`].
pub fn load_profile(path: &Path) -> Result<CraftConfig, ProfileError> {
    let data = std::fs::read_to_string(path)?;
    parse_profile(&data)
}

pub fn parse_profile(data: &str) -> Result<CraftConfig, ProfileError> {
    toml::from_str(data).map_err(ProfileError::TomlDeserialization)
}

/// Validates and builds the frame once, then sends it `count` times.
/// Nothing is sent if the profile is invalid. Returns the frame length.
pub fn craft_and_send<S: FrameSender + ?Sized>(
    config: &CraftConfig, sender: &mut S, count: usize,
) -> Result<usize, ProfileError> {
    let frame = dpi::craft::craft(config)?;

    for sent in 0..count {
        if let Err(err) = sender.send(&frame) {
            log::error!("Sent {} of {} frames.", sent, count);
            return Err(ProfileError::Send(err));
        }
    }
    log::info!("Sent {} frame(s) of {} bytes.", count, frame.len());

    Ok(frame.len())
}

#[derive(Error, Debug)]
pub enum ProfileError {
    #[error("IO Error.")]
    IO(#[from] std::io::Error),

    #[error("TOML Deserialization Error.")]
    TomlDeserialization(#[from] toml::de::Error),

    #[error("{0}")]
    Craft(#[from] CraftError),

    #[error("{0}")]
    Send(SendError),
}

impl ProfileError {
    pub fn additional_info(&self) -> Option<String> {
        match self {
            ProfileError::IO(err) => Some(err.to_string()),
            ProfileError::TomlDeserialization(err) => Some(err.to_string()),
            _ => None,
        }
    }
}
