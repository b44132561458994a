use crate::craft::config::DEFAULT_TEXT_PAYLOAD;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Payload generator. Only the parameters of the selected mode exist.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum Payload {
    /// Bytes of the string as is.
    Text { text: String },

    /// Hex digits; every other character is ignored and an odd trailing
    /// digit is dropped.
    Hex { hex: String },

    /// Uniformly distributed bytes, not suitable for anything secret.
    Random { size: usize },

    /// `size` copies of `byte`.
    Pattern { byte: u8, size: usize },

    /// Byte `i` is `(start + i * increment) mod 256`.
    Numbers {
        start: i32,
        increment: i32,
        size: usize,
    },
}

impl Default for Payload {
    fn default() -> Self {
        Self::Text {
            text: DEFAULT_TEXT_PAYLOAD.to_string(),
        }
    }
}

impl Payload {
    pub fn generate(&self) -> Vec<u8> {
        match self {
            Self::Text { text } => text.as_bytes().to_vec(),
            Self::Hex { hex } => decode_hex(hex),
            Self::Random { size } => {
                let mut bytes = vec![0u8; *size];
                rand::rng().fill(bytes.as_mut_slice());
                bytes
            },
            Self::Pattern { byte, size } => vec![*byte; *size],
            Self::Numbers {
                start,
                increment,
                size,
            } => (0..*size)
                .map(|index| {
                    // Two's complement truncation keeps the value modulo 256
                    start.wrapping_add(increment.wrapping_mul(index as i32)) as u8
                })
                .collect(),
        }
    }

    /// Length of the generated payload, known without generating it.
    pub fn len(&self) -> usize {
        match self {
            Self::Text { text } => text.len(),
            Self::Hex { hex } => hex_digits(hex).len() / 2,
            Self::Random { size } | Self::Pattern { size, .. } | Self::Numbers { size, .. } => *size,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn hex_digits(text: &str) -> String {
    text.chars().filter(|c| c.is_ascii_hexdigit()).collect()
}

fn decode_hex(text: &str) -> Vec<u8> {
    let digits = hex_digits(text);
    let even_length = digits.len() - digits.len() % 2;

    digits
        .get(..even_length)
        .and_then(|digits| hex::decode(digits).ok())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text() {
        let payload = Payload::Text {
            text: "ping".to_string(),
        };
        assert_eq!(payload.generate(), b"ping".to_vec());
        assert_eq!(payload.len(), 4);
    }

    #[test]
    fn test_hex_strips_separators_and_odd_nibble() {
        let payload = Payload::Hex {
            hex: "48 65:6c-6C 6".to_string(),
        };
        assert_eq!(payload.generate(), vec![0x48, 0x65, 0x6C, 0x6C]);
        assert_eq!(payload.len(), 4);
    }

    #[test]
    fn test_hex_without_digits() {
        let payload = Payload::Hex {
            hex: "zz".to_string(),
        };
        assert!(payload.generate().is_empty());
        assert!(payload.is_empty());
    }

    #[test]
    fn test_random_size() {
        let payload = Payload::Random { size: 128 };
        assert_eq!(payload.generate().len(), 128);
        assert_eq!(payload.len(), 128);
    }

    #[test]
    fn test_pattern() {
        let payload = Payload::Pattern {
            byte: 0xAA,
            size: 5,
        };
        assert_eq!(payload.generate(), vec![0xAA; 5]);
    }

    #[test]
    fn test_numbers_wrap_around() {
        let payload = Payload::Numbers {
            start: 250,
            increment: 3,
            size: 4,
        };
        assert_eq!(payload.generate(), vec![250, 253, 0, 3]);
    }

    #[test]
    fn test_numbers_negative_increment() {
        let payload = Payload::Numbers {
            start: 1,
            increment: -1,
            size: 3,
        };
        assert_eq!(payload.generate(), vec![1, 0, 255]);
    }
}
