//! Text decoding applied to received chunks when a listener asks for text.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Failure to turn a received chunk into text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("unsupported encoding label '{0}'")]
    UnknownEncoding(String),

    #[error("byte 0x{byte:02x} at offset {offset} is not valid {encoding}")]
    InvalidByte {
        encoding: TextEncoding,
        byte: u8,
        offset: usize,
    },

    #[error("{encoding} input has odd length {len}")]
    OddLength { encoding: TextEncoding, len: usize },
}

/// Supported text encodings.
///
/// Labels follow the WHATWG names (`utf-8`, `utf-16le`, ...) with the common
/// aliases accepted on parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TextEncoding {
    /// Invalid sequences become U+FFFD.
    #[default]
    Utf8,
    /// Strict 7-bit ASCII.
    Ascii,
    /// ISO-8859-1: every byte maps to the code point of the same value.
    Latin1,
    Utf16Le,
    Utf16Be,
}

impl TextEncoding {
    pub fn label(self) -> &'static str {
        match self {
            Self::Utf8 => "utf-8",
            Self::Ascii => "ascii",
            Self::Latin1 => "iso-8859-1",
            Self::Utf16Le => "utf-16le",
            Self::Utf16Be => "utf-16be",
        }
    }

    pub fn decode(self, bytes: &[u8]) -> Result<String, DecodeError> {
        match self {
            Self::Utf8 => Ok(String::from_utf8_lossy(bytes).into_owned()),
            Self::Ascii => match bytes.iter().position(|b| !b.is_ascii()) {
                Some(offset) => Err(DecodeError::InvalidByte {
                    encoding: self,
                    byte: bytes[offset],
                    offset,
                }),
                None => Ok(bytes.iter().map(|&b| b as char).collect()),
            },
            Self::Latin1 => Ok(bytes.iter().map(|&b| b as char).collect()),
            Self::Utf16Le | Self::Utf16Be => {
                if bytes.len() % 2 != 0 {
                    return Err(DecodeError::OddLength {
                        encoding: self,
                        len: bytes.len(),
                    });
                }
                let units = bytes.chunks_exact(2).map(|pair| {
                    let pair = [pair[0], pair[1]];
                    if self == Self::Utf16Le {
                        u16::from_le_bytes(pair)
                    } else {
                        u16::from_be_bytes(pair)
                    }
                });
                Ok(char::decode_utf16(units)
                    .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
                    .collect())
            }
        }
    }
}

impl FromStr for TextEncoding {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "utf-8" | "utf8" | "unicode-1-1-utf-8" => Ok(Self::Utf8),
            "ascii" | "us-ascii" => Ok(Self::Ascii),
            "latin1" | "latin-1" | "iso-8859-1" | "iso8859-1" | "l1" => Ok(Self::Latin1),
            "utf-16le" | "utf-16" | "utf16le" => Ok(Self::Utf16Le),
            "utf-16be" | "utf16be" => Ok(Self::Utf16Be),
            other => Err(DecodeError::UnknownEncoding(other.to_string())),
        }
    }
}

impl TryFrom<String> for TextEncoding {
    type Error = DecodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TextEncoding> for String {
    fn from(value: TextEncoding) -> Self {
        value.label().to_string()
    }
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
