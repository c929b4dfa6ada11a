use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use serde_repr::{Deserialize_repr, Serialize_repr};
use std::fmt::Display;

/// Compression level sent as the `lossy` field.
#[derive(Clone, Copy, Debug, Default, Deserialize_repr, Eq, PartialEq, Serialize_repr)]
#[repr(u8)]
pub enum Compression {
    Lossless = 0,
    #[default]
    Lossy = 1,
    Glossy = 2,
}

/// Resize behaviour sent as the `resize` field.
#[derive(Clone, Copy, Debug, Default, Deserialize_repr, Eq, PartialEq, Serialize_repr)]
#[repr(u8)]
pub enum ResizeMode {
    #[default]
    None = 0,
    /// Image covers the given box, keeping aspect ratio.
    Outer = 1,
    /// Image fits inside the given box, keeping aspect ratio.
    Inner = 3,
}

/// Per-image status reported by the service.
///
/// The service sends the code either as a number or as a numeric string.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StatusCode {
    Unknown,
    Pending,
    Success,
    Error(i64),
}

impl StatusCode {
    pub const fn code(self) -> i64 {
        match self {
            Self::Unknown => 0,
            Self::Pending => 1,
            Self::Success => 2,
            Self::Error(code) => code,
        }
    }

    pub const fn is_pending(self) -> bool {
        matches!(self, Self::Pending)
    }

    pub const fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }
}

impl From<i64> for StatusCode {
    fn from(code: i64) -> Self {
        match code {
            0 => Self::Unknown,
            1 => Self::Pending,
            2 => Self::Success,
            other => Self::Error(other),
        }
    }
}

impl Display for StatusCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unknown => write!(f, "Unknown"),
            Self::Pending => write!(f, "Pending"),
            Self::Success => write!(f, "Success"),
            Self::Error(code) => write!(f, "Error({code})"),
        }
    }
}

impl Serialize for StatusCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.code())
    }
}

impl<'de> Deserialize<'de> for StatusCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Int(i64),
            Str(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Int(code) => Ok(Self::from(code)),
            Raw::Str(text) => text
                .trim()
                .parse::<i64>()
                .map(Self::from)
                .map_err(|_| de::Error::custom(format!("invalid status code: {text:?}"))),
        }
    }
}
