//! Telemetry codec variant definitions

use serde::{Deserialize, Serialize};

use crate::CodecError;

/// Wire shape of a telemetry frame, selected by the codec id byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CodecVariant {
    /// Codec 8: one byte identifiers and counters.
    Basic,
    /// Codec 8 extended: two byte identifiers and counters plus variable length elements.
    Extended,
}

impl CodecVariant {
    pub const BASIC_ID: u8 = 0x08;
    pub const EXTENDED_ID: u8 = 0x8e;

    /// Codec id byte as sent on the wire.
    pub const fn id(&self) -> u8 {
        match self {
            CodecVariant::Basic => Self::BASIC_ID,
            CodecVariant::Extended => Self::EXTENDED_ID,
        }
    }

    /// Width in bytes of IO element identifiers and of every element counter.
    pub const fn id_width(&self) -> usize {
        match self {
            CodecVariant::Basic => 1,
            CodecVariant::Extended => 2,
        }
    }

    /// Width in bytes of the per-record event identifier.
    pub const fn event_id_width(&self) -> usize {
        self.id_width()
    }

    /// Whether records end with a bucket of explicitly sized elements.
    pub const fn has_variable_bucket(&self) -> bool {
        matches!(self, CodecVariant::Extended)
    }
}

impl TryFrom<u8> for CodecVariant {
    type Error = CodecError;

    fn try_from(codec_id: u8) -> Result<Self, Self::Error> {
        match codec_id {
            Self::BASIC_ID => Ok(CodecVariant::Basic),
            Self::EXTENDED_ID => Ok(CodecVariant::Extended),
            _ => Err(CodecError::UnknownCodec { codec_id }),
        }
    }
}

impl std::fmt::Display for CodecVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CodecVariant::Basic => f.write_str("codec 8"),
            CodecVariant::Extended => f.write_str("codec 8 extended"),
        }
    }
}
