//! Decoded telemetry frame, record and IO element types

use serde::{Deserialize, Serialize};

use super::CodecVariant;

/// Latitude bound in 1e-7 degrees, exclusive on both sides.
pub const LATITUDE_LIMIT: i32 = 850_000_000;
/// Longitude bound in 1e-7 degrees, exclusive on both sides.
pub const LONGITUDE_LIMIT: i32 = 1_800_000_000;
/// Exclusive altitude bounds in meters.
pub const ALTITUDE_RANGE: (i16, i16) = (-5000, 12000);
/// Highest reportable heading in degrees.
pub const MAX_HEADING: u16 = 360;
/// Highest record priority (0 low, 1 high, 2 panic).
pub const MAX_PRIORITY: u8 = 2;

/// One IO element: an identifier and its raw big-endian value.
///
/// Interpretation of `value` is left to the catalogue layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    pub id: u16,
    pub length: u16,
    pub value: Vec<u8>,
}

impl Element {
    pub fn new(id: u16, value: impl Into<Vec<u8>>) -> Self {
        let value = value.into();
        Self { id, length: value.len() as u16, value }
    }
}

/// One AVL record: position fix, event and IO elements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryRecord {
    pub timestamp_millis: u64,
    pub priority: u8,
    /// 1e-7 degrees
    pub latitude: i32,
    /// 1e-7 degrees
    pub longitude: i32,
    pub altitude_meters: i16,
    pub heading_degrees: u16,
    pub visible_satellites: u8,
    pub speed_kmh: u16,
    pub event_id: u16,
    pub elements: Vec<Element>,
}

impl TelemetryRecord {
    /// Timestamp truncated to whole seconds.
    pub fn timestamp_seconds(&self) -> u64 {
        self.timestamp_millis / 1000
    }

    /// Look up an element by identifier.
    pub fn element(&self, id: u16) -> Option<&Element> {
        self.elements.iter().find(|e| e.id == id)
    }

    /// Latitude and longitude in decimal degrees.
    pub fn position_degrees(&self) -> (f64, f64) {
        (f64::from(self.latitude) / 1e7, f64::from(self.longitude) / 1e7)
    }
}

/// Result of decoding one telemetry frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedTelemetry {
    /// Device identity digits.
    pub identity: String,
    pub codec: CodecVariant,
    pub record_count: u8,
    pub records: Vec<TelemetryRecord>,
    /// Reply to send back to the device to confirm reception.
    pub acknowledgement: Vec<u8>,
}
