//! Core types for decoded tracker data.
//!
//! ## Architecture
//!
//! - [`DecodedTelemetry`] is one decoded telemetry frame: identity, codec and records
//! - [`TelemetryRecord`] is one position fix with its event and IO elements
//! - [`Element`] is one raw IO element, identifier plus big-endian value bytes
//! - [`CodecVariant`] selects field widths for the two telemetry wire shapes
//! - [`CommandRequest`] / [`CommandResponse`] are codec 12 packets
//!
//! All types own their data. Nothing borrows from the buffer a value was
//! decoded from, so a receive buffer can be reused as soon as a decode returns.
//!
//! ## Usage Example
//!
//! ```rust
//! use avlcodec::types::{Element, TelemetryRecord};
//!
//! let record = TelemetryRecord {
//!     timestamp_millis: 1_528_069_090_050,
//!     priority: 1,
//!     latitude: 491_403_133,
//!     longitude: 170_206_400,
//!     altitude_meters: 211,
//!     heading_degrees: 303,
//!     visible_satellites: 19,
//!     speed_kmh: 50,
//!     event_id: 66,
//!     elements: vec![Element::new(66, [0x6f, 0xd8])],
//! };
//!
//! assert_eq!(record.timestamp_seconds(), 1_528_069_090);
//! assert_eq!(record.element(66).unwrap().value, vec![0x6f, 0xd8]);
//! ```

mod codec;
pub mod command;
mod record;

pub use codec::CodecVariant;
pub use command::{CommandRequest, CommandResponse};
pub use record::{
    ALTITUDE_RANGE, DecodedTelemetry, Element, LATITUDE_LIMIT, LONGITUDE_LIMIT, MAX_HEADING,
    MAX_PRIORITY, TelemetryRecord,
};
