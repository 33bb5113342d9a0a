//! Telemetry (AVL) frame decoding.
//!
//! A frame carries a device identity, a codec id, a record count, the records
//! and a trailing copy of the record count:
//!
//! ```text
//! [2B any][CA FE][1B][2B][1B id len][id digits][1B codec][1B count][records...][1B count]
//! ```
//!
//! [`decode_telemetry`] is the entry point. [`frame_identity`] reads just the
//! identity, and [`build_acknowledgement`] produces the reply a server sends
//! back after a successful decode.

pub mod elements;
mod frame;

pub use elements::decode_elements;
pub use frame::{
    ACK_PREFIX, FRAME_MARKER, IDENTITY_LENGTH_OFFSET, MIN_FRAME_LEN, build_acknowledgement, decode_telemetry,
    frame_identity,
};
