//! Wire codec for GPS tracker telemetry and command packets.
//!
//! avlcodec turns the raw byte buffers a tracking device sends into typed
//! records, and builds the command packets a server sends back.
//!
//! # Features
//!
//! - **Telemetry frames**: codec 8 and codec 8 extended, with identity Luhn checks,
//!   range validation and the bucketed IO element block
//! - **Commands**: codec 12 request/response encoding and decoding with CRC-16/IBM
//! - **Stream framing**: a `tokio_util` codec for command replies on a live connection
//! - **Human layer** (`human` feature): YAML element catalogues and typed value conversion
//!
//! Every decode is a pure function of its input buffer. Nothing is retained
//! between calls, so decoders can run concurrently on independent buffers.
//!
//! # Quick Start
//!
//! ```rust
//! use avlcodec::{CodecVariant, decode_telemetry};
//!
//! fn handle(frame: &[u8]) -> avlcodec::Result<Vec<u8>> {
//!     let telemetry = decode_telemetry(frame)?;
//!     assert!(matches!(telemetry.codec, CodecVariant::Basic | CodecVariant::Extended));
//!     for record in &telemetry.records {
//!         let (lat, lng) = record.position_degrees();
//!         println!("{} at {lat:.5},{lng:.5} ({} elements)", telemetry.identity, record.elements.len());
//!     }
//!     // send this back on the same connection
//!     Ok(telemetry.acknowledgement)
//! }
//! # assert!(handle(&[0u8; 8]).is_err());
//! ```
//!
//! ## Commands
//!
//! ```rust
//! use avlcodec::{decode_command_request, encode_command_request};
//!
//! let packet = encode_command_request("getinfo")?;
//! let request = decode_command_request(&packet)?;
//! assert_eq!(request.text_lossy(), "getinfo");
//! # Ok::<(), avlcodec::CodecError>(())
//! ```

// Core types and error handling
pub mod binary;
mod error;
pub mod identity;
#[cfg(any(test, feature = "benchmark"))]
pub mod test_utils;
pub mod types;

// Decoders
pub mod avl;
pub mod command;

#[cfg(feature = "human")]
pub mod human;

// Core exports
pub use error::*;
pub use types::*;

// Entry points
pub use avl::{build_acknowledgement, decode_elements, decode_telemetry, frame_identity};
pub use command::{
    CommandStreamCodec, StreamConfig, decode_command_request, decode_command_response, encode_command_request,
    encode_command_response,
};
