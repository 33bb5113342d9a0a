//! Telemetry frame decoding (codec 8 and codec 8 extended)

use crate::avl::elements::decode_elements;
use crate::binary::{Parsed, read_i16, read_i32, read_u8, read_u16, read_u64, read_uint};
use crate::identity::parse_identity;
use crate::{
    ALTITUDE_RANGE, Axis, CodecError, CodecVariant, DecodedTelemetry, LATITUDE_LIMIT, LONGITUDE_LIMIT, MAX_HEADING,
    MAX_PRIORITY, Result, TelemetryRecord,
};
use tracing::{debug, trace};

/// Shortest frame worth parsing.
pub const MIN_FRAME_LEN: usize = 45;
/// Protocol marker at offsets 2..4.
pub const FRAME_MARKER: [u8; 2] = [0xca, 0xfe];
/// Offset of the identity length byte.
pub const IDENTITY_LENGTH_OFFSET: usize = 7;
/// Fixed leading bytes of every acknowledgement.
pub const ACK_PREFIX: [u8; 5] = [0x00, 0x05, 0xca, 0xfe, 0x01];

const MARKER_OFFSET: usize = 2;
const ACK_ECHO_OFFSET: usize = 4;

/// Decode a complete telemetry frame.
///
/// The frame is only borrowed for the duration of the call; every byte
/// sequence in the result is an owned copy.
///
/// # Errors
///
/// Fails on the first structural or range violation. No partial result is
/// ever returned.
pub fn decode_telemetry(frame: &[u8]) -> Result<DecodedTelemetry> {
    check_envelope(frame)?;

    let identity = parse_identity(frame, IDENTITY_LENGTH_OFFSET)?;
    let codec_id = read_u8(frame, identity.next)?;
    let codec = CodecVariant::try_from(codec_id.value)?;
    let count = read_u8(frame, codec_id.next)?;
    let declared = count.value;

    let mut records = Vec::with_capacity(usize::from(declared));
    let mut cursor = count.next;
    for index in 0..declared {
        let record = decode_record(frame, cursor, codec)?;
        trace!(
            "Record {} at offset {}: ts={} event={} elements={}",
            index,
            cursor,
            record.value.timestamp_millis,
            record.value.event_id,
            record.value.elements.len()
        );
        cursor = record.next;
        records.push(record.value);
    }

    if records.len() != usize::from(declared) {
        return Err(CodecError::RecordCountMismatch { declared: usize::from(declared), actual: records.len() });
    }

    let trailer = read_u8(frame, cursor)?;
    if trailer.value != declared {
        return Err(CodecError::TrailerMismatch { expected: declared, found: trailer.value });
    }

    let acknowledgement = build_acknowledgement(frame[ACK_ECHO_OFFSET], declared).to_vec();
    debug!("Decoded {} frame from {} with {} records", codec, identity.value, declared);

    Ok(DecodedTelemetry { identity: identity.value, codec, record_count: declared, records, acknowledgement })
}

/// Read only the device identity of a telemetry frame.
///
/// Runs the same envelope and identity checks as [`decode_telemetry`] without
/// touching the records, so a server can authenticate a device before paying
/// for a full decode.
pub fn frame_identity(frame: &[u8]) -> Result<String> {
    check_envelope(frame)?;
    Ok(parse_identity(frame, IDENTITY_LENGTH_OFFSET)?.value)
}

/// Reply confirming reception of `record_count` records.
///
/// `frame_byte4` is echoed from offset 4 of the frame being acknowledged.
pub fn build_acknowledgement(frame_byte4: u8, record_count: u8) -> [u8; 7] {
    let [a, b, c, d, e] = ACK_PREFIX;
    [a, b, c, d, e, frame_byte4, record_count]
}

fn check_envelope(frame: &[u8]) -> Result<()> {
    if frame.len() < MIN_FRAME_LEN {
        return Err(CodecError::FrameTooShort { len: frame.len(), min: MIN_FRAME_LEN });
    }
    let found = [frame[MARKER_OFFSET], frame[MARKER_OFFSET + 1]];
    if found != FRAME_MARKER {
        return Err(CodecError::NotThisProtocol { found });
    }
    Ok(())
}

/// Decode one record starting at `at`.
fn decode_record(frame: &[u8], at: usize, codec: CodecVariant) -> Result<Parsed<TelemetryRecord>> {
    let timestamp = read_u64(frame, at)?;

    let priority = read_u8(frame, timestamp.next)?;
    if priority.value > MAX_PRIORITY {
        return Err(CodecError::PriorityOutOfRange { priority: priority.value });
    }

    // longitude comes first on the wire
    let longitude = read_i32(frame, priority.next)?;
    check_coordinate(Axis::Longitude, longitude.value, LONGITUDE_LIMIT)?;
    let latitude = read_i32(frame, longitude.next)?;
    check_coordinate(Axis::Latitude, latitude.value, LATITUDE_LIMIT)?;

    let altitude = read_i16(frame, latitude.next)?;
    let (lowest, highest) = ALTITUDE_RANGE;
    if altitude.value <= lowest || altitude.value >= highest {
        return Err(CodecError::AltitudeOutOfRange { altitude: altitude.value });
    }

    let heading = read_u16(frame, altitude.next)?;
    if heading.value > MAX_HEADING {
        return Err(CodecError::HeadingOutOfRange { heading: heading.value });
    }

    let satellites = read_u8(frame, heading.next)?;
    let speed = read_u16(frame, satellites.next)?;
    let event_id = read_uint(frame, speed.next, codec.event_id_width())?;
    let elements = decode_elements(frame, event_id.next, codec)?;

    Ok(Parsed::new(
        TelemetryRecord {
            timestamp_millis: timestamp.value,
            priority: priority.value,
            latitude: latitude.value,
            longitude: longitude.value,
            altitude_meters: altitude.value,
            heading_degrees: heading.value,
            visible_satellites: satellites.value,
            speed_kmh: speed.value,
            event_id: event_id.value as u16,
            elements: elements.value,
        },
        elements.next,
    ))
}

fn check_coordinate(axis: Axis, value: i32, limit: i32) -> Result<()> {
    if value <= -limit || value >= limit {
        return Err(CodecError::CoordinateOutOfRange { axis, value });
    }
    Ok(())
}
