//! Codec 12 packet encoding and decoding

use bytes::BufMut;
use tracing::{debug, trace};

use crate::binary::{Parsed, crc16_ibm, read_u8, read_u32, take};
use crate::types::command::{
    BODY_HEADER_LEN, BODY_TRAILER_LEN, CHECKSUM_LEN, COMMAND_CODEC_ID, COMMAND_PREAMBLE, COMMAND_QUANTITY,
    ENVELOPE_HEADER_LEN, TYPE_REQUEST, TYPE_RESPONSE,
};
use crate::{CodecError, CommandRequest, CommandResponse, Result};

/// Buffers of this size or smaller cannot be a response. A telemetry
/// acknowledgement is exactly this long.
pub const MIN_RESPONSE_LEN: usize = 7;

/// Encode a server-to-device command.
///
/// ```rust
/// let packet = avlcodec::encode_command_request("getinfo").unwrap();
/// assert_eq!(hex::encode_upper(&packet), "000000000000000F0C010500000007676574696E666F0100004312");
/// ```
pub fn encode_command_request(command: &str) -> Result<Vec<u8>> {
    encode_packet(TYPE_REQUEST, command.as_bytes())
}

/// Encode a device-to-server reply, as a device or simulator would send it.
pub fn encode_command_response(response: &str) -> Result<Vec<u8>> {
    encode_packet(TYPE_RESPONSE, response.as_bytes())
}

fn encode_packet(packet_type: u8, text: &[u8]) -> Result<Vec<u8>> {
    let too_large = || CodecError::CommandTooLarge { len: text.len() };
    let text_size = u32::try_from(text.len()).map_err(|_| too_large())?;
    let data_size = text_size
        .checked_add((BODY_HEADER_LEN + BODY_TRAILER_LEN) as u32)
        .ok_or_else(too_large)?;

    let mut packet = Vec::with_capacity(ENVELOPE_HEADER_LEN + data_size as usize + CHECKSUM_LEN);
    packet.put_u32(COMMAND_PREAMBLE);
    packet.put_u32(data_size);
    packet.put_u8(COMMAND_CODEC_ID);
    packet.put_u8(COMMAND_QUANTITY);
    packet.put_u8(packet_type);
    packet.put_u32(text_size);
    packet.put_slice(text);
    packet.put_u8(COMMAND_QUANTITY);

    // checksum covers everything serialized after the size field
    let crc = crc16_ibm(&packet[ENVELOPE_HEADER_LEN..]);
    packet.put_u32(u32::from(crc));

    trace!("Encoded codec 12 packet type {:#04x}, {} text bytes, crc {:#06x}", packet_type, text.len(), crc);
    Ok(packet)
}

/// Fixed fields in front of the text.
#[derive(Debug, Clone, Copy)]
struct Header {
    preamble: u32,
    data_size: u32,
    codec_id: u8,
    quantity: u8,
    packet_type: u8,
    text_size: u32,
}

/// Text and the fields behind it.
#[derive(Debug)]
struct Body {
    text: Vec<u8>,
    trailing_quantity: u8,
    checksum: u32,
    calculated: u16,
}

fn read_header(packet: &[u8]) -> Result<Parsed<Header>> {
    let preamble = read_u32(packet, 0)?;
    let data_size = read_u32(packet, preamble.next)?;
    let codec_id = read_u8(packet, data_size.next)?;
    let quantity = read_u8(packet, codec_id.next)?;
    let packet_type = read_u8(packet, quantity.next)?;
    let text_size = read_u32(packet, packet_type.next)?;
    Ok(Parsed::new(
        Header {
            preamble: preamble.value,
            data_size: data_size.value,
            codec_id: codec_id.value,
            quantity: quantity.value,
            packet_type: packet_type.value,
            text_size: text_size.value,
        },
        text_size.next,
    ))
}

fn read_body(packet: &[u8], header: &Parsed<Header>) -> Result<Body> {
    let text = take(packet, header.next, header.value.text_size as usize)?;
    let trailing_quantity = read_u8(packet, text.next)?;
    let checksum = read_u32(packet, trailing_quantity.next)?;
    let calculated = crc16_ibm(&packet[ENVELOPE_HEADER_LEN..trailing_quantity.next]);
    Ok(Body { text: text.value.to_vec(), trailing_quantity: trailing_quantity.value, checksum: checksum.value, calculated })
}

fn verify_checksum(body: &Body) -> Result<()> {
    if body.checksum != u32::from(body.calculated) {
        return Err(CodecError::crc_mismatch(body.checksum, body.calculated));
    }
    Ok(())
}

/// Decode a server-to-device command.
///
/// Only the checksum is validated; header constants are taken as found.
pub fn decode_command_request(packet: &[u8]) -> Result<CommandRequest> {
    let header = read_header(packet)?;
    let body = read_body(packet, &header)?;
    verify_checksum(&body)?;

    let Header { preamble, data_size, codec_id, quantity, packet_type, .. } = header.value;
    debug!("Decoded command request of {} bytes", body.text.len());
    Ok(CommandRequest {
        preamble,
        data_size,
        codec_id,
        quantity,
        packet_type,
        command: body.text,
        trailing_quantity: body.trailing_quantity,
        checksum: body.checksum,
    })
}

/// Decode a device-to-server reply.
///
/// Validation order is length, preamble, codec id, packet type, then the
/// checksum. Header constants are checked before the text is read, so a
/// packet of another protocol is reported by what differs rather than by a
/// bounds failure on its size field.
pub fn decode_command_response(packet: &[u8]) -> Result<CommandResponse> {
    if packet.len() <= MIN_RESPONSE_LEN {
        return Err(CodecError::NotAResponsePacket { len: packet.len() });
    }

    let header = read_header(packet)?;
    let Header { preamble, data_size, codec_id, quantity, packet_type, .. } = header.value;
    if preamble != COMMAND_PREAMBLE {
        return Err(CodecError::InvalidPreamble { preamble });
    }
    if codec_id != COMMAND_CODEC_ID {
        return Err(CodecError::InvalidCodec { codec_id });
    }
    if packet_type != TYPE_RESPONSE {
        return Err(CodecError::InvalidType { packet_type });
    }

    let body = read_body(packet, &header)?;
    verify_checksum(&body)?;

    debug!("Decoded command response of {} bytes", body.text.len());
    Ok(CommandResponse {
        preamble,
        data_size,
        codec_id,
        quantity,
        packet_type,
        response: body.text,
        trailing_quantity: body.trailing_quantity,
        checksum: body.checksum,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ChecksumKind;
    use anyhow::{Context, ensure};
    use proptest::prelude::*;

    const GETIO_RESPONSE: &str = "00000000000000370C01060000002F4449313A31204449323A30204449333A302041494E313A302041494E323A313639323420444F313A3020444F323A3101000066E3";

    const GETINFO_RESPONSE: &str = concat!(
        "00000000000000900C010600000088494E493A323031392F372F323220373A3232205254433A323031392F372F3232",
        "20373A3533205253543A32204552523A312053523A302042523A302043463A302046473A3020464C3A302054553A30",
        "2F302055543A3020534D533A30204E4F4750533A303A3330204750533A31205341543A302052533A332052463A3635",
        "2053463A31204D443A30010000C78F",
    );

    fn unhex(s: &str) -> Vec<u8> {
        hex::decode(s).unwrap()
    }

    #[test]
    fn encodes_known_requests() {
        assert_eq!(
            hex::encode_upper(encode_command_request("getinfo").unwrap()),
            "000000000000000F0C010500000007676574696E666F0100004312"
        );
        assert_eq!(
            hex::encode_upper(encode_command_request("getio").unwrap()),
            "000000000000000D0C010500000005676574696F01000000CB"
        );
    }

    #[test]
    fn decodes_known_request() -> anyhow::Result<()> {
        let request = decode_command_request(&unhex("000000000000000F0C010500000007676574696E666F0100004312"))
            .context("getinfo request should decode")?;
        ensure!(request.command == b"getinfo");
        ensure!(request.data_size == 0x0f);
        ensure!(request.codec_id == COMMAND_CODEC_ID);
        ensure!(request.packet_type == TYPE_REQUEST);
        ensure!(request.quantity == 1 && request.trailing_quantity == 1);
        ensure!(request.checksum == 0x4312);
        Ok(())
    }

    #[test]
    fn request_with_bad_crc_is_rejected() {
        let mut packet = encode_command_request("getver").unwrap();
        let last = packet.len() - 1;
        packet[last] ^= 0x01;
        assert!(matches!(
            decode_command_request(&packet),
            Err(CodecError::ChecksumInvalid { kind: ChecksumKind::Crc16, .. })
        ));
    }

    #[test]
    fn request_with_truncated_text_is_rejected() {
        let packet = encode_command_request("getinfo").unwrap();
        assert!(matches!(decode_command_request(&packet[..18]), Err(CodecError::OutOfBounds { .. })));
    }

    #[test]
    fn decodes_known_responses() -> anyhow::Result<()> {
        let response = decode_command_response(&unhex(GETIO_RESPONSE))?;
        ensure!(response.as_str() == Some("DI1:1 DI2:0 DI3:0 AIN1:0 AIN2:16924 DO1:0 DO2:1"));
        ensure!(response.data_size == 0x37);
        ensure!(response.response.len() == 0x2f);
        ensure!(response.checksum == 0x66e3);

        let response = decode_command_response(&unhex(GETINFO_RESPONSE))?;
        ensure!(response.data_size == 0x90);
        ensure!(response.response.len() == 0x88);
        ensure!(response.checksum == 0xc78f);
        ensure!(response.text_lossy().starts_with("INI:2019/7/22 7:22 RTC:2019/7/22 7:53"));
        Ok(())
    }

    #[test]
    fn response_with_altered_crc_is_rejected() {
        let mut packet = unhex(GETIO_RESPONSE);
        let last = packet.len() - 1;
        packet[last] = 0xe4;
        match decode_command_response(&packet) {
            Err(CodecError::ChecksumInvalid { kind: ChecksumKind::Crc16, expected, calculated }) => {
                assert_eq!(expected, 0x66e4);
                assert_eq!(calculated, 0x66e3);
            }
            other => panic!("Expected checksum failure, got {other:?}"),
        }
    }

    #[test]
    fn response_header_violations_are_named() {
        let mut packet = unhex(GETIO_RESPONSE);
        packet[0] = 0x10;
        assert!(matches!(decode_command_response(&packet), Err(CodecError::InvalidPreamble { preamble: 0x1000_0000 })));

        let mut packet = unhex(GETIO_RESPONSE);
        packet[10] = TYPE_REQUEST;
        assert!(matches!(decode_command_response(&packet), Err(CodecError::InvalidType { packet_type: 0x05 })));

        // a codec 8 extended telemetry frame
        let frame = unhex(concat!(
            "000000000176000f3335303432343036333831373336338e01000001839ed29768000b5629e81c5451d00000000000",
            "00000000000b000500500000150400c800004502001d00000500422e9b0018000000cd13f000ce005d00430fd40001",
            "00f10000547e0000000001",
        ));
        assert!(matches!(decode_command_response(&frame), Err(CodecError::InvalidCodec { codec_id: 0x33 })));
    }

    #[test]
    fn acknowledgement_is_not_a_response() {
        let ack = unhex("0005cafe017601");
        assert!(matches!(decode_command_response(&ack), Err(CodecError::NotAResponsePacket { len: 7 })));
        assert!(matches!(decode_command_response(&[]), Err(CodecError::NotAResponsePacket { len: 0 })));
    }

    #[test]
    fn responses_encode_like_devices_send_them() {
        let packet = encode_command_response("DI1:1 DI2:0 DI3:0 AIN1:0 AIN2:16924 DO1:0 DO2:1").unwrap();
        assert_eq!(hex::encode_upper(packet), GETIO_RESPONSE);
    }

    #[test]
    fn empty_command_encodes() {
        let packet = encode_command_request("").unwrap();
        assert_eq!(packet.len(), ENVELOPE_HEADER_LEN + BODY_HEADER_LEN + BODY_TRAILER_LEN + CHECKSUM_LEN);
        assert_eq!(decode_command_request(&packet).unwrap().command, b"");
    }

    proptest! {
        #[test]
        fn request_text_survives_encoding(command in ".{0,200}") {
            let packet = encode_command_request(&command).unwrap();
            let decoded = decode_command_request(&packet).unwrap();
            prop_assert_eq!(decoded.text_lossy(), command.clone());
            prop_assert_eq!(decoded.data_size as usize, 8 + command.len());
            prop_assert_eq!(decoded.checksum, u32::from(crc16_ibm(&packet[8..packet.len() - 4])));
        }

        #[test]
        fn any_single_bit_flip_in_the_body_is_caught(text in "[a-z:0-9 ]{1,64}", bit in 0usize..8, pick in any::<prop::sample::Index>()) {
            let mut packet = encode_command_response(&text).unwrap();
            // stay clear of the header constants and the size field
            let start = ENVELOPE_HEADER_LEN + BODY_HEADER_LEN;
            let index = start + pick.index(text.len());
            packet[index] ^= 1 << bit;
            let rejected = matches!(
                decode_command_response(&packet),
                Err(CodecError::ChecksumInvalid { .. })
            );
            prop_assert!(rejected);
        }

        #[test]
        fn garbage_never_panics(bytes in prop::collection::vec(any::<u8>(), 0..64)) {
            let _ = decode_command_request(&bytes);
            let _ = decode_command_response(&bytes);
        }
    }
}
