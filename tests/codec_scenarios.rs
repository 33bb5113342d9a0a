//! End-to-end scenarios against captured device traffic.

use anyhow::{Context, ensure};
use avlcodec::{
    ChecksumKind, CodecError, CodecVariant, build_acknowledgement, decode_command_request, decode_command_response,
    decode_telemetry, encode_command_request, encode_command_response, frame_identity,
};
use proptest::prelude::*;

const BASIC_FRAME: &str = concat!(
    "01e4cafe0128000f333532303934303839333937343634080400000163c803eb02010a2524c01d4a377d00d3012f13",
    "0032421b0a4503f00150051503ef01510052005900be00c1000ab50008b60006426fd8cd3d1ece605a5400005500",
    "007300005a0000c0000007c70000000df1000059d910002d33c65300000000570000000064000000f7bf00000000",
    "0000000163c803e6e8010a2530781d4a316f00d40131130031421b0a4503f00150051503ef015100520059",
    "00be00c1000ab50008b60005426fcbcd3d1ece605a5400005500007300005a0000c0000007c70000000ef1000059",
    "d910002d33b95300000000570000000064000000f7bf000000000000000163c803df18010a2536961d4a2e4f",
    "00d50134130033421b0a4503f00150051503ef01510052005900be00c1000ab50008b6000542702bcd3d1ece60",
    "5a5400005500007300005a0000c0000007c70000001ef1000059d910002d33aa5300000000570000000064000000",
    "f7bf000000000000000163c8039ce2010a25d8d41d49f42c00dc0123120058421b0a4503f00150051503ef0151",
    "0052005900be00c1000ab50009b60005427031cd79d8ce605a5400005500007300005a0000c0000007c700000019",
    "f1000059d910002d32505300000000570000000064000000f7bf000000000004",
);

const EXTENDED_FRAME: &str = concat!(
    "0086cafe0101000f3335323039333038353639383230368e0100000167efa919800200000000000000000000000000",
    "000000fc0013000800ef0000f00000150500c80000450200010000710000fc00000900b5000000b6000000423056",
    "00cd432a00ce6064001100090012ff22001303d1000f0000000200f1000059d90010000000000000000001",
);

const GETIO_RESPONSE: &str = "00000000000000370C01060000002F4449313A31204449323A30204449333A302041494E313A302041494E323A313639323420444F313A3020444F323A3101000066E3";

fn frame(hex_text: &str) -> Vec<u8> {
    hex::decode(hex_text).expect("fixture hex is valid")
}

#[test]
fn basic_frame_scenario() -> anyhow::Result<()> {
    let _ = tracing_subscriber::fmt::try_init();
    let bytes = frame(BASIC_FRAME);
    let decoded = decode_telemetry(&bytes).context("captured codec 8 frame")?;

    ensure!(decoded.identity == "352094089397464");
    ensure!(decoded.codec == CodecVariant::Basic);
    ensure!(decoded.record_count == 4);
    ensure!(decoded.records[0].timestamp_millis == 1_528_069_090_050);
    ensure!(decoded.records[0].priority == 1);
    ensure!(decoded.acknowledgement == [0x00, 0x05, 0xca, 0xfe, 0x01, bytes[4], 0x04]);
    ensure!(decoded.acknowledgement == build_acknowledgement(bytes[4], 4));

    // records are in wire order and each carries the full element set
    let timestamps: Vec<u64> = decoded.records.iter().map(|r| r.timestamp_millis).collect();
    ensure!(timestamps == [1_528_069_090_050, 1_528_069_089_000, 1_528_069_087_000, 1_528_069_070_050]);
    ensure!(decoded.records.iter().all(|r| r.elements.len() == 27));
    Ok(())
}

#[test]
fn extended_frame_scenario() -> anyhow::Result<()> {
    let bytes = frame(EXTENDED_FRAME);
    ensure!(frame_identity(&bytes)? == "352093085698206");

    let decoded = decode_telemetry(&bytes)?;
    ensure!(decoded.codec == CodecVariant::Extended);
    ensure!(decoded.records.len() == 1);
    ensure!(decoded.records[0].timestamp_seconds() == 1_545_914_096);
    ensure!(decoded.acknowledgement == [0x00, 0x05, 0xca, 0xfe, 0x01, 0x01, 0x01]);
    Ok(())
}

#[cfg(feature = "human")]
#[test]
fn decoded_frames_serialize() -> anyhow::Result<()> {
    let decoded = decode_telemetry(&frame(EXTENDED_FRAME))?;
    let yaml = serde_yaml_ng::to_string(&decoded)?;
    ensure!(yaml.contains("identity: '352093085698206'") || yaml.contains("identity: \"352093085698206\""));
    ensure!(yaml.contains("codec: Extended"));
    Ok(())
}

#[test]
fn getinfo_request_scenario() -> anyhow::Result<()> {
    let packet = encode_command_request("getinfo")?;
    ensure!(hex::encode_upper(&packet) == "000000000000000F0C010500000007676574696E666F0100004312");
    ensure!(decode_command_request(&packet)?.command == b"getinfo");
    Ok(())
}

#[test]
fn altered_response_checksum_scenario() {
    let mut packet = frame(GETIO_RESPONSE);
    let last = packet.len() - 1;
    packet[last] ^= 0x01;
    assert!(matches!(
        decode_command_response(&packet),
        Err(CodecError::ChecksumInvalid { kind: ChecksumKind::Crc16, .. })
    ));
}

#[test]
fn command_and_telemetry_decoders_reject_each_other() {
    let telemetry = frame(BASIC_FRAME);
    assert!(matches!(decode_command_response(&telemetry), Err(CodecError::InvalidPreamble { .. })));

    let response = encode_command_response("DO1:1").unwrap();
    assert!(matches!(decode_telemetry(&response), Err(CodecError::FrameTooShort { .. })));

    let ack = build_acknowledgement(0x01, 4);
    assert!(matches!(decode_command_response(&ack), Err(CodecError::NotAResponsePacket { len: 7 })));
}

proptest! {
    #[test]
    fn commands_survive_the_wire(command in "[ -~]{0,120}") {
        let decoded = decode_command_request(&encode_command_request(&command).unwrap()).unwrap();
        prop_assert_eq!(decoded.text_lossy(), command);
    }

    #[test]
    fn short_frames_fail_fast(len in 0usize..45) {
        let bytes = frame(BASIC_FRAME);
        let too_short = matches!(decode_telemetry(&bytes[..len]), Err(CodecError::FrameTooShort { .. }));
        prop_assert!(too_short);
    }

    #[test]
    fn any_corruption_is_an_error_not_a_panic(index in 0usize..486, byte in any::<u8>()) {
        let mut bytes = frame(BASIC_FRAME);
        bytes[index] = byte;
        // the result may still be valid when the byte lands in an unchecked field
        let _ = decode_telemetry(&bytes);
    }
}
