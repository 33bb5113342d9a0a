//! Test utilities: captured device frames and a synthetic frame builder
//!
//! The captured frames come from real devices and are kept as hex so they can
//! be compared against protocol dumps. [`FrameBuilder`] produces valid frames
//! for either codec variant so tests can vary one field at a time.

#![cfg(any(test, feature = "benchmark"))]

use bytes::BufMut;

use crate::avl::elements::FIXED_BUCKET_SIZES;
use crate::{CodecVariant, Element, TelemetryRecord};

/// Codec 8 frame from an FMB device: identity 352094089397464, four records.
pub const BASIC_SAMPLE_HEX: &str = concat!(
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

/// Codec 8 extended frame: identity 352093085698206, one record, 19 elements.
pub const EXTENDED_SAMPLE_HEX: &str = concat!(
    "0086cafe0101000f3335323039333038353639383230368e0100000167efa919800200000000000000000000000000",
    "000000fc0013000800ef0000f00000150500c80000450200010000710000fc00000900b5000000b6000000423056",
    "00cd432a00ce6064001100090012ff22001303d1000f0000000200f1000059d90010000000000000000001",
);

pub fn basic_sample_frame() -> Vec<u8> {
    hex::decode(BASIC_SAMPLE_HEX).expect("sample hex is valid")
}

pub fn extended_sample_frame() -> Vec<u8> {
    hex::decode(EXTENDED_SAMPLE_HEX).expect("sample hex is valid")
}

/// A record that passes every range check, with one element per fixed bucket.
pub fn sample_record() -> TelemetryRecord {
    TelemetryRecord {
        timestamp_millis: 1_528_069_090_050,
        priority: 1,
        latitude: 491_403_133,
        longitude: 170_206_400,
        altitude_meters: 211,
        heading_degrees: 303,
        visible_satellites: 19,
        speed_kmh: 50,
        event_id: 66,
        elements: vec![
            Element::new(0x15, [0x03]),
            Element::new(0x42, [0x6f, 0xd8]),
            Element::new(0xf1, [0x00, 0x00, 0x59, 0xd9]),
            Element::new(0x4e, [0x00; 8]),
        ],
    }
}

/// Encode an IO element block, placing each element in the bucket matching its
/// value size. Elements of any other size go to the variable bucket, which only
/// exists for [`CodecVariant::Extended`].
pub fn encode_elements(elements: &[Element], codec: CodecVariant) -> Vec<u8> {
    let mut block = Vec::new();
    put_element_block(&mut block, elements, codec, elements.len());
    block
}

fn put_element_block(buf: &mut Vec<u8>, elements: &[Element], codec: CodecVariant, total: usize) {
    let width = codec.id_width();
    buf.put_uint(total as u64, width);

    for size in FIXED_BUCKET_SIZES {
        let bucket: Vec<&Element> = elements.iter().filter(|e| e.value.len() == size).collect();
        buf.put_uint(bucket.len() as u64, width);
        for element in bucket {
            buf.put_uint(u64::from(element.id), width);
            buf.put_slice(&element.value);
        }
    }

    let variable: Vec<&Element> = elements.iter().filter(|e| !FIXED_BUCKET_SIZES.contains(&e.value.len())).collect();
    if codec.has_variable_bucket() {
        buf.put_u16(variable.len() as u16);
        for element in variable {
            buf.put_u16(element.id);
            buf.put_u16(element.value.len() as u16);
            buf.put_slice(&element.value);
        }
    } else {
        assert!(variable.is_empty(), "codec 8 has no bucket for variable length elements");
    }
}

/// Builds syntactically valid telemetry frames.
#[derive(Debug, Clone)]
pub struct FrameBuilder {
    codec: CodecVariant,
    identity: String,
    byte4: u8,
    records: Vec<TelemetryRecord>,
    corrupt_element_total: bool,
}

impl FrameBuilder {
    pub fn new(codec: CodecVariant) -> Self {
        Self { codec, identity: "352094089397464".to_string(), byte4: 0x01, records: Vec::new(), corrupt_element_total: false }
    }

    pub fn identity(mut self, identity: &str) -> Self {
        self.identity = identity.to_string();
        self
    }

    /// Value at offset 4, echoed in the acknowledgement.
    pub fn byte4(mut self, byte4: u8) -> Self {
        self.byte4 = byte4;
        self
    }

    pub fn record(mut self, record: TelemetryRecord) -> Self {
        self.records.push(record);
        self
    }

    /// Declare one more element than the first record carries.
    pub fn corrupt_element_total(mut self) -> Self {
        self.corrupt_element_total = true;
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut frame = self.build_without_trailer();
        frame.put_u8(self.records.len() as u8);
        let length = (frame.len() - 2) as u16;
        frame[..2].copy_from_slice(&length.to_be_bytes());
        frame
    }

    pub fn build_without_trailer(&self) -> Vec<u8> {
        let mut frame = Vec::new();
        frame.put_u16(0);
        frame.put_slice(&[0xca, 0xfe]);
        frame.put_u8(self.byte4);
        frame.put_u8(0x00);
        frame.put_u8(0x00);
        frame.put_u8(self.identity.len() as u8);
        frame.put_slice(self.identity.as_bytes());
        frame.put_u8(self.codec.id());
        frame.put_u8(self.records.len() as u8);

        for (index, record) in self.records.iter().enumerate() {
            frame.put_u64(record.timestamp_millis);
            frame.put_u8(record.priority);
            frame.put_i32(record.longitude);
            frame.put_i32(record.latitude);
            frame.put_i16(record.altitude_meters);
            frame.put_u16(record.heading_degrees);
            frame.put_u8(record.visible_satellites);
            frame.put_u16(record.speed_kmh);
            frame.put_uint(u64::from(record.event_id), self.codec.event_id_width());

            let total = record.elements.len() + usize::from(index == 0 && self.corrupt_element_total);
            put_element_block(&mut frame, &record.elements, self.codec, total);
        }
        frame
    }
}
