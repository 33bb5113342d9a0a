//! Typed conversion of element values against a [`PropertyTable`]

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::catalogue::{ConversionTag, DeviceFamily, PropertyDescriptor, PropertyTable};
use crate::binary::{read_signed_twos_complement, read_unsigned};
use crate::{CodecError, Element, Result, TelemetryRecord};

/// An element value after typed conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HumanValue {
    Bool(bool),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    Bytes(Vec<u8>),
}

impl std::fmt::Display for HumanValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HumanValue::Bool(v) => write!(f, "{v}"),
            HumanValue::U8(v) => write!(f, "{v}"),
            HumanValue::U16(v) => write!(f, "{v}"),
            HumanValue::U32(v) => write!(f, "{v}"),
            HumanValue::U64(v) => write!(f, "{v}"),
            HumanValue::I8(v) => write!(f, "{v}"),
            HumanValue::I16(v) => write!(f, "{v}"),
            HumanValue::I32(v) => write!(f, "{v}"),
            HumanValue::I64(v) => write!(f, "{v}"),
            HumanValue::Bytes(bytes) => bytes.iter().try_for_each(|b| write!(f, "{b:02x}")),
        }
    }
}

/// Reinterpret `value` as `tag`.
///
/// Returns `None` when the value is not exactly as wide as the tag requires.
/// Raw bytes accept any length.
pub fn convert(tag: ConversionTag, value: &[u8]) -> Option<HumanValue> {
    if tag.width().is_some_and(|width| width != value.len()) {
        return None;
    }
    let end = value.len();
    let unsigned = || read_unsigned(value, 0, end).ok();
    let signed = || read_signed_twos_complement(value, 0, end).ok();

    // widths are checked above, so the narrowing casts are exact
    Some(match tag {
        ConversionTag::Bool => HumanValue::Bool(value[0] == 0x01),
        ConversionTag::Uint8 => HumanValue::U8(unsigned()? as u8),
        ConversionTag::Uint16 => HumanValue::U16(unsigned()? as u16),
        ConversionTag::Uint32 => HumanValue::U32(unsigned()? as u32),
        ConversionTag::Uint64 => HumanValue::U64(unsigned()?),
        ConversionTag::Int8 => HumanValue::I8(signed()? as i8),
        ConversionTag::Int16 => HumanValue::I16(signed()? as i16),
        ConversionTag::Int32 => HumanValue::I32(signed()? as i32),
        ConversionTag::Int64 => HumanValue::I64(signed()?),
        ConversionTag::RawBytes => HumanValue::Bytes(value.to_vec()),
    })
}

/// An element paired with its catalogue entry.
#[derive(Debug, Clone, Copy)]
pub struct DescribedElement<'t, 'e> {
    pub descriptor: &'t PropertyDescriptor,
    pub element: &'e Element,
}

impl DescribedElement<'_, '_> {
    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    /// Convert the value as the catalogue prescribes.
    ///
    /// The declared width, the declared signedness and the actual value length
    /// must all agree with the conversion tag.
    pub fn value(&self) -> Result<HumanValue> {
        let descriptor = self.descriptor;
        let tag = descriptor.conversion;
        let actual = self.element.value.len();

        if let Some(width) = tag.width()
            && (usize::from(descriptor.bytes) != width || actual != width)
        {
            return Err(self.mismatch(format!(
                "{tag:?} needs {width} bytes, catalogue declares {} and element carries {actual}",
                descriptor.bytes
            )));
        }
        if tag.signedness().is_some() && tag.signedness() != descriptor.signedness {
            return Err(self.mismatch(format!(
                "{tag:?} needs {:?} values, catalogue declares {:?}",
                tag.signedness(),
                descriptor.signedness
            )));
        }

        convert(tag, &self.element.value)
            .ok_or_else(|| self.mismatch(format!("cannot read {actual} bytes as {tag:?}")))
    }

    fn mismatch(&self, details: String) -> CodecError {
        CodecError::conversion_mismatch(self.element.id, &self.descriptor.name, details)
    }
}

/// One converted element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HumanProperty {
    pub id: u16,
    pub name: String,
    pub value: HumanValue,
}

/// Converted records and the family whose catalogue matched them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HumanRecords {
    pub family: DeviceFamily,
    /// One entry per record, one property per element.
    pub records: Vec<Vec<HumanProperty>>,
}

/// Looks up and converts elements using an injected [`PropertyTable`].
#[derive(Debug, Clone, Copy)]
pub struct HumanDecoder<'t> {
    table: &'t PropertyTable,
}

impl<'t> HumanDecoder<'t> {
    pub fn new(table: &'t PropertyTable) -> Self {
        Self { table }
    }

    /// Pair `element` with its catalogue entry for `family`.
    pub fn describe<'e>(&self, element: &'e Element, family: DeviceFamily) -> Result<DescribedElement<'t, 'e>> {
        if element.id == 0 || element.value.is_empty() {
            return Err(CodecError::EmptyElement { id: element.id });
        }
        let descriptor = self
            .table
            .get(family, element.id)
            .ok_or_else(|| CodecError::UnknownElement { family: family.to_string(), id: element.id })?;
        Ok(DescribedElement { descriptor, element })
    }

    /// Describe and convert in one step.
    pub fn value(&self, element: &Element, family: DeviceFamily) -> Result<HumanValue> {
        self.describe(element, family)?.value()
    }

    /// Convert every element of every record, detecting the device family.
    ///
    /// Loaded families are tried in [`DeviceFamily::FALLBACK_ORDER`]; the first
    /// one under which every element converts wins. An empty element fails
    /// immediately since no family can describe it.
    pub fn records_to_human(&self, records: &[TelemetryRecord]) -> Result<HumanRecords> {
        let mut last_error = None;

        for family in self.table.families() {
            match self.convert_all(records, family) {
                Ok(converted) => return Ok(HumanRecords { family, records: converted }),
                Err(err @ CodecError::EmptyElement { .. }) => return Err(err),
                Err(err) => {
                    debug!("Family {} rejected: {}", family, err);
                    last_error = Some(err);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| CodecError::PropertyTable { details: "no family catalogue loaded".to_string() }))
    }

    fn convert_all(&self, records: &[TelemetryRecord], family: DeviceFamily) -> Result<Vec<Vec<HumanProperty>>> {
        records
            .iter()
            .map(|record| {
                record
                    .elements
                    .iter()
                    .map(|element| -> Result<HumanProperty> {
                        let described = self.describe(element, family)?;
                        Ok(HumanProperty { id: element.id, name: described.name().to_string(), value: described.value()? })
                    })
                    .collect()
            })
            .collect()
    }
}
