//! Human-readable interpretation of IO elements.
//!
//! The wire decoders hand out raw `(id, length, value)` elements. This layer
//! maps an identifier to its catalogue entry for a device family and reads the
//! value as the typed number the entry prescribes.
//!
//! Catalogues are plain YAML, one document per family, loaded once into a
//! [`PropertyTable`] and passed by reference into a [`HumanDecoder`]:
//!
//! ```rust
//! use avlcodec::human::{DeviceFamily, HumanDecoder, HumanValue, PropertyTable};
//! use avlcodec::Element;
//!
//! let table = PropertyTable::bundled()?;
//! let decoder = HumanDecoder::new(&table);
//!
//! let voltage = decoder.value(&Element::new(66, [0x6f, 0xd8]), DeviceFamily::Fm11xy)?;
//! assert_eq!(voltage, HumanValue::U16(28632));
//! # Ok::<(), avlcodec::CodecError>(())
//! ```

mod catalogue;
mod decoder;

pub use catalogue::{ConversionTag, DeviceFamily, PropertyDescriptor, PropertyTable, Signedness};
pub use decoder::{DescribedElement, HumanDecoder, HumanProperty, HumanRecords, HumanValue, convert};
