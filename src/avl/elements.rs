//! IO element block decoding
//!
//! An IO element block is a total count followed by size-bucketed runs of
//! elements. Each bucket starts with its own count:
//!
//! ```text
//! total | n1 (id, 1B value)* | n2 (id, 2B value)* | n4 (id, 4B value)* | n8 (id, 8B value)*
//!       [ | nx (2B id, 2B length, value)* ]          codec 8 extended only
//! ```
//!
//! Counter and identifier widths are one byte for codec 8 and two bytes for
//! codec 8 extended. The sum of the bucket counts must equal the total.

use crate::binary::{Parsed, read_u16, read_uint, take};
use crate::{CodecError, CodecVariant, Element, Result};
use tracing::trace;

/// Value sizes of the fixed-size buckets, in wire order.
pub const FIXED_BUCKET_SIZES: [usize; 4] = [1, 2, 4, 8];

/// Decode the IO element block starting at `start`.
///
/// Returns the elements in wire order and the offset of the first byte after
/// the block.
pub fn decode_elements(frame: &[u8], start: usize, codec: CodecVariant) -> Result<Parsed<Vec<Element>>> {
    let width = codec.id_width();
    let total = read_uint(frame, start, width)?;
    let declared = total.value as usize;

    // Cap the allocation by what the remaining bytes could possibly hold
    let remaining = frame.len().saturating_sub(total.next);
    let mut elements = Vec::with_capacity(declared.min(remaining / (width + 1)));
    let mut counted = 0usize;
    let mut cursor = total.next;

    for size in FIXED_BUCKET_SIZES {
        let count = read_uint(frame, cursor, width)?;
        trace!("Bucket of {}B elements holds {} at offset {}", size, count.value, cursor);
        cursor = count.next;
        counted += count.value as usize;

        for _ in 0..count.value {
            let element = fixed_element(frame, cursor, width, size)?;
            cursor = element.next;
            elements.push(element.value);
        }
    }

    if codec.has_variable_bucket() {
        let count = read_u16(frame, cursor)?;
        trace!("Bucket of variable elements holds {} at offset {}", count.value, cursor);
        cursor = count.next;
        counted += usize::from(count.value);

        for _ in 0..count.value {
            let element = variable_element(frame, cursor)?;
            cursor = element.next;
            elements.push(element.value);
        }
    }

    if counted != declared {
        return Err(CodecError::ElementCountMismatch { declared, actual: counted });
    }

    Ok(Parsed::new(elements, cursor))
}

/// Identifier of `id_width` bytes followed by a value of `size` bytes.
fn fixed_element(frame: &[u8], at: usize, id_width: usize, size: usize) -> Result<Parsed<Element>> {
    let id = read_uint(frame, at, id_width)?;
    let value = take(frame, id.next, size)?;
    Ok(Parsed::new(
        Element { id: id.value as u16, length: size as u16, value: value.value.to_vec() },
        value.next,
    ))
}

/// Two byte identifier, two byte length, then `length` value bytes.
fn variable_element(frame: &[u8], at: usize) -> Result<Parsed<Element>> {
    let id = read_u16(frame, at)?;
    let length = read_u16(frame, id.next)?;
    let value = take(frame, length.next, usize::from(length.value))?;
    Ok(Parsed::new(
        Element { id: id.value, length: length.value, value: value.value.to_vec() },
        value.next,
    ))
}
