//! Device identity (IMEI) extraction and Luhn validation.
//!
//! The identity is carried as ASCII digits preceded by a one byte length.
//! Fifteen digit identities are IMEI numbers and carry a Luhn check digit.
//! Sixteen digit identities follow a different numbering scheme and are
//! accepted without a check digit.

use crate::binary::{Parsed, read_u8, take};
use crate::{ChecksumKind, CodecError, Result};
use tracing::trace;

/// Digit count of a checksummed (IMEI) identity.
pub const CHECKED_IDENTITY_LEN: u8 = 15;
/// Digit count of an unchecked identity.
pub const UNCHECKED_IDENTITY_LEN: u8 = 16;

/// Decode the identity whose length byte sits at `length_offset`.
///
/// Returns the digit string and the offset of the first byte after the digits.
pub fn parse_identity(frame: &[u8], length_offset: usize) -> Result<Parsed<String>> {
    let length = read_u8(frame, length_offset)?;
    if length.value != CHECKED_IDENTITY_LEN && length.value != UNCHECKED_IDENTITY_LEN {
        return Err(CodecError::InvalidIdentityLength { length: length.value });
    }

    let digits = take(frame, length.next, usize::from(length.value))?;
    let number = digits_to_number(digits.value, length.next)?;

    if length.value == CHECKED_IDENTITY_LEN {
        let check_digit = (number % 10) as u32;
        let calculated = luhn_check_digit(number / 10);
        if calculated != check_digit {
            return Err(CodecError::ChecksumInvalid {
                kind: ChecksumKind::Identity,
                expected: check_digit,
                calculated,
            });
        }
    }

    let actual = digit_count(number);
    if actual != usize::from(length.value) {
        return Err(CodecError::LengthMismatch { declared: usize::from(length.value), actual });
    }

    trace!("Parsed identity {} ({} digits)", number, length.value);
    Ok(Parsed::new(number.to_string(), digits.next))
}

/// Interpret ASCII digits as a decimal number. `base_offset` is only used for error context.
fn digits_to_number(digits: &[u8], base_offset: usize) -> Result<u64> {
    digits.iter().enumerate().try_fold(0u64, |acc, (i, &byte)| {
        if !byte.is_ascii_digit() {
            return Err(CodecError::InvalidIdentityDigit { offset: base_offset + i, byte });
        }
        // 16 digits never exceed u64::MAX
        Ok(acc * 10 + u64::from(byte - b'0'))
    })
}

/// Number of decimal digits in `number` (zero has none).
pub fn digit_count(mut number: u64) -> usize {
    let mut count = 0;
    while number != 0 {
        number /= 10;
        count += 1;
    }
    count
}

/// Luhn check digit for `payload`, the identity without its last digit.
///
/// Walking left from the rightmost payload digit, every first, third, fifth...
/// digit is doubled and reduced by 9 when the result exceeds 9.
pub fn luhn_check_digit(mut payload: u64) -> u32 {
    let mut sum = 0u32;
    let mut double = true;
    while payload != 0 {
        let mut digit = (payload % 10) as u32;
        if double {
            digit *= 2;
            if digit >= 10 {
                digit -= 9;
            }
        }
        sum += digit;
        double = !double;
        payload /= 10;
    }
    (10 - sum % 10) % 10
}

/// Whether a full IMEI (payload followed by check digit) passes the Luhn test.
pub fn is_valid_imei(imei: u64) -> bool {
    luhn_check_digit(imei / 10) == (imei % 10) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn frame_with_identity(length: u8, digits: &[u8]) -> Vec<u8> {
        let mut frame = vec![0x00, 0x86, 0xca, 0xfe, 0x01, 0x01, 0x00, length];
        frame.extend_from_slice(digits);
        frame.push(0x08);
        frame
    }

    #[test]
    fn parses_checked_identity() {
        let frame = frame_with_identity(15, b"352094089397464");
        let parsed = parse_identity(&frame, 7).unwrap();
        assert_eq!(parsed.value, "352094089397464");
        assert_eq!(parsed.next, 8 + 15);
    }

    #[test]
    fn accepts_unchecked_sixteen_digit_identity() {
        // last digit deliberately not a Luhn check digit
        let frame = frame_with_identity(16, b"3520940893974641");
        let parsed = parse_identity(&frame, 7).unwrap();
        assert_eq!(parsed.value, "3520940893974641");
        assert_eq!(parsed.next, 8 + 16);
    }

    #[test]
    fn rejects_bad_length_byte() {
        for length in [0u8, 14, 17, 255] {
            let frame = frame_with_identity(length, b"352094089397464");
            assert!(matches!(
                parse_identity(&frame, 7),
                Err(CodecError::InvalidIdentityLength { length: l }) if l == length
            ));
        }
    }

    #[test]
    fn rejects_bad_check_digit() {
        let frame = frame_with_identity(15, b"352094089397465");
        assert!(matches!(
            parse_identity(&frame, 7),
            Err(CodecError::ChecksumInvalid { kind: ChecksumKind::Identity, expected: 5, calculated: 4 })
        ));
    }

    #[test]
    fn rejects_leading_zero_identity() {
        // passes Luhn but only has 15 significant digits when 16 are declared
        let frame = frame_with_identity(16, b"0352094089397464");
        assert!(matches!(
            parse_identity(&frame, 7),
            Err(CodecError::LengthMismatch { declared: 16, actual: 15 })
        ));
    }

    #[test]
    fn rejects_non_digit_bytes() {
        let frame = frame_with_identity(15, b"35209408939746X");
        assert!(matches!(
            parse_identity(&frame, 7),
            Err(CodecError::InvalidIdentityDigit { offset: 22, byte: b'X' })
        ));
    }

    #[test]
    fn rejects_truncated_identity() {
        let frame = vec![0x00, 0x86, 0xca, 0xfe, 0x01, 0x01, 0x00, 15, b'3', b'5'];
        assert!(matches!(parse_identity(&frame, 7), Err(CodecError::OutOfBounds { .. })));
    }

    #[test]
    fn known_imeis_validate() {
        assert!(is_valid_imei(352_094_089_397_464));
        assert!(is_valid_imei(352_093_085_698_206));
        assert!(is_valid_imei(490_154_203_237_518));
        assert!(!is_valid_imei(490_154_203_237_519));
    }

    #[test]
    fn digit_counts() {
        assert_eq!(digit_count(0), 0);
        assert_eq!(digit_count(7), 1);
        assert_eq!(digit_count(352_094_089_397_464), 15);
        assert_eq!(digit_count(u64::MAX), 20);
    }

    proptest! {
        #[test]
        fn flipping_any_payload_digit_breaks_luhn(payload in 10_000_000_000_000u64..100_000_000_000_000u64, position in 0usize..14, bump in 1u64..10) {
            let imei = payload * 10 + u64::from(luhn_check_digit(payload));
            let mut digits = imei.to_string().into_bytes();
            let index = 13 - position;
            // keep the leading digit non-zero so the length stays 15
            prop_assume!(index != 0 || (u64::from(digits[0] - b'0') + bump) % 10 != 0);
            digits[index] = b'0' + ((u64::from(digits[index] - b'0') + bump) % 10) as u8;

            let frame = frame_with_identity(15, &digits);
            let is_checksum_error = matches!(
                parse_identity(&frame, 7),
                Err(CodecError::ChecksumInvalid { kind: ChecksumKind::Identity, .. })
            );
            prop_assert!(is_checksum_error);
        }

        #[test]
        fn generated_imeis_round_trip(payload in 10_000_000_000_000u64..100_000_000_000_000u64) {
            let imei = payload * 10 + u64::from(luhn_check_digit(payload));
            let frame = frame_with_identity(15, imei.to_string().as_bytes());
            prop_assert_eq!(parse_identity(&frame, 7).unwrap().value, imei.to_string());
        }
    }
}
