//! Conversions between the "modified UTF-8" of `CONSTANT_Utf8_info` entries and rust strings.
//!
//! The format uses a 2x3-byte encoding for supplementary characters and stores `\0` using two bytes.
//! See <https://docs.oracle.com/javase/specs/jvms/se21/html/jvms-4.html#jvms-4.4.7> for the complete definition.
//!
//! The raw bytes of an entry are what gets written back, the text produced here is only a view of them.

use java_string::{JavaStr, JavaString};

/// Decodes the bytes of an `Utf8` entry into a [`String`].
///
/// Content that isn't valid modified UTF-8, or that contains unpaired surrogates, is decoded as standard UTF-8 instead, replacing invalid
/// sequences with [`char::REPLACEMENT_CHARACTER`].
pub(crate) fn decode_lossy(bytes: &[u8]) -> String {
	JavaString::from_modified_utf8(bytes.to_vec()).ok()
		.and_then(|string| string.as_java_str().as_str().ok().map(str::to_owned))
		.unwrap_or_else(|| String::from_utf8_lossy(bytes).into_owned())
}

/// Encodes a string into the bytes of an `Utf8` entry.
pub(crate) fn encode(string: &str) -> Vec<u8> {
	JavaStr::from_str(string).to_modified_utf8().into_owned()
}

#[cfg(test)]
mod testing {
	use pretty_assertions::assert_eq;
	use crate::jstring::{decode_lossy, encode};

	fn round_trip(raw: &[u8], string: &str) {
		assert_eq!(encode(string), raw);
		assert_eq!(decode_lossy(raw), string);
	}

	#[test]
	fn zero() {
		round_trip(&[0b1100_0000, 0b1000_0000, 0b1100_0000, 0b1000_0000], "\0\0");
	}

	#[test]
	fn one_byte() {
		let raw: Vec<u8> = (0x0001..=0x007f).collect();
		let string: String = ('\u{0001}'..='\u{007f}').collect();
		round_trip(&raw, &string);
	}

	#[test]
	fn two_and_three_bytes() {
		round_trip(&[
			0b1100_0010, 0b1000_0000,
			0b1101_1111, 0b1011_1111,
			0b1110_0000, 0b1010_0000, 0b1000_0000,
			0b1110_1111, 0b1011_1111, 0b1011_1111,
		], "\u{0080}\u{07ff}\u{0800}\u{ffff}");
	}

	#[test]
	fn six_bytes() {
		round_trip(&[
			0b1110_1101, 0b1010_0000, 0b1000_0000, 0b1110_1101, 0b1011_0000, 0b1000_0000,
			0b1110_1101, 0b1010_1111, 0b1011_1111, 0b1110_1101, 0b1011_1111, 0b1011_1111,
		], "\u{010000}\u{10ffff}");
	}

	#[test]
	fn invalid_content_still_gives_text() {
		// a lone continuation byte
		assert_eq!(decode_lossy(&[b'a', 0b1000_0000, b'b']), "a\u{fffd}b");
	}
}
