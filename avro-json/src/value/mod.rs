//! The value codec (components F/G/H): serializing/deserializing host values
//! against a [`Schema`](crate::schema::Schema) node, using the Avro JSON
//! value encoding (§4.7, §4.8) rather than binary Avro.
//!
//! Unlike the teacher's compiled codec (which resolves a host type against a
//! schema once, ahead of time, into cached closures), this crate's
//! [`ser::Serializer`]/[`de::Deserializer`] re-walk the schema on every call.
//! There is no host-type resolver (§4.4) to cache against: `serde`'s own
//! derive already performs the "priority dispatch" of §4.5 for us, by
//! choosing which `serialize_*`/`visit_*` method to call.

pub mod de;
pub mod ser;

mod allowed_depth;
mod duration;
mod error;

pub use self::allowed_depth::AllowedDepth;
pub use self::duration::{Duration, TimeSpan};
pub use self::error::{BuildError, DeError, SerError};

use serde::{Deserialize, Serialize};

use crate::schema::{Schema, SchemaKey};

/// Serialize `value` into the Avro JSON encoding for `schema`'s node at
/// `key`, as a [`serde_json::Value`] tree.
pub fn to_value<T: Serialize + ?Sized>(schema: &Schema, key: SchemaKey, value: &T) -> Result<serde_json::Value, SerError> {
	ser::to_value(schema, key, value)
}

/// Serialize `value` into the Avro JSON encoding for `schema`'s node at
/// `key`, as a compact JSON string.
pub fn to_string<T: Serialize + ?Sized>(schema: &Schema, key: SchemaKey, value: &T) -> Result<String, SerError> {
	let value = to_value(schema, key, value)?;
	serde_json::to_string(&value).map_err(|e| SerError::Custom(e.to_string().into_boxed_str()))
}

/// Deserialize `T` from a [`serde_json::Value`] tree holding the Avro JSON
/// encoding for `schema`'s node at `key`. `schema` must outlive `value`.
pub fn from_value<'s: 'de, 'de, T: Deserialize<'de>>(
	schema: &'s Schema,
	key: SchemaKey,
	value: &'de serde_json::Value,
) -> Result<T, DeError> {
	de::from_value(schema, key, value)
}

/// Deserialize `T` from a JSON string holding the Avro JSON encoding for
/// `schema`'s node at `key`.
pub fn from_str<T: serde::de::DeserializeOwned>(schema: &Schema, key: SchemaKey, json: &str) -> Result<T, DeError> {
	de::from_str(schema, key, json)
}

/// Encode `bytes` as the ISO-8859-1-equivalent JSON string Avro's bytes/fixed
/// wire format uses (§4.8): each byte is a direct Unicode code point in
/// `[0x00, 0xFF]`.
pub(crate) fn bytes_to_iso_8859_1(bytes: &[u8]) -> String {
	bytes.iter().map(|&b| b as char).collect()
}

/// Inverse of [`bytes_to_iso_8859_1`]; fails on any code point outside
/// `[0x00, 0xFF]`; that is the "refuse out-of-range code points" half of
/// §4.8's round-trip requirement.
pub(crate) fn iso_8859_1_to_bytes(s: &str) -> Result<Vec<u8>, String> {
	s.chars()
		.map(|c| {
			u8::try_from(c as u32).map_err(|_| format!("`{c}` is not a valid ISO-8859-1 byte value"))
		})
		.collect()
}

/// Pack `decimal`'s unscaled integer value into the big-endian, minimum-width
/// two's complement byte representation §4.8 requires, after rescaling to
/// the schema's declared `scale`.
pub(crate) fn decimal_to_unscaled_bytes(decimal: rust_decimal::Decimal, precision: u32, scale: u32) -> Result<Vec<u8>, String> {
	let mut decimal = decimal;
	decimal.rescale(scale);
	let unscaled = decimal.mantissa();
	let digits = unscaled.unsigned_abs().to_string().len() as u32;
	if digits > precision {
		return Err(format!(
			"value has {digits} significant digits, more than the schema's precision {precision}"
		));
	}
	Ok(minimal_twos_complement(unscaled))
}

/// Decode the big-endian minimum-width two's complement bytes §4.8 encodes a
/// decimal's unscaled value as, back into a [`rust_decimal::Decimal`] at the
/// given `scale`.
pub(crate) fn unscaled_bytes_to_decimal(bytes: &[u8], scale: u32) -> Result<rust_decimal::Decimal, String> {
	if bytes.is_empty() {
		return Err("decimal has zero unscaled bytes".to_owned());
	}
	let negative = bytes[0] & 0x80 != 0;
	let mut magnitude: i128 = 0;
	for &b in bytes {
		magnitude = magnitude
			.checked_shl(8)
			.and_then(|m| m.checked_add(i128::from(b)))
			.ok_or_else(|| "decimal unscaled value overflows 128 bits".to_owned())?;
	}
	if negative {
		let bits = 8 * bytes.len() as u32;
		magnitude -= 1i128 << bits;
	}
	Ok(rust_decimal::Decimal::from_i128_with_scale(magnitude, scale))
}

fn minimal_twos_complement(v: i128) -> Vec<u8> {
	if v == 0 {
		return vec![0];
	}
	let mut bytes = v.to_be_bytes().to_vec();
	let is_negative = v < 0;
	let pad_byte = if is_negative { 0xff } else { 0x00 };
	while bytes.len() > 1 && bytes[0] == pad_byte {
		let next_sign_bit = bytes[1] & 0x80 != 0;
		if next_sign_bit == is_negative {
			bytes.remove(0);
		} else {
			break;
		}
	}
	bytes
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn iso_8859_1_round_trips_all_bytes() {
		let bytes: Vec<u8> = (0..=255).collect();
		let s = bytes_to_iso_8859_1(&bytes);
		assert_eq!(iso_8859_1_to_bytes(&s).unwrap(), bytes);
	}

	#[test]
	fn iso_8859_1_rejects_out_of_range_code_point() {
		assert!(iso_8859_1_to_bytes("\u{1f600}").is_err());
	}

	#[test]
	fn minimal_twos_complement_matches_avro_examples() {
		assert_eq!(minimal_twos_complement(0), vec![0x00]);
		assert_eq!(minimal_twos_complement(-1), vec![0xff]);
		assert_eq!(minimal_twos_complement(1), vec![0x01]);
		assert_eq!(minimal_twos_complement(-6), vec![0xfa]);
		assert_eq!(minimal_twos_complement(2), vec![0x02]);
	}

	#[test]
	fn decimal_bytes_round_trip() {
		let decimal: rust_decimal::Decimal = "3.14".parse().unwrap();
		let bytes = decimal_to_unscaled_bytes(decimal, 10, 2).unwrap();
		let back = unscaled_bytes_to_decimal(&bytes, 2).unwrap();
		assert_eq!(back.to_string(), "3.14");
	}

	#[test]
	fn decimal_round_trips_at_precision_29_boundary() {
		// `rust_decimal`'s 96-bit unsigned mantissa tops out at this value
		// (29 significant digits); a round trip here must not lose precision
		// by narrowing the decoded magnitude through `i64` along the way.
		let unscaled: i128 = 79228162514264337593543950335;
		let decimal = rust_decimal::Decimal::from_i128_with_scale(unscaled, 14);
		let bytes = decimal_to_unscaled_bytes(decimal, 29, 14).unwrap();
		let back = unscaled_bytes_to_decimal(&bytes, 14).unwrap();
		assert_eq!(back, decimal);
	}
}
