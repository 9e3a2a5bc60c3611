use serde::de::value::U32Deserializer;
use serde::de::{DeserializeSeed, SeqAccess};
use serde_json::Value;

use crate::schema::{Schema, SchemaKey};

use super::super::allowed_depth::AllowedDepth;
use super::super::error::DeError;
use super::Deserializer;

/// Drives [`serde::de::SeqAccess`] over an Avro `array`'s JSON elements,
/// recursing into a fresh [`Deserializer`] scoped to `items` for each one.
pub(crate) struct ArraySeqAccess<'de, 's: 'de> {
	schema: &'s Schema,
	items: SchemaKey,
	depth: AllowedDepth,
	iter: std::slice::Iter<'de, Value>,
}

impl<'de, 's: 'de> ArraySeqAccess<'de, 's> {
	pub(crate) fn new(schema: &'s Schema, items: SchemaKey, depth: AllowedDepth, values: &'de [Value]) -> Self {
		Self {
			schema,
			items,
			depth,
			iter: values.iter(),
		}
	}
}

impl<'de, 's: 'de> SeqAccess<'de> for ArraySeqAccess<'de, 's> {
	type Error = DeError;

	fn next_element_seed<T: DeserializeSeed<'de>>(&mut self, seed: T) -> Result<Option<T::Value>, DeError> {
		match self.iter.next() {
			Some(value) => seed
				.deserialize(Deserializer {
					schema: self.schema,
					node: self.items,
					input: value,
					depth: self.depth,
				})
				.map(Some),
			None => Ok(None),
		}
	}
}

/// The three little-endian `u32` components of a Duration logical-type
/// value, already unpacked from the 12-byte fixed payload.
pub(crate) struct DurationSeqAccess {
	parts: [u32; 3],
	next: usize,
}

impl DurationSeqAccess {
	pub(crate) fn new(bytes: &[u8]) -> Self {
		let word = |i: usize| u32::from_le_bytes(bytes[i * 4..i * 4 + 4].try_into().unwrap());
		Self {
			parts: [word(0), word(1), word(2)],
			next: 0,
		}
	}
}

impl<'de> SeqAccess<'de> for DurationSeqAccess {
	type Error = DeError;

	fn next_element_seed<T: DeserializeSeed<'de>>(&mut self, seed: T) -> Result<Option<T::Value>, DeError> {
		if self.next >= self.parts.len() {
			return Ok(None);
		}
		let value = self.parts[self.next];
		self.next += 1;
		let deserializer: U32Deserializer<DeError> = U32Deserializer::new(value);
		seed.deserialize(deserializer).map(Some)
	}
}

/// The (days, millis) components of a Duration logical-type value, once its
/// `months` component has already been checked to be zero.
pub(crate) struct TimeSpanSeqAccess {
	parts: [u32; 2],
	next: usize,
}

impl TimeSpanSeqAccess {
	pub(crate) fn new(days: u32, millis: u32) -> Self {
		Self {
			parts: [days, millis],
			next: 0,
		}
	}
}

impl<'de> SeqAccess<'de> for TimeSpanSeqAccess {
	type Error = DeError;

	fn next_element_seed<T: DeserializeSeed<'de>>(&mut self, seed: T) -> Result<Option<T::Value>, DeError> {
		if self.next >= self.parts.len() {
			return Ok(None);
		}
		let value = self.parts[self.next];
		self.next += 1;
		let deserializer: U32Deserializer<DeError> = U32Deserializer::new(value);
		seed.deserialize(deserializer).map(Some)
	}
}
