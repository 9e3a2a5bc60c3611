use serde::de::value::StrDeserializer;
use serde::de::{DeserializeSeed, MapAccess};
use serde_json::{Map, Value};

use crate::schema::{RecordField, Schema, SchemaKey};

use super::super::allowed_depth::AllowedDepth;
use super::super::error::DeError;
use super::Deserializer;

/// Drives [`serde::de::MapAccess`] over an Avro `map`'s JSON object entries;
/// all values share the one `values` schema node.
pub(crate) struct ObjectMapAccess<'de, 's: 'de> {
	schema: &'s Schema,
	values: SchemaKey,
	depth: AllowedDepth,
	iter: serde_json::map::Iter<'de>,
	pending: Option<&'de Value>,
}

impl<'de, 's: 'de> ObjectMapAccess<'de, 's> {
	pub(crate) fn new(schema: &'s Schema, values: SchemaKey, depth: AllowedDepth, obj: &'de Map<String, Value>) -> Self {
		Self {
			schema,
			values,
			depth,
			iter: obj.iter(),
			pending: None,
		}
	}
}

impl<'de, 's: 'de> MapAccess<'de> for ObjectMapAccess<'de, 's> {
	type Error = DeError;

	fn next_key_seed<K: DeserializeSeed<'de>>(&mut self, seed: K) -> Result<Option<K::Value>, DeError> {
		match self.iter.next() {
			Some((key, value)) => {
				self.pending = Some(value);
				seed.deserialize(StrDeserializer::new(key)).map(Some)
			}
			None => Ok(None),
		}
	}

	fn next_value_seed<V: DeserializeSeed<'de>>(&mut self, seed: V) -> Result<V::Value, DeError> {
		let value = self
			.pending
			.take()
			.ok_or_else(|| DeError::invalid_encoding(0, "next_value_seed called before next_key_seed"))?;
		seed.deserialize(Deserializer {
			schema: self.schema,
			node: self.values,
			input: value,
			depth: self.depth,
		})
	}
}

enum Pending<'de> {
	FromJson(usize, &'de Value),
	FromDefault(usize),
}

/// Drives [`serde::de::MapAccess`] over an Avro `record`'s fields (§4.6).
///
/// Yields the JSON object's own entries first — failing with
/// `InvalidEncoding("Unknown record field name.")` on a key with no
/// matching schema field — then, for any schema field the JSON omitted but
/// which declares a default, synthesizes one final entry per such field so
/// a `#[derive(Deserialize)]` struct sees a complete record.
pub(crate) struct RecordMapAccess<'de, 's: 'de> {
	schema: &'s Schema,
	fields: &'s [RecordField],
	depth: AllowedDepth,
	obj_iter: serde_json::map::Iter<'de>,
	consumed: Vec<bool>,
	default_idx: usize,
	pending: Option<Pending<'de>>,
}

impl<'de, 's: 'de> RecordMapAccess<'de, 's> {
	pub(crate) fn new(
		schema: &'s Schema,
		_record: SchemaKey,
		fields: &'s [RecordField],
		depth: AllowedDepth,
		obj: &'de Map<String, Value>,
	) -> Self {
		Self {
			schema,
			fields,
			depth,
			obj_iter: obj.iter(),
			consumed: vec![false; fields.len()],
			default_idx: 0,
			pending: None,
		}
	}
}

impl<'de, 's: 'de> MapAccess<'de> for RecordMapAccess<'de, 's> {
	type Error = DeError;

	fn next_key_seed<K: DeserializeSeed<'de>>(&mut self, seed: K) -> Result<Option<K::Value>, DeError> {
		if let Some((key, value)) = self.obj_iter.next() {
			let idx = self
				.fields
				.iter()
				.position(|f| &f.name == key)
				.ok_or_else(|| DeError::invalid_encoding(0, "Unknown record field name."))?;
			self.consumed[idx] = true;
			self.pending = Some(Pending::FromJson(idx, value));
			return seed.deserialize(StrDeserializer::new(key)).map(Some);
		}
		while self.default_idx < self.fields.len() {
			let idx = self.default_idx;
			self.default_idx += 1;
			if self.consumed[idx] {
				continue;
			}
			if self.fields[idx].default.is_some() {
				self.pending = Some(Pending::FromDefault(idx));
				return seed.deserialize(StrDeserializer::new(&self.fields[idx].name)).map(Some);
			}
		}
		Ok(None)
	}

	fn next_value_seed<V: DeserializeSeed<'de>>(&mut self, seed: V) -> Result<V::Value, DeError> {
		match self.pending.take() {
			Some(Pending::FromJson(idx, value)) => {
				let field = &self.fields[idx];
				seed.deserialize(Deserializer {
					schema: self.schema,
					node: field.type_,
					input: value,
					depth: self.depth,
				})
			}
			Some(Pending::FromDefault(idx)) => {
				let field = &self.fields[idx];
				let default = field.default.as_ref().expect("checked in next_key_seed");
				seed.deserialize(Deserializer {
					schema: self.schema,
					node: field.type_,
					input: default.raw(),
					depth: self.depth,
				})
			}
			None => Err(DeError::invalid_encoding(0, "next_value_seed called before next_key_seed")),
		}
	}
}
