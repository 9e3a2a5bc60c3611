//! The value deserializer (components F/H): a [`serde::Deserializer`] that
//! walks an already-parsed [`serde_json::Value`] tree alongside a
//! `(&Schema, SchemaKey)` pair.
//!
//! Because the input is fully self-describing JSON rather than a byte
//! cursor, most `deserialize_*` hints delegate to [`Deserializer::deserialize_any`],
//! which dispatches on the schema node the way [`super::ser::Serializer`]'s
//! `serialize_*` methods dispatch on the host value's shape. A handful of
//! hints — `option`, `tuple` (Duration), `enum` (Enum/Union) — need the
//! schema's help to pick a shape `deserialize_any` alone couldn't infer from
//! the JSON text, so those get dedicated handling.

use serde::de::{self, Deserialize, Visitor};
use serde_json::Value;

use crate::schema::{LogicalType, ObjectDefaultValue, RegularType, Schema, SchemaKey};

use super::allowed_depth::AllowedDepth;
use super::error::DeError;
use super::iso_8859_1_to_bytes;

mod map;
mod seq;
mod union_enum;

use map::{ObjectMapAccess, RecordMapAccess};
use seq::{ArraySeqAccess, DurationSeqAccess, TimeSpanSeqAccess};
use union_enum::{SymbolEnumAccess, UnionEnumAccess};

/// Deserialize `T` from `value`, the Avro JSON encoding of `schema`'s node
/// at `key`. `schema` must outlive `value` (the usual case: the schema is
/// held for the life of the program, values are transient).
pub fn from_value<'s: 'de, 'de, T: Deserialize<'de>>(
	schema: &'s Schema,
	key: SchemaKey,
	value: &'de Value,
) -> Result<T, DeError> {
	tracing::trace!(?key, "deserializing value");
	T::deserialize(Deserializer {
		schema,
		node: key,
		input: value,
		depth: AllowedDepth::default(),
	})
}

/// Deserialize `T` from a JSON string holding `schema`'s node at `key`,
/// parsing it into an owned [`Value`] first. `T` cannot borrow from `json`
/// through this path; use [`from_value`] for zero-copy deserialization from
/// an already-parsed tree.
pub fn from_str<T: de::DeserializeOwned>(schema: &Schema, key: SchemaKey, json: &str) -> Result<T, DeError> {
	tracing::trace!(?key, bytes = json.len(), "deserializing value from JSON text");
	let value: Value = serde_json::from_str(json).map_err(|e| DeError::invalid_encoding(0, e.to_string()))?;
	T::deserialize(Deserializer {
		schema,
		node: key,
		input: &value,
		depth: AllowedDepth::default(),
	})
}

/// Materialize a field or union default value (§4.8's `to_object<T>()`)
/// against the schema node it is attached to.
pub fn default_value_to<T: de::DeserializeOwned>(
	schema: &Schema,
	key: SchemaKey,
	default: &ObjectDefaultValue,
) -> Result<T, DeError> {
	T::deserialize(Deserializer {
		schema,
		node: key,
		input: default.raw(),
		depth: AllowedDepth::default(),
	})
}

#[derive(Clone, Copy)]
pub(crate) struct Deserializer<'de, 's: 'de> {
	pub(crate) schema: &'s Schema,
	pub(crate) node: SchemaKey,
	pub(crate) input: &'de Value,
	pub(crate) depth: AllowedDepth,
}

impl<'de, 's: 'de> Deserializer<'de, 's> {
	fn child(self, node: SchemaKey, input: &'de Value) -> Result<Self, DeError> {
		Ok(Self {
			schema: self.schema,
			node,
			input,
			depth: self.depth.dec()?,
		})
	}

	fn type_(&self) -> &'s RegularType {
		&self.schema[self.node].type_
	}

	fn logical_type(&self) -> Option<&'s LogicalType> {
		self.schema[self.node].logical_type.as_ref()
	}

	fn nullable_union_value_variant(&self) -> Option<SchemaKey> {
		match self.type_() {
			RegularType::Union(u) if u.variants.len() == 2 => {
				let null = u.variants.iter().find(|&&v| matches!(self.schema[v].type_, RegularType::Null));
				let other = u.variants.iter().find(|&&v| !matches!(self.schema[v].type_, RegularType::Null));
				match (null, other) {
					(Some(_), Some(&other)) => Some(other),
					_ => None,
				}
			}
			_ => None,
		}
	}

	fn discriminator(&self, key: SchemaKey) -> String {
		match self.schema[key].type_.as_named() {
			Some(name) => name.fully_qualified_name().to_owned(),
			None => self.schema[key].type_.type_token().to_owned(),
		}
	}

	fn invalid(&self, message: impl Into<String>) -> DeError {
		DeError::invalid_encoding(0, message)
	}

	/// Look up a union's variant by its wire discriminator, for the
	/// `{"<discriminator>": value}` shape of §4.7.
	fn union_variant_by_discriminator(&self, variants: &[SchemaKey], discriminator: &str) -> Option<(usize, SchemaKey)> {
		variants
			.iter()
			.enumerate()
			.find(|&(_, &v)| self.discriminator(v) == discriminator)
			.map(|(i, &v)| (i, v))
	}

	fn decode_bytes_like(&self, s: &str) -> Result<Vec<u8>, DeError> {
		iso_8859_1_to_bytes(s).map_err(|message| self.invalid(message))
	}
}

impl<'de, 's: 'de> de::Deserializer<'de> for Deserializer<'de, 's> {
	type Error = DeError;

	fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DeError> {
		match (self.type_(), self.logical_type(), self.input) {
			(RegularType::Null, _, Value::Null) => visitor.visit_unit(),
			(RegularType::Boolean, _, Value::Bool(b)) => visitor.visit_bool(*b),
			(RegularType::Int, _, Value::Number(n)) => {
				let v = n.as_i64().ok_or_else(|| self.invalid("expected an integer"))?;
				let v = i32::try_from(v).map_err(|_| self.invalid(format!("{v} does not fit in an Avro `int`")))?;
				visitor.visit_i32(v)
			}
			(RegularType::Long, _, Value::Number(n)) => {
				visitor.visit_i64(n.as_i64().ok_or_else(|| self.invalid("expected a 64-bit integer"))?)
			}
			(RegularType::Float, _, Value::Number(n)) => {
				visitor.visit_f32(n.as_f64().ok_or_else(|| self.invalid("expected a number"))? as f32)
			}
			(RegularType::Double, _, Value::Number(n)) => {
				visitor.visit_f64(n.as_f64().ok_or_else(|| self.invalid("expected a number"))?)
			}
			(RegularType::String, Some(LogicalType::Uuid), Value::String(s)) => {
				let uuid: uuid::Uuid = s
					.parse()
					.map_err(|_| self.invalid(format!("`{s}` is not a canonical UUID string")))?;
				visitor.visit_string(uuid.hyphenated().to_string())
			}
			(RegularType::String, _, Value::String(s)) => visitor.visit_str(s),
			(RegularType::Enum(e), _, Value::String(s)) => {
				if !e.symbols.iter().any(|sym| sym == s) {
					return Err(self.invalid(format!("`{s}` is not a symbol of enum `{}`", e.name)));
				}
				visitor.visit_str(s)
			}
			(RegularType::Bytes, Some(LogicalType::Decimal { scale, .. }), Value::String(s)) => {
				let bytes = self.decode_bytes_like(s)?;
				let decimal = super::unscaled_bytes_to_decimal(&bytes, *scale).map_err(|m| self.invalid(m))?;
				visitor.visit_str(&decimal.to_string())
			}
			(RegularType::Fixed(f), Some(LogicalType::Decimal { scale, .. }), Value::String(s)) => {
				let bytes = self.decode_bytes_like(s)?;
				if bytes.len() != f.size {
					return Err(self.invalid(format!("fixed `{}` expects {} bytes, got {}", f.name, f.size, bytes.len())));
				}
				let decimal = super::unscaled_bytes_to_decimal(&bytes, *scale).map_err(|m| self.invalid(m))?;
				visitor.visit_str(&decimal.to_string())
			}
			(RegularType::Bytes, _, Value::String(s)) => visitor.visit_byte_buf(self.decode_bytes_like(s)?),
			(RegularType::Fixed(f), _, Value::String(s)) => {
				let bytes = self.decode_bytes_like(s)?;
				if bytes.len() != f.size {
					return Err(self.invalid(format!("fixed `{}` expects {} bytes, got {}", f.name, f.size, bytes.len())));
				}
				visitor.visit_byte_buf(bytes)
			}
			(RegularType::Array(a), _, Value::Array(items)) => {
				visitor.visit_seq(ArraySeqAccess::new(self.schema, a.items, self.depth.dec()?, items))
			}
			(RegularType::Map(m), _, Value::Object(obj)) => {
				visitor.visit_map(ObjectMapAccess::new(self.schema, m.values, self.depth.dec()?, obj))
			}
			(RegularType::Record(r), _, Value::Object(obj)) => visitor.visit_map(RecordMapAccess::new(
				self.schema,
				self.node,
				&r.fields,
				self.depth.dec()?,
				obj,
			)),
			(RegularType::Union(u), _, Value::Null) if u.variants.iter().any(|&v| matches!(self.schema[v].type_, RegularType::Null)) => {
				visitor.visit_unit()
			}
			(RegularType::Union(u), _, Value::Object(obj)) => {
				let (discriminator, inner) = obj
					.iter()
					.next()
					.ok_or_else(|| self.invalid("union member object has no entries"))?;
				let (_, variant) = self
					.union_variant_by_discriminator(&u.variants, discriminator)
					.ok_or_else(|| self.invalid("Unknown union member."))?;
				self.child(variant, inner)?.deserialize_any(visitor)
			}
			(schema_type, _, input) => Err(self.invalid(format!(
				"cannot deserialize a `{}` JSON value into a `{}` schema node",
				json_kind(input),
				schema_type.type_token()
			))),
		}
	}

	fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DeError> {
		match self.nullable_union_value_variant() {
			Some(variant) => match self.input {
				Value::Null => visitor.visit_none(),
				Value::Object(obj) if obj.len() == 1 => {
					let (_, inner) = obj.iter().next().unwrap();
					visitor.visit_some(self.child(variant, inner)?)
				}
				_ => Err(self.invalid("expected `null` or a single-entry union object")),
			},
			None => match self.input {
				Value::Null if matches!(self.type_(), RegularType::Null) => visitor.visit_none(),
				_ => visitor.visit_some(self),
			},
		}
	}

	fn deserialize_tuple<V: Visitor<'de>>(self, len: usize, visitor: V) -> Result<V::Value, DeError> {
		if (len == 3 || len == 2) && self.logical_type() == Some(&LogicalType::Duration) {
			let Value::String(s) = self.input else {
				return Err(self.invalid("expected a duration-encoded string"));
			};
			let bytes = self.decode_bytes_like(s)?;
			if bytes.len() != 12 {
				return Err(self.invalid(format!("duration expects 12 bytes, got {}", bytes.len())));
			}
			if len == 3 {
				return visitor.visit_seq(DurationSeqAccess::new(&bytes));
			}
			// `len == 2`: the host only wants (days, millis) — a lossy
			// time-span view that cannot represent a nonzero `months`.
			let months = u32::from_le_bytes(bytes[0..4].try_into().unwrap());
			if months != 0 {
				return Err(DeError::duration_months_overflow());
			}
			let days = u32::from_le_bytes(bytes[4..8].try_into().unwrap());
			let millis = u32::from_le_bytes(bytes[8..12].try_into().unwrap());
			return visitor.visit_seq(TimeSpanSeqAccess::new(days, millis));
		}
		self.deserialize_seq(visitor)
	}

	fn deserialize_tuple_struct<V: Visitor<'de>>(
		self,
		_name: &'static str,
		len: usize,
		visitor: V,
	) -> Result<V::Value, DeError> {
		self.deserialize_tuple(len, visitor)
	}

	fn deserialize_enum<V: Visitor<'de>>(
		self,
		_name: &'static str,
		_variants: &'static [&'static str],
		visitor: V,
	) -> Result<V::Value, DeError> {
		match self.type_() {
			RegularType::Enum(e) => {
				let Value::String(s) = self.input else {
					return Err(self.invalid("expected an enum symbol string"));
				};
				if !e.symbols.iter().any(|sym| sym == s) {
					return Err(self.invalid(format!("`{s}` is not a symbol of enum `{}`", e.name)));
				}
				visitor.visit_enum(SymbolEnumAccess::new(s))
			}
			RegularType::Union(u) => match self.input {
				Value::Null => {
					let (index, _) = u
						.variants
						.iter()
						.enumerate()
						.find(|&(_, &v)| matches!(self.schema[v].type_, RegularType::Null))
						.ok_or_else(|| self.invalid("union has no `null` member"))?;
					visitor.visit_enum(UnionEnumAccess::new(self, index, None))
				}
				Value::Object(obj) if obj.len() == 1 => {
					let (discriminator, inner) = obj.iter().next().unwrap();
					let (index, variant) = self
						.union_variant_by_discriminator(&u.variants, discriminator)
						.ok_or_else(|| self.invalid("Unknown union member."))?;
					visitor.visit_enum(UnionEnumAccess::new(self.child(variant, inner)?, index, Some(inner)))
				}
				_ => Err(self.invalid("expected `null` or a single-entry union object")),
			},
			other => Err(self.invalid(format!("cannot deserialize a `{}` schema node as an enum", other.type_token()))),
		}
	}

	fn deserialize_struct<V: Visitor<'de>>(
		self,
		_name: &'static str,
		_fields: &'static [&'static str],
		visitor: V,
	) -> Result<V::Value, DeError> {
		match self.type_() {
			RegularType::Record(r) => {
				let Value::Object(obj) = self.input else {
					return Err(self.invalid("expected a JSON object for a record"));
				};
				visitor.visit_map(RecordMapAccess::new(self.schema, self.node, &r.fields, self.depth.dec()?, obj))
			}
			_ => self.deserialize_any(visitor),
		}
	}

	fn deserialize_newtype_struct<V: Visitor<'de>>(self, _name: &'static str, visitor: V) -> Result<V::Value, DeError> {
		visitor.visit_newtype_struct(self)
	}

	fn deserialize_ignored_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DeError> {
		self.deserialize_any(visitor)
	}

	serde::forward_to_deserialize_any! {
		bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
		bytes byte_buf unit unit_struct seq map identifier
	}
}

fn json_kind(v: &Value) -> &'static str {
	match v {
		Value::Null => "null",
		Value::Bool(_) => "bool",
		Value::Number(_) => "number",
		Value::String(_) => "string",
		Value::Array(_) => "array",
		Value::Object(_) => "object",
	}
}
