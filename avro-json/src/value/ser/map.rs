use serde::ser::{self, Serialize};
use serde_json::{Map, Value};

use crate::schema::{Schema, SchemaKey};

use super::super::allowed_depth::AllowedDepth;
use super::super::error::SerError;
use super::Serializer;

/// Avro `map` keys are always strings (§3); `serialize_key` routes through
/// [`MapKeySerializer`] so a non-string host key fails immediately instead of
/// being coerced.
pub(crate) struct MapSerializer<'s> {
	schema: &'s Schema,
	values: SchemaKey,
	depth: AllowedDepth,
	collected: Map<String, Value>,
	pending_key: Option<String>,
}

impl<'s> MapSerializer<'s> {
	pub(crate) fn new(schema: &'s Schema, values: SchemaKey, depth: AllowedDepth) -> Self {
		Self {
			schema,
			values,
			depth,
			collected: Map::new(),
			pending_key: None,
		}
	}
}

impl<'s> ser::SerializeMap for MapSerializer<'s> {
	type Ok = Value;
	type Error = SerError;

	fn serialize_key<T: Serialize + ?Sized>(&mut self, key: &T) -> Result<(), SerError> {
		let key = key.serialize(MapKeySerializer)?;
		self.pending_key = Some(key);
		Ok(())
	}

	fn serialize_value<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), SerError> {
		let key = self
			.pending_key
			.take()
			.ok_or_else(|| SerError::unsupported_type("serialize_value called before serialize_key"))?;
		let child = Serializer {
			schema: self.schema,
			node: self.values,
			depth: self.depth,
		};
		self.collected.insert(key, value.serialize(child)?);
		Ok(())
	}

	fn end(self) -> Result<Value, SerError> {
		Ok(Value::Object(self.collected))
	}
}

struct MapKeySerializer;

macro_rules! key_unsupported {
	($name:ident, $t:ty) => {
		fn $name(self, _v: $t) -> Result<String, SerError> {
			Err(SerError::unsupported_type("map keys must be strings"))
		}
	};
}

impl ser::Serializer for MapKeySerializer {
	type Ok = String;
	type Error = SerError;
	type SerializeSeq = ser::Impossible<String, SerError>;
	type SerializeTuple = ser::Impossible<String, SerError>;
	type SerializeTupleStruct = ser::Impossible<String, SerError>;
	type SerializeTupleVariant = ser::Impossible<String, SerError>;
	type SerializeMap = ser::Impossible<String, SerError>;
	type SerializeStruct = ser::Impossible<String, SerError>;
	type SerializeStructVariant = ser::Impossible<String, SerError>;

	fn serialize_str(self, v: &str) -> Result<String, SerError> {
		Ok(v.to_owned())
	}

	fn collect_str<T: std::fmt::Display + ?Sized>(self, value: &T) -> Result<String, SerError> {
		Ok(value.to_string())
	}

	key_unsupported!(serialize_bool, bool);
	key_unsupported!(serialize_i8, i8);
	key_unsupported!(serialize_i16, i16);
	key_unsupported!(serialize_i32, i32);
	key_unsupported!(serialize_i64, i64);
	key_unsupported!(serialize_u8, u8);
	key_unsupported!(serialize_u16, u16);
	key_unsupported!(serialize_u32, u32);
	key_unsupported!(serialize_u64, u64);
	key_unsupported!(serialize_f32, f32);
	key_unsupported!(serialize_f64, f64);
	key_unsupported!(serialize_char, char);
	key_unsupported!(serialize_bytes, &[u8]);

	fn serialize_none(self) -> Result<String, SerError> {
		Err(SerError::unsupported_type("map keys must be strings"))
	}
	fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> Result<String, SerError> {
		value.serialize(self)
	}
	fn serialize_unit(self) -> Result<String, SerError> {
		Err(SerError::unsupported_type("map keys must be strings"))
	}
	fn serialize_unit_struct(self, _name: &'static str) -> Result<String, SerError> {
		Err(SerError::unsupported_type("map keys must be strings"))
	}
	fn serialize_unit_variant(self, _n: &'static str, _i: u32, variant: &'static str) -> Result<String, SerError> {
		Ok(variant.to_owned())
	}
	fn serialize_newtype_struct<T: Serialize + ?Sized>(self, _name: &'static str, value: &T) -> Result<String, SerError> {
		value.serialize(self)
	}
	fn serialize_newtype_variant<T: Serialize + ?Sized>(
		self,
		_n: &'static str,
		_i: u32,
		_v: &'static str,
		_value: &T,
	) -> Result<String, SerError> {
		Err(SerError::unsupported_type("map keys must be strings"))
	}
	fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq, SerError> {
		Err(SerError::unsupported_type("map keys must be strings"))
	}
	fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple, SerError> {
		Err(SerError::unsupported_type("map keys must be strings"))
	}
	fn serialize_tuple_struct(self, _name: &'static str, _len: usize) -> Result<Self::SerializeTupleStruct, SerError> {
		Err(SerError::unsupported_type("map keys must be strings"))
	}
	fn serialize_tuple_variant(
		self,
		_n: &'static str,
		_i: u32,
		_v: &'static str,
		_len: usize,
	) -> Result<Self::SerializeTupleVariant, SerError> {
		Err(SerError::unsupported_type("map keys must be strings"))
	}
	fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap, SerError> {
		Err(SerError::unsupported_type("map keys must be strings"))
	}
	fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<Self::SerializeStruct, SerError> {
		Err(SerError::unsupported_type("map keys must be strings"))
	}
	fn serialize_struct_variant(
		self,
		_n: &'static str,
		_i: u32,
		_v: &'static str,
		_len: usize,
	) -> Result<Self::SerializeStructVariant, SerError> {
		Err(SerError::unsupported_type("map keys must be strings"))
	}
}
