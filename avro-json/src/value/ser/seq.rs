use serde::ser::{self, Serialize};
use serde_json::Value;

use crate::schema::{Schema, SchemaKey};

use super::super::allowed_depth::AllowedDepth;
use super::super::error::SerError;
use super::super::bytes_to_iso_8859_1;
use super::Serializer;

/// `SerializeSeq`/`SerializeTuple`/`SerializeTupleStruct` all funnel through
/// here; which variant is active was decided once, in
/// `Serializer::serialize_seq`/`serialize_tuple`, based on the schema node.
pub(crate) enum SeqSerializer<'s> {
	Array(ArraySeqSerializer<'s>),
	Bytes(BytesSeqSerializer<'s>),
	Duration(DurationSeqSerializer<'s>),
}

impl<'s> SeqSerializer<'s> {
	pub(crate) fn array(schema: &'s Schema, items: SchemaKey, depth: AllowedDepth, len: Option<usize>) -> Self {
		Self::Array(ArraySeqSerializer {
			schema,
			items,
			depth,
			collected: Vec::with_capacity(len.unwrap_or(0)),
		})
	}
}

pub(crate) struct ArraySeqSerializer<'s> {
	schema: &'s Schema,
	items: SchemaKey,
	depth: AllowedDepth,
	collected: Vec<Value>,
}

pub(crate) struct BytesSeqSerializer<'s> {
	outer: Serializer<'s>,
	collected: Vec<u8>,
}

impl<'s> BytesSeqSerializer<'s> {
	pub(crate) fn new(outer: Serializer<'s>) -> Self {
		Self {
			outer,
			collected: Vec::new(),
		}
	}
}

pub(crate) struct DurationSeqSerializer<'s> {
	outer: Serializer<'s>,
	collected: Vec<u32>,
}

impl<'s> DurationSeqSerializer<'s> {
	pub(crate) fn new(outer: Serializer<'s>) -> Self {
		Self {
			outer,
			collected: Vec::with_capacity(3),
		}
	}
}

struct ByteSerializer;

macro_rules! byte_from {
	($name:ident, $t:ty) => {
		fn $name(self, v: $t) -> Result<u8, SerError> {
			u8::try_from(v).map_err(|_| SerError::unsupported_type(format!("{v} does not fit in a byte")))
		}
	};
}

impl ser::Serializer for ByteSerializer {
	type Ok = u8;
	type Error = SerError;
	type SerializeSeq = ser::Impossible<u8, SerError>;
	type SerializeTuple = ser::Impossible<u8, SerError>;
	type SerializeTupleStruct = ser::Impossible<u8, SerError>;
	type SerializeTupleVariant = ser::Impossible<u8, SerError>;
	type SerializeMap = ser::Impossible<u8, SerError>;
	type SerializeStruct = ser::Impossible<u8, SerError>;
	type SerializeStructVariant = ser::Impossible<u8, SerError>;

	byte_from!(serialize_u8, u8);
	byte_from!(serialize_u16, u16);
	byte_from!(serialize_u32, u32);
	byte_from!(serialize_u64, u64);
	byte_from!(serialize_i8, i8);
	byte_from!(serialize_i16, i16);
	byte_from!(serialize_i32, i32);
	byte_from!(serialize_i64, i64);

	fn serialize_bool(self, _v: bool) -> Result<u8, SerError> {
		Err(SerError::unsupported_type("expected a byte"))
	}
	fn serialize_f32(self, _v: f32) -> Result<u8, SerError> {
		Err(SerError::unsupported_type("expected a byte"))
	}
	fn serialize_f64(self, _v: f64) -> Result<u8, SerError> {
		Err(SerError::unsupported_type("expected a byte"))
	}
	fn serialize_char(self, _v: char) -> Result<u8, SerError> {
		Err(SerError::unsupported_type("expected a byte"))
	}
	fn serialize_str(self, _v: &str) -> Result<u8, SerError> {
		Err(SerError::unsupported_type("expected a byte"))
	}
	fn serialize_bytes(self, _v: &[u8]) -> Result<u8, SerError> {
		Err(SerError::unsupported_type("expected a byte"))
	}
	fn serialize_none(self) -> Result<u8, SerError> {
		Err(SerError::unsupported_type("expected a byte"))
	}
	fn serialize_some<T: Serialize + ?Sized>(self, _v: &T) -> Result<u8, SerError> {
		Err(SerError::unsupported_type("expected a byte"))
	}
	fn serialize_unit(self) -> Result<u8, SerError> {
		Err(SerError::unsupported_type("expected a byte"))
	}
	fn serialize_unit_struct(self, _name: &'static str) -> Result<u8, SerError> {
		Err(SerError::unsupported_type("expected a byte"))
	}
	fn serialize_unit_variant(self, _n: &'static str, _i: u32, _v: &'static str) -> Result<u8, SerError> {
		Err(SerError::unsupported_type("expected a byte"))
	}
	fn serialize_newtype_struct<T: Serialize + ?Sized>(self, _name: &'static str, value: &T) -> Result<u8, SerError> {
		value.serialize(self)
	}
	fn serialize_newtype_variant<T: Serialize + ?Sized>(
		self,
		_n: &'static str,
		_i: u32,
		_v: &'static str,
		_value: &T,
	) -> Result<u8, SerError> {
		Err(SerError::unsupported_type("expected a byte"))
	}
	fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq, SerError> {
		Err(SerError::unsupported_type("expected a byte"))
	}
	fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple, SerError> {
		Err(SerError::unsupported_type("expected a byte"))
	}
	fn serialize_tuple_struct(self, _name: &'static str, _len: usize) -> Result<Self::SerializeTupleStruct, SerError> {
		Err(SerError::unsupported_type("expected a byte"))
	}
	fn serialize_tuple_variant(
		self,
		_n: &'static str,
		_i: u32,
		_v: &'static str,
		_len: usize,
	) -> Result<Self::SerializeTupleVariant, SerError> {
		Err(SerError::unsupported_type("expected a byte"))
	}
	fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap, SerError> {
		Err(SerError::unsupported_type("expected a byte"))
	}
	fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<Self::SerializeStruct, SerError> {
		Err(SerError::unsupported_type("expected a byte"))
	}
	fn serialize_struct_variant(
		self,
		_n: &'static str,
		_i: u32,
		_v: &'static str,
		_len: usize,
	) -> Result<Self::SerializeStructVariant, SerError> {
		Err(SerError::unsupported_type("expected a byte"))
	}
}

struct U32Serializer;

impl ser::Serializer for U32Serializer {
	type Ok = u32;
	type Error = SerError;
	type SerializeSeq = ser::Impossible<u32, SerError>;
	type SerializeTuple = ser::Impossible<u32, SerError>;
	type SerializeTupleStruct = ser::Impossible<u32, SerError>;
	type SerializeTupleVariant = ser::Impossible<u32, SerError>;
	type SerializeMap = ser::Impossible<u32, SerError>;
	type SerializeStruct = ser::Impossible<u32, SerError>;
	type SerializeStructVariant = ser::Impossible<u32, SerError>;

	fn serialize_u32(self, v: u32) -> Result<u32, SerError> {
		Ok(v)
	}
	fn serialize_u64(self, v: u64) -> Result<u32, SerError> {
		u32::try_from(v).map_err(|_| SerError::unsupported_type(format!("{v} does not fit in a u32")))
	}
	fn serialize_i64(self, v: i64) -> Result<u32, SerError> {
		u32::try_from(v).map_err(|_| SerError::unsupported_type(format!("{v} does not fit in a u32")))
	}
	fn serialize_i32(self, v: i32) -> Result<u32, SerError> {
		u32::try_from(v).map_err(|_| SerError::unsupported_type(format!("{v} does not fit in a u32")))
	}
	fn serialize_bool(self, _v: bool) -> Result<u32, SerError> {
		Err(SerError::unsupported_type("expected a u32"))
	}
	fn serialize_i8(self, v: i8) -> Result<u32, SerError> {
		self.serialize_i64(v.into())
	}
	fn serialize_i16(self, v: i16) -> Result<u32, SerError> {
		self.serialize_i64(v.into())
	}
	fn serialize_u8(self, v: u8) -> Result<u32, SerError> {
		Ok(v.into())
	}
	fn serialize_u16(self, v: u16) -> Result<u32, SerError> {
		Ok(v.into())
	}
	fn serialize_f32(self, _v: f32) -> Result<u32, SerError> {
		Err(SerError::unsupported_type("expected a u32"))
	}
	fn serialize_f64(self, _v: f64) -> Result<u32, SerError> {
		Err(SerError::unsupported_type("expected a u32"))
	}
	fn serialize_char(self, _v: char) -> Result<u32, SerError> {
		Err(SerError::unsupported_type("expected a u32"))
	}
	fn serialize_str(self, _v: &str) -> Result<u32, SerError> {
		Err(SerError::unsupported_type("expected a u32"))
	}
	fn serialize_bytes(self, _v: &[u8]) -> Result<u32, SerError> {
		Err(SerError::unsupported_type("expected a u32"))
	}
	fn serialize_none(self) -> Result<u32, SerError> {
		Err(SerError::unsupported_type("expected a u32"))
	}
	fn serialize_some<T: Serialize + ?Sized>(self, _v: &T) -> Result<u32, SerError> {
		Err(SerError::unsupported_type("expected a u32"))
	}
	fn serialize_unit(self) -> Result<u32, SerError> {
		Err(SerError::unsupported_type("expected a u32"))
	}
	fn serialize_unit_struct(self, _name: &'static str) -> Result<u32, SerError> {
		Err(SerError::unsupported_type("expected a u32"))
	}
	fn serialize_unit_variant(self, _n: &'static str, _i: u32, _v: &'static str) -> Result<u32, SerError> {
		Err(SerError::unsupported_type("expected a u32"))
	}
	fn serialize_newtype_struct<T: Serialize + ?Sized>(self, _name: &'static str, value: &T) -> Result<u32, SerError> {
		value.serialize(self)
	}
	fn serialize_newtype_variant<T: Serialize + ?Sized>(
		self,
		_n: &'static str,
		_i: u32,
		_v: &'static str,
		_value: &T,
	) -> Result<u32, SerError> {
		Err(SerError::unsupported_type("expected a u32"))
	}
	fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq, SerError> {
		Err(SerError::unsupported_type("expected a u32"))
	}
	fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple, SerError> {
		Err(SerError::unsupported_type("expected a u32"))
	}
	fn serialize_tuple_struct(self, _name: &'static str, _len: usize) -> Result<Self::SerializeTupleStruct, SerError> {
		Err(SerError::unsupported_type("expected a u32"))
	}
	fn serialize_tuple_variant(
		self,
		_n: &'static str,
		_i: u32,
		_v: &'static str,
		_len: usize,
	) -> Result<Self::SerializeTupleVariant, SerError> {
		Err(SerError::unsupported_type("expected a u32"))
	}
	fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap, SerError> {
		Err(SerError::unsupported_type("expected a u32"))
	}
	fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<Self::SerializeStruct, SerError> {
		Err(SerError::unsupported_type("expected a u32"))
	}
	fn serialize_struct_variant(
		self,
		_n: &'static str,
		_i: u32,
		_v: &'static str,
		_len: usize,
	) -> Result<Self::SerializeStructVariant, SerError> {
		Err(SerError::unsupported_type("expected a u32"))
	}
}

impl<'s> ser::SerializeSeq for SeqSerializer<'s> {
	type Ok = Value;
	type Error = SerError;

	fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), SerError> {
		match self {
			Self::Array(a) => {
				let child = Serializer {
					schema: a.schema,
					node: a.items,
					depth: a.depth,
				};
				a.collected.push(value.serialize(child)?);
			}
			Self::Bytes(b) => b.collected.push(value.serialize(ByteSerializer)?),
			Self::Duration(d) => d.collected.push(value.serialize(U32Serializer)?),
		}
		Ok(())
	}

	fn end(self) -> Result<Value, SerError> {
		match self {
			Self::Array(a) => Ok(Value::Array(a.collected)),
			Self::Bytes(b) => finish_bytes(b.outer, b.collected),
			Self::Duration(d) => finish_duration(d.outer, d.collected),
		}
	}
}

impl<'s> ser::SerializeTuple for SeqSerializer<'s> {
	type Ok = Value;
	type Error = SerError;

	fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), SerError> {
		ser::SerializeSeq::serialize_element(self, value)
	}

	fn end(self) -> Result<Value, SerError> {
		ser::SerializeSeq::end(self)
	}
}

impl<'s> ser::SerializeTupleStruct for SeqSerializer<'s> {
	type Ok = Value;
	type Error = SerError;

	fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), SerError> {
		ser::SerializeSeq::serialize_element(self, value)
	}

	fn end(self) -> Result<Value, SerError> {
		ser::SerializeSeq::end(self)
	}
}

fn finish_bytes(outer: Serializer<'_>, bytes: Vec<u8>) -> Result<Value, SerError> {
	use crate::schema::RegularType;
	if let RegularType::Fixed(f) = outer.type_() {
		if bytes.len() != f.size {
			return Err(SerError::unsupported_type(format!(
				"fixed `{}` expects {} bytes, got {}",
				f.name,
				f.size,
				bytes.len()
			)));
		}
	}
	Ok(Value::String(bytes_to_iso_8859_1(&bytes)))
}

fn finish_duration(_outer: Serializer<'_>, parts: Vec<u32>) -> Result<Value, SerError> {
	let [months, days, millis]: [u32; 3] = parts
		.try_into()
		.map_err(|_| SerError::unsupported_type("duration must have exactly 3 components"))?;
	let mut bytes = Vec::with_capacity(12);
	bytes.extend_from_slice(&months.to_le_bytes());
	bytes.extend_from_slice(&days.to_le_bytes());
	bytes.extend_from_slice(&millis.to_le_bytes());
	Ok(Value::String(bytes_to_iso_8859_1(&bytes)))
}
