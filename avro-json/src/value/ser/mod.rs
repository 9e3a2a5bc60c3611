//! The value serializer (components F/G): a [`serde::Serializer`] whose
//! `Ok` is a [`serde_json::Value`], parameterized by the current
//! `(&Schema, SchemaKey)` pair instead of by a fixed wire format.
//!
//! Each schema kind accepts the handful of `serialize_*` hints a host value
//! of the "natural" Rust shape for that kind would call (§4.5's "priority
//! dispatch", realized here as which method gets called rather than as an
//! explicit case list, since `serde`'s derive already performs that
//! dispatch for us). Recursion into children goes through a fresh
//! [`Serializer`] scoped to the child's [`SchemaKey`], guarded by
//! [`AllowedDepth`] (§9).

use serde::ser::{self, Serialize};
use serde_json::{Map, Number, Value};

use crate::schema::{LogicalType, RegularType, Schema, SchemaKey};

use super::allowed_depth::AllowedDepth;
use super::error::SerError;
use super::{bytes_to_iso_8859_1, decimal_to_unscaled_bytes};

mod map;
mod seq;
mod r#struct;

use map::MapSerializer;
use seq::{BytesSeqSerializer, SeqSerializer};
use r#struct::StructSerializer;

/// Serialize `value` against `schema`'s node at `key`, producing the Avro
/// JSON encoding of the value as a [`serde_json::Value`] tree.
pub fn to_value<T: Serialize + ?Sized>(schema: &Schema, key: SchemaKey, value: &T) -> Result<Value, SerError> {
	tracing::trace!(?key, "serializing value");
	value.serialize(Serializer {
		schema,
		node: key,
		depth: AllowedDepth::default(),
	})
}

#[derive(Clone, Copy)]
pub(crate) struct Serializer<'s> {
	pub(crate) schema: &'s Schema,
	pub(crate) node: SchemaKey,
	pub(crate) depth: AllowedDepth,
}

impl<'s> Serializer<'s> {
	fn child(self, node: SchemaKey) -> Result<Self, SerError> {
		Ok(Self {
			schema: self.schema,
			node,
			depth: self.depth.dec()?,
		})
	}

	fn type_(&self) -> &'s RegularType {
		&self.schema[self.node].type_
	}

	fn logical_type(&self) -> Option<&'s LogicalType> {
		self.schema[self.node].logical_type.as_ref()
	}

	/// The union this serializer is scoped to, if any, along with its
	/// single non-null variant when the union is a plain nullable union
	/// (the only shape an `Option<T>` host value can address, per §4.7
	/// "Null+single-value unions").
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

	fn wrap_union_member(&self, key: SchemaKey, value: Value) -> Value {
		let mut map = Map::with_capacity(1);
		map.insert(self.discriminator(key), value);
		Value::Object(map)
	}

	fn unsupported(&self, what: &str) -> SerError {
		SerError::unsupported_type(format!(
			"cannot serialize a {what} into a `{}` schema node",
			self.type_().type_token()
		))
	}
}

macro_rules! forward_int {
	($name:ident, $t:ty) => {
		fn $name(self, v: $t) -> Result<Value, SerError> {
			serialize_int(self, i64::from(v))
		}
	};
}

fn serialize_int(ser: Serializer<'_>, v: i64) -> Result<Value, SerError> {
	match ser.type_() {
		RegularType::Int => {
			if v < i64::from(i32::MIN) || v > i64::from(i32::MAX) {
				return Err(SerError::unsupported_type(format!("{v} does not fit in an Avro `int`")));
			}
			Ok(Value::Number(Number::from(v)))
		}
		RegularType::Long => Ok(Value::Number(Number::from(v))),
		other => Err(SerError::unsupported_type(format!(
			"cannot serialize an integer into a `{}` schema node",
			other.type_token()
		))),
	}
}

impl<'s> ser::Serializer for Serializer<'s> {
	type Ok = Value;
	type Error = SerError;

	type SerializeSeq = SeqSerializer<'s>;
	type SerializeTuple = SeqSerializer<'s>;
	type SerializeTupleStruct = SeqSerializer<'s>;
	type SerializeTupleVariant = ser::Impossible<Value, SerError>;
	type SerializeMap = MapSerializer<'s>;
	type SerializeStruct = StructSerializer<'s>;
	type SerializeStructVariant = ser::Impossible<Value, SerError>;

	fn serialize_bool(self, v: bool) -> Result<Value, SerError> {
		match self.type_() {
			RegularType::Boolean => Ok(Value::Bool(v)),
			_ => Err(self.unsupported("bool")),
		}
	}

	forward_int!(serialize_i8, i8);
	forward_int!(serialize_i16, i16);
	forward_int!(serialize_i32, i32);
	forward_int!(serialize_i64, i64);
	forward_int!(serialize_u8, u8);
	forward_int!(serialize_u16, u16);
	forward_int!(serialize_u32, u32);

	fn serialize_u64(self, v: u64) -> Result<Value, SerError> {
		let v =
			i64::try_from(v).map_err(|_| SerError::unsupported_type(format!("{v} does not fit in an Avro `long`")))?;
		serialize_int(self, v)
	}

	fn serialize_f32(self, v: f32) -> Result<Value, SerError> {
		self.serialize_f64(f64::from(v))
	}

	fn serialize_f64(self, v: f64) -> Result<Value, SerError> {
		match self.type_() {
			RegularType::Float | RegularType::Double => Number::from_f64(v).map(Value::Number).ok_or_else(|| {
				SerError::unsupported_type(format!("`{v}` has no JSON representation (NaN/Infinity are not valid JSON numbers)"))
			}),
			_ => Err(self.unsupported("float")),
		}
	}

	fn serialize_char(self, v: char) -> Result<Value, SerError> {
		let mut buf = [0u8; 4];
		self.serialize_str(v.encode_utf8(&mut buf))
	}

	fn serialize_str(self, v: &str) -> Result<Value, SerError> {
		match (self.type_(), self.logical_type()) {
			(RegularType::String, Some(LogicalType::Uuid)) => {
				let uuid: uuid::Uuid = v
					.parse()
					.map_err(|_| SerError::unsupported_type(format!("`{v}` is not a canonical UUID string")))?;
				Ok(Value::String(uuid.hyphenated().to_string()))
			}
			(RegularType::String, _) => Ok(Value::String(v.to_owned())),
			(RegularType::Enum(e), _) => {
				if e.symbols.iter().any(|s| s == v) {
					Ok(Value::String(v.to_owned()))
				} else {
					Err(SerError::unsupported_type(format!("`{v}` is not a symbol of enum `{}`", e.name)))
				}
			}
			(RegularType::Bytes, Some(LogicalType::Decimal { precision, scale })) => {
				decimal_str_to_value(v, *precision, *scale, None)
			}
			(RegularType::Fixed(f), Some(LogicalType::Decimal { precision, scale })) => {
				decimal_str_to_value(v, *precision, *scale, Some(f.size))
			}
			_ => Err(self.unsupported("string")),
		}
	}

	fn serialize_bytes(self, v: &[u8]) -> Result<Value, SerError> {
		match (self.type_(), self.logical_type()) {
			(RegularType::Bytes, None) => Ok(Value::String(bytes_to_iso_8859_1(v))),
			(RegularType::Fixed(f), None) => {
				if v.len() != f.size {
					return Err(SerError::unsupported_type(format!(
						"fixed `{}` expects {} bytes, got {}",
						f.name,
						f.size,
						v.len()
					)));
				}
				Ok(Value::String(bytes_to_iso_8859_1(v)))
			}
			_ => Err(self.unsupported("byte slice")),
		}
	}

	fn serialize_none(self) -> Result<Value, SerError> {
		match self.type_() {
			RegularType::Null => Ok(Value::Null),
			RegularType::Union(u) if u.variants.iter().any(|&v| matches!(self.schema[v].type_, RegularType::Null)) => {
				Ok(Value::Null)
			}
			_ => Err(SerError::unsupported_type(
				"schema has no `null` member to serialize `None` into",
			)),
		}
	}

	fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> Result<Value, SerError> {
		match self.nullable_union_value_variant() {
			Some(variant) => {
				let child = self.child(variant)?;
				let v = value.serialize(child)?;
				Ok(self.wrap_union_member(variant, v))
			}
			None => value.serialize(self),
		}
	}

	fn serialize_unit(self) -> Result<Value, SerError> {
		match self.type_() {
			RegularType::Null => Ok(Value::Null),
			_ => Err(self.unsupported("unit")),
		}
	}

	fn serialize_unit_struct(self, _name: &'static str) -> Result<Value, SerError> {
		self.serialize_unit()
	}

	fn serialize_unit_variant(
		self,
		_name: &'static str,
		variant_index: u32,
		variant: &'static str,
	) -> Result<Value, SerError> {
		match self.type_() {
			RegularType::Enum(_) => self.serialize_str(variant),
			RegularType::Union(u) => {
				let key = *u
					.variants
					.get(variant_index as usize)
					.ok_or_else(|| SerError::unsupported_type("union variant index out of range"))?;
				match self.schema[key].type_ {
					RegularType::Null => Ok(Value::Null),
					_ => self.child(key)?.serialize_unit_variant(_name, variant_index, variant),
				}
			}
			_ => Err(self.unsupported("unit variant")),
		}
	}

	fn serialize_newtype_struct<T: Serialize + ?Sized>(self, _name: &'static str, value: &T) -> Result<Value, SerError> {
		value.serialize(self)
	}

	fn serialize_newtype_variant<T: Serialize + ?Sized>(
		self,
		name: &'static str,
		variant_index: u32,
		variant: &'static str,
		value: &T,
	) -> Result<Value, SerError> {
		match self.type_() {
			RegularType::Union(u) => {
				let key = *u
					.variants
					.get(variant_index as usize)
					.ok_or_else(|| SerError::unsupported_type("union variant index out of range"))?;
				let child = self.child(key)?;
				let v = value.serialize(child)?;
				Ok(self.wrap_union_member(key, v))
			}
			_ => {
				let _ = (name, variant);
				Err(self.unsupported("newtype variant"))
			}
		}
	}

	fn serialize_seq(self, len: Option<usize>) -> Result<SeqSerializer<'s>, SerError> {
		match self.type_() {
			RegularType::Array(a) => Ok(SeqSerializer::array(self.schema, a.items, self.depth.dec()?, len)),
			RegularType::Bytes | RegularType::Fixed(_) => Ok(SeqSerializer::Bytes(BytesSeqSerializer::new(self))),
			_ => Err(self.unsupported("sequence")),
		}
	}

	fn serialize_tuple(self, len: usize) -> Result<SeqSerializer<'s>, SerError> {
		if len == 3 && self.logical_type() == Some(&LogicalType::Duration) {
			return Ok(SeqSerializer::Duration(seq::DurationSeqSerializer::new(self)));
		}
		self.serialize_seq(Some(len))
	}

	fn serialize_tuple_struct(self, _name: &'static str, len: usize) -> Result<SeqSerializer<'s>, SerError> {
		self.serialize_tuple(len)
	}

	fn serialize_tuple_variant(
		self,
		_name: &'static str,
		_variant_index: u32,
		_variant: &'static str,
		_len: usize,
	) -> Result<Self::SerializeTupleVariant, SerError> {
		Err(self.unsupported("tuple variant"))
	}

	fn serialize_map(self, _len: Option<usize>) -> Result<MapSerializer<'s>, SerError> {
		match self.type_() {
			RegularType::Map(m) => Ok(MapSerializer::new(self.schema, m.values, self.depth.dec()?)),
			_ => Err(self.unsupported("map")),
		}
	}

	fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<StructSerializer<'s>, SerError> {
		match self.type_() {
			RegularType::Record(_) => Ok(StructSerializer::new(self.schema, self.node, self.depth.dec()?)),
			_ => Err(self.unsupported("struct")),
		}
	}

	fn serialize_struct_variant(
		self,
		_name: &'static str,
		_variant_index: u32,
		_variant: &'static str,
		_len: usize,
	) -> Result<Self::SerializeStructVariant, SerError> {
		Err(self.unsupported("struct variant"))
	}

	fn collect_str<T: std::fmt::Display + ?Sized>(self, value: &T) -> Result<Value, SerError> {
		self.serialize_str(&value.to_string())
	}
}

fn decimal_str_to_value(v: &str, precision: u32, scale: u32, fixed_size: Option<usize>) -> Result<Value, SerError> {
	let decimal: rust_decimal::Decimal = v
		.parse()
		.map_err(|_| SerError::unsupported_type(format!("`{v}` is not a valid decimal")))?;
	let bytes = decimal_to_unscaled_bytes(decimal, precision, scale)
		.map_err(|message| SerError::unsupported_type(message))?;
	if let Some(size) = fixed_size {
		if bytes.len() > size {
			return Err(SerError::unsupported_type(format!(
				"decimal value does not fit in {size} bytes at scale {scale}"
			)));
		}
		let mut padded = vec![if bytes.first().is_some_and(|&b| b & 0x80 != 0) { 0xff } else { 0x00 }; size - bytes.len()];
		padded.extend_from_slice(&bytes);
		return Ok(Value::String(bytes_to_iso_8859_1(&padded)));
	}
	Ok(Value::String(bytes_to_iso_8859_1(&bytes)))
}
