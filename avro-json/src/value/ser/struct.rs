use serde::ser::{self, Serialize};
use serde_json::{Map, Value};

use crate::schema::{RegularType, Schema, SchemaKey};

use super::super::allowed_depth::AllowedDepth;
use super::super::error::SerError;
use super::Serializer;

/// Host struct fields are matched against [`crate::schema::RecordField`]s by
/// exact name; a host field with no matching schema field is silently
/// dropped (it has nowhere to go), while a schema field with no matching
/// host field is only an error once the record is known to be incomplete,
/// at [`StructSerializer::end`].
pub(crate) struct StructSerializer<'s> {
	schema: &'s Schema,
	record: SchemaKey,
	depth: AllowedDepth,
	collected: Map<String, Value>,
}

impl<'s> StructSerializer<'s> {
	pub(crate) fn new(schema: &'s Schema, record: SchemaKey, depth: AllowedDepth) -> Self {
		Self {
			schema,
			record,
			depth,
			collected: Map::new(),
		}
	}

	fn fields(&self) -> &'s [crate::schema::RecordField] {
		match &self.schema[self.record].type_ {
			RegularType::Record(r) => &r.fields,
			_ => &[],
		}
	}
}

impl<'s> ser::SerializeStruct for StructSerializer<'s> {
	type Ok = Value;
	type Error = SerError;

	fn serialize_field<T: Serialize + ?Sized>(&mut self, key: &'static str, value: &T) -> Result<(), SerError> {
		let Some(field) = self.fields().iter().find(|f| f.name == key) else {
			return Ok(());
		};
		let child = Serializer {
			schema: self.schema,
			node: field.type_,
			depth: self.depth,
		};
		self.collected.insert(field.name.clone(), value.serialize(child)?);
		Ok(())
	}

	fn skip_field(&mut self, _key: &'static str) -> Result<(), SerError> {
		Ok(())
	}

	fn end(self) -> Result<Value, SerError> {
		let record_name = match &self.schema[self.record].type_ {
			RegularType::Record(r) => r.name.fully_qualified_name().to_owned(),
			_ => String::new(),
		};
		for field in self.fields() {
			if !self.collected.contains_key(&field.name) && field.default.is_none() {
				return Err(SerError::unsupported_type(format!(
					"record `{record_name}` is missing required field `{}`",
					field.name
				)));
			}
		}
		Ok(Value::Object(self.collected))
	}
}
