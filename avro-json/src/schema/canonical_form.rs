//! Parsing Canonical Form (§4.3, §6): hand-built to control the exact,
//! spec-mandated object key order (`name, type, fields, symbols, items,
//! values, size`), which a generic `serde_json::Value` tree (alphabetically
//! key-sorted by default) cannot express directly.

use super::writer::{NameStatus, NamesWritten, WriteSchemaError};
use super::{RegularType, Schema, SchemaKey};

pub(crate) fn write_canonical(
	schema: &Schema,
	root: SchemaKey,
	names: &mut NamesWritten,
) -> Result<String, WriteSchemaError> {
	let mut out = String::new();
	write_node(schema, root, names, &mut out)?;
	Ok(out)
}

fn write_json_string(out: &mut String, s: &str) {
	out.push_str(&serde_json::to_string(s).expect("a &str always serializes to a JSON string"));
}

fn write_node(
	schema: &Schema,
	key: SchemaKey,
	names: &mut NamesWritten,
	out: &mut String,
) -> Result<(), WriteSchemaError> {
	let node = &schema[key];
	match &node.type_ {
		// Logical types degrade to their bare underlying token: a primitive's
		// canonical form never depends on `logical_type`.
		RegularType::Null => out.push_str("\"null\""),
		RegularType::Boolean => out.push_str("\"boolean\""),
		RegularType::Int => out.push_str("\"int\""),
		RegularType::Long => out.push_str("\"long\""),
		RegularType::Float => out.push_str("\"float\""),
		RegularType::Double => out.push_str("\"double\""),
		RegularType::Bytes => out.push_str("\"bytes\""),
		RegularType::String => out.push_str("\"string\""),
		RegularType::Array(a) => {
			out.push_str("{\"type\":\"array\",\"items\":");
			write_node(schema, a.items, names, out)?;
			out.push('}');
		}
		RegularType::Map(m) => {
			out.push_str("{\"type\":\"map\",\"values\":");
			write_node(schema, m.values, names, out)?;
			out.push('}');
		}
		RegularType::Union(u) => {
			out.push('[');
			for (i, &variant) in u.variants.iter().enumerate() {
				if i > 0 {
					out.push(',');
				}
				write_node(schema, variant, names, out)?;
			}
			out.push(']');
		}
		RegularType::Enum(e) => {
			if let NameStatus::AlreadyWritten = names.check(&e.name, schema, key)? {
				write_json_string(out, e.name.fully_qualified_name());
				return Ok(());
			}
			out.push_str("{\"name\":");
			write_json_string(out, e.name.fully_qualified_name());
			out.push_str(",\"type\":\"enum\",\"symbols\":[");
			for (i, symbol) in e.symbols.iter().enumerate() {
				if i > 0 {
					out.push(',');
				}
				write_json_string(out, symbol);
			}
			out.push_str("]}");
		}
		RegularType::Fixed(f) => {
			if let NameStatus::AlreadyWritten = names.check(&f.name, schema, key)? {
				write_json_string(out, f.name.fully_qualified_name());
				return Ok(());
			}
			out.push_str("{\"name\":");
			write_json_string(out, f.name.fully_qualified_name());
			out.push_str(",\"type\":\"fixed\",\"size\":");
			out.push_str(&f.size.to_string());
			out.push('}');
		}
		RegularType::Record(r) => {
			if let NameStatus::AlreadyWritten = names.check(&r.name, schema, key)? {
				write_json_string(out, r.name.fully_qualified_name());
				return Ok(());
			}
			out.push_str("{\"name\":");
			write_json_string(out, r.name.fully_qualified_name());
			out.push_str(",\"type\":\"record\",\"fields\":[");
			for (i, field) in r.fields.iter().enumerate() {
				if i > 0 {
					out.push(',');
				}
				out.push_str("{\"name\":");
				write_json_string(out, &field.name);
				out.push_str(",\"type\":");
				write_node(schema, field.type_, names, out)?;
				out.push('}');
			}
			out.push_str("]}");
		}
	}
	Ok(())
}
