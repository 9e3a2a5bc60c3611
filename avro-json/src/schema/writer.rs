//! JSON schema writer (§4.3): full form and Parsing Canonical Form, with
//! named-schema reuse/conflict detection shared by both.

use hashbrown::HashMap;
use serde_json::{json, Value};

use super::canonical_form;
use super::{LogicalType, Name, RegularType, Schema, SchemaKey};

/// Errors raised while serializing a [`Schema`] to JSON (family 2b: writer).
#[derive(Debug, thiserror::Error)]
pub enum WriteSchemaError {
	#[error("cannot write schema: {message}")]
	UnsupportedSchema { message: String },
	#[error("conflicting definition for name `{name}`: a different schema with this name was already written")]
	ConflictingName { name: String },
}

impl WriteSchemaError {
	fn conflicting_name(name: &Name) -> Self {
		Self::ConflictingName {
			name: name.fully_qualified_name().to_owned(),
		}
	}
}

/// Tracks which named schemas have already been emitted in this writing
/// session, so later occurrences write only the bare name (§4.3
/// "Named-schema reuse").
#[derive(Debug, Default)]
pub struct NamesWritten {
	entries: HashMap<String, SchemaKey>,
}

pub(crate) enum NameStatus {
	FirstWrite,
	AlreadyWritten,
}

impl NamesWritten {
	pub fn new() -> Self {
		Self::default()
	}

	pub(crate) fn check(
		&mut self,
		name: &Name,
		schema: &Schema,
		key: SchemaKey,
	) -> Result<NameStatus, WriteSchemaError> {
		match self.entries.get(name.fully_qualified_name()) {
			Some(&existing) if existing == key || schema.equivalent(existing, schema, key) => {
				Ok(NameStatus::AlreadyWritten)
			}
			Some(_) => Err(WriteSchemaError::conflicting_name(name)),
			None => {
				self.entries.insert(name.fully_qualified_name().to_owned(), key);
				Ok(NameStatus::FirstWrite)
			}
		}
	}
}

/// Write `schema`'s `root` node as full-form JSON text, with a fresh
/// [`NamesWritten`] cache.
pub fn write(schema: &Schema, root: SchemaKey) -> Result<String, WriteSchemaError> {
	write_string(schema, root, &mut NamesWritten::new())
}

/// Write `schema`'s `root` node as full-form JSON text, reusing `names`
/// across multiple calls so schemas sharing named types across documents
/// still detect conflicts.
pub fn write_string(schema: &Schema, root: SchemaKey, names: &mut NamesWritten) -> Result<String, WriteSchemaError> {
	tracing::debug!(root_kind = schema[root].type_.type_token(), "writing schema");
	let value = node_to_value(schema, root, names)?;
	Ok(serde_json::to_string(&value).expect("serde_json::Value always serializes"))
}

/// Write `schema`'s `root` node in Parsing Canonical Form (§4.3, §6).
pub fn write_canonical(schema: &Schema, root: SchemaKey) -> Result<String, WriteSchemaError> {
	write_canonical_with_names(schema, root, &mut NamesWritten::new())
}

pub fn write_canonical_with_names(
	schema: &Schema,
	root: SchemaKey,
	names: &mut NamesWritten,
) -> Result<String, WriteSchemaError> {
	canonical_form::write_canonical(schema, root, names)
}

/// The 64-bit Rabin fingerprint of `schema`'s canonical form (the
/// "CRC-64-AVRO" algorithm from the Avro specification), used across the
/// ecosystem to identify a schema by hash.
pub fn canonical_form_rabin_fingerprint(schema: &Schema, root: SchemaKey) -> Result<i64, WriteSchemaError> {
	let canonical = write_canonical(schema, root)?;
	Ok(rabin_fingerprint(canonical.as_bytes()))
}

const EMPTY: i64 = -4513414715797952619; // 0xc15d213aa4d7a795

fn fingerprint_table() -> &'static [i64; 256] {
	static TABLE: std::sync::OnceLock<[i64; 256]> = std::sync::OnceLock::new();
	TABLE.get_or_init(|| {
		let mut table = [0i64; 256];
		for (i, slot) in table.iter_mut().enumerate() {
			let mut fp = i as i64;
			for _ in 0..8 {
				fp = if fp & 1 != 0 { (fp >> 1) ^ EMPTY } else { fp >> 1 };
			}
			*slot = fp;
		}
		table
	})
}

fn rabin_fingerprint(buf: &[u8]) -> i64 {
	let table = fingerprint_table();
	let mut fp = EMPTY;
	for &b in buf {
		fp = (fp >> 8) ^ table[((fp ^ i64::from(b)) & 0xff) as usize];
	}
	fp
}

fn logical_type_fields(logical_type: &LogicalType) -> Vec<(&'static str, Value)> {
	let mut fields = vec![("logicalType", Value::String(logical_type.name().to_owned()))];
	if let LogicalType::Decimal { precision, scale } = logical_type {
		fields.push(("precision", json!(precision)));
		fields.push(("scale", json!(scale)));
	}
	fields
}

fn named_attrs(map: &mut serde_json::Map<String, Value>, name: &Name, aliases: &[String], doc: Option<&str>) {
	map.insert("name".to_owned(), Value::String(name.name().to_owned()));
	if let Some(ns) = name.namespace() {
		map.insert("namespace".to_owned(), Value::String(ns.to_owned()));
	}
	if !aliases.is_empty() {
		map.insert(
			"aliases".to_owned(),
			Value::Array(aliases.iter().cloned().map(Value::String).collect()),
		);
	}
	if let Some(doc) = doc {
		map.insert("doc".to_owned(), Value::String(doc.to_owned()));
	}
}

fn node_to_value(schema: &Schema, key: SchemaKey, names: &mut NamesWritten) -> Result<Value, WriteSchemaError> {
	let node = &schema[key];
	if let Some(name) = node.type_.as_named() {
		if let NameStatus::AlreadyWritten = names.check(name, schema, key)? {
			return Ok(Value::String(name.fully_qualified_name().to_owned()));
		}
	}
	let value = match &node.type_ {
		RegularType::Null
		| RegularType::Boolean
		| RegularType::Int
		| RegularType::Long
		| RegularType::Float
		| RegularType::Double
		| RegularType::Bytes
		| RegularType::String => match &node.logical_type {
			None => Value::String(node.type_.type_token().to_owned()),
			Some(lt) => {
				let mut map = serde_json::Map::new();
				map.insert("type".to_owned(), Value::String(node.type_.type_token().to_owned()));
				for (k, v) in logical_type_fields(lt) {
					map.insert(k.to_owned(), v);
				}
				Value::Object(map)
			}
		},
		RegularType::Array(a) => {
			json!({"type": "array", "items": node_to_value(schema, a.items, names)?})
		}
		RegularType::Map(m) => {
			json!({"type": "map", "values": node_to_value(schema, m.values, names)?})
		}
		RegularType::Union(u) => Value::Array(
			u.variants
				.iter()
				.map(|&v| node_to_value(schema, v, names))
				.collect::<Result<_, _>>()?,
		),
		RegularType::Enum(e) => {
			let mut map = serde_json::Map::new();
			map.insert("type".to_owned(), Value::String("enum".to_owned()));
			named_attrs(&mut map, &e.name, &e.aliases, e.doc.as_deref());
			map.insert(
				"symbols".to_owned(),
				Value::Array(e.symbols.iter().cloned().map(Value::String).collect()),
			);
			Value::Object(map)
		}
		RegularType::Fixed(f) => {
			let mut map = serde_json::Map::new();
			map.insert("type".to_owned(), Value::String("fixed".to_owned()));
			named_attrs(&mut map, &f.name, &f.aliases, None);
			map.insert("size".to_owned(), json!(f.size));
			if let Some(lt) = &node.logical_type {
				for (k, v) in logical_type_fields(lt) {
					map.insert(k.to_owned(), v);
				}
			}
			Value::Object(map)
		}
		RegularType::Record(r) => {
			let mut map = serde_json::Map::new();
			map.insert("type".to_owned(), Value::String("record".to_owned()));
			named_attrs(&mut map, &r.name, &r.aliases, r.doc.as_deref());
			let fields = r
				.fields
				.iter()
				.map(|field| {
					let mut fmap = serde_json::Map::new();
					fmap.insert("name".to_owned(), Value::String(field.name.clone()));
					fmap.insert("type".to_owned(), node_to_value(schema, field.type_, names)?);
					if let Some(doc) = &field.doc {
						fmap.insert("doc".to_owned(), Value::String(doc.clone()));
					}
					if let Some(default) = &field.default {
						fmap.insert("default".to_owned(), default.raw().clone());
					}
					Ok(Value::Object(fmap))
				})
				.collect::<Result<_, WriteSchemaError>>()?;
			map.insert("fields".to_owned(), Value::Array(fields));
			Value::Object(map)
		}
	};
	Ok(value)
}
