//! JSON schema reader (§4.2): priority-dispatch parsing of Avro JSON schema
//! text into a [`Schema`] arena, with a name cache for identity-preserving
//! reuse of both named and anonymous schemas.

use hashbrown::HashMap;
use serde_json::Value;

use super::{LogicalType, Name, ObjectDefaultValue, RecordField, RegularType, Schema, SchemaError, SchemaKey};

/// Errors raised while parsing Avro JSON schema text (family 2a: reader).
#[derive(Debug, thiserror::Error)]
pub enum ReadSchemaError {
	#[error("invalid JSON: {0}")]
	InvalidJson(#[from] serde_json::Error),
	#[error("invalid schema data: {message}")]
	InvalidData { message: String },
	#[error("unknown schema `{name}`")]
	UnknownSchema { name: String },
	#[error(transparent)]
	Schema(#[from] SchemaError),
}

impl ReadSchemaError {
	fn invalid_data(message: impl Into<String>) -> Self {
		Self::InvalidData { message: message.into() }
	}

	fn unknown_schema(name: impl Into<String>) -> Self {
		Self::UnknownSchema { name: name.into() }
	}
}

/// Maps full names, aliases and synthetic anonymous-schema keys to the
/// [`SchemaKey`] that was built for them (§4.2 "Cache keys").
#[derive(Debug, Default)]
pub struct NameCache {
	entries: HashMap<String, SchemaKey>,
}

impl NameCache {
	pub fn new() -> Self {
		Self::default()
	}

	fn get(&self, key: &str) -> Option<SchemaKey> {
		self.entries.get(key).copied()
	}

	/// Register a named definition; fails if this exact key was already
	/// registered in this session (§4.2 "definition already read").
	fn register(&mut self, key: String, schema_key: SchemaKey) -> Result<(), ReadSchemaError> {
		if self.entries.contains_key(&key) {
			return Err(ReadSchemaError::invalid_data(format!("definition already read: {key}")));
		}
		self.entries.insert(key, schema_key);
		Ok(())
	}

	/// Reuse-or-insert for anonymous schemas: never an error, since multiple
	/// siblings are allowed to structurally share e.g. `"int"` or
	/// `array<int>`.
	fn get_or_insert_anonymous(&mut self, key: String, make: impl FnOnce() -> SchemaKey) -> SchemaKey {
		if let Some(existing) = self.entries.get(&key) {
			return *existing;
		}
		let schema_key = make();
		self.entries.insert(key, schema_key);
		schema_key
	}
}

/// Parse `json_text` into a fresh [`Schema`] with a fresh [`NameCache`] and
/// no enclosing scope.
pub fn read(json_text: &str) -> Result<Schema, ReadSchemaError> {
	tracing::debug!(bytes = json_text.len(), "parsing schema");
	let value: Value = serde_json::from_str(json_text)?;
	let mut schema = Schema::new();
	let mut cache = NameCache::new();
	let (root, _) = read_keyed(&value, &mut schema, &mut cache, None)?;
	schema.set_root(root);
	tracing::debug!(nodes = schema.nodes().len(), "schema parsed");
	Ok(schema)
}

/// Parse an already-decoded [`Value`] into `schema`, reusing `cache` and
/// qualifying unqualified names against `scope`. Returns the key of the
/// node that was built (or reused).
pub fn read_value(
	value: &Value,
	schema: &mut Schema,
	cache: &mut NameCache,
	scope: Option<&str>,
) -> Result<SchemaKey, ReadSchemaError> {
	read_keyed(value, schema, cache, scope).map(|(key, _)| key)
}

/// Like [`read_value`] but also returns the cache key this value's node is
/// (or would be) registered under, so callers building a composite key
/// (`array<...>`, `map<...>`, `[...]`) can do so without re-deriving a
/// child's identity from scratch.
fn read_keyed(
	value: &Value,
	schema: &mut Schema,
	cache: &mut NameCache,
	scope: Option<&str>,
) -> Result<(SchemaKey, String), ReadSchemaError> {
	match value {
		Value::String(token) => read_primitive_or_ref(token, schema, cache, scope),
		Value::Array(variants) => read_union(variants, schema, cache, scope),
		Value::Object(obj) => read_object(obj, schema, cache, scope),
		_ => Err(ReadSchemaError::invalid_data(
			"expected a schema: a string, an array (union) or an object",
		)),
	}
}

fn primitive_regular_type(token: &str) -> Option<RegularType> {
	Some(match token {
		"null" => RegularType::Null,
		"boolean" => RegularType::Boolean,
		"int" => RegularType::Int,
		"long" => RegularType::Long,
		"float" => RegularType::Float,
		"double" => RegularType::Double,
		"bytes" => RegularType::Bytes,
		"string" => RegularType::String,
		_ => return None,
	})
}

fn qualify(token: &str, scope: Option<&str>) -> String {
	match scope {
		Some(scope) if !scope.is_empty() && !token.contains('.') => format!("{scope}.{token}"),
		_ => token.to_owned(),
	}
}

fn read_primitive_or_ref(
	token: &str,
	schema: &mut Schema,
	cache: &mut NameCache,
	scope: Option<&str>,
) -> Result<(SchemaKey, String), ReadSchemaError> {
	if let Some(regular_type) = primitive_regular_type(token) {
		let key = cache.get_or_insert_anonymous(token.to_owned(), || schema.push_primitive(regular_type));
		return Ok((key, token.to_owned()));
	}
	// §4.2 "Reference resolution": qualify against scope, then fall back to
	// the unqualified token.
	let qualified = qualify(token, scope);
	if let Some(key) = cache.get(&qualified) {
		return Ok((key, qualified));
	}
	if qualified != token {
		if let Some(key) = cache.get(token) {
			return Ok((key, token.to_owned()));
		}
	}
	Err(ReadSchemaError::unknown_schema(token))
}

fn read_union(
	variants_json: &[Value],
	schema: &mut Schema,
	cache: &mut NameCache,
	scope: Option<&str>,
) -> Result<(SchemaKey, String), ReadSchemaError> {
	let mut variants = Vec::with_capacity(variants_json.len());
	let mut variant_keys = Vec::with_capacity(variants_json.len());
	for variant_json in variants_json {
		let (key, cache_key) = read_keyed(variant_json, schema, cache, scope)?;
		variants.push(key);
		variant_keys.push(cache_key);
	}
	let composite = format!("[{}]", variant_keys.join(","));
	if let Some(existing) = cache.get(&composite) {
		return Ok((existing, composite));
	}
	let key = schema.push_union(variants)?;
	cache.get_or_insert_anonymous(composite.clone(), || key);
	Ok((key, composite))
}

fn resolve_full_name(
	name_field: &str,
	namespace_field: Option<&str>,
	scope: Option<&str>,
) -> Result<Name, ReadSchemaError> {
	let name = if name_field.contains('.') {
		Name::from_fully_qualified_name(name_field)?
	} else if let Some(ns) = namespace_field.filter(|s| !s.is_empty()) {
		Name::new(name_field, Some(ns))?
	} else {
		Name::new(name_field, scope)?
	};
	Ok(name)
}

fn parse_aliases(obj: &serde_json::Map<String, Value>, scope_for_aliases: Option<&str>) -> Result<Vec<String>, ReadSchemaError> {
	let Some(aliases_json) = obj.get("aliases") else {
		return Ok(Vec::new());
	};
	let aliases_json = aliases_json
		.as_array()
		.ok_or_else(|| ReadSchemaError::invalid_data("\"aliases\" must be an array of strings"))?;
	aliases_json
		.iter()
		.map(|alias_json| {
			let alias = alias_json
				.as_str()
				.ok_or_else(|| ReadSchemaError::invalid_data("alias must be a string"))?;
			Ok(qualify(alias, scope_for_aliases))
		})
		.collect()
}

fn register_name(cache: &mut NameCache, name: &Name, aliases: &[String], key: SchemaKey) -> Result<(), ReadSchemaError> {
	cache.register(name.fully_qualified_name().to_owned(), key)?;
	for alias in aliases {
		cache.register(alias.clone(), key)?;
	}
	Ok(())
}

fn read_object(
	obj: &serde_json::Map<String, Value>,
	schema: &mut Schema,
	cache: &mut NameCache,
	scope: Option<&str>,
) -> Result<(SchemaKey, String), ReadSchemaError> {
	if let Some(logical_name) = obj.get("logicalType").and_then(Value::as_str) {
		if let Some(result) = try_read_logical_type(logical_name, obj, schema, cache, scope)? {
			return Ok(result);
		}
		// Unknown/unsupported logicalType token: degrade silently to the
		// underlying type, matching Avro's forward-compatibility convention
		// for `logicalType` (readers must ignore ones they don't recognize).
	}
	match obj.get("type") {
		Some(Value::String(t)) => match t.as_str() {
			"array" => read_array(obj, schema, cache, scope),
			"map" => read_map(obj, schema, cache, scope),
			"enum" => read_enum(obj, schema, cache, scope),
			"fixed" => read_fixed(obj, schema, cache, scope),
			"record" => read_record(obj, schema, cache, scope),
			other => read_primitive_or_ref(other, schema, cache, scope),
		},
		Some(nested @ (Value::Object(_) | Value::Array(_))) => read_keyed(nested, schema, cache, scope),
		_ => Err(ReadSchemaError::invalid_data(
			"object schema is missing a string, array or object \"type\"",
		)),
	}
}

fn try_read_logical_type(
	logical_name: &str,
	obj: &serde_json::Map<String, Value>,
	schema: &mut Schema,
	cache: &mut NameCache,
	scope: Option<&str>,
) -> Result<Option<(SchemaKey, String)>, ReadSchemaError> {
	let logical_type = match logical_name {
		"date" => LogicalType::Date,
		"time-millis" => LogicalType::TimeMillis,
		"time-micros" => LogicalType::TimeMicros,
		"timestamp-millis" => LogicalType::TimestampMillis,
		"timestamp-micros" => LogicalType::TimestampMicros,
		"duration" => LogicalType::Duration,
		"uuid" => LogicalType::Uuid,
		"decimal" => {
			let precision = obj
				.get("precision")
				.and_then(Value::as_u64)
				.ok_or_else(|| ReadSchemaError::invalid_data("decimal logical type requires integer \"precision\""))?
				as u32;
			let scale = obj.get("scale").and_then(Value::as_u64).unwrap_or(0) as u32;
			LogicalType::Decimal { precision, scale }
		}
		_ => return Ok(None),
	};
	let without_logical = match obj.get("type") {
		Some(Value::String(t)) => match t.as_str() {
			"array" => read_array(obj, schema, cache, scope)?,
			"map" => read_map(obj, schema, cache, scope)?,
			"fixed" => read_fixed(obj, schema, cache, scope)?,
			other => read_primitive_or_ref(other, schema, cache, scope)?,
		},
		Some(nested @ (Value::Object(_) | Value::Array(_))) => read_keyed(nested, schema, cache, scope)?,
		_ => {
			return Err(ReadSchemaError::invalid_data(
				"object with a \"logicalType\" is missing its underlying \"type\"",
			))
		}
	};
	let (underlying_key, underlying_cache_key) = without_logical;
	schema.set_logical_type(underlying_key, Some(logical_type.clone()))?;
	let suffix = match &logical_type {
		LogicalType::Decimal { precision, scale } => format!("decimal({precision},{scale})"),
		other => other.name().to_owned(),
	};
	let composite = format!("{underlying_cache_key}!{suffix}");
	Ok(Some((underlying_key, composite)))
}

fn read_array(
	obj: &serde_json::Map<String, Value>,
	schema: &mut Schema,
	cache: &mut NameCache,
	scope: Option<&str>,
) -> Result<(SchemaKey, String), ReadSchemaError> {
	let items_json = obj
		.get("items")
		.ok_or_else(|| ReadSchemaError::invalid_data("array schema is missing \"items\""))?;
	let (items_key, items_cache_key) = read_keyed(items_json, schema, cache, scope)?;
	let composite = format!("array<{items_cache_key}>");
	if let Some(existing) = cache.get(&composite) {
		return Ok((existing, composite));
	}
	let key = schema.push_array(items_key);
	cache.get_or_insert_anonymous(composite.clone(), || key);
	Ok((key, composite))
}

fn read_map(
	obj: &serde_json::Map<String, Value>,
	schema: &mut Schema,
	cache: &mut NameCache,
	scope: Option<&str>,
) -> Result<(SchemaKey, String), ReadSchemaError> {
	let values_json = obj
		.get("values")
		.ok_or_else(|| ReadSchemaError::invalid_data("map schema is missing \"values\""))?;
	let (values_key, values_cache_key) = read_keyed(values_json, schema, cache, scope)?;
	let composite = format!("map<{values_cache_key}>");
	if let Some(existing) = cache.get(&composite) {
		return Ok((existing, composite));
	}
	let key = schema.push_map(values_key);
	cache.get_or_insert_anonymous(composite.clone(), || key);
	Ok((key, composite))
}

fn required_name_field<'a>(obj: &'a serde_json::Map<String, Value>) -> Result<&'a str, ReadSchemaError> {
	obj.get("name")
		.and_then(Value::as_str)
		.ok_or_else(|| ReadSchemaError::invalid_data("named schema is missing string \"name\""))
}

fn read_enum(
	obj: &serde_json::Map<String, Value>,
	schema: &mut Schema,
	cache: &mut NameCache,
	scope: Option<&str>,
) -> Result<(SchemaKey, String), ReadSchemaError> {
	let namespace_field = obj.get("namespace").and_then(Value::as_str);
	let name = resolve_full_name(required_name_field(obj)?, namespace_field, scope)?;
	let aliases = parse_aliases(obj, name.namespace())?;
	let doc = obj.get("doc").and_then(Value::as_str).map(str::to_owned);
	let symbols_json = obj
		.get("symbols")
		.and_then(Value::as_array)
		.ok_or_else(|| ReadSchemaError::invalid_data("enum schema is missing \"symbols\" array"))?;
	let symbols = symbols_json
		.iter()
		.map(|s| {
			s.as_str()
				.map(str::to_owned)
				.ok_or_else(|| ReadSchemaError::invalid_data("enum symbol must be a string"))
		})
		.collect::<Result<Vec<_>, _>>()?;
	let key = schema.push_enum(name.clone(), aliases.clone(), doc, symbols)?;
	register_name(cache, &name, &aliases, key)?;
	Ok((key, name.fully_qualified_name().to_owned()))
}

fn read_fixed(
	obj: &serde_json::Map<String, Value>,
	schema: &mut Schema,
	cache: &mut NameCache,
	scope: Option<&str>,
) -> Result<(SchemaKey, String), ReadSchemaError> {
	let namespace_field = obj.get("namespace").and_then(Value::as_str);
	let name = resolve_full_name(required_name_field(obj)?, namespace_field, scope)?;
	let aliases = parse_aliases(obj, name.namespace())?;
	let size = obj
		.get("size")
		.and_then(Value::as_u64)
		.ok_or_else(|| ReadSchemaError::invalid_data("fixed schema is missing integer \"size\""))? as usize;
	let key = schema.push_fixed(name.clone(), aliases.clone(), size);
	register_name(cache, &name, &aliases, key)?;
	Ok((key, name.fully_qualified_name().to_owned()))
}

fn read_record(
	obj: &serde_json::Map<String, Value>,
	schema: &mut Schema,
	cache: &mut NameCache,
	scope: Option<&str>,
) -> Result<(SchemaKey, String), ReadSchemaError> {
	let namespace_field = obj.get("namespace").and_then(Value::as_str);
	let name = resolve_full_name(required_name_field(obj)?, namespace_field, scope)?;
	let aliases = parse_aliases(obj, name.namespace())?;
	let doc = obj.get("doc").and_then(Value::as_str).map(str::to_owned);
	let child_scope = name.namespace().map(str::to_owned);

	// Push the shell and register its name BEFORE reading fields, so a
	// field type that refers back to this record's own name (directly or
	// transitively) resolves through the cache instead of failing
	// `UnknownSchema` (§3 "Cycles are permitted only through Record").
	let record_key = schema.push_record_shell(name.clone(), aliases.clone(), doc);
	register_name(cache, &name, &aliases, record_key)?;

	let fields_json = obj
		.get("fields")
		.and_then(Value::as_array)
		.ok_or_else(|| ReadSchemaError::invalid_data("record schema is missing \"fields\" array"))?;
	for field_json in fields_json {
		let field_obj = field_json
			.as_object()
			.ok_or_else(|| ReadSchemaError::invalid_data("record field must be an object"))?;
		let field_name = field_obj
			.get("name")
			.and_then(Value::as_str)
			.ok_or_else(|| ReadSchemaError::invalid_data("record field is missing string \"name\""))?
			.to_owned();
		let field_type_json = field_obj
			.get("type")
			.ok_or_else(|| ReadSchemaError::invalid_data("record field is missing \"type\""))?;
		let field_type_key = read_value(field_type_json, schema, cache, child_scope.as_deref())?;
		let field_doc = field_obj.get("doc").and_then(Value::as_str).map(str::to_owned);
		let default = field_obj.get("default").cloned().map(ObjectDefaultValue::new);
		schema.add_record_field(
			record_key,
			RecordField {
				name: field_name,
				type_: field_type_key,
				doc: field_doc,
				default,
			},
		)?;
	}
	Ok((record_key, name.fully_qualified_name().to_owned()))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn primitive_round_trip() {
		let schema = read("\"int\"").unwrap();
		assert!(matches!(schema.root_node().type_, RegularType::Int));
	}

	#[test]
	fn nested_record() {
		let schema = read(
			r#"{"type":"record","name":"a.B","fields":[{"name":"c","type":{"type":"record","name":"a.D","fields":[{"name":"e","type":"string"}]}}]}"#,
		)
		.unwrap();
		match &schema.root_node().type_ {
			RegularType::Record(r) => {
				assert_eq!(r.name.fully_qualified_name(), "a.B");
				assert_eq!(r.fields.len(), 1);
				assert_eq!(r.fields[0].name, "c");
			}
			_ => panic!("expected record"),
		}
	}

	#[test]
	fn union_with_null() {
		let schema = read(r#"["null","string"]"#).unwrap();
		match &schema.root_node().type_ {
			RegularType::Union(u) => assert_eq!(u.variants.len(), 2),
			_ => panic!("expected union"),
		}
	}

	#[test]
	fn recursive_record_builds() {
		let schema = read(r#"{"type":"record","name":"N","fields":[{"name":"next","type":["null","N"]}]}"#).unwrap();
		match &schema.root_node().type_ {
			RegularType::Record(r) => {
				assert_eq!(r.fields[0].name, "next");
				match &schema[r.fields[0].type_].type_ {
					RegularType::Union(u) => assert_eq!(u.variants.len(), 2),
					_ => panic!("expected union"),
				}
			}
			_ => panic!("expected record"),
		}
	}

	#[test]
	fn duplicate_definition_fails() {
		let err = read(
			r#"{"type":"record","name":"a.R","fields":[
				{"name":"x","type":{"type":"record","name":"a.Inner","fields":[{"name":"v","type":"int"}]}},
				{"name":"y","type":{"type":"record","name":"a.Inner","fields":[{"name":"v","type":"string"}]}}
			]}"#,
		)
		.unwrap_err();
		assert!(matches!(err, ReadSchemaError::InvalidData { .. }));
	}

	#[test]
	fn unknown_reference_fails() {
		let err = read(r#"{"type":"record","name":"a.R","fields":[{"name":"x","type":"NoSuchType"}]}"#).unwrap_err();
		assert!(matches!(err, ReadSchemaError::UnknownSchema { .. }));
	}

	#[test]
	fn decimal_logical_type() {
		let schema = read(r#"{"type":"bytes","logicalType":"decimal","precision":10,"scale":2}"#).unwrap();
		assert!(matches!(schema.root_node().type_, RegularType::Bytes));
		assert_eq!(
			schema.root_node().logical_type,
			Some(LogicalType::Decimal { precision: 10, scale: 2 })
		);
	}

	#[test]
	fn anonymous_primitives_reuse_same_key() {
		let schema = read(r#"{"type":"record","name":"a.R","fields":[{"name":"x","type":"int"},{"name":"y","type":"int"}]}"#).unwrap();
		match &schema.root_node().type_ {
			RegularType::Record(r) => assert_eq!(r.fields[0].type_, r.fields[1].type_),
			_ => panic!("expected record"),
		}
	}
}
