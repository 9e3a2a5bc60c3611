//! The Avro schema algebra: an arena of [`SchemaNode`]s addressed by
//! [`SchemaKey`], capable of representing cyclic record graphs.
//!
//! Binary encoding is out of scope for this crate, so unlike a
//! self-referential frozen schema built for pointer-chasing performance,
//! [`Schema`] stays the plain safe arena for its whole lifetime: construction,
//! JSON parsing, JSON writing and the value codec all walk it by [`SchemaKey`].

pub mod error;
pub mod name;

mod canonical_form;
mod reader;
mod writer;

pub use self::error::SchemaError;
pub use self::name::Name;
pub use self::reader::{read, read_value, NameCache, ReadSchemaError};
pub use self::writer::{
	canonical_form_rabin_fingerprint, write, write_canonical, write_canonical_with_names, write_string,
	NamesWritten, WriteSchemaError,
};

impl std::str::FromStr for Schema {
	type Err = ReadSchemaError;
	fn from_str(json_text: &str) -> Result<Self, Self::Err> {
		self::reader::read(json_text)
	}
}

use std::collections::HashSet;
use std::ops::{Index, IndexMut};

use hashbrown::HashMap;

/// Stable index of a node within a [`Schema`] arena.
///
/// Keys are only meaningful relative to the [`Schema`] that produced them;
/// indexing a key into a different arena will panic or return an unrelated
/// node, never undefined behavior (there is no unsafe code here).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SchemaKey(u32);

impl SchemaKey {
	fn idx(self) -> usize {
		self.0 as usize
	}

	/// Build a key from a raw arena index.
	///
	/// Only meaningful once a node actually occupies that index; used by
	/// `avro_json_derive::SchemaBuilder` to predict the key a not-yet-pushed
	/// node will get.
	pub fn from_idx(idx: usize) -> Self {
		Self(idx as u32)
	}
}

/// A node in the schema arena: an underlying [`RegularType`] plus an
/// optional [`LogicalType`] annotation.
#[derive(Debug, Clone)]
pub struct SchemaNode {
	pub type_: RegularType,
	pub logical_type: Option<LogicalType>,
}

/// The schema variants that do not depend on a [`LogicalType`] annotation
/// to be meaningful.
#[derive(Debug, Clone)]
pub enum RegularType {
	Null,
	Boolean,
	Int,
	Long,
	Float,
	Double,
	Bytes,
	String,
	Array(Array),
	Map(Map),
	Union(Union),
	Record(Record),
	Enum(Enum),
	Fixed(Fixed),
}

impl RegularType {
	/// The Avro type token used as the JSON `"type"` value and as the
	/// union discriminator for unnamed schemas (§4.7).
	pub fn type_token(&self) -> &'static str {
		match self {
			Self::Null => "null",
			Self::Boolean => "boolean",
			Self::Int => "int",
			Self::Long => "long",
			Self::Float => "float",
			Self::Double => "double",
			Self::Bytes => "bytes",
			Self::String => "string",
			Self::Array(_) => "array",
			Self::Map(_) => "map",
			Self::Union(_) => "union",
			Self::Record(_) => "record",
			Self::Enum(_) => "enum",
			Self::Fixed(_) => "fixed",
		}
	}

	pub fn as_named(&self) -> Option<&Name> {
		match self {
			Self::Record(r) => Some(&r.name),
			Self::Enum(e) => Some(&e.name),
			Self::Fixed(f) => Some(&f.name),
			_ => None,
		}
	}

	/// Mutable access to this node's name, if it is a named schema.
	pub fn name_mut(&mut self) -> Option<&mut Name> {
		match self {
			Self::Record(r) => Some(&mut r.name),
			Self::Enum(e) => Some(&mut e.name),
			Self::Fixed(f) => Some(&mut f.name),
			_ => None,
		}
	}
}

#[derive(Debug, Clone)]
pub struct Array {
	pub items: SchemaKey,
}

#[derive(Debug, Clone)]
pub struct Map {
	pub values: SchemaKey,
}

#[derive(Debug, Clone)]
pub struct Union {
	pub variants: Vec<SchemaKey>,
}

#[derive(Debug, Clone)]
pub struct Enum {
	pub name: Name,
	pub aliases: Vec<String>,
	pub doc: Option<String>,
	pub symbols: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Fixed {
	pub name: Name,
	pub aliases: Vec<String>,
	pub size: usize,
}

#[derive(Debug, Clone)]
pub struct Record {
	pub name: Name,
	pub aliases: Vec<String>,
	pub doc: Option<String>,
	pub fields: Vec<RecordField>,
}

#[derive(Debug, Clone)]
pub struct RecordField {
	pub name: String,
	pub type_: SchemaKey,
	pub doc: Option<String>,
	pub default: Option<ObjectDefaultValue>,
}

/// A field or union default value, kept as raw JSON until a concrete host
/// type is known.
///
/// §4.8: "a default value wraps a raw JSON representation and a schema; it
/// exposes `to_object<T>()`". The schema half of that pair is whatever
/// [`SchemaKey`] this default is attached to (a field's type, or a union's
/// first variant); `to_object` itself is implemented in
/// [`crate::value::de::default_value_to`] once a concrete `T` and a
/// `Schema`/`SchemaKey` are both in scope.
#[derive(Debug, Clone)]
pub struct ObjectDefaultValue {
	raw: serde_json::Value,
}

impl ObjectDefaultValue {
	pub fn new(raw: serde_json::Value) -> Self {
		Self { raw }
	}

	pub fn raw(&self) -> &serde_json::Value {
		&self.raw
	}
}

/// Variants of `LogicalType` annotation (§3), each only meaningful atop a
/// specific [`RegularType`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogicalType {
	Date,
	TimeMillis,
	TimeMicros,
	TimestampMillis,
	TimestampMicros,
	Decimal { precision: u32, scale: u32 },
	Duration,
	Uuid,
}

impl LogicalType {
	pub fn name(&self) -> &'static str {
		match self {
			Self::Date => "date",
			Self::TimeMillis => "time-millis",
			Self::TimeMicros => "time-micros",
			Self::TimestampMillis => "timestamp-millis",
			Self::TimestampMicros => "timestamp-micros",
			Self::Decimal { .. } => "decimal",
			Self::Duration => "duration",
			Self::Uuid => "uuid",
		}
	}

	/// Enforce the pairing invariant from §3: "Date⇒Int; TimeMillis⇒Int;
	/// TimeMicros/Timestamp*⇒Long; Decimal⇒Bytes|Fixed{size≥1};
	/// Duration⇒Fixed{size=12}; Uuid⇒String".
	fn validate_pairing(&self, underlying: &RegularType) -> Result<(), SchemaError> {
		let ok = match self {
			Self::Date | Self::TimeMillis => matches!(underlying, RegularType::Int),
			Self::TimeMicros | Self::TimestampMillis | Self::TimestampMicros => {
				matches!(underlying, RegularType::Long)
			}
			Self::Decimal { precision, scale } => {
				if *precision < 1 || *scale > *precision {
					return Err(SchemaError::other(format!(
						"invalid decimal precision/scale: precision={precision} scale={scale}"
					)));
				}
				match underlying {
					RegularType::Bytes => true,
					RegularType::Fixed(f) => f.size >= 1,
					_ => false,
				}
			}
			Self::Duration => matches!(underlying, RegularType::Fixed(f) if f.size == 12),
			Self::Uuid => matches!(underlying, RegularType::String),
		};
		if ok {
			Ok(())
		} else {
			Err(SchemaError::other(format!(
				"logical type `{}` is not valid atop `{}`",
				self.name(),
				underlying.type_token()
			)))
		}
	}
}

/// An arena of [`SchemaNode`]s, addressed by [`SchemaKey`], with a
/// distinguished root.
///
/// Nodes are appended and never removed, so previously handed-out keys stay
/// valid for the lifetime of the arena; this is what lets a [`Record`] field
/// reference a not-yet-finished ancestor record (§3 "Ownership": "Record↔
/// Record cycles require ... an arena with indices").
#[derive(Debug, Clone)]
pub struct Schema {
	nodes: Vec<SchemaNode>,
	root: SchemaKey,
}

impl Schema {
	/// Start an empty arena. The root key is not meaningful until at least
	/// one node has been pushed and [`Schema::set_root`] called (or the
	/// first pushed node is used as root, the common case for leaf
	/// schemas).
	pub fn new() -> Self {
		Self {
			nodes: Vec::new(),
			root: SchemaKey(0),
		}
	}

	pub fn root(&self) -> SchemaKey {
		self.root
	}

	pub fn set_root(&mut self, root: SchemaKey) {
		self.root = root;
	}

	pub fn root_node(&self) -> &SchemaNode {
		&self[self.root]
	}

	/// Append a node to the arena and return the key that addresses it.
	pub fn add_node(&mut self, node: SchemaNode) -> SchemaKey {
		let key = SchemaKey(self.nodes.len() as u32);
		self.nodes.push(node);
		key
	}

	pub fn nodes(&self) -> &[SchemaNode] {
		&self.nodes
	}

	pub fn get(&self, key: SchemaKey) -> Option<&SchemaNode> {
		self.nodes.get(key.idx())
	}

	pub fn get_mut(&mut self, key: SchemaKey) -> Option<&mut SchemaNode> {
		self.nodes.get_mut(key.idx())
	}

	/// Attach (or clear) a [`LogicalType`] on `key`'s node, re-validating
	/// the pairing invariant (§3) before committing; on failure the node is
	/// left unchanged (§4.1: "either succeeds ... or fails ... and leaves
	/// state unchanged").
	pub fn set_logical_type(
		&mut self,
		key: SchemaKey,
		logical_type: Option<LogicalType>,
	) -> Result<(), SchemaError> {
		if let Some(lt) = &logical_type {
			lt.validate_pairing(&self[key].type_)?;
		}
		self[key].logical_type = logical_type;
		Ok(())
	}

	pub fn push_primitive(&mut self, type_: RegularType) -> SchemaKey {
		debug_assert!(!matches!(
			type_,
			RegularType::Array(_)
				| RegularType::Map(_) | RegularType::Union(_)
				| RegularType::Record(_)
				| RegularType::Enum(_)
				| RegularType::Fixed(_)
		));
		self.add_node(SchemaNode {
			type_,
			logical_type: None,
		})
	}

	pub fn push_array(&mut self, items: SchemaKey) -> SchemaKey {
		self.add_node(SchemaNode {
			type_: RegularType::Array(Array { items }),
			logical_type: None,
		})
	}

	pub fn push_map(&mut self, values: SchemaKey) -> SchemaKey {
		self.add_node(SchemaNode {
			type_: RegularType::Map(Map { values }),
			logical_type: None,
		})
	}

	/// §3 Invariants: "at most one of each unnamed kind; may contain
	/// multiple distinct named schemas; a union may not directly contain
	/// another union."
	pub fn push_union(&mut self, variants: Vec<SchemaKey>) -> Result<SchemaKey, SchemaError> {
		let mut seen_unnamed = HashSet::new();
		let mut seen_named = HashSet::new();
		for &v in &variants {
			let node = &self[v];
			if matches!(node.type_, RegularType::Union(_)) {
				return Err(SchemaError::other("a union may not directly contain another union"));
			}
			match node.type_.as_named() {
				Some(name) => {
					if !seen_named.insert(name.fully_qualified_name().to_owned()) {
						return Err(SchemaError::duplicate_name(name));
					}
				}
				None => {
					if !seen_unnamed.insert(node.type_.type_token()) {
						return Err(SchemaError::other(format!(
							"union contains more than one unnamed `{}` member",
							node.type_.type_token()
						)));
					}
				}
			}
		}
		Ok(self.add_node(SchemaNode {
			type_: RegularType::Union(Union { variants }),
			logical_type: None,
		}))
	}

	/// §3: "each [enum symbol] a simple identifier; duplicates ignored;
	/// ordered."
	pub fn push_enum(
		&mut self,
		name: Name,
		aliases: Vec<String>,
		doc: Option<String>,
		symbols: Vec<String>,
	) -> Result<SchemaKey, SchemaError> {
		let mut deduped = Vec::with_capacity(symbols.len());
		for symbol in symbols {
			name::validate_simple_identifier(&symbol).map_err(|_| SchemaError::invalid_symbol(&symbol))?;
			if !deduped.contains(&symbol) {
				deduped.push(symbol);
			}
		}
		Ok(self.add_node(SchemaNode {
			type_: RegularType::Enum(Enum {
				name,
				aliases,
				doc,
				symbols: deduped,
			}),
			logical_type: None,
		}))
	}

	pub fn push_fixed(&mut self, name: Name, aliases: Vec<String>, size: usize) -> SchemaKey {
		self.add_node(SchemaNode {
			type_: RegularType::Fixed(Fixed { name, aliases, size }),
			logical_type: None,
		})
	}

	/// Push an empty record shell so that self-/mutually-recursive field
	/// types can reference its key before the field list is complete; call
	/// [`Schema::add_record_field`] afterwards to populate it.
	pub fn push_record_shell(&mut self, name: Name, aliases: Vec<String>, doc: Option<String>) -> SchemaKey {
		self.add_node(SchemaNode {
			type_: RegularType::Record(Record {
				name,
				aliases,
				doc,
				fields: Vec::new(),
			}),
			logical_type: None,
		})
	}

	/// §3/§4.1: "Record fields: distinct by identity (duplicates ignored
	/// when added); ordered."
	pub fn add_record_field(&mut self, record: SchemaKey, field: RecordField) -> Result<(), SchemaError> {
		name::validate_simple_identifier(&field.name).map_err(|_| SchemaError::invalid_name(&field.name))?;
		match &mut self[record].type_ {
			RegularType::Record(r) => {
				if !r.fields.iter().any(|f| f.name == field.name) {
					r.fields.push(field);
				}
				Ok(())
			}
			other => Err(SchemaError::other(format!(
				"add_record_field called on a `{}` node",
				other.type_token()
			))),
		}
	}

	/// Structural equality up to the projection `project` applies to each
	/// node (identity for full equality, canonical-form stripping for the
	/// canonical-equivalence law of §8). Record cycles are broken by
	/// treating a previously-seen `(a, b)` key pair as trivially equal,
	/// which is sound because reaching the same pair again means the
	/// comparison has already validated everything strictly between the
	/// two occurrences.
	pub fn equivalent(&self, a: SchemaKey, other: &Schema, b: SchemaKey) -> bool {
		let mut seen = HashSet::new();
		equivalent_rec(self, a, other, b, &mut seen)
	}

	/// Full-form JSON text for `key` (§4.3).
	pub fn to_json(&self, key: SchemaKey) -> Result<String, WriteSchemaError> {
		writer::write(self, key)
	}

	/// Parsing Canonical Form JSON text for `key` (§4.3, §6).
	pub fn to_canonical_json(&self, key: SchemaKey) -> Result<String, WriteSchemaError> {
		writer::write_canonical(self, key)
	}

	/// 64-bit Rabin fingerprint of `key`'s canonical form, the standard way
	/// Avro schemas are compared/identified by hash across the ecosystem.
	pub fn canonical_form_rabin_fingerprint(&self, key: SchemaKey) -> Result<i64, WriteSchemaError> {
		writer::canonical_form_rabin_fingerprint(self, key)
	}
}

impl Default for Schema {
	fn default() -> Self {
		Self::new()
	}
}

impl Index<SchemaKey> for Schema {
	type Output = SchemaNode;
	fn index(&self, key: SchemaKey) -> &SchemaNode {
		&self.nodes[key.idx()]
	}
}

impl IndexMut<SchemaKey> for Schema {
	fn index_mut(&mut self, key: SchemaKey) -> &mut SchemaNode {
		&mut self.nodes[key.idx()]
	}
}

fn equivalent_rec(
	a_schema: &Schema,
	a: SchemaKey,
	b_schema: &Schema,
	b: SchemaKey,
	seen: &mut HashSet<(SchemaKey, SchemaKey)>,
) -> bool {
	if !seen.insert((a, b)) {
		return true;
	}
	let (an, bn) = (&a_schema[a], &b_schema[b]);
	if an.logical_type != bn.logical_type {
		return false;
	}
	use RegularType as T;
	match (&an.type_, &bn.type_) {
		(T::Null, T::Null)
		| (T::Boolean, T::Boolean)
		| (T::Int, T::Int)
		| (T::Long, T::Long)
		| (T::Float, T::Float)
		| (T::Double, T::Double)
		| (T::Bytes, T::Bytes)
		| (T::String, T::String) => true,
		(T::Array(x), T::Array(y)) => equivalent_rec(a_schema, x.items, b_schema, y.items, seen),
		(T::Map(x), T::Map(y)) => equivalent_rec(a_schema, x.values, b_schema, y.values, seen),
		(T::Union(x), T::Union(y)) => {
			x.variants.len() == y.variants.len()
				&& x.variants
					.iter()
					.zip(&y.variants)
					.all(|(&xk, &yk)| equivalent_rec(a_schema, xk, b_schema, yk, seen))
		}
		(T::Enum(x), T::Enum(y)) => {
			x.name == y.name && x.symbols == y.symbols
		}
		(T::Fixed(x), T::Fixed(y)) => x.name == y.name && x.size == y.size,
		(T::Record(x), T::Record(y)) => {
			x.name == y.name
				&& x.fields.len() == y.fields.len()
				&& x.fields.iter().zip(&y.fields).all(|(xf, yf)| {
					xf.name == yf.name && equivalent_rec(a_schema, xf.type_, b_schema, yf.type_, seen)
				})
		}
		_ => false,
	}
}

/// Memoization map built by `avro_json_derive::SchemaBuilder` (or any other
/// schema-from-host-type builder) to give recursive Rust types the same
/// arena-cycle treatment as recursive JSON schemas.
pub type AlreadyBuiltTypes = HashMap<std::any::TypeId, SchemaKey>;

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn union_rejects_nested_union() {
		let mut schema = Schema::new();
		let null = schema.push_primitive(RegularType::Null);
		let s = schema.push_primitive(RegularType::String);
		let inner = schema.push_union(vec![null, s]).unwrap();
		let int = schema.push_primitive(RegularType::Int);
		assert!(schema.push_union(vec![inner, int]).is_err());
	}

	#[test]
	fn union_rejects_duplicate_unnamed_kind() {
		let mut schema = Schema::new();
		let a = schema.push_primitive(RegularType::Int);
		let b = schema.push_primitive(RegularType::Int);
		assert!(schema.push_union(vec![a, b]).is_err());
	}

	#[test]
	fn union_allows_multiple_named() {
		let mut schema = Schema::new();
		let a = schema.push_fixed(Name::from_fully_qualified_name("a.A").unwrap(), vec![], 4);
		let b = schema.push_fixed(Name::from_fully_qualified_name("a.B").unwrap(), vec![], 4);
		assert!(schema.push_union(vec![a, b]).is_ok());
	}

	#[test]
	fn enum_symbols_deduplicated() {
		let mut schema = Schema::new();
		let key = schema
			.push_enum(
				Name::from_fully_qualified_name("a.E").unwrap(),
				vec![],
				None,
				vec!["A".into(), "B".into(), "A".into()],
			)
			.unwrap();
		match &schema[key].type_ {
			RegularType::Enum(e) => assert_eq!(e.symbols, vec!["A".to_owned(), "B".to_owned()]),
			_ => unreachable!(),
		}
	}

	#[test]
	fn record_field_duplicate_is_noop() {
		let mut schema = Schema::new();
		let int = schema.push_primitive(RegularType::Int);
		let record = schema.push_record_shell(Name::from_fully_qualified_name("a.R").unwrap(), vec![], None);
		schema
			.add_record_field(
				record,
				RecordField {
					name: "f".into(),
					type_: int,
					doc: None,
					default: None,
				},
			)
			.unwrap();
		schema
			.add_record_field(
				record,
				RecordField {
					name: "f".into(),
					type_: int,
					doc: None,
					default: None,
				},
			)
			.unwrap();
		match &schema[record].type_ {
			RegularType::Record(r) => assert_eq!(r.fields.len(), 1),
			_ => unreachable!(),
		}
	}

	#[test]
	fn decimal_rejects_scale_greater_than_precision() {
		let mut schema = Schema::new();
		let bytes = schema.push_primitive(RegularType::Bytes);
		assert!(schema
			.set_logical_type(
				bytes,
				Some(LogicalType::Decimal {
					precision: 2,
					scale: 3
				})
			)
			.is_err());
	}

	#[test]
	fn decimal_on_bytes_ok_on_boolean_rejected() {
		let mut schema = Schema::new();
		let bytes = schema.push_primitive(RegularType::Bytes);
		assert!(schema
			.set_logical_type(
				bytes,
				Some(LogicalType::Decimal {
					precision: 10,
					scale: 2
				})
			)
			.is_ok());
		let boolean = schema.push_primitive(RegularType::Boolean);
		assert!(schema
			.set_logical_type(
				boolean,
				Some(LogicalType::Decimal {
					precision: 10,
					scale: 2
				})
			)
			.is_err());
	}

	#[test]
	fn duration_requires_fixed_size_12() {
		let mut schema = Schema::new();
		let fixed12 = schema.push_fixed(Name::from_fully_qualified_name("a.F12").unwrap(), vec![], 12);
		assert!(schema.set_logical_type(fixed12, Some(LogicalType::Duration)).is_ok());
		let fixed8 = schema.push_fixed(Name::from_fully_qualified_name("a.F8").unwrap(), vec![], 8);
		assert!(schema.set_logical_type(fixed8, Some(LogicalType::Duration)).is_err());
	}

	#[test]
	fn recursive_record_equivalent_to_itself() {
		let mut schema = Schema::new();
		let null = schema.push_primitive(RegularType::Null);
		let record = schema.push_record_shell(Name::from_fully_qualified_name("N").unwrap(), vec![], None);
		let union = schema.push_union(vec![null, record]).unwrap();
		schema
			.add_record_field(
				record,
				RecordField {
					name: "next".into(),
					type_: union,
					doc: None,
					default: None,
				},
			)
			.unwrap();
		schema.set_root(record);
		assert!(schema.equivalent(record, &schema, record));
	}
}
