//! Bring automatic Avro schema generation to [`avro_json`]
//!
//! See the [`#[derive(BuildSchema)]`](derive@BuildSchema) documentation for
//! more information.

pub use avro_json;

pub use avro_json_derive_macros::*;

use std::any::TypeId;

use avro_json::schema::{Array, LogicalType, Map, Name, RegularType, Schema, SchemaError, SchemaKey, SchemaNode, Union};

/// We can automatically build a schema for this type (can be `derive`d).
///
/// This trait can be derived using
/// [`#[derive(BuildSchema)]`](derive@BuildSchema).
pub trait BuildSchema {
	/// Build a [`Schema`] for this type.
	fn schema() -> Result<Schema, SchemaError> {
		let mut builder = SchemaBuilder::default();
		let root = builder.find_or_build::<Self>();
		let mut schema = builder.schema;
		schema.set_root(root);
		Ok(schema)
	}

	/// Largely internal method to build the schema. Registers the schema
	/// within the builder.
	///
	/// This does not check if this type already exists in the builder, so it
	/// should never be called directly (instead, use
	/// [`SchemaBuilder::find_or_build`]).
	///
	/// The [`SchemaNode`] for this type must end up at the key that was
	/// reserved for it (the arena index [`SchemaBuilder::find_or_build`]
	/// records before calling this), and its non-already-built dependencies
	/// are pushed after.
	fn append_schema(builder: &mut SchemaBuilder) -> SchemaKey;

	/// Largely internal type used by
	/// [`#[derive(BuildSchema)]`](derive@BuildSchema).
	///
	/// The [`TypeId`] of this type is used to look up whether the
	/// [`SchemaNode`] for this type has already been built in the
	/// [`SchemaBuilder`].
	///
	/// This indirection lets several distinct Rust types (a newtype and the
	/// type it wraps, say) share the same node.
	type TypeLookup: std::any::Any;
}

/// Largely internal type used by [`#[derive(BuildSchema)]`](derive@BuildSchema)
///
/// You should typically not use this directly.
#[derive(Default)]
#[non_exhaustive]
pub struct SchemaBuilder {
	/// The schema under construction. The first node pushed becomes the
	/// eventual root once [`BuildSchema::schema`] sets it.
	pub schema: Schema,
	/// Maps a [`BuildSchema::TypeLookup`]'s [`TypeId`] to the key of the
	/// node already built for it, so a type referenced from several places
	/// (or from itself, recursively) only ever contributes one node.
	pub already_built_types: avro_json::schema::AlreadyBuiltTypes,
}

impl SchemaBuilder {
	/// Reserve a slot in the arena for a composite type whose own node can
	/// only be finished after its dependencies (which may need to reference
	/// this same slot) have been built.
	pub fn reserve(&mut self) -> SchemaKey {
		self.schema.add_node(SchemaNode {
			type_: RegularType::Null,
			logical_type: None,
		})
	}

	/// If the schema for `T` has already been built, return its key;
	/// otherwise build it (and its dependencies) and return the newly
	/// assigned key.
	pub fn find_or_build<T: BuildSchema + ?Sized>(&mut self) -> SchemaKey {
		match self.already_built_types.entry(TypeId::of::<T::TypeLookup>()) {
			hashbrown::hash_map::Entry::Occupied(entry) => *entry.get(),
			hashbrown::hash_map::Entry::Vacant(entry) => {
				let schema_key = SchemaKey::from_idx(self.schema.nodes().len());
				entry.insert(schema_key);
				let built_key = T::append_schema(self);
				debug_assert_eq!(built_key, schema_key, "append_schema must build at the reserved key");
				schema_key
			}
		}
	}

	/// Build a fresh node for `T`, bypassing memoization. Only useful as the
	/// base of a field-local override (a logical type, a renamed node);
	/// using this instead of [`find_or_build`](Self::find_or_build) for
	/// anything else would duplicate a node needlessly.
	pub fn build_duplicate<T: BuildSchema + ?Sized>(&mut self) -> SchemaKey {
		let schema_key = SchemaKey::from_idx(self.schema.nodes().len());
		let built_key = T::append_schema(self);
		debug_assert_eq!(built_key, schema_key, "append_schema must build at the reserved key");
		schema_key
	}

	/// Build a field-local variant of `T`'s schema annotated with
	/// `logical_type`; `name_override` is only consulted if the node turns
	/// out to be named.
	pub fn build_logical_type<T: BuildSchema + ?Sized>(
		&mut self,
		logical_type: LogicalType,
		name_override: impl FnOnce() -> String,
	) -> Result<SchemaKey, SchemaError> {
		let key = self.build_duplicate::<T>();
		self.schema.set_logical_type(key, Some(logical_type))?;
		if let Some(name) = self.schema.get_mut(key).and_then(|n| n.type_.name_mut()) {
			*name = Name::from_fully_qualified_name(name_override())?;
		}
		Ok(key)
	}
}

macro_rules! impl_primitive {
	($($ty:ty, $variant:ident;)+) => {
		$(
			impl BuildSchema for $ty {
				fn append_schema(builder: &mut SchemaBuilder) -> SchemaKey {
					builder.schema.push_primitive(RegularType::$variant)
				}
				type TypeLookup = Self;
			}
		)*
	};
}
impl_primitive!(
	(), Null;
	bool, Boolean;
	i32, Int;
	i64, Long;
	f32, Float;
	f64, Double;
	String, String;
	Vec<u8>, Bytes;
);

macro_rules! impl_forward {
	($($ty:ty, $to:ty;)+) => {
		$(
			impl BuildSchema for $ty {
				fn append_schema(builder: &mut SchemaBuilder) -> SchemaKey {
					<$to as BuildSchema>::append_schema(builder)
				}
				type TypeLookup = <$to as BuildSchema>::TypeLookup;
			}
		)*
	};
}
impl_forward! {
	str, String;
	[u8], Vec<u8>;
	u16, i32;
	u32, i64;
	u64, i64;
	i8, i32;
	i16, i32;
	usize, i64;
}

macro_rules! impl_ptr {
	($($($ty_path:ident)::+,)+) => {
		$(
			impl<T: BuildSchema + ?Sized> BuildSchema for $($ty_path)::+<T> {
				fn append_schema(builder: &mut SchemaBuilder) -> SchemaKey {
					<T as BuildSchema>::append_schema(builder)
				}
				type TypeLookup = T::TypeLookup;
			}
		)*
	};
}
impl_ptr! {
	Box,
	std::sync::Arc,
	std::rc::Rc,
	std::cell::RefCell,
	std::cell::Cell,
}
impl<T: BuildSchema + ?Sized> BuildSchema for &'_ T {
	fn append_schema(builder: &mut SchemaBuilder) -> SchemaKey {
		<T as BuildSchema>::append_schema(builder)
	}
	type TypeLookup = T::TypeLookup;
}

impl<T: BuildSchema> BuildSchema for Vec<T> {
	fn append_schema(builder: &mut SchemaBuilder) -> SchemaKey {
		let reserved = builder.reserve();
		let items = builder.find_or_build::<T>();
		builder.schema[reserved] = SchemaNode {
			type_: RegularType::Array(Array { items }),
			logical_type: None,
		};
		reserved
	}
	type TypeLookup = Vec<T::TypeLookup>;
}

impl<T: BuildSchema> BuildSchema for [T] {
	fn append_schema(builder: &mut SchemaBuilder) -> SchemaKey {
		<Vec<T> as BuildSchema>::append_schema(builder)
	}
	type TypeLookup = <Vec<T> as BuildSchema>::TypeLookup;
}

impl<T: BuildSchema> BuildSchema for Option<T> {
	fn append_schema(builder: &mut SchemaBuilder) -> SchemaKey {
		let reserved = builder.reserve();
		let null = builder.find_or_build::<()>();
		let some = builder.find_or_build::<T>();
		builder.schema[reserved] = SchemaNode {
			type_: RegularType::Union(Union {
				variants: vec![null, some],
			}),
			logical_type: None,
		};
		reserved
	}
	type TypeLookup = Option<T::TypeLookup>;
}

impl<const N: usize> BuildSchema for [u8; N] {
	fn append_schema(builder: &mut SchemaBuilder) -> SchemaKey {
		builder.schema.push_fixed(
			Name::from_fully_qualified_name(format!("u8_array_{N}")).expect("generated name is always valid"),
			vec![],
			N,
		)
	}
	type TypeLookup = Self;
}

impl<V: BuildSchema> BuildSchema for hashbrown::HashMap<String, V> {
	fn append_schema(builder: &mut SchemaBuilder) -> SchemaKey {
		let reserved = builder.reserve();
		let values = builder.find_or_build::<V>();
		builder.schema[reserved] = SchemaNode {
			type_: RegularType::Map(Map { values }),
			logical_type: None,
		};
		reserved
	}
	type TypeLookup = hashbrown::HashMap<String, V::TypeLookup>;
}

impl<V: BuildSchema> BuildSchema for std::collections::HashMap<String, V> {
	fn append_schema(builder: &mut SchemaBuilder) -> SchemaKey {
		<hashbrown::HashMap<String, V> as BuildSchema>::append_schema(builder)
	}
	type TypeLookup = <hashbrown::HashMap<String, V> as BuildSchema>::TypeLookup;
}

impl<V: BuildSchema> BuildSchema for std::collections::BTreeMap<String, V> {
	fn append_schema(builder: &mut SchemaBuilder) -> SchemaKey {
		<hashbrown::HashMap<String, V> as BuildSchema>::append_schema(builder)
	}
	type TypeLookup = <hashbrown::HashMap<String, V> as BuildSchema>::TypeLookup;
}

#[doc(hidden)]
/// Used by the `#[derive(BuildSchema)]` macro to generate a unique schema
/// name for a monomorphization of a generic type.
pub fn hash_type_id(struct_name: &mut String, type_id: TypeId) {
	use std::fmt::Write;
	use std::hash::{Hash as _, Hasher as _};
	let mut hasher = std::collections::hash_map::DefaultHasher::new();
	type_id.hash(&mut hasher);
	write!(struct_name, "_{:016x}", hasher.finish()).unwrap();
}
