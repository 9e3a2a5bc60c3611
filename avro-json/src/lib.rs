//! # Getting started
//!
//! ```
//! let schema: avro_json::Schema = r#"
//! {
//! 	"namespace": "test",
//! 	"type": "record",
//! 	"name": "Test",
//! 	"fields": [
//! 		{ "name": "field", "type": "string" }
//! 	]
//! }
//! "#
//! .parse()
//! .expect("failed to parse schema");
//!
//! #[derive(serde_derive::Serialize, serde_derive::Deserialize, Debug, PartialEq)]
//! struct Test {
//! 	field: String,
//! }
//!
//! let rust_value = Test { field: "foo".to_owned() };
//!
//! let json = avro_json::value::to_string(&schema, schema.root(), &rust_value)
//! 	.expect("failed to serialize");
//! assert_eq!(json, r#"{"field":"foo"}"#);
//!
//! let round_tripped: Test = avro_json::value::from_str(&schema, schema.root(), &json)
//! 	.expect("failed to deserialize");
//! assert_eq!(round_tripped, rust_value);
//! ```
//!
//! # Deriving schema from Rust structs
//!
//! If the Rust program is the source of truth for the schema definition, the
//! [`avro-json-derive`](https://docs.rs/avro-json-derive/) crate derives a
//! [`Schema`] straight from a type definition:
//!
//! ```ignore
//! use avro_json_derive::BuildSchema;
//!
//! #[derive(BuildSchema)]
//! struct Foo {
//! 	primitives: Bar,
//! }
//!
//! #[derive(BuildSchema)]
//! struct Bar {
//! 	a: i32,
//! 	b: String,
//! }
//!
//! let schema = Foo::schema()?;
//! ```
//!
//! # Scope
//!
//! This crate implements the Avro data model and its JSON encoding of
//! values (the [specification's JSON encoding](https://avro.apache.org/docs/current/specification/#json-encoding)),
//! not the binary Avro codec or the object container file format — both are
//! out of scope here; reach for a binary-Avro crate (e.g. `serde_avro_fast`)
//! if you need those.

pub mod schema;
pub mod value;

pub use schema::Schema;
