//! Internal macros crate for the `avro-json-derive` crate
//!
//! Use [`avro-json-derive`](https://docs.rs/avro-json-derive/) instead of
//! using this crate directly.

mod build_schema;

use darling::FromDeriveInput;

#[proc_macro_derive(BuildSchema, attributes(avro_schema))]
/// Derive the ability to build an Avro schema for a type (implements
/// `BuildSchema`).
///
/// # Example
///
/// ```
/// use avro_json_derive::BuildSchema;
///
/// #[derive(BuildSchema)]
/// struct Foo {
/// 	primitives: Bar,
/// }
///
/// #[derive(BuildSchema)]
/// struct Bar {
/// 	a: i32,
/// 	b: String,
/// }
/// ```
///
/// # Enums
///
/// Unit-variant enums produce an Avro `enum`; enums whose every variant
/// carries exactly one unnamed field produce an Avro `union` of those
/// fields' schemas.
///
/// # Field attributes
///
/// `#[avro_schema(logical_type = "uuid")]`,
/// `#[avro_schema(logical_type = "decimal", precision = 9, scale = 2)]` and
/// similar annotate a field's schema with a [logical
/// type](avro_json::schema::LogicalType). `#[avro_schema(skip)]` omits a
/// field entirely.
///
/// # Namespace and name override
///
/// `#[avro_schema(namespace = "my.namespace")]` and
/// `#[avro_schema(name = "NameOverride")]` at the type level override the
/// inferred (module-path-based) name.
pub fn build_schema_derive(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
	let derive_input = syn::parse_macro_input!(input as syn::DeriveInput);

	match FromDeriveInput::from_derive_input(&derive_input).map(build_schema::schema_impl) {
		Err(e) => e.write_errors().into(),
		Ok(Ok(tokens)) => tokens.into(),
		Ok(Err(e)) => e.into_compile_error().into(),
	}
}
