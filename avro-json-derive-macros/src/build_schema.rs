use darling::ast::{Data, Fields, Style};
use heck::ToPascalCase as _;
use proc_macro2::TokenStream;
use quote::quote;
use syn::Error;

#[derive(darling::FromDeriveInput)]
#[darling(
	attributes(avro_schema),
	supports(struct_named, struct_newtype, enum_unit, enum_newtype)
)]
pub(crate) struct SchemaDeriveInput {
	ident: syn::Ident,
	data: Data<SchemaDeriveVariant, SchemaDeriveField>,
	generics: syn::Generics,

	namespace: Option<String>,
	name: Option<String>,
}

#[derive(darling::FromField)]
#[darling(attributes(avro_schema))]
pub(crate) struct SchemaDeriveField {
	ident: Option<syn::Ident>,
	ty: syn::Type,

	skip: darling::util::Flag,

	logical_type: Option<syn::LitStr>,
	scale: Option<syn::LitInt>,
	precision: Option<syn::LitInt>,
}

#[derive(darling::FromVariant)]
#[darling(attributes(avro_schema))]
pub(crate) struct SchemaDeriveVariant {
	ident: syn::Ident,
	fields: Fields<SchemaDeriveField>,
}

/// Build the token stream for a `#[derive(BuildSchema)]` expansion.
///
/// Grounded on the teacher's `serde_avro_derive_macros::build_schema`, but
/// simplified: our [`LogicalType`](avro_json_derive::avro_json::schema::LogicalType) is a
/// closed enum rather than an open string, so `has_same_type_as` and
/// arbitrary `logical_type` strings aren't supported — only the eight
/// logical types the schema model itself recognizes are.
pub(crate) fn schema_impl(input: SchemaDeriveInput) -> Result<TokenStream, Error> {
	let type_ident = &input.ident;
	let name_str = input.name.clone().unwrap_or_else(|| type_ident.to_string());
	let type_name_expr = match &input.namespace {
		None => quote! {
			{
				let mut type_name = module_path!().replace("::", ".");
				type_name.push('.');
				type_name.push_str(#name_str);
				type_name
			}
		},
		Some(namespace) if namespace.is_empty() => quote! { #name_str.to_owned() },
		Some(namespace) => {
			let full = format!("{namespace}.{name_str}");
			quote! { #full.to_owned() }
		}
	};

	let is_generic = input.generics.type_params().next().is_some();

	let mut generics = input.generics.clone();
	for param in generics.type_params_mut() {
		param.bounds.push(syn::parse_quote!(avro_json_derive::BuildSchema));
		param.bounds.push(syn::parse_quote!('static));
	}
	let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();
	let where_clause = match where_clause {
		Some(w) => quote! { #w, Self: 'static },
		None => quote! { where Self: 'static },
	};

	// A generic type's monomorphizations would otherwise all produce the
	// same Avro name; disambiguate with a hash of the concrete
	// `TypeLookup`, the way the teacher's derive does.
	let type_name_expr = if is_generic {
		quote! {
			{
				let mut type_name = #type_name_expr;
				avro_json_derive::hash_type_id(
					&mut type_name,
					std::any::TypeId::of::<<Self as avro_json_derive::BuildSchema>::TypeLookup>(),
				);
				type_name
			}
		}
	} else {
		type_name_expr
	};

	let (append_schema_body, type_lookup) = match input.data {
		Data::Struct(fields) => struct_body(&type_name_expr, fields)?,
		Data::Enum(variants) => (enum_body(&type_name_expr, variants)?, quote! { Self }),
	};

	Ok(quote! {
		#[automatically_derived]
		impl #impl_generics avro_json_derive::BuildSchema for #type_ident #ty_generics #where_clause {
			fn append_schema(
				builder: &mut avro_json_derive::SchemaBuilder,
			) -> avro_json_derive::avro_json::schema::SchemaKey {
				#append_schema_body
			}
			type TypeLookup = #type_lookup;
		}
	})
}

/// Returns the `append_schema` body and the `TypeLookup` type to use. A
/// single-field newtype forwards both to its inner type, so that the
/// wrapper and the type it wraps share one schema node wherever either is
/// referenced.
fn struct_body(type_name_expr: &TokenStream, fields: Fields<SchemaDeriveField>) -> Result<(TokenStream, TokenStream), Error> {
	let kept: Vec<&SchemaDeriveField> = fields.fields.iter().filter(|f| !f.skip.is_present()).collect();

	if fields.style == Style::Tuple && kept.len() == 1 {
		let ty = &kept[0].ty;
		return Ok((
			quote! { <#ty as avro_json_derive::BuildSchema>::append_schema(builder) },
			quote! { <#ty as avro_json_derive::BuildSchema>::TypeLookup },
		));
	}

	let mut field_pushes = TokenStream::new();
	for field in &kept {
		let field_name = field
			.ident
			.as_ref()
			.ok_or_else(|| Error::new(proc_macro2::Span::call_site(), "tuple struct fields with more than one member are not supported"))?
			.to_string();
		let field_key_expr = field_key_expr(type_name_expr, &field_name, field)?;
		field_pushes.extend(quote! {
			fields.push(avro_json_derive::avro_json::schema::RecordField {
				name: #field_name.to_owned(),
				type_: #field_key_expr,
				doc: None,
				default: None,
			});
		});
	}

	Ok((
		quote! {
			let reserved_schema_key = builder.reserve();
			let type_name = #type_name_expr;
			let mut fields = Vec::new();
			#field_pushes
			builder.schema[reserved_schema_key] = avro_json_derive::avro_json::schema::SchemaNode {
				type_: avro_json_derive::avro_json::schema::RegularType::Record(avro_json_derive::avro_json::schema::Record {
					name: avro_json_derive::avro_json::schema::Name::from_fully_qualified_name(type_name)
						.expect("derived type name is always a valid Avro name"),
					aliases: Vec::new(),
					doc: None,
					fields,
				}),
				logical_type: None,
			};
			reserved_schema_key
		},
		quote! { Self },
	))
}

fn enum_body(type_name_expr: &TokenStream, variants: Vec<SchemaDeriveVariant>) -> Result<TokenStream, Error> {
	let all_unit = variants.iter().all(|v| v.fields.style == Style::Unit);
	if all_unit {
		let symbols: Vec<String> = variants.iter().map(|v| v.ident.to_string()).collect();
		return Ok(quote! {
			let type_name = #type_name_expr;
			builder.schema.push_enum(
				avro_json_derive::avro_json::schema::Name::from_fully_qualified_name(type_name)
					.expect("derived type name is always a valid Avro name"),
				Vec::new(),
				None,
				vec![#(#symbols.to_owned()),*],
			)
			.expect("derived enum symbols are always valid identifiers")
		});
	}

	let mut variant_keys = TokenStream::new();
	for variant in &variants {
		if variant.fields.style != Style::Tuple || variant.fields.fields.len() != 1 {
			return Err(Error::new(
				proc_macro2::Span::call_site(),
				format!(
					"enum variant `{}` must carry exactly one unnamed field to derive a union member (or every variant must be a unit variant)",
					variant.ident
				),
			));
		}
		let ty = &variant.fields.fields[0].ty;
		variant_keys.extend(quote! {
			variants.push(builder.find_or_build::<#ty>());
		});
	}

	Ok(quote! {
		let reserved_schema_key = builder.reserve();
		let mut variants = Vec::new();
		#variant_keys
		builder.schema[reserved_schema_key] = avro_json_derive::avro_json::schema::SchemaNode {
			type_: avro_json_derive::avro_json::schema::RegularType::Union(avro_json_derive::avro_json::schema::Union { variants }),
			logical_type: None,
		};
		reserved_schema_key
	})
}

fn field_key_expr(type_name_expr: &TokenStream, field_name: &str, field: &SchemaDeriveField) -> Result<TokenStream, Error> {
	let ty = &field.ty;
	let Some(logical_type) = &field.logical_type else {
		return Ok(quote! { builder.find_or_build::<#ty>() });
	};
	let field_pascal = field_name.to_pascal_case();
	let name_override = quote! {
		{
			let mut n = #type_name_expr;
			n.push('.');
			n.push_str(#field_pascal);
			n
		}
	};
	let logical_type_expr = match logical_type.value().as_str() {
		"uuid" => quote! { avro_json_derive::avro_json::schema::LogicalType::Uuid },
		"date" => quote! { avro_json_derive::avro_json::schema::LogicalType::Date },
		"time-millis" => quote! { avro_json_derive::avro_json::schema::LogicalType::TimeMillis },
		"time-micros" => quote! { avro_json_derive::avro_json::schema::LogicalType::TimeMicros },
		"timestamp-millis" => quote! { avro_json_derive::avro_json::schema::LogicalType::TimestampMillis },
		"timestamp-micros" => quote! { avro_json_derive::avro_json::schema::LogicalType::TimestampMicros },
		"duration" => quote! { avro_json_derive::avro_json::schema::LogicalType::Duration },
		"decimal" => {
			let precision = field
				.precision
				.as_ref()
				.ok_or_else(|| Error::new(logical_type.span(), "decimal logical type requires `precision`"))?;
			let scale = field.scale.as_ref().ok_or_else(|| Error::new(logical_type.span(), "decimal logical type requires `scale`"))?;
			quote! { avro_json_derive::avro_json::schema::LogicalType::Decimal { precision: #precision, scale: #scale } }
		}
		other => return Err(Error::new(logical_type.span(), format!("unknown logical type `{other}`"))),
	};
	Ok(quote! {
		builder
			.build_logical_type::<#ty>(#logical_type_expr, || #name_override)
			.expect("derived logical type is always valid atop its field type")
	})
}
