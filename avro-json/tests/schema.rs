use avro_json::schema::{RegularType, Schema};

#[test]
fn parses_primitive_shorthand() {
	let schema: Schema = r#""string""#.parse().unwrap();
	assert!(matches!(schema.root_node().type_, RegularType::String));
}

#[test]
fn parses_record_with_nested_array_and_map() {
	let schema: Schema = r#"
	{
		"type": "record",
		"name": "Outer",
		"namespace": "demo",
		"fields": [
			{ "name": "tags", "type": { "type": "array", "items": "string" } },
			{ "name": "counts", "type": { "type": "map", "values": "long" } }
		]
	}
	"#
	.parse()
	.unwrap();
	match &schema.root_node().type_ {
		RegularType::Record(r) => {
			assert_eq!(r.name.fully_qualified_name(), "demo.Outer");
			assert_eq!(r.fields.len(), 2);
			assert_eq!(r.fields[0].name, "tags");
			assert_eq!(r.fields[1].name, "counts");
		}
		other => panic!("expected a record, got {other:?}"),
	}
}

#[test]
fn rejects_unknown_type_name() {
	let result: Result<Schema, _> = r#"{"type": "not-a-real-type"}"#.parse();
	assert!(result.is_err());
}

#[test]
fn named_schema_is_reusable_by_bare_name_reference() {
	let schema: Schema = r#"
	{
		"type": "record",
		"name": "LinkedList",
		"fields": [
			{ "name": "value", "type": "long" },
			{ "name": "next", "type": ["null", "LinkedList"] }
		]
	}
	"#
	.parse()
	.unwrap();
	match &schema.root_node().type_ {
		RegularType::Record(r) => {
			let next_field = &r.fields[1];
			match &schema[next_field.type_].type_ {
				RegularType::Union(u) => assert_eq!(u.variants.len(), 2),
				other => panic!("expected a union, got {other:?}"),
			}
		}
		other => panic!("expected a record, got {other:?}"),
	}
}

#[test]
fn writes_and_reparses_to_an_equivalent_schema() {
	let original: Schema = r#"
	{
		"type": "record",
		"name": "demo.Rec",
		"fields": [{ "name": "a", "type": "int" }]
	}
	"#
	.parse()
	.unwrap();
	let text = original.to_json(original.root()).unwrap();
	let reparsed: Schema = text.parse().unwrap();
	assert!(original.equivalent(original.root(), &reparsed, reparsed.root()));
}

#[test]
fn canonical_form_drops_doc_and_aliases() {
	let with_doc: Schema = r#"
	{ "type": "record", "name": "demo.R", "doc": "hello", "fields": [{"name": "a", "type": "int"}] }
	"#
	.parse()
	.unwrap();
	let without_doc: Schema = r#"
	{ "type": "record", "name": "demo.R", "fields": [{"name": "a", "type": "int"}] }
	"#
	.parse()
	.unwrap();
	let a = with_doc.to_canonical_json(with_doc.root()).unwrap();
	let b = without_doc.to_canonical_json(without_doc.root()).unwrap();
	assert_eq!(a, b);
}

#[test]
fn rabin_fingerprint_is_stable_across_equivalent_texts() {
	let a: Schema = r#"{"type": "record", "name": "demo.R", "fields": [{"name": "a", "type": "int"}]}"#
		.parse()
		.unwrap();
	let b: Schema = r#"
	{
		"name": "demo.R",
		"type": "record",
		"fields": [{"name": "a", "type": "int"}]
	}
	"#
	.parse()
	.unwrap();
	assert_eq!(
		a.canonical_form_rabin_fingerprint(a.root()).unwrap(),
		b.canonical_form_rabin_fingerprint(b.root()).unwrap()
	);
}
