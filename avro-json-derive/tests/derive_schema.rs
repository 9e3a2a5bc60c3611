use pretty_assertions::assert_eq;

use avro_json::schema::RegularType;
use avro_json_derive::BuildSchema;

#[derive(BuildSchema)]
#[avro_schema(namespace = "demo")]
#[allow(unused)]
struct Bar {
	a: i32,
	b: String,
}

#[derive(BuildSchema)]
#[avro_schema(namespace = "demo")]
#[allow(unused)]
struct Foo {
	primitives: Bar,
}

#[derive(BuildSchema)]
#[avro_schema(namespace = "demo")]
#[allow(unused)]
struct Complex {
	s1: Foo,
	s2: Foo,
	vec: Vec<String>,
	maybe: Option<i64>,
}

#[test]
fn primitive_fields_map_to_their_avro_types() {
	let schema = Bar::schema().unwrap();
	match &schema.root_node().type_ {
		RegularType::Record(r) => {
			assert_eq!(r.name.fully_qualified_name(), "demo.Bar");
			assert_eq!(r.fields.len(), 2);
			assert_eq!(r.fields[0].name, "a");
			assert!(matches!(schema[r.fields[0].type_].type_, RegularType::Int));
			assert_eq!(r.fields[1].name, "b");
			assert!(matches!(schema[r.fields[1].type_].type_, RegularType::String));
		}
		other => panic!("expected a record, got {other:?}"),
	}
}

#[test]
fn nested_struct_field_is_a_named_record_reference() {
	let schema = Foo::schema().unwrap();
	match &schema.root_node().type_ {
		RegularType::Record(r) => {
			assert_eq!(r.fields.len(), 1);
			match &schema[r.fields[0].type_].type_ {
				RegularType::Record(inner) => assert_eq!(inner.name.fully_qualified_name(), "demo.Bar"),
				other => panic!("expected a record, got {other:?}"),
			}
		}
		other => panic!("expected a record, got {other:?}"),
	}
}

#[test]
fn repeated_substruct_is_deduplicated_to_one_node() {
	let schema = Complex::schema().unwrap();
	match &schema.root_node().type_ {
		RegularType::Record(r) => {
			assert_eq!(r.fields[0].name, "s1");
			assert_eq!(r.fields[1].name, "s2");
			// `Foo` is referenced twice; it must resolve to the same arena key both times.
			assert_eq!(r.fields[0].type_, r.fields[1].type_);

			match &schema[r.fields[2].type_].type_ {
				RegularType::Array(a) => assert!(matches!(schema[a.items].type_, RegularType::String)),
				other => panic!("expected an array, got {other:?}"),
			}

			match &schema[r.fields[3].type_].type_ {
				RegularType::Union(u) => {
					assert_eq!(u.variants.len(), 2);
					assert!(matches!(schema[u.variants[0]].type_, RegularType::Null));
					assert!(matches!(schema[u.variants[1]].type_, RegularType::Long));
				}
				other => panic!("expected a union, got {other:?}"),
			}
		}
		other => panic!("expected a record, got {other:?}"),
	}
}

#[derive(BuildSchema)]
#[avro_schema(namespace = "demo")]
struct Meters(f64);

#[test]
fn newtype_struct_forwards_to_its_inner_type_schema() {
	let schema = Meters::schema().unwrap();
	assert!(matches!(schema.root_node().type_, RegularType::Double));
}

#[derive(BuildSchema)]
enum Suit {
	Spades,
	Hearts,
	Clubs,
	Diamonds,
}

#[test]
fn unit_enum_becomes_an_avro_enum() {
	let schema = Suit::schema().unwrap();
	match &schema.root_node().type_ {
		RegularType::Enum(e) => assert_eq!(e.symbols, vec!["Spades", "Hearts", "Clubs", "Diamonds"]),
		other => panic!("expected an enum, got {other:?}"),
	}
}

#[derive(BuildSchema)]
#[allow(unused)]
enum Shape {
	Circle(f64),
	Square(f64),
}

#[test]
fn newtype_variant_enum_becomes_a_union() {
	let schema = Shape::schema().unwrap();
	match &schema.root_node().type_ {
		RegularType::Union(u) => {
			assert_eq!(u.variants.len(), 2);
			assert!(matches!(schema[u.variants[0]].type_, RegularType::Double));
			assert!(matches!(schema[u.variants[1]].type_, RegularType::Double));
			// Both variants carry the same payload type; they must share one node.
			assert_eq!(u.variants[0], u.variants[1]);
		}
		other => panic!("expected a union, got {other:?}"),
	}
}

#[derive(BuildSchema)]
#[allow(unused)]
struct WithUuid {
	#[avro_schema(logical_type = "uuid")]
	id: String,
}

#[test]
fn logical_type_attribute_annotates_the_field_node() {
	let schema = WithUuid::schema().unwrap();
	match &schema.root_node().type_ {
		RegularType::Record(r) => {
			let node = &schema[r.fields[0].type_];
			assert!(matches!(node.type_, RegularType::String));
			assert_eq!(node.logical_type, Some(avro_json::schema::LogicalType::Uuid));
		}
		other => panic!("expected a record, got {other:?}"),
	}
}

#[derive(BuildSchema)]
#[allow(unused)]
struct WithDecimal {
	#[avro_schema(logical_type = "decimal", precision = 10, scale = 2)]
	amount: Vec<u8>,
}

#[test]
fn decimal_logical_type_requires_precision_and_scale() {
	let schema = WithDecimal::schema().unwrap();
	match &schema.root_node().type_ {
		RegularType::Record(r) => {
			let node = &schema[r.fields[0].type_];
			assert_eq!(
				node.logical_type,
				Some(avro_json::schema::LogicalType::Decimal { precision: 10, scale: 2 })
			);
		}
		other => panic!("expected a record, got {other:?}"),
	}
}
