use avro_json::schema::Schema;
use avro_json::value::{from_str, to_string};

fn shape_schema() -> Schema {
	r#"["double", "string"]"#.parse().unwrap()
}

#[derive(serde_derive::Serialize, serde_derive::Deserialize, Debug, PartialEq)]
enum Shape {
	Circle(f64),
	Label(String),
}

#[test]
fn union_member_is_wrapped_by_its_unnamed_type_token() {
	let schema = shape_schema();
	let json = to_string(&schema, schema.root(), &Shape::Circle(2.5)).unwrap();
	assert_eq!(json, r#"{"double":2.5}"#);
	let back: Shape = from_str(&schema, schema.root(), &json).unwrap();
	assert_eq!(back, Shape::Circle(2.5));

	let json = to_string(&schema, schema.root(), &Shape::Label("north".to_owned())).unwrap();
	assert_eq!(json, r#"{"string":"north"}"#);
	let back: Shape = from_str(&schema, schema.root(), &json).unwrap();
	assert_eq!(back, Shape::Label("north".to_owned()));
}

#[test]
fn union_of_named_records_is_wrapped_by_fully_qualified_name() {
	let schema: Schema = r#"
	[
		{ "type": "record", "name": "demo.Circle", "fields": [{ "name": "radius", "type": "double" }] },
		{ "type": "record", "name": "demo.Square", "fields": [{ "name": "side", "type": "double" }] }
	]
	"#
	.parse()
	.unwrap();

	#[derive(serde_derive::Serialize, serde_derive::Deserialize, Debug, PartialEq)]
	struct Circle {
		radius: f64,
	}
	#[derive(serde_derive::Serialize, serde_derive::Deserialize, Debug, PartialEq)]
	struct Square {
		side: f64,
	}
	// Only unit and newtype-style union members are supported, so a record
	// payload is a newtype variant wrapping its own (struct) record type.
	#[derive(serde_derive::Serialize, serde_derive::Deserialize, Debug, PartialEq)]
	enum NamedShape {
		Circle(Circle),
		Square(Square),
	}

	let value = NamedShape::Square(Square { side: 4.0 });
	let json = to_string(&schema, schema.root(), &value).unwrap();
	assert_eq!(json, r#"{"demo.Square":{"side":4.0}}"#);
	let back: NamedShape = from_str(&schema, schema.root(), &json).unwrap();
	assert_eq!(back, value);
}
