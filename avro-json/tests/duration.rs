use avro_json::schema::Schema;
use avro_json::value::{from_str, to_string, Duration, TimeSpan};

fn duration_schema() -> Schema {
	r#"{"type": "fixed", "name": "demo.Duration", "size": 12, "logicalType": "duration"}"#
		.parse()
		.unwrap()
}

#[test]
fn duration_round_trips_as_months_days_millis_tuple() {
	let schema = duration_schema();
	let value = Duration::new(3, 10, 5_000);
	let json = to_string(&schema, schema.root(), &value).unwrap();
	let back: Duration = from_str(&schema, schema.root(), &json).unwrap();
	assert_eq!(back, value);
}

#[test]
fn duration_also_accepts_a_plain_three_element_tuple() {
	let schema = duration_schema();
	let value: (u32, u32, u32) = (1, 2, 3);
	let json = to_string(&schema, schema.root(), &value).unwrap();
	let back: Duration = from_str(&schema, schema.root(), &json).unwrap();
	assert_eq!(back, Duration::new(1, 2, 3));
}

#[test]
fn duration_with_zero_months_decodes_into_a_lossy_time_span() {
	let schema = duration_schema();
	let value = Duration::new(0, 10, 5_000);
	let json = to_string(&schema, schema.root(), &value).unwrap();
	let back: TimeSpan = from_str(&schema, schema.root(), &json).unwrap();
	assert_eq!(back, TimeSpan::new(10, 5_000));
}

#[test]
fn duration_with_nonzero_months_fails_to_decode_into_a_time_span() {
	let schema = duration_schema();
	let value = Duration::new(3, 10, 5_000);
	let json = to_string(&schema, schema.root(), &value).unwrap();
	let err = from_str::<TimeSpan>(&schema, schema.root(), &json).unwrap_err();
	assert!(err.to_string().contains("overflow"));
}
