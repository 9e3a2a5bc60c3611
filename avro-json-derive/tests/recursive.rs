use avro_json::schema::RegularType;
use avro_json_derive::BuildSchema;

#[derive(BuildSchema)]
#[avro_schema(namespace = "demo")]
#[allow(unused)]
struct LinkedList {
	value: i64,
	next: Option<Box<LinkedList>>,
}

#[test]
fn self_referential_type_terminates_and_reuses_its_own_node() {
	let schema = LinkedList::schema().unwrap();
	match &schema.root_node().type_ {
		RegularType::Record(r) => {
			assert_eq!(r.fields[0].name, "value");
			assert_eq!(r.fields[1].name, "next");
			match &schema[r.fields[1].type_].type_ {
				RegularType::Union(u) => {
					assert_eq!(u.variants.len(), 2);
					assert!(matches!(schema[u.variants[0]].type_, RegularType::Null));
					// The `Some` branch must point right back at the record being built.
					assert_eq!(u.variants[1], schema.root());
				}
				other => panic!("expected a union, got {other:?}"),
			}
		}
		other => panic!("expected a record, got {other:?}"),
	}
}
