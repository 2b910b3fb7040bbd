#![allow(missing_docs)]

use assetrip::asset::{ClassDatabase, Compression, DecodeOptions, ExportError, FieldTemplate, decode_asset};
use assetrip_testkit::{GAME_OBJECT, class_database, encode_value, game_object, sample_classes, sample_database};

#[test]
fn templates_survive_the_container_round_trip() {
	for compression in [Compression::None, Compression::Lzma] {
		let bytes = class_database(&sample_classes(), 4, compression).write().expect("database writes");
		let db = ClassDatabase::read(&bytes).expect("database reads");
		assert_eq!(db.header.compression, compression);
		assert_eq!(db.header.engine_versions, vec![Box::<str>::from("2019.4.40f1")]);

		for (class_id, expected) in sample_classes() {
			let class = db.class_by_id(class_id).expect("class present");
			let template = FieldTemplate::from_class_type(&db, class).expect("template builds");
			assert_eq!(template, expected, "class {class_id}");
		}
	}
}

#[test]
fn classes_are_found_by_name() {
	let db = sample_database();
	let class = db.class_by_name("SpawnPoint").expect("spawn point");
	assert_eq!(db.string(class.name).expect("name"), "SpawnPoint");
	assert!(db.class_by_name("Missing").is_none());
}

#[test]
fn encoded_records_decode_to_the_same_tree() {
	let db = sample_database();
	let template = FieldTemplate::from_class_type(&db, db.class_by_id(GAME_OBJECT).expect("class")).expect("template");
	let value = game_object("Odd", &[2, 3, 4]);

	let bytes = encode_value(&value);
	assert_eq!(bytes.len() % 4, 0);
	let decoded = decode_asset(&template, &bytes, &DecodeOptions::default()).expect("decodes");
	assert_eq!(decoded, value);
	assert_eq!(decoded.get_str("m_Name").expect("name"), "Odd");
	assert_eq!(decoded.lookup("m_Component[2].component").and_then(|item| item.get_i64("m_PathID")).expect("id"), 4);
}

#[test]
fn oversized_arrays_hit_the_limit() {
	let db = sample_database();
	let template = FieldTemplate::from_class_type(&db, db.class_by_id(GAME_OBJECT).expect("class")).expect("template");
	let bytes = encode_value(&game_object("Crowd", &[1, 2, 3]));

	let options = DecodeOptions {
		max_array_len: 2,
		..DecodeOptions::default()
	};
	let err = decode_asset(&template, &bytes, &options).expect_err("limit");
	assert!(matches!(err, ExportError::DecodeArrayLimit { len: 3, limit: 2 }));
}
