//! Shared test helpers for workspace crates.
//!
//! Builds class databases from field templates, field values from templates, and
//! complete game data directories of JSON dumps readable by
//! [`assetrip::asset::DumpLoader`].

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use assetrip::asset::{
	AssetDump, ClassDatabase, ClassField, ClassType, CldbHeader, Compression, DependencyDump, FieldData, FieldTemplate, FieldValue,
	Primitive, RecordDump, StringTableBuilder, ValueKind, dump_path,
};

/// Resolve the workspace root path.
pub fn workspace_root() -> PathBuf {
	let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
	manifest_dir
		.join("..")
		.join("..")
		.canonicalize()
		.unwrap_or_else(|_| manifest_dir.join("..").join(".."))
}

/// Resolve the workspace target directory.
pub fn target_dir() -> PathBuf {
	std::env::var_os("CARGO_TARGET_DIR")
		.map(PathBuf::from)
		.unwrap_or_else(|| workspace_root().join("target"))
}

/// Class id of game objects.
pub const GAME_OBJECT: i32 = 1;
/// Class id of transforms.
pub const TRANSFORM: i32 = 4;
/// Class id of behaviours.
pub const MONO_BEHAVIOUR: i32 = 114;
/// Class id of script descriptors.
pub const MONO_SCRIPT: i32 = 115;
/// Class id of player settings.
pub const PLAYER_SETTINGS: i32 = 129;
/// Class id of build settings.
pub const BUILD_SETTINGS: i32 = 141;
/// Class id of the sample spawn point class, which holds a prefab pointer.
pub const SPAWN_POINT: i32 = 1001;

/// `PPtr<target>` template.
pub fn pptr(name: &str, target: &str) -> FieldTemplate {
	FieldTemplate::node(
		name,
		&format!("PPtr<{target}>"),
		vec![FieldTemplate::leaf("m_FileID", "int"), FieldTemplate::leaf("m_PathID", "SInt64")],
	)
}

/// Templates of every class in the sample database, keyed by class id.
pub fn sample_classes() -> Vec<(i32, Arc<FieldTemplate>)> {
	let pair = FieldTemplate::node("data", "ComponentPair", vec![pptr("component", "Component")]);
	let classes = vec![
		(
			GAME_OBJECT,
			FieldTemplate::node(
				"Base",
				"GameObject",
				vec![
					FieldTemplate::vector("m_Component", pair),
					FieldTemplate::leaf("m_Layer", "unsigned int"),
					FieldTemplate::leaf("m_Name", "string").aligned(),
					FieldTemplate::leaf("m_IsActive", "bool").aligned(),
				],
			)
			.with_version(6),
		),
		(
			TRANSFORM,
			FieldTemplate::node(
				"Base",
				"Transform",
				vec![
					pptr("m_GameObject", "GameObject"),
					FieldTemplate::node(
						"m_LocalPosition",
						"Vector3f",
						vec![FieldTemplate::leaf("x", "float"), FieldTemplate::leaf("y", "float"), FieldTemplate::leaf("z", "float")],
					),
					FieldTemplate::vector("m_Children", pptr("data", "Transform")),
					pptr("m_Father", "Transform"),
				],
			),
		),
		(
			MONO_BEHAVIOUR,
			FieldTemplate::node(
				"Base",
				"MonoBehaviour",
				vec![
					pptr("m_GameObject", "GameObject"),
					FieldTemplate::leaf("m_Enabled", "UInt8").aligned(),
					pptr("m_Script", "MonoScript"),
					FieldTemplate::leaf("m_Name", "string").aligned(),
				],
			),
		),
		(
			MONO_SCRIPT,
			FieldTemplate::node(
				"Base",
				"MonoScript",
				vec![
					FieldTemplate::leaf("m_Name", "string").aligned(),
					FieldTemplate::leaf("m_ClassName", "string").aligned(),
					FieldTemplate::leaf("m_Namespace", "string").aligned(),
					FieldTemplate::leaf("m_AssemblyName", "string").aligned(),
				],
			),
		),
		(
			PLAYER_SETTINGS,
			FieldTemplate::node(
				"Base",
				"PlayerSettings",
				vec![
					FieldTemplate::leaf("companyName", "string").aligned(),
					FieldTemplate::leaf("productName", "string").aligned(),
				],
			),
		),
		(
			BUILD_SETTINGS,
			FieldTemplate::node(
				"Base",
				"BuildSettings",
				vec![
					FieldTemplate::vector("m_Scenes", FieldTemplate::leaf("data", "string").aligned()),
					FieldTemplate::leaf("m_Version", "string").aligned(),
				],
			),
		),
		(
			SPAWN_POINT,
			FieldTemplate::node(
				"Base",
				"SpawnPoint",
				vec![pptr("m_Prefab", "GameObject"), FieldTemplate::leaf("m_Count", "int")],
			),
		),
	];
	classes.into_iter().map(|(id, template)| (id, Arc::new(template))).collect()
}

/// Build a class database describing `classes`.
pub fn class_database(classes: &[(i32, Arc<FieldTemplate>)], version: u8, compression: Compression) -> ClassDatabase {
	let mut strings = StringTableBuilder::new();
	let mut header = CldbHeader::new(version, compression);
	header.engine_versions = vec!["2019.4.40f1".into()];

	let classes = classes
		.iter()
		.map(|(class_id, template)| {
			let mut fields = Vec::new();
			flatten(template, 0, &mut strings, &mut fields);
			ClassType {
				class_id: *class_id,
				base_class: -1,
				name: strings.intern(&template.type_name),
				assembly: None,
				fields,
			}
		})
		.collect();

	ClassDatabase {
		header,
		classes,
		strings: strings.finish(),
	}
}

/// The sample database, version 3, uncompressed.
pub fn sample_database() -> ClassDatabase {
	class_database(&sample_classes(), 3, Compression::None)
}

fn flatten(template: &FieldTemplate, depth: u8, strings: &mut StringTableBuilder, out: &mut Vec<ClassField>) {
	let mut emit = |strings: &mut StringTableBuilder, type_name: &str, name: &str, depth: u8, is_array: bool, align: bool, version: u16| {
		out.push(ClassField {
			type_name: strings.intern(type_name),
			field_name: strings.intern(name),
			depth,
			is_array,
			size: -1,
			version,
			meta_flags: if align { ClassField::ALIGN_FLAG } else { 0 },
		});
	};

	if template.value_kind == ValueKind::String {
		// Engine strings carry an inner char array that holds the alignment flag.
		emit(strings, "string", &template.name, depth, false, false, template.version);
		emit(strings, "Array", "Array", depth + 1, true, template.align, 1);
		emit(strings, "int", "size", depth + 2, false, false, 1);
		emit(strings, "char", "data", depth + 2, false, false, 1);
		return;
	}

	emit(
		strings,
		&template.type_name,
		&template.name,
		depth,
		template.is_array,
		template.align,
		template.version,
	);
	for child in &template.children {
		flatten(child, depth + 1, strings, out);
	}
}

/// Template of `class_id` in [`sample_classes`].
pub fn class_template(class_id: i32) -> Arc<FieldTemplate> {
	sample_classes()
		.into_iter()
		.find(|(id, _)| *id == class_id)
		.map(|(_, template)| template)
		.unwrap_or_else(|| panic!("class {class_id} is not in the sample database"))
}

/// Zero-valued tree for `template`, with empty arrays.
pub fn blank(template: &Arc<FieldTemplate>) -> FieldValue {
	if template.is_array {
		return FieldValue::node(template.clone(), Vec::new());
	}
	let value = match template.value_kind {
		ValueKind::None => return FieldValue::node(template.clone(), template.children.iter().map(blank).collect()),
		ValueKind::Bool => Primitive::Bool(false),
		ValueKind::Int8 => Primitive::I8(0),
		ValueKind::UInt8 => Primitive::U8(0),
		ValueKind::Int16 => Primitive::I16(0),
		ValueKind::UInt16 => Primitive::U16(0),
		ValueKind::Int32 => Primitive::I32(0),
		ValueKind::UInt32 => Primitive::U32(0),
		ValueKind::Int64 => Primitive::I64(0),
		ValueKind::UInt64 => Primitive::U64(0),
		ValueKind::Float => Primitive::F32(0.0),
		ValueKind::Double => Primitive::F64(0.0),
		ValueKind::String => Primitive::String("".into()),
	};
	FieldValue::leaf(template.clone(), value)
}

/// Overwrite the leaf at `path`.
pub fn set(value: &mut FieldValue, path: &str, primitive: Primitive) {
	value.lookup_mut(path).unwrap_or_else(|err| panic!("{path}: {err}")).data = FieldData::Leaf(primitive);
}

/// Overwrite the pointer at `path`.
pub fn set_pptr(value: &mut FieldValue, path: &str, file_slot: i32, local_id: i64) {
	set(value, &format!("{path}.m_FileID"), Primitive::I32(file_slot));
	set(value, &format!("{path}.m_PathID"), Primitive::I64(local_id));
}

/// Append a blank element to the array at `path`, looking through a `vector` wrapper.
pub fn push<'v>(value: &'v mut FieldValue, path: &str) -> &'v mut FieldValue {
	let target = value.lookup_mut(path).unwrap_or_else(|err| panic!("{path}: {err}"));
	let array = if target.template.is_array {
		target
	} else {
		target.children_mut().and_then(|children| children.first_mut()).expect("array child")
	};
	let element = array.template.element().expect("array element").clone();
	let items = array.children_mut().expect("array children");
	items.push(blank(&element));
	items.last_mut().expect("pushed element")
}

/// Game object named `name` owning `components`.
pub fn game_object(name: &str, components: &[i64]) -> FieldValue {
	let mut value = blank(&class_template(GAME_OBJECT));
	set(&mut value, "m_Name", Primitive::String(name.into()));
	set(&mut value, "m_IsActive", Primitive::Bool(true));
	for id in components {
		set_pptr(push(&mut value, "m_Component"), "component", 0, *id);
	}
	value
}

/// Transform of `game_object` under `father` with `children` transforms.
pub fn transform(game_object: i64, father: i64, children: &[i64]) -> FieldValue {
	let mut value = blank(&class_template(TRANSFORM));
	set_pptr(&mut value, "m_GameObject", 0, game_object);
	set_pptr(&mut value, "m_Father", 0, father);
	for id in children {
		let item = push(&mut value, "m_Children");
		set(item, "m_FileID", Primitive::I32(0));
		set(item, "m_PathID", Primitive::I64(*id));
	}
	value
}

/// Behaviour on `game_object` running the script at `(slot, id)`.
pub fn mono_behaviour(name: &str, game_object: i64, script: (i32, i64)) -> FieldValue {
	let mut value = blank(&class_template(MONO_BEHAVIOUR));
	set_pptr(&mut value, "m_GameObject", 0, game_object);
	set(&mut value, "m_Enabled", Primitive::U8(1));
	set_pptr(&mut value, "m_Script", script.0, script.1);
	set(&mut value, "m_Name", Primitive::String(name.into()));
	value
}

/// Script descriptor for `namespace.class_name` in `assembly`.
pub fn mono_script(class_name: &str, namespace: &str, assembly: &str) -> FieldValue {
	let mut value = blank(&class_template(MONO_SCRIPT));
	set(&mut value, "m_Name", Primitive::String(class_name.into()));
	set(&mut value, "m_ClassName", Primitive::String(class_name.into()));
	set(&mut value, "m_Namespace", Primitive::String(namespace.into()));
	set(&mut value, "m_AssemblyName", Primitive::String(assembly.into()));
	value
}

/// Serialize `value` the way [`assetrip::asset::decode_asset`] reads it.
pub fn encode_value(value: &FieldValue) -> Vec<u8> {
	let mut out = Vec::new();
	encode_into(value, &mut out);
	out
}

fn encode_into(value: &FieldValue, out: &mut Vec<u8>) {
	if value.template.is_array {
		out.extend_from_slice(&(value.children().len() as i32).to_le_bytes());
		for item in value.children() {
			encode_into(item, out);
		}
	} else if let Some(primitive) = value.primitive() {
		let bytes = primitive.le_bytes();
		if let Primitive::String(_) = primitive {
			out.extend_from_slice(&(bytes.len() as i32).to_le_bytes());
		}
		out.extend_from_slice(&bytes);
	} else {
		for child in value.children() {
			encode_into(child, out);
		}
	}

	if value.template.align {
		while out.len() % 4 != 0 {
			out.push(0);
		}
	}
}

/// One record of a dump under construction.
pub struct DumpRecord {
	/// Local id.
	pub local_id: i64,
	/// Engine class id.
	pub class_id: i32,
	/// Decoded value to encode.
	pub value: FieldValue,
}

/// Record `local_id` of class `class_id`.
pub fn dump_record(local_id: i64, class_id: i32, value: FieldValue) -> DumpRecord {
	DumpRecord { local_id, class_id, value }
}

/// Write `<data_dir>/<name>.json` with `dependencies` as `(path, guid)` pairs.
pub fn write_dump(data_dir: &Path, name: &str, dependencies: &[(&str, Option<&str>)], records: Vec<DumpRecord>) -> PathBuf {
	let dump = AssetDump {
		name: None,
		dependencies: dependencies
			.iter()
			.map(|(path, guid)| DependencyDump {
				path: (*path).to_owned(),
				guid: guid.map(str::to_owned),
			})
			.collect(),
		assets: records
			.into_iter()
			.map(|item| RecordDump {
				local_id: item.local_id,
				class_id: item.class_id,
				data: hex::encode(encode_value(&item.value)),
			})
			.collect(),
	};

	fs::create_dir_all(data_dir).expect("data directory is created");
	let path = dump_path(&data_dir.join(name));
	fs::write(&path, serde_json::to_vec_pretty(&dump).expect("dump serializes")).expect("dump is written");
	path
}

/// Paths of a sample game written by [`write_sample_game`].
pub struct SampleGame {
	/// Game data directory holding the dumps.
	pub data_dir: PathBuf,
	/// Class database file.
	pub cldb: PathBuf,
}

/// Write a one-scene game under `root`.
///
/// `sharedassets0.assets` holds a `Player` prefab (object 1, transform 2, behaviour 3
/// running script 50) and the scene `Assets/Scenes/Main.unity` places a spawn point
/// pointing at that prefab.
pub fn write_sample_game(root: &Path) -> SampleGame {
	let data_dir = root.join("Game_Data");
	let cldb = root.join("classdata.cldb");
	fs::create_dir_all(&data_dir).expect("data directory is created");
	fs::write(&cldb, sample_database().write().expect("database serializes")).expect("database is written");

	let mut player_settings = blank(&class_template(PLAYER_SETTINGS));
	set(&mut player_settings, "companyName", Primitive::String("Acme".into()));
	set(&mut player_settings, "productName", Primitive::String("Sample".into()));

	let mut build_settings = blank(&class_template(BUILD_SETTINGS));
	push(&mut build_settings, "m_Scenes").data = FieldData::Leaf(Primitive::String("Assets/Scenes/Main.unity".into()));
	set(&mut build_settings, "m_Version", Primitive::String("2019.4.40f1".into()));

	write_dump(&data_dir, "globalgamemanagers", &[], vec![
		dump_record(1, PLAYER_SETTINGS, player_settings),
		dump_record(2, BUILD_SETTINGS, build_settings),
	]);

	write_dump(&data_dir, "sharedassets0.assets", &[], vec![
		dump_record(1, GAME_OBJECT, game_object("Player", &[2, 3])),
		dump_record(2, TRANSFORM, transform(1, 0, &[])),
		dump_record(3, MONO_BEHAVIOUR, mono_behaviour("", 1, (0, 50))),
		dump_record(50, MONO_SCRIPT, mono_script("PlayerMove", "Sample", "Assembly-CSharp.dll")),
	]);

	let mut spawn = blank(&class_template(SPAWN_POINT));
	set_pptr(&mut spawn, "m_Prefab", 1, 1);
	set(&mut spawn, "m_Count", Primitive::I32(3));
	write_dump(
		&data_dir,
		"level0",
		&[("sharedassets0.assets", None), ("library/unity default resources", Some("0000000000000000e000000000000000"))],
		vec![
			dump_record(1, GAME_OBJECT, game_object("Spawner", &[2])),
			dump_record(2, TRANSFORM, transform(1, 0, &[])),
			dump_record(3, SPAWN_POINT, spawn),
		],
	);

	SampleGame { data_dir, cldb }
}
