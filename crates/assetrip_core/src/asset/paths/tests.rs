use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use crate::asset::test_support::{asset_file, blank, game_object, mono_behaviour, mono_script, record, set};
use crate::asset::{AssetStore, Collection, FieldTemplate, FileId, PathAllocator, Primitive, display_name, sanitize_file_name};

fn store() -> AssetStore {
	let shader = Arc::new(FieldTemplate::node(
		"Base",
		"Shader",
		vec![
			FieldTemplate::leaf("m_Name", "string"),
			FieldTemplate::node("m_ParsedForm", "SerializedShader", vec![FieldTemplate::leaf("m_Name", "string")]),
		],
	));
	let mut shader_value = blank(&shader);
	set(&mut shader_value, "m_ParsedForm.m_Name", Primitive::String("Custom/Toon".into()));

	let mut store = AssetStore::new();
	store.insert(asset_file(
		"resources.assets",
		Vec::new(),
		vec![
			record(1, 1, game_object("Player", &[])),
			record(2, 114, mono_behaviour("", 0, (0, 9))),
			record(3, 114, mono_behaviour("", 0, (0, 9))),
			record(4, 48, shader_value),
			record(5, 114, mono_behaviour("Loose", 0, (0, 0))),
			record(6, 1, game_object("a:b?", &[])),
			record(9, 115, mono_script("LevelConfig", "", "Assembly-CSharp.dll")),
		],
	));
	store
}

fn one(local_id: i64) -> Collection {
	Collection::from_members(FileId(0), [local_id])
}

#[test]
fn unnamed_behaviour_data_gets_numbered_under_its_class() {
	let store = store();
	let mut paths = PathAllocator::new();
	let base = Path::new("Assets");

	let first = paths.allocate(base, &store, &one(2), None).expect("first");
	let second = paths.allocate(base, &store, &one(3), None).expect("second");
	assert_eq!(first, Path::new("Assets/ScriptableObject/LevelConfig/Unnamed.asset"));
	assert_eq!(second, Path::new("Assets/ScriptableObject/LevelConfig/Unnamed 1.asset"));
}

#[test]
fn categories_follow_type_names() {
	let store = store();
	let mut paths = PathAllocator::new();
	let base = Path::new("Assets");

	assert_eq!(paths.allocate(base, &store, &one(1), None).expect("prefab"), Path::new("Assets/GameObject/Player.prefab"));
	assert_eq!(paths.allocate(base, &store, &one(5), None).expect("no script"), Path::new("Assets/MonoBehaviour/Loose.asset"));
	assert_eq!(paths.allocate(base, &store, &one(6), None).expect("sanitized"), Path::new("Assets/GameObject/a_b_.prefab"));
}

#[test]
fn shaders_fall_back_to_their_parsed_name() {
	let store = store();
	let file = store.file(FileId(0));
	assert_eq!(display_name(file.asset(4).expect("shader")), "Custom/Toon");

	let path = PathAllocator::new()
		.allocate(Path::new("Assets"), &store, &one(4), None)
		.expect("shader");
	assert_eq!(path, Path::new("Assets/Shader/Custom_Toon.asset"));
}

#[test]
fn known_names_are_used_verbatim() {
	let store = store();
	let known = HashMap::from([(1, "Characters/Hero".to_owned())]);
	let path = PathAllocator::new()
		.allocate(Path::new("Assets/Resources"), &store, &one(1), Some(&known))
		.expect("known");
	assert_eq!(path, Path::new("Assets/Resources/Characters/Hero.prefab"));
}

#[test]
fn reserved_and_existing_paths_are_skipped() {
	let dir = tempfile::tempdir().expect("tempdir");
	let category = dir.path().join("GameObject");
	fs::create_dir_all(&category).expect("dir");
	fs::write(category.join("Player.prefab"), "").expect("existing");

	let store = store();
	let mut paths = PathAllocator::new();
	paths.reserve(category.join("Player 1.prefab"));
	let path = paths.allocate(dir.path(), &store, &one(1), None).expect("path");
	assert_eq!(path, category.join("Player 2.prefab"));
}

#[test]
fn sanitizing_replaces_reserved_characters() {
	assert_eq!(sanitize_file_name("a<b>c:d\"e/f\\g|h?i*j"), "a_b_c_d_e_f_g_h_i_j");
	assert_eq!(sanitize_file_name("tab\there"), "tab_here");
	assert_eq!(sanitize_file_name("Plain Name"), "Plain Name");
}

#[test]
fn blank_names_count_as_missing() {
	let shader = Arc::new(FieldTemplate::node(
		"Base",
		"Shader",
		vec![
			FieldTemplate::leaf("m_Name", "string"),
			FieldTemplate::node("m_ParsedForm", "SerializedShader", vec![FieldTemplate::leaf("m_Name", "string")]),
		],
	));
	let mut shader_value = blank(&shader);
	set(&mut shader_value, "m_Name", Primitive::String("  ".into()));
	set(&mut shader_value, "m_ParsedForm.m_Name", Primitive::String("Hidden/Blit".into()));

	let mut store = AssetStore::new();
	store.insert(asset_file(
		"sharedassets0.assets",
		Vec::new(),
		vec![record(1, 1, game_object("   ", &[])), record(2, 48, shader_value)],
	));
	let file = store.file(FileId(0));
	assert_eq!(display_name(file.asset(1).expect("object")), "Unnamed");
	assert_eq!(display_name(file.asset(2).expect("shader")), "Hidden/Blit");

	let path = PathAllocator::new()
		.allocate(Path::new("Assets"), &store, &one(1), None)
		.expect("blank");
	assert_eq!(path, Path::new("Assets/GameObject/Unnamed.prefab"));
}
