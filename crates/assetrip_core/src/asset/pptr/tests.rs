use std::collections::HashMap;
use std::sync::Arc;

use crate::asset::test_support::{
	asset_file, blank, fill_pptr, game_object, mono_behaviour, mono_script, pptr_template, record, shared_dependency, transform,
};
use crate::asset::{
	AssetRef, AssetStore, Collection, ContentHasher, Dependency, DiscoveredRef, ExportContext, ExportError, ExportState, ExporterRegistry,
	FieldValue, FileId, Guid, Md5Hasher, Reference, Result, inline_text, resolve_reference, script_file_id,
};

fn pointer(name: &str, file_slot: i32, local_id: i64) -> FieldValue {
	let mut value = blank(&Arc::new(pptr_template(name, "Object")));
	fill_pptr(&mut value, file_slot, local_id);
	value
}

fn resolve(store: &AssetStore, state: &mut ExportState, collection: &Collection, field: &FieldValue) -> Result<Reference> {
	let registry = ExporterRegistry::with_defaults().expect("defaults");
	let mut cx = ExportContext {
		registry: &registry,
		store,
		hasher: &Md5Hasher,
		collection,
		asset: AssetRef {
			file: collection.file(),
			local_id: collection.main_local_id().expect("main"),
		},
		state,
	};
	resolve_reference(&mut cx, field)
}

fn scene_store() -> (AssetStore, FileId, FileId) {
	let mut store = AssetStore::new();
	let level = store.insert(asset_file(
		"level0",
		vec![
			Dependency {
				path: "library/unity default resources".to_owned(),
				guid: Guid::parse("0000000000000000e000000000000000").expect("guid"),
			},
			shared_dependency("sharedassets0.assets"),
			shared_dependency("sharedassets9.assets"),
		],
		vec![
			record(1, 1, game_object("Root", &[2])),
			record(2, 4, transform(1, 0, &[])),
			record(3, 114, mono_behaviour("", 1, (2, 50))),
		],
	));
	let shared = store.insert(asset_file(
		"sharedassets0.assets",
		Vec::new(),
		vec![
			record(10, 1, game_object("Enemy", &[11, 12])),
			record(11, 4, transform(10, 0, &[])),
			record(12, 114, mono_behaviour("", 10, (0, 50))),
			record(50, 115, mono_script("EnemyAi", "Game.Ai", "Assembly-CSharp.dll")),
		],
	));
	(store, level, shared)
}

#[test]
fn null_pointers_ignore_the_slot() {
	let (store, level, _) = scene_store();
	let collection = Collection::from_members(level, [1, 2, 3]);
	let mut state = ExportState::default();

	for slot in [0, 2, 7] {
		let reference = resolve(&store, &mut state, &collection, &pointer("m_Mesh", slot, 0)).expect("null");
		assert_eq!(reference, Reference::Null);
		assert_eq!(inline_text(&reference.to_node()), "{fileID: 0}");
	}
	assert!(state.discovered.is_empty());
}

#[test]
fn members_resolve_locally_without_guid() {
	let (store, level, _) = scene_store();
	let collection = Collection::from_members(level, [1, 2, 3]);
	let mut state = ExportState::default();

	let reference = resolve(&store, &mut state, &collection, &pointer("m_Father", 0, 2)).expect("local");
	assert_eq!(reference, Reference::Local { local_id: 2 });
	assert_eq!(inline_text(&reference.to_node()), "{fileID: 2}");
}

#[test]
fn dependencies_with_identifiers_are_referenced_directly() {
	let (store, level, _) = scene_store();
	let collection = Collection::from_members(level, [1, 2, 3]);
	let mut state = ExportState::default();

	let reference = resolve(&store, &mut state, &collection, &pointer("m_Mesh", 1, 10202)).expect("known");
	assert_eq!(inline_text(&reference.to_node()), "{fileID: 10202, guid: 0000000000000000e000000000000000, type: 0}");
	assert!(state.discovered.is_empty());
}

#[test]
fn scripts_use_the_class_file_id_and_assembly_hash() {
	let (store, level, _) = scene_store();
	let collection = Collection::from_members(level, [1, 2, 3]);
	let mut state = ExportState::default();

	let reference = resolve(&store, &mut state, &collection, &pointer("m_Script", 2, 50)).expect("script");
	let expected = Reference::Script {
		file_id: i64::from(script_file_id("Game.Ai", "EnemyAi")),
		guid: Md5Hasher.hash_str("Assembly-CSharp"),
	};
	assert_eq!(reference, expected);
	assert!(inline_text(&reference.to_node()).ends_with("type: 3}"));
	assert!(state.pending.is_empty());
}

#[test]
fn extension_assemblies_use_configured_identifiers() {
	let (store, level, _) = scene_store();
	let collection = Collection::from_members(level, [1, 2, 3]);
	let known = Guid::from_bytes([7; 16]);
	let mut state = ExportState::new(HashMap::from([("Assembly-CSharp.dll".to_owned(), known)]));

	let reference = resolve(&store, &mut state, &collection, &pointer("m_Script", 2, 50)).expect("script");
	assert!(matches!(reference, Reference::Script { guid, .. } if guid == known));
}

#[test]
fn scripts_in_unloaded_files_are_errors() {
	let (store, level, _) = scene_store();
	let collection = Collection::from_members(level, [1, 2, 3]);
	let err = resolve(&store, &mut ExportState::default(), &collection, &pointer("m_Script", 3, 50)).expect_err("unloaded");
	assert!(matches!(err, ExportError::MissingAssetFile { ref path } if path == "sharedassets9.assets"));
}

#[test]
fn external_references_hash_the_owning_root_and_queue_it() {
	let (store, level, shared) = scene_store();
	let collection = Collection::from_members(level, [1, 2, 3]);
	let mut state = ExportState::default();

	let reference = resolve(&store, &mut state, &collection, &pointer("m_Target", 2, 12)).expect("external");
	assert_eq!(reference, Reference::External {
		local_id: 12,
		guid: Md5Hasher.hash_str("10sharedassets0.assets"),
	});
	assert!(inline_text(&reference.to_node()).ends_with("type: 2}"));
	assert_eq!(state.pending.iter().copied().collect::<Vec<_>>(), [AssetRef {
		file: shared,
		local_id: 10
	}]);
	assert!(state.discovered.contains(&DiscoveredRef {
		source: level,
		file_slot: 2,
		local_id: 12,
	}));

	resolve(&store, &mut state, &collection, &pointer("m_Other", 2, 11)).expect("external");
	assert_eq!(state.pending.len(), 1);
	assert_eq!(state.discovered.len(), 2);
}

#[test]
fn claimed_members_use_their_recorded_root() {
	let (store, level, shared) = scene_store();
	let collection = Collection::from_members(level, [1, 2, 3]);
	let mut state = ExportState::default();
	state.membership.claim(shared, 12, 99);

	let reference = resolve(&store, &mut state, &collection, &pointer("m_Target", 2, 12)).expect("external");
	assert_eq!(reference, Reference::External {
		local_id: 12,
		guid: Md5Hasher.hash_str("99sharedassets0.assets"),
	});
	assert!(state.pending.is_empty());
}

#[test]
fn same_file_non_members_are_external() {
	let (store, level, _) = scene_store();
	let collection = Collection::from_members(level, [3]);
	let mut state = ExportState::default();

	let reference = resolve(&store, &mut state, &collection, &pointer("m_GameObject", 0, 2)).expect("external");
	assert_eq!(reference, Reference::External {
		local_id: 2,
		guid: Md5Hasher.hash_str("1level0"),
	});
}

#[test]
fn unloaded_targets_fall_back_to_their_own_id() {
	let (store, level, _) = scene_store();
	let collection = Collection::from_members(level, [1, 2, 3]);
	let mut state = ExportState::default();

	let reference = resolve(&store, &mut state, &collection, &pointer("m_Target", 3, 77)).expect("external");
	assert_eq!(reference, Reference::External {
		local_id: 77,
		guid: Md5Hasher.hash_str("77sharedassets9.assets"),
	});
	assert!(state.pending.is_empty());
}
