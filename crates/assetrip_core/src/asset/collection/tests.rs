use crate::asset::test_support::{asset_file, game_object, mono_behaviour, record, transform};
use crate::asset::{AssetRef, AssetStore, Collection, ExportError, FileId, RootMembership, build_collection, find_root_asset};

/// Root object 1 (transform 2) with child object 10 (transform 11) and a behaviour 3 on the root.
fn hierarchy() -> (AssetStore, FileId) {
	let mut store = AssetStore::new();
	let file = store.insert(asset_file(
		"sharedassets0.assets",
		Vec::new(),
		vec![
			record(1, 1, game_object("Player", &[2, 3])),
			record(2, 4, transform(1, 0, &[11])),
			record(3, 114, mono_behaviour("", 1, (0, 0))),
			record(10, 1, game_object("Weapon", &[11])),
			record(11, 4, transform(10, 2, &[])),
			record(20, 21, game_object("Stray", &[])),
		],
	));
	(store, file)
}

fn at(file: FileId, local_id: i64) -> AssetRef {
	AssetRef { file, local_id }
}

#[test]
fn roots_are_found_through_parents_and_owners() {
	let (store, file) = hierarchy();
	assert_eq!(find_root_asset(&store, at(file, 11)).expect("root"), 1);
	assert_eq!(find_root_asset(&store, at(file, 10)).expect("root"), 1);
	assert_eq!(find_root_asset(&store, at(file, 3)).expect("root"), 1);
	assert_eq!(find_root_asset(&store, at(file, 1)).expect("root"), 1);
	assert_eq!(find_root_asset(&store, at(file, 20)).expect("root"), 20);
}

#[test]
fn collections_walk_the_hierarchy_from_the_root() {
	let (store, file) = hierarchy();
	let mut membership = RootMembership::new();

	let collection = build_collection(&store, &mut membership, at(file, 11)).expect("collection");
	assert_eq!(collection.members(), [1, 2, 3, 10, 11]);
	assert_eq!(collection.main_local_id().expect("main"), 1);
	assert_eq!(collection.extension(&store).expect("ext"), "prefab");

	for member in [1, 2, 3, 10, 11] {
		assert_eq!(membership.root_of(file, member), Some(1));
	}
	assert!(!membership.is_claimed(file, 20));
	assert_eq!(membership.claimed_count(file), 5);
}

#[test]
fn first_claim_wins() {
	let mut membership = RootMembership::new();
	assert!(membership.claim(FileId(0), 5, 1));
	assert!(!membership.claim(FileId(0), 5, 2));
	assert_eq!(membership.root_of(FileId(0), 5), Some(1));
	assert_eq!(membership.root_of(FileId(1), 5), None);
}

#[test]
fn cyclic_parents_terminate() {
	let mut store = AssetStore::new();
	let file = store.insert(asset_file(
		"level0",
		Vec::new(),
		vec![
			record(1, 1, game_object("A", &[2])),
			record(2, 4, transform(1, 4, &[4])),
			record(3, 1, game_object("B", &[4])),
			record(4, 4, transform(3, 2, &[2])),
		],
	));

	let root = find_root_asset(&store, at(file, 2)).expect("root");
	assert!([1, 3].contains(&root));

	let collection = build_collection(&store, &mut RootMembership::new(), at(file, 2)).expect("collection");
	let mut members = collection.members().to_vec();
	members.sort_unstable();
	assert_eq!(members, [1, 2, 3, 4]);
}

#[test]
fn non_hierarchy_assets_stand_alone() {
	let mut store = AssetStore::new();
	let file = store.insert(asset_file("a.assets", Vec::new(), vec![record(7, 114, mono_behaviour("Config", 0, (0, 0)))]));
	let collection = build_collection(&store, &mut RootMembership::new(), at(file, 7)).expect("collection");
	assert_eq!(collection.members(), [7]);
	assert_eq!(collection.extension(&store).expect("ext"), "asset");
}

#[test]
fn missing_seeds_are_errors() {
	let (store, file) = hierarchy();
	let err = build_collection(&store, &mut RootMembership::new(), at(file, 99)).expect_err("missing");
	assert!(matches!(err, ExportError::MissingAsset { local_id: 99, .. }));
}

#[test]
fn members_are_unique_and_ordered() {
	let mut collection = Collection::new(FileId(0));
	assert!(collection.push(4));
	assert!(collection.push(2));
	assert!(!collection.push(4));
	assert_eq!(collection.members(), [4, 2]);
	assert!(collection.contains(2));
	assert!(matches!(Collection::new(FileId(0)).main_local_id(), Err(ExportError::MissingMainAsset)));
}
