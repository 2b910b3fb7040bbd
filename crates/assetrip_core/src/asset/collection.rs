use std::collections::{HashMap, HashSet, VecDeque};

use tracing::debug;

use crate::asset::pptr::{RawRef, same_file_ref};
use crate::asset::{AssetFile, AssetRecord, AssetRef, AssetStore, ExportError, FieldValue, FileId, Result};

/// Claimed members per file: member local id to root local id.
///
/// Grows monotonically during a run.
#[derive(Debug, Default)]
pub struct RootMembership {
	files: HashMap<FileId, HashMap<i64, i64>>,
}

impl RootMembership {
	/// Empty membership.
	pub fn new() -> Self {
		Self::default()
	}

	/// Record `member` as owned by `root`. The first claim wins; returns whether it was new.
	pub fn claim(&mut self, file: FileId, member: i64, root: i64) -> bool {
		let members = self.files.entry(file).or_default();
		if members.contains_key(&member) {
			return false;
		}
		members.insert(member, root);
		true
	}

	/// Root that claimed `local_id`.
	pub fn root_of(&self, file: FileId, local_id: i64) -> Option<i64> {
		self.files.get(&file).and_then(|members| members.get(&local_id)).copied()
	}

	/// Whether `local_id` already belongs to a collection.
	pub fn is_claimed(&self, file: FileId, local_id: i64) -> bool {
		self.root_of(file, local_id).is_some()
	}

	/// Number of claimed members in `file`.
	pub fn claimed_count(&self, file: FileId) -> usize {
		self.files.get(&file).map_or(0, HashMap::len)
	}
}

/// One exportable unit: same-file members, main asset first.
#[derive(Debug, Clone)]
pub struct Collection {
	file: FileId,
	members: Vec<i64>,
	index: HashSet<i64>,
}

impl Collection {
	/// Empty collection inside `file`.
	pub fn new(file: FileId) -> Self {
		Self {
			file,
			members: Vec::new(),
			index: HashSet::new(),
		}
	}

	/// Collection holding exactly `members`, in order.
	pub fn from_members(file: FileId, members: impl IntoIterator<Item = i64>) -> Self {
		let mut collection = Self::new(file);
		for id in members {
			collection.push(id);
		}
		collection
	}

	/// Append a member; returns `false` if it was already present.
	pub fn push(&mut self, local_id: i64) -> bool {
		if !self.index.insert(local_id) {
			return false;
		}
		self.members.push(local_id);
		true
	}

	/// Owning file.
	pub fn file(&self) -> FileId {
		self.file
	}

	/// Member ids in order.
	pub fn members(&self) -> &[i64] {
		&self.members
	}

	/// Whether `local_id` is a member.
	pub fn contains(&self, local_id: i64) -> bool {
		self.index.contains(&local_id)
	}

	/// Number of members.
	pub fn len(&self) -> usize {
		self.members.len()
	}

	/// Whether the collection has no members.
	pub fn is_empty(&self) -> bool {
		self.members.is_empty()
	}

	/// Local id of the main asset.
	pub fn main_local_id(&self) -> Result<i64> {
		self.members.first().copied().ok_or(ExportError::MissingMainAsset)
	}

	/// Record of the main asset.
	pub fn main_asset<'s>(&self, store: &'s AssetStore) -> Result<&'s AssetRecord> {
		store.file(self.file).require_asset(self.main_local_id()?)
	}

	/// Output file extension.
	pub fn extension(&self, store: &AssetStore) -> Result<&'static str> {
		Ok(if self.main_asset(store)?.type_name() == "GameObject" {
			"prefab"
		} else {
			"asset"
		})
	}
}

/// Walk ownership links upward from `asset` to the object that owns it.
///
/// Components lead to their game object, game objects to their parent's game object.
/// Anything else is its own root.
pub fn find_root_asset(store: &AssetStore, asset: AssetRef) -> Result<i64> {
	let file = store.file(asset.file);
	let mut current = asset.local_id;
	let mut seen = HashSet::new();

	while seen.insert(current) {
		let Some(record) = file.asset(current) else {
			break;
		};
		let next = if record.type_name() == "GameObject" {
			transform_of(file, &record.value)
				.and_then(|transform| file.asset(transform))
				.and_then(|transform| same_file_ref(&transform.value, "m_Father"))
				.and_then(|father| file.asset(father))
				.and_then(|father| same_file_ref(&father.value, "m_GameObject"))
		} else {
			same_file_ref(&record.value, "m_GameObject")
		};
		match next {
			Some(next) => current = next,
			None => break,
		}
	}
	Ok(current)
}

/// Gather `seed`'s root and everything it owns, claiming each member in `membership`.
pub fn build_collection(store: &AssetStore, membership: &mut RootMembership, seed: AssetRef) -> Result<Collection> {
	let file = store.file(seed.file);
	file.require_asset(seed.local_id)?;

	let root = find_root_asset(store, seed)?;
	let mut collection = Collection::new(seed.file);
	let mut queue = VecDeque::from([root]);

	while let Some(id) = queue.pop_front() {
		if collection.contains(id) {
			continue;
		}
		let Some(record) = file.asset(id) else {
			debug!(file = %file.name, local_id = id, "owned asset missing from file");
			continue;
		};
		collection.push(id);

		match record.type_name() {
			"GameObject" => queue.extend(component_ids(&record.value)),
			"Transform" | "RectTransform" => {
				let children = record.value.lookup("m_Children").map(FieldValue::elements).unwrap_or_default();
				for child in children {
					let owner = RawRef::from_field(child)
						.ok()
						.and_then(|raw| raw.same_file_target())
						.and_then(|child| file.asset(child))
						.and_then(|child| same_file_ref(&child.value, "m_GameObject"));
					queue.extend(owner);
				}
			}
			_ => {}
		}
	}

	for member in collection.members() {
		membership.claim(seed.file, *member, root);
	}
	Ok(collection)
}

fn component_ids(game_object: &FieldValue) -> Vec<i64> {
	let Ok(components) = game_object.lookup("m_Component") else {
		return Vec::new();
	};
	components
		.elements()
		.iter()
		.filter_map(|pair| pair.child("component").or_else(|| pair.child("second")))
		.filter_map(|pointer| RawRef::from_field(pointer).ok())
		.filter_map(|raw| raw.same_file_target())
		.collect()
}

fn transform_of(file: &AssetFile, game_object: &FieldValue) -> Option<i64> {
	component_ids(game_object).into_iter().find(|id| {
		file.asset(*id)
			.is_some_and(|item| matches!(item.type_name(), "Transform" | "RectTransform"))
	})
}

#[cfg(test)]
mod tests;
