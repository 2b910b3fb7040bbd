use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use crate::asset::pptr::RawRef;
use crate::asset::{AssetRecord, AssetRef, AssetStore, Collection, Result};

/// Display name used when an asset carries none.
pub const UNNAMED: &str = "Unnamed";
/// Folder holding behavior-data assets, one subfolder per script class.
pub const SCRIPT_OBJECTS_DIR: &str = "ScriptableObject";

/// Assigns collision-free output paths to collections.
#[derive(Debug, Default)]
pub struct PathAllocator {
	taken: HashSet<PathBuf>,
}

impl PathAllocator {
	/// Allocator with no reserved paths.
	pub fn new() -> Self {
		Self::default()
	}

	/// Reserve `path` so later allocations avoid it.
	pub fn reserve(&mut self, path: PathBuf) {
		self.taken.insert(path);
	}

	/// Pick the output path of `collection` under `base`.
	///
	/// A `known` name for the main asset is used as-is. Otherwise the path is
	/// `category/name.ext`, probing `name 1`, `name 2`, ... while the path is taken
	/// or already exists on disk.
	pub fn allocate(&mut self, base: &Path, store: &AssetStore, collection: &Collection, known: Option<&HashMap<i64, String>>) -> Result<PathBuf> {
		let main_id = collection.main_local_id()?;
		let ext = collection.extension(store)?;

		if let Some(known) = known.and_then(|known| known.get(&main_id)) {
			let path = base.join(format!("{known}.{ext}"));
			self.taken.insert(path.clone());
			return Ok(path);
		}

		let main = collection.main_asset(store)?;
		let owner = AssetRef {
			file: collection.file(),
			local_id: main_id,
		};
		let dir = base.join(category(store, owner, main));
		let name = sanitize_file_name(&display_name(main));

		let mut path = dir.join(format!("{name}.{ext}"));
		let mut suffix = 0_u64;
		while self.taken.contains(&path) || path.exists() {
			suffix += 1;
			path = dir.join(format!("{name} {suffix}.{ext}"));
		}
		self.taken.insert(path.clone());
		Ok(path)
	}
}

/// Category folder of a main asset: its type name, or the script class for behavior data.
pub fn category(store: &AssetStore, asset: AssetRef, record: &AssetRecord) -> String {
	if record.type_name() != "MonoBehaviour" {
		return record.type_name().to_owned();
	}

	let class_name = record
		.value
		.lookup("m_Script")
		.ok()
		.and_then(|field| RawRef::from_field(field).ok())
		.filter(|raw| !raw.is_null())
		.and_then(|raw| {
			let file = store.resolve_slot(asset.file, raw.file_slot).ok()??;
			let script = store.file(file).asset(raw.local_id)?;
			script.value.get_str("m_ClassName").ok().map(str::to_owned)
		});

	match class_name {
		Some(class_name) if !class_name.is_empty() => format!("{SCRIPT_OBJECTS_DIR}/{}", sanitize_file_name(&class_name)),
		_ => record.type_name().to_owned(),
	}
}

/// Name of an asset: `m_Name`, then a shader's parsed name, then [`UNNAMED`]. Blank names count as missing.
pub fn display_name(record: &AssetRecord) -> String {
	let mut name = record.value.get_str("m_Name").unwrap_or_default();
	if name.trim().is_empty() && record.type_name() == "Shader" {
		name = record.value.get_str("m_ParsedForm.m_Name").unwrap_or_default();
	}
	if name.trim().is_empty() { UNNAMED.to_owned() } else { name.to_owned() }
}

/// Replace characters that are invalid in file names with `_`.
pub fn sanitize_file_name(name: &str) -> String {
	name.chars()
		.map(|ch| if ch.is_control() || "<>:\"/\\|?*".contains(ch) { '_' } else { ch })
		.collect()
}

#[cfg(test)]
mod tests;
