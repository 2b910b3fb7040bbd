use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::asset::{ExportError, FieldValue, Guid, Result};

/// Index of a loaded file inside an [`AssetStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileId(pub usize);

/// One asset record inside one loaded file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AssetRef {
	/// Owning file.
	pub file: FileId,
	/// Local id inside the owning file.
	pub local_id: i64,
}

/// Declared external dependency of an asset file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
	/// Declared path, usually a bare file name.
	pub path: String,
	/// Externally known identifier, zero when the dependency ships with the game.
	pub guid: Guid,
}

impl Dependency {
	/// Base file name of the declared path.
	pub fn file_name(&self) -> &str {
		base_name(&self.path)
	}
}

/// Decoded asset record.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetRecord {
	/// Local id inside the owning file.
	pub local_id: i64,
	/// Engine class id.
	pub class_id: i32,
	/// Decoded field tree.
	pub value: FieldValue,
}

impl AssetRecord {
	/// Class name of the record root.
	pub fn type_name(&self) -> &str {
		self.value.type_name()
	}
}

/// Loaded asset file: dependency list plus decoded records.
#[derive(Debug, Clone)]
pub struct AssetFile {
	/// File name used in identifiers.
	pub name: String,
	/// Location on disk; streamed payloads are resolved next to it.
	pub path: PathBuf,
	/// Declared external dependencies; slot `n` is `dependencies[n - 1]`.
	pub dependencies: Vec<Dependency>,
	assets: Vec<AssetRecord>,
	index: HashMap<i64, usize>,
}

impl AssetFile {
	/// Build a file and index its records by local id.
	pub fn new(name: &str, path: PathBuf, dependencies: Vec<Dependency>, assets: Vec<AssetRecord>) -> Self {
		let index = assets.iter().enumerate().map(|(pos, item)| (item.local_id, pos)).collect();
		Self {
			name: name.to_owned(),
			path,
			dependencies,
			assets,
			index,
		}
	}

	/// Records in file order.
	pub fn assets(&self) -> &[AssetRecord] {
		&self.assets
	}

	/// Record with `local_id`, if present.
	pub fn asset(&self, local_id: i64) -> Option<&AssetRecord> {
		self.index.get(&local_id).map(|pos| &self.assets[*pos])
	}

	/// Record with `local_id`, or [`ExportError::MissingAsset`].
	pub fn require_asset(&self, local_id: i64) -> Result<&AssetRecord> {
		self.asset(local_id).ok_or_else(|| ExportError::MissingAsset {
			file: self.name.clone(),
			local_id,
		})
	}

	/// Records of one class, in file order.
	pub fn assets_of_class(&self, class_id: i32) -> impl Iterator<Item = &AssetRecord> {
		self.assets.iter().filter(move |item| item.class_id == class_id)
	}

	/// Dependency at a one-based slot.
	pub fn dependency(&self, slot: i32) -> Result<&Dependency> {
		usize::try_from(slot)
			.ok()
			.and_then(|slot| slot.checked_sub(1))
			.and_then(|index| self.dependencies.get(index))
			.ok_or_else(|| ExportError::MissingDependency {
				file: self.name.clone(),
				slot,
			})
	}
}

/// Source of decoded asset files.
pub trait AssetLoader {
	/// Whether `path` can be loaded.
	fn exists(&self, path: &Path) -> bool;

	/// Load and decode one asset file.
	fn load(&self, path: &Path) -> Result<AssetFile>;
}

/// Arena of loaded asset files.
#[derive(Debug, Default)]
pub struct AssetStore {
	files: Vec<AssetFile>,
	by_name: HashMap<String, FileId>,
}

impl AssetStore {
	/// Empty store.
	pub fn new() -> Self {
		Self::default()
	}

	/// Add a file, returning its id. A file with an already loaded name returns the existing id.
	pub fn insert(&mut self, file: AssetFile) -> FileId {
		let key = file.name.to_ascii_lowercase();
		if let Some(existing) = self.by_name.get(&key) {
			return *existing;
		}
		let id = FileId(self.files.len());
		self.by_name.insert(key, id);
		self.files.push(file);
		id
	}

	/// Load `path` through `loader` unless a file with the same name is already present.
	pub fn load_with(&mut self, loader: &dyn AssetLoader, path: &Path) -> Result<FileId> {
		if let Some(id) = self.find(base_name(&path.to_string_lossy())) {
			return Ok(id);
		}
		let file = loader.load(path)?;
		Ok(self.insert(file))
	}

	/// Look up a loaded file by name, ignoring case.
	pub fn find(&self, name: &str) -> Option<FileId> {
		self.by_name.get(&name.to_ascii_lowercase()).copied()
	}

	/// Borrow a loaded file.
	///
	/// Ids are only handed out by this store, so indexing cannot go out of range.
	pub fn file(&self, id: FileId) -> &AssetFile {
		&self.files[id.0]
	}

	/// Loaded files in load order.
	pub fn files(&self) -> impl Iterator<Item = (FileId, &AssetFile)> {
		self.files.iter().enumerate().map(|(pos, file)| (FileId(pos), file))
	}

	/// Record addressed by `asset`.
	pub fn record(&self, asset: AssetRef) -> Result<&AssetRecord> {
		self.file(asset.file).require_asset(asset.local_id)
	}

	/// Resolve a raw file slot seen inside `file` to a loaded file.
	///
	/// Slot 0 is `file` itself. Returns `None` when the dependency is declared but not loaded.
	pub fn resolve_slot(&self, file: FileId, slot: i32) -> Result<Option<FileId>> {
		if slot == 0 {
			return Ok(Some(file));
		}
		let dependency = self.file(file).dependency(slot)?;
		Ok(self.find(dependency.file_name()))
	}

	/// Name of the file a raw slot seen inside `file` refers to.
	pub fn slot_file_name(&self, file: FileId, slot: i32) -> Result<&str> {
		if slot == 0 {
			return Ok(&self.file(file).name);
		}
		Ok(self.file(file).dependency(slot)?.file_name())
	}
}

/// Final path component of a `/`- or `\`-separated path.
pub fn base_name(path: &str) -> &str {
	path.rsplit(['/', '\\']).next().unwrap_or(path)
}
