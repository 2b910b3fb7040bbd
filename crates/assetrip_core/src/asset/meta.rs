use std::fs;
use std::path::{Path, PathBuf};

use crate::asset::{ContentHasher, Guid, Mapping, Node, Result, render_mapping};

/// Importer block of a sidecar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Importer {
	/// Folders and scenes.
	Default,
	/// Game object hierarchies.
	Prefab,
	/// Any other native asset.
	NativeFormat {
		/// Local id of the main object.
		main_object_file_id: i64,
	},
}

impl Importer {
	fn key(self) -> &'static str {
		match self {
			Self::Default => "DefaultImporter",
			Self::Prefab => "PrefabImporter",
			Self::NativeFormat { .. } => "NativeFormatImporter",
		}
	}
}

/// Sidecar metadata written next to every exported file and folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetaFile {
	/// Identifier of the described file.
	pub guid: Guid,
	/// Whether the described path is a folder.
	pub folder: bool,
	/// Importer block.
	pub importer: Importer,
}

impl MetaFile {
	/// Sidecar for a folder.
	pub fn folder(guid: Guid) -> Self {
		Self {
			guid,
			folder: true,
			importer: Importer::Default,
		}
	}

	/// Sidecar for an exported file.
	pub fn asset(guid: Guid, importer: Importer) -> Self {
		Self {
			guid,
			folder: false,
			importer,
		}
	}

	/// Render the sidecar text.
	pub fn render(&self) -> String {
		let mut importer = Mapping::block();
		importer.insert("externalObjects", Mapping::block().into());
		if let Importer::NativeFormat { main_object_file_id } = self.importer {
			importer.insert("mainObjectFileID", Node::int(main_object_file_id));
		}
		importer.insert("userData", Node::string(""));
		importer.insert("assetBundleName", Node::string(""));
		importer.insert("assetBundleVariant", Node::string(""));

		let mut root = Mapping::block();
		root.insert("fileFormatVersion", Node::int(2));
		root.insert("guid", Node::string(&self.guid.to_string()));
		if self.folder {
			root.insert("folderAsset", Node::string("yes"));
		}
		root.insert(self.importer.key(), importer.into());
		render_mapping(&root)
	}

	/// Write the sidecar next to `target` as `<target>.meta`.
	pub fn write_for(&self, target: &Path) -> Result<PathBuf> {
		let path = meta_path(target);
		fs::write(&path, self.render())?;
		Ok(path)
	}
}

/// Sidecar path of `target`.
pub fn meta_path(target: &Path) -> PathBuf {
	let mut name = target.as_os_str().to_owned();
	name.push(".meta");
	PathBuf::from(name)
}

/// Identifier of a collection: hash of its main asset id followed by the source file name.
pub fn collection_guid(hasher: &dyn ContentHasher, main_local_id: i64, file_name: &str) -> Guid {
	hasher.hash_str(&format!("{main_local_id}{file_name}"))
}

#[cfg(test)]
mod tests {
	use std::path::Path;

	use super::{Importer, MetaFile, collection_guid, meta_path};
	use crate::asset::{ContentHasher, Guid, Md5Hasher};

	#[test]
	fn native_format_sidecar_layout() {
		let guid = Guid::parse("0123456789abcdef0123456789abcdef").expect("guid");
		let text = MetaFile::asset(guid, Importer::NativeFormat { main_object_file_id: 11400000 }).render();
		assert_eq!(
			text,
			"fileFormatVersion: 2\n\
			guid: 0123456789abcdef0123456789abcdef\n\
			NativeFormatImporter:\n  externalObjects: {}\n  mainObjectFileID: 11400000\n  userData:\n  assetBundleName:\n  assetBundleVariant:\n"
		);
	}

	#[test]
	fn folder_sidecar_marks_folder_asset() {
		let text = MetaFile::folder(Guid::ZERO).render();
		assert!(text.contains("folderAsset: yes\nDefaultImporter:\n  externalObjects: {}\n"));
		assert!(!text.contains("mainObjectFileID"));
	}

	#[test]
	fn collection_guid_hashes_id_then_file_name() {
		assert_eq!(collection_guid(&Md5Hasher, 42, "sharedassets0.assets"), Md5Hasher.hash_str("42sharedassets0.assets"));
		assert_eq!(meta_path(Path::new("a/b.prefab")), Path::new("a/b.prefab.meta"));
	}
}
