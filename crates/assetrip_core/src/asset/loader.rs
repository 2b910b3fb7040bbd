use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::asset::source::base_name;
use crate::asset::{
	AssetFile, AssetLoader, AssetRecord, ClassDatabase, DecodeOptions, Dependency, ExportError, FieldTemplate, Guid, Result, decode_asset,
};

/// Serialized form of one asset file dump.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetDump {
	/// File name; defaults to the dumped file's name.
	#[serde(default)]
	pub name: Option<String>,
	/// Declared dependencies in slot order.
	#[serde(default)]
	pub dependencies: Vec<DependencyDump>,
	/// Serialized records.
	pub assets: Vec<RecordDump>,
}

/// Serialized dependency entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DependencyDump {
	/// Declared path.
	pub path: String,
	/// Known identifier as 32 hex digits.
	#[serde(default)]
	pub guid: Option<String>,
}

/// Serialized record entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordDump {
	/// Local id.
	pub local_id: i64,
	/// Engine class id.
	pub class_id: i32,
	/// Raw record bytes as hex.
	pub data: String,
}

/// Path of the dump describing `path`.
pub fn dump_path(path: &Path) -> PathBuf {
	let mut name = path.as_os_str().to_owned();
	name.push(".json");
	PathBuf::from(name)
}

/// Loads `<file>.json` dumps and decodes their records through the class database.
#[derive(Debug)]
pub struct DumpLoader {
	db: ClassDatabase,
	options: DecodeOptions,
	templates: RefCell<HashMap<i32, Arc<FieldTemplate>>>,
}

impl DumpLoader {
	/// Loader decoding with `db` under `options`.
	pub fn new(db: ClassDatabase, options: DecodeOptions) -> Self {
		Self {
			db,
			options,
			templates: RefCell::new(HashMap::new()),
		}
	}

	/// Class database in use.
	pub fn database(&self) -> &ClassDatabase {
		&self.db
	}

	/// Template of `class_id`, built once and cached.
	pub fn template(&self, class_id: i32) -> Result<Arc<FieldTemplate>> {
		if let Some(template) = self.templates.borrow().get(&class_id) {
			return Ok(template.clone());
		}
		let class = self.db.class_by_id(class_id).ok_or(ExportError::UnknownClass { class_id })?;
		let template = FieldTemplate::from_class_type(&self.db, class)?;
		self.templates.borrow_mut().insert(class_id, template.clone());
		Ok(template)
	}

	/// Decode an in-memory dump as if it were stored at `path`.
	pub fn decode_dump(&self, path: &Path, dump: AssetDump) -> Result<AssetFile> {
		let name = dump
			.name
			.unwrap_or_else(|| base_name(&path.to_string_lossy()).to_owned());

		let dependencies = dump
			.dependencies
			.into_iter()
			.map(|item| {
				let guid = match item.guid.as_deref() {
					Some(text) if !text.is_empty() => Guid::parse(text)?,
					_ => Guid::ZERO,
				};
				Ok(Dependency { path: item.path, guid })
			})
			.collect::<Result<Vec<_>>>()?;

		let mut assets = Vec::with_capacity(dump.assets.len());
		for item in dump.assets {
			let template = self.template(item.class_id)?;
			let bytes = hex::decode(&item.data)?;
			let value = decode_asset(&template, &bytes, &self.options)?;
			assets.push(AssetRecord {
				local_id: item.local_id,
				class_id: item.class_id,
				value,
			});
		}

		debug!(file = %name, records = assets.len(), "decoded dump");
		Ok(AssetFile::new(&name, path.to_path_buf(), dependencies, assets))
	}
}

impl AssetLoader for DumpLoader {
	fn exists(&self, path: &Path) -> bool {
		dump_path(path).is_file()
	}

	fn load(&self, path: &Path) -> Result<AssetFile> {
		let source = dump_path(path);
		if !source.is_file() {
			return Err(ExportError::MissingAssetFile {
				path: path.display().to_string(),
			});
		}
		let dump: AssetDump = serde_json::from_slice(&fs::read(&source)?)?;
		self.decode_dump(path, dump)
	}
}
