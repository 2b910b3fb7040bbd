use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::asset::pptr::RawRef;
use crate::asset::{
	AssetLoader, AssetRef, AssetStore, Collection, ContentHasher, DecodeOptions, ExportError, ExportState, ExporterRegistry, FieldValue, FileId, Guid,
	Importer, Md5Hasher, MetaFile, PathAllocator, Result, build_collection, collection_guid, export_documents, meta_path, render_documents,
};

/// Primary manager file of a game data directory.
pub const MANAGERS_FILE: &str = "globalgamemanagers";
/// Resource container file.
pub const RESOURCES_FILE: &str = "resources.assets";

/// Engine bookkeeping records that are never exported.
const IGNORED_TYPES: &[&str] = &[
	"PreloadData",
	"AssetBundle",
	"BuildSettings",
	"DelayedCallManager",
	"MonoManager",
	"ResourceManager",
	"RuntimeInitializeOnLoadManager",
	"ScriptMapper",
	"StreamingManager",
	"MonoScript",
];

/// Settings records whose project file name differs from their type name.
const SETTINGS_RENAMES: &[(&str, &str)] = &[
	("PhysicsManager", "DynamicsManager"),
	("NavMeshProjectSettings", "NavMeshAreas"),
	("PlayerSettings", "ProjectSettings"),
];

/// Configuration of one export run.
#[derive(Debug, Clone, Default)]
pub struct ExportOptions {
	/// Game data directory holding the manager, level and shared asset files.
	pub data_dir: PathBuf,
	/// Project root to write into.
	pub output_dir: PathBuf,
	/// Record decoding limits for loaders built from these options.
	pub decode: DecodeOptions,
	/// Known extension-assembly identifiers by assembly file name.
	pub extension_guids: HashMap<String, Guid>,
}

impl ExportOptions {
	/// Options for exporting `data_dir` into `output_dir`.
	pub fn new(data_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
		Self {
			data_dir: data_dir.into(),
			output_dir: output_dir.into(),
			..Self::default()
		}
	}
}

/// Counts reported at the end of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportSummary {
	/// Project settings files written.
	pub settings: usize,
	/// Asset collections written.
	pub collections: usize,
	/// Scenes written.
	pub scenes: usize,
	/// Folder sidecars written.
	pub folders: usize,
	/// References resolved by content hash.
	pub deferred_refs: usize,
}

#[derive(Debug)]
struct Destination {
	base: PathBuf,
	known: HashMap<i64, String>,
}

/// Drives a full export of one game data directory.
pub struct GameExporter<'l> {
	loader: &'l dyn AssetLoader,
	options: ExportOptions,
	registry: ExporterRegistry,
	hasher: Md5Hasher,
	store: AssetStore,
	state: ExportState,
	paths: PathAllocator,
	destinations: HashMap<FileId, Destination>,
	summary: ExportSummary,
}

impl<'l> GameExporter<'l> {
	/// Exporter reading through `loader` with the built-in exporter set.
	pub fn new(options: ExportOptions, loader: &'l dyn AssetLoader) -> Result<Self> {
		Ok(Self {
			loader,
			state: ExportState::new(options.extension_guids.clone()),
			options,
			registry: ExporterRegistry::with_defaults()?,
			hasher: Md5Hasher,
			store: AssetStore::new(),
			paths: PathAllocator::new(),
			destinations: HashMap::new(),
			summary: ExportSummary::default(),
		})
	}

	/// Mutable access to the exporter set, for registering custom exporters before [`GameExporter::run`].
	pub fn registry_mut(&mut self) -> &mut ExporterRegistry {
		&mut self.registry
	}

	/// Loaded files.
	pub fn store(&self) -> &AssetStore {
		&self.store
	}

	/// Run-wide state, including discovered references and claimed members.
	pub fn state(&self) -> &ExportState {
		&self.state
	}

	/// Export settings, resources, every scene and its shared assets, then folder sidecars.
	///
	/// Every scene's files are loaded and given a destination before the first asset is
	/// exported, so references into a later scene's shared assets claim their paths first.
	pub fn run(&mut self) -> Result<ExportSummary> {
		let managers = self.load_file(MANAGERS_FILE)?;
		self.export_project_settings(managers)?;
		self.write_project_version(managers)?;

		let scenes = self.scene_list(managers);
		let mut files = Vec::with_capacity(scenes.len());
		for index in 0..scenes.len() {
			let shared = self.load_optional(&format!("sharedassets{index}.assets"))?;
			let level = self.load_optional(&format!("level{index}"))?;
			if let Some(shared) = shared {
				let base = self.options.output_dir.join("Assets");
				self.destinations.entry(shared).or_insert(Destination {
					base,
					known: HashMap::new(),
				});
			}
			files.push((shared, level));
		}

		self.export_resources(managers)?;
		for (index, (scene, (shared, level))) in scenes.iter().zip(files).enumerate() {
			info!(index, scene = %scene, "exporting scene");
			if let Some(shared) = shared {
				self.export_all_assets(shared)?;
			}
			match level {
				Some(level) => self.export_level(scene, level)?,
				None => warn!(index, scene = %scene, "level file missing, scene skipped"),
			}
		}

		self.drain_pending()?;
		self.write_folder_metas()?;
		self.summary.deferred_refs = self.state.discovered.len();
		info!(
			settings = self.summary.settings,
			collections = self.summary.collections,
			scenes = self.summary.scenes,
			folders = self.summary.folders,
			"export finished"
		);
		Ok(self.summary.clone())
	}

	/// Load `name` from the data directory, then every shipped dependency it declares.
	fn load_file(&mut self, name: &str) -> Result<FileId> {
		if let Some(id) = self.store.find(name) {
			return Ok(id);
		}

		let id = self.store.load_with(self.loader, &self.options.data_dir.join(name))?;
		let shipped: Vec<String> = self
			.store
			.file(id)
			.dependencies
			.iter()
			.filter(|item| item.guid.is_zero())
			.map(|item| item.file_name().to_owned())
			.collect();

		for dependency in shipped {
			if self.store.find(&dependency).is_some() {
				continue;
			}
			if self.loader.exists(&self.options.data_dir.join(&dependency)) {
				self.load_file(&dependency)?;
			} else {
				warn!(file = %self.store.file(id).name, dependency = %dependency, "dependency not found, skipped");
			}
		}
		Ok(id)
	}

	fn load_optional(&mut self, name: &str) -> Result<Option<FileId>> {
		if self.store.find(name).is_none() && !self.loader.exists(&self.options.data_dir.join(name)) {
			debug!(file = name, "optional file not present");
			return Ok(None);
		}
		self.load_file(name).map(Some)
	}

	fn export_project_settings(&mut self, managers: FileId) -> Result<()> {
		let records: Vec<(i64, String)> = self
			.store
			.file(managers)
			.assets()
			.iter()
			.map(|item| (item.local_id, item.type_name().to_owned()))
			.collect();

		for (local_id, type_name) in records {
			if is_ignored(&type_name) {
				continue;
			}
			let name = SETTINGS_RENAMES
				.iter()
				.find(|(from, _)| *from == type_name)
				.map_or(type_name.as_str(), |(_, to)| *to);

			let collection = Collection::from_members(managers, [local_id]);
			let documents = export_documents(&self.registry, &self.store, &self.hasher, &mut self.state, &collection)?;
			let path = self.options.output_dir.join("ProjectSettings").join(format!("{name}.asset"));
			write_file(&path, &render_documents(&documents))?;
			info!(path = %path.display(), "exported settings");
			self.summary.settings += 1;
		}
		Ok(())
	}

	fn write_project_version(&mut self, managers: FileId) -> Result<()> {
		let version = self
			.store
			.file(managers)
			.assets()
			.iter()
			.find(|item| item.type_name() == "BuildSettings")
			.and_then(|item| item.value.get_str("m_Version").ok());
		let Some(version) = version else {
			warn!("no build settings version, ProjectVersion.txt skipped");
			return Ok(());
		};

		let path = self.options.output_dir.join("ProjectSettings").join("ProjectVersion.txt");
		write_file(&path, &format!("m_EditorVersion: {version}\n"))
	}

	fn scene_list(&self, managers: FileId) -> Vec<String> {
		let Some(settings) = self
			.store
			.file(managers)
			.assets()
			.iter()
			.find(|item| item.type_name() == "BuildSettings")
		else {
			warn!("no build settings record, no scenes exported");
			return Vec::new();
		};

		settings
			.value
			.lookup("m_Scenes")
			.map(|scenes| {
				scenes
					.elements()
					.iter()
					.filter_map(|item| item.primitive().and_then(|value| value.as_str()).map(str::to_owned))
					.collect()
			})
			.unwrap_or_default()
	}

	fn export_resources(&mut self, managers: FileId) -> Result<()> {
		let entries: Vec<(String, RawRef)> = {
			let Some(manager) = self
				.store
				.file(managers)
				.assets()
				.iter()
				.find(|item| item.type_name() == "ResourceManager")
			else {
				return Ok(());
			};
			let Ok(container) = manager.value.lookup("m_Container") else {
				return Ok(());
			};
			container
				.elements()
				.iter()
				.filter_map(|pair| match pair.children() {
					[first, second, ..] => {
						let key = first.primitive()?.as_str()?.to_owned();
						Some((key, RawRef::from_field(second).ok()?))
					}
					_ => None,
				})
				.collect()
		};
		if entries.is_empty() {
			return Ok(());
		}

		let Some(resources) = self.load_optional(RESOURCES_FILE)? else {
			warn!(entries = entries.len(), "resource container lists assets but {RESOURCES_FILE} is missing");
			return Ok(());
		};

		let mut known = HashMap::new();
		for (key, raw) in entries {
			if raw.is_null() || self.store.resolve_slot(managers, raw.file_slot)? != Some(resources) {
				continue;
			}
			known.entry(raw.local_id).or_insert(key);
		}

		let base = self.options.output_dir.join("Assets").join("Resources");
		self.destinations.insert(resources, Destination { base, known });
		self.export_all_assets(resources)
	}

	fn export_all_assets(&mut self, file: FileId) -> Result<()> {
		let ids: Vec<i64> = self.store.file(file).assets().iter().map(|item| item.local_id).collect();
		for local_id in ids {
			self.drain_pending()?;
			let seed = AssetRef { file, local_id };
			if self.should_export(seed) {
				self.export_from_seed(seed)?;
			}
		}
		self.drain_pending()
	}

	fn drain_pending(&mut self) -> Result<()> {
		while let Some(next) = self.state.pending.pop_front() {
			if self.destinations.contains_key(&next.file) && self.should_export(next) {
				debug!(file = %self.store.file(next.file).name, local_id = next.local_id, "exporting deferred root");
				self.export_from_seed(next)?;
			}
		}
		Ok(())
	}

	fn should_export(&self, asset: AssetRef) -> bool {
		if self.state.membership.is_claimed(asset.file, asset.local_id) {
			return false;
		}
		self.store
			.file(asset.file)
			.asset(asset.local_id)
			.is_some_and(|record| !is_ignored(record.type_name()))
	}

	fn export_from_seed(&mut self, seed: AssetRef) -> Result<()> {
		let collection = build_collection(&self.store, &mut self.state.membership, seed)?;
		let destination = self.destinations.get(&seed.file).ok_or_else(|| ExportError::MissingAssetFile {
			path: self.store.file(seed.file).name.clone(),
		})?;

		let path = self
			.paths
			.allocate(&destination.base, &self.store, &collection, Some(&destination.known))?;
		let documents = export_documents(&self.registry, &self.store, &self.hasher, &mut self.state, &collection)?;
		write_file(&path, &render_documents(&documents))?;

		let main = collection.main_asset(&self.store)?;
		let guid = collection_guid(&self.hasher, main.local_id, &self.store.file(seed.file).name);
		let importer = if main.type_name() == "GameObject" {
			Importer::Prefab
		} else {
			Importer::NativeFormat {
				main_object_file_id: main.local_id,
			}
		};
		MetaFile::asset(guid, importer).write_for(&path)?;

		info!(path = %path.display(), main = main.local_id, members = collection.len(), "exported collection");
		self.summary.collections += 1;
		Ok(())
	}

	fn export_level(&mut self, scene: &str, level: FileId) -> Result<()> {
		let file = self.store.file(level);
		let collection = Collection::from_members(level, file.assets().iter().map(|item| item.local_id));
		if let Ok(main) = collection.main_local_id() {
			for member in collection.members() {
				self.state.membership.claim(level, *member, main);
			}
		}

		let guid = file
			.assets()
			.iter()
			.find(|item| item.type_name() == "OcclusionCullingSettings")
			.and_then(|item| item.value.lookup("m_SceneGUID").ok())
			.and_then(engine_guid)
			.filter(|guid| !guid.is_zero())
			.unwrap_or_else(|| self.hasher.hash_str(scene));

		let documents = export_documents(&self.registry, &self.store, &self.hasher, &mut self.state, &collection)?;
		let path = self.options.output_dir.join(scene);
		write_file(&path, &render_documents(&documents))?;
		MetaFile::asset(guid, Importer::Default).write_for(&path)?;

		info!(path = %path.display(), objects = collection.len(), "exported scene");
		self.summary.scenes += 1;
		Ok(())
	}

	/// Write a folder sidecar for every directory under `Assets` that lacks one.
	fn write_folder_metas(&mut self) -> Result<()> {
		let assets = self.options.output_dir.join("Assets");
		if !assets.is_dir() {
			return Ok(());
		}

		for entry in WalkDir::new(&assets).min_depth(1).sort_by_file_name() {
			let entry = entry.map_err(std::io::Error::from)?;
			if !entry.file_type().is_dir() || meta_path(entry.path()).exists() {
				continue;
			}
			let relative = entry
				.path()
				.strip_prefix(&self.options.output_dir)
				.unwrap_or(entry.path())
				.to_string_lossy()
				.replace('\\', "/");
			MetaFile::folder(self.hasher.hash_str(&relative)).write_for(entry.path())?;
			self.summary.folders += 1;
		}
		Ok(())
	}
}

fn is_ignored(type_name: &str) -> bool {
	IGNORED_TYPES.contains(&type_name)
}

fn engine_guid(field: &FieldValue) -> Option<Guid> {
	let words: Vec<u32> = field
		.children()
		.iter()
		.map(|item| item.primitive().and_then(|value| value.as_i64()).and_then(|value| u32::try_from(value).ok()))
		.collect::<Option<_>>()?;
	let words: [u32; 4] = words.try_into().ok()?;
	Some(Guid::from_engine_words(words))
}

fn write_file(path: &Path, text: &str) -> Result<()> {
	if let Some(parent) = path.parent() {
		fs::create_dir_all(parent)?;
	}
	fs::write(path, text)?;
	Ok(())
}
