use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::asset::{
	AssetFile, AssetLoader, AssetRecord, AssetRef, AssetStore, Collection, Dependency, ExportContext, ExportError, ExportState, ExporterRegistry,
	FieldData, FieldTemplate, FieldValue, Md5Hasher, Node, Primitive, Result, ValueKind, base_name,
};

pub(crate) fn pptr_template(name: &str, target: &str) -> FieldTemplate {
	FieldTemplate::node(
		name,
		&format!("PPtr<{target}>"),
		vec![FieldTemplate::leaf("m_FileID", "int"), FieldTemplate::leaf("m_PathID", "SInt64")],
	)
}

pub(crate) fn game_object_template() -> Arc<FieldTemplate> {
	let pair = FieldTemplate::node("data", "ComponentPair", vec![pptr_template("component", "Component")]);
	Arc::new(FieldTemplate::node(
		"Base",
		"GameObject",
		vec![
			FieldTemplate::vector("m_Component", pair),
			FieldTemplate::leaf("m_Layer", "unsigned int"),
			FieldTemplate::leaf("m_Name", "string").aligned(),
			FieldTemplate::leaf("m_IsActive", "bool"),
		],
	))
}

pub(crate) fn transform_template() -> Arc<FieldTemplate> {
	Arc::new(FieldTemplate::node(
		"Base",
		"Transform",
		vec![
			pptr_template("m_GameObject", "GameObject"),
			FieldTemplate::vector("m_Children", pptr_template("data", "Transform")),
			pptr_template("m_Father", "Transform"),
		],
	))
}

pub(crate) fn mono_behaviour_template() -> Arc<FieldTemplate> {
	Arc::new(FieldTemplate::node(
		"Base",
		"MonoBehaviour",
		vec![
			pptr_template("m_GameObject", "GameObject"),
			FieldTemplate::leaf("m_Enabled", "UInt8").aligned(),
			pptr_template("m_Script", "MonoScript"),
			FieldTemplate::leaf("m_Name", "string").aligned(),
			FieldTemplate::leaf("m_Speed", "float"),
		],
	))
}

pub(crate) fn mono_script_template() -> Arc<FieldTemplate> {
	Arc::new(FieldTemplate::node(
		"Base",
		"MonoScript",
		vec![
			FieldTemplate::leaf("m_Name", "string"),
			FieldTemplate::leaf("m_ClassName", "string"),
			FieldTemplate::leaf("m_Namespace", "string"),
			FieldTemplate::leaf("m_AssemblyName", "string"),
		],
	))
}

pub(crate) fn blank(template: &Arc<FieldTemplate>) -> FieldValue {
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

pub(crate) fn set(value: &mut FieldValue, path: &str, primitive: Primitive) {
	let target = value.lookup_mut(path).expect("path exists");
	target.data = FieldData::Leaf(primitive);
}

pub(crate) fn set_pptr(value: &mut FieldValue, path: &str, file_slot: i32, local_id: i64) {
	fill_pptr(value.lookup_mut(path).expect("pointer exists"), file_slot, local_id);
}

pub(crate) fn fill_pptr(target: &mut FieldValue, file_slot: i32, local_id: i64) {
	set(target, "m_FileID", Primitive::I32(file_slot));
	set(target, "m_PathID", Primitive::I64(local_id));
}

/// Append a blank element to the array at `path` and return it.
pub(crate) fn push<'v>(value: &'v mut FieldValue, path: &str) -> &'v mut FieldValue {
	let target = value.lookup_mut(path).expect("array exists");
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

/// Append a leaf element to the array at `path`.
pub(crate) fn push_leaf(value: &mut FieldValue, path: &str, primitive: Primitive) {
	push(value, path).data = FieldData::Leaf(primitive);
}

pub(crate) fn game_object(name: &str, components: &[i64]) -> FieldValue {
	let mut value = blank(&game_object_template());
	set(&mut value, "m_Name", Primitive::String(name.into()));
	for id in components {
		let pair = push(&mut value, "m_Component");
		set_pptr(pair, "component", 0, *id);
	}
	value
}

pub(crate) fn transform(game_object: i64, father: i64, children: &[i64]) -> FieldValue {
	let mut value = blank(&transform_template());
	set_pptr(&mut value, "m_GameObject", 0, game_object);
	set_pptr(&mut value, "m_Father", 0, father);
	for id in children {
		fill_pptr(push(&mut value, "m_Children"), 0, *id);
	}
	value
}

pub(crate) fn mono_behaviour(name: &str, game_object: i64, script: (i32, i64)) -> FieldValue {
	let mut value = blank(&mono_behaviour_template());
	set_pptr(&mut value, "m_GameObject", 0, game_object);
	set_pptr(&mut value, "m_Script", script.0, script.1);
	set(&mut value, "m_Name", Primitive::String(name.into()));
	value
}

pub(crate) fn mono_script(class_name: &str, namespace: &str, assembly: &str) -> FieldValue {
	let mut value = blank(&mono_script_template());
	set(&mut value, "m_Name", Primitive::String(class_name.into()));
	set(&mut value, "m_ClassName", Primitive::String(class_name.into()));
	set(&mut value, "m_Namespace", Primitive::String(namespace.into()));
	set(&mut value, "m_AssemblyName", Primitive::String(assembly.into()));
	value
}

pub(crate) fn record(local_id: i64, class_id: i32, value: FieldValue) -> AssetRecord {
	AssetRecord { local_id, class_id, value }
}

pub(crate) fn asset_file(name: &str, dependencies: Vec<Dependency>, records: Vec<AssetRecord>) -> AssetFile {
	AssetFile::new(name, PathBuf::from(name), dependencies, records)
}

pub(crate) fn shared_dependency(path: &str) -> Dependency {
	Dependency {
		path: path.to_owned(),
		guid: crate::asset::Guid::ZERO,
	}
}

/// Export one member of `collection` through the default registry.
pub(crate) fn try_export(store: &AssetStore, state: &mut ExportState, collection: &Collection, local_id: i64) -> Result<Node> {
	let registry = ExporterRegistry::with_defaults().expect("default registry");
	let record = store.file(collection.file()).require_asset(local_id)?;
	let mut cx = ExportContext {
		registry: &registry,
		store,
		hasher: &Md5Hasher,
		collection,
		asset: AssetRef {
			file: collection.file(),
			local_id,
		},
		state,
	};
	cx.export(None, &record.value)
}

pub(crate) fn export(store: &AssetStore, state: &mut ExportState, collection: &Collection, local_id: i64) -> Node {
	try_export(store, state, collection, local_id).expect("export succeeds")
}

/// In-memory loader keyed by file name.
#[derive(Default)]
pub(crate) struct MemoryLoader {
	pub(crate) files: HashMap<String, AssetFile>,
}

impl MemoryLoader {
	pub(crate) fn add(&mut self, data_dir: &Path, name: &str, dependencies: Vec<Dependency>, records: Vec<AssetRecord>) {
		let file = AssetFile::new(name, data_dir.join(name), dependencies, records);
		self.files.insert(name.to_owned(), file);
	}
}

impl AssetLoader for MemoryLoader {
	fn exists(&self, path: &Path) -> bool {
		self.files.contains_key(base_name(&path.to_string_lossy()))
	}

	fn load(&self, path: &Path) -> Result<AssetFile> {
		self.files
			.get(base_name(&path.to_string_lossy()))
			.cloned()
			.ok_or_else(|| ExportError::MissingAssetFile {
				path: path.display().to_string(),
			})
	}
}
