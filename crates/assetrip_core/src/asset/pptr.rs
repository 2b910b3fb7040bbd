use std::path::Path;

use tracing::debug;

use crate::asset::{
	AssetRef, DiscoveredRef, ExportContext, ExportError, FieldValue, Guid, Mapping, Node, Result, find_root_asset,
	script_file_id,
};

/// Reference kind code for explicit package dependencies.
const TYPE_DEPENDENCY: i64 = 0;
/// Reference kind code for content-hash addressed assets.
const TYPE_CONTENT: i64 = 2;
/// Reference kind code for script classes.
const TYPE_SCRIPT: i64 = 3;

/// `(fileSlot, localId)` pair as stored inside a pointer field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawRef {
	/// 0 for the same file, otherwise a one-based dependency slot.
	pub file_slot: i32,
	/// Target local id, 0 for null.
	pub local_id: i64,
}

impl RawRef {
	/// Read `m_FileID` and `m_PathID` from a pointer field.
	pub fn from_field(field: &FieldValue) -> Result<Self> {
		let slot = field.get_i64("m_FileID")?;
		let file_slot = i32::try_from(slot).map_err(|_| ExportError::TypeMismatch {
			path: format!("{}.m_FileID", field.name()),
			expected: "32-bit integer",
		})?;
		Ok(Self {
			file_slot,
			local_id: field.get_i64("m_PathID")?,
		})
	}

	/// Whether the pointer targets nothing.
	pub fn is_null(&self) -> bool {
		self.local_id == 0
	}

	/// Same-file, non-null target id.
	pub fn same_file_target(&self) -> Option<i64> {
		(self.file_slot == 0 && !self.is_null()).then_some(self.local_id)
	}
}

/// Read the pointer at `path` and return its same-file, non-null target.
pub(crate) fn same_file_ref(value: &FieldValue, path: &str) -> Option<i64> {
	value
		.lookup(path)
		.ok()
		.and_then(|field| RawRef::from_field(field).ok())
		.and_then(|raw| raw.same_file_target())
}

/// Outcome of resolving one pointer field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reference {
	/// No target.
	Null,
	/// Script class inside a managed assembly.
	Script {
		/// Class file id inside the assembly.
		file_id: i64,
		/// Assembly identifier.
		guid: Guid,
	},
	/// Asset in a dependency with a known identifier.
	KnownExternal {
		/// Target local id.
		local_id: i64,
		/// Dependency identifier.
		guid: Guid,
	},
	/// Member of the collection being exported.
	Local {
		/// Target local id.
		local_id: i64,
	},
	/// Asset in another collection, addressed by content hash.
	External {
		/// Target local id.
		local_id: i64,
		/// Identifier of the target's collection.
		guid: Guid,
	},
}

impl Reference {
	/// Stable lowercase label of the branch taken.
	pub fn kind(&self) -> &'static str {
		match self {
			Self::Null => "null",
			Self::Script { .. } => "script",
			Self::KnownExternal { .. } => "known-external",
			Self::Local { .. } => "local",
			Self::External { .. } => "external",
		}
	}

	/// Flow mapping form, e.g. `{fileID: 4, guid: ..., type: 2}`.
	pub fn to_node(&self) -> Node {
		let mut mapping = Mapping::flow();
		let (file_id, extra) = match *self {
			Self::Null => (0, None),
			Self::Local { local_id } => (local_id, None),
			Self::Script { file_id, guid } => (file_id, Some((guid, TYPE_SCRIPT))),
			Self::KnownExternal { local_id, guid } => (local_id, Some((guid, TYPE_DEPENDENCY))),
			Self::External { local_id, guid } => (local_id, Some((guid, TYPE_CONTENT))),
		};
		mapping.insert("fileID", Node::int(file_id));
		if let Some((guid, kind)) = extra {
			mapping.insert("guid", Node::string(&guid.to_string()));
			mapping.insert("type", Node::int(kind));
		}
		mapping.into()
	}
}

/// Resolve a pointer field; branches are tried in a fixed order and the first that applies wins.
pub fn resolve_reference(cx: &mut ExportContext<'_>, field: &FieldValue) -> Result<Reference> {
	let raw = RawRef::from_field(field)?;
	if raw.is_null() {
		return Ok(Reference::Null);
	}
	if field.name() == "m_Script" {
		return resolve_script(cx, raw);
	}
	if raw.file_slot != 0 {
		let dependency = cx.file().dependency(raw.file_slot)?;
		if !dependency.guid.is_zero() {
			return Ok(Reference::KnownExternal {
				local_id: raw.local_id,
				guid: dependency.guid,
			});
		}
	}
	if raw.file_slot == 0 && cx.collection.contains(raw.local_id) {
		return Ok(Reference::Local { local_id: raw.local_id });
	}
	resolve_external(cx, raw)
}

fn resolve_script(cx: &mut ExportContext<'_>, raw: RawRef) -> Result<Reference> {
	let file = cx
		.store
		.resolve_slot(cx.asset.file, raw.file_slot)?
		.ok_or_else(|| ExportError::MissingAssetFile {
			path: cx.store.slot_file_name(cx.asset.file, raw.file_slot).unwrap_or_default().to_owned(),
		})?;
	let script = cx.store.record(AssetRef {
		file,
		local_id: raw.local_id,
	})?;

	let class_name = script.value.get_str("m_ClassName")?;
	let namespace = script.value.get_str("m_Namespace").unwrap_or_default();
	let assembly = script.value.get_str("m_AssemblyName")?;

	let guid = match cx.state.extension_guids.get(assembly) {
		Some(guid) => *guid,
		None => {
			let stem = Path::new(assembly).file_stem().map(|stem| stem.to_string_lossy()).unwrap_or_default();
			cx.hasher.hash_str(&stem)
		}
	};

	Ok(Reference::Script {
		file_id: i64::from(script_file_id(namespace, class_name)),
		guid,
	})
}

fn resolve_external(cx: &mut ExportContext<'_>, raw: RawRef) -> Result<Reference> {
	let source = cx.asset.file;
	cx.state.discovered.insert(DiscoveredRef {
		source,
		file_slot: raw.file_slot,
		local_id: raw.local_id,
	});

	let target_name = cx.store.slot_file_name(source, raw.file_slot)?;
	let root = match cx.store.resolve_slot(source, raw.file_slot)? {
		Some(target) => match cx.state.membership.root_of(target, raw.local_id) {
			Some(root) => root,
			None => {
				let root = find_root_asset(cx.store, AssetRef {
					file: target,
					local_id: raw.local_id,
				})?;
				if cx.store.file(target).asset(root).is_some() {
					cx.state.queue(AssetRef { file: target, local_id: root });
				}
				root
			}
		},
		None => raw.local_id,
	};

	let guid = cx.hasher.hash_str(&format!("{root}{target_name}"));
	debug!(slot = raw.file_slot, local_id = raw.local_id, root, file = target_name, "deferred reference");
	Ok(Reference::External {
		local_id: raw.local_id,
		guid,
	})
}

#[cfg(test)]
mod tests;
