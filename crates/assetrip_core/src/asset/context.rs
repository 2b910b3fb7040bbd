use std::collections::{BTreeSet, HashMap, VecDeque};

use crate::asset::{
	AssetFile, AssetRecord, AssetRef, AssetStore, Collection, ContentHasher, Document, ExporterRegistry, FieldValue, FileId, Guid, Node,
	Result, RootMembership,
};

/// Raw reference that could not be resolved inside the exported collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DiscoveredRef {
	/// File the reference was seen in.
	pub source: FileId,
	/// Raw file slot relative to `source`.
	pub file_slot: i32,
	/// Referenced local id.
	pub local_id: i64,
}

/// Cross-collection state owned by one export run.
#[derive(Debug, Default)]
pub struct ExportState {
	/// References resolved by content hash rather than by membership.
	pub discovered: BTreeSet<DiscoveredRef>,
	/// Unclaimed root assets found through external references, in discovery order.
	pub pending: VecDeque<AssetRef>,
	/// Claimed members per file.
	pub membership: RootMembership,
	/// Known identifiers of extension assemblies, keyed by assembly file name.
	pub extension_guids: HashMap<String, Guid>,
}

impl ExportState {
	/// Fresh state with a configured extension-assembly table.
	pub fn new(extension_guids: HashMap<String, Guid>) -> Self {
		Self {
			extension_guids,
			..Self::default()
		}
	}

	/// Queue a root asset for export unless it is already queued.
	pub fn queue(&mut self, root: AssetRef) {
		if !self.pending.contains(&root) {
			self.pending.push_back(root);
		}
	}
}

/// Scope of one collection export.
pub struct ExportContext<'a> {
	/// Active exporter set.
	pub registry: &'a ExporterRegistry,
	/// Loaded asset files.
	pub store: &'a AssetStore,
	/// Identifier hash.
	pub hasher: &'a dyn ContentHasher,
	/// Collection being exported.
	pub collection: &'a Collection,
	/// Member currently being exported.
	pub asset: AssetRef,
	/// Run-wide side-channel state.
	pub state: &'a mut ExportState,
}

impl<'a> ExportContext<'a> {
	/// Dispatch `field` to the highest-priority matching exporter.
	pub fn export(&mut self, parent: Option<&FieldValue>, field: &FieldValue) -> Result<Node> {
		self.export_skipping(parent, field, None)
	}

	/// Dispatch `field`, ignoring the exporter labelled `skip`.
	pub fn export_skipping(&mut self, parent: Option<&FieldValue>, field: &FieldValue, skip: Option<&str>) -> Result<Node> {
		let registry = self.registry;
		let exporter = registry.pick(parent.map(|item| &*item.template), &field.template, skip)?;
		exporter.export(self, parent, field)
	}

	/// File owning the current member.
	pub fn file(&self) -> &'a AssetFile {
		self.store.file(self.asset.file)
	}

	/// Top-level record of the current member.
	pub fn record(&self) -> Result<&'a AssetRecord> {
		self.store.record(self.asset)
	}
}

/// Export every member of `collection` as one document each, in member order.
pub fn export_documents(
	registry: &ExporterRegistry,
	store: &AssetStore,
	hasher: &dyn ContentHasher,
	state: &mut ExportState,
	collection: &Collection,
) -> Result<Vec<Document>> {
	let file = store.file(collection.file());
	let mut documents = Vec::with_capacity(collection.len());
	for local_id in collection.members() {
		let record = file.require_asset(*local_id)?;
		let mut cx = ExportContext {
			registry,
			store,
			hasher,
			collection,
			asset: AssetRef {
				file: collection.file(),
				local_id: *local_id,
			},
			state: &mut *state,
		};
		let root = cx.export(None, &record.value)?;
		documents.push(Document {
			class_id: record.class_id,
			local_id: *local_id,
			type_name: record.type_name().into(),
			root,
		});
	}
	Ok(documents)
}
