mod bytes;
mod cldb;
mod collection;
mod compression;
mod context;
mod decode;
mod error;
mod exporters;
mod game;
mod hash;
mod header;
mod loader;
mod meta;
mod path;
mod paths;
mod pptr;
mod registry;
mod source;
mod template;
#[cfg(test)]
mod test_support;
mod value;
mod yaml;

/// Class database container and string table types.
pub use cldb::{ClassDatabase, ClassField, ClassType, StrRef, StringTableBuilder};
/// Collection grouping and claimed-member tracking.
pub use collection::{Collection, RootMembership, build_collection, find_root_asset};
/// Container compression modes.
pub use compression::Compression;
/// Per-collection export scope and run-wide state.
pub use context::{DiscoveredRef, ExportContext, ExportState, export_documents};
/// Record decoding entry point and options.
pub use decode::{DecodeOptions, decode_asset};
/// Error and result aliases.
pub use error::{ExportError, Result};
/// Key of the streamed or inline blob payload entry.
pub use exporters::TYPELESS_DATA_KEY;
/// Whole-game export driver.
pub use game::{ExportOptions, ExportSummary, GameExporter, MANAGERS_FILE, RESOURCES_FILE};
/// Identifier hashing.
pub use hash::{ContentHasher, Guid, Md5Hasher, script_file_id};
/// Container header representation.
pub use header::CldbHeader;
/// JSON dump loader.
pub use loader::{AssetDump, DependencyDump, DumpLoader, RecordDump, dump_path};
/// Sidecar metadata.
pub use meta::{Importer, MetaFile, collection_guid, meta_path};
/// Field path parser types.
pub use path::{FieldPath, PathStep};
/// Output path assignment.
pub use paths::{PathAllocator, SCRIPT_OBJECTS_DIR, UNNAMED, category, display_name, sanitize_file_name};
/// Pointer resolution.
pub use pptr::{RawRef, Reference, resolve_reference};
/// Exporter dispatch.
pub use registry::{Builtin, Exporter, ExporterRegistry, FieldExporter, Rule};
/// Loaded asset files and the loader seam.
pub use source::{AssetFile, AssetLoader, AssetRecord, AssetRef, AssetStore, Dependency, FileId, base_name};
/// Field schema nodes.
pub use template::{FieldTemplate, ValueKind};
/// Decoded field trees.
pub use value::{FieldData, FieldValue, Primitive};
/// Output nodes and document rendering.
pub use yaml::{Document, Mapping, MappingStyle, Node, Sequence, SequenceStyle, inline_text, render_documents, render_mapping};
