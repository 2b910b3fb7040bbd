use thiserror::Error;

/// Crate-local result type.
pub type Result<T> = std::result::Result<T, ExportError>;

/// Errors produced while reading class databases, decoding assets, and exporting projects.
#[derive(Debug, Error)]
pub enum ExportError {
	/// Filesystem or stream IO failure.
	#[error("io: {0}")]
	Io(#[from] std::io::Error),
	/// Leading container magic was not `cldb`.
	#[error("not a class database (magic={magic:?})")]
	BadMagic {
		/// First 4 bytes of the stream.
		magic: [u8; 4],
	},
	/// Container version outside the supported range.
	#[error("unsupported class database version {version} (expected 1..=4)")]
	UnsupportedCldbVersion {
		/// Parsed container version.
		version: u8,
	},
	/// Compression tag byte is not a known mode.
	#[error("unknown compression tag {tag}")]
	UnknownCompression {
		/// Parsed tag byte.
		tag: u8,
	},
	/// Compression mode cannot be written, or is not valid for the container version.
	#[error("compression {kind} is not supported for writing")]
	UnsupportedCompression {
		/// Compression label.
		kind: &'static str,
	},
	/// Compressed payload could not be decoded.
	#[error("{kind} decompression failed: {reason}")]
	Decompress {
		/// Compression label.
		kind: &'static str,
		/// Decoder message.
		reason: String,
	},
	/// Decompressed payload size differs from the recorded size.
	#[error("decompressed {got} bytes, header declared {expected}")]
	DecompressedSizeMismatch {
		/// Size recorded in the header.
		expected: usize,
		/// Size actually produced.
		got: usize,
	},
	/// Decompressed payload exceeded the hard size limit.
	#[error("decompressed payload exceeds {limit} bytes")]
	DecompressedTooLarge {
		/// Byte limit.
		limit: usize,
	},
	/// Not enough bytes remained for a requested read.
	#[error("unexpected eof at offset {at}, need {need} bytes, remaining {rem}")]
	UnexpectedEof {
		/// Byte offset where the read was attempted.
		at: usize,
		/// Requested bytes.
		need: usize,
		/// Bytes still available.
		rem: usize,
	},
	/// String table reference points past the table.
	#[error("string ref {offset} out of range (table is {len} bytes)")]
	StringRefOutOfRange {
		/// Referenced offset.
		offset: u32,
		/// String table length.
		len: usize,
	},
	/// String table entry is not valid UTF-8.
	#[error("string ref {offset} is not valid utf-8")]
	StringRefNotUtf8 {
		/// Referenced offset.
		offset: u32,
	},
	/// Container flags require an assembly name the class record lacks.
	#[error("class {class_id} has no assembly name")]
	MissingAssemblyName {
		/// Engine class id.
		class_id: i32,
	},
	/// Flat field list skipped a nesting level or has no root.
	#[error("class {class_id}: bad field depth {depth} at entry {index}")]
	BadFieldDepth {
		/// Engine class id.
		class_id: i32,
		/// Field entry index.
		index: usize,
		/// Offending depth.
		depth: u8,
	},
	/// Engine class id has no record in the class database.
	#[error("class id {class_id} not found in class database")]
	UnknownClass {
		/// Engine class id.
		class_id: i32,
	},
	/// Class name has no record in the class database.
	#[error("class {name} not found in class database")]
	UnknownClassName {
		/// Requested class name.
		name: String,
	},
	/// Decode recursion exceeded configured depth limit.
	#[error("decode depth limit exceeded ({depth})")]
	DecodeDepthLimit {
		/// Configured limit.
		depth: u32,
	},
	/// Serialized array length is negative or exceeds the configured limit.
	#[error("array length {len} exceeds limit {limit}")]
	DecodeArrayLimit {
		/// Serialized length.
		len: i64,
		/// Configured limit.
		limit: usize,
	},
	/// Array template does not expose a size and an element child.
	#[error("array template {name} has no element template")]
	MalformedArrayTemplate {
		/// Field name.
		name: String,
	},
	/// No registered exporter matched a field.
	#[error("no exporter found for field {name} of type {type_name}")]
	NoExporterFound {
		/// Field name.
		name: String,
		/// Declared field type name.
		type_name: String,
	},
	/// An exporter was asked to handle a field shape it does not support.
	#[error("exporter {exporter} cannot export field {name} of type {type_name}")]
	UnsupportedField {
		/// Exporter label.
		exporter: &'static str,
		/// Field name.
		name: String,
		/// Declared field type name.
		type_name: String,
	},
	/// Exporter rule carried an invalid regular expression.
	#[error("invalid exporter pattern: {0}")]
	InvalidRegex(#[from] regex::Error),
	/// Named child field was not present.
	#[error("missing field {path}")]
	MissingField {
		/// Requested path.
		path: String,
	},
	/// Field was present but held a different value kind.
	#[error("field {path} is not {expected}")]
	TypeMismatch {
		/// Requested path.
		path: String,
		/// Expected value kind.
		expected: &'static str,
	},
	/// Field path expression could not be parsed.
	#[error("invalid field path: {path}")]
	InvalidFieldPath {
		/// Raw path expression.
		path: String,
	},
	/// Asset id is not present in the owning file.
	#[error("asset {local_id} not found in {file}")]
	MissingAsset {
		/// Owning file name.
		file: String,
		/// Requested local id.
		local_id: i64,
	},
	/// Asset file has not been loaded and could not be found.
	#[error("asset file {path} not found")]
	MissingAssetFile {
		/// Requested path.
		path: String,
	},
	/// Dependency slot is outside the owning file's dependency list.
	#[error("{file} has no dependency slot {slot}")]
	MissingDependency {
		/// Owning file name.
		file: String,
		/// One-based dependency slot.
		slot: i32,
	},
	/// Streamed payload file referenced by an asset was not found.
	#[error("streamed payload file {path} not found")]
	MissingStreamFile {
		/// Expected path.
		path: String,
	},
	/// A path or identity was requested for a collection without members.
	#[error("collection has no main asset")]
	MissingMainAsset,
	/// Guid text was not 32 hex digits.
	#[error("invalid guid {text:?}")]
	InvalidGuid {
		/// Raw text.
		text: String,
	},
	/// Dump or configuration JSON could not be parsed.
	#[error("json: {0}")]
	Json(#[from] serde_json::Error),
	/// Dump payload was not valid hex.
	#[error("hex: {0}")]
	Hex(#[from] hex::FromHexError),
}
