use crate::asset::bytes::{ByteWriter, Cursor};
use crate::asset::{Compression, ExportError, Result};

/// Parsed class database container header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CldbHeader {
	/// Container version, `1..=4`.
	pub version: u8,
	/// Container flags; bit 0 marks per-type assembly names. Stored from version 4.
	pub flags: u8,
	/// Whole-body compression. Stored from version 2.
	pub compression: Compression,
	/// Size of the stored body in bytes. Stored from version 3.
	pub compressed_size: u32,
	/// Size of the body after decompression. Stored from version 3.
	pub uncompressed_size: u32,
	/// Engine versions this database describes.
	pub engine_versions: Vec<Box<str>>,
	/// Length of the string table in bytes.
	pub string_table_len: u32,
	/// Offset of the string table from the start of the (decompressed) body.
	pub string_table_pos: u32,
}

impl CldbHeader {
	/// Leading container magic.
	pub const MAGIC: [u8; 4] = *b"cldb";
	/// Oldest supported container version.
	pub const MIN_VERSION: u8 = 1;
	/// Newest supported container version.
	pub const MAX_VERSION: u8 = 4;
	/// Flag bit marking per-type assembly name references.
	pub const FLAG_ASSEMBLY_NAMES: u8 = 1;

	/// Create a header for writing; size and table fields are filled in by the writer.
	pub fn new(version: u8, compression: Compression) -> Self {
		Self {
			version,
			flags: 0,
			compression,
			compressed_size: 0,
			uncompressed_size: 0,
			engine_versions: Vec::new(),
			string_table_len: 0,
			string_table_pos: 0,
		}
	}

	/// Parse and validate a header at the cursor position.
	///
	/// Magic and version are checked before any other field is read.
	pub fn parse(cursor: &mut Cursor<'_>) -> Result<Self> {
		let magic = cursor.read_code4()?;
		if magic != Self::MAGIC {
			return Err(ExportError::BadMagic { magic });
		}

		let version = cursor.read_u8()?;
		if !(Self::MIN_VERSION..=Self::MAX_VERSION).contains(&version) {
			return Err(ExportError::UnsupportedCldbVersion { version });
		}

		let flags = if version >= 4 { cursor.read_u8()? } else { 0 };
		let compression = if version >= 2 {
			Compression::from_tag(cursor.read_u8()?)?
		} else {
			Compression::None
		};

		let (compressed_size, uncompressed_size) = if version >= 3 {
			(cursor.read_u32_le()?, cursor.read_u32_le()?)
		} else {
			(0, 0)
		};

		let count = cursor.read_u8()?;
		let mut engine_versions = Vec::with_capacity(usize::from(count));
		for _ in 0..count {
			engine_versions.push(cursor.read_short_string()?);
		}

		let string_table_len = cursor.read_u32_le()?;
		let string_table_pos = cursor.read_u32_le()?;

		Ok(Self {
			version,
			flags,
			compression,
			compressed_size,
			uncompressed_size,
			engine_versions,
			string_table_len,
			string_table_pos,
		})
	}

	/// Serialize this header, emitting only the fields its version stores.
	pub fn write(&self, out: &mut ByteWriter) -> Result<()> {
		if !(Self::MIN_VERSION..=Self::MAX_VERSION).contains(&self.version) {
			return Err(ExportError::UnsupportedCldbVersion { version: self.version });
		}
		if self.version < 2 && self.compression != Compression::None {
			return Err(ExportError::UnsupportedCompression {
				kind: self.compression.as_str(),
			});
		}

		out.write_bytes(&Self::MAGIC);
		out.write_u8(self.version);
		if self.version >= 4 {
			out.write_u8(self.flags);
		}
		if self.version >= 2 {
			out.write_u8(self.compression.tag());
		}
		if self.version >= 3 {
			out.write_u32_le(self.compressed_size);
			out.write_u32_le(self.uncompressed_size);
		}

		let count = self.engine_versions.len().min(usize::from(u8::MAX));
		out.write_u8(count as u8);
		for item in self.engine_versions.iter().take(count) {
			out.write_short_string(item);
		}

		out.write_u32_le(self.string_table_len);
		out.write_u32_le(self.string_table_pos);
		Ok(())
	}

	/// Whether type records carry an assembly name reference.
	pub fn has_assembly_names(&self) -> bool {
		self.flags & Self::FLAG_ASSEMBLY_NAMES != 0
	}
}
