use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::asset::bytes::{ByteWriter, Cursor};
use crate::asset::compression::{compress, decompress};
use crate::asset::{CldbHeader, Compression, ExportError, Result};

/// Offset of a NUL-terminated string inside the database string table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StrRef(pub u32);

/// Parsed class database: the serialized shape of every engine class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassDatabase {
	/// Container header. Size and table fields are recomputed on write.
	pub header: CldbHeader,
	/// Class records in file order.
	pub classes: Vec<ClassType>,
	/// Raw string table referenced by [`StrRef`] values.
	pub strings: Vec<u8>,
}

/// One class record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassType {
	/// Engine class id.
	pub class_id: i32,
	/// Base class id, `-1` for roots.
	pub base_class: i32,
	/// Class name.
	pub name: StrRef,
	/// Defining assembly, present when the header carries assembly names.
	pub assembly: Option<StrRef>,
	/// Flattened field list in depth-first order; entry 0 is the record root.
	pub fields: Vec<ClassField>,
}

/// One flattened field entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassField {
	/// Declared type name.
	pub type_name: StrRef,
	/// Declared field name.
	pub field_name: StrRef,
	/// Nesting depth, 0 for the record root.
	pub depth: u8,
	/// Whether this entry is an array node.
	pub is_array: bool,
	/// Serialized byte size, `-1` when variable.
	pub size: i32,
	/// Schema version of this field. Stored from container version 3.
	pub version: u16,
	/// Serialization meta flags (`0x4000` aligns after the field).
	pub meta_flags: u32,
}

impl ClassField {
	/// Meta flag requesting 4-byte alignment after the field.
	pub const ALIGN_FLAG: u32 = 0x4000;

	/// Whether the field is followed by 4-byte alignment.
	pub fn aligned(&self) -> bool {
		self.meta_flags & Self::ALIGN_FLAG != 0
	}
}

impl ClassDatabase {
	/// Read and parse a database file.
	pub fn open(path: impl AsRef<Path>) -> Result<Self> {
		let raw = fs::read(path)?;
		Self::read(&raw)
	}

	/// Parse a database from bytes.
	pub fn read(bytes: &[u8]) -> Result<Self> {
		let mut cursor = Cursor::new(bytes);
		let header = CldbHeader::parse(&mut cursor)?;

		let body = if header.compression == Compression::None {
			cursor.rest().to_vec()
		} else {
			let stored = if header.version >= 3 {
				cursor.read_exact(header.compressed_size as usize)?
			} else {
				cursor.rest()
			};
			decompress(header.compression, stored, header.uncompressed_size as usize)?
		};

		let mut body_cursor = Cursor::new(&body);
		body_cursor.seek(header.string_table_pos as usize)?;
		let strings = body_cursor.read_exact(header.string_table_len as usize)?.to_vec();

		body_cursor.seek(0)?;
		let count = body_cursor.read_u32_le()?;
		let mut classes = Vec::with_capacity(count.min(4096) as usize);
		for _ in 0..count {
			classes.push(ClassType::read(&mut body_cursor, &header)?);
		}

		Ok(Self { header, classes, strings })
	}

	/// Serialize the database, deriving every size and offset header field.
	pub fn write(&self) -> Result<Vec<u8>> {
		if !self.header.compression.is_writable() {
			return Err(ExportError::UnsupportedCompression {
				kind: self.header.compression.as_str(),
			});
		}

		let mut body = ByteWriter::new();
		body.write_u32_le(self.classes.len() as u32);
		for item in &self.classes {
			item.write(&mut body, &self.header)?;
		}
		let string_table_pos = body.pos();
		body.write_bytes(&self.strings);
		let uncompressed_size = body.pos();
		let payload = compress(self.header.compression, &body.into_bytes())?;

		let mut header = self.header.clone();
		header.string_table_pos = string_table_pos as u32;
		header.string_table_len = (uncompressed_size - string_table_pos) as u32;
		header.uncompressed_size = uncompressed_size as u32;
		header.compressed_size = payload.len() as u32;

		let mut out = ByteWriter::new();
		header.write(&mut out)?;
		out.write_bytes(&payload);
		Ok(out.into_bytes())
	}

	/// Resolve a string table reference.
	pub fn string(&self, item: StrRef) -> Result<&str> {
		let start = item.0 as usize;
		let rem = self.strings.get(start..).ok_or(ExportError::StringRefOutOfRange {
			offset: item.0,
			len: self.strings.len(),
		})?;
		let end = rem.iter().position(|byte| *byte == 0).unwrap_or(rem.len());
		std::str::from_utf8(&rem[..end]).map_err(|_| ExportError::StringRefNotUtf8 { offset: item.0 })
	}

	/// Look up a class by engine class id.
	pub fn class_by_id(&self, class_id: i32) -> Option<&ClassType> {
		self.classes.iter().find(|item| item.class_id == class_id)
	}

	/// Look up a class by name.
	pub fn class_by_name(&self, name: &str) -> Option<&ClassType> {
		self.classes.iter().find(|item| self.string(item.name).is_ok_and(|value| value == name))
	}
}

impl ClassType {
	fn read(cursor: &mut Cursor<'_>, header: &CldbHeader) -> Result<Self> {
		let class_id = cursor.read_i32_le()?;
		let base_class = cursor.read_i32_le()?;
		let name = StrRef(cursor.read_u32_le()?);
		let assembly = if header.has_assembly_names() {
			Some(StrRef(cursor.read_u32_le()?))
		} else {
			None
		};

		let field_count = cursor.read_u32_le()?;
		let mut fields = Vec::with_capacity(field_count.min(4096) as usize);
		for _ in 0..field_count {
			fields.push(ClassField::read(cursor, header.version)?);
		}

		Ok(Self {
			class_id,
			base_class,
			name,
			assembly,
			fields,
		})
	}

	fn write(&self, out: &mut ByteWriter, header: &CldbHeader) -> Result<()> {
		out.write_i32_le(self.class_id);
		out.write_i32_le(self.base_class);
		out.write_u32_le(self.name.0);
		if header.has_assembly_names() {
			let assembly = self.assembly.ok_or(ExportError::MissingAssemblyName { class_id: self.class_id })?;
			out.write_u32_le(assembly.0);
		}

		out.write_u32_le(self.fields.len() as u32);
		for field in &self.fields {
			field.write(out, header.version);
		}
		Ok(())
	}
}

impl ClassField {
	fn read(cursor: &mut Cursor<'_>, version: u8) -> Result<Self> {
		let type_name = StrRef(cursor.read_u32_le()?);
		let field_name = StrRef(cursor.read_u32_le()?);
		let depth = cursor.read_u8()?;
		let is_array = cursor.read_u8()? != 0;
		let size = cursor.read_i32_le()?;
		let field_version = if version >= 3 { cursor.read_u16_le()? } else { 1 };
		let meta_flags = cursor.read_u32_le()?;

		Ok(Self {
			type_name,
			field_name,
			depth,
			is_array,
			size,
			version: field_version,
			meta_flags,
		})
	}

	fn write(&self, out: &mut ByteWriter, version: u8) {
		out.write_u32_le(self.type_name.0);
		out.write_u32_le(self.field_name.0);
		out.write_u8(self.depth);
		out.write_u8(u8::from(self.is_array));
		out.write_i32_le(self.size);
		if version >= 3 {
			out.write_u16_le(self.version);
		}
		out.write_u32_le(self.meta_flags);
	}
}

/// Interning builder for database string tables.
#[derive(Debug, Default)]
pub struct StringTableBuilder {
	bytes: Vec<u8>,
	offsets: HashMap<Box<str>, StrRef>,
}

impl StringTableBuilder {
	/// Create an empty table.
	pub fn new() -> Self {
		Self::default()
	}

	/// Return the reference for `value`, appending it on first use.
	pub fn intern(&mut self, value: &str) -> StrRef {
		if let Some(existing) = self.offsets.get(value) {
			return *existing;
		}

		let item = StrRef(self.bytes.len() as u32);
		self.bytes.extend_from_slice(value.as_bytes());
		self.bytes.push(0);
		self.offsets.insert(value.into(), item);
		item
	}

	/// Consume the builder and return the table bytes.
	pub fn finish(self) -> Vec<u8> {
		self.bytes
	}
}
