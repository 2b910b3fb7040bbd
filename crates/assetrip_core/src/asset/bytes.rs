use crate::asset::{ExportError, Result};

/// Simple bounded cursor over an immutable little-endian byte slice.
pub struct Cursor<'a> {
	bytes: &'a [u8],
	pos: usize,
}

impl<'a> Cursor<'a> {
	/// Create a cursor at position 0.
	pub fn new(bytes: &'a [u8]) -> Self {
		Self { bytes, pos: 0 }
	}

	/// Return current byte offset.
	pub fn pos(&self) -> usize {
		self.pos
	}

	/// Move to an absolute offset inside the slice.
	pub fn seek(&mut self, pos: usize) -> Result<()> {
		if pos > self.bytes.len() {
			return Err(ExportError::UnexpectedEof {
				at: self.pos,
				need: pos - self.bytes.len(),
				rem: self.remaining(),
			});
		}
		self.pos = pos;
		Ok(())
	}

	/// Return remaining unread bytes.
	pub fn remaining(&self) -> usize {
		self.bytes.len().saturating_sub(self.pos)
	}

	/// Return all unread bytes without advancing.
	pub fn rest(&self) -> &'a [u8] {
		&self.bytes[self.pos.min(self.bytes.len())..]
	}

	/// Read exactly `n` bytes and advance cursor.
	pub fn read_exact(&mut self, n: usize) -> Result<&'a [u8]> {
		if n > self.remaining() {
			return Err(ExportError::UnexpectedEof {
				at: self.pos,
				need: n,
				rem: self.remaining(),
			});
		}

		let start = self.pos;
		self.pos += n;
		Ok(&self.bytes[start..self.pos])
	}

	/// Read a four-byte code.
	pub fn read_code4(&mut self) -> Result<[u8; 4]> {
		self.read_array()
	}

	/// Read one byte.
	pub fn read_u8(&mut self) -> Result<u8> {
		Ok(self.read_exact(1)?[0])
	}

	/// Read a little-endian `u16`.
	pub fn read_u16_le(&mut self) -> Result<u16> {
		Ok(u16::from_le_bytes(self.read_array()?))
	}

	/// Read a little-endian `u32`.
	pub fn read_u32_le(&mut self) -> Result<u32> {
		Ok(u32::from_le_bytes(self.read_array()?))
	}

	/// Read a little-endian `i32`.
	pub fn read_i32_le(&mut self) -> Result<i32> {
		Ok(i32::from_le_bytes(self.read_array()?))
	}

	/// Read a little-endian `u64`.
	pub fn read_u64_le(&mut self) -> Result<u64> {
		Ok(u64::from_le_bytes(self.read_array()?))
	}

	/// Read a little-endian `i64`.
	pub fn read_i64_le(&mut self) -> Result<i64> {
		Ok(i64::from_le_bytes(self.read_array()?))
	}

	/// Read a `u8`-length-prefixed string.
	pub fn read_short_string(&mut self) -> Result<Box<str>> {
		let len = usize::from(self.read_u8()?);
		let bytes = self.read_exact(len)?;
		Ok(String::from_utf8_lossy(bytes).into_owned().into_boxed_str())
	}

	/// Advance to the next 4-byte aligned position.
	pub fn align4(&mut self) -> Result<()> {
		let aligned = (self.pos + 3) & !3;
		let skip = aligned.saturating_sub(self.pos);
		let _ = self.read_exact(skip)?;
		Ok(())
	}

	fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
		let raw = self.read_exact(N)?;
		let mut out = [0_u8; N];
		out.copy_from_slice(raw);
		Ok(out)
	}
}

/// Append-only little-endian byte writer.
#[derive(Debug, Default)]
pub struct ByteWriter {
	bytes: Vec<u8>,
}

impl ByteWriter {
	/// Create an empty writer.
	pub fn new() -> Self {
		Self::default()
	}

	/// Return number of bytes written so far.
	pub fn pos(&self) -> usize {
		self.bytes.len()
	}

	/// Append raw bytes.
	pub fn write_bytes(&mut self, bytes: &[u8]) {
		self.bytes.extend_from_slice(bytes);
	}

	/// Append one byte.
	pub fn write_u8(&mut self, value: u8) {
		self.bytes.push(value);
	}

	/// Append a little-endian `u16`.
	pub fn write_u16_le(&mut self, value: u16) {
		self.write_bytes(&value.to_le_bytes());
	}

	/// Append a little-endian `u32`.
	pub fn write_u32_le(&mut self, value: u32) {
		self.write_bytes(&value.to_le_bytes());
	}

	/// Append a little-endian `i32`.
	pub fn write_i32_le(&mut self, value: i32) {
		self.write_bytes(&value.to_le_bytes());
	}

	/// Append a `u8`-length-prefixed string, truncating to 255 bytes.
	pub fn write_short_string(&mut self, value: &str) {
		let bytes = value.as_bytes();
		let len = bytes.len().min(usize::from(u8::MAX));
		self.write_u8(len as u8);
		self.write_bytes(&bytes[..len]);
	}

	/// Consume the writer and return its bytes.
	pub fn into_bytes(self) -> Vec<u8> {
		self.bytes
	}
}
