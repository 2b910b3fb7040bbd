use std::fmt;
use std::str::FromStr;

use md4::Md4;
use md5::{Digest, Md5};
use serde::Deserialize;

use crate::asset::{ExportError, Result};

/// 128-bit identifier, stored in display order.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(try_from = "String")]
pub struct Guid([u8; 16]);

impl Guid {
	/// All-zero identifier, meaning "none".
	pub const ZERO: Self = Self([0; 16]);

	/// Wrap raw bytes already in display order.
	pub fn from_bytes(bytes: [u8; 16]) -> Self {
		Self(bytes)
	}

	/// Bytes in display order.
	pub fn as_bytes(&self) -> &[u8; 16] {
		&self.0
	}

	/// Whether this is the zero identifier.
	pub fn is_zero(&self) -> bool {
		self.0 == [0; 16]
	}

	/// Build from an MD5 digest, rendered the way .NET formats a `Guid` built from those bytes.
	pub fn from_md5_digest(digest: [u8; 16]) -> Self {
		const ORDER: [usize; 16] = [3, 2, 1, 0, 5, 4, 7, 6, 8, 9, 10, 11, 12, 13, 14, 15];
		Self(ORDER.map(|index| digest[index]))
	}

	/// Build from the engine's four-word layout, where each word prints lowest nibble first.
	pub fn from_engine_words(words: [u32; 4]) -> Self {
		let mut out = [0_u8; 16];
		for (word_index, word) in words.iter().enumerate() {
			for byte_index in 0..4 {
				let byte = (word >> (byte_index * 8)) as u8;
				out[word_index * 4 + byte_index] = byte.rotate_left(4);
			}
		}
		Self(out)
	}

	/// Parse 32 hex digits.
	pub fn parse(text: &str) -> Result<Self> {
		let mut out = [0_u8; 16];
		hex::decode_to_slice(text, &mut out).map_err(|_| ExportError::InvalidGuid { text: text.to_owned() })?;
		Ok(Self(out))
	}
}

impl fmt::Display for Guid {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&hex::encode(self.0))
	}
}

impl fmt::Debug for Guid {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "Guid({self})")
	}
}

impl FromStr for Guid {
	type Err = ExportError;

	fn from_str(text: &str) -> Result<Self> {
		Self::parse(text)
	}
}

impl TryFrom<String> for Guid {
	type Error = ExportError;

	fn try_from(text: String) -> Result<Self> {
		Self::parse(&text)
	}
}

/// Content hash producing stable identifiers.
pub trait ContentHasher {
	/// Hash raw bytes.
	fn hash(&self, data: &[u8]) -> Guid;

	/// Hash the UTF-8 bytes of `text`.
	fn hash_str(&self, text: &str) -> Guid {
		self.hash(text.as_bytes())
	}
}

/// MD5-based hasher matching the editor's identifier derivation.
#[derive(Debug, Default, Clone, Copy)]
pub struct Md5Hasher;

impl ContentHasher for Md5Hasher {
	fn hash(&self, data: &[u8]) -> Guid {
		let digest = Md5::digest(data);
		let mut bytes = [0_u8; 16];
		bytes.copy_from_slice(&digest);
		Guid::from_md5_digest(bytes)
	}
}

/// Local file id of a script class inside a managed assembly.
pub fn script_file_id(namespace: &str, class_name: &str) -> i32 {
	let mut hasher = Md4::new();
	hasher.update(b"s\0\0\0");
	hasher.update(namespace.as_bytes());
	hasher.update(class_name.as_bytes());
	let digest = hasher.finalize();
	i32::from_le_bytes([digest[0], digest[1], digest[2], digest[3]])
}
