use std::io::{Read, Write};

use crate::asset::{ExportError, Result};

const MAX_DECOMPRESSED_BYTES: usize = 512 * 1024 * 1024;
const LZMA_PRESET: u32 = 6;

/// Whole-body compression applied to a class database payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
	/// Payload stored as-is.
	None,
	/// Raw LZ4 block. Read-only.
	Lz4,
	/// LZMA-alone stream (5 property bytes, 8 byte size, data).
	Lzma,
}

impl Compression {
	/// Map the on-disk tag byte to a compression mode.
	pub fn from_tag(tag: u8) -> Result<Self> {
		match tag {
			0 => Ok(Self::None),
			1 => Ok(Self::Lz4),
			2 => Ok(Self::Lzma),
			_ => Err(ExportError::UnknownCompression { tag }),
		}
	}

	/// Return the on-disk tag byte.
	pub fn tag(self) -> u8 {
		match self {
			Self::None => 0,
			Self::Lz4 => 1,
			Self::Lzma => 2,
		}
	}

	/// Render compression mode as a stable lowercase label.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::None => "none",
			Self::Lz4 => "lz4",
			Self::Lzma => "lzma",
		}
	}

	/// Parse a lowercase label as printed by [`Compression::as_str`].
	pub fn parse(label: &str) -> Option<Self> {
		match label {
			"none" => Some(Self::None),
			"lz4" => Some(Self::Lz4),
			"lzma" => Some(Self::Lzma),
			_ => None,
		}
	}

	/// Whether [`compress`] accepts this mode.
	pub fn is_writable(self) -> bool {
		matches!(self, Self::None | Self::Lzma)
	}
}

/// Decompress a whole payload; `expected` of 0 means the size is not recorded.
pub(crate) fn decompress(kind: Compression, payload: &[u8], expected: usize) -> Result<Vec<u8>> {
	if expected > MAX_DECOMPRESSED_BYTES {
		return Err(ExportError::DecompressedTooLarge { limit: MAX_DECOMPRESSED_BYTES });
	}

	let out = match kind {
		Compression::None => payload.to_vec(),
		Compression::Lz4 => {
			if expected == 0 {
				return Err(ExportError::Decompress {
					kind: kind.as_str(),
					reason: "lz4 payload without recorded size".to_owned(),
				});
			}
			lz4_flex::block::decompress(payload, expected).map_err(|err| ExportError::Decompress {
				kind: kind.as_str(),
				reason: err.to_string(),
			})?
		}
		Compression::Lzma => decompress_lzma(payload)?,
	};

	if expected != 0 && out.len() != expected {
		return Err(ExportError::DecompressedSizeMismatch {
			expected,
			got: out.len(),
		});
	}

	Ok(out)
}

/// Compress a whole payload. LZ4 output is not supported.
pub(crate) fn compress(kind: Compression, payload: &[u8]) -> Result<Vec<u8>> {
	match kind {
		Compression::None => Ok(payload.to_vec()),
		Compression::Lzma => compress_lzma(payload),
		Compression::Lz4 => Err(ExportError::UnsupportedCompression { kind: kind.as_str() }),
	}
}

fn decompress_lzma(payload: &[u8]) -> Result<Vec<u8>> {
	let stream = xz2::stream::Stream::new_lzma_decoder(u64::MAX).map_err(|err| lzma_error(err.to_string()))?;
	let mut decoder = xz2::read::XzDecoder::new_stream(payload, stream);
	let mut out = Vec::new();
	let mut buf = [0_u8; 8192];

	loop {
		let read = decoder.read(&mut buf).map_err(|err| lzma_error(err.to_string()))?;
		if read == 0 {
			break;
		}

		if out.len() + read > MAX_DECOMPRESSED_BYTES {
			return Err(ExportError::DecompressedTooLarge { limit: MAX_DECOMPRESSED_BYTES });
		}

		out.extend_from_slice(&buf[..read]);
	}

	Ok(out)
}

fn compress_lzma(payload: &[u8]) -> Result<Vec<u8>> {
	let options = xz2::stream::LzmaOptions::new_preset(LZMA_PRESET).map_err(|err| lzma_error(err.to_string()))?;
	let stream = xz2::stream::Stream::new_lzma_encoder(&options).map_err(|err| lzma_error(err.to_string()))?;
	let mut encoder = xz2::write::XzEncoder::new_stream(Vec::new(), stream);
	encoder.write_all(payload)?;
	Ok(encoder.finish()?)
}

fn lzma_error(reason: String) -> ExportError {
	ExportError::Decompress { kind: "lzma", reason }
}

#[cfg(test)]
mod tests {
	use super::{Compression, compress, decompress};
	use crate::asset::ExportError;

	#[test]
	fn lzma_round_trips() {
		let payload = b"cldb payload cldb payload cldb payload".repeat(8);
		let packed = compress(Compression::Lzma, &payload).expect("compresses");
		let unpacked = decompress(Compression::Lzma, &packed, payload.len()).expect("decompresses");
		assert_eq!(unpacked, payload);
	}

	#[test]
	fn lz4_reads_but_never_writes() {
		let payload = b"abcabcabcabcabcabc".to_vec();
		let packed = lz4_flex::block::compress(&payload);
		let unpacked = decompress(Compression::Lz4, &packed, payload.len()).expect("lz4 decodes");
		assert_eq!(unpacked, payload);

		let err = compress(Compression::Lz4, &payload).expect_err("lz4 write refused");
		assert!(matches!(err, ExportError::UnsupportedCompression { kind: "lz4" }));
	}

	#[test]
	fn size_mismatch_is_reported() {
		let err = decompress(Compression::None, b"abc", 4).expect_err("size mismatch");
		assert!(matches!(err, ExportError::DecompressedSizeMismatch { expected: 4, got: 3 }));
	}

	#[test]
	fn unknown_tag_is_rejected() {
		assert!(matches!(Compression::from_tag(7), Err(ExportError::UnknownCompression { tag: 7 })));
	}
}
