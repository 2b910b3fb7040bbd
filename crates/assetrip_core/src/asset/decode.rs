use std::sync::Arc;

use crate::asset::bytes::Cursor;
use crate::asset::{ExportError, FieldTemplate, FieldValue, Primitive, Result, ValueKind};

/// Runtime limits for decoding serialized asset records.
#[derive(Debug, Clone)]
pub struct DecodeOptions {
	/// Maximum template nesting depth.
	pub max_depth: u32,
	/// Maximum allowed array element count.
	pub max_array_len: usize,
}

impl Default for DecodeOptions {
	fn default() -> Self {
		Self {
			max_depth: 64,
			max_array_len: 1 << 24,
		}
	}
}

/// Decode one serialized record through its class template.
pub fn decode_asset(template: &Arc<FieldTemplate>, bytes: &[u8], opt: &DecodeOptions) -> Result<FieldValue> {
	let mut cursor = Cursor::new(bytes);
	decode_field(&mut cursor, template, opt, 0)
}

fn decode_field(cursor: &mut Cursor<'_>, template: &Arc<FieldTemplate>, opt: &DecodeOptions, depth: u32) -> Result<FieldValue> {
	if depth >= opt.max_depth {
		return Err(ExportError::DecodeDepthLimit { depth: opt.max_depth });
	}

	let value = if template.is_array {
		let element = template.element().ok_or_else(|| ExportError::MalformedArrayTemplate {
			name: template.name.to_string(),
		})?;
		let len = read_len(cursor, opt)?;
		let mut items = Vec::with_capacity(len.min(4096));
		for _ in 0..len {
			items.push(decode_field(cursor, element, opt, depth + 1)?);
		}
		FieldValue::node(template.clone(), items)
	} else if template.is_leaf() {
		FieldValue::leaf(template.clone(), read_primitive(cursor, template, opt)?)
	} else {
		let mut children = Vec::with_capacity(template.children.len());
		for child in &template.children {
			children.push(decode_field(cursor, child, opt, depth + 1)?);
		}
		FieldValue::node(template.clone(), children)
	};

	if template.align {
		cursor.align4()?;
	}
	Ok(value)
}

fn read_len(cursor: &mut Cursor<'_>, opt: &DecodeOptions) -> Result<usize> {
	let raw = cursor.read_i32_le()?;
	match usize::try_from(raw) {
		Ok(len) if len <= opt.max_array_len => Ok(len),
		_ => Err(ExportError::DecodeArrayLimit {
			len: i64::from(raw),
			limit: opt.max_array_len,
		}),
	}
}

fn read_primitive(cursor: &mut Cursor<'_>, template: &FieldTemplate, opt: &DecodeOptions) -> Result<Primitive> {
	let value = match template.value_kind {
		ValueKind::Bool => Primitive::Bool(cursor.read_u8()? != 0),
		ValueKind::Int8 => Primitive::I8(cursor.read_u8()? as i8),
		ValueKind::UInt8 => Primitive::U8(cursor.read_u8()?),
		ValueKind::Int16 => Primitive::I16(cursor.read_u16_le()? as i16),
		ValueKind::UInt16 => Primitive::U16(cursor.read_u16_le()?),
		ValueKind::Int32 => Primitive::I32(cursor.read_i32_le()?),
		ValueKind::UInt32 => Primitive::U32(cursor.read_u32_le()?),
		ValueKind::Int64 => Primitive::I64(cursor.read_i64_le()?),
		ValueKind::UInt64 => Primitive::U64(cursor.read_u64_le()?),
		ValueKind::Float => Primitive::F32(f32::from_bits(cursor.read_u32_le()?)),
		ValueKind::Double => Primitive::F64(f64::from_bits(cursor.read_u64_le()?)),
		ValueKind::String => {
			let len = read_len(cursor, opt)?;
			let bytes = cursor.read_exact(len)?;
			Primitive::String(String::from_utf8_lossy(bytes).into_owned().into_boxed_str())
		}
		ValueKind::None => {
			return Err(ExportError::UnsupportedField {
				exporter: "decode",
				name: template.name.to_string(),
				type_name: template.type_name.to_string(),
			});
		}
	};
	Ok(value)
}
