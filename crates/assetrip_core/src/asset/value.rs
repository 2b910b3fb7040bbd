use std::fmt;
use std::sync::Arc;

use crate::asset::{ExportError, FieldPath, FieldTemplate, PathStep, Result, ValueKind};

/// Decoded leaf value.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
	/// Boolean value.
	Bool(bool),
	/// Signed 8-bit integer.
	I8(i8),
	/// Unsigned 8-bit integer.
	U8(u8),
	/// Signed 16-bit integer.
	I16(i16),
	/// Unsigned 16-bit integer.
	U16(u16),
	/// Signed 32-bit integer.
	I32(i32),
	/// Unsigned 32-bit integer.
	U32(u32),
	/// Signed 64-bit integer.
	I64(i64),
	/// Unsigned 64-bit integer.
	U64(u64),
	/// 32-bit float.
	F32(f32),
	/// 64-bit float.
	F64(f64),
	/// UTF-8 string.
	String(Box<str>),
}

impl Primitive {
	/// Kind of this value.
	pub fn kind(&self) -> ValueKind {
		match self {
			Self::Bool(_) => ValueKind::Bool,
			Self::I8(_) => ValueKind::Int8,
			Self::U8(_) => ValueKind::UInt8,
			Self::I16(_) => ValueKind::Int16,
			Self::U16(_) => ValueKind::UInt16,
			Self::I32(_) => ValueKind::Int32,
			Self::U32(_) => ValueKind::UInt32,
			Self::I64(_) => ValueKind::Int64,
			Self::U64(_) => ValueKind::UInt64,
			Self::F32(_) => ValueKind::Float,
			Self::F64(_) => ValueKind::Double,
			Self::String(_) => ValueKind::String,
		}
	}

	/// Integer value widened to `i64`, if it fits.
	pub fn as_i64(&self) -> Option<i64> {
		match *self {
			Self::Bool(value) => Some(i64::from(value)),
			Self::I8(value) => Some(i64::from(value)),
			Self::U8(value) => Some(i64::from(value)),
			Self::I16(value) => Some(i64::from(value)),
			Self::U16(value) => Some(i64::from(value)),
			Self::I32(value) => Some(i64::from(value)),
			Self::U32(value) => Some(i64::from(value)),
			Self::I64(value) => Some(value),
			Self::U64(value) => i64::try_from(value).ok(),
			Self::F32(_) | Self::F64(_) | Self::String(_) => None,
		}
	}

	/// String contents, if this is a string.
	pub fn as_str(&self) -> Option<&str> {
		match self {
			Self::String(value) => Some(value),
			_ => None,
		}
	}

	/// Little-endian serialized bytes; strings contribute their UTF-8 bytes.
	pub fn le_bytes(&self) -> Vec<u8> {
		match self {
			Self::Bool(value) => vec![u8::from(*value)],
			Self::I8(value) => value.to_le_bytes().to_vec(),
			Self::U8(value) => vec![*value],
			Self::I16(value) => value.to_le_bytes().to_vec(),
			Self::U16(value) => value.to_le_bytes().to_vec(),
			Self::I32(value) => value.to_le_bytes().to_vec(),
			Self::U32(value) => value.to_le_bytes().to_vec(),
			Self::I64(value) => value.to_le_bytes().to_vec(),
			Self::U64(value) => value.to_le_bytes().to_vec(),
			Self::F32(value) => value.to_le_bytes().to_vec(),
			Self::F64(value) => value.to_le_bytes().to_vec(),
			Self::String(value) => value.as_bytes().to_vec(),
		}
	}
}

impl fmt::Display for Primitive {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Bool(value) => write!(f, "{}", u8::from(*value)),
			Self::I8(value) => write!(f, "{value}"),
			Self::U8(value) => write!(f, "{value}"),
			Self::I16(value) => write!(f, "{value}"),
			Self::U16(value) => write!(f, "{value}"),
			Self::I32(value) => write!(f, "{value}"),
			Self::U32(value) => write!(f, "{value}"),
			Self::I64(value) => write!(f, "{value}"),
			Self::U64(value) => write!(f, "{value}"),
			Self::F32(value) => write_float(f, f64::from(*value), &value.to_string()),
			Self::F64(value) => write_float(f, *value, &value.to_string()),
			Self::String(value) => f.write_str(value),
		}
	}
}

fn write_float(f: &mut fmt::Formatter<'_>, value: f64, shortest: &str) -> fmt::Result {
	if value.is_nan() {
		f.write_str("NaN")
	} else if value.is_infinite() {
		f.write_str(if value > 0.0 { "Infinity" } else { "-Infinity" })
	} else {
		f.write_str(shortest)
	}
}

/// Payload of a [`FieldValue`].
#[derive(Debug, Clone, PartialEq)]
pub enum FieldData {
	/// Leaf value.
	Leaf(Primitive),
	/// Structural children, or array elements for array nodes.
	Children(Vec<FieldValue>),
}

/// Data node bound to a [`FieldTemplate`].
///
/// Array nodes hold their elements directly as children, without the size field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldValue {
	/// Shape of this node.
	pub template: Arc<FieldTemplate>,
	/// Leaf value or children.
	pub data: FieldData,
}

impl FieldValue {
	/// Create a leaf node.
	pub fn leaf(template: Arc<FieldTemplate>, value: Primitive) -> Self {
		Self {
			template,
			data: FieldData::Leaf(value),
		}
	}

	/// Create a structural or array node.
	pub fn node(template: Arc<FieldTemplate>, children: Vec<FieldValue>) -> Self {
		Self {
			template,
			data: FieldData::Children(children),
		}
	}

	/// Declared field name.
	pub fn name(&self) -> &str {
		&self.template.name
	}

	/// Declared type name.
	pub fn type_name(&self) -> &str {
		&self.template.type_name
	}

	/// Whether this node carries a leaf value.
	pub fn is_leaf(&self) -> bool {
		self.template.is_leaf()
	}

	/// Leaf value, if any.
	pub fn primitive(&self) -> Option<&Primitive> {
		match &self.data {
			FieldData::Leaf(value) => Some(value),
			FieldData::Children(_) => None,
		}
	}

	/// Children in order; empty for leaves.
	pub fn children(&self) -> &[FieldValue] {
		match &self.data {
			FieldData::Leaf(_) => &[],
			FieldData::Children(children) => children,
		}
	}

	/// Mutable children; `None` for leaves.
	pub fn children_mut(&mut self) -> Option<&mut Vec<FieldValue>> {
		match &mut self.data {
			FieldData::Leaf(_) => None,
			FieldData::Children(children) => Some(children),
		}
	}

	/// Find a direct child by name.
	pub fn child(&self, name: &str) -> Option<&FieldValue> {
		self.children().iter().find(|item| item.name() == name)
	}

	/// Resolve a path expression relative to this node.
	///
	/// Indexing a `vector`-like wrapper selects from its single array child.
	pub fn lookup(&self, path: &str) -> Result<&FieldValue> {
		let parsed = FieldPath::parse(path)?;
		let missing = || ExportError::MissingField { path: path.to_owned() };

		let mut current = self;
		for step in &parsed.steps {
			current = match step {
				PathStep::Field(name) => current.child(name).ok_or_else(missing)?,
				PathStep::Index(index) => current.elements().get(*index).ok_or_else(missing)?,
			};
		}
		Ok(current)
	}

	/// Resolve a path expression relative to this node for mutation.
	pub fn lookup_mut(&mut self, path: &str) -> Result<&mut FieldValue> {
		let parsed = FieldPath::parse(path)?;
		let missing = || ExportError::MissingField { path: path.to_owned() };

		let mut current = self;
		for step in &parsed.steps {
			current = match step {
				PathStep::Field(name) => current
					.children_mut()
					.and_then(|children| children.iter_mut().find(|item| item.name() == name))
					.ok_or_else(missing)?,
				PathStep::Index(index) => current.elements_mut().and_then(|items| items.get_mut(*index)).ok_or_else(missing)?,
			};
		}
		Ok(current)
	}

	/// Array elements of this node, looking through a single-array wrapper.
	pub fn elements(&self) -> &[FieldValue] {
		if self.template.is_array {
			return self.children();
		}
		match self.children() {
			[only] if only.template.is_array => only.children(),
			_ => &[],
		}
	}

	/// Mutable array elements of this node, looking through a single-array wrapper.
	pub fn elements_mut(&mut self) -> Option<&mut Vec<FieldValue>> {
		if self.template.is_array {
			return self.children_mut();
		}
		match self.children_mut()?.as_mut_slice() {
			[only] if only.template.is_array => only.children_mut(),
			_ => None,
		}
	}

	/// Read an integer at `path`.
	pub fn get_i64(&self, path: &str) -> Result<i64> {
		self.lookup(path)?
			.primitive()
			.and_then(Primitive::as_i64)
			.ok_or_else(|| ExportError::TypeMismatch {
				path: path.to_owned(),
				expected: "integer",
			})
	}

	/// Read a string at `path`.
	pub fn get_str(&self, path: &str) -> Result<&str> {
		self.lookup(path)?
			.primitive()
			.and_then(Primitive::as_str)
			.ok_or_else(|| ExportError::TypeMismatch {
				path: path.to_owned(),
				expected: "string",
			})
	}
}
