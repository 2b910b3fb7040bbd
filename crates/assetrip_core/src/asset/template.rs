use std::sync::Arc;

use crate::asset::{ClassDatabase, ClassType, ExportError, Result};

/// Primitive kind carried by a leaf field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ValueKind {
	/// Structural field; carries children instead of a value.
	None = 0,
	/// Boolean stored as one byte.
	Bool = 1,
	/// Signed 8-bit integer.
	Int8 = 2,
	/// Unsigned 8-bit integer.
	UInt8 = 3,
	/// Signed 16-bit integer.
	Int16 = 4,
	/// Unsigned 16-bit integer.
	UInt16 = 5,
	/// Signed 32-bit integer.
	Int32 = 6,
	/// Unsigned 32-bit integer.
	UInt32 = 7,
	/// Signed 64-bit integer.
	Int64 = 8,
	/// Unsigned 64-bit integer.
	UInt64 = 9,
	/// 32-bit float.
	Float = 10,
	/// 64-bit float.
	Double = 11,
	/// Length-prefixed UTF-8 string.
	String = 12,
}

impl ValueKind {
	/// Map an engine type name to its primitive kind.
	pub fn from_type_name(type_name: &str) -> Self {
		match type_name {
			"bool" => Self::Bool,
			"SInt8" | "char" => Self::Int8,
			"UInt8" => Self::UInt8,
			"SInt16" | "short" => Self::Int16,
			"UInt16" | "unsigned short" => Self::UInt16,
			"SInt32" | "int" | "Type*" => Self::Int32,
			"UInt32" | "unsigned int" => Self::UInt32,
			"SInt64" | "long long" => Self::Int64,
			"UInt64" | "unsigned long long" | "FileSize" => Self::UInt64,
			"float" => Self::Float,
			"double" => Self::Double,
			"string" => Self::String,
			_ => Self::None,
		}
	}

	/// Bit representing this kind in an exporter value mask, `0` for [`ValueKind::None`].
	pub fn mask_bit(self) -> u32 {
		match self {
			Self::None => 0,
			kind => 1 << (kind as u8 - 1),
		}
	}

	/// Stable lowercase label.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::None => "none",
			Self::Bool => "bool",
			Self::Int8 => "int8",
			Self::UInt8 => "uint8",
			Self::Int16 => "int16",
			Self::UInt16 => "uint16",
			Self::Int32 => "int32",
			Self::UInt32 => "uint32",
			Self::Int64 => "int64",
			Self::UInt64 => "uint64",
			Self::Float => "float",
			Self::Double => "double",
			Self::String => "string",
		}
	}
}

/// Schema node describing one field's shape.
///
/// Array templates always carry exactly two children: the `size` field and the
/// element template at index 1.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldTemplate {
	/// Declared field name.
	pub name: Box<str>,
	/// Declared type name.
	pub type_name: Box<str>,
	/// Leaf value kind, [`ValueKind::None`] for structural fields.
	pub value_kind: ValueKind,
	/// Whether the field is an array node.
	pub is_array: bool,
	/// Whether the serialized stream is aligned to 4 bytes after this field.
	pub align: bool,
	/// Schema version of the field.
	pub version: u16,
	/// Ordered child templates.
	pub children: Vec<Arc<FieldTemplate>>,
}

impl FieldTemplate {
	/// Create a leaf template; the value kind is derived from `type_name`.
	pub fn leaf(name: &str, type_name: &str) -> Self {
		Self {
			name: name.into(),
			type_name: type_name.into(),
			value_kind: ValueKind::from_type_name(type_name),
			is_array: false,
			align: false,
			version: 1,
			children: Vec::new(),
		}
	}

	/// Create a structural template with the given children.
	pub fn node(name: &str, type_name: &str, children: Vec<FieldTemplate>) -> Self {
		Self {
			name: name.into(),
			type_name: type_name.into(),
			value_kind: ValueKind::None,
			is_array: false,
			align: false,
			version: 1,
			children: children.into_iter().map(Arc::new).collect(),
		}
	}

	/// Create an array template of `type_name` holding `element`.
	pub fn array(name: &str, type_name: &str, element: FieldTemplate) -> Self {
		let mut element = element;
		element.name = "data".into();
		Self {
			name: name.into(),
			type_name: type_name.into(),
			value_kind: ValueKind::None,
			is_array: true,
			align: false,
			version: 1,
			children: vec![Arc::new(Self::leaf("size", "int")), Arc::new(element)],
		}
	}

	/// Wrap `element` in the engine's `vector { Array { size, data } }` shape.
	pub fn vector(name: &str, element: FieldTemplate) -> Self {
		Self::node(name, "vector", vec![Self::array("Array", "Array", element)])
	}

	/// Return the template with a schema version set.
	pub fn with_version(mut self, version: u16) -> Self {
		self.version = version;
		self
	}

	/// Return the template with trailing 4-byte alignment.
	pub fn aligned(mut self) -> Self {
		self.align = true;
		self
	}

	/// Whether this template describes a leaf value.
	pub fn is_leaf(&self) -> bool {
		self.value_kind != ValueKind::None
	}

	/// Element template of an array node.
	pub fn element(&self) -> Option<&Arc<FieldTemplate>> {
		if self.is_array { self.children.get(1) } else { None }
	}

	/// Find a direct child by name.
	pub fn child(&self, name: &str) -> Option<&Arc<FieldTemplate>> {
		self.children.iter().find(|item| &*item.name == name)
	}

	/// Rebuild the nested template of a class from its flat, depth-ordered field list.
	pub fn from_class_type(db: &ClassDatabase, class: &ClassType) -> Result<Arc<Self>> {
		let Some(first) = class.fields.first() else {
			return Err(ExportError::BadFieldDepth {
				class_id: class.class_id,
				index: 0,
				depth: 0,
			});
		};
		if first.depth != 0 {
			return Err(ExportError::BadFieldDepth {
				class_id: class.class_id,
				index: 0,
				depth: first.depth,
			});
		}

		let mut index = 0;
		let root = build_node(db, class, &mut index)?;
		if let Some(extra) = class.fields.get(index) {
			return Err(ExportError::BadFieldDepth {
				class_id: class.class_id,
				index,
				depth: extra.depth,
			});
		}
		Ok(Arc::new(root))
	}
}

fn build_node(db: &ClassDatabase, class: &ClassType, index: &mut usize) -> Result<FieldTemplate> {
	let field = class.fields[*index];
	*index += 1;

	let mut children = Vec::new();
	while let Some(next) = class.fields.get(*index) {
		if next.depth <= field.depth {
			break;
		}
		if next.depth != field.depth + 1 {
			return Err(ExportError::BadFieldDepth {
				class_id: class.class_id,
				index: *index,
				depth: next.depth,
			});
		}
		children.push(Arc::new(build_node(db, class, index)?));
	}

	let type_name = db.string(field.type_name)?;
	let value_kind = ValueKind::from_type_name(type_name);
	let mut align = field.aligned();

	// A string's inner char array collapses into the leaf.
	let (value_kind, children) = match value_kind {
		ValueKind::String if !field.is_array => {
			align |= children.iter().any(|item| item.align);
			(ValueKind::String, Vec::new())
		}
		kind if children.is_empty() && !field.is_array => (kind, children),
		_ => (ValueKind::None, children),
	};

	Ok(FieldTemplate {
		name: db.string(field.field_name)?.into(),
		type_name: type_name.into(),
		value_kind,
		is_array: field.is_array,
		align,
		version: field.version,
		children,
	})
}
