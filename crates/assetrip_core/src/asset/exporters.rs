use std::fs;
use std::path::Path;

use tracing::debug;

use crate::asset::pptr::resolve_reference;
use crate::asset::source::base_name;
use crate::asset::{Builtin, ExportContext, ExportError, FieldValue, Mapping, Node, Primitive, Result, SequenceStyle, ValueKind, inline_text};

/// Key of the payload entry emitted after a typeless blob's size.
pub const TYPELESS_DATA_KEY: &str = "_typelessdata";

pub(crate) fn export_builtin(kind: Builtin, cx: &mut ExportContext<'_>, parent: Option<&FieldValue>, field: &FieldValue) -> Result<Node> {
	match kind {
		Builtin::Primitive => primitive(field),
		Builtin::Script => script(cx, field),
		Builtin::Pointer => Ok(resolve_reference(cx, field)?.to_node()),
		Builtin::ComponentPair => component_pair(cx, field),
		Builtin::TypelessData => typeless_data(cx, parent, field),
		Builtin::StreamingInfo => Ok(streaming_info()),
		Builtin::Guid => guid(field),
		Builtin::Generic => generic(cx, field),
	}
}

fn unsupported(kind: Builtin, field: &FieldValue) -> ExportError {
	ExportError::UnsupportedField {
		exporter: kind.label(),
		name: field.name().to_owned(),
		type_name: field.type_name().to_owned(),
	}
}

fn primitive(field: &FieldValue) -> Result<Node> {
	field
		.primitive()
		.cloned()
		.map(Node::Scalar)
		.ok_or_else(|| unsupported(Builtin::Primitive, field))
}

fn generic(cx: &mut ExportContext<'_>, field: &FieldValue) -> Result<Node> {
	if field.is_leaf() {
		return Err(unsupported(Builtin::Generic, field));
	}
	if field.template.is_array {
		return export_array(cx, field);
	}

	if let [only] = field.children() {
		if only.template.is_array {
			return if field.type_name() == "map" {
				export_map(cx, only)
			} else {
				export_array(cx, only)
			};
		}
	}

	let mut mapping = Mapping::block();
	if field.children().is_empty() {
		return Ok(mapping.into());
	}
	if field.template.version > 1 {
		mapping.insert("serializedVersion", Node::int(i64::from(field.template.version)));
	}
	for child in field.children() {
		let node = cx.export(Some(field), child)?;
		mapping.insert(child.name(), node);
	}
	Ok(mapping.into())
}

fn export_array(cx: &mut ExportContext<'_>, array: &FieldValue) -> Result<Node> {
	let packed = array.template.element().is_some_and(|item| item.value_kind == ValueKind::UInt8);
	let mut items = Vec::with_capacity(array.children().len());
	for item in array.children() {
		items.push(cx.export(Some(array), item)?);
	}
	let style = if packed { SequenceStyle::Raw } else { SequenceStyle::Block };
	Ok(Node::sequence(style, items))
}

fn export_map(cx: &mut ExportContext<'_>, array: &FieldValue) -> Result<Node> {
	let mut mapping = Mapping::block();
	for pair in array.children() {
		let [first, second, ..] = pair.children() else {
			return Err(unsupported(Builtin::Generic, pair));
		};
		let key = cx.export(Some(pair), first)?;
		let value = cx.export(Some(pair), second)?;
		mapping.insert(&inline_text(&key), value);
	}
	Ok(mapping.into())
}

fn script(cx: &mut ExportContext<'_>, field: &FieldValue) -> Result<Node> {
	let mut node = generic(cx, field)?;
	if let Some(mapping) = node.as_mapping_mut() {
		if !mapping.contains_key("m_EditorHideFlags") {
			let at = mapping.position("m_Script").unwrap_or(mapping.entries.len());
			mapping.insert_at(at, "m_EditorHideFlags", Node::int(0));
		}
		if !mapping.contains_key("m_EditorClassIdentifier") {
			let at = mapping.position("m_Name").map_or(mapping.entries.len(), |pos| pos + 1);
			mapping.insert_at(at, "m_EditorClassIdentifier", Node::string(""));
		}
	}
	Ok(node)
}

fn component_pair(cx: &mut ExportContext<'_>, field: &FieldValue) -> Result<Node> {
	let pointer = field
		.child("component")
		.or_else(|| field.child("second"))
		.ok_or_else(|| ExportError::MissingField {
			path: format!("{}.component", field.name()),
		})?;
	let mut mapping = Mapping::block();
	mapping.insert("component", cx.export(Some(field), pointer)?);
	Ok(mapping.into())
}

fn streaming_info() -> Node {
	let mut mapping = Mapping::block();
	mapping.insert("offset", Node::int(0));
	mapping.insert("size", Node::int(0));
	mapping.insert("path", Node::string(""));
	mapping.into()
}

fn guid(field: &FieldValue) -> Result<Node> {
	let words = field
		.children()
		.iter()
		.map(|item| item.primitive().cloned().map(Node::Scalar))
		.collect::<Option<Vec<_>>>()
		.ok_or_else(|| unsupported(Builtin::Guid, field))?;
	Ok(Node::sequence(SequenceStyle::Raw, words))
}

fn typeless_data(cx: &mut ExportContext<'_>, parent: Option<&FieldValue>, field: &FieldValue) -> Result<Node> {
	let (size, payload) = if !field.children().is_empty() {
		let payload = cx.export_skipping(parent, field, Some(Builtin::TypelessData.label()))?;
		(field.children().len(), payload)
	} else if let Some(bytes) = read_streamed(cx)? {
		let items = bytes.iter().map(|byte| Node::Scalar(Primitive::U8(*byte))).collect();
		(bytes.len(), Node::sequence(SequenceStyle::Raw, items))
	} else {
		(0, Node::sequence(SequenceStyle::Raw, Vec::new()))
	};

	Ok(Node::WithExtras {
		node: Box::new(Node::int(size as i64)),
		extras: vec![(TYPELESS_DATA_KEY.into(), payload)],
	})
}

/// Payload described by the owning record's streaming info, read from next to the asset file.
fn read_streamed(cx: &ExportContext<'_>) -> Result<Option<Vec<u8>>> {
	let record = cx.record()?;
	let Some(info) = record.value.children().iter().find(|item| item.type_name() == "StreamingInfo") else {
		return Ok(None);
	};

	let size = info.get_i64("size")?;
	let offset = info.get_i64("offset")?;
	let path = info.get_str("path")?;
	if size <= 0 || path.is_empty() {
		return Ok(None);
	}

	let file = cx.file();
	let blob = file.path.parent().unwrap_or(Path::new("")).join(base_name(path));
	if !blob.is_file() {
		return Err(ExportError::MissingStreamFile {
			path: blob.display().to_string(),
		});
	}

	let data = fs::read(&blob)?;
	let start = usize::try_from(offset).unwrap_or(usize::MAX);
	let need = usize::try_from(size).unwrap_or(usize::MAX);
	let bytes = start
		.checked_add(need)
		.and_then(|end| data.get(start..end))
		.ok_or(ExportError::UnexpectedEof {
			at: start,
			need,
			rem: data.len().saturating_sub(start),
		})?;

	debug!(blob = %blob.display(), offset, size, "read streamed payload");
	Ok(Some(bytes.to_vec()))
}
