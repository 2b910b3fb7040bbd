use crate::asset::Primitive;

/// Layout of a sequence node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceStyle {
	/// One `- item` per line.
	Block,
	/// Inline `[a, b]`.
	Flow,
	/// Packed: one hex string of the items' little-endian bytes.
	Raw,
}

/// Layout of a mapping node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappingStyle {
	/// One `key: value` per line.
	Block,
	/// Inline `{a: 1, b: 2}`.
	Flow,
}

/// Ordered sequence node.
#[derive(Debug, Clone, PartialEq)]
pub struct Sequence {
	/// Rendering layout.
	pub style: SequenceStyle,
	/// Items in order.
	pub items: Vec<Node>,
}

/// Ordered mapping node.
#[derive(Debug, Clone, PartialEq)]
pub struct Mapping {
	/// Rendering layout.
	pub style: MappingStyle,
	/// Entries in insertion order.
	pub entries: Vec<(Box<str>, Node)>,
}

/// Structured output produced by field exporters.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
	/// Leaf value.
	Scalar(Primitive),
	/// Sequence of nodes.
	Sequence(Sequence),
	/// Mapping of keys to nodes.
	Mapping(Mapping),
	/// Node carrying sibling entries that land right after it in the enclosing mapping.
	WithExtras {
		/// Primary node.
		node: Box<Node>,
		/// Entries inserted after the primary key.
		extras: Vec<(Box<str>, Node)>,
	},
}

impl Node {
	/// String scalar.
	pub fn string(value: &str) -> Self {
		Self::Scalar(Primitive::String(value.into()))
	}

	/// Integer scalar.
	pub fn int(value: i64) -> Self {
		Self::Scalar(Primitive::I64(value))
	}

	/// Sequence with the given style.
	pub fn sequence(style: SequenceStyle, items: Vec<Node>) -> Self {
		Self::Sequence(Sequence { style, items })
	}

	/// Borrow as a mapping.
	pub fn as_mapping(&self) -> Option<&Mapping> {
		match self {
			Self::Mapping(mapping) => Some(mapping),
			Self::WithExtras { node, .. } => node.as_mapping(),
			_ => None,
		}
	}

	/// Mutably borrow as a mapping.
	pub fn as_mapping_mut(&mut self) -> Option<&mut Mapping> {
		match self {
			Self::Mapping(mapping) => Some(mapping),
			Self::WithExtras { node, .. } => node.as_mapping_mut(),
			_ => None,
		}
	}

	/// Borrow as a sequence.
	pub fn as_sequence(&self) -> Option<&Sequence> {
		match self {
			Self::Sequence(sequence) => Some(sequence),
			Self::WithExtras { node, .. } => node.as_sequence(),
			_ => None,
		}
	}
}

impl Mapping {
	/// Empty block mapping.
	pub fn block() -> Self {
		Self {
			style: MappingStyle::Block,
			entries: Vec::new(),
		}
	}

	/// Empty flow mapping.
	pub fn flow() -> Self {
		Self {
			style: MappingStyle::Flow,
			entries: Vec::new(),
		}
	}

	/// Append an entry; a [`Node::WithExtras`] value is flattened into the key followed by its extras.
	pub fn insert(&mut self, key: &str, node: Node) {
		match node {
			Node::WithExtras { node, extras } => {
				self.entries.push((key.into(), *node));
				self.entries.extend(extras);
			}
			node => self.entries.push((key.into(), node)),
		}
	}

	/// Insert an entry at `index`, shifting later entries.
	pub fn insert_at(&mut self, index: usize, key: &str, node: Node) {
		let index = index.min(self.entries.len());
		self.entries.insert(index, (key.into(), node));
	}

	/// Position of `key`.
	pub fn position(&self, key: &str) -> Option<usize> {
		self.entries.iter().position(|(name, _)| &**name == key)
	}

	/// Value stored under `key`.
	pub fn get(&self, key: &str) -> Option<&Node> {
		self.entries.iter().find(|(name, _)| &**name == key).map(|(_, node)| node)
	}

	/// Whether `key` is present.
	pub fn contains_key(&self, key: &str) -> bool {
		self.position(key).is_some()
	}
}

impl From<Mapping> for Node {
	fn from(mapping: Mapping) -> Self {
		Self::Mapping(mapping)
	}
}

/// One serialized object inside an asset document stream.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
	/// Engine class id, written as the `!u!` tag.
	pub class_id: i32,
	/// Local id, written as the anchor.
	pub local_id: i64,
	/// Class name used as the single top-level key.
	pub type_name: Box<str>,
	/// Exported body.
	pub root: Node,
}

/// Render a tagged multi-document asset file.
pub fn render_documents(documents: &[Document]) -> String {
	let mut out = String::from("%YAML 1.1\n%TAG !u! tag:unity3d.com,2011:\n");
	for doc in documents {
		out.push_str(&format!("--- !u!{} &{}\n", doc.class_id, doc.local_id));
		write_entry(&mut out, 0, &doc.type_name, &doc.root, true);
	}
	out
}

/// Render a bare block mapping, as used by sidecar metadata.
pub fn render_mapping(mapping: &Mapping) -> String {
	let mut out = String::new();
	for (key, node) in &mapping.entries {
		write_entry(&mut out, 0, key, node, true);
	}
	out
}

/// Render a node in inline (flow) form.
pub fn inline_text(node: &Node) -> String {
	match node {
		Node::Scalar(value) => scalar_text(value),
		Node::WithExtras { node, .. } => inline_text(node),
		Node::Sequence(sequence) if sequence.style == SequenceStyle::Raw => raw_hex(&sequence.items),
		Node::Sequence(sequence) if sequence.items.is_empty() => "[]".to_owned(),
		Node::Sequence(sequence) => {
			let items: Vec<String> = sequence.items.iter().map(inline_text).collect();
			format!("[{}]", items.join(", "))
		}
		Node::Mapping(mapping) if mapping.entries.is_empty() => "{}".to_owned(),
		Node::Mapping(mapping) => {
			let entries: Vec<String> = mapping
				.entries
				.iter()
				.map(|(key, value)| format!("{}: {}", key_text(key), inline_text(value)))
				.collect();
			format!("{{{}}}", entries.join(", "))
		}
	}
}

fn write_entry(out: &mut String, indent: usize, key: &str, node: &Node, pad: bool) {
	if pad {
		push_indent(out, indent);
	}
	out.push_str(&key_text(key));
	out.push(':');

	write_block_value(out, indent, unwrap_extras(node));
}

fn write_block_value(out: &mut String, indent: usize, node: &Node) {
	match node {
		Node::Mapping(mapping) if mapping.style == MappingStyle::Block && !mapping.entries.is_empty() => {
			out.push('\n');
			for (key, value) in &mapping.entries {
				write_entry(out, indent + 2, key, value, true);
			}
		}
		Node::Sequence(sequence) if sequence.style == SequenceStyle::Block && !sequence.items.is_empty() => {
			out.push('\n');
			write_items(out, indent, &sequence.items);
		}
		node => push_inline(out, node),
	}
}

fn write_items(out: &mut String, indent: usize, items: &[Node]) {
	for item in items {
		push_indent(out, indent);
		out.push('-');

		match unwrap_extras(item) {
			Node::Mapping(mapping) if mapping.style == MappingStyle::Block && !mapping.entries.is_empty() => {
				out.push(' ');
				for (index, (key, value)) in mapping.entries.iter().enumerate() {
					write_entry(out, indent + 2, key, value, index > 0);
				}
			}
			Node::Sequence(sequence) if sequence.style == SequenceStyle::Block && !sequence.items.is_empty() => {
				out.push('\n');
				write_items(out, indent + 2, &sequence.items);
			}
			item => push_inline(out, item),
		}
	}
}

fn unwrap_extras(node: &Node) -> &Node {
	match node {
		Node::WithExtras { node, .. } => unwrap_extras(node),
		node => node,
	}
}

fn push_inline(out: &mut String, node: &Node) {
	let text = inline_text(node);
	if !text.is_empty() {
		out.push(' ');
		out.push_str(&text);
	}
	out.push('\n');
}

fn push_indent(out: &mut String, indent: usize) {
	out.extend(std::iter::repeat_n(' ', indent));
}

fn raw_hex(items: &[Node]) -> String {
	let mut bytes = Vec::with_capacity(items.len());
	for item in items {
		if let Node::Scalar(value) = item {
			bytes.extend_from_slice(&value.le_bytes());
		}
	}
	hex::encode(bytes)
}

fn key_text(key: &str) -> String {
	if key.is_empty() { "''".to_owned() } else { quote_string(key) }
}

fn scalar_text(value: &Primitive) -> String {
	match value {
		Primitive::String(text) => quote_string(text),
		other => other.to_string(),
	}
}

fn quote_string(text: &str) -> String {
	if text.chars().any(char::is_control) {
		let mut out = String::with_capacity(text.len() + 2);
		out.push('"');
		for ch in text.chars() {
			match ch {
				'"' => out.push_str("\\\""),
				'\\' => out.push_str("\\\\"),
				'\n' => out.push_str("\\n"),
				'\r' => out.push_str("\\r"),
				'\t' => out.push_str("\\t"),
				'\0' => out.push_str("\\0"),
				ch if ch.is_control() => out.push_str(&format!("\\u{:04X}", u32::from(ch))),
				ch => out.push(ch),
			}
		}
		out.push('"');
		return out;
	}

	if needs_quotes(text) {
		return format!("'{}'", text.replace('\'', "''"));
	}
	text.to_owned()
}

fn needs_quotes(text: &str) -> bool {
	let Some(first) = text.chars().next() else {
		return false;
	};
	let last = text.chars().next_back().unwrap_or(first);

	"-?:,[]{}#&*!|>'\"%@`".contains(first)
		|| first.is_whitespace()
		|| last.is_whitespace()
		|| last == ':'
		|| text.contains(": ")
		|| text.contains(" #")
}

#[cfg(test)]
mod tests;
