use std::fmt;

use regex::Regex;

use crate::asset::exporters::export_builtin;
use crate::asset::{ExportContext, ExportError, FieldTemplate, FieldValue, Node, Result};

/// Built-in exporters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
	/// Leaf values, verbatim.
	Primitive,
	/// Behavior records, with editor-only members restored.
	Script,
	/// `PPtr<...>` references.
	Pointer,
	/// Component list entries.
	ComponentPair,
	/// Byte blobs, inline or streamed.
	TypelessData,
	/// Streaming descriptors.
	StreamingInfo,
	/// Four-word identifiers.
	Guid,
	/// Structural fallback for any non-leaf field.
	Generic,
}

impl Builtin {
	/// Stable label used for logging and for skipping during re-dispatch.
	pub fn label(self) -> &'static str {
		match self {
			Self::Primitive => "primitive",
			Self::Script => "script",
			Self::Pointer => "pointer",
			Self::ComponentPair => "component-pair",
			Self::TypelessData => "typeless-data",
			Self::StreamingInfo => "streaming-info",
			Self::Guid => "guid",
			Self::Generic => "generic",
		}
	}
}

/// Extension point for exporters outside the built-in set.
pub trait FieldExporter {
	/// Stable label.
	fn label(&self) -> &str;

	/// Export `field`, whose parent is `parent` when known.
	fn export(&self, cx: &mut ExportContext<'_>, parent: Option<&FieldValue>, field: &FieldValue) -> Result<Node>;
}

/// Registered exporter.
pub enum Exporter {
	/// Built-in exporter.
	Builtin(Builtin),
	/// Caller-supplied exporter.
	Custom(Box<dyn FieldExporter>),
}

impl Exporter {
	/// Stable label.
	pub fn label(&self) -> &str {
		match self {
			Self::Builtin(kind) => kind.label(),
			Self::Custom(exporter) => exporter.label(),
		}
	}

	/// Run the exporter.
	pub fn export(&self, cx: &mut ExportContext<'_>, parent: Option<&FieldValue>, field: &FieldValue) -> Result<Node> {
		match self {
			Self::Builtin(kind) => export_builtin(*kind, cx, parent, field),
			Self::Custom(exporter) => exporter.export(cx, parent, field),
		}
	}
}

impl fmt::Debug for Exporter {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Builtin(kind) => f.debug_tuple("Builtin").field(kind).finish(),
			Self::Custom(exporter) => f.debug_tuple("Custom").field(&exporter.label()).finish(),
		}
	}
}

/// Match predicate of a registered exporter. Every configured clause must match.
///
/// With no value bits set the rule only matches structural fields.
#[derive(Debug, Clone, Default)]
pub struct Rule {
	value_mask: u32,
	type_names: Vec<Box<str>>,
	type_patterns: Vec<Regex>,
	parent_names: Vec<Box<str>>,
	parent_patterns: Vec<Regex>,
}

impl Rule {
	/// Mask matching every leaf kind.
	pub const ANY_VALUE: u32 = u32::MAX;

	/// Rule matching every structural field.
	pub fn new() -> Self {
		Self::default()
	}

	/// Match leaves whose kind bit is set in `mask`.
	pub fn values(mut self, mask: u32) -> Self {
		self.value_mask = mask;
		self
	}

	/// Accept fields declared with `name`.
	pub fn type_name(mut self, name: &str) -> Self {
		self.type_names.push(name.into());
		self
	}

	/// Accept fields whose type name matches `pattern`.
	pub fn type_pattern(mut self, pattern: &str) -> Result<Self> {
		self.type_patterns.push(Regex::new(pattern)?);
		Ok(self)
	}

	/// Accept fields whose parent is declared with `name`.
	pub fn parent_name(mut self, name: &str) -> Self {
		self.parent_names.push(name.into());
		self
	}

	/// Accept fields whose parent type name matches `pattern`.
	pub fn parent_pattern(mut self, pattern: &str) -> Result<Self> {
		self.parent_patterns.push(Regex::new(pattern)?);
		Ok(self)
	}

	/// Evaluate the rule. Parent clauses are only checked when `parent` is supplied.
	pub fn matches(&self, parent: Option<&FieldTemplate>, field: &FieldTemplate) -> bool {
		let kind_ok = if field.is_leaf() {
			self.value_mask & field.value_kind.mask_bit() != 0
		} else {
			self.value_mask == 0
		};
		if !kind_ok || !clause_matches(&self.type_names, &self.type_patterns, &field.type_name) {
			return false;
		}
		parent.is_none_or(|parent| clause_matches(&self.parent_names, &self.parent_patterns, &parent.type_name))
	}
}

fn clause_matches(names: &[Box<str>], patterns: &[Regex], value: &str) -> bool {
	if names.is_empty() && patterns.is_empty() {
		return true;
	}
	names.iter().any(|name| &**name == value) || patterns.iter().any(|pattern| pattern.is_match(value))
}

#[derive(Debug)]
struct Entry {
	exporter: Exporter,
	rule: Rule,
	priority: i32,
}

/// Priority-ordered exporter set.
///
/// Entries are kept sorted by descending priority; equal priorities keep registration order.
#[derive(Debug, Default)]
pub struct ExporterRegistry {
	entries: Vec<Entry>,
}

impl ExporterRegistry {
	/// Empty registry.
	pub fn new() -> Self {
		Self::default()
	}

	/// Registry with the built-in exporter set.
	pub fn with_defaults() -> Result<Self> {
		let mut registry = Self::new();
		registry.register(Exporter::Builtin(Builtin::Primitive), Rule::new().values(Rule::ANY_VALUE), i32::MAX);
		registry.register(Exporter::Builtin(Builtin::Script), Rule::new().type_name("MonoBehaviour"), 0);
		registry.register(Exporter::Builtin(Builtin::Pointer), Rule::new().type_pattern(r"\APPtr<(.*)>\z")?, 0);
		registry.register(Exporter::Builtin(Builtin::ComponentPair), Rule::new().type_name("ComponentPair"), 0);
		registry.register(Exporter::Builtin(Builtin::TypelessData), Rule::new().type_name("TypelessData"), 0);
		registry.register(Exporter::Builtin(Builtin::StreamingInfo), Rule::new().type_name("StreamingInfo"), 0);
		registry.register(Exporter::Builtin(Builtin::Guid), Rule::new().type_name("GUID"), 0);
		registry.register(Exporter::Builtin(Builtin::Generic), Rule::new(), i32::MIN);
		Ok(registry)
	}

	/// Add an exporter after every entry of higher or equal priority.
	pub fn register(&mut self, exporter: Exporter, rule: Rule, priority: i32) {
		let index = self
			.entries
			.iter()
			.position(|entry| entry.priority < priority)
			.unwrap_or(self.entries.len());
		self.entries.insert(index, Entry { exporter, rule, priority });
	}

	/// First matching exporter in priority order, skipping the one labelled `skip`.
	pub fn pick(&self, parent: Option<&FieldTemplate>, field: &FieldTemplate, skip: Option<&str>) -> Result<&Exporter> {
		self.entries
			.iter()
			.filter(|entry| skip != Some(entry.exporter.label()))
			.find(|entry| entry.rule.matches(parent, field))
			.map(|entry| &entry.exporter)
			.ok_or_else(|| ExportError::NoExporterFound {
				name: field.name.to_string(),
				type_name: field.type_name.to_string(),
			})
	}

	/// Labels and priorities in dispatch order.
	pub fn entries(&self) -> impl Iterator<Item = (&str, i32)> {
		self.entries.iter().map(|entry| (entry.exporter.label(), entry.priority))
	}
}
