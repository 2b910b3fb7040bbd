use crate::asset::{Document, Mapping, Node, Primitive, SequenceStyle, inline_text, render_documents, render_mapping};

fn pointer(id: i64) -> Node {
	let mut mapping = Mapping::flow();
	mapping.insert("fileID", Node::int(id));
	mapping.into()
}

#[test]
fn documents_carry_tags_anchors_and_block_layout() {
	let mut pair = Mapping::block();
	pair.insert("component", pointer(4));

	let mut body = Mapping::block();
	body.insert("m_ObjectHideFlags", Node::int(0));
	body.insert("m_Component", Node::sequence(SequenceStyle::Block, vec![pair.into()]));
	body.insert("m_Name", Node::string("Cube"));
	body.insert("m_Tags", Node::sequence(SequenceStyle::Block, Vec::new()));
	body.insert("m_IsActive", Node::Scalar(Primitive::Bool(true)));

	let text = render_documents(&[Document {
		class_id: 1,
		local_id: 3,
		type_name: "GameObject".into(),
		root: body.into(),
	}]);

	let expected = "%YAML 1.1\n\
		%TAG !u! tag:unity3d.com,2011:\n\
		--- !u!1 &3\n\
		GameObject:\n  m_ObjectHideFlags: 0\n  m_Component:\n  - component: {fileID: 4}\n  m_Name: Cube\n  m_Tags: []\n  m_IsActive: 1\n";
	assert_eq!(text, expected);
}

#[test]
fn nested_mappings_in_sequences_indent_under_the_dash() {
	let mut inner = Mapping::block();
	inner.insert("x", Node::int(1));
	let mut item = Mapping::block();
	item.insert("first", Node::string("a"));
	item.insert("second", inner.into());

	let mut root = Mapping::block();
	root.insert("list", Node::sequence(SequenceStyle::Block, vec![item.into(), Node::int(7)]));
	assert_eq!(render_mapping(&root), "list:\n- first: a\n  second:\n    x: 1\n- 7\n");
}

#[test]
fn raw_sequences_render_as_hex() {
	let bytes = Node::sequence(SequenceStyle::Raw, vec![Node::Scalar(Primitive::U8(0xde)), Node::Scalar(Primitive::U8(0x01))]);
	assert_eq!(inline_text(&bytes), "de01");

	let words = Node::sequence(SequenceStyle::Raw, vec![Node::Scalar(Primitive::U32(1)), Node::Scalar(Primitive::U32(0xff00))]);
	assert_eq!(inline_text(&words), "0100000000ff0000");

	let empty = Node::sequence(SequenceStyle::Raw, Vec::new());
	let mut root = Mapping::block();
	root.insert("m_Data", empty);
	assert_eq!(render_mapping(&root), "m_Data:\n");
}

#[test]
fn extras_are_flattened_after_their_key() {
	let mut root = Mapping::block();
	root.insert(
		"m_DataSize",
		Node::WithExtras {
			node: Box::new(Node::int(2)),
			extras: vec![("_typelessdata".into(), Node::string("abcd"))],
		},
	);
	root.insert("m_Next", Node::int(0));
	assert_eq!(render_mapping(&root), "m_DataSize: 2\n_typelessdata: abcd\nm_Next: 0\n");
}

#[test]
fn strings_are_quoted_only_when_needed() {
	let render = |text: &str| inline_text(&Node::string(text));
	assert_eq!(render("plain text"), "plain text");
	assert_eq!(render(""), "");
	assert_eq!(render("- dash"), "'- dash'");
	assert_eq!(render("it's: here"), "'it''s: here'");
	assert_eq!(render(" padded"), "' padded'");
	assert_eq!(render("line\nbreak"), "\"line\\nbreak\"");
}

#[test]
fn empty_string_value_leaves_nothing_after_the_colon() {
	let mut root = Mapping::block();
	root.insert("userData", Node::string(""));
	root.insert("externalObjects", Mapping::block().into());
	assert_eq!(render_mapping(&root), "userData:\nexternalObjects: {}\n");
}
