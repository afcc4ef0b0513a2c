//! The capability set the [`Patcher`](`crate::Patcher`) needs from a host tree.
//!
//! Host trees are shared, interior-mutable structures (like the DOM), so every method takes `&self`.

use core::fmt::Debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
	Element,
	Text,
	Comment,
	Fragment,
	Other,
}

/// A live node attribute as reported by [`HostApi::attributes`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
	pub name: String,
	pub value: String,
}
impl Attribute {
	pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			value: value.into(),
		}
	}
}

pub trait HostApi: 'static {
	/// A handle to a live node. Clones must refer to the same node.
	type Node: Clone + PartialEq + Debug + 'static;

	fn create_element(&self, tag: &str, is: Option<&str>) -> Self::Node;
	fn create_element_ns(&self, ns: &str, tag: &str, is: Option<&str>) -> Self::Node;
	fn create_text_node(&self, text: &str) -> Self::Node;
	fn create_comment(&self, text: &str) -> Self::Node;

	/// [`None`] iff this host does not support fragments.
	fn create_document_fragment(&self) -> Option<Self::Node> {
		None
	}

	/// Inserts (or moves) `node` into `parent` before `reference`, or at the end if `reference` is [`None`].
	fn insert_before(&self, parent: &Self::Node, node: &Self::Node, reference: Option<&Self::Node>);

	fn append_child(&self, parent: &Self::Node, node: &Self::Node) {
		self.insert_before(parent, node, None)
	}

	fn remove_child(&self, parent: &Self::Node, node: &Self::Node);

	fn parent_node(&self, node: &Self::Node) -> Option<Self::Node>;
	fn next_sibling(&self, node: &Self::Node) -> Option<Self::Node>;
	fn first_child(&self, node: &Self::Node) -> Option<Self::Node>;

	fn set_text_content(&self, node: &Self::Node, text: &str);
	fn text_content(&self, node: &Self::Node) -> Option<String>;

	/// The tag name as the host reports it, which may be uppercase.
	fn tag_name(&self, node: &Self::Node) -> String;

	fn get_attribute(&self, node: &Self::Node, name: &str) -> Option<String>;
	fn set_attribute(&self, node: &Self::Node, name: &str, value: &str);
	fn remove_attribute(&self, node: &Self::Node, name: &str);
	fn attributes(&self, node: &Self::Node) -> Vec<Attribute>;

	fn kind(&self, node: &Self::Node) -> NodeKind;

	fn is_element(&self, node: &Self::Node) -> bool {
		self.kind(node) == NodeKind::Element
	}

	fn is_text(&self, node: &Self::Node) -> bool {
		self.kind(node) == NodeKind::Text
	}

	fn is_comment(&self, node: &Self::Node) -> bool {
		self.kind(node) == NodeKind::Comment
	}

	fn is_document_fragment(&self, node: &Self::Node) -> bool {
		self.kind(node) == NodeKind::Fragment
	}

	/// The live children of `node`, in order.
	fn child_nodes(&self, node: &Self::Node) -> Vec<Self::Node> {
		let mut children = Vec::new();
		let mut next = self.first_child(node);
		while let Some(child) = next {
			next = self.next_sibling(&child);
			children.push(child);
		}
		children
	}
}
