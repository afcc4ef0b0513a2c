//! A headless, arena-backed host tree.
//!
//! [`MemoryDom`] follows DOM semantics where they matter for patching:
//! inserting a node detaches it from its previous parent first, inserting a fragment moves the fragment's children,
//! and setting an element's text content replaces its children.
//!
//! Every mutation is appended to a [`Mutation`] journal, which makes it easy to assert on the minimality of patches.

use crate::api::{Attribute, HostApi, NodeKind};
use core::{
	cell::RefCell,
	fmt::{self, Display, Formatter, Write as _},
};
use tracing::error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);
impl Display for NodeId {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		write!(f, "#{}", self.0)
	}
}

/// One recorded host tree mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
	Created(NodeId),
	Inserted { parent: NodeId, node: NodeId, before: Option<NodeId> },
	Removed { parent: NodeId, node: NodeId },
	TextSet(NodeId),
	AttributeSet { node: NodeId, name: String },
	AttributeRemoved { node: NodeId, name: String },
}

#[derive(Debug, Clone)]
enum Content {
	Element { tag: String, ns: Option<String>, attributes: Vec<Attribute> },
	Text(String),
	Comment(String),
	Fragment,
}

#[derive(Debug)]
struct Slot {
	content: Content,
	parent: Option<NodeId>,
	children: Vec<NodeId>,
}

#[derive(Debug, Default)]
pub struct MemoryDom {
	slots: RefCell<Vec<Slot>>,
	journal: RefCell<Vec<Mutation>>,
}

impl MemoryDom {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	fn push(&self, content: Content) -> NodeId {
		let mut slots = self.slots.borrow_mut();
		let id = NodeId(slots.len());
		slots.push(Slot {
			content,
			parent: None,
			children: Vec::new(),
		});
		drop(slots);
		self.record(Mutation::Created(id));
		id
	}

	fn record(&self, mutation: Mutation) {
		self.journal.borrow_mut().push(mutation)
	}

	/// All mutations since creation or the last [`take_journal`](`MemoryDom::take_journal`).
	#[must_use]
	pub fn journal(&self) -> Vec<Mutation> {
		self.journal.borrow().clone()
	}

	pub fn take_journal(&self) -> Vec<Mutation> {
		core::mem::take(&mut *self.journal.borrow_mut())
	}

	/// How many nodes were ever created.
	#[must_use]
	pub fn len(&self) -> usize {
		self.slots.borrow().len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.slots.borrow().is_empty()
	}

	#[must_use]
	pub fn children(&self, node: NodeId) -> Vec<NodeId> {
		self.slots.borrow()[node.0].children.clone()
	}

	#[must_use]
	pub fn parent(&self, node: NodeId) -> Option<NodeId> {
		self.slots.borrow()[node.0].parent
	}

	#[must_use]
	pub fn namespace(&self, node: NodeId) -> Option<String> {
		match &self.slots.borrow()[node.0].content {
			Content::Element { ns, .. } => ns.clone(),
			_ => None,
		}
	}

	/// Serialises `node` and its descendants as compact HTML-like markup.
	///
	/// Attributes are written in insertion order, fragments as their children only. Nothing is escaped.
	#[must_use]
	pub fn to_html(&self, node: NodeId) -> String {
		let mut html = String::new();
		self.write_html(&mut html, node);
		html
	}

	/// Concatenated [`to_html`](`MemoryDom::to_html`) of `node`'s children.
	#[must_use]
	pub fn inner_html(&self, node: NodeId) -> String {
		let mut html = String::new();
		for child in self.children(node) {
			self.write_html(&mut html, child)
		}
		html
	}

	fn write_html(&self, html: &mut String, node: NodeId) {
		let (content, children) = {
			let slots = self.slots.borrow();
			(slots[node.0].content.clone(), slots[node.0].children.clone())
		};
		// Writing to a `String` can't fail.
		match content {
			Content::Element { tag, attributes, .. } => {
				html.push('<');
				html.push_str(&tag);
				for Attribute { name, value } in attributes {
					let _ = write!(html, " {}=\"{}\"", name, value);
				}
				html.push('>');
				for child in children {
					self.write_html(html, child)
				}
				let _ = write!(html, "</{}>", tag);
			}
			Content::Text(text) => html.push_str(&text),
			Content::Comment(text) => {
				let _ = write!(html, "<!--{}-->", text);
			}
			Content::Fragment => {
				for child in children {
					self.write_html(html, child)
				}
			}
		}
	}

	fn detach(slots: &mut [Slot], node: NodeId) {
		if let Some(parent) = slots[node.0].parent.take() {
			slots[parent.0].children.retain(|&child| child != node);
		}
	}
}

impl HostApi for MemoryDom {
	type Node = NodeId;

	fn create_element(&self, tag: &str, is: Option<&str>) -> NodeId {
		let id = self.push(Content::Element {
			tag: tag.to_owned(),
			ns: None,
			attributes: Vec::new(),
		});
		if let Some(is) = is {
			self.set_attribute(&id, "is", is)
		}
		id
	}

	fn create_element_ns(&self, ns: &str, tag: &str, is: Option<&str>) -> NodeId {
		let id = self.push(Content::Element {
			tag: tag.to_owned(),
			ns: Some(ns.to_owned()),
			attributes: Vec::new(),
		});
		if let Some(is) = is {
			self.set_attribute(&id, "is", is)
		}
		id
	}

	fn create_text_node(&self, text: &str) -> NodeId {
		self.push(Content::Text(text.to_owned()))
	}

	fn create_comment(&self, text: &str) -> NodeId {
		self.push(Content::Comment(text.to_owned()))
	}

	fn create_document_fragment(&self) -> Option<NodeId> {
		Some(self.push(Content::Fragment))
	}

	fn insert_before(&self, parent: &NodeId, node: &NodeId, reference: Option<&NodeId>) {
		let (parent, node) = (*parent, *node);
		let mut slots = self.slots.borrow_mut();

		if let Some(reference) = reference {
			if slots[reference.0].parent != Some(parent) {
				return error!("Reference node {} is not a child of {}. Not inserting {}.", reference, parent, node);
			}
		}
		if reference == Some(&node) {
			return;
		}

		let moved = if let Content::Fragment = slots[node.0].content {
			let children = core::mem::take(&mut slots[node.0].children);
			for &child in &children {
				slots[child.0].parent = None;
			}
			children
		} else {
			Self::detach(&mut slots, node);
			vec![node]
		};

		let mut index = match reference {
			Some(reference) => slots[parent.0].children.iter().position(|child| child == reference).unwrap_or_else(|| slots[parent.0].children.len()),
			None => slots[parent.0].children.len(),
		};
		for &child in &moved {
			slots[child.0].parent = Some(parent);
			slots[parent.0].children.insert(index, child);
			index += 1;
		}
		drop(slots);

		self.record(Mutation::Inserted {
			parent,
			node,
			before: reference.copied(),
		});
	}

	fn remove_child(&self, parent: &NodeId, node: &NodeId) {
		let mut slots = self.slots.borrow_mut();
		if slots[node.0].parent != Some(*parent) {
			return error!("{} is not a child of {}. Not removing it.", node, parent);
		}
		Self::detach(&mut slots, *node);
		drop(slots);
		self.record(Mutation::Removed { parent: *parent, node: *node });
	}

	fn parent_node(&self, node: &NodeId) -> Option<NodeId> {
		self.slots.borrow()[node.0].parent
	}

	fn next_sibling(&self, node: &NodeId) -> Option<NodeId> {
		let slots = self.slots.borrow();
		let parent = slots[node.0].parent?;
		let siblings = &slots[parent.0].children;
		let index = siblings.iter().position(|sibling| sibling == node)?;
		siblings.get(index + 1).copied()
	}

	fn first_child(&self, node: &NodeId) -> Option<NodeId> {
		self.slots.borrow()[node.0].children.first().copied()
	}

	fn set_text_content(&self, node: &NodeId, text: &str) {
		let mut slots = self.slots.borrow_mut();
		match &mut slots[node.0].content {
			Content::Text(data) | Content::Comment(data) => *data = text.to_owned(),
			Content::Element { .. } | Content::Fragment => {
				for child in core::mem::take(&mut slots[node.0].children) {
					slots[child.0].parent = None;
				}
				if !text.is_empty() {
					let text_id = NodeId(slots.len());
					slots.push(Slot {
						content: Content::Text(text.to_owned()),
						parent: Some(*node),
						children: Vec::new(),
					});
					slots[node.0].children.push(text_id);
				}
			}
		}
		drop(slots);
		self.record(Mutation::TextSet(*node));
	}

	fn text_content(&self, node: &NodeId) -> Option<String> {
		let (content, children) = {
			let slots = self.slots.borrow();
			(slots[node.0].content.clone(), slots[node.0].children.clone())
		};
		match content {
			Content::Text(text) | Content::Comment(text) => Some(text),
			Content::Element { .. } | Content::Fragment => Some(children.iter().filter_map(|child| self.text_content(child)).collect()),
		}
	}

	fn tag_name(&self, node: &NodeId) -> String {
		match &self.slots.borrow()[node.0].content {
			Content::Element { tag, .. } => tag.clone(),
			_ => String::new(),
		}
	}

	fn get_attribute(&self, node: &NodeId, name: &str) -> Option<String> {
		match &self.slots.borrow()[node.0].content {
			Content::Element { attributes, .. } => attributes.iter().find(|attribute| attribute.name == name).map(|attribute| attribute.value.clone()),
			_ => None,
		}
	}

	fn set_attribute(&self, node: &NodeId, name: &str, value: &str) {
		match &mut self.slots.borrow_mut()[node.0].content {
			Content::Element { attributes, .. } => match attributes.iter_mut().find(|attribute| attribute.name == name) {
				Some(attribute) => attribute.value = value.to_owned(),
				None => attributes.push(Attribute::new(name, value)),
			},
			_ => return error!("Can't set attribute {:?} on non-element {}.", name, node),
		}
		self.record(Mutation::AttributeSet {
			node: *node,
			name: name.to_owned(),
		});
	}

	fn remove_attribute(&self, node: &NodeId, name: &str) {
		match &mut self.slots.borrow_mut()[node.0].content {
			Content::Element { attributes, .. } => attributes.retain(|attribute| attribute.name != name),
			_ => return error!("Can't remove attribute {:?} from non-element {}.", name, node),
		}
		self.record(Mutation::AttributeRemoved {
			node: *node,
			name: name.to_owned(),
		});
	}

	fn attributes(&self, node: &NodeId) -> Vec<Attribute> {
		match &self.slots.borrow()[node.0].content {
			Content::Element { attributes, .. } => attributes.clone(),
			_ => Vec::new(),
		}
	}

	fn kind(&self, node: &NodeId) -> NodeKind {
		match self.slots.borrow()[node.0].content {
			Content::Element { .. } => NodeKind::Element,
			Content::Text(_) => NodeKind::Text,
			Content::Comment(_) => NodeKind::Comment,
			Content::Fragment => NodeKind::Fragment,
		}
	}
}
