//! The standard host API over [`web_sys`].

use crate::api::{Attribute, HostApi, NodeKind};
use tracing::{error, warn};
use wasm_bindgen::{JsCast, UnwrapThrowExt};
use web_sys::{Document, Element, Node};

/// Patches the [***DOM***](https://developer.mozilla.org/en-US/docs/Web/API/Document_Object_Model) of one [***Document***](https://developer.mozilla.org/en-US/docs/Web/API/Document).
///
/// Failed host calls are logged as errors and otherwise ignored.
#[derive(Debug, Clone)]
pub struct WebDom {
	document: Document,
}
impl WebDom {
	#[must_use]
	pub fn new(document: Document) -> Self {
		Self { document }
	}

	#[must_use]
	pub fn document(&self) -> &Document {
		&self.document
	}
}

/// Binds the current window's document.
///
/// # Panics
///
/// Iff there is no current window or it has no document.
impl Default for WebDom {
	fn default() -> Self {
		Self::new(
			web_sys::window()
				.expect_throw("graft-dom: No window found.")
				.document()
				.expect_throw("graft-dom: No document found for the current window."),
		)
	}
}

fn as_element(node: &Node) -> Option<&Element> {
	node.dyn_ref::<Element>()
}

impl HostApi for WebDom {
	type Node = Node;

	fn create_element(&self, tag: &str, is: Option<&str>) -> Node {
		match match is {
			// This isn't entirely modern, but is well-supported.
			Some(is) => self.document.create_element_with_str(tag, is),
			None => self.document.create_element(tag),
		} {
			Ok(element) => element.into(),
			Err(error) => {
				error!("Failed to create element <{}>: {:?}", tag, error);
				wasm_bindgen::throw_val(error)
			}
		}
	}

	fn create_element_ns(&self, ns: &str, tag: &str, is: Option<&str>) -> Node {
		match match is {
			Some(is) => self.document.create_element_ns_with_str(Some(ns), tag, is),
			None => self.document.create_element_ns(Some(ns), tag),
		} {
			Ok(element) => element.into(),
			Err(error) => {
				error!("Failed to create element <{}> in namespace {:?}: {:?}", tag, ns, error);
				wasm_bindgen::throw_val(error)
			}
		}
	}

	fn create_text_node(&self, text: &str) -> Node {
		self.document.create_text_node(text).into()
	}

	fn create_comment(&self, text: &str) -> Node {
		self.document.create_comment(text).into()
	}

	fn create_document_fragment(&self) -> Option<Node> {
		Some(self.document.create_document_fragment().into())
	}

	fn insert_before(&self, parent: &Node, node: &Node, reference: Option<&Node>) {
		if let Err(error) = parent.insert_before(node, reference) {
			error!("Failed to insert node: {:?}", error)
		}
	}

	fn append_child(&self, parent: &Node, node: &Node) {
		if let Err(error) = parent.append_child(node) {
			error!("Failed to append node: {:?}", error)
		}
	}

	fn remove_child(&self, parent: &Node, node: &Node) {
		if let Err(error) = parent.remove_child(node) {
			error!("Failed to remove the node: {:?}", error)
		}
	}

	fn parent_node(&self, node: &Node) -> Option<Node> {
		node.parent_node()
	}

	fn next_sibling(&self, node: &Node) -> Option<Node> {
		node.next_sibling()
	}

	fn first_child(&self, node: &Node) -> Option<Node> {
		node.first_child()
	}

	fn set_text_content(&self, node: &Node, text: &str) {
		node.set_text_content(Some(text))
	}

	fn text_content(&self, node: &Node) -> Option<String> {
		node.text_content()
	}

	fn tag_name(&self, node: &Node) -> String {
		as_element(node).map(Element::tag_name).unwrap_or_default()
	}

	fn get_attribute(&self, node: &Node, name: &str) -> Option<String> {
		as_element(node).and_then(|element| element.get_attribute(name))
	}

	fn set_attribute(&self, node: &Node, name: &str, value: &str) {
		match as_element(node) {
			Some(element) => {
				if let Err(error) = element.set_attribute(name, value) {
					error!("Could not set attribute {:?}: {:?}", name, error)
				}
			}
			None => warn!("Can't set attribute {:?} on non-element {:?}", name, node),
		}
	}

	fn remove_attribute(&self, node: &Node, name: &str) {
		match as_element(node) {
			Some(element) => {
				if let Err(error) = element.remove_attribute(name) {
					warn!("Could not remove attribute with name {:?}: {:?}", name, error)
				}
			}
			None => warn!("Can't remove attribute {:?} from non-element {:?}", name, node),
		}
	}

	fn attributes(&self, node: &Node) -> Vec<Attribute> {
		let attributes = match as_element(node) {
			Some(element) => element.attributes(),
			None => return Vec::new(),
		};
		(0..attributes.length())
			.filter_map(|i| attributes.item(i))
			.map(|attribute| Attribute::new(attribute.local_name(), attribute.value()))
			.collect()
	}

	fn kind(&self, node: &Node) -> NodeKind {
		match node.node_type() {
			Node::ELEMENT_NODE => NodeKind::Element,
			Node::TEXT_NODE => NodeKind::Text,
			Node::COMMENT_NODE => NodeKind::Comment,
			Node::DOCUMENT_FRAGMENT_NODE => NodeKind::Fragment,
			_ => NodeKind::Other,
		}
	}
}
