//! Adopting existing live trees.

use crate::{
	api::{Attribute, HostApi, NodeKind},
	attributes::Attributes,
	vnode::{add_ns, is_svg_selector, VNode, VNodeData, COMMENT_SELECTOR, SVG_NAMESPACE},
};
use std::rc::Rc;
use tracing::{trace, trace_span};

/// Loads `node` and its descendants into a [`VNode`] tree bound to them.
///
/// The result can be used as root for [`Patcher::patch`](`crate::Patcher::patch`),
/// which then reuses the live nodes wherever the new tree matches.
///
/// Element attributes other than `id` and `class` (which become part of the selector) are loaded as [`Attributes`].
pub fn to_vnode<A: HostApi>(api: &A, node: &A::Node) -> VNode<A::Node> {
	match api.kind(node) {
		NodeKind::Element => load_element(api, node),
		NodeKind::Text => VNode::new(None, None, None, None, api.text_content(node), Some(node.clone())),
		NodeKind::Comment => VNode::new(
			Some(COMMENT_SELECTOR.to_owned()),
			None,
			Some(VNodeData::default()),
			Some(Rc::from(Vec::new())),
			api.text_content(node),
			Some(node.clone()),
		),
		NodeKind::Fragment | NodeKind::Other => {
			trace!("Loading unsupported node as placeholder.");
			VNode::new(Some(String::new()), None, Some(VNodeData::default()), Some(Rc::from(Vec::new())), None, Some(node.clone()))
		}
	}
}

fn load_element<A: HostApi>(api: &A, element: &A::Node) -> VNode<A::Node> {
	let tag = api.tag_name(element).to_lowercase();
	let span = trace_span!("Loading element", tag = tag.as_str());
	let _enter = span.enter();

	let (mut id, mut class) = (None, None);
	let mut attributes = Vec::new();
	for Attribute { name, value } in api.attributes(element) {
		match name.as_str() {
			"id" => id = Some(value).filter(|id| !id.is_empty()),
			"class" => class = Some(value),
			_ => attributes.push(Attribute { name, value }),
		}
	}

	let mut sel = tag;
	if let Some(id) = id {
		sel.push('#');
		sel.push_str(&id);
	}
	for class in class.iter().flat_map(|class| class.split(' ')).filter(|class| !class.is_empty()) {
		sel.push('.');
		sel.push_str(class);
	}

	let children: Vec<_> = api.child_nodes(element).iter().map(|child| to_vnode(api, child)).collect();

	let mut data = VNodeData::default();
	if !attributes.is_empty() {
		data.extensions.insert(Attributes(attributes));
	}
	if is_svg_selector(&sel) {
		data.ns = Some(SVG_NAMESPACE.to_owned());
		add_ns(&children, SVG_NAMESPACE);
	}

	VNode::new(Some(sel), None, Some(data), Some(children.into()), None, Some(element.clone()))
}
