#![allow(dead_code)]

use graft_dom::{
	memory::{MemoryDom, NodeId},
	HostApi, Module, Options, Patcher, VNode,
};

/// A [`Patcher`] over a fresh [`MemoryDom`] whose `<body>` holds a single `<div>` placeholder.
pub struct Fixture {
	pub patcher: Patcher<MemoryDom>,
	pub body: NodeId,
	pub placeholder: NodeId,
}

pub fn fixture(modules: impl IntoIterator<Item = Module<MemoryDom>>, options: Options) -> Fixture {
	let patcher = Patcher::with_api(MemoryDom::new(), modules, options);
	let body = patcher.api().create_element("body", None);
	let placeholder = patcher.api().create_element("div", None);
	patcher.api().append_child(&body, &placeholder);
	patcher.api().take_journal();
	Fixture { patcher, body, placeholder }
}

pub fn li(key: &str) -> VNode<NodeId> {
	VNode::element("li").key(key).text(key).build()
}

pub fn ul(keys: &[&str]) -> VNode<NodeId> {
	VNode::element("ul").children(keys.iter().map(|key| li(key))).build()
}

pub fn child_elms(vnode: &VNode<NodeId>) -> Vec<NodeId> {
	vnode.children().map(|children| children.iter().filter_map(VNode::elm).collect()).unwrap_or_default()
}
