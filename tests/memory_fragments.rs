use graft_dom::{
	api::Attribute,
	memory::{MemoryDom, NodeId},
	Hooks, HostApi, Module, NodeKind, Options, Patcher, Root, VNode,
};
use std::{cell::RefCell, rc::Rc};

mod memory_fixture_;
use memory_fixture_::{child_elms, fixture, li, Fixture};

#[test]
fn fragment_children_land_in_the_parent() {
	let Fixture { patcher, placeholder, .. } = fixture(vec![], Options::new().with_fragments(true));
	let dom = patcher.api();

	let list = patcher.patch(
		Root::Node(placeholder),
		VNode::element("ul").children(vec![li("a"), VNode::fragment(vec![li("b"), li("c")]), li("d")]).build(),
	);
	let ul = list.elm().unwrap();
	let fragment = &list.children().unwrap()[1];

	assert_eq!(dom.kind(&fragment.elm().unwrap()), NodeKind::Fragment);
	assert!(dom.children(fragment.elm().unwrap()).is_empty());
	assert_eq!(dom.children(ul).len(), 4);
	assert_eq!(dom.children(ul)[1..3], child_elms(fragment)[..]);
	assert_eq!(dom.to_html(ul), "<ul><li>a</li><li>b</li><li>c</li><li>d</li></ul>");
}

#[test]
fn removing_a_fragment_removes_its_children() {
	let Fixture { patcher, placeholder, .. } = fixture(vec![], Options::new().with_fragments(true));
	let dom = patcher.api();

	let list = patcher.patch(
		Root::Node(placeholder),
		VNode::element("div")
			.children(vec![VNode::text("keep"), VNode::fragment(vec![VNode::text("text"), VNode::element("b").build()])])
			.build(),
	);
	let div = list.elm().unwrap();

	let list = patcher.patch(list, VNode::element("div").children(vec![VNode::text("keep")]).build());

	assert_eq!(list.elm(), Some(div));
	assert_eq!(dom.to_html(div), "<div>keep</div>");
}

#[test]
fn removed_fragments_destroy_each_child_once() {
	let events: Rc<RefCell<Vec<String>>> = Rc::default();
	let module = Module::<MemoryDom>::new("destroy-log").on_destroy({
		let events = events.clone();
		move |_, vnode| events.borrow_mut().push(format!("module destroy {}", vnode.sel().unwrap_or("fragment")))
	});
	let Fixture { patcher, placeholder, .. } = fixture(vec![module], Options::new().with_fragments(true));

	let b = VNode::element("b")
		.hooks(Hooks::new().destroy({
			let events = events.clone();
			move |_| events.borrow_mut().push("destroy b".to_owned())
		}))
		.build();
	let div = patcher.patch(Root::Node(placeholder), VNode::element("div").children(vec![VNode::fragment(vec![b])]).build());
	let b = child_elms(&div.children().unwrap()[0])[0];
	events.borrow_mut().clear();

	let div = patcher.patch(div, VNode::element("div").build());

	assert_eq!(*events.borrow(), vec!["module destroy fragment", "destroy b", "module destroy b"]);
	assert_eq!(patcher.api().parent(b), None);
	assert_eq!(patcher.api().to_html(div.elm().unwrap()), "<div></div>");
}

#[test]
fn fragments_grow_in_place() {
	let Fixture { patcher, placeholder, .. } = fixture(vec![], Options::new().with_fragments(true));
	let dom = patcher.api();

	let list = patcher.patch(Root::Node(placeholder), VNode::element("ul").children(vec![VNode::fragment(vec![li("a")])]).build());
	let ul = list.elm().unwrap();
	let a = child_elms(&list.children().unwrap()[0])[0];

	let list = patcher.patch(list, VNode::element("ul").children(vec![VNode::fragment(vec![li("a"), li("b")])]).build());

	assert_eq!(list.elm(), Some(ul));
	assert_eq!(child_elms(&list.children().unwrap()[0])[0], a);
	assert_eq!(dom.to_html(ul), "<ul><li>a</li><li>b</li></ul>");
}

#[test]
fn fragment_children_stay_ahead_of_later_siblings() {
	let Fixture { patcher, placeholder, .. } = fixture(vec![], Options::new().with_fragments(true));
	let dom = patcher.api();

	let list = patcher.patch(
		Root::Node(placeholder),
		VNode::element("ul").children(vec![VNode::fragment(vec![li("a")]), li("z")]).build(),
	);
	let ul = list.elm().unwrap();

	let list = patcher.patch(list, VNode::element("ul").children(vec![VNode::fragment(vec![li("a"), li("b")]), li("z")]).build());
	assert_eq!(dom.to_html(ul), "<ul><li>a</li><li>b</li><li>z</li></ul>");

	let list = patcher.patch(list, VNode::element("ul").children(vec![VNode::fragment(vec![li("b")]), li("z")]).build());
	assert_eq!(dom.to_html(ul), "<ul><li>b</li><li>z</li></ul>");

	patcher.patch(list, VNode::element("ul").children(vec![VNode::fragment(vec![li("c"), li("b")]), li("z")]).build());
	assert_eq!(dom.to_html(ul), "<ul><li>c</li><li>b</li><li>z</li></ul>");
}

#[test]
fn empty_fragments_are_filled_where_they_stand() {
	let Fixture { patcher, placeholder, .. } = fixture(vec![], Options::new().with_fragments(true));
	let dom = patcher.api();

	let list = patcher.patch(
		Root::Node(placeholder),
		VNode::element("ul").children(vec![li("a"), VNode::fragment(vec![]), li("z")]).build(),
	);
	let ul = list.elm().unwrap();
	assert_eq!(dom.to_html(ul), "<ul><li>a</li><li>z</li></ul>");

	patcher.patch(list, VNode::element("ul").children(vec![li("a"), VNode::fragment(vec![li("m")]), li("z")]).build());
	assert_eq!(dom.to_html(ul), "<ul><li>a</li><li>m</li><li>z</li></ul>");
}

#[test]
fn fragments_are_empty_text_when_disabled() {
	let Fixture { patcher, placeholder, .. } = fixture(vec![], Options::new());
	let dom = patcher.api();

	let div = patcher.patch(
		Root::Node(placeholder),
		VNode::element("div").children(vec![VNode::fragment(vec![li("ignored")])]).build(),
	);

	let children = dom.children(div.elm().unwrap());
	assert_eq!(children.len(), 1);
	assert_eq!(dom.kind(&children[0]), NodeKind::Text);
	assert_eq!(dom.to_html(div.elm().unwrap()), "<div></div>");
}

/// Delegates to [`MemoryDom`], but can't create document fragments.
#[derive(Debug, Default)]
struct NoFragments(MemoryDom);
impl HostApi for NoFragments {
	type Node = NodeId;

	fn create_element(&self, tag: &str, is: Option<&str>) -> NodeId {
		self.0.create_element(tag, is)
	}
	fn create_element_ns(&self, ns: &str, tag: &str, is: Option<&str>) -> NodeId {
		self.0.create_element_ns(ns, tag, is)
	}
	fn create_text_node(&self, text: &str) -> NodeId {
		self.0.create_text_node(text)
	}
	fn create_comment(&self, text: &str) -> NodeId {
		self.0.create_comment(text)
	}
	fn insert_before(&self, parent: &NodeId, node: &NodeId, reference: Option<&NodeId>) {
		self.0.insert_before(parent, node, reference)
	}
	fn remove_child(&self, parent: &NodeId, node: &NodeId) {
		self.0.remove_child(parent, node)
	}
	fn parent_node(&self, node: &NodeId) -> Option<NodeId> {
		self.0.parent_node(node)
	}
	fn next_sibling(&self, node: &NodeId) -> Option<NodeId> {
		self.0.next_sibling(node)
	}
	fn first_child(&self, node: &NodeId) -> Option<NodeId> {
		self.0.first_child(node)
	}
	fn set_text_content(&self, node: &NodeId, text: &str) {
		self.0.set_text_content(node, text)
	}
	fn text_content(&self, node: &NodeId) -> Option<String> {
		self.0.text_content(node)
	}
	fn tag_name(&self, node: &NodeId) -> String {
		self.0.tag_name(node)
	}
	fn get_attribute(&self, node: &NodeId, name: &str) -> Option<String> {
		self.0.get_attribute(node, name)
	}
	fn set_attribute(&self, node: &NodeId, name: &str, value: &str) {
		self.0.set_attribute(node, name, value)
	}
	fn remove_attribute(&self, node: &NodeId, name: &str) {
		self.0.remove_attribute(node, name)
	}
	fn attributes(&self, node: &NodeId) -> Vec<Attribute> {
		self.0.attributes(node)
	}
	fn kind(&self, node: &NodeId) -> NodeKind {
		self.0.kind(node)
	}
}

#[test]
fn plain_nodes_work_without_fragment_support() {
	let patcher = Patcher::with_api(NoFragments::default(), vec![], Options::new().with_fragments(true));
	let root = patcher.api().create_element("div", None);

	let p = patcher.patch(Root::Node(root), VNode::element("div").children(vec![VNode::text("fine")]).build());

	assert_eq!(p.elm(), Some(root));
	assert_eq!(patcher.api().0.to_html(root), "<div>fine</div>");
}

#[test]
#[should_panic(expected = "doesn't support document fragments")]
fn fragments_without_host_support_panic() {
	let patcher = Patcher::with_api(NoFragments::default(), vec![], Options::new().with_fragments(true));
	let root = patcher.api().create_element("div", None);

	patcher.patch(Root::Node(root), VNode::element("div").children(vec![VNode::fragment(vec![VNode::text("nope")])]).build());
}
