use graft_dom::{
	attributes::{self, Attributes},
	memory::{MemoryDom, Mutation},
	to_vnode, HostApi, Options, Patcher, Root, VNode,
};

mod memory_fixture_;
use memory_fixture_::{fixture, Fixture};

fn page(dom: &MemoryDom) -> graft_dom::memory::NodeId {
	let app = dom.create_element("div", None);
	dom.set_attribute(&app, "id", "app");
	dom.set_attribute(&app, "class", "a  b");
	dom.set_attribute(&app, "data-x", "1");
	let p = dom.create_element("p", None);
	dom.append_child(&p, &dom.create_text_node("hi"));
	dom.append_child(&app, &p);
	dom.append_child(&app, &dom.create_comment("c"));
	app
}

#[test]
fn loads_live_trees() {
	let dom = MemoryDom::new();
	let app = page(&dom);

	let vnode = to_vnode(&dom, &app);

	assert_eq!(vnode.sel(), Some("div#app.a.b"));
	assert_eq!(vnode.elm(), Some(app));
	assert_eq!(
		vnode.data().unwrap().extensions.get::<Attributes>(),
		Some(&Attributes::new().with("data-x", "1"))
	);

	let children = vnode.children().unwrap();
	assert_eq!(children.len(), 2);
	assert_eq!(children[0].sel(), Some("p"));
	assert!(children[0].data().unwrap().extensions.get::<Attributes>().is_none());
	assert_eq!(children[0].children().unwrap()[0].text_content(), Some("hi"));
	assert!(!children[0].children().unwrap()[0].has_data());
	assert!(children[1].is_comment());
	assert_eq!(children[1].text_content(), Some("c"));
}

#[test]
fn loaded_trees_patch_minimally() {
	let patcher = Patcher::with_api(MemoryDom::new(), vec![attributes::module()], Options::new());
	let dom = patcher.api();
	let app = page(dom);
	let old = to_vnode(dom, &app);
	dom.take_journal();

	let new = patcher.patch(
		old,
		VNode::element("div#app.a.b")
			.extension(Attributes::new().with("data-x", "2"))
			.children(vec![VNode::element("p").children(vec![VNode::text("hi")]).build(), VNode::comment("c")])
			.build(),
	);

	assert_eq!(new.elm(), Some(app));
	assert_eq!(
		dom.take_journal(),
		vec![Mutation::AttributeSet {
			node: app,
			name: "data-x".to_owned()
		}]
	);
	assert_eq!(dom.to_html(app), "<div id=\"app\" class=\"a  b\" data-x=\"2\"><p>hi</p><!--c--></div>");
}

#[test]
fn loads_svg_namespaces() {
	let dom = MemoryDom::new();
	let svg = dom.create_element_ns(graft_dom::vnode::SVG_NAMESPACE, "svg", None);
	dom.append_child(&svg, &dom.create_element_ns(graft_dom::vnode::SVG_NAMESPACE, "path", None));

	let vnode = to_vnode(&dom, &svg);

	assert_eq!(vnode.data().unwrap().ns.as_deref(), Some(graft_dom::vnode::SVG_NAMESPACE));
	assert_eq!(vnode.children().unwrap()[0].data().unwrap().ns.as_deref(), Some(graft_dom::vnode::SVG_NAMESPACE));
}

#[test]
fn attributes_are_created_and_updated() {
	let Fixture { patcher, placeholder, .. } = fixture(vec![attributes::module()], Options::new());
	let dom = patcher.api();

	let link = patcher.patch(
		Root::Node(placeholder),
		VNode::element("a.nav")
			.extension(Attributes::new().with("href", "/").with("title", "Home").with("rel", "home"))
			.build(),
	);
	let elm = link.elm().unwrap();
	assert_eq!(dom.to_html(elm), "<a class=\"nav\" href=\"/\" title=\"Home\" rel=\"home\"></a>");
	dom.take_journal();

	let link = patcher.patch(link, VNode::element("a.nav").extension(Attributes::new().with("href", "/").with("rel", "start")).build());

	assert_eq!(link.elm(), Some(elm));
	assert_eq!(
		dom.take_journal(),
		vec![
			Mutation::AttributeRemoved {
				node: elm,
				name: "title".to_owned()
			},
			Mutation::AttributeSet {
				node: elm,
				name: "rel".to_owned()
			},
		]
	);
	assert_eq!(dom.to_html(elm), "<a class=\"nav\" href=\"/\" rel=\"start\"></a>");

	patcher.patch(link, VNode::element("a.nav").build());
	assert_eq!(dom.to_html(elm), "<a class=\"nav\"></a>");
}
