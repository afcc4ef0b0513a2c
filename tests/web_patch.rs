#![cfg(target_arch = "wasm32")]

use graft_dom::{attributes, attributes::Attributes, to_vnode, web::WebDom, HostApi, Options, Patcher, Root, VNode};
use std::sync::Once;
use wasm_bindgen::JsCast;
use wasm_bindgen_test::{wasm_bindgen_test, wasm_bindgen_test_configure};
use web_sys::{window, Element, HtmlBodyElement, Node};

wasm_bindgen_test_configure!(run_in_browser);

static LOG_INIT: Once = Once::new();

/// Appends a fresh `<div>` to the document body, so that tests don't see each other's nodes.
fn container() -> Element {
	LOG_INIT.call_once(tracing_wasm::set_as_global_default);

	let document = window().unwrap().document().unwrap();
	let body = document.body().unwrap().dyn_into::<HtmlBodyElement>().unwrap();
	let container = document.create_element("div").unwrap();
	body.append_child(&container).unwrap();
	container
}

fn mount(patcher: &Patcher<WebDom>, container: &Element, vnode: VNode<Node>) -> VNode<Node> {
	let placeholder = patcher.api().create_element("div", None);
	patcher.api().append_child(container, &placeholder);
	patcher.patch(Root::Node(placeholder), vnode)
}

fn li(key: &str) -> VNode<Node> {
	VNode::element("li").key(key).text(key).build()
}

#[wasm_bindgen_test]
fn comment_and_text() {
	let container = container();
	let patcher = Patcher::<WebDom>::new(vec![]);

	mount(
		&patcher,
		&container,
		VNode::element("p").children(vec![VNode::comment("Hello graft-dom comment!"), VNode::text("Hello graft-dom text!")]).build(),
	);

	assert_eq!(container.inner_html(), "<p><!--Hello graft-dom comment!-->Hello graft-dom text!</p>");
}

#[wasm_bindgen_test]
fn keyed_reorder_reuses_nodes() {
	let container = container();
	let patcher = Patcher::<WebDom>::new(vec![]);

	let list = mount(&patcher, &container, VNode::element("ul").children(vec![li("a"), li("b"), li("c"), li("d")]).build());
	let before: Vec<Node> = list.children().unwrap().iter().filter_map(VNode::elm).collect();

	let list = patcher.patch(list, VNode::element("ul").children(vec![li("d"), li("a"), li("b"), li("c")]).build());
	let after: Vec<Node> = list.children().unwrap().iter().filter_map(VNode::elm).collect();

	assert_eq!(after, vec![before[3].clone(), before[0].clone(), before[1].clone(), before[2].clone()]);
	assert_eq!(container.inner_html(), "<ul><li>d</li><li>a</li><li>b</li><li>c</li></ul>");
}

#[wasm_bindgen_test]
fn svg_is_namespaced() {
	let container = container();
	let patcher = Patcher::<WebDom>::new(vec![]);

	let svg = mount(&patcher, &container, VNode::element("svg").children(vec![VNode::element("circle").build()]).build());

	let circle = svg.children().unwrap()[0].elm().unwrap().dyn_into::<Element>().unwrap();
	assert_eq!(circle.namespace_uri().as_deref(), Some(graft_dom::vnode::SVG_NAMESPACE));
}

#[wasm_bindgen_test]
fn load_and_patch_attributes() {
	let container = container();
	container.set_inner_html("<a id=\"home\" href=\"/\" title=\"Home\">Home</a>");
	let patcher = Patcher::<WebDom>::new(vec![attributes::module()]);

	let link = container.first_child().unwrap();
	let old = to_vnode(patcher.api(), &link);
	assert_eq!(old.sel(), Some("a#home"));

	let new = patcher.patch(
		old,
		VNode::element("a#home")
			.extension(Attributes::new().with("href", "/start"))
			.children(vec![VNode::text("Start")])
			.build(),
	);

	assert_eq!(new.elm(), Some(link));
	assert_eq!(container.inner_html(), "<a id=\"home\" href=\"/start\">Start</a>");
}

#[wasm_bindgen_test]
fn fragments() {
	let container = container();
	let patcher = Patcher::with_api(WebDom::default(), vec![], Options::new().with_fragments(true));

	let list = mount(
		&patcher,
		&container,
		VNode::element("ul").children(vec![li("a"), VNode::fragment(vec![li("b"), li("c")])]).build(),
	);
	assert_eq!(container.inner_html(), "<ul><li>a</li><li>b</li><li>c</li></ul>");

	patcher.patch(list, VNode::element("ul").children(vec![li("a")]).build());
	assert_eq!(container.inner_html(), "<ul><li>a</li></ul>");
}
