//! The virtual node model.
//!
//! A [`VNode`] is a cheap handle to an otherwise immutable description of one node.
//! Only two parts of it can change after construction:
//!
//! - its data bag, which an `init` hook may rewrite before the node is materialised, and
//! - its [`elm`](`VNode::elm`) binding, which the [`Patcher`](`crate::Patcher`) writes as an *output* while patching.
//!
//! Handles compare by identity where it matters: patching a node against a clone of itself does nothing.

use crate::removal::RemovalHandle;
use core::{
	any::{Any, TypeId},
	cell::{Ref, RefCell, RefMut},
	fmt::{self, Debug, Formatter},
};
use hashbrown::HashMap;
use std::rc::Rc;

/// The selector marking a comment node.
pub const COMMENT_SELECTOR: &str = "!";

pub const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";

/// Identity of a node among its siblings.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
	String(String),
	Number(i64),
}
impl From<&str> for Key {
	fn from(key: &str) -> Self {
		Self::String(key.to_owned())
	}
}
impl From<String> for Key {
	fn from(key: String) -> Self {
		Self::String(key)
	}
}
macro_rules! number_keys {
	($($t:ty),*) => {$(
		impl From<$t> for Key {
			fn from(key: $t) -> Self {
				Self::Number(key.into())
			}
		}
	)*};
}
number_keys!(i8, i16, i32, i64, u8, u16, u32);

pub type Hook<N> = Rc<dyn Fn(&VNode<N>)>;
pub type PatchHook<N> = Rc<dyn Fn(&VNode<N>, &VNode<N>)>;
pub type RemoveHook<N> = Rc<dyn Fn(&VNode<N>, RemovalHandle)>;

/// Per-node lifecycle hooks.
///
/// `create` receives the shared empty placeholder as its first argument.
/// `remove` is responsible for eventually calling [`RemovalHandle::done`].
pub struct Hooks<N> {
	pub init: Option<Hook<N>>,
	pub create: Option<PatchHook<N>>,
	pub insert: Option<Hook<N>>,
	pub prepatch: Option<PatchHook<N>>,
	pub update: Option<PatchHook<N>>,
	pub postpatch: Option<PatchHook<N>>,
	pub destroy: Option<Hook<N>>,
	pub remove: Option<RemoveHook<N>>,
}
impl<N> Default for Hooks<N> {
	fn default() -> Self {
		Self {
			init: None,
			create: None,
			insert: None,
			prepatch: None,
			update: None,
			postpatch: None,
			destroy: None,
			remove: None,
		}
	}
}
impl<N> Clone for Hooks<N> {
	fn clone(&self) -> Self {
		Self {
			init: self.init.clone(),
			create: self.create.clone(),
			insert: self.insert.clone(),
			prepatch: self.prepatch.clone(),
			update: self.update.clone(),
			postpatch: self.postpatch.clone(),
			destroy: self.destroy.clone(),
			remove: self.remove.clone(),
		}
	}
}
impl<N> Debug for Hooks<N> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		let names = [
			("init", self.init.is_some()),
			("create", self.create.is_some()),
			("insert", self.insert.is_some()),
			("prepatch", self.prepatch.is_some()),
			("update", self.update.is_some()),
			("postpatch", self.postpatch.is_some()),
			("destroy", self.destroy.is_some()),
			("remove", self.remove.is_some()),
		];
		f.debug_set().entries(names.iter().filter(|(_, set)| *set).map(|(name, _)| name)).finish()
	}
}
impl<N> Hooks<N> {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	#[must_use]
	pub fn init(mut self, hook: impl 'static + Fn(&VNode<N>)) -> Self {
		self.init = Some(Rc::new(hook));
		self
	}

	#[must_use]
	pub fn create(mut self, hook: impl 'static + Fn(&VNode<N>, &VNode<N>)) -> Self {
		self.create = Some(Rc::new(hook));
		self
	}

	#[must_use]
	pub fn insert(mut self, hook: impl 'static + Fn(&VNode<N>)) -> Self {
		self.insert = Some(Rc::new(hook));
		self
	}

	#[must_use]
	pub fn prepatch(mut self, hook: impl 'static + Fn(&VNode<N>, &VNode<N>)) -> Self {
		self.prepatch = Some(Rc::new(hook));
		self
	}

	#[must_use]
	pub fn update(mut self, hook: impl 'static + Fn(&VNode<N>, &VNode<N>)) -> Self {
		self.update = Some(Rc::new(hook));
		self
	}

	#[must_use]
	pub fn postpatch(mut self, hook: impl 'static + Fn(&VNode<N>, &VNode<N>)) -> Self {
		self.postpatch = Some(Rc::new(hook));
		self
	}

	#[must_use]
	pub fn destroy(mut self, hook: impl 'static + Fn(&VNode<N>)) -> Self {
		self.destroy = Some(Rc::new(hook));
		self
	}

	#[must_use]
	pub fn remove(mut self, hook: impl 'static + Fn(&VNode<N>, RemovalHandle)) -> Self {
		self.remove = Some(Rc::new(hook));
		self
	}
}

/// Typed, module-owned sections of a node's data bag, keyed by their type.
#[derive(Default)]
pub struct Extensions(HashMap<TypeId, Box<dyn Any>>);
impl Extensions {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns the previous section of the same type, if any.
	pub fn insert<T: Any>(&mut self, section: T) -> Option<T> {
		self.0
			.insert(TypeId::of::<T>(), Box::new(section))
			.and_then(|previous| previous.downcast::<T>().ok())
			.map(|previous| *previous)
	}

	#[must_use]
	pub fn get<T: Any>(&self) -> Option<&T> {
		self.0.get(&TypeId::of::<T>()).and_then(|section| section.downcast_ref())
	}

	pub fn get_mut<T: Any>(&mut self) -> Option<&mut T> {
		self.0.get_mut(&TypeId::of::<T>()).and_then(|section| section.downcast_mut())
	}

	pub fn remove<T: Any>(&mut self) -> Option<T> {
		self.0.remove(&TypeId::of::<T>()).and_then(|section| section.downcast::<T>().ok()).map(|section| *section)
	}

	#[must_use]
	pub fn len(&self) -> usize {
		self.0.len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}
impl Debug for Extensions {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("Extensions").field("len", &self.0.len()).finish()
	}
}

/// A node's configuration bag.
pub struct VNodeData<N> {
	/// Element namespace. Elements with a namespace are created through [`HostApi::create_element_ns`](`crate::HostApi::create_element_ns`).
	pub ns: Option<String>,
	/// Customized built-in element hint. Part of node identity.
	pub is: Option<String>,
	pub hook: Hooks<N>,
	pub extensions: Extensions,
}
impl<N> Default for VNodeData<N> {
	fn default() -> Self {
		Self {
			ns: None,
			is: None,
			hook: Hooks::default(),
			extensions: Extensions::default(),
		}
	}
}
impl<N> Debug for VNodeData<N> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("VNodeData")
			.field("ns", &self.ns)
			.field("is", &self.is)
			.field("hook", &self.hook)
			.field("extensions", &self.extensions)
			.finish()
	}
}

struct Inner<N> {
	sel: Option<String>,
	key: Option<Key>,
	data: RefCell<Option<VNodeData<N>>>,
	children: Option<Rc<[VNode<N>]>>,
	text: Option<String>,
	elm: RefCell<Option<N>>,
}

/// A shared handle to one virtual node.
///
/// Cloning is cheap and preserves identity, see [`VNode::ptr_eq`].
pub struct VNode<N>(Rc<Inner<N>>);
impl<N> Clone for VNode<N> {
	fn clone(&self) -> Self {
		Self(Rc::clone(&self.0))
	}
}
impl<N: Debug> Debug for VNode<N> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		let mut debug = f.debug_struct("VNode");
		debug.field("sel", &self.0.sel).field("key", &self.0.key);
		if cfg!(feature = "dangerous-logging") {
			debug.field("text", &self.0.text);
		} else {
			debug.field("text.len()", &self.0.text.as_ref().map(String::len));
		}
		debug
			.field("children.len()", &self.0.children.as_ref().map(|children| children.len()))
			.field("elm", &self.0.elm.borrow())
			.finish()
	}
}

impl<N> VNode<N> {
	/// Raw constructor. Prefer [`VNode::element`], [`VNode::text`], [`VNode::comment`] or [`VNode::fragment`].
	#[must_use]
	pub fn new(
		sel: Option<String>,
		key: Option<Key>,
		data: Option<VNodeData<N>>,
		children: Option<Rc<[VNode<N>]>>,
		text: Option<String>,
		elm: Option<N>,
	) -> Self {
		Self(Rc::new(Inner {
			sel,
			key,
			data: RefCell::new(data),
			children,
			text,
			elm: RefCell::new(elm),
		}))
	}

	pub fn element(sel: impl Into<String>) -> VNodeBuilder<N> {
		VNodeBuilder {
			sel: Some(sel.into()),
			key: None,
			data: VNodeData::default(),
			children: None,
			text: None,
		}
	}

	/// A text node. Text nodes carry no data bag.
	pub fn text(text: impl Into<String>) -> Self {
		Self::new(None, None, None, None, Some(text.into()), None)
	}

	pub fn comment(text: impl Into<String>) -> Self {
		Self::new(Some(COMMENT_SELECTOR.to_owned()), None, Some(VNodeData::default()), None, Some(text.into()), None)
	}

	/// A selectorless node with children. Only materialised as a fragment if [`Options::fragments`](`crate::Options::fragments`) is enabled.
	pub fn fragment(children: impl IntoIterator<Item = VNode<N>>) -> Self {
		Self::new(None, None, Some(VNodeData::default()), Some(children.into_iter().collect()), None, None)
	}

	#[must_use]
	pub fn sel(&self) -> Option<&str> {
		self.0.sel.as_deref()
	}

	#[must_use]
	pub fn key(&self) -> Option<&Key> {
		self.0.key.as_ref()
	}

	#[must_use]
	pub fn text_content(&self) -> Option<&str> {
		self.0.text.as_deref()
	}

	#[must_use]
	pub fn children(&self) -> Option<&Rc<[VNode<N>]>> {
		self.0.children.as_ref()
	}

	/// Borrows the data bag, if there is one.
	///
	/// # Panics
	///
	/// Iff the data bag is currently borrowed mutably.
	#[must_use]
	pub fn data(&self) -> Option<Ref<'_, VNodeData<N>>> {
		Ref::filter_map(self.0.data.borrow(), Option::as_ref).ok()
	}

	#[must_use]
	pub fn has_data(&self) -> bool {
		self.0.data.borrow().is_some()
	}

	/// Mutably borrows the data bag, creating an empty one first if necessary.
	///
	/// # Panics
	///
	/// Iff the data bag is currently borrowed.
	pub fn data_mut(&self) -> RefMut<'_, VNodeData<N>> {
		RefMut::map(self.0.data.borrow_mut(), |data| data.get_or_insert_with(VNodeData::default))
	}

	/// A snapshot of this node's hooks, so that none of them run while the data bag is borrowed.
	#[must_use]
	pub fn hooks(&self) -> Option<Hooks<N>> {
		self.data().map(|data| data.hook.clone())
	}

	#[must_use]
	pub fn is(&self) -> Option<String> {
		self.data().and_then(|data| data.is.clone())
	}

	#[must_use]
	pub fn is_text(&self) -> bool {
		self.0.sel.is_none()
	}

	#[must_use]
	pub fn is_comment(&self) -> bool {
		self.sel() == Some(COMMENT_SELECTOR)
	}

	/// Whether `self` and `other` are the same handle.
	#[must_use]
	pub fn ptr_eq(&self, other: &Self) -> bool {
		Rc::ptr_eq(&self.0, &other.0)
	}

	/// Whether `self` and `other` describe the same logical node and can be reconciled in place.
	#[must_use]
	pub fn is_same(&self, other: &Self) -> bool {
		self.0.sel == other.0.sel && self.0.key == other.0.key && self.is() == other.is()
	}

	/// Whether `self` and `other` share their child sequence.
	#[must_use]
	pub fn children_ptr_eq(&self, other: &Self) -> bool {
		match (&self.0.children, &other.0.children) {
			(Some(a), Some(b)) => Rc::ptr_eq(a, b),
			_ => false,
		}
	}
}

impl<N: Clone> VNode<N> {
	/// The bound live node, once this node has been materialised or patched.
	#[must_use]
	pub fn elm(&self) -> Option<N> {
		self.0.elm.borrow().clone()
	}

	pub(crate) fn set_elm(&self, elm: Option<N>) {
		*self.0.elm.borrow_mut() = elm;
	}
}

/// Free-standing form of [`VNode::is_same`].
#[must_use]
pub fn same_vnode<N>(a: &VNode<N>, b: &VNode<N>) -> bool {
	a.is_same(b)
}

#[must_use = "Call `.build()` to create the node."]
pub struct VNodeBuilder<N> {
	sel: Option<String>,
	key: Option<Key>,
	data: VNodeData<N>,
	children: Option<Vec<VNode<N>>>,
	text: Option<String>,
}
impl<N> VNodeBuilder<N> {
	pub fn key(mut self, key: impl Into<Key>) -> Self {
		self.key = Some(key.into());
		self
	}

	pub fn ns(mut self, ns: impl Into<String>) -> Self {
		self.data.ns = Some(ns.into());
		self
	}

	pub fn is(mut self, is: impl Into<String>) -> Self {
		self.data.is = Some(is.into());
		self
	}

	pub fn hooks(mut self, hooks: Hooks<N>) -> Self {
		self.data.hook = hooks;
		self
	}

	pub fn extension<T: Any>(mut self, section: T) -> Self {
		self.data.extensions.insert(section);
		self
	}

	/// Replaces any text content.
	pub fn children(mut self, children: impl IntoIterator<Item = VNode<N>>) -> Self {
		self.children = Some(children.into_iter().collect());
		self.text = None;
		self
	}

	/// Replaces any children.
	pub fn text(mut self, text: impl Into<String>) -> Self {
		self.text = Some(text.into());
		self.children = None;
		self
	}

	pub fn build(self) -> VNode<N> {
		let Self { sel, key, mut data, children, text } = self;
		if sel.as_deref().map_or(false, is_svg_selector) {
			data.ns = Some(SVG_NAMESPACE.to_owned());
			if let Some(children) = &children {
				add_ns(children, SVG_NAMESPACE);
			}
		}
		VNode::new(sel, key, Some(data), children.map(Rc::from), text, None)
	}
}

#[must_use]
pub fn is_svg_selector(sel: &str) -> bool {
	sel.starts_with("svg") && matches!(sel.as_bytes().get(3), None | Some(b'.' | b'#'))
}

/// Sets `ns` on `children` and their element descendants, except below `foreignObject`.
pub(crate) fn add_ns<N>(children: &[VNode<N>], ns: &str) {
	for child in children {
		if child.is_text() {
			continue;
		}
		child.data_mut().ns = Some(ns.to_owned());
		if child.sel() != Some("foreignObject") {
			if let Some(grandchildren) = child.children() {
				add_ns(grandchildren, ns);
			}
		}
	}
}

/// The components of an element selector (`tag#id.class1.class2`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector<'a> {
	pub tag: &'a str,
	pub id: Option<&'a str>,
	/// Space-separated.
	pub class: Option<String>,
}

/// Splits `sel` at its first `#` and the first `.` after that.
#[must_use]
pub fn parse_selector(sel: &str) -> Selector<'_> {
	let hash_idx = sel.find('#');
	let dot_idx = {
		let from = hash_idx.unwrap_or(0);
		sel[from..].find('.').map(|i| i + from)
	};
	let hash = hash_idx.filter(|&i| i > 0).unwrap_or_else(|| sel.len());
	let dot = dot_idx.filter(|&i| i > 0).unwrap_or_else(|| sel.len());
	let tag = if hash_idx.is_some() || dot_idx.is_some() { &sel[..hash.min(dot)] } else { sel };
	Selector {
		tag,
		id: if hash < dot { Some(&sel[hash + 1..dot]) } else { None },
		class: if dot_idx.filter(|&i| i > 0).is_some() {
			Some(sel[dot + 1..].replace('.', " "))
		} else {
			None
		},
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn selector_plain_tag() {
		assert_eq!(parse_selector("div"), Selector { tag: "div", id: None, class: None });
	}

	#[test]
	fn selector_id_and_classes() {
		assert_eq!(
			parse_selector("div#x.old.new"),
			Selector {
				tag: "div",
				id: Some("x"),
				class: Some("old new".to_owned())
			}
		);
	}

	#[test]
	fn selector_classes_only() {
		assert_eq!(
			parse_selector("span.a.b"),
			Selector {
				tag: "span",
				id: None,
				class: Some("a b".to_owned())
			}
		);
	}

	#[test]
	fn selector_dot_before_hash_belongs_to_tag() {
		// Only a `.` after the `#` splits.
		let selector = parse_selector("a.b#c");
		assert_eq!(selector.tag, "a.b");
		assert_eq!(selector.id, Some("c"));
		assert_eq!(selector.class, None);
	}

	#[test]
	fn same_vnode_compares_sel_key_and_is() {
		let a = VNode::<()>::element("div").key("k").build();
		let b = VNode::<()>::element("div").key("k").text("other content").build();
		let c = VNode::<()>::element("div").key("k").is("x-div").build();
		let d = VNode::<()>::element("div").key(1).build();
		assert!(same_vnode(&a, &b));
		assert!(!same_vnode(&a, &c));
		assert!(!same_vnode(&a, &d));
		assert!(same_vnode(&VNode::<()>::text("a"), &VNode::text("b")));
	}

	#[test]
	fn svg_namespace_propagates_until_foreign_object() {
		let inner = VNode::<()>::element("div").build();
		let foreign = VNode::element("foreignObject").children(vec![inner.clone()]).build();
		let circle = VNode::element("circle").build();
		let svg = VNode::element("svg.icon").children(vec![circle.clone(), foreign.clone(), VNode::text("t")]).build();

		assert_eq!(svg.data().unwrap().ns.as_deref(), Some(SVG_NAMESPACE));
		assert_eq!(circle.data().unwrap().ns.as_deref(), Some(SVG_NAMESPACE));
		assert_eq!(foreign.data().unwrap().ns.as_deref(), Some(SVG_NAMESPACE));
		assert_eq!(inner.data().unwrap().ns, None);
	}

	#[test]
	fn svg_selector_detection() {
		assert!(is_svg_selector("svg"));
		assert!(is_svg_selector("svg#a"));
		assert!(is_svg_selector("svg.b"));
		assert!(!is_svg_selector("svgx"));
		assert!(!is_svg_selector("div"));
	}

	#[test]
	fn extensions_are_typed() {
		#[derive(Debug, PartialEq)]
		struct Marker(u8);

		let mut extensions = Extensions::new();
		assert_eq!(extensions.insert(Marker(1)), None);
		assert_eq!(extensions.insert(Marker(2)), Some(Marker(1)));
		assert_eq!(extensions.get::<Marker>(), Some(&Marker(2)));
		assert_eq!(extensions.get::<u8>(), None);
		assert_eq!(extensions.remove::<Marker>(), Some(Marker(2)));
		assert!(extensions.is_empty());
	}
}
