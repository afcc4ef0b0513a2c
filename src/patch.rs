use crate::{
	api::HostApi,
	module::{Callbacks, Module},
	removal::RemovalHandle,
	vnode::{parse_selector, Key, Selector, VNode, VNodeData, COMMENT_SELECTOR},
};
use core::fmt::{self, Debug, Formatter};
use hashbrown::HashMap;
use std::rc::Rc;
use tracing::{debug, error, instrument, trace, trace_span, warn};

/// Construction-time configuration of a [`Patcher`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Options {
	/// Materialise selectorless nodes with children as document fragments.
	///
	/// The host API must then support [`HostApi::create_document_fragment`].
	pub fragments: bool,
}
impl Options {
	#[must_use]
	pub const fn new() -> Self {
		Self { fragments: false }
	}

	#[must_use]
	pub const fn with_fragments(self, fragments: bool) -> Self {
		Self { fragments }
	}
}

/// What a [`Patcher::patch`] call reconciles against.
#[derive(Debug, Clone)]
pub enum Root<N> {
	/// The result of a previous [`Patcher::patch`] call.
	VNode(VNode<N>),
	/// A live element or fragment not yet managed by the [`Patcher`].
	Node(N),
}
impl<N> From<VNode<N>> for Root<N> {
	fn from(vnode: VNode<N>) -> Self {
		Self::VNode(vnode)
	}
}

type InsertedQueue<N> = Vec<VNode<N>>;

/// Reconciles virtual trees onto a live host tree.
///
/// # Correct Use
///
/// Each [`patch`](`Patcher::patch`) call consumes the new tree's nodes.
/// Pass its result as root to the next call, and don't reuse a subtree in two places of the same tree.
///
/// Keys must be unique among siblings. Duplicates don't cause errors, but may make the wrong live node be reused.
pub struct Patcher<A: HostApi> {
	api: Rc<A>,
	callbacks: Callbacks<A>,
	empty: VNode<A::Node>,
	options: Options,
}
impl<A: HostApi> Debug for Patcher<A> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("Patcher").field("callbacks", &self.callbacks).field("options", &self.options).finish()
	}
}

impl<A: HostApi + Default> Patcher<A> {
	/// Creates a [`Patcher`] over the default host API with default [`Options`].
	pub fn new(modules: impl IntoIterator<Item = Module<A>>) -> Self {
		Self::with_api(A::default(), modules, Options::new())
	}
}

impl<A: HostApi> Patcher<A> {
	/// `modules` fire in the given order.
	pub fn with_api(api: A, modules: impl IntoIterator<Item = Module<A>>, options: Options) -> Self {
		Self {
			api: Rc::new(api),
			callbacks: Callbacks::new(modules),
			empty: VNode::new(Some(String::new()), None, Some(VNodeData::default()), Some(Rc::from(Vec::new())), None, None),
			options,
		}
	}

	#[must_use]
	pub fn api(&self) -> &A {
		&self.api
	}

	#[must_use]
	pub fn options(&self) -> Options {
		self.options
	}

	/// Reconciles `vnode` onto `old` and returns `vnode`, now bound to the live tree.
	///
	/// If `old` and `vnode` aren't the [same logical node](`VNode::is_same`), `vnode` is built fresh,
	/// inserted after `old`'s live node and `old` is removed.
	/// If `old`'s live node has no parent, the new tree is built but not attached anywhere.
	///
	/// # Panics
	///
	/// If [`Options::fragments`] is enabled but the host API can't create fragments, and a fragment is needed.
	///
	/// Hook and module panics propagate unchanged.
	#[instrument(skip(self, old, vnode))]
	pub fn patch(&self, old: impl Into<Root<A::Node>>, vnode: VNode<A::Node>) -> VNode<A::Node> {
		let api = &*self.api;
		let mut inserted = InsertedQueue::new();

		for pre in &self.callbacks.pre {
			pre(api)
		}

		let old = match old.into() {
			Root::VNode(old) => old,
			Root::Node(elm) => self.empty_node_at(elm),
		};

		if old.is_same(&vnode) {
			self.patch_vnode(&old, &vnode, None, &mut inserted);
		} else {
			let span = trace_span!("Replacing root", old.sel = ?old.sel(), sel = ?vnode.sel());
			let _enter = span.enter();

			let parent = self.first_live(&old).and_then(|first| api.parent_node(&first));
			let elm = self.create_elm(&vnode, &mut inserted);
			match parent {
				Some(parent) => {
					let after = self.last_live(&old).and_then(|last| api.next_sibling(&last));
					api.insert_before(&parent, &elm, after.as_ref());
					self.remove_vnodes(&parent, Some(&old));
				}
				None => debug!("The previous root isn't attached. The new tree won't be inserted."),
			}
		}

		trace!("Firing {} insert hook(s).", inserted.len());
		for vnode in &inserted {
			if let Some(insert) = vnode.hooks().and_then(|hooks| hooks.insert) {
				insert(vnode)
			}
		}

		for post in &self.callbacks.post {
			post(api)
		}

		vnode
	}

	/// Wraps a live node not yet managed by this [`Patcher`] in an empty [`VNode`] bound to it.
	fn empty_node_at(&self, elm: A::Node) -> VNode<A::Node> {
		let api = &*self.api;
		if api.is_document_fragment(&elm) {
			return VNode::new(None, None, Some(VNodeData::default()), Some(Rc::from(Vec::new())), None, Some(elm));
		}

		let id = api.get_attribute(&elm, "id").filter(|id| !id.is_empty()).map(|id| format!("#{}", id)).unwrap_or_default();
		let class = api
			.get_attribute(&elm, "class")
			.filter(|class| !class.is_empty())
			.map(|class| format!(".{}", class.split(' ').collect::<Vec<_>>().join(".")))
			.unwrap_or_default();
		let sel = format!("{}{}{}", api.tag_name(&elm).to_lowercase(), id, class);
		trace!("Adopting live node as {:?}.", sel);
		VNode::new(Some(sel), None, Some(VNodeData::default()), Some(Rc::from(Vec::new())), None, Some(elm))
	}

	/// Materialises `vnode` and its descendants, binding each to its new live node.
	///
	/// Nodes with an `insert` hook are queued in `inserted`.
	fn create_elm(&self, vnode: &VNode<A::Node>, inserted: &mut InsertedQueue<A::Node>) -> A::Node {
		let api = &*self.api;

		// `init` may rewrite the data bag, so nothing is read from it before this.
		if let Some(init) = vnode.hooks().and_then(|hooks| hooks.init) {
			init(vnode)
		}

		match vnode.sel() {
			Some(COMMENT_SELECTOR) => {
				let text = vnode.text_content().unwrap_or("");
				let span = text_span("Creating comment", text);
				let _enter = span.enter();
				let elm = api.create_comment(text);
				vnode.set_elm(Some(elm.clone()));
				elm
			}

			Some(sel) => {
				let Selector { tag, id, class } = parse_selector(sel);
				let (ns, is) = vnode.data().map_or((None, None), |data| (data.ns.clone(), data.is.clone()));
				let span = trace_span!("Creating element", tag, ?ns, ?is);
				let _enter = span.enter();

				let elm = match &ns {
					Some(ns) => api.create_element_ns(ns, tag, is.as_deref()),
					None => api.create_element(tag, is.as_deref()),
				};
				vnode.set_elm(Some(elm.clone()));
				if let Some(id) = id {
					api.set_attribute(&elm, "id", id)
				}
				if let Some(class) = class {
					api.set_attribute(&elm, "class", &class)
				}

				for create in &self.callbacks.create {
					create(api, &self.empty, vnode)
				}

				if let Some(children) = vnode.children() {
					for child in children.iter() {
						let child_elm = self.create_elm(child, inserted);
						api.append_child(&elm, &child_elm)
					}
				} else if let Some(text) = vnode.text_content() {
					api.append_child(&elm, &api.create_text_node(text))
				}

				if let Some(hooks) = vnode.hooks() {
					if let Some(create) = hooks.create {
						create(&self.empty, vnode)
					}
					if hooks.insert.is_some() {
						inserted.push(vnode.clone())
					}
				}
				elm
			}

			None => match vnode.children() {
				Some(children) if self.options.fragments => {
					let span = trace_span!("Creating fragment", children.len = children.len());
					let _enter = span.enter();

					let elm = api
						.create_document_fragment()
						.unwrap_or_else(|| panic!("graft-dom: `Options::fragments` is enabled, but the host API doesn't support document fragments."));
					vnode.set_elm(Some(elm.clone()));

					for create in &self.callbacks.create {
						create(api, &self.empty, vnode)
					}

					for child in children.iter() {
						let child_elm = self.create_elm(child, inserted);
						api.append_child(&elm, &child_elm)
					}
					elm
				}

				_ => {
					let text = vnode.text_content().unwrap_or("");
					let span = text_span("Creating text node", text);
					let _enter = span.enter();
					let elm = api.create_text_node(text);
					vnode.set_elm(Some(elm.clone()));
					elm
				}
			},
		}
	}

	fn add_vnodes(&self, parent: &A::Node, before: Option<&A::Node>, vnodes: &[VNode<A::Node>], inserted: &mut InsertedQueue<A::Node>) {
		for vnode in vnodes {
			let elm = self.create_elm(vnode, inserted);
			self.api.insert_before(parent, &elm, before)
		}
	}

	/// Fires `destroy` hooks for `vnode` and then its descendants. Nodes without data bag are skipped along with their children.
	fn invoke_destroy_hook(&self, vnode: &VNode<A::Node>) {
		if !self.destroy_one(vnode) {
			return;
		}
		if let Some(children) = vnode.children() {
			for child in children.iter() {
				self.invoke_destroy_hook(child)
			}
		}
	}

	/// Fires `vnode`'s own and the modules' `destroy` hooks, but not its descendants'.
	///
	/// Returns `false` iff `vnode` has no data bag and was skipped.
	fn destroy_one(&self, vnode: &VNode<A::Node>) -> bool {
		if !vnode.has_data() {
			return false;
		}
		if let Some(destroy) = vnode.hooks().and_then(|hooks| hooks.destroy) {
			destroy(vnode)
		}
		for destroy in &self.callbacks.destroy {
			destroy(&*self.api, vnode)
		}
		true
	}

	/// Removes `vnodes` from `parent`.
	///
	/// Elements and comments are destroyed synchronously, but detached only once every `remove` listener is done.
	/// Text nodes are detached immediately.
	fn remove_vnodes<'a>(&self, parent: &A::Node, vnodes: impl IntoIterator<Item = &'a VNode<A::Node>>) {
		let api = &*self.api;
		for vnode in vnodes {
			if let Some(sel) = vnode.sel() {
				let span = trace_span!("Removing element", sel);
				let _enter = span.enter();

				self.invoke_destroy_hook(vnode);

				let elm = match vnode.elm() {
					Some(elm) => elm,
					None => {
						error!("Expected to remove a bound node, but it was never materialised. Skipping.");
						continue;
					}
				};
				let handle = RemovalHandle::new(self.callbacks.remove.len() + 1, {
					let api = Rc::clone(&self.api);
					move || match api.parent_node(&elm) {
						Some(parent) => api.remove_child(&parent, &elm),
						None => trace!("Removed node was already detached."),
					}
				});

				for remove in &self.callbacks.remove {
					remove(api, vnode, handle.clone())
				}
				match vnode.hooks().and_then(|hooks| hooks.remove) {
					Some(remove) => remove(vnode, handle),
					None => handle.done(),
				}
			} else if let Some(children) = vnode.children().filter(|_| self.options.fragments) {
				let span = trace_span!("Removing fragment", children.len = children.len());
				let _enter = span.enter();

				// The children are destroyed as they are removed.
				self.destroy_one(vnode);
				self.remove_vnodes(parent, children.iter());
			} else {
				let span = text_span("Removing text node", vnode.text_content().unwrap_or(""));
				let _enter = span.enter();

				match vnode.elm() {
					Some(elm) => api.remove_child(parent, &elm),
					None => error!("Expected to remove a bound text node, but it was never materialised. Skipping."),
				}
			}
		}
	}

	/// Whether `vnode` is materialised as a document fragment.
	fn is_fragment(&self, vnode: &VNode<A::Node>) -> bool {
		self.options.fragments && vnode.sel().is_none() && vnode.children().is_some()
	}

	/// The first live node of `vnode`'s range. Once inserted, a fragment is represented by its children's live nodes.
	fn first_live(&self, vnode: &VNode<A::Node>) -> Option<A::Node> {
		match vnode.children().filter(|_| self.is_fragment(vnode)) {
			Some(children) => self.first_live_in(children.iter()),
			None => vnode.elm(),
		}
	}

	fn last_live(&self, vnode: &VNode<A::Node>) -> Option<A::Node> {
		match vnode.children().filter(|_| self.is_fragment(vnode)) {
			Some(children) => children.iter().rev().find_map(|child| self.last_live(child)),
			None => vnode.elm(),
		}
	}

	fn first_live_in<'a>(&self, vnodes: impl IntoIterator<Item = &'a VNode<A::Node>>) -> Option<A::Node> {
		vnodes.into_iter().find_map(|vnode| self.first_live(vnode))
	}

	/// The live node before which content goes that is placed ahead of `window`.
	///
	/// `tail` are the already reconciled new siblings after the window, `end` is where the parent's range ends.
	fn anchor(&self, window: &[Option<VNode<A::Node>>], tail: &[VNode<A::Node>], end: Option<&A::Node>) -> Option<A::Node> {
		self.first_live_in(window.iter().flatten())
			.or_else(|| self.first_live_in(tail))
			.or_else(|| end.cloned())
	}

	/// Moves `vnode`'s live range into `parent` before `before`.
	fn insert_live(&self, parent: &A::Node, vnode: &VNode<A::Node>, before: Option<&A::Node>) {
		match vnode.children().filter(|_| self.is_fragment(vnode)) {
			Some(children) => {
				for child in children.iter() {
					self.insert_live(parent, child, before)
				}
			}
			None => {
				if let Some(elm) = vnode.elm() {
					self.api.insert_before(parent, &elm, before)
				}
			}
		}
	}

	/// Where an empty fragment's children go, since its range can't be found through them.
	fn fallback_range(
		&self,
		old: &VNode<A::Node>,
		parent: &A::Node,
		after: &[Option<VNode<A::Node>>],
		tail: &[VNode<A::Node>],
		end: Option<&A::Node>,
	) -> Option<(A::Node, Option<A::Node>)> {
		if self.is_fragment(old) && self.first_live(old).is_none() {
			Some((parent.clone(), self.anchor(after, tail, end)))
		} else {
			None
		}
	}

	/// The parent and end of the live range `old`'s children occupy, if `old` is a fragment bound to `elm`.
	fn fragment_range(&self, old: &VNode<A::Node>, elm: &A::Node, fallback: Option<(A::Node, Option<A::Node>)>) -> (A::Node, Option<A::Node>) {
		let api = &*self.api;
		match self.first_live(old) {
			Some(first) => (
				api.parent_node(&first).unwrap_or_else(|| elm.clone()),
				self.last_live(old).and_then(|last| api.next_sibling(&last)),
			),
			None => fallback.unwrap_or_else(|| (elm.clone(), None)),
		}
	}

	/// Mutates `parent`'s children from `old_ch` to `new_ch`, reusing live nodes of matching old children.
	///
	/// `end` is the live node after the managed range, if it doesn't extend to the end of `parent`.
	#[allow(clippy::too_many_lines)]
	#[instrument(skip(self, parent, old_ch, new_ch, end, inserted), fields(old_ch.len = old_ch.len(), new_ch.len = new_ch.len()))]
	fn update_children(
		&self,
		parent: &A::Node,
		old_ch: &[VNode<A::Node>],
		new_ch: &[VNode<A::Node>],
		end: Option<&A::Node>,
		inserted: &mut InsertedQueue<A::Node>,
	) {
		let api = &*self.api;

		// Slots are cleared once their node was reused via key lookup.
		let mut old_ch: Vec<Option<VNode<A::Node>>> = old_ch.iter().cloned().map(Some).collect();
		// Both windows are half-open.
		let (mut old_start, mut old_end) = (0, old_ch.len());
		let (mut new_start, mut new_end) = (0, new_ch.len());
		let mut key_map: Option<HashMap<Key, usize>> = None;

		while old_start < old_end && new_start < new_end {
			let (old_start_vnode, old_end_vnode) = match (&old_ch[old_start], &old_ch[old_end - 1]) {
				(None, _) => {
					old_start += 1;
					continue;
				}
				(_, None) => {
					old_end -= 1;
					continue;
				}
				(Some(old_start_vnode), Some(old_end_vnode)) => (old_start_vnode.clone(), old_end_vnode.clone()),
			};
			let new_start_vnode = &new_ch[new_start];
			let new_end_vnode = &new_ch[new_end - 1];
			let tail = &new_ch[new_end..];

			if old_start_vnode.is_same(new_start_vnode) {
				let fallback = self.fallback_range(&old_start_vnode, parent, &old_ch[old_start + 1..old_end], tail, end);
				self.patch_vnode(&old_start_vnode, new_start_vnode, fallback, inserted);
				old_start += 1;
				new_start += 1;
			} else if old_end_vnode.is_same(new_end_vnode) {
				let fallback = self.fallback_range(&old_end_vnode, parent, &[], tail, end);
				self.patch_vnode(&old_end_vnode, new_end_vnode, fallback, inserted);
				old_end -= 1;
				new_end -= 1;
			} else if old_start_vnode.is_same(new_end_vnode) {
				trace!("Moving node right.");
				let fallback = self.fallback_range(&old_start_vnode, parent, &old_ch[old_start + 1..old_end], tail, end);
				self.patch_vnode(&old_start_vnode, new_end_vnode, fallback, inserted);
				let after = match self.last_live(&old_end_vnode) {
					Some(last) => api.next_sibling(&last),
					None => self.anchor(&[], tail, end),
				};
				self.insert_live(parent, &old_start_vnode, after.as_ref());
				old_start += 1;
				new_end -= 1;
			} else if old_end_vnode.is_same(new_start_vnode) {
				trace!("Moving node left.");
				let fallback = self.fallback_range(&old_end_vnode, parent, &[], tail, end);
				self.patch_vnode(&old_end_vnode, new_start_vnode, fallback, inserted);
				let before = self.anchor(&old_ch[old_start..old_end], tail, end);
				self.insert_live(parent, &old_end_vnode, before.as_ref());
				old_end -= 1;
				new_start += 1;
			} else {
				let key_map = key_map.get_or_insert_with(|| key_to_old_index(&old_ch, old_start, old_end));
				let before = self.anchor(&old_ch[old_start..old_end], tail, end);

				// Hits outside the window or on cleared slots only happen with duplicate keys.
				let matched = new_start_vnode
					.key()
					.and_then(|key| key_map.get(key))
					.copied()
					.filter(|&i| old_start <= i && i < old_end)
					.and_then(|i| old_ch[i].clone().map(|vnode| (i, vnode)));

				match matched {
					Some((i, elm_to_move)) if elm_to_move.sel() == new_start_vnode.sel() => {
						trace!("Moving keyed node from {} to before {}.", i, old_start);
						let fallback = self.fallback_range(&elm_to_move, parent, &old_ch[i + 1..old_end], tail, end);
						self.patch_vnode(&elm_to_move, new_start_vnode, fallback, inserted);
						old_ch[i] = None;
						self.insert_live(parent, &elm_to_move, before.as_ref());
					}
					_ => {
						trace!("Creating node at {}.", new_start);
						let elm = self.create_elm(new_start_vnode, inserted);
						api.insert_before(parent, &elm, before.as_ref())
					}
				}
				new_start += 1;
			}
		}

		if new_start < new_end {
			let before = self.first_live_in(&new_ch[new_end..]).or_else(|| end.cloned());
			self.add_vnodes(parent, before.as_ref(), &new_ch[new_start..new_end], inserted);
		}
		if old_start < old_end {
			self.remove_vnodes(parent, old_ch[old_start..old_end].iter().flatten());
		}
	}

	/// Reconciles `vnode` onto `old`'s live node. The two must be the [same logical node](`VNode::is_same`).
	///
	/// `fallback` locates the children of an inserted fragment that had none.
	fn patch_vnode(&self, old: &VNode<A::Node>, vnode: &VNode<A::Node>, fallback: Option<(A::Node, Option<A::Node>)>, inserted: &mut InsertedQueue<A::Node>) {
		let api = &*self.api;
		let hooks = vnode.hooks();

		if let Some(prepatch) = hooks.as_ref().and_then(|hooks| hooks.prepatch.clone()) {
			prepatch(old, vnode)
		}

		let elm = old.elm();
		vnode.set_elm(elm.clone());
		if old.ptr_eq(vnode) {
			return trace!("Identical node. Skipping.");
		}
		let elm = match elm {
			Some(elm) => elm,
			None => return error!("Expected to patch a bound node, but the previous node was never materialised. Skipping."),
		};

		if vnode.has_data() || (vnode.text_content().is_some() && vnode.text_content() != old.text_content()) {
			drop(vnode.data_mut());
			drop(old.data_mut());
			for update in &self.callbacks.update {
				update(api, old, vnode)
			}
			if let Some(update) = vnode.hooks().and_then(|hooks| hooks.update) {
				update(old, vnode)
			}
		}

		// An inserted fragment's own node is empty. Its children live in the enclosing parent.
		let (parent, end) = if self.is_fragment(vnode) {
			self.fragment_range(old, &elm, fallback)
		} else {
			(elm.clone(), None)
		};

		match vnode.text_content() {
			None => match (old.children(), vnode.children()) {
				(Some(old_ch), Some(ch)) => {
					if !old.children_ptr_eq(vnode) {
						self.update_children(&parent, old_ch, ch, end.as_ref(), inserted)
					}
				}
				(None, Some(ch)) => {
					if old.text_content().is_some() {
						api.set_text_content(&elm, "")
					}
					self.add_vnodes(&parent, end.as_ref(), ch, inserted)
				}
				(Some(old_ch), None) => self.remove_vnodes(&parent, old_ch.iter()),
				(None, None) => {
					if old.text_content().is_some() {
						api.set_text_content(&elm, "")
					}
				}
			},
			Some(text) => {
				if old.text_content() != Some(text) {
					if let Some(old_ch) = old.children() {
						self.remove_vnodes(&parent, old_ch.iter())
					}
					api.set_text_content(&elm, text)
				}
			}
		}

		if let Some(postpatch) = hooks.and_then(|hooks| hooks.postpatch) {
			postpatch(old, vnode)
		}
	}
}

/// Maps keys to their last index in `children[start..end]`.
fn key_to_old_index<N>(children: &[Option<VNode<N>>], start: usize, end: usize) -> HashMap<Key, usize> {
	let mut map = HashMap::new();
	for (i, child) in children.iter().enumerate().take(end).skip(start) {
		if let Some(key) = child.as_ref().and_then(VNode::key) {
			if map.insert(key.clone(), i).is_some() && cfg!(debug_assertions) {
				warn!("Duplicate key {:?} among sibling nodes. The last one wins, which may reuse the wrong live node.", key)
			}
		}
	}
	map
}

fn text_span(what: &'static str, text: &str) -> tracing::Span {
	if cfg!(feature = "dangerous-logging") {
		trace_span!("text", what, text)
	} else {
		trace_span!("text", what, text.len = text.len())
	}
}
