//! Extension modules and their per-phase dispatch tables.

use crate::{api::HostApi, removal::RemovalHandle, vnode::VNode};
use core::fmt::{self, Debug, Formatter};
use std::rc::Rc;

pub type GlobalCallback<A> = Rc<dyn Fn(&A)>;
pub type NodeCallback<A> = Rc<dyn Fn(&A, &VNode<<A as HostApi>::Node>)>;
pub type PatchCallback<A> = Rc<dyn Fn(&A, &VNode<<A as HostApi>::Node>, &VNode<<A as HostApi>::Node>)>;
pub type RemoveCallback<A> = Rc<dyn Fn(&A, &VNode<<A as HostApi>::Node>, RemovalHandle)>;

/// A cross-cutting extension that observes every node.
///
/// Each phase is optional. Unlike per-node [`Hooks`](`crate::Hooks`), module callables also receive the host API.
///
/// ```
/// use graft_dom::{memory::MemoryDom, Module};
///
/// let module = Module::<MemoryDom>::new("counter")
/// 	.on_create(|_api, _empty, vnode| println!("created {:?}", vnode.sel()))
/// 	.on_destroy(|_api, vnode| println!("destroyed {:?}", vnode.sel()));
/// assert_eq!(module.name(), "counter");
/// ```
pub struct Module<A: HostApi> {
	name: &'static str,
	pre: Option<GlobalCallback<A>>,
	create: Option<PatchCallback<A>>,
	update: Option<PatchCallback<A>>,
	destroy: Option<NodeCallback<A>>,
	remove: Option<RemoveCallback<A>>,
	post: Option<GlobalCallback<A>>,
}
impl<A: HostApi> Debug for Module<A> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("Module").field("name", &self.name).finish()
	}
}
impl<A: HostApi> Module<A> {
	#[must_use]
	pub fn new(name: &'static str) -> Self {
		Self {
			name,
			pre: None,
			create: None,
			update: None,
			destroy: None,
			remove: None,
			post: None,
		}
	}

	#[must_use]
	pub fn name(&self) -> &'static str {
		self.name
	}

	#[must_use]
	pub fn on_pre(mut self, callback: impl 'static + Fn(&A)) -> Self {
		self.pre = Some(Rc::new(callback));
		self
	}

	/// `callback` receives the shared empty placeholder as old node.
	#[must_use]
	pub fn on_create(mut self, callback: impl 'static + Fn(&A, &VNode<A::Node>, &VNode<A::Node>)) -> Self {
		self.create = Some(Rc::new(callback));
		self
	}

	#[must_use]
	pub fn on_update(mut self, callback: impl 'static + Fn(&A, &VNode<A::Node>, &VNode<A::Node>)) -> Self {
		self.update = Some(Rc::new(callback));
		self
	}

	#[must_use]
	pub fn on_destroy(mut self, callback: impl 'static + Fn(&A, &VNode<A::Node>)) -> Self {
		self.destroy = Some(Rc::new(callback));
		self
	}

	/// `callback` must eventually call [`RemovalHandle::done`], or the node is never detached.
	#[must_use]
	pub fn on_remove(mut self, callback: impl 'static + Fn(&A, &VNode<A::Node>, RemovalHandle)) -> Self {
		self.remove = Some(Rc::new(callback));
		self
	}

	#[must_use]
	pub fn on_post(mut self, callback: impl 'static + Fn(&A)) -> Self {
		self.post = Some(Rc::new(callback));
		self
	}
}

/// Module callables flattened per phase, in module order.
pub(crate) struct Callbacks<A: HostApi> {
	pub pre: Vec<GlobalCallback<A>>,
	pub create: Vec<PatchCallback<A>>,
	pub update: Vec<PatchCallback<A>>,
	pub destroy: Vec<NodeCallback<A>>,
	pub remove: Vec<RemoveCallback<A>>,
	pub post: Vec<GlobalCallback<A>>,
}
impl<A: HostApi> Callbacks<A> {
	pub fn new(modules: impl IntoIterator<Item = Module<A>>) -> Self {
		let mut callbacks = Self {
			pre: Vec::new(),
			create: Vec::new(),
			update: Vec::new(),
			destroy: Vec::new(),
			remove: Vec::new(),
			post: Vec::new(),
		};
		for Module {
			name: _,
			pre,
			create,
			update,
			destroy,
			remove,
			post,
		} in modules
		{
			callbacks.pre.extend(pre);
			callbacks.create.extend(create);
			callbacks.update.extend(update);
			callbacks.destroy.extend(destroy);
			callbacks.remove.extend(remove);
			callbacks.post.extend(post);
		}
		callbacks
	}
}
impl<A: HostApi> Debug for Callbacks<A> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("Callbacks")
			.field("pre.len()", &self.pre.len())
			.field("create.len()", &self.create.len())
			.field("update.len()", &self.update.len())
			.field("destroy.len()", &self.destroy.len())
			.field("remove.len()", &self.remove.len())
			.field("post.len()", &self.post.len())
			.finish()
	}
}
