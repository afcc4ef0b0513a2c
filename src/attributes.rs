//! A [`Module`] that keeps element attributes in sync with the [`Attributes`] data section.

use crate::{
	api::{Attribute, HostApi},
	module::Module,
	vnode::VNode,
};
use tracing::{instrument, warn};

/// Data section listing an element's attributes, in order.
///
/// `id` and `class` belong into the selector instead.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes(pub Vec<Attribute>);
impl Attributes {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	#[must_use]
	pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.0.push(Attribute::new(name, value));
		self
	}
}

/// Creates the attributes module.
#[must_use]
pub fn module<A: HostApi>() -> Module<A> {
	Module::new("attributes").on_create(update_attributes::<A>).on_update(update_attributes::<A>)
}

fn attributes_of<N>(vnode: &VNode<N>) -> Vec<Attribute> {
	vnode
		.data()
		.and_then(|data| data.extensions.get::<Attributes>().map(|attributes| attributes.0.clone()))
		.unwrap_or_default()
}

#[instrument(skip(api, old, vnode))]
fn update_attributes<A: HostApi>(api: &A, old: &VNode<A::Node>, vnode: &VNode<A::Node>) {
	let elm = match vnode.elm() {
		Some(elm) => elm,
		None => return warn!("Unbound node; Not updating attributes."),
	};

	let (a_1, a_2) = (attributes_of(old), attributes_of(vnode));
	let (mut a_1, mut a_2) = (a_1.as_slice(), a_2.as_slice());

	while !a_1.is_empty() && a_1.first() == a_2.first() {
		a_1 = &a_1[1..];
		a_2 = &a_2[1..];
	}
	while !a_1.is_empty() && a_1.last() == a_2.last() {
		a_1 = &a_1[..a_1.len() - 1];
		a_2 = &a_2[..a_2.len() - 1];
	}

	// Names that persist are overwritten below instead.
	for removed in a_1 {
		if !a_2.iter().any(|added| added.name == removed.name) {
			api.remove_attribute(&elm, &removed.name)
		}
	}
	for Attribute { name, value } in a_2 {
		if api.get_attribute(&elm, name).as_ref() != Some(value) {
			api.set_attribute(&elm, name, value)
		}
	}
}
