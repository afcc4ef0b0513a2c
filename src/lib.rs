//! A keyed virtual DOM patcher.
//!
//! [`Patcher::patch`] reconciles a new [`VNode`] tree against the previous one (or a live node never managed before)
//! and applies the required mutations to the live tree through a [`HostApi`], reusing live nodes wherever it can.
//!
//! Per-node [`Hooks`] and global [`Module`]s observe the lifecycle of each node.

#![doc(html_root_url = "https://docs.rs/graft-dom/0.0.1")]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

#[cfg(doctest)]
pub mod readme {
	doc_comment::doctest!("../README.md");
}

pub mod api;
pub mod attributes;
pub mod load;
pub mod memory;
pub mod module;
mod patch;
pub mod removal;
pub mod vnode;
pub mod web;

pub use crate::{
	api::{HostApi, NodeKind},
	load::to_vnode,
	module::Module,
	patch::{Options, Patcher, Root},
	removal::RemovalHandle,
	vnode::{same_vnode, Hooks, Key, VNode, VNodeData},
};
