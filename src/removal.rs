//! Reference-counted deferred removal.
//!
//! Removing a node hands one [`RemovalHandle`] to each module `remove` callable and to the node's own `remove` hook.
//! All of them share a single gate whose count starts at *(module `remove` callables) + 1*.
//! The live node is detached exactly once, when that count reaches zero.

use core::{
	cell::{Cell, RefCell},
	fmt::{self, Debug, Formatter},
};
use num_traits::{CheckedSub, One, Zero};
use std::rc::Rc;
use tracing::trace;

/// A one-shot countdown. `detach` runs when `remaining` reaches zero.
struct Gate<C> {
	remaining: Cell<C>,
	detach: RefCell<Option<Box<dyn FnOnce()>>>,
}
impl<C: Copy + CheckedSub + One + Zero> Gate<C> {
	fn count_down(&self) {
		let remaining = match self.remaining.get().checked_sub(&C::one()) {
			Some(remaining) => remaining,
			None => return trace!("Removal already completed; Ignoring surplus `done()`."),
		};
		self.remaining.set(remaining);
		if remaining.is_zero() {
			// Taken before calling so that re-entrant `done()` calls can't detach twice.
			let detach = self.detach.borrow_mut().take();
			if let Some(detach) = detach {
				trace!("Last removal listener finished. Detaching.");
				detach()
			}
		}
	}
}

/// A shared completion callback for one pending removal.
///
/// Dropping a handle without calling [`done`](`RemovalHandle::done`) leaves the node attached.
#[derive(Clone)]
pub struct RemovalHandle(Rc<Gate<usize>>);
impl RemovalHandle {
	pub(crate) fn new(listeners: usize, detach: impl 'static + FnOnce()) -> Self {
		Self(Rc::new(Gate {
			remaining: Cell::new(listeners),
			detach: RefCell::new(Some(Box::new(detach))),
		}))
	}

	/// Signals that one listener is finished with the node.
	///
	/// Calls beyond the initial count are ignored.
	pub fn done(&self) {
		self.0.count_down()
	}

	#[must_use]
	pub fn remaining(&self) -> usize {
		self.0.remaining.get()
	}

	#[must_use]
	pub fn is_detached(&self) -> bool {
		self.0.remaining.get() == 0
	}
}
impl Debug for RemovalHandle {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("RemovalHandle").field("remaining", &self.remaining()).finish()
	}
}
