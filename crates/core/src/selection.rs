//! Configuration selection store.
//!
//! Two independent multi-select sets (data sources and channels). Changing a
//! selection has no network effect on its own; the connection reads the
//! current snapshot when it opens or when a prompt is submitted.

use serde::Serialize;

/// Ordered set of ids from a closed enumeration, in first-selected order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SelectionSet<T> {
	items: Vec<T>,
}

impl<T> Default for SelectionSet<T> {
	fn default() -> Self {
		Self { items: Vec::new() }
	}
}

impl<T: Copy + PartialEq> SelectionSet<T> {
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns the set with `id` removed if present, else appended.
	#[must_use]
	pub fn toggle(&self, id: T) -> Self {
		let items = if self.contains(id) {
			self.items.iter().copied().filter(|item| *item != id).collect()
		} else {
			let mut items = self.items.clone();
			items.push(id);
			items
		};
		Self { items }
	}

	pub fn contains(&self, id: T) -> bool {
		self.items.contains(&id)
	}

	pub fn len(&self) -> usize {
		self.items.len()
	}

	pub fn is_empty(&self) -> bool {
		self.items.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = T> + '_ {
		self.items.iter().copied()
	}

	pub fn as_slice(&self) -> &[T] {
		&self.items
	}

	pub fn to_vec(&self) -> Vec<T> {
		self.items.clone()
	}
}

impl<T: Copy + PartialEq> FromIterator<T> for SelectionSet<T> {
	/// Builds a set, keeping the first occurrence of each id.
	fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
		let mut items = Vec::new();
		for id in iter {
			if !items.contains(&id) {
				items.push(id);
			}
		}
		Self { items }
	}
}
