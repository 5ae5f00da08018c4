use crate::config::options::{Options, Setting};
use crate::config::types::OrderEntry;
use std::cmp::Ordering;
use std::collections::HashMap;
use tracing::warn;

/// Order entries keyed by `item`, iterated in first-seen order.
///
/// Inserting a key that is already present overlays the new entry onto the stored one
/// without moving it.
#[derive(Debug, Default)]
pub struct OrderedEntries {
	entries: Vec<OrderEntry>,
	index: HashMap<String, usize>,
}

impl OrderedEntries {
	pub fn new() -> Self {
		Self::default()
	}

	/// Insert an entry or merge it into the stored entry with the same key.
	///
	/// The stored entry carries the trimmed key as its `item`. Returns `false` (and
	/// stores nothing) when the entry has no usable key.
	pub fn upsert(&mut self, entry: &OrderEntry) -> bool {
		let Some(key) = entry.key() else {
			return false;
		};

		match self.index.get(key) {
			Some(&position) => self.entries[position].overlay(entry),
			None => {
				let mut stored = entry.clone();
				stored.item = Some(key.to_string());
				self.index.insert(key.to_string(), self.entries.len());
				self.entries.push(stored);
			}
		}
		true
	}

	pub fn into_vec(self) -> Vec<OrderEntry> {
		self.entries
	}
}

/// Deduplicate, apply top-level defaults to, and sort a list of order entries.
pub fn flatten_order(entries: &[OrderEntry], options: &Options) -> Vec<OrderEntry> {
	let mut grouped = OrderedEntries::new();
	for (position, entry) in entries.iter().enumerate() {
		if !grouped.upsert(entry) {
			warn!(position, "skipping order entry without an item key");
		}
	}

	let mut flattened = grouped.into_vec();
	for entry in &mut flattened {
		apply_defaults(entry, options);
	}

	// `sort_by` is stable: ties keep first-seen order
	flattened.sort_by(compare_entries);
	flattened
}

/// Fill an entry's unset fields from the top-level options.
fn apply_defaults(entry: &mut OrderEntry, options: &Options) {
	entry.style.underlay(&options.item_style);

	if entry.fields.hide.is_unset()
		&& !entry.is_new_item()
		&& let Setting::Value(hide_all) = options.sidebar.hide_all
	{
		entry.fields.hide = Setting::Value(hide_all);
	}
}

/// Non-bottom before bottom, ranked before unranked, then ascending rank.
fn compare_entries(a: &OrderEntry, b: &OrderEntry) -> Ordering {
	a.is_bottom()
		.cmp(&b.is_bottom())
		.then_with(|| match (a.rank(), b.rank()) {
			(Some(a), Some(b)) => a.total_cmp(&b),
			(Some(_), None) => Ordering::Less,
			(None, Some(_)) => Ordering::Greater,
			(None, None) => Ordering::Equal,
		})
}
