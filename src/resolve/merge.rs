//! Fragment merging.
//!
//! Policy, per field:
//! - Options: the later fragment's value wins when present; unset never overwrites
//! - `order`: concatenation, duplicates are left for the order flattener

use crate::config::types::Fragment;

/// Merge fragments given in ascending priority (last wins).
pub fn merge(fragments: &[Fragment]) -> Fragment {
	fragments.iter().fold(Fragment::default(), |mut merged, fragment| {
		merge_into(&mut merged, fragment);
		merged
	})
}

/// Apply `upper` over an accumulator in place.
pub(crate) fn merge_into(merged: &mut Fragment, upper: &Fragment) {
	merged.options.overlay(&upper.options);
	merged.order.extend(upper.order.iter().cloned());
}
