use crate::config::types::{Document, EffectiveConfig, Exception, Fragment};
use crate::error::Result;
use crate::resolve::matcher::{Viewer, matching_exceptions};
use crate::resolve::merge::merge_into;
use crate::resolve::order::flatten_order;
use crate::resolve::reference::{ReferenceContext, extend};
use tracing::debug;

/// Resolve a document into the effective configuration for one viewer.
///
/// With no matching exception the document's own fields apply, on top of its
/// `extend_from` imports. Otherwise the matching exceptions are folded in declaration
/// order (later wins) and the document's own fields only apply through an explicit
/// `base` import. Template variables and partials always come from the document.
pub fn flatten_config(document: &Document, viewer: &Viewer) -> Result<EffectiveConfig> {
	let ctx = ReferenceContext::for_document(document);
	let exceptions = matching_exceptions(&document.exceptions, viewer);

	let resolved = if exceptions.is_empty() {
		debug!(viewer = %viewer.name, "no exception matched, using base configuration");
		base_fragment(document, &ctx)?
	} else {
		debug!(viewer = %viewer.name, matched = exceptions.len(), "applying exceptions");
		fold_exceptions(document, &exceptions, &ctx)?
	};

	Ok(finish(document, resolved))
}

/// The document's own fields over its imports.
fn base_fragment(document: &Document, ctx: &ReferenceContext) -> Result<Fragment> {
	extend(document.extend_from.as_ref(), &document.fragment, ctx)
}

fn fold_exceptions(
	document: &Document,
	exceptions: &[&Exception],
	ctx: &ReferenceContext,
) -> Result<Fragment> {
	let base_order = if exceptions.iter().any(|exception| exception.base_order) {
		Some(base_fragment(document, ctx)?.order)
	} else {
		None
	};

	let mut accumulated = Fragment::default();
	for exception in exceptions {
		let mut fragment = extend(exception.extend_from.as_ref(), &exception.fragment, ctx)?;

		if exception.base_order
			&& let Some(ref base_order) = base_order
		{
			let own_order = std::mem::take(&mut fragment.order);
			fragment.order = base_order.iter().cloned().chain(own_order).collect();
		}

		merge_into(&mut accumulated, &fragment);
	}

	Ok(accumulated)
}

fn finish(document: &Document, resolved: Fragment) -> EffectiveConfig {
	let order = flatten_order(&resolved.order, &resolved.options);

	EffectiveConfig {
		id: document.id.clone(),
		options: resolved.options,
		order,
		js_variables: document.js_variables.clone(),
		jinja_variables: document.jinja_variables.clone(),
		partials: document.partials.clone(),
	}
}
