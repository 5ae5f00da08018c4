use crate::config::types::{BASE_REFERENCE, Document, ExtendFrom, ExtendableConfig, Fragment};
use crate::error::{ResolveError, Result};
use crate::resolve::merge::merge_into;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// What `extend_from` names resolve against.
#[derive(Debug, Clone, Copy)]
pub struct ReferenceContext<'a> {
	/// The document's own direct fields, used for [`BASE_REFERENCE`].
	pub base: &'a Fragment,

	/// Named fragments available for import.
	pub extendable_configs: &'a BTreeMap<String, ExtendableConfig>,
}

impl<'a> ReferenceContext<'a> {
	pub fn for_document(document: &'a Document) -> Self {
		ReferenceContext {
			base: &document.fragment,
			extendable_configs: &document.extendable_configs,
		}
	}
}

/// Resolve a reference chain into one fragment.
///
/// Names are imported in list order, later names overriding earlier ones.
/// Unknown names contribute nothing.
pub fn resolve_references(names: &ExtendFrom, ctx: &ReferenceContext) -> Result<Fragment> {
	let mut chain = Vec::new();
	resolve_chain(names, ctx, &mut chain)
}

/// Import `extend_from` (if any) and apply `own` over the result.
pub fn extend(extend_from: Option<&ExtendFrom>, own: &Fragment, ctx: &ReferenceContext) -> Result<Fragment> {
	let mut chain = Vec::new();
	extend_with_chain(extend_from, own, ctx, &mut chain)
}

/// Expand every reference chain in the document, reporting the first cycle found.
pub fn check_references(document: &Document) -> Result<()> {
	let ctx = ReferenceContext::for_document(document);

	for name in document.extendable_configs.keys() {
		let mut chain = Vec::new();
		resolve_name(name, &ctx, &mut chain)?;
	}

	if let Some(ref extend_from) = document.extend_from {
		resolve_references(extend_from, &ctx)?;
	}

	for exception in &document.exceptions {
		if let Some(ref extend_from) = exception.extend_from {
			resolve_references(extend_from, &ctx)?;
		}
	}

	Ok(())
}

fn extend_with_chain(
	extend_from: Option<&ExtendFrom>,
	own: &Fragment,
	ctx: &ReferenceContext,
	chain: &mut Vec<String>,
) -> Result<Fragment> {
	let mut merged = match extend_from {
		Some(names) => resolve_chain(names, ctx, chain)?,
		None => Fragment::default(),
	};
	merge_into(&mut merged, own);
	Ok(merged)
}

fn resolve_chain(names: &ExtendFrom, ctx: &ReferenceContext, chain: &mut Vec<String>) -> Result<Fragment> {
	let mut merged = Fragment::default();
	for name in names.names() {
		let fragment = resolve_name(name, ctx, chain)?;
		merge_into(&mut merged, &fragment);
	}
	Ok(merged)
}

fn resolve_name(name: &str, ctx: &ReferenceContext, chain: &mut Vec<String>) -> Result<Fragment> {
	if name == BASE_REFERENCE {
		return Ok(ctx.base.clone());
	}

	if chain.iter().any(|seen| seen == name) {
		let mut cycle = chain.clone();
		cycle.push(name.to_string());
		return Err(ResolveError::CircularReference { chain: cycle });
	}

	let Some(config) = ctx.extendable_configs.get(name) else {
		warn!(name, "extend_from references an unknown extendable config");
		return Ok(Fragment::default());
	};

	debug!(name, depth = chain.len(), "resolving extendable config");
	chain.push(name.to_string());
	let resolved = extend_with_chain(config.extend_from.as_ref(), &config.fragment, ctx, chain);
	chain.pop();
	resolved
}
