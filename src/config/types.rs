use crate::config::options::{EntryFields, ItemStyle, Options, Setting};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::warn;

/// Reserved `extend_from` name referring to the document's own direct fields.
pub const BASE_REFERENCE: &str = "base";

/// Variables exposed to templates, keyed by name.
pub type VariableMap = BTreeMap<String, Value>;

/// Named template snippets, keyed by name.
pub type PartialMap = BTreeMap<String, String>;

/// Top-level sidebar customization document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Document {
	/// Informational identifier, carried through to the effective configuration.
	#[serde(default)]
	pub id: Option<String>,

	/// The document's own options and order entries.
	#[serde(flatten)]
	pub fragment: Fragment,

	#[serde(default)]
	pub js_variables: Setting<VariableMap>,

	#[serde(default)]
	pub jinja_variables: Setting<VariableMap>,

	#[serde(default)]
	pub partials: Setting<PartialMap>,

	/// Extendable configs whose fields are imported below the document's own.
	#[serde(default, deserialize_with = "lenient_extend_from")]
	pub extend_from: Option<ExtendFrom>,

	/// Named fragments usable only as `extend_from` targets.
	#[serde(default, deserialize_with = "lenient_extendable_configs")]
	pub extendable_configs: BTreeMap<String, ExtendableConfig>,

	/// Conditional overrides, in declaration order.
	#[serde(default, deserialize_with = "lenient_exceptions")]
	pub exceptions: Vec<Exception>,
}

/// The mergeable part of a document: options plus order entries.
///
/// Identity and structural fields (`id`, `exceptions`, `extendable_configs`,
/// `extend_from`, predicates) have no slot here, so projecting onto a fragment strips them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Fragment {
	#[serde(flatten)]
	pub options: Options,

	#[serde(default, deserialize_with = "lenient_order")]
	pub order: Vec<OrderEntry>,
}

/// A named entry of `extendable_configs`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExtendableConfig {
	#[serde(default, deserialize_with = "lenient_extend_from")]
	pub extend_from: Option<ExtendFrom>,

	#[serde(flatten)]
	pub fragment: Fragment,
}

/// A conditional override layered over the base document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Exception {
	#[serde(flatten)]
	pub matchers: Matchers,

	#[serde(default)]
	pub matchers_conditions: MatchersConditions,

	/// Append this exception's order to the document's base order instead of replacing it.
	#[serde(default)]
	pub base_order: bool,

	#[serde(default, deserialize_with = "lenient_extend_from")]
	pub extend_from: Option<ExtendFrom>,

	#[serde(flatten)]
	pub fragment: Fragment,
}

/// Viewer predicates of an exception.
///
/// Values are kept loosely typed: a value of the wrong shape makes its predicate fail
/// instead of failing the whole document.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Matchers {
	#[serde(default)]
	pub user: Option<Value>,

	#[serde(default)]
	pub not_user: Option<Value>,

	#[serde(default)]
	pub device: Option<Value>,

	#[serde(default)]
	pub not_device: Option<Value>,

	#[serde(default)]
	pub is_admin: Option<Value>,

	#[serde(default)]
	pub is_owner: Option<Value>,
}

/// How an exception's defined predicates are combined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchersConditions {
	#[default]
	#[serde(rename = "OR", alias = "or")]
	Or,
	#[serde(rename = "AND", alias = "and")]
	And,
}

/// One name or a list of names to import from `extendable_configs`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExtendFrom {
	One(String),
	Many(Vec<String>),
}

impl ExtendFrom {
	/// Referenced names, in import order.
	pub fn names(&self) -> Vec<&str> {
		match self {
			ExtendFrom::One(name) => vec![name.as_str()],
			ExtendFrom::Many(names) => names.iter().map(String::as_str).collect(),
		}
	}
}

impl From<&str> for ExtendFrom {
	fn from(name: &str) -> Self {
		ExtendFrom::One(name.to_string())
	}
}

/// Override for one sidebar item, keyed by `item`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderEntry {
	/// Identity key. Entries without one are skipped during flattening.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub item: Option<String>,

	#[serde(flatten)]
	pub fields: EntryFields,

	#[serde(flatten)]
	pub style: ItemStyle,
}

impl OrderEntry {
	/// Create an entry carrying only its `item` key.
	pub fn new(item: impl Into<String>) -> Self {
		OrderEntry {
			item: Some(item.into()),
			..Default::default()
		}
	}

	/// The identity key, if usable.
	pub fn key(&self) -> Option<&str> {
		self.item
			.as_deref()
			.map(str::trim)
			.filter(|item| !item.is_empty())
	}

	/// Apply every field present on `upper` over `self`. The `item` key is left alone.
	pub fn overlay(&mut self, upper: &OrderEntry) {
		self.fields.overlay(&upper.fields);
		self.style.overlay(&upper.style);
	}

	/// Explicit numeric rank.
	pub fn rank(&self) -> Option<f64> {
		self.fields.order.value().copied()
	}

	pub fn is_bottom(&self) -> bool {
		self.fields.bottom.value().copied().unwrap_or(false)
	}

	pub fn is_new_item(&self) -> bool {
		self.fields.new_item.value().copied().unwrap_or(false)
	}
}

/// The resolved configuration for one viewer.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EffectiveConfig {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub id: Option<String>,

	#[serde(flatten)]
	pub options: Options,

	/// Deduplicated and sorted entries.
	pub order: Vec<OrderEntry>,

	#[serde(skip_serializing_if = "Setting::is_unset")]
	pub js_variables: Setting<VariableMap>,

	#[serde(skip_serializing_if = "Setting::is_unset")]
	pub jinja_variables: Setting<VariableMap>,

	#[serde(skip_serializing_if = "Setting::is_unset")]
	pub partials: Setting<PartialMap>,
}

// A malformed order entry, exception or extendable config is dropped with a warning so
// the rest of the document still loads. Each element is buffered as a `Value` and
// deserialized on its own.

fn lenient_order<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<OrderEntry>, D::Error> {
	Ok(lenient_list(Value::deserialize(deserializer)?, "order"))
}

fn lenient_exceptions<'de, D: Deserializer<'de>>(
	deserializer: D,
) -> Result<Vec<Exception>, D::Error> {
	Ok(lenient_list(Value::deserialize(deserializer)?, "exceptions"))
}

fn lenient_extendable_configs<'de, D: Deserializer<'de>>(
	deserializer: D,
) -> Result<BTreeMap<String, ExtendableConfig>, D::Error> {
	let configs = match Value::deserialize(deserializer)? {
		Value::Object(configs) => configs,
		Value::Null => return Ok(BTreeMap::new()),
		other => {
			warn!(value = %other, "extendable_configs is not a mapping, ignoring it");
			return Ok(BTreeMap::new());
		}
	};

	Ok(configs
		.into_iter()
		.filter_map(|(name, config)| match serde_json::from_value(config) {
			Ok(config) => Some((name, config)),
			Err(e) => {
				warn!(%name, error = %e, "skipping malformed extendable config");
				None
			}
		})
		.collect())
}

fn lenient_extend_from<'de, D: Deserializer<'de>>(
	deserializer: D,
) -> Result<Option<ExtendFrom>, D::Error> {
	let value = Value::deserialize(deserializer)?;
	if value.is_null() {
		return Ok(None);
	}
	match serde_json::from_value(value.clone()) {
		Ok(extend_from) => Ok(Some(extend_from)),
		Err(_) => {
			warn!(%value, "extend_from must be a name or a list of names, ignoring it");
			Ok(None)
		}
	}
}

fn lenient_list<T: DeserializeOwned>(value: Value, field: &'static str) -> Vec<T> {
	let elements = match value {
		Value::Array(elements) => elements,
		Value::Null => return Vec::new(),
		other => {
			warn!(field, value = %other, "expected a list, ignoring it");
			return Vec::new();
		}
	};

	elements
		.into_iter()
		.enumerate()
		.filter_map(|(position, element)| match serde_json::from_value(element) {
			Ok(element) => Some(element),
			Err(e) => {
				warn!(field, position, error = %e, "skipping malformed element");
				None
			}
		})
		.collect()
}

impl Document {
	/// Check that every `extend_from` chain in the document is free of cycles.
	pub fn validate(&self) -> Result<(), crate::error::ResolveError> {
		crate::resolve::check_references(self)
	}
}
