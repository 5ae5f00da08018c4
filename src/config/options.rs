use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Presence of a single option.
///
/// `Unset` means the field was absent and the value is inherited from a lower-priority
/// source. `Cleared` is an explicit `null`: it still counts as present, so it overrides
/// lower layers.
#[derive(Debug, Clone, PartialEq)]
pub enum Setting<T> {
	Unset,
	Cleared,
	Value(T),
}

impl<T> Default for Setting<T> {
	fn default() -> Self {
		Setting::Unset
	}
}

impl<T> Setting<T> {
	pub fn is_unset(&self) -> bool {
		matches!(self, Setting::Unset)
	}

	pub fn is_present(&self) -> bool {
		!self.is_unset()
	}

	/// The carried value, if any.
	pub fn value(&self) -> Option<&T> {
		match self {
			Setting::Value(value) => Some(value),
			_ => None,
		}
	}
}

impl<T: Clone> Setting<T> {
	/// Replace `self` with `upper` when `upper` is present.
	pub fn overlay(&mut self, upper: &Setting<T>) {
		if upper.is_present() {
			*self = upper.clone();
		}
	}

	/// Fill `self` from `lower` when `self` is unset.
	pub fn underlay(&mut self, lower: &Setting<T>) {
		if self.is_unset() {
			*self = lower.clone();
		}
	}
}

// Missing fields never reach this impl; they take `Default` through `#[serde(default)]`.
impl<'de, T: Deserialize<'de>> Deserialize<'de> for Setting<T> {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		Ok(match Option::<T>::deserialize(deserializer)? {
			Some(value) => Setting::Value(value),
			None => Setting::Cleared,
		})
	}
}

impl<T: Serialize> Serialize for Setting<T> {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		match self {
			Setting::Value(value) => serializer.serialize_some(value),
			_ => serializer.serialize_none(),
		}
	}
}

/// Declares a record of [`Setting`] fields sharing the presence-based override policy,
/// together with the field-by-field `overlay`/`underlay` operations.
macro_rules! options_record {
	(
		$(#[$meta:meta])*
		pub struct $name:ident {
			$(
				$(#[$field_meta:meta])*
				$field:ident: $ty:ty,
			)*
		}
	) => {
		$(#[$meta])*
		#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
		pub struct $name {
			$(
				$(#[$field_meta])*
				#[serde(default, skip_serializing_if = "Setting::is_unset")]
				pub $field: Setting<$ty>,
			)*
		}

		impl $name {
			/// Apply every field present on `upper` over `self`.
			pub fn overlay(&mut self, upper: &Self) {
				$(self.$field.overlay(&upper.$field);)*
			}

			/// Fill every field unset on `self` from `lower`.
			pub fn underlay(&mut self, lower: &Self) {
				$(self.$field.underlay(&lower.$field);)*
			}

			/// Number of fields that are present.
			pub fn present_count(&self) -> usize {
				[$(self.$field.is_present()),*].iter().filter(|present| **present).count()
			}
		}
	};
}

/// How the sidebar is displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SidebarMode {
	Hidden,
	Narrow,
	Extended,
}

/// Which property of a sidebar element an order entry's `item` is matched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ItemMatch {
	Text,
	DataPanel,
	Href,
}

/// Link target for an item's `href`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LinkTarget {
	#[serde(rename = "_self")]
	SelfWindow,
	#[serde(rename = "_blank")]
	Blank,
}

/// Opacity given either as a number or as raw CSS text (e.g. a `var(...)` expression).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Opacity {
	Number(f64),
	Text(String),
}

options_record! {
	/// Per-item styling. At document level these act as defaults for every order entry.
	pub struct ItemStyle {
		icon_color: String,
		icon_color_selected: String,
		icon_color_hover: String,
		text_color: String,
		text_color_selected: String,
		text_color_hover: String,
		selection_background: String,
		selection_background_hover: String,
		selection_opacity: Opacity,
		selection_opacity_hover: Opacity,
		info_color: String,
		info_color_selected: String,
		info_color_hover: String,
		notification_color: String,
		notification_color_selected: String,
		notification_color_hover: String,
	}
}

options_record! {
	/// Options that only make sense for the sidebar as a whole.
	pub struct SidebarOptions {
		title: String,
		subtitle: String,
		sidebar_mode: SidebarMode,
		sidebar_editable: bool,
		/// Default `hide` for every entry that does not set its own.
		hide_all: bool,
		default_path: String,
		styles: String,
		sidebar_background: String,
		sidebar_border_color: String,
		sidebar_button_color: String,
		title_color: String,
		subtitle_color: String,
		menu_background: String,
		divider_color: String,
		divider_top_color: String,
		divider_bottom_color: String,
		scrollbar_thumb_color: String,
		item_background: String,
		item_background_hover_opacity: Opacity,
	}
}

options_record! {
	/// Fields specific to one order entry, excluding its `item` key.
	pub struct EntryFields {
		#[serde(rename = "match")]
		match_kind: ItemMatch,
		exact: bool,
		/// Label shown for the item.
		name: String,
		icon: String,
		info: String,
		href: String,
		target: LinkTarget,
		/// Rank; entries without one sort after every ranked entry.
		order: f64,
		/// Pins the entry after every non-bottom entry.
		bottom: bool,
		hide: bool,
		/// Synthetic entry, exempt from `hide_all`.
		new_item: bool,
	}
}

/// Every document-level option that exceptions and extendable configs may override.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Options {
	#[serde(flatten)]
	pub sidebar: SidebarOptions,

	#[serde(flatten)]
	pub item_style: ItemStyle,
}

impl Options {
	pub fn overlay(&mut self, upper: &Options) {
		self.sidebar.overlay(&upper.sidebar);
		self.item_style.overlay(&upper.item_style);
	}

	/// Number of options that are present, across both groups.
	pub fn present_count(&self) -> usize {
		self.sidebar.present_count() + self.item_style.present_count()
	}
}
