//! Document model and loading for sidebar-resolve.
//!
//! This module handles:
//! - The typed document schema (options, order entries, exceptions, extendable configs)
//! - Presence-aware option fields and their override tables
//! - TOML, YAML and JSON parsing

pub mod options;
pub mod parser;
pub mod types;

pub use options::{ItemStyle, Options, Setting, SidebarOptions};
pub use parser::{DocumentFormat, parse_document_file, parse_document_str};
pub use types::{
	BASE_REFERENCE, Document, EffectiveConfig, Exception, ExtendFrom, ExtendableConfig, Fragment,
	MatchersConditions, OrderEntry,
};
