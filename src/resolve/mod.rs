//! Configuration resolution for sidebar-resolve.
//!
//! This module handles:
//! - Matching exceptions against the viewer
//! - Expanding `extend_from` reference chains
//! - Merging fragments and flattening the item order
//! - Producing the effective configuration for one viewer

pub mod flatten;
pub mod matcher;
pub mod merge;
pub mod order;
pub mod reference;

pub use flatten::flatten_config;
pub use matcher::{Viewer, matches, matching_exceptions};
pub use merge::merge;
pub use order::{OrderedEntries, flatten_order};
pub use reference::{ReferenceContext, check_references, extend, resolve_references};
