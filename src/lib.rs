//! sidebar-resolve - resolve sidebar customization documents per viewer.
//!
//! This library provides:
//! - Document parsing (TOML, YAML, JSON) with presence-aware options
//! - Exception matching against the viewer's identity
//! - `extend_from` resolution with cycle detection
//! - Fragment merging and deterministic item ordering
//!
//! # Example
//!
//! ```no_run
//! use sidebar_resolve::config::parse_document_file;
//! use sidebar_resolve::resolve::{Viewer, flatten_config};
//! use std::path::Path;
//!
//! let document = parse_document_file(Path::new("sidebar-config.yaml")).unwrap();
//! let viewer = Viewer {
//!     name: "alice".to_string(),
//!     is_admin: true,
//!     ..Default::default()
//! };
//!
//! let config = flatten_config(&document, &viewer).unwrap();
//! for entry in &config.order {
//!     println!("{:?}", entry.item);
//! }
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod resolve;

pub use error::{ResolveError, Result};
