use crate::config::types::{Exception, Matchers, MatchersConditions};
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;
use tracing::debug;

static LIST_SEPARATOR: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"\s*,\s*").expect("separator pattern is valid"));

/// Identity of the viewer a document is resolved for.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Viewer {
	/// Display name of the user.
	pub name: String,

	pub is_admin: bool,

	pub is_owner: bool,

	/// User agent string of the viewer's client.
	pub user_agent: String,
}

impl Viewer {
	pub fn new(name: impl Into<String>) -> Self {
		Viewer {
			name: name.into(),
			..Default::default()
		}
	}
}

/// Check if an exception applies to the given viewer.
pub fn matches(exception: &Exception, viewer: &Viewer) -> bool {
	let results = evaluate_matchers(&exception.matchers, viewer);

	// Nothing to match against: the exception targets nobody
	if results.is_empty() {
		return false;
	}

	match exception.matchers_conditions {
		MatchersConditions::Or => results.iter().any(|matched| *matched),
		MatchersConditions::And => results.iter().all(|matched| *matched),
	}
}

/// Select the exceptions that apply to the viewer, keeping declaration order.
pub fn matching_exceptions<'a>(exceptions: &'a [Exception], viewer: &Viewer) -> Vec<&'a Exception> {
	exceptions
		.iter()
		.enumerate()
		.filter(|(index, exception)| {
			let matched = matches(exception, viewer);
			debug!(index = *index, matched, viewer = %viewer.name, "evaluated exception");
			matched
		})
		.map(|(_, exception)| exception)
		.collect()
}

/// Evaluate every defined predicate. Undefined predicates are skipped.
fn evaluate_matchers(matchers: &Matchers, viewer: &Viewer) -> Vec<bool> {
	let mut results = Vec::new();

	if let Some(ref value) = matchers.user {
		results.push(match string_set(value) {
			Some(users) => contains_user(&users, &viewer.name),
			None => false,
		});
	}

	if let Some(ref value) = matchers.not_user {
		results.push(match string_set(value) {
			Some(users) => !contains_user(&users, &viewer.name),
			None => false,
		});
	}

	if let Some(ref value) = matchers.device {
		results.push(match string_set(value) {
			Some(devices) => contains_device(&devices, &viewer.user_agent),
			None => false,
		});
	}

	if let Some(ref value) = matchers.not_device {
		results.push(match string_set(value) {
			Some(devices) => !contains_device(&devices, &viewer.user_agent),
			None => false,
		});
	}

	if let Some(ref value) = matchers.is_admin {
		results.push(value.as_bool() == Some(viewer.is_admin));
	}

	if let Some(ref value) = matchers.is_owner {
		results.push(value.as_bool() == Some(viewer.is_owner));
	}

	results
}

/// Lower-cased values of a predicate given as a comma-separated string or a string array.
///
/// Returns `None` when the value carries no usable string.
fn string_set(value: &Value) -> Option<Vec<String>> {
	let values: Vec<String> = match value {
		Value::String(text) => LIST_SEPARATOR
			.split(text.trim())
			.map(str::to_lowercase)
			.collect(),
		Value::Array(items) => items
			.iter()
			.filter_map(Value::as_str)
			.map(|item| item.trim().to_lowercase())
			.collect(),
		_ => return None,
	};

	let values: Vec<String> = values.into_iter().filter(|v| !v.is_empty()).collect();
	if values.is_empty() { None } else { Some(values) }
}

fn contains_user(users: &[String], name: &str) -> bool {
	let name = name.to_lowercase();
	users.iter().any(|user| *user == name)
}

fn contains_device(devices: &[String], user_agent: &str) -> bool {
	let user_agent = user_agent.to_lowercase();
	devices.iter().any(|device| user_agent.contains(device.as_str()))
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	const IPHONE_UA: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X)";
	const DESKTOP_UA: &str = "Mozilla/5.0 (X11; Linux x86_64) Firefox/120.0";

	fn exception(matchers: Matchers, conditions: MatchersConditions) -> Exception {
		Exception {
			matchers,
			matchers_conditions: conditions,
			..Default::default()
		}
	}

	fn viewer(name: &str, user_agent: &str) -> Viewer {
		Viewer {
			name: name.to_string(),
			user_agent: user_agent.to_string(),
			..Default::default()
		}
	}

	#[test]
	fn test_user_matches_case_insensitive() {
		let exc = exception(
			Matchers {
				user: Some(json!("Alice")),
				..Default::default()
			},
			MatchersConditions::Or,
		);
		assert!(matches(&exc, &viewer("alice", DESKTOP_UA)));
		assert!(matches(&exc, &viewer("ALICE", DESKTOP_UA)));
		assert!(!matches(&exc, &viewer("bob", DESKTOP_UA)));
	}

	#[test]
	fn test_user_comma_list_and_array() {
		let comma = exception(
			Matchers {
				user: Some(json!("alice ,  Bob,carol")),
				..Default::default()
			},
			MatchersConditions::Or,
		);
		assert!(matches(&comma, &viewer("bob", DESKTOP_UA)));
		assert!(matches(&comma, &viewer("Carol", DESKTOP_UA)));
		assert!(!matches(&comma, &viewer("dave", DESKTOP_UA)));

		let array = exception(
			Matchers {
				user: Some(json!(["Alice", "Bob"])),
				..Default::default()
			},
			MatchersConditions::Or,
		);
		assert!(matches(&array, &viewer("bob", DESKTOP_UA)));
		assert!(!matches(&array, &viewer("dave", DESKTOP_UA)));
	}

	#[test]
	fn test_not_user() {
		let exc = exception(
			Matchers {
				not_user: Some(json!("alice, bob")),
				..Default::default()
			},
			MatchersConditions::Or,
		);
		assert!(!matches(&exc, &viewer("Alice", DESKTOP_UA)));
		assert!(matches(&exc, &viewer("dave", DESKTOP_UA)));
	}

	#[test]
	fn test_device_and_not_device() {
		let device = exception(
			Matchers {
				device: Some(json!(["iphone", "android"])),
				..Default::default()
			},
			MatchersConditions::Or,
		);
		assert!(matches(&device, &viewer("alice", IPHONE_UA)));
		assert!(!matches(&device, &viewer("alice", DESKTOP_UA)));

		let not_device = exception(
			Matchers {
				not_device: Some(json!("iPhone")),
				..Default::default()
			},
			MatchersConditions::Or,
		);
		assert!(!matches(&not_device, &viewer("alice", IPHONE_UA)));
		assert!(matches(&not_device, &viewer("alice", DESKTOP_UA)));
	}

	#[test]
	fn test_is_admin_and_is_owner() {
		let admin_only = exception(
			Matchers {
				is_admin: Some(json!(true)),
				..Default::default()
			},
			MatchersConditions::Or,
		);
		let mut admin = viewer("root", DESKTOP_UA);
		admin.is_admin = true;
		assert!(matches(&admin_only, &admin));
		assert!(!matches(&admin_only, &viewer("guest", DESKTOP_UA)));

		let non_owner = exception(
			Matchers {
				is_owner: Some(json!(false)),
				..Default::default()
			},
			MatchersConditions::Or,
		);
		let mut owner = viewer("root", DESKTOP_UA);
		owner.is_owner = true;
		assert!(!matches(&non_owner, &owner));
		assert!(matches(&non_owner, &viewer("guest", DESKTOP_UA)));
	}

	#[test]
	fn test_or_matches_any_predicate() {
		let exc = exception(
			Matchers {
				user: Some(json!("alice")),
				device: Some(json!("iphone")),
				..Default::default()
			},
			MatchersConditions::Or,
		);
		assert!(matches(&exc, &viewer("alice", DESKTOP_UA)));
		assert!(matches(&exc, &viewer("bob", IPHONE_UA)));
		assert!(!matches(&exc, &viewer("bob", DESKTOP_UA)));
	}

	#[test]
	fn test_and_requires_every_defined_predicate() {
		let exc = exception(
			Matchers {
				user: Some(json!("alice")),
				device: Some(json!("iphone")),
				..Default::default()
			},
			MatchersConditions::And,
		);
		assert!(matches(&exc, &viewer("alice", IPHONE_UA)));
		assert!(!matches(&exc, &viewer("alice", DESKTOP_UA)));
		assert!(!matches(&exc, &viewer("bob", IPHONE_UA)));
	}

	#[test]
	fn test_single_predicate_or_and_equivalent() {
		let matchers = Matchers {
			user: Some(json!("alice")),
			..Default::default()
		};
		let or = exception(matchers.clone(), MatchersConditions::Or);
		let and = exception(matchers, MatchersConditions::And);

		for name in ["alice", "Alice", "bob", ""] {
			let v = viewer(name, DESKTOP_UA);
			assert_eq!(matches(&or, &v), matches(&and, &v), "viewer {name:?}");
		}
	}

	#[test]
	fn test_no_predicates_never_matches() {
		let v = viewer("alice", DESKTOP_UA);
		assert!(!matches(
			&exception(Matchers::default(), MatchersConditions::Or),
			&v
		));
		assert!(!matches(
			&exception(Matchers::default(), MatchersConditions::And),
			&v
		));
	}

	#[test]
	fn test_malformed_predicates_do_not_match() {
		let v = viewer("alice", DESKTOP_UA);

		let numeric_user = exception(
			Matchers {
				user: Some(json!(42)),
				..Default::default()
			},
			MatchersConditions::Or,
		);
		assert!(!matches(&numeric_user, &v));

		// A malformed not_user is not satisfied either
		let object_not_user = exception(
			Matchers {
				not_user: Some(json!({"name": "bob"})),
				..Default::default()
			},
			MatchersConditions::Or,
		);
		assert!(!matches(&object_not_user, &v));

		let string_admin = exception(
			Matchers {
				is_admin: Some(json!("false")),
				..Default::default()
			},
			MatchersConditions::Or,
		);
		assert!(!matches(&string_admin, &v));

		let empty_device = exception(
			Matchers {
				device: Some(json!(" , ")),
				..Default::default()
			},
			MatchersConditions::Or,
		);
		assert!(!matches(&empty_device, &v));
	}

	#[test]
	fn test_malformed_predicate_fails_and_but_not_or() {
		let matchers = Matchers {
			user: Some(json!("alice")),
			device: Some(json!(7)),
			..Default::default()
		};
		let v = viewer("alice", DESKTOP_UA);
		assert!(matches(
			&exception(matchers.clone(), MatchersConditions::Or),
			&v
		));
		assert!(!matches(
			&exception(matchers, MatchersConditions::And),
			&v
		));
	}

	#[test]
	fn test_matching_exceptions_keeps_order() {
		let exceptions = vec![
			exception(
				Matchers {
					user: Some(json!("bob")),
					..Default::default()
				},
				MatchersConditions::Or,
			),
			exception(
				Matchers {
					not_user: Some(json!("bob")),
					..Default::default()
				},
				MatchersConditions::Or,
			),
			exception(
				Matchers {
					user: Some(json!("alice")),
					..Default::default()
				},
				MatchersConditions::Or,
			),
		];

		let matched = matching_exceptions(&exceptions, &viewer("alice", DESKTOP_UA));
		assert_eq!(matched.len(), 2);
		assert!(std::ptr::eq(matched[0], &exceptions[1]));
		assert!(std::ptr::eq(matched[1], &exceptions[2]));
	}
}
