//! Argument converters for typed route captures.
//!
//! A converter ties a route argument's declared type to a matching rule and
//! a default example value used when nothing more specific is registered.
//! The built-in set mirrors the usual path argument types (`int`, `str`,
//! `slug`, `uuid`, `path`); applications may register their own types with
//! [`ConverterRegistry::register`].

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Value, json};
use std::collections::HashMap;

use crate::error::{RoutingError, RoutingResult};

/// Maximum allowed size for a compiled converter rule (in bytes).
const MAX_RULE_REGEX_SIZE: usize = 1 << 20; // 1 MiB

/// A matching rule and example value for one route argument type.
///
/// The rule is an unanchored regex source; matching always applies it to the
/// full candidate text.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use staticurls_routing::converters::Converter;
///
/// let ctm = Converter::new("ctm", "[6]{3}", json!(666)).unwrap();
/// assert!(ctm.accepts("666"));
/// assert!(!ctm.accepts("6666"));
/// ```
#[derive(Debug, Clone)]
pub struct Converter {
	/// The declared type name, e.g. `int`.
	type_name: String,
	/// The rule source as declared.
	rule: String,
	/// The rule compiled for full-text matching.
	matcher: Regex,
	/// Default example value for arguments of this type.
	placeholder: Value,
}

impl Converter {
	/// Creates a converter from a type name, rule source and default
	/// placeholder value.
	///
	/// # Errors
	///
	/// Returns [`RoutingError::InvalidPattern`] if the rule does not compile.
	pub fn new(type_name: &str, rule: &str, placeholder: Value) -> RoutingResult<Self> {
		let matcher = compile_full_match(rule)?;
		Ok(Self {
			type_name: type_name.to_string(),
			rule: rule.to_string(),
			matcher,
			placeholder,
		})
	}

	/// Returns the declared type name.
	pub fn type_name(&self) -> &str {
		&self.type_name
	}

	/// Returns the rule source as declared.
	pub fn rule(&self) -> &str {
		&self.rule
	}

	/// Returns the default example value for this type.
	pub fn placeholder(&self) -> &Value {
		&self.placeholder
	}

	/// Checks whether the full text satisfies this converter's rule.
	pub fn accepts(&self, text: &str) -> bool {
		self.matcher.is_match(text)
	}
}

/// Compiles a rule source into a regex matching the entire input.
pub(crate) fn compile_full_match(rule: &str) -> RoutingResult<Regex> {
	regex::RegexBuilder::new(&format!("^(?:{rule})$"))
		.size_limit(MAX_RULE_REGEX_SIZE)
		.build()
		.map_err(|e| RoutingError::InvalidPattern {
			pattern: rule.to_string(),
			message: e.to_string(),
		})
}

/// Coerces a placeholder or default value into the text form substituted
/// into a path.
///
/// Strings pass through unquoted; numbers and booleans use their plain
/// display form. Composite values fall back to their JSON encoding, which a
/// matching rule is unlikely to accept; registering scalar placeholders is
/// the expected usage.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use staticurls_routing::converters::to_text;
///
/// assert_eq!(to_text(&json!(143)), "143");
/// assert_eq!(to_text(&json!("emma")), "emma");
/// ```
pub fn to_text(value: &Value) -> String {
	match value {
		Value::Null => String::new(),
		Value::Bool(b) => b.to_string(),
		Value::Number(n) => n.to_string(),
		Value::String(s) => s.clone(),
		other => other.to_string(),
	}
}

/// The built-in converter table.
static BUILT_IN: Lazy<Vec<Converter>> = Lazy::new(|| {
	[
		("int", "[0-9]+", json!(1)),
		("str", "[^/]+", json!("a")),
		("slug", "[-a-zA-Z0-9_]+", json!("slug")),
		(
			"uuid",
			"[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}",
			json!("aaaaaaaa-aaaa-aaaa-aaaa-aaaaaaaaaaaa"),
		),
		("path", ".+", json!("a/path")),
	]
	.into_iter()
	.map(|(name, rule, placeholder)| {
		// The table above is static and known to compile.
		Converter::new(name, rule, placeholder).unwrap_or_else(|e| {
			panic!("built-in converter '{name}' failed to compile: {e}")
		})
	})
	.collect()
});

/// Type-name to [`Converter`] lookup.
///
/// Registering a converter under an existing type name is an explicit
/// override; the previous converter is replaced.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use staticurls_routing::converters::{Converter, ConverterRegistry};
///
/// let mut registry = ConverterRegistry::with_defaults();
/// registry.register(Converter::new("ctm", "[6]{3}", json!(666)).unwrap());
/// assert!(registry.get("ctm").is_some());
/// assert!(registry.get("int").is_some());
/// ```
#[derive(Debug, Clone)]
pub struct ConverterRegistry {
	converters: HashMap<String, Converter>,
}

impl ConverterRegistry {
	/// Creates a registry holding only the built-in converters.
	pub fn with_defaults() -> Self {
		let converters = BUILT_IN
			.iter()
			.map(|c| (c.type_name.clone(), c.clone()))
			.collect();
		Self { converters }
	}

	/// Registers a converter, replacing any existing converter with the
	/// same type name.
	pub fn register(&mut self, converter: Converter) {
		self.converters
			.insert(converter.type_name.clone(), converter);
	}

	/// Looks up a converter by type name.
	pub fn get(&self, type_name: &str) -> Option<&Converter> {
		self.converters.get(type_name)
	}

	/// Looks up a converter by type name, failing with
	/// [`RoutingError::UnknownConverter`] naming the route that used it.
	pub fn require(&self, type_name: &str, route: &str) -> RoutingResult<&Converter> {
		self.get(type_name).ok_or_else(|| RoutingError::UnknownConverter {
			converter: type_name.to_string(),
			route: route.to_string(),
		})
	}
}

impl Default for ConverterRegistry {
	fn default() -> Self {
		Self::with_defaults()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case("int", "143", true)]
	#[case("int", "-1", false)]
	#[case("int", "a", false)]
	#[case("str", "emma", true)]
	#[case("str", "a/b", false)]
	#[case("slug", "a-slug_01", true)]
	#[case("slug", "no/slash", false)]
	#[case("uuid", "aaaaaaaa-aaaa-aaaa-aaaa-aaaaaaaaaaaa", true)]
	#[case("uuid", "not-a-uuid", false)]
	#[case("path", "a/nested/path", true)]
	#[case("path", "", false)]
	fn test_built_in_rules(#[case] type_name: &str, #[case] text: &str, #[case] expected: bool) {
		let registry = ConverterRegistry::with_defaults();
		let converter = registry.get(type_name).unwrap();
		assert_eq!(converter.accepts(text), expected);
	}

	#[test]
	fn test_rule_matches_full_text_only() {
		let registry = ConverterRegistry::with_defaults();
		let int = registry.get("int").unwrap();
		assert!(!int.accepts("143abc"));
		assert!(!int.accepts("abc143"));
	}

	#[test]
	fn test_register_overrides_existing_type() {
		let mut registry = ConverterRegistry::with_defaults();
		registry.register(Converter::new("int", "[0-9]{2}", json!(42)).unwrap());

		let int = registry.get("int").unwrap();
		assert!(int.accepts("42"));
		assert!(!int.accepts("143"));
	}

	#[test]
	fn test_require_unknown_type_names_route() {
		let registry = ConverterRegistry::with_defaults();
		let err = registry.require("name", "unreg_conv_tst").unwrap_err();
		assert!(matches!(err, RoutingError::UnknownConverter { .. }));
		assert!(err.to_string().contains("unreg_conv_tst"));
	}

	#[test]
	fn test_invalid_rule_is_rejected() {
		let result = Converter::new("bad", "[unclosed", json!(0));
		assert!(matches!(
			result,
			Err(RoutingError::InvalidPattern { .. })
		));
	}

	#[test]
	fn test_to_text_coercion() {
		assert_eq!(to_text(&json!(0)), "0");
		assert_eq!(to_text(&json!("a")), "a");
		assert_eq!(to_text(&json!(true)), "true");
		assert_eq!(to_text(&Value::Null), "");
	}

	#[test]
	fn test_default_placeholders() {
		let registry = ConverterRegistry::with_defaults();
		for (type_name, expected) in [
			("int", json!(1)),
			("str", json!("a")),
			("path", json!("a/path")),
		] {
			assert_eq!(registry.get(type_name).unwrap().placeholder(), &expected);
		}
	}
}
