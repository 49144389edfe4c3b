//! Routing configuration model.
//!
//! A [`RouteConfig`] is an ordered list of entries: concrete [`Route`]s and
//! [`Include`]s that nest a child configuration under an optional path
//! prefix and namespace. Declaration order is significant everywhere; it
//! decides both resolution precedence and emission order downstream.

use serde_json::Value;
use std::collections::BTreeMap;

use crate::converters::ConverterRegistry;
use crate::error::RoutingResult;
use crate::pattern::PathPattern;

/// Which syntax a route's pattern is written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternKind {
	/// Template syntax with typed captures, `archive/<int:year>/`.
	Template,
	/// Restricted regex syntax, `^archive/(?P<year>[0-9]{4})/$`.
	Regex,
}

/// One concrete endpoint in a routing configuration.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use staticurls_routing::route::Route;
///
/// let route = Route::path("archive/<int:year>/")
/// 	.with_name("archive")
/// 	.with_default("page", json!(1));
/// assert_eq!(route.name(), Some("archive"));
/// ```
#[derive(Debug, Clone)]
pub struct Route {
	pattern: String,
	kind: PatternKind,
	name: Option<String>,
	defaults: BTreeMap<String, Value>,
}

impl Route {
	/// Creates a route from a template-syntax pattern.
	pub fn path(pattern: impl Into<String>) -> Self {
		Self {
			pattern: pattern.into(),
			kind: PatternKind::Template,
			name: None,
			defaults: BTreeMap::new(),
		}
	}

	/// Creates a route from a regex-syntax pattern.
	pub fn regex(pattern: impl Into<String>) -> Self {
		Self {
			pattern: pattern.into(),
			kind: PatternKind::Regex,
			name: None,
			defaults: BTreeMap::new(),
		}
	}

	/// Names the route. Unnamed routes still match paths but cannot be
	/// reversed or transpiled.
	pub fn with_name(mut self, name: impl Into<String>) -> Self {
		self.name = Some(name.into());
		self
	}

	/// Binds a default value for an argument name.
	pub fn with_default(mut self, key: impl Into<String>, value: Value) -> Self {
		self.defaults.insert(key.into(), value);
		self
	}

	/// Returns the pattern source as declared.
	pub fn pattern(&self) -> &str {
		&self.pattern
	}

	/// Returns which syntax the pattern is written in.
	pub fn kind(&self) -> PatternKind {
		self.kind
	}

	/// Returns the route name, if any.
	pub fn name(&self) -> Option<&str> {
		self.name.as_deref()
	}

	/// Returns the bound default values.
	pub fn defaults(&self) -> &BTreeMap<String, Value> {
		&self.defaults
	}

	/// Parses this route's pattern. Error messages are labelled with the
	/// route name when one is set, otherwise with the pattern itself.
	pub fn compile(&self, converters: &ConverterRegistry) -> RoutingResult<PathPattern> {
		let label = self.name.as_deref().unwrap_or(&self.pattern);
		match self.kind {
			PatternKind::Template => {
				PathPattern::parse(&self.pattern, self.defaults.clone(), converters, label)
			}
			PatternKind::Regex => {
				PathPattern::parse_regex(&self.pattern, self.defaults.clone(), label)
			}
		}
	}
}

/// A nested child configuration mounted under an optional prefix pattern
/// and namespace.
#[derive(Debug, Clone)]
pub struct Include {
	config: RouteConfig,
	prefix: Option<String>,
	namespace: Option<String>,
	app_name: Option<String>,
}

impl Include {
	/// Mounts a child configuration with no prefix or namespace.
	pub fn new(config: RouteConfig) -> Self {
		Self {
			config,
			prefix: None,
			namespace: None,
			app_name: None,
		}
	}

	/// Sets a template-syntax prefix prepended to every child pattern. The
	/// prefix may capture arguments of its own, `chain/<str:chain>/`.
	pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
		self.prefix = Some(prefix.into());
		self
	}

	/// Sets the instance namespace for the child configuration.
	pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
		self.namespace = Some(namespace.into());
		self
	}

	/// Sets the application name. Used as the namespace when no instance
	/// namespace is set.
	pub fn with_app_name(mut self, app_name: impl Into<String>) -> Self {
		self.app_name = Some(app_name.into());
		self
	}

	/// Returns the child configuration.
	pub fn config(&self) -> &RouteConfig {
		&self.config
	}

	/// Returns the prefix pattern, if any.
	pub fn prefix(&self) -> Option<&str> {
		self.prefix.as_deref()
	}

	/// Returns the instance namespace, if any.
	pub fn namespace(&self) -> Option<&str> {
		self.namespace.as_deref()
	}

	/// Returns the application name, if any.
	pub fn app_name(&self) -> Option<&str> {
		self.app_name.as_deref()
	}

	/// Returns the namespace this include mounts its children under: the
	/// instance namespace when set, else the application name, else none.
	pub fn effective_namespace(&self) -> Option<&str> {
		self.namespace.as_deref().or(self.app_name.as_deref())
	}
}

/// One entry of a routing configuration.
#[derive(Debug, Clone)]
pub enum ConfigEntry {
	/// A concrete endpoint.
	Route(Route),
	/// A nested configuration.
	Include(Include),
}

/// An ordered routing configuration.
#[derive(Debug, Clone, Default)]
pub struct RouteConfig {
	entries: Vec<ConfigEntry>,
}

impl RouteConfig {
	/// Creates an empty configuration.
	pub fn new() -> Self {
		Self::default()
	}

	/// Appends a route.
	pub fn route(mut self, route: Route) -> Self {
		self.entries.push(ConfigEntry::Route(route));
		self
	}

	/// Appends an include.
	pub fn include(mut self, include: Include) -> Self {
		self.entries.push(ConfigEntry::Include(include));
		self
	}

	/// Returns the entries in declaration order.
	pub fn entries(&self) -> &[ConfigEntry] {
		&self.entries
	}

	/// Returns true when the configuration has no entries.
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}

impl From<Vec<ConfigEntry>> for RouteConfig {
	fn from(entries: Vec<ConfigEntry>) -> Self {
		Self { entries }
	}
}
