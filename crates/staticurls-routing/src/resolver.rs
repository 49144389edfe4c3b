//! Path resolution and reversal over a routing configuration.
//!
//! [`UrlResolver`] flattens a [`RouteConfig`] into compiled endpoints, in
//! declaration order, composing include prefixes into each endpoint's
//! pattern and namespaces into its qualified name. Resolution and reversal
//! both scan the endpoints in that order and take the first match, so a
//! route declared earlier always wins over a later one.

use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

use crate::converters::{self, ConverterRegistry};
use crate::error::{RoutingError, RoutingResult};
use crate::pattern::PathPattern;
use crate::route::{ConfigEntry, RouteConfig};

/// One flattened endpoint: the fully-composed pattern and the qualified
/// route name, `None` for unnamed routes.
#[derive(Debug, Clone)]
struct CompiledEndpoint {
	name: Option<String>,
	pattern: PathPattern,
}

/// The outcome of resolving a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRoute {
	/// Qualified name of the matched route, `None` when it is unnamed.
	pub name: Option<String>,
	/// Named capture values.
	pub kwargs: BTreeMap<String, String>,
	/// Positional capture values, in path order.
	pub args: Vec<String>,
}

/// Resolves paths to routes and reverses route names to paths.
///
/// # Examples
///
/// ```
/// use std::collections::BTreeMap;
/// use staticurls_routing::converters::ConverterRegistry;
/// use staticurls_routing::resolver::UrlResolver;
/// use staticurls_routing::route::{Route, RouteConfig};
///
/// let config = RouteConfig::new()
/// 	.route(Route::path("simple/<int:arg1>").with_name("simple"));
/// let resolver = UrlResolver::new(&config, &ConverterRegistry::with_defaults());
///
/// let mut kwargs = BTreeMap::new();
/// kwargs.insert("arg1".to_string(), "42".to_string());
/// assert_eq!(resolver.reverse("simple", &kwargs).unwrap(), "/simple/42");
///
/// let resolved = resolver.resolve("/simple/42").unwrap();
/// assert_eq!(resolved.name.as_deref(), Some("simple"));
/// ```
#[derive(Debug, Clone)]
pub struct UrlResolver {
	endpoints: Vec<CompiledEndpoint>,
}

impl UrlResolver {
	/// Compiles a configuration into a resolver.
	///
	/// Construction never fails: routes whose patterns do not parse are
	/// skipped (and logged at debug level), as are whole includes with an
	/// unparseable prefix. Callers that need parse errors surfaced compile
	/// routes themselves via [`crate::route::Route::compile`].
	pub fn new(config: &RouteConfig, converters: &ConverterRegistry) -> Self {
		let mut endpoints = Vec::new();
		let mut prefixes = Vec::new();
		let mut namespaces = Vec::new();
		Self::collect(
			config,
			converters,
			&mut prefixes,
			&mut namespaces,
			&mut endpoints,
		);
		Self { endpoints }
	}

	fn collect(
		config: &RouteConfig,
		converters: &ConverterRegistry,
		prefixes: &mut Vec<PathPattern>,
		namespaces: &mut Vec<String>,
		endpoints: &mut Vec<CompiledEndpoint>,
	) {
		for entry in config.entries() {
			match entry {
				ConfigEntry::Route(route) => {
					let leaf = match route.compile(converters) {
						Ok(pattern) => pattern,
						Err(error) => {
							debug!(pattern = route.pattern(), %error, "skipping route");
							continue;
						}
					};
					let pattern = match PathPattern::compose(prefixes, &leaf) {
						Ok(pattern) => pattern,
						Err(error) => {
							debug!(pattern = route.pattern(), %error, "skipping route");
							continue;
						}
					};
					let name = route.name().map(|name| Self::qualify(namespaces, name));
					endpoints.push(CompiledEndpoint { name, pattern });
				}
				ConfigEntry::Include(include) => {
					let mut pushed_prefix = false;
					if let Some(source) = include.prefix() {
						match PathPattern::parse(source, BTreeMap::new(), converters, source) {
							Ok(pattern) => {
								prefixes.push(pattern);
								pushed_prefix = true;
							}
							Err(error) => {
								debug!(prefix = source, %error, "skipping include");
								continue;
							}
						}
					}
					let pushed_namespace = match include.effective_namespace() {
						Some(namespace) => {
							namespaces.push(namespace.to_string());
							true
						}
						None => false,
					};
					Self::collect(include.config(), converters, prefixes, namespaces, endpoints);
					if pushed_namespace {
						namespaces.pop();
					}
					if pushed_prefix {
						prefixes.pop();
					}
				}
			}
		}
	}

	fn qualify(namespaces: &[String], name: &str) -> String {
		if namespaces.is_empty() {
			name.to_string()
		} else {
			format!("{}:{name}", namespaces.join(":"))
		}
	}

	/// Resolves a path to the first matching endpoint, named or not. At
	/// most one leading slash is stripped before matching.
	pub fn resolve(&self, path: &str) -> Option<ResolvedRoute> {
		let text = path.strip_prefix('/').unwrap_or(path);
		for endpoint in &self.endpoints {
			if let Some((kwargs, args)) = endpoint.pattern.captures(text) {
				return Some(ResolvedRoute {
					name: endpoint.name.clone(),
					kwargs,
					args,
				});
			}
		}
		None
	}

	/// Reverses a qualified route name with named argument values.
	///
	/// Endpoints sharing the name are tried in declaration order; the
	/// first whose arguments and defaults accept the values wins. A
	/// route-level default constrains the call: supplying a different
	/// value for a default key rejects that endpoint, while a default
	/// whose key is not captured by the pattern is dropped from the path.
	///
	/// # Errors
	///
	/// Returns [`RoutingError::NoReverseMatch`] when no endpoint accepts
	/// the values.
	pub fn reverse(&self, name: &str, kwargs: &BTreeMap<String, String>) -> RoutingResult<String> {
		for endpoint in self.named(name) {
			if let Some(path) = Self::try_reverse(&endpoint.pattern, kwargs) {
				return Ok(format!("/{path}"));
			}
		}
		Err(RoutingError::NoReverseMatch {
			name: name.to_string(),
		})
	}

	/// Reverses a qualified route name with positional argument values.
	/// Only endpoints whose captures are all positional participate.
	///
	/// # Errors
	///
	/// Returns [`RoutingError::NoReverseMatch`] when no endpoint accepts
	/// the values.
	pub fn reverse_positional(&self, name: &str, args: &[String]) -> RoutingResult<String> {
		for endpoint in self.named(name) {
			if let Some(path) = endpoint.pattern.substitute_positional(args) {
				return Ok(format!("/{path}"));
			}
		}
		Err(RoutingError::NoReverseMatch {
			name: name.to_string(),
		})
	}

	fn named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a CompiledEndpoint> {
		self.endpoints
			.iter()
			.filter(move |endpoint| endpoint.name.as_deref() == Some(name))
	}

	fn try_reverse(pattern: &PathPattern, kwargs: &BTreeMap<String, String>) -> Option<String> {
		if pattern.positional_arity() > 0 {
			return None;
		}
		let params: BTreeSet<&str> = pattern.expected_arguments().into_iter().collect();
		let defaults = pattern.defaults();
		// Every surplus key must be a default; every missing parameter
		// must have one.
		for key in kwargs.keys() {
			if !params.contains(key.as_str()) && !defaults.contains_key(key) {
				return None;
			}
		}
		for param in &params {
			if !kwargs.contains_key(*param) && !defaults.contains_key(*param) {
				return None;
			}
		}
		// A default supplied with a different value rejects the endpoint.
		for (key, default) in defaults {
			if let Some(value) = kwargs.get(key) {
				if *value != converters::to_text(default) {
					return None;
				}
			}
		}
		let mut subs = BTreeMap::new();
		for param in &params {
			let value = match kwargs.get(*param) {
				Some(value) => value.clone(),
				None => converters::to_text(defaults.get(*param)?),
			};
			subs.insert((*param).to_string(), value);
		}
		pattern.substitute(&subs)
	}
}
