//! Verified route tree construction.
//!
//! [`TreeBuilder`] walks a [`RouteConfig`] depth first and produces the
//! tree the code writers traverse: every include boundary with a namespace
//! becomes a child [`NamespaceNode`], every retained named route becomes a
//! variant of the [`RouteEntry`] with its local name, in declaration
//! order. Each variant is verified against the native resolver as it is
//! inserted, so by the time a writer sees the tree every variant carries
//! its [`Verification`] outcome.
//!
//! Include and exclude filters are colon-delimited qualified-name
//! prefixes. A route is retained iff some include is a prefix of its
//! qualified name (an empty include list retains everything) and no
//! exclude is; excludes win over includes at any depth. Filtering only
//! affects what is emitted: the native resolver is always built from the
//! whole configuration, so an excluded route still claims its paths
//! during verification.

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use tracing::{debug, warn};

use staticurls_routing::converters::ConverterRegistry;
use staticurls_routing::pattern::PathPattern;
use staticurls_routing::resolver::UrlResolver;
use staticurls_routing::route::{ConfigEntry, RouteConfig};

use crate::error::{TranspileError, TranspileResult};
use crate::options::{GenerationOptions, OnUnresolved};
use crate::placeholders::PlaceholderRegistry;
use crate::verify::{Verification, Verifier};

/// One pattern variant of a named route, with its verification outcome.
#[derive(Debug, Clone)]
pub struct RouteVariant {
	pattern: PathPattern,
	verification: Verification,
}

impl RouteVariant {
	/// Returns the fully composed pattern.
	pub fn pattern(&self) -> &PathPattern {
		&self.pattern
	}

	/// Returns the verification outcome.
	pub fn verification(&self) -> &Verification {
		&self.verification
	}
}

/// All variants sharing one route name within a namespace.
#[derive(Debug, Clone)]
pub struct RouteEntry {
	name: String,
	qualified: String,
	variants: Vec<RouteVariant>,
}

impl RouteEntry {
	/// Returns the route's local name.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Returns the route's qualified name.
	pub fn qualified(&self) -> &str {
		&self.qualified
	}

	/// Returns the variants in declaration order. The order is the
	/// tie-break: the first variant accepting a call wins.
	pub fn variants(&self) -> &[RouteVariant] {
		&self.variants
	}
}

/// One namespace level of the verified tree. The root is unnamed.
#[derive(Debug, Clone)]
pub struct NamespaceNode {
	name: Option<String>,
	routes: Vec<RouteEntry>,
	children: Vec<NamespaceNode>,
}

impl NamespaceNode {
	fn root() -> Self {
		Self {
			name: None,
			routes: Vec::new(),
			children: Vec::new(),
		}
	}

	/// Returns the namespace's local name; `None` for the root.
	pub fn name(&self) -> Option<&str> {
		self.name.as_deref()
	}

	/// Returns the route entries in insertion order.
	pub fn routes(&self) -> &[RouteEntry] {
		&self.routes
	}

	/// Returns the child namespaces in insertion order.
	pub fn children(&self) -> &[NamespaceNode] {
		&self.children
	}

	/// Returns true when the node holds no routes and no children.
	pub fn is_empty(&self) -> bool {
		self.routes.is_empty() && self.children.is_empty()
	}

	fn child_mut(&mut self, name: &str) -> &mut NamespaceNode {
		let index = match self
			.children
			.iter()
			.position(|child| child.name.as_deref() == Some(name))
		{
			Some(index) => index,
			None => {
				self.children.push(NamespaceNode {
					name: Some(name.to_string()),
					routes: Vec::new(),
					children: Vec::new(),
				});
				self.children.len() - 1
			}
		};
		&mut self.children[index]
	}

	fn entry_mut(&mut self, name: &str, qualified: &str) -> &mut RouteEntry {
		let index = match self.routes.iter().position(|entry| entry.name == name) {
			Some(index) => index,
			None => {
				self.routes.push(RouteEntry {
					name: name.to_string(),
					qualified: qualified.to_string(),
					variants: Vec::new(),
				});
				self.routes.len() - 1
			}
		};
		&mut self.routes[index]
	}

	/// Drops namespaces left empty by filtering or skipped variants.
	fn prune(&mut self) {
		for child in &mut self.children {
			child.prune();
		}
		self.children.retain(|child| !child.is_empty());
	}
}

/// Argument shape of a variant, used to flag ambiguous declaration order.
#[derive(PartialEq)]
enum Signature {
	Named(BTreeSet<String>),
	Positional(usize),
}

fn signature(pattern: &PathPattern) -> Option<Signature> {
	if pattern.has_mixed_arguments() {
		return None;
	}
	if pattern.positional_arity() > 0 {
		Some(Signature::Positional(pattern.positional_arity()))
	} else {
		Some(Signature::Named(
			pattern
				.expected_arguments()
				.into_iter()
				.map(str::to_string)
				.collect(),
		))
	}
}

struct WalkState {
	namespaces: Vec<String>,
	prefixes: Vec<PathPattern>,
	scopes: Vec<String>,
}

impl WalkState {
	fn scope(&self) -> Option<&str> {
		self.scopes.last().map(String::as_str)
	}

	fn qualify(&self, name: &str) -> String {
		if self.namespaces.is_empty() {
			name.to_string()
		} else {
			format!("{}:{name}", self.namespaces.join(":"))
		}
	}
}

/// Builds the verified route tree for one generation run.
pub struct TreeBuilder<'a> {
	converters: &'a ConverterRegistry,
	placeholders: &'a PlaceholderRegistry,
	options: &'a GenerationOptions,
	include: Vec<String>,
	exclude: Vec<String>,
}

impl<'a> TreeBuilder<'a> {
	/// Creates a builder over read-only registries and options.
	pub fn new(
		converters: &'a ConverterRegistry,
		placeholders: &'a PlaceholderRegistry,
		options: &'a GenerationOptions,
	) -> Self {
		Self {
			converters,
			placeholders,
			options,
			include: options.include().iter().map(|f| normalize_filter(f)).collect(),
			exclude: options.exclude().iter().map(|f| normalize_filter(f)).collect(),
		}
	}

	/// Builds the tree.
	///
	/// Verification failures are collected across the whole walk. Under
	/// [`OnUnresolved::Raise`] a non-empty collection fails the build in
	/// aggregate; under [`OnUnresolved::Skip`] each failure is logged and
	/// its variant omitted from the tree.
	///
	/// # Errors
	///
	/// Returns [`TranspileError::BuildFailed`] carrying every per-variant
	/// failure when the policy is to raise.
	pub fn build(&self, config: &RouteConfig) -> TranspileResult<NamespaceNode> {
		let resolver = UrlResolver::new(config, self.converters);
		let verifier = Verifier::new(
			&resolver,
			self.converters,
			self.placeholders,
			self.options.try_limit(),
		);

		let mut root = NamespaceNode::root();
		let mut failures = Vec::new();
		let mut state = WalkState {
			namespaces: Vec::new(),
			prefixes: Vec::new(),
			scopes: Vec::new(),
		};
		self.walk(config, &verifier, &mut state, &mut root, &mut failures);
		root.prune();

		if self.options.on_unresolved() == OnUnresolved::Raise && !failures.is_empty() {
			return Err(TranspileError::BuildFailed { failures });
		}
		Ok(root)
	}

	fn walk(
		&self,
		config: &RouteConfig,
		verifier: &Verifier<'_>,
		state: &mut WalkState,
		node: &mut NamespaceNode,
		failures: &mut Vec<TranspileError>,
	) {
		for entry in config.entries() {
			match entry {
				ConfigEntry::Route(route) => {
					// Routes without a name cannot be reversed and never
					// appear in generated code.
					let local = match route.name() {
						Some(name) => name,
						None => continue,
					};
					let qualified = state.qualify(local);
					if !self.retained(&qualified) {
						continue;
					}
					let pattern = match route
						.compile(self.converters)
						.and_then(|leaf| PathPattern::compose(&state.prefixes, &leaf))
					{
						Ok(pattern) => pattern,
						Err(error) => {
							self.record(TranspileError::Routing(error), failures);
							continue;
						}
					};
					if let Some(existing) = node.routes.iter().find(|e| e.name == local) {
						// The same pattern mounted twice collapses to one
						// variant.
						if existing.variants.iter().any(|v| v.pattern == pattern) {
							continue;
						}
						if let Some(sig) = signature(&pattern) {
							let duplicated = existing
								.variants
								.iter()
								.any(|v| signature(&v.pattern).as_ref() == Some(&sig));
							if duplicated {
								warn!(
									route = qualified.as_str(),
									"variants share an argument set; declaration order decides"
								);
							}
						}
					}
					match verifier.verify(&qualified, local, state.scope(), &pattern) {
						Ok(verification) => {
							debug!(route = qualified.as_str(), ?verification, "verified variant");
							node.entry_mut(local, &qualified).variants.push(RouteVariant {
								pattern,
								verification,
							});
						}
						Err(error) => self.record(error, failures),
					}
				}
				ConfigEntry::Include(include) => {
					let namespace = include.effective_namespace();
					if let Some(namespace) = namespace {
						// A wholly excluded namespace is never descended.
						if self.excluded(&state.qualify(namespace)) {
							continue;
						}
					}
					let pushed_prefix = match include.prefix() {
						Some(source) => {
							match PathPattern::parse(
								source,
								BTreeMap::new(),
								self.converters,
								source,
							) {
								Ok(pattern) => {
									state.prefixes.push(pattern);
									true
								}
								Err(error) => {
									self.record(TranspileError::Routing(error), failures);
									continue;
								}
							}
						}
						None => false,
					};
					let pushed_scope = match include.app_name() {
						Some(app_name) => {
							state.scopes.push(app_name.to_string());
							true
						}
						None => false,
					};
					match namespace {
						Some(namespace) => {
							state.namespaces.push(namespace.to_string());
							let child = node.child_mut(namespace);
							self.walk(include.config(), verifier, state, child, failures);
							state.namespaces.pop();
						}
						None => {
							self.walk(include.config(), verifier, state, node, failures);
						}
					}
					if pushed_scope {
						state.scopes.pop();
					}
					if pushed_prefix {
						state.prefixes.pop();
					}
				}
			}
		}
	}

	fn record(&self, error: TranspileError, failures: &mut Vec<TranspileError>) {
		match self.options.on_unresolved() {
			OnUnresolved::Raise => failures.push(error),
			OnUnresolved::Skip => warn!(%error, "skipping route variant"),
		}
	}

	fn retained(&self, qualified: &str) -> bool {
		if self.excluded(qualified) {
			return false;
		}
		self.include.is_empty()
			|| self
				.include
				.iter()
				.any(|filter| prefix_matches(filter, qualified))
	}

	fn excluded(&self, qualified: &str) -> bool {
		self.exclude
			.iter()
			.any(|filter| prefix_matches(filter, qualified))
	}
}

/// A filter matches a qualified name when it equals the name or names one
/// of its enclosing namespaces.
fn prefix_matches(filter: &str, qualified: &str) -> bool {
	filter == qualified
		|| (qualified.len() > filter.len()
			&& qualified.starts_with(filter)
			&& qualified.as_bytes()[filter.len()] == b':')
}

/// Collapses repeated, leading and trailing colons so `a::b` addresses
/// the same namespace as `a:b`.
fn normalize_filter(filter: &str) -> String {
	filter
		.split(':')
		.filter(|segment| !segment.is_empty())
		.collect::<Vec<_>>()
		.join(":")
}
