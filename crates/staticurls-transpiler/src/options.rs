//! Generation options.

use std::fmt;
use std::sync::Arc;

use crate::visitors::RouteVisitor;

/// Default per-variant verification attempt budget.
pub const DEFAULT_TRY_LIMIT: usize = 1 << 14;

/// What to do with a route variant that fails reversal verification.
///
/// Skipping is never the silent default: a skipped variant disappears from
/// the generated code entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OnUnresolved {
	/// Fail the build, reporting every failed variant at once.
	#[default]
	Raise,
	/// Log a warning and omit the variant from the output.
	Skip,
}

/// Which code writer renders the verified tree.
#[derive(Clone, Default)]
pub enum VisitorKind {
	/// One arrow function per route name, grouped in nested object
	/// literals. No shared runtime helper.
	Flat,
	/// A single resolver class with a constructor, a match helper and a
	/// `reverse(name, options)` method. Preferred for larger trees.
	#[default]
	Class,
	/// A caller-supplied writer honoring the traversal contract of
	/// [`RouteVisitor`].
	Custom(Arc<dyn Fn(&GenerationOptions) -> Box<dyn RouteVisitor> + Send + Sync>),
}

impl fmt::Debug for VisitorKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Flat => f.write_str("Flat"),
			Self::Class => f.write_str("Class"),
			Self::Custom(_) => f.write_str("Custom(..)"),
		}
	}
}

/// Options for one generation run.
///
/// # Examples
///
/// ```
/// use staticurls_transpiler::options::{GenerationOptions, VisitorKind};
///
/// let options = GenerationOptions::new()
/// 	.with_visitor(VisitorKind::Class)
/// 	.with_class_name("Router")
/// 	.with_exclude(["admin"]);
/// assert_eq!(options.class_name(), "Router");
/// ```
#[derive(Debug, Clone)]
pub struct GenerationOptions {
	visitor: VisitorKind,
	indent: String,
	depth: usize,
	include: Vec<String>,
	exclude: Vec<String>,
	on_unresolved: OnUnresolved,
	class_name: String,
	export: bool,
	raise_on_not_found: bool,
	namespace_support: bool,
	query_support: bool,
	try_limit: usize,
}

impl Default for GenerationOptions {
	fn default() -> Self {
		Self {
			visitor: VisitorKind::default(),
			indent: "\t".to_string(),
			depth: 0,
			include: Vec::new(),
			exclude: Vec::new(),
			on_unresolved: OnUnresolved::default(),
			class_name: "URLResolver".to_string(),
			export: false,
			raise_on_not_found: true,
			namespace_support: true,
			query_support: true,
			try_limit: DEFAULT_TRY_LIMIT,
		}
	}
}

impl GenerationOptions {
	/// Creates the default options: class writer, tab indentation, no
	/// filters, fail on unverified routes.
	pub fn new() -> Self {
		Self::default()
	}

	/// Selects the code writer.
	pub fn with_visitor(mut self, visitor: VisitorKind) -> Self {
		self.visitor = visitor;
		self
	}

	/// Sets the indentation string. An empty string also disables
	/// newlines, producing single-line output.
	pub fn with_indent(mut self, indent: impl Into<String>) -> Self {
		self.indent = indent.into();
		self
	}

	/// Sets the starting indentation depth.
	pub fn with_depth(mut self, depth: usize) -> Self {
		self.depth = depth;
		self
	}

	/// Restricts generation to routes under the given qualified-name
	/// prefixes. Empty means include everything.
	pub fn with_include<I, S>(mut self, include: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.include = include.into_iter().map(Into::into).collect();
		self
	}

	/// Removes routes under the given qualified-name prefixes. Excludes
	/// win over includes at any depth.
	pub fn with_exclude<I, S>(mut self, exclude: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.exclude = exclude.into_iter().map(Into::into).collect();
		self
	}

	/// Sets the policy for route variants that fail verification.
	pub fn with_on_unresolved(mut self, policy: OnUnresolved) -> Self {
		self.on_unresolved = policy;
		self
	}

	/// Names the emitted resolver class (class writer only).
	pub fn with_class_name(mut self, class_name: impl Into<String>) -> Self {
		self.class_name = class_name.into();
		self
	}

	/// Emits the resolver class with an `export` modifier (class writer
	/// only).
	pub fn with_export(mut self, export: bool) -> Self {
		self.export = export;
		self
	}

	/// Controls whether the generated `reverse` throws on an unknown name
	/// or argument set. When disabled it returns `undefined` instead.
	pub fn with_raise_on_not_found(mut self, raise: bool) -> Self {
		self.raise_on_not_found = raise;
		self
	}

	/// Controls whether the emitted resolver accepts a default namespace
	/// prefix at construction time (class writer only).
	pub fn with_namespace_support(mut self, support: bool) -> Self {
		self.namespace_support = support;
		self
	}

	/// Controls whether the generated `reverse` accepts a query map and
	/// appends a query string (class writer only).
	pub fn with_query_support(mut self, support: bool) -> Self {
		self.query_support = support;
		self
	}

	/// Caps verification attempts per route variant.
	pub fn with_try_limit(mut self, limit: usize) -> Self {
		self.try_limit = limit;
		self
	}

	/// Returns the selected code writer.
	pub fn visitor(&self) -> &VisitorKind {
		&self.visitor
	}

	/// Returns the indentation string.
	pub fn indent(&self) -> &str {
		&self.indent
	}

	/// Returns the starting indentation depth.
	pub fn depth(&self) -> usize {
		self.depth
	}

	/// Returns the include prefixes.
	pub fn include(&self) -> &[String] {
		&self.include
	}

	/// Returns the exclude prefixes.
	pub fn exclude(&self) -> &[String] {
		&self.exclude
	}

	/// Returns the unverified-variant policy.
	pub fn on_unresolved(&self) -> OnUnresolved {
		self.on_unresolved
	}

	/// Returns the emitted class name.
	pub fn class_name(&self) -> &str {
		&self.class_name
	}

	/// Returns whether the class is exported.
	pub fn export(&self) -> bool {
		self.export
	}

	/// Returns whether the generated `reverse` throws on failure.
	pub fn raise_on_not_found(&self) -> bool {
		self.raise_on_not_found
	}

	/// Returns whether the emitted resolver supports a default namespace.
	pub fn namespace_support(&self) -> bool {
		self.namespace_support
	}

	/// Returns whether the generated `reverse` supports query maps.
	pub fn query_support(&self) -> bool {
		self.query_support
	}

	/// Returns the per-variant verification attempt budget.
	pub fn try_limit(&self) -> usize {
		self.try_limit
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_defaults() {
		let options = GenerationOptions::new();
		assert!(matches!(options.visitor(), VisitorKind::Class));
		assert_eq!(options.indent(), "\t");
		assert_eq!(options.depth(), 0);
		assert!(options.include().is_empty());
		assert!(options.exclude().is_empty());
		assert_eq!(options.on_unresolved(), OnUnresolved::Raise);
		assert_eq!(options.class_name(), "URLResolver");
		assert!(!options.export());
		assert!(options.raise_on_not_found());
		assert!(options.namespace_support());
		assert!(options.query_support());
		assert_eq!(options.try_limit(), 1 << 14);
	}

	#[test]
	fn test_builder_chain() {
		let options = GenerationOptions::new()
			.with_indent("  ")
			.with_depth(1)
			.with_include(["spa", "blog"])
			.with_exclude(["spa:admin"])
			.with_on_unresolved(OnUnresolved::Skip)
			.with_export(true)
			.with_try_limit(100);
		assert_eq!(options.indent(), "  ");
		assert_eq!(options.depth(), 1);
		assert_eq!(options.include(), ["spa", "blog"]);
		assert_eq!(options.exclude(), ["spa:admin"]);
		assert_eq!(options.on_unresolved(), OnUnresolved::Skip);
		assert!(options.export());
		assert_eq!(options.try_limit(), 100);
	}

	#[test]
	fn test_visitor_kind_debug() {
		assert_eq!(format!("{:?}", VisitorKind::Flat), "Flat");
		assert_eq!(format!("{:?}", VisitorKind::Class), "Class");
	}
}
