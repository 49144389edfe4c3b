//! Transpiles a routing configuration into JavaScript reversal code.
//!
//! Server-side code reverses named routes into concrete paths; client-side
//! code usually cannot, so path strings get hardcoded and drift. This crate
//! closes that gap: it walks a [`RouteConfig`], discovers placeholder
//! values for every route argument, verifies each route by round-trip
//! substitution and resolution through the native
//! [`staticurls_routing::resolver::UrlResolver`], and emits JavaScript
//! whose reversal output matches the native engine exactly.
//!
//! The pipeline, leaves first:
//!
//! - [`placeholders`]: registered example values, resolved per argument in
//!   specificity order.
//! - [`verify`]: the bounded guess-and-check search proving a candidate
//!   tuple reverses unambiguously back to its route.
//! - [`tree`]: builds the namespace tree of verified routes, applying
//!   include/exclude filtering.
//! - [`visitors`]: walks the tree emitting JavaScript; [`FlatWriter`]
//!   produces an object of functions, [`ClassWriter`] a resolver class.
//!
//! # Examples
//!
//! ```
//! use staticurls_routing::converters::ConverterRegistry;
//! use staticurls_routing::route::{Route, RouteConfig};
//! use staticurls_transpiler::{GenerationOptions, PlaceholderRegistry, urls_to_js};
//!
//! let config = RouteConfig::new()
//! 	.route(Route::path("archive/<int:year>/").with_name("archive"));
//!
//! let js = urls_to_js(
//! 	&config,
//! 	&ConverterRegistry::with_defaults(),
//! 	&PlaceholderRegistry::new(),
//! 	&GenerationOptions::new(),
//! )?;
//! assert!(js.contains("reverse(qname, options={}) {"));
//! assert!(js.contains("return `/archive/${kwargs[\"year\"]}/`;"));
//! # Ok::<(), staticurls_transpiler::TranspileError>(())
//! ```

pub mod error;
pub mod options;
pub mod placeholders;
pub mod tree;
pub mod verify;
pub mod visitors;

pub use error::{TranspileError, TranspileResult};
pub use options::{DEFAULT_TRY_LIMIT, GenerationOptions, OnUnresolved, VisitorKind};
pub use placeholders::{PlaceholderRegistry, PlaceholderSpec};
pub use tree::{NamespaceNode, RouteEntry, RouteVariant, TreeBuilder};
pub use verify::{Verification, Verifier};
pub use visitors::{ClassWriter, FlatWriter, LineWriter, RouteVisitor, render};

use tracing::info;

use staticurls_routing::converters::ConverterRegistry;
use staticurls_routing::route::RouteConfig;

/// Builds the verified route tree for `config` and renders it with the
/// visitor selected in `options`.
///
/// # Errors
///
/// Under [`OnUnresolved::Raise`] every verification failure is collected
/// and returned as [`TranspileError::BuildFailed`]; under
/// [`OnUnresolved::Skip`] failing route variants are logged and left out
/// of the generated code instead.
pub fn urls_to_js(
	config: &RouteConfig,
	converters: &ConverterRegistry,
	placeholders: &PlaceholderRegistry,
	options: &GenerationOptions,
) -> TranspileResult<String> {
	let tree = TreeBuilder::new(converters, placeholders, options).build(config)?;
	let mut writer = LineWriter::new(options.indent(), options.depth());
	let mut visitor: Box<dyn RouteVisitor> = match options.visitor() {
		VisitorKind::Flat => Box::new(FlatWriter::new(options)),
		VisitorKind::Class => Box::new(ClassWriter::new(options)),
		VisitorKind::Custom(factory) => factory(options),
	};
	render(&tree, visitor.as_mut(), &mut writer);
	let output = writer.into_output();
	info!(writer = ?options.visitor(), bytes = output.len(), "generated reversal code");
	Ok(output)
}
