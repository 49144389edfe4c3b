//! # staticurls
//!
//! Transpile URL routing configuration into client-side JavaScript
//! reversal code.
//!
//! Declare routes once, server-side, and generate a JavaScript resolver
//! that reproduces the native reversal semantics exactly: the same
//! qualified name and arguments produce the same path string in both
//! worlds. Every generated route is verified up front by substituting
//! placeholder values and round-tripping them through the native
//! resolver, so a route that would reverse ambiguously fails the build
//! instead of silently misbehaving in the browser.
//!
//! This crate is a unified interface over the workspace crates:
//!
//! - `staticurls-routing`: the routing configuration model, path
//!   patterns, converters and the native resolver.
//! - `staticurls-transpiler`: placeholder resolution, reversal
//!   verification, tree building and the JavaScript writers.
//!
//! ## Examples
//!
//! ```
//! use staticurls::prelude::*;
//!
//! let config = RouteConfig::new()
//! 	.route(Route::path("").with_name("index"))
//! 	.route(Route::path("archive/<int:year>/").with_name("archive"));
//!
//! let js = urls_to_js(
//! 	&config,
//! 	&ConverterRegistry::with_defaults(),
//! 	&PlaceholderRegistry::new(),
//! 	&GenerationOptions::new().with_class_name("UrlResolver"),
//! )?;
//! assert!(js.contains("class UrlResolver {"));
//! # Ok::<(), staticurls::transpiler::TranspileError>(())
//! ```

pub use staticurls_routing as routing;
pub use staticurls_transpiler as transpiler;

// Re-export commonly used types
pub mod prelude {
	pub use staticurls_routing::{
		Converter, ConverterRegistry, Include, PathPattern, Route, RouteConfig, RoutingError,
		UrlResolver,
	};
	pub use staticurls_transpiler::{
		GenerationOptions, OnUnresolved, PlaceholderRegistry, PlaceholderSpec, TranspileError,
		VisitorKind, urls_to_js,
	};
}
