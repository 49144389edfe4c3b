//! Routing configuration, path resolution and reversal.
//!
//! This crate models a hierarchical URL routing configuration and provides
//! the native engine over it:
//!
//! - [`route`]: the configuration model ([`Route`], [`Include`],
//!   [`RouteConfig`]) with declaration order preserved throughout.
//! - [`pattern`]: parsed path patterns with typed captures, substitution
//!   and full-path matching.
//! - [`converters`]: the registry mapping capture type names to matching
//!   rules and placeholder values.
//! - [`resolver`]: [`UrlResolver`], which resolves paths to routes and
//!   reverses qualified names to paths, first declared match winning.
//!
//! # Examples
//!
//! ```
//! use std::collections::BTreeMap;
//! use staticurls_routing::converters::ConverterRegistry;
//! use staticurls_routing::resolver::UrlResolver;
//! use staticurls_routing::route::{Include, Route, RouteConfig};
//!
//! let posts = RouteConfig::new()
//! 	.route(Route::path("archive/<int:year>/").with_name("archive"));
//! let config = RouteConfig::new()
//! 	.route(Route::path("").with_name("index"))
//! 	.include(Include::new(posts).with_prefix("posts/").with_namespace("posts"));
//!
//! let resolver = UrlResolver::new(&config, &ConverterRegistry::with_defaults());
//! let mut kwargs = BTreeMap::new();
//! kwargs.insert("year".to_string(), "2024".to_string());
//! assert_eq!(
//! 	resolver.reverse("posts:archive", &kwargs).unwrap(),
//! 	"/posts/archive/2024/"
//! );
//! ```

pub mod converters;
pub mod error;
pub mod pattern;
pub mod resolver;
pub mod route;

pub use converters::{Converter, ConverterRegistry};
pub use error::{RoutingError, RoutingResult};
pub use pattern::{ArgumentSpec, PathPattern, Segment};
pub use resolver::{ResolvedRoute, UrlResolver};
pub use route::{ConfigEntry, Include, PatternKind, Route, RouteConfig};
