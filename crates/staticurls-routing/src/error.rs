//! Routing error types.

use thiserror::Error;

/// Result type for routing operations.
pub type RoutingResult<T> = Result<T, RoutingError>;

/// Errors raised while parsing route definitions or resolving URLs.
#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum RoutingError {
	/// A route argument declares a converter type that is not registered.
	#[error("unknown converter type '{converter}' in route '{route}'")]
	UnknownConverter {
		/// The undeclared converter type name.
		converter: String,
		/// The route using the converter.
		route: String,
	},

	/// A route pattern could not be parsed or compiled.
	#[error("invalid pattern '{pattern}': {message}")]
	InvalidPattern {
		/// The offending pattern source.
		pattern: String,
		/// What went wrong.
		message: String,
	},

	/// No registered route variant reverses the given name and arguments.
	#[error("no reversal match for '{name}'")]
	NoReverseMatch {
		/// The qualified route name that was looked up.
		name: String,
	},
}
