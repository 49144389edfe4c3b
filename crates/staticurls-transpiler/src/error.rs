//! Error types for transpilation.

use staticurls_routing::error::RoutingError;
use thiserror::Error;

/// Errors that can occur while building or emitting the route tree.
#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum TranspileError {
	/// The routing configuration itself is invalid.
	#[error("invalid routing configuration: {0}")]
	Routing(#[from] RoutingError),

	/// No placeholder combination survived round-trip verification for a
	/// route variant.
	#[error(
		"unable to verify reversal of '{route}' with arguments {arguments:?}; \
		 register more specific placeholders"
	)]
	UnverifiedRoute {
		/// Qualified name of the route variant.
		route: String,
		/// Argument names the variant captures.
		arguments: Vec<String>,
	},

	/// The per-variant attempt budget ran out before verification finished.
	#[error(
		"hit the limit of {limit} tries while verifying '{route}'; \
		 register more specific placeholders"
	)]
	TryLimitExceeded {
		/// Qualified name of the route variant.
		route: String,
		/// The configured attempt budget.
		limit: usize,
	},

	/// One or more variants failed verification. Failures are collected
	/// across the whole build so one bad route does not mask others.
	#[error("build failed:\n{}", format_failures(.failures))]
	BuildFailed {
		/// The per-variant failures, in tree order.
		failures: Vec<TranspileError>,
	},
}

fn format_failures(failures: &[TranspileError]) -> String {
	failures
		.iter()
		.map(|failure| format!("  {failure}"))
		.collect::<Vec<_>>()
		.join("\n")
}

/// Result type alias for transpilation operations.
pub type TranspileResult<T> = Result<T, TranspileError>;

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_unverified_route_display() {
		let error = TranspileError::UnverifiedRoute {
			route: "spa:qry".to_string(),
			arguments: vec!["toparg".to_string()],
		};
		assert_eq!(
			error.to_string(),
			"unable to verify reversal of 'spa:qry' with arguments [\"toparg\"]; \
			 register more specific placeholders"
		);
	}

	#[rstest]
	fn test_try_limit_display() {
		let error = TranspileError::TryLimitExceeded {
			route: "catch_all".to_string(),
			limit: 100,
		};
		assert_eq!(
			error.to_string(),
			"hit the limit of 100 tries while verifying 'catch_all'; \
			 register more specific placeholders"
		);
	}

	#[rstest]
	fn test_build_failed_aggregates_messages() {
		let error = TranspileError::BuildFailed {
			failures: vec![
				TranspileError::UnverifiedRoute {
					route: "a".to_string(),
					arguments: vec![],
				},
				TranspileError::TryLimitExceeded {
					route: "b".to_string(),
					limit: 10,
				},
			],
		};
		let text = error.to_string();
		assert!(text.starts_with("build failed:\n"));
		assert!(text.contains("'a'"));
		assert!(text.contains("'b'"));
	}

	#[rstest]
	fn test_routing_error_from() {
		let routing = RoutingError::NoReverseMatch {
			name: "missing".to_string(),
		};
		let error: TranspileError = routing.into();
		assert!(matches!(error, TranspileError::Routing(_)));
		assert!(error.to_string().starts_with("invalid routing configuration:"));
	}
}
