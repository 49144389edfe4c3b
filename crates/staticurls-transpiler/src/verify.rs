//! Reversal verification: guess-and-check over placeholder candidates.
//!
//! Before a route variant is emitted, we prove that the path template the
//! generated code will produce is actually owned by that variant. For each
//! argument we take the ordered candidate values from the
//! [`PlaceholderRegistry`], enumerate the cartesian product most specific
//! combination first, substitute into the pattern and resolve the
//! resulting path through the native [`UrlResolver`]. A candidate tuple is
//! accepted only when resolution maps the path back to the same qualified
//! name and the same values, and the native reversal of that name
//! reproduces the path byte for byte.
//!
//! The product is `O(n^p)` in the candidate count `n` and argument count
//! `p`, so a per-variant try limit bounds the search. Values that fail an
//! argument's matching rule are discarded up front and never consume a
//! try; only substitution-and-resolution attempts count.

use std::collections::BTreeMap;
use tracing::trace;

use staticurls_routing::converters::{self, ConverterRegistry};
use staticurls_routing::pattern::PathPattern;
use staticurls_routing::resolver::UrlResolver;

use crate::error::{TranspileError, TranspileResult};
use crate::placeholders::PlaceholderRegistry;

/// The outcome of verifying one route variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verification {
	/// A candidate tuple substituted and round-tripped. The values are
	/// recorded for diagnostics; emission only needs the fact.
	Verified {
		/// Verified values for named arguments.
		kwargs: BTreeMap<String, String>,
		/// Verified values for positional arguments, in path order.
		args: Vec<String>,
	},
	/// Every round-tripping tuple reversed to an earlier variant's path:
	/// this variant can never win and is emitted as a comment.
	Shadowed,
	/// The pattern mixes named and positional captures and cannot be
	/// reversed at all; emitted as a breadcrumb comment.
	Unreversible,
}

/// Verifies route variants against the native resolver.
pub struct Verifier<'a> {
	resolver: &'a UrlResolver,
	converters: &'a ConverterRegistry,
	placeholders: &'a PlaceholderRegistry,
	try_limit: usize,
}

impl<'a> Verifier<'a> {
	/// Creates a verifier with a per-variant attempt budget.
	pub fn new(
		resolver: &'a UrlResolver,
		converters: &'a ConverterRegistry,
		placeholders: &'a PlaceholderRegistry,
		try_limit: usize,
	) -> Self {
		Self {
			resolver,
			converters,
			placeholders,
			try_limit,
		}
	}

	/// Verifies one variant of the route `qname`.
	///
	/// `local_name` is the route's unqualified name, used for positional
	/// placeholder lookup; `scope` is the innermost app scope, used for
	/// scoped placeholder lookup.
	///
	/// # Errors
	///
	/// Returns [`TranspileError::UnverifiedRoute`] when every candidate
	/// tuple is rejected and [`TranspileError::TryLimitExceeded`] when the
	/// attempt budget runs out first.
	pub fn verify(
		&self,
		qname: &str,
		local_name: &str,
		scope: Option<&str>,
		pattern: &PathPattern,
	) -> TranspileResult<Verification> {
		if pattern.has_mixed_arguments() {
			return Ok(Verification::Unreversible);
		}
		if pattern.is_static() {
			return Ok(self.check_static(qname, pattern));
		}
		if pattern.positional_arity() > 0 {
			self.search_positional(qname, local_name, scope, pattern)
		} else {
			self.search_named(qname, scope, pattern)
		}
	}

	/// A pattern without arguments is trivially verified; only shadowing
	/// by an earlier variant of the same name remains possible.
	fn check_static(&self, qname: &str, pattern: &PathPattern) -> Verification {
		// Static substitution cannot fail.
		let path = match pattern.substitute(&BTreeMap::new()) {
			Some(raw) => format!("/{raw}"),
			None => return Verification::Shadowed,
		};
		match self.resolver.reverse(qname, &BTreeMap::new()) {
			Ok(native) if native == path => Verification::Verified {
				kwargs: BTreeMap::new(),
				args: Vec::new(),
			},
			_ => Verification::Shadowed,
		}
	}

	fn search_named(
		&self,
		qname: &str,
		scope: Option<&str>,
		pattern: &PathPattern,
	) -> TranspileResult<Verification> {
		let params: Vec<&str> = pattern.expected_arguments();
		let defaults = pattern.defaults();

		// Per-argument candidate texts, rule-filtered. An argument bound
		// to a route default is pinned to that value; the native
		// reversal would overrule anything else anyway.
		let mut lists: Vec<Vec<String>> = Vec::with_capacity(params.len());
		for spec in pattern.arguments() {
			let name = match spec.name() {
				Some(name) => name,
				None => continue,
			};
			let candidates = match defaults.get(name) {
				Some(default) => vec![converters::to_text(default)],
				None => {
					let converter = spec.converter().and_then(|t| self.converters.get(t));
					self.placeholders
						.candidates_for(name, converter, scope)
						.iter()
						.map(converters::to_text)
						.collect()
				}
			};
			lists.push(
				candidates
					.into_iter()
					.filter(|text| spec.accepts(text))
					.collect(),
			);
		}

		let mut shadowed = false;
		let mut tries = 0;
		let mut product = Product::new(&lists);
		while let Some(choice) = product.next_tuple() {
			if tries == self.try_limit {
				return Err(TranspileError::TryLimitExceeded {
					route: qname.to_string(),
					limit: self.try_limit,
				});
			}
			tries += 1;

			let subs: BTreeMap<String, String> = params
				.iter()
				.zip(choice.iter())
				.map(|(param, value)| (param.to_string(), (*value).clone()))
				.collect();
			let path = match pattern.substitute(&subs) {
				Some(raw) => format!("/{raw}"),
				None => continue,
			};
			trace!(route = qname, %path, tries, "checking candidate tuple");

			// Another route claiming the path rejects this tuple.
			match self.resolver.resolve(&path) {
				Some(resolved)
					if resolved.name.as_deref() == Some(qname)
						&& resolved.args.is_empty()
						&& resolved.kwargs == subs => {}
				_ => continue,
			}

			// Native reversal must reproduce the path; an earlier variant
			// of the same name winning instead means this one is dead.
			let mut full = subs.clone();
			for (key, value) in defaults {
				full.entry(key.clone())
					.or_insert_with(|| converters::to_text(value));
			}
			match self.resolver.reverse(qname, &full) {
				Ok(native) if native == path => {
					return Ok(Verification::Verified {
						kwargs: subs,
						args: Vec::new(),
					});
				}
				_ => shadowed = true,
			}
		}

		if shadowed {
			Ok(Verification::Shadowed)
		} else {
			Err(TranspileError::UnverifiedRoute {
				route: qname.to_string(),
				arguments: params.iter().map(|p| p.to_string()).collect(),
			})
		}
	}

	fn search_positional(
		&self,
		qname: &str,
		local_name: &str,
		scope: Option<&str>,
		pattern: &PathPattern,
	) -> TranspileResult<Verification> {
		let mut lists: Vec<Vec<String>> = Vec::with_capacity(pattern.positional_arity());
		for spec in pattern.arguments() {
			if spec.name().is_some() {
				continue;
			}
			let candidates = self
				.placeholders
				.unnamed_candidates(local_name, spec.index(), scope);
			lists.push(
				candidates
					.iter()
					.map(converters::to_text)
					.filter(|text| spec.accepts(text))
					.collect(),
			);
		}

		let mut shadowed = false;
		let mut tries = 0;
		let mut product = Product::new(&lists);
		while let Some(choice) = product.next_tuple() {
			if tries == self.try_limit {
				return Err(TranspileError::TryLimitExceeded {
					route: qname.to_string(),
					limit: self.try_limit,
				});
			}
			tries += 1;

			let args: Vec<String> = choice.iter().map(|value| (*value).clone()).collect();
			let path = match pattern.substitute_positional(&args) {
				Some(raw) => format!("/{raw}"),
				None => continue,
			};
			trace!(route = qname, %path, tries, "checking candidate tuple");

			match self.resolver.resolve(&path) {
				Some(resolved)
					if resolved.name.as_deref() == Some(qname)
						&& resolved.kwargs.is_empty()
						&& resolved.args == args => {}
				_ => continue,
			}

			match self.resolver.reverse_positional(qname, &args) {
				Ok(native) if native == path => {
					return Ok(Verification::Verified {
						kwargs: BTreeMap::new(),
						args,
					});
				}
				_ => shadowed = true,
			}
		}

		if shadowed {
			Ok(Verification::Shadowed)
		} else {
			Err(TranspileError::UnverifiedRoute {
				route: qname.to_string(),
				arguments: (0..pattern.positional_arity())
					.map(|index| index.to_string())
					.collect(),
			})
		}
	}
}

/// Odometer over per-argument candidate lists. The last argument varies
/// fastest, so combinations are visited in lexicographic order of the
/// per-argument priority indexes: most specific combinations first.
struct Product<'a> {
	lists: &'a [Vec<String>],
	indexes: Vec<usize>,
	done: bool,
}

impl<'a> Product<'a> {
	fn new(lists: &'a [Vec<String>]) -> Self {
		let done = lists.is_empty() || lists.iter().any(Vec::is_empty);
		Self {
			lists,
			indexes: vec![0; lists.len()],
			done,
		}
	}

	fn next_tuple(&mut self) -> Option<Vec<&'a String>> {
		if self.done {
			return None;
		}
		let tuple = self
			.lists
			.iter()
			.zip(self.indexes.iter())
			.map(|(list, &index)| &list[index])
			.collect();
		// Advance from the rightmost position.
		let mut position = self.indexes.len();
		loop {
			if position == 0 {
				self.done = true;
				break;
			}
			position -= 1;
			self.indexes[position] += 1;
			if self.indexes[position] < self.lists[position].len() {
				break;
			}
			self.indexes[position] = 0;
		}
		Some(tuple)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::placeholders::PlaceholderSpec;
	use serde_json::json;
	use staticurls_routing::route::{Route, RouteConfig};

	const LIMIT: usize = 1 << 14;

	struct Fixture {
		resolver: UrlResolver,
		converters: ConverterRegistry,
		placeholders: PlaceholderRegistry,
	}

	impl Fixture {
		fn new(config: &RouteConfig) -> Self {
			let converters = ConverterRegistry::with_defaults();
			let resolver = UrlResolver::new(config, &converters);
			Self {
				resolver,
				converters,
				placeholders: PlaceholderRegistry::new(),
			}
		}

		fn verify(&self, qname: &str, pattern: &PathPattern) -> TranspileResult<Verification> {
			self.verify_with_limit(qname, pattern, LIMIT)
		}

		fn verify_with_limit(
			&self,
			qname: &str,
			pattern: &PathPattern,
			limit: usize,
		) -> TranspileResult<Verification> {
			let verifier =
				Verifier::new(&self.resolver, &self.converters, &self.placeholders, limit);
			verifier.verify(qname, qname, None, pattern)
		}
	}

	fn compile(route: &Route) -> PathPattern {
		route.compile(&ConverterRegistry::with_defaults()).unwrap()
	}

	#[test]
	fn test_static_pattern_is_trivially_verified() {
		let route = Route::path("simple/").with_name("simple");
		let config = RouteConfig::new().route(route.clone());
		let outcome = Fixture::new(&config).verify("simple", &compile(&route)).unwrap();
		assert_eq!(
			outcome,
			Verification::Verified {
				kwargs: BTreeMap::new(),
				args: Vec::new(),
			}
		);
	}

	#[test]
	fn test_converter_placeholder_verifies_unregistered_argument() {
		let route = Route::path("simple/<int:arg1>").with_name("simple");
		let config = RouteConfig::new().route(route.clone());
		let outcome = Fixture::new(&config).verify("simple", &compile(&route)).unwrap();
		match outcome {
			Verification::Verified { kwargs, .. } => {
				// The int converter's own placeholder outranks the
				// generic fallbacks.
				assert_eq!(kwargs.get("arg1").map(String::as_str), Some("1"));
			}
			other => panic!("expected verification, got {other:?}"),
		}
	}

	#[test]
	fn test_registered_placeholder_is_preferred() {
		let route = Route::path("simple/<int:arg1>").with_name("simple");
		let config = RouteConfig::new().route(route.clone());
		let mut fixture = Fixture::new(&config);
		fixture
			.placeholders
			.register(PlaceholderSpec::named("arg1", json!(143)));
		let outcome = fixture.verify("simple", &compile(&route)).unwrap();
		match outcome {
			Verification::Verified { kwargs, .. } => {
				assert_eq!(kwargs.get("arg1").map(String::as_str), Some("143"));
			}
			other => panic!("expected verification, got {other:?}"),
		}
	}

	#[test]
	fn test_path_claimed_by_earlier_route_fails_verification() {
		// Every int value also satisfies the str route declared first, so
		// resolution never maps back to the later name.
		let first = Route::path("x/<str:a>/").with_name("first");
		let second = Route::path("x/<int:a>/").with_name("second");
		let config = RouteConfig::new().route(first).route(second.clone());
		let err = Fixture::new(&config)
			.verify("second", &compile(&second))
			.unwrap_err();
		assert!(matches!(err, TranspileError::UnverifiedRoute { .. }));
	}

	#[test]
	fn test_try_limit_is_enforced() {
		let first = Route::path("x/<str:a>/").with_name("first");
		let second = Route::path("x/<int:a>/").with_name("second");
		let config = RouteConfig::new().route(first).route(second.clone());
		let err = Fixture::new(&config)
			.verify_with_limit("second", &compile(&second), 1)
			.unwrap_err();
		assert!(matches!(
			err,
			TranspileError::TryLimitExceeded { limit: 1, .. }
		));
	}

	#[test]
	fn test_shadowed_static_variant() {
		let first = Route::path("order1/").with_name("order");
		let second = Route::path("order2/").with_name("order");
		let config = RouteConfig::new().route(first).route(second.clone());
		let outcome = Fixture::new(&config).verify("order", &compile(&second)).unwrap();
		assert_eq!(outcome, Verification::Shadowed);
	}

	#[test]
	fn test_shadowed_parameterized_variant() {
		// Identical argument shape: the earlier declaration wins every
		// reversal, the later one can never produce a path.
		let first = Route::path("order3/<str:kwarg1>").with_name("order");
		let second = Route::path("order4/<str:kwarg1>").with_name("order");
		let config = RouteConfig::new().route(first).route(second.clone());
		let outcome = Fixture::new(&config).verify("order", &compile(&second)).unwrap();
		assert_eq!(outcome, Verification::Shadowed);
	}

	#[test]
	fn test_mixed_captures_are_unreversible() {
		let route = Route::regex(r"^mixed/(?P<named>\d+)/(\w+)$").with_name("mixed");
		let config = RouteConfig::new().route(route.clone());
		let outcome = Fixture::new(&config).verify("mixed", &compile(&route)).unwrap();
		assert_eq!(outcome, Verification::Unreversible);
	}

	#[test]
	fn test_default_pins_captured_argument() {
		let route = Route::path("prefix_int/<int:url_param>/postfix_int/<int:kwarg_param>")
			.with_name("bug65")
			.with_default("kwarg_param", json!(1));
		let config = RouteConfig::new().route(route.clone());
		let outcome = Fixture::new(&config).verify("bug65", &compile(&route)).unwrap();
		match outcome {
			Verification::Verified { kwargs, .. } => {
				assert_eq!(kwargs.get("kwarg_param").map(String::as_str), Some("1"));
				assert_eq!(kwargs.get("url_param").map(String::as_str), Some("1"));
			}
			other => panic!("expected verification, got {other:?}"),
		}
	}

	#[test]
	fn test_non_capture_default_is_carried_through_reversal() {
		let route = Route::path("bug65/<int:url_param>")
			.with_name("bug65")
			.with_default("extra", json!("flag"));
		let config = RouteConfig::new().route(route.clone());
		let outcome = Fixture::new(&config).verify("bug65", &compile(&route)).unwrap();
		assert!(matches!(outcome, Verification::Verified { .. }));
	}

	#[test]
	fn test_positional_arguments_verify() {
		let route = Route::regex(r"^re_path/unamed/(\d+)/([\w-]+)$").with_name("unnamed");
		let config = RouteConfig::new().route(route.clone());
		let mut fixture = Fixture::new(&config);
		fixture
			.placeholders
			.register_unnamed("unnamed", vec![json!(42), json!("wide")]);
		let outcome = fixture.verify("unnamed", &compile(&route)).unwrap();
		assert_eq!(
			outcome,
			Verification::Verified {
				kwargs: BTreeMap::new(),
				args: vec!["42".to_string(), "wide".to_string()],
			}
		);
	}

	#[test]
	fn test_product_orders_most_specific_first() {
		let lists = vec![
			vec!["a0".to_string(), "a1".to_string()],
			vec!["b0".to_string(), "b1".to_string()],
		];
		let mut product = Product::new(&lists);
		let mut seen = Vec::new();
		while let Some(tuple) = product.next_tuple() {
			seen.push(tuple.iter().map(|s| s.as_str()).collect::<Vec<_>>().join("/"));
		}
		assert_eq!(seen, vec!["a0/b0", "a0/b1", "a1/b0", "a1/b1"]);
	}
}
