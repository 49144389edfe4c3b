//! Placeholder registration and candidate resolution.
//!
//! Reversal verification needs example values to substitute into route
//! arguments. A [`PlaceholderRegistry`] collects registered
//! [`PlaceholderSpec`]s and, for a given argument, yields candidate values
//! ordered most specific first: a value registered for this argument name,
//! converter type and app scope outranks one registered for the name and
//! scope, which outranks a converter-wide value, which outranks a bare
//! name-wide one. Every candidate sequence is terminated by a built-in
//! fallback list so unregistered arguments still have a fighting chance.

use once_cell::sync::Lazy;
use serde_json::{Value, json};
use staticurls_routing::converters::{self, Converter};

/// Generic values tried for every argument after all registered
/// candidates. Chosen to satisfy the common converter rules out of the
/// box: integers, short strings, a slug-safe uppercase letter, a UUID and
/// an ISO date.
static FALLBACKS: Lazy<Vec<Value>> = Lazy::new(|| {
	vec![
		json!(0),
		json!("a"),
		json!(1),
		json!("A"),
		json!("aaaaaaaa-aaaa-aaaa-aaaa-aaaaaaaaaaaa"),
		json!("2006-01-02"),
	]
});

/// One registered placeholder value with its applicability keys.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use staticurls_transpiler::placeholders::PlaceholderSpec;
///
/// let spec = PlaceholderSpec::named("year", json!(1999))
/// 	.for_converter("int")
/// 	.for_scope("blog");
/// assert_eq!(spec.name(), Some("year"));
/// ```
#[derive(Debug, Clone)]
pub struct PlaceholderSpec {
	name: Option<String>,
	converter: Option<String>,
	scope: Option<String>,
	value: Value,
}

impl PlaceholderSpec {
	/// Registers a value for an argument name.
	pub fn named(name: impl Into<String>, value: Value) -> Self {
		Self {
			name: Some(name.into()),
			converter: None,
			scope: None,
			value,
		}
	}

	/// Registers a value for every argument of a converter type,
	/// regardless of name.
	pub fn for_converter_type(type_name: impl Into<String>, value: Value) -> Self {
		Self {
			name: None,
			converter: Some(type_name.into()),
			scope: None,
			value,
		}
	}

	/// Narrows a named registration to arguments of a converter type.
	pub fn for_converter(mut self, type_name: impl Into<String>) -> Self {
		self.converter = Some(type_name.into());
		self
	}

	/// Narrows the registration to routes under an app scope.
	pub fn for_scope(mut self, scope: impl Into<String>) -> Self {
		self.scope = Some(scope.into());
		self
	}

	/// Returns the argument name this registration applies to, if any.
	pub fn name(&self) -> Option<&str> {
		self.name.as_deref()
	}

	/// Returns the converter type this registration applies to, if any.
	pub fn converter(&self) -> Option<&str> {
		self.converter.as_deref()
	}

	/// Returns the app scope this registration applies to, if any.
	pub fn scope(&self) -> Option<&str> {
		self.scope.as_deref()
	}

	/// Returns the registered value.
	pub fn value(&self) -> &Value {
		&self.value
	}
}

/// Positional placeholder values for one route's unnamed captures.
#[derive(Debug, Clone)]
struct UnnamedSpec {
	route: String,
	scope: Option<String>,
	values: Vec<Value>,
}

/// Collects placeholder registrations and resolves ordered candidate
/// sequences per argument. Read-only once verification begins.
#[derive(Debug, Clone, Default)]
pub struct PlaceholderRegistry {
	specs: Vec<PlaceholderSpec>,
	unnamed: Vec<UnnamedSpec>,
}

impl PlaceholderRegistry {
	/// Creates an empty registry.
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers a placeholder.
	pub fn register(&mut self, spec: PlaceholderSpec) {
		self.specs.push(spec);
	}

	/// Registers positional placeholders for a route's unnamed captures,
	/// matched by index.
	pub fn register_unnamed(&mut self, route: impl Into<String>, values: Vec<Value>) {
		self.unnamed.push(UnnamedSpec {
			route: route.into(),
			scope: None,
			values,
		});
	}

	/// Registers positional placeholders scoped to an app.
	pub fn register_unnamed_scoped(
		&mut self,
		route: impl Into<String>,
		scope: impl Into<String>,
		values: Vec<Value>,
	) {
		self.unnamed.push(UnnamedSpec {
			route: route.into(),
			scope: Some(scope.into()),
			values,
		});
	}

	/// Resolves the candidate values for a named argument, most specific
	/// first, terminated by the built-in fallbacks.
	///
	/// Specificity tiers: name + converter + scope, then name + scope,
	/// then name + converter, then converter-wide registrations followed
	/// by the converter's own default placeholder, then name-wide
	/// registrations. Registrations carrying a scope other than `scope`
	/// never apply. Within a tier, registration order is kept; duplicate
	/// substitution texts are dropped.
	pub fn candidates_for(
		&self,
		name: &str,
		converter: Option<&Converter>,
		scope: Option<&str>,
	) -> Vec<Value> {
		let type_name = converter.map(Converter::type_name);
		let name_matches = |spec: &PlaceholderSpec| spec.name.as_deref() == Some(name);
		let converter_matches = |spec: &PlaceholderSpec| {
			spec.converter.is_some() && spec.converter.as_deref() == type_name
		};
		let scope_matches = |spec: &PlaceholderSpec| {
			spec.scope.is_some() && spec.scope.as_deref() == scope
		};

		let mut candidates = Vec::new();
		self.push_matching(
			|spec| name_matches(spec) && converter_matches(spec) && scope_matches(spec),
			&mut candidates,
		);
		self.push_matching(
			|spec| name_matches(spec) && spec.converter.is_none() && scope_matches(spec),
			&mut candidates,
		);
		self.push_matching(
			|spec| name_matches(spec) && converter_matches(spec) && spec.scope.is_none(),
			&mut candidates,
		);
		self.push_matching(
			|spec| spec.name.is_none() && converter_matches(spec) && spec.scope.is_none(),
			&mut candidates,
		);
		if let Some(converter) = converter {
			candidates.push(converter.placeholder().clone());
		}
		self.push_matching(
			|spec| name_matches(spec) && spec.converter.is_none() && spec.scope.is_none(),
			&mut candidates,
		);
		candidates.extend(FALLBACKS.iter().cloned());
		dedup_by_text(candidates)
	}

	/// Appends the values of all registrations accepted by `keep`, in
	/// registration order.
	fn push_matching(&self, keep: impl Fn(&PlaceholderSpec) -> bool, out: &mut Vec<Value>) {
		for spec in self.specs.iter().filter(|spec| keep(spec)) {
			out.push(spec.value.clone());
		}
	}

	/// Resolves the candidate values for one unnamed capture of a route,
	/// matched positionally, terminated by the built-in fallbacks.
	pub fn unnamed_candidates(
		&self,
		route: &str,
		index: usize,
		scope: Option<&str>,
	) -> Vec<Value> {
		let mut candidates = Vec::new();
		let matching = |want_scope: bool| {
			self.unnamed.iter().filter(move |spec| {
				spec.route == route
					&& if want_scope {
						spec.scope.is_some() && spec.scope.as_deref() == scope
					} else {
						spec.scope.is_none()
					}
			})
		};
		for spec in matching(true).chain(matching(false)) {
			if let Some(value) = spec.values.get(index) {
				candidates.push(value.clone());
			}
		}
		candidates.extend(FALLBACKS.iter().cloned());
		dedup_by_text(candidates)
	}
}

/// Drops later candidates whose substitution text duplicates an earlier
/// one. Two values substituting identically would only burn tries.
fn dedup_by_text(candidates: Vec<Value>) -> Vec<Value> {
	let mut seen = std::collections::BTreeSet::new();
	candidates
		.into_iter()
		.filter(|value| seen.insert(converters::to_text(value)))
		.collect()
}
