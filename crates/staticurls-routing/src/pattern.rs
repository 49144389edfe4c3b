//! Path pattern model.
//!
//! A [`PathPattern`] is the normalized form of one concrete route: an
//! ordered sequence of [`Segment`]s (literal text and typed argument
//! captures) plus any default values bound at the route level. Patterns are
//! parsed from either the template syntax (`archive/<int:year>/`) or a
//! restricted regex syntax (`^archive/(?P<year>[0-9]{4})/$`), and support
//! substitution, full-path matching and composition under include prefixes.

use regex::Regex;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::converters::{ConverterRegistry, compile_full_match};
use crate::error::{RoutingError, RoutingResult};

/// One typed capture in a path pattern.
#[derive(Debug, Clone)]
pub struct ArgumentSpec {
	/// Argument name; `None` for positional captures.
	name: Option<String>,
	/// Position among this pattern's arguments, in path order.
	index: usize,
	/// Converter type name for template captures; regex captures carry
	/// their rule directly.
	converter: Option<String>,
	/// Matching rule source.
	rule: String,
	/// Rule compiled for full-text matching.
	matcher: Regex,
	/// Capture group number in the compiled pattern regex.
	group: usize,
}

impl ArgumentSpec {
	/// Returns the argument name, if this is a named capture.
	pub fn name(&self) -> Option<&str> {
		self.name.as_deref()
	}

	/// Returns the position of this argument among the pattern's arguments.
	pub fn index(&self) -> usize {
		self.index
	}

	/// Returns the converter type name for template captures.
	pub fn converter(&self) -> Option<&str> {
		self.converter.as_deref()
	}

	/// Returns the matching rule source.
	pub fn rule(&self) -> &str {
		&self.rule
	}

	/// Checks whether the full text satisfies this argument's rule.
	pub fn accepts(&self, text: &str) -> bool {
		self.matcher.is_match(text)
	}
}

/// One component of a path pattern.
#[derive(Debug, Clone)]
pub enum Segment {
	/// Literal path text, matched and emitted verbatim.
	Literal(String),
	/// A typed capture substituted at reversal time.
	Argument(ArgumentSpec),
}

/// A parsed route pattern: ordered segments, defaults and the compiled
/// full-path matcher.
///
/// # Examples
///
/// ```
/// use std::collections::BTreeMap;
/// use staticurls_routing::converters::ConverterRegistry;
/// use staticurls_routing::pattern::PathPattern;
///
/// let registry = ConverterRegistry::with_defaults();
/// let pattern = PathPattern::parse(
/// 	"different/<int:arg1>/<str:arg2>",
/// 	BTreeMap::new(),
/// 	&registry,
/// 	"different",
/// )
/// .unwrap();
///
/// let mut values = BTreeMap::new();
/// values.insert("arg1".to_string(), "143".to_string());
/// values.insert("arg2".to_string(), "emma".to_string());
/// assert_eq!(
/// 	pattern.substitute(&values).as_deref(),
/// 	Some("different/143/emma")
/// );
/// ```
#[derive(Debug, Clone)]
pub struct PathPattern {
	/// The pattern source as declared (template or regex form).
	source: String,
	/// Ordered literal and argument segments.
	segments: Vec<Segment>,
	/// Route-level default values, keyed by argument name.
	defaults: BTreeMap<String, Value>,
	/// Composite regex source without anchors.
	regex_source: String,
	/// Compiled matcher over the full path text (no leading slash).
	matcher: Regex,
	/// Number of named arguments.
	named_count: usize,
	/// Number of positional arguments.
	positional_count: usize,
	/// Capture groups nested inside argument rules.
	nested_captures: usize,
}

impl PathPattern {
	/// Parses a template-syntax pattern such as `archive/<int:year>/`.
	///
	/// A capture without a converter (`<year>`) is typed `str`. The `route`
	/// label is used in error messages.
	///
	/// # Errors
	///
	/// Returns [`RoutingError::UnknownConverter`] for an unregistered
	/// converter type and [`RoutingError::InvalidPattern`] for malformed
	/// captures or duplicate argument names.
	pub fn parse(
		source: &str,
		defaults: BTreeMap<String, Value>,
		converters: &ConverterRegistry,
		route: &str,
	) -> RoutingResult<Self> {
		let segments = parse_template(source, converters, route)?;
		Self::from_segments(source.to_string(), segments, defaults)
	}

	/// Parses a regex-syntax pattern such as `^archive/(?P<year>[0-9]{4})/$`.
	///
	/// Leading `^` and trailing `$` anchors are stripped. Top-level content
	/// must be literal text (regex metacharacters escaped with `\`) and
	/// capture groups; each group's body becomes that argument's matching
	/// rule. Groups without a name reverse positionally.
	///
	/// # Errors
	///
	/// Returns [`RoutingError::InvalidPattern`] when the pattern uses regex
	/// features outside the reversible subset.
	pub fn parse_regex(
		source: &str,
		defaults: BTreeMap<String, Value>,
		route: &str,
	) -> RoutingResult<Self> {
		let trimmed = source
			.trim_start_matches('^')
			.trim_end_matches('$')
			.to_string();
		let segments = parse_regex_body(&trimmed, source, route)?;
		Self::from_segments(source.to_string(), segments, defaults)
	}

	/// Builds a pattern by prepending include-prefix patterns to a leaf.
	///
	/// Prefix arguments join the leaf's argument set, in path order. The
	/// leaf's defaults are kept; prefixes carry none.
	pub fn compose(prefixes: &[PathPattern], leaf: &PathPattern) -> RoutingResult<Self> {
		if prefixes.is_empty() {
			return Ok(leaf.clone());
		}
		let mut source = String::new();
		let mut segments = Vec::new();
		for pattern in prefixes.iter().chain(std::iter::once(leaf)) {
			source.push_str(&pattern.source);
			segments.extend(pattern.segments.iter().cloned());
		}
		Self::from_segments(source, segments, leaf.defaults.clone())
	}

	/// Rebuilds derived state (argument indexes, capture group numbers and
	/// the compiled matcher) from a segment sequence.
	fn from_segments(
		source: String,
		segments: Vec<Segment>,
		defaults: BTreeMap<String, Value>,
	) -> RoutingResult<Self> {
		let mut regex_source = String::new();
		let mut rebuilt = Vec::with_capacity(segments.len());
		let mut index = 0;
		let mut group = 1;
		let mut named_count = 0;
		let mut positional_count = 0;
		let mut nested_captures = 0;
		let mut seen = BTreeSet::new();

		for segment in segments {
			match segment {
				Segment::Literal(text) => {
					regex_source.push_str(&regex::escape(&text));
					rebuilt.push(Segment::Literal(text));
				}
				Segment::Argument(mut spec) => {
					if let Some(name) = &spec.name {
						if !seen.insert(name.clone()) {
							return Err(RoutingError::InvalidPattern {
								pattern: source,
								message: format!("duplicate argument name '{name}'"),
							});
						}
						regex_source.push_str(&format!("(?P<{name}>{})", spec.rule));
						named_count += 1;
					} else {
						regex_source.push('(');
						regex_source.push_str(&spec.rule);
						regex_source.push(')');
						positional_count += 1;
					}
					spec.index = index;
					spec.group = group;
					index += 1;
					let nested = count_capture_groups(&spec.rule);
					nested_captures += nested;
					group += 1 + nested;
					rebuilt.push(Segment::Argument(spec));
				}
			}
		}

		let matcher = compile_full_match(&regex_source).map_err(|e| match e {
			RoutingError::InvalidPattern { message, .. } => RoutingError::InvalidPattern {
				pattern: source.clone(),
				message,
			},
			other => other,
		})?;

		Ok(Self {
			source,
			segments: rebuilt,
			defaults,
			regex_source,
			matcher,
			named_count,
			positional_count,
			nested_captures,
		})
	}

	/// Returns the pattern source as declared.
	pub fn source(&self) -> &str {
		&self.source
	}

	/// Returns the composite regex source without anchors, literals
	/// escaped and arguments as capture groups.
	pub fn regex_source(&self) -> &str {
		&self.regex_source
	}

	/// Returns the ordered segments.
	pub fn segments(&self) -> &[Segment] {
		&self.segments
	}

	/// Returns the route-level default values.
	pub fn defaults(&self) -> &BTreeMap<String, Value> {
		&self.defaults
	}

	/// Returns all arguments in path order.
	pub fn arguments(&self) -> impl Iterator<Item = &ArgumentSpec> {
		self.segments.iter().filter_map(|segment| match segment {
			Segment::Argument(spec) => Some(spec),
			Segment::Literal(_) => None,
		})
	}

	/// Returns the names the caller must supply, in path order.
	pub fn expected_arguments(&self) -> Vec<&str> {
		self.arguments().filter_map(ArgumentSpec::name).collect()
	}

	/// Returns the number of positional arguments.
	pub fn positional_arity(&self) -> usize {
		self.positional_count
	}

	/// Returns true when the pattern captures no arguments at all.
	pub fn is_static(&self) -> bool {
		self.named_count == 0 && self.positional_count == 0
	}

	/// Returns true when the pattern mixes named and positional captures.
	/// Such patterns match but cannot be reversed.
	pub fn has_mixed_arguments(&self) -> bool {
		self.named_count > 0 && self.positional_count > 0
	}

	/// Returns the number of capture groups nested inside argument rules.
	pub fn nested_captures(&self) -> usize {
		self.nested_captures
	}

	/// Substitutes named argument values, checking each against its rule.
	///
	/// Returns the path text without a leading slash, or `None` when a
	/// value is missing or violates its rule, or when the pattern is not
	/// reversible by name.
	pub fn substitute(&self, values: &BTreeMap<String, String>) -> Option<String> {
		if self.positional_count > 0 {
			return None;
		}
		let mut path = String::new();
		for segment in &self.segments {
			match segment {
				Segment::Literal(text) => path.push_str(text),
				Segment::Argument(spec) => {
					let name = spec.name.as_deref()?;
					let value = values.get(name)?;
					if !spec.accepts(value) {
						return None;
					}
					path.push_str(value);
				}
			}
		}
		Some(path)
	}

	/// Substitutes positional argument values, checking each against its
	/// rule. Returns `None` for patterns with named captures.
	pub fn substitute_positional(&self, values: &[String]) -> Option<String> {
		if self.named_count > 0 || values.len() != self.positional_count {
			return None;
		}
		let mut path = String::new();
		for segment in &self.segments {
			match segment {
				Segment::Literal(text) => path.push_str(text),
				Segment::Argument(spec) => {
					let value = values.get(spec.index)?;
					if !spec.accepts(value) {
						return None;
					}
					path.push_str(value);
				}
			}
		}
		Some(path)
	}

	/// Checks whether the full path text (no leading slash) matches.
	pub fn is_match(&self, path: &str) -> bool {
		self.matcher.is_match(path)
	}

	/// Matches a path and extracts capture values.
	///
	/// Returns the named captures and the positional captures, in path
	/// order, or `None` when the path does not match.
	pub fn captures(&self, path: &str) -> Option<(BTreeMap<String, String>, Vec<String>)> {
		let caps = self.matcher.captures(path)?;
		let mut named = BTreeMap::new();
		let mut positional = Vec::new();
		for spec in self.arguments() {
			match &spec.name {
				Some(name) => {
					let m = caps.name(name)?;
					named.insert(name.clone(), m.as_str().to_string());
				}
				None => {
					let m = caps.get(spec.group)?;
					positional.push(m.as_str().to_string());
				}
			}
		}
		Some((named, positional))
	}
}

impl fmt::Display for PathPattern {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.source)
	}
}

impl PartialEq for PathPattern {
	fn eq(&self, other: &Self) -> bool {
		self.source == other.source
	}
}

impl Eq for PathPattern {}

/// Parses template syntax into segments.
fn parse_template(
	source: &str,
	converters: &ConverterRegistry,
	route: &str,
) -> RoutingResult<Vec<Segment>> {
	let mut segments = Vec::new();
	let mut literal = String::new();
	let mut chars = source.chars();

	while let Some(c) = chars.next() {
		if c != '<' {
			literal.push(c);
			continue;
		}
		if !literal.is_empty() {
			segments.push(Segment::Literal(std::mem::take(&mut literal)));
		}
		let mut capture = String::new();
		let mut closed = false;
		for next in chars.by_ref() {
			if next == '>' {
				closed = true;
				break;
			}
			capture.push(next);
		}
		if !closed {
			return Err(RoutingError::InvalidPattern {
				pattern: source.to_string(),
				message: "unterminated argument capture".to_string(),
			});
		}
		let (type_name, name) = match capture.split_once(':') {
			Some((type_name, name)) => (type_name, name),
			None => ("str", capture.as_str()),
		};
		if name.is_empty()
			|| !name
				.chars()
				.all(|c| c.is_ascii_alphanumeric() || c == '_')
		{
			return Err(RoutingError::InvalidPattern {
				pattern: source.to_string(),
				message: format!("invalid argument name '{name}'"),
			});
		}
		let converter = converters.require(type_name, route)?;
		segments.push(Segment::Argument(ArgumentSpec {
			name: Some(name.to_string()),
			index: 0,
			converter: Some(type_name.to_string()),
			rule: converter.rule().to_string(),
			matcher: compile_full_match(converter.rule())?,
			group: 0,
		}));
	}
	if !literal.is_empty() {
		segments.push(Segment::Literal(literal));
	}
	Ok(segments)
}

/// Parses the anchored-stripped body of a regex route into segments.
fn parse_regex_body(body: &str, source: &str, route: &str) -> RoutingResult<Vec<Segment>> {
	let invalid = |message: String| RoutingError::InvalidPattern {
		pattern: source.to_string(),
		message,
	};
	let mut segments = Vec::new();
	let mut literal = String::new();
	let mut chars = body.chars().peekable();

	while let Some(c) = chars.next() {
		match c {
			'\\' => {
				let escaped = chars
					.next()
					.ok_or_else(|| invalid("dangling escape".to_string()))?;
				if escaped.is_ascii_alphanumeric() {
					return Err(invalid(format!(
						"escape '\\{escaped}' outside a capture group is not reversible"
					)));
				}
				literal.push(escaped);
			}
			'(' => {
				if !literal.is_empty() {
					segments.push(Segment::Literal(std::mem::take(&mut literal)));
				}
				let group = read_group(&mut chars)
					.ok_or_else(|| invalid("unbalanced group".to_string()))?;
				let (name, rule) = if let Some(rest) = group.strip_prefix("?P<") {
					let (name, rule) = rest
						.split_once('>')
						.ok_or_else(|| invalid("malformed named group".to_string()))?;
					(Some(name.to_string()), rule.to_string())
				} else if group.starts_with('?') {
					return Err(invalid(format!(
						"group '({group})' outside a capture group is not reversible \
						 in route '{route}'"
					)));
				} else {
					(None, group)
				};
				segments.push(Segment::Argument(ArgumentSpec {
					name,
					index: 0,
					converter: None,
					matcher: compile_full_match(&rule)?,
					rule,
					group: 0,
				}));
			}
			'.' | '+' | '*' | '?' | '[' | ']' | '|' | '{' | '}' | ')' => {
				return Err(invalid(format!(
					"metacharacter '{c}' outside a capture group is not reversible"
				)));
			}
			_ => literal.push(c),
		}
	}
	if !literal.is_empty() {
		segments.push(Segment::Literal(literal));
	}
	Ok(segments)
}

/// Reads one parenthesized group body, handling nesting, escapes and
/// character classes. The opening `(` has already been consumed; the
/// closing `)` is consumed but not returned.
fn read_group(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> Option<String> {
	let mut body = String::new();
	let mut depth = 1;
	let mut in_class = false;
	while let Some(c) = chars.next() {
		match c {
			'\\' => {
				body.push(c);
				body.push(chars.next()?);
			}
			'[' if !in_class => {
				in_class = true;
				body.push(c);
			}
			']' if in_class => {
				in_class = false;
				body.push(c);
			}
			'(' if !in_class => {
				depth += 1;
				body.push(c);
			}
			')' if !in_class => {
				depth -= 1;
				if depth == 0 {
					return Some(body);
				}
				body.push(c);
			}
			_ => body.push(c),
		}
	}
	None
}

/// Counts capture groups in a rule source (named or plain, not `(?:`-style
/// non-capturing groups).
fn count_capture_groups(rule: &str) -> usize {
	let mut count = 0;
	let mut in_class = false;
	let mut chars = rule.chars().peekable();
	while let Some(c) = chars.next() {
		match c {
			'\\' => {
				chars.next();
			}
			'[' if !in_class => in_class = true,
			']' if in_class => in_class = false,
			'(' if !in_class => match chars.peek() {
				Some('?') => {
					chars.next();
					// (?P<name>...) captures; (?:...), (?=...) etc. do not.
					if chars.peek() == Some(&'P') {
						count += 1;
					}
				}
				_ => count += 1,
			},
			_ => {}
		}
	}
	count
}
