// Generated resolver-class output: structure, variant matching and
// equivalence with the native resolver.

use std::collections::BTreeMap;

use regex::{Captures, Regex};
use serde_json::json;
use staticurls::prelude::*;

fn kwargs(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
	pairs
		.iter()
		.map(|(k, v)| (k.to_string(), v.to_string()))
		.collect()
}

fn sample_config() -> RouteConfig {
	RouteConfig::new()
		.route(Route::path("simple/").with_name("simple"))
		.route(Route::path("simple/<int:arg1>/").with_name("simple"))
		.route(Route::path("different/<int:arg1>/<str:arg2>").with_name("different"))
}

fn generate(config: &RouteConfig, options: &GenerationOptions) -> String {
	urls_to_js(
		config,
		&ConverterRegistry::with_defaults(),
		&PlaceholderRegistry::new(),
		options,
	)
	.expect("generation should succeed")
}

// Pulls the template literal of the first emitted `return` whose path
// starts with `prefix`.
fn extract_template(js: &str, prefix: &str) -> String {
	let needle = format!("return `{prefix}");
	let start = js.find(&needle).expect("template not emitted");
	let rest = &js[start + "return `".len()..];
	let end = rest.find('`').expect("unterminated template");
	rest[..end].to_string()
}

// Substitutes kwargs/args into an extracted template the way the
// generated JavaScript would.
fn substitute_template(template: &str, kwargs: &BTreeMap<String, String>, args: &[&str]) -> String {
	let subst = Regex::new(r#"\$\{kwargs\["([^"]+)"\]\}|\$\{args\[(\d+)\]\}"#).unwrap();
	subst
		.replace_all(template, |caps: &Captures| {
			if let Some(name) = caps.get(1) {
				kwargs[name.as_str()].clone()
			} else {
				args[caps[2].parse::<usize>().unwrap()].to_string()
			}
		})
		.into_owned()
}

// Test: both variants of "simple" are emitted, zero-argument first, so
// the generated function tries them in declaration order.
#[test]
fn test_variant_precedence_order() {
	let js = generate(&sample_config(), &GenerationOptions::new());

	let zero_arg = js
		.find("if (this.#match(kwargs, args)) { return \"/simple/\"; }")
		.expect("zero-argument variant missing");
	let one_arg = js
		.find("if (this.#match(kwargs, args, ['arg1'])) { return `/simple/${kwargs[\"arg1\"]}/`; }")
		.expect("one-argument variant missing");
	assert!(zero_arg < one_arg);
}

// Test: substituting the same arguments into the emitted template and
// into the native resolver produces the same path.
#[test]
fn test_generated_matches_native_reversal() {
	let config = sample_config();
	let converters = ConverterRegistry::with_defaults();
	let resolver = UrlResolver::new(&config, &converters);
	let js = generate(&config, &GenerationOptions::new());

	let values = kwargs(&[("arg1", "143"), ("arg2", "emma")]);
	let template = extract_template(&js, "/different/");
	assert_eq!(
		substitute_template(&template, &values, &[]),
		resolver.reverse("different", &values).unwrap()
	);

	let single = kwargs(&[("arg1", "5")]);
	let template = extract_template(&js, "/simple/");
	assert_eq!(
		substitute_template(&template, &single, &[]),
		resolver.reverse("simple", &single).unwrap()
	);

	assert!(js.contains("{ return \"/simple/\"; }"));
	assert_eq!(
		resolver.reverse("simple", &BTreeMap::new()).unwrap(),
		"/simple/"
	);
}

// Test: positional arguments round-trip through the emitted template the
// same way named ones do.
#[test]
fn test_generated_matches_native_positional() {
	let config =
		RouteConfig::new().route(Route::regex("^unnamed/([0-9]+)/([a-z]+)/$").with_name("unnamed"));
	let converters = ConverterRegistry::with_defaults();
	let resolver = UrlResolver::new(&config, &converters);
	let js = generate(&config, &GenerationOptions::new());

	let args = vec!["17".to_string(), "abc".to_string()];
	let template = extract_template(&js, "/unnamed/");
	assert_eq!(
		substitute_template(&template, &BTreeMap::new(), &["17", "abc"]),
		resolver.reverse_positional("unnamed", &args).unwrap()
	);
}

// Test: the emitted reverse() carries the full query-serialization
// machinery: URLSearchParams, null/empty skipping, array expansion and a
// single-trailing-slash strip before `?`.
#[test]
fn test_query_serialization_machinery() {
	let config = sample_config();
	let converters = ConverterRegistry::with_defaults();
	let resolver = UrlResolver::new(&config, &converters);
	let js = generate(&config, &GenerationOptions::new());

	// The base path the query string gets appended to.
	assert_eq!(
		resolver
			.reverse("different", &kwargs(&[("arg1", "143"), ("arg2", "emma")]))
			.unwrap(),
		"/different/143/emma"
	);

	assert!(js.contains("const query = options.query || {};"));
	assert!(js.contains("const params = new URLSearchParams();"));
	assert!(js.contains("if (value === null || value === '') continue;"));
	assert!(
		js.contains("if (Array.isArray(value)) value.forEach(element => params.append(key, element));")
	);
	assert!(js.contains("else params.append(key, value);"));
	assert!(js.contains(r"if (qryStr) return `${pth.replace(/\/$/, '')}?${qryStr}`;"));
}

// Test: two runs over identical input produce byte-identical output.
#[test]
fn test_determinism() {
	let options = GenerationOptions::new();
	let first = generate(&sample_config(), &options);
	let second = generate(&sample_config(), &options);
	assert_eq!(first, second);
}

// Test: route-level defaults are forwarded to the match predicate next
// to the expected-argument list.
#[test]
fn test_defaults_forwarded_to_match() {
	let config = RouteConfig::new().route(
		Route::path("prefix/<int:url_param>/postfix")
			.with_name("bug65")
			.with_default("kwarg_param", json!(1)),
	);
	let js = generate(&config, &GenerationOptions::new());

	assert!(js.contains(
		"if (this.#match(kwargs, args, ['url_param'], {\"kwarg_param\":1})) { return `/prefix/${kwargs[\"url_param\"]}/postfix`; }"
	));
}

// Test: class name and export statement follow the options.
#[test]
fn test_class_name_and_export() {
	let options = GenerationOptions::new()
		.with_class_name("AppUrls")
		.with_export(true);
	let js = generate(&sample_config(), &options);

	assert!(js.contains("export class AppUrls {"));
	assert!(js.contains("const kwargs = options.kwargs || {};"));
}

// Test: namespaced routes nest inside the url table under their
// namespace key.
#[test]
fn test_namespaced_route_table() {
	let nested = RouteConfig::new()
		.route(Route::path("qr/").with_name("qr"))
		.route(Route::path("qr/<int:color>/").with_name("color"));
	let config = RouteConfig::new().include(
		Include::new(nested)
			.with_prefix("spa/")
			.with_app_name("spa"),
	);
	let js = generate(&config, &GenerationOptions::new());

	assert!(js.contains("\"spa\": {"));
	assert!(js.contains("if (this.#match(kwargs, args)) { return \"/spa/qr/\"; }"));
	assert!(js.contains(
		"if (this.#match(kwargs, args, ['color'])) { return `/spa/qr/${kwargs[\"color\"]}/`; }"
	));
}

// Test: the starting depth shifts every line right without changing the
// content.
#[test]
fn test_starting_depth() {
	let options = GenerationOptions::new().with_depth(2).with_indent("  ");
	let js = generate(&sample_config(), &options);

	assert!(js.starts_with("    /**"));
	for line in js.lines().filter(|line| !line.trim().is_empty()) {
		assert!(line.starts_with("    "), "unindented line: {line:?}");
	}
}
