// Generated object-of-functions output.

use std::collections::BTreeMap;

use regex::{Captures, Regex};
use staticurls::prelude::*;

fn generate(config: &RouteConfig, options: &GenerationOptions) -> String {
	urls_to_js(
		config,
		&ConverterRegistry::with_defaults(),
		&PlaceholderRegistry::new(),
		options,
	)
	.expect("generation should succeed")
}

fn flat_options() -> GenerationOptions {
	GenerationOptions::new().with_visitor(VisitorKind::Flat)
}

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

// Test: the output is a standalone object literal with per-route
// functions that unpack options into kwargs and args.
#[test]
fn test_object_shell() {
	let config = RouteConfig::new().route(Route::path("simple2/").with_name("simple2"));
	let js = generate(&config, &flat_options());

	assert!(js.starts_with("const urls = {\n"));
	assert!(js.ends_with("};\n"));
	assert!(js.contains("\"simple2\": (options={}, args=[]) => {"));
	assert!(js.contains("const kwargs = ((options.kwargs || null) || options) || {};"));
	assert!(js.contains("args = ((options.args || null) || args) || [];"));
	assert!(js.contains("return \"/simple2/\";"));
}

// Test: variants of one name are tested in declaration order inside a
// single function.
#[test]
fn test_variant_precedence_order() {
	let config = RouteConfig::new()
		.route(Route::path("simple/").with_name("simple"))
		.route(Route::path("simple/<int:arg1>/").with_name("simple"));
	let js = generate(&config, &flat_options());

	let zero_arg = js
		.find("if (Object.keys(kwargs).length === 0 && args.length === 0)")
		.expect("zero-argument guard missing");
	let one_arg = js
		.find(
			"if (Object.keys(kwargs).length === 1 && ['arg1'].every(value => kwargs.hasOwnProperty(value)))",
		)
		.expect("one-argument guard missing");
	assert!(zero_arg < one_arg);
	assert_eq!(js.matches("\"simple\": (options={}, args=[]) => {").count(), 1);
}

// Test: the emitted template reproduces the native reversal.
#[test]
fn test_generated_matches_native_reversal() {
	let config = RouteConfig::new()
		.route(Route::path("different/<int:arg1>/<str:arg2>").with_name("different"));
	let converters = ConverterRegistry::with_defaults();
	let resolver = UrlResolver::new(&config, &converters);
	let js = generate(&config, &flat_options());

	let needle = "return `";
	let start = js.find(needle).expect("template not emitted");
	let rest = &js[start + needle.len()..];
	let template = &rest[..rest.find('`').expect("unterminated template")];

	let kwargs: BTreeMap<String, String> = [("arg1", "143"), ("arg2", "emma")]
		.into_iter()
		.map(|(k, v)| (k.to_string(), v.to_string()))
		.collect();
	assert_eq!(
		substitute_template(template, &kwargs, &[]),
		resolver.reverse("different", &kwargs).unwrap()
	);
}

// Test: the no-reversal throw names the fully qualified route, not the
// local name.
#[test]
fn test_throw_names_qualified_route() {
	let nested = RouteConfig::new().route(Route::path("index/").with_name("index"));
	let config = RouteConfig::new()
		.include(Include::new(nested).with_prefix("sub/").with_namespace("sub"));
	let js = generate(&config, &flat_options());

	assert!(js.contains(
		"throw new TypeError(\"No reversal available for parameters at path: sub:index\");"
	));
}

// Test: flat output is deterministic across runs.
#[test]
fn test_determinism() {
	let build = || {
		let nested = RouteConfig::new().route(Route::path("qr/").with_name("qr"));
		let config = RouteConfig::new()
			.route(Route::path("simple/").with_name("simple"))
			.include(Include::new(nested).with_namespace("spa"));
		generate(&config, &flat_options())
	};
	assert_eq!(build(), build());
}
