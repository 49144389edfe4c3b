//! The object-of-functions writer.

use staticurls_routing::pattern::PathPattern;

use crate::options::GenerationOptions;
use crate::tree::RouteEntry;
use crate::verify::Verification;

use super::{
	LineWriter, RouteVisitor, UNREVERSIBLE_COMMENT, js_string, overruled_comment, quoted_list,
	static_path, template_path,
};

/// Writes the route tree as nested object literals where every route name
/// maps to a reversal arrow function, with no shared runtime helper.
///
/// The generated functions take `(options={}, args=[])`: named arguments
/// may be passed directly as `options` or under `options.kwargs`,
/// positional ones under `options.args` or as the second parameter. Each
/// function tests its variants in declaration order and returns the path
/// of the first one whose argument shape matches.
#[derive(Debug)]
pub struct FlatWriter {
	raise_on_not_found: bool,
}

impl FlatWriter {
	pub fn new(options: &GenerationOptions) -> Self {
		Self {
			raise_on_not_found: options.raise_on_not_found(),
		}
	}

	fn emit_variant(&self, writer: &mut LineWriter, pattern: &PathPattern) {
		if pattern.is_static() {
			writer.write_line("if (Object.keys(kwargs).length === 0 && args.length === 0)");
			writer.indent();
			writer.write_line(&format!("return {};", js_string(&static_path(pattern))));
			writer.outdent();
		} else if pattern.positional_arity() > 0 {
			writer.write_line(&format!(
				"if (args.length === {})",
				pattern.positional_arity()
			));
			writer.indent();
			writer.write_line(&format!("return `/{}`;", template_path(pattern)));
			writer.outdent();
		} else {
			let names = pattern.expected_arguments();
			writer.write_line(&format!(
				"if (Object.keys(kwargs).length === {} && {}.every(value => kwargs.hasOwnProperty(value)))",
				names.len(),
				quoted_list(&names, ",")
			));
			writer.indent();
			writer.write_line(&format!("return `/{}`;", template_path(pattern)));
			writer.outdent();
		}
	}
}

impl RouteVisitor for FlatWriter {
	fn begin(&mut self, writer: &mut LineWriter) {
		writer.write_line("const urls = {");
		writer.indent();
	}

	fn enter_namespace(&mut self, writer: &mut LineWriter, namespace: &str) {
		writer.write_line(&format!("\"{namespace}\": {{"));
		writer.indent();
	}

	fn leave_namespace(&mut self, writer: &mut LineWriter, _namespace: &str) {
		writer.outdent();
		writer.write_line("},");
	}

	fn emit_route(&mut self, writer: &mut LineWriter, entry: &RouteEntry) {
		writer.write_line(&format!(
			"\"{}\": (options={{}}, args=[]) => {{",
			entry.name()
		));
		writer.indent();
		writer.write_line("const kwargs = ((options.kwargs || null) || options) || {};");
		writer.write_line("args = ((options.args || null) || args) || [];");
		for variant in entry.variants() {
			match variant.verification() {
				Verification::Verified { .. } => self.emit_variant(writer, variant.pattern()),
				Verification::Shadowed => {
					writer.write_line(&overruled_comment(variant.pattern()));
				}
				Verification::Unreversible => writer.write_line(UNREVERSIBLE_COMMENT),
			}
		}
		if self.raise_on_not_found {
			writer.write_line(&format!(
				"throw new TypeError(\"No reversal available for parameters at path: {}\");",
				entry.qualified()
			));
		}
		writer.outdent();
		writer.write_line("},");
	}

	fn finalize(&mut self, writer: &mut LineWriter) {
		writer.outdent();
		writer.write_line("};");
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use staticurls_routing::converters::ConverterRegistry;
	use staticurls_routing::route::{Include, Route, RouteConfig};

	use crate::placeholders::PlaceholderRegistry;
	use crate::tree::TreeBuilder;
	use crate::visitors::render;

	fn generate(config: RouteConfig, options: &GenerationOptions) -> String {
		let converters = ConverterRegistry::with_defaults();
		let placeholders = PlaceholderRegistry::new();
		let tree = TreeBuilder::new(&converters, &placeholders, options)
			.build(&config)
			.unwrap();
		let mut writer = LineWriter::new(options.indent(), options.depth());
		let mut visitor = FlatWriter::new(options);
		render(&tree, &mut visitor, &mut writer);
		writer.into_output()
	}

	#[test]
	fn test_static_route_function() {
		let config = RouteConfig::new().route(Route::path("simple2/").with_name("simple2"));
		let output = generate(config, &GenerationOptions::new());

		assert!(output.starts_with("const urls = {\n"));
		assert!(output.contains("\"simple2\": (options={}, args=[]) => {"));
		assert!(output.contains("if (Object.keys(kwargs).length === 0 && args.length === 0)"));
		assert!(output.contains("return \"/simple2/\";"));
		assert!(output.contains(
			"throw new TypeError(\"No reversal available for parameters at path: simple2\");"
		));
		assert!(output.ends_with("};\n"));
	}

	#[test]
	fn test_named_argument_guard() {
		let config = RouteConfig::new()
			.route(Route::path("different/<int:arg1>/<str:arg2>").with_name("different"));
		let output = generate(config, &GenerationOptions::new());

		assert!(output.contains(
			"if (Object.keys(kwargs).length === 2 && ['arg1','arg2'].every(value => kwargs.hasOwnProperty(value)))"
		));
		assert!(
			output.contains("return `/different/${kwargs[\"arg1\"]}/${kwargs[\"arg2\"]}`;")
		);
	}

	#[test]
	fn test_positional_argument_guard() {
		let config =
			RouteConfig::new().route(Route::regex("^unnamed/([0-9]+)/$").with_name("unnamed"));
		let output = generate(config, &GenerationOptions::new());

		assert!(output.contains("if (args.length === 1)"));
		assert!(output.contains("return `/unnamed/${args[0]}/`;"));
	}

	#[test]
	fn test_no_throw_when_not_raising() {
		let config = RouteConfig::new().route(Route::path("simple2/").with_name("simple2"));
		let output = generate(
			config,
			&GenerationOptions::new().with_raise_on_not_found(false),
		);

		assert!(!output.contains("throw new TypeError"));
	}

	#[test]
	fn test_namespace_nesting() {
		let nested = RouteConfig::new().route(Route::path("index/").with_name("index"));
		let config = RouteConfig::new().include(
			Include::new(nested)
				.with_prefix("sub/")
				.with_namespace("sub"),
		);
		let output = generate(config, &GenerationOptions::new());

		assert!(output.contains("\"sub\": {"));
		assert!(output.contains("\"index\": (options={}, args=[]) => {"));
		assert!(output.contains("return \"/sub/index/\";"));
	}
}
