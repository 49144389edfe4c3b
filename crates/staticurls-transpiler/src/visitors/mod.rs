//! Code writers over the verified route tree.
//!
//! A writer receives a depth-first traversal of the tree (routes of a
//! namespace first, then its child namespaces, both in insertion order)
//! and renders JavaScript through a [`LineWriter`]. Two writers ship:
//! [`FlatWriter`] emits one arrow function per route name in nested object
//! literals, [`ClassWriter`] emits a single resolver class that factors
//! the match and reverse logic once. Callers may plug their own writer via
//! [`crate::options::VisitorKind::Custom`].

mod class_writer;
mod flat;

pub use class_writer::ClassWriter;
pub use flat::FlatWriter;

use serde_json::Value;
use std::collections::BTreeMap;

use staticurls_routing::pattern::{PathPattern, Segment};

use crate::tree::{NamespaceNode, RouteEntry};

/// Accumulates generated lines with indentation tracking.
///
/// An empty indent string also disables newlines, producing single-line
/// output.
#[derive(Debug)]
pub struct LineWriter {
	output: String,
	level: usize,
	indent: String,
	newline: &'static str,
}

impl LineWriter {
	/// Creates a writer with the given indent string and starting depth.
	pub fn new(indent: &str, depth: usize) -> Self {
		Self {
			output: String::new(),
			level: depth,
			indent: indent.to_string(),
			newline: if indent.is_empty() { "" } else { "\n" },
		}
	}

	/// Writes one line at the current indentation level.
	pub fn write_line(&mut self, line: &str) {
		for _ in 0..self.level {
			self.output.push_str(&self.indent);
		}
		self.output.push_str(line);
		self.output.push_str(self.newline);
	}

	/// Steps in one indentation level.
	pub fn indent(&mut self) {
		self.level += 1;
	}

	/// Steps out one indentation level, clamped at zero.
	pub fn outdent(&mut self) {
		self.level = self.level.saturating_sub(1);
	}

	/// Consumes the writer and returns the generated text.
	pub fn into_output(self) -> String {
		self.output
	}
}

/// The traversal contract every code writer implements.
pub trait RouteVisitor {
	/// Called once before the tree traversal starts.
	fn begin(&mut self, writer: &mut LineWriter);

	/// Called when descending into a namespace.
	fn enter_namespace(&mut self, writer: &mut LineWriter, namespace: &str);

	/// Called when leaving a namespace.
	fn leave_namespace(&mut self, writer: &mut LineWriter, namespace: &str);

	/// Called once per route entry, variants in declaration order.
	fn emit_route(&mut self, writer: &mut LineWriter, entry: &RouteEntry);

	/// Called once after the tree traversal completes.
	fn finalize(&mut self, writer: &mut LineWriter);
}

/// Drives a writer over the tree and returns the generated text.
pub fn render(root: &NamespaceNode, visitor: &mut dyn RouteVisitor, writer: &mut LineWriter) {
	visitor.begin(writer);
	render_node(root, visitor, writer);
	visitor.finalize(writer);
}

fn render_node(node: &NamespaceNode, visitor: &mut dyn RouteVisitor, writer: &mut LineWriter) {
	for entry in node.routes() {
		visitor.emit_route(writer, entry);
	}
	for child in node.children() {
		let name = child.name().unwrap_or_default();
		visitor.enter_namespace(writer, name);
		render_node(child, visitor, writer);
		visitor.leave_namespace(writer, name);
	}
}

/// Renders a double-quoted JavaScript string literal.
pub(crate) fn js_string(text: &str) -> String {
	Value::String(text.to_string()).to_string()
}

/// Escapes literal text for embedding in a template literal.
pub(crate) fn js_template_escape(text: &str) -> String {
	text.replace('\\', "\\\\")
		.replace('`', "\\`")
		.replace("${", "\\${")
}

/// Renders an object literal from a defaults map, keys sorted.
pub(crate) fn js_object(map: &BTreeMap<String, Value>) -> String {
	let object: serde_json::Map<String, Value> =
		map.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
	Value::Object(object).to_string()
}

/// Renders a list of single-quoted names: `['a','b']` with `sep = ","`.
pub(crate) fn quoted_list(names: &[&str], sep: &str) -> String {
	let quoted: Vec<String> = names.iter().map(|name| format!("'{name}'")).collect();
	format!("[{}]", quoted.join(sep))
}

/// Builds the template-literal body reproducing a pattern's path, named
/// arguments as `${kwargs["name"]}` and positional ones as `${args[N]}`.
/// The leading slash is not included.
pub(crate) fn template_path(pattern: &PathPattern) -> String {
	let mut body = String::new();
	for segment in pattern.segments() {
		match segment {
			Segment::Literal(text) => body.push_str(&js_template_escape(text)),
			Segment::Argument(spec) => match spec.name() {
				Some(name) => {
					body.push_str("${kwargs[\"");
					body.push_str(name);
					body.push_str("\"]}");
				}
				None => {
					body.push_str("${args[");
					body.push_str(&spec.index().to_string());
					body.push_str("]}");
				}
			},
		}
	}
	body
}

/// Builds the literal path of a static pattern, leading slash included.
pub(crate) fn static_path(pattern: &PathPattern) -> String {
	let mut path = String::from("/");
	for segment in pattern.segments() {
		if let Segment::Literal(text) = segment {
			path.push_str(text);
		}
	}
	path
}

/// The comment emitted for a variant that an earlier declaration always
/// wins over.
pub(crate) fn overruled_comment(pattern: &PathPattern) -> String {
	if pattern.is_static() {
		format!("/* Path '{}' overruled */", pattern.regex_source())
	} else if pattern.positional_arity() > 0 {
		format!(
			"/* Path {} overruled with: args={} */",
			pattern.regex_source(),
			pattern.positional_arity()
		)
	} else {
		format!(
			"/* Path {} overruled with: kwargs={} */",
			pattern.regex_source(),
			quoted_list(&pattern.expected_arguments(), ", ")
		)
	}
}

/// The breadcrumb emitted for a pattern that cannot be reversed.
pub(crate) const UNREVERSIBLE_COMMENT: &str = "/* this path may not be reversible */";
