//! Python concrete-syntax-tree support for docauto.
//!
//! Wraps tree-sitter with the Python grammar and exposes the two things the
//! documentation pipeline needs: the list of documentable units (functions
//! and classes) in a source file, and byte-exact docstring edits that can be
//! spliced back into the original text.

use anyhow::{anyhow, bail, Result};
use tree_sitter::{Node, Parser, Tree};

pub mod edit;

pub use edit::{apply_edits, format_docstring, Edit};

/// Parser for Python source files
pub struct CstParser {
    parser: Parser,
}

impl CstParser {
    /// Create a parser with the Python grammar loaded
    pub fn new() -> Result<Self> {
        let mut parser = Parser::new();
        let language: tree_sitter::Language = tree_sitter_python::LANGUAGE.into();
        parser
            .set_language(&language)
            .map_err(|e| anyhow!("Failed to load Python grammar: {}", e))?;
        Ok(Self { parser })
    }

    /// Parse source code into a module
    ///
    /// Files with syntax errors are rejected here so the pipeline never
    /// rewrites a file it cannot fully understand.
    pub fn parse(&mut self, source: &str) -> Result<Module> {
        let tree = self
            .parser
            .parse(source, None)
            .ok_or_else(|| anyhow!("Failed to parse source"))?;

        if tree.root_node().has_error() {
            bail!("Invalid Python module: source contains syntax errors");
        }

        Ok(Module {
            tree,
            source: source.to_string(),
        })
    }
}

/// Parsed Python file with its CST
pub struct Module {
    tree: Tree,
    source: String,
}

/// What kind of documentable unit a node is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitKind {
    Function,
    Class,
}

/// An existing docstring found at the head of a unit's body
#[derive(Debug, Clone)]
pub struct Docstring {
    /// Byte range of the string literal (quotes included)
    pub start_byte: usize,
    pub end_byte: usize,
    /// Quote style of the literal (`"""`, `'''`, `"` or `'`)
    pub quote: &'static str,
}

/// Where a fresh docstring has to be spliced in
#[derive(Debug, Clone)]
enum Insertion {
    /// Body already starts on its own line: insert before the first statement
    BeforeStatement { offset: usize },
    /// One-line body (`def f(): pass`): break the line after the header colon
    BreakLine { colon_end: usize, stmt_start: usize },
}

/// A function or class that is a candidate for documentation
#[derive(Debug, Clone)]
pub struct DocUnit {
    pub name: String,
    /// Dotted path of enclosing definitions, e.g. `Calculator.add`
    pub qualified_name: String,
    pub kind: UnitKind,
    /// Innermost enclosing class, if the unit is defined inside one
    pub class_context: Option<String>,
    /// 1-based line of the `def`/`class` keyword
    pub line: usize,
    /// Source text of the definition (decorators excluded)
    pub source_text: String,
    pub docstring: Option<Docstring>,
    /// Indentation string for the unit's body lines
    pub body_indent: String,
    insertion: Insertion,
}

impl Module {
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Extract every documentable unit in source order
    ///
    /// Methods and nested definitions are included; each unit records the
    /// innermost class it is defined in so generation can pass that along as
    /// context.
    pub fn units(&self) -> Vec<DocUnit> {
        let mut units = Vec::new();
        let mut scope = Vec::new();
        let mut classes = Vec::new();
        self.collect_units(self.tree.root_node(), &mut scope, &mut classes, &mut units);
        units
    }

    /// Apply docstring edits and return the rewritten source
    pub fn apply(&self, edits: &[Edit]) -> Result<String> {
        edit::apply_edits(&self.source, edits)
    }

    fn collect_units(
        &self,
        node: Node,
        scope: &mut Vec<String>,
        classes: &mut Vec<String>,
        units: &mut Vec<DocUnit>,
    ) {
        let kind = match node.kind() {
            "function_definition" => Some(UnitKind::Function),
            "class_definition" => Some(UnitKind::Class),
            _ => None,
        };

        if let Some(kind) = kind {
            if let Some(unit) = self.build_unit(node, kind, scope, classes) {
                let name = unit.name.clone();
                units.push(unit);

                scope.push(name.clone());
                if kind == UnitKind::Class {
                    classes.push(name);
                }

                let mut cursor = node.walk();
                for child in node.children(&mut cursor) {
                    self.collect_units(child, scope, classes, units);
                }

                scope.pop();
                if kind == UnitKind::Class {
                    classes.pop();
                }
                return;
            }
        }

        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            self.collect_units(child, scope, classes, units);
        }
    }

    fn build_unit(
        &self,
        node: Node,
        kind: UnitKind,
        scope: &[String],
        classes: &[String],
    ) -> Option<DocUnit> {
        let source = self.source.as_bytes();

        let name = node
            .child_by_field_name("name")?
            .utf8_text(source)
            .ok()?
            .to_string();

        let body = node.child_by_field_name("body")?;
        let first_stmt = first_statement(body)?;

        let qualified_name = if scope.is_empty() {
            name.clone()
        } else {
            format!("{}.{}", scope.join("."), name)
        };

        let docstring = detect_docstring(first_stmt, &self.source);

        let one_line = first_stmt.start_position().row == header_row(node);
        let (body_indent, insertion) = if one_line {
            let indent = format!("{}    ", line_indent(&self.source, node.start_byte()));
            let colon = header_colon(node, body.start_byte())?;
            (
                indent,
                Insertion::BreakLine {
                    colon_end: colon.end_byte(),
                    stmt_start: first_stmt.start_byte(),
                },
            )
        } else {
            let indent = line_indent(&self.source, first_stmt.start_byte());
            (
                indent,
                Insertion::BeforeStatement {
                    offset: first_stmt.start_byte(),
                },
            )
        };

        Some(DocUnit {
            name,
            qualified_name,
            kind,
            class_context: classes.last().cloned(),
            line: node.start_position().row + 1,
            source_text: node.utf8_text(source).ok()?.to_string(),
            docstring,
            body_indent,
            insertion,
        })
    }
}

impl DocUnit {
    /// Byte-range plan for inserting a fresh docstring at the head of the body
    pub(crate) fn insertion_span(&self) -> (usize, usize, bool) {
        match self.insertion {
            Insertion::BeforeStatement { offset } => (offset, offset, false),
            Insertion::BreakLine {
                colon_end,
                stmt_start,
            } => (colon_end, stmt_start, true),
        }
    }
}

/// First non-comment statement of a block, if any
fn first_statement(body: Node) -> Option<Node> {
    let mut cursor = body.walk();
    let stmt = body
        .named_children(&mut cursor)
        .find(|child| child.kind() != "comment");
    stmt
}

/// Detect a docstring: a leading expression statement holding a string literal
fn detect_docstring(first_stmt: Node, source: &str) -> Option<Docstring> {
    if first_stmt.kind() != "expression_statement" {
        return None;
    }

    let string_node = first_stmt.named_child(0)?;
    if string_node.kind() != "string" && string_node.kind() != "concatenated_string" {
        return None;
    }

    let text = &source[string_node.start_byte()..string_node.end_byte()];
    Some(Docstring {
        start_byte: string_node.start_byte(),
        end_byte: string_node.end_byte(),
        quote: quote_style(text),
    })
}

/// Quote style of a string literal, skipping any r/b/u/f prefix
fn quote_style(literal: &str) -> &'static str {
    let stripped = literal.trim_start_matches(['r', 'R', 'b', 'B', 'u', 'U', 'f', 'F']);
    if stripped.starts_with("\"\"\"") {
        "\"\"\""
    } else if stripped.starts_with("'''") {
        "'''"
    } else if stripped.starts_with('\'') {
        "'"
    } else {
        "\""
    }
}

/// Row of the header colon, i.e. the line the body would share for `def f(): pass`
fn header_row(node: Node) -> usize {
    node.child_by_field_name("body")
        .map(|body| {
            // The body's previous sibling is the header colon
            body.prev_sibling()
                .map(|colon| colon.start_position().row)
                .unwrap_or_else(|| node.start_position().row)
        })
        .unwrap_or_else(|| node.start_position().row)
}

/// The `:` token that closes a definition header
fn header_colon(node: Node, body_start: usize) -> Option<Node> {
    let mut cursor = node.walk();
    let mut colon = None;
    for child in node.children(&mut cursor) {
        if child.start_byte() >= body_start {
            break;
        }
        if child.kind() == ":" {
            colon = Some(child);
        }
    }
    colon
}

/// Leading whitespace of the line containing the given byte offset
fn line_indent(source: &str, byte: usize) -> String {
    let line_start = source[..byte].rfind('\n').map(|i| i + 1).unwrap_or(0);
    source[line_start..byte]
        .chars()
        .take_while(|c| *c == ' ' || *c == '\t')
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> Module {
        CstParser::new().unwrap().parse(source).unwrap()
    }

    #[test]
    fn test_rejects_invalid_python() {
        let mut parser = CstParser::new().unwrap();
        let result = parser.parse("def broken(:\n    pass\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_extracts_functions_and_classes() {
        let module = parse("def top():\n    pass\n\n\nclass Calculator:\n    def add(self, a, b):\n        return a + b\n");
        let units = module.units();
        let names: Vec<&str> = units.iter().map(|u| u.qualified_name.as_str()).collect();
        assert_eq!(names, vec!["top", "Calculator", "Calculator.add"]);
        assert_eq!(units[0].kind, UnitKind::Function);
        assert_eq!(units[1].kind, UnitKind::Class);
        assert_eq!(units[2].class_context.as_deref(), Some("Calculator"));
    }

    #[test]
    fn test_nested_function_scope() {
        let module = parse("def outer():\n    def inner():\n        pass\n    inner()\n");
        let units = module.units();
        assert_eq!(units[1].qualified_name, "outer.inner");
        assert!(units[1].class_context.is_none());
    }

    #[test]
    fn test_decorated_function_is_found() {
        let module = parse("@staticmethod\ndef helper():\n    return 1\n");
        let units = module.units();
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].name, "helper");
        assert!(units[0].source_text.starts_with("def helper"));
    }

    #[test]
    fn test_detects_existing_docstring_and_quotes() {
        let module = parse("def documented():\n    '''Already here.'''\n    pass\n");
        let units = module.units();
        let doc = units[0].docstring.as_ref().expect("docstring expected");
        assert_eq!(doc.quote, "'''");
    }

    #[test]
    fn test_no_docstring_on_plain_body() {
        let module = parse("def bare():\n    x = 'not a docstring'\n    return x\n");
        assert!(module.units()[0].docstring.is_none());
    }

    #[test]
    fn test_comment_before_body_is_skipped() {
        let module = parse("def commented():\n    # leading comment\n    \"\"\"Doc.\"\"\"\n    pass\n");
        let units = module.units();
        assert!(units[0].docstring.is_some());
    }

    #[test]
    fn test_body_indent_tracks_nesting() {
        let module = parse("class Outer:\n    def method(self):\n        return 1\n");
        let units = module.units();
        assert_eq!(units[0].body_indent, "    ");
        assert_eq!(units[1].body_indent, "        ");
    }

    #[test]
    fn test_one_line_body_detected() {
        let module = parse("def short(): pass\n");
        let units = module.units();
        let (start, end, breaks) = units[0].insertion_span();
        assert!(breaks);
        assert!(start < end);
    }
}
