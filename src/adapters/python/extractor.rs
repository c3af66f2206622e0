//! Python syntax extraction using tree-sitter-python.
//!
//! Pure function: source text in, `Extraction` out. A fresh parser is created
//! per call so the extractor holds no state between files.

use crate::domain::error::ExtractError;
use crate::domain::extraction::{ClassEntry, Extraction, FunctionEntry};
use crate::domain::node::Position;
use crate::domain::ports::SyntaxExtractor;
use tree_sitter::{Node, Parser};

/// Extractor for Python source units
#[derive(Debug, Default, Clone, Copy)]
pub struct PythonExtractor;

impl PythonExtractor {
    pub fn new() -> Self {
        Self
    }
}

#[derive(Debug, Clone, Copy)]
enum Scope {
    Module,
    Class(usize),
    Function,
}

impl SyntaxExtractor for PythonExtractor {
    fn extract(&self, source: &str) -> Result<Extraction, ExtractError> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_python::language())
            .map_err(|e| ExtractError::Language(e.to_string()))?;
        let tree = parser.parse(source, None).ok_or(ExtractError::Parse)?;
        let root = tree.root_node();

        if root.has_error() {
            let position = first_error(root)
                .map(position_of)
                .unwrap_or(Position::new(1, 0));
            return Err(ExtractError::Syntax {
                line: position.line,
                column: position.column,
            });
        }

        let src = source.as_bytes();
        let mut extraction = Extraction::default();
        collect_definitions(root, src, Scope::Module, &mut extraction);
        collect_variables(root, src, &mut extraction);
        Ok(extraction)
    }
}

fn position_of(node: Node<'_>) -> Position {
    let point = node.start_position();
    Position::new(point.row as u32 + 1, point.column as u32)
}

fn end_position_of(node: Node<'_>) -> Position {
    let point = node.end_position();
    Position::new(point.row as u32 + 1, point.column as u32)
}

fn text(node: Node<'_>, src: &[u8]) -> Option<String> {
    node.utf8_text(src).ok().map(str::to_string)
}

fn field_text(node: Node<'_>, field: &str, src: &[u8]) -> Option<String> {
    node.child_by_field_name(field).and_then(|n| text(n, src))
}

fn is_field(parent: Node<'_>, field: &str, node: Node<'_>) -> bool {
    parent
        .child_by_field_name(field)
        .is_some_and(|f| f.id() == node.id())
}

fn first_error(node: Node<'_>) -> Option<Node<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    let mut cursor = node.walk();
    let children: Vec<Node<'_>> = node.children(&mut cursor).collect();
    children
        .into_iter()
        .filter(|c| c.has_error() || c.is_missing())
        .find_map(first_error)
}

/// Classes (with their methods) and module-level functions.
fn collect_definitions(node: Node<'_>, src: &[u8], scope: Scope, out: &mut Extraction) {
    let mut cursor = node.walk();
    let children: Vec<Node<'_>> = node.named_children(&mut cursor).collect();
    for child in children {
        match child.kind() {
            "class_definition" => {
                let Some(name) = field_text(child, "name", src) else {
                    continue;
                };
                out.classes.push(ClassEntry {
                    name,
                    methods: Vec::new(),
                });
                let class_scope = Scope::Class(out.classes.len() - 1);
                if let Some(body) = child.child_by_field_name("body") {
                    collect_definitions(body, src, class_scope, out);
                }
            }
            "function_definition" => {
                if let Some(name) = field_text(child, "name", src) {
                    let entry = FunctionEntry::new(name, parameters(child, src));
                    match scope {
                        Scope::Module => out.functions.push(entry),
                        Scope::Class(idx) => out.classes[idx].methods.push(entry),
                        Scope::Function => {}
                    }
                }
                if let Some(body) = child.child_by_field_name("body") {
                    collect_definitions(body, src, Scope::Function, out);
                }
            }
            _ => collect_definitions(child, src, scope, out),
        }
    }
}

fn parameters(function: Node<'_>, src: &[u8]) -> Vec<String> {
    let Some(params) = function.child_by_field_name("parameters") else {
        return Vec::new();
    };
    let mut cursor = params.walk();
    let children: Vec<Node<'_>> = params.named_children(&mut cursor).collect();
    children
        .into_iter()
        .filter_map(|param| match param.kind() {
            "identifier" | "list_splat_pattern" | "dictionary_splat_pattern" => text(param, src),
            "default_parameter" | "typed_default_parameter" => field_text(param, "name", src),
            "typed_parameter" => {
                let mut inner = param.walk();
                let name = param.named_children(&mut inner).next();
                name.and_then(|n| text(n, src))
            }
            _ => None,
        })
        .collect()
}

/// Simple-name assignments and identifiers read in load position.
fn collect_variables(node: Node<'_>, src: &[u8], out: &mut Extraction) {
    match node.kind() {
        "assignment" => {
            if let Some(left) = node.child_by_field_name("left") {
                if left.kind() == "identifier" && node.child_by_field_name("right").is_some() {
                    if let Some(name) = text(left, src) {
                        // bound only after the right-hand side has been read
                        out.record_definition(&name, end_position_of(node));
                        if let Some(annotation) = field_text(node, "type", src) {
                            out.annotations.entry(name).or_insert(annotation);
                        }
                    }
                }
            }
        }
        "identifier" => {
            if is_load(node) {
                if let Some(name) = text(node, src) {
                    out.record_usage(&name, position_of(node));
                }
            }
        }
        _ => {}
    }

    let mut cursor = node.walk();
    let children: Vec<Node<'_>> = node.named_children(&mut cursor).collect();
    for child in children {
        collect_variables(child, src, out);
    }
}

const PATTERN_CONTAINERS: &[&str] = &["pattern_list", "tuple_pattern", "list_pattern"];

const IMPORT_STATEMENTS: &[&str] = &[
    "import_statement",
    "import_from_statement",
    "future_import_statement",
];

/// Whether an identifier is read (as opposed to bound, declared or named).
fn is_load(node: Node<'_>) -> bool {
    let Some(parent) = node.parent() else {
        return false;
    };

    match parent.kind() {
        "function_definition" | "class_definition" => return !is_field(parent, "name", node),
        "attribute" => return !is_field(parent, "attribute", node),
        "keyword_argument" => return !is_field(parent, "name", node),
        "named_expression" => return !is_field(parent, "name", node),
        "default_parameter" | "typed_default_parameter" => {
            return !is_field(parent, "name", node);
        }
        "parameters"
        | "lambda_parameters"
        | "typed_parameter"
        | "list_splat_pattern"
        | "dictionary_splat_pattern"
        | "as_pattern_target"
        | "global_statement"
        | "nonlocal_statement"
        | "dotted_name"
        | "aliased_import"
        | "delete_statement" => return false,
        "except_clause" => {
            if node.prev_sibling().is_some_and(|s| s.kind() == "as") {
                return false;
            }
        }
        _ => {}
    }

    if is_store_target(node) || has_ancestor(node, IMPORT_STATEMENTS) {
        return false;
    }
    !is_deleted(node)
}

fn is_store_target(node: Node<'_>) -> bool {
    let mut current = node;
    while let Some(parent) = current.parent() {
        if PATTERN_CONTAINERS.contains(&parent.kind()) {
            current = parent;
            continue;
        }
        return match parent.kind() {
            "assignment" | "augmented_assignment" | "for_statement" | "for_in_clause" => {
                is_field(parent, "left", current)
            }
            _ => false,
        };
    }
    false
}

fn is_deleted(node: Node<'_>) -> bool {
    let mut current = node;
    while let Some(parent) = current.parent() {
        match parent.kind() {
            "expression_list" | "tuple" | "parenthesized_expression" => current = parent,
            "delete_statement" => return true,
            _ => return false,
        }
    }
    false
}

fn has_ancestor(node: Node<'_>, kinds: &[&str]) -> bool {
    let mut current = node.parent();
    while let Some(n) = current {
        if kinds.contains(&n.kind()) {
            return true;
        }
        current = n.parent();
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(source: &str) -> Extraction {
        PythonExtractor::new().extract(source).unwrap()
    }

    fn names(map: &std::collections::BTreeMap<String, Vec<Position>>) -> Vec<&str> {
        map.keys().map(String::as_str).collect()
    }

    #[test]
    fn test_classes_methods_and_functions() {
        let src = "\
class Foo:
    def bar(self, a, b=1, *args, **kwargs):
        pass

    @staticmethod
    def baz(x: int, y: str = 'q'):
        def inner():
            pass
        return x

def helper(n):
    return n
";
        let e = extract(src);
        assert_eq!(e.classes.len(), 1);
        let foo = &e.classes[0];
        assert_eq!(foo.name, "Foo");
        let methods: Vec<&str> = foo.methods.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(methods, vec!["bar", "baz"]);
        assert_eq!(
            foo.methods[0].parameters,
            vec!["self", "a", "b", "*args", "**kwargs"]
        );
        assert_eq!(foo.methods[1].parameters, vec!["x", "y"]);
        assert_eq!(e.functions, vec![FunctionEntry::new("helper", vec!["n".into()])]);
        assert!(e.class_methods()["helper"].is_empty());
    }

    #[test]
    fn test_definitions_and_usages_positions() {
        let e = extract("x = 1\nprint(x)\n");
        assert_eq!(e.definitions["x"], vec![Position::new(1, 5)]);
        assert_eq!(e.usages["x"], vec![Position::new(2, 6)]);
        assert_eq!(names(&e.usages), vec!["print", "x"]);
    }

    #[test]
    fn test_store_positions_are_not_usages() {
        let src = "\
a, b = 1, 2
for i in range(3):
    total += i
with open('f') as fh:
    pass
del gone
";
        let e = extract(src);
        assert_eq!(names(&e.usages), vec!["i", "open", "range"]);
        // tuple targets are bindings but not simple-name definitions
        assert!(e.definitions.is_empty());
    }

    #[test]
    fn test_attribute_and_keyword_names_are_not_usages() {
        let e = extract("obj.field = call(key=value)\n");
        assert_eq!(names(&e.usages), vec!["call", "obj", "value"]);
    }

    #[test]
    fn test_parameters_and_imports_are_not_usages() {
        let e = extract("import os\nfrom sys import path as p\ndef f(a, b=c):\n    return a\n");
        assert_eq!(names(&e.usages), vec!["a", "c"]);
    }

    #[test]
    fn test_annotated_assignment_records_type() {
        let e = extract("count: int = 0\n");
        assert_eq!(e.definitions["count"], vec![Position::new(1, 14)]);
        assert_eq!(e.annotations["count"], "int");
        assert_eq!(names(&e.usages), vec!["int"]);
    }

    #[test]
    fn test_self_referencing_assignment_reads_before_binding() {
        let e = extract("x = x + 1\n");
        assert_eq!(e.usages["x"], vec![Position::new(1, 4)]);
        assert_eq!(e.definitions["x"], vec![Position::new(1, 9)]);
    }

    #[test]
    fn test_chained_assignment_defines_both() {
        let e = extract("a = b = 0\n");
        assert_eq!(names(&e.definitions), vec!["a", "b"]);
        assert!(e.usages.is_empty());
    }

    #[test]
    fn test_syntax_error_is_reported() {
        let err = PythonExtractor::new()
            .extract("def broken(:\n    pass\n")
            .unwrap_err();
        assert!(matches!(err, ExtractError::Syntax { .. }));
    }
}
