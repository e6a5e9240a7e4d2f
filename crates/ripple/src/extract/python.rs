//! Python structural extraction using tree-sitter-python.
//!
//! Walks the syntax tree once, in document order:
//!
//! - `class` statements become `ClassRecord`s; base expressions are reduced to
//!   dotted names and anything else (calls, subscripts, keywords) is dropped
//! - `def` inside a class body becomes a method of the innermost enclosing
//!   class, otherwise a top-level function
//! - `import` / `from ... import` become fully qualified dotted strings
//! - calls whose callee reduces to a dotted name are recorded; calls on
//!   computed expressions (`obj[0]()`, `make()()`) are skipped

use super::tree_sitter_utils::{first_error_line, node_line, node_lines, node_text};
use super::Extractor;
use crate::error::ParseError;
use crate::types::{
    ClassKind, ClassRecord, FunctionRecord, Language, MethodRecord, StructuralRecord,
};

/// Tree-sitter node kind constants for the Python grammar.
mod node_kinds {
    pub const CLASS_DEFINITION: &str = "class_definition";
    pub const FUNCTION_DEFINITION: &str = "function_definition";
    pub const IMPORT_STATEMENT: &str = "import_statement";
    pub const IMPORT_FROM_STATEMENT: &str = "import_from_statement";
    pub const CALL: &str = "call";

    pub const IDENTIFIER: &str = "identifier";
    pub const ATTRIBUTE: &str = "attribute";
    pub const DOTTED_NAME: &str = "dotted_name";
    pub const ALIASED_IMPORT: &str = "aliased_import";
    pub const RELATIVE_IMPORT: &str = "relative_import";
    pub const WILDCARD_IMPORT: &str = "wildcard_import";

    // Parameter nodes
    pub const TYPED_PARAMETER: &str = "typed_parameter";
    pub const DEFAULT_PARAMETER: &str = "default_parameter";
    pub const TYPED_DEFAULT_PARAMETER: &str = "typed_default_parameter";
    pub const LIST_SPLAT_PATTERN: &str = "list_splat_pattern";
    pub const DICTIONARY_SPLAT_PATTERN: &str = "dictionary_splat_pattern";
    pub const KEYWORD_SEPARATOR: &str = "keyword_separator";
    pub const POSITIONAL_SEPARATOR: &str = "positional_separator";
}

/// Python extractor backed by tree-sitter.
pub struct PythonExtractor;

impl Extractor for PythonExtractor {
    fn language(&self) -> Language {
        Language::Python
    }

    fn extract(&self, content: &str, path: &str) -> Result<StructuralRecord, ParseError> {
        let mut parser = tree_sitter::Parser::new();
        parser
            .set_language(&tree_sitter_python::LANGUAGE.into())
            .map_err(|e| ParseError::new(path, 0, format!("python grammar unavailable: {e}")))?;

        let tree = parser
            .parse(content, None)
            .ok_or_else(|| ParseError::new(path, 0, "parser produced no syntax tree"))?;
        let root = tree.root_node();

        if let Some(line) = first_error_line(&root) {
            return Err(ParseError::new(path, line, "invalid syntax"));
        }

        let mut walker = Walker::new(path, content.as_bytes());
        walker.visit(&root);
        Ok(walker.record)
    }
}

/// Accumulates the record while walking one tree.
struct Walker<'a> {
    path: &'a str,
    content: &'a [u8],
    record: StructuralRecord,
    /// Indices into `record.classes` of the enclosing class definitions
    class_stack: Vec<usize>,
}

impl<'a> Walker<'a> {
    fn new(path: &'a str, content: &'a [u8]) -> Self {
        Self {
            path,
            content,
            record: StructuralRecord::empty(path, Language::Python),
            class_stack: Vec::new(),
        }
    }

    fn visit(&mut self, node: &tree_sitter::Node) {
        use node_kinds::{
            CALL, CLASS_DEFINITION, FUNCTION_DEFINITION, IMPORT_FROM_STATEMENT, IMPORT_STATEMENT,
        };

        match node.kind() {
            CLASS_DEFINITION => {
                self.visit_class(node);
                return;
            }
            FUNCTION_DEFINITION => self.visit_function(node),
            IMPORT_STATEMENT => self.visit_import(node),
            IMPORT_FROM_STATEMENT => self.visit_import_from(node),
            CALL => {
                if let Some(name) = node
                    .child_by_field_name("function")
                    .and_then(|callee| self.dotted_name(&callee))
                {
                    self.record.calls.push(name);
                }
            }
            _ => {}
        }

        self.visit_children(node);
    }

    fn visit_children(&mut self, node: &tree_sitter::Node) {
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            self.visit(&child);
        }
    }

    fn visit_class(&mut self, node: &tree_sitter::Node) {
        let Some(name) = node
            .child_by_field_name("name")
            .and_then(|n| node_text(&n, self.content))
        else {
            self.visit_children(node);
            return;
        };

        let mut bases: Vec<String> = Vec::new();
        if let Some(superclasses) = node.child_by_field_name("superclasses") {
            let mut cursor = superclasses.walk();
            for base in superclasses.named_children(&mut cursor) {
                if let Some(base_name) = self.dotted_name(&base) {
                    bases.push(base_name);
                }
            }
        }

        let mut class = ClassRecord::new(name, ClassKind::Class, self.path, node_line(node));
        class.end_line = Some(node_lines(node).end);
        let mut bases = bases.into_iter();
        class.parent = bases.next();
        class.interfaces = bases.collect();

        self.record.classes.push(class);
        self.class_stack.push(self.record.classes.len() - 1);
        self.visit_children(node);
        self.class_stack.pop();
    }

    fn visit_function(&mut self, node: &tree_sitter::Node) {
        let Some(name) = node
            .child_by_field_name("name")
            .and_then(|n| node_text(&n, self.content))
        else {
            return;
        };
        let parameters = node
            .child_by_field_name("parameters")
            .map(|p| self.positional_parameters(&p))
            .unwrap_or_default();

        if let Some(&class_index) = self.class_stack.last() {
            let class = &mut self.record.classes[class_index];
            let return_type = node
                .child_by_field_name("return_type")
                .and_then(|t| node_text(&t, self.content))
                .unwrap_or_default();
            class.methods.push(MethodRecord {
                name,
                class_name: class.name.clone(),
                return_type,
                parameters,
                lines: node_lines(node),
            });
        } else {
            self.record.functions.push(FunctionRecord {
                name,
                file: self.path.to_string(),
                line: node_line(node),
                parameters,
            });
        }
    }

    fn visit_import(&mut self, node: &tree_sitter::Node) {
        let mut cursor = node.walk();
        let names: Vec<String> = node
            .children_by_field_name("name", &mut cursor)
            .filter_map(|n| self.imported_name(&n))
            .collect();
        self.record.imports.extend(names);
    }

    fn visit_import_from(&mut self, node: &tree_sitter::Node) {
        use node_kinds::{DOTTED_NAME, RELATIVE_IMPORT, WILDCARD_IMPORT};

        let module = node
            .child_by_field_name("module_name")
            .and_then(|m| match m.kind() {
                DOTTED_NAME => node_text(&m, self.content),
                RELATIVE_IMPORT => {
                    node_text(&m, self.content).map(|t| t.trim_start_matches('.').to_string())
                }
                _ => None,
            })
            .unwrap_or_default();

        let mut names: Vec<String> = {
            let mut cursor = node.walk();
            node.children_by_field_name("name", &mut cursor)
                .filter_map(|n| self.imported_name(&n))
                .collect()
        };
        let mut cursor = node.walk();
        if node
            .children(&mut cursor)
            .any(|c| c.kind() == WILDCARD_IMPORT)
        {
            names.push("*".to_string());
        }

        for name in names {
            let qualified = if module.is_empty() {
                name
            } else {
                format!("{module}.{name}")
            };
            self.record.imports.push(qualified);
        }
    }

    /// Name of an imported item, ignoring any `as` alias.
    fn imported_name(&self, node: &tree_sitter::Node) -> Option<String> {
        use node_kinds::{ALIASED_IMPORT, DOTTED_NAME};

        match node.kind() {
            DOTTED_NAME => node_text(node, self.content),
            ALIASED_IMPORT => node
                .child_by_field_name("name")
                .and_then(|n| node_text(&n, self.content)),
            _ => None,
        }
    }

    /// Reduce an expression to a dotted name.
    ///
    /// Identifiers resolve to themselves and attribute chains to their full
    /// dotted path (`a.b.c`). Anything else resolves to `None`, including an
    /// attribute whose object is not itself reducible.
    fn dotted_name(&self, node: &tree_sitter::Node) -> Option<String> {
        use node_kinds::{ATTRIBUTE, IDENTIFIER};

        match node.kind() {
            IDENTIFIER => node_text(node, self.content),
            ATTRIBUTE => {
                let object = self.dotted_name(&node.child_by_field_name("object")?)?;
                let attribute = node_text(&node.child_by_field_name("attribute")?, self.content)?;
                Some(format!("{object}.{attribute}"))
            }
            _ => None,
        }
    }

    /// Names of the positional parameters of a `def`.
    ///
    /// Positional-only parameters (before `/`), `*args`, keyword-only
    /// parameters and `**kwargs` are excluded.
    fn positional_parameters(&self, parameters: &tree_sitter::Node) -> Vec<String> {
        use node_kinds::{
            DEFAULT_PARAMETER, DICTIONARY_SPLAT_PATTERN, IDENTIFIER, KEYWORD_SEPARATOR,
            LIST_SPLAT_PATTERN, POSITIONAL_SEPARATOR, TYPED_DEFAULT_PARAMETER, TYPED_PARAMETER,
        };

        let mut names = Vec::new();
        let mut cursor = parameters.walk();
        for param in parameters.named_children(&mut cursor) {
            let name = match param.kind() {
                IDENTIFIER => node_text(&param, self.content),
                TYPED_PARAMETER => param
                    .named_child(0)
                    .filter(|n| n.kind() == IDENTIFIER)
                    .and_then(|n| node_text(&n, self.content)),
                DEFAULT_PARAMETER | TYPED_DEFAULT_PARAMETER => param
                    .child_by_field_name("name")
                    .and_then(|n| node_text(&n, self.content)),
                POSITIONAL_SEPARATOR => {
                    names.clear();
                    continue;
                }
                LIST_SPLAT_PATTERN | DICTIONARY_SPLAT_PATTERN | KEYWORD_SEPARATOR => break,
                _ => None,
            };
            names.extend(name);
        }
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(code: &str) -> StructuralRecord {
        PythonExtractor
            .extract(code, "service.py")
            .expect("test code should parse")
    }

    const USER_SERVICE: &str = r#"
import os
import numpy as np
from collections import OrderedDict, defaultdict as dd
from .models import User
from . import helpers
from pkg.sub import *

class UserService(base.Service, LoggingMixin, metaclass=Meta):
    def __init__(self, db):
        self.db = Database()

    def create_user(self, name: str) -> User:
        user = User(name)
        self.validate_user(user)
        self.db.save(user)
        return user

def main(argv, verbose=False, *rest, flag=True, **kw):
    service = UserService(None)
    service.create_user("x")
"#;

    #[test]
    fn extracts_imports_as_dotted_strings() {
        let record = extract(USER_SERVICE);

        assert_eq!(
            record.imports,
            vec![
                "os",
                "numpy",
                "collections.OrderedDict",
                "collections.defaultdict",
                "models.User",
                "helpers",
                "pkg.sub.*",
            ]
        );
    }

    #[test]
    fn extracts_class_with_reduced_bases() {
        let record = extract(USER_SERVICE);

        assert_eq!(record.classes.len(), 1);
        let class = &record.classes[0];
        assert_eq!(class.name, "UserService");
        assert_eq!(class.line, 9);
        assert_eq!(class.parent.as_deref(), Some("base.Service"));
        assert_eq!(class.interfaces, vec!["LoggingMixin"]);
    }

    #[test]
    fn methods_belong_to_their_class_and_functions_stay_top_level() {
        let record = extract(USER_SERVICE);
        let class = &record.classes[0];

        let methods: Vec<_> = class.methods.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(methods, vec!["__init__", "create_user"]);
        assert_eq!(class.methods[1].parameters, vec!["self", "name"]);
        assert_eq!(class.methods[1].return_type, "User");
        assert_eq!(class.methods[1].lines.start, 13);
        assert_eq!(class.methods[1].lines.end, 17);

        assert_eq!(record.functions.len(), 1);
        assert_eq!(record.functions[0].name, "main");
        assert_eq!(record.functions[0].line, 19);
        assert_eq!(record.functions[0].parameters, vec!["argv", "verbose"]);
    }

    #[test]
    fn records_calls_with_dotted_callees() {
        let record = extract(USER_SERVICE);

        assert_eq!(
            record.calls,
            vec![
                "Database",
                "User",
                "self.validate_user",
                "self.db.save",
                "UserService",
                "service.create_user",
            ]
        );
    }

    #[test]
    fn subscript_call_is_skipped() {
        let record = extract("obj[0]()\n");
        assert!(record.calls.is_empty());

        let record = extract("foo()\n");
        assert_eq!(record.calls, vec!["foo"]);
    }

    #[test]
    fn call_on_call_result_is_skipped_but_inner_call_kept() {
        let record = extract("make().run()\n");
        assert_eq!(record.calls, vec!["make"]);
    }

    #[test]
    fn nested_class_restores_enclosing_scope() {
        let code = "class Outer:\n    class Inner:\n        def inner(self):\n            pass\n    def outer(self):\n        pass\n";
        let record = extract(code);

        assert_eq!(record.classes.len(), 2);
        assert_eq!(record.classes[0].methods[0].name, "outer");
        assert_eq!(record.classes[1].methods[0].name, "inner");
        assert!(record.functions.is_empty());
    }

    #[test]
    fn async_and_decorated_functions_are_recorded() {
        let code = "@app.route('/')\nasync def index(request):\n    return await render(request)\n";
        let record = extract(code);

        assert_eq!(record.functions[0].name, "index");
        assert_eq!(record.functions[0].line, 2);
        assert_eq!(record.calls, vec!["app.route", "render"]);
    }

    #[test]
    fn positional_only_parameters_are_excluded() {
        let record = extract("def f(a, b, /, c, d=1):\n    pass\n");
        assert_eq!(record.functions[0].parameters, vec!["c", "d"]);
    }

    #[test]
    fn syntax_error_is_a_parse_error_with_line() {
        let err = PythonExtractor
            .extract("x = 1\ndef broken(:\n    pass\n", "bad.py")
            .expect_err("broken code should not parse");

        assert_eq!(err.path, "bad.py");
        assert_eq!(err.line, 2);
    }

    #[test]
    fn empty_source_is_an_empty_record() {
        let record = extract("");
        assert!(record.is_empty());
    }
}
