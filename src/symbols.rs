//! Structured symbol sources.
//!
//! A [`SymbolSource`] turns a document into nested [`SymbolDescriptor`]s
//! without the outline engine re-scanning text. [`TreeSitterSymbols`] walks a
//! tree-sitter TypeScript/TSX syntax tree; [`JsonSymbols`] loads descriptors
//! dumped by another tool, including the `DocumentSymbol` shape returned by
//! language servers (`range.start.line`, numeric `kind`).

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tree_sitter::{Language, Node, Parser};

use crate::document::{Document, Lang};
use crate::errors::SymbolSourceError;

// ---------------------------------------------------------------------------
// Descriptor model
// ---------------------------------------------------------------------------

/// Declaration kind reported by a symbol source. Open-ended: kinds the
/// outline does not display are still reported and filtered later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RawKind", into = "&'static str")]
pub enum DescriptorKind {
    File,
    Module,
    Namespace,
    Class,
    Method,
    Property,
    Field,
    Constructor,
    Enum,
    Interface,
    Function,
    Variable,
    Constant,
    EnumMember,
    TypeParameter,
    Other,
}

impl DescriptorKind {
    /// Map a language-server `SymbolKind` number.
    pub fn from_lsp(code: u64) -> Self {
        match code {
            1 => DescriptorKind::File,
            2 | 4 => DescriptorKind::Module,
            3 => DescriptorKind::Namespace,
            5 => DescriptorKind::Class,
            6 => DescriptorKind::Method,
            7 => DescriptorKind::Property,
            8 => DescriptorKind::Field,
            9 => DescriptorKind::Constructor,
            10 => DescriptorKind::Enum,
            11 => DescriptorKind::Interface,
            12 => DescriptorKind::Function,
            13 => DescriptorKind::Variable,
            14 => DescriptorKind::Constant,
            22 => DescriptorKind::EnumMember,
            26 => DescriptorKind::TypeParameter,
            _ => DescriptorKind::Other,
        }
    }

    /// Map a kind name, case-insensitively (`"class"`, `"enumMember"`, ...).
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().replace('_', "").as_str() {
            "file" => DescriptorKind::File,
            "module" | "package" => DescriptorKind::Module,
            "namespace" => DescriptorKind::Namespace,
            "class" => DescriptorKind::Class,
            "method" => DescriptorKind::Method,
            "property" => DescriptorKind::Property,
            "field" => DescriptorKind::Field,
            "constructor" => DescriptorKind::Constructor,
            "enum" => DescriptorKind::Enum,
            "interface" => DescriptorKind::Interface,
            "function" => DescriptorKind::Function,
            "variable" => DescriptorKind::Variable,
            "constant" => DescriptorKind::Constant,
            "enummember" => DescriptorKind::EnumMember,
            "typeparameter" => DescriptorKind::TypeParameter,
            _ => DescriptorKind::Other,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DescriptorKind::File => "file",
            DescriptorKind::Module => "module",
            DescriptorKind::Namespace => "namespace",
            DescriptorKind::Class => "class",
            DescriptorKind::Method => "method",
            DescriptorKind::Property => "property",
            DescriptorKind::Field => "field",
            DescriptorKind::Constructor => "constructor",
            DescriptorKind::Enum => "enum",
            DescriptorKind::Interface => "interface",
            DescriptorKind::Function => "function",
            DescriptorKind::Variable => "variable",
            DescriptorKind::Constant => "constant",
            DescriptorKind::EnumMember => "enumMember",
            DescriptorKind::TypeParameter => "typeParameter",
            DescriptorKind::Other => "other",
        }
    }
}

impl fmt::Display for DescriptorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<DescriptorKind> for &'static str {
    fn from(kind: DescriptorKind) -> Self {
        kind.as_str()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawKind {
    Code(u64),
    Name(String),
}

impl From<RawKind> for DescriptorKind {
    fn from(raw: RawKind) -> Self {
        match raw {
            RawKind::Code(code) => DescriptorKind::from_lsp(code),
            RawKind::Name(name) => DescriptorKind::from_name(&name),
        }
    }
}

/// One declaration reported by a symbol source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawDescriptor")]
pub struct SymbolDescriptor {
    pub kind: DescriptorKind,
    pub name: String,
    /// Free-form qualifier text (modifiers, accessor markers).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// 0-based line where the declaration starts.
    pub start_line: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<SymbolDescriptor>,
}

impl SymbolDescriptor {
    pub fn new(kind: DescriptorKind, name: impl Into<String>, start_line: usize) -> Self {
        Self {
            kind,
            name: name.into(),
            detail: None,
            start_line,
            children: Vec::new(),
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        let detail = detail.into();
        self.detail = (!detail.is_empty()).then_some(detail);
        self
    }

    pub fn with_children(mut self, children: Vec<SymbolDescriptor>) -> Self {
        self.children = children;
        self
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDescriptor {
    kind: DescriptorKind,
    name: String,
    #[serde(default)]
    detail: Option<String>,
    #[serde(default)]
    start_line: Option<usize>,
    #[serde(default)]
    range: Option<RawRange>,
    #[serde(default)]
    children: Vec<SymbolDescriptor>,
}

#[derive(Deserialize)]
struct RawRange {
    start: RawPosition,
}

#[derive(Deserialize)]
struct RawPosition {
    line: usize,
}

impl TryFrom<RawDescriptor> for SymbolDescriptor {
    type Error = String;

    fn try_from(raw: RawDescriptor) -> Result<Self, Self::Error> {
        let start_line = raw
            .start_line
            .or(raw.range.map(|r| r.start.line))
            .ok_or_else(|| format!("symbol `{}` has neither startLine nor range", raw.name))?;
        Ok(SymbolDescriptor {
            kind: raw.kind,
            name: raw.name,
            detail: raw.detail.filter(|d| !d.is_empty()),
            start_line,
            children: raw.children,
        })
    }
}

// ---------------------------------------------------------------------------
// Source trait
// ---------------------------------------------------------------------------

/// Something that can report the declarations of a document.
pub trait SymbolSource {
    fn document_symbols(&self, doc: &Document) -> Result<Vec<SymbolDescriptor>, SymbolSourceError>;
}

impl<T: SymbolSource + ?Sized> SymbolSource for Box<T> {
    fn document_symbols(&self, doc: &Document) -> Result<Vec<SymbolDescriptor>, SymbolSourceError> {
        (**self).document_symbols(doc)
    }
}

impl<T: SymbolSource + ?Sized> SymbolSource for &T {
    fn document_symbols(&self, doc: &Document) -> Result<Vec<SymbolDescriptor>, SymbolSourceError> {
        (**self).document_symbols(doc)
    }
}

// ---------------------------------------------------------------------------
// JSON descriptor files
// ---------------------------------------------------------------------------

/// Descriptors loaded from a JSON file on every lookup.
#[derive(Debug, Clone)]
pub struct JsonSymbols {
    path: PathBuf,
}

impl JsonSymbols {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parse a JSON array of descriptors.
    pub fn parse(text: &str) -> Result<Vec<SymbolDescriptor>, SymbolSourceError> {
        Ok(serde_json::from_str(text)?)
    }
}

impl SymbolSource for JsonSymbols {
    fn document_symbols(&self, _doc: &Document) -> Result<Vec<SymbolDescriptor>, SymbolSourceError> {
        let text = std::fs::read_to_string(&self.path)?;
        Self::parse(&text)
    }
}

// ---------------------------------------------------------------------------
// Tree-sitter
// ---------------------------------------------------------------------------

/// Return the Tree-sitter [`Language`] grammar for the given language.
fn grammar_for(lang: Lang) -> Language {
    match lang {
        Lang::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
        Lang::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
    }
}

/// Create a new [`Parser`] configured for the given language.
pub fn get_parser(lang: Lang) -> Result<Parser, SymbolSourceError> {
    let mut parser = Parser::new();
    parser
        .set_language(&grammar_for(lang))
        .map_err(|e| SymbolSourceError::Grammar(e.to_string()))?;
    Ok(parser)
}

/// Symbol source backed by the bundled tree-sitter TypeScript grammars.
#[derive(Debug, Clone, Copy, Default)]
pub struct TreeSitterSymbols;

impl SymbolSource for TreeSitterSymbols {
    fn document_symbols(&self, doc: &Document) -> Result<Vec<SymbolDescriptor>, SymbolSourceError> {
        let lang = doc.lang().ok_or(SymbolSourceError::Unsupported)?;
        let mut parser = get_parser(lang)?;
        let tree = parser
            .parse(doc.text(), None)
            .ok_or(SymbolSourceError::ParseFailed)?;

        let src = doc.text().as_bytes();
        let mut symbols = Vec::new();
        collect_statements(tree.root_node(), src, &mut symbols);
        Ok(symbols)
    }
}

/// Get the text content of a node.
fn node_text<'a>(node: Node, src: &'a [u8]) -> &'a str {
    node.utf8_text(src).unwrap_or("")
}

/// Find a named child by its field name and return its text.
fn field_text<'a>(node: Node, field: &str, src: &'a [u8]) -> Option<&'a str> {
    node.child_by_field_name(field).map(|n| node_text(n, src))
}

/// Whether `node` has a direct (possibly anonymous) child of kind `token`.
fn has_token(node: Node, token: &str) -> bool {
    (0..node.child_count())
        .filter_map(|i| node.child(i as u32))
        .any(|c| c.kind() == token)
}

/// Row of the first child that is not a decorator or comment.
fn declaration_row(node: Node) -> usize {
    (0..node.child_count())
        .filter_map(|i| node.child(i as u32))
        .find(|c| !matches!(c.kind(), "decorator" | "comment"))
        .map(|c| c.start_position().row)
        .unwrap_or_else(|| node.start_position().row)
}

/// Modifier keywords written before a member's name, as detail tokens.
fn member_detail(node: Node, src: &[u8]) -> String {
    let name_start = node
        .child_by_field_name("name")
        .map(|n| n.start_byte())
        .unwrap_or(usize::MAX);

    let mut tokens: Vec<String> = Vec::new();
    for i in 0..node.child_count() {
        let Some(child) = node.child(i as u32) else {
            continue;
        };
        if child.start_byte() >= name_start {
            break;
        }
        match child.kind() {
            "accessibility_modifier" => tokens.push(node_text(child, src).to_string()),
            "override_modifier" => tokens.push("override".to_string()),
            "static" | "async" | "readonly" | "abstract" | "declare" => {
                tokens.push(child.kind().to_string())
            }
            "get" => tokens.push("(get)".to_string()),
            "set" => tokens.push("(set)".to_string()),
            _ => {}
        }
    }
    tokens.join(" ")
}

/// Join outer qualifiers (e.g. `export default`) with node-level ones.
fn join_detail(outer: &[&str], own: &[&str]) -> String {
    outer
        .iter()
        .chain(own.iter())
        .copied()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Walk the statements of a program or namespace body.
fn collect_statements(node: Node, src: &[u8], out: &mut Vec<SymbolDescriptor>) {
    for i in 0..node.named_child_count() {
        if let Some(child) = node.named_child(i as u32) {
            collect_declaration(child, src, &[], None, out);
        }
    }
}

/// Try to extract descriptors from one statement-level node.
///
/// `outer` carries qualifiers from an enclosing `export` statement, and
/// `line` the row of that statement.
fn collect_declaration(
    node: Node,
    src: &[u8],
    outer: &[&str],
    line: Option<usize>,
    out: &mut Vec<SymbolDescriptor>,
) {
    let row = line.unwrap_or_else(|| declaration_row(node));
    match node.kind() {
        "export_statement" => {
            let mut tags = vec!["export"];
            if has_token(node, "default") {
                tags.push("default");
            }
            let row = declaration_row(node);
            if let Some(decl) = node.child_by_field_name("declaration") {
                collect_declaration(decl, src, &tags, Some(row), out);
            } else if let Some(value) = node.child_by_field_name("value") {
                collect_default_value(value, src, &tags, row, out);
            }
        }
        "ambient_declaration" => {
            for i in 0..node.named_child_count() {
                if let Some(child) = node.named_child(i as u32) {
                    collect_declaration(child, src, outer, Some(row), out);
                }
            }
        }
        "class_declaration" | "abstract_class_declaration" => {
            let Some(name) = field_text(node, "name", src) else {
                return;
            };
            out.push(class_descriptor(node, name, src, outer, row));
        }
        "interface_declaration" => {
            let Some(name) = field_text(node, "name", src) else {
                return;
            };
            let children = node
                .child_by_field_name("body")
                .map(|body| members(body, src))
                .unwrap_or_default();
            out.push(
                SymbolDescriptor::new(DescriptorKind::Interface, name, row)
                    .with_detail(join_detail(outer, &[]))
                    .with_children(children),
            );
        }
        "function_declaration" | "generator_function_declaration" | "function_signature" => {
            let Some(name) = field_text(node, "name", src) else {
                return;
            };
            let own: &[&str] = if has_token(node, "async") { &["async"] } else { &[] };
            out.push(
                SymbolDescriptor::new(DescriptorKind::Function, name, row)
                    .with_detail(join_detail(outer, own)),
            );
        }
        "lexical_declaration" | "variable_declaration" => {
            let is_const = has_token(node, "const");
            for i in 0..node.named_child_count() {
                let Some(declarator) = node.named_child(i as u32) else {
                    continue;
                };
                if declarator.kind() != "variable_declarator" {
                    continue;
                }
                if let Some(desc) = variable_descriptor(declarator, src, outer, row, is_const) {
                    out.push(desc);
                }
            }
        }
        "internal_module" | "module" => {
            let Some(name) = field_text(node, "name", src) else {
                return;
            };
            let mut children = Vec::new();
            if let Some(body) = node.child_by_field_name("body") {
                collect_statements(body, src, &mut children);
            }
            out.push(
                SymbolDescriptor::new(DescriptorKind::Namespace, name, row)
                    .with_detail(join_detail(outer, &[]))
                    .with_children(children),
            );
        }
        "enum_declaration" => {
            if let Some(name) = field_text(node, "name", src) {
                out.push(
                    SymbolDescriptor::new(DescriptorKind::Enum, name, row)
                        .with_detail(join_detail(outer, &[])),
                );
            }
        }
        "type_alias_declaration" => {
            if let Some(name) = field_text(node, "name", src) {
                out.push(
                    SymbolDescriptor::new(DescriptorKind::TypeParameter, name, row)
                        .with_detail(join_detail(outer, &[])),
                );
            }
        }
        _ => {}
    }
}

/// `export default <expression>`: anonymous functions and classes are
/// reported under the name `default`.
fn collect_default_value(
    value: Node,
    src: &[u8],
    outer: &[&str],
    row: usize,
    out: &mut Vec<SymbolDescriptor>,
) {
    match value.kind() {
        "arrow_function" | "function_expression" | "function" | "generator_function" => {
            let name = field_text(value, "name", src).unwrap_or("default");
            let own: &[&str] = if has_token(value, "async") { &["async"] } else { &[] };
            out.push(
                SymbolDescriptor::new(DescriptorKind::Function, name, row)
                    .with_detail(join_detail(outer, own)),
            );
        }
        "class" => {
            let name = field_text(value, "name", src).unwrap_or("default");
            out.push(class_descriptor(value, name, src, outer, row));
        }
        _ => {}
    }
}

fn class_descriptor(
    node: Node,
    name: &str,
    src: &[u8],
    outer: &[&str],
    row: usize,
) -> SymbolDescriptor {
    let own: &[&str] = if node.kind() == "abstract_class_declaration" {
        &["abstract"]
    } else {
        &[]
    };
    let children = node
        .child_by_field_name("body")
        .map(|body| members(body, src))
        .unwrap_or_default();
    SymbolDescriptor::new(DescriptorKind::Class, name, row)
        .with_detail(join_detail(outer, own))
        .with_children(children)
}

/// `const name = (...) => ...` is reported as a function; any other
/// binding as a variable or constant.
fn variable_descriptor(
    declarator: Node,
    src: &[u8],
    outer: &[&str],
    row: usize,
    is_const: bool,
) -> Option<SymbolDescriptor> {
    let name_node = declarator.child_by_field_name("name")?;
    if name_node.kind() != "identifier" {
        return None;
    }
    let name = node_text(name_node, src);
    let value = declarator.child_by_field_name("value");

    let (kind, own): (DescriptorKind, &[&str]) = match value.map(|v| v.kind()) {
        Some("arrow_function" | "function_expression" | "function" | "generator_function") => {
            let is_async = value.is_some_and(|v| has_token(v, "async"));
            let own: &[&str] = match (is_const, is_async) {
                (true, true) => &["const", "async"],
                (true, false) => &["const"],
                (false, true) => &["async"],
                (false, false) => &[],
            };
            (DescriptorKind::Function, own)
        }
        _ if is_const => (DescriptorKind::Constant, &["const"]),
        _ => (DescriptorKind::Variable, &[]),
    };
    Some(SymbolDescriptor::new(kind, name, row).with_detail(join_detail(outer, own)))
}

/// Members of a class or interface body.
fn members(body: Node, src: &[u8]) -> Vec<SymbolDescriptor> {
    let mut out = Vec::new();
    for i in 0..body.named_child_count() {
        let Some(member) = body.named_child(i as u32) else {
            continue;
        };
        let kind = match member.kind() {
            "method_definition" | "method_signature" | "abstract_method_signature" => {
                DescriptorKind::Method
            }
            "public_field_definition" | "property_signature" => DescriptorKind::Property,
            _ => continue,
        };
        let Some(name) = field_text(member, "name", src) else {
            continue;
        };
        let kind = if kind == DescriptorKind::Method && name == "constructor" {
            DescriptorKind::Constructor
        } else {
            kind
        };
        out.push(
            SymbolDescriptor::new(kind, name, declaration_row(member))
                .with_detail(member_detail(member, src)),
        );
    }
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
