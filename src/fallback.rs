//! Text-scanning outline strategy.
//!
//! Used when no structured symbol source is available. A single forward pass
//! over the lines tracks cumulative brace depth, the open container (class
//! or interface) and whether we are inside a block comment. Members are only
//! recognized on lines that start directly inside the container body, so
//! statements inside method bodies never show up as members.
//!
//! The scanner is total: any input produces a (possibly empty) tree.
//! Unbalanced braces are not repaired, and a container still open at the
//! end of the input keeps the children collected so far.

use std::sync::LazyLock;

use regex::Regex;

use crate::document::Document;
use crate::lexer::{
    brace_delta, is_ident_char, is_ident_start, matching_paren, opens_brace, paren_delta,
    strip_line_comment,
};
use crate::prefix::{accessor_head, scan_prefix, strip_decorators};
use crate::types::{Modifier, NodeKind, OutlineNode, Visibility, push_modifier};

/// Longest parameter list (in lines) that will be joined into one signature.
pub const MAX_JOIN_LINES: usize = 64;

/// Leading words that start statements, never member declarations.
const SKIP_WORDS: &[&str] = &[
    "if", "else", "for", "while", "do", "switch", "case", "default", "try", "catch", "finally",
    "return", "throw", "break", "continue", "const", "let", "var", "import", "export", "from",
    "where", "select", "in", "new", "await", "yield", "super", "delete", "typeof", "void",
];

static CONTAINER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(class|interface)\b(?:\s+([A-Za-z_$][\w$]*))?")
        .expect("container regex should compile")
});

static CONSTRUCTOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^constructor\s*\(").expect("constructor regex should compile"));

/// `{ a, b }: Type` inside a parameter list.
static DESTRUCTURED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\s*([^}]+)\s*\}\s*:\s*").expect("destructuring regex should compile")
});

/// Outline strategy that works on raw text alone.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextFallbackParser;

impl TextFallbackParser {
    pub fn parse(&self, doc: &Document) -> Vec<OutlineNode> {
        Scanner::new(doc.lines()).run()
    }
}

// ---------------------------------------------------------------------------
// Scanner state
// ---------------------------------------------------------------------------

struct OpenContainer {
    node: OutlineNode,
    /// Brace depth at the line that declared the container.
    open_depth: i64,
    /// Set once a `{` has been counted since the container opened.
    entered: bool,
}

struct Scanner<'a> {
    lines: &'a [String],
    depth: i64,
    in_block_comment: bool,
    open: Option<OpenContainer>,
    roots: Vec<OutlineNode>,
}

impl<'a> Scanner<'a> {
    fn new(lines: &'a [String]) -> Self {
        Self {
            lines,
            depth: 0,
            in_block_comment: false,
            open: None,
            roots: Vec::new(),
        }
    }

    fn run(mut self) -> Vec<OutlineNode> {
        let mut idx = 0;
        while idx < self.lines.len() {
            idx = self.step(idx);
        }
        if let Some(open) = self.open.take() {
            self.roots.push(open.node);
        }
        self.roots
    }

    /// Process line `idx` and return the index of the next line to scan.
    fn step(&mut self, idx: usize) -> usize {
        let Some(code) = self.code_line(idx) else {
            return idx + 1;
        };
        let line_depth = self.depth;

        let Some(body_depth) = self.open.as_ref().map(|o| o.open_depth + 1) else {
            if let Some(node) = match_container(code, idx) {
                self.open = Some(OpenContainer {
                    node,
                    open_depth: line_depth,
                    entered: false,
                });
            } else if line_depth == 0 {
                if let Some(node) = match_function(code, idx) {
                    self.roots.push(node);
                }
            }
            self.count(code);
            return idx + 1;
        };

        // A miscounted brace must not hide later containers.
        if line_depth <= body_depth {
            if let Some(node) = match_container(code, idx) {
                if let Some(open) = self.open.take() {
                    self.roots.push(open.node);
                }
                self.open = Some(OpenContainer {
                    node,
                    open_depth: line_depth,
                    entered: false,
                });
                self.count(code);
                return idx + 1;
            }
        }

        if line_depth == body_depth {
            if let Some((member, consumed)) = self.match_member(idx, code) {
                if let Some(open) = self.open.as_mut() {
                    open.node.push_child(member);
                }
                self.count(code);
                let lines = self.lines;
                for line in &lines[idx + 1..idx + consumed] {
                    self.count(strip_line_comment(line.trim()));
                }
                return idx + consumed;
            }
        }
        self.count(code);
        idx + 1
    }

    /// Code text of line `idx`, or `None` for blank and comment lines.
    fn code_line(&mut self, idx: usize) -> Option<&'a str> {
        let lines: &'a [String] = self.lines;
        let trimmed = lines[idx].trim();
        if self.in_block_comment {
            if trimmed.contains("*/") {
                self.in_block_comment = false;
            }
            return None;
        }
        if let Some(after) = trimmed.strip_prefix("/*") {
            let Some(end) = after.find("*/") else {
                self.in_block_comment = true;
                return None;
            };
            let code = strip_line_comment(after[end + 2..].trim());
            return (!code.is_empty()).then_some(code);
        }
        if trimmed.starts_with("//") || is_comment_continuation(trimmed) {
            return None;
        }
        let code = strip_line_comment(trimmed);
        (!code.is_empty()).then_some(code)
    }

    /// Add the braces of `code` to the depth and close the open container
    /// once its body has been left.
    fn count(&mut self, code: &str) {
        self.depth += brace_delta(code);
        let depth = self.depth;
        if let Some(open) = self.open.as_mut() {
            if opens_brace(code) || depth > open.open_depth {
                open.entered = true;
            }
        }
        if let Some(open) = self.open.take_if(|o| o.entered && depth <= o.open_depth) {
            self.roots.push(open.node);
        }
    }

    /// Try to read a member starting at line `idx`. Returns the member and
    /// the number of lines it spans.
    fn match_member(&self, idx: usize, code: &str) -> Option<(OutlineNode, usize)> {
        if paren_delta(code) > 0 {
            if let Some((joined, consumed)) = self.join_signature(idx, code) {
                if let Some(node) = match_member_text(&joined, idx) {
                    return Some((node, consumed));
                }
            }
        }
        match_member_text(code, idx).map(|node| (node, 1))
    }

    /// Join the lines of a parameter list that does not close on its first
    /// line. `None` when it is still open after [`MAX_JOIN_LINES`] lines.
    fn join_signature(&self, idx: usize, code: &str) -> Option<(String, usize)> {
        let mut joined = code.to_string();
        let mut balance = paren_delta(code);
        let mut next = idx + 1;
        while balance > 0 && next < self.lines.len() && next - idx < MAX_JOIN_LINES {
            let part = strip_line_comment(self.lines[next].trim());
            if !part.is_empty() {
                joined.push(' ');
                joined.push_str(part);
            }
            balance += paren_delta(part);
            next += 1;
        }
        (balance <= 0).then_some((joined, next - idx))
    }
}

/// Doc-comment continuation lines (`* text`, `*/`). A bare `*name(` is a
/// generator method, not a comment.
fn is_comment_continuation(trimmed: &str) -> bool {
    trimmed == "*"
        || trimmed.starts_with("* ")
        || trimmed.starts_with("*/")
        || trimmed.starts_with("**")
}

// ---------------------------------------------------------------------------
// Token helpers
// ---------------------------------------------------------------------------

/// Byte length of the identifier (optionally `#`-prefixed) at the start of `s`.
fn ident_len(s: &str) -> Option<usize> {
    let body = s.strip_prefix('#').unwrap_or(s);
    if !body.chars().next().is_some_and(is_ident_start) {
        return None;
    }
    let len = body.find(|c: char| !is_ident_char(c)).unwrap_or(body.len());
    Some(len + (s.len() - body.len()))
}

/// Text after keyword `kw` when `s` starts with it as a whole word.
fn after_keyword<'s>(s: &'s str, kw: &str) -> Option<&'s str> {
    let rest = s.strip_prefix(kw)?;
    if rest.chars().next().is_some_and(is_ident_char) {
        return None;
    }
    Some(rest.trim_start())
}

/// Skip a balanced `<...>` list at the start of `s`.
fn skip_angle(s: &str) -> Option<&str> {
    let bytes = s.as_bytes();
    let mut depth = 0i32;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'=' if bytes.get(i + 1) == Some(&b'>') => i += 1,
            b'<' => depth += 1,
            b'>' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&s[i + 1..]);
                }
            }
            _ => {}
        }
        i += 1;
    }
    None
}

/// Split `lhs = rhs` at the first top-level `=` that is not part of `=>`.
fn split_assignment(s: &str) -> Option<(&str, &str)> {
    let bytes = s.as_bytes();
    let mut depth = 0i32;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'=' if bytes.get(i + 1) == Some(&b'>') => i += 1,
            b'(' | b'<' | b'[' | b'{' => depth += 1,
            b')' | b'>' | b']' | b'}' => depth -= 1,
            b'=' if depth == 0 => return Some((s[..i].trim_end(), s[i + 1..].trim_start())),
            _ => {}
        }
        i += 1;
    }
    None
}

/// Field names bound by `{ a, b: renamed, ...rest }: Type` patterns.
fn destructured_fields(text: &str) -> Vec<&str> {
    DESTRUCTURED
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .flat_map(|m| m.as_str().split(','))
        .filter_map(|part| {
            let field = part.split([':', '=']).next()?.trim().trim_start_matches("...");
            (!field.is_empty()).then_some(field)
        })
        .collect()
}

fn starts_with_skipped_word(text: &str) -> bool {
    let len = text.find(|c: char| !is_ident_char(c)).unwrap_or(text.len());
    if !SKIP_WORDS.contains(&&text[..len]) {
        return false;
    }
    // `delete(id) {` or `default: string;` declare members with these names.
    let next = text[len..].trim_start().chars().next();
    !matches!(next, Some('(' | ':' | '?' | '!' | '<' | '='))
}

// ---------------------------------------------------------------------------
// Containers
// ---------------------------------------------------------------------------

fn match_container(code: &str, line: usize) -> Option<OutlineNode> {
    let prefix = scan_prefix(code);
    let caps = CONTAINER.captures(prefix.rest)?;
    let kind = match &caps[1] {
        "class" => NodeKind::Class,
        _ => NodeKind::Interface,
    };
    let is_default = prefix.modifiers.contains(&Modifier::Default);
    let name = match caps.get(2).map(|m| m.as_str()) {
        Some(name) if name != "extends" && name != "implements" => name,
        _ if is_default => "default",
        _ => return None,
    };
    let modifiers = prefix
        .modifiers
        .into_iter()
        .filter(|m| matches!(m, Modifier::Export | Modifier::Default | Modifier::Abstract))
        .collect();
    Some(OutlineNode::new(name, kind, Visibility::Public, modifiers, line))
}

// ---------------------------------------------------------------------------
// Members
// ---------------------------------------------------------------------------

/// `name[?][<T>](params)` at the start of `rest`, with the text after the
/// closing paren.
fn method_signature(rest: &str) -> Option<(&str, &str)> {
    let s = rest.strip_prefix('*').map(str::trim_start).unwrap_or(rest);
    let len = ident_len(s)?;
    let name = &s[..len];
    let mut after = &s[len..];
    after = after.strip_prefix('?').unwrap_or(after).trim_start();
    if after.starts_with('<') {
        after = skip_angle(after)?.trim_start();
    }
    if !after.starts_with('(') {
        return None;
    }
    let close = matching_paren(after, 0)?;
    Some((name, after[close + 1..].trim_start()))
}

/// Whether the text after a parameter list ends a method declaration
/// (block body, typed block body, `;` signature or bare signature).
fn is_method_tail(tail: &str) -> bool {
    tail.is_empty() || tail.starts_with('{') || tail.starts_with(';') || tail.starts_with(':')
}

/// `name[?!]: Type [= init]` or `name[?!] = init` at the start of `rest`.
fn property_name(rest: &str) -> Option<&str> {
    let len = ident_len(rest)?;
    let name = &rest[..len];
    let after = &rest[len..];
    let after = after.strip_prefix(['?', '!']).unwrap_or(after).trim_start();
    if let Some(ty) = after.strip_prefix(':') {
        let ty = ty.trim();
        return (!ty.is_empty() && ty != ";").then_some(name);
    }
    let init = after.strip_prefix('=')?;
    if init.starts_with('=') || init.starts_with('>') {
        return None;
    }
    Some(name)
}

fn match_member_text(text: &str, line: usize) -> Option<OutlineNode> {
    let text = strip_decorators(text);
    if text.is_empty() || starts_with_skipped_word(text) {
        return None;
    }
    let prefix = scan_prefix(text);
    let rest = prefix.rest;
    let guarded = destructured_fields(text);
    let accept = |name: &str| !guarded.contains(&name);

    let (name, kind) = if CONSTRUCTOR.is_match(rest) {
        ("constructor".to_string(), NodeKind::Constructor)
    } else if let Some((name, _)) = method_signature(rest)
        .filter(|_| prefix.modifiers.contains(&Modifier::Abstract))
    {
        (accept(name).then(|| name.to_string())?, NodeKind::Method)
    } else if let Some((accessor, _)) = accessor_head(rest) {
        let (name, tail) = method_signature(rest[accessor.keyword().len()..].trim_start())?;
        if !is_method_tail(tail) || !accept(name) {
            return None;
        }
        (accessor.label(name), accessor.kind())
    } else if let Some((name, tail)) = method_signature(rest) {
        if !is_method_tail(tail) || !accept(name) {
            return None;
        }
        (name.to_string(), NodeKind::Method)
    } else {
        let name = property_name(rest).filter(|name| accept(*name))?;
        (name.to_string(), NodeKind::Property)
    };

    let visibility = prefix.visibility.unwrap_or_default();
    Some(OutlineNode::new(name, kind, visibility, prefix.modifiers, line))
}

// ---------------------------------------------------------------------------
// Top-level functions
// ---------------------------------------------------------------------------

/// For an arrow (or function expression) value, whether it is `async`.
fn arrow_value(value: &str) -> Option<bool> {
    let (is_async, value) = match after_keyword(value, "async") {
        Some(rest) => (true, rest),
        None => (false, value),
    };
    if after_keyword(value, "function").is_some() {
        return Some(is_async);
    }
    let value = if value.starts_with('<') {
        skip_angle(value)?.trim_start()
    } else {
        value
    };
    if value.starts_with('(') {
        return match matching_paren(value, 0) {
            // parameter list continues on the next line
            None => Some(is_async),
            Some(close) => {
                let tail = value[close + 1..].trim_start();
                let arrow = tail.starts_with("=>") || (tail.starts_with(':') && tail.contains("=>"));
                arrow.then_some(is_async)
            }
        };
    }
    let len = ident_len(value)?;
    value[len..].trim_start().starts_with("=>").then_some(is_async)
}

/// Name of the function declared by `rest` and whether its value is async.
fn function_name(rest: &str, is_default: bool) -> Option<(&str, bool)> {
    if let Some(after) = after_keyword(rest, "function") {
        let after = after.strip_prefix('*').map(str::trim_start).unwrap_or(after);
        return match ident_len(after) {
            Some(len) => Some((&after[..len], false)),
            None if is_default => Some(("default", false)),
            None => None,
        };
    }
    if let Some(after) = after_keyword(rest, "const") {
        let (lhs, value) = split_assignment(after)?;
        let len = ident_len(lhs)?;
        let annotation = lhs[len..].trim_start();
        if !(annotation.is_empty() || annotation.starts_with(':')) {
            return None;
        }
        return arrow_value(value).map(|is_async| (&lhs[..len], is_async));
    }
    if is_default {
        return arrow_value(rest).map(|is_async| ("default", is_async));
    }
    None
}

fn match_function(code: &str, line: usize) -> Option<OutlineNode> {
    let prefix = scan_prefix(code);
    let is_default = prefix.modifiers.contains(&Modifier::Default);
    let (name, value_async) = function_name(prefix.rest, is_default)?;

    let mut modifiers: Vec<Modifier> = prefix
        .modifiers
        .into_iter()
        .filter(|m| matches!(m, Modifier::Export | Modifier::Default | Modifier::Async))
        .collect();
    if value_async {
        push_modifier(&mut modifiers, Modifier::Async);
    }
    let visibility = if modifiers.contains(&Modifier::Export) {
        Visibility::Public
    } else {
        Visibility::Private
    };
    Some(OutlineNode::new(name, NodeKind::Function, visibility, modifiers, line))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
