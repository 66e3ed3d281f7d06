//! Structured symbol descriptors to outline nodes.
//!
//! Descriptors only say *what* was declared and where; access levels,
//! modifier tags and accessor kinds are recovered from the descriptor's
//! detail text and, failing that, from the declaration prefix of the source
//! line it starts on.

use std::sync::LazyLock;

use regex::Regex;

use crate::document::Document;
use crate::lexer::first_word;
use crate::prefix::{Accessor, scan_detail, scan_prefix, strip_decorators};
use crate::symbols::{DescriptorKind, SymbolDescriptor};
use crate::types::{Modifier, NodeKind, OutlineNode, Visibility, push_modifier};

/// `get name` / `set name` behind any run of access/static keywords.
static ACCESSOR_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:(?:public|private|protected|static)\s+)*(get|set)\s+#?[A-Za-z_$][\w$]*")
        .expect("accessor regex is valid")
});

/// Convert a descriptor forest into outline nodes.
///
/// Descriptors of kinds the outline does not show are dropped together with
/// everything nested inside them.
pub fn convert(descriptors: &[SymbolDescriptor], doc: &Document) -> Vec<OutlineNode> {
    descriptors
        .iter()
        .filter_map(|desc| convert_one(desc, doc))
        .collect()
}

fn base_kind(kind: DescriptorKind) -> Option<NodeKind> {
    match kind {
        DescriptorKind::Class => Some(NodeKind::Class),
        DescriptorKind::Interface => Some(NodeKind::Interface),
        DescriptorKind::Method => Some(NodeKind::Method),
        DescriptorKind::Property => Some(NodeKind::Property),
        DescriptorKind::Function => Some(NodeKind::Function),
        DescriptorKind::Constructor => Some(NodeKind::Constructor),
        _ => None,
    }
}

fn convert_one(desc: &SymbolDescriptor, doc: &Document) -> Option<OutlineNode> {
    let kind = base_kind(desc.kind)?;
    let detail = scan_detail(desc.detail.as_deref().unwrap_or(""));
    let source_line = doc.line(desc.start_line).unwrap_or("");

    let (kind, name) = match kind {
        NodeKind::Method => match accessor_of(desc, &detail.accessor, source_line) {
            Some(accessor) => (accessor.kind(), accessor.label(&desc.name)),
            None => (NodeKind::Method, desc.name.clone()),
        },
        other => (other, desc.name.clone()),
    };

    let mut modifiers = detail.modifiers.clone();
    let visibility = match detail.visibility {
        Some(v) => v,
        None => {
            let prefix = scan_prefix(source_line);
            for m in prefix.modifiers {
                push_modifier(&mut modifiers, m);
            }
            prefix.visibility.unwrap_or(Visibility::Public)
        }
    };
    if first_word(strip_decorators(source_line)) == "export" {
        push_modifier(&mut modifiers, Modifier::Export);
    }

    let node = OutlineNode::new(name, kind, visibility, modifiers, desc.start_line);
    if kind.is_container() {
        Some(node.with_children(convert(&desc.children, doc)))
    } else {
        Some(node)
    }
}

/// Decide whether a method descriptor is really an accessor. The detail
/// marker wins, then the name, then the source line.
fn accessor_of(
    desc: &SymbolDescriptor,
    from_detail: &Option<Accessor>,
    source_line: &str,
) -> Option<Accessor> {
    if let Some(accessor) = from_detail {
        return Some(*accessor);
    }
    let name = desc.name.as_str();
    if name.starts_with("get ") || name.starts_with("get_") {
        return Some(Accessor::Get);
    }
    if name.starts_with("set ") || name.starts_with("set_") {
        return Some(Accessor::Set);
    }
    let caps = ACCESSOR_LINE.captures(strip_decorators(source_line))?;
    match caps.get(1)?.as_str() {
        "get" => Some(Accessor::Get),
        _ => Some(Accessor::Set),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
