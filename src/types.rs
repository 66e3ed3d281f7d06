//! Shared types and data structures.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The kind of an outline node. Closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Class,
    Interface,
    Constructor,
    Property,
    Method,
    Function,
    Getter,
    Setter,
}

impl NodeKind {
    /// Containers own child member nodes; every other kind is a leaf.
    pub fn is_container(self) -> bool {
        matches!(self, NodeKind::Class | NodeKind::Interface)
    }

    /// Rank used by category sorting (lower sorts first).
    pub fn category_rank(self) -> u16 {
        match self {
            NodeKind::Class => 0,
            NodeKind::Interface => 1,
            NodeKind::Constructor => 2,
            NodeKind::Property => 3,
            NodeKind::Getter => 4,
            NodeKind::Setter => 5,
            NodeKind::Method => 6,
            NodeKind::Function => 7,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Class => "class",
            NodeKind::Interface => "interface",
            NodeKind::Constructor => "constructor",
            NodeKind::Property => "property",
            NodeKind::Method => "method",
            NodeKind::Function => "function",
            NodeKind::Getter => "getter",
            NodeKind::Setter => "setter",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Access level of a declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Private,
    Protected,
}

impl Visibility {
    pub fn as_str(self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Private => "private",
            Visibility::Protected => "protected",
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A declaration modifier tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modifier {
    Static,
    Readonly,
    Abstract,
    Async,
    Export,
    Default,
}

impl Modifier {
    pub fn as_str(self) -> &'static str {
        match self {
            Modifier::Static => "static",
            Modifier::Readonly => "readonly",
            Modifier::Abstract => "abstract",
            Modifier::Async => "async",
            Modifier::Export => "export",
            Modifier::Default => "default",
        }
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Append `modifier` unless it is already present, keeping detection order.
pub fn push_modifier(modifiers: &mut Vec<Modifier>, modifier: Modifier) {
    if !modifiers.contains(&modifier) {
        modifiers.push(modifier);
    }
}

/// A normalized unit of the outline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlineNode {
    /// Identifier text; accessors carry a `get `/`set ` label.
    pub name: String,
    pub kind: NodeKind,
    pub visibility: Visibility,
    /// Modifier tags in detection order, without duplicates.
    pub modifiers: Vec<Modifier>,
    /// 0-based line number of the declaration.
    pub line: usize,
    /// `Some` (possibly empty) for containers, `None` for leaves.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<OutlineNode>>,
}

impl OutlineNode {
    /// Build a node, giving containers an empty child list and leaves none.
    pub fn new(
        name: impl Into<String>,
        kind: NodeKind,
        visibility: Visibility,
        modifiers: Vec<Modifier>,
        line: usize,
    ) -> Self {
        let mut deduped = Vec::with_capacity(modifiers.len());
        for m in modifiers {
            push_modifier(&mut deduped, m);
        }
        Self {
            name: name.into(),
            kind,
            visibility,
            modifiers: deduped,
            line,
            children: kind.is_container().then(Vec::new),
        }
    }

    /// Attach children to a container. Leaves ignore them.
    pub fn with_children(mut self, children: Vec<OutlineNode>) -> Self {
        if self.kind.is_container() {
            self.children = Some(children);
        }
        self
    }

    /// Push a child member. Returns `false` (and drops `child`) for leaves.
    pub fn push_child(&mut self, child: OutlineNode) -> bool {
        match self.children.as_mut() {
            Some(children) => {
                children.push(child);
                true
            }
            None => false,
        }
    }

    pub fn children(&self) -> &[OutlineNode] {
        self.children.as_deref().unwrap_or(&[])
    }

    pub fn has_modifier(&self, modifier: Modifier) -> bool {
        self.modifiers.contains(&modifier)
    }

    /// Multi-line summary: kind and name, visibility, modifiers, 1-based line.
    pub fn describe(&self) -> String {
        let mut out = format!("{}: {}", self.kind, self.name);
        out.push_str(&format!("\n• Visibility: {}", self.visibility));
        if !self.modifiers.is_empty() {
            let mods: Vec<&str> = self.modifiers.iter().map(|m| m.as_str()).collect();
            out.push_str(&format!("\n• Modifiers: {}", mods.join(", ")));
        }
        out.push_str(&format!("\n• Line: {}", self.line + 1));
        out
    }
}

/// Total number of nodes across all depths.
pub fn count_nodes(nodes: &[OutlineNode]) -> usize {
    nodes.iter().map(|n| 1 + count_nodes(n.children())).sum()
}

/// Find the node declared on `line`, or else the closest one declared
/// before it. Searches every depth in document order.
pub fn find_at_line(nodes: &[OutlineNode], line: usize) -> Option<&OutlineNode> {
    fn exact<'a>(nodes: &'a [OutlineNode], line: usize) -> Option<&'a OutlineNode> {
        for node in nodes {
            if node.line == line {
                return Some(node);
            }
            if let Some(found) = exact(node.children(), line) {
                return Some(found);
            }
        }
        None
    }

    fn closest<'a>(nodes: &'a [OutlineNode], line: usize, best: &mut Option<&'a OutlineNode>) {
        for node in nodes {
            if node.line <= line && best.is_none_or(|b| line - node.line < line - b.line) {
                *best = Some(node);
            }
            closest(node.children(), line, best);
        }
    }

    if let Some(found) = exact(nodes, line) {
        return Some(found);
    }
    let mut best = None;
    closest(nodes, line, &mut best);
    best
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<OutlineNode> {
        let class = OutlineNode::new("Foo", NodeKind::Class, Visibility::Public, vec![], 0)
            .with_children(vec![
                OutlineNode::new("x", NodeKind::Property, Visibility::Private, vec![], 1),
                OutlineNode::new("getX", NodeKind::Method, Visibility::Public, vec![], 3),
            ]);
        let func = OutlineNode::new(
            "helper",
            NodeKind::Function,
            Visibility::Private,
            vec![],
            10,
        );
        vec![class, func]
    }

    #[test]
    fn containers_start_with_empty_children() {
        let class = OutlineNode::new("A", NodeKind::Interface, Visibility::Public, vec![], 0);
        assert_eq!(class.children, Some(vec![]));
        let method = OutlineNode::new("m", NodeKind::Method, Visibility::Public, vec![], 0);
        assert_eq!(method.children, None);
    }

    #[test]
    fn leaves_reject_children() {
        let mut method = OutlineNode::new("m", NodeKind::Method, Visibility::Public, vec![], 0);
        let child = OutlineNode::new("x", NodeKind::Property, Visibility::Public, vec![], 1);
        assert!(!method.push_child(child.clone()));
        let method = method.with_children(vec![child]);
        assert!(method.children.is_none());
    }

    #[test]
    fn modifiers_are_deduplicated_in_order() {
        let node = OutlineNode::new(
            "m",
            NodeKind::Method,
            Visibility::Public,
            vec![Modifier::Abstract, Modifier::Async, Modifier::Abstract],
            0,
        );
        assert_eq!(node.modifiers, vec![Modifier::Abstract, Modifier::Async]);
    }

    #[test]
    fn category_ranks_follow_fixed_table() {
        let ordered = [
            NodeKind::Class,
            NodeKind::Interface,
            NodeKind::Constructor,
            NodeKind::Property,
            NodeKind::Getter,
            NodeKind::Setter,
            NodeKind::Method,
            NodeKind::Function,
        ];
        for pair in ordered.windows(2) {
            assert!(pair[0].category_rank() < pair[1].category_rank());
        }
    }

    #[test]
    fn count_includes_children() {
        assert_eq!(count_nodes(&sample()), 4);
    }

    #[test]
    fn find_exact_child() {
        let nodes = sample();
        assert_eq!(find_at_line(&nodes, 3).unwrap().name, "getX");
    }

    #[test]
    fn find_closest_preceding() {
        let nodes = sample();
        assert_eq!(find_at_line(&nodes, 5).unwrap().name, "getX");
        assert_eq!(find_at_line(&nodes, 42).unwrap().name, "helper");
    }

    #[test]
    fn find_before_first_node_is_none() {
        let nodes = vec![OutlineNode::new(
            "late",
            NodeKind::Function,
            Visibility::Public,
            vec![],
            7,
        )];
        assert!(find_at_line(&nodes, 2).is_none());
    }

    #[test]
    fn describe_uses_one_based_line() {
        let node = OutlineNode::new(
            "save",
            NodeKind::Method,
            Visibility::Private,
            vec![Modifier::Static, Modifier::Async],
            4,
        );
        let text = node.describe();
        assert!(text.starts_with("method: save"));
        assert!(text.contains("Visibility: private"));
        assert!(text.contains("Modifiers: static, async"));
        assert!(text.contains("Line: 5"));
    }

    #[test]
    fn leaf_json_omits_children() {
        let node = OutlineNode::new("m", NodeKind::Getter, Visibility::Public, vec![], 2);
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["kind"], "getter");
        assert_eq!(json["visibility"], "public");
        assert!(json.get("children").is_none());
    }
}
