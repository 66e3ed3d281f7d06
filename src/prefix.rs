//! Declaration-prefix tokenization.
//!
//! Visibility and modifier keywords are recognized only as whole tokens,
//! and on source lines only within the run of keywords that opens the
//! declaration. Identifiers that merely contain a keyword (`publicKey`,
//! `isStaticValue`, `exportData`) never produce tags.

use crate::lexer::{is_ident_char, is_ident_start, matching_paren};
use crate::types::{Modifier, NodeKind, Visibility, push_modifier};

/// Accessor keyword of a `get`/`set` declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accessor {
    Get,
    Set,
}

impl Accessor {
    pub fn kind(self) -> NodeKind {
        match self {
            Accessor::Get => NodeKind::Getter,
            Accessor::Set => NodeKind::Setter,
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            Accessor::Get => "get",
            Accessor::Set => "set",
        }
    }

    /// Display label for an accessor named `name`, e.g. `get displayName`.
    /// Names that already carry the prefix are kept as they are.
    pub fn label(self, name: &str) -> String {
        let kw = self.keyword();
        let prefixed = name
            .strip_prefix(kw)
            .is_some_and(|rest| rest.starts_with(' ') || rest.starts_with('_'));
        if prefixed {
            name.to_string()
        } else {
            format!("{kw} {name}")
        }
    }
}

enum Keyword {
    Visibility(Visibility),
    Modifier(Modifier),
    /// Declaration keywords that carry no tag but may precede the name.
    Silent,
}

fn classify(word: &str) -> Option<Keyword> {
    let kw = match word {
        "public" => Keyword::Visibility(Visibility::Public),
        "private" => Keyword::Visibility(Visibility::Private),
        "protected" => Keyword::Visibility(Visibility::Protected),
        "static" => Keyword::Modifier(Modifier::Static),
        "readonly" => Keyword::Modifier(Modifier::Readonly),
        "abstract" => Keyword::Modifier(Modifier::Abstract),
        "async" => Keyword::Modifier(Modifier::Async),
        "export" => Keyword::Modifier(Modifier::Export),
        "default" => Keyword::Modifier(Modifier::Default),
        "declare" | "override" | "accessor" => Keyword::Silent,
        _ => return None,
    };
    Some(kw)
}

/// Collects visibility keywords and resolves them by priority
/// private > protected > public.
#[derive(Default)]
struct VisibilitySeen {
    private: bool,
    protected: bool,
    public: bool,
}

impl VisibilitySeen {
    fn record(&mut self, v: Visibility) {
        match v {
            Visibility::Private => self.private = true,
            Visibility::Protected => self.protected = true,
            Visibility::Public => self.public = true,
        }
    }

    fn resolve(&self) -> Option<Visibility> {
        if self.private {
            Some(Visibility::Private)
        } else if self.protected {
            Some(Visibility::Protected)
        } else if self.public {
            Some(Visibility::Public)
        } else {
            None
        }
    }
}

/// The keyword run that opens a declaration line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclPrefix<'a> {
    pub visibility: Option<Visibility>,
    pub modifiers: Vec<Modifier>,
    /// The line text following the keyword run (starts at the name).
    pub rest: &'a str,
}

/// Strip leading decorators such as `@Input()` or `@Foo.bar({ x: 1 })`.
/// A decorator whose argument list does not close on this line is kept.
pub fn strip_decorators(line: &str) -> &str {
    let mut rest = line.trim_start();
    while let Some(after_at) = rest.strip_prefix('@') {
        let name_len = after_at
            .find(|c: char| !(is_ident_char(c) || c == '.'))
            .unwrap_or(after_at.len());
        if name_len == 0 {
            break;
        }
        let mut tail = &after_at[name_len..];
        if tail.starts_with('(') {
            match matching_paren(tail, 0) {
                Some(close) => tail = &tail[close + 1..],
                None => break,
            }
        }
        rest = tail.trim_start();
    }
    rest
}

fn starts_declaration(c: char) -> bool {
    is_ident_start(c) || matches!(c, '#' | '*' | '[' | '"' | '\'')
}

/// Tokenize the declaration prefix of a source line.
///
/// A keyword only counts when it is followed by whitespace and another
/// declaration token, so `public: boolean;` or `static() {}` declare members
/// named `public` and `static` instead.
pub fn scan_prefix(line: &str) -> DeclPrefix<'_> {
    let mut rest = strip_decorators(line);
    let mut seen = VisibilitySeen::default();
    let mut modifiers = Vec::new();

    loop {
        let word_len = rest.find(|c: char| !is_ident_char(c)).unwrap_or(rest.len());
        if word_len == 0 {
            break;
        }
        let Some(keyword) = classify(&rest[..word_len]) else {
            break;
        };
        let after = &rest[word_len..];
        let next = after.trim_start();
        if next.len() == after.len() || !next.chars().next().is_some_and(starts_declaration) {
            break;
        }
        match keyword {
            Keyword::Visibility(v) => seen.record(v),
            Keyword::Modifier(m) => push_modifier(&mut modifiers, m),
            Keyword::Silent => {}
        }
        rest = next;
    }

    DeclPrefix {
        visibility: seen.resolve(),
        modifiers,
        rest,
    }
}

/// If `rest` (a line past its prefix) starts with `get name` / `set name`,
/// return the accessor keyword and the name.
pub fn accessor_head(rest: &str) -> Option<(Accessor, &str)> {
    let (accessor, after) = if let Some(after) = rest.strip_prefix("get") {
        (Accessor::Get, after)
    } else if let Some(after) = rest.strip_prefix("set") {
        (Accessor::Set, after)
    } else {
        return None;
    };
    let name_start = after.trim_start();
    if name_start.len() == after.len() {
        return None;
    }
    let name_len = name_start
        .find(|c: char| !(is_ident_char(c) || c == '#'))
        .unwrap_or(name_start.len());
    let name = &name_start[..name_len];
    if name.is_empty() || !name.trim_start_matches('#').chars().next().is_some_and(is_ident_start) {
        return None;
    }
    Some((accessor, name))
}

/// Tags found in a symbol descriptor's free-form `detail` string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetailTags {
    pub visibility: Option<Visibility>,
    pub modifiers: Vec<Modifier>,
    pub accessor: Option<Accessor>,
}

/// Tokenize a descriptor detail on identifier boundaries.
pub fn scan_detail(detail: &str) -> DetailTags {
    let mut seen = VisibilitySeen::default();
    let mut tags = DetailTags::default();

    for token in detail.split(|c: char| !is_ident_char(c)).filter(|t| !t.is_empty()) {
        match classify(token) {
            Some(Keyword::Visibility(v)) => seen.record(v),
            Some(Keyword::Modifier(m)) => push_modifier(&mut tags.modifiers, m),
            Some(Keyword::Silent) => {}
            None => match token {
                "getter" if tags.accessor.is_none() => tags.accessor = Some(Accessor::Get),
                "setter" if tags.accessor.is_none() => tags.accessor = Some(Accessor::Set),
                _ => {}
            },
        }
    }
    if detail.contains("(get)") {
        tags.accessor = Some(Accessor::Get);
    } else if detail.contains("(set)") {
        tags.accessor = Some(Accessor::Set);
    }
    tags.visibility = seen.resolve();
    tags
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_collects_visibility_and_modifiers() {
        let p = scan_prefix("  private static readonly MAX: number = 3;");
        assert_eq!(p.visibility, Some(Visibility::Private));
        assert_eq!(p.modifiers, vec![Modifier::Static, Modifier::Readonly]);
        assert_eq!(p.rest, "MAX: number = 3;");
    }

    #[test]
    fn prefix_keeps_appearance_order() {
        let p = scan_prefix("export default async function main() {");
        assert_eq!(
            p.modifiers,
            vec![Modifier::Export, Modifier::Default, Modifier::Async]
        );
        assert_eq!(p.rest, "function main() {");
    }

    #[test]
    fn keyword_substrings_do_not_count() {
        let p = scan_prefix("isStaticValue: boolean = privateMode;");
        assert_eq!(p.visibility, None);
        assert!(p.modifiers.is_empty());
        assert_eq!(p.rest, "isStaticValue: boolean = privateMode;");
    }

    #[test]
    fn keyword_used_as_member_name() {
        let p = scan_prefix("public: boolean;");
        assert_eq!(p.visibility, None);
        assert_eq!(p.rest, "public: boolean;");

        let p = scan_prefix("static() {");
        assert!(p.modifiers.is_empty());
        assert_eq!(p.rest, "static() {");
    }

    #[test]
    fn keywords_in_body_are_ignored() {
        // `private` appears later on the line but not in the prefix.
        let p = scan_prefix("run(): void { this.call('private static'); }");
        assert_eq!(p.visibility, None);
        assert!(p.modifiers.is_empty());
    }

    #[test]
    fn silent_keywords_are_consumed() {
        let p = scan_prefix("protected override async render(): Promise<void> {");
        assert_eq!(p.visibility, Some(Visibility::Protected));
        assert_eq!(p.modifiers, vec![Modifier::Async]);
        assert_eq!(p.rest, "render(): Promise<void> {");
    }

    #[test]
    fn decorators_are_stripped() {
        assert_eq!(strip_decorators("@Input() name: string;"), "name: string;");
        assert_eq!(
            strip_decorators("@HostListener('click', ['$event']) @Log onClick(e) {"),
            "onClick(e) {"
        );
        assert_eq!(strip_decorators("@Component({"), "@Component({");
    }

    #[test]
    fn accessor_heads() {
        assert_eq!(
            accessor_head("get displayName(): string {"),
            Some((Accessor::Get, "displayName"))
        );
        assert_eq!(
            accessor_head("set value(v: number) {"),
            Some((Accessor::Set, "value"))
        );
        assert_eq!(accessor_head("get(key: string) {"), None);
        assert_eq!(accessor_head("getter: number;"), None);
        assert_eq!(accessor_head("settings = {};"), None);
    }

    #[test]
    fn accessor_labels() {
        assert_eq!(Accessor::Get.label("displayName"), "get displayName");
        assert_eq!(Accessor::Get.label("get displayName"), "get displayName");
        assert_eq!(Accessor::Set.label("set_value"), "set_value");
        assert_eq!(Accessor::Set.label("settings"), "set settings");
    }

    #[test]
    fn detail_tokens() {
        let tags = scan_detail("private static async");
        assert_eq!(tags.visibility, Some(Visibility::Private));
        assert_eq!(tags.modifiers, vec![Modifier::Static, Modifier::Async]);
        assert_eq!(tags.accessor, None);
    }

    #[test]
    fn detail_accessor_markers() {
        assert_eq!(scan_detail("(get)").accessor, Some(Accessor::Get));
        assert_eq!(scan_detail("public (set)").accessor, Some(Accessor::Set));
        assert_eq!(scan_detail("getter").accessor, Some(Accessor::Get));
        assert_eq!(scan_detail("getters").accessor, None);
    }

    #[test]
    fn detail_visibility_priority() {
        assert_eq!(
            scan_detail("public protected").visibility,
            Some(Visibility::Protected)
        );
        assert_eq!(
            scan_detail("private constructor").visibility,
            Some(Visibility::Private)
        );
        assert_eq!(scan_detail("publicKey").visibility, None);
    }
}
