//! Line-level lexical helpers shared by the outline strategies.
//!
//! These operate on a single line of source and only understand enough of
//! the language to skip string/template literals and trailing `//` comments.

/// Characters that may start an identifier.
pub fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

/// Characters that may continue an identifier.
pub fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// The `(byte offset, char)` pairs of `line` that are code: characters
/// inside string or template literals are dropped, and scanning stops at a
/// `//` comment. An unterminated literal swallows the rest of the line.
pub fn code_chars(line: &str) -> Vec<(usize, char)> {
    let mut out = Vec::with_capacity(line.len());
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut iter = line.char_indices().peekable();

    while let Some((i, c)) = iter.next() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' | '`' => quote = Some(c),
            '/' if iter.peek().is_some_and(|&(_, n)| n == '/') => break,
            _ => out.push((i, c)),
        }
    }
    out
}

/// `line` without its trailing `//` comment. Slashes inside literals are
/// kept.
pub fn strip_line_comment(line: &str) -> &str {
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut iter = line.char_indices().peekable();

    while let Some((i, c)) = iter.next() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' | '`' => quote = Some(c),
            '/' if iter.peek().is_some_and(|&(_, n)| n == '/') => return line[..i].trim_end(),
            _ => {}
        }
    }
    line
}

/// Net change in `{}` nesting contributed by `line`.
pub fn brace_delta(line: &str) -> i64 {
    code_chars(line).iter().fold(0, |acc, &(_, c)| match c {
        '{' => acc + 1,
        '}' => acc - 1,
        _ => acc,
    })
}

/// Whether `line` contains at least one code `{`.
pub fn opens_brace(line: &str) -> bool {
    code_chars(line).iter().any(|&(_, c)| c == '{')
}

/// Net change in `()` nesting contributed by `line`.
pub fn paren_delta(line: &str) -> i64 {
    code_chars(line).iter().fold(0, |acc, &(_, c)| match c {
        '(' => acc + 1,
        ')' => acc - 1,
        _ => acc,
    })
}

/// Byte offset of the `)` that closes the `(` at byte offset `open`.
pub fn matching_paren(s: &str, open: usize) -> Option<usize> {
    let mut depth = 0i64;
    for (i, c) in code_chars(s) {
        if i < open {
            continue;
        }
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// First whitespace-separated word of `line`.
pub fn first_word(line: &str) -> &str {
    line.split_whitespace().next().unwrap_or("")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn braces_counted_outside_strings() {
        assert_eq!(brace_delta("class A {"), 1);
        assert_eq!(brace_delta("}"), -1);
        assert_eq!(brace_delta("x = '{' + \"{{\" + `}`;"), 0);
        assert_eq!(brace_delta("if (a) { // }"), 1);
    }

    #[test]
    fn escaped_quotes_stay_inside_literal() {
        assert_eq!(brace_delta(r#"s = "a\"{"; {"#), 1);
    }

    #[test]
    fn unterminated_literal_swallows_rest() {
        assert_eq!(brace_delta("x = `multi { line"), 0);
    }

    #[test]
    fn parens_and_matching() {
        assert_eq!(paren_delta("async addPayment({"), 1);
        assert_eq!(paren_delta("}): Promise<any> {"), -1);
        let s = "run(a, (b) => c(d)): void {";
        assert_eq!(matching_paren(s, 3), Some(18));
        assert_eq!(matching_paren("open(a, b", 4), None);
    }

    #[test]
    fn opens_brace_ignores_literals() {
        assert!(opens_brace("foo() {"));
        assert!(!opens_brace("x = '{';"));
    }

    #[test]
    fn line_comments_are_stripped() {
        assert_eq!(strip_line_comment("x = 1; // note"), "x = 1;");
        assert_eq!(strip_line_comment("url = 'http://a';"), "url = 'http://a';");
        assert_eq!(strip_line_comment("// all comment"), "");
    }

    #[test]
    fn first_word_splits_on_whitespace() {
        assert_eq!(first_word("  return this.x;"), "return");
        assert_eq!(first_word("delete(id: string) {"), "delete(id:");
        assert_eq!(first_word(""), "");
    }
}
