//! FTS5 match-expression building.
//!
//! The expression is always bound as a statement parameter; these helpers
//! only make sure the FTS5 query language treats every token as a literal.

use std::collections::HashSet;

/// Quote a term as an FTS5 string literal.
///
/// Embedded double quotes are doubled, so operators such as `OR`, `NEAR`,
/// `*` or `column:` inside a token stay plain text.
pub fn escape_fts5_term(term: &str) -> String {
    format!("\"{}\"", term.replace('"', "\"\""))
}

/// True if FTS5 would see no token characters in `term` at all.
fn is_blank_term(term: &str) -> bool {
    term.chars().all(|c| {
        c.is_whitespace() || c.is_control() || matches!(c, '\u{200B}'..='\u{200F}' | '\u{2060}' | '\u{FEFF}')
    })
}

/// Build an "any term" match expression from space-joined tokens.
///
/// Duplicate tokens are collapsed; order of first appearance is kept.
/// Returns an empty string when nothing searchable remains.
///
/// - `録画 メタデータ` → `"録画" OR "メタデータ"`
/// - `say "hi"` → `"say" OR """hi"""`
pub fn build_match_expression(joined_tokens: &str) -> String {
    let mut seen = HashSet::new();
    let mut parts = Vec::new();

    for term in joined_tokens.split(' ') {
        if is_blank_term(term) || !seen.insert(term) {
            continue;
        }
        parts.push(escape_fts5_term(term));
    }

    parts.join(" OR ")
}
