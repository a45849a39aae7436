//! Translation of articy expressions into Python.
//!
//! articy:draft conditions and instructions use a C-like syntax
//! (`true`, `&&`, `||`, `!`). The rewrite works on tokens, so string
//! literals and identifiers such as `untrue_story` pass through unchanged.

/// Translates one expression.
///
/// ```
/// use skein::compile::translate;
///
/// assert_eq!(translate("true && !ready"), "True and not ready");
/// assert_eq!(translate("x != 3 || name == \"true\""), "x != 3 or name == \"true\"");
/// ```
pub fn translate(expression: &str) -> String {
    let chars: Vec<char> = expression.chars().collect();
    let mut out = String::with_capacity(expression.len() + 8);
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            '"' | '\'' => {
                let end = string_literal_end(&chars, i);
                out.extend(&chars[i..end]);
                i = end;
            }
            c if c.is_alphanumeric() || c == '_' => {
                let start = i;
                while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                let word: String = chars[start..i].iter().collect();
                match word.as_str() {
                    "true" => out.push_str("True"),
                    "false" => out.push_str("False"),
                    _ => out.push_str(&word),
                }
            }
            '&' if chars.get(i + 1) == Some(&'&') => {
                push_word(&mut out, "and", chars.get(i + 2));
                i += 2;
            }
            '|' if chars.get(i + 1) == Some(&'|') => {
                push_word(&mut out, "or", chars.get(i + 2));
                i += 2;
            }
            '!' if chars.get(i + 1) == Some(&'=') => {
                out.push_str("!=");
                i += 2;
            }
            '!' => {
                if out.chars().last().is_some_and(ends_operand) {
                    out.push(' ');
                }
                out.push_str("not");
                if chars.get(i + 1).is_some_and(|next| !next.is_whitespace()) {
                    out.push(' ');
                }
                i += 1;
            }
            _ => {
                out.push(c);
                i += 1;
            }
        }
    }

    out.trim().to_string()
}

/// Translates a condition; line breaks become spaces so the result fits on
/// one `if` line.
pub fn translate_condition(condition: &str) -> String {
    translate(&condition.replace(['\r', '\n'], " "))
}

/// Translates a batch of `;`-separated statements.
///
/// Line breaks are removed, `;` inside string literals does not split, and
/// blank statements are dropped.
///
/// ```
/// use skein::compile::translate_statements;
///
/// assert_eq!(
///     translate_statements("met = true;\r\ngold += 2;;"),
///     vec!["met = True", "gold += 2"]
/// );
/// ```
pub fn translate_statements(batch: &str) -> Vec<String> {
    let chars: Vec<char> = batch.chars().filter(|c| !matches!(c, '\r' | '\n')).collect();
    let mut statements = Vec::new();
    let mut start = 0;
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '"' | '\'' => i = string_literal_end(&chars, i),
            ';' => {
                statements.push(chars[start..i].iter().collect::<String>());
                i += 1;
                start = i;
            }
            _ => i += 1,
        }
    }
    statements.push(chars[start..].iter().collect());

    statements
        .iter()
        .map(|statement| translate(statement))
        .filter(|statement| !statement.is_empty())
        .collect()
}

/// Index one past the closing quote of the literal opening at `start`, or the
/// end of input for an unterminated literal.
fn string_literal_end(chars: &[char], start: usize) -> usize {
    let quote = chars[start];
    let mut i = start + 1;
    while i < chars.len() {
        match chars[i] {
            '\\' => i += 2,
            c if c == quote => return i + 1,
            _ => i += 1,
        }
    }
    chars.len()
}

fn ends_operand(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | ')' | ']' | '"' | '\'')
}

/// Appends a word operator with whitespace on both sides.
fn push_word(out: &mut String, word: &str, next: Option<&char>) {
    if out.chars().last().is_some_and(|last| !last.is_whitespace()) {
        out.push(' ');
    }
    out.push_str(word);
    if next.is_some_and(|next| !next.is_whitespace()) {
        out.push(' ');
    }
}
