//! Text helpers shared by the emitters.

use std::sync::LazyLock;

use regex::Regex;

static BOLD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*(.*?)\*\*").expect("bold pattern is valid"));
static ITALIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*(.*?)\*").expect("italic pattern is valid"));
static UNDERLINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"_(.*?)_").expect("underline pattern is valid"));

/// Escapes the characters Ren'Py treats specially inside dialogue strings.
///
/// ```
/// assert_eq!(skein::text::escape(r#"50% "off""#), r#"50\% \"off\""#);
/// ```
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '"' | '\'' | '%') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Converts Markdown emphasis to Ren'Py text tags.
///
/// `**bold**`, `*italic*` and `_underline_` become `{b}`, `{i}` and `{u}`
/// tags. Text inside `[...]` is an interpolation and is left alone.
///
/// ```
/// use skein::text::markdown_styles;
///
/// assert_eq!(
///     markdown_styles("**Run**, [player_name]!"),
///     "{b}Run{/b}, [player_name]!"
/// );
/// ```
pub fn markdown_styles(text: &str) -> String {
    let mut styled = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(open) = rest.find('[') {
        let Some(close) = rest[open..].find(']').map(|offset| open + offset) else {
            break;
        };
        styled.push_str(&style_segment(&rest[..open]));
        styled.push_str(&rest[open..=close]);
        rest = &rest[close + 1..];
    }
    styled.push_str(&style_segment(rest));
    styled
}

fn style_segment(segment: &str) -> String {
    let segment = BOLD.replace_all(segment, "{b}${1}{/b}");
    let segment = ITALIC.replace_all(&segment, "{i}${1}{/i}");
    UNDERLINE.replace_all(&segment, "{u}${1}{/u}").into_owned()
}

/// Prepares author text for a quoted say statement or menu caption.
///
/// The text is escaped, line breaks become `\n`, and Markdown emphasis is
/// converted when `markdown` is set.
pub fn dialogue_text(text: &str, markdown: bool) -> String {
    let escaped = escape(text.trim_matches(['\r', '\n']))
        .replace("\r\n", "\\n")
        .replace(['\r', '\n'], "\\n");
    if markdown {
        markdown_styles(&escaped)
    } else {
        escaped
    }
}

/// Quotes a value as a Python string literal.
pub fn python_string(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Splits free text into non-empty comment lines.
pub fn comment_lines(text: &str) -> impl Iterator<Item = &str> {
    text.lines()
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.trim().is_empty())
}

/// Turns a display name into a directory name.
///
/// The name is lower-cased, spaces become `_`, and characters other than
/// letters, digits, `_`, `-` and `.` are dropped. Returns `None` when nothing
/// usable is left.
pub fn slug(name: &str) -> Option<String> {
    let slug: String = name
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| if c == ' ' { '_' } else { c })
        .filter(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
        .collect();

    if slug.chars().all(|c| c == '.') {
        None
    } else {
        Some(slug)
    }
}
