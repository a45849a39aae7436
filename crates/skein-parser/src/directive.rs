//! Parser for the directive mini-language embedded in node metadata.
//!
//! Authors attach instructions to a node through a single free-text field
//! (articy's stage directions). The field is a comma-separated list of items:
//!
//! ```text
//! label="market_intro", speaker="Vendor", 10, no_markdown, whispering
//! ```
//!
//! - `key="value"` sets a value (`label`, `speaker`, `pre`, `post`, ...)
//! - a bare integer is a menu priority; only the first one counts
//! - a bare word is a flag (`no_markdown`, `dont_repeat_menu_text`, ...)
//! - anything else is kept as a free-form note
//!
//! Parsing never fails. Items that look like a value assignment but are
//! malformed produce warnings and are skipped.

use indexmap::{IndexMap, IndexSet};
use winnow::{
    Parser as _,
    ascii::{digit1, space0},
    combinator::{alt, cut_err, opt, terminated},
    error::{ContextError, ErrMode, ModalResult},
    stream::{LocatingSlice, Location, Stream},
    token::{take_till, take_while},
};

use crate::{
    error::{Diagnostic, ErrorCode},
    span::Span,
};

/// Context attached to winnow errors so a failed item becomes a warning
/// with a code and a span.
#[derive(Debug, Clone, PartialEq, Eq)]
struct DirectiveDiagnostic {
    code: ErrorCode,
    message: &'static str,
    help: Option<&'static str>,
    start: usize,
}

type Input<'a> = LocatingSlice<&'a str>;
type IResult<O> = ModalResult<O, ContextError<DirectiveDiagnostic>>;

/// The parsed contents of a directive string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Directives {
    values: IndexMap<String, String>,
    flags: IndexSet<String>,
    priority: Option<i64>,
    notes: Vec<String>,
}

impl Directives {
    /// Returns the value of a `key="value"` item.
    pub fn value(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Returns `true` if the bare word `flag` appears as an item.
    pub fn has_flag(&self, flag: &str) -> bool {
        self.flags.contains(flag)
    }

    /// The first integer item, used to order menu options.
    pub fn priority(&self) -> Option<i64> {
        self.priority
    }

    /// Free-form items that are neither values, flags nor priorities.
    pub fn notes(&self) -> &[String] {
        &self.notes
    }

    /// Iterates over all `key="value"` items in source order.
    pub fn values(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Iterates over all flags in source order.
    pub fn flags(&self) -> impl Iterator<Item = &str> {
        self.flags.iter().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
            && self.flags.is_empty()
            && self.priority.is_none()
            && self.notes.is_empty()
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Item<'a> {
    Pair { key: &'a str, value: &'a str },
    Priority(i64),
    Flag(&'a str),
    Note(&'a str),
}

fn identifier<'a>(input: &mut Input<'a>) -> IResult<&'a str> {
    take_while(1.., |c: char| c.is_alphanumeric() || c == '_')
        .verify(|s: &str| s.chars().next().is_some_and(|c| c.is_alphabetic() || c == '_'))
        .parse_next(input)
}

/// Succeeds when only whitespace separates the cursor from the next `,` or
/// the end of input.
fn item_end(input: &mut Input<'_>) -> IResult<()> {
    space0.parse_next(input)?;
    if input.is_empty() || input.starts_with(',') {
        Ok(())
    } else {
        Err(ErrMode::Backtrack(ContextError::new()))
    }
}

fn quoted_value<'a>(input: &mut Input<'a>) -> IResult<&'a str> {
    let start = input.current_token_start();
    '"'.parse_next(input)?;
    cut_err(terminated(take_till(0.., '"'), '"'))
        .context(DirectiveDiagnostic {
            code: ErrorCode::E101,
            message: "unterminated directive value",
            help: Some("add the closing `\"`"),
            start,
        })
        .parse_next(input)
}

fn pair<'a>(input: &mut Input<'a>) -> IResult<Item<'a>> {
    let start = input.current_token_start();
    let key = terminated(identifier, (space0, '=')).parse_next(input)?;
    space0.parse_next(input)?;
    let value = cut_err(quoted_value)
        .context(DirectiveDiagnostic {
            code: ErrorCode::E100,
            message: "directive value must be quoted",
            help: Some("write the item as `key=\"value\"`"),
            start,
        })
        .parse_next(input)?;
    Ok(Item::Pair { key, value })
}

fn priority<'a>(input: &mut Input<'a>) -> IResult<Item<'a>> {
    terminated(
        (opt('-'), digit1)
            .take()
            .try_map(|digits: &str| digits.parse::<i64>()),
        item_end,
    )
    .map(Item::Priority)
    .parse_next(input)
}

fn flag<'a>(input: &mut Input<'a>) -> IResult<Item<'a>> {
    terminated(identifier, item_end)
        .map(Item::Flag)
        .parse_next(input)
}

fn note<'a>(input: &mut Input<'a>) -> IResult<Item<'a>> {
    take_till(1.., ',')
        .map(|text: &str| Item::Note(text.trim()))
        .parse_next(input)
}

fn item<'a>(input: &mut Input<'a>) -> IResult<Item<'a>> {
    alt((pair, priority, flag, note)).parse_next(input)
}

/// Accumulates items and warnings while walking a directive string.
struct DirectiveParser {
    directives: Directives,
    warnings: Vec<Diagnostic>,
}

impl DirectiveParser {
    fn new() -> Self {
        Self {
            directives: Directives::default(),
            warnings: Vec::new(),
        }
    }

    fn parse(&mut self, mut input: Input<'_>) {
        loop {
            let _ = space0::<_, ContextError>.parse_next(&mut input);
            if input.is_empty() {
                break;
            }
            if input.starts_with(',') {
                input.next_token();
                continue;
            }

            let start = input.current_token_start();
            match item(&mut input) {
                Ok(item) => {
                    let end = input.current_token_start();
                    self.apply(item, Span::new(start..end));
                    if item_end(&mut input).is_err() {
                        let position = input.current_token_start();
                        self.warnings.push(
                            Diagnostic::warning("expected `,` between directive items")
                                .with_code(ErrorCode::E100)
                                .with_label(
                                    Span::new(position..position + 1),
                                    ErrorCode::E100.description(),
                                ),
                        );
                        Self::skip_item(&mut input);
                    }
                }
                Err(err) => {
                    let position = input.current_token_start();
                    self.warnings.push(Self::convert_err_mode(err, start, position));
                    Self::skip_item(&mut input);
                }
            }
        }
    }

    fn apply(&mut self, item: Item<'_>, span: Span) {
        let directives = &mut self.directives;
        match item {
            Item::Pair { key, value } => {
                if directives
                    .values
                    .insert(key.to_string(), value.to_string())
                    .is_some()
                {
                    self.warnings.push(
                        Diagnostic::warning(format!("directive `{key}` is set more than once"))
                            .with_code(ErrorCode::E102)
                            .with_label(span, "this value wins")
                            .with_help("remove one of the assignments"),
                    );
                }
            }
            Item::Priority(priority) => {
                directives.priority.get_or_insert(priority);
            }
            Item::Flag(flag) => {
                directives.flags.insert(flag.to_string());
            }
            Item::Note(note) => directives.notes.push(note.to_string()),
        }
    }

    /// Moves the cursor past the next `,` (or to the end of input).
    fn skip_item(input: &mut Input<'_>) {
        while let Some(c) = input.next_token() {
            if c == ',' {
                break;
            }
        }
    }

    fn convert_err_mode(
        err: ErrMode<ContextError<DirectiveDiagnostic>>,
        item_start: usize,
        error_pos: usize,
    ) -> Diagnostic {
        let context_error = match err {
            ErrMode::Backtrack(ctx) | ErrMode::Cut(ctx) => ctx,
            ErrMode::Incomplete(_) => ContextError::new(),
        };

        if let Some(DirectiveDiagnostic {
            code,
            message,
            help,
            start,
        }) = context_error.context().next()
        {
            let mut diag = Diagnostic::warning(*message)
                .with_code(*code)
                .with_label(Span::new(*start..error_pos), code.description());
            if let Some(help) = help {
                diag = diag.with_help(*help);
            }
            return diag;
        }

        Diagnostic::warning("malformed directive")
            .with_code(ErrorCode::E100)
            .with_label(Span::new(item_start..error_pos), ErrorCode::E100.description())
    }
}

/// Parses a directive string.
///
/// Returns the directives together with the warnings raised by malformed
/// items. Spans in the warnings are byte offsets into `source`.
///
/// # Examples
///
/// ```
/// use skein_parser::directive::parse_directives;
///
/// let (directives, warnings) = parse_directives(r#"label="intro", 3, no_markdown"#);
///
/// assert!(warnings.is_empty());
/// assert_eq!(directives.value("label"), Some("intro"));
/// assert_eq!(directives.priority(), Some(3));
/// assert!(directives.has_flag("no_markdown"));
/// ```
pub fn parse_directives(source: &str) -> (Directives, Vec<Diagnostic>) {
    let mut parser = DirectiveParser::new();
    parser.parse(LocatingSlice::new(source));

    for warning in &parser.warnings {
        log::debug!(directive = source; "{warning}");
    }

    (parser.directives, parser.warnings)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_clean(source: &str) -> Directives {
        let (directives, warnings) = parse_directives(source);
        assert!(warnings.is_empty(), "unexpected warnings: {warnings:?}");
        directives
    }

    #[test]
    fn test_empty_source() {
        assert!(parse_clean("").is_empty());
        assert!(parse_clean("  ,  , ").is_empty());
    }

    #[test]
    fn test_values() {
        let directives = parse_clean(r#"label="intro", speaker = "Old Man", pre="at left""#);

        assert_eq!(directives.value("label"), Some("intro"));
        assert_eq!(directives.value("speaker"), Some("Old Man"));
        assert_eq!(directives.value("pre"), Some("at left"));
        assert_eq!(directives.value("post"), None);
    }

    #[test]
    fn test_quoted_value_may_contain_commas() {
        let directives = parse_clean(r#"post="with vpunch, hpunch", skip"#);

        assert_eq!(directives.value("post"), Some("with vpunch, hpunch"));
        assert!(directives.has_flag("skip"));
    }

    #[test]
    fn test_first_integer_is_priority() {
        let directives = parse_clean("whispering, 12, -3");

        assert_eq!(directives.priority(), Some(12));
        assert_eq!(directives.flags().collect::<Vec<_>>(), vec!["whispering"]);
    }

    #[test]
    fn test_negative_priority() {
        assert_eq!(parse_clean(" -7 ").priority(), Some(-7));
    }

    #[test]
    fn test_prose_becomes_note() {
        let directives = parse_clean("she looks away, 2 coins on the table, no_markdown");

        assert_eq!(
            directives.notes(),
            &["she looks away".to_string(), "2 coins on the table".to_string()]
        );
        assert!(directives.has_flag("no_markdown"));
        assert_eq!(directives.priority(), None);
    }

    #[test]
    fn test_unquoted_value_warns_and_is_skipped() {
        let (directives, warnings) = parse_directives("label=intro, 5");

        assert_eq!(directives.value("label"), None);
        assert_eq!(directives.priority(), Some(5));
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].code(), Some(ErrorCode::E100));
        assert!(warnings[0].severity().is_warning());
    }

    #[test]
    fn test_unterminated_value_warns() {
        let (directives, warnings) = parse_directives(r#"label="intro"#);

        assert!(directives.is_empty());
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].code(), Some(ErrorCode::E101));
        assert_eq!(warnings[0].labels()[0].span().start(), 6);
    }

    #[test]
    fn test_duplicate_key_last_wins() {
        let (directives, warnings) = parse_directives(r#"label="a", label="b""#);

        assert_eq!(directives.value("label"), Some("b"));
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].code(), Some(ErrorCode::E102));
    }

    #[test]
    fn test_text_after_value_warns() {
        let (directives, warnings) = parse_directives(r#"label="a" extra, 4"#);

        assert_eq!(directives.value("label"), Some("a"));
        assert_eq!(directives.priority(), Some(4));
        assert_eq!(warnings.len(), 1);
    }

    mod proptest_tests {
        use proptest::{prelude::*, test_runner::TestCaseError};

        use super::*;

        fn key_strategy() -> impl Strategy<Value = String> {
            "[a-z_][a-z0-9_]{0,10}"
        }

        fn value_strategy() -> impl Strategy<Value = String> {
            "[^\"]{0,20}"
        }

        fn check_parse_never_panics(source: &str) -> Result<(), TestCaseError> {
            let (_, warnings) = parse_directives(source);
            for warning in warnings {
                prop_assert!(warning.severity().is_warning());
                for label in warning.labels() {
                    prop_assert!(label.span().end() <= source.len() + 1);
                }
            }
            Ok(())
        }

        fn check_values_are_recovered(
            pairs: &[(String, String)],
        ) -> Result<(), TestCaseError> {
            let source = pairs
                .iter()
                .map(|(k, v)| format!("{k}=\"{v}\""))
                .collect::<Vec<_>>()
                .join(", ");
            let (directives, _) = parse_directives(&source);

            for (key, _) in pairs {
                let last = pairs.iter().rev().find(|(k, _)| k == key).map(|(_, v)| v);
                prop_assert_eq!(directives.value(key), last.map(String::as_str));
            }
            Ok(())
        }

        proptest! {
            #[test]
            fn parse_never_panics(source in ".{0,60}") {
                check_parse_never_panics(&source)?;
            }

            #[test]
            fn values_are_recovered(
                pairs in prop::collection::vec((key_strategy(), value_strategy()), 1..5)
            ) {
                check_values_are_recovered(&pairs)?;
            }
        }
    }
}
