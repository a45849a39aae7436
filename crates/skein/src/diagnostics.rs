//! Recoverable problems found while compiling.
//!
//! The log groups messages by the generated file they concern. It is only
//! ever appended to; compilation never reads it back.

use std::fmt::{self, Write as _};

use indexmap::IndexMap;
use log::warn;

const INDENT: &str = "    ";

/// Insertion-ordered warnings, grouped by output location.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticsLog {
    entries: IndexMap<String, Vec<String>>,
}

impl DiagnosticsLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a message for `location` and mirrors it to the logger.
    pub fn log(&mut self, location: impl fmt::Display, message: impl Into<String>) {
        let location = location.to_string();
        let message = message.into();
        warn!(location = location.as_str(); "{message}");
        self.entries.entry(location).or_default().push(message);
    }

    /// Iterates over locations and their messages in first-logged order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(location, messages)| (location.as_str(), messages.as_slice()))
    }

    /// Total number of messages.
    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Renders the report: each location on its own line, followed by its
    /// messages indented by four spaces.
    pub fn render(&self) -> String {
        let mut report = String::new();
        for (location, messages) in &self.entries {
            let _ = writeln!(report, "{location}");
            for message in messages {
                let _ = writeln!(report, "{INDENT}{message}");
            }
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_groups_by_location() {
        let mut log = DiagnosticsLog::new();
        log.log("act_one/gen_act_one.rpy", "first");
        log.log("gen_variables.rpy", "second");
        log.log("act_one/gen_act_one.rpy", "third");

        assert_eq!(log.len(), 3);
        let locations: Vec<_> = log.entries().map(|(location, _)| location).collect();
        assert_eq!(locations, vec!["act_one/gen_act_one.rpy", "gen_variables.rpy"]);
    }

    #[test]
    fn test_render() {
        let mut log = DiagnosticsLog::new();
        log.log("a.rpy", "one");
        log.log("a.rpy", "two");

        assert_eq!(log.render(), "a.rpy\n    one\n    two\n");
        assert!(DiagnosticsLog::new().render().is_empty());
    }
}
