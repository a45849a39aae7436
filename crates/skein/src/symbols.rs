//! Registry of every identifier defined in the generated script.
//!
//! Ren'Py shares one namespace between labels, character definitions and
//! named stores, so a single table guards all of them.

use indexmap::IndexSet;

use crate::compile::Error;

/// Insertion-ordered set of issued identifiers.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    symbols: IndexSet<String>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a new identifier.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateSymbol`] if the identifier was issued before.
    pub fn issue(&mut self, symbol: impl Into<String>) -> Result<(), Error> {
        let symbol = symbol.into();
        if self.symbols.contains(&symbol) {
            return Err(Error::DuplicateSymbol(symbol));
        }
        self.symbols.insert(symbol);
        Ok(())
    }

    /// Issues `base`, or the first free `base_1`, `base_2`, ... if taken.
    ///
    /// ```
    /// use skein::symbols::SymbolTable;
    ///
    /// let mut symbols = SymbolTable::new();
    /// assert_eq!(symbols.issue_speaker("c_anna"), "c_anna");
    /// assert_eq!(symbols.issue_speaker("c_anna"), "c_anna_1");
    /// ```
    pub fn issue_speaker(&mut self, base: &str) -> String {
        let name = if self.symbols.contains(base) {
            (1..)
                .map(|count| format!("{base}_{count}"))
                .find(|candidate| !self.symbols.contains(candidate))
                .unwrap_or_default()
        } else {
            base.to_string()
        };
        self.symbols.insert(name.clone());
        name
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.symbols.contains(symbol)
    }

    /// Iterates over issued identifiers in issue order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.symbols.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_rejects_duplicates() {
        let mut symbols = SymbolTable::new();

        symbols.issue("label_0x01").unwrap();
        let err = symbols.issue("label_0x01").unwrap_err();

        assert!(matches!(err, Error::DuplicateSymbol(ref s) if s == "label_0x01"));
        assert_eq!(symbols.len(), 1);
    }

    #[test]
    fn test_issue_speaker_skips_taken_suffixes() {
        let mut symbols = SymbolTable::new();
        symbols.issue("c_tom").unwrap();
        symbols.issue("c_tom_1").unwrap();

        assert_eq!(symbols.issue_speaker("c_tom"), "c_tom_2");
        assert_eq!(symbols.issue_speaker("c_tom"), "c_tom_3");
        assert!(symbols.contains("c_tom_2"));
    }

    #[test]
    fn test_labels_collide_with_speakers() {
        let mut symbols = SymbolTable::new();
        symbols.issue_speaker("c_eve");

        assert!(symbols.issue("c_eve").is_err());
        assert_eq!(
            symbols.iter().collect::<Vec<_>>(),
            vec!["c_eve"]
        );
    }
}
