//! Identifier management using string interning for efficient storage and comparison
//!
//! Node, pin and entity ids in an authoring-tool export are long strings such as
//! `0x0100000000000A2F`. They are compared and hashed constantly while the graph
//! is resolved, so they are interned once and passed around as the `Copy` type
//! [`Id`].

use std::{
    fmt,
    sync::{Mutex, OnceLock},
};

use string_interner::{DefaultStringInterner, DefaultSymbol};

/// Global string interner for identifier storage.
///
/// # Thread Safety
///
/// This uses `Mutex` for thread-safe access to the string interner. Interning is
/// content-addressed, so independent compilations in the same process never
/// observe each other through it.
static INTERNER: OnceLock<Mutex<DefaultStringInterner>> = OnceLock::new();

fn interner() -> std::sync::MutexGuard<'static, DefaultStringInterner> {
    INTERNER
        .get_or_init(|| Mutex::new(DefaultStringInterner::new()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Interned identifier of a node, pin or entity.
///
/// # Examples
///
/// ```
/// use skein_core::identifier::Id;
///
/// let node = Id::new("0x0100000000000A2F");
/// assert_eq!(node, "0x0100000000000A2F");
/// assert_eq!(node.as_number(), Some(0x0100000000000A2F));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Id(DefaultSymbol);

impl Id {
    /// Creates an `Id` from &str.
    pub fn new(name: &str) -> Self {
        Self(interner().get_or_intern(name))
    }

    /// Returns `true` if the identifier is the empty string.
    ///
    /// Exports use an empty id (or `0x0000000000000000`) for "no reference".
    pub fn is_empty(&self) -> bool {
        self.with_str(|s| s.is_empty() || s.trim_start_matches("0x").bytes().all(|b| b == b'0'))
    }

    /// Interprets the identifier as an unsigned integer.
    ///
    /// The radix is detected from the prefix: `0x` hexadecimal, `0o` octal,
    /// `0b` binary, decimal otherwise. Returns `None` if the text is not a number.
    ///
    /// # Examples
    ///
    /// ```
    /// use skein_core::identifier::Id;
    ///
    /// assert_eq!(Id::new("0x10").as_number(), Some(16));
    /// assert_eq!(Id::new("42").as_number(), Some(42));
    /// assert_eq!(Id::new("intro").as_number(), None);
    /// ```
    pub fn as_number(&self) -> Option<u64> {
        self.with_str(|s| {
            let s = s.trim();
            let lower = s.to_ascii_lowercase();
            if let Some(hex) = lower.strip_prefix("0x") {
                u64::from_str_radix(hex, 16).ok()
            } else if let Some(oct) = lower.strip_prefix("0o") {
                u64::from_str_radix(oct, 8).ok()
            } else if let Some(bin) = lower.strip_prefix("0b") {
                u64::from_str_radix(bin, 2).ok()
            } else {
                s.parse().ok()
            }
        })
    }

    fn with_str<R>(&self, f: impl FnOnce(&str) -> R) -> R {
        let interner = interner();
        let value = interner.resolve(self.0).unwrap_or_default();
        f(value)
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = self.with_str(str::to_owned);
        f.write_str(&value)
    }
}

impl std::str::FromStr for Id {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<&str> for Id {
    /// Creates an `Id` from a string slice
    ///
    /// # Examples
    ///
    /// ```
    /// use skein_core::identifier::Id;
    ///
    /// let id: Id = "0x01".into();
    /// assert_eq!(id, "0x01");
    /// ```
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl PartialEq<str> for Id {
    /// Allows direct comparison with string slices: `id == "string"`
    fn eq(&self, other: &str) -> bool {
        self.with_str(|s| s == other)
    }
}

impl PartialEq<&str> for Id {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}

impl<'de> serde::Deserialize<'de> for Id {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Ok(Self::new(&value))
    }
}
