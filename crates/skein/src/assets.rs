//! Asset placeholders in custom code blocks.
//!
//! Authors reference images relative to the container a code block lives in:
//!
//! ```text
//! scene {harbour.png} with dissolve
//! show {../shared/gull.webp}
//! ```
//!
//! Each `{name.ext}` group is rewritten to a quoted path below the configured
//! asset root that mirrors the container hierarchy. Every leading `../` walks
//! one level up.

use std::{
    collections::{BTreeSet, HashSet},
    path::PathBuf,
};

use crate::{config::ScriptConfig, hierarchy::Location};

/// Answers whether an asset path exists.
///
/// Paths are `/`-separated and relative to the game directory, e.g.
/// `images/act_one/harbour.png`.
pub trait AssetCatalog {
    fn contains(&self, path: &str) -> bool;
}

/// Checks assets against the files below a game directory.
#[derive(Debug, Clone)]
pub struct DirectoryAssets {
    root: PathBuf,
}

impl DirectoryAssets {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl AssetCatalog for DirectoryAssets {
    fn contains(&self, path: &str) -> bool {
        path.split('/')
            .fold(self.root.clone(), |dir, segment| dir.join(segment))
            .is_file()
    }
}

/// Accepts every asset; used when no game directory is known.
#[derive(Debug, Clone, Copy, Default)]
pub struct UncheckedAssets;

impl AssetCatalog for UncheckedAssets {
    fn contains(&self, _path: &str) -> bool {
        true
    }
}

impl AssetCatalog for BTreeSet<String> {
    fn contains(&self, path: &str) -> bool {
        BTreeSet::contains(self, path)
    }
}

impl AssetCatalog for HashSet<String> {
    fn contains(&self, path: &str) -> bool {
        HashSet::contains(self, path)
    }
}

/// One placeholder found in a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetReference {
    /// Resolved path, relative to the game directory.
    pub path: String,
    /// The placeholder walked above the output root and was clamped.
    pub clamped: bool,
}

/// Rewrites asset placeholders for code blocks of one location.
#[derive(Debug, Clone, Copy)]
pub struct AssetResolver<'a> {
    root: &'a str,
    extensions: &'a [String],
}

impl<'a> AssetResolver<'a> {
    pub fn new(config: &'a ScriptConfig) -> Self {
        Self {
            root: config.asset_root(),
            extensions: config.asset_extensions(),
        }
    }

    /// Rewrites every placeholder in `line` and reports what it resolved.
    ///
    /// Brace groups that do not end in a known asset extension (Ren'Py text
    /// tags, Python dicts) are left untouched.
    pub fn rewrite(&self, line: &str, location: &Location) -> (String, Vec<AssetReference>) {
        let mut rewritten = String::with_capacity(line.len());
        let mut references = Vec::new();
        let mut rest = line;

        while let Some(open) = rest.find('{') {
            let Some(close) = rest[open..].find('}').map(|offset| open + offset) else {
                break;
            };
            let inner = &rest[open + 1..close];
            rewritten.push_str(&rest[..open]);

            if self.is_asset(inner) {
                let reference = self.resolve(inner, location);
                rewritten.push('\'');
                rewritten.push_str(&reference.path);
                rewritten.push('\'');
                references.push(reference);
            } else {
                rewritten.push_str(&rest[open..=close]);
            }
            rest = &rest[close + 1..];
        }
        rewritten.push_str(rest);

        (rewritten, references)
    }

    fn is_asset(&self, inner: &str) -> bool {
        let lower = inner.to_lowercase();
        self.extensions
            .iter()
            .any(|extension| lower.ends_with(&extension.to_lowercase()))
    }

    fn resolve(&self, inner: &str, location: &Location) -> AssetReference {
        let mut name = inner.trim();
        let mut directory = location.clone();
        let mut clamped = false;

        while let Some(rest) = name.strip_prefix("../") {
            name = rest;
            match directory.parent() {
                Some(parent) => directory = parent,
                None => clamped = true,
            }
        }

        let path = std::iter::once(self.root)
            .chain(directory.segments().iter().map(String::as_str))
            .chain(name.split('/'))
            .filter(|segment| !segment.is_empty())
            .collect::<Vec<_>>()
            .join("/");

        AssetReference { path, clamped }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn location() -> Location {
        Location::root().join("act_one").join("harbour")
    }

    #[test]
    fn test_rewrite_relative_to_location() {
        let config = ScriptConfig::default();
        let resolver = AssetResolver::new(&config);

        let (line, references) = resolver.rewrite("scene {dock.png} with dissolve", &location());

        assert_eq!(line, "scene 'images/act_one/harbour/dock.png' with dissolve");
        assert_eq!(references.len(), 1);
        assert!(!references[0].clamped);
    }

    #[test]
    fn test_rewrite_walks_up() {
        let config = ScriptConfig::default();
        let resolver = AssetResolver::new(&config);

        let (line, _) = resolver.rewrite("show {../shared/gull.WEBP}", &location());

        assert_eq!(line, "show 'images/act_one/shared/gull.WEBP'");
    }

    #[test]
    fn test_rewrite_clamps_at_root() {
        let config = ScriptConfig::default();
        let resolver = AssetResolver::new(&config);

        let (line, references) = resolver.rewrite("show {../../../sky.jpg}", &location());

        assert_eq!(line, "show 'images/sky.jpg'");
        assert!(references[0].clamped);
    }

    #[test]
    fn test_text_tags_untouched() {
        let config = ScriptConfig::default();
        let resolver = AssetResolver::new(&config);

        let (line, references) =
            resolver.rewrite("$ renpy.notify(\"{b}Saved{/b}\") {", &location());

        assert_eq!(line, "$ renpy.notify(\"{b}Saved{/b}\") {");
        assert!(references.is_empty());
    }

    #[test]
    fn test_catalogs() {
        let known: BTreeSet<String> = ["images/a.png".to_string()].into();

        assert!(AssetCatalog::contains(&known, "images/a.png"));
        assert!(!AssetCatalog::contains(&known, "images/b.png"));
        assert!(UncheckedAssets.contains("anything"));
    }
}
