//! Semantic roles and the type-tag classification table.
//!
//! The authoring tool lets users declare new node templates, so a node's type
//! tag is an open string. The compiler only understands the closed set of
//! [`Role`]s; [`Classification`] maps one onto the other and is supplied by
//! configuration.

use std::{fmt, str::FromStr};

use indexmap::IndexMap;
use serde::Deserialize;

/// The semantic category a node's type tag maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Grouping node whose contents map to a nested output location.
    Container,
    /// A line (or several paragraphs) of spoken or narrated text.
    DialogueLine,
    /// Two-way branch on a boolean expression.
    BranchCondition,
    /// Node without content that only forwards the flow.
    PassThroughHub,
    /// Batch of side-effect statements.
    SideEffectInstruction,
    /// Jump to a statically declared node.
    UnconditionalJump,
    /// Verbatim target-language code.
    CustomCodeBlock,
    /// Walked but never emitted.
    Ignored,
}

impl Role {
    /// Returns the configuration name of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Container => "container",
            Role::DialogueLine => "dialogue_line",
            Role::BranchCondition => "branch_condition",
            Role::PassThroughHub => "pass_through_hub",
            Role::SideEffectInstruction => "side_effect_instruction",
            Role::UnconditionalJump => "unconditional_jump",
            Role::CustomCodeBlock => "custom_code_block",
            Role::Ignored => "ignored",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "container" => Ok(Role::Container),
            "dialogue_line" => Ok(Role::DialogueLine),
            "branch_condition" => Ok(Role::BranchCondition),
            "pass_through_hub" => Ok(Role::PassThroughHub),
            "side_effect_instruction" => Ok(Role::SideEffectInstruction),
            "unconditional_jump" => Ok(Role::UnconditionalJump),
            "custom_code_block" => Ok(Role::CustomCodeBlock),
            "ignored" => Ok(Role::Ignored),
            other => Err(format!("unknown node role `{other}`")),
        }
    }
}

/// Mapping from node type tag to [`Role`].
///
/// The default table covers the articy:draft built-in types plus the
/// `RenPyBox` templates. When deserialized, the supplied entries are merged
/// over the defaults, so a configuration only lists new or changed tags:
///
/// ```toml
/// [classification]
/// CutScene = "custom_code_block"
/// Comment = "dialogue_line"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "IndexMap<String, Role>")]
pub struct Classification {
    roles: IndexMap<String, Role>,
}

impl Classification {
    /// Creates an empty classification; every type tag is unrecognised.
    pub fn empty() -> Self {
        Self {
            roles: IndexMap::new(),
        }
    }

    /// Adds or replaces the role of a type tag.
    pub fn with(mut self, type_tag: impl Into<String>, role: Role) -> Self {
        self.insert(type_tag, role);
        self
    }

    /// Adds or replaces the role of a type tag.
    pub fn insert(&mut self, type_tag: impl Into<String>, role: Role) {
        self.roles.insert(type_tag.into(), role);
    }

    /// Returns the role of a type tag, or `None` if the tag is unrecognised.
    pub fn role_of(&self, type_tag: &str) -> Option<Role> {
        self.roles.get(type_tag).copied()
    }

    /// Iterates over all `(type tag, role)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Role)> {
        self.roles.iter().map(|(tag, role)| (tag.as_str(), *role))
    }
}

impl Default for Classification {
    fn default() -> Self {
        Self::empty()
            .with("FlowFragment", Role::Container)
            .with("Dialogue", Role::Container)
            .with("DialogueFragment", Role::DialogueLine)
            .with("Hub", Role::PassThroughHub)
            .with("RenPyEntryPoint", Role::PassThroughHub)
            .with("Jump", Role::UnconditionalJump)
            .with("Condition", Role::BranchCondition)
            .with("Instruction", Role::SideEffectInstruction)
            .with("RenPyBox", Role::CustomCodeBlock)
            .with("RenPyBoxMenuChoice", Role::CustomCodeBlock)
            .with("Comment", Role::Ignored)
    }
}

impl From<IndexMap<String, Role>> for Classification {
    fn from(overrides: IndexMap<String, Role>) -> Self {
        let mut classification = Self::default();
        for (tag, role) in overrides {
            classification.insert(tag, role);
        }
        classification
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table() {
        let classification = Classification::default();

        assert_eq!(classification.role_of("FlowFragment"), Some(Role::Container));
        assert_eq!(
            classification.role_of("DialogueFragment"),
            Some(Role::DialogueLine)
        );
        assert_eq!(classification.role_of("Comment"), Some(Role::Ignored));
        assert_eq!(classification.role_of("Location"), None);
    }

    #[test]
    fn test_overrides_merge_over_defaults() {
        let mut overrides = IndexMap::new();
        overrides.insert("CutScene".to_string(), Role::CustomCodeBlock);
        overrides.insert("Comment".to_string(), Role::DialogueLine);

        let classification = Classification::from(overrides);

        assert_eq!(
            classification.role_of("CutScene"),
            Some(Role::CustomCodeBlock)
        );
        assert_eq!(classification.role_of("Comment"), Some(Role::DialogueLine));
        assert_eq!(classification.role_of("Hub"), Some(Role::PassThroughHub));
    }

    #[test]
    fn test_role_round_trips_through_name() {
        for role in [
            Role::Container,
            Role::DialogueLine,
            Role::BranchCondition,
            Role::PassThroughHub,
            Role::SideEffectInstruction,
            Role::UnconditionalJump,
            Role::CustomCodeBlock,
            Role::Ignored,
        ] {
            assert_eq!(role.as_str().parse::<Role>(), Ok(role));
        }
        assert!("branch".parse::<Role>().is_err());
    }
}
