//! Configuration types for Skein script generation.
//!
//! This module provides configuration structures that control how a narrative
//! graph is compiled and written. All types implement [`serde::Deserialize`]
//! with every field defaulted, so a configuration file only lists what it
//! changes.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining every section.
//! - [`OutputConfig`] - Generated file names and the generated-file prefix.
//! - [`ScriptConfig`] - Labels, text handling, menus and assets.
//! - [`CharactersConfig`] - Which entities become characters and how.
//! - [`Classification`] - Node type tag to role table (`[classification]`).
//!
//! # Example
//!
//! ```
//! # use skein::config::AppConfig;
//! let config = AppConfig::default();
//! assert_eq!(config.script().terminal_label(), "label_end");
//! assert_eq!(config.output().base_file(), "gen_base.rpy");
//! ```

use serde::Deserialize;

use skein_core::role::Classification;

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Output configuration section.
    #[serde(default)]
    output: OutputConfig,

    /// Script generation section.
    #[serde(default)]
    script: ScriptConfig,

    /// Character generation section.
    #[serde(default)]
    characters: CharactersConfig,

    /// Type tag to role overrides, merged over the built-in table.
    #[serde(default)]
    classification: Classification,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] from its sections.
    pub fn new(
        output: OutputConfig,
        script: ScriptConfig,
        characters: CharactersConfig,
        classification: Classification,
    ) -> Self {
        Self {
            output,
            script,
            characters,
            classification,
        }
    }

    /// Returns the output configuration.
    pub fn output(&self) -> &OutputConfig {
        &self.output
    }

    /// Returns the script configuration.
    pub fn script(&self) -> &ScriptConfig {
        &self.script
    }

    /// Returns the character configuration.
    pub fn characters(&self) -> &CharactersConfig {
        &self.characters
    }

    /// Returns the type tag classification.
    pub fn classification(&self) -> &Classification {
        &self.classification
    }
}

/// Names of the generated files.
///
/// Every file name is prefixed with `file_prefix`; the clean-up step relies
/// on the prefix to recognise files it may delete.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    file_prefix: String,
    base_file: String,
    characters_file: String,
    variables_file: String,
    log_file: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            file_prefix: "gen_".to_string(),
            base_file: "base.rpy".to_string(),
            characters_file: "characters.rpy".to_string(),
            variables_file: "variables.rpy".to_string(),
            log_file: "log.txt".to_string(),
        }
    }
}

impl OutputConfig {
    /// Prefix shared by every generated file.
    pub fn file_prefix(&self) -> &str {
        &self.file_prefix
    }

    /// File holding the `start` and terminal labels.
    pub fn base_file(&self) -> String {
        self.prefixed(&self.base_file)
    }

    pub fn characters_file(&self) -> String {
        self.prefixed(&self.characters_file)
    }

    pub fn variables_file(&self) -> String {
        self.prefixed(&self.variables_file)
    }

    /// File receiving the diagnostics report.
    pub fn log_file(&self) -> String {
        self.prefixed(&self.log_file)
    }

    /// Script file name of a container whose directory is `dir_name`.
    pub fn script_file(&self, dir_name: &str) -> String {
        format!("{}{dir_name}.rpy", self.file_prefix)
    }

    fn prefixed(&self, name: &str) -> String {
        format!("{}{name}", self.file_prefix)
    }
}

/// Settings that shape the generated script.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScriptConfig {
    label_prefix: String,
    end_label: String,
    paragraph_separator: String,
    markdown_text_styles: bool,
    menu_extend: bool,
    echo_menu_text_types: Vec<String>,
    text_label_types: Vec<String>,
    emit_comments: bool,
    priority_base: i64,
    attention_prefixes: Vec<String>,
    asset_root: String,
    asset_extensions: Vec<String>,
}

impl Default for ScriptConfig {
    fn default() -> Self {
        Self {
            label_prefix: "label_".to_string(),
            end_label: "end".to_string(),
            paragraph_separator: "\r\n\r\n".to_string(),
            markdown_text_styles: false,
            menu_extend: true,
            echo_menu_text_types: vec!["RenPyBoxMenuChoice".to_string()],
            text_label_types: vec!["RenPyEntryPoint".to_string()],
            emit_comments: true,
            priority_base: 1904,
            attention_prefixes: vec!["todo".to_string(), "fixme".to_string()],
            asset_root: "images".to_string(),
            asset_extensions: [".png", ".webp", ".gif", ".jpg", ".jpeg"]
                .map(String::from)
                .to_vec(),
        }
    }
}

impl ScriptConfig {
    /// Prefix of labels derived from node ids.
    pub fn label_prefix(&self) -> &str {
        &self.label_prefix
    }

    /// The label every dead end jumps to; it ends the game.
    pub fn terminal_label(&self) -> String {
        format!("{}{}", self.label_prefix, self.end_label)
    }

    /// Separator splitting a dialogue body into say statements.
    pub fn paragraph_separator(&self) -> &str {
        &self.paragraph_separator
    }

    pub fn markdown_text_styles(&self) -> bool {
        self.markdown_text_styles
    }

    /// Whether menus start with `extend ""` to keep the last line visible.
    pub fn menu_extend(&self) -> bool {
        self.menu_extend
    }

    /// Whether code blocks of `type_tag` repeat their menu text as dialogue
    /// when no directive says otherwise.
    pub fn echo_menu_text(&self, type_tag: &str) -> bool {
        self.echo_menu_text_types.iter().any(|t| t == type_tag)
    }

    /// Whether nodes of `type_tag` take their label from their text, so
    /// hand-written code can jump into the flow by name.
    pub fn label_from_text(&self, type_tag: &str) -> bool {
        self.text_label_types.iter().any(|t| t == type_tag)
    }

    pub fn emit_comments(&self) -> bool {
        self.emit_comments
    }

    /// Menu priority of options without an explicit one, before the node id
    /// is added.
    pub fn priority_base(&self) -> i64 {
        self.priority_base
    }

    /// Line prefixes (matched case-insensitively) that are reported.
    pub fn attention_prefixes(&self) -> &[String] {
        &self.attention_prefixes
    }

    /// Directory, relative to the game directory, that mirrors the
    /// container hierarchy for assets.
    pub fn asset_root(&self) -> &str {
        &self.asset_root
    }

    pub fn asset_extensions(&self) -> &[String] {
        &self.asset_extensions
    }

    pub fn with_label_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.label_prefix = prefix.into();
        self
    }

    pub fn with_markdown_text_styles(mut self, enabled: bool) -> Self {
        self.markdown_text_styles = enabled;
        self
    }

    pub fn with_menu_extend(mut self, enabled: bool) -> Self {
        self.menu_extend = enabled;
        self
    }

    pub fn with_echo_menu_text_types(mut self, types: Vec<String>) -> Self {
        self.echo_menu_text_types = types;
        self
    }

    pub fn with_text_label_types(mut self, types: Vec<String>) -> Self {
        self.text_label_types = types;
        self
    }

    pub fn with_emit_comments(mut self, enabled: bool) -> Self {
        self.emit_comments = enabled;
        self
    }
}

/// How entities become character definitions.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CharactersConfig {
    entity_types: Vec<String>,
    prefix: String,
    variable_set_feature: String,
    variable_set_property: String,
    name_variable: String,
}

impl Default for CharactersConfig {
    fn default() -> Self {
        Self {
            entity_types: vec!["Character".to_string()],
            prefix: "c_".to_string(),
            variable_set_feature: "FeatureVariableSet".to_string(),
            variable_set_property: "VariablesSetName".to_string(),
            name_variable: "name".to_string(),
        }
    }
}

impl CharactersConfig {
    /// Template display names whose entities become characters.
    pub fn entity_types(&self) -> &[String] {
        &self.entity_types
    }

    /// Prefix of generated character identifiers.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Feature and property naming the variable set that holds a
    /// character's display name.
    pub fn variable_set(&self) -> (&str, &str) {
        (&self.variable_set_feature, &self.variable_set_property)
    }

    /// Variable inside the set that holds the display name.
    pub fn name_variable(&self) -> &str {
        &self.name_variable
    }
}
