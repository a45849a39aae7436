//! Character definitions generated from speaker entities.

use std::collections::HashMap;

use log::debug;

use skein_core::{identifier::Id, project::Entity};

use crate::{
    config::CharactersConfig,
    script::{Instruction, Script},
    symbols::SymbolTable,
    text,
};

/// Maps speaker entities to character identifiers.
pub trait SpeakerLookup {
    /// Returns the character identifier of an entity, if it is a character.
    fn speaker_name(&self, entity: Id) -> Option<&str>;
}

impl SpeakerLookup for HashMap<Id, String> {
    fn speaker_name(&self, entity: Id) -> Option<&str> {
        self.get(&entity).map(String::as_str)
    }
}

/// One `define <name> = Character(...)` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterDefinition {
    pub entity: Id,
    pub name: String,
    /// Quoted display name, or the quoted store path for dynamic names.
    pub display: String,
    pub dynamic: bool,
}

/// Every character of a project.
#[derive(Debug, Clone, Default)]
pub struct Cast {
    definitions: Vec<CharacterDefinition>,
    speakers: HashMap<Id, String>,
}

impl Cast {
    /// Creates the cast from the entities whose template is a character
    /// type.
    ///
    /// Identifiers are the configured prefix plus the first word of the
    /// display name; clashes get `_1`, `_2`, ... suffixes.
    pub fn from_entities(
        entities: &[Entity],
        config: &CharactersConfig,
        symbols: &mut SymbolTable,
    ) -> Self {
        let mut cast = Self::default();
        let (feature, property) = config.variable_set();

        for entity in entities {
            let is_character = entity
                .template_type
                .as_deref()
                .is_some_and(|kind| config.entity_types().iter().any(|t| t == kind));
            if !is_character {
                continue;
            }

            let base = format!("{}{}", config.prefix(), identifier_word(entity));
            let name = symbols.issue_speaker(&base);

            let variable_set = entity
                .feature_property(feature, property)
                .map(str::trim)
                .filter(|set| !set.is_empty());
            let (display, dynamic) = match variable_set {
                Some(set) => (format!("\"{set}.{}\"", config.name_variable()), true),
                None => (format!("\"{}\"", text::escape(&entity.display_name)), false),
            };

            debug!(entity:% = entity.id, name = name.as_str(); "Character defined");
            cast.speakers.insert(entity.id, name.clone());
            cast.definitions.push(CharacterDefinition {
                entity: entity.id,
                name,
                display,
                dynamic,
            });
        }

        cast
    }

    pub fn definitions(&self) -> &[CharacterDefinition] {
        &self.definitions
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Renders the characters file.
    pub fn to_script(&self) -> Script {
        let mut script: Script = self
            .definitions
            .iter()
            .map(|definition| Instruction::Define {
                name: definition.name.clone(),
                value: format!(
                    "Character({}, dynamic={})",
                    definition.display,
                    if definition.dynamic { "True" } else { "False" }
                ),
            })
            .collect();
        script.push(Instruction::Blank);
        script
    }
}

impl SpeakerLookup for Cast {
    fn speaker_name(&self, entity: Id) -> Option<&str> {
        self.speakers.speaker_name(entity)
    }
}

/// First word of the display name, lower-cased and reduced to identifier
/// characters; the entity id when nothing is left.
fn identifier_word(entity: &Entity) -> String {
    let word: String = entity
        .display_name
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_')
        .collect();

    if word.is_empty() {
        entity.id.to_string().to_lowercase()
    } else {
        word
    }
}
