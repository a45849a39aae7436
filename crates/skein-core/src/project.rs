//! Export-level records that accompany the narrative graph.
//!
//! A [`Project`] is everything the compiler reads from one export: the graph,
//! the flow tree that orders containers, the global variable declarations, and
//! the entities that may act as speakers.

use indexmap::IndexMap;

use crate::{graph::Graph, identifier::Id};

/// One element of the exported flow tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowEntry {
    id: Id,
    children: Vec<FlowEntry>,
}

impl FlowEntry {
    pub fn new(id: Id) -> Self {
        Self {
            id,
            children: Vec::new(),
        }
    }

    pub fn with_child(mut self, child: FlowEntry) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: Vec<FlowEntry>) -> Self {
        self.children = children;
        self
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn children(&self) -> &[FlowEntry] {
        &self.children
    }
}

/// Declared type of a global variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VariableType {
    Boolean,
    Integer,
    String,
    /// Any type name the target has no representation for.
    Other(String),
}

impl From<&str> for VariableType {
    fn from(name: &str) -> Self {
        match name {
            "Boolean" => VariableType::Boolean,
            "Integer" => VariableType::Integer,
            "String" => VariableType::String,
            other => VariableType::Other(other.to_string()),
        }
    }
}

/// A global variable with its initial value as exported (always text).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    pub name: String,
    pub kind: VariableType,
    pub value: String,
    pub description: String,
}

/// A named set of global variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableNamespace {
    pub name: String,
    pub description: String,
    pub variables: Vec<Variable>,
}

/// An entity record (characters, locations, items...).
///
/// `template_type` is the display name of the template the entity was created
/// from; `features` holds the template's feature properties as text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    pub id: Id,
    pub display_name: String,
    pub template_type: Option<String>,
    pub features: IndexMap<String, IndexMap<String, String>>,
}

impl Entity {
    /// Returns a feature property, if the entity's template carries it.
    pub fn feature_property(&self, feature: &str, property: &str) -> Option<&str> {
        self.features
            .get(feature)
            .and_then(|properties| properties.get(property))
            .map(String::as_str)
    }
}

/// Everything loaded from one export.
#[derive(Debug, Clone, Default)]
pub struct Project {
    graph: Graph,
    flow: Vec<FlowEntry>,
    namespaces: Vec<VariableNamespace>,
    entities: Vec<Entity>,
}

impl Project {
    pub fn new(graph: Graph, flow: Vec<FlowEntry>) -> Self {
        Self {
            graph,
            flow,
            namespaces: Vec::new(),
            entities: Vec::new(),
        }
    }

    pub fn with_namespaces(mut self, namespaces: Vec<VariableNamespace>) -> Self {
        self.namespaces = namespaces;
        self
    }

    pub fn with_entities(mut self, entities: Vec<Entity>) -> Self {
        self.entities = entities;
        self
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Top-level elements of the flow tree, in export order.
    pub fn flow(&self) -> &[FlowEntry] {
        &self.flow
    }

    pub fn namespaces(&self) -> &[VariableNamespace] {
        &self.namespaces
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }
}
