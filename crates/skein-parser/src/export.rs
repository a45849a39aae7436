//! Loader for articy:draft JSON exports.
//!
//! The export is deserialized into private `Raw*` records that mirror the
//! JSON layout, then converted into the [`skein_core`] model. Only the subset
//! of the export the compiler needs is read; unknown fields are ignored and
//! missing optional fields default to empty.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::{Value, error::Category};

use skein_core::{
    graph::{Connection, Graph, GraphError, Node, Pin, PinDirection},
    identifier::Id,
    project::{Entity, FlowEntry, Project, Variable, VariableNamespace, VariableType},
};

use crate::{
    error::{Diagnostic, DiagnosticCollector, ErrorCode, ParseError},
    span::Span,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawExport {
    packages: Vec<RawPackage>,
    #[serde(default)]
    hierarchy: Option<RawHierarchyNode>,
    #[serde(default)]
    global_variables: Vec<RawNamespace>,
    #[serde(default)]
    object_definitions: Vec<RawObjectDefinition>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawPackage {
    #[serde(default)]
    models: Vec<RawModel>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawModel {
    #[serde(rename = "Type")]
    type_tag: String,
    properties: RawProperties,
    #[serde(default)]
    template: Option<IndexMap<String, Value>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawProperties {
    id: Id,
    #[serde(default)]
    display_name: String,
    #[serde(default)]
    text: String,
    #[serde(default)]
    menu_text: String,
    #[serde(default)]
    stage_directions: String,
    #[serde(default)]
    speaker: Option<Id>,
    #[serde(default)]
    parent: Option<Id>,
    #[serde(default)]
    expression: String,
    #[serde(default)]
    target: Option<Id>,
    #[serde(default)]
    input_pins: Vec<RawPin>,
    #[serde(default)]
    output_pins: Vec<RawPin>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawPin {
    id: Id,
    #[serde(default)]
    text: String,
    #[serde(default)]
    connections: Vec<RawConnection>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawConnection {
    #[serde(default)]
    label: String,
    target_pin: Id,
    target: Id,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawHierarchyNode {
    #[serde(default)]
    id: Option<Id>,
    #[serde(default, rename = "Type")]
    type_tag: String,
    #[serde(default)]
    children: Vec<RawHierarchyNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawNamespace {
    namespace: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    variables: Vec<RawVariable>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawVariable {
    variable: String,
    #[serde(rename = "Type")]
    kind: String,
    #[serde(default)]
    value: Value,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawObjectDefinition {
    #[serde(rename = "Type")]
    type_tag: String,
    #[serde(default)]
    template: Option<RawTemplateDefinition>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawTemplateDefinition {
    #[serde(default)]
    display_name: String,
}

/// Renders a JSON scalar the way it appears to authors.
fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Drops the "no reference" ids the export uses for unset fields.
fn reference(id: Option<Id>) -> Option<Id> {
    id.filter(|id| !id.is_empty())
}

fn convert_pin(raw: RawPin, owner: Id, direction: PinDirection) -> Pin {
    raw.connections.into_iter().fold(
        Pin::new(raw.id, owner, direction).with_text(raw.text),
        |pin, connection| {
            pin.with_connection(
                Connection::new(connection.target, connection.target_pin)
                    .with_label(connection.label),
            )
        },
    )
}

fn convert_node(raw: &RawModel) -> Node {
    let properties = &raw.properties;
    let id = properties.id;

    let mut node = Node::new(id, raw.type_tag.as_str())
        .with_display_name(properties.display_name.as_str())
        .with_text(properties.text.as_str())
        .with_menu_text(properties.menu_text.as_str())
        .with_directives(properties.stage_directions.as_str())
        .with_expression(properties.expression.as_str());

    if let Some(speaker) = reference(properties.speaker) {
        node = node.with_speaker(speaker);
    }
    if let Some(parent) = reference(properties.parent) {
        node = node.with_parent(parent);
    }
    if let Some(target) = reference(properties.target) {
        node = node.with_jump_target(target);
    }
    node
}

fn convert_flow(raw: RawHierarchyNode) -> Option<FlowEntry> {
    let id = reference(raw.id)?;
    let children = raw.children.into_iter().filter_map(convert_flow).collect();
    Some(FlowEntry::new(id).with_children(children))
}

fn convert_namespace(raw: RawNamespace) -> VariableNamespace {
    VariableNamespace {
        name: raw.namespace,
        description: raw.description,
        variables: raw
            .variables
            .into_iter()
            .map(|variable| Variable {
                name: variable.variable,
                kind: VariableType::from(variable.kind.as_str()),
                value: value_text(&variable.value),
                description: variable.description,
            })
            .collect(),
    }
}

fn convert_entity(raw: &RawModel, definitions: &HashMap<&str, &str>) -> Option<Entity> {
    let template = raw.template.as_ref()?;
    let features = template
        .iter()
        .filter_map(|(feature, properties)| {
            let Value::Object(properties) = properties else {
                return None;
            };
            let properties = properties
                .iter()
                .map(|(name, value)| (name.clone(), value_text(value)))
                .collect();
            Some((feature.clone(), properties))
        })
        .collect();

    Some(Entity {
        id: raw.properties.id,
        display_name: raw.properties.display_name.clone(),
        template_type: definitions
            .get(raw.type_tag.as_str())
            .map(|name| name.to_string()),
        features,
    })
}

/// Maps a serde_json failure onto a diagnostic pointing into `source`.
fn json_diagnostic(err: &serde_json::Error, source: &str) -> Diagnostic {
    let span = Span::at_line_column(source, err.line(), err.column());
    match err.classify() {
        Category::Data => Diagnostic::error(format!("unexpected export structure: {err}"))
            .with_code(ErrorCode::E002)
            .with_label(span, ErrorCode::E002.description())
            .with_help("export the project as articy:draft JSON"),
        Category::Io | Category::Syntax | Category::Eof => {
            Diagnostic::error(format!("invalid JSON: {err}"))
                .with_code(ErrorCode::E001)
                .with_label(span, ErrorCode::E001.description())
        }
    }
}

/// Reports every repeated node or pin id.
fn check_identity(models: &[RawModel]) -> Result<(), ParseError> {
    let mut collector = DiagnosticCollector::new();
    let mut nodes = HashSet::new();
    let mut pins: HashMap<Id, Id> = HashMap::new();

    for model in models {
        let id = model.properties.id;
        if !nodes.insert(id) {
            collector.emit(
                Diagnostic::error(format!("node `{id}` is defined more than once"))
                    .with_code(ErrorCode::E003)
                    .with_help("node ids must be unique; re-export the project"),
            );
        }

        let all_pins = model
            .properties
            .input_pins
            .iter()
            .chain(&model.properties.output_pins);
        for pin in all_pins {
            if let Some(first_owner) = pins.insert(pin.id, id) {
                collector.emit(
                    Diagnostic::error(format!(
                        "pin `{}` of node `{id}` is already used by node `{first_owner}`",
                        pin.id
                    ))
                    .with_code(ErrorCode::E004),
                );
            }
        }
    }

    collector.finish().map(|_| ())
}

impl From<GraphError> for Diagnostic {
    fn from(err: GraphError) -> Self {
        let code = match err {
            GraphError::DuplicateNode(_) => ErrorCode::E003,
            GraphError::DuplicatePin { .. } => ErrorCode::E004,
        };
        Diagnostic::error(err.to_string()).with_code(code)
    }
}

/// Loads an articy:draft JSON export.
///
/// # Errors
///
/// Returns a [`ParseError`] when the text is not JSON (`E001`), does not
/// have the export layout (`E002`), repeats node or pin ids (`E003`,
/// `E004`), or has no flow hierarchy (`E005`).
///
/// # Examples
///
/// ```
/// let source = r#"{
///     "Packages": [{ "Models": [
///         { "Type": "FlowFragment", "Properties": { "Id": "0x01", "DisplayName": "Act One" } }
///     ] }],
///     "Hierarchy": { "Children": [ { "Type": "Flow", "Children": [ { "Id": "0x01" } ] } ] }
/// }"#;
///
/// let project = skein_parser::parse(source).unwrap();
/// assert_eq!(project.graph().len(), 1);
/// assert_eq!(project.flow().len(), 1);
/// ```
pub fn parse(source: &str) -> Result<Project, ParseError> {
    let raw: RawExport =
        serde_json::from_str(source).map_err(|err| json_diagnostic(&err, source))?;

    let Some(package) = raw.packages.into_iter().next() else {
        return Err(Diagnostic::error("export contains no package")
            .with_code(ErrorCode::E002)
            .with_help("export at least one package with models")
            .into());
    };

    let flow = raw
        .hierarchy
        .into_iter()
        .flat_map(|root| root.children)
        .find(|child| child.type_tag == "Flow")
        .ok_or_else(|| {
            Diagnostic::error("export has no flow hierarchy")
                .with_code(ErrorCode::E005)
                .with_help("include the Flow branch of the project in the export")
        })?;

    check_identity(&package.models)?;

    let definitions: HashMap<&str, &str> = raw
        .object_definitions
        .iter()
        .filter_map(|definition| {
            let template = definition.template.as_ref()?;
            Some((definition.type_tag.as_str(), template.display_name.as_str()))
        })
        .collect();

    let entities: Vec<Entity> = package
        .models
        .iter()
        .filter_map(|model| convert_entity(model, &definitions))
        .collect();

    let nodes = package
        .models
        .into_iter()
        .map(|model| {
            let node = convert_node(&model);
            let id = node.id();
            let properties = model.properties;
            let node = properties.input_pins.into_iter().fold(node, |node, pin| {
                node.with_input_pin(convert_pin(pin, id, PinDirection::Input))
            });
            properties.output_pins.into_iter().fold(node, |node, pin| {
                node.with_output_pin(convert_pin(pin, id, PinDirection::Output))
            })
        })
        .collect();

    let graph = Graph::new(nodes).map_err(Diagnostic::from)?;
    let flow: Vec<FlowEntry> = flow.children.into_iter().filter_map(convert_flow).collect();
    let namespaces: Vec<VariableNamespace> = raw
        .global_variables
        .into_iter()
        .map(convert_namespace)
        .collect();

    log::info!(
        nodes = graph.len(),
        roots = flow.len(),
        namespaces = namespaces.len(),
        entities = entities.len();
        "Export loaded"
    );

    Ok(Project::new(graph, flow)
        .with_namespaces(namespaces)
        .with_entities(entities))
}
