//! Narrative graph model: nodes, pins and connections.
//!
//! A [`Graph`] owns every node of an export in export order and keeps three
//! indexes used constantly by the compiler:
//! - node by id
//! - pin by id, with its owner and direction
//! - child nodes by parent container
//!
//! The graph is immutable once built. Construction only checks identity
//! (duplicate node or pin ids); dangling connections are detected lazily by the
//! resolver, which is the only consumer that cares about them.

use std::collections::HashMap;

use thiserror::Error;

use crate::identifier::Id;

/// Errors raised while assembling a [`Graph`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("node `{0}` is defined more than once")]
    DuplicateNode(Id),

    #[error("pin `{pin}` of node `{owner}` reuses an existing pin id")]
    DuplicatePin { pin: Id, owner: Id },
}

/// Direction of a pin relative to its owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PinDirection {
    Input,
    Output,
}

/// A directed wire from an output pin to an input or output pin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    target: Id,
    target_pin: Id,
    label: String,
}

impl Connection {
    /// Creates a connection to `target_pin` owned by `target`.
    pub fn new(target: Id, target_pin: Id) -> Self {
        Self {
            target,
            target_pin,
            label: String::new(),
        }
    }

    /// Sets the display label of the connection.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Id of the node owning the target pin.
    pub fn target(&self) -> Id {
        self.target
    }

    /// Id of the pin this connection ends at.
    pub fn target_pin(&self) -> Id {
        self.target_pin
    }

    /// Display label; empty when the author did not set one.
    pub fn label(&self) -> &str {
        &self.label
    }
}

/// A typed connection point on a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pin {
    id: Id,
    owner: Id,
    direction: PinDirection,
    text: String,
    connections: Vec<Connection>,
}

impl Pin {
    pub fn new(id: Id, owner: Id, direction: PinDirection) -> Self {
        Self {
            id,
            owner,
            direction,
            text: String::new(),
            connections: Vec::new(),
        }
    }

    /// Sets the free-text field (a guard on input pins, statements on output pins).
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Appends an outgoing connection.
    pub fn with_connection(mut self, connection: Connection) -> Self {
        self.connections.push(connection);
        self
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn owner(&self) -> Id {
        self.owner
    }

    pub fn direction(&self) -> PinDirection {
        self.direction
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn is_connected(&self) -> bool {
        !self.connections.is_empty()
    }
}

/// A unit of narrative content or logic.
///
/// Nodes are built with the `with_*` methods and are immutable afterwards.
///
/// # Examples
///
/// ```
/// use skein_core::graph::{Connection, Node, Pin, PinDirection};
/// use skein_core::identifier::Id;
///
/// let id = Id::new("0x10");
/// let node = Node::new(id, "DialogueFragment")
///     .with_text("Hello there.")
///     .with_output_pin(
///         Pin::new(Id::new("0x11"), id, PinDirection::Output)
///             .with_connection(Connection::new(Id::new("0x20"), Id::new("0x21"))),
///     );
///
/// assert_eq!(node.pins(PinDirection::Output).len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    id: Id,
    type_tag: String,
    display_name: String,
    text: String,
    menu_text: String,
    directives: String,
    expression: String,
    speaker: Option<Id>,
    parent: Option<Id>,
    jump_target: Option<Id>,
    input_pins: Vec<Pin>,
    output_pins: Vec<Pin>,
}

impl Node {
    pub fn new(id: Id, type_tag: impl Into<String>) -> Self {
        Self {
            id,
            type_tag: type_tag.into(),
            display_name: String::new(),
            text: String::new(),
            menu_text: String::new(),
            directives: String::new(),
            expression: String::new(),
            speaker: None,
            parent: None,
            jump_target: None,
            input_pins: Vec::new(),
            output_pins: Vec::new(),
        }
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_menu_text(mut self, menu_text: impl Into<String>) -> Self {
        self.menu_text = menu_text.into();
        self
    }

    /// Sets the embedded directive string (`key="value"` pairs, flags, priority).
    pub fn with_directives(mut self, directives: impl Into<String>) -> Self {
        self.directives = directives.into();
        self
    }

    /// Sets the condition or statement batch of logic nodes.
    pub fn with_expression(mut self, expression: impl Into<String>) -> Self {
        self.expression = expression.into();
        self
    }

    pub fn with_speaker(mut self, speaker: Id) -> Self {
        self.speaker = Some(speaker);
        self
    }

    pub fn with_parent(mut self, parent: Id) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Sets the statically declared target of a jump node.
    pub fn with_jump_target(mut self, target: Id) -> Self {
        self.jump_target = Some(target);
        self
    }

    pub fn with_input_pin(mut self, pin: Pin) -> Self {
        self.input_pins.push(pin);
        self
    }

    pub fn with_output_pin(mut self, pin: Pin) -> Self {
        self.output_pins.push(pin);
        self
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn type_tag(&self) -> &str {
        &self.type_tag
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn menu_text(&self) -> &str {
        &self.menu_text
    }

    pub fn directives(&self) -> &str {
        &self.directives
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    pub fn speaker(&self) -> Option<Id> {
        self.speaker
    }

    pub fn parent(&self) -> Option<Id> {
        self.parent
    }

    pub fn jump_target(&self) -> Option<Id> {
        self.jump_target
    }

    /// Returns the ordered pins of one direction.
    pub fn pins(&self, direction: PinDirection) -> &[Pin] {
        match direction {
            PinDirection::Input => &self.input_pins,
            PinDirection::Output => &self.output_pins,
        }
    }
}

/// Location of a pin inside the graph's node storage.
#[derive(Debug, Clone, Copy)]
struct PinSlot {
    node: usize,
    direction: PinDirection,
    index: usize,
}

/// The validated, indexed narrative graph.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    nodes: Vec<Node>,
    node_index: HashMap<Id, usize>,
    pin_index: HashMap<Id, PinSlot>,
    children: HashMap<Id, Vec<usize>>,
}

impl Graph {
    /// Builds a graph from nodes in export order.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError`] if two nodes or two pins share an id.
    pub fn new(nodes: Vec<Node>) -> Result<Self, GraphError> {
        let mut node_index = HashMap::with_capacity(nodes.len());
        let mut pin_index = HashMap::new();
        let mut children: HashMap<Id, Vec<usize>> = HashMap::new();

        for (position, node) in nodes.iter().enumerate() {
            if node_index.insert(node.id, position).is_some() {
                return Err(GraphError::DuplicateNode(node.id));
            }

            for direction in [PinDirection::Input, PinDirection::Output] {
                for (index, pin) in node.pins(direction).iter().enumerate() {
                    let slot = PinSlot {
                        node: position,
                        direction,
                        index,
                    };
                    if pin_index.insert(pin.id, slot).is_some() {
                        return Err(GraphError::DuplicatePin {
                            pin: pin.id,
                            owner: node.id,
                        });
                    }
                }
            }

            if let Some(parent) = node.parent {
                children.entry(parent).or_default().push(position);
            }
        }

        log::debug!(nodes = nodes.len(), pins = pin_index.len(); "Graph indexed");

        Ok(Self {
            nodes,
            node_index,
            pin_index,
            children,
        })
    }

    /// Returns the node with the given id.
    pub fn node(&self, id: Id) -> Option<&Node> {
        self.node_index.get(&id).map(|&position| &self.nodes[position])
    }

    /// Iterates over all nodes in export order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    /// Returns the total number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns a pin and its owner by pin id.
    pub fn pin(&self, id: Id) -> Option<(&Node, &Pin)> {
        self.pin_index.get(&id).map(|slot| {
            let node = &self.nodes[slot.node];
            (node, &node.pins(slot.direction)[slot.index])
        })
    }

    /// Iterates over the direct contents of a container, in export order.
    pub fn children_of(&self, container: Id) -> impl Iterator<Item = &Node> {
        self.children
            .get(&container)
            .into_iter()
            .flatten()
            .map(|&position| &self.nodes[position])
    }
}
