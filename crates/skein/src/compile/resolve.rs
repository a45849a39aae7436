//! Pin target resolution.
//!
//! Flow leaves a node through one governing pin. A connection ending at an
//! input pin lands on that pin's owner; a connection ending at an output pin
//! (a container exit routed onward) continues from there. The walk is
//! iterative and tracks visited pins, so cycles of output pins are reported
//! instead of looping.

use std::collections::HashSet;

use skein_core::{
    graph::{Graph, Node, Pin, PinDirection},
    role::Role,
};

use super::Error;

/// Where the flow ends up.
#[derive(Debug, Clone, Copy)]
pub enum Target<'g> {
    /// No connection: the run-global terminal label.
    Terminal,
    /// A node entered through `entry`.
    Node { node: &'g Node, entry: &'g Pin },
    /// A pin with several connections; the player chooses.
    Branch(&'g Pin),
}

/// A resolved target plus the output pins crossed on the way.
#[derive(Debug, Clone)]
pub struct Resolution<'g> {
    /// Output pins whose statements run before reaching the target. A
    /// branching pin is never part of the chain; its statements belong to
    /// each menu option.
    pub chain: Vec<&'g Pin>,
    pub target: Target<'g>,
}

/// Returns the pin that decides where the flow goes after `node`.
///
/// Containers are entered through their input pin; a container whose input
/// pins carry no connection is transparent and continues through its output
/// pin. Every other role leaves through its first output pin.
pub fn governing_pin(node: &Node, role: Role) -> Option<&Pin> {
    let inputs = node.pins(PinDirection::Input);
    if role == Role::Container && inputs.iter().any(Pin::is_connected) {
        return inputs.first();
    }
    node.pins(PinDirection::Output).first()
}

/// Follows `start` until it reaches a node, a dead end or a branch.
///
/// # Errors
///
/// Returns [`Error::InvalidPinReference`] for a connection to an unknown pin
/// and [`Error::CyclicPinChain`] when the walk revisits an output pin.
pub fn resolve_pin<'g>(graph: &'g Graph, start: &'g Pin) -> Result<Resolution<'g>, Error> {
    let mut chain = Vec::new();
    let mut visited = HashSet::from([start.id()]);
    let mut current = start;

    loop {
        let connection = match current.connections() {
            [] => {
                if current.direction() == PinDirection::Output {
                    chain.push(current);
                }
                return Ok(Resolution {
                    chain,
                    target: Target::Terminal,
                });
            }
            [connection] => connection,
            _ => {
                return Ok(Resolution {
                    chain,
                    target: Target::Branch(current),
                });
            }
        };

        if current.direction() == PinDirection::Output {
            chain.push(current);
        }

        let Some((owner, next)) = graph.pin(connection.target_pin()) else {
            return Err(Error::InvalidPinReference {
                from: current.id(),
                pin: connection.target_pin(),
            });
        };

        match next.direction() {
            PinDirection::Input => {
                return Ok(Resolution {
                    chain,
                    target: Target::Node {
                        node: owner,
                        entry: next,
                    },
                });
            }
            PinDirection::Output => {
                if !visited.insert(next.id()) {
                    return Err(Error::CyclicPinChain {
                        start: start.id(),
                        pin: next.id(),
                    });
                }
                current = next;
            }
        }
    }
}
